//! Display surface.
//!
//! The core only fires events at the display and never reads anything back.
//! Renderers implement [`GameUi::emit`]; the named helpers build the event.

use crate::game::entities::{Card, PlayerId, Score, Slot};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the core tells the display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    Countdown { remaining_millis: u64, urgent: bool },
    CardPlaced { slot: Slot, card: Card },
    CardRemoved { slot: Slot },
    ScoreUpdated { player: PlayerId, score: Score },
    FreezeUpdated { player: PlayerId, remaining_millis: u64 },
    WinnersAnnounced { players: Vec<PlayerId> },
}

/// Fire-and-forget sink for display events.
///
/// Called from the dealer and player tasks, sometimes while the table lock
/// is held, so implementations must not block for long.
pub trait GameUi: Send + Sync {
    fn emit(&self, event: UiEvent);

    fn set_countdown(&self, remaining: Duration, urgent: bool) {
        self.emit(UiEvent::Countdown {
            remaining_millis: remaining.as_millis() as u64,
            urgent,
        });
    }

    fn place_card(&self, card: Card, slot: Slot) {
        self.emit(UiEvent::CardPlaced { slot, card });
    }

    fn remove_card(&self, slot: Slot) {
        self.emit(UiEvent::CardRemoved { slot });
    }

    fn set_score(&self, player: PlayerId, score: Score) {
        self.emit(UiEvent::ScoreUpdated { player, score });
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        self.emit(UiEvent::FreezeUpdated {
            player,
            remaining_millis: remaining.as_millis() as u64,
        });
    }

    fn announce_winners(&self, players: &[PlayerId]) {
        self.emit(UiEvent::WinnersAnnounced {
            players: players.to_vec(),
        });
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

impl GameUi for NullUi {
    fn emit(&self, _event: UiEvent) {}
}

/// Renders events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUi;

impl GameUi for LogUi {
    fn emit(&self, event: UiEvent) {
        match event {
            UiEvent::Countdown {
                remaining_millis,
                urgent: true,
            } => log::trace!("{:.2}s left!", remaining_millis as f64 / 1000.0),
            UiEvent::Countdown {
                remaining_millis, ..
            } => log::trace!("{}s left", remaining_millis / 1000),
            UiEvent::CardPlaced { slot, card } => log::debug!("slot {slot}: {card}"),
            UiEvent::CardRemoved { slot } => log::debug!("slot {slot}: empty"),
            UiEvent::ScoreUpdated { player, score } => {
                log::info!("player {player} now has {score} point(s)")
            }
            UiEvent::FreezeUpdated {
                player,
                remaining_millis,
            } => {
                if remaining_millis > 0 {
                    log::debug!("player {player} frozen for {remaining_millis}ms");
                } else {
                    log::debug!("player {player} unfrozen");
                }
            }
            UiEvent::WinnersAnnounced { players } => match players.as_slice() {
                [winner] => log::info!("player {winner} wins"),
                _ => log::info!("tie between players {players:?}"),
            },
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Events other than countdown refreshes.
    pub fn game_events(&self) -> Vec<UiEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| !matches!(event, UiEvent::Countdown { .. }))
            .cloned()
            .collect()
    }

    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&UiEvent) -> bool,
    {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl GameUi for RecordingUi {
    fn emit(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_build_events() {
        let ui = RecordingUi::new();
        ui.set_countdown(Duration::from_millis(4200), true);
        ui.place_card(Card(9), 3);
        ui.remove_card(3);
        ui.set_score(1, 2);
        ui.set_freeze(1, Duration::from_secs(1));
        ui.announce_winners(&[0, 1]);

        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Countdown {
                    remaining_millis: 4200,
                    urgent: true
                },
                UiEvent::CardPlaced {
                    slot: 3,
                    card: Card(9)
                },
                UiEvent::CardRemoved { slot: 3 },
                UiEvent::ScoreUpdated {
                    player: 1,
                    score: 2
                },
                UiEvent::FreezeUpdated {
                    player: 1,
                    remaining_millis: 1000
                },
                UiEvent::WinnersAnnounced {
                    players: vec![0, 1]
                },
            ]
        );
        assert_eq!(ui.game_events().len(), 5);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_string(&UiEvent::CardPlaced {
            slot: 2,
            card: Card(40),
        })
        .unwrap();
        assert_eq!(json, r#"{"event":"card_placed","slot":2,"card":40}"#);
    }

    #[test]
    fn test_log_ui_does_not_panic() {
        let ui = LogUi;
        ui.set_countdown(Duration::from_secs(30), false);
        ui.announce_winners(&[2]);
        ui.announce_winners(&[0, 2]);
    }
}
