//! Machine-readable display: one JSON object per line.
//!
//! Events are emitted while the table lock is held, so `emit` only queues
//! them. A writer thread encodes and prints them.

use set_game::ui::{GameUi, UiEvent};
use std::io::Write;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

pub struct JsonUi {
    events: mpsc::UnboundedSender<UiEvent>,
}

impl JsonUi {
    /// Start a display writing to stdout.
    ///
    /// The writer thread ends once every clone of the display is dropped;
    /// join it to flush the last events.
    pub fn stdout() -> (Self, JoinHandle<std::io::Stdout>) {
        Self::spawn(std::io::stdout())
    }

    pub fn spawn<W>(mut out: W) -> (Self, JoinHandle<W>)
    where
        W: Write + Send + 'static,
    {
        let (events, mut inbox) = mpsc::unbounded_channel::<UiEvent>();
        let writer = std::thread::spawn(move || {
            while let Some(event) = inbox.blocking_recv() {
                match serde_json::to_string(&event) {
                    Ok(line) => {
                        if let Err(e) = writeln!(out, "{line}") {
                            log::warn!("Failed to write display event: {e}");
                        }
                    }
                    Err(e) => log::warn!("Failed to encode display event: {e}"),
                }
            }
            if let Err(e) = out.flush() {
                log::warn!("Failed to flush display: {e}");
            }
            out
        });
        (Self { events }, writer)
    }
}

impl GameUi for JsonUi {
    fn emit(&self, event: UiEvent) {
        if self.events.send(event).is_err() {
            log::trace!("display writer gone, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_become_json_lines_in_order() {
        let (ui, writer) = JsonUi::spawn(Vec::new());
        ui.emit(UiEvent::CardPlaced {
            slot: 2,
            card: set_game::Card(40),
        });
        ui.emit(UiEvent::WinnersAnnounced { players: vec![0, 1] });
        drop(ui);

        let out = String::from_utf8(writer.join().unwrap()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"event":"card_placed","slot":2,"card":40}"#,
                r#"{"event":"winners_announced","players":[0,1]}"#,
            ]
        );
    }

    #[test]
    fn test_emit_does_not_wait_for_writer() {
        struct Stalled(std::sync::mpsc::Receiver<()>);

        impl Write for Stalled {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                let _ = self.0.recv();
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let (release, gate) = std::sync::mpsc::channel();
        let (ui, writer) = JsonUi::spawn(Stalled(gate));
        for slot in 0..100 {
            ui.emit(UiEvent::CardRemoved { slot });
        }
        drop(ui);
        drop(release);
        writer.join().unwrap();
    }
}
