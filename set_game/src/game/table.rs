//! Shared table state.
//!
//! The table is the only state touched by every task in a game. All of it
//! sits behind one mutex: the slot-to-card mapping, the reverse mapping and
//! every player's tokens. A player's tokens are its candidate set, so the
//! two can never disagree.
//!
//! Single operations are available directly on [`Table`]. Anything that
//! must read and then write atomically (a player's toggle, the dealer's
//! claim check and refill, a full sweep) takes [`Table::lock`] once and
//! works on the guard.

use super::{
    constants::SET_SIZE,
    entities::{Card, PlayerId, Slot},
    oracle::SetOracle,
};
use crate::ui::GameUi;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Table contents. Only reachable through [`Table::lock`].
pub struct TableState {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: Vec<Option<Slot>>,
    tokens: Vec<Vec<Slot>>,
    ui: Arc<dyn GameUi>,
}

impl TableState {
    pub fn table_size(&self) -> usize {
        self.slot_to_card.len()
    }

    pub fn player_count(&self) -> usize {
        self.tokens.len()
    }

    /// Put `card` into the empty `slot`.
    ///
    /// Returns `false` and leaves the table untouched if the slot is
    /// occupied, out of range, or the card is already on the table.
    pub fn place_card(&mut self, card: Card, slot: Slot) -> bool {
        if !matches!(self.slot_to_card.get(slot), Some(None)) {
            log::warn!("refusing to place {card} on slot {slot}: slot not empty");
            return false;
        }
        match self.card_to_slot.get(card.index()) {
            Some(None) => {}
            _ => {
                log::warn!("refusing to place {card} on slot {slot}: card unavailable");
                return false;
            }
        }

        self.card_to_slot[card.index()] = Some(slot);
        self.slot_to_card[slot] = Some(card);
        self.ui.place_card(card, slot);
        true
    }

    /// Empty `slot`, dropping every player's token on it.
    pub fn remove_card(&mut self, slot: Slot) -> Option<Card> {
        let card = self.slot_to_card.get_mut(slot)?.take()?;
        self.card_to_slot[card.index()] = None;
        for tokens in &mut self.tokens {
            tokens.retain(|&s| s != slot);
        }
        self.ui.remove_card(slot);
        Some(card)
    }

    /// Put a token for `player` on `slot`.
    ///
    /// Only succeeds if the slot holds a card, the player has fewer than
    /// [`SET_SIZE`] tokens and no token there yet.
    pub fn place_token(&mut self, player: PlayerId, slot: Slot) -> bool {
        if self.card_at(slot).is_none() {
            return false;
        }
        let Some(tokens) = self.tokens.get_mut(player) else {
            return false;
        };
        if tokens.len() >= SET_SIZE || tokens.contains(&slot) {
            return false;
        }
        tokens.push(slot);
        true
    }

    /// Remove the token of `player` on `slot`, if any.
    pub fn remove_token(&mut self, player: PlayerId, slot: Slot) -> bool {
        let Some(tokens) = self.tokens.get_mut(player) else {
            return false;
        };
        match tokens.iter().position(|&s| s == slot) {
            Some(index) => {
                tokens.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove all tokens of `player`, returning how many were dropped.
    pub fn clear_tokens(&mut self, player: PlayerId) -> usize {
        self.tokens
            .get_mut(player)
            .map(|tokens| std::mem::take(tokens).len())
            .unwrap_or(0)
    }

    pub fn count_cards(&self) -> usize {
        self.slot_to_card.iter().flatten().count()
    }

    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.slot_to_card.get(slot).copied().flatten()
    }

    pub fn slot_of(&self, card: Card) -> Option<Slot> {
        self.card_to_slot.get(card.index()).copied().flatten()
    }

    /// Slots holding a token of `player`, in placement order.
    pub fn tokens(&self, player: PlayerId) -> &[Slot] {
        self.tokens.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The cards under `player`'s tokens, when it holds a full claim.
    pub fn claimed_cards(&self, player: PlayerId) -> Option<[Card; SET_SIZE]> {
        let tokens = self.tokens(player);
        if tokens.len() != SET_SIZE {
            return None;
        }
        Some([
            self.card_at(tokens[0])?,
            self.card_at(tokens[1])?,
            self.card_at(tokens[2])?,
        ])
    }

    /// Cards currently displayed, in slot order.
    pub fn cards(&self) -> Vec<Card> {
        self.slot_to_card.iter().flatten().copied().collect()
    }

    pub fn empty_slots(&self) -> Vec<Slot> {
        self.slot_indices(false)
    }

    pub fn occupied_slots(&self) -> Vec<Slot> {
        self.slot_indices(true)
    }

    fn slot_indices(&self, occupied: bool) -> Vec<Slot> {
        self.slot_to_card
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_some() == occupied)
            .map(|(slot, _)| slot)
            .collect()
    }
}

/// The shared table.
pub struct Table {
    state: Mutex<TableState>,
}

impl Table {
    /// Create an empty table.
    ///
    /// # Arguments
    ///
    /// * `table_size` - Number of slots
    /// * `deck_size` - Number of distinct cards in the game
    /// * `players` - Number of players that may hold tokens
    /// * `ui` - Display notified of card placements and removals
    pub fn new(table_size: usize, deck_size: usize, players: usize, ui: Arc<dyn GameUi>) -> Self {
        Self {
            state: Mutex::new(TableState {
                slot_to_card: vec![None; table_size],
                card_to_slot: vec![None; deck_size],
                tokens: vec![Vec::with_capacity(SET_SIZE); players],
                ui,
            }),
        }
    }

    /// Enter the table's exclusive region.
    pub fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock()
    }

    pub fn place_card(&self, card: Card, slot: Slot) -> bool {
        self.lock().place_card(card, slot)
    }

    pub fn remove_card(&self, slot: Slot) -> Option<Card> {
        self.lock().remove_card(slot)
    }

    pub fn place_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.lock().place_token(player, slot)
    }

    pub fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.lock().remove_token(player, slot)
    }

    pub fn count_cards(&self) -> usize {
        self.lock().count_cards()
    }

    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.lock().card_at(slot)
    }

    pub fn slot_of(&self, card: Card) -> Option<Slot> {
        self.lock().slot_of(card)
    }

    pub fn tokens(&self, player: PlayerId) -> Vec<Slot> {
        self.lock().tokens(player).to_vec()
    }

    pub fn cards(&self) -> Vec<Card> {
        self.lock().cards()
    }

    /// Log every Set currently on the table.
    pub fn hints(&self, oracle: &dyn SetOracle) {
        let state = self.lock();
        for set in oracle.find_sets(&state.cards(), usize::MAX) {
            let slots: Vec<_> = set.iter().filter_map(|&card| state.slot_of(card)).collect();
            log::info!("hint: set {set:?} at slots {slots:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{RecordingUi, UiEvent};

    fn table_with(cards: &[u32], players: usize) -> (Table, Arc<RecordingUi>) {
        let ui = Arc::new(RecordingUi::new());
        let table = Table::new(6, 12, players, ui.clone());
        for (slot, &card) in cards.iter().enumerate() {
            assert!(table.place_card(Card(card), slot));
        }
        (table, ui)
    }

    #[test]
    fn test_place_and_remove_card() {
        let (table, ui) = table_with(&[4, 7], 1);
        assert_eq!(table.count_cards(), 2);
        assert_eq!(table.card_at(1), Some(Card(7)));
        assert_eq!(table.slot_of(Card(4)), Some(0));

        assert_eq!(table.remove_card(1), Some(Card(7)));
        assert_eq!(table.count_cards(), 1);
        assert_eq!(table.slot_of(Card(7)), None);
        assert_eq!(table.remove_card(1), None);

        assert_eq!(
            ui.events(),
            vec![
                UiEvent::CardPlaced {
                    slot: 0,
                    card: Card(4)
                },
                UiEvent::CardPlaced {
                    slot: 1,
                    card: Card(7)
                },
                UiEvent::CardRemoved { slot: 1 },
            ]
        );
    }

    #[test]
    fn test_place_card_rejects_occupied_slot_and_duplicate_card() {
        let (table, _) = table_with(&[4], 1);
        assert!(!table.place_card(Card(5), 0));
        assert!(!table.place_card(Card(4), 1));
        assert!(!table.place_card(Card(5), 6));
        assert!(!table.place_card(Card(12), 1));
        assert_eq!(table.cards(), vec![Card(4)]);
    }

    #[test]
    fn test_token_needs_card() {
        let (table, _) = table_with(&[1], 1);
        assert!(!table.place_token(0, 3));
        assert!(table.place_token(0, 0));
        assert!(!table.place_token(0, 0));
        assert_eq!(table.tokens(0), vec![0]);
    }

    #[test]
    fn test_token_limit() {
        let (table, _) = table_with(&[0, 1, 2, 3], 1);
        for slot in 0..3 {
            assert!(table.place_token(0, slot));
        }
        assert!(!table.place_token(0, 3));
        assert_eq!(table.tokens(0).len(), SET_SIZE);
    }

    #[test]
    fn test_remove_token_toggle() {
        let (table, _) = table_with(&[0, 1], 2);
        assert!(!table.remove_token(0, 0));
        assert!(table.place_token(0, 0));
        assert!(table.place_token(1, 0));
        assert!(table.remove_token(0, 0));
        assert!(!table.remove_token(0, 0));
        assert_eq!(table.tokens(1), vec![0]);
    }

    #[test]
    fn test_remove_card_strips_every_players_tokens() {
        let (table, _) = table_with(&[0, 1, 2], 3);
        for player in 0..3 {
            assert!(table.place_token(player, 1));
            assert!(table.place_token(player, 2));
        }
        table.remove_card(1);
        for player in 0..3 {
            assert_eq!(table.tokens(player), vec![2]);
        }
    }

    #[test]
    fn test_claimed_cards() {
        let (table, _) = table_with(&[9, 8, 7, 6], 1);
        let mut state = table.lock();
        assert_eq!(state.claimed_cards(0), None);
        state.place_token(0, 3);
        state.place_token(0, 0);
        assert_eq!(state.claimed_cards(0), None);
        state.place_token(0, 2);
        assert_eq!(state.claimed_cards(0), Some([Card(6), Card(9), Card(7)]));
        assert_eq!(state.clear_tokens(0), 3);
        assert!(state.tokens(0).is_empty());
    }

    #[test]
    fn test_slot_listing() {
        let (table, _) = table_with(&[0, 1], 1);
        table.remove_card(0);
        let state = table.lock();
        assert_eq!(state.occupied_slots(), vec![1]);
        assert_eq!(state.empty_slots(), vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unknown_player_is_ignored() {
        let (table, _) = table_with(&[0], 1);
        assert!(!table.place_token(5, 0));
        assert!(!table.remove_token(5, 0));
        assert!(table.tokens(5).is_empty());
        assert_eq!(table.lock().clear_tokens(5), 0);
    }
}
