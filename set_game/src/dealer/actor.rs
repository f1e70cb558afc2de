//! Dealer actor: owns the deck, deals, adjudicates claims and runs the
//! reshuffle timer.

use super::{config::GameConfig, messages::Claim};
use crate::{
    errors::GameError,
    game::{
        constants::{COARSE_TICK, FINE_TICK},
        entities::{Card, Deck, PlayerId, Slot, Verdict},
        oracle::SetOracle,
        table::{Table, TableState},
    },
    player::{PlayerActor, PlayerHandle},
    ui::GameUi,
};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep},
};
use tokio_util::sync::CancellationToken;

/// Dealer actor managing a single game
pub struct Dealer {
    config: GameConfig,

    /// Shared table; the dealer is the only writer of cards
    table: Arc<Table>,

    /// Cards neither on the table nor won
    deck: Deck,

    /// Cards taken off the table by accepted claims
    discarded: Vec<Card>,

    players: Vec<PlayerHandle>,

    /// Claim queue, FIFO
    claims: mpsc::UnboundedReceiver<Claim>,

    /// Slots of an accepted claim waiting to be cleared
    cards_to_remove: Vec<Slot>,

    /// When the table is collected if nobody scores
    reshuffle_at: Instant,

    oracle: Arc<dyn SetOracle>,
    ui: Arc<dyn GameUi>,
    cancel: CancellationToken,
}

impl Dealer {
    /// Create a new dealer with a freshly shuffled deck
    ///
    /// # Arguments
    ///
    /// * `config` - Game configuration
    /// * `table` - The shared table, initially empty
    /// * `players` - Handles of every player, indexed by id
    /// * `claims` - Receiving end of the claim queue
    /// * `oracle` - Matching rule
    /// * `ui` - Display surface
    /// * `cancel` - Game cancellation token
    pub fn new(
        config: GameConfig,
        table: Arc<Table>,
        players: Vec<PlayerHandle>,
        claims: mpsc::UnboundedReceiver<Claim>,
        oracle: Arc<dyn SetOracle>,
        ui: Arc<dyn GameUi>,
        cancel: CancellationToken,
    ) -> Self {
        let deck = Deck::new(config.deck_size);
        Self {
            config,
            table,
            deck,
            discarded: Vec::new(),
            players,
            claims,
            cards_to_remove: Vec::new(),
            reshuffle_at: Instant::now(),
            oracle,
            ui,
            cancel,
        }
    }

    /// Replace the deck, e.g. to play with a subset of the cards.
    pub fn with_deck(mut self, deck: Deck) -> Self {
        self.deck = deck;
        self
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Cards removed from play by accepted claims.
    pub fn discarded(&self) -> &[Card] {
        &self.discarded
    }

    /// Run the game: start the players, then deal, time and collect until
    /// no Set is left or the game is cancelled.
    ///
    /// Returns the winners. Every player task has exited when this returns.
    pub async fn run(mut self, players: Vec<PlayerActor>) -> Result<Vec<PlayerId>, GameError> {
        log::info!("dealer starting");
        self.ui.set_countdown(self.config.turn_timeout(), false);

        let tasks: Vec<_> = players
            .into_iter()
            .map(|player| tokio::spawn(player.run()))
            .collect();

        while !self.should_finish() {
            self.place_cards_on_table();
            self.timer_loop().await;
            self.update_timer_display(false);
            self.remove_all_cards_from_table();
        }

        let winners = self.announce_winners();
        self.terminate(tasks).await?;
        log::info!("dealer terminated");
        Ok(winners)
    }

    /// Adjudicate claims until the turn times out, the game is cancelled or
    /// an accepted claim leaves no Set anywhere.
    async fn timer_loop(&mut self) {
        self.update_timer_display(true);

        while !self.cancel.is_cancelled() && Instant::now() < self.reshuffle_at {
            if self.sleep_until_woken_or_timeout().await && self.should_finish() {
                break;
            }
            self.update_timer_display(false);
        }
    }

    /// Wait for the next countdown tick or the next claim, whichever comes
    /// first. Claims are drained and checked as one batch.
    ///
    /// Returns whether a claim was accepted.
    async fn sleep_until_woken_or_timeout(&mut self) -> bool {
        let remaining = self.remaining();
        let tick = if remaining <= self.config.turn_timeout_warning() {
            FINE_TICK
        } else {
            COARSE_TICK
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            Some(claim) = self.claims.recv() => {
                let mut batch = vec![claim];
                while let Ok(claim) = self.claims.try_recv() {
                    batch.push(claim);
                }
                self.check_claims(batch)
            }
            _ = sleep(tick.min(remaining)) => false,
        }
    }

    /// Adjudicate a batch of claims in arrival order and answer each one.
    ///
    /// Returns whether any claim was accepted.
    pub fn check_claims(&mut self, batch: Vec<Claim>) -> bool {
        let mut accepted = false;
        for claim in batch {
            let verdict = self.check_claim(claim.player);
            log::debug!("claim from player {}: {verdict}", claim.player);
            accepted |= verdict == Verdict::Point;
            claim.answer(verdict);
        }
        accepted
    }

    fn check_claim(&mut self, player: PlayerId) -> Verdict {
        let Some(handle) = self.players.get(player).cloned() else {
            log::warn!("claim from unknown player {player}");
            return Verdict::Irrelevant;
        };

        let table = Arc::clone(&self.table);
        let mut state = table.lock();

        // Fewer than three tokens left means an earlier claim in this batch
        // took one of the slots.
        let Some(cards) = state.claimed_cards(player) else {
            return Verdict::Irrelevant;
        };
        if !self.oracle.test_set(&cards) {
            return Verdict::Penalty;
        }

        let score = handle.award_point();
        self.ui.set_score(player, score);
        self.cards_to_remove.extend_from_slice(state.tokens(player));
        self.remove_cards_from_table(&mut state);
        self.deal(&mut state);
        drop(state);

        self.update_timer_display(true);
        Verdict::Point
    }

    /// Clear the slots scheduled for removal. Their cards leave the game.
    fn remove_cards_from_table(&mut self, state: &mut TableState) {
        for slot in self.cards_to_remove.drain(..) {
            if let Some(card) = state.remove_card(slot) {
                self.discarded.push(card);
            }
        }
    }

    /// Fill empty slots from the deck.
    pub fn place_cards_on_table(&mut self) {
        let table = Arc::clone(&self.table);
        self.deal(&mut table.lock());
        if self.config.hints {
            table.hints(self.oracle.as_ref());
        }
    }

    fn deal(&mut self, state: &mut TableState) {
        let mut empty = state.empty_slots();
        empty.shuffle(&mut rand::rng());
        for slot in empty {
            let Some(card) = self.deck.draw() else {
                break;
            };
            if !state.place_card(card, slot) {
                log::debug!("table refused {card}, returning it to the deck");
                self.deck.add([card]);
                break;
            }
        }
    }

    /// Return every card on the table to the deck and reset all players'
    /// in-progress work.
    pub fn remove_all_cards_from_table(&mut self) {
        let table = Arc::clone(&self.table);
        let mut state = table.lock();

        let mut slots = state.occupied_slots();
        slots.shuffle(&mut rand::rng());
        let cards: Vec<Card> = slots
            .into_iter()
            .filter_map(|slot| state.remove_card(slot))
            .collect();
        self.deck.add(cards);

        for player in &self.players {
            state.clear_tokens(player.id());
            player.clear_actions();
        }
        self.cards_to_remove.clear();
        drop(state);

        self.dismiss_pending_claims();
        log::debug!("table collected, {} cards in deck", self.deck.len());
    }

    /// Answer every queued claim as irrelevant.
    fn dismiss_pending_claims(&mut self) {
        while let Ok(claim) = self.claims.try_recv() {
            claim.answer(Verdict::Irrelevant);
        }
    }

    /// Whether the game is over: cancelled, or no Set left among the cards
    /// still in play.
    pub fn should_finish(&self) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        let mut cards = self.deck.cards().to_vec();
        cards.extend(self.table.cards());
        !self.oracle.has_set(&cards)
    }

    fn remaining(&self) -> std::time::Duration {
        self.reshuffle_at.saturating_duration_since(Instant::now())
    }

    /// Reset the deadline to a full turn, or refresh the countdown.
    fn update_timer_display(&mut self, reset: bool) {
        if reset {
            self.reshuffle_at = Instant::now() + self.config.turn_timeout();
            self.ui.set_countdown(self.config.turn_timeout(), false);
        } else {
            let remaining = self.remaining();
            let urgent = remaining <= self.config.turn_timeout_warning();
            self.ui.set_countdown(remaining, urgent);
        }
    }

    fn announce_winners(&self) -> Vec<PlayerId> {
        let winners = winners(&self.players);
        log::info!("game over, winners: {winners:?}");
        self.ui.announce_winners(&winners);
        winners
    }

    /// Cancel the game, release anyone still waiting on a verdict and join
    /// every player task.
    async fn terminate(&mut self, tasks: Vec<JoinHandle<()>>) -> Result<(), GameError> {
        self.cancel.cancel();
        self.claims.close();
        self.dismiss_pending_claims();

        let mut failure = None;
        for task in tasks.into_iter().rev() {
            if let Err(e) = task.await {
                log::error!("player task failed: {e}");
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Every player holding the highest score.
pub fn winners(players: &[PlayerHandle]) -> Vec<PlayerId> {
    let Some(best) = players.iter().map(PlayerHandle::score).max() else {
        return Vec::new();
    };
    players
        .iter()
        .filter(|player| player.score() == best)
        .map(PlayerHandle::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{RecordingUi, UiEvent};
    use std::collections::BTreeSet;
    use tokio::sync::oneshot;

    /// Accepts exactly the listed triples, in any order.
    struct ListedSets(Vec<[u32; 3]>);

    impl SetOracle for ListedSets {
        fn test_set(&self, cards: &[Card; 3]) -> bool {
            let mut ids = cards.map(Card::id);
            ids.sort_unstable();
            self.0.iter().any(|set| {
                let mut set = *set;
                set.sort_unstable();
                set == ids
            })
        }
    }

    struct Fixture {
        dealer: Dealer,
        table: Arc<Table>,
        players: Vec<PlayerHandle>,
        ui: Arc<RecordingUi>,
        claims: mpsc::UnboundedSender<Claim>,
    }

    /// Six slots, nine cards: dealing pops 8..=3 onto the table and leaves
    /// 0, 1, 2 in the deck.
    fn fixture(sets: Vec<[u32; 3]>) -> Fixture {
        let config = GameConfig {
            deck_size: 9,
            table_size: 6,
            human_players: 3,
            turn_timeout_millis: 10_000,
            ..GameConfig::default()
        };
        let ui = Arc::new(RecordingUi::new());
        let table = Arc::new(Table::new(6, 9, 3, ui.clone()));
        let players: Vec<_> = (0..3).map(|id| PlayerHandle::new(id, true)).collect();
        let (sender, receiver) = mpsc::unbounded_channel();
        let dealer = Dealer::new(
            config,
            table.clone(),
            players.clone(),
            receiver,
            Arc::new(ListedSets(sets)),
            ui.clone(),
            CancellationToken::new(),
        )
        .with_deck(Deck::from_cards((0..9).map(Card).collect()));
        Fixture {
            dealer,
            table,
            players,
            ui,
            claims: sender,
        }
    }

    fn mark(table: &Table, player: PlayerId, cards: [u32; 3]) {
        let mut state = table.lock();
        for card in cards {
            let slot = state.slot_of(Card(card)).unwrap();
            assert!(state.place_token(player, slot));
        }
    }

    fn claim(player: PlayerId) -> (Claim, oneshot::Receiver<Verdict>) {
        Claim::new(player)
    }

    fn in_play(f: &Fixture) -> BTreeSet<Card> {
        let mut all: BTreeSet<Card> = f.dealer.deck().cards().iter().copied().collect();
        all.extend(f.table.cards());
        all
    }

    #[test]
    fn test_deal_fills_table_from_deck() {
        let mut f = fixture(vec![]);
        f.dealer.place_cards_on_table();
        assert_eq!(f.table.count_cards(), 6);
        assert_eq!(f.dealer.deck().len(), 3);
        let on_table: BTreeSet<_> = f.table.cards().into_iter().collect();
        assert_eq!(on_table, (3..9).map(Card).collect());
    }

    #[test]
    fn test_deal_stops_when_deck_runs_out() {
        let mut f = fixture(vec![]);
        f.dealer = f.dealer.with_deck(Deck::from_cards(vec![Card(0), Card(1)]));
        f.dealer.place_cards_on_table();
        assert_eq!(f.table.count_cards(), 2);
        assert!(f.dealer.deck().is_empty());
    }

    #[test]
    fn test_refused_card_goes_back_to_deck() {
        let mut f = fixture(vec![]);
        f.dealer = f
            .dealer
            .with_deck(Deck::from_cards((0..12).map(Card).collect()));
        f.dealer.place_cards_on_table();

        assert_eq!(f.table.count_cards() + f.dealer.deck().len(), 12);
        assert!(f.dealer.deck().contains(Card(11)));
        assert_eq!(f.table.slot_of(Card(11)), None);
    }

    #[test]
    fn test_valid_claim_scores_and_refills() {
        let mut f = fixture(vec![[3, 4, 5]]);
        f.dealer.place_cards_on_table();
        mark(&f.table, 0, [3, 4, 5]);

        let (c, mut verdict) = claim(0);
        assert!(f.dealer.check_claims(vec![c]));

        assert_eq!(verdict.try_recv().unwrap(), Verdict::Point);
        assert_eq!(f.players[0].score(), 1);
        assert!(f.table.tokens(0).is_empty());
        assert_eq!(f.table.count_cards(), 6);
        assert!(f.dealer.deck().is_empty());
        for card in [3, 4, 5] {
            assert_eq!(f.table.slot_of(Card(card)), None);
        }

        let mut discarded = f.dealer.discarded().to_vec();
        discarded.sort();
        assert_eq!(discarded, vec![Card(3), Card(4), Card(5)]);
        assert_eq!(in_play(&f).len() + discarded.len(), 9);

        let events = f.ui.events();
        assert!(events.contains(&UiEvent::ScoreUpdated {
            player: 0,
            score: 1
        }));
        assert_eq!(
            events.last(),
            Some(&UiEvent::Countdown {
                remaining_millis: 10_000,
                urgent: false
            })
        );
    }

    #[test]
    fn test_invalid_claim_is_penalized_without_touching_table() {
        let mut f = fixture(vec![[3, 4, 5]]);
        f.dealer.place_cards_on_table();
        mark(&f.table, 1, [3, 4, 6]);
        let before = f.table.cards();

        let (c, mut verdict) = claim(1);
        assert!(!f.dealer.check_claims(vec![c]));

        assert_eq!(verdict.try_recv().unwrap(), Verdict::Penalty);
        assert_eq!(f.players[1].score(), 0);
        assert_eq!(f.table.cards(), before);
        assert_eq!(f.table.tokens(1).len(), 3);
    }

    #[test]
    fn test_overlapping_claim_after_accepted_one_is_irrelevant() {
        let mut f = fixture(vec![[3, 4, 5], [5, 6, 7]]);
        f.dealer.place_cards_on_table();
        mark(&f.table, 0, [3, 4, 5]);
        mark(&f.table, 1, [5, 6, 7]);

        let (first, mut first_verdict) = claim(0);
        let (second, mut second_verdict) = claim(1);
        assert!(f.dealer.check_claims(vec![first, second]));

        assert_eq!(first_verdict.try_recv().unwrap(), Verdict::Point);
        assert_eq!(second_verdict.try_recv().unwrap(), Verdict::Irrelevant);
        assert_eq!(f.players[0].score(), 1);
        assert_eq!(f.players[1].score(), 0);

        // The second player keeps the tokens that survived.
        let remaining: BTreeSet<_> = f
            .table
            .tokens(1)
            .into_iter()
            .map(|slot| f.table.card_at(slot).unwrap())
            .collect();
        assert_eq!(remaining, BTreeSet::from([Card(6), Card(7)]));
    }

    #[test]
    fn test_overlapping_claims_follow_arrival_order() {
        let mut f = fixture(vec![[3, 4, 5]]);
        f.dealer.place_cards_on_table();
        mark(&f.table, 0, [3, 4, 5]);
        mark(&f.table, 1, [5, 6, 7]);

        // Player 1 was first: its wrong claim is judged on intact data.
        let (first, mut first_verdict) = claim(1);
        let (second, mut second_verdict) = claim(0);
        f.dealer.check_claims(vec![first, second]);

        assert_eq!(first_verdict.try_recv().unwrap(), Verdict::Penalty);
        assert_eq!(second_verdict.try_recv().unwrap(), Verdict::Point);
        assert_eq!(f.players[0].score(), 1);
    }

    #[test]
    fn test_disjoint_claims_in_one_batch_both_score() {
        let mut f = fixture(vec![[3, 4, 5], [6, 7, 8]]);
        f.dealer.place_cards_on_table();
        mark(&f.table, 0, [3, 4, 5]);
        mark(&f.table, 2, [6, 7, 8]);

        let (first, mut first_verdict) = claim(0);
        let (second, mut second_verdict) = claim(2);
        f.dealer.check_claims(vec![first, second]);

        assert_eq!(first_verdict.try_recv().unwrap(), Verdict::Point);
        assert_eq!(second_verdict.try_recv().unwrap(), Verdict::Point);
        assert_eq!(f.table.count_cards(), 3);
        assert_eq!(f.dealer.discarded().len(), 6);
    }

    #[test]
    fn test_collect_resets_players_and_pending_claims() {
        let mut f = fixture(vec![[0, 1, 2]]);
        f.dealer.place_cards_on_table();
        mark(&f.table, 0, [3, 4, 5]);
        mark(&f.table, 1, [6, 7, 8]);
        f.players[2].key_pressed(1);
        f.players[2].key_pressed(2);

        let (c, mut verdict) = claim(0);
        f.claims.send(c).unwrap();

        f.dealer.remove_all_cards_from_table();

        assert_eq!(f.table.count_cards(), 0);
        assert_eq!(f.dealer.deck().len(), 9);
        for player in &f.players {
            assert!(f.table.tokens(player.id()).is_empty());
            assert_eq!(player.pending_actions(), 0);
        }
        assert_eq!(verdict.try_recv().unwrap(), Verdict::Irrelevant);
        assert_eq!(in_play(&f), (0..9).map(Card).collect());
    }

    #[test]
    fn test_should_finish_looks_at_deck_and_table() {
        let mut f = fixture(vec![[0, 1, 8]]);
        assert!(!f.dealer.should_finish());

        // 0 and 1 stay in the deck, 8 goes to the table.
        f.dealer.place_cards_on_table();
        assert!(!f.dealer.should_finish());

        let f = fixture(vec![]);
        assert!(f.dealer.should_finish());
    }

    #[test]
    fn test_should_finish_when_cancelled() {
        let f = fixture(vec![[0, 1, 2]]);
        f.dealer.cancel.cancel();
        assert!(f.dealer.should_finish());
    }

    #[test]
    fn test_winners_share_top_score() {
        let players: Vec<_> = (0..3).map(|id| PlayerHandle::new(id, false)).collect();
        assert_eq!(winners(&players), vec![0, 1, 2]);

        players[1].award_point();
        assert_eq!(winners(&players), vec![1]);

        players[2].award_point();
        assert_eq!(winners(&players), vec![1, 2]);

        assert!(winners(&[]).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_loop_times_out_without_claims() {
        let mut f = fixture(vec![[0, 1, 2]]);
        f.dealer.place_cards_on_table();

        let start = Instant::now();
        f.dealer.timer_loop().await;
        assert!(Instant::now() - start >= std::time::Duration::from_secs(10));

        let urgent = f.ui.count(|event| {
            matches!(event, UiEvent::Countdown { urgent: true, .. })
        });
        let calm = f.ui.count(|event| {
            matches!(event, UiEvent::Countdown { urgent: false, .. })
        });
        // 5s of 10ms ticks against 5s of 800ms ticks.
        assert!(urgent > 400, "urgent ticks: {urgent}");
        assert!(calm < 20, "calm ticks: {calm}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_interrupts_timed_wait() {
        let mut f = fixture(vec![[3, 4, 5], [0, 1, 2]]);
        f.dealer.place_cards_on_table();
        mark(&f.table, 0, [3, 4, 5]);
        let (c, verdict) = claim(0);
        f.claims.send(c).unwrap();

        let start = Instant::now();
        assert!(f.dealer.sleep_until_woken_or_timeout().await);
        assert_eq!(Instant::now(), start);
        assert_eq!(verdict.await.unwrap(), Verdict::Point);
    }
}
