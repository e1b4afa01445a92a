//! Game state module - the card-matching state machine
//!
//! Owns the deck, the open selection, cleared pairs, the move counter, the
//! elapsed-time clock and the two deferred actions (pair resolution and the
//! mismatch flip-back). Every transition is a method call; time only moves
//! when the owner calls [`GameState::advance`] or [`GameState::tick_second`].

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::deck::Deck;
use crate::records::BestRecord;
use crate::rng::SimpleRng;
use crate::schedule::{TaskHandle, TaskSlot};
use crate::snapshot::{CardView, CompletionView, GameSnapshot, TimersSnapshot};
use crate::types::*;

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Distinct values in play.
    values: Vec<CardValue>,
    deck: Deck,
    /// Face-up, unresolved deck indices (never more than two).
    open: ArrayVec<usize, 2>,
    cleared: BTreeSet<CardValue>,
    moves: u32,
    elapsed: ElapsedTime,
    /// Milliseconds accumulated toward the next clock tick.
    clock_ms: u32,
    disabled: bool,
    phase: Phase,
    resolve: TaskSlot,
    flip_back: TaskSlot,
    next_task: u32,
    best: BestRecord,
    completion: Option<CompletionView>,
    rng: SimpleRng,
    /// RNG state the current deck was shuffled from.
    seed: u32,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    last_event: Option<CoreEvent>,
}

impl GameState {
    /// Create a game with `pair_count` distinct values (clamped to
    /// `1..=MAX_PAIR_COUNT`), shuffled from `seed`.
    pub fn new(seed: u32, pair_count: u8) -> Self {
        let pair_count = pair_count.clamp(1, MAX_PAIR_COUNT);
        Self::with_values(seed, &CardValue::first_n(pair_count))
    }

    /// Create a game over an explicit list of values. Duplicates are dropped
    /// and only the first `MAX_PAIR_COUNT` distinct values are used.
    pub fn with_values(seed: u32, values: &[CardValue]) -> Self {
        let mut distinct: Vec<CardValue> = Vec::with_capacity(MAX_PAIR_COUNT as usize);
        for v in values {
            if distinct.len() == MAX_PAIR_COUNT as usize {
                break;
            }
            if !distinct.contains(v) {
                distinct.push(*v);
            }
        }

        let mut rng = SimpleRng::new(seed);
        let seed = rng.state();
        let deck = Deck::shuffled(&distinct, &mut rng);
        Self::assemble(distinct, deck, rng, seed)
    }

    /// Create a game over a fixed deck order.
    ///
    /// Restarts still reshuffle with `seed`.
    pub fn from_deck(seed: u32, deck: Deck) -> Self {
        let mut distinct: Vec<CardValue> = Vec::new();
        for v in deck.cards() {
            if !distinct.contains(v) {
                distinct.push(*v);
            }
        }
        let rng = SimpleRng::new(seed);
        let seed = rng.state();
        Self::assemble(distinct, deck, rng, seed)
    }

    fn assemble(values: Vec<CardValue>, deck: Deck, rng: SimpleRng, seed: u32) -> Self {
        Self {
            values,
            deck,
            open: ArrayVec::new(),
            cleared: BTreeSet::new(),
            moves: 0,
            elapsed: ElapsedTime::ZERO,
            clock_ms: 0,
            disabled: false,
            phase: Phase::Idle,
            resolve: TaskSlot::default(),
            flip_back: TaskSlot::default(),
            next_task: 0,
            best: BestRecord::default(),
            completion: None,
            rng,
            seed,
            episode_id: 0,
            last_event: None,
        }
    }

    /// Start the game: the clock runs and selections are accepted.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::AwaitingFirstPick;
    }

    pub fn started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn values(&self) -> &[CardValue] {
        &self.values
    }

    pub fn pair_count(&self) -> usize {
        self.values.len()
    }

    pub fn open_cards(&self) -> &[usize] {
        &self.open
    }

    pub fn cleared(&self) -> &BTreeSet<CardValue> {
        &self.cleared
    }

    pub fn is_cleared(&self, value: CardValue) -> bool {
        self.cleared.contains(&value)
    }

    pub fn is_face_up(&self, index: usize) -> bool {
        self.open.contains(&index)
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed(&self) -> ElapsedTime {
        self.elapsed
    }

    /// True while a pair is waiting to be resolved.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn completion(&self) -> Option<CompletionView> {
        self.completion
    }

    pub fn best_record(&self) -> BestRecord {
        self.best
    }

    /// Seed the historical best (e.g. from persisted storage).
    pub fn set_best_record(&mut self, best: BestRecord) {
        self.best = best;
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn pending_resolve_ms(&self) -> Option<u32> {
        self.resolve.remaining_ms()
    }

    pub fn pending_flip_back_ms(&self) -> Option<u32> {
        self.flip_back.remaining_ms()
    }

    /// Take and clear the last transition event.
    pub fn take_last_event(&mut self) -> Option<CoreEvent> {
        self.last_event.take()
    }

    /// Whether selecting `index` right now would change anything.
    pub fn can_select(&self, index: usize) -> bool {
        if self.disabled {
            return false;
        }
        if !matches!(
            self.phase,
            Phase::AwaitingFirstPick | Phase::AwaitingSecondPick | Phase::ShowingMismatch
        ) {
            return false;
        }
        match self.deck.get(index) {
            Some(value) => !self.cleared.contains(&value) && !self.open.contains(&index),
            None => false,
        }
    }

    /// Reveal the card at `index`.
    ///
    /// Returns false when the selection is ignored: out of range, already
    /// face-up, already cleared, input disabled, not started or completed.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.can_select(index) {
            return false;
        }

        if self.open.len() == 1 {
            self.open.push(index);
            self.moves = self.moves.saturating_add(1);
            self.disabled = true;
            self.phase = Phase::Resolving;
            let handle = self.next_handle();
            self.resolve.schedule(handle, RESOLVE_DELAY_MS);
        } else {
            // New round; a mismatched pair still on display is dropped now.
            self.flip_back.cancel();
            self.open.clear();
            self.open.push(index);
            self.phase = Phase::AwaitingSecondPick;
        }

        true
    }

    /// Advance the fixed-timestep clock by `elapsed_ms`.
    ///
    /// Drives the one-second clock and at most one deferred action per call.
    pub fn advance(&mut self, elapsed_ms: u32) {
        if self.phase == Phase::Idle {
            return;
        }

        self.clock_ms = self.clock_ms.saturating_add(elapsed_ms);
        while self.clock_ms >= CLOCK_TICK_MS {
            self.clock_ms -= CLOCK_TICK_MS;
            self.tick_second();
        }

        if self.resolve.advance(elapsed_ms).is_some() {
            self.resolve_pair();
        } else if self.flip_back.advance(elapsed_ms).is_some() {
            self.flip_back_pair();
        }
    }

    /// One tick of the elapsed-time clock.
    ///
    /// The clock keeps running after completion; the completion view holds
    /// the frozen final time.
    pub fn tick_second(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.elapsed.tick();
    }

    /// Reshuffle and reset everything except the best record.
    pub fn restart(&mut self) {
        self.resolve.cancel();
        self.flip_back.cancel();

        self.seed = self.rng.state();
        self.deck.reshuffle(&self.values, &mut self.rng);

        self.open.clear();
        self.cleared.clear();
        self.moves = 0;
        self.elapsed = ElapsedTime::ZERO;
        self.clock_ms = 0;
        self.disabled = false;
        self.completion = None;
        self.phase = Phase::AwaitingFirstPick;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.last_event = Some(CoreEvent::Restarted {
            episode_id: self.episode_id,
        });
    }

    /// Apply a game action
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Select(index) => self.select(index),
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.cards.clear();
        for (index, &value) in self.deck.cards().iter().enumerate() {
            out.cards.push(CardView {
                value,
                face_up: self.open.contains(&index),
                cleared: self.cleared.contains(&value),
                disabled: !self.can_select(index),
            });
        }
        out.phase = self.phase;
        out.moves = self.moves;
        out.elapsed = self.elapsed;
        out.disabled = self.disabled;
        out.pair_count = u8::try_from(self.values.len()).unwrap_or(u8::MAX);
        out.cleared_pairs = u8::try_from(self.cleared.len()).unwrap_or(u8::MAX);
        out.episode_id = self.episode_id;
        out.seed = self.seed;
        out.completion = self.completion;
        out.best = self.best;
        out.timers = TimersSnapshot {
            resolve_ms: self.resolve.remaining_ms(),
            flip_back_ms: self.flip_back.remaining_ms(),
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn next_handle(&mut self) -> TaskHandle {
        self.next_task = self.next_task.wrapping_add(1);
        TaskHandle(self.next_task)
    }

    fn resolve_pair(&mut self) {
        self.disabled = false;

        let (first, second) = match self.open.as_slice() {
            &[first, second] => (first, second),
            _ => {
                self.open.clear();
                self.phase = Phase::AwaitingFirstPick;
                return;
            }
        };

        let (Some(a), Some(b)) = (self.deck.get(first), self.deck.get(second)) else {
            self.open.clear();
            self.phase = Phase::AwaitingFirstPick;
            return;
        };

        if a == b {
            self.cleared.insert(a);
            self.open.clear();
            self.last_event = Some(CoreEvent::Matched {
                value: a,
                first,
                second,
            });
            if self.cleared.len() == self.values.len() {
                self.complete();
            } else {
                self.phase = Phase::AwaitingFirstPick;
            }
        } else {
            self.phase = Phase::ShowingMismatch;
            let handle = self.next_handle();
            self.flip_back.schedule(handle, MISMATCH_DELAY_MS);
            self.last_event = Some(CoreEvent::Mismatched { first, second });
        }
    }

    fn flip_back_pair(&mut self) {
        self.open.clear();
        if self.phase == Phase::ShowingMismatch {
            self.phase = Phase::AwaitingFirstPick;
        }
    }

    fn complete(&mut self) {
        let moves = self.moves;
        let time = self.elapsed;
        let update = self.best.record_completion(moves, time);

        self.completion = Some(CompletionView {
            moves,
            time,
            new_best_moves: update.moves_improved,
            new_best_time: update.time_improved,
        });
        self.phase = Phase::Completed;
        self.disabled = false;

        log::info!(
            "game {} completed in {} moves, {} (best {:?} moves, {})",
            self.episode_id,
            moves,
            time,
            self.best.moves,
            self.best.effective_time()
        );

        self.last_event = Some(CoreEvent::Completed {
            moves,
            time,
            new_best_moves: update.moves_improved,
            new_best_time: update.time_improved,
        });
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAIR_COUNT)
    }
}
