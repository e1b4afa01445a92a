//! Session controller: a game plus the store its best record lives in.
//!
//! The record is loaded once on construction. Completion events are written
//! back through the store before they are handed to the caller; a failed write
//! is logged and the game carries on with the in-memory record.

use crate::game_state::GameState;
use crate::records::{BestRecord, KeyValueStore, RecordUpdate};
use crate::snapshot::GameSnapshot;
use crate::types::{CoreEvent, GameAction};

pub struct Session<S: KeyValueStore> {
    state: GameState,
    store: S,
    last_event: Option<CoreEvent>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(mut state: GameState, store: S) -> Self {
        let best = BestRecord::load(&store);
        log::debug!(
            "loaded best record: moves={:?} time={:?}",
            best.moves,
            best.time
        );
        state.set_best_record(best);
        Self {
            state,
            store,
            last_event: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn start(&mut self) {
        self.state.start();
    }

    pub fn apply_action(&mut self, action: GameAction) -> bool {
        let applied = self.state.apply_action(action);
        self.flush_event();
        applied
    }

    pub fn advance(&mut self, elapsed_ms: u32) {
        self.state.advance(elapsed_ms);
        self.flush_event();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.state.snapshot_into(out);
    }

    pub fn take_last_event(&mut self) -> Option<CoreEvent> {
        self.last_event.take()
    }

    fn flush_event(&mut self) {
        let Some(event) = self.state.take_last_event() else {
            return;
        };

        if let CoreEvent::Completed {
            new_best_time,
            new_best_moves,
            ..
        } = event
        {
            let update = RecordUpdate {
                moves_improved: new_best_moves,
                time_improved: new_best_time,
            };
            if let Err(e) = self.state.best_record().save_completion(&mut self.store, update) {
                log::error!("failed to persist best record: {}", e);
            }
        }

        self.last_event = Some(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;
    use crate::records::{MemoryStore, BEST_SCORE_KEY, BEST_TIME_KEY};
    use crate::types::{CardValue, ElapsedTime, CLOCK_TICK_MS, RESOLVE_DELAY_MS};
    use std::io;

    fn two_pair_game() -> GameState {
        let v = CardValue;
        GameState::from_deck(1, Deck::from_cards(vec![v(0), v(1), v(0), v(1)]))
    }

    fn finish(session: &mut Session<impl KeyValueStore>) {
        for (a, b) in [(0, 2), (1, 3)] {
            session.apply_action(GameAction::Select(a));
            session.apply_action(GameAction::Select(b));
            session.advance(RESOLVE_DELAY_MS);
        }
    }

    #[test]
    fn loads_record_into_state() {
        let mut store = MemoryStore::new();
        store.set(BEST_SCORE_KEY, "12").unwrap();
        store.set(BEST_TIME_KEY, r#"{"minutes":0,"seconds":40}"#).unwrap();

        let session = Session::new(two_pair_game(), store);
        assert_eq!(session.state().best_record().moves, Some(12));
        assert_eq!(
            session.state().best_record().time,
            Some(ElapsedTime::new(0, 40))
        );
    }

    #[test]
    fn completion_is_persisted() {
        let mut session = Session::new(two_pair_game(), MemoryStore::new());
        session.start();
        session.advance(CLOCK_TICK_MS * 3);
        finish(&mut session);

        assert!(matches!(
            session.take_last_event(),
            Some(CoreEvent::Completed { moves: 2, .. })
        ));
        let store = session.into_store();
        assert_eq!(store.get(BEST_SCORE_KEY).as_deref(), Some("2"));
        assert_eq!(
            store.get(BEST_TIME_KEY).as_deref(),
            Some(r#"{"minutes":0,"seconds":3}"#)
        );
    }

    #[test]
    fn slower_game_keeps_stored_time() {
        let mut store = MemoryStore::new();
        store.set(BEST_TIME_KEY, r#"{"minutes":0,"seconds":1}"#).unwrap();
        let mut session = Session::new(two_pair_game(), store);
        session.start();
        session.advance(CLOCK_TICK_MS * 5);
        finish(&mut session);

        let store = session.into_store();
        assert_eq!(store.get(BEST_SCORE_KEY).as_deref(), Some("2"));
        assert_eq!(
            store.get(BEST_TIME_KEY).as_deref(),
            Some(r#"{"minutes":0,"seconds":1}"#)
        );
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn write_failure_does_not_interrupt_game() {
        let mut session = Session::new(two_pair_game(), FailingStore);
        session.start();
        finish(&mut session);

        assert!(session.state().is_complete());
        assert_eq!(session.state().best_record().moves, Some(2));
        assert!(session.apply_action(GameAction::Restart));
        assert!(matches!(
            session.take_last_event(),
            Some(CoreEvent::Restarted { episode_id: 1 })
        ));
    }
}
