//! Best-record tracking and its persisted form.
//!
//! Records are stored through [`KeyValueStore`], a string-keyed port. Two keys
//! are used: `bestScore` holds the move count as a JSON number and `bestTime`
//! holds `{"minutes":m,"seconds":s}`. Missing or malformed entries fall back
//! to "no record" instead of failing the game.

use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};

use crate::types::{ElapsedTime, DEFAULT_BEST_TIME};

pub const BEST_SCORE_KEY: &str = "bestScore";
pub const BEST_TIME_KEY: &str = "bestTime";

/// Durable string-keyed storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        (**self).set(key, value)
    }
}

/// Wire form of [`ElapsedTime`] under `bestTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTime {
    pub minutes: u32,
    pub seconds: u8,
}

impl From<ElapsedTime> for StoredTime {
    fn from(t: ElapsedTime) -> Self {
        Self {
            minutes: t.minutes,
            seconds: t.seconds,
        }
    }
}

impl From<StoredTime> for ElapsedTime {
    fn from(t: StoredTime) -> Self {
        ElapsedTime::new(t.minutes, t.seconds)
    }
}

/// Historical best move count and best time.
///
/// `None` means nothing has been recorded: moves compare as +infinity and the
/// time compares as 99:59.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BestRecord {
    pub moves: Option<u32>,
    pub time: Option<ElapsedTime>,
}

/// What changed when a finished game was folded into the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub moves_improved: bool,
    pub time_improved: bool,
}

impl BestRecord {
    /// Time a finished game has to beat.
    pub fn effective_time(&self) -> ElapsedTime {
        self.time.unwrap_or(DEFAULT_BEST_TIME)
    }

    /// Fold a finished game into the record.
    ///
    /// Moves become `min(moves, best)`. The time is replaced only when strictly
    /// faster than the current best (or 99:59 when none).
    pub fn record_completion(&mut self, moves: u32, time: ElapsedTime) -> RecordUpdate {
        let moves_improved = self.moves.map_or(true, |best| moves < best);
        self.moves = Some(self.moves.map_or(moves, |best| best.min(moves)));

        let time_improved = time.is_faster_than(self.effective_time());
        if time_improved {
            self.time = Some(time);
        }

        RecordUpdate {
            moves_improved,
            time_improved,
        }
    }

    /// Read both entries; unreadable entries count as absent.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let moves = store.get(BEST_SCORE_KEY).and_then(|raw| {
            let parsed = serde_json::from_str::<u32>(raw.trim()).ok();
            if parsed.is_none() {
                log::warn!("ignoring malformed {} entry: {:?}", BEST_SCORE_KEY, raw);
            }
            parsed
        });

        let time = store.get(BEST_TIME_KEY).and_then(|raw| {
            let parsed = serde_json::from_str::<StoredTime>(&raw)
                .ok()
                .filter(|t| t.seconds < 60)
                .map(ElapsedTime::from);
            if parsed.is_none() {
                log::warn!("ignoring malformed {} entry: {:?}", BEST_TIME_KEY, raw);
            }
            parsed
        });

        Self { moves, time }
    }

    /// Persist after a completion: the move count is always written, the
    /// time only when it improved.
    pub fn save_completion<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        update: RecordUpdate,
    ) -> io::Result<()> {
        if let Some(moves) = self.moves {
            store.set(BEST_SCORE_KEY, &moves.to_string())?;
        }
        if update.time_improved {
            if let Some(time) = self.time {
                let json = serde_json::to_string(&StoredTime::from(time))?;
                store.set(BEST_TIME_KEY, &json)?;
            }
        }
        Ok(())
    }
}
