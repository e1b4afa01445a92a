use std::hash::{Hash, Hasher};

use crate::records::BestRecord;
use crate::types::{CardValue, ElapsedTime, Phase};

/// Per-card view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardView {
    pub value: CardValue,
    /// Part of the open selection.
    pub face_up: bool,
    /// Its pair has been matched; stays revealed.
    pub cleared: bool,
    /// Selecting it right now would be ignored.
    pub disabled: bool,
}

impl CardView {
    /// Whether the face is visible to the player.
    pub fn revealed(&self) -> bool {
        self.face_up || self.cleared
    }
}

/// Final figures frozen at the moment of completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionView {
    pub moves: u32,
    pub time: ElapsedTime,
    pub new_best_moves: bool,
    pub new_best_time: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimersSnapshot {
    pub resolve_ms: Option<u32>,
    pub flip_back_ms: Option<u32>,
}

/// Outbound view state consumed by renderers and adapter clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub cards: Vec<CardView>,
    pub phase: Phase,
    pub moves: u32,
    pub elapsed: ElapsedTime,
    pub disabled: bool,
    pub pair_count: u8,
    pub cleared_pairs: u8,
    pub episode_id: u32,
    pub seed: u32,
    pub completion: Option<CompletionView>,
    pub best: BestRecord,
    pub timers: TimersSnapshot,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.cards.clear();
        self.phase = Phase::Idle;
        self.moves = 0;
        self.elapsed = ElapsedTime::ZERO;
        self.disabled = false;
        self.pair_count = 0;
        self.cleared_pairs = 0;
        self.episode_id = 0;
        self.seed = 0;
        self.completion = None;
        self.best = BestRecord::default();
        self.timers = TimersSnapshot::default();
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// Stable hash of everything a viewer can see.
    ///
    /// Used to skip redundant redraws and as the adapter's `state_hash`.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Fnv1aHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            phase: Phase::Idle,
            moves: 0,
            elapsed: ElapsedTime::ZERO,
            disabled: false,
            pair_count: 0,
            cleared_pairs: 0,
            episode_id: 0,
            seed: 0,
            completion: None,
            best: BestRecord::default(),
            timers: TimersSnapshot::default(),
        }
    }
}

/// Stable 64-bit FNV-1a hasher.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, and
/// fingerprints are sent to clients.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}
