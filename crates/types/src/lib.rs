//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, adapter protocol).
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FRAME_MS` | 16 | Fixed timestep of the game loop (~60 FPS) |
//! | `CLOCK_TICK_MS` | 1000 | One tick of the elapsed-time clock |
//! | `RESOLVE_DELAY_MS` | 300 | Both faces stay visible before a pair is resolved |
//! | `MISMATCH_DELAY_MS` | 500 | A mismatched pair stays face-up before flipping back |
//!
//! # Examples
//!
//! ```
//! use tui_memory_types::{ElapsedTime, GameAction};
//!
//! let mut t = ElapsedTime::new(0, 59);
//! t.tick();
//! assert_eq!(t, ElapsedTime::new(1, 0));
//!
//! assert_eq!(GameAction::parse("select", Some(3)), Some(GameAction::Select(3)));
//! assert_eq!(GameAction::parse("restart", None), Some(GameAction::Restart));
//! ```

use std::fmt;

/// Fixed timestep interval of the game loop in milliseconds (16ms ≈ 60 FPS)
pub const FRAME_MS: u32 = 16;

/// Interval of the elapsed-time clock (one second)
pub const CLOCK_TICK_MS: u32 = 1000;

/// Delay between the second pick and pair resolution
pub const RESOLVE_DELAY_MS: u32 = 300;

/// Delay before a mismatched pair is turned face-down again
pub const MISMATCH_DELAY_MS: u32 = 500;

/// Number of distinct card values on a default board (4x4 grid)
pub const DEFAULT_PAIR_COUNT: u8 = 8;

/// Smallest supported board
pub const MIN_PAIR_COUNT: u8 = 2;

/// Largest supported board
pub const MAX_PAIR_COUNT: u8 = 16;

/// Best time assumed when no best time has been recorded yet (99:59)
pub const DEFAULT_BEST_TIME: ElapsedTime = ElapsedTime {
    minutes: 99,
    seconds: 59,
};

/// Columns of the card grid for `card_count` cards: the smallest square that
/// holds them all (16 cards lay out as 4x4).
pub fn grid_columns(card_count: usize) -> usize {
    let mut cols = 1;
    while cols * cols < card_count {
        cols += 1;
    }
    cols
}

/// Identifier of a card face.
///
/// A deck holds every value exactly twice. The meaning of a value (its name and
/// glyph) is decided by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardValue(pub u8);

impl CardValue {
    /// The first `count` values: `CardValue(0)..CardValue(count - 1)`.
    pub fn first_n(count: u8) -> Vec<CardValue> {
        (0..count).map(CardValue).collect()
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Elapsed wall time in whole minutes and seconds.
///
/// The derived ordering compares minutes first, then seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElapsedTime {
    pub minutes: u32,
    pub seconds: u8,
}

impl ElapsedTime {
    pub const ZERO: ElapsedTime = ElapsedTime {
        minutes: 0,
        seconds: 0,
    };

    pub const fn new(minutes: u32, seconds: u8) -> Self {
        Self { minutes, seconds }
    }

    /// Advance by one second, carrying into minutes past 59.
    pub fn tick(&mut self) {
        let seconds = self.seconds as u32 + 1;
        self.minutes = self.minutes.saturating_add(seconds / 60);
        self.seconds = (seconds % 60) as u8;
    }

    /// Strictly less on minutes, or equal minutes and strictly less on seconds.
    pub fn is_faster_than(self, other: ElapsedTime) -> bool {
        self < other
    }

    pub fn total_seconds(self) -> u64 {
        self.minutes as u64 * 60 + self.seconds as u64
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Inbound events that change the game state.
///
/// Used by the terminal front end and by adapter clients alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Reveal the card at a deck index
    Select(usize),
    /// Reshuffle and start over
    Restart,
}

impl GameAction {
    /// Parse an action name (case-insensitive) plus optional card index.
    ///
    /// `select` requires an index; `restart` ignores it.
    pub fn parse(name: &str, index: Option<usize>) -> Option<Self> {
        if name.eq_ignore_ascii_case("select") {
            index.map(GameAction::Select)
        } else if name.eq_ignore_ascii_case("restart") {
            Some(GameAction::Restart)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Select(_) => "select",
            GameAction::Restart => "restart",
        }
    }
}

/// Where the state machine is within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created but not started; selections are ignored
    Idle,
    /// No card face-up
    AwaitingFirstPick,
    /// One card face-up
    AwaitingSecondPick,
    /// Two cards face-up, input disabled until the pair is resolved
    Resolving,
    /// A mismatched pair is still visible; a new pick starts the next round
    ShowingMismatch,
    /// Every pair has been cleared
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::AwaitingFirstPick => "awaiting_first_pick",
            Phase::AwaitingSecondPick => "awaiting_second_pick",
            Phase::Resolving => "resolving",
            Phase::ShowingMismatch => "showing_mismatch",
            Phase::Completed => "completed",
        }
    }
}

/// Core-side event emitted by a transition.
///
/// Observers (the session controller, the adapter) consume it with
/// `take_last_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreEvent {
    Matched {
        value: CardValue,
        first: usize,
        second: usize,
    },
    Mismatched {
        first: usize,
        second: usize,
    },
    Completed {
        moves: u32,
        time: ElapsedTime,
        new_best_moves: bool,
        new_best_time: bool,
    },
    Restarted {
        episode_id: u32,
    },
}

impl CoreEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoreEvent::Matched { .. } => "matched",
            CoreEvent::Mismatched { .. } => "mismatched",
            CoreEvent::Completed { .. } => "completed",
            CoreEvent::Restarted { .. } => "restarted",
        }
    }
}
