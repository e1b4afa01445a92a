//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the rules of the card-matching game and nothing else.
//! It has no dependencies on UI, networking, or the filesystem:
//!
//! - **Deterministic**: the same seed produces the same deck order
//! - **Clock-driven**: deferred actions advance only when the owner advances the game
//! - **Portable**: the terminal front end and the adapter drive the same state machine
//!
//! # Module Structure
//!
//! - [`deck`]: paired, shuffled deck generation
//! - [`game_state`]: the state machine (selection, resolution, clock, restart)
//! - [`records`]: best-record comparison and the [`KeyValueStore`] port
//! - [`rng`]: seeded LCG with Fisher-Yates shuffling
//! - [`schedule`]: cancellable one-shot countdowns
//! - [`session`]: game state bound to a record store
//! - [`snapshot`]: read-only view for renderers and adapter clients
//!
//! # Rules
//!
//! - Picking a second card counts one move and locks input for 300ms
//! - A matching pair is cleared; a mismatched pair stays visible for 500ms
//! - Picking a new card while a mismatch is visible starts the next round at once
//! - The game is complete when every value has been cleared
//! - Best moves and best time are tracked across games
//!
//! # Example
//!
//! ```
//! use tui_memory_core::{Deck, GameState};
//! use tui_memory_types::{CardValue, GameAction, Phase, RESOLVE_DELAY_MS};
//!
//! let v = CardValue;
//! let mut game = GameState::from_deck(7, Deck::from_cards(vec![v(0), v(1), v(1), v(0)]));
//! game.start();
//!
//! game.apply_action(GameAction::Select(1));
//! game.apply_action(GameAction::Select(2));
//! assert_eq!(game.moves(), 1);
//! assert_eq!(game.phase(), Phase::Resolving);
//!
//! game.advance(RESOLVE_DELAY_MS);
//! assert!(game.is_cleared(CardValue(1)));
//! ```

pub mod deck;
pub mod game_state;
pub mod records;
pub mod rng;
pub mod schedule;
pub mod session;
pub mod snapshot;

pub use tui_memory_types as types;

// Re-export commonly used types for convenience
pub use deck::Deck;
pub use game_state::GameState;
pub use records::{BestRecord, KeyValueStore, MemoryStore, RecordUpdate};
pub use rng::SimpleRng;
pub use session::Session;
pub use snapshot::{CardView, CompletionView, GameSnapshot, TimersSnapshot};
