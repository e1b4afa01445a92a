//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key and mouse events into [`InputAction`]s and keeps the
//! keyboard cursor on the card grid. Nothing here touches the game state; the
//! game loop turns a cursor position into a [`crate::types::GameAction`].

pub mod cursor;
pub mod map;

pub use tui_memory_types as types;

pub use cursor::GridCursor;
pub use map::{handle_key_event, handle_mouse_event, should_quit, Direction, InputAction};
