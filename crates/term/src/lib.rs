//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: the view draws a snapshot into a
//! framebuffer, the renderer diffs framebuffers and flushes the changes to
//! the terminal. No widget toolkit is involved.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Keep drawing pure so it can be tested without a terminal
//! - Share one layout between drawing and mouse hit-testing

pub mod faces;
pub mod fb;
pub mod frame_gate;
pub mod game_view;
pub mod renderer;

pub use tui_memory_core as core;
pub use tui_memory_types as types;

pub use faces::{face_for, CardFace};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use frame_gate::FrameGate;
pub use game_view::{AdapterStatusView, AnchorY, GameView, GridLayout, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
