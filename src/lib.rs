//! TUI Memory (workspace facade crate).
//!
//! Re-exports the workspace crates as `tui_memory::{core,adapter,store,term,input,types}`
//! and hosts the binary's environment configuration.

pub mod config;

pub use tui_memory_adapter as adapter;
pub use tui_memory_core as core;
pub use tui_memory_input as input;
pub use tui_memory_store as store;
pub use tui_memory_term as term;
pub use tui_memory_types as types;

pub use config::AppConfig;
