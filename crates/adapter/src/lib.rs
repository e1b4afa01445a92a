//! Adapter module - external control via TCP socket with JSON protocol
//!
//! Lets an external agent (a bot, a test harness, a second screen) watch and
//! play the game over a local socket.
//!
//! # Protocol Overview
//!
//! Line-delimited JSON over TCP:
//!
//! 1. **Connection**: client connects (default: 127.0.0.1:7788)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`
//! 3. **Controller Assignment**: the first client that does not ask to
//!    observe becomes the controller; when it leaves, the lowest-id
//!    remaining client takes over
//! 4. **Observation Streaming**: streaming clients get an observation after
//!    the handshake and whenever the visible state changes
//! 5. **Commanding**: the controller sends `select` or `restart`
//!
//! Every client numbers its messages with a strictly increasing `seq`.
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: client info, protocol version, requested capabilities
//! - **command**: `{"action":"select","index":3}` or `{"action":"restart"}`
//!
//! ## Server → Client
//!
//! - **welcome**: assigned role, controller id, capabilities
//! - **observation**: visible game state; face-down cards carry no value
//! - **ack**: the command reached the game loop (`applied` says whether the
//!   game state accepted it)
//! - **error**: `handshake_required`, `protocol_mismatch`, `not_controller`,
//!   `invalid_command` or `backpressure`
//!
//! # Environment Variables
//!
//! - `MEMORY_ADAPTER_HOST`: bind address (default: "127.0.0.1")
//! - `MEMORY_ADAPTER_PORT`: port number (default: 7788)
//! - `MEMORY_ADAPTER_MAX_PENDING`: queued commands before `backpressure` (default: 10)
//! - `MEMORY_ADAPTER_DISABLED`: "1" or "true" disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":2,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,...}
//! Server -> Client: {"type":"observation","seq":1,"ts":3,"phase":"awaiting_first_pick","cards":[...],...}
//! Client -> Server: {"type":"command","seq":2,"ts":4,"action":"select","index":0}
//! Server -> Client: {"type":"ack","seq":2,"ts":5,"status":"ok","applied":true}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_memory_core as core;
pub use tui_memory_types as types;

pub use protocol::*;
pub use runtime::{
    Adapter, AdapterStatus, InboundCommand, InboundPayload, ObservationFeed, OutboundMessage,
};
pub use server::{
    build_observation, run_server, run_server_with_status, ServerConfig, DEFAULT_PORT,
};
