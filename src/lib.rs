//! Causerie is a terminal-first broadcast chat: a small relay fans every
//! message out to all connected participants, and each participant runs a
//! full-screen client that keeps its link alive across network interruptions.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the wire message schema, the bounded scrollback buffer,
//!   configuration, and client runtime state.
//! - [`relay`] implements the broadcast relay: websocket accept loop, client
//!   registry, and failure-isolated fan-out.
//! - [`link`] runs the client's two independent reconnecting links to the
//!   relay (one send-side, one receive-side).
//! - [`commands`] implements slash-command parsing and the pipeline stage
//!   that diverts recognized submissions through a generation backend.
//! - [`api`] defines the generation backend payloads and HTTP adapter.
//! - [`ui`] renders the terminal interface.
//!
//! Runtime entrypoints are the client binary (`src/main.rs`) and the relay
//! binary (`src/bin/causerie-relay.rs`).

pub mod api;
pub mod commands;
pub mod core;
pub mod link;
pub mod logging;
pub mod relay;
pub mod ui;
pub mod utils;
