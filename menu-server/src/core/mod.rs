//! Core Module
//!
//! Configuration, shared state, and the HTTP server loop.

pub mod config;
pub mod server;
pub mod state;

pub use config::{Config, InstanceRole};
pub use server::Server;
pub use state::ServerState;
