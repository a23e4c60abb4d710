//! # Keyrack
//!
//! A minimal networked key-value store:
//! - Shared in-memory string map, safe under concurrent sessions
//! - Length-framed binary protocol with data-only packet records
//! - One session thread per TCP connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Listener                              │
//! │             (accept, assign session id, spawn)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Session (per connection)                    │
//! │          read frame → decode → dispatch → respond            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!                ┌─────────────┐
//!                │    Store    │
//!                │   (Mutex)   │
//!                └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DecodeError, KeyrackError, Result};
pub use config::Config;
pub use store::Store;
pub use network::{Client, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Keyrack
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
