//! Network Module
//!
//! TCP listener, per-connection sessions and a blocking client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per session
//! - Requests applied to the shared Store

mod client;
mod server;
mod session;

pub use client::Client;
pub use server::{Server, ShutdownHandle};
pub use session::{dispatch, respond, Session, SessionState};
