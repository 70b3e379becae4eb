//! Quorum Session - event loop for a threshold signing ceremony
//!
//! This crate provides:
//! - A single-writer loop that owns the ceremony state
//! - Off-loop execution of the signer and verifier ports
//! - A handle for submitting events and observing notifications and views
//! - Session configuration persisted as JSON

pub mod config;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::{CeremonySession, SessionCommand, SessionHandle, SessionOutput};
