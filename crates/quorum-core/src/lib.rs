//! # Quorum Core
//!
//! Selection-validation state machine for threshold signing ceremonies.
//!
//! A ceremony has `n` participants, of whom exactly `t` sign a message while an
//! independent subset verifies it. This crate enforces the threshold-scheme
//! invariants before any cryptographic call is allowed:
//!
//! - `2 <= t <= n`, with `n` drawn from a configurable discrete domain
//! - the signer selection has exactly `t` members when signing is enabled
//! - every identity lies in `[0, n)` and appears at most once per selection
//!
//! The cryptography itself sits behind two ports: an asynchronous
//! [`SignerPort`] and a synchronous [`VerifierPort`]. The core only builds
//! requests for them and folds their answers back into state.
//!
//! ## Components
//!
//! | Component | Type |
//! |---|---|
//! | ParticipantConfig | [`ParticipantConfig`] |
//! | ThresholdConfig | [`ThresholdConfig`] |
//! | SelectionTracker | [`SelectionTracker`] |
//! | ValidationEngine | [`validation`] |
//! | SigningCoordinator | [`SigningCoordinator`] |
//! | VerificationCoordinator | [`VerificationCoordinator`] |
//!
//! [`Ceremony`] ties them together behind a single event reducer.

pub mod ceremony;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod notification;
pub mod participants;
pub mod ports;
pub mod selection;
pub mod threshold;
pub mod types;
pub mod validation;

pub use ceremony::{Ceremony, CeremonyEvent, CeremonyView, Effect, Slot};
pub use config::{CeremonyConfig, SignerCap, DEFAULT_PARTICIPANT_COUNTS, MIN_THRESHOLD};
pub use coordinator::{SigningCoordinator, SigningDisplay, VerificationCoordinator};
pub use error::{CeremonyError, PortFault, Result};
pub use notification::{Notification, NotificationKind};
pub use participants::ParticipantConfig;
pub use ports::{SignerPort, VerifierPort};
pub use selection::SelectionTracker;
pub use threshold::ThresholdConfig;
pub use types::{Message, ParticipantId, SigningRequest, SigningResult, VerificationRequest};
