//! # Quorum FROST
//!
//! FROST (Flexible Round-Optimized Schnorr Threshold) backend for the quorum
//! signer and verifier ports, using the Ed25519 cipher suite.
//!
//! ## Signing flow
//!
//! ```text
//! SigningRequest{t, n, message, signers}
//!        │
//!        ├─► DKG part 1: commitments          (every participant)
//!        ├─► DKG part 2: secret shares         (pairwise)
//!        ├─► DKG part 3: key packages          (group key must agree)
//!        ├─► round 1: nonces + commitments     (listed signers only)
//!        ├─► round 2: signature shares
//!        └─► aggregate ──► SigningResult{signatureHex, hashHex}
//! ```
//!
//! The module keeps the group's verifying keys and the aggregated signature
//! so a later [`VerificationRequest`](quorum_core::VerificationRequest) can be
//! checked by each listed verifier.

pub mod error;
pub mod group;
pub mod module;

pub use error::{FrostError, Result};
pub use group::SigningGroup;
pub use module::FrostModule;
