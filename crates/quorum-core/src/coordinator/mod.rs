//! Coordinators standing between validated state and the external ports

mod signing;
mod verification;

pub use signing::{SigningCoordinator, SigningDisplay};
pub use verification::VerificationCoordinator;
