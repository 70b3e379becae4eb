//! Boundaries toward the external cryptographic module
//!
//! The core never performs cryptography. A [`SignerPort`] completes
//! asynchronously; a [`VerifierPort`] answers synchronously and may block.

use async_trait::async_trait;

use crate::error::PortFault;
use crate::types::{SigningRequest, SigningResult, VerificationRequest};

/// Asynchronous signing module
#[async_trait]
pub trait SignerPort: Send + Sync {
    /// Produce a signature over `request.message` with the listed signers
    ///
    /// A missing signature or hash in the result is a valid outcome; `Err`
    /// is reserved for requests the module could not process at all.
    async fn sign(&self, request: SigningRequest) -> Result<SigningResult, PortFault>;
}

/// Synchronous verification module
pub trait VerifierPort: Send + Sync {
    /// Check the last signature against `request.message` for every verifier
    fn verify(&self, request: &VerificationRequest) -> Result<bool, PortFault>;
}

#[async_trait]
impl<T: SignerPort + ?Sized> SignerPort for std::sync::Arc<T> {
    async fn sign(&self, request: SigningRequest) -> Result<SigningResult, PortFault> {
        (**self).sign(request).await
    }
}

impl<T: VerifierPort + ?Sized> VerifierPort for std::sync::Arc<T> {
    fn verify(&self, request: &VerificationRequest) -> Result<bool, PortFault> {
        (**self).verify(request)
    }
}
