//! Signer and verifier ports backed by [`SigningGroup`]
//!
//! Each signing request runs a fresh key generation for its `t`-of-`n` parameters,
//! signs with the listed participants and keeps the group's public keys and
//! the signature for later verification requests.

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use frost_ed25519 as frost;
use quorum_core::{
    PortFault, SignerPort, SigningRequest, SigningResult, VerificationRequest, VerifierPort,
};
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};
use zeroize::Zeroize;

use crate::error::{FrostError, Result};
use crate::group::SigningGroup;

/// Public state kept after a successful signing
#[derive(Debug, Clone)]
struct SignedState {
    /// Group key as held by each participant, by index
    verifying_keys: Vec<frost::VerifyingKey>,
    signature: frost::Signature,
}

struct ModuleState {
    rng: Mutex<ChaCha20Rng>,
    last: RwLock<Option<SignedState>>,
}

/// FROST signing module implementing both ports
///
/// Clones share the same RNG and signed state.
#[derive(Clone)]
pub struct FrostModule {
    state: Arc<ModuleState>,
}

impl std::fmt::Debug for FrostModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrostModule")
            .field("rng", &"[REDACTED]")
            .finish()
    }
}

impl Default for FrostModule {
    fn default() -> Self {
        Self::new()
    }
}

impl FrostModule {
    /// Create a module seeded from the operating system
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::with_seed(seed)
    }

    /// Create a module with a fixed seed, for reproducible runs
    pub fn with_seed(mut seed: [u8; 32]) -> Self {
        let rng = ChaCha20Rng::from_seed(seed);
        seed.zeroize();
        Self {
            state: Arc::new(ModuleState {
                rng: Mutex::new(rng),
                last: RwLock::new(None),
            }),
        }
    }

    /// Hex of the group verifying key from the last signing, if any
    pub fn group_key_hex(&self) -> Option<String> {
        let last = self.state.last.read().ok()?;
        let state = last.as_ref()?;
        let key = state.verifying_keys.first()?;
        key.serialize().ok().map(hex::encode)
    }

    /// Sign synchronously; the async port delegates here
    pub fn sign_request(&self, request: &SigningRequest) -> Result<SigningResult> {
        let hash_hex = hex::encode(Sha256::digest(request.message.as_bytes()));

        // Parameter errors are faults; everything past them is a failed generation
        let (group, signature) = {
            let mut rng = self
                .state
                .rng
                .lock()
                .map_err(|_| FrostError::Internal("rng lock poisoned".to_string()))?;
            let group = SigningGroup::generate(request.threshold, request.total, &mut *rng)?;
            group.check_signers(&request.signer_indices)?;
            let signature = group.sign(
                &request.signer_indices,
                request.message.as_bytes(),
                &mut *rng,
            );
            (group, signature)
        };

        let signature = match signature {
            Ok(signature) => signature,
            Err(e) => {
                error!("Signature generation failed: {}", e);
                return Ok(SigningResult {
                    signature_hex: None,
                    hash_hex: Some(hash_hex),
                });
            }
        };

        let signature_hex = match signature.serialize() {
            Ok(bytes) => Some(hex::encode(bytes)),
            Err(e) => {
                error!("Signature serialization failed: {}", e);
                None
            }
        };

        let verifying_keys = (0..group.participants())
            .filter_map(|index| group.verifying_key_of(index))
            .collect();
        let mut last = self
            .state
            .last
            .write()
            .map_err(|_| FrostError::Internal("state lock poisoned".to_string()))?;
        *last = Some(SignedState {
            verifying_keys,
            signature,
        });

        info!(
            "Signed with participants {:?} ({}-of-{})",
            request.signer_indices, request.threshold, request.total
        );
        Ok(SigningResult {
            signature_hex,
            hash_hex: Some(hash_hex),
        })
    }

    /// Verify the last signature for every listed verifier
    pub fn verify_request(&self, request: &VerificationRequest) -> Result<bool> {
        if request.verifier_indices.is_empty() {
            return Err(FrostError::InvalidParticipantCount { min: 1, got: 0 });
        }

        let last = self
            .state
            .last
            .read()
            .map_err(|_| FrostError::Internal("state lock poisoned".to_string()))?;
        let Some(state) = last.as_ref() else {
            warn!("Verification requested before any signing");
            return Ok(false);
        };

        for &index in &request.verifier_indices {
            let Some(key) = state.verifying_keys.get(index as usize) else {
                warn!("Invalid participant index: {}", index);
                return Ok(false);
            };
            if key
                .verify(request.message.as_bytes(), &state.signature)
                .is_err()
            {
                warn!("Signature verification failed for participant {}", index);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl SignerPort for FrostModule {
    async fn sign(&self, request: SigningRequest) -> std::result::Result<SigningResult, PortFault> {
        // Key generation and both rounds are CPU-bound
        let module = self.clone();
        tokio::task::spawn_blocking(move || module.sign_request(&request))
            .await
            .map_err(|e| PortFault::Internal(format!("signing task failed: {}", e)))?
            .map_err(PortFault::from)
    }
}

impl VerifierPort for FrostModule {
    fn verify(&self, request: &VerificationRequest) -> std::result::Result<bool, PortFault> {
        self.verify_request(request).map_err(PortFault::from)
    }
}
