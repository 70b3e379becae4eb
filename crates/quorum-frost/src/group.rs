//! Distributed key generation and the two FROST signing rounds
//!
//! Participant indices are 0-based on the ceremony side; FROST identifiers
//! start at 1, so index `i` maps to identifier `i + 1`.

use std::collections::{BTreeMap, BTreeSet};

use frost_ed25519 as frost;
use frost_ed25519::keys::dkg as frost_dkg;
use rand::{CryptoRng, RngCore};
use tracing::{debug, instrument};

use crate::error::{FrostError, Result};

/// Key packages for every participant of one `t`-of-`n` group
pub struct SigningGroup {
    threshold: u16,
    participants: u16,
    key_packages: Vec<frost::keys::KeyPackage>,
    pubkey_package: frost::keys::PublicKeyPackage,
}

impl std::fmt::Debug for SigningGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningGroup")
            .field("threshold", &self.threshold)
            .field("participants", &self.participants)
            .field("key_packages", &"[REDACTED]")
            .finish()
    }
}

/// Map a 0-based participant index to a FROST identifier
pub fn identifier(index: u16) -> Result<frost::Identifier> {
    let id = index
        .checked_add(1)
        .ok_or_else(|| FrostError::Internal(format!("index {} overflows", index)))?;
    frost::Identifier::try_from(id).map_err(|e| FrostError::Internal(e.to_string()))
}

/// Round 1 packages as seen by `id`: everyone's but its own
fn received_by(
    packages: &BTreeMap<frost::Identifier, frost_dkg::round1::Package>,
    id: frost::Identifier,
) -> BTreeMap<frost::Identifier, frost_dkg::round1::Package> {
    packages
        .iter()
        .filter(|(sender, _)| **sender != id)
        .map(|(sender, package)| (*sender, package.clone()))
        .collect()
}

impl SigningGroup {
    /// Run a distributed key generation among `participants` members
    ///
    /// Every member commits to a secret polynomial and broadcasts the
    /// commitment (round 1), sends each other member a secret share
    /// (round 2), then derives its key package from what it received.
    /// No member ever holds the group secret.
    #[instrument(skip(rng))]
    pub fn generate<R: RngCore + CryptoRng>(
        threshold: u16,
        participants: u16,
        rng: &mut R,
    ) -> Result<Self> {
        if participants < 2 {
            return Err(FrostError::InvalidParticipantCount {
                min: 2,
                got: participants as usize,
            });
        }
        if threshold < 2 || threshold > participants {
            return Err(FrostError::InvalidThreshold {
                threshold: threshold as usize,
                participants: participants as usize,
            });
        }

        let ids = (0..participants)
            .map(identifier)
            .collect::<Result<Vec<_>>>()?;

        // Round 1: commitments, broadcast to everyone
        let mut round1_secrets = BTreeMap::new();
        let mut round1_packages = BTreeMap::new();
        for &id in &ids {
            let (secret, package) = frost_dkg::part1(id, participants, threshold, &mut *rng)
                .map_err(|e| FrostError::KeyGeneration(e.to_string()))?;
            round1_secrets.insert(id, secret);
            round1_packages.insert(id, package);
        }

        // Round 2: one secret share per recipient
        let mut round2_secrets = BTreeMap::new();
        let mut inboxes: BTreeMap<frost::Identifier, BTreeMap<_, frost_dkg::round2::Package>> =
            BTreeMap::new();
        for (id, secret) in round1_secrets {
            let received = received_by(&round1_packages, id);
            let (secret, outgoing) = frost_dkg::part2(secret, &received)
                .map_err(|e| FrostError::KeyGeneration(e.to_string()))?;
            round2_secrets.insert(id, secret);
            for (recipient, package) in outgoing {
                inboxes.entry(recipient).or_default().insert(id, package);
            }
        }

        // Round 3: each member derives its own key package
        let mut key_packages = Vec::with_capacity(participants as usize);
        let mut pubkey_package: Option<frost::keys::PublicKeyPackage> = None;
        for (index, &id) in ids.iter().enumerate() {
            let secret = round2_secrets
                .get(&id)
                .ok_or_else(|| FrostError::KeyGeneration(format!("Missing secret {}", index)))?;
            let received = received_by(&round1_packages, id);
            let shares = inboxes.remove(&id).unwrap_or_default();
            let (key_package, public) = frost_dkg::part3(secret, &received, &shares)
                .map_err(|e| FrostError::KeyGeneration(e.to_string()))?;

            match &pubkey_package {
                Some(agreed) if agreed.verifying_key() != public.verifying_key() => {
                    return Err(FrostError::KeyGeneration(format!(
                        "Participant {} derived a different group key",
                        index
                    )));
                }
                Some(_) => {}
                None => pubkey_package = Some(public),
            }
            key_packages.push(key_package);
        }
        let pubkey_package = pubkey_package
            .ok_or_else(|| FrostError::KeyGeneration("No key packages".to_string()))?;

        debug!(
            "Generated {}-of-{} Ed25519 key shares by DKG",
            threshold, participants
        );

        Ok(Self {
            threshold,
            participants,
            key_packages,
            pubkey_package,
        })
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn participants(&self) -> u16 {
        self.participants
    }

    /// Group verifying key as seen by participant `index`
    pub fn verifying_key_of(&self, index: u16) -> Option<frost::VerifyingKey> {
        self.key_packages
            .get(index as usize)
            .map(|kp| *kp.verifying_key())
    }

    /// Group verifying key
    pub fn verifying_key(&self) -> frost::VerifyingKey {
        *self.pubkey_package.verifying_key()
    }

    /// Check a signer list against the group parameters
    pub fn check_signers(&self, signer_indices: &[u16]) -> Result<()> {
        if signer_indices.len() != self.threshold as usize {
            return Err(FrostError::SignerCountMismatch {
                expected: self.threshold as usize,
                got: signer_indices.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for &index in signer_indices {
            if index >= self.participants {
                return Err(FrostError::InvalidIndex {
                    index,
                    participants: self.participants,
                });
            }
            if !seen.insert(index) {
                return Err(FrostError::DuplicateIndex(index));
            }
        }
        Ok(())
    }

    /// Run both signing rounds for the listed signers and aggregate
    #[instrument(skip(self, message, rng))]
    pub fn sign<R: RngCore + CryptoRng>(
        &self,
        signer_indices: &[u16],
        message: &[u8],
        rng: &mut R,
    ) -> Result<frost::Signature> {
        self.check_signers(signer_indices)?;

        // Round 1: nonces and commitments
        let mut nonces = BTreeMap::new();
        let mut commitments = BTreeMap::new();
        for &index in signer_indices {
            let key_package = &self.key_packages[index as usize];
            let (signing_nonces, signing_commitments) =
                frost::round1::commit(key_package.signing_share(), rng);
            let id = identifier(index)?;
            nonces.insert(id, signing_nonces);
            commitments.insert(id, signing_commitments);
        }

        let signing_package = frost::SigningPackage::new(commitments, message);

        // Round 2: signature shares
        let mut shares = BTreeMap::new();
        for &index in signer_indices {
            let id = identifier(index)?;
            let signing_nonces = nonces
                .get(&id)
                .ok_or_else(|| FrostError::Signing(format!("Missing nonces for {}", index)))?;
            let share = frost::round2::sign(
                &signing_package,
                signing_nonces,
                &self.key_packages[index as usize],
            )
            .map_err(|e| FrostError::Signing(e.to_string()))?;
            shares.insert(id, share);
        }

        let signature = frost::aggregate(&signing_package, &shares, &self.pubkey_package)
            .map_err(|e| FrostError::Aggregation(e.to_string()))?;

        debug!("Aggregated signature from {} shares", shares.len());
        Ok(signature)
    }
}
