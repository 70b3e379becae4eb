//! Signing gate and verification readiness
//!
//! Both predicates are total and side-effect free. [`check_signing`] names the
//! first conjunct that fails so refusals can say why.

use crate::config::MIN_THRESHOLD;
use crate::error::{CeremonyError, Result};
use crate::types::Message;

/// Explain why signing is not permitted, if it is not
pub fn check_signing(
    participants: Option<u16>,
    threshold: Option<u16>,
    message: &Message,
    signer_count: usize,
) -> Result<()> {
    let n = match participants {
        Some(n) if n >= MIN_THRESHOLD => n,
        _ => return Err(CeremonyError::ParticipantsNotChosen),
    };
    let t = threshold.ok_or(CeremonyError::ThresholdNotChosen)?;
    if t < MIN_THRESHOLD || t > n {
        return Err(CeremonyError::ThresholdOutOfRange {
            threshold: t,
            participants: n,
        });
    }
    if message.is_blank() {
        return Err(CeremonyError::EmptyMessage);
    }
    if signer_count != t as usize || signer_count > n as usize {
        return Err(CeremonyError::SignerCountMismatch {
            selected: signer_count,
            threshold: t,
        });
    }
    Ok(())
}

/// The signing gate
pub fn can_sign(
    participants: Option<u16>,
    threshold: Option<u16>,
    message: &Message,
    signer_count: usize,
) -> bool {
    check_signing(participants, threshold, message, signer_count).is_ok()
}

/// Explain why verification is not permitted, if it is not
pub fn check_verification(message: &Message, verifier_count: usize) -> Result<()> {
    if message.is_blank() {
        return Err(CeremonyError::EmptyMessage);
    }
    if verifier_count == 0 {
        return Err(CeremonyError::NoVerifiers);
    }
    Ok(())
}

/// Verification readiness
pub fn can_verify(message: &Message, verifier_count: usize) -> bool {
    check_verification(message, verifier_count).is_ok()
}
