#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quorum_core::{
    Ceremony, CeremonyConfig, CeremonyEvent, Effect, PortFault, SignerCap, SigningResult,
};

#[derive(Arbitrary, Debug)]
enum Op {
    Participants(u16),
    Threshold(u16),
    Message(String),
    Signer(u16, bool),
    Verifier(u16, bool),
    Sign,
    Verify,
    SigningDone { signature: bool, hash: bool, fault: bool },
    VerificationDone { valid: bool, fault: bool },
}

impl Op {
    fn into_event(self) -> CeremonyEvent {
        match self {
            Op::Participants(participants) => {
                CeremonyEvent::ParticipantCountChosen { participants }
            }
            Op::Threshold(threshold) => CeremonyEvent::ThresholdChosen { threshold },
            Op::Message(text) => CeremonyEvent::MessageChanged { text },
            Op::Signer(id, checked) => CeremonyEvent::SignerToggled { id, checked },
            Op::Verifier(id, checked) => CeremonyEvent::VerifierToggled { id, checked },
            Op::Sign => CeremonyEvent::SignRequested,
            Op::Verify => CeremonyEvent::VerifyRequested,
            Op::SigningDone { signature, hash, fault } => CeremonyEvent::SigningCompleted {
                outcome: if fault {
                    Err(PortFault::Internal("fuzz".to_string()))
                } else {
                    Ok(SigningResult {
                        signature_hex: signature.then(|| "ab".repeat(64)),
                        hash_hex: hash.then(|| "cd".repeat(32)),
                    })
                },
            },
            Op::VerificationDone { valid, fault } => CeremonyEvent::VerificationCompleted {
                outcome: if fault {
                    Err(PortFault::Unavailable("fuzz".to_string()))
                } else {
                    Ok(valid)
                },
            },
        }
    }
}

fuzz_target!(|input: (bool, Vec<Op>)| {
    let (threshold_cap, ops) = input;
    let config = CeremonyConfig {
        signer_cap: if threshold_cap {
            SignerCap::Threshold
        } else {
            SignerCap::ParticipantCount
        },
        ..Default::default()
    };
    let Ok(mut ceremony) = Ceremony::new(config) else {
        return;
    };

    for op in ops {
        for effect in ceremony.dispatch(op.into_event()) {
            match effect {
                Effect::DispatchSigning(request) => {
                    assert_eq!(request.signer_indices.len(), request.threshold as usize);
                    assert!(request.threshold >= 2 && request.threshold <= request.total);
                    assert!(!request.message.trim().is_empty());
                }
                Effect::DispatchVerification(request) => {
                    assert!(!request.verifier_indices.is_empty());
                    assert!(!request.message.trim().is_empty());
                }
                Effect::Notify(_) => {}
            }
        }

        // Selections never reference a slot that does not exist
        let n = ceremony.participants().unwrap_or(0);
        if let Some(t) = ceremony.threshold() {
            assert!(t >= 2 && t <= n);
        }
        assert!(ceremony.selection().signers().iter().all(|&id| id < n));
        assert!(ceremony.selection().verifiers().iter().all(|&id| id < n));

        let view = ceremony.view();
        assert_eq!(view.signing_gate_enabled, ceremony.signing_gate());
        if let Some(display) = view.signing_result {
            assert!(!display.signature.is_empty());
            assert!(!display.hash.is_empty());
        }
    }
});
