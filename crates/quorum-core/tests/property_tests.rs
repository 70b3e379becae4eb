//! Property-based tests for quorum-core using proptest
//!
//! These tests verify ceremony invariants over arbitrary configurations and
//! event sequences.

use proptest::prelude::*;
use quorum_core::{
    Ceremony, CeremonyConfig, CeremonyEvent, Effect, Message, SignerCap, ThresholdConfig,
};

// ============================================
// Strategies
// ============================================

fn arb_participants() -> impl Strategy<Value = u16> {
    prop_oneof![Just(2u16), Just(3u16), Just(4u16), Just(5u16)]
}

fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[ \t]{1,3}", "[a-z ]{1,12}"]
}

fn arb_signer_cap() -> impl Strategy<Value = SignerCap> {
    prop_oneof![Just(SignerCap::ParticipantCount), Just(SignerCap::Threshold)]
}

/// Events with identities and values drawn slightly past the legal ranges
fn arb_event() -> impl Strategy<Value = CeremonyEvent> {
    prop_oneof![
        (0u16..=7).prop_map(|participants| CeremonyEvent::ParticipantCountChosen { participants }),
        (0u16..=7).prop_map(|threshold| CeremonyEvent::ThresholdChosen { threshold }),
        arb_message().prop_map(|text| CeremonyEvent::MessageChanged { text }),
        (0u16..7, any::<bool>())
            .prop_map(|(id, checked)| CeremonyEvent::SignerToggled { id, checked }),
        (0u16..7, any::<bool>())
            .prop_map(|(id, checked)| CeremonyEvent::VerifierToggled { id, checked }),
        Just(CeremonyEvent::SignRequested),
        Just(CeremonyEvent::VerifyRequested),
    ]
}

/// Ceremony with `n` chosen, optional `t`, a message and a signer subset
fn configured(
    n: u16,
    t: Option<u16>,
    message: &str,
    signer_mask: u8,
) -> (Ceremony, usize) {
    let mut ceremony = Ceremony::new(CeremonyConfig::default()).unwrap();
    ceremony.set_participant_count(n).unwrap();
    if let Some(t) = t {
        let _ = ceremony.set_threshold(t);
    }
    ceremony.set_message(message);
    for id in 0..n {
        if signer_mask & (1 << id) != 0 {
            ceremony.toggle_signer(id).unwrap();
        }
    }
    let count = ceremony.selection().signers().len();
    (ceremony, count)
}

// ============================================
// Property Tests
// ============================================

proptest! {
    // ----------------------------------------
    // Configuration Properties
    // ----------------------------------------

    #[test]
    fn threshold_domain_is_two_to_n(n in arb_participants()) {
        let domain: Vec<u16> = ThresholdConfig::domain(Some(n)).unwrap().collect();
        prop_assert_eq!(domain, (2..=n).collect::<Vec<_>>());
    }

    #[test]
    fn choosing_participants_clears_dependent_state(
        first in arb_participants(),
        second in arb_participants(),
        mask in any::<u8>(),
    ) {
        let (mut ceremony, _) = configured(first, Some(2), "m", mask);
        for id in 0..first {
            ceremony.toggle_verifier(id).unwrap();
        }

        ceremony.set_participant_count(second).unwrap();
        prop_assert_eq!(ceremony.threshold(), None);
        prop_assert!(ceremony.selection().signers().is_empty());
        prop_assert!(ceremony.selection().verifiers().is_empty());
        prop_assert_eq!(ceremony.signer_slots().len(), second as usize);
        prop_assert!(!ceremony.signing_gate());
    }

    // ----------------------------------------
    // Signing Gate Properties
    // ----------------------------------------

    #[test]
    fn gate_iff_exact_threshold(
        n in arb_participants(),
        t in prop::option::of(0u16..=6),
        message in arb_message(),
        mask in any::<u8>(),
    ) {
        let (ceremony, count) = configured(n, t, &message, mask);
        let chosen = ceremony.threshold();

        // An out-of-range threshold is refused, so only legal values stick
        if let Some(t) = chosen {
            prop_assert!((2..=n).contains(&t));
        }

        let expected = match chosen {
            Some(t) => !Message::new(message.clone()).is_blank() && count == t as usize,
            None => false,
        };
        prop_assert_eq!(ceremony.signing_gate(), expected);
    }

    #[test]
    fn verification_ignores_signing_state(
        n in arb_participants(),
        t in prop::option::of(2u16..=5),
        message in arb_message(),
        signer_mask in any::<u8>(),
        verifier_mask in any::<u8>(),
    ) {
        let (mut ceremony, _) = configured(n, t, &message, signer_mask);
        for id in 0..n {
            if verifier_mask & (1 << id) != 0 {
                ceremony.toggle_verifier(id).unwrap();
            }
        }

        let expected = !Message::new(message.clone()).is_blank()
            && !ceremony.selection().verifiers().is_empty();
        prop_assert_eq!(ceremony.verification_permitted(), expected);
    }

    // ----------------------------------------
    // Selection Properties
    // ----------------------------------------

    #[test]
    fn threshold_cap_stops_growth_at_t(
        n in arb_participants(),
        t in 2u16..=5,
        order in Just((0u16..5).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        prop_assume!(t <= n);
        let config = CeremonyConfig { signer_cap: SignerCap::Threshold, ..Default::default() };
        let mut ceremony = Ceremony::new(config).unwrap();
        ceremony.set_participant_count(n).unwrap();
        ceremony.set_threshold(t).unwrap();

        for id in order.into_iter().filter(|&id| id < n) {
            let before = ceremony.selection().signers().len();
            match ceremony.toggle_signer(id) {
                Ok(selected) => prop_assert!(selected),
                Err(_) => {
                    prop_assert_eq!(before, t as usize);
                    prop_assert!(!ceremony.selection().signers().contains(&id));
                }
            }
            prop_assert!(ceremony.selection().signers().len() <= t as usize);
        }
    }

    #[test]
    fn reasserting_members_survives_lower_threshold(
        n in arb_participants(),
        mask in any::<u8>(),
        pick in any::<u16>(),
    ) {
        let config = CeremonyConfig { signer_cap: SignerCap::Threshold, ..Default::default() };
        let mut ceremony = Ceremony::new(config).unwrap();
        ceremony.set_participant_count(n).unwrap();
        ceremony.set_threshold(n).unwrap();
        for id in 0..n {
            if mask & (1 << id) != 0 {
                ceremony.toggle_signer(id).unwrap();
            }
        }
        let selected = ceremony.selection().signer_indices();
        let k = selected.len() as u16;
        if k <= 2 {
            return Ok(());
        }
        let lowered = 2 + pick % (k - 2);

        ceremony.set_threshold(lowered).unwrap();
        for &id in &selected {
            let effects = ceremony.dispatch(CeremonyEvent::SignerToggled { id, checked: true });
            prop_assert!(effects.is_empty());
        }
        prop_assert_eq!(ceremony.selection().signer_indices(), selected);
    }

    #[test]
    fn double_toggle_restores_selection(
        n in arb_participants(),
        mask in any::<u8>(),
        id in 0u16..5,
    ) {
        prop_assume!(id < n);
        let (mut ceremony, _) = configured(n, None, "m", mask);
        let signers_before = ceremony.selection().signer_indices();
        let verifiers_before = ceremony.selection().verifier_indices();

        ceremony.toggle_signer(id).unwrap();
        ceremony.toggle_signer(id).unwrap();
        ceremony.toggle_verifier(id).unwrap();
        ceremony.toggle_verifier(id).unwrap();

        prop_assert_eq!(ceremony.selection().signer_indices(), signers_before);
        prop_assert_eq!(ceremony.selection().verifier_indices(), verifiers_before);
    }

    #[test]
    fn invariants_hold_over_event_sequences(
        cap in arb_signer_cap(),
        events in prop::collection::vec(arb_event(), 0..40),
    ) {
        let config = CeremonyConfig { signer_cap: cap, ..Default::default() };
        let mut ceremony = Ceremony::new(config).unwrap();
        let mut dispatched = 0usize;

        for event in events {
            for effect in ceremony.dispatch(event) {
                match effect {
                    Effect::DispatchSigning(request) => {
                        dispatched += 1;
                        prop_assert_eq!(request.signer_indices.len(), request.threshold as usize);
                        prop_assert!(request.threshold >= 2 && request.threshold <= request.total);
                    }
                    Effect::DispatchVerification(request) => {
                        prop_assert!(!request.verifier_indices.is_empty());
                    }
                    Effect::Notify(_) => {}
                }
            }

            let n = ceremony.participants().unwrap_or(0);
            if let Some(t) = ceremony.threshold() {
                prop_assert!(t >= 2 && t <= n);
            }
            let selection = ceremony.selection();
            prop_assert!(selection.signers().iter().all(|&id| id < n));
            prop_assert!(selection.verifiers().iter().all(|&id| id < n));
            prop_assert!(selection.signers().len() <= n as usize);
        }

        // Completions never arrive here, so at most one request is outstanding
        prop_assert!(dispatched <= 1);
    }
}
