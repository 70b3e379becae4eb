//! Ceremony state machine
//!
//! A [`Ceremony`] owns every piece of configuration and selection state and
//! is driven through a single entry point, [`Ceremony::dispatch`], which takes
//! a tagged [`CeremonyEvent`] and returns the [`Effect`]s the caller must carry
//! out. The signing gate is recomputed after every event.
//!
//! ```text
//! UI event ──► dispatch ──► mutate config / selection ──► revalidate gate
//!                 │
//!                 ├──► Effect::Notify
//!                 ├──► Effect::DispatchSigning      ──► SignerPort (async)
//!                 └──► Effect::DispatchVerification ──► VerifierPort (blocking)
//!
//! completion ──► dispatch(SigningCompleted | VerificationCompleted)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{CeremonyConfig, SignerCap};
use crate::coordinator::{SigningCoordinator, SigningDisplay, VerificationCoordinator};
use crate::error::{PortFault, Result};
use crate::notification::Notification;
use crate::participants::ParticipantConfig;
use crate::selection::SelectionTracker;
use crate::threshold::ThresholdConfig;
use crate::types::{Message, ParticipantId, SigningRequest, SigningResult, VerificationRequest};
use crate::validation;

/// Inbound events, from the presentation layer or from port completions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CeremonyEvent {
    /// Participant count chosen
    ParticipantCountChosen { participants: u16 },
    /// Threshold chosen
    ThresholdChosen { threshold: u16 },
    /// Message edited
    MessageChanged { text: String },
    /// Signer slot checked or unchecked
    SignerToggled { id: ParticipantId, checked: bool },
    /// Verifier slot checked or unchecked
    VerifierToggled { id: ParticipantId, checked: bool },
    /// Signing action triggered
    SignRequested,
    /// Verification action triggered
    VerifyRequested,
    /// Signing module completion
    SigningCompleted {
        outcome: std::result::Result<SigningResult, PortFault>,
    },
    /// Verification module answer
    VerificationCompleted {
        outcome: std::result::Result<bool, PortFault>,
    },
}

/// Work the caller must carry out after a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a transient notification
    Notify(Notification),
    /// Hand the request to the signing module
    DispatchSigning(SigningRequest),
    /// Hand the request to the verification module
    DispatchVerification(VerificationRequest),
}

/// A candidate slot for the signer or verifier lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: ParticipantId,
    pub label: String,
    pub checked: bool,
}

/// Derived state consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyView {
    pub participants: Option<u16>,
    pub participant_domain: Vec<u16>,
    pub threshold: Option<u16>,
    pub threshold_domain: Vec<u16>,
    pub message: String,
    pub signers: Vec<ParticipantId>,
    pub verifiers: Vec<ParticipantId>,
    pub signing_gate_enabled: bool,
    pub verification_permitted: bool,
    pub signing_pending: bool,
    pub signing_result: Option<SigningDisplay>,
    pub verification_pending: bool,
    pub verification_result: Option<bool>,
}

/// One ceremony configuration and its outcomes
#[derive(Debug, Clone)]
pub struct Ceremony {
    config: CeremonyConfig,
    participants: ParticipantConfig,
    threshold: ThresholdConfig,
    selection: SelectionTracker,
    message: Message,
    signing: SigningCoordinator,
    verification: VerificationCoordinator,
    gate: bool,
}

impl Ceremony {
    /// Create a ceremony with nothing chosen yet
    pub fn new(config: CeremonyConfig) -> Result<Self> {
        config.validate()?;
        let participants = ParticipantConfig::new(&config.supported_participant_counts);
        Ok(Self {
            config,
            participants,
            threshold: ThresholdConfig::new(),
            selection: SelectionTracker::new(),
            message: Message::default(),
            signing: SigningCoordinator::new(),
            verification: VerificationCoordinator::new(),
            gate: false,
        })
    }

    /// Apply one event and return the effects it produces
    pub fn dispatch(&mut self, event: CeremonyEvent) -> Vec<Effect> {
        debug!(?event, "Dispatching ceremony event");
        let mut effects = Vec::new();

        match event {
            CeremonyEvent::ParticipantCountChosen { participants } => {
                refuse_on_err(&mut effects, self.set_participant_count(participants));
            }
            CeremonyEvent::ThresholdChosen { threshold } => {
                refuse_on_err(&mut effects, self.set_threshold(threshold));
            }
            CeremonyEvent::MessageChanged { text } => self.set_message(text),
            CeremonyEvent::SignerToggled { id, checked } => {
                refuse_on_err(&mut effects, self.set_signer(id, checked));
            }
            CeremonyEvent::VerifierToggled { id, checked } => {
                refuse_on_err(&mut effects, self.set_verifier(id, checked));
            }
            CeremonyEvent::SignRequested => match self.request_signing() {
                Ok(request) => {
                    effects.push(Effect::Notify(Notification::info(format!(
                        "Signing triggered with participants: {:?}",
                        request.signer_indices
                    ))));
                    effects.push(Effect::DispatchSigning(request));
                }
                Err(e) => effects.push(Effect::Notify(Notification::refusal(&e))),
            },
            CeremonyEvent::VerifyRequested => match self.request_verification() {
                Ok(request) => effects.push(Effect::DispatchVerification(request)),
                Err(e) => effects.push(Effect::Notify(Notification::refusal(&e))),
            },
            CeremonyEvent::SigningCompleted { outcome } => {
                if let Some(note) = self.complete_signing(outcome) {
                    effects.push(Effect::Notify(note));
                }
            }
            CeremonyEvent::VerificationCompleted { outcome } => {
                effects.push(Effect::Notify(self.complete_verification(outcome)));
            }
        }

        effects
    }

    /// Choose `n`: clears threshold and both selections, materializes `n` slots
    pub fn set_participant_count(&mut self, participants: u16) -> Result<()> {
        self.participants.set_count(participants)?;
        self.threshold.clear();
        self.selection.reset(participants);
        self.revalidate();
        Ok(())
    }

    /// Choose `t` within `[2, n]`; selections are kept
    pub fn set_threshold(&mut self, threshold: u16) -> Result<()> {
        self.threshold.set(self.participants.count(), threshold)?;
        self.revalidate();
        Ok(())
    }

    /// Replace the message text
    pub fn set_message(&mut self, text: impl Into<Message>) {
        self.message = text.into();
        self.revalidate();
    }

    /// Flip signer membership; returns whether `id` is now selected
    pub fn toggle_signer(&mut self, id: ParticipantId) -> Result<bool> {
        let cap = self.signer_cap();
        let result = self.selection.toggle_signer(id, cap);
        self.revalidate();
        result
    }

    /// Set signer membership explicitly
    pub fn set_signer(&mut self, id: ParticipantId, checked: bool) -> Result<()> {
        let cap = self.signer_cap();
        let result = self.selection.set_signer(id, checked, cap);
        self.revalidate();
        result
    }

    /// Flip verifier membership; returns whether `id` is now selected
    pub fn toggle_verifier(&mut self, id: ParticipantId) -> Result<bool> {
        self.selection.toggle_verifier(id)
    }

    /// Set verifier membership explicitly
    pub fn set_verifier(&mut self, id: ParticipantId, checked: bool) -> Result<()> {
        self.selection.set_verifier(id, checked)
    }

    /// Build a signing request from current state
    pub fn request_signing(&mut self) -> Result<SigningRequest> {
        let result = self.signing.request(
            &self.participants,
            &self.threshold,
            &self.message,
            &self.selection,
        );
        if let Err(e) = &result {
            warn!("Signing refused: {}", e);
        }
        result
    }

    /// Build a verification request from current state
    pub fn request_verification(&mut self) -> Result<VerificationRequest> {
        let result = self.verification.request(&self.message, &self.selection);
        if let Err(e) = &result {
            warn!("Verification refused: {}", e);
        }
        result
    }

    /// Fold a signing completion back into state
    pub fn complete_signing(
        &mut self,
        outcome: std::result::Result<SigningResult, PortFault>,
    ) -> Option<Notification> {
        self.signing.complete(outcome, &self.config)
    }

    /// Fold a verification answer back into state
    pub fn complete_verification(
        &mut self,
        outcome: std::result::Result<bool, PortFault>,
    ) -> Notification {
        self.verification.complete(outcome)
    }

    /// Whether the signing action is enabled
    pub fn signing_gate(&self) -> bool {
        self.gate
    }

    /// Whether the verification action is permitted
    pub fn verification_permitted(&self) -> bool {
        validation::can_verify(&self.message, self.selection.verifiers().len())
    }

    pub fn config(&self) -> &CeremonyConfig {
        &self.config
    }

    pub fn participants(&self) -> Option<u16> {
        self.participants.count()
    }

    pub fn threshold(&self) -> Option<u16> {
        self.threshold.get()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn signing(&self) -> &SigningCoordinator {
        &self.signing
    }

    pub fn verification(&self) -> &VerificationCoordinator {
        &self.verification
    }

    /// Signer candidates, labelled `Participant 1..=n`
    pub fn signer_slots(&self) -> Vec<Slot> {
        self.participants
            .identities()
            .map(|id| Slot {
                id,
                label: format!("Participant {}", id + 1),
                checked: self.selection.signers().contains(&id),
            })
            .collect()
    }

    /// Verifier candidates, labelled `Verifier 1..=n`
    pub fn verifier_slots(&self) -> Vec<Slot> {
        self.participants
            .identities()
            .map(|id| Slot {
                id,
                label: format!("Verifier {}", id + 1),
                checked: self.selection.verifiers().contains(&id),
            })
            .collect()
    }

    /// Snapshot of everything the presentation layer shows
    pub fn view(&self) -> CeremonyView {
        CeremonyView {
            participants: self.participants.count(),
            participant_domain: self.participants.domain().to_vec(),
            threshold: self.threshold.get(),
            threshold_domain: ThresholdConfig::domain(self.participants.count())
                .map(|d| d.collect())
                .unwrap_or_default(),
            message: self.message.as_str().to_string(),
            signers: self.selection.signer_indices(),
            verifiers: self.selection.verifier_indices(),
            signing_gate_enabled: self.gate,
            verification_permitted: self.verification_permitted(),
            signing_pending: self.signing.is_pending(),
            signing_result: self.signing.display().cloned(),
            verification_pending: self.verification.is_pending(),
            verification_result: self.verification.last_result(),
        }
    }

    fn signer_cap(&self) -> u16 {
        let n = self.participants.count().unwrap_or(0);
        match self.config.signer_cap {
            SignerCap::ParticipantCount => n,
            SignerCap::Threshold => self.threshold.get().unwrap_or(n),
        }
    }

    fn revalidate(&mut self) {
        self.gate = validation::can_sign(
            self.participants.count(),
            self.threshold.get(),
            &self.message,
            self.selection.signers().len(),
        );
        debug!(gate = self.gate, "Signing gate recomputed");
    }
}

fn refuse_on_err(effects: &mut Vec<Effect>, result: Result<()>) {
    if let Err(e) = result {
        warn!("Refused: {}", e);
        effects.push(Effect::Notify(Notification::refusal(&e)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CeremonyError;
    use crate::notification::NotificationKind;

    fn ceremony() -> Ceremony {
        Ceremony::new(CeremonyConfig::default()).unwrap()
    }

    fn run(ceremony: &mut Ceremony, events: Vec<CeremonyEvent>) -> Vec<Effect> {
        events
            .into_iter()
            .flat_map(|event| ceremony.dispatch(event))
            .collect()
    }

    fn signer(id: ParticipantId) -> CeremonyEvent {
        CeremonyEvent::SignerToggled { id, checked: true }
    }

    fn refusals(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Notify(n) if n.kind == NotificationKind::Refusal => Some(n.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scenario_gate_open_and_request() {
        let mut c = ceremony();
        run(
            &mut c,
            vec![
                CeremonyEvent::ParticipantCountChosen { participants: 3 },
                CeremonyEvent::ThresholdChosen { threshold: 2 },
                CeremonyEvent::MessageChanged {
                    text: "hi".to_string(),
                },
                signer(0),
                signer(1),
            ],
        );
        assert!(c.signing_gate());

        let effects = c.dispatch(CeremonyEvent::SignRequested);
        assert_eq!(
            effects.last(),
            Some(&Effect::DispatchSigning(SigningRequest {
                threshold: 2,
                total: 3,
                message: "hi".to_string(),
                signer_indices: vec![0, 1],
            }))
        );
        assert!(c.view().signing_pending);
    }

    #[test]
    fn test_scenario_overshoot_within_cap() {
        let mut c = ceremony();
        let effects = run(
            &mut c,
            vec![
                CeremonyEvent::ParticipantCountChosen { participants: 3 },
                CeremonyEvent::ThresholdChosen { threshold: 2 },
                CeremonyEvent::MessageChanged {
                    text: "hi".to_string(),
                },
                signer(0),
                signer(1),
                signer(2),
            ],
        );
        assert!(refusals(&effects).is_empty());
        assert_eq!(c.selection().signer_indices(), vec![0, 1, 2]);
        assert!(!c.signing_gate());
    }

    #[test]
    fn test_scenario_threshold_required() {
        let mut c = ceremony();
        run(
            &mut c,
            vec![
                CeremonyEvent::ParticipantCountChosen { participants: 2 },
                CeremonyEvent::MessageChanged {
                    text: "m".to_string(),
                },
                signer(0),
                signer(1),
            ],
        );
        assert!(!c.signing_gate());

        c.dispatch(CeremonyEvent::ThresholdChosen { threshold: 2 });
        assert!(c.signing_gate());
    }

    #[test]
    fn test_scenario_verification_without_verifiers() {
        let mut c = ceremony();
        c.set_participant_count(3).unwrap();
        c.set_message("m");

        let effects = c.dispatch(CeremonyEvent::VerifyRequested);
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::refusal(&CeremonyError::NoVerifiers))]
        );
        assert_eq!(c.view().verification_result, None);
    }

    #[test]
    fn test_threshold_before_participants() {
        let mut c = ceremony();
        let effects = c.dispatch(CeremonyEvent::ThresholdChosen { threshold: 2 });
        assert_eq!(refusals(&effects), vec!["Please select participants first"]);
        assert_eq!(c.threshold(), None);
    }

    #[test]
    fn test_participant_change_resets() {
        let mut c = ceremony();
        c.set_participant_count(4).unwrap();
        c.set_threshold(3).unwrap();
        c.toggle_signer(1).unwrap();
        c.toggle_verifier(2).unwrap();

        c.set_participant_count(3).unwrap();
        assert_eq!(c.threshold(), None);
        assert!(c.selection().signers().is_empty());
        assert!(c.selection().verifiers().is_empty());
        assert_eq!(c.signer_slots().len(), 3);
    }

    #[test]
    fn test_threshold_change_keeps_selection() {
        let mut c = ceremony();
        c.set_participant_count(4).unwrap();
        c.set_message("m");
        c.set_threshold(3).unwrap();
        for id in [0, 1] {
            c.toggle_signer(id).unwrap();
        }
        assert!(!c.signing_gate());

        c.set_threshold(2).unwrap();
        assert_eq!(c.selection().signer_indices(), vec![0, 1]);
        assert!(c.signing_gate());
    }

    #[test]
    fn test_threshold_cap_mode() {
        let config = CeremonyConfig {
            signer_cap: SignerCap::Threshold,
            ..Default::default()
        };
        let mut c = Ceremony::new(config).unwrap();
        c.set_participant_count(4).unwrap();
        c.set_threshold(2).unwrap();
        c.toggle_signer(0).unwrap();
        c.toggle_signer(1).unwrap();

        let effects = c.dispatch(signer(3));
        assert_eq!(
            refusals(&effects),
            vec!["You cannot select more than 2 participants."]
        );
        assert_eq!(c.selection().signer_indices(), vec![0, 1]);
    }

    #[test]
    fn test_threshold_cap_keeps_existing_signers_after_lowering_t() {
        let config = CeremonyConfig {
            signer_cap: SignerCap::Threshold,
            ..Default::default()
        };
        let mut c = Ceremony::new(config).unwrap();
        let effects = run(
            &mut c,
            vec![
                CeremonyEvent::ParticipantCountChosen { participants: 4 },
                CeremonyEvent::ThresholdChosen { threshold: 3 },
                signer(0),
                signer(1),
                signer(2),
                CeremonyEvent::ThresholdChosen { threshold: 2 },
                signer(0),
            ],
        );

        assert!(refusals(&effects).is_empty());
        assert_eq!(c.selection().signer_indices(), vec![0, 1, 2]);

        // A new member is still refused
        let effects = c.dispatch(signer(3));
        assert_eq!(
            refusals(&effects),
            vec!["You cannot select more than 2 participants."]
        );
        assert_eq!(c.selection().signer_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_verifiers_do_not_affect_gate() {
        let mut c = ceremony();
        c.set_participant_count(2).unwrap();
        c.set_threshold(2).unwrap();
        c.set_message("m");
        c.toggle_signer(0).unwrap();
        c.toggle_signer(1).unwrap();
        assert!(c.signing_gate());

        c.toggle_verifier(0).unwrap();
        c.toggle_verifier(1).unwrap();
        assert!(c.signing_gate());
        assert!(c.verification_permitted());
    }

    #[test]
    fn test_completions_update_view() {
        let mut c = ceremony();
        c.set_participant_count(2).unwrap();
        c.set_threshold(2).unwrap();
        c.set_message("m");
        c.toggle_signer(0).unwrap();
        c.toggle_signer(1).unwrap();
        c.toggle_verifier(1).unwrap();
        c.dispatch(CeremonyEvent::SignRequested);

        let effects = c.dispatch(CeremonyEvent::SigningCompleted {
            outcome: Ok(SigningResult {
                signature_hex: Some("abcd".to_string()),
                hash_hex: None,
            }),
        });
        assert!(effects.is_empty());

        let effects = c.dispatch(CeremonyEvent::VerifyRequested);
        assert!(matches!(effects[0], Effect::DispatchVerification(_)));
        c.dispatch(CeremonyEvent::VerificationCompleted { outcome: Ok(true) });

        let view = c.view();
        assert!(!view.signing_pending);
        let display = view.signing_result.unwrap();
        assert_eq!(display.signature, "abcd");
        assert_eq!(display.hash, "Hash generation failed");
        assert_eq!(view.verification_result, Some(true));
    }

    #[test]
    fn test_slot_labels() {
        let mut c = ceremony();
        c.set_participant_count(2).unwrap();
        c.toggle_verifier(1).unwrap();

        let slots = c.verifier_slots();
        assert_eq!(slots[0].label, "Verifier 1");
        assert!(!slots[0].checked);
        assert_eq!(slots[1].label, "Verifier 2");
        assert!(slots[1].checked);
        assert_eq!(c.signer_slots()[0].label, "Participant 1");
    }

    #[test]
    fn test_event_script_format() {
        let json = r#"[
            {"event": "participant_count_chosen", "participants": 3},
            {"event": "signer_toggled", "id": 0, "checked": true},
            {"event": "sign_requested"}
        ]"#;
        let events: Vec<CeremonyEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events[1], signer(0));
        assert_eq!(events[2], CeremonyEvent::SignRequested);
    }
}
