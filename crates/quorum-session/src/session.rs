//! Ceremony event loop
//!
//! All state mutation happens on the task running [`CeremonySession::run`].
//! External calls run elsewhere and re-enter the loop as completion events,
//! so the ceremony state has a single writer.

use std::sync::Arc;

use quorum_core::{
    Ceremony, CeremonyEvent, CeremonyView, Effect, Notification, PortFault, SignerPort,
    SigningRequest, VerificationRequest, VerifierPort,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// Commands accepted by the session loop
#[derive(Debug)]
pub enum SessionCommand {
    /// Dispatch a ceremony event
    Event(CeremonyEvent),
    /// Reply with the current view
    Snapshot(oneshot::Sender<CeremonyView>),
    /// Stop the loop
    Shutdown,
}

/// Published after every dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutput {
    /// Transient notification
    Notification(Notification),
    /// State after the event
    View(CeremonyView),
}

/// Owns a [`Ceremony`] and the external ports it talks to
pub struct CeremonySession {
    ceremony: Ceremony,
    signer: Arc<dyn SignerPort>,
    verifier: Arc<dyn VerifierPort>,
    inbox: mpsc::UnboundedReceiver<SessionCommand>,
    /// Weak, so the loop ends once every handle and port task is gone
    commands: mpsc::WeakUnboundedSender<SessionCommand>,
    outputs: broadcast::Sender<SessionOutput>,
}

/// Cloneable handle for feeding and observing a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    outputs: broadcast::Sender<SessionOutput>,
}

impl CeremonySession {
    /// Create a session and a handle to it
    pub fn new(
        config: &SessionConfig,
        signer: Arc<dyn SignerPort>,
        verifier: Arc<dyn VerifierPort>,
    ) -> Result<(Self, SessionHandle)> {
        config.validate()?;
        let ceremony = Ceremony::new(config.ceremony.clone())?;
        let (commands, inbox) = mpsc::unbounded_channel();
        let (outputs, _) = broadcast::channel(config.output_buffer);

        let session = Self {
            ceremony,
            signer,
            verifier,
            inbox,
            commands: commands.downgrade(),
            outputs: outputs.clone(),
        };
        let handle = SessionHandle { commands, outputs };
        Ok((session, handle))
    }

    /// Process commands until shutdown or until every handle is dropped;
    /// returns the final view
    pub async fn run(mut self) -> CeremonyView {
        info!("Ceremony session started");

        while let Some(command) = self.inbox.recv().await {
            match command {
                SessionCommand::Event(event) => self.apply(event),
                SessionCommand::Snapshot(reply) => {
                    let _ = reply.send(self.ceremony.view());
                }
                SessionCommand::Shutdown => {
                    info!("Ceremony session shutting down");
                    break;
                }
            }
        }

        self.ceremony.view()
    }

    fn apply(&mut self, event: CeremonyEvent) {
        for effect in self.ceremony.dispatch(event) {
            match effect {
                Effect::Notify(notification) => {
                    debug!("Notification: {}", notification);
                    self.publish(SessionOutput::Notification(notification));
                }
                Effect::DispatchSigning(request) => self.spawn_signing(request),
                Effect::DispatchVerification(request) => self.spawn_verification(request),
            }
        }
        self.publish(SessionOutput::View(self.ceremony.view()));
    }

    fn publish(&self, output: SessionOutput) {
        // No subscribers is fine
        let _ = self.outputs.send(output);
    }

    fn spawn_signing(&self, request: SigningRequest) {
        let Some(commands) = self.commands.upgrade() else {
            warn!("Signing dropped: no handles left to observe it");
            return;
        };
        let signer = Arc::clone(&self.signer);

        tokio::spawn(async move {
            let task = tokio::spawn(async move { signer.sign(request).await });
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Signing task failed: {}", e);
                    Err(PortFault::Internal(format!("signing task failed: {}", e)))
                }
            };
            if commands
                .send(SessionCommand::Event(CeremonyEvent::SigningCompleted { outcome }))
                .is_err()
            {
                warn!("Signing completed after session closed");
            }
        });
    }

    fn spawn_verification(&self, request: VerificationRequest) {
        let Some(commands) = self.commands.upgrade() else {
            warn!("Verification dropped: no handles left to observe it");
            return;
        };
        let verifier = Arc::clone(&self.verifier);

        tokio::spawn(async move {
            let task = tokio::task::spawn_blocking(move || verifier.verify(&request));
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Verification task failed: {}", e);
                    Err(PortFault::Internal(format!("verification task failed: {}", e)))
                }
            };
            if commands
                .send(SessionCommand::Event(CeremonyEvent::VerificationCompleted {
                    outcome,
                }))
                .is_err()
            {
                warn!("Verification completed after session closed");
            }
        });
    }
}

impl SessionHandle {
    /// Submit a ceremony event
    pub fn send(&self, event: CeremonyEvent) -> Result<()> {
        self.commands
            .send(SessionCommand::Event(event))
            .map_err(|_| SessionError::Closed)
    }

    /// Subscribe to notifications and views
    pub fn subscribe(&self) -> broadcast::Receiver<SessionOutput> {
        self.outputs.subscribe()
    }

    /// Current view of the ceremony
    pub async fn snapshot(&self) -> Result<CeremonyView> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::Snapshot(reply))
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// Wait until the view satisfies `predicate`
    pub async fn wait_until<F>(&self, predicate: F) -> Result<CeremonyView>
    where
        F: Fn(&CeremonyView) -> bool,
    {
        // Subscribe before the snapshot so no update falls between them
        let mut outputs = self.subscribe();
        let view = self.snapshot().await?;
        if predicate(&view) {
            return Ok(view);
        }

        loop {
            match outputs.recv().await {
                Ok(SessionOutput::View(view)) if predicate(&view) => return Ok(view),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Session output lagged by {} messages", skipped);
                    let view = self.snapshot().await?;
                    if predicate(&view) {
                        return Ok(view);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return Err(SessionError::Closed),
            }
        }
    }

    /// Stop the session loop
    pub fn shutdown(&self) -> Result<()> {
        self.commands
            .send(SessionCommand::Shutdown)
            .map_err(|_| SessionError::Closed)
    }
}
