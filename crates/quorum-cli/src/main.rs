//! Quorum CLI - drive threshold-signature ceremonies from the terminal
//!
//! Every command runs a ceremony session against the built-in FROST module,
//! feeding it the same events an interactive front end would produce.

use anyhow::Result;
use clap::{Parser, Subcommand};
use quorum_core::{CeremonyEvent, CeremonyView, NotificationKind, SignerPort, VerifierPort};
use quorum_frost::FrostModule;
use quorum_session::{CeremonySession, SessionConfig, SessionHandle, SessionOutput};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quorum")]
#[command(about = "Configure, sign and verify t-of-n threshold signatures", long_about = None)]
#[command(version)]
struct Cli {
    /// Session config file (defaults to $QUORUM_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ceremony: configure, sign and optionally verify
    Run {
        /// Number of participants
        #[arg(short = 'n', long)]
        participants: u16,

        /// Signing threshold
        #[arg(short, long)]
        threshold: u16,

        /// Message to sign
        #[arg(short, long)]
        message: String,

        /// Signer indices, comma separated (0-based)
        #[arg(short, long, value_delimiter = ',')]
        signers: Vec<u16>,

        /// Verifier indices, comma separated (0-based)
        #[arg(long, value_delimiter = ',')]
        verifiers: Vec<u16>,

        /// Verify the signature after signing
        #[arg(long)]
        verify: bool,

        /// Fixed 32-byte RNG seed (hex) for reproducible key material
        #[arg(long)]
        seed: Option<String>,
    },

    /// Replay a JSON array of ceremony events
    Replay {
        /// Script file
        #[arg(short, long)]
        script: PathBuf,

        /// Fixed 32-byte RNG seed (hex) for reproducible key material
        #[arg(long)]
        seed: Option<String>,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Where to write it
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(SessionConfig::default_path);

    let config = match &cli.command {
        Commands::Config(ConfigCommands::Init { .. }) => SessionConfig::default(),
        _ => SessionConfig::load_or_default(&config_path)?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            participants,
            threshold,
            message,
            signers,
            verifiers,
            verify,
            seed,
        } => {
            let mut events = vec![
                CeremonyEvent::ParticipantCountChosen { participants },
                CeremonyEvent::ThresholdChosen { threshold },
                CeremonyEvent::MessageChanged { text: message },
            ];
            events.extend(
                signers
                    .into_iter()
                    .map(|id| CeremonyEvent::SignerToggled { id, checked: true }),
            );
            events.extend(
                verifiers
                    .into_iter()
                    .map(|id| CeremonyEvent::VerifierToggled { id, checked: true }),
            );
            events.push(CeremonyEvent::SignRequested);
            if verify {
                events.push(CeremonyEvent::VerifyRequested);
            }
            handle_run(&config, seed.as_deref(), events).await
        }
        Commands::Replay { script, seed } => {
            let json = fs::read_to_string(&script)?;
            let events: Vec<CeremonyEvent> = serde_json::from_str(&json)?;
            info!("Replaying {} events from {}", events.len(), script.display());
            let view = handle_replay(&config, seed.as_deref(), events).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
        Commands::Config(cmd) => handle_config_command(cmd, &config, config_path),
    }
}

/// A running session wired to one FROST module
struct Running {
    module: Arc<FrostModule>,
    handle: SessionHandle,
    session: JoinHandle<CeremonyView>,
    printer: JoinHandle<()>,
}

impl Running {
    fn start(config: &SessionConfig, seed: Option<&str>) -> Result<Self> {
        let module = Arc::new(match seed {
            Some(seed) => FrostModule::with_seed(parse_seed(seed)?),
            None => FrostModule::new(),
        });
        let signer: Arc<dyn SignerPort> = module.clone();
        let verifier: Arc<dyn VerifierPort> = module.clone();

        let (session, handle) = CeremonySession::new(config, signer, verifier)?;
        let printer = spawn_printer(handle.subscribe());
        let session = tokio::spawn(session.run());

        Ok(Self {
            module,
            handle,
            session,
            printer,
        })
    }

    /// Send an event and wait for any external call it starts to finish
    async fn drive(&self, event: CeremonyEvent) -> Result<CeremonyView> {
        let settled: fn(&CeremonyView) -> bool = match event {
            CeremonyEvent::SignRequested => |view| !view.signing_pending,
            CeremonyEvent::VerifyRequested => |view| !view.verification_pending,
            _ => |_| true,
        };
        self.handle.send(event)?;
        Ok(self.handle.wait_until(settled).await?)
    }

    /// Stop the session and drain its notifications
    async fn finish(self) -> Result<(Arc<FrostModule>, CeremonyView)> {
        self.handle.shutdown()?;
        let view = self.session.await?;
        drop(self.handle);
        self.printer.await?;
        Ok((self.module, view))
    }
}

async fn handle_run(
    config: &SessionConfig,
    seed: Option<&str>,
    events: Vec<CeremonyEvent>,
) -> Result<()> {
    let running = Running::start(config, seed)?;
    let mut verified = None;
    for event in events {
        let verifying = event == CeremonyEvent::VerifyRequested;
        let view = running.drive(event).await?;
        if verifying {
            verified = view.verification_result;
        }
    }
    let (module, view) = running.finish().await?;

    let Some(result) = view.signing_result else {
        anyhow::bail!("Signing was not performed");
    };

    println!("\nSigning Result:");
    println!("  Signers: {:?}", view.signers);
    println!(
        "  Threshold: {}-of-{}",
        view.threshold.unwrap_or(0),
        view.participants.unwrap_or(0)
    );
    println!("  Message Hash: {}", result.hash);
    println!("  Signature: {}", result.signature);
    if let Some(key) = module.group_key_hex() {
        println!("  Group Key: {}", key);
    }
    match verified {
        Some(true) => println!("  Verified: yes ({:?})", view.verifiers),
        Some(false) => println!("  Verified: NO ({:?})", view.verifiers),
        None => {}
    }
    Ok(())
}

async fn handle_replay(
    config: &SessionConfig,
    seed: Option<&str>,
    events: Vec<CeremonyEvent>,
) -> Result<CeremonyView> {
    let running = Running::start(config, seed)?;
    for event in events {
        running.drive(event).await?;
    }
    let (_, view) = running.finish().await?;
    Ok(view)
}

fn handle_config_command(
    cmd: ConfigCommands,
    config: &SessionConfig,
    config_path: PathBuf,
) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => {
            let path = path.unwrap_or(config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            config.save(&path)?;
            println!("✓ Config written to: {}", path.display());
        }
        ConfigCommands::Show => {
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(config)?);
        }
    }
    Ok(())
}

fn spawn_printer(mut outputs: broadcast::Receiver<SessionOutput>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match outputs.recv().await {
                Ok(SessionOutput::Notification(note)) => {
                    let marker = match note.kind {
                        NotificationKind::Info => "•",
                        NotificationKind::Success => "✓",
                        NotificationKind::Refusal => "⚠️ ",
                        NotificationKind::Failure | NotificationKind::Fault => "✗",
                    };
                    println!("{} {}", marker, note.text);
                }
                Ok(SessionOutput::View(_)) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Dropped {} session outputs", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn parse_seed(seed: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(seed)?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("Seed must be 32 bytes of hex"))
}
