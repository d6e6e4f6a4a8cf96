//! Unishare screen node.
//!
//! Run with: `cargo run -p unishare-screen -- --config screen.toml`
//!
//! Button edges are fed from stdin as a stand-in for the GPIO inputs:
//! `f<Enter>` advances the displayed field, `d<Enter>` advances the
//! displayed device.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unishare_core::{RetryBudget, Supervisor};
use unishare_screen::ui::{ButtonEdge, ButtonEvent};
use unishare_screen::{Config, HostNetwork, RumqttBus, ScreenNode, TerminalDisplay};

/// Unishare screen node - renders fleet telemetry to a two-line display.
#[derive(Parser, Debug)]
#[command(name = "unishare-screen")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker host override.
    #[arg(long)]
    broker: Option<String>,

    /// Node hardware address override.
    #[arg(long)]
    mac: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unishare_core=info".parse()?)
                .add_directive("unishare_screen=info".parse()?),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Override config with CLI args
    if let Some(broker) = args.broker {
        config.broker.host = broker;
    }
    if let Some(mac) = args.mac {
        config.node.mac_address = mac;
    }

    config.validate()?;
    let identity = config.identity()?;
    info!(id = %identity.id, name = %identity.name, "starting screen node");

    let bus = RumqttBus::new(&config.broker, &identity)?;
    let supervisor = Supervisor::new(RetryBudget::default(), identity);

    let (buttons_tx, buttons_rx) = mpsc::channel(16);
    tokio::spawn(read_button_edges(buttons_tx));

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let mut node = ScreenNode::new(
        &config,
        supervisor,
        bus,
        HostNetwork::new(),
        TerminalDisplay::new(),
        buttons_rx,
    );
    node.run(cancel).await.context("display failure")?;

    Ok(())
}

/// Translate stdin lines into button edges, stamped at read time.
async fn read_button_edges(tx: mpsc::Sender<ButtonEdge>) {
    let stdin = tokio::io::stdin();
    let mut lines = tokio::io::BufReader::new(stdin).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let event = match line.trim() {
                    "f" => ButtonEvent::FieldAdvance,
                    "d" => ButtonEvent::DeviceAdvance,
                    other => {
                        debug!(input = other, "unmapped input line");
                        continue;
                    }
                };
                if tx.send(ButtonEdge::now(event)).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                info!("stdin closed, input feed stopping");
                break;
            }
            Err(err) => {
                warn!(error = %err, "failed to read input");
                break;
            }
        }
    }
}
