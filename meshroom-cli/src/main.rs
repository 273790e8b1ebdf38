mod headless;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use meshroom_relay::RelayConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::headless::{JoinOptions, SilentCapture};

#[derive(Parser)]
#[command(name = "meshroom")]
#[command(about = "Mesh video rooms over a WebSocket relay", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
    },

    /// Join a room as a headless peer.
    Join {
        /// Relay endpoint, e.g. ws://localhost:8080/connect
        #[arg(long)]
        relay: String,

        /// Room path; a random one is generated when omitted.
        #[arg(long)]
        room: Option<String>,

        /// STUN/TURN server URL. May be repeated.
        #[arg(long = "ice-server")]
        ice_servers: Vec<String>,

        /// TURN username, applied to every --ice-server.
        #[arg(long, requires = "ice_credential")]
        ice_username: Option<String>,

        /// TURN credential, applied to every --ice-server.
        #[arg(long, requires = "ice_username")]
        ice_credential: Option<String>,

        /// Do not offer an audio track.
        #[arg(long)]
        no_audio: bool,

        /// Do not offer a video track.
        #[arg(long)]
        no_video: bool,

        /// Seconds a peer may take to connect; 0 waits forever.
        #[arg(long, default_value_t = 30)]
        negotiation_timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay { bind } => {
            println!("{}", format!("📡 Relay on ws://{bind}/connect").green().bold());
            meshroom_relay::serve(RelayConfig { bind }).await?;
        }

        Commands::Join {
            relay,
            room,
            ice_servers,
            ice_username,
            ice_credential,
            no_audio,
            no_video,
            negotiation_timeout,
        } => {
            let options = JoinOptions {
                relay,
                room,
                ice_servers,
                ice_username,
                ice_credential,
                negotiation_timeout: (negotiation_timeout > 0)
                    .then(|| Duration::from_secs(negotiation_timeout)),
                capture: SilentCapture {
                    audio: !no_audio,
                    video: !no_video,
                },
            };
            headless::join(options).await?;
        }
    }

    Ok(())
}
