use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use meshroom_core::{IceServerConfig, PeerId};
use meshroom_peer::{
    LocalMedia, LocalTrack, MediaError, MediaSource, PeerObserver, RelayClient,
    RelayClientConfig, RemoteTrack, Session, SessionConfig, TrackSink, TransportConfig,
    WebRtcConnectionFactory,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

pub struct JoinOptions {
    pub relay: String,
    pub room: Option<String>,
    pub ice_servers: Vec<String>,
    pub ice_username: Option<String>,
    pub ice_credential: Option<String>,
    pub negotiation_timeout: Option<Duration>,
    pub capture: SilentCapture,
}

/// Join a room and stay until the relay goes away or we are interrupted.
/// Lines typed on stdin go to every peer as chat.
pub async fn join(options: JoinOptions) -> Result<()> {
    let mut config = match options.room.clone() {
        Some(room) => SessionConfig::new(room),
        None => SessionConfig::random_room(),
    };
    config.negotiation_timeout = options.negotiation_timeout;

    let transport = TransportConfig {
        ice_servers: ice_servers(&options),
    };

    println!("{}", format!("🚪 Joining {}", config.room).green().bold());

    let factory =
        WebRtcConnectionFactory::new(transport).context("Failed to set up the WebRTC stack")?;
    let (client, inbound) = RelayClient::connect(RelayClientConfig::new(options.relay.clone()))
        .await
        .with_context(|| format!("Failed to connect to relay at {}", options.relay))?;

    let mut session = Session::start(
        config,
        &options.capture,
        Arc::new(client),
        inbound,
        Arc::new(factory),
        Arc::new(ConsoleObserver),
    )
    .await
    .context("Failed to start session")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            alive = session.step() => {
                if !alive {
                    info!("Relay went away");
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => say(&mut session, line.trim()),
                Ok(None) => stdin_open = false,
                Err(e) => {
                    debug!("Stopped reading stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = &mut interrupted => {
                info!("Interrupted, leaving");
                break;
            }
        }
    }

    session.shutdown();
    Ok(())
}

fn say(session: &mut Session, message: &str) {
    if message.is_empty() {
        return;
    }

    let recipients = session.send_chat(message);
    if recipients == 0 {
        println!("{}", "   nobody is here yet".dimmed());
    } else {
        println!("{} {}", "me:".green(), message);
    }
}

/// Every `--ice-server` shares the one set of credentials, if given.
fn ice_servers(options: &JoinOptions) -> Vec<IceServerConfig> {
    if options.ice_servers.is_empty() {
        return IceServerConfig::defaults();
    }

    options
        .ice_servers
        .iter()
        .map(|url| IceServerConfig {
            username: options.ice_username.clone(),
            credential: options.ice_credential.clone(),
            ..IceServerConfig::stun(url.clone())
        })
        .collect()
}

/// Local capture for a headless peer: tracks that never carry samples.
#[derive(Debug, Clone, Copy)]
pub struct SilentCapture {
    pub audio: bool,
    pub video: bool,
}

#[async_trait]
impl MediaSource for SilentCapture {
    async fn acquire(&self) -> Result<LocalMedia, MediaError> {
        let mut tracks: Vec<LocalTrack> = Vec::new();
        if self.audio {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                "audio".to_owned(),
                "meshroom".to_owned(),
            )));
        }
        if self.video {
            tracks.push(Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
                "video".to_owned(),
                "meshroom".to_owned(),
            )));
        }

        if tracks.is_empty() {
            return Err(MediaError::Unavailable(
                "both audio and video are disabled".to_string(),
            ));
        }
        Ok(LocalMedia::new(tracks))
    }
}

struct ConsoleObserver;

impl PeerObserver for ConsoleObserver {
    fn attach(&self, peer: &PeerId) -> Box<dyn TrackSink> {
        println!("{}", format!("👋 {peer} is sending media").cyan());
        Box::new(ConsoleSink {
            peer: peer.clone(),
            packets: Arc::new(AtomicU64::new(0)),
            readers: Vec::new(),
        })
    }

    fn on_peer_left(&self, peer: &PeerId) {
        println!("{}", format!("🚶 {peer} left").yellow());
    }

    fn on_chat(&self, peer: &PeerId, message: &str) {
        println!("{} {}", format!("{peer}:").blue(), message);
    }
}

/// Drains every remote track and counts the RTP packets it saw.
struct ConsoleSink {
    peer: PeerId,
    packets: Arc<AtomicU64>,
    readers: Vec<JoinHandle<()>>,
}

impl TrackSink for ConsoleSink {
    fn render(&mut self, track: &RemoteTrack) {
        println!(
            "   {:?} track {} from {}",
            track.kind, track.track_id, self.peer
        );

        let Some(media) = track.media() else {
            return;
        };
        let media = Arc::clone(media);
        let packets = Arc::clone(&self.packets);
        self.readers.push(tokio::spawn(async move {
            while media.read_rtp().await.is_ok() {
                packets.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    fn detach(&mut self) {
        for reader in self.readers.drain(..) {
            reader.abort();
        }
        info!(
            "Stopped rendering {} after {} RTP packets",
            self.peer,
            self.packets.load(Ordering::Relaxed)
        );
    }
}
