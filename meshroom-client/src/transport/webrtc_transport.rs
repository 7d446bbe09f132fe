use crate::error::TransportError;
use crate::peer::LinkRole;
use crate::transport::media::{LocalStream, RemoteTrack};
use crate::transport::peer_transport::{PeerTransport, TransportFactory};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use async_trait::async_trait;
use meshroom_core::{IceServerConfig, PeerId, Signal};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

/// Builds [`WebRtcTransport`]s with the ICE setup most recently announced
/// by the server.
pub struct WebRtcTransportFactory {
    config: RwLock<TransportConfig>,
}

impl WebRtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

impl Default for WebRtcTransportFactory {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn create(
        &self,
        peer_id: PeerId,
        role: LinkRole,
        local_stream: &LocalStream,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>, TransportError> {
        let config = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let transport = WebRtcTransport::new(peer_id, role, config, local_stream, events).await?;
        Ok(Box::new(transport))
    }

    fn update_ice_servers(&self, ice_servers: Vec<IceServerConfig>) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.ice_servers = ice_servers;
    }
}

/// `RTCPeerConnection` with non-trickle negotiation.
///
/// Session descriptions are only published once ICE gathering has finished,
/// so one offer and one answer are all a pair ever exchanges.
pub struct WebRtcTransport {
    peer_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
    signal_tx: mpsc::UnboundedSender<Signal>,
    worker: JoinHandle<()>,
}

impl WebRtcTransport {
    pub async fn new(
        peer_id: PeerId,
        role: LinkRole,
        config: TransportConfig,
        local_stream: &LocalStream,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config.rtc_ice_servers(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        for track in local_stream.tracks() {
            let sender = peer_connection.add_track(Arc::clone(track)).await?;
            // RTCP has to be read for interceptors (NACK, reports) to work.
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1500];
                while sender.read(&mut buf).await.is_ok() {}
            });
        }

        let state_tx = events.clone();
        let uid_state = peer_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    debug!("Peer connection state for {}: {:?}", uid, s);
                    let event = match s {
                        RTCPeerConnectionState::Connected => TransportEvent::Connected(uid),
                        RTCPeerConnectionState::Failed => {
                            TransportEvent::Failed(uid, "peer connection failed".to_owned())
                        }
                        RTCPeerConnectionState::Closed => TransportEvent::Closed(uid),
                        _ => return,
                    };
                    // `close()` awaits this handler, so it must never wait on the channel.
                    if let Err(e) = tx.try_send(event) {
                        warn!("Dropping state event: {}", e);
                    }
                })
            },
        ));

        let track_tx = events.clone();
        let uid_track = peer_id.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let uid = uid_track.clone();

                Box::pin(async move {
                    let remote = RemoteTrack::from_webrtc(track);
                    info!("Remote {} track '{}' from {}", remote.kind, remote.id, uid);
                    if let Err(e) = tx.try_send(TransportEvent::RemoteTrack(uid, remote)) {
                        warn!("Dropping track event: {}", e);
                    }
                })
            },
        ));

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(negotiate(
            peer_id.clone(),
            role,
            Arc::clone(&peer_connection),
            signal_rx,
            events,
        ));

        Ok(Self {
            peer_id,
            peer_connection,
            signal_tx,
            worker,
        })
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn feed_signal(&self, signal: Signal) -> Result<(), TransportError> {
        self.signal_tx
            .send(signal)
            .map_err(|_| TransportError::Closed(self.peer_id.clone()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.worker.abort();
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Per-link negotiation worker. Applies relayed payloads strictly in order.
async fn negotiate(
    peer_id: PeerId,
    role: LinkRole,
    pc: Arc<RTCPeerConnection>,
    mut signals: mpsc::UnboundedReceiver<Signal>,
    events: mpsc::Sender<TransportEvent>,
) {
    if role == LinkRole::Initiator {
        if let Err(e) = publish_local_description(&peer_id, &pc, true, &events).await {
            let _ = events.send(TransportEvent::Failed(peer_id, e.to_string())).await;
            return;
        }
    }

    while let Some(signal) = signals.recv().await {
        if let Err(e) = apply_remote_signal(&peer_id, role, &pc, signal, &events).await {
            warn!("Negotiation with {} failed: {}", peer_id, e);
            let _ = events.send(TransportEvent::Failed(peer_id, e.to_string())).await;
            return;
        }
    }
}

async fn apply_remote_signal(
    peer_id: &PeerId,
    role: LinkRole,
    pc: &RTCPeerConnection,
    signal: Signal,
    events: &mpsc::Sender<TransportEvent>,
) -> Result<(), TransportError> {
    let desc: RTCSessionDescription = serde_json::from_value(signal.into_inner())?;
    pc.set_remote_description(desc).await?;

    if role == LinkRole::Responder {
        publish_local_description(peer_id, pc, false, events).await?;
    }
    Ok(())
}

async fn publish_local_description(
    peer_id: &PeerId,
    pc: &RTCPeerConnection,
    offer: bool,
    events: &mpsc::Sender<TransportEvent>,
) -> Result<(), TransportError> {
    let desc = if offer {
        pc.create_offer(None).await?
    } else {
        pc.create_answer(None).await?
    };

    let mut gathering_complete = pc.gathering_complete_promise().await;
    pc.set_local_description(desc).await?;
    let _ = gathering_complete.recv().await;

    let local = pc
        .local_description()
        .await
        .ok_or_else(|| TransportError::Negotiation("no local description after gathering".into()))?;

    let signal = Signal(serde_json::to_value(&local)?);
    events
        .send(TransportEvent::NegotiationPayload(peer_id.clone(), signal))
        .await
        .map_err(|_| TransportError::Closed(peer_id.clone()))
}
