use std::fmt;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// Local capture handed to every link; produced by the media collaborator.
#[derive(Clone, Default)]
pub struct LocalStream {
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl LocalStream {
    pub fn new(tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Arc<dyn TrackLocal + Send + Sync>] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl fmt::Debug for LocalStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStream")
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

/// Track announced by the remote side of a link.
#[derive(Clone)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: String,
    /// Live handle for renderers; absent for transports without real media.
    pub handle: Option<Arc<TrackRemote>>,
}

impl RemoteTrack {
    pub fn new(id: impl Into<String>, stream_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stream_id: stream_id.into(),
            kind: kind.into(),
            handle: None,
        }
    }

    pub(crate) fn from_webrtc(track: Arc<TrackRemote>) -> Self {
        Self {
            id: track.id(),
            stream_id: track.stream_id(),
            kind: track.kind().to_string(),
            handle: Some(track),
        }
    }
}

impl PartialEq for RemoteTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.stream_id == other.stream_id && self.kind == other.kind
    }
}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack")
            .field("id", &self.id)
            .field("stream_id", &self.stream_id)
            .field("kind", &self.kind)
            .finish()
    }
}
