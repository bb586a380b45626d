//! Coordinator events
//!
//! Everything observable about the coordinator is announced as a
//! [`CoreEvent`] on a broadcast channel. Emission is fire-and-forget: a slow
//! or crashed subscriber can never stall or corrupt the coordinator.

use ensemble_models::{PlaybackState, Playlist, TlTrack};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// An event announced by the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoreEvent {
    /// Playback of a track was paused
    TrackPlaybackPaused {
        /// The paused entry
        tl_track: TlTrack,
        /// Position at pause time, in milliseconds
        time_position: u64,
    },

    /// Paused playback was resumed
    TrackPlaybackResumed {
        /// The resumed entry
        tl_track: TlTrack,
        /// Position at resume time, in milliseconds
        time_position: u64,
    },

    /// Playback of a track started
    TrackPlaybackStarted {
        /// The entry that started playing
        tl_track: TlTrack,
    },

    /// Playback of a track ended
    TrackPlaybackEnded {
        /// The entry that ended
        tl_track: TlTrack,
        /// How far into the track playback got, in milliseconds
        time_position: u64,
    },

    /// The playback state machine moved between states
    PlaybackStateChanged {
        /// State before the transition
        old_state: PlaybackState,
        /// State after the transition
        new_state: PlaybackState,
    },

    /// The tracklist contents changed
    TracklistChanged,

    /// A tracklist mode flag changed
    OptionsChanged,

    /// Playlists were (re)loaded from one or more backends
    PlaylistsLoaded,

    /// A playlist was created or saved
    PlaylistChanged {
        /// The playlist as the backend now holds it
        playlist: Playlist,
    },

    /// A playlist was deleted
    PlaylistDeleted {
        /// URI of the deleted playlist
        uri: String,
    },

    /// The mixer volume changed
    VolumeChanged {
        /// New volume in `[0..=100]`
        volume: u32,
    },

    /// The mixer mute state changed
    MuteChanged {
        /// New mute state
        mute: bool,
    },

    /// A seek completed
    Seeked {
        /// New position in milliseconds
        time_position: u64,
    },

    /// The stream title reported by the current stream changed
    StreamTitleChanged {
        /// The new title
        title: String,
    },
}

/// Fire-and-forget event fan-out
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<CoreEvent>,
}

impl EventEmitter {
    /// Create an emitter whose subscribers may lag up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Announce an event to all current subscribers
    pub fn emit(&self, event: CoreEvent) {
        debug!(?event, "emitting event");
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// Open a new subscription
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }

    /// Access the underlying sender, for handles that subscribe later
    pub(crate) fn sender(&self) -> broadcast::Sender<CoreEvent> {
        self.tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_models::Track;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let emitter = EventEmitter::new(8);
        let mut rx = emitter.subscribe();

        emitter.emit(CoreEvent::TracklistChanged);
        emitter.emit(CoreEvent::TrackPlaybackStarted {
            tl_track: TlTrack::new(1, Track::new("dummy:a")),
        });

        assert_eq!(rx.recv().await.unwrap(), CoreEvent::TracklistChanged);
        assert!(matches!(
            rx.recv().await.unwrap(),
            CoreEvent::TrackPlaybackStarted { .. }
        ));
    }

    #[test]
    fn emitting_without_subscribers_is_fine() {
        let emitter = EventEmitter::new(8);
        emitter.emit(CoreEvent::OptionsChanged);
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&CoreEvent::VolumeChanged { volume: 50 }).unwrap();
        assert!(json.contains("\"event\":\"volume_changed\""));
    }
}
