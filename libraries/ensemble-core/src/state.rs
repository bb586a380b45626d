//! Persisted coordinator state
//!
//! Serializable snapshots of everything worth carrying across a restart. The
//! storage format and location are the embedder's business; this module only
//! defines the data and which parts of it a restore should apply.

use crate::history::HistoryEntry;
use ensemble_models::{PlaybackState, TlId, TlTrack};
use serde::{Deserialize, Serialize};

/// Snapshot of the tracklist controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracklistState {
    /// Repeat mode flag
    pub repeat: bool,
    /// Random mode flag
    pub random: bool,
    /// Consume mode flag
    pub consume: bool,
    /// Single mode flag
    pub single: bool,
    /// Next unused tracklist id
    pub next_tlid: TlId,
    /// The entries, in order
    pub tl_tracks: Vec<TlTrack>,
}

/// Snapshot of the playback controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Tracklist id of the current entry, if any
    pub tlid: Option<TlId>,
    /// Position in the current track, in milliseconds
    pub time_position: u64,
    /// Playback state at snapshot time
    pub state: PlaybackState,
}

/// Snapshot of the mixer controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixerState {
    /// Volume in `[0..=100]`, if known
    pub volume: Option<u32>,
    /// Mute state, if known
    pub mute: Option<bool>,
}

/// Full coordinator snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreState {
    /// Tracklist contents and modes
    pub tracklist: TracklistState,
    /// Playback position and state
    pub playback: PlaybackSnapshot,
    /// Mixer volume and mute
    pub mixer: MixerState,
    /// Recently played tracks, most recent first
    pub history: Vec<HistoryEntry>,
}

/// Which parts of a [`CoreState`] a restore applies
///
/// Deployments differ on how much of a previous session to bring back; a
/// restore applies exactly the parts flagged here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCoverage {
    /// Restore the tracklist entries and tlid counter
    pub tracklist: bool,
    /// Restore the repeat/random/consume/single flags
    pub modes: bool,
    /// Restart the track that was loaded at snapshot time, at its position
    pub play_last: bool,
    /// Restore mixer volume and mute
    pub mixer: bool,
    /// Restore the play history
    pub history: bool,
}

impl StateCoverage {
    /// Coverage restoring everything
    pub fn full() -> Self {
        Self {
            tracklist: true,
            modes: true,
            play_last: true,
            mixer: true,
            history: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_state_round_trips_through_json() {
        let state = CoreState {
            tracklist: TracklistState {
                repeat: true,
                next_tlid: 7,
                ..Default::default()
            },
            playback: PlaybackSnapshot {
                tlid: Some(3),
                time_position: 42_000,
                state: PlaybackState::Paused,
            },
            mixer: MixerState {
                volume: Some(80),
                mute: Some(false),
            },
            history: Vec::new(),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: CoreState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
