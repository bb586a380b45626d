//! Tracklist entry types

use crate::types::Track;
use serde::{Deserialize, Serialize};

/// Tracklist entry identifier
///
/// Unique within the lifetime of one tracklist, monotonically assigned and
/// never reused. Distinct from the track's own identity: the same track may
/// appear in the tracklist several times, each occurrence with its own tlid.
pub type TlId = u64;

/// One tracklist entry: a track paired with its tlid
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TlTrack {
    /// Tracklist entry identifier
    pub tlid: TlId,

    /// The wrapped track
    pub track: Track,
}

impl TlTrack {
    /// Create a tracklist entry
    pub fn new(tlid: TlId, track: Track) -> Self {
        Self { tlid, track }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_track_distinguished_by_tlid() {
        let track = Track::new("local:track:1");
        let first = TlTrack::new(1, track.clone());
        let second = TlTrack::new(2, track);

        assert_eq!(first.track, second.track);
        assert_ne!(first, second);
    }
}
