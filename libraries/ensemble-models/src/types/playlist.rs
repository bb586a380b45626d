//! Playlist domain type

use crate::types::Track;
use serde::{Deserialize, Serialize};

/// A playlist owned by one backend
///
/// Playlists must be created through the playlists controller (which asks a
/// backend to create them), never assembled by hand: only backend-produced
/// playlists carry a URI that `save` and `delete` can route on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist URI; the scheme routes operations to the owning backend
    pub uri: String,

    /// Playlist name
    pub name: String,

    /// The playlist's tracks, in order
    pub tracks: Vec<Track>,

    /// Timestamp of last modification, in milliseconds since Unix epoch
    pub last_modified: Option<i64>,
}

impl Playlist {
    /// Create a playlist value
    pub fn new(uri: impl Into<String>, name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            tracks,
            last_modified: None,
        }
    }

    /// Number of tracks in the playlist
    pub fn length(&self) -> usize {
        self.tracks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_creation() {
        let playlist = Playlist::new("m3u:faves", "Faves", vec![Track::new("local:track:1")]);
        assert_eq!(playlist.uri, "m3u:faves");
        assert_eq!(playlist.length(), 1);
    }
}
