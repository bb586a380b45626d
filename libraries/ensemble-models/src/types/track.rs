//! Track domain types
//!
//! Tracks are immutable values produced by backends (library lookup/search)
//! or by test fixtures. Equality and hashing are structural, so the same
//! logical track deduplicates in sets and maps regardless of which backend
//! produced it. Modifying a track means building a new value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An artist reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Artist {
    /// Artist URI, if the owning backend assigns one
    pub uri: Option<String>,

    /// Artist name
    pub name: String,

    /// Name used for sorting, when it differs from `name`
    pub sortname: Option<String>,

    /// MusicBrainz artist identifier
    pub musicbrainz_id: Option<String>,
}

impl Artist {
    /// Create an artist with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            name: name.into(),
            sortname: None,
            musicbrainz_id: None,
        }
    }
}

/// An album reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Album {
    /// Album URI, if the owning backend assigns one
    pub uri: Option<String>,

    /// Album name
    pub name: String,

    /// Album artists
    pub artists: BTreeSet<Artist>,

    /// Number of tracks on the album
    pub num_tracks: Option<u32>,

    /// Number of discs in the album
    pub num_discs: Option<u32>,

    /// Release date (`YYYY` or `YYYY-MM-DD`)
    pub date: Option<String>,

    /// MusicBrainz album identifier
    pub musicbrainz_id: Option<String>,
}

impl Album {
    /// Create an album with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            name: name.into(),
            artists: BTreeSet::new(),
            num_tracks: None,
            num_discs: None,
            date: None,
            musicbrainz_id: None,
        }
    }
}

/// Audio track
///
/// The URI is the only required field; it is what makes a track playable and
/// what routes it to the backend owning its scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Track URI
    pub uri: String,

    /// Track name
    pub name: Option<String>,

    /// Track artists
    pub artists: BTreeSet<Artist>,

    /// Track album
    pub album: Option<Album>,

    /// Track composers
    pub composers: BTreeSet<Artist>,

    /// Track performers
    pub performers: BTreeSet<Artist>,

    /// Track genre
    pub genre: Option<String>,

    /// Track number in the album
    pub track_no: Option<u32>,

    /// Disc number in the album
    pub disc_no: Option<u32>,

    /// Release date (`YYYY` or `YYYY-MM-DD`)
    pub date: Option<String>,

    /// Track length in milliseconds; `None` means unknown duration
    pub length: Option<u64>,

    /// Bitrate in kbit/s
    pub bitrate: Option<u32>,

    /// Free-form comment
    pub comment: Option<String>,

    /// MusicBrainz track identifier
    pub musicbrainz_id: Option<String>,

    /// Timestamp of last modification, in milliseconds since Unix epoch
    pub last_modified: Option<i64>,
}

impl Track {
    /// Create a track with the given URI and no other metadata
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Return a copy with the given name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Return a copy with the given artists
    #[must_use]
    pub fn with_artists<I: IntoIterator<Item = Artist>>(mut self, artists: I) -> Self {
        self.artists = artists.into_iter().collect();
        self
    }

    /// Return a copy with the given album
    #[must_use]
    pub fn with_album(mut self, album: Album) -> Self {
        self.album = Some(album);
        self
    }

    /// Return a copy with the given length in milliseconds
    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Return a copy with the given genre
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// The URI scheme of this track, or `None` if the URI has no scheme
    pub fn uri_scheme(&self) -> Option<&str> {
        self.uri.split_once(':').map(|(scheme, _)| scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn track_creation() {
        let track = Track::new("local:track:song.flac").with_name("Song");
        assert_eq!(track.uri, "local:track:song.flac");
        assert_eq!(track.name.as_deref(), Some("Song"));
        assert!(track.length.is_none());
    }

    #[test]
    fn uri_scheme_extraction() {
        let track = Track::new("spotify:track:abc123");
        assert_eq!(track.uri_scheme(), Some("spotify"));

        let no_scheme = Track::new("not-a-uri");
        assert_eq!(no_scheme.uri_scheme(), None);
    }

    #[test]
    fn structural_equality_deduplicates() {
        let a = Track::new("local:track:1")
            .with_name("One")
            .with_artists([Artist::named("X")]);
        let b = Track::new("local:track:1")
            .with_name("One")
            .with_artists([Artist::named("X")]);
        assert_eq!(a, b);

        let set: HashSet<Track> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn modified_copy_is_a_new_value() {
        let original = Track::new("local:track:1").with_name("One");
        let renamed = original.clone().with_name("Two");
        assert_ne!(original, renamed);
        assert_eq!(original.name.as_deref(), Some("One"));
    }
}
