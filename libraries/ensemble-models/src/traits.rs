//! Backend capability traits
//!
//! A backend owns one or more URI schemes and registers zero or more
//! capabilities by supplying trait objects in its [`Backend`] registration.
//! The coordinator never probes for capabilities at runtime: a capability a
//! backend did not register simply does not exist for it.
//!
//! All methods are fallible. The coordinator wraps every call in its error
//! containment policy, so a misbehaving backend degrades to an empty
//! contribution instead of taking the coordinator down.

use crate::error::Result;
use crate::types::{
    DistinctField, Image, Playlist, Ref, SearchQuery, SearchResult, Track,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Library capability: browse, lookup, and search a backend's catalogue
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    /// The root of this backend's browse tree, or `None` if the backend
    /// offers nothing to browse
    fn root_directory(&self) -> Option<Ref>;

    /// List the directory at `uri`
    async fn browse(&self, uri: &str) -> Result<Vec<Ref>> {
        let _ = uri;
        Ok(Vec::new())
    }

    /// Resolve each URI to zero or more tracks
    ///
    /// A single URI may expand to many tracks (an album or directory URI).
    /// URIs the backend does not know resolve to an empty list.
    async fn lookup_many(&self, uris: &[String]) -> Result<HashMap<String, Vec<Track>>>;

    /// Search the catalogue
    ///
    /// `uris` optionally restricts the search to given roots. Returns `None`
    /// if the backend has nothing to say about the query.
    async fn search(
        &self,
        query: &SearchQuery,
        uris: Option<&[String]>,
    ) -> Result<Option<SearchResult>> {
        let _ = (query, uris);
        Ok(None)
    }

    /// List distinct values of `field`, optionally narrowed by `query`
    async fn get_distinct(
        &self,
        field: DistinctField,
        query: Option<&SearchQuery>,
    ) -> Result<BTreeSet<String>> {
        let _ = (field, query);
        Ok(BTreeSet::new())
    }

    /// Images for each URI (cover art and similar)
    async fn get_images(&self, uris: &[String]) -> Result<HashMap<String, Vec<Image>>> {
        let _ = uris;
        Ok(HashMap::new())
    }

    /// Refresh the catalogue, limited to `uri` and below when given
    async fn refresh(&self, uri: Option<&str>) -> Result<()> {
        let _ = uri;
        Ok(())
    }
}

/// Playback capability: drive the audio layer for one URI scheme
#[async_trait]
pub trait PlaybackProvider: Send + Sync {
    /// Warn the backend that the current track is about to be swapped out
    async fn prepare_change(&self) -> Result<()> {
        Ok(())
    }

    /// Remap a logical URI to a physically playable one
    ///
    /// Returns `None` when the backend cannot produce a playable URI, which
    /// the coordinator treats as "this track is unplayable here".
    async fn translate_uri(&self, uri: &str) -> Result<Option<String>> {
        Ok(Some(uri.to_string()))
    }

    /// Switch to the given track; `false` reports the track cannot be played
    async fn change_track(&self, track: &Track) -> Result<bool>;

    /// Start playback of the current track
    async fn play(&self) -> Result<bool>;

    /// Resume paused playback
    async fn resume(&self) -> Result<bool>;

    /// Pause playback
    async fn pause(&self) -> Result<bool>;

    /// Stop playback
    async fn stop(&self) -> Result<bool>;

    /// Seek to a position in the current track, in milliseconds
    async fn seek(&self, time_position: u64) -> Result<bool>;

    /// Current position in the current track, in milliseconds
    async fn get_time_position(&self) -> Result<u64>;
}

/// Playlists capability: enumerate and persist playlists for one URI scheme
#[async_trait]
pub trait PlaylistsProvider: Send + Sync {
    /// References to all playlists this backend holds
    async fn as_list(&self) -> Result<Vec<Ref>>;

    /// References to the items of the playlist at `uri`, or `None` if there
    /// is no such playlist
    async fn get_items(&self, uri: &str) -> Result<Option<Vec<Ref>>>;

    /// Create a new empty playlist, or `None` if the backend declines
    async fn create(&self, name: &str) -> Result<Option<Playlist>>;

    /// Delete the playlist at `uri`; `false` if nothing was deleted
    async fn delete(&self, uri: &str) -> Result<bool>;

    /// Full playlist at `uri`, or `None` if not found
    async fn lookup(&self, uri: &str) -> Result<Option<Playlist>>;

    /// Reload playlists from the backing store
    async fn refresh(&self) -> Result<()> {
        Ok(())
    }

    /// Save a playlist; the returned value supersedes the one passed in
    /// (the backend may rename or relocate it). `None` means not saved.
    async fn save(&self, playlist: &Playlist) -> Result<Option<Playlist>>;
}

/// Volume/mute control collaborator
#[async_trait]
pub trait Mixer: Send + Sync {
    /// Volume in `[0..=100]`, or `None` if unknown
    async fn get_volume(&self) -> Result<Option<u32>>;

    /// Set volume; `false` reports the mixer declined
    async fn set_volume(&self, volume: u32) -> Result<bool>;

    /// Mute state, or `None` if unknown
    async fn get_mute(&self) -> Result<Option<bool>>;

    /// Set mute state; `false` reports the mixer declined
    async fn set_mute(&self, mute: bool) -> Result<bool>;
}

/// One backend registration
///
/// Declares the URI schemes the backend owns and the capabilities it
/// provides. Built once at startup and handed to the coordinator; the set of
/// backends never changes at runtime.
#[derive(Clone)]
pub struct Backend {
    /// Backend name, used in logs
    pub name: String,

    /// URI schemes this backend owns
    pub uri_schemes: Vec<String>,

    /// Library capability, if provided
    pub library: Option<Arc<dyn LibraryProvider>>,

    /// Playback capability, if provided
    pub playback: Option<Arc<dyn PlaybackProvider>>,

    /// Playlists capability, if provided
    pub playlists: Option<Arc<dyn PlaylistsProvider>>,
}

impl Backend {
    /// Create a backend registration with no capabilities
    pub fn new<I, S>(name: impl Into<String>, uri_schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            uri_schemes: uri_schemes.into_iter().map(Into::into).collect(),
            library: None,
            playback: None,
            playlists: None,
        }
    }

    /// Attach a library capability
    #[must_use]
    pub fn with_library(mut self, library: Arc<dyn LibraryProvider>) -> Self {
        self.library = Some(library);
        self
    }

    /// Attach a playback capability
    #[must_use]
    pub fn with_playback(mut self, playback: Arc<dyn PlaybackProvider>) -> Self {
        self.playback = Some(playback);
        self
    }

    /// Attach a playlists capability
    #[must_use]
    pub fn with_playlists(mut self, playlists: Arc<dyn PlaylistsProvider>) -> Self {
        self.playlists = Some(playlists);
        self
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name)
            .field("uri_schemes", &self.uri_schemes)
            .field("library", &self.library.is_some())
            .field("playback", &self.playback.is_some())
            .field("playlists", &self.playlists.is_some())
            .finish()
    }
}
