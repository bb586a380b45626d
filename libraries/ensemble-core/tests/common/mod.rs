//! Shared in-memory backends for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use ensemble_core::{
    Backend, CoreError, CoreEvent, DistinctField, LibraryProvider, PlaybackProvider, Playlist,
    PlaylistsProvider, Ref, Result, SearchQuery, SearchResult, Track,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("ensemble_core=debug")
        .try_init();
}

pub fn track(uri: &str, name: &str) -> Track {
    Track::new(uri).with_name(name).with_length(10_000)
}

/// `{scheme}:track:1` through `{scheme}:track:{count}`
pub fn tracks(scheme: &str, count: usize) -> Vec<Track> {
    (1..=count)
        .map(|i| track(&format!("{scheme}:track:{i}"), &format!("Track {i}")))
        .collect()
}

pub fn drain_events(rx: &mut broadcast::Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ===== Library =====

/// Static catalogue; optionally faulty or answering for unrequested URIs
#[derive(Default)]
pub struct DummyLibrary {
    pub root: Option<Ref>,
    pub tracks: HashMap<String, Vec<Track>>,
    pub browse_results: HashMap<String, Vec<Ref>>,
    /// Answer `lookup` with this unrequested URI as well, to exercise the
    /// coordinator's answer filtering
    pub rogue_answer: Option<(String, Vec<Track>)>,
    pub fail: bool,
}

impl DummyLibrary {
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        let tracks = tracks
            .into_iter()
            .map(|track| (track.uri.clone(), vec![track]))
            .collect();
        Self {
            tracks,
            ..Self::default()
        }
    }

    pub fn faulty() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl LibraryProvider for DummyLibrary {
    fn root_directory(&self) -> Option<Ref> {
        self.root.clone()
    }

    async fn browse(&self, uri: &str) -> Result<Vec<Ref>> {
        if self.fail {
            return Err(CoreError::backend("broken backend"));
        }
        Ok(self.browse_results.get(uri).cloned().unwrap_or_default())
    }

    async fn lookup_many(&self, uris: &[String]) -> Result<HashMap<String, Vec<Track>>> {
        if self.fail {
            return Err(CoreError::backend("broken backend"));
        }
        let mut answer: HashMap<String, Vec<Track>> = uris
            .iter()
            .filter_map(|uri| self.tracks.get(uri).map(|found| (uri.clone(), found.clone())))
            .collect();
        if let Some((uri, tracks)) = &self.rogue_answer {
            answer.insert(uri.clone(), tracks.clone());
        }
        Ok(answer)
    }

    async fn search(
        &self,
        _query: &SearchQuery,
        _uris: Option<&[String]>,
    ) -> Result<Option<SearchResult>> {
        if self.fail {
            return Err(CoreError::backend("broken backend"));
        }
        let mut tracks: Vec<Track> = self.tracks.values().flatten().cloned().collect();
        tracks.sort_by(|a, b| a.uri.cmp(&b.uri));
        Ok(Some(SearchResult {
            uri: None,
            tracks,
            artists: Vec::new(),
            albums: Vec::new(),
        }))
    }

    async fn get_distinct(
        &self,
        _field: DistinctField,
        _query: Option<&SearchQuery>,
    ) -> Result<BTreeSet<String>> {
        if self.fail {
            return Err(CoreError::backend("broken backend"));
        }
        Ok(self
            .tracks
            .values()
            .flatten()
            .filter_map(|track| track.name.clone())
            .collect())
    }
}

// ===== Playback =====

/// Records every call; tracks in `unplayable` refuse the change, tracks in
/// `untranslatable` veto at URI translation
#[derive(Default)]
pub struct DummyPlayback {
    pub unplayable: HashSet<String>,
    pub untranslatable: HashSet<String>,
    pub position: Mutex<u64>,
    pub calls: Mutex<Vec<String>>,
}

impl DummyPlayback {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_position(&self, position: u64) {
        *self.position.lock().unwrap() = position;
    }

    fn record(&self, operation: &str) {
        self.calls.lock().unwrap().push(operation.to_string());
    }
}

#[async_trait]
impl PlaybackProvider for DummyPlayback {
    async fn prepare_change(&self) -> Result<()> {
        self.record("prepare_change");
        Ok(())
    }

    async fn translate_uri(&self, uri: &str) -> Result<Option<String>> {
        self.record("translate_uri");
        if self.untranslatable.contains(uri) {
            return Ok(None);
        }
        Ok(Some(uri.to_string()))
    }

    async fn change_track(&self, track: &Track) -> Result<bool> {
        self.record("change_track");
        Ok(!self.unplayable.contains(&track.uri))
    }

    async fn play(&self) -> Result<bool> {
        self.record("play");
        Ok(true)
    }

    async fn resume(&self) -> Result<bool> {
        self.record("resume");
        Ok(true)
    }

    async fn pause(&self) -> Result<bool> {
        self.record("pause");
        Ok(true)
    }

    async fn stop(&self) -> Result<bool> {
        self.record("stop");
        Ok(true)
    }

    async fn seek(&self, time_position: u64) -> Result<bool> {
        self.record("seek");
        *self.position.lock().unwrap() = time_position;
        Ok(true)
    }

    async fn get_time_position(&self) -> Result<u64> {
        Ok(*self.position.lock().unwrap())
    }
}

// ===== Playlists =====

/// In-memory playlist store for one scheme
pub struct DummyPlaylists {
    pub scheme: String,
    pub playlists: Mutex<Vec<Playlist>>,
    pub declines_create: bool,
    pub calls: Mutex<Vec<String>>,
}

impl DummyPlaylists {
    pub fn new(scheme: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            playlists: Mutex::new(Vec::new()),
            declines_create: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn declining(scheme: &str) -> Self {
        Self {
            declines_create: true,
            ..Self::new(scheme)
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &str) {
        self.calls.lock().unwrap().push(operation.to_string());
    }
}

#[async_trait]
impl PlaylistsProvider for DummyPlaylists {
    async fn as_list(&self) -> Result<Vec<Ref>> {
        self.record("as_list");
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .iter()
            .map(|playlist| Ref::playlist(&playlist.uri, &playlist.name))
            .collect())
    }

    async fn get_items(&self, uri: &str) -> Result<Option<Vec<Ref>>> {
        self.record("get_items");
        let playlists = self.playlists.lock().unwrap();
        Ok(playlists.iter().find(|playlist| playlist.uri == uri).map(|playlist| {
            playlist
                .tracks
                .iter()
                .map(|track| {
                    Ref::track(&track.uri, track.name.as_deref().unwrap_or(&track.uri))
                })
                .collect()
        }))
    }

    async fn create(&self, name: &str) -> Result<Option<Playlist>> {
        self.record("create");
        if self.declines_create {
            return Ok(None);
        }
        let slug = name.to_lowercase().replace(' ', "-");
        let playlist = Playlist::new(format!("{}:playlist:{slug}", self.scheme), name, Vec::new());
        self.playlists.lock().unwrap().push(playlist.clone());
        Ok(Some(playlist))
    }

    async fn delete(&self, uri: &str) -> Result<bool> {
        self.record("delete");
        let mut playlists = self.playlists.lock().unwrap();
        let before = playlists.len();
        playlists.retain(|playlist| playlist.uri != uri);
        Ok(playlists.len() < before)
    }

    async fn lookup(&self, uri: &str) -> Result<Option<Playlist>> {
        self.record("lookup");
        let playlists = self.playlists.lock().unwrap();
        Ok(playlists.iter().find(|playlist| playlist.uri == uri).cloned())
    }

    async fn save(&self, playlist: &Playlist) -> Result<Option<Playlist>> {
        self.record("save");
        // The store stamps the modification time; the returned value is the
        // one clients must keep
        let mut saved = playlist.clone();
        saved.last_modified = Some(1_700_000_000_000);
        let mut playlists = self.playlists.lock().unwrap();
        match playlists.iter_mut().find(|held| held.uri == playlist.uri) {
            Some(held) => *held = saved.clone(),
            None => return Ok(None),
        }
        Ok(Some(saved))
    }
}

// ===== Assembled backends =====

/// A backend with a static library and a recording playback provider
pub fn playable_backend(scheme: &str, count: usize) -> (Backend, Arc<DummyPlayback>, Vec<Track>) {
    playable_backend_with(scheme, count, DummyPlayback::default())
}

pub fn playable_backend_with(
    scheme: &str,
    count: usize,
    playback: DummyPlayback,
) -> (Backend, Arc<DummyPlayback>, Vec<Track>) {
    let tracks = tracks(scheme, count);
    let playback = Arc::new(playback);
    let backend = Backend::new(format!("{scheme}-backend"), [scheme])
        .with_library(Arc::new(DummyLibrary::with_tracks(tracks.clone())))
        .with_playback(playback.clone() as Arc<dyn PlaybackProvider>);
    (backend, playback, tracks)
}
