//! The coordinator
//!
//! [`Core`] owns every controller and all coordination state. Each public
//! method runs to completion before the next starts (the actor in
//! [`crate::actor`] guarantees this), so no two state transitions ever
//! interleave.
//!
//! Tracklist mutations are wrapped here: after any operation that bumped the
//! tracklist version, playback revalidates its current selection and a
//! `tracklist_changed` event goes out. This includes playback operations that
//! mutate the tracklist indirectly, such as consume-mode removal.

use crate::config::CoreConfig;
use crate::events::{CoreEvent, EventEmitter};
use crate::history::{HistoryController, HistoryEntry};
use crate::library::LibraryController;
use crate::mixer::MixerController;
use crate::playback::PlaybackController;
use crate::playlists::PlaylistsController;
use crate::registry::BackendRegistry;
use crate::state::{CoreState, StateCoverage};
use crate::tracklist::{Tracklist, TracklistCriteria};
use ensemble_models::{
    AudioEvent, Backend, CoreError, DistinctField, Image, Mixer, PlaybackState, Playlist, Ref,
    Result, SearchQuery, SearchResult, TlId, TlTrack, Track,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::broadcast;

/// The coordination core
pub struct Core {
    registry: Arc<BackendRegistry>,
    events: EventEmitter,
    tracklist: Tracklist,
    playback: PlaybackController,
    library: LibraryController,
    playlists: PlaylistsController,
    history: HistoryController,
    mixer: MixerController,
}

impl Core {
    /// Wire up the coordinator from backend registrations and an optional
    /// mixer
    pub fn new(
        config: &CoreConfig,
        backends: Vec<Backend>,
        mixer: Option<Arc<dyn Mixer>>,
    ) -> Result<Self> {
        let registry = Arc::new(BackendRegistry::new(backends, config)?);
        let events = EventEmitter::new(config.event_buffer_size);

        Ok(Self {
            tracklist: Tracklist::new(config.max_tracklist_length),
            playback: PlaybackController::new(Arc::clone(&registry), events.clone()),
            library: LibraryController::new(Arc::clone(&registry)),
            playlists: PlaylistsController::new(Arc::clone(&registry), events.clone()),
            history: HistoryController::new(config.max_history_length),
            mixer: MixerController::new(mixer, events.clone(), config),
            registry,
            events,
        })
    }

    /// Subscribe to the coordinator's events
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<CoreEvent> {
        self.events.sender()
    }

    /// All registered URI schemes, sorted
    pub fn get_uri_schemes(&self) -> Vec<String> {
        self.registry.uri_schemes().to_vec()
    }

    // ===== Tracklist =====

    /// Current tracklist entries
    pub fn tracklist_get_tl_tracks(&self) -> Vec<TlTrack> {
        self.tracklist.tl_tracks().to_vec()
    }

    /// Current tracks
    pub fn tracklist_get_tracks(&self) -> Vec<Track> {
        self.tracklist.tracks()
    }

    /// Tracklist length
    pub fn tracklist_get_length(&self) -> usize {
        self.tracklist.len()
    }

    /// Tracklist version counter
    pub fn tracklist_get_version(&self) -> u64 {
        self.tracklist.version()
    }

    /// Position of the entry with the given tlid, or of the current entry
    pub fn tracklist_index(&self, tlid: Option<TlId>) -> Option<usize> {
        let tlid = tlid.or_else(|| self.playback.get_current_tlid())?;
        self.tracklist.index_of(tlid)
    }

    /// Entries between `start` and `end`
    pub fn tracklist_slice(&self, start: usize, end: usize) -> Vec<TlTrack> {
        self.tracklist.slice(start, end)
    }

    /// Entries matching all the given criteria
    pub fn tracklist_filter(&self, criteria: &[TracklistCriteria]) -> Result<Vec<TlTrack>> {
        self.tracklist.filter(criteria)
    }

    /// Add tracks, or tracks looked up from URIs, to the tracklist
    ///
    /// Exactly one of `tracks` and `uris` must be given. URIs resolve through
    /// the library fan-out, each possibly expanding to several tracks, in
    /// input order.
    pub async fn tracklist_add(
        &mut self,
        tracks: Option<Vec<Track>>,
        uris: Option<Vec<String>>,
        at_position: Option<usize>,
    ) -> Result<Vec<TlTrack>> {
        let tracks = match (tracks, uris) {
            (Some(tracks), None) => tracks,
            (None, Some(uris)) => {
                let mut looked_up = self.library.lookup(&uris).await;
                let mut tracks = Vec::new();
                for uri in &uris {
                    tracks.extend(looked_up.remove(uri).unwrap_or_default());
                }
                tracks
            }
            _ => {
                return Err(CoreError::validation(
                    "Exactly one of tracks and uris must be provided",
                ))
            }
        };

        let version = self.tracklist.version();
        let outcome = self.tracklist.add_tracks(tracks, at_position);
        self.sync_tracklist(version).await;
        outcome
    }

    /// Remove the matching entries
    pub async fn tracklist_remove(
        &mut self,
        criteria: &[TracklistCriteria],
    ) -> Result<Vec<TlTrack>> {
        let version = self.tracklist.version();
        let outcome = self.tracklist.remove(criteria);
        self.sync_tracklist(version).await;
        outcome
    }

    /// Move the entries in `[start..end)` to `to_position`
    pub async fn tracklist_move(
        &mut self,
        start: usize,
        end: usize,
        to_position: usize,
    ) -> Result<()> {
        let version = self.tracklist.version();
        let outcome = self.tracklist.move_range(start, end, to_position);
        self.sync_tracklist(version).await;
        outcome
    }

    /// Shuffle the entries in `[start..end)`, or all of them
    pub async fn tracklist_shuffle(
        &mut self,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Result<()> {
        let version = self.tracklist.version();
        let outcome = self.tracklist.shuffle_range(start, end);
        self.sync_tracklist(version).await;
        outcome
    }

    /// Empty the tracklist
    pub async fn tracklist_clear(&mut self) {
        let version = self.tracklist.version();
        self.tracklist.clear();
        self.sync_tracklist(version).await;
    }

    /// Repeat mode
    pub fn tracklist_get_repeat(&self) -> bool {
        self.tracklist.get_repeat()
    }

    /// Set repeat mode
    pub fn tracklist_set_repeat(&mut self, value: bool) {
        if self.tracklist.set_repeat(value) {
            self.events.emit(CoreEvent::OptionsChanged);
        }
    }

    /// Random mode
    pub fn tracklist_get_random(&self) -> bool {
        self.tracklist.get_random()
    }

    /// Set random mode
    pub fn tracklist_set_random(&mut self, value: bool) {
        if self.tracklist.set_random(value) {
            self.events.emit(CoreEvent::OptionsChanged);
        }
    }

    /// Consume mode
    pub fn tracklist_get_consume(&self) -> bool {
        self.tracklist.get_consume()
    }

    /// Set consume mode
    pub fn tracklist_set_consume(&mut self, value: bool) {
        if self.tracklist.set_consume(value) {
            self.events.emit(CoreEvent::OptionsChanged);
        }
    }

    /// Single mode
    pub fn tracklist_get_single(&self) -> bool {
        self.tracklist.get_single()
    }

    /// Set single mode
    pub fn tracklist_set_single(&mut self, value: bool) {
        if self.tracklist.set_single(value) {
            self.events.emit(CoreEvent::OptionsChanged);
        }
    }

    /// The entry `next()` would select
    pub fn tracklist_get_next_tlid(&mut self) -> Option<TlId> {
        let current = self.playback.get_current_tl_track();
        self.tracklist.next_track(current.as_ref()).map(|tl| tl.tlid)
    }

    /// The entry `previous()` would select
    pub fn tracklist_get_previous_tlid(&self) -> Option<TlId> {
        let current = self.playback.get_current_tl_track();
        self.tracklist
            .previous_track(current.as_ref())
            .map(|tl| tl.tlid)
    }

    /// The entry natural end-of-track advance would select
    pub fn tracklist_get_eot_tlid(&mut self) -> Option<TlId> {
        let current = self.playback.get_current_tl_track();
        self.tracklist.eot_track(current.as_ref()).map(|tl| tl.tlid)
    }

    // ===== Playback =====

    /// Playback state
    pub fn playback_get_state(&self) -> PlaybackState {
        self.playback.get_state()
    }

    /// The currently playing or selected entry
    pub fn playback_get_current_tl_track(&self) -> Option<TlTrack> {
        self.playback.get_current_tl_track()
    }

    /// The currently playing or selected track
    pub fn playback_get_current_track(&self) -> Option<Track> {
        self.playback.get_current_tl_track().map(|tl| tl.track)
    }

    /// Tracklist id of the current entry
    pub fn playback_get_current_tlid(&self) -> Option<TlId> {
        self.playback.get_current_tlid()
    }

    /// Title reported by the current stream
    pub fn playback_get_stream_title(&self) -> Option<String> {
        self.playback.get_stream_title()
    }

    /// Position in the current track, in milliseconds
    pub async fn playback_get_time_position(&self) -> u64 {
        self.playback.get_time_position().await
    }

    /// Play the given entry, or resume, or pick one
    pub async fn playback_play(&mut self, tlid: Option<TlId>) -> Result<()> {
        if let Some(tlid) = tlid {
            if tlid < 1 {
                return Err(CoreError::validation("tlid must be at least 1"));
            }
        }
        let version = self.tracklist.version();
        let outcome = self.playback.play(&mut self.tracklist, tlid).await;
        self.sync_tracklist(version).await;
        outcome
    }

    /// Skip to the next entry
    pub async fn playback_next(&mut self) {
        let version = self.tracklist.version();
        self.playback.next(&mut self.tracklist).await;
        self.sync_tracklist(version).await;
    }

    /// Skip to the previous entry
    pub async fn playback_previous(&mut self) {
        let version = self.tracklist.version();
        self.playback.previous(&mut self.tracklist).await;
        self.sync_tracklist(version).await;
    }

    /// Pause playback
    pub async fn playback_pause(&mut self) {
        self.playback.pause().await;
    }

    /// Resume paused playback
    pub async fn playback_resume(&mut self) {
        self.playback.resume().await;
    }

    /// Stop playback
    pub async fn playback_stop(&mut self) {
        self.playback.stop().await;
    }

    /// Seek to a position in the current track, in milliseconds
    pub async fn playback_seek(&mut self, time_position: i64) -> Result<bool> {
        let version = self.tracklist.version();
        let outcome = self.playback.seek(&mut self.tracklist, time_position).await;
        self.sync_tracklist(version).await;
        outcome
    }

    // ===== Library =====

    /// Browse a directory, or the merged root
    pub async fn library_browse(&self, uri: Option<&str>) -> Vec<Ref> {
        self.library.browse(uri).await
    }

    /// Resolve URIs to tracks
    pub async fn library_lookup(&self, uris: &[String]) -> HashMap<String, Vec<Track>> {
        self.library.lookup(uris).await
    }

    /// Search all relevant backends
    pub async fn library_search(
        &self,
        query: &SearchQuery,
        uris: Option<&[String]>,
    ) -> Result<Vec<SearchResult>> {
        self.library.search(query, uris).await
    }

    /// Distinct values of a field across the library
    pub async fn library_get_distinct(
        &self,
        field: DistinctField,
        query: Option<&SearchQuery>,
    ) -> Result<BTreeSet<String>> {
        self.library.get_distinct(field, query).await
    }

    /// Images for the given URIs
    pub async fn library_get_images(&self, uris: &[String]) -> HashMap<String, Vec<Image>> {
        self.library.get_images(uris).await
    }

    /// Refresh backend catalogues
    pub async fn library_refresh(&self, uri: Option<&str>) {
        self.library.refresh(uri).await;
    }

    // ===== Playlists =====

    /// URI schemes with playlist support
    pub fn playlists_get_uri_schemes(&self) -> Vec<String> {
        self.playlists.get_uri_schemes()
    }

    /// References to all playlists
    pub async fn playlists_as_list(&self) -> Vec<Ref> {
        self.playlists.as_list().await
    }

    /// Items of a playlist
    pub async fn playlists_get_items(&self, uri: &str) -> Option<Vec<Ref>> {
        self.playlists.get_items(uri).await
    }

    /// Create a playlist
    pub async fn playlists_create(&self, name: &str, uri_scheme: Option<&str>) -> Option<Playlist> {
        self.playlists.create(name, uri_scheme).await
    }

    /// Delete a playlist
    pub async fn playlists_delete(&self, uri: &str) -> bool {
        self.playlists.delete(uri).await
    }

    /// Look up a playlist
    pub async fn playlists_lookup(&self, uri: &str) -> Option<Playlist> {
        self.playlists.lookup(uri).await
    }

    /// Reload playlists from backends
    pub async fn playlists_refresh(&self, uri_scheme: Option<&str>) {
        self.playlists.refresh(uri_scheme).await;
    }

    /// Save a playlist
    pub async fn playlists_save(&self, playlist: &Playlist) -> Option<Playlist> {
        self.playlists.save(playlist).await
    }

    // ===== History =====

    /// Recently played tracks, most recent first
    pub fn history_get_history(&self) -> Vec<HistoryEntry> {
        self.history.get_history()
    }

    /// Number of history entries
    pub fn history_get_length(&self) -> usize {
        self.history.get_length()
    }

    // ===== Mixer =====

    /// Current volume
    pub async fn mixer_get_volume(&self) -> Option<u32> {
        self.mixer.get_volume().await
    }

    /// Set the volume
    pub async fn mixer_set_volume(&self, volume: u32) -> Result<bool> {
        self.mixer.set_volume(volume).await
    }

    /// Current mute state
    pub async fn mixer_get_mute(&self) -> Option<bool> {
        self.mixer.get_mute().await
    }

    /// Set the mute state
    pub async fn mixer_set_mute(&self, mute: bool) -> bool {
        self.mixer.set_mute(mute).await
    }

    // ===== Audio notifications =====

    /// Handle a notification from the audio layer
    pub async fn on_audio_event(&mut self, event: AudioEvent) {
        let version = self.tracklist.version();
        match event {
            AudioEvent::AboutToFinish => {
                self.playback.on_about_to_finish(&mut self.tracklist).await;
            }
            AudioEvent::StreamChanged { uri } => {
                self.playback
                    .on_stream_changed(&mut self.tracklist, &mut self.history, uri)
                    .await;
            }
            AudioEvent::EndOfStream => self.playback.on_end_of_stream(),
            AudioEvent::PositionChanged { position } => {
                self.playback.on_position_changed(position).await;
            }
            AudioEvent::TagsChanged { tags } => self.playback.on_tags_changed(&tags),
        }
        self.sync_tracklist(version).await;
    }

    // ===== Persistence =====

    /// Snapshot the full coordinator state
    pub async fn save_state(&self) -> CoreState {
        CoreState {
            tracklist: self.tracklist.save_state(),
            playback: self.playback.save_state().await,
            mixer: self.mixer.save_state().await,
            history: self.history.save_state(),
        }
    }

    /// Restore the parts of a snapshot selected by `coverage`
    pub async fn load_state(&mut self, state: CoreState, coverage: StateCoverage) -> Result<()> {
        if coverage.history {
            self.history.load_state(state.history);
        }
        if coverage.mixer {
            self.mixer.load_state(&state.mixer).await?;
        }
        if coverage.modes {
            self.tracklist_set_repeat(state.tracklist.repeat);
            self.tracklist_set_random(state.tracklist.random);
            self.tracklist_set_consume(state.tracklist.consume);
            self.tracklist_set_single(state.tracklist.single);
        }
        if coverage.tracklist {
            let version = self.tracklist.version();
            self.tracklist.load_entries(&state.tracklist);
            self.sync_tracklist(version).await;
        }
        if coverage.play_last {
            let version = self.tracklist.version();
            let outcome = self
                .playback
                .load_state(&mut self.tracklist, &state.playback)
                .await;
            self.sync_tracklist(version).await;
            outcome?;
        }
        Ok(())
    }

    async fn sync_tracklist(&mut self, version_before: u64) {
        if self.tracklist.version() == version_before {
            return;
        }
        self.playback.on_tracklist_change(&self.tracklist).await;
        self.events.emit(CoreEvent::TracklistChanged);
    }
}
