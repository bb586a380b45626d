//! The coordinator actor
//!
//! [`spawn`] runs a [`Core`] on its own tokio task behind a FIFO mailbox.
//! Commands and audio notifications share the one mailbox and are processed
//! strictly in submission order, one to completion before the next; that
//! single queue is what serializes every state transition.
//!
//! [`CoreHandle`] is the cloneable client side: each method sends a command
//! carrying a oneshot reply and awaits it. A closed mailbox or dropped reply
//! means the coordinator has shut down.

use crate::core::Core;
use crate::config::CoreConfig;
use crate::events::CoreEvent;
use crate::history::HistoryEntry;
use crate::state::{CoreState, StateCoverage};
use crate::tracklist::TracklistCriteria;
use ensemble_models::{
    AudioEvent, Backend, CoreError, DistinctField, Image, Mixer, PlaybackState, Playlist, Ref,
    Result, SearchQuery, SearchResult, TlId, TlTrack, Track,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const MAILBOX_SIZE: usize = 64;

/// One request to the coordinator
#[allow(missing_docs, clippy::type_complexity)]
pub enum CoreCommand {
    // ===== Coordinator =====
    GetUriSchemes { reply: oneshot::Sender<Vec<String>> },
    SaveState { reply: oneshot::Sender<CoreState> },
    LoadState { state: Box<CoreState>, coverage: StateCoverage, reply: oneshot::Sender<Result<()>> },
    AudioEvent { event: AudioEvent },
    Shutdown,

    // ===== Tracklist =====
    TracklistGetTlTracks { reply: oneshot::Sender<Vec<TlTrack>> },
    TracklistGetTracks { reply: oneshot::Sender<Vec<Track>> },
    TracklistGetLength { reply: oneshot::Sender<usize> },
    TracklistGetVersion { reply: oneshot::Sender<u64> },
    TracklistIndex { tlid: Option<TlId>, reply: oneshot::Sender<Option<usize>> },
    TracklistSlice { start: usize, end: usize, reply: oneshot::Sender<Vec<TlTrack>> },
    TracklistFilter { criteria: Vec<TracklistCriteria>, reply: oneshot::Sender<Result<Vec<TlTrack>>> },
    TracklistAdd {
        tracks: Option<Vec<Track>>,
        uris: Option<Vec<String>>,
        at_position: Option<usize>,
        reply: oneshot::Sender<Result<Vec<TlTrack>>>,
    },
    TracklistRemove { criteria: Vec<TracklistCriteria>, reply: oneshot::Sender<Result<Vec<TlTrack>>> },
    TracklistMove { start: usize, end: usize, to_position: usize, reply: oneshot::Sender<Result<()>> },
    TracklistShuffle { start: Option<usize>, end: Option<usize>, reply: oneshot::Sender<Result<()>> },
    TracklistClear { reply: oneshot::Sender<()> },
    TracklistGetRepeat { reply: oneshot::Sender<bool> },
    TracklistSetRepeat { value: bool, reply: oneshot::Sender<()> },
    TracklistGetRandom { reply: oneshot::Sender<bool> },
    TracklistSetRandom { value: bool, reply: oneshot::Sender<()> },
    TracklistGetConsume { reply: oneshot::Sender<bool> },
    TracklistSetConsume { value: bool, reply: oneshot::Sender<()> },
    TracklistGetSingle { reply: oneshot::Sender<bool> },
    TracklistSetSingle { value: bool, reply: oneshot::Sender<()> },
    TracklistGetNextTlid { reply: oneshot::Sender<Option<TlId>> },
    TracklistGetPreviousTlid { reply: oneshot::Sender<Option<TlId>> },
    TracklistGetEotTlid { reply: oneshot::Sender<Option<TlId>> },

    // ===== Playback =====
    PlaybackGetState { reply: oneshot::Sender<PlaybackState> },
    PlaybackGetCurrentTlTrack { reply: oneshot::Sender<Option<TlTrack>> },
    PlaybackGetCurrentTlid { reply: oneshot::Sender<Option<TlId>> },
    PlaybackGetStreamTitle { reply: oneshot::Sender<Option<String>> },
    PlaybackGetTimePosition { reply: oneshot::Sender<u64> },
    PlaybackPlay { tlid: Option<TlId>, reply: oneshot::Sender<Result<()>> },
    PlaybackNext { reply: oneshot::Sender<()> },
    PlaybackPrevious { reply: oneshot::Sender<()> },
    PlaybackPause { reply: oneshot::Sender<()> },
    PlaybackResume { reply: oneshot::Sender<()> },
    PlaybackStop { reply: oneshot::Sender<()> },
    PlaybackSeek { time_position: i64, reply: oneshot::Sender<Result<bool>> },

    // ===== Library =====
    LibraryBrowse { uri: Option<String>, reply: oneshot::Sender<Vec<Ref>> },
    LibraryLookup { uris: Vec<String>, reply: oneshot::Sender<HashMap<String, Vec<Track>>> },
    LibrarySearch {
        query: Box<SearchQuery>,
        uris: Option<Vec<String>>,
        reply: oneshot::Sender<Result<Vec<SearchResult>>>,
    },
    LibraryGetDistinct {
        field: DistinctField,
        query: Option<Box<SearchQuery>>,
        reply: oneshot::Sender<Result<BTreeSet<String>>>,
    },
    LibraryGetImages { uris: Vec<String>, reply: oneshot::Sender<HashMap<String, Vec<Image>>> },
    LibraryRefresh { uri: Option<String>, reply: oneshot::Sender<()> },

    // ===== Playlists =====
    PlaylistsGetUriSchemes { reply: oneshot::Sender<Vec<String>> },
    PlaylistsAsList { reply: oneshot::Sender<Vec<Ref>> },
    PlaylistsGetItems { uri: String, reply: oneshot::Sender<Option<Vec<Ref>>> },
    PlaylistsCreate { name: String, uri_scheme: Option<String>, reply: oneshot::Sender<Option<Playlist>> },
    PlaylistsDelete { uri: String, reply: oneshot::Sender<bool> },
    PlaylistsLookup { uri: String, reply: oneshot::Sender<Option<Playlist>> },
    PlaylistsRefresh { uri_scheme: Option<String>, reply: oneshot::Sender<()> },
    PlaylistsSave { playlist: Box<Playlist>, reply: oneshot::Sender<Option<Playlist>> },

    // ===== History =====
    HistoryGetHistory { reply: oneshot::Sender<Vec<HistoryEntry>> },
    HistoryGetLength { reply: oneshot::Sender<usize> },

    // ===== Mixer =====
    MixerGetVolume { reply: oneshot::Sender<Option<u32>> },
    MixerSetVolume { volume: u32, reply: oneshot::Sender<Result<bool>> },
    MixerGetMute { reply: oneshot::Sender<Option<bool>> },
    MixerSetMute { mute: bool, reply: oneshot::Sender<bool> },
}

/// Start the coordinator on its own task
///
/// Returns the client handle and the task's join handle. The task ends on
/// [`CoreHandle::shutdown`] or once every handle is dropped.
pub fn spawn(
    config: &CoreConfig,
    backends: Vec<Backend>,
    mixer: Option<Arc<dyn Mixer>>,
) -> Result<(CoreHandle, JoinHandle<()>)> {
    let core = Core::new(config, backends, mixer)?;
    let events = core.event_sender();
    let (tx, rx) = mpsc::channel(MAILBOX_SIZE);

    let task = tokio::spawn(run(core, rx));
    Ok((CoreHandle { tx, events }, task))
}

async fn run(mut core: Core, mut rx: mpsc::Receiver<CoreCommand>) {
    debug!("coordinator started");
    while let Some(command) = rx.recv().await {
        if !handle_command(&mut core, command).await {
            break;
        }
    }
    info!("coordinator stopped");
}

/// Process one command; returns `false` on shutdown
///
/// Reply receivers may be dropped by impatient callers, so send failures are
/// ignored throughout.
#[allow(clippy::too_many_lines)]
async fn handle_command(core: &mut Core, command: CoreCommand) -> bool {
    match command {
        CoreCommand::GetUriSchemes { reply } => {
            let _ = reply.send(core.get_uri_schemes());
        }
        CoreCommand::SaveState { reply } => {
            let _ = reply.send(core.save_state().await);
        }
        CoreCommand::LoadState { state, coverage, reply } => {
            let _ = reply.send(core.load_state(*state, coverage).await);
        }
        CoreCommand::AudioEvent { event } => core.on_audio_event(event).await,
        CoreCommand::Shutdown => return false,

        CoreCommand::TracklistGetTlTracks { reply } => {
            let _ = reply.send(core.tracklist_get_tl_tracks());
        }
        CoreCommand::TracklistGetTracks { reply } => {
            let _ = reply.send(core.tracklist_get_tracks());
        }
        CoreCommand::TracklistGetLength { reply } => {
            let _ = reply.send(core.tracklist_get_length());
        }
        CoreCommand::TracklistGetVersion { reply } => {
            let _ = reply.send(core.tracklist_get_version());
        }
        CoreCommand::TracklistIndex { tlid, reply } => {
            let _ = reply.send(core.tracklist_index(tlid));
        }
        CoreCommand::TracklistSlice { start, end, reply } => {
            let _ = reply.send(core.tracklist_slice(start, end));
        }
        CoreCommand::TracklistFilter { criteria, reply } => {
            let _ = reply.send(core.tracklist_filter(&criteria));
        }
        CoreCommand::TracklistAdd { tracks, uris, at_position, reply } => {
            let _ = reply.send(core.tracklist_add(tracks, uris, at_position).await);
        }
        CoreCommand::TracklistRemove { criteria, reply } => {
            let _ = reply.send(core.tracklist_remove(&criteria).await);
        }
        CoreCommand::TracklistMove { start, end, to_position, reply } => {
            let _ = reply.send(core.tracklist_move(start, end, to_position).await);
        }
        CoreCommand::TracklistShuffle { start, end, reply } => {
            let _ = reply.send(core.tracklist_shuffle(start, end).await);
        }
        CoreCommand::TracklistClear { reply } => {
            core.tracklist_clear().await;
            let _ = reply.send(());
        }
        CoreCommand::TracklistGetRepeat { reply } => {
            let _ = reply.send(core.tracklist_get_repeat());
        }
        CoreCommand::TracklistSetRepeat { value, reply } => {
            core.tracklist_set_repeat(value);
            let _ = reply.send(());
        }
        CoreCommand::TracklistGetRandom { reply } => {
            let _ = reply.send(core.tracklist_get_random());
        }
        CoreCommand::TracklistSetRandom { value, reply } => {
            core.tracklist_set_random(value);
            let _ = reply.send(());
        }
        CoreCommand::TracklistGetConsume { reply } => {
            let _ = reply.send(core.tracklist_get_consume());
        }
        CoreCommand::TracklistSetConsume { value, reply } => {
            core.tracklist_set_consume(value);
            let _ = reply.send(());
        }
        CoreCommand::TracklistGetSingle { reply } => {
            let _ = reply.send(core.tracklist_get_single());
        }
        CoreCommand::TracklistSetSingle { value, reply } => {
            core.tracklist_set_single(value);
            let _ = reply.send(());
        }
        CoreCommand::TracklistGetNextTlid { reply } => {
            let _ = reply.send(core.tracklist_get_next_tlid());
        }
        CoreCommand::TracklistGetPreviousTlid { reply } => {
            let _ = reply.send(core.tracklist_get_previous_tlid());
        }
        CoreCommand::TracklistGetEotTlid { reply } => {
            let _ = reply.send(core.tracklist_get_eot_tlid());
        }

        CoreCommand::PlaybackGetState { reply } => {
            let _ = reply.send(core.playback_get_state());
        }
        CoreCommand::PlaybackGetCurrentTlTrack { reply } => {
            let _ = reply.send(core.playback_get_current_tl_track());
        }
        CoreCommand::PlaybackGetCurrentTlid { reply } => {
            let _ = reply.send(core.playback_get_current_tlid());
        }
        CoreCommand::PlaybackGetStreamTitle { reply } => {
            let _ = reply.send(core.playback_get_stream_title());
        }
        CoreCommand::PlaybackGetTimePosition { reply } => {
            let _ = reply.send(core.playback_get_time_position().await);
        }
        CoreCommand::PlaybackPlay { tlid, reply } => {
            let _ = reply.send(core.playback_play(tlid).await);
        }
        CoreCommand::PlaybackNext { reply } => {
            core.playback_next().await;
            let _ = reply.send(());
        }
        CoreCommand::PlaybackPrevious { reply } => {
            core.playback_previous().await;
            let _ = reply.send(());
        }
        CoreCommand::PlaybackPause { reply } => {
            core.playback_pause().await;
            let _ = reply.send(());
        }
        CoreCommand::PlaybackResume { reply } => {
            core.playback_resume().await;
            let _ = reply.send(());
        }
        CoreCommand::PlaybackStop { reply } => {
            core.playback_stop().await;
            let _ = reply.send(());
        }
        CoreCommand::PlaybackSeek { time_position, reply } => {
            let _ = reply.send(core.playback_seek(time_position).await);
        }

        CoreCommand::LibraryBrowse { uri, reply } => {
            let _ = reply.send(core.library_browse(uri.as_deref()).await);
        }
        CoreCommand::LibraryLookup { uris, reply } => {
            let _ = reply.send(core.library_lookup(&uris).await);
        }
        CoreCommand::LibrarySearch { query, uris, reply } => {
            let _ = reply.send(core.library_search(&query, uris.as_deref()).await);
        }
        CoreCommand::LibraryGetDistinct { field, query, reply } => {
            let query = query.map(|q| *q);
            let _ = reply.send(core.library_get_distinct(field, query.as_ref()).await);
        }
        CoreCommand::LibraryGetImages { uris, reply } => {
            let _ = reply.send(core.library_get_images(&uris).await);
        }
        CoreCommand::LibraryRefresh { uri, reply } => {
            core.library_refresh(uri.as_deref()).await;
            let _ = reply.send(());
        }

        CoreCommand::PlaylistsGetUriSchemes { reply } => {
            let _ = reply.send(core.playlists_get_uri_schemes());
        }
        CoreCommand::PlaylistsAsList { reply } => {
            let _ = reply.send(core.playlists_as_list().await);
        }
        CoreCommand::PlaylistsGetItems { uri, reply } => {
            let _ = reply.send(core.playlists_get_items(&uri).await);
        }
        CoreCommand::PlaylistsCreate { name, uri_scheme, reply } => {
            let _ = reply.send(core.playlists_create(&name, uri_scheme.as_deref()).await);
        }
        CoreCommand::PlaylistsDelete { uri, reply } => {
            let _ = reply.send(core.playlists_delete(&uri).await);
        }
        CoreCommand::PlaylistsLookup { uri, reply } => {
            let _ = reply.send(core.playlists_lookup(&uri).await);
        }
        CoreCommand::PlaylistsRefresh { uri_scheme, reply } => {
            core.playlists_refresh(uri_scheme.as_deref()).await;
            let _ = reply.send(());
        }
        CoreCommand::PlaylistsSave { playlist, reply } => {
            let _ = reply.send(core.playlists_save(&playlist).await);
        }

        CoreCommand::HistoryGetHistory { reply } => {
            let _ = reply.send(core.history_get_history());
        }
        CoreCommand::HistoryGetLength { reply } => {
            let _ = reply.send(core.history_get_length());
        }

        CoreCommand::MixerGetVolume { reply } => {
            let _ = reply.send(core.mixer_get_volume().await);
        }
        CoreCommand::MixerSetVolume { volume, reply } => {
            let _ = reply.send(core.mixer_set_volume(volume).await);
        }
        CoreCommand::MixerGetMute { reply } => {
            let _ = reply.send(core.mixer_get_mute().await);
        }
        CoreCommand::MixerSetMute { mute, reply } => {
            let _ = reply.send(core.mixer_set_mute(mute).await);
        }
    }
    true
}

/// Cloneable client of a spawned coordinator
#[derive(Clone)]
pub struct CoreHandle {
    tx: mpsc::Sender<CoreCommand>,
    events: broadcast::Sender<CoreEvent>,
}

impl CoreHandle {
    async fn request<T>(
        &self,
        command: CoreCommand,
        reply: oneshot::Receiver<T>,
    ) -> Result<T> {
        self.tx.send(command).await.map_err(|_| CoreError::Shutdown)?;
        reply.await.map_err(|_| CoreError::Shutdown)
    }

    /// Subscribe to the coordinator's events
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Deliver a notification from the audio layer
    ///
    /// Queued in order with all other commands; fire-and-forget.
    pub async fn deliver_audio_event(&self, event: AudioEvent) -> Result<()> {
        self.tx
            .send(CoreCommand::AudioEvent { event })
            .await
            .map_err(|_| CoreError::Shutdown)
    }

    /// Ask the coordinator to stop
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(CoreCommand::Shutdown)
            .await
            .map_err(|_| CoreError::Shutdown)
    }

    /// All registered URI schemes, sorted
    pub async fn get_uri_schemes(&self) -> Result<Vec<String>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::GetUriSchemes { reply: tx }, rx).await
    }

    /// Snapshot the full coordinator state
    pub async fn save_state(&self) -> Result<CoreState> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::SaveState { reply: tx }, rx).await
    }

    /// Restore the parts of a snapshot selected by `coverage`
    pub async fn load_state(&self, state: CoreState, coverage: StateCoverage) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            CoreCommand::LoadState { state: Box::new(state), coverage, reply: tx },
            rx,
        )
        .await?
    }

    // ===== Tracklist =====

    /// Current tracklist entries
    pub async fn tracklist_get_tl_tracks(&self) -> Result<Vec<TlTrack>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetTlTracks { reply: tx }, rx).await
    }

    /// Current tracks
    pub async fn tracklist_get_tracks(&self) -> Result<Vec<Track>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetTracks { reply: tx }, rx).await
    }

    /// Tracklist length
    pub async fn tracklist_get_length(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetLength { reply: tx }, rx).await
    }

    /// Tracklist version counter
    pub async fn tracklist_get_version(&self) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetVersion { reply: tx }, rx).await
    }

    /// Position of the entry with the given tlid, or of the current entry
    pub async fn tracklist_index(&self, tlid: Option<TlId>) -> Result<Option<usize>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistIndex { tlid, reply: tx }, rx).await
    }

    /// Entries between `start` and `end`
    pub async fn tracklist_slice(&self, start: usize, end: usize) -> Result<Vec<TlTrack>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistSlice { start, end, reply: tx }, rx).await
    }

    /// Entries matching all the given criteria
    pub async fn tracklist_filter(
        &self,
        criteria: Vec<TracklistCriteria>,
    ) -> Result<Vec<TlTrack>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistFilter { criteria, reply: tx }, rx).await?
    }

    /// Add tracks, or tracks looked up from URIs, to the tracklist
    pub async fn tracklist_add(
        &self,
        tracks: Option<Vec<Track>>,
        uris: Option<Vec<String>>,
        at_position: Option<usize>,
    ) -> Result<Vec<TlTrack>> {
        let (tx, rx) = oneshot::channel();
        self.request(
            CoreCommand::TracklistAdd { tracks, uris, at_position, reply: tx },
            rx,
        )
        .await?
    }

    /// Remove the matching entries
    pub async fn tracklist_remove(
        &self,
        criteria: Vec<TracklistCriteria>,
    ) -> Result<Vec<TlTrack>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistRemove { criteria, reply: tx }, rx).await?
    }

    /// Move the entries in `[start..end)` to `to_position`
    pub async fn tracklist_move(&self, start: usize, end: usize, to_position: usize) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            CoreCommand::TracklistMove { start, end, to_position, reply: tx },
            rx,
        )
        .await?
    }

    /// Shuffle the entries in `[start..end)`, or all of them
    pub async fn tracklist_shuffle(&self, start: Option<usize>, end: Option<usize>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistShuffle { start, end, reply: tx }, rx).await?
    }

    /// Empty the tracklist
    pub async fn tracklist_clear(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistClear { reply: tx }, rx).await
    }

    /// Repeat mode
    pub async fn tracklist_get_repeat(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetRepeat { reply: tx }, rx).await
    }

    /// Set repeat mode
    pub async fn tracklist_set_repeat(&self, value: bool) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistSetRepeat { value, reply: tx }, rx).await
    }

    /// Random mode
    pub async fn tracklist_get_random(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetRandom { reply: tx }, rx).await
    }

    /// Set random mode
    pub async fn tracklist_set_random(&self, value: bool) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistSetRandom { value, reply: tx }, rx).await
    }

    /// Consume mode
    pub async fn tracklist_get_consume(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetConsume { reply: tx }, rx).await
    }

    /// Set consume mode
    pub async fn tracklist_set_consume(&self, value: bool) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistSetConsume { value, reply: tx }, rx).await
    }

    /// Single mode
    pub async fn tracklist_get_single(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetSingle { reply: tx }, rx).await
    }

    /// Set single mode
    pub async fn tracklist_set_single(&self, value: bool) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistSetSingle { value, reply: tx }, rx).await
    }

    /// The entry `next()` would select
    pub async fn tracklist_get_next_tlid(&self) -> Result<Option<TlId>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetNextTlid { reply: tx }, rx).await
    }

    /// The entry `previous()` would select
    pub async fn tracklist_get_previous_tlid(&self) -> Result<Option<TlId>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetPreviousTlid { reply: tx }, rx).await
    }

    /// The entry natural end-of-track advance would select
    pub async fn tracklist_get_eot_tlid(&self) -> Result<Option<TlId>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::TracklistGetEotTlid { reply: tx }, rx).await
    }

    // ===== Playback =====

    /// Playback state
    pub async fn playback_get_state(&self) -> Result<PlaybackState> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackGetState { reply: tx }, rx).await
    }

    /// The currently playing or selected entry
    pub async fn playback_get_current_tl_track(&self) -> Result<Option<TlTrack>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackGetCurrentTlTrack { reply: tx }, rx).await
    }

    /// Tracklist id of the current entry
    pub async fn playback_get_current_tlid(&self) -> Result<Option<TlId>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackGetCurrentTlid { reply: tx }, rx).await
    }

    /// Title reported by the current stream
    pub async fn playback_get_stream_title(&self) -> Result<Option<String>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackGetStreamTitle { reply: tx }, rx).await
    }

    /// Position in the current track, in milliseconds
    pub async fn playback_get_time_position(&self) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackGetTimePosition { reply: tx }, rx).await
    }

    /// Play the given entry, or resume, or pick one
    pub async fn playback_play(&self, tlid: Option<TlId>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackPlay { tlid, reply: tx }, rx).await?
    }

    /// Skip to the next entry
    pub async fn playback_next(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackNext { reply: tx }, rx).await
    }

    /// Skip to the previous entry
    pub async fn playback_previous(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackPrevious { reply: tx }, rx).await
    }

    /// Pause playback
    pub async fn playback_pause(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackPause { reply: tx }, rx).await
    }

    /// Resume paused playback
    pub async fn playback_resume(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackResume { reply: tx }, rx).await
    }

    /// Stop playback
    pub async fn playback_stop(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackStop { reply: tx }, rx).await
    }

    /// Seek to a position in the current track, in milliseconds
    pub async fn playback_seek(&self, time_position: i64) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaybackSeek { time_position, reply: tx }, rx).await?
    }

    // ===== Library =====

    /// Browse a directory, or the merged root
    pub async fn library_browse(&self, uri: Option<String>) -> Result<Vec<Ref>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::LibraryBrowse { uri, reply: tx }, rx).await
    }

    /// Resolve URIs to tracks
    pub async fn library_lookup(&self, uris: Vec<String>) -> Result<HashMap<String, Vec<Track>>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::LibraryLookup { uris, reply: tx }, rx).await
    }

    /// Search all relevant backends
    pub async fn library_search(
        &self,
        query: SearchQuery,
        uris: Option<Vec<String>>,
    ) -> Result<Vec<SearchResult>> {
        let (tx, rx) = oneshot::channel();
        self.request(
            CoreCommand::LibrarySearch { query: Box::new(query), uris, reply: tx },
            rx,
        )
        .await?
    }

    /// Distinct values of a field across the library
    pub async fn library_get_distinct(
        &self,
        field: DistinctField,
        query: Option<SearchQuery>,
    ) -> Result<BTreeSet<String>> {
        let (tx, rx) = oneshot::channel();
        self.request(
            CoreCommand::LibraryGetDistinct { field, query: query.map(Box::new), reply: tx },
            rx,
        )
        .await?
    }

    /// Images for the given URIs
    pub async fn library_get_images(
        &self,
        uris: Vec<String>,
    ) -> Result<HashMap<String, Vec<Image>>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::LibraryGetImages { uris, reply: tx }, rx).await
    }

    /// Refresh backend catalogues
    pub async fn library_refresh(&self, uri: Option<String>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::LibraryRefresh { uri, reply: tx }, rx).await
    }

    // ===== Playlists =====

    /// URI schemes with playlist support
    pub async fn playlists_get_uri_schemes(&self) -> Result<Vec<String>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaylistsGetUriSchemes { reply: tx }, rx).await
    }

    /// References to all playlists
    pub async fn playlists_as_list(&self) -> Result<Vec<Ref>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaylistsAsList { reply: tx }, rx).await
    }

    /// Items of a playlist
    pub async fn playlists_get_items(&self, uri: String) -> Result<Option<Vec<Ref>>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaylistsGetItems { uri, reply: tx }, rx).await
    }

    /// Create a playlist
    pub async fn playlists_create(
        &self,
        name: String,
        uri_scheme: Option<String>,
    ) -> Result<Option<Playlist>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaylistsCreate { name, uri_scheme, reply: tx }, rx).await
    }

    /// Delete a playlist
    pub async fn playlists_delete(&self, uri: String) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaylistsDelete { uri, reply: tx }, rx).await
    }

    /// Look up a playlist
    pub async fn playlists_lookup(&self, uri: String) -> Result<Option<Playlist>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaylistsLookup { uri, reply: tx }, rx).await
    }

    /// Reload playlists from backends
    pub async fn playlists_refresh(&self, uri_scheme: Option<String>) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::PlaylistsRefresh { uri_scheme, reply: tx }, rx).await
    }

    /// Save a playlist
    pub async fn playlists_save(&self, playlist: Playlist) -> Result<Option<Playlist>> {
        let (tx, rx) = oneshot::channel();
        self.request(
            CoreCommand::PlaylistsSave { playlist: Box::new(playlist), reply: tx },
            rx,
        )
        .await
    }

    // ===== History =====

    /// Recently played tracks, most recent first
    pub async fn history_get_history(&self) -> Result<Vec<HistoryEntry>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::HistoryGetHistory { reply: tx }, rx).await
    }

    /// Number of history entries
    pub async fn history_get_length(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::HistoryGetLength { reply: tx }, rx).await
    }

    // ===== Mixer =====

    /// Current volume
    pub async fn mixer_get_volume(&self) -> Result<Option<u32>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::MixerGetVolume { reply: tx }, rx).await
    }

    /// Set the volume
    pub async fn mixer_set_volume(&self, volume: u32) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::MixerSetVolume { volume, reply: tx }, rx).await?
    }

    /// Current mute state
    pub async fn mixer_get_mute(&self) -> Result<Option<bool>> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::MixerGetMute { reply: tx }, rx).await
    }

    /// Set the mute state
    pub async fn mixer_set_mute(&self, mute: bool) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreCommand::MixerSetMute { mute, reply: tx }, rx).await
    }
}
