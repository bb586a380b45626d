//! Playback state machine
//!
//! Drives the stopped/playing/paused state, the track-change choreography,
//! and end-of-track advancement. Candidate selection lives in the tracklist;
//! this controller asks it for candidates and skips the unplayable ones,
//! bounded so a tracklist with no playable track under repeat still
//! terminates.
//!
//! All methods take the tracklist by mutable reference; the coordinator owns
//! both controllers and serializes every call, so the two never race.

use crate::history::HistoryController;
use crate::registry::BackendRegistry;
use crate::events::{CoreEvent, EventEmitter};
use crate::state::PlaybackSnapshot;
use crate::tracklist::Tracklist;
use ensemble_models::{PlaybackProvider, PlaybackState, Result, TlId, TlTrack};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The playback session and its transitions
pub struct PlaybackController {
    registry: Arc<BackendRegistry>,
    events: EventEmitter,

    state: PlaybackState,
    current: Option<TlTrack>,
    // Set while a track change is in flight; promoted to current once the
    // audio layer confirms the new stream
    pending: Option<TlTrack>,

    stream_title: Option<String>,
    last_position: u64,
    pending_seek: Option<u64>,

    // Applied to the first track start after a state restore
    start_at_position: Option<u64>,
    start_paused: bool,
}

impl PlaybackController {
    /// Create a stopped controller
    pub fn new(registry: Arc<BackendRegistry>, events: EventEmitter) -> Self {
        Self {
            registry,
            events,
            state: PlaybackState::Stopped,
            current: None,
            pending: None,
            stream_title: None,
            last_position: 0,
            pending_seek: None,
            start_at_position: None,
            start_paused: false,
        }
    }

    // ===== Queries =====

    /// Current playback state
    pub fn get_state(&self) -> PlaybackState {
        self.state
    }

    /// The currently playing or selected entry
    pub fn get_current_tl_track(&self) -> Option<TlTrack> {
        self.current.clone()
    }

    /// Tracklist id of the current entry
    pub fn get_current_tlid(&self) -> Option<TlId> {
        self.current.as_ref().map(|tl| tl.tlid)
    }

    /// Title reported by the current stream, if any
    pub fn get_stream_title(&self) -> Option<String> {
        self.stream_title.clone()
    }

    /// Position in the current track, in milliseconds
    ///
    /// While a seek is settling the seek target is authoritative.
    pub async fn get_time_position(&self) -> u64 {
        if let Some(position) = self.pending_seek {
            return position;
        }
        match self.provider_for(self.current.as_ref()) {
            Some((name, provider)) => self
                .registry
                .contain(&name, "get_time_position", provider.get_time_position())
                .await
                .unwrap_or(0),
            None => 0,
        }
    }

    // ===== Operations =====

    /// Start playing the entry with the given tlid, or pick one
    ///
    /// With no tlid a paused session just resumes. Otherwise the target is
    /// the requested entry if present, else the current or in-flight entry,
    /// else the head of the playback order. Unplayable candidates are skipped
    /// through the tracklist's "next" selection.
    pub async fn play(&mut self, tracklist: &mut Tracklist, tlid: Option<TlId>) -> Result<()> {
        if tlid.is_none() && self.state == PlaybackState::Paused {
            self.resume().await;
            return Ok(());
        }

        let target = match tlid {
            Some(tlid) => {
                let found = tracklist.get(tlid);
                if found.is_none() {
                    warn!(tlid, "tlid not found in the tracklist");
                }
                found
            }
            None => None,
        };

        let current = self.pending.clone().or_else(|| self.current.clone());
        let original = self.current.clone();
        let mut pending = target
            .or_else(|| current.clone())
            .or_else(|| tracklist.next_track(None));

        if original != pending && self.state != PlaybackState::Stopped {
            let position = self.get_time_position().await;
            self.emit_ended(position);
        }

        // Bounded so repeat with nothing playable cannot loop forever
        let mut attempts_left = tracklist.len() * 2;
        while let Some(candidate) = pending {
            if self
                .change(tracklist, Some(candidate.clone()), PlaybackState::Playing)
                .await
            {
                break;
            }
            tracklist.mark_unplayable(&candidate);
            pending = tracklist.next_track(Some(&candidate));
            if attempts_left == 0 {
                info!("no playable track in the tracklist");
                break;
            }
            attempts_left -= 1;
        }

        tracklist.mark_played(original.as_ref());
        Ok(())
    }

    /// Skip to the next entry, preserving the playing/paused state
    pub async fn next(&mut self, tracklist: &mut Tracklist) {
        let state = self.state;
        let position = self.get_time_position().await;
        self.emit_ended(position);
        let original = self.current.clone();

        let mut current = self.pending.clone().or_else(|| self.current.clone());
        let mut attempts_left = tracklist.len() * 2;
        while let Some(reference) = current {
            let pending = tracklist.next_track(Some(&reference));
            if self.change(tracklist, pending.clone(), state).await {
                break;
            }
            if let Some(candidate) = &pending {
                tracklist.mark_unplayable(candidate);
            }
            current = pending;
            if attempts_left == 0 {
                info!("no playable track in the tracklist");
                break;
            }
            attempts_left -= 1;
        }

        tracklist.mark_played(original.as_ref());
    }

    /// Skip to the previous entry, preserving the playing/paused state
    ///
    /// Unlike natural completion this never marks the left entry as played,
    /// so consume mode does not remove it.
    pub async fn previous(&mut self, tracklist: &mut Tracklist) {
        let state = self.state;
        let position = self.get_time_position().await;
        self.emit_ended(position);

        let mut current = self.pending.clone().or_else(|| self.current.clone());
        let mut attempts_left = tracklist.len() * 2;
        while let Some(reference) = current {
            let pending = tracklist.previous_track(Some(&reference));
            if self.change(tracklist, pending.clone(), state).await {
                break;
            }
            if let Some(candidate) = &pending {
                tracklist.mark_unplayable(candidate);
            }
            current = pending;
            if attempts_left == 0 {
                info!("no playable track in the tracklist");
                break;
            }
            attempts_left -= 1;
        }
    }

    /// Pause playback
    pub async fn pause(&mut self) {
        let accepted = match self.provider_for(self.current.as_ref()) {
            Some((name, provider)) => self
                .registry
                .contain(&name, "pause", provider.pause())
                .await
                .unwrap_or(false),
            None => true,
        };
        if accepted {
            self.set_state(PlaybackState::Paused);
            if let Some(tl_track) = self.current.clone() {
                let time_position = self.get_time_position().await;
                self.events.emit(CoreEvent::TrackPlaybackPaused {
                    tl_track,
                    time_position,
                });
            }
        }
    }

    /// Resume paused playback
    pub async fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        let Some((name, provider)) = self.provider_for(self.current.as_ref()) else {
            return;
        };
        let accepted = self
            .registry
            .contain(&name, "resume", provider.resume())
            .await
            .unwrap_or(false);
        if accepted {
            self.set_state(PlaybackState::Playing);
            if let Some(tl_track) = self.current.clone() {
                let time_position = self.get_time_position().await;
                self.events.emit(CoreEvent::TrackPlaybackResumed {
                    tl_track,
                    time_position,
                });
            }
        }
    }

    /// Stop playback
    ///
    /// Records the position first so later end reporting can use it.
    pub async fn stop(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        self.last_position = self.get_time_position().await;
        let accepted = match self.provider_for(self.current.as_ref()) {
            Some((name, provider)) => self
                .registry
                .contain(&name, "stop", provider.stop())
                .await
                .unwrap_or(false),
            None => true,
        };
        if accepted {
            self.set_state(PlaybackState::Stopped);
        }
    }

    /// Seek to a position in the current track, in milliseconds
    ///
    /// Negative positions clamp to zero; positions past the track's end
    /// forward to [`PlaybackController::next`]. Seeking a stopped session
    /// starts playback first and seeks within the track that starts. Fails
    /// softly (`false`) with an empty tracklist, an unknown track duration,
    /// or no backend.
    pub async fn seek(&mut self, tracklist: &mut Tracklist, time_position: i64) -> Result<bool> {
        let time_position = u64::try_from(time_position).unwrap_or_else(|_| {
            debug!("negative seek position clamped to zero");
            0
        });

        if tracklist.is_empty() {
            return Ok(false);
        }

        // From a dead stop there is nothing to seek in yet; start playback
        // so a pending entry exists, then seek within it
        if self.state == PlaybackState::Stopped {
            self.play(tracklist, None).await?;
        }

        let Some(tl_track) = self.current.clone().or_else(|| self.pending.clone()) else {
            return Ok(false);
        };
        let Some(length) = tl_track.track.length else {
            return Ok(false);
        };

        if time_position > length {
            // The audio layer cannot seek past the end; advance instead
            self.next(tracklist).await;
            return Ok(true);
        }

        Ok(self.seek_internal(tracklist, time_position).await)
    }

    // ===== Audio notifications =====

    /// Gapless look-ahead: prepare the end-of-track successor
    ///
    /// Asks the successor's backend to get the track ready without touching
    /// the playback state; the prepared entry becomes pending until the
    /// stream change confirms it. Failed candidates are marked unplayable,
    /// with the same retry bound as `play`.
    pub async fn on_about_to_finish(&mut self, tracklist: &mut Tracklist) {
        if self.state == PlaybackState::Stopped {
            return;
        }

        let original = self.current.clone();
        let mut candidate = tracklist.eot_track(original.as_ref());
        let mut attempts_left = tracklist.len() * 2;
        while let Some(tl_track) = candidate {
            if self.prepare_track(&tl_track).await {
                self.pending = Some(tl_track);
                break;
            }
            tracklist.mark_unplayable(&tl_track);
            candidate = tracklist.eot_track(Some(&tl_track));
            if attempts_left == 0 {
                info!("no playable track in the tracklist");
                break;
            }
            attempts_left -= 1;
        }

        tracklist.mark_played(original.as_ref());
    }

    /// The audio layer confirmed a new stream: promote the pending entry
    pub async fn on_stream_changed(
        &mut self,
        tracklist: &mut Tracklist,
        history: &mut HistoryController,
        _uri: Option<String>,
    ) {
        self.stream_title = None;

        let Some(next) = self.pending.take() else {
            return;
        };

        let position = self.pending_seek.unwrap_or(self.last_position);
        self.emit_ended(position);
        self.current = Some(next.clone());

        tracklist.mark_playing(&next);
        history.add(&next.track);
        self.events
            .emit(CoreEvent::TrackPlaybackStarted { tl_track: next });

        if let Some(target) = self.pending_seek {
            // A seek raced the change; apply it to the stream that won
            self.backend_seek(target).await;
            return;
        }

        if let Some(position) = self.start_at_position.take() {
            self.seek_internal(tracklist, position).await;
        }
        if self.start_paused {
            self.start_paused = false;
            self.pause().await;
        }
    }

    /// Nothing follows the stream that just ended
    pub fn on_end_of_stream(&mut self) {
        if self.pending.is_some() {
            return;
        }
        self.set_state(PlaybackState::Stopped);
        self.emit_ended(self.last_position);
        self.current = None;
        self.stream_title = None;
    }

    /// The audio layer reported a new position
    pub async fn on_position_changed(&mut self, position: u64) {
        self.last_position = position;
        if let Some(target) = self.pending_seek.take() {
            self.events.emit(CoreEvent::Seeked {
                time_position: target,
            });
            if self.start_paused {
                self.start_paused = false;
                self.pause().await;
            }
        }
    }

    /// In-stream tags changed; track the stream title
    pub fn on_tags_changed(&mut self, tags: &HashMap<String, Vec<String>>) {
        let Some(title) = tags
            .get("title")
            .and_then(|values| values.first())
            .filter(|title| !title.is_empty())
        else {
            return;
        };
        if self.stream_title.as_deref() == Some(title.as_str()) {
            return;
        }
        self.stream_title = Some(title.clone());
        self.events.emit(CoreEvent::StreamTitleChanged {
            title: title.clone(),
        });
    }

    /// The tracklist changed underneath us; revalidate the session
    pub async fn on_tracklist_change(&mut self, tracklist: &Tracklist) {
        if tracklist.is_empty() {
            self.stop().await;
            self.current = None;
            self.pending = None;
            return;
        }
        if let Some(current) = &self.current {
            if tracklist.index_of(current.tlid).is_none() {
                self.current = None;
            }
        }
        if let Some(pending) = &self.pending {
            if tracklist.index_of(pending.tlid).is_none() {
                self.pending = None;
            }
        }
    }

    // ===== Persistence =====

    /// Snapshot the session for persistence
    pub async fn save_state(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            tlid: self.get_current_tlid(),
            time_position: self.get_time_position().await,
            state: self.state,
        }
    }

    /// Restart the saved track, deferring position and pause
    ///
    /// The saved position and paused flag are applied once the audio layer
    /// confirms the first stream, not before.
    pub async fn load_state(
        &mut self,
        tracklist: &mut Tracklist,
        snapshot: &PlaybackSnapshot,
    ) -> Result<()> {
        let Some(tlid) = snapshot.tlid else {
            return Ok(());
        };
        match snapshot.state {
            PlaybackState::Paused => {
                self.start_paused = true;
                self.start_at_position = Some(snapshot.time_position);
            }
            PlaybackState::Playing => {
                self.start_at_position = Some(snapshot.time_position);
            }
            PlaybackState::Stopped => return Ok(()),
        }
        self.play(tracklist, Some(tlid)).await
    }

    // ===== Internals =====

    /// The track-change choreography
    ///
    /// Returns whether the change succeeded; a `None` target normalizes
    /// "ran out of tracklist" into the end-of-stream cleanup and counts as
    /// success.
    async fn change(
        &mut self,
        _tracklist: &mut Tracklist,
        target: Option<TlTrack>,
        state: PlaybackState,
    ) -> bool {
        self.pending = target.clone();

        let Some(tl_track) = target else {
            self.stop().await;
            self.on_end_of_stream();
            return true;
        };

        let Some((name, provider)) = self.provider_for(Some(&tl_track)) else {
            return false;
        };

        // The backend is about to drop its playback context
        self.last_position = self.get_time_position().await;

        self.registry
            .contain(&name, "prepare_change", provider.prepare_change())
            .await;

        if !self.change_track_on(&name, &provider, &tl_track).await {
            return false;
        }

        match state {
            PlaybackState::Playing => {
                let started = self
                    .registry
                    .contain(&name, "play", provider.play())
                    .await
                    .unwrap_or(false);
                if started {
                    self.set_state(PlaybackState::Playing);
                }
                started
            }
            PlaybackState::Paused => {
                let paused = self
                    .registry
                    .contain(&name, "pause", provider.pause())
                    .await
                    .unwrap_or(false);
                if paused {
                    self.set_state(PlaybackState::Paused);
                }
                paused
            }
            PlaybackState::Stopped => {
                // Select without starting the backend
                self.current = self.pending.take();
                true
            }
        }
    }

    /// Prepare a track on its backend without driving the playback state
    async fn prepare_track(&self, tl_track: &TlTrack) -> bool {
        let Some((name, provider)) = self.provider_for(Some(tl_track)) else {
            return false;
        };
        self.change_track_on(&name, &provider, tl_track).await
    }

    /// Translate the URI and hand the track to the backend
    ///
    /// A `None` translation is the backend's playability veto.
    async fn change_track_on(
        &self,
        name: &str,
        provider: &Arc<dyn PlaybackProvider>,
        tl_track: &TlTrack,
    ) -> bool {
        let translated = self
            .registry
            .contain(name, "translate_uri", provider.translate_uri(&tl_track.track.uri))
            .await
            .flatten();
        let Some(uri) = translated else {
            return false;
        };

        let mut track = tl_track.track.clone();
        if track.uri != uri {
            track.uri = uri;
        }
        self.registry
            .contain(name, "change_track", provider.change_track(&track))
            .await
            .unwrap_or(false)
    }

    async fn seek_internal(&mut self, tracklist: &mut Tracklist, time_position: u64) -> bool {
        self.pending_seek = Some(time_position);

        if let Some(pending) = self.pending.clone() {
            // Mid-change: redo the change so the completion applies the seek
            let state = self.state;
            return self.change(tracklist, Some(pending), state).await;
        }

        self.backend_seek(time_position).await
    }

    async fn backend_seek(&self, time_position: u64) -> bool {
        let Some((name, provider)) = self.provider_for(self.current.as_ref()) else {
            return false;
        };
        self.registry
            .contain(&name, "seek", provider.seek(time_position))
            .await
            .unwrap_or(false)
    }

    fn provider_for(
        &self,
        tl_track: Option<&TlTrack>,
    ) -> Option<(String, Arc<dyn PlaybackProvider>)> {
        let tl_track = tl_track?;
        self.registry
            .playback_for(&tl_track.track.uri)
            .map(|(name, provider)| (name.clone(), Arc::clone(provider)))
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        let old_state = self.state;
        self.state = new_state;
        debug!(%old_state, %new_state, "changing playback state");
        self.events.emit(CoreEvent::PlaybackStateChanged {
            old_state,
            new_state,
        });
    }

    fn emit_ended(&self, time_position: u64) {
        if let Some(tl_track) = self.current.clone() {
            self.events.emit(CoreEvent::TrackPlaybackEnded {
                tl_track,
                time_position,
            });
        }
    }
}
