//! Tracklist state machine
//!
//! Owns the ordered track sequence, the monotonic tlid counter, the version
//! counter, and the four playback-order mode flags. When random mode is on it
//! also owns the shuffle order: a permutation of the current entries consumed
//! front-to-back as "next" and regenerated when exhausted.
//!
//! The controller is a plain state machine with no channels or backends; the
//! coordinator watches the version counter to decide when to announce a
//! change and revalidate playback.

use crate::state::TracklistState;
use ensemble_models::{CoreError, Result, TlId, TlTrack, Track};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One tracklist filter criterion
///
/// A criterion matches an entry if any of its values matches; a filter of
/// several criteria matches entries satisfying all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracklistCriteria {
    /// Match by tracklist id
    Tlid(Vec<TlId>),
    /// Match by track URI
    Uri(Vec<String>),
    /// Match by track name
    TrackName(Vec<String>),
    /// Match by album name
    Album(Vec<String>),
    /// Match by any artist name
    Artist(Vec<String>),
    /// Match by any composer name
    Composer(Vec<String>),
    /// Match by any performer name
    Performer(Vec<String>),
    /// Match by genre
    Genre(Vec<String>),
    /// Match by release date
    Date(Vec<String>),
    /// Match by comment
    Comment(Vec<String>),
    /// Match by MusicBrainz id
    MusicbrainzId(Vec<String>),
}

impl TracklistCriteria {
    fn is_empty(&self) -> bool {
        match self {
            Self::Tlid(values) => values.is_empty(),
            Self::Uri(values)
            | Self::TrackName(values)
            | Self::Album(values)
            | Self::Artist(values)
            | Self::Composer(values)
            | Self::Performer(values)
            | Self::Genre(values)
            | Self::Date(values)
            | Self::Comment(values)
            | Self::MusicbrainzId(values) => values.is_empty(),
        }
    }

    fn matches(&self, tl_track: &TlTrack) -> bool {
        let track = &tl_track.track;
        match self {
            Self::Tlid(values) => values.contains(&tl_track.tlid),
            Self::Uri(values) => values.contains(&track.uri),
            Self::TrackName(values) => track.name.as_ref().is_some_and(|v| values.contains(v)),
            Self::Album(values) => track
                .album
                .as_ref()
                .is_some_and(|album| values.contains(&album.name)),
            Self::Artist(values) => track.artists.iter().any(|a| values.contains(&a.name)),
            Self::Composer(values) => track.composers.iter().any(|a| values.contains(&a.name)),
            Self::Performer(values) => track.performers.iter().any(|a| values.contains(&a.name)),
            Self::Genre(values) => track.genre.as_ref().is_some_and(|v| values.contains(v)),
            Self::Date(values) => track.date.as_ref().is_some_and(|v| values.contains(v)),
            Self::Comment(values) => track.comment.as_ref().is_some_and(|v| values.contains(v)),
            Self::MusicbrainzId(values) => track
                .musicbrainz_id
                .as_ref()
                .is_some_and(|v| values.contains(v)),
        }
    }
}

/// The ordered track sequence and its playback-order modes
#[derive(Debug)]
pub struct Tracklist {
    tl_tracks: Vec<TlTrack>,
    next_tlid: TlId,
    version: u64,
    max_length: usize,

    repeat: bool,
    random: bool,
    consume: bool,
    single: bool,

    // Permutation of the entries, consumed front-to-back while random is on
    shuffled: Vec<TlTrack>,
}

impl Tracklist {
    /// Create an empty tracklist holding at most `max_length` entries
    pub fn new(max_length: usize) -> Self {
        Self {
            tl_tracks: Vec::new(),
            next_tlid: 1,
            version: 0,
            max_length,
            repeat: false,
            random: false,
            consume: false,
            single: false,
            shuffled: Vec::new(),
        }
    }

    // ===== Queries =====

    /// Current entries, in order
    pub fn tl_tracks(&self) -> &[TlTrack] {
        &self.tl_tracks
    }

    /// Current tracks, in order
    pub fn tracks(&self) -> Vec<Track> {
        self.tl_tracks.iter().map(|tl| tl.track.clone()).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.tl_tracks.len()
    }

    /// Whether the tracklist is empty
    pub fn is_empty(&self) -> bool {
        self.tl_tracks.is_empty()
    }

    /// Version counter, incremented on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Position of the entry with the given tlid, or `None` if absent
    pub fn index_of(&self, tlid: TlId) -> Option<usize> {
        self.tl_tracks.iter().position(|tl| tl.tlid == tlid)
    }

    /// The entry with the given tlid
    pub fn get(&self, tlid: TlId) -> Option<TlTrack> {
        self.tl_tracks.iter().find(|tl| tl.tlid == tlid).cloned()
    }

    /// Entries between `start` and `end`, clamped to the tracklist bounds
    pub fn slice(&self, start: usize, end: usize) -> Vec<TlTrack> {
        let end = end.min(self.tl_tracks.len());
        let start = start.min(end);
        self.tl_tracks[start..end].to_vec()
    }

    /// Entries matching all the given criteria, in tracklist order
    pub fn filter(&self, criteria: &[TracklistCriteria]) -> Result<Vec<TlTrack>> {
        if criteria.is_empty() {
            return Err(CoreError::validation(
                "Filter requires at least one criterion",
            ));
        }
        if let Some(empty) = criteria.iter().find(|c| c.is_empty()) {
            return Err(CoreError::validation(format!(
                "Filter criterion has no values: {empty:?}"
            )));
        }
        Ok(self
            .tl_tracks
            .iter()
            .filter(|tl| criteria.iter().all(|c| c.matches(tl)))
            .cloned()
            .collect())
    }

    // ===== Mode flags =====

    /// Repeat mode: the tracklist is played repeatedly
    pub fn get_repeat(&self) -> bool {
        self.repeat
    }

    /// Set repeat mode; returns whether the value changed
    pub fn set_repeat(&mut self, value: bool) -> bool {
        let changed = self.repeat != value;
        self.repeat = value;
        changed
    }

    /// Random mode: tracks are drawn from a shuffle order instead of in order
    pub fn get_random(&self) -> bool {
        self.random
    }

    /// Set random mode; returns whether the value changed
    ///
    /// Enabling random (re)generates the shuffle order from the current
    /// entries, even if it was already enabled.
    pub fn set_random(&mut self, value: bool) -> bool {
        let changed = self.random != value;
        self.random = value;
        if value {
            self.regenerate_shuffled();
        }
        changed
    }

    /// Consume mode: tracks are removed once they have been played
    pub fn get_consume(&self) -> bool {
        self.consume
    }

    /// Set consume mode; returns whether the value changed
    pub fn set_consume(&mut self, value: bool) -> bool {
        let changed = self.consume != value;
        self.consume = value;
        changed
    }

    /// Single mode: playback stops after the current track, unless repeating
    pub fn get_single(&self) -> bool {
        self.single
    }

    /// Set single mode; returns whether the value changed
    pub fn set_single(&mut self, value: bool) -> bool {
        let changed = self.single != value;
        self.single = value;
        changed
    }

    // ===== Mutations =====

    /// Wrap tracks in new entries and insert them
    ///
    /// Inserts at `at_position` (shifting as it goes, preserving input order)
    /// or appends. Stops with a capacity error once the length limit is hit;
    /// entries added before the limit remain added.
    pub fn add_tracks(
        &mut self,
        tracks: Vec<Track>,
        at_position: Option<usize>,
    ) -> Result<Vec<TlTrack>> {
        if let Some(position) = at_position {
            if position > self.tl_tracks.len() {
                return Err(CoreError::validation(format!(
                    "Position {position} is outside the tracklist"
                )));
            }
        }

        let mut added = Vec::new();
        let mut insert_at = at_position;

        for track in tracks {
            if self.tl_tracks.len() >= self.max_length {
                if !added.is_empty() {
                    self.bump_version();
                }
                return Err(CoreError::TracklistFull(self.max_length));
            }

            let tl_track = TlTrack::new(self.next_tlid, track);
            self.next_tlid += 1;

            match insert_at {
                Some(position) => {
                    self.tl_tracks.insert(position, tl_track.clone());
                    insert_at = Some(position + 1);
                }
                None => self.tl_tracks.push(tl_track.clone()),
            }
            added.push(tl_track);
        }

        if !added.is_empty() {
            self.bump_version();
        }
        Ok(added)
    }

    /// Remove the entries matching all the given criteria
    ///
    /// Returns the removed entries in their former tracklist order.
    pub fn remove(&mut self, criteria: &[TracklistCriteria]) -> Result<Vec<TlTrack>> {
        let matches = self.filter(criteria)?;
        self.tl_tracks
            .retain(|tl| !matches.iter().any(|m| m.tlid == tl.tlid));
        self.bump_version();
        Ok(matches)
    }

    /// Move the entries in `[start..end)` to `to_position`
    ///
    /// `start == end` is normalized to a single-entry move. The relative
    /// order of the moved entries is preserved.
    pub fn move_range(&mut self, start: usize, mut end: usize, to_position: usize) -> Result<()> {
        if start == end {
            end = start + 1;
        }
        let length = self.tl_tracks.len();
        if start >= end {
            return Err(CoreError::validation("start must be smaller than end"));
        }
        if end > length {
            return Err(CoreError::validation(
                "end can not be larger than the tracklist length",
            ));
        }
        if to_position > length {
            return Err(CoreError::validation(
                "to_position can not be larger than the tracklist length",
            ));
        }

        let moved: Vec<TlTrack> = self.tl_tracks.drain(start..end).collect();
        let mut insert_at = to_position.min(self.tl_tracks.len());
        for tl_track in moved {
            self.tl_tracks.insert(insert_at, tl_track);
            insert_at += 1;
        }
        self.bump_version();
        Ok(())
    }

    /// Randomly permute the entries in `[start..end)` in place
    ///
    /// Defaults to the whole tracklist; entries outside the slice keep their
    /// positions.
    pub fn shuffle_range(&mut self, start: Option<usize>, end: Option<usize>) -> Result<()> {
        let length = self.tl_tracks.len();
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(length);
        if start >= end && !(start == 0 && end == 0) {
            return Err(CoreError::validation("start must be smaller than end"));
        }
        if end > length {
            return Err(CoreError::validation(
                "end can not be larger than the tracklist length",
            ));
        }

        self.tl_tracks[start..end].shuffle(&mut rand::thread_rng());
        self.bump_version();
        Ok(())
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.tl_tracks.clear();
        self.bump_version();
    }

    // ===== Playback-order selection (pure queries aside from lazy reshuffle) =====

    /// The entry `next()` would select relative to `current`
    ///
    /// Sequentially this is the following entry, wrapping under repeat; under
    /// random it is the shuffle order's head, regenerating the order when it
    /// is exhausted and either repeat is on or there is no reference entry.
    pub fn next_track(&mut self, current: Option<&TlTrack>) -> Option<TlTrack> {
        if self.tl_tracks.is_empty() {
            return None;
        }

        if self.random && self.shuffled.is_empty() && (self.repeat || current.is_none()) {
            debug!("shuffling tracks");
            self.regenerate_shuffled();
        }

        if self.random {
            return self.shuffled.first().cloned();
        }

        let Some(current) = current else {
            return self.tl_tracks.first().cloned();
        };

        let mut next_index = self.index_of(current.tlid).map_or(0, |i| i + 1);
        if self.repeat {
            // Repeating a one-track list under consume would loop forever
            if self.consume && self.tl_tracks.len() == 1 {
                return None;
            }
            next_index %= self.tl_tracks.len();
        }

        self.tl_tracks.get(next_index).cloned()
    }

    /// The entry `previous()` would select relative to `current`
    ///
    /// Under repeat, consume, or random there is no meaningful "previous";
    /// the reference entry itself is returned.
    pub fn previous_track(&self, current: Option<&TlTrack>) -> Option<TlTrack> {
        if self.repeat || self.consume || self.random {
            return current.cloned();
        }

        let position = current.and_then(|tl| self.index_of(tl.tlid))?;
        if position == 0 {
            return None;
        }
        self.tl_tracks.get(position - 1).cloned()
    }

    /// The entry natural end-of-track advance would select
    ///
    /// Differs from [`Tracklist::next_track`] only in honoring single mode:
    /// single+repeat loops the reference entry, single alone stops.
    pub fn eot_track(&mut self, current: Option<&TlTrack>) -> Option<TlTrack> {
        if self.single && self.repeat {
            return current.cloned();
        }
        if self.single {
            return None;
        }
        self.next_track(current)
    }

    // ===== Hooks for the playback controller =====

    /// Remove an entry that started playing from the shuffle order
    pub(crate) fn mark_playing(&mut self, tl_track: &TlTrack) {
        if self.random {
            self.shuffled.retain(|tl| tl.tlid != tl_track.tlid);
        }
    }

    /// Record that a backend cannot play an entry
    ///
    /// Under consume the entry is dropped from the tracklist; under random it
    /// leaves the shuffle order either way.
    pub(crate) fn mark_unplayable(&mut self, tl_track: &TlTrack) {
        warn!(uri = %tl_track.track.uri, "track is not playable");
        if self.consume {
            self.tl_tracks.retain(|tl| tl.tlid != tl_track.tlid);
            self.bump_version();
        }
        if self.random {
            self.shuffled.retain(|tl| tl.tlid != tl_track.tlid);
        }
    }

    /// Record that an entry finished playing naturally
    ///
    /// Under consume the entry is removed; returns whether removal happened.
    pub(crate) fn mark_played(&mut self, tl_track: Option<&TlTrack>) -> bool {
        let Some(tl_track) = tl_track else {
            return false;
        };
        if !self.consume {
            return false;
        }
        self.tl_tracks.retain(|tl| tl.tlid != tl_track.tlid);
        self.bump_version();
        true
    }

    // ===== Persistence =====

    /// Snapshot the mode flags, tlid counter, and entries
    pub fn save_state(&self) -> TracklistState {
        TracklistState {
            repeat: self.repeat,
            random: self.random,
            consume: self.consume,
            single: self.single,
            next_tlid: self.next_tlid,
            tl_tracks: self.tl_tracks.clone(),
        }
    }

    /// Restore entries and the tlid counter from a snapshot
    ///
    /// The only way `next_tlid` may move backwards. Mode flags are restored
    /// separately by the coordinator so their change events fire.
    pub fn load_entries(&mut self, state: &TracklistState) {
        self.tl_tracks = state.tl_tracks.clone();
        self.next_tlid = state.next_tlid.max(1);
        self.bump_version();
    }

    #[cfg(test)]
    pub(crate) fn shuffled(&self) -> &[TlTrack] {
        &self.shuffled
    }

    fn regenerate_shuffled(&mut self) {
        self.shuffled = self.tl_tracks.clone();
        self.shuffled.shuffle(&mut rand::thread_rng());
    }

    fn bump_version(&mut self) {
        self.version += 1;
        // Any content change invalidates the old permutation
        if self.random {
            self.regenerate_shuffled();
        } else {
            self.shuffled.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: &str) -> Track {
        Track::new(uri).with_name(uri.to_uppercase())
    }

    fn filled(n: usize) -> Tracklist {
        let mut tracklist = Tracklist::new(10_000);
        let tracks = (0..n).map(|i| track(&format!("dummy:track:{i}"))).collect();
        tracklist.add_tracks(tracks, None).unwrap();
        tracklist
    }

    #[test]
    fn tlids_start_at_one_and_increase() {
        let tracklist = filled(3);
        let tlids: Vec<_> = tracklist.tl_tracks().iter().map(|tl| tl.tlid).collect();
        assert_eq!(tlids, [1, 2, 3]);
    }

    #[test]
    fn tlids_are_never_reused() {
        let mut tracklist = filled(3);
        tracklist.remove(&[TracklistCriteria::Tlid(vec![2, 3])]).unwrap();
        tracklist.clear();
        let added = tracklist.add_tracks(vec![track("dummy:track:x")], None).unwrap();
        assert_eq!(added[0].tlid, 4);
    }

    #[test]
    fn version_bumps_on_mutations_only() {
        let mut tracklist = filled(3);
        let version = tracklist.version();

        tracklist.filter(&[TracklistCriteria::Uri(vec!["dummy:track:0".into()])]).unwrap();
        let _ = tracklist.index_of(1);
        assert_eq!(tracklist.version(), version);

        tracklist.move_range(0, 1, 2).unwrap();
        assert_eq!(tracklist.version(), version + 1);
        tracklist.clear();
        assert_eq!(tracklist.version(), version + 2);
    }

    #[test]
    fn add_at_position_preserves_input_order() {
        let mut tracklist = filled(2);
        tracklist
            .add_tracks(vec![track("dummy:track:a"), track("dummy:track:b")], Some(1))
            .unwrap();
        let uris: Vec<_> = tracklist.tracks().iter().map(|t| t.uri.clone()).collect();
        assert_eq!(
            uris,
            ["dummy:track:0", "dummy:track:a", "dummy:track:b", "dummy:track:1"]
        );
    }

    #[test]
    fn add_past_end_is_a_validation_error() {
        let mut tracklist = filled(2);
        let result = tracklist.add_tracks(vec![track("dummy:track:a")], Some(5));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn capacity_error_keeps_partial_batch() {
        let mut tracklist = Tracklist::new(2);
        let result = tracklist.add_tracks(
            vec![track("dummy:track:a"), track("dummy:track:b"), track("dummy:track:c")],
            None,
        );
        assert!(matches!(result, Err(CoreError::TracklistFull(2))));
        assert_eq!(tracklist.len(), 2);
        assert_eq!(tracklist.version(), 1);
    }

    #[test]
    fn filter_is_and_across_criteria_or_within_values() {
        let tracklist = filled(3);
        let matches = tracklist
            .filter(&[
                TracklistCriteria::Tlid(vec![1, 2]),
                TracklistCriteria::Uri(vec!["dummy:track:1".into(), "dummy:track:2".into()]),
            ])
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].tlid, 2);
    }

    #[test]
    fn filter_rejects_empty_criteria() {
        let tracklist = filled(1);
        assert!(tracklist.filter(&[]).is_err());
        assert!(tracklist.filter(&[TracklistCriteria::Uri(vec![])]).is_err());
    }

    #[test]
    fn remove_deletes_matches_in_order() {
        let mut tracklist = filled(4);
        let removed = tracklist.remove(&[TracklistCriteria::Tlid(vec![3, 1])]).unwrap();
        assert_eq!(removed.iter().map(|tl| tl.tlid).collect::<Vec<_>>(), [1, 3]);
        assert_eq!(tracklist.tl_tracks().iter().map(|tl| tl.tlid).collect::<Vec<_>>(), [2, 4]);
    }

    #[test]
    fn move_range_preserves_relative_order() {
        let mut tracklist = filled(4);
        tracklist.move_range(0, 2, 2).unwrap();
        let tlids: Vec<_> = tracklist.tl_tracks().iter().map(|tl| tl.tlid).collect();
        assert_eq!(tlids, [3, 4, 1, 2]);
    }

    #[test]
    fn move_single_entry_normalizes_end() {
        let mut tracklist = filled(3);
        tracklist.move_range(0, 0, 2).unwrap();
        let tlids: Vec<_> = tracklist.tl_tracks().iter().map(|tl| tl.tlid).collect();
        assert_eq!(tlids, [2, 3, 1]);
    }

    #[test]
    fn move_with_bad_bounds_fails() {
        let mut tracklist = filled(3);
        assert!(tracklist.move_range(2, 1, 0).is_err());
        assert!(tracklist.move_range(0, 9, 0).is_err());
        assert!(tracklist.move_range(0, 1, 9).is_err());
    }

    #[test]
    fn shuffle_range_keeps_outside_entries() {
        let mut tracklist = filled(5);
        tracklist.shuffle_range(Some(1), Some(4)).unwrap();
        assert_eq!(tracklist.tl_tracks()[0].tlid, 1);
        assert_eq!(tracklist.tl_tracks()[4].tlid, 5);
        let mut middle: Vec<_> = tracklist.tl_tracks()[1..4].iter().map(|tl| tl.tlid).collect();
        middle.sort_unstable();
        assert_eq!(middle, [2, 3, 4]);
    }

    #[test]
    fn mode_flags_round_trip() {
        let mut tracklist = Tracklist::new(10);
        for value in [true, false, true] {
            tracklist.set_repeat(value);
            assert_eq!(tracklist.get_repeat(), value);
            tracklist.set_consume(value);
            assert_eq!(tracklist.get_consume(), value);
            tracklist.set_single(value);
            assert_eq!(tracklist.get_single(), value);
            tracklist.set_random(value);
            assert_eq!(tracklist.get_random(), value);
        }
    }

    #[test]
    fn setting_same_mode_reports_unchanged() {
        let mut tracklist = Tracklist::new(10);
        assert!(tracklist.set_repeat(true));
        assert!(!tracklist.set_repeat(true));
        assert!(tracklist.set_repeat(false));
    }

    #[test]
    fn sequential_next_and_previous() {
        let mut tracklist = filled(3);
        let first = tracklist.next_track(None).unwrap();
        assert_eq!(first.tlid, 1);
        let second = tracklist.next_track(Some(&first)).unwrap();
        assert_eq!(second.tlid, 2);
        assert_eq!(tracklist.previous_track(Some(&second)).unwrap().tlid, 1);
        assert!(tracklist.previous_track(Some(&first)).is_none());
        assert!(tracklist.next_track(Some(&tracklist.get(3).unwrap())).is_none());
    }

    #[test]
    fn next_wraps_under_repeat() {
        let mut tracklist = filled(3);
        tracklist.set_repeat(true);
        let last = tracklist.get(3).unwrap();
        assert_eq!(tracklist.next_track(Some(&last)).unwrap().tlid, 1);
    }

    #[test]
    fn repeat_consume_single_entry_yields_none() {
        let mut tracklist = filled(1);
        tracklist.set_repeat(true);
        tracklist.set_consume(true);
        let only = tracklist.get(1).unwrap();
        assert!(tracklist.next_track(Some(&only)).is_none());
    }

    #[test]
    fn previous_returns_current_under_repeat_consume_or_random() {
        let mut tracklist = filled(3);
        let second = tracklist.get(2).unwrap();
        for setter in [
            Tracklist::set_repeat as fn(&mut Tracklist, bool) -> bool,
            Tracklist::set_consume,
            Tracklist::set_random,
        ] {
            setter(&mut tracklist, true);
            assert_eq!(tracklist.previous_track(Some(&second)).unwrap().tlid, 2);
            setter(&mut tracklist, false);
        }
    }

    #[test]
    fn eot_honors_single_mode() {
        let mut tracklist = filled(3);
        let second = tracklist.get(2).unwrap();

        tracklist.set_single(true);
        assert!(tracklist.eot_track(Some(&second)).is_none());

        tracklist.set_repeat(true);
        assert_eq!(tracklist.eot_track(Some(&second)).unwrap().tlid, 2);

        tracklist.set_single(false);
        assert_eq!(tracklist.eot_track(Some(&second)).unwrap().tlid, 3);
    }

    #[test]
    fn shuffle_order_is_a_permutation() {
        let mut tracklist = filled(5);
        tracklist.set_random(true);
        let mut shuffled: Vec<_> = tracklist.shuffled().iter().map(|tl| tl.tlid).collect();
        shuffled.sort_unstable();
        assert_eq!(shuffled, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn mark_playing_removes_from_shuffle_order() {
        let mut tracklist = filled(3);
        tracklist.set_random(true);
        let next = tracklist.next_track(None).unwrap();
        tracklist.mark_playing(&next);
        assert_eq!(tracklist.shuffled().len(), 2);
        assert!(tracklist.shuffled().iter().all(|tl| tl.tlid != next.tlid));
    }

    #[test]
    fn random_next_draws_each_entry_once_before_exhaustion() {
        let mut tracklist = filled(4);
        tracklist.set_random(true);
        let mut seen = Vec::new();
        for _ in 0..4 {
            let next = tracklist.next_track(seen.last()).unwrap();
            tracklist.mark_playing(&next);
            seen.push(next);
        }
        let mut tlids: Vec<_> = seen.iter().map(|tl| tl.tlid).collect();
        tlids.sort_unstable();
        assert_eq!(tlids, [1, 2, 3, 4]);
        // Without repeat the exhausted order is not regenerated
        assert!(tracklist.next_track(seen.last()).is_none());
    }

    #[test]
    fn random_with_repeat_regenerates_exhausted_order() {
        let mut tracklist = filled(2);
        tracklist.set_random(true);
        tracklist.set_repeat(true);
        for _ in 0..2 {
            let next = tracklist.next_track(None).unwrap();
            tracklist.mark_playing(&next);
        }
        assert!(tracklist.next_track(Some(&tracklist.get(1).unwrap())).is_some());
    }

    #[test]
    fn mark_unplayable_respects_consume() {
        let mut tracklist = filled(3);
        let second = tracklist.get(2).unwrap();

        tracklist.mark_unplayable(&second);
        assert_eq!(tracklist.len(), 3);

        tracklist.set_consume(true);
        tracklist.mark_unplayable(&second);
        assert_eq!(tracklist.len(), 2);
        assert!(tracklist.index_of(2).is_none());
    }

    #[test]
    fn mark_played_removes_exactly_one_under_consume() {
        let mut tracklist = filled(3);
        let second = tracklist.get(2).unwrap();

        assert!(!tracklist.mark_played(Some(&second)));
        tracklist.set_consume(true);
        assert!(tracklist.mark_played(Some(&second)));
        assert_eq!(tracklist.len(), 2);
        assert!(!tracklist.mark_played(None));
    }

    #[test]
    fn state_round_trip_restores_counter_and_entries() {
        let mut tracklist = filled(3);
        tracklist.set_repeat(true);
        let state = tracklist.save_state();

        let mut restored = Tracklist::new(10_000);
        restored.load_entries(&state);
        assert_eq!(restored.len(), 3);
        let added = restored.add_tracks(vec![track("dummy:track:new")], None).unwrap();
        assert_eq!(added[0].tlid, 4);
    }
}
