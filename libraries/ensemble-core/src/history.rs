//! Play history
//!
//! A bounded, most-recent-first log of the tracks that started playing.
//! Entries are lightweight references, not full tracks.

use chrono::{DateTime, Utc};
use ensemble_models::{Ref, Track};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the track started playing
    pub played_at: DateTime<Utc>,
    /// Reference to the played track
    pub track: Ref,
}

/// Bounded log of recently played tracks
#[derive(Debug)]
pub struct HistoryController {
    entries: VecDeque<HistoryEntry>,
    max_length: usize,
}

impl HistoryController {
    /// Create an empty history keeping at most `max_length` entries
    pub fn new(max_length: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_length.min(64)),
            max_length,
        }
    }

    /// Record that a track started playing
    ///
    /// The oldest entry is dropped once the bound is reached. Tracks without
    /// a name are recorded under their URI.
    pub fn add(&mut self, track: &Track) {
        let name = track.name.clone().unwrap_or_else(|| track.uri.clone());
        let entry = HistoryEntry {
            played_at: Utc::now(),
            track: Ref::track(&track.uri, name),
        };
        if self.entries.len() >= self.max_length {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// The history, most recent first
    pub fn get_history(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of recorded entries
    pub fn get_length(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot the history for persistence
    pub fn save_state(&self) -> Vec<HistoryEntry> {
        self.get_history()
    }

    /// Replace the history from a snapshot, re-applying the bound
    pub fn load_state(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries.into_iter().take(self.max_length).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: &str, name: Option<&str>) -> Track {
        let track = Track::new(uri);
        match name {
            Some(name) => track.with_name(name),
            None => track,
        }
    }

    #[test]
    fn most_recent_first() {
        let mut history = HistoryController::new(10);
        history.add(&track("dummy:track:a", Some("A")));
        history.add(&track("dummy:track:b", Some("B")));

        let entries = history.get_history();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].track.uri, "dummy:track:b");
        assert_eq!(entries[1].track.uri, "dummy:track:a");
    }

    #[test]
    fn bound_drops_oldest() {
        let mut history = HistoryController::new(3);
        for i in 0..5 {
            history.add(&track(&format!("dummy:track:{i}"), None));
        }
        let entries = history.get_history();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].track.uri, "dummy:track:4");
        assert_eq!(entries[2].track.uri, "dummy:track:2");
    }

    #[test]
    fn unnamed_tracks_fall_back_to_uri() {
        let mut history = HistoryController::new(10);
        history.add(&track("dummy:track:a", None));
        assert_eq!(history.get_history()[0].track.name, "dummy:track:a");
    }

    #[test]
    fn state_round_trip() {
        let mut history = HistoryController::new(10);
        history.add(&track("dummy:track:a", Some("A")));
        let saved = history.save_state();

        let mut restored = HistoryController::new(10);
        restored.load_state(saved.clone());
        assert_eq!(restored.get_history(), saved);
        assert_eq!(restored.get_length(), 1);
    }
}
