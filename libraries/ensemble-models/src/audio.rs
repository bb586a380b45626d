//! Events flowing from the audio layer into the coordinator
//!
//! The audio layer pushes these into the coordinator's mailbox; they are
//! ordered with the command stream, so a position report can never overtake
//! the track change that made it meaningful.

use std::collections::HashMap;

/// An event reported by the audio layer
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The current track is close to its end; gapless handoff should start
    AboutToFinish,

    /// The audio layer started reading from a new stream
    StreamChanged {
        /// URI of the stream now being read, if any
        uri: Option<String>,
    },

    /// The last queued stream finished and nothing follows it
    EndOfStream,

    /// Playback position moved, by seek or by normal progress
    PositionChanged {
        /// New position in milliseconds
        position: u64,
    },

    /// In-stream metadata changed (radio stream titles and similar)
    TagsChanged {
        /// Tag name to values, as reported by the stream
        tags: HashMap<String, Vec<String>>,
    },
}
