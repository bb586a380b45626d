//! Ensemble Models
//!
//! Domain types, backend capability traits, and error handling shared by the
//! Ensemble coordination core and by backend implementations.
//!
//! # Architecture
//!
//! This crate defines:
//! - **Domain Types**: `Track`, `TlTrack`, `Ref`, `Playlist`, `SearchResult`, etc.
//! - **Capability Traits**: `LibraryProvider`, `PlaybackProvider`,
//!   `PlaylistsProvider`, `Mixer` - each optionally supplied by a backend
//! - **Audio Notifications**: `AudioEvent` values delivered by the audio
//!   collaborator into the coordinator
//! - **Error Handling**: unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use ensemble_models::{Track, TlTrack, Ref};
//!
//! let track = Track::new("file:///music/song.flac").with_name("Song");
//! let entry = TlTrack::new(1, track);
//! let root = Ref::directory("file:root", "Files");
//! assert_eq!(entry.tlid, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audio;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use audio::AudioEvent;
pub use error::{CoreError, Result};
pub use traits::{Backend, LibraryProvider, Mixer, PlaybackProvider, PlaylistsProvider};

// Export all types
pub use types::{
    Album, Artist, DistinctField, Image, PlaybackState, Playlist, Ref, RefType, SearchField,
    SearchQuery, SearchResult, SearchTerm, TlId, TlTrack, Track,
};
