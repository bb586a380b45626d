//! Domain types shared across the Ensemble workspace

mod playback_state;
mod playlist;
mod reference;
mod search;
mod track;
mod tracklist;

pub use playback_state::PlaybackState;
pub use playlist::Playlist;
pub use reference::{Ref, RefType};
pub use search::{DistinctField, Image, SearchField, SearchQuery, SearchResult, SearchTerm};
pub use track::{Album, Artist, Track};
pub use tracklist::{TlId, TlTrack};
