//! Coordination core for a multi-backend music server
//!
//! This crate glues an arbitrary set of URI-scheme-scoped backends into one
//! coherent player: a tracklist with playback modes, a playback state machine
//! that drives backend audio delivery, aggregated library and playlist views,
//! a bounded play history, and volume/mute passthrough.
//!
//! All coordination state lives in [`Core`], which is single-threaded by
//! construction: [`actor::spawn`] runs it on a dedicated task behind a FIFO
//! mailbox shared by client commands and audio-layer notifications, and
//! [`CoreHandle`] is the cloneable async client. State changes are announced
//! on a broadcast channel of [`CoreEvent`]s.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actor;
pub mod config;
pub mod core;
pub mod events;
pub mod history;
pub mod library;
pub mod mixer;
pub mod playback;
pub mod playlists;
pub mod registry;
pub mod state;
pub mod tracklist;

pub use actor::{spawn, CoreCommand, CoreHandle};
pub use config::CoreConfig;
pub use core::Core;
pub use events::CoreEvent;
pub use history::HistoryEntry;
pub use state::{CoreState, MixerState, PlaybackSnapshot, StateCoverage, TracklistState};
pub use tracklist::TracklistCriteria;

pub use ensemble_models::{
    Album, Artist, AudioEvent, Backend, CoreError, DistinctField, Image, LibraryProvider, Mixer,
    PlaybackProvider, PlaybackState, Playlist, PlaylistsProvider, Ref, RefType, Result,
    SearchField, SearchQuery, SearchResult, SearchTerm, TlId, TlTrack, Track,
};
