//! Lightweight browse references

use serde::{Deserialize, Serialize};

/// The kind of object a [`Ref`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    /// An album
    Album,
    /// An artist
    Artist,
    /// A browsable directory
    Directory,
    /// A playlist
    Playlist,
    /// A single track
    Track,
}

/// A lightweight reference to a model, used for browsing
///
/// Carries only what a browse listing needs: where it points, what to show,
/// and what kind of thing it is. Full values are fetched by lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ref {
    /// URI of the referenced object
    pub uri: String,

    /// Display name
    pub name: String,

    /// Kind of the referenced object
    #[serde(rename = "type")]
    pub ref_type: RefType,
}

impl Ref {
    fn new(uri: impl Into<String>, name: impl Into<String>, ref_type: RefType) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            ref_type,
        }
    }

    /// Create an album reference
    pub fn album(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(uri, name, RefType::Album)
    }

    /// Create an artist reference
    pub fn artist(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(uri, name, RefType::Artist)
    }

    /// Create a directory reference
    pub fn directory(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(uri, name, RefType::Directory)
    }

    /// Create a playlist reference
    pub fn playlist(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(uri, name, RefType::Playlist)
    }

    /// Create a track reference
    pub fn track(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(uri, name, RefType::Track)
    }
}
