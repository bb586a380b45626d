//! Playlists fan-out
//!
//! Scheme-routed passthrough to the playlists-capable backends. Like the
//! library controller it holds no state; unlike it, most operations target a
//! single backend chosen by the playlist URI's scheme. An unknown scheme is a
//! normal "not found", never an error.

use crate::events::{CoreEvent, EventEmitter};
use crate::registry::BackendRegistry;
use ensemble_models::{Playlist, Ref};
use futures::future::join_all;
use std::sync::Arc;

/// Aggregated playlist enumeration and persistence
pub struct PlaylistsController {
    registry: Arc<BackendRegistry>,
    events: EventEmitter,
}

impl PlaylistsController {
    /// Create the controller over the given registry
    pub fn new(registry: Arc<BackendRegistry>, events: EventEmitter) -> Self {
        Self { registry, events }
    }

    /// URI schemes with playlist support, sorted
    pub fn get_uri_schemes(&self) -> Vec<String> {
        self.registry.playlists_schemes().to_vec()
    }

    /// References to all playlists across all backends
    pub async fn as_list(&self) -> Vec<Ref> {
        let calls = self.registry.playlists_backends().iter().map(|(name, provider)| {
            let registry = Arc::clone(&self.registry);
            async move { registry.contain(name, "as_list", provider.as_list()).await }
        });
        join_all(calls).await.into_iter().flatten().flatten().collect()
    }

    /// Items of the playlist at `uri`, or `None` if it does not exist
    pub async fn get_items(&self, uri: &str) -> Option<Vec<Ref>> {
        let (name, provider) = self.registry.playlists_for(uri)?;
        self.registry
            .contain(name, "get_items", provider.get_items(uri))
            .await
            .flatten()
    }

    /// Create a playlist on the backend owning `uri_scheme`
    ///
    /// Without a scheme, every playlists backend is tried in registration
    /// order until one produces a playlist.
    pub async fn create(&self, name: &str, uri_scheme: Option<&str>) -> Option<Playlist> {
        let backends: Vec<_> = match uri_scheme {
            Some(scheme) => self.registry.playlists_for_scheme(scheme).into_iter().collect(),
            None => self.registry.playlists_backends().iter().collect(),
        };

        for (backend, provider) in backends {
            let created = self
                .registry
                .contain(backend, "create", provider.create(name))
                .await
                .flatten();
            if let Some(playlist) = created {
                self.events.emit(CoreEvent::PlaylistChanged {
                    playlist: playlist.clone(),
                });
                return Some(playlist);
            }
        }
        None
    }

    /// Delete the playlist at `uri`; `false` if nothing was deleted
    pub async fn delete(&self, uri: &str) -> bool {
        let Some((name, provider)) = self.registry.playlists_for(uri) else {
            return false;
        };
        let deleted = self
            .registry
            .contain(name, "delete", provider.delete(uri))
            .await
            .unwrap_or(false);
        if deleted {
            self.events.emit(CoreEvent::PlaylistDeleted { uri: uri.to_string() });
        }
        deleted
    }

    /// Full playlist at `uri`, or `None` if it does not exist
    pub async fn lookup(&self, uri: &str) -> Option<Playlist> {
        let (name, provider) = self.registry.playlists_for(uri)?;
        self.registry
            .contain(name, "lookup", provider.lookup(uri))
            .await
            .flatten()
    }

    /// Ask backends to reload their playlists
    ///
    /// Limited to one backend when a scheme is given. Announces
    /// `playlists_loaded` if at least one backend refreshed.
    pub async fn refresh(&self, uri_scheme: Option<&str>) {
        let refreshed = match uri_scheme {
            Some(scheme) => match self.registry.playlists_for_scheme(scheme) {
                Some((name, provider)) => self
                    .registry
                    .contain(name, "refresh", provider.refresh())
                    .await
                    .is_some(),
                None => false,
            },
            None => {
                let calls = self.registry.playlists_backends().iter().map(|(name, provider)| {
                    let registry = Arc::clone(&self.registry);
                    async move { registry.contain(name, "refresh", provider.refresh()).await }
                });
                join_all(calls).await.into_iter().any(|outcome| outcome.is_some())
            }
        };

        if refreshed {
            self.events.emit(CoreEvent::PlaylistsLoaded);
        }
    }

    /// Save a playlist through the backend owning its URI's scheme
    ///
    /// The backend may rename or relocate the playlist; the returned value is
    /// authoritative.
    pub async fn save(&self, playlist: &Playlist) -> Option<Playlist> {
        let (name, provider) = self.registry.playlists_for(&playlist.uri)?;
        let saved = self
            .registry
            .contain(name, "save", provider.save(playlist))
            .await
            .flatten();
        if let Some(saved) = &saved {
            self.events.emit(CoreEvent::PlaylistChanged {
                playlist: saved.clone(),
            });
        }
        saved
    }
}
