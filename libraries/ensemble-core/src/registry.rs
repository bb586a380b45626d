//! Backend registry
//!
//! Built once at startup from the backend registrations and read-only from
//! then on. Partitions the backends into one scheme map per capability so
//! every dispatch site is a plain lookup. Also hosts the error containment
//! wrapper shared by all backend call sites.

use crate::config::CoreConfig;
use ensemble_models::{
    Backend, CoreError, LibraryProvider, PlaybackProvider, PlaylistsProvider, Result,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Extract the scheme from a URI, if it has one
pub(crate) fn uri_scheme(uri: &str) -> Option<String> {
    url::Url::parse(uri).ok().map(|u| u.scheme().to_string())
}

/// Scheme-indexed views of the registered backends
///
/// Each capability map goes from URI scheme to the owning backend's name and
/// provider. The per-capability backend lists preserve registration order,
/// which multi-target fan-out and playlist-creation fallback rely on.
pub struct BackendRegistry {
    schemes: Vec<String>,
    library: HashMap<String, (String, Arc<dyn LibraryProvider>)>,
    playback: HashMap<String, (String, Arc<dyn PlaybackProvider>)>,
    playlists: HashMap<String, (String, Arc<dyn PlaylistsProvider>)>,
    library_backends: Vec<(String, Arc<dyn LibraryProvider>)>,
    playlists_backends: Vec<(String, Arc<dyn PlaylistsProvider>)>,
    playlists_schemes: Vec<String>,
    call_timeout: Option<Duration>,
}

impl BackendRegistry {
    /// Partition backend registrations into per-capability scheme maps
    ///
    /// Fails if two backends claim the same URI scheme.
    pub fn new(backends: Vec<Backend>, config: &CoreConfig) -> Result<Self> {
        let mut schemes = Vec::new();
        let mut library = HashMap::new();
        let mut playback = HashMap::new();
        let mut playlists = HashMap::new();
        let mut library_backends = Vec::new();
        let mut playlists_backends = Vec::new();
        let mut playlists_schemes = Vec::new();

        for backend in &backends {
            for scheme in &backend.uri_schemes {
                if schemes.contains(scheme) {
                    return Err(CoreError::validation(format!(
                        "URI scheme {scheme:?} is claimed by more than one backend"
                    )));
                }
                schemes.push(scheme.clone());

                if let Some(provider) = &backend.library {
                    library.insert(scheme.clone(), (backend.name.clone(), Arc::clone(provider)));
                }
                if let Some(provider) = &backend.playback {
                    playback.insert(scheme.clone(), (backend.name.clone(), Arc::clone(provider)));
                }
                if let Some(provider) = &backend.playlists {
                    playlists.insert(scheme.clone(), (backend.name.clone(), Arc::clone(provider)));
                    playlists_schemes.push(scheme.clone());
                }
            }

            if let Some(provider) = &backend.library {
                library_backends.push((backend.name.clone(), Arc::clone(provider)));
            }
            if let Some(provider) = &backend.playlists {
                playlists_backends.push((backend.name.clone(), Arc::clone(provider)));
            }
        }

        schemes.sort();
        playlists_schemes.sort();

        Ok(Self {
            schemes,
            library,
            playback,
            playlists,
            library_backends,
            playlists_backends,
            playlists_schemes,
            call_timeout: config.backend_call_timeout,
        })
    }

    /// All registered URI schemes, sorted
    pub fn uri_schemes(&self) -> &[String] {
        &self.schemes
    }

    /// URI schemes with a playlists capability, sorted
    pub fn playlists_schemes(&self) -> &[String] {
        &self.playlists_schemes
    }

    /// Library provider owning the given URI's scheme
    pub fn library_for(&self, uri: &str) -> Option<&(String, Arc<dyn LibraryProvider>)> {
        self.library.get(&uri_scheme(uri)?)
    }

    /// Playback provider owning the given URI's scheme
    pub fn playback_for(&self, uri: &str) -> Option<&(String, Arc<dyn PlaybackProvider>)> {
        self.playback.get(&uri_scheme(uri)?)
    }

    /// Playlists provider owning the given URI's scheme
    pub fn playlists_for(&self, uri: &str) -> Option<&(String, Arc<dyn PlaylistsProvider>)> {
        self.playlists.get(&uri_scheme(uri)?)
    }

    /// Playlists provider registered for the given scheme
    pub fn playlists_for_scheme(
        &self,
        scheme: &str,
    ) -> Option<&(String, Arc<dyn PlaylistsProvider>)> {
        self.playlists.get(scheme)
    }

    /// All library-capable backends, in registration order
    pub fn library_backends(&self) -> &[(String, Arc<dyn LibraryProvider>)] {
        &self.library_backends
    }

    /// All playlists-capable backends, in registration order
    pub fn playlists_backends(&self) -> &[(String, Arc<dyn PlaylistsProvider>)] {
        &self.playlists_backends
    }

    /// Group URIs by the library backend owning their scheme
    ///
    /// URIs with no library-capable owner are dropped; the callers pre-seed
    /// their result maps so such URIs still come back empty.
    pub fn partition_library_uris(
        &self,
        uris: &[String],
    ) -> Vec<(String, Arc<dyn LibraryProvider>, Vec<String>)> {
        let mut grouped: Vec<(String, Arc<dyn LibraryProvider>, Vec<String>)> = Vec::new();
        for uri in uris {
            let Some((name, provider)) = self.library_for(uri) else {
                continue;
            };
            match grouped.iter_mut().find(|(n, _, _)| n == name) {
                Some((_, _, bucket)) => bucket.push(uri.clone()),
                None => grouped.push((name.clone(), Arc::clone(provider), vec![uri.clone()])),
            }
        }
        grouped
    }

    /// Run one backend call under the containment policy
    ///
    /// `Ok(v)` passes through as `Some(v)`. A fault (error, bad data, or an
    /// elapsed timeout when one is configured) is logged with the backend
    /// name and operation and becomes `None`, so a misbehaving backend never
    /// aborts the aggregate operation.
    pub async fn contain<T, F>(&self, backend: &str, operation: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        let outcome = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(backend, operation, "backend call timed out");
                    return None;
                }
            },
            None => call.await,
        };

        match outcome {
            Ok(value) => Some(value),
            Err(CoreError::Validation(msg)) => {
                error!(backend, operation, %msg, "backend returned bad data");
                None
            }
            Err(err) => {
                error!(backend, operation, %err, "backend call failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("schemes", &self.schemes)
            .field("library", &self.library.keys().collect::<Vec<_>>())
            .field("playback", &self.playback.keys().collect::<Vec<_>>())
            .field("playlists", &self.playlists.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_models::Backend;

    #[test]
    fn duplicate_scheme_is_rejected() {
        let backends = vec![
            Backend::new("one", ["dummy"]),
            Backend::new("two", ["dummy"]),
        ];
        let result = BackendRegistry::new(backends, &CoreConfig::default());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn schemes_are_sorted_union() {
        let backends = vec![
            Backend::new("one", ["zzz", "aaa"]),
            Backend::new("two", ["mmm"]),
        ];
        let registry = BackendRegistry::new(backends, &CoreConfig::default()).unwrap();
        assert_eq!(registry.uri_schemes(), ["aaa", "mmm", "zzz"]);
    }

    #[test]
    fn scheme_extraction() {
        assert_eq!(uri_scheme("dummy:track:1"), Some("dummy".to_string()));
        assert_eq!(uri_scheme("no scheme here"), None);
    }

    #[test]
    fn lookup_by_unknown_scheme_is_none() {
        let registry =
            BackendRegistry::new(vec![Backend::new("one", ["dummy"])], &CoreConfig::default())
                .unwrap();
        assert!(registry.library_for("other:track:1").is_none());
        assert!(registry.playback_for("other:track:1").is_none());
        assert!(registry.playlists_for("other:playlist:1").is_none());
    }
}
