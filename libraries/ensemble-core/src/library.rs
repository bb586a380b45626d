//! Library fan-out
//!
//! Holds no state of its own. Every operation picks the backends owning the
//! relevant URI schemes, dispatches all calls before awaiting any, and merges
//! the answers. A faulty backend contributes nothing; it never fails the
//! aggregate call.

use crate::registry::BackendRegistry;
use ensemble_models::{DistinctField, Image, Ref, Result, SearchQuery, SearchResult, Track};
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::error;

/// Aggregated browse, lookup, and search over all library backends
pub struct LibraryController {
    registry: Arc<BackendRegistry>,
}

impl LibraryController {
    /// Create the controller over the given registry
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    /// Browse a directory, or the merged root when no URI is given
    ///
    /// The root merges every backend's advertised root reference, sorted by
    /// display name and deduplicated. An unknown scheme browses empty.
    pub async fn browse(&self, uri: Option<&str>) -> Vec<Ref> {
        let Some(uri) = uri else {
            let mut roots: Vec<Ref> = self
                .registry
                .library_backends()
                .iter()
                .filter_map(|(_, provider)| provider.root_directory())
                .collect();
            roots.sort_by(|a, b| a.name.cmp(&b.name));
            roots.dedup();
            return roots;
        };

        let Some((name, provider)) = self.registry.library_for(uri) else {
            return Vec::new();
        };
        self.registry
            .contain(name, "browse", provider.browse(uri))
            .await
            .unwrap_or_default()
    }

    /// Resolve URIs to tracks
    ///
    /// Every requested URI is present in the result, mapping to an empty
    /// list when no backend owns it or the owner found nothing. Backend
    /// answers for URIs that were not requested are discarded.
    pub async fn lookup(&self, uris: &[String]) -> HashMap<String, Vec<Track>> {
        let mut result: HashMap<String, Vec<Track>> =
            uris.iter().map(|uri| (uri.clone(), Vec::new())).collect();

        let calls = self
            .registry
            .partition_library_uris(uris)
            .into_iter()
            .map(|(name, provider, backend_uris)| {
                let registry = Arc::clone(&self.registry);
                async move {
                    let answer = registry
                        .contain(&name, "lookup", provider.lookup_many(&backend_uris))
                        .await;
                    (name, backend_uris, answer)
                }
            });

        for (name, requested, answer) in join_all(calls).await {
            let Some(answer) = answer else { continue };
            for (uri, tracks) in answer {
                if !requested.contains(&uri) {
                    error!(backend = %name, %uri, "lookup answered for a uri that was not asked");
                    continue;
                }
                result.entry(uri).or_default().extend(tracks);
            }
        }
        result
    }

    /// Search all relevant backends and collect their results
    ///
    /// `uris` optionally narrows the search: each backend only sees the roots
    /// whose scheme it owns, and backends owning none are skipped.
    pub async fn search(
        &self,
        query: &SearchQuery,
        uris: Option<&[String]>,
    ) -> Result<Vec<SearchResult>> {
        query.validate()?;

        let targets: Vec<(String, Arc<_>, Option<Vec<String>>)> = match uris {
            Some(uris) => self
                .registry
                .partition_library_uris(uris)
                .into_iter()
                .map(|(name, provider, backend_uris)| (name, provider, Some(backend_uris)))
                .collect(),
            None => self
                .registry
                .library_backends()
                .iter()
                .map(|(name, provider)| (name.clone(), Arc::clone(provider), None))
                .collect(),
        };

        let calls = targets.into_iter().map(|(name, provider, backend_uris)| {
            let registry = Arc::clone(&self.registry);
            let query = query.clone();
            async move {
                registry
                    .contain(
                        &name,
                        "search",
                        provider.search(&query, backend_uris.as_deref()),
                    )
                    .await
            }
        });

        Ok(join_all(calls).await.into_iter().flatten().flatten().collect())
    }

    /// Distinct values of a field across all library backends
    pub async fn get_distinct(
        &self,
        field: DistinctField,
        query: Option<&SearchQuery>,
    ) -> Result<BTreeSet<String>> {
        if let Some(query) = query {
            query.validate()?;
        }

        let calls = self.registry.library_backends().iter().map(|(name, provider)| {
            let registry = Arc::clone(&self.registry);
            let query = query.cloned();
            async move {
                registry
                    .contain(
                        name,
                        "get_distinct",
                        provider.get_distinct(field, query.as_ref()),
                    )
                    .await
            }
        });

        let mut values = BTreeSet::new();
        for answer in join_all(calls).await.into_iter().flatten() {
            values.extend(answer);
        }
        Ok(values)
    }

    /// Images for URIs, pre-seeded empty like [`LibraryController::lookup`]
    pub async fn get_images(&self, uris: &[String]) -> HashMap<String, Vec<Image>> {
        let mut result: HashMap<String, Vec<Image>> =
            uris.iter().map(|uri| (uri.clone(), Vec::new())).collect();

        let calls = self
            .registry
            .partition_library_uris(uris)
            .into_iter()
            .map(|(name, provider, backend_uris)| {
                let registry = Arc::clone(&self.registry);
                async move {
                    let answer = registry
                        .contain(&name, "get_images", provider.get_images(&backend_uris))
                        .await;
                    (name, backend_uris, answer)
                }
            });

        for (name, requested, answer) in join_all(calls).await {
            let Some(answer) = answer else { continue };
            for (uri, images) in answer {
                if !requested.contains(&uri) {
                    error!(backend = %name, %uri, "images answered for a uri that was not asked");
                    continue;
                }
                result.entry(uri).or_default().extend(images);
            }
        }
        result
    }

    /// Ask backends to refresh their catalogues
    ///
    /// With a URI only the owning backend refreshes, limited to that URI;
    /// without one every library backend refreshes fully.
    pub async fn refresh(&self, uri: Option<&str>) {
        if let Some(uri) = uri {
            if let Some((name, provider)) = self.registry.library_for(uri) {
                self.registry
                    .contain(name, "refresh", provider.refresh(Some(uri)))
                    .await;
            }
            return;
        }

        let calls = self.registry.library_backends().iter().map(|(name, provider)| {
            let registry = Arc::clone(&self.registry);
            async move { registry.contain(name, "refresh", provider.refresh(None)).await }
        });
        join_all(calls).await;
    }
}
