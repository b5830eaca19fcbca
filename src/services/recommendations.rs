use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationResult},
    services::{catalog::CatalogIndex, enricher::MetadataEnricher},
};

/// Where the catalog was loaded from, so it can be read again on reload
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub movies_path: PathBuf,
    pub similarity_path: PathBuf,
}

/// Generates "more like this" recommendations for a catalog title
///
/// Looks up the nearest neighbors in the similarity matrix and enriches each
/// of them with poster, description and trailer. The catalog is shared
/// read-only; a reload swaps it as a whole and invalidates the metadata cache.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<RwLock<Arc<CatalogIndex>>>,
    enricher: MetadataEnricher,
    source: Option<CatalogSource>,
}

impl Recommender {
    pub fn new(catalog: CatalogIndex, enricher: MetadataEnricher) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            enricher,
            source: None,
        }
    }

    /// Remembers the files backing the catalog, enabling `reload`
    pub fn with_source(mut self, source: CatalogSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Snapshot of the current catalog
    pub async fn catalog(&self) -> Arc<CatalogIndex> {
        self.catalog.read().await.clone()
    }

    /// Returns the enriched neighbors of `title`, best match first
    ///
    /// An unknown title produces an empty result. Neighbors are enriched
    /// concurrently and reassembled in ranking order; a neighbor whose task
    /// dies falls back to placeholder metadata.
    pub async fn recommend(&self, title: &str) -> RecommendationResult {
        let neighbors = self.catalog().await.lookup(title);

        if neighbors.is_empty() {
            tracing::info!(title = %title, "No recommendations found");
            return RecommendationResult::default();
        }

        let mut tasks = Vec::with_capacity(neighbors.len());
        for movie in neighbors {
            let enricher = self.enricher.clone();
            let neighbor = movie.clone();
            let task = tokio::spawn(async move { enricher.enrich(&neighbor).await });
            tasks.push((movie, task));
        }

        let mut recommendations: Vec<Recommendation> = Vec::with_capacity(tasks.len());
        for (movie, task) in tasks {
            match task.await {
                Ok(rec) => recommendations.push(rec),
                Err(e) => {
                    tracing::error!(error = %e, movie_id = %movie.id, "Enrichment task failed");
                    recommendations.push(self.enricher.fallback(&movie));
                }
            }
        }

        tracing::info!(
            title = %title,
            results = recommendations.len(),
            "Recommendations generated"
        );

        recommendations.into_iter().collect()
    }

    /// Re-reads the catalog files and drops all cached metadata
    ///
    /// On failure the current catalog stays in service. Returns the number of
    /// movies in the new catalog.
    pub async fn reload(&self) -> AppResult<usize> {
        let source = self.source.clone().ok_or_else(|| {
            AppError::InvalidInput("Catalog was not loaded from files".to_string())
        })?;
        let neighbor_count = self.catalog().await.neighbor_count();

        let index = tokio::task::spawn_blocking(move || {
            CatalogIndex::load(&source.movies_path, &source.similarity_path)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .with_neighbor_count(neighbor_count);

        let count = index.len();
        *self.catalog.write().await = Arc::new(index);
        self.enricher.cache().invalidate().await;

        tracing::info!(movies = count, "Catalog reloaded");
        Ok(count)
    }
}
