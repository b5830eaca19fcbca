use std::sync::Arc;
use std::time::Duration;

use crate::{
    cached,
    config::Config,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{Movie, MovieId, Recommendation},
    services::providers::MetadataProvider,
};

pub const DESCRIPTION_FALLBACK: &str = "Description not available";
pub const TRAILER_BASE_URL: &str = "https://www.youtube.com/watch?v=";

/// Knobs for the per-field fetch policies
#[derive(Debug, Clone)]
pub struct EnricherSettings {
    pub image_base_url: String,
    pub placeholder_poster_url: String,
    pub poster_max_attempts: u32,
    pub poster_retry_backoff: Duration,
}

impl Default for EnricherSettings {
    fn default() -> Self {
        Self {
            image_base_url: "https://image.tmdb.org/t/p/w500/".to_string(),
            placeholder_poster_url: "https://via.placeholder.com/500x750?text=No+Image+Available"
                .to_string(),
            poster_max_attempts: 3,
            poster_retry_backoff: Duration::from_secs(2),
        }
    }
}

impl From<&Config> for EnricherSettings {
    fn from(config: &Config) -> Self {
        Self {
            image_base_url: config.image_base_url.clone(),
            placeholder_poster_url: config.placeholder_poster_url.clone(),
            poster_max_attempts: config.poster_max_attempts,
            poster_retry_backoff: config.poster_retry_backoff(),
        }
    }
}

/// Attaches poster, description and trailer to catalog movies
///
/// Each field has its own failure policy and all of them degrade to a fallback
/// instead of failing:
/// - poster: retried on connection-level failures only, placeholder otherwise
/// - description: single attempt, "Description not available" otherwise
/// - trailer: single attempt, `None` otherwise
///
/// Successful lookups (including "the API has no such field") are cached per
/// movie and field. Failures are not cached, so the next query tries again.
#[derive(Clone)]
pub struct MetadataEnricher {
    provider: Arc<dyn MetadataProvider>,
    cache: Cache,
    settings: Arc<EnricherSettings>,
}

impl MetadataEnricher {
    pub fn new(provider: Arc<dyn MetadataProvider>, cache: Cache, settings: EnricherSettings) -> Self {
        Self {
            provider,
            cache,
            settings: Arc::new(settings),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Fetches the three metadata fields of one movie concurrently
    pub async fn enrich(&self, movie: &Movie) -> Recommendation {
        let (poster, description, trailer) = tokio::join!(
            self.fetch_poster(movie.id),
            self.fetch_description(movie.id),
            self.fetch_trailer(movie.id),
        );

        Recommendation {
            title: movie.title.clone(),
            poster,
            description,
            trailer,
        }
    }

    /// Record with every field at its fallback value
    pub fn fallback(&self, movie: &Movie) -> Recommendation {
        Recommendation {
            title: movie.title.clone(),
            poster: self.settings.placeholder_poster_url.clone(),
            description: DESCRIPTION_FALLBACK.to_string(),
            trailer: None,
        }
    }

    /// Full poster URL, or the placeholder image
    pub async fn fetch_poster(&self, id: MovieId) -> String {
        match self.cached_poster_path(id).await {
            Ok(Some(path)) => self.poster_url(&path),
            Ok(None) => {
                tracing::debug!(movie_id = %id, "Movie has no poster");
                self.settings.placeholder_poster_url.clone()
            }
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %e, "Poster fetch failed, using placeholder");
                self.settings.placeholder_poster_url.clone()
            }
        }
    }

    /// Overview text, or "Description not available"
    pub async fn fetch_description(&self, id: MovieId) -> String {
        match self.cached_overview(id).await {
            Ok(Some(overview)) => overview,
            Ok(None) => DESCRIPTION_FALLBACK.to_string(),
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %e, "Description fetch failed");
                DESCRIPTION_FALLBACK.to_string()
            }
        }
    }

    /// YouTube URL of the first listed video, if any
    pub async fn fetch_trailer(&self, id: MovieId) -> Option<String> {
        match self.cached_trailer_key(id).await {
            Ok(key) => key.map(|key| format!("{}{}", TRAILER_BASE_URL, key)),
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %e, "Trailer fetch failed");
                None
            }
        }
    }

    async fn cached_poster_path(&self, id: MovieId) -> AppResult<Option<String>> {
        cached!(self.cache, CacheKey::Poster(id), self.poster_path_with_retry(id))
    }

    async fn cached_overview(&self, id: MovieId) -> AppResult<Option<String>> {
        cached!(self.cache, CacheKey::Description(id), async move {
            let details = self.provider.movie_details(id).await?;
            AppResult::Ok(details.overview)
        })
    }

    async fn cached_trailer_key(&self, id: MovieId) -> AppResult<Option<String>> {
        cached!(self.cache, CacheKey::Trailer(id), async move {
            let videos = self.provider.movie_videos(id).await?;
            let key = videos
                .results
                .into_iter()
                .next()
                .and_then(|video| video.key)
                .filter(|key| !key.is_empty());
            AppResult::Ok(key)
        })
    }

    /// Requests the poster path, retrying only when the API could not be reached
    async fn poster_path_with_retry(&self, id: MovieId) -> AppResult<Option<String>> {
        let max_attempts = self.settings.poster_max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.provider.movie_details(id).await {
                Ok(details) => return Ok(details.poster_path.filter(|path| !path.is_empty())),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        movie_id = %id,
                        attempt,
                        max_attempts,
                        error = %e,
                        provider = self.provider.name(),
                        "Metadata API unreachable, retrying poster fetch"
                    );
                    tokio::time::sleep(self.settings.poster_retry_backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn poster_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
