/// TMDB API provider
///
/// API Flow:
/// 1. Details: /movie/{id} → poster_path, overview
/// 2. Videos: /movie/{id}/videos → results[].key (YouTube video keys)
use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, MovieId, VideoList},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
}

impl TmdbProvider {
    /// Creates a provider whose requests each time out after `timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        language: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
        })
    }

    fn movie_url(&self, id: MovieId, suffix: &str) -> String {
        format!("{}/movie/{}{}", self.api_url, id, suffix)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        // without_url keeps the api_key query parameter out of error messages
        let response = self
            .http_client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::from_transport(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::from_transport(e.without_url()))?;
        tracing::trace!(response = %response_text, "Raw TMDB API response");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(error = %e, url = %url, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails> {
        let details: MovieDetails = self.get_json(&self.movie_url(id, "")).await?;

        tracing::debug!(
            movie_id = %id,
            has_poster = details.poster_path.is_some(),
            has_overview = details.overview.is_some(),
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }

    async fn movie_videos(&self, id: MovieId) -> AppResult<VideoList> {
        let videos: VideoList = self.get_json(&self.movie_url(id, "/videos")).await?;

        tracing::debug!(
            movie_id = %id,
            videos = videos.results.len(),
            provider = "tmdb",
            "Movie videos fetched"
        );

        Ok(videos)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
