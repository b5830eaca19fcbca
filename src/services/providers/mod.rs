/// Movie metadata provider abstraction
///
/// The enricher talks to the metadata API only through this trait, which keeps
/// the retry and fallback policy testable without a network.
use crate::{
    error::AppResult,
    models::{MovieDetails, MovieId, VideoList},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
///
/// Implementations report connection-level failures as `AppError::Unreachable`
/// and every other failure (bad status, undecodable body) as a permanent error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the details document for a movie (poster path, overview)
    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails>;

    /// Fetch the list of videos attached to a movie
    async fn movie_videos(&self, id: MovieId) -> AppResult<VideoList>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
