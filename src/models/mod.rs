use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod recommendation;

pub use recommendation::{Recommendation, RecommendationResult};

/// TMDB identifier of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Identifier used to query the metadata API
    pub id: MovieId,
    /// Display name, also the lookup key
    pub title: String,
    /// Row of this movie in the similarity matrix
    pub index: usize,
}

impl Movie {
    pub fn new(id: u64, title: impl Into<String>, index: usize) -> Self {
        Self {
            id: MovieId(id),
            title: title.into(),
            index,
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of GET /movie/{id}
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// GET /movie/{id}/videos
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Video {
    #[serde(default)]
    pub key: Option<String>,
}
