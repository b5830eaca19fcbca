use serde::{Deserialize, Serialize};

/// One enriched neighbor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    /// Always populated, falls back to the placeholder image
    pub poster: String,
    /// Always populated, falls back to "Description not available"
    pub description: String,
    pub trailer: Option<String>,
}

/// Recommendations for one query as four positionally aligned sequences
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub titles: Vec<String>,
    pub posters: Vec<String>,
    pub descriptions: Vec<String>,
    pub trailers: Vec<Option<String>>,
}

impl RecommendationResult {
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl FromIterator<Recommendation> for RecommendationResult {
    fn from_iter<I: IntoIterator<Item = Recommendation>>(iter: I) -> Self {
        let mut result = Self::default();
        for rec in iter {
            result.titles.push(rec.title);
            result.posters.push(rec.poster);
            result.descriptions.push(rec.description);
            result.trailers.push(rec.trailer);
        }
        result
    }
}
