//! Catalog of recommendable movies and their precomputed similarity matrix
//!
//! Both datasets come out of the offline feature pipeline and are loaded once;
//! the index never mutates them. A reload builds a fresh index instead.
use crate::{
    error::{AppError, AppResult},
    models::Movie,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{cmp::Ordering, collections::HashMap, fs::File, io::BufReader, path::Path};

pub const DEFAULT_NEIGHBOR_COUNT: usize = 5;

/// Square matrix of non-negative similarity scores, one row per movie
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    pub fn new(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(AppError::Catalog(format!(
                "Similarity matrix is not square: row {} has {} columns, expected {}",
                i,
                row.len(),
                size
            )));
        }
        Ok(Self { rows })
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.rows[index]
    }
}

/// Movie records as exported by the offline pipeline
///
/// Accepts a plain list of rows or the column-oriented dictionary a dataframe
/// export produces (`{"movie_id": {"0": 19995}, "title": {"0": "Avatar"}}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MovieRecords {
    Rows(Vec<MovieRow>),
    Columns(MovieColumns),
}

#[derive(Debug, Deserialize)]
struct MovieRow {
    movie_id: u64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct MovieColumns {
    movie_id: HashMap<String, u64>,
    title: HashMap<String, String>,
}

impl MovieRecords {
    fn into_movies(self) -> AppResult<Vec<Movie>> {
        let rows = match self {
            MovieRecords::Rows(rows) => rows,
            MovieRecords::Columns(columns) => columns.into_rows()?,
        };

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| Movie::new(row.movie_id, row.title, index))
            .collect())
    }
}

impl MovieColumns {
    fn into_rows(mut self) -> AppResult<Vec<MovieRow>> {
        let mut keyed = Vec::with_capacity(self.movie_id.len());

        for (key, movie_id) in self.movie_id {
            let position: usize = key
                .parse()
                .map_err(|_| AppError::Catalog(format!("Invalid row key '{}'", key)))?;
            let title = self.title.remove(&key).ok_or_else(|| {
                AppError::Catalog(format!("Row '{}' has a movie_id but no title", key))
            })?;
            keyed.push((position, MovieRow { movie_id, title }));
        }

        if !self.title.is_empty() {
            return Err(AppError::Catalog(format!(
                "{} rows have a title but no movie_id",
                self.title.len()
            )));
        }

        keyed.sort_by_key(|(position, _)| *position);
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }
}

/// Read-only lookup structure answering "top-K similar to this title"
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    movies: Vec<Movie>,
    similarity: SimilarityMatrix,
    by_title: HashMap<String, usize>,
    neighbor_count: usize,
    loaded_at: DateTime<Utc>,
}

impl CatalogIndex {
    /// Builds an index, checking that every movie owns the matrix row at its position
    pub fn new(movies: Vec<Movie>, similarity: SimilarityMatrix) -> AppResult<Self> {
        if movies.len() != similarity.size() {
            return Err(AppError::Catalog(format!(
                "Catalog has {} movies but the similarity matrix has {} rows",
                movies.len(),
                similarity.size()
            )));
        }

        let mut by_title = HashMap::with_capacity(movies.len());
        for (position, movie) in movies.iter().enumerate() {
            if movie.index != position {
                return Err(AppError::Catalog(format!(
                    "Movie '{}' has index {} at position {}",
                    movie.title, movie.index, position
                )));
            }
            // First occurrence wins for duplicate titles
            by_title.entry(movie.title.clone()).or_insert(position);
        }

        Ok(Self {
            movies,
            similarity,
            by_title,
            neighbor_count: DEFAULT_NEIGHBOR_COUNT,
            loaded_at: Utc::now(),
        })
    }

    /// Loads the movie records and similarity matrix from JSON files
    pub fn load(movies_path: impl AsRef<Path>, similarity_path: impl AsRef<Path>) -> AppResult<Self> {
        let records: MovieRecords = read_json(movies_path.as_ref())?;
        let rows: Vec<Vec<f32>> = read_json(similarity_path.as_ref())?;

        let index = Self::new(records.into_movies()?, SimilarityMatrix::new(rows)?)?;

        tracing::info!(
            movies = index.len(),
            movies_path = %movies_path.as_ref().display(),
            similarity_path = %similarity_path.as_ref().display(),
            "Catalog loaded"
        );

        Ok(index)
    }

    pub fn with_neighbor_count(mut self, neighbor_count: usize) -> Self {
        self.neighbor_count = neighbor_count;
        self
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbor_count
    }

    /// Returns the closest movies to `title`, best first
    ///
    /// The query movie itself is never part of the result. Ties keep matrix
    /// order. An unknown title yields an empty list.
    pub fn lookup(&self, title: &str) -> Vec<Movie> {
        let Some(&query) = self.by_title.get(title) else {
            tracing::debug!(title = %title, "Title not in catalog");
            return Vec::new();
        };

        let mut ranked: Vec<(usize, f32)> = self
            .similarity
            .row(query)
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| *i != query)
            .collect();

        // sort_by is stable, so equal scores stay in index order
        ranked.sort_by(|a, b| {
            rank_key(b.1)
                .partial_cmp(&rank_key(a.1))
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(self.neighbor_count);

        ranked
            .into_iter()
            .map(|(i, _)| self.movies[i].clone())
            .collect()
    }

    pub fn get(&self, title: &str) -> Option<&Movie> {
        self.by_title.get(title).map(|&i| &self.movies[i])
    }

    pub fn titles(&self) -> Vec<String> {
        self.movies.iter().map(|m| m.title.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// NaN ranks below every real score
fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let file = File::open(path)
        .map_err(|e| AppError::Catalog(format!("Failed to open {}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::Catalog(format!("Failed to parse {}: {}", path.display(), e)))
}
