//! Collaborative filtering over latent movie vectors
//!
//! Movies are compared by cosine similarity of their truncated-SVD latent
//! vectors. The seed movie is resolved to its matrix column through the
//! interaction matrix's id mapping, never by assuming an id equals a position.

use ndarray::ArrayView1;
use reelgraph_core::{Dataset, MovieId, RecommenderError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{error, info};

use crate::matrix::InteractionMatrix;
use crate::matrix_factorization::{LatentFactorModel, SvdConfig};

/// A movie with its similarity to the seed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f64,
}

/// Item-item recommender backed by a fitted latent factor model
#[derive(Debug, Clone)]
pub struct CollaborativeRecommender {
    matrix: InteractionMatrix,
    model: LatentFactorModel,
    /// L2 norm of each movie's latent vector, by column
    norms: Vec<f64>,
}

impl CollaborativeRecommender {
    /// Build the interaction matrix from the ratings table and fit the model
    pub fn train(dataset: &Dataset, config: &SvdConfig) -> Result<Self> {
        let matrix = InteractionMatrix::from_ratings(dataset.ratings());
        let (users, movies) = matrix.shape();
        info!(users, movies, "Built user-item interaction matrix");

        let model = LatentFactorModel::fit(&matrix, config)?;
        Ok(Self::new(matrix, model))
    }

    pub fn new(matrix: InteractionMatrix, model: LatentFactorModel) -> Self {
        let norms = model
            .column_vectors()
            .outer_iter()
            .map(|row| row.dot(&row).sqrt())
            .collect();

        Self {
            matrix,
            model,
            norms,
        }
    }

    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn model(&self) -> &LatentFactorModel {
        &self.model
    }

    /// Top `top_n` movies most similar to `seed`, descending by similarity.
    ///
    /// # Errors
    ///
    /// Returns `SeedNotFound` if the movie has no ratings and so no latent vector.
    pub fn try_recommend(
        &self,
        dataset: &Dataset,
        seed: MovieId,
        top_n: usize,
    ) -> Result<Vec<ScoredMovie>> {
        let column = self.matrix.movie_column(seed).ok_or_else(|| {
            RecommenderError::SeedNotFound(format!("movie {} has no latent vector", seed))
        })?;

        self.try_recommend_by_index(dataset, column, top_n)
    }

    /// Same as [`try_recommend`](Self::try_recommend), addressed by matrix column
    pub fn try_recommend_by_index(
        &self,
        dataset: &Dataset,
        column: usize,
        top_n: usize,
    ) -> Result<Vec<ScoredMovie>> {
        let vectors = self.model.column_vectors();
        let seed_vector = self.model.column_vector(column).ok_or_else(|| {
            RecommenderError::SeedNotFound(format!(
                "matrix column {} is outside 0..{}",
                column,
                vectors.nrows()
            ))
        })?;
        let seed_norm = self.norms[column];

        let mut scored: Vec<(usize, f64)> = vectors
            .outer_iter()
            .enumerate()
            .filter(|(candidate, _)| *candidate != column)
            .map(|(candidate, vector)| {
                let score = cosine_similarity(
                    seed_vector,
                    vector,
                    seed_norm,
                    self.norms[candidate],
                );
                (candidate, score)
            })
            .collect();

        // Stable sort keeps column order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let results = scored
            .into_iter()
            .filter_map(|(candidate, score)| {
                let movie_id = self.matrix.movie_at(candidate)?;
                let title = dataset.title_of(movie_id)?;
                Some(ScoredMovie {
                    movie_id,
                    title: title.to_string(),
                    score,
                })
            })
            .take(top_n)
            .collect();

        Ok(results)
    }

    /// Like [`try_recommend`](Self::try_recommend), but an unknown seed is logged
    /// and yields an empty list.
    pub fn recommend(&self, dataset: &Dataset, seed: MovieId, top_n: usize) -> Vec<ScoredMovie> {
        match self.try_recommend(dataset, seed, top_n) {
            Ok(results) => results,
            Err(e) => {
                error!(movie_id = seed, error = %e, "Movie ID not found in the interaction matrix");
                Vec::new()
            }
        }
    }

    pub fn recommend_by_index(
        &self,
        dataset: &Dataset,
        column: usize,
        top_n: usize,
    ) -> Vec<ScoredMovie> {
        self.try_recommend_by_index(dataset, column, top_n)
            .unwrap_or_else(|e| {
                error!(column, error = %e, "Seed column not found");
                Vec::new()
            })
    }
}

fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    a.dot(&b) / (norm_a * norm_b)
}
