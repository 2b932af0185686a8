//! Reelgraph Recommendation Engine
//!
//! Hybrid movie recommendations from two signals: item-item similarity in a
//! truncated-SVD latent space, and shared genres in a movie–genre graph.
//! Everything is derived once from the loaded [`Dataset`] and is read-only
//! afterwards, so one engine can be shared by any number of request workers.

pub mod collaborative;
pub mod graph;
pub mod matrix;
pub mod matrix_factorization;
pub mod recommendation;
pub mod server;

pub use collaborative::{CollaborativeRecommender, ScoredMovie};
pub use graph::{GenreGraph, GraphCandidate, GraphRecommender, Node, NodeKey};
pub use matrix::InteractionMatrix;
pub use matrix_factorization::{LatentFactorModel, SvdConfig};
pub use recommendation::{
    HybridRecommendations, RankedRecommendation, RecommendationSource, SeedId,
};

use reelgraph_core::{Dataset, EngineConfig, FilteredRating, MovieFilter, MovieId, Result};
use std::time::Instant;
use tracing::{error, info};

/// Fully built recommender state
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    dataset: Dataset,
    collaborative: CollaborativeRecommender,
    graph: GraphRecommender,
    default_top_n: usize,
}

impl RecommendationEngine {
    /// Derive the interaction matrix, latent model and genre graph.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the latent factor count does not fit
    /// the interaction matrix.
    pub fn build(dataset: Dataset, config: &EngineConfig) -> Result<Self> {
        let started = Instant::now();
        let collaborative = CollaborativeRecommender::train(&dataset, &SvdConfig::from(config))?;
        info!(
            latent_factors = collaborative.model().latent_factors(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fitted latent factor model"
        );

        let graph = GraphRecommender::from_dataset(&dataset);

        info!(
            ratings = dataset.ratings().len(),
            movies = dataset.movies().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendation engine ready"
        );

        Ok(Self {
            dataset,
            collaborative,
            graph,
            default_top_n: config.default_top_n,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn collaborative(&self) -> &CollaborativeRecommender {
        &self.collaborative
    }

    pub fn graph(&self) -> &GraphRecommender {
        &self.graph
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    /// Titles of the movies most similar to `movie_id` in latent space,
    /// most similar first
    pub fn get_collaborative_recommendations(
        &self,
        movie_id: MovieId,
        top_n: usize,
    ) -> Vec<String> {
        self.collaborative
            .recommend(&self.dataset, movie_id, top_n)
            .into_iter()
            .map(|m| m.title)
            .collect()
    }

    /// Titles of movies sharing a genre with the movie titled `title`
    pub fn get_graph_based_recommendations(&self, title: &str, top_n: usize) -> Vec<String> {
        self.graph
            .recommend(title, top_n)
            .into_iter()
            .map(|c| c.title)
            .collect()
    }

    /// Both recommenders merged, with set and ranked views.
    ///
    /// A seed missing from the movie metadata is logged and yields an empty result.
    pub fn hybrid_recommendations(&self, seed: SeedId, top_n: usize) -> HybridRecommendations {
        let Some(movie) = seed.movie_id().and_then(|id| self.dataset.movie(id)) else {
            error!(movie_id = seed.get(), "Movie not found");
            return HybridRecommendations::default();
        };

        let collaborative = self.collaborative.recommend(&self.dataset, movie.movie_id, top_n);
        let graph = self.graph.recommend(&movie.title, top_n);

        HybridRecommendations::merge(&movie.title, &collaborative, &graph)
    }

    /// Distinct titles recommended by either signal, never including the seed
    pub fn get_hybrid_recommendations(&self, seed: SeedId, top_n: usize) -> Vec<String> {
        self.hybrid_recommendations(seed, top_n).into_titles()
    }

    /// Ratings joined with metadata that satisfy every supplied predicate
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a genre outside the known vocabulary.
    pub fn filter_movies(&self, filter: &MovieFilter) -> Result<Vec<FilteredRating>> {
        reelgraph_core::filter_movies(&self.dataset, filter)
    }
}
