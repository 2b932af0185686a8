//! Immutable in-memory ratings and movie-metadata tables.

use std::collections::HashMap;

use crate::error::RecommenderError;
use crate::types::{Movie, MovieId, Rating};
use crate::Result;

/// Both source tables, loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    ratings: Vec<Rating>,
    movies: Vec<Movie>,
    /// movie_id -> position in `movies`
    movie_index: HashMap<MovieId, usize>,
}

impl Dataset {
    /// Build the tables, checking that movie ids are unique and ratings are in 1..=5.
    pub fn new(ratings: Vec<Rating>, movies: Vec<Movie>) -> Result<Self> {
        if let Some(bad) = ratings.iter().find(|r| !(1..=5).contains(&r.rating)) {
            return Err(RecommenderError::DataLoad(format!(
                "rating {} for user {} / movie {} is outside 1..=5",
                bad.rating, bad.user_id, bad.movie_id
            )));
        }

        let mut movie_index = HashMap::with_capacity(movies.len());
        for (position, movie) in movies.iter().enumerate() {
            if movie_index.insert(movie.movie_id, position).is_some() {
                return Err(RecommenderError::DataLoad(format!(
                    "duplicate movie_id {} in metadata",
                    movie.movie_id
                )));
            }
        }

        Ok(Self {
            ratings,
            movies,
            movie_index,
        })
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movie_index
            .get(&movie_id)
            .map(|&position| &self.movies[position])
    }

    pub fn title_of(&self, movie_id: MovieId) -> Option<&str> {
        self.movie(movie_id).map(|movie| movie.title.as_str())
    }
}
