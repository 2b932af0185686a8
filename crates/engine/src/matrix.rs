//! Dense user × movie interaction matrix
//!
//! Rows are users and columns are movies, both sorted ascending by id. Cells
//! hold the rating, or 0.0 where the user never rated the movie. The matrix
//! keeps explicit id ↔ index mappings in both directions so callers never
//! treat a row or column position as an id.

use ndarray::Array2;
use reelgraph_core::{MovieId, Rating, UserId};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    values: Array2<f64>,
    user_ids: Vec<UserId>,
    movie_ids: Vec<MovieId>,
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
}

impl InteractionMatrix {
    /// Pivot ratings into a dense matrix.
    ///
    /// Repeated (user, movie) pairs are averaged. Users and movies without any
    /// rating do not appear.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let user_ids: Vec<UserId> = ratings
            .iter()
            .map(|r| r.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let movie_ids: Vec<MovieId> = ratings
            .iter()
            .map(|r| r.movie_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_index: HashMap<UserId, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();
        let movie_index: HashMap<MovieId, usize> = movie_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        // (row, col) -> (sum, count)
        let mut cells: HashMap<(usize, usize), (f64, u32)> = HashMap::with_capacity(ratings.len());
        for rating in ratings {
            let row = user_index[&rating.user_id];
            let col = movie_index[&rating.movie_id];
            let cell = cells.entry((row, col)).or_insert((0.0, 0));
            cell.0 += f64::from(rating.rating);
            cell.1 += 1;
        }

        let mut values = Array2::<f64>::zeros((user_ids.len(), movie_ids.len()));
        for ((row, col), (sum, count)) in cells {
            values[[row, col]] = sum / f64::from(count);
        }

        Self {
            values,
            user_ids,
            movie_ids,
            user_index,
            movie_index,
        }
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_movies(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    pub fn user_row(&self, user_id: UserId) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    pub fn movie_column(&self, movie_id: MovieId) -> Option<usize> {
        self.movie_index.get(&movie_id).copied()
    }

    pub fn user_at(&self, row: usize) -> Option<UserId> {
        self.user_ids.get(row).copied()
    }

    pub fn movie_at(&self, column: usize) -> Option<MovieId> {
        self.movie_ids.get(column).copied()
    }

    /// Rating for a (user, movie) pair; 0.0 when absent or unknown
    pub fn get(&self, user_id: UserId, movie_id: MovieId) -> f64 {
        match (self.user_row(user_id), self.movie_column(movie_id)) {
            (Some(row), Some(col)) => self.values[[row, col]],
            _ => 0.0,
        }
    }
}
