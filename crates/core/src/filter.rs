//! Analytics filtering over ratings joined with movie metadata.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::types::Genre;
use crate::Result;

/// Filter predicates. Every supplied predicate must hold (AND semantics).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFilter {
    /// Keep ratings `>= min_rating`
    #[serde(default)]
    pub min_rating: Option<f64>,
    /// Genre column name, e.g. "Comedy"
    #[serde(default)]
    pub genre: Option<String>,
    /// Keep movies released in or after this year. `0` means no constraint.
    #[serde(default)]
    pub year: Option<i32>,
}

/// One qualifying rating, joined with its movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredRating {
    pub title: String,
    pub release_year: Option<i32>,
    pub rating: u8,
}

/// Return one record per qualifying rating, in ratings-table order.
///
/// Ratings whose movie has no metadata row are dropped. The same movie appears
/// once per qualifying rating.
pub fn filter_movies(dataset: &Dataset, filter: &MovieFilter) -> Result<Vec<FilteredRating>> {
    let min_rating = filter.min_rating.unwrap_or(0.0);
    let genre = filter
        .genre
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(str::parse::<Genre>)
        .transpose()?;
    let year = filter.year.filter(|&year| year != 0);

    let records = dataset
        .ratings()
        .iter()
        .filter(|rating| f64::from(rating.rating) >= min_rating)
        .filter_map(|rating| dataset.movie(rating.movie_id).map(|movie| (rating, movie)))
        .filter(|(_, movie)| genre.map_or(true, |genre| movie.has_genre(genre)))
        .filter(|(_, movie)| {
            year.map_or(true, |year| {
                movie.release_year().map_or(false, |released| released >= year)
            })
        })
        .map(|(rating, movie)| FilteredRating {
            title: movie.title.clone(),
            release_year: movie.release_year(),
            rating: rating.rating,
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommenderError;
    use crate::types::{Movie, Rating};
    use chrono::NaiveDate;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    fn rating(user_id: u32, movie_id: u32, rating: u8) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 874965758,
        }
    }

    fn dataset() -> Dataset {
        let movies = vec![
            Movie::new(1, "Toy Story (1995)")
                .with_release_date(date(1995))
                .with_genres([Genre::Animation, Genre::Comedy]),
            Movie::new(2, "Clerks (1994)")
                .with_release_date(date(1994))
                .with_genres([Genre::Comedy]),
            Movie::new(3, "Heat (1995)")
                .with_release_date(date(1995))
                .with_genres([Genre::Action, Genre::Crime]),
            Movie::new(4, "Undated Comedy").with_genres([Genre::Comedy]),
        ];
        let ratings = vec![
            rating(1, 1, 5),
            rating(2, 1, 3),
            rating(1, 2, 4),
            rating(3, 3, 5),
            rating(3, 4, 5),
            rating(4, 99, 5),
            rating(4, 1, 4),
        ];
        Dataset::new(ratings, movies).unwrap()
    }

    #[test]
    fn test_all_predicates_combined() {
        let filter = MovieFilter {
            min_rating: Some(4.0),
            genre: Some("Comedy".to_string()),
            year: Some(1995),
        };

        let records = filter_movies(&dataset(), &filter).unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(record.rating >= 4);
            assert_eq!(record.title, "Toy Story (1995)");
            assert!(record.release_year.unwrap() >= 1995);
        }
    }

    #[test]
    fn test_empty_filter_is_inner_join() {
        let records = filter_movies(&dataset(), &MovieFilter::default()).unwrap();
        // The rating for movie 99 has no metadata row
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].title, "Toy Story (1995)");
        assert_eq!(records[5].rating, 4);
    }

    #[test]
    fn test_year_filter_excludes_undated_movies() {
        let filter = MovieFilter {
            year: Some(1900),
            ..Default::default()
        };
        let records = filter_movies(&dataset(), &filter).unwrap();
        assert!(records.iter().all(|r| r.title != "Undated Comedy"));

        let filter = MovieFilter {
            year: Some(0),
            ..Default::default()
        };
        let records = filter_movies(&dataset(), &filter).unwrap();
        assert!(records.iter().any(|r| r.title == "Undated Comedy"));
    }

    #[test]
    fn test_unknown_genre_is_rejected() {
        let filter = MovieFilter {
            genre: Some("Cyberpunk".to_string()),
            ..Default::default()
        };
        let result = filter_movies(&dataset(), &filter);
        assert!(matches!(result, Err(RecommenderError::ValidationError(_))));
    }

    #[test]
    fn test_filter_deserializes_partial_json() {
        let filter: MovieFilter = serde_json::from_str(r#"{"genre": "Comedy"}"#).unwrap();
        assert_eq!(filter.genre.as_deref(), Some("Comedy"));
        assert_eq!(filter.min_rating, None);
        assert_eq!(filter.year, None);
    }
}
