//! Core record types for the ratings and movie-metadata tables.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecommenderError;

pub type UserId = u32;
pub type MovieId = u32;

/// Movie genre, in the column order of the MovieLens item file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "unknown")]
    Unknown,
    Action,
    Adventure,
    Animation,
    #[serde(rename = "Children's")]
    Childrens,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    #[serde(rename = "Film-Noir")]
    FilmNoir,
    Horror,
    Musical,
    Mystery,
    Romance,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Every genre, in file column order
    pub const ALL: [Genre; 19] = [
        Genre::Unknown,
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Childrens,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Fantasy,
        Genre::FilmNoir,
        Genre::Horror,
        Genre::Musical,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Unknown => "unknown",
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Childrens => "Children's",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::FilmNoir => "Film-Noir",
            Genre::Horror => "Horror",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| RecommenderError::ValidationError(format!("Unknown genre: {}", s)))
    }
}

/// One row of the ratings table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Star rating in 1..=5
    pub rating: u8,
    /// Unix seconds
    pub timestamp: i64,
}

/// One row of the movie-metadata table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: MovieId,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    /// Genres flagged for this movie, in column order
    pub genres: Vec<Genre>,
}

impl Movie {
    pub fn new(movie_id: MovieId, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
            release_date: None,
            genres: Vec::new(),
        }
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = Genre>) -> Self {
        let mut genres: Vec<Genre> = genres.into_iter().collect();
        genres.sort();
        genres.dedup();
        self.genres = genres;
        self
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    pub fn has_genre(&self, genre: Genre) -> bool {
        self.genres.contains(&genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_round_trip_names() {
        for genre in Genre::ALL {
            assert_eq!(genre.as_str().parse::<Genre>().unwrap(), genre);
        }
    }

    #[test]
    fn test_genre_parse_is_case_sensitive() {
        assert!("comedy".parse::<Genre>().is_err());
        assert_eq!("Children's".parse::<Genre>().unwrap(), Genre::Childrens);
    }

    #[test]
    fn test_genre_serializes_as_column_name() {
        let json = serde_json::to_string(&Genre::SciFi).unwrap();
        assert_eq!(json, "\"Sci-Fi\"");
    }

    #[test]
    fn test_movie_genres_sorted_in_column_order() {
        let movie = Movie::new(1, "Toy Story (1995)").with_genres([
            Genre::Comedy,
            Genre::Animation,
            Genre::Childrens,
            Genre::Comedy,
        ]);

        assert_eq!(
            movie.genres,
            vec![Genre::Animation, Genre::Childrens, Genre::Comedy]
        );
        assert!(movie.has_genre(Genre::Comedy));
        assert!(!movie.has_genre(Genre::Drama));
    }

    #[test]
    fn test_release_year() {
        let movie = Movie::new(1, "Toy Story (1995)")
            .with_release_date(NaiveDate::from_ymd_opt(1995, 1, 1).unwrap());
        assert_eq!(movie.release_year(), Some(1995));
        assert_eq!(Movie::new(2, "Untitled").release_year(), None);
    }
}
