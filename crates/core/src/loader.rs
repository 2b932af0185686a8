//! MovieLens-100k file loading
//!
//! Reads the tab-separated ratings file (`u.data`) and the pipe-separated,
//! Latin-1 encoded item file (`u.item`) into a [`Dataset`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder};
use tracing::info;

use crate::dataset::Dataset;
use crate::error::RecommenderError;
use crate::types::{Genre, Movie, Rating};
use crate::Result;

pub const RATINGS_FILE: &str = "u.data";
pub const MOVIES_FILE: &str = "u.item";

/// Columns before the genre flags: id, title, release date, video release date, IMDb URL
const MOVIE_FIXED_COLUMNS: usize = 5;
const RELEASE_DATE_FORMAT: &str = "%d-%b-%Y";

/// Load both tables from a MovieLens directory
pub fn load_dataset(dir: impl AsRef<Path>) -> Result<Dataset> {
    let dir = dir.as_ref();
    let ratings = load_ratings(dir.join(RATINGS_FILE))?;
    let movies = load_movies(dir.join(MOVIES_FILE))?;

    info!(
        dir = %dir.display(),
        ratings = ratings.len(),
        movies = movies.len(),
        "Loaded MovieLens dataset"
    );

    Dataset::new(ratings, movies)
}

pub fn load_ratings(path: impl AsRef<Path>) -> Result<Vec<Rating>> {
    load_ratings_from_reader(File::open(path)?)
}

pub fn load_movies(path: impl AsRef<Path>) -> Result<Vec<Movie>> {
    load_movies_from_reader(File::open(path)?)
}

/// Parse `user_id \t movie_id \t rating \t timestamp` rows
pub fn load_ratings_from_reader<R: Read>(reader: R) -> Result<Vec<Rating>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .from_reader(reader);

    let mut ratings = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let line = line_of(&record);
        if record.len() != 4 {
            return Err(RecommenderError::DataLoad(format!(
                "ratings line {}: expected 4 fields, found {}",
                line,
                record.len()
            )));
        }

        ratings.push(Rating {
            user_id: parse_field(&record, 0, "user_id", line)?,
            movie_id: parse_field(&record, 1, "movie_id", line)?,
            rating: parse_field(&record, 2, "rating", line)?,
            timestamp: parse_field(&record, 3, "timestamp", line)?,
        });
    }

    Ok(ratings)
}

/// Parse `movie_id | title | release_date | video_release_date | url | 19 genre flags` rows
pub fn load_movies_from_reader<R: Read>(reader: R) -> Result<Vec<Movie>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .from_reader(reader);

    let expected = MOVIE_FIXED_COLUMNS + Genre::ALL.len();
    let mut movies = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let line = line_of(&record);
        if record.len() != expected {
            return Err(RecommenderError::DataLoad(format!(
                "movies line {}: expected {} fields, found {}",
                line,
                expected,
                record.len()
            )));
        }

        let genres = Genre::ALL
            .into_iter()
            .enumerate()
            .filter(|(offset, _)| latin1(&record[MOVIE_FIXED_COLUMNS + offset]).trim() == "1")
            .map(|(_, genre)| genre);

        let mut movie = Movie::new(
            parse_field(&record, 0, "movie_id", line)?,
            latin1(&record[1]),
        )
        .with_genres(genres);
        movie.release_date = parse_release_date(&latin1(&record[2]));

        movies.push(movie);
    }

    Ok(movies)
}

/// Unparsable or missing dates become `None`
fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, RELEASE_DATE_FORMAT).ok()
}

fn parse_field<T>(record: &ByteRecord, index: usize, name: &str, line: u64) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = latin1(&record[index]);
    raw.trim().parse::<T>().map_err(|e| {
        RecommenderError::DataLoad(format!(
            "line {}: invalid {} '{}': {}",
            line, name, raw, e
        ))
    })
}

/// Latin-1 maps each byte to the code point of the same value
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn line_of(record: &ByteRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
