//! Hybrid recommendation merging
//!
//! Combines collaborative and genre-graph candidates for one seed movie. The
//! merge keeps both a deduplicated title set and a ranked view that blends the
//! per-source scores.

use reelgraph_core::{MovieId, RecommenderError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::collaborative::ScoredMovie;
use crate::graph::GraphCandidate;

const COLLABORATIVE_WEIGHT: f64 = 0.6;
const GRAPH_WEIGHT: f64 = 0.4;

/// A seed movie id as supplied by a caller, validated to be an integer.
///
/// Accepts integers, integral floats (`7.0`) and numeric strings (`"7"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SeedId(i64);

impl SeedId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// The id as a movie id, if it is in range for one
    pub fn movie_id(self) -> Option<MovieId> {
        MovieId::try_from(self.0).ok()
    }
}

impl From<MovieId> for SeedId {
    fn from(id: MovieId) -> Self {
        Self(i64::from(id))
    }
}

impl fmt::Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeedId {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim().parse::<i64>().map(Self).map_err(|_| {
            RecommenderError::ValidationError(format!("movie_id '{}' is not an integer", s))
        })
    }
}

impl TryFrom<&serde_json::Value> for SeedId {
    type Error = RecommenderError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(id) = n.as_i64() {
                    return Ok(Self(id));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                        Ok(Self(f as i64))
                    }
                    _ => Err(RecommenderError::ValidationError(format!(
                        "movie_id {} is not an integer",
                        n
                    ))),
                }
            }
            serde_json::Value::String(s) => s.parse(),
            other => Err(RecommenderError::ValidationError(format!(
                "movie_id must be an integer, got {}",
                other
            ))),
        }
    }
}

/// Which recommenders proposed a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Collaborative,
    Graph,
    Both,
}

/// One title in the ranked hybrid view.
///
/// Ranks are 1-based positions within each source's own list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecommendation {
    pub title: String,
    pub source: RecommendationSource,
    pub collaborative_rank: Option<usize>,
    pub collaborative_score: Option<f64>,
    pub graph_rank: Option<usize>,
    pub genre_overlap: Option<f64>,
    pub score: f64,
}

/// Merged output for one seed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HybridRecommendations {
    titles: Vec<String>,
    ranked: Vec<RankedRecommendation>,
}

impl HybridRecommendations {
    /// Merge both candidate lists, dropping `seed_title` and duplicate titles
    pub fn merge(
        seed_title: &str,
        collaborative: &[ScoredMovie],
        graph: &[GraphCandidate],
    ) -> Self {
        let mut titles: Vec<String> = Vec::new();
        let mut entries: HashMap<String, RankedRecommendation> = HashMap::new();

        for (rank, candidate) in collaborative.iter().enumerate() {
            if candidate.title == seed_title || entries.contains_key(&candidate.title) {
                continue;
            }
            titles.push(candidate.title.clone());
            entries.insert(
                candidate.title.clone(),
                RankedRecommendation {
                    title: candidate.title.clone(),
                    source: RecommendationSource::Collaborative,
                    collaborative_rank: Some(rank + 1),
                    collaborative_score: Some(candidate.score),
                    graph_rank: None,
                    genre_overlap: None,
                    score: 0.0,
                },
            );
        }

        for (rank, candidate) in graph.iter().enumerate() {
            if candidate.title == seed_title {
                continue;
            }
            match entries.get_mut(&candidate.title) {
                Some(entry) => {
                    if entry.graph_rank.is_none() {
                        entry.source = RecommendationSource::Both;
                        entry.graph_rank = Some(rank + 1);
                        entry.genre_overlap = Some(candidate.genre_overlap);
                    }
                }
                None => {
                    titles.push(candidate.title.clone());
                    entries.insert(
                        candidate.title.clone(),
                        RankedRecommendation {
                            title: candidate.title.clone(),
                            source: RecommendationSource::Graph,
                            collaborative_rank: None,
                            collaborative_score: None,
                            graph_rank: Some(rank + 1),
                            genre_overlap: Some(candidate.genre_overlap),
                            score: 0.0,
                        },
                    );
                }
            }
        }

        let mut ranked: Vec<RankedRecommendation> = entries
            .into_values()
            .map(|mut entry| {
                entry.score = blended_score(entry.collaborative_score, entry.genre_overlap);
                entry
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });

        Self { titles, ranked }
    }

    /// Distinct titles, collaborative results first, then graph results
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn into_titles(self) -> Vec<String> {
        self.titles
    }

    /// Entries ordered by blended score, ties broken by title
    pub fn ranked(&self) -> &[RankedRecommendation] {
        &self.ranked
    }

    pub fn into_ranked(self) -> Vec<RankedRecommendation> {
        self.ranked
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Negative similarities count as no collaborative evidence
fn blended_score(similarity: Option<f64>, genre_overlap: Option<f64>) -> f64 {
    COLLABORATIVE_WEIGHT * similarity.unwrap_or(0.0).max(0.0)
        + GRAPH_WEIGHT * genre_overlap.unwrap_or(0.0)
}
