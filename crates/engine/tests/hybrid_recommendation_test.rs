//! End-to-end properties of the hybrid recommender on small in-memory datasets

use reelgraph_core::{Dataset, EngineConfig, Genre, Movie, Rating, RecommenderError};
use reelgraph_engine::{RecommendationEngine, RecommendationSource, SeedId};
use std::collections::HashSet;

fn rating(user_id: u32, movie_id: u32, rating: u8) -> Rating {
    Rating {
        user_id,
        movie_id,
        rating,
        timestamp: 874_965_758,
    }
}

fn movies() -> Vec<Movie> {
    vec![
        Movie::new(1, "Toy Story (1995)").with_genres([
            Genre::Animation,
            Genre::Childrens,
            Genre::Comedy,
        ]),
        Movie::new(2, "GoldenEye (1995)").with_genres([
            Genre::Action,
            Genre::Adventure,
            Genre::Thriller,
        ]),
        Movie::new(3, "Four Rooms (1995)").with_genres([Genre::Thriller]),
        Movie::new(4, "Get Shorty (1995)").with_genres([
            Genre::Action,
            Genre::Comedy,
            Genre::Drama,
        ]),
        Movie::new(5, "Copycat (1995)").with_genres([Genre::Crime, Genre::Drama, Genre::Thriller]),
        Movie::new(6, "Babe (1995)").with_genres([Genre::Childrens, Genre::Comedy, Genre::Drama]),
        Movie::new(7, "Dead Man Walking (1995)").with_genres([Genre::Drama]),
        Movie::new(8, "Richard III (1995)").with_genres([Genre::Drama, Genre::War]),
    ]
}

fn dataset() -> Dataset {
    let ratings = vec![
        rating(1, 1, 5),
        rating(1, 4, 4),
        rating(1, 6, 5),
        rating(2, 1, 4),
        rating(2, 6, 4),
        rating(2, 7, 2),
        rating(3, 2, 5),
        rating(3, 3, 4),
        rating(3, 5, 4),
        rating(4, 2, 4),
        rating(4, 5, 5),
        rating(4, 8, 3),
        rating(5, 7, 5),
        rating(5, 8, 4),
        rating(5, 4, 2),
        rating(6, 3, 3),
        rating(6, 7, 4),
        rating(6, 1, 1),
    ];
    Dataset::new(ratings, movies()).unwrap()
}

fn config(latent_factors: usize) -> EngineConfig {
    EngineConfig {
        latent_factors,
        ..Default::default()
    }
}

fn engine() -> RecommendationEngine {
    RecommendationEngine::build(dataset(), &config(3)).unwrap()
}

#[test]
fn test_hybrid_titles_exist_in_metadata() {
    let engine = engine();
    let known: HashSet<String> = engine
        .dataset()
        .movies()
        .iter()
        .map(|m| m.title.clone())
        .collect();

    for movie_id in 1..=8 {
        let titles = engine.get_hybrid_recommendations(SeedId::new(movie_id), 10);
        assert!(!titles.is_empty(), "seed {} had no recommendations", movie_id);
        for title in titles {
            assert!(known.contains(&title), "unknown title {}", title);
        }
    }
}

#[test]
fn test_hybrid_never_contains_seed_title() {
    let engine = engine();

    for movie in engine.dataset().movies() {
        let titles = engine.get_hybrid_recommendations(SeedId::from(movie.movie_id), 10);
        assert!(!titles.contains(&movie.title));
    }
}

#[test]
fn test_hybrid_size_is_bounded_and_distinct() {
    let engine = engine();

    for top_n in [1, 2, 3, 10] {
        for movie_id in 1..=8 {
            let titles = engine.get_hybrid_recommendations(SeedId::new(movie_id), top_n);
            let distinct: HashSet<&String> = titles.iter().collect();

            assert!(titles.len() <= 2 * top_n);
            assert_eq!(distinct.len(), titles.len());
        }
    }
}

#[test]
fn test_unknown_seed_returns_empty() {
    let engine = engine();

    assert!(engine
        .get_hybrid_recommendations(SeedId::new(999_999_999), 10)
        .is_empty());
    assert!(engine.get_hybrid_recommendations(SeedId::new(-5), 10).is_empty());
    assert!(engine
        .get_collaborative_recommendations(999_999_999, 10)
        .is_empty());
}

#[test]
fn test_string_seed_matches_integer_seed() {
    let engine = engine();

    let from_str: SeedId = "4".parse().unwrap();
    assert_eq!(
        engine.get_hybrid_recommendations(from_str, 5),
        engine.get_hybrid_recommendations(SeedId::new(4), 5)
    );
    assert!(matches!(
        "four".parse::<SeedId>(),
        Err(RecommenderError::ValidationError(_))
    ));
}

#[test]
fn test_collaborative_is_deterministic() {
    let first = engine();
    let second = engine();

    for movie_id in 1..=8 {
        let a = first.get_collaborative_recommendations(movie_id, 5);
        assert_eq!(a, first.get_collaborative_recommendations(movie_id, 5));
        assert_eq!(a, second.get_collaborative_recommendations(movie_id, 5));
    }
}

#[test]
fn test_collaborative_excludes_seed_and_respects_top_n() {
    let engine = engine();

    let titles = engine.get_collaborative_recommendations(1, 3);
    assert_eq!(titles.len(), 3);
    assert!(!titles.contains(&"Toy Story (1995)".to_string()));
}

#[test]
fn test_graph_links_movies_sharing_a_genre() {
    let engine = engine();

    let from_toy_story = engine.get_graph_based_recommendations("Toy Story (1995)", 10);
    assert!(from_toy_story.contains(&"Babe (1995)".to_string()));
    assert!(!from_toy_story.contains(&"Four Rooms (1995)".to_string()));

    let from_babe = engine.get_graph_based_recommendations("Babe (1995)", 10);
    assert!(from_babe.contains(&"Toy Story (1995)".to_string()));

    assert!(engine
        .get_graph_based_recommendations("Not A Movie (2001)", 10)
        .is_empty());
}

#[test]
fn test_toy_dataset_graph_scenario() {
    // Three users, four movies; A and B are both comedies and share no raters
    let ratings = vec![
        rating(1, 1, 5),
        rating(2, 2, 4),
        rating(3, 3, 3),
        rating(3, 4, 5),
    ];
    let movies = vec![
        Movie::new(1, "A").with_genres([Genre::Comedy]),
        Movie::new(2, "B").with_genres([Genre::Comedy, Genre::Romance]),
        Movie::new(3, "C").with_genres([Genre::Horror]),
        Movie::new(4, "D").with_genres([Genre::Documentary]),
    ];
    let dataset = Dataset::new(ratings, movies).unwrap();
    let engine = RecommendationEngine::build(dataset, &config(2)).unwrap();

    let titles = engine.get_graph_based_recommendations("A", 10);
    assert!(titles.contains(&"B".to_string()));
    assert!(!titles.contains(&"C".to_string()));

    let hybrid = engine.get_hybrid_recommendations(SeedId::new(1), 10);
    assert!(hybrid.contains(&"B".to_string()));
    assert!(!hybrid.contains(&"A".to_string()));
}

#[test]
fn test_ranked_view_covers_the_same_titles() {
    let engine = engine();

    for movie_id in 1..=8 {
        let hybrid = engine.hybrid_recommendations(SeedId::new(movie_id), 4);

        let set: HashSet<&str> = hybrid.titles().iter().map(String::as_str).collect();
        let ranked: HashSet<&str> = hybrid.ranked().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(set, ranked);

        for pair in hybrid.ranked().windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for entry in hybrid.ranked() {
            match entry.source {
                RecommendationSource::Collaborative => assert!(entry.graph_rank.is_none()),
                RecommendationSource::Graph => assert!(entry.collaborative_rank.is_none()),
                RecommendationSource::Both => {
                    assert!(entry.graph_rank.is_some() && entry.collaborative_rank.is_some())
                }
            }
        }
    }
}

#[test]
fn test_latent_factor_count_is_validated_not_clamped() {
    // 6 users x 8 movies allows at most 5 factors
    assert!(RecommendationEngine::build(dataset(), &config(5)).is_ok());

    for k in [0, 6, 20] {
        match RecommendationEngine::build(dataset(), &config(k)) {
            Err(RecommenderError::ConfigurationError { key, .. }) => {
                assert_eq!(key.as_deref(), Some("REELGRAPH_LATENT_FACTORS"));
            }
            other => panic!("Expected ConfigurationError for k={}, got {:?}", k, other.map(|_| ())),
        }
    }
}
