use actix_web::{test, web, App};
use reelgraph_core::{Dataset, EngineConfig, Genre, Movie, Rating};
use reelgraph_engine::server::{configure_routes, AppState};
use reelgraph_engine::RecommendationEngine;
use std::sync::Arc;

fn state() -> web::Data<AppState> {
    let ratings = [(1, 1, 5), (1, 2, 3), (2, 2, 4), (2, 3, 5), (3, 1, 2), (3, 3, 4)]
        .into_iter()
        .map(|(user_id, movie_id, rating)| Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        })
        .collect();
    let movies = vec![
        Movie::new(1, "Casablanca (1942)").with_genres([Genre::Drama, Genre::Romance, Genre::War]),
        Movie::new(2, "Notorious (1946)").with_genres([Genre::FilmNoir, Genre::Romance]),
        Movie::new(3, "Rebecca (1940)").with_genres([Genre::Romance, Genre::Thriller]),
    ];
    let dataset = Dataset::new(ratings, movies).unwrap();
    let config = EngineConfig {
        latent_factors: 1,
        ..Default::default()
    };
    let engine = RecommendationEngine::build(dataset, &config).unwrap();
    web::Data::new(AppState::new(Arc::new(engine)))
}

/// Test that all routes are registered correctly
#[actix_web::test]
async fn test_route_registration() {
    let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success(), "Health endpoint should be registered");

    for uri in ["/recommend", "/recommend/ranked", "/analytics"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(serde_json::json!({ "movie_id": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success(), "{} should be registered", uri);
    }
}

#[actix_web::test]
async fn test_recommend_requires_post() {
    let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/recommend").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_web::test]
async fn test_recommend_paginates_titles() {
    let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/recommend")
        .set_json(serde_json::json!({ "movie_id": "1", "limit": 1 }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    // Both other films share Romance with the seed
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_more"], true);
}
