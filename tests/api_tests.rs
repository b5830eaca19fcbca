use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{HeaderName, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use axum_test::TestServer;
use serde_json::{json, Value};

use reel_match::{
    db::Cache,
    models::{Movie, RecommendationResult},
    routes::{create_router, AppState},
    services::{
        providers::TmdbProvider, CatalogIndex, EnricherSettings, MetadataEnricher, Recommender,
        SimilarityMatrix,
    },
};

/// TMDB lookalike: even ids have full metadata, odd ids are 404s with no videos
async fn spawn_fake_tmdb() -> String {
    async fn details(Path(id): Path<u64>) -> (StatusCode, Json<Value>) {
        if id % 2 == 0 {
            (
                StatusCode::OK,
                Json(json!({"id": id, "poster_path": format!("/{}.jpg", id), "overview": format!("Overview {}", id)})),
            )
        } else {
            (StatusCode::NOT_FOUND, Json(json!({"status_code": 34})))
        }
    }

    async fn videos(Path(id): Path<u64>) -> Json<Value> {
        if id % 2 == 0 {
            Json(json!({"id": id, "results": [{"key": format!("trailer{}", id)}]}))
        } else {
            Json(json!({"id": id, "results": []}))
        }
    }

    let app = Router::new()
        .route("/3/movie/:id", get(details))
        .route("/3/movie/:id/videos", get(videos));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/3", addr)
}

fn create_test_catalog() -> CatalogIndex {
    let titles = ["Avatar", "Aliens", "Titanic", "Terminator", "Abyss", "Rambo", "Heat"];
    let movies = titles
        .iter()
        .enumerate()
        .map(|(i, t)| Movie::new(10 + i as u64, *t, i))
        .collect();
    let rows = vec![
        vec![1.0, 0.9, 0.5, 0.7, 0.7, 0.1, 0.2],
        vec![0.9, 1.0, 0.1, 0.8, 0.6, 0.3, 0.2],
        vec![0.5, 0.1, 1.0, 0.0, 0.4, 0.0, 0.1],
        vec![0.7, 0.8, 0.0, 1.0, 0.3, 0.6, 0.5],
        vec![0.7, 0.6, 0.4, 0.3, 1.0, 0.0, 0.0],
        vec![0.1, 0.3, 0.0, 0.6, 0.0, 1.0, 0.4],
        vec![0.2, 0.2, 0.1, 0.5, 0.0, 0.4, 1.0],
    ];
    CatalogIndex::new(movies, SimilarityMatrix::new(rows).unwrap()).unwrap()
}

fn create_test_server(api_url: String) -> TestServer {
    let provider = TmdbProvider::new(
        "test_key".to_string(),
        api_url,
        "en-US".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    let settings = EnricherSettings {
        poster_retry_backoff: Duration::from_millis(1),
        ..EnricherSettings::default()
    };
    let enricher = MetadataEnricher::new(Arc::new(provider), Cache::in_memory(), settings);
    let recommender = Recommender::new(create_test_catalog(), enricher);

    TestServer::new(create_router(AppState::new(recommender))).unwrap()
}

fn unreachable_api_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/3", addr)
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(spawn_fake_tmdb().await);
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_recommendations_enriched_end_to_end() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Avatar")
        .await;

    response.assert_status_ok();
    let result: RecommendationResult = response.json();

    assert_eq!(
        result.titles,
        vec!["Aliens", "Terminator", "Abyss", "Titanic", "Heat"]
    );

    // Abyss (id 14) has full metadata
    assert_eq!(result.posters[2], "https://image.tmdb.org/t/p/w500/14.jpg");
    assert_eq!(result.descriptions[2], "Overview 14");
    assert_eq!(
        result.trailers[2],
        Some("https://www.youtube.com/watch?v=trailer14".to_string())
    );

    // Aliens (id 11) is a 404 with no videos
    assert_eq!(
        result.posters[0],
        "https://via.placeholder.com/500x750?text=No+Image+Available"
    );
    assert_eq!(result.descriptions[0], "Description not available");
    assert_eq!(result.trailers[0], None);
}

#[tokio::test]
async fn test_recommendations_unknown_title_is_empty() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "UnknownTitle")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "titles": [],
        "posters": [],
        "descriptions": [],
        "trailers": []
    }));
}

#[tokio::test]
async fn test_recommendations_blank_title_rejected() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "  ")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_missing_title_rejected() {
    let server = create_test_server(spawn_fake_tmdb().await);
    let response = server.get("/api/v1/recommendations").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_survive_unreachable_api() {
    let server = create_test_server(unreachable_api_url());

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Rambo")
        .await;

    response.assert_status_ok();
    let result: RecommendationResult = response.json();
    assert_eq!(result.len(), 5);
    assert!(result
        .posters
        .iter()
        .all(|p| p == "https://via.placeholder.com/500x750?text=No+Image+Available"));
    assert!(result
        .descriptions
        .iter()
        .all(|d| d == "Description not available"));
    assert!(result.trailers.iter().all(Option::is_none));
}

#[tokio::test]
async fn test_recommendations_are_idempotent() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let first: RecommendationResult = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Heat")
        .await
        .json();
    let second: RecommendationResult = server
        .get("/api/v1/recommendations")
        .add_query_param("title", "Heat")
        .await
        .json();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_list_titles() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let response = server.get("/api/v1/titles").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["count"], 7);
    assert_eq!(body["titles"][0], "Avatar");
    assert_eq!(body["titles"][6], "Heat");
    assert!(body["loaded_at"].is_string());
}

#[tokio::test]
async fn test_reload_without_files_is_bad_request() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let response = server.post("/api/v1/catalog/reload").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let response = server.get("/health").await;
    let request_id = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = create_test_server(spawn_fake_tmdb().await);

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("ui-7f3a"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "ui-7f3a");
}
