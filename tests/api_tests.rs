use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;

use rateyourwatch_api::db::MemoryStore;
use rateyourwatch_api::error::AppResult;
use rateyourwatch_api::models::{CatalogItem, MediaType};
use rateyourwatch_api::services::CatalogProvider;
use rateyourwatch_api::{create_router, AppState};

/// Catalog stub with canned search and related-items responses
#[derive(Clone, Default)]
struct StubCatalog {
    search: HashMap<String, Vec<CatalogItem>>,
    related: HashMap<(MediaType, u64), Vec<CatalogItem>>,
}

impl StubCatalog {
    fn with_search(mut self, query: &str, items: Vec<CatalogItem>) -> Self {
        self.search.insert(query.to_string(), items);
        self
    }

    fn with_related(
        mut self,
        media_type: MediaType,
        external_id: u64,
        items: Vec<CatalogItem>,
    ) -> Self {
        self.related.insert((media_type, external_id), items);
        self
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        Ok(self.search.get(query).cloned().unwrap_or_default())
    }

    async fn related(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> AppResult<Vec<CatalogItem>> {
        Ok(self
            .related
            .get(&(media_type, external_id))
            .cloned()
            .unwrap_or_default())
    }
}

fn item(id: u64, title: &str, media_type: MediaType, popularity: f64) -> CatalogItem {
    CatalogItem {
        external_id: id,
        title: title.to_string(),
        media_type,
        popularity,
        poster_url: None,
    }
}

fn create_test_server(catalog: StubCatalog) -> TestServer {
    let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(catalog));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn auth(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

async fn sign_up(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "username": username, "password": "hunter2" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

async fn save_rating(server: &TestServer, token: &str, title: &str, score: f64) {
    let (name, value) = auth(token);
    let response = server
        .post("/api/v1/ratings")
        .add_header(name, value)
        .json(&json!({
            "title": title,
            "media_type": "Movie",
            "score": score,
            "comment": ""
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(StubCatalog::default());
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_duplicate_conflict() {
    let server = create_test_server(StubCatalog::default());
    sign_up(&server, "alice").await;

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_blank_fields_rejected() {
    let server = create_test_server(StubCatalog::default());

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "  ", "password": "hunter2" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_logout() {
    let server = create_test_server(StubCatalog::default());
    sign_up(&server, "alice").await;

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "alice", "password": "hunter2" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let token = body["token"].as_str().unwrap().to_string();

    let (name, value) = auth(&token);
    let response = server
        .post("/api/v1/auth/logout")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    // Revoked token no longer works
    let (name, value) = auth(&token);
    let response = server.get("/api/v1/ratings").add_header(name, value).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ratings_require_sign_in() {
    let server = create_test_server(StubCatalog::default());

    let response = server
        .post("/api/v1/ratings")
        .json(&json!({ "title": "Inception", "media_type": "Movie", "score": 4.5 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rating_crud_flow() {
    let server = create_test_server(StubCatalog::default());
    let token = sign_up(&server, "alice").await;

    save_rating(&server, &token, "Inception", 4.5).await;

    let (name, value) = auth(&token);
    let response = server.get("/api/v1/ratings").add_header(name, value).await;
    response.assert_status_ok();
    let ratings: Vec<serde_json::Value> = response.json();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["title"], "Inception");
    let id = ratings[0]["id"].as_str().unwrap().to_string();

    // Edit the comment
    let (name, value) = auth(&token);
    let response = server
        .patch(&format!("/api/v1/ratings/{}", id))
        .add_header(name, value)
        .json(&json!({ "comment": "Rewatched, still great" }))
        .await;
    response.assert_status_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["comment"], "Rewatched, still great");

    // Delete
    let (name, value) = auth(&token);
    let response = server
        .delete(&format!("/api/v1/ratings/{}", id))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let (name, value) = auth(&token);
    let response = server.get("/api/v1/ratings").add_header(name, value).await;
    let ratings: Vec<serde_json::Value> = response.json();
    assert!(ratings.is_empty());
}

#[tokio::test]
async fn test_rating_score_validation() {
    let server = create_test_server(StubCatalog::default());
    let token = sign_up(&server, "alice").await;

    let (name, value) = auth(&token);
    let response = server
        .post("/api/v1/ratings")
        .add_header(name, value)
        .json(&json!({ "title": "Inception", "media_type": "Movie", "score": 5.5 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_foreign_rating_invisible() {
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;
    let bob = sign_up(&server, "bob").await;

    save_rating(&server, &alice, "Inception", 4.5).await;

    let (name, value) = auth(&alice);
    let response = server.get("/api/v1/ratings").add_header(name, value).await;
    let ratings: Vec<serde_json::Value> = response.json();
    let id = ratings[0]["id"].as_str().unwrap().to_string();

    // Bob cannot edit or delete Alice's rating
    let (name, value) = auth(&bob);
    let response = server
        .patch(&format!("/api/v1/ratings/{}", id))
        .add_header(name, value)
        .json(&json!({ "comment": "hijacked" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let (name, value) = auth(&bob);
    let response = server
        .delete(&format!("/api/v1/ratings/{}", id))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_community_excludes_own_ratings() {
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;
    let bob = sign_up(&server, "bob").await;

    save_rating(&server, &alice, "Inception", 4.5).await;
    save_rating(&server, &bob, "Interstellar", 4.0).await;

    let (name, value) = auth(&alice);
    let response = server
        .get("/api/v1/ratings/community")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let ratings: Vec<serde_json::Value> = response.json();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["owner"], "bob");
}

#[tokio::test]
async fn test_friend_invite_flow() {
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;
    let bob = sign_up(&server, "bob").await;

    let (name, value) = auth(&alice);
    let response = server
        .post("/api/v1/friends/invites")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::CREATED);
    let invite: serde_json::Value = response.json();
    let code = invite["code"].as_str().unwrap().to_string();

    let (name, value) = auth(&bob);
    let response = server
        .post("/api/v1/friends/accept")
        .add_header(name, value)
        .json(&json!({ "code": code }))
        .await;
    response.assert_status_ok();
    let link: serde_json::Value = response.json();
    assert_eq!(link["friend"], "alice");

    // Both sides see the edge
    let (name, value) = auth(&alice);
    let response = server.get("/api/v1/friends").add_header(name, value).await;
    let friends: Vec<String> = response.json();
    assert_eq!(friends, vec!["bob"]);

    let (name, value) = auth(&bob);
    let response = server.get("/api/v1/friends").add_header(name, value).await;
    let friends: Vec<String> = response.json();
    assert_eq!(friends, vec!["alice"]);

    // Codes are single use
    let (name, value) = auth(&bob);
    let response = server
        .post("/api/v1/friends/accept")
        .add_header(name, value)
        .json(&json!({ "code": code }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_accept_own_invite_rejected() {
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;

    let (name, value) = auth(&alice);
    let response = server
        .post("/api/v1/friends/invites")
        .add_header(name, value)
        .await;
    let invite: serde_json::Value = response.json();
    let code = invite["code"].as_str().unwrap().to_string();

    let (name, value) = auth(&alice);
    let response = server
        .post("/api/v1/friends/accept")
        .add_header(name, value)
        .json(&json!({ "code": code }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_library_access_control() {
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;
    let bob = sign_up(&server, "bob").await;
    let carol = sign_up(&server, "carol").await;

    save_rating(&server, &alice, "Inception", 4.5).await;

    // Connect alice and bob
    let (name, value) = auth(&alice);
    let invite: serde_json::Value = server
        .post("/api/v1/friends/invites")
        .add_header(name, value)
        .await
        .json();
    let (name, value) = auth(&bob);
    server
        .post("/api/v1/friends/accept")
        .add_header(name, value)
        .json(&json!({ "code": invite["code"].as_str().unwrap() }))
        .await
        .assert_status_ok();

    // Bob can browse Alice's library
    let (name, value) = auth(&bob);
    let response = server
        .get("/api/v1/library?user=alice")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let library: serde_json::Value = response.json();
    assert_eq!(library["owner"], "alice");
    assert_eq!(library["count"], 1);

    // Carol cannot
    let (name, value) = auth(&carol);
    let response = server
        .get("/api/v1/library?user=alice")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_library_filters_and_sort() {
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;

    save_rating(&server, &alice, "Alien", 5.0).await;
    save_rating(&server, &alice, "Zodiac", 3.0).await;
    save_rating(&server, &alice, "Memento", 4.0).await;

    let (name, value) = auth(&alice);
    let response = server
        .get("/api/v1/library?min_score=3.5&sort=title")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let library: serde_json::Value = response.json();
    assert_eq!(library["count"], 2);
    assert_eq!(library["items"][0]["title"], "Alien");
    assert_eq!(library["items"][1]["title"], "Memento");
}

#[tokio::test]
async fn test_catalog_search_endpoint() {
    let catalog = StubCatalog::default().with_search(
        "incep",
        vec![item(27205, "Inception", MediaType::Movie, 83.5)],
    );
    let server = create_test_server(catalog);

    let response = server.get("/api/v1/catalog/search?q=incep").await;
    response.assert_status_ok();
    let items: Vec<serde_json::Value> = response.json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Inception");
    assert_eq!(items[0]["media_type"], "Movie");
}

#[tokio::test]
async fn test_recommendations_require_sign_in() {
    let server = create_test_server(StubCatalog::default());
    let response = server.get("/api/v1/recommendations").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recommendations_need_more_ratings() {
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;

    save_rating(&server, &alice, "Meh Movie", 2.0).await;

    let (name, value) = auth(&alice);
    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "need_more_ratings");
    assert!(body["candidates"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_recommendations_could_not_map() {
    // Stub returns no search results, so no seed resolves
    let server = create_test_server(StubCatalog::default());
    let alice = sign_up(&server, "alice").await;

    save_rating(&server, &alice, "Completely Unknown", 5.0).await;

    let (name, value) = auth(&alice);
    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "could_not_map_titles");
}

#[tokio::test]
async fn test_recommendations_success_with_friend_seed() {
    let catalog = StubCatalog::default()
        .with_search(
            "Inception",
            vec![item(27205, "Inception", MediaType::Movie, 83.5)],
        )
        .with_related(
            MediaType::Movie,
            27205,
            vec![
                item(603, "The Matrix", MediaType::Movie, 200.0),
                // Already rated by the friend: must be excluded
                item(157336, "Interstellar", MediaType::Movie, 500.0),
            ],
        );
    let server = create_test_server(catalog);
    let alice = sign_up(&server, "alice").await;
    let bob = sign_up(&server, "bob").await;

    // Alice's own high rating seeds; Bob's rating only excludes
    save_rating(&server, &alice, "Inception", 5.0).await;
    save_rating(&server, &bob, "Interstellar", 3.0).await;

    // Connect them so Bob's ratings join the exclusion set
    let (name, value) = auth(&alice);
    let invite: serde_json::Value = server
        .post("/api/v1/friends/invites")
        .add_header(name, value)
        .await
        .json();
    let (name, value) = auth(&bob);
    server
        .post("/api/v1/friends/accept")
        .add_header(name, value)
        .json(&json!({ "code": invite["code"].as_str().unwrap() }))
        .await
        .assert_status_ok();

    let (name, value) = auth(&alice);
    let response = server
        .get("/api/v1/recommendations")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["status"], "updated");
    assert_eq!(body["message"], "Recommendations updated.");

    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["title"], "The Matrix");
    // weight 5.0 at rank 0 with popularity 200: 5.0 * 1 + 0.2
    assert_eq!(candidates[0]["score"], "5.20");
    assert_eq!(candidates[0]["why"], "Because you liked Inception");
}
