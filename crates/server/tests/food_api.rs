use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use service::food::{
    domain::Role,
    repository::{mock::MockCatalogRepository, CatalogRepository},
    service::{CatalogConfig, FoodCatalogService},
};
use service::image::{mock::MockImageStore, ImageStore};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, auth};

const SECRET: &str = "test-secret";
const BOUNDARY: &str = "food-test-boundary";

struct TestApp {
    app: Router,
    repo: Arc<MockCatalogRepository>,
    images: Arc<MockImageStore>,
    uploads: PathBuf,
}

fn test_app() -> TestApp {
    let repo = Arc::new(MockCatalogRepository::default());
    let images = Arc::new(MockImageStore::default());
    let repo_dyn: Arc<dyn CatalogRepository> = repo.clone();
    let images_dyn: Arc<dyn ImageStore> = images.clone();
    let catalog = Arc::new(FoodCatalogService::new(repo_dyn, images_dyn, CatalogConfig::default()));

    let uploads = std::env::temp_dir().join(format!("food_api_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&uploads).unwrap();

    let state = auth::ServerState {
        catalog,
        auth: auth::ServerAuthConfig { jwt_secret: SECRET.into() },
        uploads: auth::UploadSettings { dir: uploads.clone(), max_bytes: 1024 * 1024 },
    };
    let app = routes::build_router(state, CorsLayer::very_permissive());
    TestApp { app, repo, images, uploads }
}

fn token_for(id: Uuid) -> String {
    let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
    let claims = auth::Claims { id: id.to_string(), exp };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn food_form(with_image: bool) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [("name", "Greek salad"), ("description", "Feta and olives"), ("price", "12"), ("category", "Salad")] {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if with_image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"salad.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"\x89PNG fake image bytes");
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn add_request(token: Option<&str>, with_image: bool) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/api/food/add")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(t) = token {
        req = req.header("token", t);
    }
    req.body(Body::from(food_form(with_image))).unwrap()
}

fn remove_request(token: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/food/remove")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn uploads_left(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn health_is_open() {
    let t = test_app();
    let (status, body) = send(&t.app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn admin_adds_food_and_temp_file_is_removed() {
    let t = test_app();
    let admin = t.repo.add_user(Role::Admin);

    let (status, body) = send(&t.app, add_request(Some(&token_for(admin)), true)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Food Added");
    assert_eq!(body["data"]["name"], "Greek salad");
    assert_eq!(body["data"]["price"], 12.0);
    assert_eq!(body["data"]["image"]["public_id"], "food-items/mock-1");

    let (uploaded_path, _) = t.images.last_upload().unwrap();
    assert!(uploaded_path.starts_with(&t.uploads));
    assert!(uploaded_path.to_string_lossy().ends_with("_salad.png"));
    assert_eq!(uploads_left(&t.uploads), 0);
    assert_eq!(t.repo.food_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_same_name_adds_do_not_share_temp_files() {
    let t = test_app();
    let admin = t.repo.add_user(Role::Admin);
    let token = token_for(admin);

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let app = t.app.clone();
            let req = add_request(Some(&token), true);
            tokio::spawn(async move { send(&app, req).await.0 })
        })
        .collect();
    for h in handles {
        assert_eq!(h.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(t.images.uploads(), 32);
    assert_eq!(t.repo.food_count(), 32);
    assert_eq!(uploads_left(&t.uploads), 0);
}

#[tokio::test]
async fn non_admin_add_is_forbidden_without_side_effects() {
    let t = test_app();
    let user = t.repo.add_user(Role::User);

    let (status, body) = send(&t.app, add_request(Some(&token_for(user)), true)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"success": false, "message": "You are not admin"}));
    assert_eq!(t.images.uploads(), 0);
    assert_eq!(t.repo.inserts(), 0);
    assert_eq!(uploads_left(&t.uploads), 0);
}

#[tokio::test]
async fn add_without_image_is_bad_request() {
    let t = test_app();
    let admin = t.repo.add_user(Role::Admin);

    let (status, body) = send(&t.app, add_request(Some(&token_for(admin)), false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image file is required");
    assert_eq!(t.images.uploads(), 0);
}

#[tokio::test]
async fn upload_failure_is_generic_internal_error() {
    let t = test_app();
    let admin = t.repo.add_user(Role::Admin);
    t.images.fail_upload.store(true, Ordering::SeqCst);

    let (status, body) = send(&t.app, add_request(Some(&token_for(admin)), true)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "message": "Internal server error."}));
    assert_eq!(t.repo.inserts(), 0);
    assert_eq!(uploads_left(&t.uploads), 0);
}

#[tokio::test]
async fn missing_and_invalid_tokens_are_unauthorized() {
    let t = test_app();

    let (status, body) = send(&t.app, add_request(None, true)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not Authorized Login Again");

    let (status, body) = send(&t.app, add_request(Some("not-a-jwt"), true)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
    assert_eq!(t.images.uploads(), 0);
}

#[tokio::test]
async fn list_is_open_and_returns_every_item() {
    let t = test_app();
    let a = t.repo.seed_food("Rolls", "food-items/rolls");
    let b = t.repo.seed_food("Cake", "food-items/cake");

    let (status, body) = send(&t.app, Request::get("/api/food/list").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("message").is_none());
    let ids: Vec<&str> = body["data"].as_array().unwrap().iter().map(|f| f["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![a.id.to_string(), b.id.to_string()]);
}

#[tokio::test]
async fn remove_then_remove_again_is_not_found() {
    let t = test_app();
    let admin = t.repo.add_user(Role::Admin);
    let item = t.repo.seed_food("Pasta", "food-items/pasta");
    let token = token_for(admin);
    let body = json!({"id": item.id}).to_string();

    let (status, resp) = send(&t.app, remove_request(&token, body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({"success": true, "message": "Food Removed"}));
    assert_eq!(t.images.destroyed_ids(), vec!["food-items/pasta".to_string()]);

    let (status, resp) = send(&t.app, remove_request(&token, body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["success"], false);
}

#[tokio::test]
async fn remove_succeeds_when_image_destroy_fails() {
    let t = test_app();
    let admin = t.repo.add_user(Role::Admin);
    let item = t.repo.seed_food("Cake", "food-items/cake");
    t.images.fail_destroy.store(true, Ordering::SeqCst);

    let (status, _) = send(&t.app, remove_request(&token_for(admin), json!({"id": item.id}).to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.repo.deletes(), 1);
    assert_eq!(t.repo.food_count(), 0);
}

#[tokio::test]
async fn remove_with_malformed_body_is_bad_request() {
    let t = test_app();
    let admin = t.repo.add_user(Role::Admin);

    let (status, body) = send(&t.app, remove_request(&token_for(admin), r#"{"id": "nope"}"#.into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(t.repo.deletes(), 0);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let t = test_app();
    let (status, body) = send(&t.app, Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/food/add").is_some());
}
