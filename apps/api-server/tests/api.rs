//! End-to-end API tests over in-memory repositories and local-disk storage.

use std::path::Path;
use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::Value;
use uuid::Uuid;

use api_server::config::{AppConfig, StorageBackend, StorageConfig};
use api_server::handlers;
use api_server::state::AppState;
use quill_core::domain::{Post, User};
use quill_core::ports::{PostRepository, UserRepository};
use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use quill_infra::database::{InMemoryPostRepository, InMemoryUserRepository};
use quill_infra::storage::LocalFileStore;

const BOUNDARY: &str = "------------------------d74496d66958873e";

fn test_config(root: &Path) -> AppConfig {
    let staging_dir = root.join("staging");
    std::fs::create_dir_all(&staging_dir).unwrap();
    // The /uploads mount resolves its directory when the app is built.
    std::fs::create_dir_all(root.join("uploads")).unwrap();

    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origin: "http://localhost:3000".to_string(),
        database: None,
        storage: StorageConfig {
            backend: StorageBackend::Local,
            staging_dir,
            local_root: root.join("uploads"),
            remote: None,
        },
        jwt: test_jwt_config(),
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        issuer: "quill-test".to_string(),
        ttl_hours: None,
    }
}

fn test_state(root: &Path) -> AppState {
    let users = InMemoryUserRepository::new();
    let posts = InMemoryPostRepository::new(&users);

    AppState {
        users: Arc::new(users),
        posts: Arc::new(posts),
        files: Arc::new(LocalFileStore::new(root.join("uploads"))),
        tokens: Arc::new(JwtTokenService::new(test_jwt_config())),
        passwords: Arc::new(Argon2PasswordService::new()),
    }
}

macro_rules! spawn_app {
    ($dir:expr) => {{
        let config = test_config($dir.path());
        let state = web::Data::new(test_state($dir.path()));
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(|cfg| handlers::configure_routes(cfg, &config)),
        )
        .await;
        (app, state)
    }};
}

macro_rules! login_session {
    ($app:expr, $username:expr) => {{
        let resp =
            test::call_service(&$app, register_req($username, "s3cret").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = test::call_service(&$app, login_req($username, "s3cret").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        extract_session(&resp)
    }};
}

fn register_req(username: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/register")
        .set_json(serde_json::json!({ "username": username, "password": password }))
}

fn login_req(username: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/login")
        .set_json(serde_json::json!({ "username": username, "password": password }))
}

fn extract_session(resp: &ServiceResponse) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "token")
        .expect("session cookie missing")
        .into_owned()
}

fn multipart_payload(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_form_req(
    method: &str,
    session: &Cookie<'static>,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> test::TestRequest {
    let req = match method {
        "PUT" => test::TestRequest::put(),
        _ => test::TestRequest::post(),
    };

    req.uri("/post")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .cookie(session.clone())
        .set_payload(multipart_payload(fields, file))
}

#[actix_web::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn register_creates_account_without_leaking_hash() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(&app, register_req("mona", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "mona");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert!(body.get("created_at").is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn register_rejects_short_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(&app, register_req("abc", "abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Length counts characters, not bytes.
    let resp = test::call_service(&app, register_req("ééé", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_rejects_duplicate_username() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(&app, register_req("mona", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, register_req("mona", "0ther-pass").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "username already taken");

    // The original account is untouched by the rejected attempt.
    let resp = test::call_service(&app, login_req("mona", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn login_sets_session_cookie() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(&app, register_req("mona", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, login_req("mona", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = extract_session(&resp);
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "mona");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
}

#[actix_web::test]
async fn login_failures_are_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(&app, register_req("mona", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Wrong password.
    let resp = test::call_service(&app, login_req("mona", "wrong").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "wrong credentials");

    // Unknown username gets the same answer.
    let resp = test::call_service(&app, login_req("nobody", "s3cret").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "wrong credentials");
}

#[actix_web::test]
async fn profile_requires_and_reads_session() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/profile").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let session = login_session!(app, "mona");
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/profile")
            .cookie(session)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "mona");
}

#[actix_web::test]
async fn garbage_session_cookie_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/profile")
            .cookie(Cookie::new("token", "not-a-jwt"))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 401);
}

#[actix_web::test]
async fn logout_clears_session_cookie() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp =
        test::call_service(&app, test::TestRequest::post().uri("/logout").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = extract_session(&resp);
    assert!(cookie.value().is_empty());
}

#[actix_web::test]
async fn create_post_requires_session() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_payload(
                &[("title", "t"), ("summary", "s"), ("content", "c")],
                None,
            ))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_post_requires_cover_file() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);
    let session = login_session!(app, "mona");

    let resp = test::call_service(
        &app,
        post_form_req(
            "POST",
            &session,
            &[
                ("title", "First light"),
                ("summary", "A short summary"),
                ("content", "<p>Hello</p>"),
            ],
            None,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "a cover file is required");
}

#[actix_web::test]
async fn create_post_with_cover_stores_file() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);
    let session = login_session!(app, "mona");

    let resp = test::call_service(
        &app,
        post_form_req(
            "POST",
            &session,
            &[
                ("title", "With cover"),
                ("summary", "s"),
                ("content", "c"),
            ],
            Some(("cover.png", b"png bytes")),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "With cover");
    assert_eq!(body["author"]["username"], "mona");

    let cover = body["cover"].as_str().unwrap();
    assert!(cover.starts_with("uploads/"));
    assert!(cover.ends_with(".png"));

    // The bytes landed under the storage root.
    let name = cover.strip_prefix("uploads/").unwrap();
    let stored = std::fs::read(dir.path().join("uploads").join(name)).unwrap();
    assert_eq!(stored, b"png bytes");

    // And the staging spool is empty again.
    let staged: Vec<_> = std::fs::read_dir(dir.path().join("staging"))
        .unwrap()
        .collect();
    assert!(staged.is_empty());

    // The static mount serves the stored cover back.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/{cover}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, b"png bytes".as_ref());
}

#[actix_web::test]
async fn create_post_rejects_empty_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);
    let session = login_session!(app, "mona");

    let resp = test::call_service(
        &app,
        post_form_req(
            "POST",
            &session,
            &[("title", ""), ("summary", "s"), ("content", "c")],
            Some(("cover.png", b"png bytes")),
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "title, summary and content are required");
}

#[actix_web::test]
async fn feed_is_newest_first_capped_with_authors() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = spawn_app!(dir);

    let author = state
        .users
        .insert(User::new("seed-author".to_string(), "hash".to_string()))
        .await
        .unwrap();

    for i in 0..25 {
        let mut post = Post::new(
            author.id,
            format!("post-{i}"),
            "s".to_string(),
            "c".to_string(),
            None,
        );
        post.created_at -= chrono::TimeDelta::hours(25 - i);
        state.posts.insert(post).await.unwrap();
    }

    let resp = test::call_service(&app, test::TestRequest::get().uri("/post").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let feed = body.as_array().unwrap();
    assert_eq!(feed.len(), 20);
    assert_eq!(feed[0]["title"], "post-24");
    assert_eq!(feed[19]["title"], "post-5");
    assert_eq!(feed[0]["author"]["username"], "seed-author");
}

#[actix_web::test]
async fn get_post_expands_author() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);
    let session = login_session!(app, "mona");

    let resp = test::call_service(
        &app,
        post_form_req(
            "POST",
            &session,
            &[("title", "One"), ("summary", "s"), ("content", "c")],
            Some(("one.png", b"png bytes")),
        )
        .to_request(),
    )
    .await;
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/post/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["author"]["username"], "mona");
}

#[actix_web::test]
async fn get_unknown_post_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/post/{}", Uuid::new_v4()))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_replaces_fields_and_keeps_cover() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);
    let session = login_session!(app, "mona");

    let resp = test::call_service(
        &app,
        post_form_req(
            "POST",
            &session,
            &[
                ("title", "Original"),
                ("summary", "Original summary"),
                ("content", "Original content"),
            ],
            Some(("cover.png", b"v1")),
        )
        .to_request(),
    )
    .await;
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    let original_cover = created["cover"].as_str().unwrap().to_string();

    // Edit without a new file: empty summary is ignored, cover survives.
    let resp = test::call_service(
        &app,
        post_form_req(
            "PUT",
            &session,
            &[
                ("id", &id),
                ("title", "Edited"),
                ("summary", ""),
                ("content", "New content"),
            ],
            None,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Edited");
    assert_eq!(body["summary"], "Original summary");
    assert_eq!(body["content"], "New content");
    assert_eq!(body["cover"].as_str().unwrap(), original_cover);

    // Edit with a new file replaces the cover.
    let resp = test::call_service(
        &app,
        post_form_req(
            "PUT",
            &session,
            &[
                ("id", &id),
                ("title", "Edited again"),
                ("summary", ""),
                ("content", ""),
            ],
            Some(("fresh.png", b"v2")),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let new_cover = body["cover"].as_str().unwrap();
    assert_ne!(new_cover, original_cover);
    assert!(new_cover.starts_with("uploads/"));
}

#[actix_web::test]
async fn update_unknown_post_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);
    let session = login_session!(app, "mona");

    let resp = test::call_service(
        &app,
        post_form_req(
            "PUT",
            &session,
            &[
                ("id", &Uuid::new_v4().to_string()),
                ("title", "t"),
                ("summary", "s"),
                ("content", "c"),
            ],
            None,
        )
        .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "post not found");
}

#[actix_web::test]
async fn missing_stored_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = spawn_app!(dir);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/files/{}", Uuid::new_v4()))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
