//! API 전체 흐름 통합 테스트
//!
//! 초기 데이터 생성 → 로그인 → 사용자 생성/역할 연결 → 토큰 갱신까지
//! 공개 API만으로 검증합니다.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use usermgmt_api::{create_api_router, AppState, MemoryCredentialStore, TokenIssuer};
use usermgmt_core::{BootstrapConfig, ROLE_ADMIN, ROLE_USER};

async fn bootstrapped_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Arc::new(MemoryCredentialStore::new()),
        TokenIssuer::new("integration-secret", 60, 1800),
    ));
    state
        .users
        .seed_defaults(&BootstrapConfig::default())
        .await
        .unwrap();

    (create_api_router().with_state(Arc::clone(&state)), state)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "users.example.com");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router, username: &str, password: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_bootstrap_user_can_manage_users() {
    let (app, _state) = bootstrapped_app().await;
    let (admin_token, _) = login(&app, "user", "1234").await;

    // 역할 목록
    let (status, roles) = call(&app, Method::GET, "/api/roles", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let user_role_id = roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == ROLE_USER)
        .map(|r| r["id"].as_str().unwrap().to_string())
        .unwrap();

    // 사용자 생성
    let (status, dave) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin_token),
        Some(json!({
            "username": "dave",
            "password": "dave-pw",
            "fullname": "Dave",
            "role_ids": [user_role_id],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let dave_id = dave["id"].as_str().unwrap().to_string();

    // 새 사용자 로그인 후 관리자 엔드포인트 접근 불가
    let (dave_token, _) = login(&app, "dave", "dave-pw").await;
    let (status, _) = call(&app, Method::GET, "/api/users", Some(&dave_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 본인 프로필 수정
    let (status, updated) = call(
        &app,
        Method::PATCH,
        &format!("/api/users/{}", dave_id),
        Some(&dave_token),
        Some(json!({ "fullname": "David" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["fullname"], "David");
    assert_eq!(updated["roles"].as_array().unwrap().len(), 1);

    // 관리자는 목록에서 새 사용자를 볼 수 있음
    let (status, users) = call(&app, Method::GET, "/api/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["dave", "user"]);
}

#[tokio::test]
async fn test_refresh_reflects_current_roles() {
    let (app, state) = bootstrapped_app().await;
    let (admin_token, _) = login(&app, "user", "1234").await;

    let (status, erin) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin_token),
        Some(json!({ "username": "erin", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(erin["roles"].as_array().unwrap().is_empty());

    let (_, erin_refresh) = login(&app, "erin", "pw").await;

    // 로그인 이후 관리자 역할 부여
    let admin_role = state
        .users
        .get_roles()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.name == ROLE_ADMIN)
        .unwrap();
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/users/{}/roles/{}", erin["id"].as_str().unwrap(), admin_role.id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // 갱신된 Access Token은 현재 역할을 담음
    let (status, pair) = call(
        &app,
        Method::GET,
        "/api/refreshToken",
        Some(&erin_refresh),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pair["refresh_token"], erin_refresh.as_str());

    let claims = state
        .tokens
        .verify(pair["access_token"].as_str().unwrap(), chrono::Utc::now())
        .unwrap();
    assert_eq!(claims.roles, vec![ROLE_ADMIN]);
    assert_eq!(claims.iss, "http://users.example.com/api/refreshToken");

    let (status, _) = call(
        &app,
        Method::GET,
        "/api/users",
        Some(pair["access_token"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_from_other_key_is_rejected() {
    let (app, _state) = bootstrapped_app().await;
    let foreign = TokenIssuer::new("other-secret", 60, 1800)
        .issue(
            "user",
            vec![ROLE_ADMIN.to_string()],
            "http://evil",
            chrono::Utc::now(),
        )
        .unwrap();

    let (status, body) = call(&app, Method::GET, "/api/users", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    let (status, body) = call(&app, Method::GET, "/api/refreshToken", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error_message"].is_string());
}
