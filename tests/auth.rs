mod common;

use axum::body::Body;
use axum::http::Request;
use common::{API_KEY, TestApp, json_body};

#[tokio::test]
async fn missing_or_wrong_key_is_unauthorized() -> anyhow::Result<()> {
    let app = TestApp::new(&[]);

    let missing = Request::builder()
        .uri("/api/v1/sessions")
        .header("x-user-id", "alice")
        .body(Body::empty())?;
    let response = app.send(missing).await?;
    assert_eq!(response.status(), 401);
    let body = json_body(response).await?;
    assert_eq!(body["message"], "Missing or invalid API key");
    assert_eq!(body["error"], "Unauthorized");

    let wrong = Request::builder()
        .uri("/api/v1/sessions")
        .header("x-api-key", "not-the-key")
        .header("x-user-id", "alice")
        .body(Body::empty())?;
    assert_eq!(app.send(wrong).await?.status(), 401);
    Ok(())
}

#[tokio::test]
async fn authorization_header_scheme_is_accepted() -> anyhow::Result<()> {
    let app = TestApp::new(&[]);
    let req = Request::builder()
        .uri("/api/v1/sessions")
        .header("authorization", format!("ApiKey {API_KEY}"))
        .header("x-user-id", "alice")
        .body(Body::empty())?;
    assert_eq!(app.send(req).await?.status(), 200);
    Ok(())
}

#[tokio::test]
async fn missing_user_id_is_a_bad_request() -> anyhow::Result<()> {
    let app = TestApp::new(&[]);
    let req = Request::builder()
        .uri("/api/v1/sessions")
        .header("x-api-key", API_KEY)
        .body(Body::empty())?;
    let response = app.send(req).await?;
    assert_eq!(response.status(), 400);
    let body = json_body(response).await?;
    assert_eq!(body["status"], 400);
    assert_eq!(body["path"], "/api/v1/sessions");
    Ok(())
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() -> anyhow::Result<()> {
    let app = TestApp::new(&[]);

    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())?;
    assert_eq!(app.send(req).await?.headers()["x-request-id"], "abc-123");

    let req = Request::builder().uri("/health").body(Body::empty())?;
    let generated = app.send(req).await?.headers()["x-request-id"].to_str()?.to_string();
    assert!(uuid::Uuid::parse_str(&generated).is_ok());
    Ok(())
}
