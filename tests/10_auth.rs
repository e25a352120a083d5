mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::app();

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "connected");

    let (status, body) = app.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Courtside API");
    Ok(())
}

#[tokio::test]
async fn register_login_and_profile() -> Result<()> {
    let app = common::app();
    let ana = app.register("ana").await?;

    let (status, body) = app.get("/api/auth/profile", Some(&ana.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@example.com");
    assert_eq!(body["data"]["role"], "USER");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = app
        .request(
            axum::http::Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ANA@example.com", "password": common::PASSWORD })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
    Ok(())
}

#[tokio::test]
async fn registration_rejects_duplicates_and_weak_passwords() -> Result<()> {
    let app = common::app();
    app.register("ana").await?;

    let (status, body) = app
        .request(
            axum::http::Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "ana@example.com", "password": "courtside1", "name": "Ana" })),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .request(
            axum::http::Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "bo@example.com", "password": "short", "name": "Bo" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_bad_tokens_are_unauthorized() -> Result<()> {
    let app = common::app();
    app.register("ana").await?;

    let (status, body) = app
        .request(
            axum::http::Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "wrongpass1" })),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = app.get("/api/auth/profile", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/api/auth/profile", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_update_requires_current_password_for_password_change() -> Result<()> {
    let app = common::app();
    let ana = app.register("ana").await?;

    let (status, body) = app
        .put("/api/users/profile", &ana.token, json!({ "name": "Ana Maria", "city": "Dallas" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana Maria");

    let (status, _) = app
        .put("/api/users/profile", &ana.token, json!({ "newPassword": "courtside2" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .put(
            "/api/users/profile",
            &ana.token,
            json!({ "currentPassword": common::PASSWORD, "newPassword": "courtside2" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn root_endpoints_need_super_admin() -> Result<()> {
    let app = common::app();
    let ana = app.register("ana").await?;
    let root = app.admin().await?;

    let (status, _) = app.get("/api/root/users", Some(&ana.token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/root/users?search=ana", Some(&root.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalCount"], 1);

    let (status, _) = app.delete(&format!("/api/root/users/{}", root.id), &root.token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let club_id = app.club(&ana.token, "Dink Society").await?;
    let (status, body) = app.delete(&format!("/api/root/users/{}", ana.id), &root.token).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["clubsCreated"], 1);

    let (status, _) = app.delete(&format!("/api/clubs/{}", club_id), &ana.token).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/api/root/users/{}", ana.id), &root.token).await?;
    assert_eq!(status, StatusCode::OK);

    // The deleted user's token no longer resolves
    let (status, _) = app.get("/api/auth/profile", Some(&ana.token)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
