mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

#[tokio::test]
async fn club_catalogue_is_public() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    app.court(&owner.token, &club_id, "Center").await?;

    let (status, body) = app.get("/api/clubs?city=austin", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalCount"], 1);
    assert_eq!(body["data"]["items"][0]["memberCount"], 1);

    let (status, body) = app.get(&format!("/api/clubs/{}", club_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["courts"][0]["name"], "Center");
    assert_eq!(body["data"]["creatorId"], owner.id);

    let (status, _) = app
        .get("/api/clubs/00000000-0000-0000-0000-000000000000", None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn club_writes_follow_ownership() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let other = app.register("other").await?;
    let root = app.admin().await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;

    let (status, _) = app
        .post(
            "/api/clubs",
            &other.token,
            json!({ "name": "Dink Society", "address": "2 Net Rd", "city": "Austin" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/clubs/{}", club_id);
    let (status, _) = app.put(&uri, &other.token, json!({ "name": "Stolen" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.put(&uri, &root.token, json!({ "description": "Weekly ladder" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Weekly ladder");

    let (status, _) = app.delete(&uri, &other.token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, &owner.token).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn membership_management() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let player = app.register("player").await?;
    let root = app.admin().await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    let members = format!("/api/clubs/{}/members", club_id);

    let (status, body) = app
        .post(&members, &owner.token, json!({ "userId": player.id }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["user"]["id"], player.id);

    let (status, _) = app
        .post(&members, &owner.token, json!({ "userId": player.id }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let member = format!("{}/{}", members, player.id);
    let (status, body) = app.put(&member, &owner.token, json!({ "status": "ACTIVE" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ACTIVE");

    // Active members still cannot list the roster
    let (status, _) = app.get(&members, Some(&player.token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.get(&format!("{}?status=ACTIVE", members), Some(&owner.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalCount"], 2);

    // The creator's own row is never removable
    let creator_row = format!("{}/{}", members, owner.id);
    for token in [&owner.token, &root.token] {
        let (status, _) = app.delete(&creator_row, token).await?;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    let (status, _) = app.delete(&member, &owner.token).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn court_with_scheduled_event_cannot_be_deleted_until_cancelled() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    let court_id = app.court(&owner.token, &club_id, "Center").await?;

    let start = Utc::now() + Duration::days(2);
    let (status, body) = app
        .post(
            "/api/events",
            &owner.token,
            json!({
                "clubId": club_id,
                "courtId": court_id,
                "title": "Ladder night",
                "type": "LEAGUE",
                "visibility": "OPEN",
                "startDateTime": start,
                "endDateTime": start + Duration::hours(2),
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let event_id = common::id(&body["data"])?;

    let court = format!("/api/clubs/{}/courts/{}", club_id, court_id);
    let (status, body) = app.delete(&court, &owner.token).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["futureEvents"], 1);

    let (status, _) = app.put(&court, &owner.token, json!({ "isActive": false })).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .put(&format!("/api/events/{}", event_id), &owner.token, json!({ "status": "CANCELLED" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "CANCELLED");

    let (status, body) = app.delete(&court, &owner.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eventsDeleted"], 1);

    let (status, _) = app.get(&court, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
