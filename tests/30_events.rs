mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use courtside_api::database::models::NewEvent;
use courtside_api::database::EventStore;
use courtside_api::types::{EventType, EventVisibility};

fn event_body(club_id: &str, start: DateTime<Utc>, visibility: &str) -> Value {
    json!({
        "clubId": club_id,
        "title": "Friday social",
        "type": "SOCIAL",
        "visibility": visibility,
        "startDateTime": start,
        "endDateTime": start + Duration::hours(2),
    })
}

async fn create_event(app: &common::TestApp, token: &str, body: Value) -> Result<String> {
    let (status, body) = app.post("/api/events", token, body).await?;
    anyhow::ensure!(status == StatusCode::CREATED, "event create failed: {}", body);
    common::id(&body["data"])
}

#[tokio::test]
async fn join_depends_on_start_time() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let player = app.register("player").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;

    let soon = create_event(&app, &owner.token, event_body(&club_id, Utc::now() + Duration::minutes(10), "OPEN")).await?;
    let (status, body) = app
        .request(axum::http::Method::POST, &format!("/api/events/{}/join", soon), Some(&player.token), None)
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["checkedIn"], false);

    // Events cannot be created in the past through the API, so seed one
    let start = Utc::now() - Duration::minutes(10);
    let past = app
        .state
        .store
        .create_event(NewEvent {
            club_id: Uuid::parse_str(&club_id)?,
            court_id: None,
            title: "Started already".to_string(),
            description: None,
            event_type: EventType::OpenPlay,
            visibility: EventVisibility::Open,
            start_date_time: start,
            end_date_time: start + Duration::hours(2),
            max_participants: None,
            price: None,
        })
        .await?;
    let (status, _) = app
        .request(axum::http::Method::POST, &format!("/api/events/{}/join", past.id), Some(&player.token), None)
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn first_check_in_moves_event_to_ongoing() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let a = app.register("a").await?;
    let b = app.register("b").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    let event_id = create_event(&app, &owner.token, event_body(&club_id, Utc::now() + Duration::minutes(10), "OPEN")).await?;

    for session in [&a, &b] {
        let (status, _) = app
            .request(axum::http::Method::POST, &format!("/api/events/{}/join", event_id), Some(&session.token), None)
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let checkin = format!("/api/events/{}/checkin", event_id);
    let (status, body) = app.post(&checkin, &a.token, json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eventStatus"], "ONGOING");
    assert_eq!(body["data"]["participant"]["checkedIn"], true);

    let (status, body) = app.post(&checkin, &b.token, json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eventStatus"], "ONGOING");

    let (status, _) = app.post(&checkin, &a.token, json!({})).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.get(&format!("/api/events/{}", event_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ONGOING");
    assert_eq!(body["data"]["participantCount"], 2);

    // Ongoing events no longer accept registrations or departures
    let late = app.register("late").await?;
    let (status, _) = app
        .request(axum::http::Method::POST, &format!("/api/events/{}/join", event_id), Some(&late.token), None)
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&format!("/api/events/{}/join", event_id), &a.token).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .delete(&format!("{}?userId={}", checkin, b.id), &owner.token)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checkedIn"], false);

    let (status, body) = app
        .get(&format!("/api/events/{}/participants", event_id), Some(&owner.token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["checkedInCount"], 1);
    Ok(())
}

#[tokio::test]
async fn check_in_window_and_delegation() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let a = app.register("a").await?;
    let b = app.register("b").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    let event_id = create_event(&app, &owner.token, event_body(&club_id, Utc::now() + Duration::hours(3), "OPEN")).await?;
    app.request(axum::http::Method::POST, &format!("/api/events/{}/join", event_id), Some(&a.token), None)
        .await?;

    let checkin = format!("/api/events/{}/checkin", event_id);
    let (status, body) = app.post(&checkin, &a.token, json!({})).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["details"]["checkInOpensAt"].is_string());

    let (status, _) = app.post(&checkin, &b.token, json!({ "userId": a.id })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post(&checkin, &owner.token, json!({ "userId": b.id })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Leaving is still allowed three hours out
    let (status, _) = app.delete(&format!("/api/events/{}/join", event_id), &a.token).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn private_and_members_only_visibility() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let member = app.register("member").await?;
    let stranger = app.register("stranger").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    app.add_member(&owner.token, &club_id, &member.id, "ACTIVE").await?;

    let start = Utc::now() + Duration::days(1);
    let private = create_event(&app, &owner.token, event_body(&club_id, start, "PRIVATE")).await?;
    let members_only = create_event(&app, &owner.token, event_body(&club_id, start, "MEMBERS_ONLY")).await?;

    let (status, body) = app.get("/api/events", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalCount"], 1);

    let uri = format!("/api/events/{}", private);
    let (status, _) = app.get(&uri, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get(&uri, Some(&stranger.token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.get(&uri, Some(&member.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isRegistered"], false);

    let join = format!("/api/events/{}/join", members_only);
    let (status, _) = app
        .request(axum::http::Method::POST, &join, Some(&stranger.token), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .request(axum::http::Method::POST, &join, Some(&member.token), None)
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .request(axum::http::Method::POST, &join, Some(&member.token), None)
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn capacity_price_and_validation() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let a = app.register("a").await?;
    let b = app.register("b").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    let start = Utc::now() + Duration::days(1);

    let mut capped = event_body(&club_id, start, "OPEN");
    capped["maxParticipants"] = json!(1);
    let capped = create_event(&app, &owner.token, capped).await?;
    let join = format!("/api/events/{}/join", capped);
    let (status, _) = app.request(axum::http::Method::POST, &join, Some(&a.token), None).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.request(axum::http::Method::POST, &join, Some(&b.token), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .put(&format!("/api/events/{}", capped), &owner.token, json!({ "maxParticipants": 0 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let mut priced = event_body(&club_id, start, "OPEN");
    priced["price"] = json!("15.00");
    let priced = create_event(&app, &owner.token, priced).await?;
    let (status, _) = app
        .request(axum::http::Method::POST, &format!("/api/events/{}/join", priced), Some(&a.token), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

    let mut inverted = event_body(&club_id, start, "OPEN");
    inverted["endDateTime"] = json!(start - Duration::hours(1));
    let (status, body) = app.post("/api/events", &owner.token, inverted).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["endDateTime"].is_string());

    let (status, _) = app.post("/api/events", &a.token, event_body(&club_id, start, "OPEN")).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn nearby_requires_city() -> Result<()> {
    let app = common::app();
    let owner = app.register("owner").await?;
    let club_id = app.club(&owner.token, "Dink Society").await?;
    create_event(&app, &owner.token, event_body(&club_id, Utc::now() + Duration::days(2), "OPEN")).await?;
    create_event(&app, &owner.token, event_body(&club_id, Utc::now() + Duration::days(20), "OPEN")).await?;

    let (status, body) = app.get("/api/events/nearby", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["city"].is_string());

    let (status, _) = app.get("/api/events/nearby?city=Austin&daysAhead=31", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/events/nearby?city=Austin", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["events"].as_array().map(Vec::len), Some(1));
    Ok(())
}
