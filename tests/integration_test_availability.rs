mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(app: &TestApp, uri: &str, payload: Value) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap()
}

async fn get(app: &TestApp, uri: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    ).await.unwrap()
}

async fn create_teacher(app: &TestApp, timezone: &str) -> String {
    let res = post_json(app, "/api/v1/teachers", json!({
        "display_name": "Ada",
        "timezone": timezone
    })).await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn create_session_type(app: &TestApp, teacher_id: &str, duration_min: i32, capacity: i32) -> String {
    let res = post_json(app, &format!("/api/v1/teachers/{}/session-types", teacher_id), json!({
        "name": "Lesson",
        "duration_min": duration_min,
        "price": 4500,
        "capacity": capacity
    })).await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn create_rule(app: &TestApp, teacher_id: &str, session_type_id: &str, weekday: i32, start: &str, end: &str) {
    let res = post_json(app, &format!("/api/v1/teachers/{}/rules", teacher_id), json!({
        "session_type_id": session_type_id,
        "weekday": weekday,
        "start_time": start,
        "end_time": end
    })).await;
    assert_eq!(res.status(), StatusCode::OK);
}

/// First Monday at least a week out, far beyond the booking lead time.
fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

async fn fetch_slots(app: &TestApp, teacher_id: &str, from: NaiveDate, to: NaiveDate) -> Vec<Value> {
    let res = get(app, &format!("/api/v1/teachers/{}/availability?from={}&to={}", teacher_id, from, to)).await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["slots"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_weekly_rule_produces_duration_sized_slots() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;
    create_rule(&app, &teacher_id, &st, 0, "09:00", "12:00").await;

    let monday = next_monday();
    let slots = fetch_slots(&app, &teacher_id, monday, monday).await;

    assert_eq!(slots.len(), 3);
    let expected_start = Utc.from_utc_datetime(&monday.and_hms_opt(9, 0, 0).unwrap());
    assert_eq!(slots[0]["start"].as_str().unwrap(), expected_start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
    assert_eq!(slots[0]["capacity_remaining"].as_i64().unwrap(), 1);
    assert_eq!(slots[0]["price"].as_i64().unwrap(), 4500);
    assert_eq!(slots[0]["session_type_id"].as_str().unwrap(), st);
}

#[tokio::test]
async fn test_partial_trailing_window_is_dropped() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;
    create_rule(&app, &teacher_id, &st, 0, "09:00", "10:30").await;

    let monday = next_monday();
    let slots = fetch_slots(&app, &teacher_id, monday, monday).await;

    assert_eq!(slots.len(), 1);
    assert!(slots[0]["end"].as_str().unwrap().contains("10:00:00"));
}

#[tokio::test]
async fn test_blocked_whole_day_removes_all_slots() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;
    create_rule(&app, &teacher_id, &st, 0, "09:00", "12:00").await;

    let monday = next_monday();
    let res = post_json(&app, &format!("/api/v1/teachers/{}/exceptions", teacher_id), json!({
        "date": monday.to_string(),
        "kind": "BLOCKED",
        "reason": "Public holiday"
    })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let slots = fetch_slots(&app, &teacher_id, monday, monday).await;
    assert!(slots.is_empty(), "Slots should be empty for a blocked day");

    // The following Monday is untouched.
    let following = monday + Duration::days(7);
    let slots = fetch_slots(&app, &teacher_id, following, following).await;
    assert_eq!(slots.len(), 3);
}

#[tokio::test]
async fn test_blocked_interval_splits_window() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;
    create_rule(&app, &teacher_id, &st, 0, "09:00", "12:00").await;

    let monday = next_monday();
    let res = post_json(&app, &format!("/api/v1/teachers/{}/exceptions", teacher_id), json!({
        "date": monday.to_string(),
        "kind": "BLOCKED",
        "start_time": "10:00",
        "end_time": "11:00"
    })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let slots = fetch_slots(&app, &teacher_id, monday, monday).await;
    assert_eq!(slots.len(), 2);
    assert!(slots[0]["start"].as_str().unwrap().contains("09:00:00"));
    assert!(slots[1]["start"].as_str().unwrap().contains("11:00:00"));
}

#[tokio::test]
async fn test_added_exception_injects_one_off_slot() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;

    // No weekly rules at all; a single added interval stands alone.
    let monday = next_monday();
    let res = post_json(&app, &format!("/api/v1/teachers/{}/exceptions", teacher_id), json!({
        "date": monday.to_string(),
        "kind": "ADDED",
        "session_type_id": st,
        "start_time": "14:00",
        "end_time": "16:00"
    })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let slots = fetch_slots(&app, &teacher_id, monday, monday).await;
    assert_eq!(slots.len(), 2);
    assert!(slots[0]["start"].as_str().unwrap().contains("14:00:00"));
    assert!(slots[1]["start"].as_str().unwrap().contains("15:00:00"));
}

#[tokio::test]
async fn test_added_slot_on_fully_blocked_day_is_rejected() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;

    let monday = next_monday();
    post_json(&app, &format!("/api/v1/teachers/{}/exceptions", teacher_id), json!({
        "date": monday.to_string(),
        "kind": "BLOCKED"
    })).await;

    let res = post_json(&app, &format!("/api/v1/teachers/{}/exceptions", teacher_id), json!({
        "date": monday.to_string(),
        "kind": "ADDED",
        "session_type_id": st,
        "start_time": "14:00",
        "end_time": "15:00"
    })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlapping_session_types_are_independent_pools() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let one_on_one = create_session_type(&app, &teacher_id, 60, 1).await;
    let group = create_session_type(&app, &teacher_id, 60, 5).await;
    create_rule(&app, &teacher_id, &one_on_one, 0, "09:00", "11:00").await;
    create_rule(&app, &teacher_id, &group, 0, "09:00", "11:00").await;

    let monday = next_monday();
    let slots = fetch_slots(&app, &teacher_id, monday, monday).await;

    assert_eq!(slots.len(), 4);
    let group_slots: Vec<_> = slots.iter()
        .filter(|s| s["session_type_id"].as_str().unwrap() == group)
        .collect();
    assert_eq!(group_slots.len(), 2);
    assert_eq!(group_slots[0]["capacity_remaining"].as_i64().unwrap(), 5);
}

#[tokio::test]
async fn test_same_session_type_overlapping_rule_rejected() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;
    create_rule(&app, &teacher_id, &st, 0, "09:00", "12:00").await;

    let res = post_json(&app, &format!("/api/v1/teachers/{}/rules", teacher_id), json!({
        "session_type_id": st,
        "weekday": 0,
        "start_time": "11:00",
        "end_time": "13:00"
    })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_rule_rejected_at_write_time() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;

    let res = post_json(&app, &format!("/api/v1/teachers/{}/rules", teacher_id), json!({
        "session_type_id": st,
        "weekday": 0,
        "start_time": "12:00",
        "end_time": "09:00"
    })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_json(&app, &format!("/api/v1/teachers/{}/rules", teacher_id), json!({
        "session_type_id": st,
        "weekday": 7,
        "start_time": "09:00",
        "end_time": "12:00"
    })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivated_rule_stops_generating_slots() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "UTC").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;

    let res = post_json(&app, &format!("/api/v1/teachers/{}/rules", teacher_id), json!({
        "session_type_id": st,
        "weekday": 0,
        "start_time": "09:00",
        "end_time": "12:00"
    })).await;
    let rule_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let monday = next_monday();
    assert_eq!(fetch_slots(&app, &teacher_id, monday, monday).await.len(), 3);

    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/teachers/{}/rules/{}", teacher_id, rule_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert!(fetch_slots(&app, &teacher_id, monday, monday).await.is_empty());
}

#[tokio::test]
async fn test_wall_clock_rule_in_teacher_timezone() {
    let app = TestApp::new().await;
    let teacher_id = create_teacher(&app, "America/New_York").await;
    let st = create_session_type(&app, &teacher_id, 60, 1).await;
    create_rule(&app, &teacher_id, &st, 0, "09:00", "10:00").await;

    let monday = next_monday();
    let slots = fetch_slots(&app, &teacher_id, monday, monday).await;

    assert_eq!(slots.len(), 1);
    // 09:00 New York is 13:00 or 14:00 UTC depending on DST; never 09:00.
    let start = slots[0]["start"].as_str().unwrap();
    assert!(start.contains("13:00:00") || start.contains("14:00:00"), "unexpected start {}", start);
}
