mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

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

fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

fn slot_start(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

/// Teacher in UTC with a Monday 09:00-12:00 window for one session type.
async fn setup_teacher(app: &TestApp, duration_min: i32, capacity: i32) -> (String, String) {
    let res = post_json(app, "/api/v1/teachers", json!({
        "display_name": "Ada",
        "timezone": "UTC"
    })).await;
    let teacher_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = post_json(app, &format!("/api/v1/teachers/{}/session-types", teacher_id), json!({
        "name": "Lesson",
        "duration_min": duration_min,
        "price": 4500,
        "capacity": capacity
    })).await;
    let session_type_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = post_json(app, &format!("/api/v1/teachers/{}/rules", teacher_id), json!({
        "session_type_id": session_type_id,
        "weekday": 0,
        "start_time": "09:00",
        "end_time": "12:00"
    })).await;
    assert_eq!(res.status(), StatusCode::OK);

    (teacher_id, session_type_id)
}

async fn book(
    app: &TestApp,
    teacher_id: &str,
    session_type_id: &str,
    student_id: &str,
    start: DateTime<Utc>,
    idempotency_key: &str,
) -> axum::response::Response {
    post_json(app, "/api/v1/bookings", json!({
        "teacher_id": teacher_id,
        "student_id": student_id,
        "session_type_id": session_type_id,
        "start": start.to_rfc3339(),
        "idempotency_key": idempotency_key
    })).await
}

#[tokio::test]
async fn test_successful_booking_confirms_and_captures_payment() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let start = slot_start(next_monday(), 9);

    let res = book(&app, &teacher_id, &st, "student-1", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["status"].as_str().unwrap(), "CONFIRMED");
    assert_eq!(body["price_at_booking"].as_i64().unwrap(), 4500);
    assert_eq!(body["student_id"].as_str().unwrap(), "student-1");

    assert_eq!(app.payment.count("hold:"), 1);
    assert_eq!(app.payment.count("capture:"), 1);
    assert_eq!(app.payment.count("release:"), 0);
}

#[tokio::test]
async fn test_booked_slot_disappears_from_availability() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let monday = next_monday();

    book(&app, &teacher_id, &st, "student-1", slot_start(monday, 10), &Uuid::new_v4().to_string()).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/teachers/{}/availability?from={}&to={}", teacher_id, monday, monday))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let slots = parse_body(res).await["slots"].as_array().unwrap().clone();

    assert_eq!(slots.len(), 2);
    assert!(!slots.iter().any(|s| s["start"].as_str().unwrap().contains("10:00:00")));
}

#[tokio::test]
async fn test_booking_nonexistent_slot_rejected_and_hold_released() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    // Tuesday: no rule generates this slot.
    let start = slot_start(next_monday() + Duration::days(1), 9);

    let res = book(&app, &teacher_id, &st, "student-1", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = parse_body(res).await;
    assert_eq!(body["kind"].as_str().unwrap(), "SLOT_NOT_FOUND");

    assert_eq!(app.payment.count("hold:"), 1);
    assert_eq!(app.payment.count("release:"), 1);
    assert_eq!(app.payment.count("capture:"), 0);
}

#[tokio::test]
async fn test_misaligned_start_rejected() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let monday = next_monday();
    let start = Utc.from_utc_datetime(&monday.and_hms_opt(9, 30, 0).unwrap());

    let res = book(&app, &teacher_id, &st, "student-1", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["kind"].as_str().unwrap(), "SLOT_NOT_FOUND");
}

#[tokio::test]
async fn test_capacity_exceeded_for_second_student() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let start = slot_start(next_monday(), 9);

    let res = book(&app, &teacher_id, &st, "student-1", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = book(&app, &teacher_id, &st, "student-2", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["kind"].as_str().unwrap(), "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn test_group_capacity_admits_up_to_limit() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 3).await;
    let start = slot_start(next_monday(), 9);

    for student in ["student-1", "student-2", "student-3"] {
        let res = book(&app, &teacher_id, &st, student, start, &Uuid::new_v4().to_string()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = book(&app, &teacher_id, &st, "student-4", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["kind"].as_str().unwrap(), "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn test_student_cannot_double_book_across_session_types() {
    let app = TestApp::new().await;
    let (teacher_id, one_on_one) = setup_teacher(&app, 60, 1).await;

    // Second session type sharing the same window.
    let res = post_json(&app, &format!("/api/v1/teachers/{}/session-types", teacher_id), json!({
        "name": "Group conversation",
        "duration_min": 60,
        "price": 2000,
        "capacity": 5
    })).await;
    let group = parse_body(res).await["id"].as_str().unwrap().to_string();
    post_json(&app, &format!("/api/v1/teachers/{}/rules", teacher_id), json!({
        "session_type_id": group,
        "weekday": 0,
        "start_time": "09:00",
        "end_time": "12:00"
    })).await;

    let start = slot_start(next_monday(), 9);

    let res = book(&app, &teacher_id, &one_on_one, "student-1", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = book(&app, &teacher_id, &group, "student-1", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["kind"].as_str().unwrap(), "STUDENT_DOUBLE_BOOKED");

    // A different student still fits into the group pool.
    let res = book(&app, &teacher_id, &group, "student-2", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_idempotent_retry_returns_same_booking() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let start = slot_start(next_monday(), 9);
    let key = Uuid::new_v4().to_string();

    let res = book(&app, &teacher_id, &st, "student-1", start, &key).await;
    assert_eq!(res.status(), StatusCode::OK);
    let first = parse_body(res).await;

    let res = book(&app, &teacher_id, &st, "student-1", start, &key).await;
    assert_eq!(res.status(), StatusCode::OK);
    let second = parse_body(res).await;

    assert_eq!(first["id"], second["id"]);

    let rows: Vec<tutoria_backend::domain::models::booking::Booking> =
        sqlx::query_as("SELECT * FROM bookings").fetch_all(&app.pool).await.unwrap();
    assert_eq!(rows.len(), 1);

    // The replay settles before payment: exactly one hold, one capture.
    assert_eq!(app.payment.count("hold:"), 1);
    assert_eq!(app.payment.count("capture:"), 1);
}

#[tokio::test]
async fn test_price_snapshot_survives_price_change() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let start = slot_start(next_monday(), 9);

    let res = book(&app, &teacher_id, &st, "student-1", start, &Uuid::new_v4().to_string()).await;
    let booking_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("PUT")
            .uri(format!("/api/v1/teachers/{}/session-types/{}", teacher_id, st))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"price": 9900}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/bookings/{}", booking_id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["price_at_booking"].as_i64().unwrap(), 4500);
}

#[tokio::test]
async fn test_duration_frozen_once_booked() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let start = slot_start(next_monday(), 9);

    book(&app, &teacher_id, &st, "student-1", start, &Uuid::new_v4().to_string()).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("PUT")
            .uri(format!("/api/v1/teachers/{}/session-types/{}", teacher_id, st))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"duration_min": 30}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_students_may_book() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let start = slot_start(next_monday(), 9);

    let res = book(&app, &teacher_id, &st, "teacher:bob", start, &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_booking_on_blocked_day_rejected() {
    let app = TestApp::new().await;
    let (teacher_id, st) = setup_teacher(&app, 60, 1).await;
    let monday = next_monday();

    post_json(&app, &format!("/api/v1/teachers/{}/exceptions", teacher_id), json!({
        "date": monday.to_string(),
        "kind": "BLOCKED"
    })).await;

    let res = book(&app, &teacher_id, &st, "student-1", slot_start(monday, 9), &Uuid::new_v4().to_string()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["kind"].as_str().unwrap(), "SLOT_NOT_FOUND");
}
