use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{availability, availability_rule, booking, date_exception, health, session_type, teacher};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Teacher profiles
        .route("/api/v1/teachers", post(teacher::create_teacher))
        .route("/api/v1/teachers/{teacher_id}", get(teacher::get_teacher))

        // Session types
        .route("/api/v1/teachers/{teacher_id}/session-types", post(session_type::create_session_type).get(session_type::list_session_types))
        .route("/api/v1/teachers/{teacher_id}/session-types/{session_type_id}", axum::routing::put(session_type::update_session_type))

        // Recurring rules & date exceptions
        .route("/api/v1/teachers/{teacher_id}/rules", post(availability_rule::create_rule).get(availability_rule::list_rules))
        .route("/api/v1/teachers/{teacher_id}/rules/{rule_id}", delete(availability_rule::deactivate_rule))
        .route("/api/v1/teachers/{teacher_id}/exceptions", post(date_exception::create_exception).get(date_exception::list_exceptions))
        .route("/api/v1/teachers/{teacher_id}/exceptions/{exception_id}", delete(date_exception::delete_exception))

        // Public booking flow
        .route("/api/v1/teachers/{teacher_id}/availability", get(availability::get_availability))
        .route("/api/v1/bookings", post(booking::create_booking))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/teachers/{teacher_id}/bookings", get(booking::list_teacher_bookings))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        teacher_id = tracing::field::Empty,
                        student_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
