//! Event feed endpoint consumed by calendar widgets

use std::collections::HashMap;

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
    routing::get,
};
use calfeed_core::{CalfeedError, QueryWindow, RequestContext, to_json};
use tracing::debug;

use crate::routes::AppError;
use crate::state::AppState;

/// Header carrying the authenticated user, set by whatever sits in front of
/// the server.
const USER_HEADER: &str = "x-user";

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(list_events))
}

/// GET /events?start=YYYY-MM-DD&end=YYYY-MM-DD - Collect events from every
/// registered listener and return them as a JSON array
async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let window = QueryWindow::from_args(
        params.get("start").map(String::as_str),
        params.get("end").map(String::as_str),
    )?;

    let mut context = params
        .into_iter()
        .fold(RequestContext::new(), |ctx, (k, v)| ctx.with_param(k, v));
    if let Some(user) = headers.get(USER_HEADER).and_then(|v| v.to_str().ok()) {
        context = context.with_user(user);
    }

    let registry = state.registry.clone();
    let dispatch = tokio::task::spawn_blocking(move || {
        registry
            .dispatch(window, &context)
            .and_then(|collector| to_json(&collector))
    });

    let body = match tokio::time::timeout(state.dispatch_timeout, dispatch).await {
        Ok(joined) => joined??,
        Err(_) => return Err(CalfeedError::Timeout(state.dispatch_timeout).into()),
    };

    debug!(start = %window.start(), end = %window.end(), bytes = body.len(), "Served events");

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use calfeed_core::{EventRecord, ListenerError, ListenerRegistry};
    use chrono::NaiveDate;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(registry: ListenerRegistry) -> Router {
        router().with_state(AppState::new(registry, Duration::from_secs(5)))
    }

    fn holidays() -> ListenerRegistry {
        let mut registry = ListenerRegistry::new();
        registry.register_named("holidays", |_, collector, ctx| {
            let mut holiday =
                EventRecord::all_day("Holiday", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
            if let Some(user) = ctx.user() {
                holiday.add_field("for", user);
            }
            collector.append(holiday);
            Ok(())
        });
        registry
    }

    const MARCH: &str = "/events?start=2024-03-01&end=2024-03-31";

    async fn get(app: Router, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(user) = user {
            request = request.header(USER_HEADER, user);
        }

        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_events_returns_json_array() {
        let (status, body) = get(app(holidays()), MARCH, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"title": "Holiday", "start": "2024-03-05T00:00:00+00:00", "allDay": true}])
        );
    }

    #[tokio::test]
    async fn test_user_header_reaches_listeners() {
        let (status, body) = get(app(holidays()), MARCH, Some("alice")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["for"], json!("alice"));
    }

    #[tokio::test]
    async fn test_bad_window_is_bad_request() {
        let uri = "/events?start=yesterday&end=2024-03-31";
        let (status, body) = get(app(holidays()), uri, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("yesterday"));
    }

    #[tokio::test]
    async fn test_missing_end_is_bad_request() {
        let (status, _) = get(app(holidays()), "/events?start=2024-03-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_listener_failure_is_server_error() {
        let mut registry = holidays();
        registry.register_named("broken", |_, _, _| Err(ListenerError::failed("db down")));

        let (status, body) = get(app(registry), MARCH, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Listener 'broken' failed: db down"));
    }

    #[tokio::test]
    async fn test_slow_dispatch_times_out() {
        let mut registry = ListenerRegistry::new();
        registry.register_named("slow", |_, _, _| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        });
        let app = router().with_state(AppState::new(registry, Duration::from_millis(20)));

        let (status, body) = get(app, MARCH, None).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], json!("Dispatch timed out after 20ms"));
    }
}
