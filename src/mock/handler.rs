use crate::domain::compare::HeaderSet;
use crate::domain::contract::{header_value_string, Interaction, Response as ExpectedResponse};
use crate::domain::matching::{find_match, IncomingRequest};
use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registered and recorded interactions shared with the serving task.
#[derive(Clone, Default)]
pub(crate) struct MockState {
    pub(crate) interactions: Arc<RwLock<Vec<Interaction>>>,
    pub(crate) recorded: Arc<RwLock<Vec<Interaction>>>,
}

pub(crate) fn router(state: MockState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .fallback(interaction_handler)
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn interaction_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let mut incoming = IncomingRequest::new(method.as_str(), uri.path());
    if let Some(raw) = uri.query() {
        incoming = incoming.with_raw_query(raw);
    }
    incoming.headers = HeaderSet::from_header_map(&headers);

    let matched = {
        let interactions = state.interactions.read().await;
        find_match(&incoming, &interactions).cloned()
    };

    let Some(interaction) = matched else {
        tracing::warn!(method = %method, path = uri.path(), "no matching interaction");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": format!("no matching interaction found for {} {}", method, uri.path()),
                "method": method.as_str(),
                "path": uri.path(),
            })),
        )
            .into_response();
    };

    tracing::debug!(description = %interaction.description, "request matched");
    let response = render(&interaction.response);
    state.recorded.write().await.push(interaction);
    response
}

/// Writes the expected response: status, headers, then the body as raw text
/// for strings and as JSON otherwise.
fn render(expected: &ExpectedResponse) -> Response {
    let status = StatusCode::from_u16(expected.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in expected.headers.iter().flatten() {
        let parsed = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&header_value_string(value)),
        );
        match parsed {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "skipping header that is not valid HTTP"),
        }
    }

    let body = match expected.body.as_ref() {
        None | Some(JsonValue::Null) => Body::empty(),
        Some(JsonValue::String(text)) => Body::from(text.clone()),
        Some(other) => {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Body::from(other.to_string())
        }
    };

    (status, headers, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_bodies_are_written_raw() {
        let expected = ExpectedResponse::new(200).with_body("plain text");
        let response = render(&expected);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn structured_bodies_default_to_json_content_type() {
        let expected = ExpectedResponse::new(201).with_body(json!({"id": 1}));
        let response = render(&expected);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn declared_content_type_is_kept() {
        let expected = ExpectedResponse::new(200)
            .with_header("Content-Type", "application/hal+json")
            .with_body(json!({"id": 1}));
        let response = render(&expected);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/hal+json");
    }
}
