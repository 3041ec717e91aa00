//! Bearer-token authentication for the broker.

use crate::transport::http::types::{error_response, AppState};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Requires `Authorization: Bearer <token>` when the broker has a token.
/// `/health` stays open for load balancers.
pub async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return error_response(StatusCode::UNAUTHORIZED, "Authorization header required").into_response();
    };

    let token = match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            return error_response(StatusCode::UNAUTHORIZED, "Invalid authorization header format").into_response()
        }
    };

    if token != expected {
        tracing::warn!(path = request.uri().path(), "rejected request with invalid token");
        return error_response(StatusCode::UNAUTHORIZED, "Invalid token").into_response();
    }

    next.run(request).await
}
