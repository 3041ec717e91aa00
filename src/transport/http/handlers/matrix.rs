use crate::transport::http::types::{store_error_response, ApiResponse, AppState, MatrixQuery, MatrixResponse};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Missing parameters are treated as empty strings. A pacticipant with no
/// contracts at that version is deployable.
#[utoipa::path(
    get,
    path = "/matrix",
    params(MatrixQuery),
    responses(
        (status = 200, description = "Deployability of the pacticipant version", body = MatrixResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn matrix_handler(State(state): State<AppState>, Query(query): Query<MatrixQuery>) -> impl IntoResponse {
    match state.store.is_deployable(&query.pacticipant, &query.version).await {
        Ok(deployability) => {
            tracing::info!(
                pacticipant = %query.pacticipant,
                version = %query.version,
                deployable = deployability.deployable,
                "can-i-deploy"
            );
            (StatusCode::OK, Json(MatrixResponse::from(deployability))).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}
