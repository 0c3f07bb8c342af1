use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::server::AppState;
use crate::service::QueryFailure;

#[derive(serde::Deserialize)]
pub(crate) struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(serde::Serialize)]
struct QueryResponse {
    response: String,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

pub(crate) async fn query_handler(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Response {
    let Some(query) = payload.query else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'query' in request body.");
    };

    match state.service.answer(&query).await {
        Ok(response) => Json(QueryResponse { response }).into_response(),
        Err(QueryFailure::BadRequest(msg)) => {
            tracing::info!(error = %msg, "query rejected");
            error_response(StatusCode::BAD_REQUEST, msg)
        }
        Err(QueryFailure::Internal(msg)) => {
            tracing::error!(error = %msg, "query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok",
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"status":"ok","uptime_secs":42}"#);
    }

    #[test]
    fn query_request_tolerates_missing_field() {
        let req: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_none());
        let req: QueryRequest = serde_json::from_str(r#"{"query":"modal?"}"#).unwrap();
        assert_eq!(req.query.as_deref(), Some("modal?"));
    }

    #[test]
    fn error_response_shape() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "nope".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"nope"}"#);
    }
}
