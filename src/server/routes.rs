//! HTTP routes
//!
//! Thin adapter between HTTP requests and the storage and protocol layers.
//! Blocking file system work runs on tokio's blocking pool.

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::handlers::handle_error;
use crate::error::{FieldErrors, ServiceError, StorageError};
use crate::protocol::handlers::{ActionParams, parse_flag};
use crate::protocol::responses::{ActionBody, MessageBody, error_response};
use crate::protocol::dispatch;
use crate::storage::{self, validate_path};

pub const PATH_FIELD: &str = "Path";
pub const DOWNLOAD_FIELD: &str = "Download";

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveQuery {
    path: Option<String>,
    download: Option<String>,
}

/// Builds the service router
pub fn router(config: Arc<ServiceConfig>) -> Router {
    Router::new()
        .route("/api/fs/file", get(retrieve_file))
        .route("/api/fs/drives", get(list_drives))
        .route("/api/fs/action", post(run_action))
        .with_state(AppState { config })
}

/// Streams a file back with its media type and disposition
async fn retrieve_file(State(state): State<AppState>, Query(query): Query<RetrieveQuery>) -> Response {
    let path = match validate_path(PATH_FIELD, query.path.as_deref(), state.config.max_path_length) {
        Ok(path) => path,
        Err(errors) => return error_reply(&errors.into()),
    };

    let download = match parse_flag(query.download.as_deref()) {
        Ok(download) => download,
        Err(raw) => {
            let mut errors = FieldErrors::new();
            errors.add(
                DOWNLOAD_FIELD,
                format!("The value '{}' is not valid for {}.", raw, DOWNLOAD_FIELD),
            );
            return error_reply(&errors.into());
        }
    };

    let descriptor = match storage::resolve(&path, download).await {
        Ok(descriptor) => descriptor,
        Err(e) => return error_reply(&e.into()),
    };

    let headers = [
        (header::CONTENT_TYPE, descriptor.media_type.clone()),
        (header::CONTENT_DISPOSITION, descriptor.content_disposition()),
        (header::CONTENT_LENGTH, descriptor.length.to_string()),
    ];

    info!("Serving {} ({} bytes)", path, descriptor.length);

    // Dropping the body, including on client disconnect, closes the file
    let body = Body::from_stream(descriptor.into_stream(state.config.stream_buffer_size));
    (StatusCode::OK, headers, body).into_response()
}

/// Lists the drives visible to the host
async fn list_drives() -> Response {
    match tokio::task::spawn_blocking(storage::list_drives).await {
        Ok(drives) => (StatusCode::OK, Json(drives)).into_response(),
        Err(e) => error_reply(&io::Error::other(e.to_string()).into()),
    }
}

/// Runs an action request
async fn run_action(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            let reply = MessageBody {
                message: rejection.body_text(),
            };
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    let mut params = action_params(body);
    let action_key = params
        .keys()
        .find(|key| key.eq_ignore_ascii_case("action"))
        .cloned();
    let action = action_key.and_then(|key| params.remove(&key));

    let config = Arc::clone(&state.config);
    let outcome =
        tokio::task::spawn_blocking(move || dispatch(action.as_deref(), &params, &config)).await;

    match outcome {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(ActionBody::from(&outcome))).into_response(),
        Ok(Err(e)) => error_reply(&e),
        Err(e) => {
            error!("Action task failed: {}", e);
            error_reply(&ServiceError::Storage(StorageError::Io(io::Error::other(e.to_string()))))
        }
    }
}

/// Flattens a JSON object into string parameters; nulls count as absent
fn action_params(body: Map<String, Value>) -> ActionParams {
    body.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

fn error_reply(err: &ServiceError) -> Response {
    handle_error(err);
    let (status, body) = error_response(err);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}
