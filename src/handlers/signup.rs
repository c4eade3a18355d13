use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    domain::signup::{CreateSignupError, SignupRecord},
    errors::code_error::{CodeError, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

/// Stores the submitted form as-is. 201 echoes the record, 409 means the key
/// is already taken.
pub async fn signup_handler(
    Extension(request_received_time): Extension<DateTime<Utc>>,
    State(state): State<Arc<ServerState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> HandlerResponse<Response> {
    let start = tokio_now();

    let record = SignupRecord::from_pairs(fields);

    match state.get_signup_store().create(&record).await {
        Ok(()) => {
            info!(
                attributes = record.len(),
                received_at = %request_received_time,
                duration = ?start.elapsed(),
                "Signup stored"
            );
            Ok((StatusCode::CREATED, Json(record)).into_response())
        }
        Err(CreateSignupError::DuplicateKey) => {
            warn!(
                received_at = %request_received_time,
                duration = ?start.elapsed(),
                "Signup rejected, key already exists"
            );
            Ok((
                StatusCode::CONFLICT,
                [(header::CONTENT_TYPE, "application/json")],
            )
                .into_response())
        }
        Err(CreateSignupError::Store(e)) => Err(code_err(CodeError::STORE_ERROR, e)),
    }
}
