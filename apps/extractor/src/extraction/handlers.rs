//! Axum route handler for the extraction endpoint.

use axum::{extract::State, response::IntoResponse, Form, Json};
use serde::Deserialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extractor::run_extraction;
use crate::state::AppState;

pub const ATTEMPTS_HEADER: &str = "x-extraction-attempts";

#[derive(Debug, Deserialize)]
pub struct ExtractForm {
    pub text: String,
}

/// POST /extract
///
/// Form-encoded `text` field in, the parsed JSON value out.
/// The number of backend calls it took is reported in `x-extraction-attempts`.
/// An empty `text` is rejected like a missing one, before any backend call.
pub async fn handle_extract(
    State(state): State<AppState>,
    Form(form): Form<ExtractForm>,
) -> Result<impl IntoResponse, AppError> {
    if form.text.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("extract", %request_id, input_chars = form.text.len());

    let extraction = run_extraction(
        state.backend.as_ref(),
        &state.config.extractor.extraction,
        &form.text,
    )
    .instrument(span)
    .await?;

    Ok((
        [(ATTEMPTS_HEADER, extraction.attempts.to_string())],
        Json(extraction.value),
    ))
}
