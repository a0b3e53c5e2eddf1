//! Request handlers.
//!
//! Each handler validates its input with an explicit parse step, calls the
//! note adapter, and maps the outcome to a response. No state is kept
//! between requests.

use std::borrow::Cow;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::Json;
use percent_encoding::percent_decode_str;

use super::error::ApiError;
use super::AppState;
use crate::note::{Note, PayloadError, Selector};

/// Body returned by successful writes.
pub const OK_BODY: &str = "Ok";

/// Body returned by the health check.
pub const HEALTHY_BODY: &str = "Healthy: OK";

/// Query string accepted by the note endpoint.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NoteQuery {
    /// Title of the note to fetch.
    pub data: Option<String>,
}

impl NoteQuery {
    /// Parse a raw `application/x-www-form-urlencoded` query string.
    ///
    /// Unknown keys are ignored. A repeated `data` key, a stray `%` or a
    /// value that does not decode to UTF-8 is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::MalformedQuery`] describing the bad input.
    pub fn parse(raw: Option<&str>) -> Result<Self, PayloadError> {
        let mut query = Self::default();
        for pair in raw.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if decode_component(key)? != "data" {
                continue;
            }
            if query.data.is_some() {
                return Err(PayloadError::MalformedQuery(
                    "duplicate field `data`".to_string(),
                ));
            }
            query.data = Some(decode_component(value)?);
        }
        Ok(query)
    }
}

fn decode_component(raw: &str) -> Result<String, PayloadError> {
    let bytes = raw.as_bytes();
    for (at, _) in raw.match_indices('%') {
        let escaped = bytes
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !escaped {
            return Err(PayloadError::MalformedQuery(format!(
                "invalid percent escape in `{raw}`"
            )));
        }
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| PayloadError::MalformedQuery(e.to_string()))
}

/// `GET|POST /` — titles of every note.
pub async fn list_titles(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.notes.list_titles().await)
}

/// `GET|POST /notes?data=<title>` — a note, or the placeholder.
pub async fn get_note(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Note>, ApiError> {
    let query = NoteQuery::parse(raw.as_deref())?;
    Ok(Json(
        state.notes.find_or_placeholder(query.data.as_deref()).await,
    ))
}

/// `POST /save` — insert or replace a note keyed by title.
pub async fn save_note(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let note = Note::from_json(&body)?;
    state.notes.upsert(&note).await?;
    Ok(OK_BODY)
}

/// `POST /delete` — remove the first note matching the body.
pub async fn delete_note(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let selector = Selector::from_json(&body)?;
    state.notes.delete(&selector).await?;
    Ok(OK_BODY)
}

/// `GET /health` — liveness, independent of the store.
pub async fn health() -> &'static str {
    HEALTHY_BODY
}
