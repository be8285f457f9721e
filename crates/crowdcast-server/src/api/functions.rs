//! Job trigger endpoints.
//!
//! Bodies are plain JSON (no envelope) so existing callers of the
//! serverless functions keep working. An empty request body is accepted
//! wherever every field is optional.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use crowdcast_core::AchievementEvent;
use crowdcast_jobs::{AchievementOutcome, JobError, StreakReport, TrendingOutcome};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use uuid::Uuid;

use super::AppState;

#[derive(Debug)]
pub(super) enum FunctionError {
    BadRequest(&'static str),
    Job(JobError),
}

impl From<JobError> for FunctionError {
    fn from(e: JobError) -> Self {
        FunctionError::Job(e)
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        match self {
            FunctionError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            FunctionError::Job(e) => {
                tracing::error!(error = %e, "function run failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct StreakRequest {
    user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AchievementRequest {
    user_id: Option<String>,
    event_type: Option<String>,
}

fn parse_optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, FunctionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| FunctionError::BadRequest("invalid JSON body"))
}

fn parse_user_id(raw: &str) -> Result<Uuid, FunctionError> {
    Uuid::parse_str(raw.trim()).map_err(|_| FunctionError::BadRequest("user_id must be a UUID"))
}

pub(super) async fn update_trending(
    State(state): State<AppState>,
) -> Result<Json<TrendingOutcome>, FunctionError> {
    let outcome = crowdcast_jobs::run_trending(&state.pool, Utc::now()).await?;
    Ok(Json(outcome))
}

pub(super) async fn update_streaks(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StreakReport>, FunctionError> {
    let request: StreakRequest = parse_optional_body(&body)?;
    let today = Utc::now().date_naive();

    let report = match request.user_id.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => {
            let user_id = parse_user_id(raw)?;
            crowdcast_jobs::update_user_streak(&state.pool, user_id, today).await?;
            StreakReport::Updated { updated: user_id }
        }
        None => StreakReport::Reset {
            reset: crowdcast_jobs::reset_broken_streaks(&state.pool, today).await?,
        },
    };

    Ok(Json(report))
}

pub(super) async fn grant_achievements(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AchievementOutcome>, FunctionError> {
    let request: AchievementRequest = parse_optional_body(&body)?;

    let raw = request
        .user_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(FunctionError::BadRequest("user_id required"))?;
    let user_id = parse_user_id(raw)?;
    let event = AchievementEvent::from_hint(request.event_type.as_deref());

    let outcome = crowdcast_jobs::grant_achievements(&state.pool, user_id, event).await?;
    Ok(Json(outcome))
}
