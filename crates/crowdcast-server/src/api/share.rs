use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use crowdcast_core::{render_share_card, ShareCard};
use crowdcast_db::DbError;
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct ShareQuery {
    poll: Option<String>,
}

/// Serve the SVG preview card for a poll.
pub(super) async fn og_image(
    State(state): State<AppState>,
    Query(query): Query<ShareQuery>,
) -> Response {
    let Some(raw) = query.poll.as_deref().filter(|s| !s.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing poll ID").into_response();
    };
    let Ok(poll_id) = Uuid::parse_str(raw) else {
        return (StatusCode::BAD_REQUEST, "Invalid poll ID").into_response();
    };

    match crowdcast_db::get_poll_share_card(&state.pool, poll_id).await {
        Ok(row) => {
            let svg = render_share_card(&ShareCard {
                question: row.question,
                category: row.category,
                total_votes: i64::from(row.total_votes),
                creator_username: row.creator_username,
            });
            (
                [
                    (header::CONTENT_TYPE, "image/svg+xml"),
                    (header::CACHE_CONTROL, "public, max-age=3600"),
                ],
                svg,
            )
                .into_response()
        }
        Err(DbError::NotFound) => (StatusCode::NOT_FOUND, "Poll not found").into_response(),
        Err(e) => {
            tracing::error!(%poll_id, error = %e, "share card: poll lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render share card").into_response()
        }
    }
}
