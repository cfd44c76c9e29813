use crate::api::feed::FeedItemResponse;
use crate::api::ErrorResponse;
use crate::models::FeedItem;
use crate::schema::feed_items;
use crate::SharedState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListFeedResponse {
    pub count: i64,
    pub rows: Vec<FeedItemResponse>,
}

#[utoipa::path(
    get,
    path = "/api/feed",
    tag = "feed",
    responses(
        (status = 200, description = "All feed items, newest first, with signed photo URLs", body = ListFeedResponse)
    )
)]
pub async fn list_feed(State(state): State<SharedState>) -> impl IntoResponse {
    let mut conn = match state.pool.get() {
        Ok(c) => c,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Database connection failed".to_string(),
                }),
            )
                .into_response()
        }
    };

    let items: Vec<FeedItem> = match feed_items::table
        .select(FeedItem::as_select())
        .order(feed_items::id.desc())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch feed".to_string(),
                }),
            )
                .into_response()
        }
    };

    let count = items.len() as i64;

    // Swap each stored key for a time-limited signed GET URL
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let mut row = FeedItemResponse::from(item);
        row.url = match state.signer.get_url(&row.url).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Failed to sign URL for feed item {}: {}", row.id, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to sign photo URL".to_string(),
                    }),
                )
                    .into_response();
            }
        };
        rows.push(row);
    }

    (StatusCode::OK, Json(ListFeedResponse { count, rows })).into_response()
}
