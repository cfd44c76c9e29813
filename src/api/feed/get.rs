use crate::api::feed::FeedItemResponse;
use crate::api::ErrorResponse;
use crate::models::FeedItem;
use crate::schema::feed_items;
use crate::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;

#[utoipa::path(
    get,
    path = "/api/feed/{id}",
    tag = "feed",
    params(
        ("id" = i32, Path, description = "Feed item ID")
    ),
    responses(
        (status = 200, description = "Feed item details", body = FeedItemResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Feed item not found", body = ErrorResponse)
    )
)]
pub async fn get_feed_item(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
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

    let item: FeedItem = match feed_items::table
        .find(id)
        .select(FeedItem::as_select())
        .first(&mut conn)
    {
        Ok(item) => item,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Feed item not found with id: {}", id),
                }),
            )
                .into_response()
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch feed item".to_string(),
                }),
            )
                .into_response()
        }
    };

    (StatusCode::OK, Json(FeedItemResponse::from(item))).into_response()
}
