use crate::api::feed::FeedItemResponse;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::models::FeedItem;
use crate::schema::feed_items;
use crate::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateFeedItemRequest {
    pub caption: Option<String>,
    pub url: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = feed_items)]
struct FeedItemChanges<'a> {
    caption: Option<&'a str>,
    url: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

impl UpdateFeedItemRequest {
    /// Absent and empty fields are both left untouched; updated_at always
    /// moves forward.
    fn changes(&self) -> FeedItemChanges<'_> {
        FeedItemChanges {
            caption: self.caption.as_deref().filter(|c| !c.is_empty()),
            url: self.url.as_deref().filter(|u| !u.is_empty()),
            updated_at: Utc::now(),
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/feed/{id}",
    tag = "feed",
    params(
        ("id" = i32, Path, description = "Feed item ID")
    ),
    request_body = UpdateFeedItemRequest,
    responses(
        (status = 201, description = "Feed item updated", body = FeedItemResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Feed item not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_feed_item(
    AuthUser(_user): AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateFeedItemRequest>,
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

    let item: FeedItem = match diesel::update(feed_items::table.find(id))
        .set(&request.changes())
        .returning(FeedItem::as_returning())
        .get_result(&mut conn)
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
        Err(e) => {
            tracing::error!("Failed to update feed item {}: {}", id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update feed item".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::CREATED, Json(FeedItemResponse::from(item))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_do_not_overwrite_stored_fields() {
        let request = UpdateFeedItemRequest {
            caption: Some(String::new()),
            url: Some(String::new()),
        };
        let changes = request.changes();
        assert!(changes.caption.is_none());
        assert!(changes.url.is_none());
    }

    #[test]
    fn provided_fields_are_carried_into_the_changeset() {
        let request = UpdateFeedItemRequest {
            caption: Some("new caption".to_string()),
            url: None,
        };
        let changes = request.changes();
        assert_eq!(changes.caption, Some("new caption"));
        assert!(changes.url.is_none());
    }

    #[test]
    fn updated_at_is_always_refreshed() {
        let before = Utc::now();
        let request = UpdateFeedItemRequest {
            caption: None,
            url: None,
        };
        assert!(request.changes().updated_at >= before);
    }
}
