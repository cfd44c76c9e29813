use crate::api::feed::FeedItemResponse;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::models::{FeedItem, NewFeedItem};
use crate::schema::feed_items;
use crate::SharedState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::ToSchema;

/// Metadata posted after a file has been uploaded. `url` is the key name of
/// the object in the media bucket.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFeedItemRequest {
    pub caption: Option<String>,
    pub url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/feed",
    tag = "feed",
    request_body = CreateFeedItemRequest,
    responses(
        (status = 201, description = "Feed item created, url signed for reading", body = FeedItemResponse),
        (status = 400, description = "Missing caption or url", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_feed_item(
    AuthUser(_user): AuthUser,
    State(state): State<SharedState>,
    Json(request): Json<CreateFeedItemRequest>,
) -> impl IntoResponse {
    let caption = match request.caption.as_deref() {
        Some(c) if !c.trim().is_empty() => c,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Caption is required or malformed".to_string(),
                }),
            )
                .into_response()
        }
    };

    let url = match request.url.as_deref() {
        Some(u) if !u.trim().is_empty() => u,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "File url is required".to_string(),
                }),
            )
                .into_response()
        }
    };

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

    let new_item = NewFeedItem { caption, url };

    // The bare key goes to the database; only the response gets a signed URL
    let item: FeedItem = match diesel::insert_into(feed_items::table)
        .values(&new_item)
        .returning(FeedItem::as_returning())
        .get_result(&mut conn)
    {
        Ok(item) => item,
        Err(e) => {
            tracing::error!("Failed to create feed item: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create feed item".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut response = FeedItemResponse::from(item);
    response.url = match state.signer.get_url(&response.url).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Failed to sign URL for feed item {}: {}", response.id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to sign photo URL".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::feed::tests::{body_text, test_state};
    use crate::models::User;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    // The test state's pool is never connected, so a 400 here also proves the
    // handler bails out before touching the database.
    #[tokio::test]
    async fn missing_caption_is_rejected_without_persisting() {
        let request = CreateFeedItemRequest {
            caption: None,
            url: Some("photo.jpg".to_string()),
        };

        let response =
            create_feed_item(AuthUser(test_user()), State(test_state()), Json(request))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Caption is required"));
    }

    #[tokio::test]
    async fn blank_caption_is_rejected_without_persisting() {
        let request = CreateFeedItemRequest {
            caption: Some("   ".to_string()),
            url: Some("photo.jpg".to_string()),
        };

        let response =
            create_feed_item(AuthUser(test_user()), State(test_state()), Json(request))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_url_is_rejected_without_persisting() {
        let request = CreateFeedItemRequest {
            caption: Some("sunset".to_string()),
            url: None,
        };

        let response =
            create_feed_item(AuthUser(test_user()), State(test_state()), Json(request))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("File url is required"));
    }
}
