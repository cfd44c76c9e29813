pub mod create;
pub mod get;
pub mod list;
pub mod signed_url;
pub mod update;

use crate::models::FeedItem;
use crate::SharedState;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Returns the router for feed endpoints (mounted at /api/feed)
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list::list_feed).post(create::create_feed_item))
        .route("/signed-url/{file_name}", get(signed_url::get_upload_url))
        .route(
            "/{id}",
            get(get::get_feed_item).patch(update::update_feed_item),
        )
}

/// A feed item as returned to clients. On the list and create paths `url`
/// carries a signed GET URL instead of the stored key.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedItemResponse {
    pub id: i32,
    pub caption: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FeedItem> for FeedItemResponse {
    fn from(item: FeedItem) -> Self {
        Self {
            id: item.id,
            caption: item.caption,
            url: item.url,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_feed,
        get::get_feed_item,
        create::create_feed_item,
        update::update_feed_item,
        signed_url::get_upload_url,
    ),
    components(schemas(
        FeedItemResponse,
        list::ListFeedResponse,
        create::CreateFeedItemRequest,
        update::UpdateFeedItemRequest,
        signed_url::SignedUrlResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::tests::test_signer;
    use crate::AppState;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use diesel::r2d2::ConnectionManager;
    use diesel::PgConnection;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// State with a pool that is never connected. Good enough for exercising
    /// routing and the pre-database rejection paths.
    pub(crate) fn test_state() -> crate::SharedState {
        let manager = ConnectionManager::<PgConnection>::new("postgres://localhost/unused");
        let pool = diesel::r2d2::Pool::builder()
            .min_idle(Some(0))
            .build_unchecked(manager);
        Arc::new(AppState {
            pool,
            signer: test_signer(),
        })
    }

    fn test_app() -> Router {
        Router::new()
            .nest("/api/feed", router())
            .with_state(test_state())
    }

    pub(crate) async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn non_integer_id_is_rejected_before_the_handler() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/feed/not-a-number")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_without_token_is_unauthorized() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri("/api/feed/1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"caption":"new"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("Missing Authorization"));
    }

    #[tokio::test]
    async fn post_without_token_is_unauthorized() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/feed")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"caption":"c","url":"k.jpg"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signed_url_rejects_malformed_auth_header() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/feed/signed-url/photo.jpg")
                    .header("authorization", "Token abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response)
            .await
            .contains("Invalid Authorization header format"));
    }

    #[test]
    fn response_preserves_optional_caption() {
        let item = FeedItem {
            id: 7,
            caption: None,
            url: "k.jpg".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = FeedItemResponse::from(item);
        assert_eq!(response.id, 7);
        assert!(response.caption.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["url"], "k.jpg");
        assert!(json["caption"].is_null());
    }
}
