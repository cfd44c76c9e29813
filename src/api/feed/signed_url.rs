use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignedUrlResponse {
    pub url: String,
}

/// `file_name` becomes the key name of the object in the media bucket; the
/// client PUTs the file there, then POSTs the metadata to /api/feed.
#[utoipa::path(
    get,
    path = "/api/feed/signed-url/{file_name}",
    tag = "feed",
    params(
        ("file_name" = String, Path, description = "Key name for the new object")
    ),
    responses(
        (status = 201, description = "Signed PUT URL for uploading", body = SignedUrlResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_upload_url(
    AuthUser(_user): AuthUser,
    State(state): State<SharedState>,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    match state.signer.put_url(&file_name).await {
        Ok(url) => (StatusCode::CREATED, Json(SignedUrlResponse { url })).into_response(),
        Err(e) => {
            tracing::error!("Failed to presign upload URL for {}: {}", file_name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to sign upload URL".to_string(),
                }),
            )
                .into_response()
        }
    }
}
