//! Presigned-URL helper for the media bucket.
//!
//! Feed items store the bare object key; clients only ever see time-limited
//! signed URLs minted here. GET URLs let them view photos, PUT URLs let them
//! upload new ones.

use aws_sdk_s3::presigning::{PresigningConfig, PresigningConfigError};
use aws_sdk_s3::Client;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default lifetime of a signed URL (five minutes).
pub const DEFAULT_EXPIRY_SECS: u64 = 300;

#[derive(Error, Debug)]
pub enum SignUrlError {
    #[error("Invalid presigning expiry: {0}")]
    Config(#[from] PresigningConfigError),

    #[error("Failed to presign request: {0}")]
    Presign(String),
}

#[derive(Clone)]
pub struct UrlSigner {
    client: Client,
    bucket: String,
    expires_in: Duration,
}

impl UrlSigner {
    pub fn new(client: Client, bucket: String, expires_in: Duration) -> Self {
        Self {
            client,
            bucket,
            expires_in,
        }
    }

    /// Builds a signer from the standard AWS environment. MEDIA_BUCKET is
    /// required; SIGNED_URL_EXPIRY_SECS overrides the default lifetime.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let bucket = env::var("MEDIA_BUCKET").expect("MEDIA_BUCKET must be set");
        let expires_in = env::var("SIGNED_URL_EXPIRY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_EXPIRY_SECS));

        Self::new(client, bucket, expires_in)
    }

    /// Time-limited URL granting read access to `key`.
    pub async fn get_url(&self, key: &str) -> Result<String, SignUrlError> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(self.expires_in)?)
            .await
            .map_err(|e| SignUrlError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Time-limited URL granting write access to `key`, for uploads.
    pub async fn put_url(&self, key: &str) -> Result<String, SignUrlError> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(self.expires_in)?)
            .await
            .map_err(|e| SignUrlError::Presign(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    // Presigning is pure computation once credentials are in hand, so these
    // tests run offline against static test credentials.
    pub(crate) fn test_signer() -> UrlSigner {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new(
                "test-access-key",
                "test-secret-key",
                None,
                None,
                "static",
            ))
            .build();

        UrlSigner::new(
            Client::from_conf(config),
            "photo-bucket".to_string(),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn get_url_is_signed_and_scoped_to_key() {
        let signer = test_signer();
        let url = signer.get_url("vacation.jpg").await.unwrap();

        assert!(url.contains("photo-bucket"));
        assert!(url.contains("vacation.jpg"));
        assert!(url.contains("X-Amz-Expires=300"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn put_url_differs_from_get_url_for_same_key() {
        let signer = test_signer();
        let get = signer.get_url("cat.png").await.unwrap();
        let put = signer.put_url("cat.png").await.unwrap();

        // Different HTTP methods are baked into the signature
        assert_ne!(get, put);
    }

    #[tokio::test]
    async fn signed_url_differs_from_bare_key() {
        let signer = test_signer();
        let url = signer.get_url("key-name.jpg").await.unwrap();
        assert_ne!(url, "key-name.jpg");
        assert!(url.starts_with("https://"));
    }
}
