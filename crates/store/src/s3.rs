//! S3-compatible object store.
//!
//! Works against AWS S3 as well as any S3-compatible service (MinIO,
//! Cloudflare R2, localstack) via a custom endpoint.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::error::{Result, StoreError};
use crate::{Credentials, ObjectStore};

/// Connection settings for [`S3Store`].
#[derive(Debug, Clone)]
pub struct S3Config {
    /// AWS region, `us-east-1` unless overridden.
    pub region: String,
    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
    /// Path-style addressing. Defaults to on when a custom endpoint is set,
    /// off against AWS proper.
    pub force_path_style: Option<bool>,
    pub credentials: Credentials,
}

impl S3Config {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            force_path_style: None,
            credentials,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_force_path_style(mut self, force: bool) -> Self {
        self.force_path_style = Some(force);
        self
    }
}

/// Object store backed by the AWS S3 SDK.
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Builds a client from `config`. Nothing is verified up front; the
    /// first `put` surfaces connectivity and credential problems.
    pub async fn new(config: S3Config) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            &config.credentials.access_key_id,
            &config.credentials.secret_access_key,
            None,
            None,
            "gantry",
        );
        let region_provider = RegionProviderChain::first_try(Region::new(config.region.clone()));
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(config.force_path_style.unwrap_or(true));
        } else {
            builder = builder.force_path_style(config.force_path_style.unwrap_or(false));
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wraps an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StoreError::upload(bucket, key, err))?;
        tracing::debug!(bucket = %bucket, key = %key, size, "object uploaded");
        Ok(())
    }
}
