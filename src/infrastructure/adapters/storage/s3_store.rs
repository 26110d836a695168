//! S3 Object Store - S3 兼容存储（如 Cloudflare R2）
//!
//! 实现 ObjectStorePort trait，所有对象以 public-read 上传

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;

use crate::application::ports::{public_object_url, ObjectStorePort, StorageError};

/// S3 存储配置
#[derive(Debug, Clone)]
pub struct S3StoreConfig {
    pub bucket: String,
    /// S3 API endpoint
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// 对象公开访问的 Base URL
    pub public_base_url: String,
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(config: S3StoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key,
            config.secret_key,
            None,
            None,
            "newscast-config",
        );
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .endpoint_url(config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        tracing::info!(bucket = %config.bucket, "S3 object store configured");

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
            public_base_url: config.public_base_url,
        }
    }
}

#[async_trait]
impl ObjectStorePort for S3ObjectStore {
    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::ListFailed(DisplayErrorContext(&e).to_string()))?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(bucket = %self.bucket, count = keys.len(), "Listed objects");
        Ok(keys)
    }

    async fn put_public(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let url = self.public_url(key);
        tracing::info!(bucket = %self.bucket, key, size, url = %url, "Uploaded object");
        Ok(url)
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let store = S3ObjectStore::new(S3StoreConfig {
            bucket: "episodes".to_string(),
            endpoint: "https://account.r2.cloudflarestorage.com".to_string(),
            region: "auto".to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            public_base_url: "https://pub.example.com/".to_string(),
        });
        assert_eq!(
            store.public_url("2024-01-02 News 60s.mp3"),
            "https://pub.example.com/2024-01-02 News 60s.mp3"
        );
    }
}
