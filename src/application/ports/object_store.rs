//! Object Store Port - 出站端口
//!
//! 节目音频与 feed 文档都以对象 key 存放在同一个 bucket，
//! 通过公开 Base URL 访问

use async_trait::async_trait;
use thiserror::Error;

/// 对象存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to list objects: {0}")]
    ListFailed(String),

    #[error("Failed to upload {key}: {reason}")]
    UploadFailed { key: String, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// 拼接公开访问 URL
pub fn public_object_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Object Store Port - 出站端口
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// 列出 bucket 中所有对象 key
    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;

    /// 以 public-read 权限上传对象，返回公开 URL
    async fn put_public(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// 对象的公开 URL
    fn public_url(&self, key: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_object_url() {
        assert_eq!(
            public_object_url("https://cdn.example.com/", "/podcast.xml"),
            "https://cdn.example.com/podcast.xml"
        );
        assert_eq!(
            public_object_url("https://cdn.example.com", "a b.mp3"),
            "https://cdn.example.com/a b.mp3"
        );
    }
}
