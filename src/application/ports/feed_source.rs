//! Feed Source Port - 读取已发布的 feed 文档

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedFetchError {
    #[error("Feed not found at {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(String),
}

/// Feed Source Port
///
/// 读取失败由调用方按「没有历史」处理
#[async_trait]
pub trait FeedSourcePort: Send + Sync {
    /// 获取当前已发布的 feed 文档原文
    async fn fetch(&self) -> Result<String, FeedFetchError>;

    /// 文档位置（用于日志）
    fn location(&self) -> String;
}
