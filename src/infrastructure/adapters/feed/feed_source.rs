//! Feed Source - 读取已发布的 feed 文档
//!
//! - HttpFeedSource: 通过公开 URL 获取（生产环境）
//! - FileFeedSource: 读取本地文件（配合 FileObjectStore 使用）

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::application::ports::{FeedFetchError, FeedSourcePort};

pub struct HttpFeedSource {
    client: Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedFetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedFetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSourcePort for HttpFeedSource {
    async fn fetch(&self) -> Result<String, FeedFetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedFetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FeedFetchError::NotFound(self.url.clone()));
        }
        if !status.is_success() {
            return Err(FeedFetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FeedFetchError::Network(e.to_string()))
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

pub struct FileFeedSource {
    path: PathBuf,
}

impl FileFeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSourcePort for FileFeedSource {
    async fn fetch(&self) -> Result<String, FeedFetchError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FeedFetchError::NotFound(self.location()))
            }
            Err(e) => Err(FeedFetchError::Io(e.to_string())),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
