//! Feed 同步发布
//!
//! 读取已发布的 feed，按 guid 合并新节目，重新生成并上传。
//! 读取或解析失败都按「没有历史」处理。

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::error::PipelineError;
use crate::application::ports::{FeedSourcePort, ObjectStorePort};
use crate::domain::feed::{
    parse_feed, write_feed, ChannelMeta, Feed, FeedEntry, FeedHistory, MergeOutcome,
};

/// feed 文档的 Content-Type
pub const FEED_CONTENT_TYPE: &str = "application/rss+xml";

/// 发布设置
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// 频道元数据，每次从配置重建
    pub channel: ChannelMeta,
    /// 本地节目资源目录（新节目的发布时间取自其中文件的修改时间）
    pub assets_dir: PathBuf,
    /// feed 文件名，同时是对象 key
    pub feed_filename: String,
}

/// 待发布的新节目
#[derive(Debug, Clone)]
pub struct NewEpisode {
    /// 节目公开 URL（即 guid）
    pub url: String,
    pub title: String,
    pub duration_seconds: u64,
    pub image_url: String,
}

pub struct FeedSynchronizer {
    source: Arc<dyn FeedSourcePort>,
    store: Arc<dyn ObjectStorePort>,
    settings: FeedSettings,
}

impl FeedSynchronizer {
    pub fn new(
        source: Arc<dyn FeedSourcePort>,
        store: Arc<dyn ObjectStorePort>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    /// 读取历史条目（尽力而为）
    async fn load_history(&self) -> FeedHistory {
        let location = self.source.location();
        let body = match self.source.fetch().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "No prior feed, starting fresh");
                return FeedHistory::default();
            }
        };

        match parse_feed(&body) {
            Ok(history) => {
                tracing::info!(
                    location = %location,
                    items = history.entries.len(),
                    "Loaded prior feed"
                );
                history
            }
            Err(e) => {
                tracing::warn!(
                    location = %location,
                    error = %e,
                    "Prior feed unreadable, starting fresh"
                );
                FeedHistory::default()
            }
        }
    }

    /// 合并新节目，返回合并后的 feed（不上传）
    pub async fn sync(&self, episode: &NewEpisode) -> Result<(Feed, MergeOutcome), PipelineError> {
        let history = self.load_history().await;
        let mut feed = Feed::with_history(self.settings.channel.clone(), history.entries)
            .with_namespaces(history.namespaces);

        if feed.contains(&episode.url) {
            tracing::info!(guid = %episode.url, "Episode already in feed, keeping history as is");
            return Ok((feed, MergeOutcome::Duplicate));
        }

        let asset_name = episode.url.rsplit('/').next().unwrap_or(&episode.url);
        let asset = self.settings.assets_dir.join(asset_name);
        let metadata = match tokio::fs::metadata(&asset).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::not_found("Episode asset", &asset));
            }
            Err(e) => return Err(PipelineError::io(format!("reading {}", asset.display()), e)),
        };
        let published_at: DateTime<Utc> = metadata
            .modified()
            .map_err(|e| PipelineError::io("reading asset modification time", e))?
            .into();

        let entry = FeedEntry::new_episode(
            episode.url.clone(),
            episode.title.clone(),
            episode.duration_seconds,
            episode.image_url.clone(),
            published_at,
            Some(metadata.len()),
        );
        let outcome = feed.prepend(entry);
        Ok((feed, outcome))
    }

    /// 合并、写入本地副本并以 public-read 上传
    pub async fn publish(&self, episode: &NewEpisode) -> Result<Feed, PipelineError> {
        let (feed, outcome) = self.sync(episode).await?;
        let document = write_feed(&feed)?;

        let local = self.settings.assets_dir.join(&self.settings.feed_filename);
        tokio::fs::write(&local, &document)
            .await
            .map_err(|e| PipelineError::io(format!("writing {}", local.display()), e))?;

        let url = self
            .store
            .put_public(&self.settings.feed_filename, document, FEED_CONTENT_TYPE)
            .await?;

        tracing::info!(
            url = %url,
            entries = feed.len(),
            outcome = ?outcome,
            "Feed published"
        );
        Ok(feed)
    }
}
