//! Feed Context - 播客 RSS feed
//!
//! 职责:
//! - Feed 聚合（按 guid 合并、最新在前）
//! - 条目与频道元数据
//! - RSS 2.0 + iTunes 命名空间读写

mod aggregate;
mod entities;
mod errors;
pub mod rss;

pub use aggregate::{Feed, MergeOutcome};
pub use entities::{format_rfc2822_gmt, ChannelImage, ChannelMeta, FeedEntry, EPISODE_MIME_TYPE};
pub use errors::FeedError;
pub use rss::{parse_feed, write_feed, FeedHistory};

#[cfg(test)]
pub(crate) use aggregate::tests as aggregate_fixtures;
