//! Feed Adapter - feed 文档来源

mod feed_source;

pub use feed_source::{FileFeedSource, HttpFeedSource};
