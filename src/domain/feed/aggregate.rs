//! Feed Context - Aggregate Root

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{ChannelMeta, FeedEntry};

/// 合并结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 新条目已插入到最前
    Inserted,
    /// guid 已存在，未插入；历史条目全部保留
    Duplicate,
}

/// Feed 聚合根
///
/// 不变量:
/// - 条目按发布时间倒序（最新在前）
/// - guid 唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    channel: ChannelMeta,
    /// 历史 feed 根元素上额外的 `xmlns:*` 声明，原始条目可能依赖它们
    namespaces: Vec<(String, String)>,
    entries: Vec<FeedEntry>,
}

impl Feed {
    pub fn new(channel: ChannelMeta) -> Self {
        Self {
            channel,
            namespaces: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// 以新的频道元数据和历史条目构建
    ///
    /// 历史条目中重复的 guid 只保留第一次出现，其余条目顺序不变
    pub fn with_history(channel: ChannelMeta, history: Vec<FeedEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = history
            .into_iter()
            .filter(|entry| seen.insert(entry.guid.clone()))
            .collect();
        Self {
            channel,
            namespaces: Vec::new(),
            entries,
        }
    }

    /// 保留历史文档声明的命名空间（重复的前缀只保留第一次）
    pub fn with_namespaces(mut self, namespaces: Vec<(String, String)>) -> Self {
        for (prefix, uri) in namespaces {
            if !self.namespaces.iter().any(|(p, _)| *p == prefix) {
                self.namespaces.push((prefix, uri));
            }
        }
        self
    }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.entries.iter().any(|e| e.guid == guid)
    }

    /// 将新条目插入最前；guid 已存在时不做任何修改
    pub fn prepend(&mut self, entry: FeedEntry) -> MergeOutcome {
        if self.contains(&entry.guid) {
            return MergeOutcome::Duplicate;
        }
        self.entries.insert(0, entry);
        MergeOutcome::Inserted
    }

    pub fn channel(&self) -> &ChannelMeta {
        &self.channel
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::feed::ChannelImage;

    pub(crate) fn channel() -> ChannelMeta {
        ChannelMeta {
            title: "Test Radio".to_string(),
            link: "https://cdn.example.com".to_string(),
            description: "News, read aloud".to_string(),
            language: "en-us".to_string(),
            image: ChannelImage {
                url: "https://cdn.example.com/cover.png".to_string(),
                title: "Test Radio".to_string(),
                link: "https://cdn.example.com".to_string(),
            },
        }
    }

    pub(crate) fn entry(guid: &str) -> FeedEntry {
        FeedEntry {
            title: format!("Episode {}", guid),
            guid: guid.to_string(),
            link: Some(guid.to_string()),
            pub_date: Some("Mon, 01 Jan 2024 00:00:00 GMT".to_string()),
            duration: Some("60".to_string()),
            image_url: None,
            description: None,
            enclosure_url: guid.to_string(),
            mime_type: "audio/mpeg".to_string(),
            enclosure_length: None,
            source_xml: None,
        }
    }

    fn guids(feed: &Feed) -> Vec<&str> {
        feed.entries().iter().map(|e| e.guid.as_str()).collect()
    }

    #[test]
    fn test_prepend_new_entry() {
        let mut feed = Feed::with_history(channel(), vec![entry("b"), entry("a")]);
        assert_eq!(feed.prepend(entry("c")), MergeOutcome::Inserted);
        assert_eq!(guids(&feed), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_duplicate_keeps_history() {
        let mut feed = Feed::with_history(channel(), vec![entry("c"), entry("b"), entry("a")]);
        assert_eq!(feed.prepend(entry("c")), MergeOutcome::Duplicate);
        assert_eq!(guids(&feed), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_history_deduplicated() {
        let feed = Feed::with_history(channel(), vec![entry("b"), entry("a"), entry("b")]);
        assert_eq!(guids(&feed), vec!["b", "a"]);
    }
}
