//! Feed Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 新节目的 MIME 类型
pub const EPISODE_MIME_TYPE: &str = "audio/mpeg";

/// RFC 2822 日期（GMT），与 RSS pubDate 要求一致
pub fn format_rfc2822_gmt(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// 频道图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelImage {
    pub url: String,
    pub title: String,
    pub link: String,
}

/// 频道元数据
///
/// 每次发布都从当前配置重新生成，不从历史 feed 继承
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub image: ChannelImage,
}

/// Feed 条目
///
/// 不变量:
/// - guid 在 feed 内唯一（新条目的 guid 即节目 URL）
/// - 历史条目带有原始 `<item>` 片段，重新发布时逐字节写回
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub guid: String,
    pub link: Option<String>,
    /// RFC 2822 发布时间
    pub pub_date: Option<String>,
    /// itunes:duration（新条目为整数秒）
    pub duration: Option<String>,
    /// itunes:image
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub enclosure_url: String,
    pub mime_type: String,
    pub enclosure_length: Option<u64>,
    /// 历史 feed 中的原始 `<item>...</item>`；新条目为 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_xml: Option<String>,
}

impl FeedEntry {
    /// 创建新节目条目: guid = link = enclosure = 节目 URL
    pub fn new_episode(
        episode_url: impl Into<String>,
        title: impl Into<String>,
        duration_seconds: u64,
        image_url: impl Into<String>,
        published_at: DateTime<Utc>,
        enclosure_length: Option<u64>,
    ) -> Self {
        let url = episode_url.into();
        Self {
            title: title.into(),
            guid: url.clone(),
            link: Some(url.clone()),
            pub_date: Some(format_rfc2822_gmt(published_at)),
            duration: Some(duration_seconds.to_string()),
            image_url: Some(image_url.into()),
            description: None,
            enclosure_url: url,
            mime_type: EPISODE_MIME_TYPE.to_string(),
            enclosure_length,
            source_xml: None,
        }
    }

    /// 去掉原始片段，只比较字段
    pub fn without_source(&self) -> Self {
        Self {
            source_xml: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc2822_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(format_rfc2822_gmt(time), "Tue, 05 Mar 2024 07:08:09 GMT");
    }

    #[test]
    fn test_new_episode_identity() {
        let time = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let entry = FeedEntry::new_episode(
            "https://cdn.example.com/ep.mp3",
            "Episode",
            321,
            "https://cdn.example.com/ep.png",
            time,
            Some(1024),
        );
        assert_eq!(entry.guid, entry.enclosure_url);
        assert_eq!(entry.link.as_deref(), Some("https://cdn.example.com/ep.mp3"));
        assert_eq!(entry.duration.as_deref(), Some("321"));
        assert_eq!(entry.mime_type, "audio/mpeg");
        assert!(entry.source_xml.is_none());
    }
}
