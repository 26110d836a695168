//! RSS 2.0 读写
//!
//! 只读取历史 `<item>`，频道信息每次重新生成。
//! 历史条目保留原始 XML 片段原样写回，未知子元素和属性不会丢失。
//! 新条目的 duration / image 使用 iTunes 播客命名空间。

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{Feed, FeedEntry, FeedError, EPISODE_MIME_TYPE};

pub const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";

/// 解析历史 feed 得到的内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedHistory {
    /// 文档顺序的条目，每条带原始 `<item>` 片段
    pub entries: Vec<FeedEntry>,
    /// 根元素上除 itunes 外的 `xmlns:*` 声明 (prefix, uri)
    pub namespaces: Vec<(String, String)>,
}

/// 解析中的条目
#[derive(Debug, Default)]
struct ItemBuilder {
    start: usize,
    title: Option<String>,
    guid: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    duration: Option<String>,
    image_url: Option<String>,
    description: Option<String>,
    enclosure_url: Option<String>,
    mime_type: Option<String>,
    enclosure_length: Option<u64>,
}

impl ItemBuilder {
    /// 按限定名匹配，`<itunes:title>` 之类的扩展元素不会覆盖 `<title>`
    fn set_text(&mut self, element: &str, text: String) {
        match element {
            "title" => self.title = Some(text),
            "guid" => self.guid = Some(text),
            "link" => self.link = Some(text),
            "pubDate" => self.pub_date = Some(text),
            "itunes:duration" => self.duration = Some(text),
            "itunes:image" => self.image_url = Some(text),
            "description" => self.description = Some(text),
            _ => {}
        }
    }

    fn set_attributes(&mut self, element: &str, e: &BytesStart<'_>) {
        match element {
            "enclosure" => {
                self.enclosure_url = attribute(e, "url");
                self.mime_type = attribute(e, "type");
                self.enclosure_length = attribute(e, "length").and_then(|v| v.parse().ok());
            }
            "itunes:image" => {
                if let Some(href) = attribute(e, "href") {
                    self.image_url = Some(href);
                }
            }
            _ => {}
        }
    }

    /// guid 缺失时依次回退到 enclosure url、link
    fn build(self, source_xml: Option<String>) -> Option<FeedEntry> {
        let guid = self
            .guid
            .clone()
            .or_else(|| self.enclosure_url.clone())
            .or_else(|| self.link.clone())?;

        Some(FeedEntry {
            title: self.title.unwrap_or_default(),
            enclosure_url: self.enclosure_url.unwrap_or_else(|| guid.clone()),
            mime_type: self
                .mime_type
                .unwrap_or_else(|| EPISODE_MIME_TYPE.to_string()),
            guid,
            link: self.link,
            pub_date: self.pub_date,
            duration: self.duration,
            image_url: self.image_url,
            description: self.description,
            enclosure_length: self.enclosure_length,
            source_xml,
        })
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// 根元素上的额外命名空间声明
fn extra_namespaces(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.attributes()
        .flatten()
        .filter_map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            let prefix = key.strip_prefix("xmlns:")?.to_string();
            if prefix == "itunes" {
                return None;
            }
            let uri = a.unescape_value().ok()?.into_owned();
            Some((prefix, uri))
        })
        .collect()
}

/// 解析 feed 文档，条目保持文档顺序
pub fn parse_feed(xml: &str) -> Result<FeedHistory, FeedError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut history = FeedHistory::default();
    let mut current_item: Option<ItemBuilder> = None;
    let mut current_element = String::new();
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = qualified_name(&e);
                if depth == 0 {
                    if e.local_name().as_ref() != b"rss" {
                        return Err(FeedError::Parse(format!(
                            "unexpected root element <{}>",
                            name
                        )));
                    }
                    history.namespaces = extra_namespaces(&e);
                    saw_root = true;
                }
                depth += 1;

                if name == "item" && current_item.is_none() {
                    current_item = Some(ItemBuilder {
                        start: before,
                        ..ItemBuilder::default()
                    });
                } else if let Some(ref mut item) = current_item {
                    item.set_attributes(&name, &e);
                }
                current_element = name;
            }
            Ok(Event::Empty(e)) => {
                let name = qualified_name(&e);
                if let Some(ref mut item) = current_item {
                    item.set_attributes(&name, &e);
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current_item.take() {
                        let end = reader.buffer_position() as usize;
                        let raw = xml.get(item.start..end).map(|s| s.trim_start().to_string());
                        match item.build(raw) {
                            Some(entry) => history.entries.push(entry),
                            None => tracing::warn!("Dropping feed item without any identifier"),
                        }
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = e
                        .unescape()
                        .map_err(|err| FeedError::Parse(err.to_string()))?
                        .into_owned();
                    item.set_text(&current_element, text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    item.set_text(&current_element, text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FeedError::Parse(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if !saw_root {
        return Err(FeedError::Parse("missing <rss> root element".to_string()));
    }
    if depth != 0 {
        return Err(FeedError::Parse("unexpected end of document".to_string()));
    }

    Ok(history)
}

fn write_event<'a>(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    event: Event<'a>,
) -> Result<(), FeedError> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Serialize(e.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    text: &str,
) -> Result<(), FeedError> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn write_item(writer: &mut Writer<Cursor<Vec<u8>>>, entry: &FeedEntry) -> Result<(), FeedError> {
    write_event(writer, Event::Start(BytesStart::new("item")))?;

    write_text_element(writer, "title", &entry.title)?;
    if let Some(duration) = &entry.duration {
        write_text_element(writer, "itunes:duration", duration)?;
    }
    if let Some(image) = &entry.image_url {
        let mut elem = BytesStart::new("itunes:image");
        elem.push_attribute(("href", image.as_str()));
        write_event(writer, Event::Empty(elem))?;
    }
    if let Some(link) = &entry.link {
        write_text_element(writer, "link", link)?;
    }
    write_text_element(writer, "guid", &entry.guid)?;
    if let Some(pub_date) = &entry.pub_date {
        write_text_element(writer, "pubDate", pub_date)?;
    }
    if let Some(description) = &entry.description {
        write_text_element(writer, "description", description)?;
    }

    let mut enclosure = BytesStart::new("enclosure");
    enclosure.push_attribute(("url", entry.enclosure_url.as_str()));
    enclosure.push_attribute(("type", entry.mime_type.as_str()));
    let length = entry.enclosure_length.map(|l| l.to_string());
    if let Some(length) = &length {
        enclosure.push_attribute(("length", length.as_str()));
    }
    write_event(writer, Event::Empty(enclosure))?;

    write_event(writer, Event::End(BytesEnd::new("item")))
}

/// 序列化为 RSS 2.0 文档
///
/// 带原始片段的历史条目逐字节写回，其余条目由字段生成。
pub fn write_feed(feed: &Feed) -> Result<Vec<u8>, FeedError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:itunes", ITUNES_NAMESPACE));
    for (prefix, uri) in feed.namespaces() {
        rss.push_attribute((format!("xmlns:{}", prefix).as_str(), uri.as_str()));
    }
    write_event(&mut writer, Event::Start(rss))?;
    write_event(&mut writer, Event::Start(BytesStart::new("channel")))?;

    let channel = feed.channel();
    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.link)?;
    write_text_element(&mut writer, "description", &channel.description)?;
    write_text_element(&mut writer, "language", &channel.language)?;

    write_event(&mut writer, Event::Start(BytesStart::new("image")))?;
    write_text_element(&mut writer, "url", &channel.image.url)?;
    write_text_element(&mut writer, "title", &channel.image.title)?;
    write_text_element(&mut writer, "link", &channel.image.link)?;
    write_event(&mut writer, Event::End(BytesEnd::new("image")))?;

    // 原始片段以文本写出，writer 不会为它缩进，换行需要自己补
    let mut after_raw = false;
    for entry in feed.entries() {
        match &entry.source_xml {
            Some(raw) => {
                let text = format!("\n    {}", raw);
                write_event(&mut writer, Event::Text(BytesText::from_escaped(text)))?;
                after_raw = true;
            }
            None => {
                if after_raw {
                    write_event(&mut writer, Event::Text(BytesText::from_escaped("\n    ")))?;
                }
                write_item(&mut writer, entry)?;
                after_raw = false;
            }
        }
    }
    if after_raw {
        write_event(&mut writer, Event::Text(BytesText::from_escaped("\n  ")))?;
    }

    write_event(&mut writer, Event::End(BytesEnd::new("channel")))?;
    write_event(&mut writer, Event::End(BytesEnd::new("rss")))?;

    Ok(writer.into_inner().into_inner())
}
