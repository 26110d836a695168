//! 文本分块器
//!
//! 将长文本切分为适合 TTS 单次推理的片段，切分点优先落在标点之后，
//! 其次落在空格之前，都找不到时按最大长度硬切。
//!
//! 所有片段按顺序拼接后与归一化文本完全一致。

use serde::{Deserialize, Serialize};

/// 默认单个片段的最大字符数
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 250;

/// 可作为切分点的标点（切分点位于标点之后）
#[inline]
fn is_break_punctuation(ch: char) -> bool {
    matches!(ch, '.' | ',' | '?' | '!' | '"' | ')' | ':' | ';')
}

/// 文本片段 - 单次 TTS 推理的最小单位
///
/// 不变量:
/// - 片段连续、不重叠，共同覆盖整个归一化文本
/// - 字符数在 [1, max_length] 之间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// 片段序号
    pub index: usize,
    /// 片段内容
    pub text: String,
    /// 在归一化文本中的起始字节偏移
    pub start: usize,
    /// 在归一化文本中的结束字节偏移（不包含）
    pub end: usize,
}

impl TextChunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// 归一化输入文本，避免 TTS 读错符号
///
/// - 换行替换为空格
/// - `+` 读作 " plus "
/// - 破折号替换为逗号停顿
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('+', " plus ")
        .replace("â€”", ", ")
        .replace('\u{2014}', ", ")
}

/// 对归一化后的文本分块
///
/// `max_length` 按字符计，0 按 1 处理。
fn chunk_normalized(text: &str, max_length: usize) -> Vec<TextChunk> {
    let max_length = max_length.max(1);

    // 字符位置 -> 字节偏移，末尾追加 text.len() 方便取区间
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let chars: Vec<char> = text.chars().collect();
    offsets.push(text.len());

    let total = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = if total - start <= max_length {
            total
        } else {
            find_boundary(&chars, start, max_length)
        };
        debug_assert!(end > start && end - start <= max_length);

        let (byte_start, byte_end) = (offsets[start], offsets[end]);
        chunks.push(TextChunk {
            index: chunks.len(),
            text: text[byte_start..byte_end].to_string(),
            start: byte_start,
            end: byte_end,
        });
        start = end;
    }

    chunks
}

/// 归一化并分块
pub fn chunk_text(text: &str, max_length: usize) -> Vec<TextChunk> {
    chunk_normalized(&normalize_text(text), max_length)
}

/// 在 (start, start + max_length] 内寻找切分点（字符下标）
///
/// 返回值总是严格大于 `start`。
fn find_boundary(chars: &[char], start: usize, max_length: usize) -> usize {
    let limit = start + max_length;

    // 标点之后切分: 标点位置 pos 满足 pos + 1 <= limit
    if let Some(pos) = (start..limit).rev().find(|&i| is_break_punctuation(chars[i])) {
        return pos + 1;
    }

    // 空格之前切分: 空格留给下一片段
    if let Some(pos) = (start + 1..=limit).rev().find(|&i| chars[i] == ' ') {
        return pos;
    }

    tracing::debug!(
        start,
        max_length,
        "No punctuation or space in window, hard splitting"
    );
    limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(chunks: &[TextChunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    fn assert_invariants(text: &str, max_length: usize) {
        let normalized = normalize_text(text);
        let chunks = chunk_text(text, max_length);

        assert_eq!(joined(&chunks), normalized, "round trip for max={}", max_length);

        let mut prev_start: Option<usize> = None;
        let mut expected_start = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.start, expected_start);
            assert_eq!(&normalized[chunk.start..chunk.end], chunk.text);
            assert!(chunk.char_len() >= 1);
            assert!(chunk.char_len() <= max_length.max(1));
            if let Some(prev) = prev_start {
                assert!(chunk.start > prev);
            }
            prev_start = Some(chunk.start);
            expected_start = chunk.end;
        }
        assert_eq!(expected_start, normalized.len());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("a\nb"), "a b");
        assert_eq!(normalize_text("a\r\nb"), "a b");
        assert_eq!(normalize_text("1+1"), "1 plus 1");
        assert_eq!(normalize_text("wait\u{2014}what"), "wait, what");
        assert_eq!(normalize_text("wait\u{e2}\u{20ac}\u{201d}what"), "wait, what");
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("Hello there.", 250);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello there.");
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, 12);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn test_splits_after_rightmost_punctuation() {
        let chunks = chunk_text("One, two. Three four five", 12);
        assert_eq!(chunks[0].text, "One, two.");
        assert_eq!(chunks[1].text, " Three four");
        assert_eq!(chunks[2].text, " five");
    }

    #[test]
    fn test_falls_back_to_space() {
        let chunks = chunk_text("alpha beta gamma", 8);
        assert_eq!(chunks[0].text, "alpha");
        assert_eq!(chunks[1].text, " beta");
        assert_eq!(chunks[2].text, " gamma");
    }

    #[test]
    fn test_punctuation_at_window_edge_respects_max() {
        // 第 5 个字符是句号，切分后长度正好为 5
        let chunks = chunk_text("abcd.efghij", 5);
        assert_eq!(chunks[0].text, "abcd.");
        assert!(chunks.iter().all(|c| c.char_len() <= 5));
    }

    #[test]
    fn test_hard_split_without_boundaries() {
        let chunks = chunk_text("abcdefghij", 4);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_leading_space_does_not_stall() {
        // 窗口内唯一的空格在起始位置，不能作为切分点
        let chunks = chunk_text(" abcdefgh", 4);
        assert_eq!(joined(&chunks), " abcdefgh");
        assert_eq!(chunks[0].text, " abc");
    }

    #[test]
    fn test_zero_max_length_treated_as_one() {
        let chunks = chunk_text("abc", 0);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_multibyte_text() {
        assert_invariants("Ünïcödé wörds — with “quotes”, and more ✓ text here.", 7);
    }

    #[test]
    fn test_round_trip_and_progress() {
        let samples = [
            "The quick brown fox jumps over the lazy dog. It was not amused!",
            "No punctuation at all just words and words and words",
            "Supercalifragilisticexpialidocious",
            "Line one\nLine two\nLine three (with parens) and \"quotes\": done; ok?",
            "  leading and trailing spaces  ",
            "a+b=c, said the anchor.\r\nNext line.",
            "....,,,,!!!!",
        ];
        for text in samples {
            for max_length in [1, 2, 3, 5, 8, 13, 40, 250] {
                assert_invariants(text, max_length);
            }
        }
    }

    #[test]
    fn test_news_sample() {
        let text = "Officials confirmed on Tuesday that the bridge will reopen next week. \
                    Traffic has been diverted through the city centre, causing delays of up to \
                    forty minutes during rush hour; commuters are advised to plan ahead.";
        let chunks = chunk_text(text, 80);
        for chunk in &chunks {
            println!("[{}] ({} chars): {}", chunk.index, chunk.char_len(), chunk.text);
        }
        assert!(chunks.len() >= 3);
        assert!(chunks[0].text.ends_with('.') || chunks[0].text.ends_with(','));
    }
}
