//! Audio Merger - 按片段顺序拼接音频
//!
//! 只做无损拼接，要求所有片段格式一致；任何不一致都会中止合并，
//! 不会产出部分结果。

use thiserror::Error;

use super::{AudioFormatSpec, AudioSegment};

/// 合并错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("No audio segments to merge")]
    Empty,

    #[error("Audio format mismatch at segment {index}: expected {expected}, found {found}")]
    FormatMismatch {
        index: usize,
        expected: AudioFormatSpec,
        found: AudioFormatSpec,
    },
}

/// 合并后的语音轨（仅在一次运行内存在）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTrack {
    pub frames: Vec<u8>,
    pub format: AudioFormatSpec,
    pub segment_count: usize,
}

impl MergedTrack {
    pub fn duration_ms(&self) -> u64 {
        self.format.duration_ms(self.frames.len())
    }
}

/// 按顺序拼接片段帧数据，格式继承自第一个片段
pub fn merge_segments(segments: &[AudioSegment]) -> Result<MergedTrack, MergeError> {
    let first = segments.first().ok_or(MergeError::Empty)?;
    let format = first.format;

    // 先整体校验，避免产出部分结果
    if let Some(bad) = segments.iter().find(|s| s.format != format) {
        return Err(MergeError::FormatMismatch {
            index: bad.index,
            expected: format,
            found: bad.format,
        });
    }

    let total: usize = segments.iter().map(|s| s.frames.len()).sum();
    let mut frames = Vec::with_capacity(total);
    for segment in segments {
        frames.extend_from_slice(&segment.frames);
    }

    Ok(MergedTrack {
        frames,
        format,
        segment_count: segments.len(),
    })
}
