//! Audio Segment - 单个片段的音频与格式描述

use serde::{Deserialize, Serialize};

/// 采样编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 整数 PCM (WAVE_FORMAT_PCM)
    Int,
    /// 浮点 PCM (WAVE_FORMAT_IEEE_FLOAT)
    Float,
}

impl SampleEncoding {
    /// WAV fmt chunk 中的 audio_format 字段
    pub fn wav_tag(&self) -> u16 {
        match self {
            SampleEncoding::Int => 1,
            SampleEncoding::Float => 3,
        }
    }
}

/// 音频格式描述
///
/// 同一次合并的所有片段必须完全一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormatSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub encoding: SampleEncoding,
}

impl AudioFormatSpec {
    /// 每帧字节数（所有声道）
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// 给定帧数据长度对应的时长（毫秒）
    pub fn duration_ms(&self, data_len: usize) -> u64 {
        let block_align = self.block_align() as u64;
        if block_align == 0 || self.sample_rate == 0 {
            return 0;
        }
        (data_len as u64 / block_align) * 1000 / self.sample_rate as u64
    }
}

impl std::fmt::Display for AudioFormatSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}ch/{}Hz/{}bit/{:?}",
            self.channels, self.sample_rate, self.bits_per_sample, self.encoding
        )
    }
}

/// 单个文本片段合成出的音频
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    /// 对应的文本片段序号
    pub index: usize,
    /// 原始 PCM 帧数据（WAV data chunk，小端）
    pub frames: Vec<u8>,
    pub format: AudioFormatSpec,
}

impl AudioSegment {
    pub fn new(index: usize, frames: Vec<u8>, format: AudioFormatSpec) -> Self {
        Self {
            index,
            frames,
            format,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.format.duration_ms(self.frames.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_derived_values() {
        let format = AudioFormatSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            encoding: SampleEncoding::Int,
        };
        assert_eq!(format.block_align(), 4);
        assert_eq!(format.byte_rate(), 176_400);
        assert_eq!(format.duration_ms(176_400), 1000);
        assert_eq!(format.to_string(), "2ch/44100Hz/16bit/Int");
    }
}
