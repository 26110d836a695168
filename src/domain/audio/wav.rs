//! WAV 编解码
//!
//! 只处理 RIFF/WAVE 容器，不做任何采样转换：
//! - 解析 fmt chunk 得到格式描述
//! - 取出 data chunk 原始帧
//! - 用标准 44 字节头重新封装

use thiserror::Error;

use super::{AudioFormatSpec, AudioSegment, MergedTrack, SampleEncoding};

/// WAVE_FORMAT_EXTENSIBLE
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavError {
    #[error("Invalid WAV: {0}")]
    InvalidInput(String),

    #[error("Unsupported WAV encoding tag: {0:#06x}")]
    UnsupportedEncoding(u16),
}

#[derive(Debug)]
struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// 解析 WAV 数据，返回格式与 data chunk 帧数据
pub fn decode_wav(data: &[u8]) -> Result<(AudioFormatSpec, Vec<u8>), WavError> {
    if data.len() < 12 {
        return Err(WavError::InvalidInput("data too short".to_string()));
    }
    if &data[0..4] != b"RIFF" {
        return Err(WavError::InvalidInput("missing RIFF header".to_string()));
    }
    if &data[8..12] != b"WAVE" {
        return Err(WavError::InvalidInput("missing WAVE identifier".to_string()));
    }

    let mut pos = 12;
    let mut fmt_chunk: Option<FmtChunk> = None;
    let mut frames: Option<Vec<u8>> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32(data, pos + 4) as usize;
        let body_start = pos + 8;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || body_start + 16 > data.len() {
                    return Err(WavError::InvalidInput("invalid fmt chunk size".to_string()));
                }
                let mut audio_format = read_u16(data, body_start);
                // 扩展格式的真实编码在 SubFormat GUID 的前两个字节
                if audio_format == FORMAT_EXTENSIBLE
                    && chunk_size >= 40
                    && body_start + 26 <= data.len()
                {
                    audio_format = read_u16(data, body_start + 24);
                }
                fmt_chunk = Some(FmtChunk {
                    audio_format,
                    num_channels: read_u16(data, body_start + 2),
                    sample_rate: read_u32(data, body_start + 4),
                    bits_per_sample: read_u16(data, body_start + 14),
                });
            }
            b"data" => {
                // 流式写出的 WAV 可能带有不准确的长度，按实际数据截断
                let body_end = body_start.saturating_add(chunk_size).min(data.len());
                frames = Some(data[body_start..body_end].to_vec());
                break;
            }
            _ => {}
        }

        pos = body_start.saturating_add(chunk_size);
        // 对齐到偶数字节
        if chunk_size % 2 != 0 {
            pos = pos.saturating_add(1);
        }
    }

    let fmt = fmt_chunk.ok_or_else(|| WavError::InvalidInput("missing fmt chunk".to_string()))?;
    let frames = frames.ok_or_else(|| WavError::InvalidInput("missing data chunk".to_string()))?;

    let encoding = match fmt.audio_format {
        1 => SampleEncoding::Int,
        3 => SampleEncoding::Float,
        other => return Err(WavError::UnsupportedEncoding(other)),
    };

    let format = AudioFormatSpec {
        channels: fmt.num_channels,
        sample_rate: fmt.sample_rate,
        bits_per_sample: fmt.bits_per_sample,
        encoding,
    };

    Ok((format, frames))
}

/// 解析为带序号的音频片段
pub fn decode_segment(index: usize, data: &[u8]) -> Result<AudioSegment, WavError> {
    let (format, frames) = decode_wav(data)?;
    Ok(AudioSegment::new(index, frames, format))
}

/// 用标准 44 字节头封装帧数据
pub fn encode_wav(format: &AudioFormatSpec, frames: &[u8]) -> Vec<u8> {
    let data_size = frames.len();
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&format.encoding.wav_tag().to_le_bytes());
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&format.block_align().to_le_bytes());
    wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());
    wav.extend_from_slice(frames);

    wav
}

/// 封装合并后的语音轨
pub fn encode_track(track: &MergedTrack) -> Vec<u8> {
    encode_wav(&track.format, &track.frames)
}
