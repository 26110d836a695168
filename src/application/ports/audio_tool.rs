//! Audio Tool Port - 外部音频工具抽象
//!
//! 定义混音、时长探测、MP3 转码三个操作，具体实现为 ffmpeg 命令行

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MixTiming;

/// 音频工具错误
#[derive(Debug, Error)]
pub enum AudioToolError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to spawn {tool}: {reason}")]
    Spawn { tool: String, reason: String },

    #[error("{tool} {operation} failed ({status}):\n---\n{diagnostics}\n---")]
    Failed {
        tool: String,
        operation: &'static str,
        status: String,
        diagnostics: String,
    },

    #[error("Could not parse ffmpeg output: {0}")]
    ParseOutput(String),

    #[error("Unsupported MP3 quality: {0} (supported: v0, v2, 192k, 320k)")]
    UnsupportedQuality(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// MP3 编码质量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mp3Quality {
    /// VBR V0 - 最高质量
    #[serde(rename = "v0")]
    V0,
    /// VBR V2
    #[default]
    #[serde(rename = "v2")]
    V2,
    /// CBR 192 kbps
    #[serde(rename = "192k")]
    Cbr192,
    /// CBR 320 kbps
    #[serde(rename = "320k")]
    Cbr320,
}

impl Mp3Quality {
    /// libmp3lame 对应的参数
    pub fn ffmpeg_args(&self) -> [&'static str; 2] {
        match self {
            Mp3Quality::V0 => ["-q:a", "0"],
            Mp3Quality::V2 => ["-q:a", "2"],
            Mp3Quality::Cbr192 => ["-b:a", "192k"],
            Mp3Quality::Cbr320 => ["-b:a", "320k"],
        }
    }
}

impl std::fmt::Display for Mp3Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mp3Quality::V0 => write!(f, "v0"),
            Mp3Quality::V2 => write!(f, "v2"),
            Mp3Quality::Cbr192 => write!(f, "192k"),
            Mp3Quality::Cbr320 => write!(f, "320k"),
        }
    }
}

impl std::str::FromStr for Mp3Quality {
    type Err = AudioToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v0" => Ok(Mp3Quality::V0),
            "v2" => Ok(Mp3Quality::V2),
            "192k" => Ok(Mp3Quality::Cbr192),
            "320k" => Ok(Mp3Quality::Cbr320),
            _ => Err(AudioToolError::UnsupportedQuality(s.to_string())),
        }
    }
}

/// 一次背景音乐混音任务
#[derive(Debug, Clone)]
pub struct MixJob {
    /// 背景音乐（输入 0）
    pub background: PathBuf,
    /// 语音轨（输入 1）
    pub speech: PathBuf,
    /// 输出路径（调用前已确保不存在）
    pub output: PathBuf,
    pub timing: MixTiming,
}

/// Audio Tool Port
#[async_trait]
pub trait AudioToolPort: Send + Sync {
    /// 按 filter graph 混音，输出立体声 PCM WAV
    async fn mix(&self, job: &MixJob) -> Result<(), AudioToolError>;

    /// 探测音频时长（整秒，向下取整）
    async fn probe_duration(&self, input: &Path) -> Result<u64, AudioToolError>;

    /// 转码为 MP3（带响度归一化），返回输出路径
    async fn transcode_mp3(
        &self,
        input: &Path,
        quality: Mp3Quality,
    ) -> Result<PathBuf, AudioToolError>;
}
