//! 应用层错误定义
//!
//! 一次运行中任何阶段的错误都会中止整个运行

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::application::ports::{AudioToolError, StorageError, TtsError};
use crate::config::ConfigError;
use crate::domain::audio::{MergeError, WavError};
use crate::domain::feed::FeedError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 必需的本地文件不存在
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// 配置无效（在任何外部调用之前检查）
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// 输入无效
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 片段格式不一致等合并错误
    #[error("Audio merge failed: {0}")]
    Merge(#[from] MergeError),

    /// 重试次数耗尽
    #[error("{operation} failed after {attempts} attempts: {cause}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        cause: String,
    },

    /// 不可重试的合成错误
    #[error("Synthesis of chunk {chunk_index} failed: {source}")]
    Synthesis {
        chunk_index: usize,
        #[source]
        source: TtsError,
    },

    /// 音频数据无法解析
    #[error("Invalid audio in {context}: {source}")]
    InvalidAudio {
        context: String,
        #[source]
        source: WavError,
    },

    /// 外部音频工具错误
    #[error(transparent)]
    AudioTool(AudioToolError),

    /// 对象存储错误
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Feed 读写错误
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// 本地文件操作错误
    #[error("IO error during {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// 创建 NotFound 错误
    pub fn not_found(what: &'static str, path: impl AsRef<Path>) -> Self {
        Self::NotFound {
            what,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 创建 IO 错误
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// 创建配置错误
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

impl From<AudioToolError> for PipelineError {
    fn from(err: AudioToolError) -> Self {
        match err {
            AudioToolError::InputNotFound(path) => Self::NotFound {
                what: "Audio file",
                path,
            },
            AudioToolError::UnsupportedQuality(_) => Self::InvalidConfiguration(err.to_string()),
            other => Self::AudioTool(other),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}

/// 检查本地文件存在，否则返回 NotFound
pub fn ensure_exists(what: &'static str, path: &Path) -> Result<(), PipelineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::not_found(what, path))
    }
}
