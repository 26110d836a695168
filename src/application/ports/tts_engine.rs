//! TTS Engine Port - TTS 推理引擎抽象
//!
//! 定义 TTS 推理的抽象接口，具体实现在 infrastructure/adapters 层

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Voice sample unreadable: {0}")]
    VoiceUnreadable(String),
}

impl TtsError {
    /// 服务端的任何失败都可重试；本地参考音频读不到则重试无意义
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TtsError::VoiceUnreadable(_))
    }
}

/// TTS 推理请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 片段序号（用于日志和追踪）
    pub chunk_index: usize,
    /// 要合成的文本内容
    pub text: String,
    /// 参考音色样本的本地路径
    pub voice_sample: PathBuf,
    /// 推理迭代次数
    pub timesteps: u32,
}

/// TTS 推理响应
#[derive(Debug, Clone)]
pub struct SynthesisResponse {
    /// 原始音频数据（WAV）
    pub audio_data: Vec<u8>,
}

/// TTS Engine Port
///
/// 外部 TTS 服务的抽象接口，每次调用对应一个文本片段
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 执行 TTS 推理
    async fn infer(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(TtsError::Timeout.is_retryable());
        assert!(TtsError::NetworkError("refused".into()).is_retryable());
        assert!(TtsError::ServiceError("HTTP 503".into()).is_retryable());
        assert!(TtsError::InvalidResponse("empty".into()).is_retryable());
        assert!(!TtsError::VoiceUnreadable("/voices/a.wav".into()).is_retryable());
    }
}
