//! Fake TTS Client - 离线运行用的 TTS 客户端
//!
//! 不调用 TTS 服务，按文本长度生成静音 WAV

use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError};
use crate::domain::audio::wav::encode_wav;
use crate::domain::audio::{AudioFormatSpec, SampleEncoding};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 输出采样率
    pub sample_rate: u32,
    /// 每个字符对应的时长（毫秒）
    pub ms_per_char: u64,
    /// 模拟推理延迟
    pub latency: Duration,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            ms_per_char: 60,
            latency: Duration::from_millis(200),
        }
    }
}

/// Fake TTS Client
///
/// 输出单声道 16 位静音，时长与文本长度成正比
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            ms_per_char = config.ms_per_char,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    fn format(&self) -> AudioFormatSpec {
        AudioFormatSpec {
            channels: 1,
            sample_rate: self.config.sample_rate,
            bits_per_sample: 16,
            encoding: SampleEncoding::Int,
        }
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn infer(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        if !request.voice_sample.is_file() {
            return Err(TtsError::VoiceUnreadable(
                request.voice_sample.display().to_string(),
            ));
        }

        tracing::debug!(
            chunk_index = request.chunk_index,
            text_len = request.text.len(),
            "FakeTtsClient: generating silence"
        );

        tokio::time::sleep(self.config.latency).await;

        let format = self.format();
        let duration_ms = request.text.chars().count() as u64 * self.config.ms_per_char;
        let samples = (duration_ms * self.config.sample_rate as u64 / 1000) as usize;
        let frames = vec![0u8; samples * format.block_align() as usize];

        Ok(SynthesisResponse {
            audio_data: encode_wav(&format, &frames),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::decode_segment;

    #[tokio::test(start_paused = true)]
    async fn test_duration_follows_text_length() {
        let dir = tempfile::tempdir().unwrap();
        let voice = dir.path().join("voice.wav");
        std::fs::write(&voice, b"ref").unwrap();

        let client = FakeTtsClient::with_defaults();
        let response = client
            .infer(SynthesisRequest {
                chunk_index: 3,
                text: "0123456789".to_string(),
                voice_sample: voice,
                timesteps: 25,
            })
            .await
            .unwrap();

        let segment = decode_segment(3, &response.audio_data).unwrap();
        assert_eq!(segment.duration_ms(), 600);
        assert_eq!(segment.format.sample_rate, 24000);
    }
}
