//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用外部 TTS 服务
//!
//! 外部 TTS API:
//! POST {base_url}/inference  (multipart/form-data)
//! Fields: target_text, n_timesteps, target_len(-1), prompt_wav(file)
//! Response: audio/wav binary

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::application::ports::{SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError};

/// 让服务自行决定输出长度
const TARGET_LEN_AUTO: &str = "-1";

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7860".to_string(),
            timeout_secs: 300,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
///
/// 不在内部重试，重试由调用方的 RetryPolicy 负责
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn infer_url(&self) -> String {
        format!("{}/inference", self.config.base_url.trim_end_matches('/'))
    }

    async fn build_form(&self, request: &SynthesisRequest) -> Result<Form, TtsError> {
        let voice = tokio::fs::read(&request.voice_sample).await.map_err(|e| {
            TtsError::VoiceUnreadable(format!("{}: {}", request.voice_sample.display(), e))
        })?;
        let file_name = request
            .voice_sample
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prompt.wav".to_string());

        let prompt = Part::bytes(voice)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Form::new()
            .text("target_text", request.text.clone())
            .text("n_timesteps", request.timesteps.to_string())
            .text("target_len", TARGET_LEN_AUTO)
            .part("prompt_wav", prompt))
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn infer(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        let form = self.build_form(&request).await?;

        tracing::debug!(
            url = %self.infer_url(),
            chunk_index = request.chunk_index,
            text_len = request.text.len(),
            timesteps = request.timesteps,
            "Sending TTS infer request"
        );

        let response = self
            .client
            .post(self.infer_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::InvalidResponse(format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("empty audio body".to_string()));
        }

        tracing::debug!(
            chunk_index = request.chunk_index,
            audio_size = audio_data.len(),
            "TTS inference completed"
        );

        Ok(SynthesisResponse { audio_data })
    }
}
