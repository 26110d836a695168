//! 服务测试用的内存端口实现

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::ports::{
    public_object_url, AudioToolError, AudioToolPort, FeedFetchError, FeedSourcePort, MixJob,
    Mp3Quality, ObjectStorePort, StorageError, SynthesisRequest, SynthesisResponse,
    TtsEnginePort, TtsError,
};
use crate::domain::audio::wav::tests::silent_wav;

pub const BASE_URL: &str = "https://cdn.example.com";

/// 每次调用返回一段静音 WAV；可预先排入失败
pub struct ScriptedTts {
    pub sample_rate: u32,
    pub samples_per_call: usize,
    failures: Mutex<VecDeque<TtsError>>,
    pub requests: Mutex<Vec<SynthesisRequest>>,
}

impl ScriptedTts {
    pub fn new(sample_rate: u32, samples_per_call: usize) -> Self {
        Self {
            sample_rate,
            samples_per_call,
            failures: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(self, errors: Vec<TtsError>) -> Self {
        self.failures.lock().unwrap().extend(errors);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TtsEnginePort for ScriptedTts {
    async fn infer(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        self.requests.lock().unwrap().push(request);
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(SynthesisResponse {
            audio_data: silent_wav(self.sample_rate, self.samples_per_call),
        })
    }
}

/// 按片段序号切换采样率，用于制造格式不一致
pub struct MixedRateTts;

#[async_trait]
impl TtsEnginePort for MixedRateTts {
    async fn infer(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        let rate = if request.chunk_index == 0 { 24000 } else { 22050 };
        Ok(SynthesisResponse {
            audio_data: silent_wav(rate, 100),
        })
    }
}

/// 不调用 ffmpeg 的音频工具
#[derive(Default)]
pub struct RecordingAudioTool {
    pub probed_seconds: u64,
    pub mix_jobs: Mutex<Vec<MixJob>>,
    pub transcoded: Mutex<Vec<(PathBuf, Mp3Quality)>>,
    /// 混音时模拟 ffmpeg 非零退出
    pub fail_mix: bool,
}

impl RecordingAudioTool {
    pub fn with_duration(probed_seconds: u64) -> Self {
        Self {
            probed_seconds,
            ..Default::default()
        }
    }

    pub fn failing_mix() -> Self {
        Self {
            probed_seconds: 42,
            fail_mix: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl AudioToolPort for RecordingAudioTool {
    async fn mix(&self, job: &MixJob) -> Result<(), AudioToolError> {
        if self.fail_mix {
            return Err(AudioToolError::Failed {
                tool: "ffmpeg".to_string(),
                operation: "mix",
                status: "exit status: 1".to_string(),
                diagnostics: "Invalid data found when processing input".to_string(),
            });
        }
        tokio::fs::copy(&job.speech, &job.output)
            .await
            .map_err(|e| AudioToolError::IoError(e.to_string()))?;
        self.mix_jobs.lock().unwrap().push(job.clone());
        Ok(())
    }

    async fn probe_duration(&self, input: &Path) -> Result<u64, AudioToolError> {
        if !input.exists() {
            return Err(AudioToolError::InputNotFound(input.to_path_buf()));
        }
        Ok(self.probed_seconds)
    }

    async fn transcode_mp3(
        &self,
        input: &Path,
        quality: Mp3Quality,
    ) -> Result<PathBuf, AudioToolError> {
        let output = input.with_extension("mp3");
        tokio::fs::copy(input, &output)
            .await
            .map_err(|e| AudioToolError::IoError(e.to_string()))?;
        self.transcoded
            .lock()
            .unwrap()
            .push((input.to_path_buf(), quality));
        Ok(output)
    }
}

/// 内存对象存储；同时可作为 feed 来源
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    pub fail_uploads: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, _)| String::from_utf8_lossy(data).into_owned())
    }
}

#[async_trait]
impl ObjectStorePort for MemoryStore {
    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.objects.lock().unwrap().keys().cloned().collect())
    }

    async fn put_public(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail_uploads {
            return Err(StorageError::UploadFailed {
                key: key.to_string(),
                reason: "bucket unavailable".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(BASE_URL, key)
    }
}

/// 从 MemoryStore 读取已发布的 feed
pub struct StoreFeedSource {
    pub store: Arc<MemoryStore>,
    pub key: String,
}

#[async_trait]
impl FeedSourcePort for StoreFeedSource {
    async fn fetch(&self) -> Result<String, FeedFetchError> {
        self.store
            .text(&self.key)
            .ok_or_else(|| FeedFetchError::NotFound(self.location()))
    }

    fn location(&self) -> String {
        public_object_url(BASE_URL, &self.key)
    }
}

/// 固定返回结果的 feed 来源
pub struct StaticFeedSource(pub Result<String, u16>);

#[async_trait]
impl FeedSourcePort for StaticFeedSource {
    async fn fetch(&self) -> Result<String, FeedFetchError> {
        match &self.0 {
            Ok(body) => Ok(body.clone()),
            Err(404) => Err(FeedFetchError::NotFound(self.location())),
            Err(status) => Err(FeedFetchError::Status(*status)),
        }
    }

    fn location(&self) -> String {
        format!("{}/podcast.xml", BASE_URL)
    }
}
