//! Episode Pipeline - 一次完整运行
//!
//! 文本 → 分块 → 逐块合成 → 合并 → （可选）背景音乐 → MP3 → 上传 → 更新 feed
//!
//! 各阶段严格顺序执行，任一阶段失败即中止，不会发布部分产物。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::error::{ensure_exists, PipelineError};
use crate::application::ports::{public_object_url, AudioToolPort, Mp3Quality, ObjectStorePort};
use crate::application::services::{
    BackgroundMixer, ChunkSynthesizer, FeedSynchronizer, NewEpisode, SynthesisParams,
};
use crate::domain::feed::EPISODE_MIME_TYPE;
use crate::domain::{chunk_text, MixSettings};

/// 合成语音轨的文件名（位于工作目录）
pub const SPEECH_TRACK_FILENAME: &str = "tts_output.wav";

/// 运行参数（来自配置）
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub voices_dir: PathBuf,
    pub bg_tracks_dir: PathBuf,
    pub work_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub max_chunk_chars: usize,
    pub timesteps: u32,
    pub mp3_quality: Mp3Quality,
    pub public_base_url: String,
}

/// 背景音乐选项
#[derive(Debug, Clone)]
pub struct BackgroundRequest {
    /// bg_tracks_dir 下的文件名
    pub track: String,
    pub settings: MixSettings,
}

/// 一期节目的输入
#[derive(Debug, Clone)]
pub struct EpisodeRequest {
    pub text: String,
    /// voices_dir 下的参考音色文件名
    pub voice: String,
    pub title: String,
    /// 节目封面在 bucket 中的路径
    pub image_path: String,
    /// 标题前缀日期
    pub date: NaiveDate,
    pub background: Option<BackgroundRequest>,
}

/// 发布结果
#[derive(Debug, Clone)]
pub struct PublishedEpisode {
    pub run_id: Uuid,
    pub title: String,
    pub url: String,
    pub duration_seconds: u64,
    pub asset_path: PathBuf,
    pub feed_entries: usize,
}

/// 节目标题: `YYYY-MM-DD title`
pub fn dated_title(date: NaiveDate, title: &str) -> String {
    format!("{} {}", date.format("%Y-%m-%d"), title)
}

/// 节目资源文件名: `{title} {duration}s.mp3`
pub fn asset_filename(title: &str, duration_seconds: u64) -> String {
    format!("{} {}s.mp3", title, duration_seconds)
}

pub struct EpisodePipeline {
    synthesizer: ChunkSynthesizer,
    mixer: BackgroundMixer,
    audio_tool: Arc<dyn AudioToolPort>,
    store: Arc<dyn ObjectStorePort>,
    feed: FeedSynchronizer,
    settings: PipelineSettings,
}

impl EpisodePipeline {
    pub fn new(
        synthesizer: ChunkSynthesizer,
        mixer: BackgroundMixer,
        audio_tool: Arc<dyn AudioToolPort>,
        store: Arc<dyn ObjectStorePort>,
        feed: FeedSynchronizer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            synthesizer,
            mixer,
            audio_tool,
            store,
            feed,
            settings,
        }
    }

    /// 从文本生成并发布一期节目
    pub async fn create_episode(
        &self,
        request: EpisodeRequest,
    ) -> Result<PublishedEpisode, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::info!(run_id = %run_id, title = %request.title, "Starting episode run");

        let chunks = chunk_text(&request.text, self.settings.max_chunk_chars);
        if chunks.is_empty() {
            return Err(PipelineError::InvalidInput("episode text is empty".to_string()));
        }
        tracing::info!(run_id = %run_id, chunks = chunks.len(), "Text chunked");

        // 所有本地输入在第一次外部调用前检查
        let voice = self.settings.voices_dir.join(&request.voice);
        ensure_exists("Voice reference", &voice)?;
        let background = match &request.background {
            Some(bg) => {
                bg.settings
                    .validate()
                    .map_err(PipelineError::InvalidConfiguration)?;
                let path = self.settings.bg_tracks_dir.join(&bg.track);
                ensure_exists("Background track", &path)?;
                Some((path, bg.settings))
            }
            None => None,
        };

        let speech = self.settings.work_dir.join(SPEECH_TRACK_FILENAME);
        let params = SynthesisParams {
            voice_sample: voice,
            timesteps: self.settings.timesteps,
        };
        let track = self
            .synthesizer
            .synthesize_to_file(&chunks, &params, &speech)
            .await?;

        let final_audio = match background {
            Some((path, settings)) => {
                let speech_seconds = track.duration_ms() as f64 / 1000.0;
                self.mixer
                    .mix(&speech, speech_seconds, &path, &settings)
                    .await?
            }
            None => speech,
        };

        let mp3 = self
            .audio_tool
            .transcode_mp3(&final_audio, self.settings.mp3_quality)
            .await?;
        tracing::info!(run_id = %run_id, mp3 = %mp3.display(), "Episode audio encoded");

        let title = dated_title(request.date, &request.title);
        let image_url = public_object_url(&self.settings.public_base_url, &request.image_path);

        let mut published = self.publish_existing(&mp3, &title, &image_url).await?;
        published.run_id = run_id;
        Ok(published)
    }

    /// 发布已有的 MP3: 探测时长、复制到资源目录、上传、更新 feed
    pub async fn publish_existing(
        &self,
        mp3: &Path,
        title: &str,
        image_url: &str,
    ) -> Result<PublishedEpisode, PipelineError> {
        ensure_exists("Episode audio", mp3)?;
        let duration_seconds = self.audio_tool.probe_duration(mp3).await?;

        let name = asset_filename(title, duration_seconds);
        tokio::fs::create_dir_all(&self.settings.assets_dir)
            .await
            .map_err(|e| PipelineError::io("creating assets directory", e))?;
        let asset_path = self.settings.assets_dir.join(&name);
        if same_file(mp3, &asset_path).await {
            tracing::debug!(path = %asset_path.display(), "Episode already in assets directory");
        } else {
            tokio::fs::copy(mp3, &asset_path)
                .await
                .map_err(|e| PipelineError::io(format!("copying to {}", asset_path.display()), e))?;
        }

        let data = tokio::fs::read(&asset_path)
            .await
            .map_err(|e| PipelineError::io(format!("reading {}", asset_path.display()), e))?;
        let url = self.store.put_public(&name, data, EPISODE_MIME_TYPE).await?;
        tracing::info!(url = %url, duration_seconds, "Episode uploaded");

        let feed = self
            .feed
            .publish(&NewEpisode {
                url: url.clone(),
                title: title.to_string(),
                duration_seconds,
                image_url: image_url.to_string(),
            })
            .await?;

        Ok(PublishedEpisode {
            run_id: Uuid::new_v4(),
            title: title.to_string(),
            url,
            duration_seconds,
            asset_path,
            feed_entries: feed.len(),
        })
    }
}

/// 两个路径是否指向同一文件；任一路径无法解析时视为不同
async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
