//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::ports::{AudioToolError, Mp3Quality};
use crate::domain::DEFAULT_MAX_CHUNK_CHARS;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音频处理配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 对象存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 播客频道配置
    #[serde(default)]
    pub podcast: PodcastConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// TTS 后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    /// 外部 HTTP 服务
    #[default]
    Http,
    /// 本地生成静音（离线演练）
    Fake,
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub backend: TtsBackend,

    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 推理迭代次数
    #[serde(default = "default_timesteps")]
    pub timesteps: u32,

    /// 参考音色目录
    #[serde(default = "default_voices_dir")]
    pub voices_dir: PathBuf,

    /// 每个文本块的最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 重试间隔（秒）
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,

    /// 文本块最大字符数
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
}

fn default_tts_url() -> String {
    "http://localhost:7860".to_string()
}

fn default_tts_timeout() -> u64 {
    300
}

fn default_timesteps() -> u32 {
    25
}

fn default_voices_dir() -> PathBuf {
    PathBuf::from("voices")
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_interval() -> u64 {
    2
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHUNK_CHARS
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: TtsBackend::default(),
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
            timesteps: default_timesteps(),
            voices_dir: default_voices_dir(),
            max_attempts: default_max_attempts(),
            retry_interval_secs: default_retry_interval(),
            max_chunk_chars: default_max_chunk_chars(),
        }
    }
}

/// 音频处理配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 工作目录（合成语音轨、混音与 MP3 输出）
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// 文本块音频的临时目录
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// 背景音乐目录
    #[serde(default = "default_bg_tracks_dir")]
    pub bg_tracks_dir: PathBuf,

    /// MP3 质量: v0, v2, 192k, 320k
    #[serde(default = "default_mp3_quality")]
    pub mp3_quality: String,

    /// 混音输出采样率（Hz）
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// ffmpeg 可执行文件
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("data/work")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("data/tmp")
}

fn default_bg_tracks_dir() -> PathBuf {
    PathBuf::from("bg_tracks")
}

fn default_mp3_quality() -> String {
    "v2".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl AudioConfig {
    /// 解析 MP3 质量
    pub fn quality(&self) -> Result<Mp3Quality, AudioToolError> {
        self.mp3_quality.parse()
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            staging_dir: default_staging_dir(),
            bg_tracks_dir: default_bg_tracks_dir(),
            mp3_quality: default_mp3_quality(),
            sample_rate: default_sample_rate(),
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3 兼容存储（R2 等）
    #[default]
    S3,
    /// 本地目录
    File,
}

/// 对象存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default)]
    pub bucket: String,

    /// S3 API endpoint
    #[serde(default)]
    pub endpoint: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    /// 公开访问的 Base URL
    #[serde(default)]
    pub public_base_url: String,

    /// 本地节目资源目录
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// file 后端的根目录
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("data/assets")
}

fn default_local_root() -> PathBuf {
    PathBuf::from("data/bucket")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: String::new(),
            endpoint: String::new(),
            region: default_region(),
            access_key: String::new(),
            secret_key: String::new(),
            public_base_url: String::new(),
            assets_dir: default_assets_dir(),
            local_root: default_local_root(),
        }
    }
}

/// 播客频道配置
#[derive(Debug, Clone, Deserialize)]
pub struct PodcastConfig {
    #[serde(default = "default_podcast_title")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// 频道封面在 bucket 中的路径
    #[serde(default = "default_main_image")]
    pub main_image_path: String,

    /// feed 文件名（同时是对象 key）
    #[serde(default = "default_feed_filename")]
    pub feed_filename: String,
}

fn default_podcast_title() -> String {
    "Newscast".to_string()
}

fn default_language() -> String {
    "en-us".to_string()
}

fn default_main_image() -> String {
    "cover.png".to_string()
}

fn default_feed_filename() -> String {
    "podcast.xml".to_string()
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            title: default_podcast_title(),
            description: String::new(),
            language: default_language(),
            main_image_path: default_main_image(),
            feed_filename: default_feed_filename(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tts.backend, TtsBackend::Http);
        assert_eq!(config.tts.max_attempts, 5);
        assert_eq!(config.tts.retry_interval_secs, 2);
        assert_eq!(config.tts.max_chunk_chars, 250);
        assert_eq!(config.audio.quality().unwrap(), Mp3Quality::V2);
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.podcast.language, "en-us");
        assert_eq!(config.podcast.feed_filename, "podcast.xml");
        assert_eq!(config.log.level, "info");
    }
}
