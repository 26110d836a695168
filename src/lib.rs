//! Newscast - 语音节目生成与播客发布
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - text_chunker: 文本分块
//! - audio: 音频片段、合并、WAV 封装
//! - mix_timing: 背景音乐混音时序
//! - feed: Feed 聚合与 RSS 读写
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, AudioTool, ObjectStore, FeedSource）
//! - Services: 分块合成、混音、Feed 同步、整条流水线
//! - Retry: 有界重试
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP TTS Client, FFmpeg, S3 / 本地对象存储, Feed 来源

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{EpisodePipeline, PipelineError};
pub use config::{load_config, AppConfig};
