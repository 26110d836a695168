//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、AudioTool、ObjectStore、FeedSource）
//! - services: 分块合成、混音、feed 同步与整条流水线
//! - retry: 固定间隔有界重试
//! - error: 应用层错误定义

pub mod error;
pub mod ports;
pub mod retry;
pub mod services;

pub use error::PipelineError;
pub use retry::{retry, RetryError, RetryPolicy};

pub use ports::{
    // Audio tool
    AudioToolError,
    AudioToolPort,
    MixJob,
    Mp3Quality,
    // Feed source
    FeedFetchError,
    FeedSourcePort,
    // Object store
    ObjectStorePort,
    StorageError,
    // TTS engine
    SynthesisRequest,
    SynthesisResponse,
    TtsEnginePort,
    TtsError,
};

pub use services::{
    BackgroundMixer, BackgroundRequest, ChunkSynthesizer, EpisodePipeline, EpisodeRequest,
    FeedSettings, FeedSynchronizer, PipelineSettings, PublishedEpisode, StagingArea,
};
