//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_tool;
mod feed_source;
mod object_store;
mod tts_engine;

pub use audio_tool::{AudioToolError, AudioToolPort, MixJob, Mp3Quality};
pub use feed_source::{FeedFetchError, FeedSourcePort};
pub use object_store::{public_object_url, ObjectStorePort, StorageError};
pub use tts_engine::{SynthesisRequest, SynthesisResponse, TtsEnginePort, TtsError};
