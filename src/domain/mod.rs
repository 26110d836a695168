//! Domain Layer - 领域层
//!
//! 纯逻辑，不做任何 I/O:
//! - text_chunker: 文本分块
//! - audio: 音频片段、合并、WAV 封装
//! - mix_timing: 背景音乐混音时序
//! - feed: 播客 feed 合并与 RSS 读写

pub mod audio;
pub mod feed;
mod mix_timing;
mod text_chunker;

pub use mix_timing::{MixSettings, MixTiming};
pub use text_chunker::{chunk_text, normalize_text, TextChunk, DEFAULT_MAX_CHUNK_CHARS};
