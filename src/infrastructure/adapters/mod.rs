//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod feed;
pub mod storage;
pub mod transcoder;
pub mod tts;

pub use feed::*;
pub use storage::*;
pub use transcoder::*;
pub use tts::*;
