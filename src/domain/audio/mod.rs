//! Audio Context - 音频片段、合并与 WAV 封装

mod merger;
mod segment;
pub mod wav;

pub use merger::{merge_segments, MergeError, MergedTrack};
pub use segment::{AudioFormatSpec, AudioSegment, SampleEncoding};
pub use wav::{decode_segment, encode_track, WavError};
