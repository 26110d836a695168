//! Audio Tool Adapter - ffmpeg 实现

mod ffmpeg_tool;

pub use ffmpeg_tool::{
    mix_args, parse_duration, parse_duration_token, transcode_args, FfmpegTool, FfmpegToolConfig,
};
