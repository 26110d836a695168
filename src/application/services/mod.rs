//! Application Services - 用例实现
//!
//! 每个服务只依赖端口 trait，具体实现由 main 显式注入

mod background_mixer;
mod chunk_synthesizer;
mod episode_pipeline;
mod feed_synchronizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use background_mixer::{output_path_for, BackgroundMixer};
pub use chunk_synthesizer::{ChunkSynthesizer, StagingArea, SynthesisParams};
pub use episode_pipeline::{
    asset_filename, dated_title, BackgroundRequest, EpisodePipeline, EpisodeRequest,
    PipelineSettings, PublishedEpisode, SPEECH_TRACK_FILENAME,
};
pub use feed_synchronizer::{FeedSettings, FeedSynchronizer, NewEpisode, FEED_CONTENT_TYPE};
