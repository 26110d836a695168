//! Newscast - 语音节目生成与播客发布
//!
//! 所有服务客户端在这里显式构建，再注入到各个组件

mod cli;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use newscast::application::ports::{
    public_object_url, AudioToolPort, FeedSourcePort, Mp3Quality, ObjectStorePort, TtsEnginePort,
};
use newscast::application::services::{
    BackgroundMixer, BackgroundRequest, ChunkSynthesizer, EpisodePipeline, EpisodeRequest,
    FeedSettings, FeedSynchronizer, PipelineSettings, PublishedEpisode, StagingArea,
};
use newscast::application::RetryPolicy;
use newscast::config::{
    load_config, load_config_from_path, print_config, AppConfig, LogConfig, StorageBackend,
    TtsBackend,
};
use newscast::domain::feed::{ChannelImage, ChannelMeta};
use newscast::domain::{chunk_text, MixSettings};
use newscast::infrastructure::adapters::{
    FakeTtsClient, FakeTtsClientConfig, FfmpegTool, FfmpegToolConfig, FileFeedSource,
    FileObjectStore, HttpFeedSource, HttpTtsClient, HttpTtsClientConfig, S3ObjectStore,
    S3StoreConfig,
};

use cli::{Cli, Commands};

/// 读取已发布 feed 的超时
const FEED_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},newscast={}", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_tts(config: &AppConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    let tts: Arc<dyn TtsEnginePort> = match config.tts.backend {
        TtsBackend::Http => {
            let tts_config = HttpTtsClientConfig::new(&config.tts.url)
                .with_timeout(config.tts.timeout_secs);
            Arc::new(HttpTtsClient::new(tts_config)?)
        }
        TtsBackend::Fake => Arc::new(FakeTtsClient::new(FakeTtsClientConfig::default())),
    };
    Ok(tts)
}

fn build_audio_tool(config: &AppConfig) -> Arc<dyn AudioToolPort> {
    Arc::new(FfmpegTool::new(FfmpegToolConfig {
        ffmpeg_path: config.audio.ffmpeg_path.clone(),
        sample_rate: config.audio.sample_rate,
    }))
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStorePort>> {
    let storage = &config.storage;
    let store: Arc<dyn ObjectStorePort> = match storage.backend {
        StorageBackend::S3 => Arc::new(S3ObjectStore::new(S3StoreConfig {
            bucket: storage.bucket.clone(),
            endpoint: storage.endpoint.clone(),
            region: storage.region.clone(),
            access_key: storage.access_key.clone(),
            secret_key: storage.secret_key.clone(),
            public_base_url: storage.public_base_url.clone(),
        })),
        StorageBackend::File => Arc::new(
            FileObjectStore::new(&storage.local_root, storage.public_base_url.clone()).await?,
        ),
    };
    Ok(store)
}

fn build_feed_source(config: &AppConfig) -> anyhow::Result<Arc<dyn FeedSourcePort>> {
    let feed_filename = &config.podcast.feed_filename;
    let source: Arc<dyn FeedSourcePort> = match config.storage.backend {
        StorageBackend::S3 => Arc::new(HttpFeedSource::new(
            public_object_url(&config.storage.public_base_url, feed_filename),
            FEED_FETCH_TIMEOUT,
        )?),
        StorageBackend::File => Arc::new(FileFeedSource::new(
            config.storage.local_root.join(feed_filename),
        )),
    };
    Ok(source)
}

fn channel_meta(config: &AppConfig) -> ChannelMeta {
    let base = &config.storage.public_base_url;
    ChannelMeta {
        title: config.podcast.title.clone(),
        link: base.clone(),
        description: config.podcast.description.clone(),
        language: config.podcast.language.clone(),
        image: ChannelImage {
            url: public_object_url(base, &config.podcast.main_image_path),
            title: config.podcast.title.clone(),
            link: base.clone(),
        },
    }
}

async fn build_pipeline(config: &AppConfig) -> anyhow::Result<EpisodePipeline> {
    let tts = build_tts(config)?;
    let audio_tool = build_audio_tool(config);
    let store = build_store(config).await?;
    let feed_source = build_feed_source(config)?;

    let retry = RetryPolicy::new(
        config.tts.max_attempts,
        Duration::from_secs(config.tts.retry_interval_secs),
    );
    let synthesizer = ChunkSynthesizer::new(
        tts,
        retry,
        StagingArea::new(&config.audio.staging_dir),
    );
    let feed = FeedSynchronizer::new(
        feed_source,
        store.clone(),
        FeedSettings {
            channel: channel_meta(config),
            assets_dir: config.storage.assets_dir.clone(),
            feed_filename: config.podcast.feed_filename.clone(),
        },
    );
    let settings = PipelineSettings {
        voices_dir: config.tts.voices_dir.clone(),
        bg_tracks_dir: config.audio.bg_tracks_dir.clone(),
        work_dir: config.audio.work_dir.clone(),
        assets_dir: config.storage.assets_dir.clone(),
        max_chunk_chars: config.tts.max_chunk_chars,
        timesteps: config.tts.timesteps,
        mp3_quality: config.audio.quality()?,
        public_base_url: config.storage.public_base_url.clone(),
    };

    Ok(EpisodePipeline::new(
        synthesizer,
        BackgroundMixer::new(audio_tool.clone()),
        audio_tool,
        store,
        feed,
        settings,
    ))
}

async fn read_text(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read text file {}", path.display()))
}

fn report(published: &PublishedEpisode) {
    println!("Published: {}", published.title);
    println!("  URL:      {}", published.url);
    println!("  Duration: {}s", published.duration_seconds);
    println!("  Asset:    {}", published.asset_path.display());
    println!("  Feed:     {} entries", published.feed_entries);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match cli.config.as_deref() {
        Some(path) => load_config_from_path(Some(path)),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);
    print_config(&config);

    match cli.command {
        Commands::Episode(cmd) => {
            let text = read_text(&cmd.text).await?;
            let background = cmd.bg_track.map(|track| BackgroundRequest {
                track,
                settings: MixSettings::from_options(cmd.start_delay_ms, cmd.fade_duration_s),
            });
            let request = EpisodeRequest {
                text,
                voice: cmd.voice,
                title: cmd.title,
                image_path: cmd.image,
                date: chrono::Utc::now().date_naive(),
                background,
            };

            let pipeline = build_pipeline(&config).await?;
            let published = pipeline.create_episode(request).await?;
            tracing::info!(run_id = %published.run_id, url = %published.url, "Episode run complete");
            report(&published);
        }
        Commands::Publish(cmd) => {
            let pipeline = build_pipeline(&config).await?;
            let image_url = public_object_url(&config.storage.public_base_url, &cmd.image);
            let published = pipeline
                .publish_existing(&cmd.mp3, &cmd.title, &image_url)
                .await?;
            report(&published);
        }
        Commands::Chunks(cmd) => {
            let text = read_text(&cmd.text).await?;
            let max_chars = cmd.max_chars.unwrap_or(config.tts.max_chunk_chars);
            for chunk in chunk_text(&text, max_chars) {
                if cmd.json {
                    println!("{}", serde_json::to_string(&chunk)?);
                } else {
                    println!("[{:04}] ({} chars) {}", chunk.index, chunk.char_len(), chunk.text);
                }
            }
        }
        Commands::Duration(cmd) => {
            let seconds = build_audio_tool(&config).probe_duration(&cmd.file).await?;
            println!("{}", seconds);
        }
        Commands::Transcode(cmd) => {
            let quality: Mp3Quality = match cmd.quality {
                Some(q) => q.parse()?,
                None => config.audio.quality()?,
            };
            let output = build_audio_tool(&config)
                .transcode_mp3(&cmd.file, quality)
                .await?;
            println!("{}", output.display());
        }
        Commands::List => {
            let store = build_store(&config).await?;
            for key in store.list_keys().await? {
                println!("{}", key);
            }
        }
    }

    Ok(())
}
