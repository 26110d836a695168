//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, StorageBackend, TtsBackend};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NEWSCAST_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NEWSCAST_TTS__URL=http://tts-server:7860`
/// - `NEWSCAST_STORAGE__BUCKET=episodes`
/// - `NEWSCAST_STORAGE__SECRET_KEY=...`
/// - `NEWSCAST_AUDIO__MP3_QUALITY=320k`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("tts.backend", "http")?
        .set_default("tts.url", "http://localhost:7860")?
        .set_default("tts.timeout_secs", 300)?
        .set_default("tts.timesteps", 25)?
        .set_default("tts.voices_dir", "voices")?
        .set_default("tts.max_attempts", 5)?
        .set_default("tts.retry_interval_secs", 2)?
        .set_default("tts.max_chunk_chars", 250)?
        .set_default("audio.work_dir", "data/work")?
        .set_default("audio.staging_dir", "data/tmp")?
        .set_default("audio.bg_tracks_dir", "bg_tracks")?
        .set_default("audio.mp3_quality", "v2")?
        .set_default("audio.sample_rate", 44100)?
        .set_default("audio.ffmpeg_path", "ffmpeg")?
        .set_default("storage.backend", "s3")?
        .set_default("storage.region", "auto")?
        .set_default("storage.assets_dir", "data/assets")?
        .set_default("storage.local_root", "data/bucket")?
        .set_default("podcast.title", "Newscast")?
        .set_default("podcast.language", "en-us")?
        .set_default("podcast.main_image_path", "cover.png")?
        .set_default("podcast.feed_filename", "podcast.xml")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("NEWSCAST")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn require(value: &str, name: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be empty",
            name
        )));
    }
    Ok(())
}

/// 验证配置有效性
///
/// 在任何外部调用之前执行
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.tts.backend == TtsBackend::Http {
        require(&config.tts.url, "tts.url")?;
    }

    if config.tts.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "tts.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.tts.max_chunk_chars == 0 {
        return Err(ConfigError::ValidationError(
            "tts.max_chunk_chars must be at least 1".to_string(),
        ));
    }

    config
        .audio
        .quality()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    if config.audio.sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "audio.sample_rate cannot be 0".to_string(),
        ));
    }

    require(&config.storage.public_base_url, "storage.public_base_url")?;
    if config.storage.backend == StorageBackend::S3 {
        require(&config.storage.bucket, "storage.bucket")?;
        require(&config.storage.endpoint, "storage.endpoint")?;
        require(&config.storage.access_key, "storage.access_key")?;
        require(&config.storage.secret_key, "storage.secret_key")?;
    }

    require(&config.podcast.feed_filename, "podcast.feed_filename")?;

    Ok(())
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "********"
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Newscast Configuration ===");
    tracing::info!("TTS Backend: {:?}", config.tts.backend);
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!(
        "TTS Retry: {} attempts, {}s interval",
        config.tts.max_attempts,
        config.tts.retry_interval_secs
    );
    tracing::info!("Max Chunk Chars: {}", config.tts.max_chunk_chars);
    tracing::info!("Voices Directory: {:?}", config.tts.voices_dir);
    tracing::info!("Work Directory: {:?}", config.audio.work_dir);
    tracing::info!("MP3 Quality: {}", config.audio.mp3_quality);
    tracing::info!("Storage Backend: {:?}", config.storage.backend);
    if config.storage.backend == StorageBackend::S3 {
        tracing::info!("Bucket: {} @ {}", config.storage.bucket, config.storage.endpoint);
        tracing::info!("Access Key: {}", redact(&config.storage.access_key));
        tracing::info!("Secret Key: {}", redact(&config.storage.secret_key));
    } else {
        tracing::info!("Local Root: {:?}", config.storage.local_root);
    }
    tracing::info!("Public Base URL: {}", config.storage.public_base_url);
    tracing::info!("Assets Directory: {:?}", config.storage.assets_dir);
    tracing::info!("Feed: {}", config.podcast.feed_filename);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("==============================");
}
