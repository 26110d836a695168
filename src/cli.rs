//! Command Line Interface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Newscast - 语音节目生成与播客发布
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径（默认搜索 config.toml / config.local.toml）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize, mix, encode and publish an episode from a text file
    Episode(EpisodeCommand),

    /// Publish an existing MP3 and update the feed
    Publish(PublishCommand),

    /// Print the chunks a text file would be split into
    Chunks(ChunksCommand),

    /// Print the duration of an audio file in whole seconds
    Duration(DurationCommand),

    /// Transcode a WAV file to MP3
    Transcode(TranscodeCommand),

    /// List objects in the episode bucket
    List,
}

#[derive(Args, Debug)]
pub struct EpisodeCommand {
    /// UTF-8 text file to read aloud
    #[arg(long)]
    pub text: PathBuf,

    /// Voice reference file name inside the voices directory
    #[arg(long)]
    pub voice: String,

    /// Episode title (the date is prefixed automatically)
    #[arg(long)]
    pub title: String,

    /// Episode image path inside the bucket
    #[arg(long)]
    pub image: String,

    /// Background track file name inside the background tracks directory
    #[arg(long)]
    pub bg_track: Option<String>,

    /// Delay before speech starts over the background track (ms)
    #[arg(long, allow_negative_numbers = true)]
    pub start_delay_ms: Option<i64>,

    /// Background fade-out duration after speech ends (s)
    #[arg(long, allow_negative_numbers = true)]
    pub fade_duration_s: Option<f64>,
}

#[derive(Args, Debug)]
pub struct PublishCommand {
    /// MP3 file to publish
    #[arg(long)]
    pub mp3: PathBuf,

    /// Episode title, used as is
    #[arg(long)]
    pub title: String,

    /// Episode image path inside the bucket
    #[arg(long)]
    pub image: String,
}

#[derive(Args, Debug)]
pub struct ChunksCommand {
    /// UTF-8 text file
    #[arg(long)]
    pub text: PathBuf,

    /// Maximum characters per chunk (defaults to tts.max_chunk_chars)
    #[arg(long)]
    pub max_chars: Option<usize>,

    /// Print one JSON object per chunk
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DurationCommand {
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct TranscodeCommand {
    pub file: PathBuf,

    /// v0, v2, 192k or 320k (defaults to audio.mp3_quality)
    #[arg(long)]
    pub quality: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_episode() {
        let cli = Cli::parse_from([
            "newscast",
            "episode",
            "--text",
            "news.txt",
            "--voice",
            "anchor.wav",
            "--title",
            "Evening News",
            "--image",
            "images/evening.png",
            "--bg-track",
            "calm.wav",
            "--start-delay-ms",
            "-250",
        ]);
        match cli.command {
            Commands::Episode(cmd) => {
                assert_eq!(cmd.bg_track.as_deref(), Some("calm.wav"));
                assert_eq!(cmd.start_delay_ms, Some(-250));
                assert_eq!(cmd.fade_duration_s, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["newscast", "list", "--config", "prod.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("prod.toml")));
        assert!(matches!(cli.command, Commands::List));
    }
}
