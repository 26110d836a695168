//! FFmpeg Audio Tool - 基于 ffmpeg 命令行的音频工具
//!
//! 支持：
//! - filter_complex 背景音乐混音（输出立体声 PCM WAV）
//! - 时长探测（解析 stderr 中的 `Duration: HH:MM:SS.ss`）
//! - WAV → MP3（libmp3lame + loudnorm）

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{AudioToolError, AudioToolPort, MixJob, Mp3Quality};

/// FFmpeg 工具配置
#[derive(Debug, Clone)]
pub struct FfmpegToolConfig {
    /// ffmpeg 可执行文件
    pub ffmpeg_path: PathBuf,
    /// 混音输出采样率
    pub sample_rate: u32,
}

impl Default for FfmpegToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            sample_rate: 44100,
        }
    }
}

/// 混音参数: 输入 0 为背景音乐，输入 1 为语音
pub fn mix_args(job: &MixJob, sample_rate: u32) -> Vec<OsString> {
    vec![
        "-i".into(),
        job.background.clone().into(),
        "-i".into(),
        job.speech.clone().into(),
        "-filter_complex".into(),
        job.timing.filter_graph().into(),
        "-map".into(),
        "[out]".into(),
        "-c:a".into(),
        "pcm_s16le".into(),
        "-ac".into(),
        "2".into(),
        "-ar".into(),
        sample_rate.to_string().into(),
        "-y".into(),
        job.output.clone().into(),
    ]
}

/// MP3 转码参数
pub fn transcode_args(input: &Path, output: &Path, quality: Mp3Quality) -> Vec<OsString> {
    let [flag, value] = quality.ffmpeg_args();
    vec![
        "-i".into(),
        input.into(),
        "-af".into(),
        "loudnorm".into(),
        "-codec:a".into(),
        "libmp3lame".into(),
        flag.into(),
        value.into(),
        output.into(),
    ]
}

/// 从 ffmpeg stderr 中解析时长，向下取整到秒
pub fn parse_duration(stderr: &str) -> Option<u64> {
    let line = stderr.lines().find(|l| l.contains("Duration: "))?;
    let token = line.split("Duration: ").nth(1)?.split(',').next()?.trim();
    parse_duration_token(token)
}

/// 解析 `HH:MM:SS.ss`
pub fn parse_duration_token(token: &str) -> Option<u64> {
    let mut parts = token.split(':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    if !total.is_finite() || total < 0.0 {
        return None;
    }
    Some(total as u64)
}

/// 最后若干行 stderr，用于错误信息
fn tail(stderr: &str, lines: usize) -> String {
    let all: Vec<&str> = stderr.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

/// FFmpeg 音频工具
pub struct FfmpegTool {
    config: FfmpegToolConfig,
}

impl FfmpegTool {
    pub fn new(config: FfmpegToolConfig) -> Self {
        Self { config }
    }

    fn tool_name(&self) -> String {
        self.config.ffmpeg_path.display().to_string()
    }

    /// 运行 ffmpeg，返回 stderr 文本
    async fn run(
        &self,
        operation: &'static str,
        args: Vec<OsString>,
    ) -> Result<String, AudioToolError> {
        tracing::debug!(operation, args = ?args, "Running ffmpeg");

        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-hide_banner")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AudioToolError::Spawn {
                tool: self.tool_name(),
                reason: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(AudioToolError::Failed {
                tool: self.tool_name(),
                operation,
                status: output.status.to_string(),
                diagnostics: tail(&stderr, 20),
            });
        }
        Ok(stderr)
    }
}

async fn ensure_input(path: &Path) -> Result<(), AudioToolError> {
    match tokio::fs::metadata(path).await {
        Ok(m) if m.is_file() => Ok(()),
        _ => Err(AudioToolError::InputNotFound(path.to_path_buf())),
    }
}

#[async_trait]
impl AudioToolPort for FfmpegTool {
    async fn mix(&self, job: &MixJob) -> Result<(), AudioToolError> {
        ensure_input(&job.background).await?;
        ensure_input(&job.speech).await?;

        self.run("mix", mix_args(job, self.config.sample_rate)).await?;
        tracing::info!(output = %job.output.display(), "Background mix written");
        Ok(())
    }

    async fn probe_duration(&self, input: &Path) -> Result<u64, AudioToolError> {
        ensure_input(input).await?;

        let args = vec![
            OsString::from("-i"),
            input.into(),
            "-f".into(),
            "null".into(),
            "-".into(),
        ];
        let stderr = self.run("probe", args).await?;
        let seconds = parse_duration(&stderr).ok_or_else(|| {
            AudioToolError::ParseOutput(format!("no Duration line for {}", input.display()))
        })?;

        tracing::debug!(input = %input.display(), seconds, "Probed duration");
        Ok(seconds)
    }

    async fn transcode_mp3(
        &self,
        input: &Path,
        quality: Mp3Quality,
    ) -> Result<PathBuf, AudioToolError> {
        ensure_input(input).await?;

        let output = input.with_extension("mp3");
        match tokio::fs::remove_file(&output).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AudioToolError::IoError(e.to_string())),
        }

        self.run("transcode", transcode_args(input, &output, quality))
            .await?;
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            quality = %quality,
            "Transcoded to MP3"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MixSettings, MixTiming};

    #[test]
    fn test_parse_duration() {
        let stderr = "Input #0, wav, from 'tts_output.wav':\n  \
                      Duration: 00:01:23.45, bitrate: 768 kb/s\n  \
                      Stream #0:0: Audio: pcm_s16le";
        assert_eq!(parse_duration(stderr), Some(83));
        assert_eq!(parse_duration_token("01:00:00.99"), Some(3600));
        assert_eq!(parse_duration_token("00:00:00.40"), Some(0));
        assert_eq!(parse_duration("  Duration: N/A, start: 0.000000"), None);
        assert_eq!(parse_duration("no duration here"), None);
    }

    #[test]
    fn test_mix_args() {
        let job = MixJob {
            background: PathBuf::from("/bg/calm.wav"),
            speech: PathBuf::from("/work/tts_output.wav"),
            output: PathBuf::from("/work/tts_output_bg_music.wav"),
            timing: MixTiming::compute(10.0, &MixSettings::from_options(Some(2000), Some(5.0))),
        };
        let args: Vec<String> = mix_args(&job, 44100)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args[1], "/bg/calm.wav");
        assert_eq!(args[3], "/work/tts_output.wav");
        assert!(args[5].contains("afade=t=out:st=12:d=5"));
        assert!(args[5].contains("atrim=end=17"));
        assert_eq!(&args[6..14], ["-map", "[out]", "-c:a", "pcm_s16le", "-ac", "2", "-ar", "44100"]);
        assert_eq!(args.last().map(String::as_str), Some("/work/tts_output_bg_music.wav"));
    }

    #[test]
    fn test_transcode_args() {
        let args: Vec<String> = transcode_args(
            Path::new("/work/a.wav"),
            Path::new("/work/a.mp3"),
            Mp3Quality::Cbr192,
        )
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
        assert_eq!(
            args,
            [
                "-i",
                "/work/a.wav",
                "-af",
                "loudnorm",
                "-codec:a",
                "libmp3lame",
                "-b:a",
                "192k",
                "/work/a.mp3"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_input() {
        let tool = FfmpegTool::new(FfmpegToolConfig::default());
        let err = tool
            .probe_duration(Path::new("/nonexistent/file.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioToolError::InputNotFound(_)));
    }

    fn tool_at(path: &str) -> FfmpegTool {
        FfmpegTool::new(FfmpegToolConfig {
            ffmpeg_path: PathBuf::from(path),
            ..FfmpegToolConfig::default()
        })
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("speech.wav");
        std::fs::write(&input, b"RIFF").unwrap();

        let err = tool_at("/nonexistent/bin/ffmpeg")
            .probe_duration(&input)
            .await
            .unwrap_err();

        match err {
            AudioToolError::Spawn { tool, .. } => assert_eq!(tool, "/nonexistent/bin/ffmpeg"),
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let job = MixJob {
            background: dir.path().join("calm.wav"),
            speech: dir.path().join("speech.wav"),
            output: dir.path().join("speech_bg_music.wav"),
            timing: MixTiming::compute(3.0, &MixSettings::default()),
        };
        std::fs::write(&job.background, b"RIFF").unwrap();
        std::fs::write(&job.speech, b"RIFF").unwrap();

        let err = tool_at("false").mix(&job).await.unwrap_err();

        match err {
            AudioToolError::Failed {
                tool, operation, ..
            } => {
                assert_eq!(tool, "false");
                assert_eq!(operation, "mix");
            }
            other => panic!("expected failed exit, got {:?}", other),
        }
        assert!(!job.output.exists());
    }
}
