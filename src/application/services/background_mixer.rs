//! 背景音乐混音

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::error::{ensure_exists, PipelineError};
use crate::application::ports::{AudioToolPort, MixJob};
use crate::domain::{MixSettings, MixTiming};

/// 混音输出路径: 与语音轨同目录，`{stem}_bg_music{.ext}`
pub fn output_path_for(speech: &Path) -> PathBuf {
    let stem = speech
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match speech.extension() {
        Some(ext) => format!("{}_bg_music.{}", stem, ext.to_string_lossy()),
        None => format!("{}_bg_music", stem),
    };
    speech.with_file_name(name)
}

pub struct BackgroundMixer {
    tool: Arc<dyn AudioToolPort>,
}

impl BackgroundMixer {
    pub fn new(tool: Arc<dyn AudioToolPort>) -> Self {
        Self { tool }
    }

    /// 将语音轨与背景音乐混合，返回输出文件路径
    ///
    /// `speech_duration_s` 为语音轨的精确时长（秒）
    pub async fn mix(
        &self,
        speech: &Path,
        speech_duration_s: f64,
        background: &Path,
        settings: &MixSettings,
    ) -> Result<PathBuf, PipelineError> {
        settings
            .validate()
            .map_err(PipelineError::InvalidConfiguration)?;
        ensure_exists("Speech track", speech)?;
        ensure_exists("Background track", background)?;

        let output = output_path_for(speech);
        match tokio::fs::remove_file(&output).await {
            Ok(()) => tracing::debug!(output = %output.display(), "Removed previous mix output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(PipelineError::io("removing previous mix output", e)),
        }

        let timing = MixTiming::compute(speech_duration_s, settings);
        tracing::info!(
            background = %background.display(),
            start_delay_ms = timing.start_delay_ms,
            fade_start = timing.fade_start_seconds,
            fade_duration = timing.fade_duration_seconds,
            total = timing.total_duration_seconds,
            "Mixing background track"
        );

        let job = MixJob {
            background: background.to_path_buf(),
            speech: speech.to_path_buf(),
            output: output.clone(),
            timing,
        };
        self.tool.mix(&job).await?;

        Ok(output)
    }
}
