//! 分块语音合成与合并
//!
//! 按顺序为每个文本块调用一次 TTS（带重试），落盘到临时目录，
//! 再解码为 AudioSegment 并合并为一条语音轨。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::error::{ensure_exists, PipelineError};
use crate::application::ports::{SynthesisRequest, TtsEnginePort, TtsError};
use crate::application::retry::{retry, RetryError, RetryPolicy};
use crate::domain::audio::{
    decode_segment, encode_track, merge_segments, AudioSegment, MergedTrack,
};
use crate::domain::TextChunk;

/// 片段临时目录
///
/// 一个临时目录同时只服务一次运行
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 清空并重建目录
    pub async fn clear(&self) -> Result<(), PipelineError> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(PipelineError::io("clearing staging directory", e)),
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PipelineError::io("creating staging directory", e))
    }

    pub fn segment_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("segment_{:04}.wav", index))
    }

    /// 写入一个片段，返回其路径
    pub async fn land(&self, index: usize, data: &[u8]) -> Result<PathBuf, PipelineError> {
        let path = self.segment_path(index);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| PipelineError::io(format!("writing {}", path.display()), e))?;
        Ok(path)
    }
}

/// 合成参数
#[derive(Debug, Clone)]
pub struct SynthesisParams {
    /// 参考音色文件
    pub voice_sample: PathBuf,
    /// 推理迭代次数
    pub timesteps: u32,
}

/// 分块合成器
pub struct ChunkSynthesizer {
    tts: Arc<dyn TtsEnginePort>,
    retry: RetryPolicy,
    staging: StagingArea,
}

impl ChunkSynthesizer {
    pub fn new(tts: Arc<dyn TtsEnginePort>, retry: RetryPolicy, staging: StagingArea) -> Self {
        Self {
            tts,
            retry,
            staging,
        }
    }

    /// 逐块合成，返回按块顺序排列的音频片段
    ///
    /// 参考音色不存在时不发起任何调用。
    pub async fn synthesize(
        &self,
        chunks: &[TextChunk],
        params: &SynthesisParams,
    ) -> Result<Vec<AudioSegment>, PipelineError> {
        ensure_exists("Voice reference", &params.voice_sample)?;

        let mut segments = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let request = SynthesisRequest {
                chunk_index: chunk.index,
                text: chunk.text.clone(),
                voice_sample: params.voice_sample.clone(),
                timesteps: params.timesteps,
            };
            let response = retry(
                &self.retry,
                "tts inference",
                TtsError::is_retryable,
                |_| {
                    let tts = Arc::clone(&self.tts);
                    let request = request.clone();
                    async move { tts.infer(request).await }
                },
            )
            .await
            .map_err(|err| match err {
                RetryError::Exhausted { attempts, last } => PipelineError::RetryExhausted {
                    operation: format!("synthesis of chunk {}", chunk.index),
                    attempts,
                    cause: last.to_string(),
                },
                RetryError::Fatal { error, .. } => PipelineError::Synthesis {
                    chunk_index: chunk.index,
                    source: error,
                },
            })?;

            let path = self.staging.land(chunk.index, &response.audio_data).await?;
            let data = tokio::fs::read(&path)
                .await
                .map_err(|e| PipelineError::io(format!("reading {}", path.display()), e))?;
            let segment =
                decode_segment(chunk.index, &data).map_err(|e| PipelineError::InvalidAudio {
                    context: path.display().to_string(),
                    source: e,
                })?;

            tracing::info!(
                chunk_index = chunk.index,
                chars = chunk.char_len(),
                duration_ms = segment.duration_ms(),
                format = %segment.format,
                "Chunk synthesized"
            );
            segments.push(segment);
        }

        Ok(segments)
    }

    /// 合成、合并并写出语音轨
    ///
    /// 运行前后都会清空临时目录，无论成功与否。
    pub async fn synthesize_to_file(
        &self,
        chunks: &[TextChunk],
        params: &SynthesisParams,
        output: &Path,
    ) -> Result<MergedTrack, PipelineError> {
        self.staging.clear().await?;
        let result = self.synthesize_and_merge(chunks, params, output).await;
        let cleanup = self.staging.clear().await;

        let track = result?;
        cleanup?;
        Ok(track)
    }

    async fn synthesize_and_merge(
        &self,
        chunks: &[TextChunk],
        params: &SynthesisParams,
        output: &Path,
    ) -> Result<MergedTrack, PipelineError> {
        let segments = self.synthesize(chunks, params).await?;
        let track = merge_segments(&segments)?;

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::io("creating work directory", e))?;
        }
        tokio::fs::write(output, encode_track(&track))
            .await
            .map_err(|e| PipelineError::io(format!("writing {}", output.display()), e))?;

        tracing::info!(
            segments = track.segment_count,
            duration_ms = track.duration_ms(),
            output = %output.display(),
            "Speech track merged"
        );
        Ok(track)
    }
}
