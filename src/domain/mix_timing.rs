//! 背景音乐混音时序
//!
//! 背景音乐从 0 秒开始播放，语音延迟 `start_delay_ms` 后开始；
//! 语音结束时背景音乐开始淡出，最终按总时长截断。

use serde::{Deserialize, Serialize};

/// 淡出时长小于该值时补齐的尾部时长（秒），防止语音最后几帧被截断
const TRAILING_PAD_SECS: f64 = 1.0;

/// 混音参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixSettings {
    /// 语音相对背景音乐的延迟（毫秒）
    #[serde(default)]
    pub start_delay_ms: i64,
    /// 背景音乐淡出时长（秒）
    #[serde(default)]
    pub fade_duration_s: f64,
    /// 负值是否按 0 处理
    #[serde(default = "default_clamp")]
    pub clamp_negative_to_zero: bool,
}

fn default_clamp() -> bool {
    true
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            start_delay_ms: 0,
            fade_duration_s: 0.0,
            clamp_negative_to_zero: default_clamp(),
        }
    }
}

impl MixSettings {
    /// 从可选参数构建，缺省值均为 0
    pub fn from_options(start_delay_ms: Option<i64>, fade_duration_s: Option<f64>) -> Self {
        Self {
            start_delay_ms: start_delay_ms.unwrap_or(0),
            fade_duration_s: fade_duration_s.unwrap_or(0.0),
            ..Default::default()
        }
    }

    /// 关闭负值归零时，负值视为配置错误
    pub fn validate(&self) -> Result<(), String> {
        if self.clamp_negative_to_zero {
            return Ok(());
        }
        if self.start_delay_ms < 0 {
            return Err(format!("negative start delay: {}ms", self.start_delay_ms));
        }
        if self.fade_duration_s < 0.0 {
            return Err(format!("negative fade duration: {}s", self.fade_duration_s));
        }
        Ok(())
    }

    /// 生效的延迟（毫秒）
    pub fn effective_delay_ms(&self) -> u64 {
        self.start_delay_ms.max(0) as u64
    }

    /// 生效的淡出时长（秒），负值或非有限值视为 0
    pub fn effective_fade_s(&self) -> f64 {
        if !self.fade_duration_s.is_finite() || self.fade_duration_s < 0.0 {
            0.0
        } else {
            self.fade_duration_s
        }
    }
}

/// 混音时序
///
/// 不变量:
/// - total_duration >= start_delay + speech_duration
/// - fade_duration < 1s 时 total_duration 额外补 1s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixTiming {
    pub start_delay_ms: u64,
    pub start_delay_seconds: f64,
    pub fade_start_seconds: f64,
    pub fade_duration_seconds: f64,
    pub speech_duration_seconds: f64,
    pub total_duration_seconds: f64,
}

impl MixTiming {
    pub fn compute(speech_duration_seconds: f64, settings: &MixSettings) -> Self {
        let start_delay_ms = settings.effective_delay_ms();
        let fade = settings.effective_fade_s();
        let speech = speech_duration_seconds.max(0.0);

        let delay = start_delay_ms as f64 / 1000.0;
        let fade_start = delay + speech;
        let mut total = delay + speech + fade;
        if fade < 1.0 {
            total += TRAILING_PAD_SECS;
        }

        Self {
            start_delay_ms,
            start_delay_seconds: delay,
            fade_start_seconds: fade_start,
            fade_duration_seconds: fade,
            speech_duration_seconds: speech,
            total_duration_seconds: total,
        }
    }

    /// ffmpeg filter_complex
    ///
    /// 输入 0 为背景音乐，输入 1 为语音（单声道，上混为立体声）
    pub fn filter_graph(&self) -> String {
        let delay = self.start_delay_ms;
        format!(
            "[0:a]afade=t=out:st={}:d={}[faded_music]; \
             [1:a]pan=stereo|c0<c0|c1<c0,adelay={}|{}[delayed_tts]; \
             [faded_music][delayed_tts]amix=inputs=2:normalize=0[mixed_audio]; \
             [mixed_audio]atrim=end={}[out]",
            self.fade_start_seconds,
            self.fade_duration_seconds,
            delay,
            delay,
            self.total_duration_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_with_delay_and_fade() {
        let settings = MixSettings::from_options(Some(2000), Some(5.0));
        let timing = MixTiming::compute(10.0, &settings);
        assert_eq!(timing.start_delay_seconds, 2.0);
        assert_eq!(timing.fade_start_seconds, 12.0);
        assert_eq!(timing.total_duration_seconds, 17.0);
    }

    #[test]
    fn test_zero_fade_pads_one_second() {
        let timing = MixTiming::compute(10.0, &MixSettings::default());
        assert_eq!(timing.fade_start_seconds, 10.0);
        assert_eq!(timing.total_duration_seconds, 11.0);
    }

    #[test]
    fn test_sub_second_fade_pads() {
        let settings = MixSettings::from_options(None, Some(0.5));
        let timing = MixTiming::compute(10.0, &settings);
        assert_eq!(timing.total_duration_seconds, 11.5);
    }

    #[test]
    fn test_negative_values_clamped() {
        let settings = MixSettings::from_options(Some(-500), Some(-3.0));
        let timing = MixTiming::compute(8.0, &settings);
        assert_eq!(timing.start_delay_ms, 0);
        assert_eq!(timing.fade_duration_seconds, 0.0);
        assert_eq!(timing.total_duration_seconds, 9.0);
    }

    #[test]
    fn test_validate_without_clamping() {
        let mut settings = MixSettings::from_options(Some(-1), None);
        assert!(settings.validate().is_ok());
        settings.clamp_negative_to_zero = false;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_total_covers_delayed_speech() {
        for delay in [0, 250, 1000, 12000] {
            for fade in [0.0, 0.2, 1.0, 5.0] {
                let settings = MixSettings::from_options(Some(delay), Some(fade));
                let timing = MixTiming::compute(42.0, &settings);
                assert!(
                    timing.total_duration_seconds
                        >= timing.start_delay_seconds + timing.speech_duration_seconds
                );
            }
        }
    }

    #[test]
    fn test_filter_graph() {
        let settings = MixSettings::from_options(Some(2000), Some(5.0));
        let graph = MixTiming::compute(10.0, &settings).filter_graph();
        assert!(graph.contains("afade=t=out:st=12:d=5"));
        assert!(graph.contains("adelay=2000|2000"));
        assert!(graph.contains("amix=inputs=2:normalize=0"));
        assert!(graph.contains("atrim=end=17[out]"));
    }
}
