//! 有界重试
//!
//! 固定间隔、固定次数，无抖动、无指数退避。
//! 由调用方提供分类函数区分可重试与不可重试的错误。

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// 默认最大尝试次数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// 默认重试间隔
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（包括第一次），0 按 1 处理
    pub max_attempts: u32,
    /// 两次尝试之间的等待时间
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// 重试失败
#[derive(Debug)]
pub enum RetryError<E> {
    /// 所有尝试都失败
    Exhausted { attempts: u32, last: E },
    /// 遇到不可重试的错误，立即停止
    Fatal { attempt: u32, error: E },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Fatal { attempt, .. } => *attempt,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Fatal { error, .. } => error,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted { attempts, last } => {
                write!(f, "failed after {} attempts: {}", attempts, last)
            }
            RetryError::Fatal { attempt, error } => {
                write!(f, "non-retryable failure on attempt {}: {}", attempt, error)
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// 按策略执行 `op`，`op` 收到当前尝试序号（从 1 开始）
///
/// 最后一次失败之后不再等待。
pub async fn retry<T, E, Op, Fut, C>(
    policy: &RetryPolicy,
    operation: &str,
    mut is_retryable: C,
    mut op: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&E) -> bool,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !is_retryable(&error) => {
                tracing::error!(operation, attempt, error = %error, "Non-retryable failure");
                return Err(RetryError::Fatal { attempt, error });
            }
            Err(error) => {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    error = %error,
                    "Attempt failed"
                );
                if attempt >= max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
                tokio::time::sleep(policy.interval).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_secs(2));
        let start = Instant::now();

        let result: Result<&str, RetryError<String>> = retry(
            &policy,
            "test",
            |_| true,
            |attempt| async move {
                if attempt < 4 {
                    Err(format!("attempt {} failed", attempt))
                } else {
                    Ok("done")
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_without_trailing_wait() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), RetryError<String>> = retry(&policy, "test", |_| true, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom".to_string()) }
        })
        .await;

        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_stops_immediately() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        let start = Instant::now();

        let result: Result<(), RetryError<String>> = retry(
            &policy,
            "test",
            |e: &String| !e.starts_with("fatal"),
            |_| async { Err("fatal: bad input".to_string()) },
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Fatal { attempt: 1, .. }));
        assert_eq!(err.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        let result: Result<u8, RetryError<String>> =
            retry(&policy, "test", |_| true, |_| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn test_display() {
        let err: RetryError<String> = RetryError::Exhausted {
            attempts: 5,
            last: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "failed after 5 attempts: timeout");
    }
}
