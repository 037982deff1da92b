//! # Retry Policy Service
//!
//! アップロードステップの再試行ルール（線形バックオフ）

use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_MULTIPLIER_SECS: u64 = 10;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 1800;

/// 再試行ポリシー
///
/// `n` 回目の試行が失敗したら `n * backoff_multiplier` 待ってから次を試す。
/// 試行回数は `max_attempts` を超えない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_multiplier: Duration,
}

impl RetryPolicy {
    /// 新しいポリシーを作成
    ///
    /// `max_attempts` が0の場合は1として扱う（アップロードは最低1回試す）
    pub fn new(max_attempts: u32, backoff_multiplier: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_multiplier,
        }
    }

    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[inline]
    pub fn backoff_multiplier(&self) -> Duration {
        self.backoff_multiplier
    }

    /// `attempt` 回目の試行の後にまだ試行が残っているか
    #[inline]
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// `attempt` 回目が失敗した後、次の試行までの待機時間
    ///
    /// オーバーフローする場合は `Duration::MAX` で頭打ちにする
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_multiplier.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_UPLOAD_ATTEMPTS,
            Duration::from_secs(DEFAULT_BACKOFF_MULTIPLIER_SECS),
        )
    }
}
