//! # Domain Services
//!
//! エンティティに属さないビジネスルール
//!
//! - **RetryPolicy**: アップロード再試行の回数と待機時間

pub mod retry_policy;
