//! # Upload Configuration DTO
//!
//! アップロード設定のData Transfer Object

use std::time::Duration;

use crate::domain::services::retry_policy::{RetryPolicy, DEFAULT_UPLOAD_TIMEOUT_SECS};

/// 説明文テンプレート中のデータセット名プレースホルダ
pub const DATASET_NAME_PLACEHOLDER: &str = "{dataset_name}";

pub const DEFAULT_DESCRIPTION_TEMPLATE: &str =
    "Auto-migrated EEG dataset for {dataset_name} from PREVeNT study";

pub const DEFAULT_TAGS: [&str; 4] = ["epilepsy.science", "eeg", "PREVeNT", "bids"];

/// アップロード設定
///
/// データセット1件分のワークフローに必要な設定情報
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// データセット説明文のテンプレート（`{dataset_name}` を置換）
    pub description_template: String,
    /// データセットに付けるタグ
    pub tags: Vec<String>,
    /// アップロード1回あたりの時間上限
    pub upload_timeout: Duration,
    /// アップロードの再試行ポリシー
    pub retry_policy: RetryPolicy,
}

impl UploadConfig {
    /// 新しいアップロード設定を作成します。
    ///
    /// # 例
    ///
    /// ```
    /// use std::time::Duration;
    /// use bidsync::application::dto::upload_config::UploadConfig;
    /// use bidsync::domain::services::retry_policy::RetryPolicy;
    ///
    /// let config = UploadConfig::new(
    ///     "Migrated dataset {dataset_name}".to_string(),
    ///     vec!["eeg".to_string()],
    ///     Duration::from_secs(600),
    ///     RetryPolicy::new(5, Duration::from_secs(2)),
    /// );
    ///
    /// assert_eq!(config.description_for("PRV-4ZHY"), "Migrated dataset PRV-4ZHY");
    /// assert_eq!(config.retry_policy.max_attempts(), 5);
    /// ```
    pub fn new(
        description_template: String,
        tags: Vec<String>,
        upload_timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            description_template,
            tags,
            upload_timeout,
            retry_policy,
        }
    }

    /// データセット名から説明文を作る
    pub fn description_for(&self, dataset_name: &str) -> String {
        self.description_template
            .replace(DATASET_NAME_PLACEHOLDER, dataset_name)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
            DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect(),
            Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            RetryPolicy::default(),
        )
    }
}
