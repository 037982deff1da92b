//! Configuration
//!
//! JSON設定ファイルの読み込み（全項目に既定値あり）

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapter::pennsieve::client::DEFAULT_CLI_BINARY;
use crate::application::dto::upload_config::{
    UploadConfig, DEFAULT_DESCRIPTION_TEMPLATE, DEFAULT_TAGS,
};
use crate::application::use_cases::prepare_datasets::PreparationStep;
use crate::domain::entities::dataset_folder::DEFAULT_DATASET_PREFIX;
use crate::domain::services::retry_policy::{
    RetryPolicy, DEFAULT_BACKOFF_MULTIPLIER_SECS, DEFAULT_MAX_UPLOAD_ATTEMPTS,
    DEFAULT_UPLOAD_TIMEOUT_SECS,
};

/// `max_upload_attempts` の上限
pub const MAX_UPLOAD_ATTEMPTS_LIMIT: u32 = 100;
/// `backoff_multiplier_secs` の上限（1時間）
pub const MAX_BACKOFF_MULTIPLIER_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// データセットフォルダを探すディレクトリ
    pub output_root: String,
    pub dataset_prefix: String,

    // Logs
    pub logs_dir: String,
    pub operation_log_file: String,
    pub ledger_file: String,

    // Remote CLI
    pub cli_binary: String,
    pub description_template: String,
    pub tags: Vec<String>,
    pub upload_timeout_secs: u64,
    /// アップロード以外のCLI呼び出しの時間上限（未設定なら無制限）
    pub step_timeout_secs: Option<u64>,
    pub max_upload_attempts: u32,
    pub backoff_multiplier_secs: u64,

    // Preparation commands (run with no extra arguments)
    pub reorganize_command: Vec<String>,
    pub sidecar_command: Vec<String>,

    /// 相対パスの基準ディレクトリ（設定ファイルを読んだ場合はそのディレクトリ）
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: "output".to_string(),
            dataset_prefix: DEFAULT_DATASET_PREFIX.to_string(),
            logs_dir: "output/logs".to_string(),
            operation_log_file: "upload_migration.log".to_string(),
            ledger_file: "upload_results.csv".to_string(),
            cli_binary: DEFAULT_CLI_BINARY.to_string(),
            description_template: DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
            tags: DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect(),
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
            step_timeout_secs: None,
            max_upload_attempts: DEFAULT_MAX_UPLOAD_ATTEMPTS,
            backoff_multiplier_secs: DEFAULT_BACKOFF_MULTIPLIER_SECS,
            reorganize_command: vec!["python3".to_string(), "reorganize_to_bids.py".to_string()],
            sidecar_command: vec![
                "python3".to_string(),
                "generate_bids_sidecars.py".to_string(),
            ],
            base_dir: None,
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

impl Config {
    /// 設定ファイルを読み込む
    ///
    /// ファイル内の相対パスと準備コマンドの作業ディレクトリは
    /// 設定ファイルのあるディレクトリを基準にする
    pub fn load(path: &str) -> Result<Self> {
        let file = fs::canonicalize(expand(path))
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let content = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        config.base_dir = file.parent().map(Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// 設定値の整合性チェック
    pub fn validate(&self) -> Result<()> {
        if self.dataset_prefix.is_empty() {
            bail!("dataset_prefix must not be empty");
        }
        if self.cli_binary.trim().is_empty() {
            bail!("cli_binary must not be empty");
        }
        if self.upload_timeout_secs == 0 {
            bail!("upload_timeout_secs must be greater than 0");
        }
        if self.step_timeout_secs == Some(0) {
            bail!("step_timeout_secs must be greater than 0 when set");
        }
        if self.max_upload_attempts == 0 {
            bail!("max_upload_attempts must be at least 1");
        }
        if self.max_upload_attempts > MAX_UPLOAD_ATTEMPTS_LIMIT {
            bail!(
                "max_upload_attempts must be at most {}",
                MAX_UPLOAD_ATTEMPTS_LIMIT
            );
        }
        if self.backoff_multiplier_secs > MAX_BACKOFF_MULTIPLIER_SECS {
            bail!(
                "backoff_multiplier_secs must be at most {}",
                MAX_BACKOFF_MULTIPLIER_SECS
            );
        }
        Ok(())
    }

    /// `~` を展開し、相対パスなら基準ディレクトリからのパスにする
    ///
    /// 基準ディレクトリが無い場合はカレントディレクトリ基準のまま
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let expanded = expand(path);
        match &self.base_dir {
            Some(base) if expanded.is_relative() => base.join(expanded),
            _ => expanded,
        }
    }

    pub fn output_root_path(&self) -> PathBuf {
        self.resolve_path(&self.output_root)
    }

    pub fn operation_log_path(&self) -> PathBuf {
        self.resolve_path(&self.logs_dir).join(&self.operation_log_file)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.resolve_path(&self.logs_dir).join(&self.ledger_file)
    }

    /// 準備コマンドの作業ディレクトリ
    pub fn working_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_upload_attempts,
            Duration::from_secs(self.backoff_multiplier_secs),
        )
    }

    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig::new(
            self.description_template.clone(),
            self.tags.clone(),
            Duration::from_secs(self.upload_timeout_secs),
            self.retry_policy(),
        )
    }

    /// 準備ステップ（空のコマンドは無効として除外）
    pub fn preparation_steps(&self) -> Vec<PreparationStep> {
        [
            ("reorganizer", &self.reorganize_command),
            ("sidecar generator", &self.sidecar_command),
        ]
        .into_iter()
        .filter(|(_, command)| !command.is_empty())
        .map(|(label, command)| PreparationStep::new(label, command.clone()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset_prefix, "PRV-");
        assert_eq!(config.cli_binary, "pennsieve");
        assert_eq!(config.upload_timeout_secs, 1800);
        assert!(config.step_timeout().is_none());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.ledger_path(), PathBuf::from("output/logs/upload_results.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        let json = r#"{
            "output_root": "/data/bids",
            "max_upload_attempts": 5,
            "step_timeout_secs": 300
        }"#;
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.output_root_path(), PathBuf::from("/data/bids"));
        assert_eq!(config.max_upload_attempts, 5);
        assert_eq!(config.step_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.backoff_multiplier_secs, 10);
        assert_eq!(config.tags.len(), 4);
    }

    #[test]
    fn test_load_resolves_relative_paths_against_config_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bidsync.json");
        fs::write(&config_path, r#"{ "ledger_file": "results.csv" }"#).unwrap();

        let config = Config::load(config_path.to_str().unwrap()).unwrap();

        let base = fs::canonicalize(temp_dir.path()).unwrap();
        assert_eq!(config.working_dir(), Some(base.as_path()));
        assert_eq!(config.output_root_path(), base.join("output"));
        assert_eq!(config.ledger_path(), base.join("output/logs/results.csv"));
        assert_eq!(config.resolve_path("/abs/output"), PathBuf::from("/abs/output"));
    }

    #[test]
    fn test_default_config_uses_current_dir() {
        let config = Config::default();
        assert!(config.working_dir().is_none());
        assert_eq!(config.output_root_path(), PathBuf::from("output"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load("/nonexistent/bidsync.json").is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = Config {
            max_upload_attempts: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_retry_settings() {
        let config = Config {
            backoff_multiplier_secs: u64::MAX / 2 + 1,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_upload_attempts: MAX_UPLOAD_ATTEMPTS_LIMIT + 1,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_upload_attempts: MAX_UPLOAD_ATTEMPTS_LIMIT,
            backoff_multiplier_secs: MAX_BACKOFF_MULTIPLIER_SECS,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.retry_policy().delay_after(MAX_UPLOAD_ATTEMPTS_LIMIT - 1),
            Duration::from_secs(MAX_BACKOFF_MULTIPLIER_SECS * 99)
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let config = Config {
            upload_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            step_timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_config() {
        let config = Config {
            upload_timeout_secs: 60,
            backoff_multiplier_secs: 1,
            ..Config::default()
        };
        let upload = config.upload_config();
        assert_eq!(upload.upload_timeout, Duration::from_secs(60));
        assert_eq!(upload.retry_policy.delay_after(2), Duration::from_secs(2));
    }

    #[test]
    fn test_preparation_steps_skip_empty_commands() {
        let config = Config {
            sidecar_command: vec![],
            ..Config::default()
        };
        let steps = config.preparation_steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].label, "reorganizer");
        assert_eq!(steps[0].command_line(), "python3 reorganize_to_bids.py");
    }
}
