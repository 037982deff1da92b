//! # Run Batch Use Case
//!
//! 発見したデータセットを1件ずつ順番に処理し、成否を集計する

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::use_cases::upload_dataset::{DatasetOutcome, UploadDatasetUseCase};
use crate::domain::entities::dataset_folder::DatasetFolder;
use crate::domain::entities::upload_status::UploadStatus;
use crate::domain::repositories::ledger_repository::{latest_statuses, LedgerRepository};
use crate::domain::repositories::operation_log::OperationLog;
use crate::domain::repositories::remote_client::RemoteClient;

/// バッチ実行結果のサマリー
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// 処理対象になったデータセット数
    pub total: usize,
    /// 成功したデータセット数
    pub successful: usize,
    /// 失敗したデータセット数
    pub failed: usize,
    /// 再開モードでスキップしたデータセット
    pub skipped: Vec<String>,
    /// 処理順の結果
    pub outcomes: Vec<DatasetOutcome>,
}

impl BatchSummary {
    /// 失敗が1件もなかったか
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// バッチ実行ユースケース
///
/// データセットは発見順に1件ずつ処理する（並行実行しない）。
/// 失敗理由は見ずに件数だけを数える。
pub struct RunBatchUseCase<C: RemoteClient, L: LedgerRepository, O: OperationLog> {
    upload_use_case: Arc<UploadDatasetUseCase<C, L, O>>,
    ledger_repository: Arc<L>,
    operation_log: Arc<O>,
}

impl<C: RemoteClient, L: LedgerRepository, O: OperationLog> RunBatchUseCase<C, L, O> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `upload_use_case` - データセット1件分のワークフロー
    /// * `ledger_repository` - 結果台帳（再開モードで参照）
    /// * `operation_log` - 操作ログ
    pub fn new(
        upload_use_case: Arc<UploadDatasetUseCase<C, L, O>>,
        ledger_repository: Arc<L>,
        operation_log: Arc<O>,
    ) -> Self {
        Self {
            upload_use_case,
            ledger_repository,
            operation_log,
        }
    }

    /// バッチを実行する
    ///
    /// # Arguments
    ///
    /// * `folders` - 処理するデータセットフォルダ（この順で処理する）
    /// * `resume` - 台帳上の最新ステータスが `SUCCESS` のデータセットをスキップする
    ///
    /// # Errors
    ///
    /// 結果台帳の読み書きに失敗した場合にエラーを返す
    pub async fn execute(&self, folders: &[DatasetFolder], resume: bool) -> Result<BatchSummary> {
        let log = &self.operation_log;
        let mut summary = BatchSummary::default();

        let pending: Vec<&DatasetFolder> = if resume {
            let latest = latest_statuses(&self.ledger_repository.load_all().await?);
            let (done, pending) = partition_succeeded(folders, &latest);
            for name in &done {
                log.info(&format!("Skipping {} (already uploaded)", name));
            }
            summary.skipped = done;
            pending
        } else {
            folders.iter().collect()
        };

        summary.total = pending.len();
        log.info(&format!("Found {} dataset(s) to upload", summary.total));

        for (index, folder) in pending.into_iter().enumerate() {
            let outcome = self.upload_use_case.execute(folder).await?;

            if outcome.is_success() {
                summary.successful += 1;
            } else {
                summary.failed += 1;
            }
            summary.outcomes.push(outcome);

            log.info(&format!(
                "Progress: {}/{} ({} successful, {} failed)",
                index + 1,
                summary.total,
                summary.successful,
                summary.failed
            ));
        }

        if summary.is_success() {
            log.info(&format!(
                "Upload complete: {} successful, {} failed",
                summary.successful, summary.failed
            ));
        } else {
            log.warn(&format!(
                "Upload finished with failures: {} successful, {} failed",
                summary.successful, summary.failed
            ));
        }

        Ok(summary)
    }
}

/// 台帳で成功済みのフォルダとそれ以外に分ける
fn partition_succeeded<'a>(
    folders: &'a [DatasetFolder],
    latest: &BTreeMap<String, UploadStatus>,
) -> (Vec<String>, Vec<&'a DatasetFolder>) {
    let mut done = Vec::new();
    let mut pending = Vec::new();

    for folder in folders {
        match latest.get(folder.name()) {
            Some(status) if status.is_success() => done.push(folder.name().to_string()),
            _ => pending.push(folder),
        }
    }

    (done, pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_succeeded() {
        let folders = vec![
            DatasetFolder::new("PRV-AAAA", "/o/PRV-AAAA"),
            DatasetFolder::new("PRV-BBBB", "/o/PRV-BBBB"),
            DatasetFolder::new("PRV-CCCC", "/o/PRV-CCCC"),
        ];
        let latest = BTreeMap::from([
            ("PRV-AAAA".to_string(), UploadStatus::Success),
            ("PRV-BBBB".to_string(), UploadStatus::FailedUpload),
        ]);

        let (done, pending) = partition_succeeded(&folders, &latest);

        assert_eq!(done, vec!["PRV-AAAA".to_string()]);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].name(), "PRV-BBBB");
        assert_eq!(pending[1].name(), "PRV-CCCC");
    }

    #[test]
    fn test_summary_is_success() {
        let mut summary = BatchSummary::default();
        assert!(summary.is_success());
        summary.failed = 1;
        assert!(!summary.is_success());
    }
}
