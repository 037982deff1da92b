//! # Upload Dataset Use Case
//!
//! データセット1件分のアップロードワークフロー
//!
//! `作成 → node ID 取得 → 選択 → マニフェスト作成 → manifest ID 取得 → アップロード`
//! の順に進み、どこかで失敗したら残りのステージは実行しない。
//! 再試行するのは最後のアップロードだけ。

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::sleep;

use crate::application::dto::upload_config::UploadConfig;
use crate::domain::entities::dataset_context::DatasetContext;
use crate::domain::entities::dataset_folder::DatasetFolder;
use crate::domain::entities::result_record::ResultRecord;
use crate::domain::entities::upload_status::UploadStatus;
use crate::domain::repositories::ledger_repository::LedgerRepository;
use crate::domain::repositories::operation_log::OperationLog;
use crate::domain::repositories::remote_client::{RemoteClient, RemoteError};

/// データセット1件の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOutcome {
    pub dataset_name: String,
    pub status: UploadStatus,
    pub node_id: Option<String>,
    pub manifest_id: Option<String>,
}

impl DatasetOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// データセットアップロードユースケース
///
/// 終端状態ごとに結果台帳へちょうど1行書き込む。
pub struct UploadDatasetUseCase<C: RemoteClient, L: LedgerRepository, O: OperationLog> {
    remote_client: Arc<C>,
    ledger_repository: Arc<L>,
    operation_log: Arc<O>,
    config: UploadConfig,
}

impl<C: RemoteClient, L: LedgerRepository, O: OperationLog> UploadDatasetUseCase<C, L, O> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `remote_client` - リモートクライアント
    /// * `ledger_repository` - 結果台帳リポジトリ
    /// * `operation_log` - 操作ログ
    /// * `config` - アップロード設定
    pub fn new(
        remote_client: Arc<C>,
        ledger_repository: Arc<L>,
        operation_log: Arc<O>,
        config: UploadConfig,
    ) -> Self {
        Self {
            remote_client,
            ledger_repository,
            operation_log,
            config,
        }
    }

    /// データセットを1件処理する
    ///
    /// # Returns
    ///
    /// 終端ステータスと、それまでに得られた識別子
    ///
    /// # Errors
    ///
    /// 結果台帳への書き込みに失敗した場合のみエラーを返す。
    /// リモート操作の失敗は `FAILED_*` ステータスとして返す。
    pub async fn execute(&self, folder: &DatasetFolder) -> Result<DatasetOutcome> {
        let name = folder.name();
        let log = &self.operation_log;

        log.info(&format!("Processing dataset: {}", name));

        // 1. Create dataset
        let description = self.config.description_for(name);
        log.info(&format!("Creating remote dataset '{}'", name));
        let create_output = match self
            .remote_client
            .create_dataset(name, &description, &self.config.tags)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return self
                    .finish(name, UploadStatus::FailedCreation, None, None, Some(e))
                    .await
            }
        };

        // 2. Extract node ID
        let node_id = match self.remote_client.extract_node_id(&create_output) {
            Ok(node_id) => node_id,
            Err(e) => {
                log.error(&format!("Dataset creation output was:\n{}", create_output.trim_end()));
                return self
                    .finish(name, UploadStatus::FailedNodeId, None, None, Some(e))
                    .await;
            }
        };
        log.info(&format!("Created dataset '{}' with node ID {}", name, node_id));

        // 3. Select dataset
        log.info(&format!("Switching to dataset {}", node_id));
        let context = match self.remote_client.select_dataset(name, &node_id).await {
            Ok(context) => context,
            Err(e) => {
                return self
                    .finish(name, UploadStatus::FailedSwitch, Some(node_id), None, Some(e))
                    .await
            }
        };

        // 4. Create manifest
        log.info(&format!("Creating manifest for {}", folder.path().display()));
        let manifest_output = match self
            .remote_client
            .create_manifest(&context, folder.path())
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return self
                    .finish(name, UploadStatus::FailedManifest, Some(node_id), None, Some(e))
                    .await
            }
        };

        // 5. Extract manifest ID
        let manifest_id = match self.remote_client.extract_manifest_id(&manifest_output) {
            Ok(manifest_id) => manifest_id,
            Err(e) => {
                log.error(&format!("Manifest creation output was:\n{}", manifest_output.trim_end()));
                return self
                    .finish(name, UploadStatus::FailedManifestId, Some(node_id), None, Some(e))
                    .await;
            }
        };
        log.info(&format!("Created manifest {} for dataset '{}'", manifest_id, name));

        // 6. Upload with retry
        let status = match self.upload_with_retry(&context, &manifest_id).await {
            Ok(()) => UploadStatus::Success,
            Err(e) => {
                return self
                    .finish(
                        name,
                        UploadStatus::FailedUpload,
                        Some(node_id),
                        Some(manifest_id),
                        Some(e),
                    )
                    .await
            }
        };

        self.finish(name, status, Some(node_id), Some(manifest_id), None)
            .await
    }

    /// アップロードを再試行ポリシーに従って実行する
    ///
    /// 全試行が失敗した場合は最後のエラーを返す
    async fn upload_with_retry(
        &self,
        context: &DatasetContext,
        manifest_id: &str,
    ) -> std::result::Result<(), RemoteError> {
        let log = &self.operation_log;
        let policy = self.config.retry_policy;
        let mut attempt = 1;

        loop {
            log.info(&format!(
                "Starting upload attempt {}/{} for manifest {} (timeout {}s)",
                attempt,
                policy.max_attempts(),
                manifest_id,
                self.config.upload_timeout.as_secs()
            ));

            let error = match self
                .remote_client
                .upload_manifest(context, manifest_id, self.config.upload_timeout)
                .await
            {
                Ok(output) => {
                    if !output.trim().is_empty() {
                        log.info(&format!("Upload output:\n{}", output.trim_end()));
                    }
                    log.info(&format!(
                        "Upload of manifest {} succeeded on attempt {}",
                        manifest_id, attempt
                    ));
                    return Ok(());
                }
                Err(e) => e,
            };

            if let RemoteError::UploadTimedOut { output, .. } = &error {
                if !output.trim().is_empty() {
                    log.info(&format!("Upload output before timeout:\n{}", output.trim_end()));
                }
            }

            log.warn(&format!(
                "Upload attempt {}/{} failed: {}",
                attempt,
                policy.max_attempts(),
                error
            ));

            if !policy.has_next(attempt) {
                return Err(error);
            }

            let delay = policy.delay_after(attempt);
            log.info(&format!("Waiting {}s before retrying upload", delay.as_secs()));
            sleep(delay).await;
            attempt += 1;
        }
    }

    /// 終端状態を記録して結果を返す
    async fn finish(
        &self,
        dataset_name: &str,
        status: UploadStatus,
        node_id: Option<String>,
        manifest_id: Option<String>,
        error: Option<RemoteError>,
    ) -> Result<DatasetOutcome> {
        debug_assert_eq!(
            node_id.is_some(),
            status.has_node_id(),
            "node_id presence does not match {}",
            status
        );
        debug_assert_eq!(
            manifest_id.is_some(),
            status.has_manifest_id(),
            "manifest_id presence does not match {}",
            status
        );

        if let Some(e) = error {
            self.operation_log
                .error(&format!("{} for dataset '{}': {}", status, dataset_name, e));
        }

        let record = ResultRecord::new(dataset_name, status, node_id.clone(), manifest_id.clone());
        self.ledger_repository
            .append(&record)
            .await
            .with_context(|| format!("Failed to record result for dataset {}", dataset_name))?;

        if status.is_success() {
            self.operation_log
                .info(&format!("Dataset '{}' uploaded successfully", dataset_name));
        }

        Ok(DatasetOutcome {
            dataset_name: dataset_name.to_string(),
            status,
            node_id,
            manifest_id,
        })
    }
}
