//! Workflow Orchestration
//!
//! ワークフローのオーケストレーション（依存性の組み立て）

use anyhow::Result;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapter::config::Config;
use crate::adapter::pennsieve::client::PennsieveClient;
use crate::adapter::process::tokio_runner::TokioCommandRunner;
use crate::adapter::repositories::csv_ledger_repository::CsvLedgerRepository;
use crate::adapter::repositories::file_operation_log::FileOperationLog;
use crate::adapter::repositories::fs_dataset_repository::FsDatasetRepository;
use crate::application::use_cases::discover_datasets::DiscoverDatasetsUseCase;
use crate::application::use_cases::prepare_datasets::PrepareDatasetsUseCase;
use crate::application::use_cases::run_batch::{BatchSummary, RunBatchUseCase};
use crate::application::use_cases::upload_dataset::UploadDatasetUseCase;
use crate::domain::repositories::operation_log::OperationLog;

use super::cli::Args;

/// プロセスの終了コード
///
/// 失敗したデータセットが1件も無ければ0、それ以外（致命的エラーを含む）は1
pub fn exit_status(result: &Result<BatchSummary>) -> u8 {
    match result {
        Ok(summary) if summary.is_success() => 0,
        _ => 1,
    }
}

/// Migration Workflow
pub struct MigrationWorkflow {
    config: Config,
    mirror_to_stdout: bool,
}

impl MigrationWorkflow {
    /// Create a new workflow instance with dependency injection
    pub fn new(config: Config) -> Self {
        Self {
            config,
            mirror_to_stdout: true,
        }
    }

    /// 操作ログを標準出力にミラーするか（既定: する）
    pub fn with_stdout_mirror(mut self, enabled: bool) -> Self {
        self.mirror_to_stdout = enabled;
        self
    }

    /// Execute the migration workflow
    ///
    /// # Errors
    ///
    /// 準備ステップの失敗、ログ・台帳ファイルの入出力エラーなど、
    /// バッチ全体を中止すべき場合にエラーを返す
    pub async fn execute(&self, args: &Args) -> Result<BatchSummary> {
        let config = &self.config;
        let operation_log = Arc::new(FileOperationLog::open(
            &config.operation_log_path(),
            self.mirror_to_stdout,
        )?);

        let run_id = uuid::Uuid::new_v4();
        info!("Starting migration run {}", run_id);
        operation_log.info(&format!("=== Migration run {} started ===", run_id));
        if args.dry_run {
            operation_log.info("Dry run: the remote CLI will not be called");
        }

        // Preparation (fatal on failure)
        let steps = config.preparation_steps();
        if args.skip_prepare {
            operation_log.info("Skipping preparation steps");
        } else if args.dry_run {
            for step in &steps {
                operation_log.info(&format!("Would run {}: {}", step.label, step.command_line()));
            }
        } else {
            let mut prepare_runner = TokioCommandRunner::new();
            if let Some(dir) = config.working_dir() {
                prepare_runner = prepare_runner.with_current_dir(dir);
            }
            PrepareDatasetsUseCase::new(Arc::new(prepare_runner), operation_log.clone())
                .execute(&steps)
                .await?;
        }

        // Discovery
        let output_root = args
            .output_root
            .as_deref()
            .map(|root| PathBuf::from(shellexpand::tilde(root).as_ref()))
            .unwrap_or_else(|| config.output_root_path());
        let folders = DiscoverDatasetsUseCase::new(Arc::new(FsDatasetRepository::new()))
            .execute(&output_root, &config.dataset_prefix)
            .await?;
        operation_log.info(&format!(
            "Discovered {} dataset folder(s) in {}",
            folders.len(),
            output_root.display()
        ));

        if args.dry_run {
            for folder in &folders {
                operation_log.info(&format!(
                    "Would upload {} from {}",
                    folder.name(),
                    folder.path().display()
                ));
            }
            operation_log.info(&format!("=== Migration run {} finished (dry run) ===", run_id));
            return Ok(BatchSummary {
                total: folders.len(),
                ..BatchSummary::default()
            });
        }

        // Upload
        let ledger = Arc::new(CsvLedgerRepository::new(config.ledger_path()));
        ledger.initialize()?;

        let client = Arc::new(PennsieveClient::new(
            Arc::new(TokioCommandRunner::new()),
            config.cli_binary.clone(),
            config.step_timeout(),
        ));
        let upload_use_case = Arc::new(UploadDatasetUseCase::new(
            client,
            ledger.clone(),
            operation_log.clone(),
            config.upload_config(),
        ));
        let batch = RunBatchUseCase::new(upload_use_case, ledger.clone(), operation_log.clone());

        let summary = batch.execute(&folders, args.resume).await?;

        operation_log.info(&format!(
            "Results recorded in {}",
            ledger.path().display()
        ));
        operation_log.info(&format!("=== Migration run {} finished ===", run_id));
        info!(
            "Migration run {} finished: {} successful, {} failed",
            run_id, summary.successful, summary.failed
        );

        Ok(summary)
    }
}
