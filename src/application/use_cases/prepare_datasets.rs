//! # Prepare Datasets Use Case
//!
//! アップロード前の準備（BIDS形式への再構成、サイドカー生成）
//!
//! どちらも外部コマンドとして引数なしで実行し、非ゼロ終了ならバッチ全体を中止する。

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::domain::repositories::command_runner::CommandRunner;
use crate::domain::repositories::operation_log::OperationLog;

/// 準備ステップ（外部コマンド1つ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparationStep {
    /// ログ表示用の名前
    pub label: String,
    /// プログラムと引数
    pub command: Vec<String>,
}

impl PreparationStep {
    pub fn new(label: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            label: label.into(),
            command,
        }
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// 準備ユースケース
pub struct PrepareDatasetsUseCase<R: CommandRunner, O: OperationLog> {
    command_runner: Arc<R>,
    operation_log: Arc<O>,
}

impl<R: CommandRunner, O: OperationLog> PrepareDatasetsUseCase<R, O> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `command_runner` - 外部コマンドの実行
    /// * `operation_log` - 操作ログ
    pub fn new(command_runner: Arc<R>, operation_log: Arc<O>) -> Self {
        Self {
            command_runner,
            operation_log,
        }
    }

    /// 準備ステップを順番に実行する
    ///
    /// # Errors
    ///
    /// いずれかのステップが起動できない、または非ゼロで終了した場合にエラーを返す。
    /// 後続のステップは実行しない。
    pub async fn execute(&self, steps: &[PreparationStep]) -> Result<()> {
        let log = &self.operation_log;

        for step in steps {
            let Some((program, args)) = step.command.split_first() else {
                log.error(&format!("{} has an empty command line", step.label));
                bail!("{} has an empty command line", step.label);
            };

            log.info(&format!("Running {}: {}", step.label, step.command_line()));

            let output = match self.command_runner.run(program, args, None).await {
                Ok(output) => output,
                Err(e) => {
                    log.error(&format!("{} could not be started: {}", step.label, e));
                    bail!("{} could not be started: {}", step.label, e);
                }
            };

            let combined = output.combined();
            if !combined.is_empty() {
                log.info(&combined);
            }

            if !output.success() {
                let code = output
                    .status_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                log.error(&format!("{} failed (exit status: {})", step.label, code));
                bail!("{} failed (exit status: {})", step.label, code);
            }

            log.info(&format!("{} completed", step.label));
        }

        Ok(())
    }
}
