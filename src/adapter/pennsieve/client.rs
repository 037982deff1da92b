//! Pennsieve CLI Client
//!
//! RemoteClientの実装（`pennsieve` CLI をサブプロセスとして呼び出す）

use async_trait::async_trait;
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::dataset_context::DatasetContext;
use crate::domain::repositories::command_runner::{CommandError, CommandOutput, CommandRunner};
use crate::domain::repositories::remote_client::{OutputParser, RemoteClient, RemoteError};

use super::parser::TextOutputParser;

pub const DEFAULT_CLI_BINARY: &str = "pennsieve";

/// Pennsieve CLI クライアント
///
/// サブコマンド:
/// - `dataset create <name> <description> <tagsJSON>`
/// - `dataset use <nodeId>`
/// - `manifest create <folderPath>`
/// - `upload manifest <manifestId>`
///
/// `step_timeout` はアップロード以外のステップに適用する（`None` なら無制限）。
pub struct PennsieveClient<R: CommandRunner, P: OutputParser = TextOutputParser> {
    runner: Arc<R>,
    parser: P,
    binary: String,
    step_timeout: Option<Duration>,
}

impl<R: CommandRunner> PennsieveClient<R, TextOutputParser> {
    pub fn new(runner: Arc<R>, binary: impl Into<String>, step_timeout: Option<Duration>) -> Self {
        Self::with_parser(runner, TextOutputParser::new(), binary, step_timeout)
    }
}

impl<R: CommandRunner, P: OutputParser> PennsieveClient<R, P> {
    /// パーサを差し替えてクライアントを作成
    pub fn with_parser(
        runner: Arc<R>,
        parser: P,
        binary: impl Into<String>,
        step_timeout: Option<Duration>,
    ) -> Self {
        Self {
            runner,
            parser,
            binary: binary.into(),
            step_timeout,
        }
    }

    async fn invoke(
        &self,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        self.runner.run(&self.binary, args, timeout).await
    }
}

/// タグをCLIに渡すJSON配列にする
pub fn tags_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// 非ゼロ終了時のエラーメッセージ
fn failure_message(output: &CommandOutput) -> String {
    let status = output
        .status_code
        .map(|code| format!("exit status {}", code))
        .unwrap_or_else(|| "terminated by signal".to_string());
    let text = output.combined();

    if text.is_empty() {
        status
    } else {
        format!("{}: {}", status, text)
    }
}

#[async_trait]
impl<R: CommandRunner, P: OutputParser> RemoteClient for PennsieveClient<R, P> {
    async fn create_dataset(
        &self,
        name: &str,
        description: &str,
        tags: &[String],
    ) -> Result<String, RemoteError> {
        if name.trim().is_empty() {
            return Err(RemoteError::CreationFailed(
                "dataset name must not be empty".to_string(),
            ));
        }

        let args = vec![
            "dataset".to_string(),
            "create".to_string(),
            name.to_string(),
            description.to_string(),
            tags_json(tags),
        ];

        let output = self
            .invoke(&args, self.step_timeout)
            .await
            .map_err(|e| RemoteError::CreationFailed(e.to_string()))?;

        if !output.success() {
            return Err(RemoteError::CreationFailed(failure_message(&output)));
        }

        Ok(output.combined())
    }

    fn extract_node_id(&self, raw_output: &str) -> Result<String, RemoteError> {
        self.parser.extract_node_id(raw_output)
    }

    async fn select_dataset(
        &self,
        dataset_name: &str,
        node_id: &str,
    ) -> Result<DatasetContext, RemoteError> {
        let args = vec!["dataset".to_string(), "use".to_string(), node_id.to_string()];

        let output = self
            .invoke(&args, self.step_timeout)
            .await
            .map_err(|e| RemoteError::SelectionFailed {
                node_id: node_id.to_string(),
                message: e.to_string(),
            })?;

        if !output.success() {
            return Err(RemoteError::SelectionFailed {
                node_id: node_id.to_string(),
                message: failure_message(&output),
            });
        }

        Ok(DatasetContext::new(dataset_name, node_id))
    }

    async fn create_manifest(
        &self,
        context: &DatasetContext,
        folder: &Path,
    ) -> Result<String, RemoteError> {
        // The CLI binds the manifest to the dataset selected by `dataset use`
        debug!(
            "Creating manifest for {} in dataset {}",
            folder.display(),
            context.node_id()
        );

        let args = vec![
            "manifest".to_string(),
            "create".to_string(),
            folder.to_string_lossy().to_string(),
        ];

        let output = self
            .invoke(&args, self.step_timeout)
            .await
            .map_err(|e| RemoteError::ManifestCreationFailed(e.to_string()))?;

        if !output.success() {
            return Err(RemoteError::ManifestCreationFailed(failure_message(&output)));
        }

        Ok(output.combined())
    }

    fn extract_manifest_id(&self, raw_output: &str) -> Result<String, RemoteError> {
        self.parser.extract_manifest_id(raw_output)
    }

    async fn upload_manifest(
        &self,
        context: &DatasetContext,
        manifest_id: &str,
        timeout: Duration,
    ) -> Result<String, RemoteError> {
        debug!(
            "Uploading manifest {} for dataset {}",
            manifest_id,
            context.dataset_name()
        );

        let args = vec![
            "upload".to_string(),
            "manifest".to_string(),
            manifest_id.to_string(),
        ];

        let output = match self.invoke(&args, Some(timeout)).await {
            Ok(output) => output,
            Err(CommandError::TimedOut {
                timeout, output, ..
            }) => {
                return Err(RemoteError::UploadTimedOut {
                    manifest_id: manifest_id.to_string(),
                    timeout,
                    output: output.combined(),
                })
            }
            Err(e) => {
                return Err(RemoteError::UploadFailed {
                    manifest_id: manifest_id.to_string(),
                    message: e.to_string(),
                })
            }
        };

        if !output.success() {
            return Err(RemoteError::UploadFailed {
                manifest_id: manifest_id.to_string(),
                message: failure_message(&output),
            });
        }

        Ok(output.combined())
    }
}
