//! # Remote Client Trait
//!
//! リモートデータ管理プラットフォームのCLI操作を抽象化

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::dataset_context::DatasetContext;

/// リモート操作のエラー
///
/// 各バリアントはワークフローのどのステージで失敗したかに対応する。
/// 文字列フィールドにはCLIの出力（またはプロセス起動エラー）が入る。
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Dataset creation failed: {0}")]
    CreationFailed(String),

    #[error("Node ID not found in dataset creation output")]
    NodeIdNotFound,

    #[error("Failed to select dataset {node_id}: {message}")]
    SelectionFailed { node_id: String, message: String },

    #[error("Manifest creation failed: {0}")]
    ManifestCreationFailed(String),

    #[error("Manifest ID not found in manifest creation output")]
    ManifestIdNotFound,

    #[error("Upload of manifest {manifest_id} failed: {message}")]
    UploadFailed { manifest_id: String, message: String },

    #[error("Upload of manifest {manifest_id} timed out after {}s", timeout.as_secs())]
    UploadTimedOut {
        manifest_id: String,
        timeout: Duration,
        /// タイムアウトまでのCLI出力
        output: String,
    },
}

/// CLI出力から識別子を取り出すパーサ
///
/// CLIのテキスト形式は安定した契約ではないので、解析方法はここに閉じ込める。
pub trait OutputParser: Send + Sync {
    /// データセット作成出力から node ID を取り出す
    fn extract_node_id(&self, raw_output: &str) -> Result<String, RemoteError>;

    /// マニフェスト作成出力から manifest ID を取り出す
    fn extract_manifest_id(&self, raw_output: &str) -> Result<String, RemoteError>;
}

/// リモートクライアント
///
/// 外部CLIをブラックボックスとして呼び出し、テキスト出力だけでやり取りする。
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// データセットを作成し、CLIの生出力を返す
    ///
    /// 冪等ではない（呼ぶたびにリモートデータセットが作られる）。
    async fn create_dataset(
        &self,
        name: &str,
        description: &str,
        tags: &[String],
    ) -> Result<String, RemoteError>;

    /// データセット作成出力から node ID を取り出す
    fn extract_node_id(&self, raw_output: &str) -> Result<String, RemoteError>;

    /// データセットを選択し、以降の操作で使うコンテキストを返す
    async fn select_dataset(
        &self,
        dataset_name: &str,
        node_id: &str,
    ) -> Result<DatasetContext, RemoteError>;

    /// 選択済みデータセットにローカルフォルダを紐付けるマニフェストを作成し、生出力を返す
    async fn create_manifest(
        &self,
        context: &DatasetContext,
        folder: &Path,
    ) -> Result<String, RemoteError>;

    /// マニフェスト作成出力から manifest ID を取り出す
    fn extract_manifest_id(&self, raw_output: &str) -> Result<String, RemoteError>;

    /// マニフェストをアップロードし、CLIの出力を返す
    ///
    /// `timeout` を超えたプロセスは強制終了され `UploadTimedOut` になる。
    async fn upload_manifest(
        &self,
        context: &DatasetContext,
        manifest_id: &str,
        timeout: Duration,
    ) -> Result<String, RemoteError>;
}
