//! # Dataset Repository Trait
//!
//! データセットフォルダの発見を抽象化

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::domain::entities::dataset_folder::DatasetFolder;

/// データセットリポジトリ
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// データセットフォルダを発見する
    ///
    /// # Arguments
    ///
    /// * `root` - 走査するルートディレクトリ（直下のみ、再帰しない）
    /// * `prefix` - フォルダ名のプレフィックス
    ///
    /// # Returns
    ///
    /// フォルダ名の辞書順に並んだデータセットフォルダ
    async fn discover(&self, root: &Path, prefix: &str) -> Result<Vec<DatasetFolder>>;
}
