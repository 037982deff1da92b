//! # Discover Datasets Use Case
//!
//! データセットフォルダ発見ユースケース

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::domain::entities::dataset_folder::DatasetFolder;
use crate::domain::repositories::dataset_repository::DatasetRepository;

/// データセットフォルダ発見ユースケース
///
/// 指定されたディレクトリ直下からプレフィックスに一致するフォルダを発見する
pub struct DiscoverDatasetsUseCase<R: DatasetRepository> {
    dataset_repository: Arc<R>,
}

impl<R: DatasetRepository> DiscoverDatasetsUseCase<R> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `dataset_repository` - データセットリポジトリ
    pub fn new(dataset_repository: Arc<R>) -> Self {
        Self { dataset_repository }
    }

    /// データセットフォルダを発見する
    ///
    /// # Returns
    ///
    /// フォルダ名の辞書順に並んだデータセットフォルダ
    ///
    /// # Errors
    ///
    /// ディレクトリの読み取りに失敗した場合にエラーを返す
    pub async fn execute(&self, root: &Path, prefix: &str) -> Result<Vec<DatasetFolder>> {
        let mut folders = self.dataset_repository.discover(root, prefix).await?;
        // Repository implementations are not required to sort
        folders.retain(|folder| DatasetFolder::matches_prefix(folder.name(), prefix));
        folders.sort();
        Ok(folders)
    }
}
