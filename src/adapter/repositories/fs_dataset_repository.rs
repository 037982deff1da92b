//! File System Dataset Repository Implementation
//!
//! DatasetRepositoryのファイルシステム実装

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::domain::entities::dataset_folder::DatasetFolder;
use crate::domain::repositories::dataset_repository::DatasetRepository;

/// ファイルシステムベースのデータセットリポジトリ
pub struct FsDatasetRepository;

impl FsDatasetRepository {
    /// 新しいリポジトリを作成
    pub fn new() -> Self {
        Self
    }

    /// データセットフォルダを発見する（内部実装）
    ///
    /// ルート直下のディレクトリだけを見る。返すパスは絶対パス。
    ///
    /// # Errors
    ///
    /// ルートが存在しない、ディレクトリでない、または読めない場合にエラーを返す
    fn discover_internal(root: &Path, prefix: &str) -> Result<Vec<DatasetFolder>> {
        let expanded_path = shellexpand::tilde(&root.to_string_lossy()).to_string();
        let root = fs::canonicalize(&expanded_path)
            .with_context(|| format!("Output root is not accessible: {}", expanded_path))?;

        if !root.is_dir() {
            bail!("Output root is not a directory: {}", root.display());
        }

        let mut folders = Vec::new();

        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself could not be listed
                Err(e) if e.depth() == 0 => {
                    return Err(e).with_context(|| {
                        format!("Failed to read output root: {}", root.display())
                    })
                }
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                warn!("Skipping non UTF-8 folder name: {}", entry.path().display());
                continue;
            };

            if DatasetFolder::matches_prefix(name, prefix) {
                folders.push(DatasetFolder::new(name, entry.path()));
            }
        }

        info!(
            "Found {} dataset folders matching '{}*' in {}",
            folders.len(),
            prefix,
            root.display()
        );

        Ok(folders)
    }
}

#[async_trait]
impl DatasetRepository for FsDatasetRepository {
    async fn discover(&self, root: &Path, prefix: &str) -> Result<Vec<DatasetFolder>> {
        let root = root.to_path_buf();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || Self::discover_internal(&root, &prefix))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}

impl Default for FsDatasetRepository {
    fn default() -> Self {
        Self::new()
    }
}
