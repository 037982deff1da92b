//! # DatasetFolder Entity
//!
//! アップロード対象のローカルデータセットフォルダ

use std::path::{Path, PathBuf};

/// デフォルトのフォルダ名プレフィックス
pub const DEFAULT_DATASET_PREFIX: &str = "PRV-";

/// データセットフォルダ
///
/// 再構成済みの患者1人分のディレクトリ。ベース名がそのままデータセット名になる。
/// パイプラインからは読み取り専用。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DatasetFolder {
    name: String,
    path: PathBuf,
}

impl DatasetFolder {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// データセット名（フォルダのベース名）
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// フォルダ名がプレフィックスに一致するか
    ///
    /// プレフィックスだけの名前（例: `PRV-`）は対象外
    pub fn matches_prefix(name: &str, prefix: &str) -> bool {
        name.len() > prefix.len() && name.starts_with(prefix)
    }
}
