//! # UploadStatus Value Object
//!
//! データセット1件の終端ステータス

use std::fmt;
use std::str::FromStr;

/// 終端ステータス
///
/// 結果台帳の `status` 列に記録される値。`FAILED_*` はどのステージで
/// 失敗したかを表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStatus {
    Success,
    FailedCreation,
    FailedNodeId,
    FailedSwitch,
    FailedManifest,
    FailedManifestId,
    FailedUpload,
}

impl UploadStatus {
    pub const ALL: [UploadStatus; 7] = [
        UploadStatus::Success,
        UploadStatus::FailedCreation,
        UploadStatus::FailedNodeId,
        UploadStatus::FailedSwitch,
        UploadStatus::FailedManifest,
        UploadStatus::FailedManifestId,
        UploadStatus::FailedUpload,
    ];

    /// 台帳に書き込む文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Success => "SUCCESS",
            UploadStatus::FailedCreation => "FAILED_CREATION",
            UploadStatus::FailedNodeId => "FAILED_NODE_ID",
            UploadStatus::FailedSwitch => "FAILED_SWITCH",
            UploadStatus::FailedManifest => "FAILED_MANIFEST",
            UploadStatus::FailedManifestId => "FAILED_MANIFEST_ID",
            UploadStatus::FailedUpload => "FAILED_UPLOAD",
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, UploadStatus::Success)
    }

    /// このステータスの台帳行に node_id が入っているべきか
    pub fn has_node_id(&self) -> bool {
        !matches!(
            self,
            UploadStatus::FailedCreation | UploadStatus::FailedNodeId
        )
    }

    /// このステータスの台帳行に manifest_id が入っているべきか
    pub fn has_manifest_id(&self) -> bool {
        matches!(self, UploadStatus::Success | UploadStatus::FailedUpload)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UploadStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("Unknown upload status: {}", s))
    }
}
