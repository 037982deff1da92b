//! # DatasetContext Value Object
//!
//! 選択済みリモートデータセットを明示的に表す値

/// 選択済みデータセットのコンテキスト
///
/// `RemoteClient::select_dataset` が成功したときにだけ作られる。
/// マニフェスト作成・アップロードにはこの値を渡すので、
/// 「現在のデータセット」をクライアント側の状態として持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetContext {
    dataset_name: String,
    node_id: String,
}

impl DatasetContext {
    pub fn new(dataset_name: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            node_id: node_id.into(),
        }
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }
}
