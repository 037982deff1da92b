//! # Ledger Repository Trait
//!
//! 結果台帳の永続化を抽象化

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::entities::result_record::ResultRecord;
use crate::domain::entities::upload_status::UploadStatus;

/// 結果台帳リポジトリ
///
/// 追記専用。既存の行を書き換えたり重複排除したりはしない。
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// レコードを1行追記する
    ///
    /// # Errors
    ///
    /// 台帳ファイルへの書き込みに失敗した場合にエラーを返す
    async fn append(&self, record: &ResultRecord) -> Result<()>;

    /// 台帳の全行を書き込み順に読み込む
    ///
    /// 台帳が存在しない場合は空のベクターを返す
    async fn load_all(&self) -> Result<Vec<ResultRecord>>;
}

/// データセット名ごとの最新ステータス
///
/// 後の行が前の行を上書きする（台帳は書き込み順）
pub fn latest_statuses(records: &[ResultRecord]) -> BTreeMap<String, UploadStatus> {
    records
        .iter()
        .map(|record| (record.dataset_name.clone(), record.status))
        .collect()
}
