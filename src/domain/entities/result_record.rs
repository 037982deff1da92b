//! # ResultRecord Entity
//!
//! 結果台帳の1行

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use super::upload_status::UploadStatus;

/// 台帳・操作ログで使うタイムスタンプ形式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 台帳のヘッダ
pub const LEDGER_HEADER: [&str; 5] = ["timestamp", "dataset_name", "status", "node_id", "manifest_id"];

/// 結果レコード
///
/// ワークフローの終端ごとに1行。識別子は失敗したステージより前で
/// 得られたものだけが入る（未取得は空文字列）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub timestamp: DateTime<Local>,
    pub dataset_name: String,
    pub status: UploadStatus,
    pub node_id: Option<String>,
    pub manifest_id: Option<String>,
}

impl ResultRecord {
    /// 現在時刻でレコードを作成
    pub fn new(
        dataset_name: impl Into<String>,
        status: UploadStatus,
        node_id: Option<String>,
        manifest_id: Option<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            dataset_name: dataset_name.into(),
            status,
            node_id,
            manifest_id,
        }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// CSVの1行分のフィールド
    pub fn to_fields(&self) -> [String; 5] {
        [
            self.formatted_timestamp(),
            self.dataset_name.clone(),
            self.status.as_str().to_string(),
            self.node_id.clone().unwrap_or_default(),
            self.manifest_id.clone().unwrap_or_default(),
        ]
    }

    /// CSVの1行分のフィールドから復元
    pub fn from_fields(fields: &[&str]) -> anyhow::Result<Self> {
        let [timestamp, dataset_name, status, node_id, manifest_id] = fields else {
            anyhow::bail!("Expected 5 ledger fields, got {}", fields.len());
        };

        let naive = NaiveDateTime::parse_from_str(timestamp.trim(), TIMESTAMP_FORMAT)?;
        let timestamp = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| anyhow::anyhow!("Invalid local timestamp: {}", timestamp))?;

        Ok(Self {
            timestamp,
            dataset_name: dataset_name.to_string(),
            status: status.parse()?,
            node_id: non_empty(node_id),
            manifest_id: non_empty(manifest_id),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fields_leaves_missing_ids_empty() {
        let record = ResultRecord::new(
            "PRV-BBBB",
            UploadStatus::FailedManifest,
            Some("N:dataset:1234".to_string()),
            None,
        );
        let fields = record.to_fields();

        assert_eq!(fields[1], "PRV-BBBB");
        assert_eq!(fields[2], "FAILED_MANIFEST");
        assert_eq!(fields[3], "N:dataset:1234");
        assert_eq!(fields[4], "");
    }

    #[test]
    fn test_from_fields() {
        let record = ResultRecord::from_fields(&[
            "2025-01-15 09:30:00",
            "PRV-AAAA",
            "SUCCESS",
            "N:dataset:1",
            "42",
        ])
        .unwrap();

        assert_eq!(record.dataset_name, "PRV-AAAA");
        assert_eq!(record.status, UploadStatus::Success);
        assert_eq!(record.node_id.as_deref(), Some("N:dataset:1"));
        assert_eq!(record.manifest_id.as_deref(), Some("42"));
        assert_eq!(record.formatted_timestamp(), "2025-01-15 09:30:00");
    }

    #[test]
    fn test_from_fields_empty_ids() {
        let record = ResultRecord::from_fields(&[
            "2025-01-15 09:30:00",
            "PRV-AAAA",
            "FAILED_CREATION",
            "",
            "",
        ])
        .unwrap();

        assert!(record.node_id.is_none());
        assert!(record.manifest_id.is_none());
    }

    #[test]
    fn test_from_fields_wrong_arity() {
        assert!(ResultRecord::from_fields(&["2025-01-15 09:30:00", "PRV-AAAA"]).is_err());
    }

    #[test]
    fn test_from_fields_unknown_status() {
        let result = ResultRecord::from_fields(&[
            "2025-01-15 09:30:00",
            "PRV-AAAA",
            "DONE",
            "",
            "",
        ]);
        assert!(result.is_err());
    }
}
