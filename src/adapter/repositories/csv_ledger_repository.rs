//! CSV Ledger Repository Implementation
//!
//! LedgerRepositoryのCSV実装（結果台帳をCSVファイルに追記）

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::domain::entities::result_record::{ResultRecord, LEDGER_HEADER};
use crate::domain::repositories::ledger_repository::LedgerRepository;

/// CSVファイルベースの結果台帳
///
/// ファイルが無ければヘッダ付きで作成し、以降は追記のみ。
pub struct CsvLedgerRepository {
    path: PathBuf,
}

impl CsvLedgerRepository {
    /// 新しいリポジトリを作成
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 台帳ファイルが無ければヘッダ行だけのファイルを作成する
    pub fn initialize(&self) -> Result<()> {
        Self::ensure_header(&self.path)
    }

    fn needs_header(path: &Path) -> bool {
        fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
    }

    fn ensure_header(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create ledger directory")?;
        }

        if !Self::needs_header(path) {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open ledger file: {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(LEDGER_HEADER)
            .context("Failed to write ledger header")?;
        writer.flush().context("Failed to flush ledger file")?;

        info!("Created result ledger: {}", path.display());
        Ok(())
    }

    /// 1行追記する（同期処理）
    fn append_sync(path: &Path, record: &ResultRecord) -> Result<()> {
        Self::ensure_header(path)?;

        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open ledger file: {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(record.to_fields())
            .context("Failed to write ledger record")?;
        writer.flush().context("Failed to flush ledger file")?;

        Ok(())
    }

    /// 全行を読み込む（同期処理）
    ///
    /// 解釈できない行は警告を出して読み飛ばす
    fn load_sync(path: &Path) -> Result<Vec<ResultRecord>> {
        if !path.exists() {
            info!("No existing result ledger found at {}", path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to read ledger file: {}", path.display()))?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Failed to read ledger row {}: {}", index + 2, e);
                    continue;
                }
            };
            let fields: Vec<&str> = row.iter().collect();
            match ResultRecord::from_fields(&fields) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed ledger row {}: {}", index + 2, e),
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl LedgerRepository for CsvLedgerRepository {
    async fn append(&self, record: &ResultRecord) -> Result<()> {
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || Self::append_sync(&path, &record))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }

    async fn load_all(&self) -> Result<Vec<ResultRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load_sync(&path))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::upload_status::UploadStatus;
    use tempfile::TempDir;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_initialize_creates_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs/upload_results.csv");
        let repo = CsvLedgerRepository::new(&path);

        repo.initialize().unwrap();
        repo.initialize().unwrap();

        assert_eq!(read(&path), "timestamp,dataset_name,status,node_id,manifest_id\n");
    }

    #[test]
    fn test_append_sync_creates_file_with_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("upload_results.csv");
        let record = ResultRecord::new(
            "PRV-AAAA",
            UploadStatus::Success,
            Some("N:dataset:1".to_string()),
            Some("7".to_string()),
        );

        CsvLedgerRepository::append_sync(&path, &record).unwrap();

        let content = read(&path);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "timestamp,dataset_name,status,node_id,manifest_id");
        assert!(lines[1].ends_with(",PRV-AAAA,SUCCESS,N:dataset:1,7"));
    }

    #[test]
    fn test_append_sync_never_rewrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("upload_results.csv");

        let first = ResultRecord::new("PRV-AAAA", UploadStatus::FailedCreation, None, None);
        let second = ResultRecord::new("PRV-AAAA", UploadStatus::FailedCreation, None, None);
        CsvLedgerRepository::append_sync(&path, &first).unwrap();
        CsvLedgerRepository::append_sync(&path, &second).unwrap();

        let content = read(&path);
        assert_eq!(content.lines().count(), 3);
        assert!(content.lines().nth(2).unwrap().ends_with(",PRV-AAAA,FAILED_CREATION,,"));
    }

    #[test]
    fn test_quotes_fields_with_commas() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("upload_results.csv");
        let record = ResultRecord::new("PRV-A,B", UploadStatus::FailedNodeId, None, None);

        CsvLedgerRepository::append_sync(&path, &record).unwrap();

        let loaded = CsvLedgerRepository::load_sync(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].dataset_name, "PRV-A,B");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let records =
            CsvLedgerRepository::load_sync(Path::new("/nonexistent/upload_results.csv")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("upload_results.csv");
        fs::write(
            &path,
            "timestamp,dataset_name,status,node_id,manifest_id\n\
             2025-01-15 09:30:00,PRV-AAAA,SUCCESS,N:dataset:1,7\n\
             garbage\n\
             2025-01-15 09:31:00,PRV-BBBB,FAILED_MANIFEST,N:dataset:2,\n",
        )
        .unwrap();

        let records = CsvLedgerRepository::load_sync(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, UploadStatus::Success);
        assert_eq!(records[1].status, UploadStatus::FailedManifest);
        assert!(records[1].manifest_id.is_none());
    }

    #[tokio::test]
    async fn test_append_and_load_async() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CsvLedgerRepository::new(temp_dir.path().join("upload_results.csv"));

        repo.append(&ResultRecord::new(
            "PRV-AAAA",
            UploadStatus::FailedUpload,
            Some("N:dataset:1".to_string()),
            Some("7".to_string()),
        ))
        .await
        .unwrap();

        let records = repo.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dataset_name, "PRV-AAAA");
        assert_eq!(records[0].manifest_id.as_deref(), Some("7"));
    }
}
