//! File Operation Log Implementation
//!
//! OperationLogのファイル実装（標準出力にもミラーする）

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::Level;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::entities::result_record::TIMESTAMP_FORMAT;
use crate::domain::repositories::operation_log::OperationLog;

/// ファイルベースの操作ログ
///
/// 各行は `[YYYY-MM-DD HH:MM:SS] [LEVEL] message` 形式。
/// 複数行メッセージは行ごとにタイムスタンプを付ける。
pub struct FileOperationLog {
    path: PathBuf,
    file: Mutex<File>,
    mirror_to_stdout: bool,
}

impl FileOperationLog {
    /// ログファイルを追記モードで開く
    ///
    /// # Errors
    ///
    /// ディレクトリの作成またはファイルのオープンに失敗した場合にエラーを返す
    pub fn open(path: &Path, mirror_to_stdout: bool) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open operation log: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            mirror_to_stdout,
        })
    }
}

/// ログ行を整形する
pub fn format_lines(timestamp: DateTime<Local>, level: Level, message: &str) -> String {
    let stamp = timestamp.format(TIMESTAMP_FORMAT);
    let mut text = String::new();

    let mut lines = message.lines().peekable();
    if lines.peek().is_none() {
        text.push_str(&format!("[{}] [{}] \n", stamp, level));
    }
    for line in lines {
        text.push_str(&format!("[{}] [{}] {}\n", stamp, level, line));
    }

    text
}

impl OperationLog for FileOperationLog {
    fn write(&self, level: Level, message: &str) {
        let text = format_lines(Local::now(), level, message);

        match self.file.lock() {
            Ok(mut file) => {
                if let Err(e) = file.write_all(text.as_bytes()).and_then(|_| file.flush()) {
                    log::error!("Failed to write operation log {}: {}", self.path.display(), e);
                }
            }
            Err(_) => log::error!("Operation log lock poisoned: {}", self.path.display()),
        }

        if self.mirror_to_stdout {
            // Best-effort: a closed stdout must not stop the pipeline
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }
}
