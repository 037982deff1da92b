//! # Operation Log Trait
//!
//! 人が読むための操作ログ（タイムスタンプ付き、追記専用）

use log::Level;

/// 操作ログ
///
/// 書き込みは失敗してもパイプラインを止めない。
pub trait OperationLog: Send + Sync {
    /// 1行書き込む
    fn write(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(Level::Error, message);
    }
}
