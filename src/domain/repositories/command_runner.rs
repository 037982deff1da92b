//! # Command Runner Trait
//!
//! 外部プロセス実行を抽象化

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// 外部プロセスの実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 終了コード（シグナルで終了した場合は `None`）
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(status_code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// 終了コード0で正常終了したか
    #[inline]
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// stdout と stderr を連結したテキスト
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
            (false, true) => self.stdout.trim_end().to_string(),
            (true, false) => self.stderr.trim_end().to_string(),
            (true, true) => String::new(),
        }
    }
}

/// 外部プロセス実行のエラー
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `output` には kill するまでに出力された内容が入る
    #[error("`{program}` timed out after {}s", timeout.as_secs())]
    TimedOut {
        program: String,
        timeout: Duration,
        output: CommandOutput,
    },
}

/// コマンドランナー
///
/// 標準入力は常に切り離して実行する（対話プロンプトで止まらないように）。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// コマンドを実行して出力を取得する
    ///
    /// # Arguments
    ///
    /// * `program` - 実行するプログラム
    /// * `args` - 引数
    /// * `timeout` - 実行時間の上限（`None` なら無制限）。超過したプロセスは強制終了する
    ///
    /// # Errors
    ///
    /// プロセスを起動できない場合、またはタイムアウトした場合にエラーを返す。
    /// 非ゼロ終了はエラーではなく `CommandOutput::status_code` で表す。
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        assert!(CommandOutput::new(Some(0), "", "").success());
        assert!(!CommandOutput::new(Some(1), "", "").success());
        assert!(!CommandOutput::new(None, "", "").success());
    }

    #[test]
    fn test_combined() {
        assert_eq!(CommandOutput::new(Some(0), "out\n", "err\n").combined(), "out\nerr");
        assert_eq!(CommandOutput::new(Some(0), "out\n", "").combined(), "out");
        assert_eq!(CommandOutput::new(Some(0), "  ", "err").combined(), "err");
        assert_eq!(CommandOutput::new(Some(0), "", "").combined(), "");
    }

    #[test]
    fn test_timed_out_message() {
        let err = CommandError::TimedOut {
            program: "pennsieve".to_string(),
            timeout: Duration::from_secs(1800),
            output: CommandOutput::default(),
        };
        assert_eq!(err.to_string(), "`pennsieve` timed out after 1800s");
    }
}
