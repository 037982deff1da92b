//! Tokio Command Runner
//!
//! CommandRunnerの tokio::process 実装

use async_trait::async_trait;
use log::{debug, warn};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::domain::repositories::command_runner::{CommandError, CommandOutput, CommandRunner};

/// タイムアウト後、kill したプロセスの出力を読み切るまでの猶予
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// tokio::process ベースのコマンドランナー
///
/// 標準入力は `/dev/null`、標準出力・標準エラーはキャプチャする。
/// タイムアウト時は子プロセスを kill し、それまでの出力をエラーに含める。
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner {
    current_dir: Option<PathBuf>,
}

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self { current_dir: None }
    }

    /// 子プロセスの作業ディレクトリを指定する
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

/// パイプを読み続け、途中までの内容も取り出せるようにする
struct PipeCollector {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl PipeCollector {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);

        let task = tokio::spawn(async move {
            let Some(mut pipe) = pipe else { return };
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buffer) = sink.lock() {
                            buffer.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read child output: {}", e);
                        break;
                    }
                }
            }
        });

        Self { buffer, task }
    }

    /// 読み取りの終了を待って内容を返す
    ///
    /// `grace` を過ぎても終わらない場合（孫プロセスがパイプを握っているなど）は
    /// 読み取りを打ち切り、そこまでの内容を返す
    async fn finish(self, grace: Option<Duration>) -> String {
        let mut task = self.task;
        match grace {
            Some(grace) => {
                if tokio::time::timeout(grace, &mut task).await.is_err() {
                    task.abort();
                }
            }
            None => {
                let _ = (&mut task).await;
            }
        }

        let bytes = self
            .buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        if program.is_empty() {
            return Err(CommandError::EmptyCommand);
        }

        debug!("Running command: {} {}", program, args.join(" "));

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the child (e.g. on cancellation) kills it
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let stdout = PipeCollector::spawn(child.stdout.take());
        let stderr = PipeCollector::spawn(child.stderr.take());

        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!("Command `{}` exceeded {}s, killing it", program, limit.as_secs());
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill `{}`: {}", program, e);
                    }
                    let output = CommandOutput::new(
                        None,
                        stdout.finish(Some(DRAIN_GRACE)).await,
                        stderr.finish(Some(DRAIN_GRACE)).await,
                    );
                    return Err(CommandError::TimedOut {
                        program: program.to_string(),
                        timeout: limit,
                        output,
                    });
                }
            },
            None => child.wait().await,
        }
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

        debug!("Command `{}` exited with {}", program, status);

        Ok(CommandOutput::new(
            status.code(),
            stdout.finish(None).await,
            stderr.finish(None).await,
        ))
    }
}
