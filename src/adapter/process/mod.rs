//! Process Adapter
//!
//! 外部プロセス実行の実装

pub mod tokio_runner;
