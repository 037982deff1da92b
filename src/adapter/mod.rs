//! Adapter Layer
//!
//! 外部システム（リモートCLI, 外部プロセス, ファイルシステム）との統合

pub mod config;
pub mod pennsieve;
pub mod process;
pub mod repositories;
