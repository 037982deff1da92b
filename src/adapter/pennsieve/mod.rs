//! Pennsieve Adapter
//!
//! リモートデータ管理プラットフォームのCLI統合

pub mod client;
pub mod parser;
