//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod csv_ledger_repository;
pub mod file_operation_log;
pub mod fs_dataset_repository;
