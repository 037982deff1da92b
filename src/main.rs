//! Bidsync - EEG BIDS Dataset Uploader
//!
//! データセットの準備からアップロード、結果台帳への記録までを一括実行

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use clap::Parser;
use std::process::ExitCode;

use bidsync::adapter::config::Config;
use bidsync::driver::{exit_status, Args, MigrationWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    // Load configuration
    let config = match args.config.as_deref() {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let workflow = MigrationWorkflow::new(config);
    let result = workflow.execute(&args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    ExitCode::from(exit_status(&result))
}
