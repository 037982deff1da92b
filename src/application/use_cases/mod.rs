//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **PrepareDatasetsUseCase**: 再構成・サイドカー生成の外部コマンド実行
//! - **DiscoverDatasetsUseCase**: データセットフォルダの発見
//! - **UploadDatasetUseCase**: データセット1件分のアップロードワークフロー
//! - **RunBatchUseCase**: 全データセットの逐次処理と集計

pub mod discover_datasets;
pub mod prepare_datasets;
pub mod run_batch;
pub mod upload_dataset;
