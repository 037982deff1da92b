//! # Domain Layer
//!
//! このモジュールはビジネスの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - 外部プロセスやファイルシステムについて何も知らない
//! - リモートCLIやCSVの詳細は Adapter 層に任せる
//! - 純粋なビジネスロジック
//!
//! ## 構成要素
//!
//! - **entities**: ビジネスエンティティ（DatasetFolder, ResultRecordなど）
//! - **repositories**: Repository trait（インターフェース定義のみ）
//! - **services**: Domain Service（再試行ポリシー）

pub mod entities;
pub mod repositories;
pub mod services;
