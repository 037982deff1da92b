//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **DatasetFolder**: アップロード対象のローカルフォルダ
//! - **DatasetContext**: 選択済みリモートデータセット
//! - **ResultRecord**: 結果台帳の1行
//! - **UploadStatus**: 終端ステータス

pub mod dataset_context;
pub mod dataset_folder;
pub mod result_record;
pub mod upload_status;
