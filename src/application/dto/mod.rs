//! # Data Transfer Objects
//!
//! Driver層から Use Case に渡す設定

pub mod upload_config;
