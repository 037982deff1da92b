//! Pennsieve CLI Output Parser
//!
//! CLIのテキスト出力から識別子を取り出す

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::repositories::remote_client::{OutputParser, RemoteError};

const NODE_ID_MARKER: &str = "NODE ID";
const FIELD_DELIMITER: char = '|';

static MANIFEST_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Manifest ID:[ \t]*([^\s|]+)").expect("manifest ID pattern is valid")
});

/// テキスト出力パーサ
///
/// `dataset create` はテーブル形式（`| NODE ID | N:dataset:... |`）、
/// `manifest create` は `Manifest ID: <token>` を含む行を出力する前提。
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOutputParser;

impl TextOutputParser {
    pub fn new() -> Self {
        Self
    }
}

impl OutputParser for TextOutputParser {
    fn extract_node_id(&self, raw_output: &str) -> Result<String, RemoteError> {
        raw_output
            .lines()
            .filter(|line| line.contains(NODE_ID_MARKER))
            .find_map(node_id_from_line)
            .ok_or(RemoteError::NodeIdNotFound)
    }

    fn extract_manifest_id(&self, raw_output: &str) -> Result<String, RemoteError> {
        MANIFEST_ID_RE
            .captures(raw_output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(RemoteError::ManifestIdNotFound)
    }
}

/// マーカーを含むフィールドより後ろで、最初の空でないフィールド
fn node_id_from_line(line: &str) -> Option<String> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
    let marker = fields.iter().position(|field| field.contains(NODE_ID_MARKER))?;

    fields[marker + 1..]
        .iter()
        .find(|field| !field.is_empty())
        .map(|field| field.to_string())
}
