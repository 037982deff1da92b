//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::Parser;

/// BIDS形式のEEGデータセットをリモートプラットフォームに移行するCLI
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bidsync")]
#[command(
    about = "Reorganize EEG datasets into BIDS folders and upload them with the remote CLI",
    long_about = None
)]
pub struct Args {
    /// Config file path (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the directory scanned for dataset folders
    #[arg(short, long)]
    pub output_root: Option<String>,

    /// Skip the reorganizer and sidecar generator
    #[arg(long)]
    pub skip_prepare: bool,

    /// Skip datasets whose latest ledger status is SUCCESS
    #[arg(long)]
    pub resume: bool,

    /// Dry run mode - list datasets without calling the remote CLI
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["bidsync"]);
        assert!(args.config.is_none());
        assert!(args.output_root.is_none());
        assert!(!args.skip_prepare);
        assert!(!args.resume);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_custom_config() {
        let args = Args::parse_from(["bidsync", "-c", "/custom/bidsync.json"]);
        assert_eq!(args.config.as_deref(), Some("/custom/bidsync.json"));
    }

    #[test]
    fn test_args_output_root() {
        let args = Args::parse_from(["bidsync", "--output-root", "/data/bids"]);
        assert_eq!(args.output_root.as_deref(), Some("/data/bids"));
    }

    #[test]
    fn test_args_combined() {
        let args = Args::parse_from(["bidsync", "--skip-prepare", "--resume", "--dry-run"]);
        assert!(args.skip_prepare);
        assert!(args.resume);
        assert!(args.dry_run);
    }
}
