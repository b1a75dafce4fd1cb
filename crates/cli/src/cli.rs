use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use opsify_core::{MediaKind, NamingPolicy};

#[derive(Parser, Debug)]
#[command(name = "opsify")]
#[command(author, version, about = "Batch media file conversion over ffmpeg")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "OPSIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a file or every media file under a directory
    Convert(ConvertArgs),

    /// Check that ffmpeg and ffprobe are available
    CheckTools,

    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Input file or directory
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output directory (created if missing)
    #[arg(required = true)]
    pub output_dir: PathBuf,

    /// Target format, e.g. mp3, flac, mkv
    #[arg(short, long)]
    pub format: String,

    /// Maximum concurrent conversions
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Media kind whose extensions are picked up
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Additional input extension to pick up (repeatable)
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Reserve output names atomically instead of probing
    #[arg(long)]
    pub exclusive_names: bool,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Audio,
    Video,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Audio => MediaKind::Audio,
            KindArg::Video => MediaKind::Video,
        }
    }
}

impl ConvertArgs {
    /// Naming policy forced by the flags, if any.
    pub fn naming(&self) -> Option<NamingPolicy> {
        self.exclusive_names.then_some(NamingPolicy::Exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "opsify", "convert", "music", "out", "-f", "mp3", "-j", "3", "--kind", "video",
            "--extension", "ts", "--exclusive-names",
        ])
        .unwrap();

        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.input, PathBuf::from("music"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.format, "mp3");
        assert_eq!(args.jobs, Some(3));
        assert_eq!(args.kind, Some(KindArg::Video));
        assert_eq!(args.extensions, vec!["ts".to_string()]);
        assert_eq!(args.naming(), Some(NamingPolicy::Exclusive));
    }

    #[test]
    fn test_convert_requires_format() {
        let result = Cli::try_parse_from(["opsify", "convert", "music", "out"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_tools_with_global_flags() {
        let cli = Cli::try_parse_from(["opsify", "-v", "check-tools"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::CheckTools));
    }
}
