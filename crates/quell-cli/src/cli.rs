//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use quell_core::config::CliOverrides;

/// Detect and cancel duplicate tickets created from the same email thread.
#[derive(Debug, Parser)]
#[command(name = "quell", version)]
pub struct Cli {
    /// Project keys to scan (e.g. OPS NVSTRS).
    #[arg(long, required = true, num_args = 1.., value_name = "PROJECT")]
    pub projects: Vec<String>,

    /// Compute decisions but never cancel or comment.
    #[arg(long)]
    pub dry_run: bool,

    /// Re-evaluate pairs already present in history, replacing their entries.
    #[arg(long)]
    pub force: bool,

    /// Confidence threshold override (default 75).
    #[arg(long, value_name = "SCORE")]
    pub confidence: Option<i32>,

    /// Subject-similarity threshold override (default 0.85).
    #[arg(long, value_name = "RATIO")]
    pub similarity: Option<f64>,

    /// Recency window in days (default 7).
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// History file path override.
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Verbose scoring output.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            confidence_threshold: self.confidence,
            similarity_threshold: self.similarity,
            days_back: self.days,
            history_path: self.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_invocation() {
        let cli = Cli::try_parse_from(["quell", "--projects", "OPS"]).expect("parse");
        assert_eq!(cli.projects, vec!["OPS"]);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_requires_projects() {
        assert!(Cli::try_parse_from(["quell"]).is_err());
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "quell",
            "--projects",
            "OPS",
            "NVSTRS",
            "--dry-run",
            "--confidence",
            "80",
            "--similarity",
            "0.9",
            "--days",
            "3",
            "--debug",
        ])
        .expect("parse");
        assert_eq!(cli.projects.len(), 2);
        assert!(cli.dry_run);
        let overrides = cli.overrides();
        assert_eq!(overrides.confidence_threshold, Some(80));
        assert_eq!(overrides.days_back, Some(3));
    }
}
