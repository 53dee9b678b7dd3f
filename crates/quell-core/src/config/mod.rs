//! Configuration system for Quell.
//! TOML-based, layered resolution: CLI > env > project file > defaults.

pub mod quell_config;
pub mod scan_config;
pub mod scoring_config;

pub use quell_config::{CliOverrides, QuellConfig};
pub use scan_config::ScanConfig;
pub use scoring_config::ScoringConfig;
