//! Error handling for Quell.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod api_error;
pub mod config_error;
pub mod history_error;
pub mod run_error;

pub use api_error::ApiError;
pub use config_error::ConfigError;
pub use history_error::HistoryError;
pub use run_error::RunError;
