//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more scenarios failed
    #[error("Scenario run failed: {message}")]
    ScenarioFailure {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shopwright library error
    #[error("Shopwright error: {0}")]
    Shop(#[from] shopwright::ShopError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Report generation error
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a scenario failure error
    #[must_use]
    pub fn scenario_failure(message: impl Into<String>) -> Self {
        Self::ScenarioFailure {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }
}
