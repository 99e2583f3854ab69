//! Errors surfaced by the PoP estimator.
//!
//! Per-leg volatility failures never reach this level: the aggregator skips
//! those legs and reports them through its observer. What remains are
//! failures that stop a whole estimate.

use thiserror::Error;

/// Errors that abort an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopError {
    /// A leg carries an option type or direction the engine does not know,
    /// and the configured policy is to reject such positions.
    #[error("Unrecognized {field} '{value}' on leg {index}")]
    UnrecognizedLeg {
        /// Zero-based leg index.
        index: usize,
        /// Wire field name (`optionType` or `transactionType`).
        field: &'static str,
        /// Raw value received.
        value: String,
    },

    /// Spot, time to expiry, or rate cannot drive a simulation.
    #[error("Invalid position: {message}")]
    InvalidPosition {
        /// What is wrong.
        message: String,
    },

    /// The estimator was built with settings it cannot run.
    #[error("Invalid simulation configuration: {message}")]
    InvalidConfiguration {
        /// What is wrong.
        message: String,
    },

    /// The global worker pool could not be configured.
    #[error("Failed to configure worker pool: {message}")]
    ThreadPool {
        /// Underlying error.
        message: String,
    },
}

impl PopError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedLeg { .. } => "UNRECOGNIZED_LEG",
            Self::InvalidPosition { .. } => "INVALID_POSITION",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            Self::ThreadPool { .. } => "THREAD_POOL",
        }
    }

    /// Whether the caller's input, rather than the engine, caused the error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedLeg { .. } | Self::InvalidPosition { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_leg_display() {
        let error = PopError::UnrecognizedLeg {
            index: 2,
            field: "optionType",
            value: "FUT".to_string(),
        };

        assert_eq!(error.to_string(), "Unrecognized optionType 'FUT' on leg 2");
        assert_eq!(error.code(), "UNRECOGNIZED_LEG");
        assert!(error.is_client_error());
    }

    #[test]
    fn test_invalid_position_is_client_error() {
        let error = PopError::InvalidPosition {
            message: "time to expiry must be positive, got -0.0137".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid position: time to expiry must be positive, got -0.0137"
        );
        assert_eq!(error.code(), "INVALID_POSITION");
        assert!(error.is_client_error());
    }

    #[test]
    fn test_engine_errors_are_not_client_errors() {
        let config = PopError::InvalidConfiguration {
            message: "trials must be positive".to_string(),
        };
        let pool = PopError::ThreadPool {
            message: "already initialized".to_string(),
        };

        assert_eq!(config.code(), "INVALID_CONFIGURATION");
        assert_eq!(pool.code(), "THREAD_POOL");
        assert!(!config.is_client_error());
        assert!(!pool.is_client_error());
    }
}
