//! Error types reported by node logic.
//!
//! Failures never escape the node boundary as `Err` values: a logic unit that
//! hits an error reports it through
//! [`ExecutionContext::report_error`](crate::ExecutionContext::report_error),
//! which converts the error into data attributes plus a reserved event
//! (see [`NODE_EXECUTE_FAIL`](crate::events::NODE_EXECUTE_FAIL)).
//!
//! [`LogicError`] provides helper methods (`as_label`, `as_message`) for
//! logs/attributes and [`LogicError::is_fatal`] for downstream handlers that
//! want to distinguish recoverable failures from terminal ones.

use thiserror::Error;

/// # Errors produced by node logic execution.
///
/// These represent failures of the opaque logic unit wrapped by a
/// [`RuleNode`](crate::RuleNode). The core attaches them to the flowing item
/// and broadcasts them on the event channel; it never retries on its own.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LogicError {
    /// Execution failed but a downstream handler may choose to retry.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable fatal error (downstream handlers should not retry).
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Logic was cancelled because the owning node stopped.
    #[error("node stopped, execution cancelled")]
    Canceled,
}

impl LogicError {
    /// Builds a retryable failure from any displayable error.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        LogicError::Fail {
            error: error.to_string(),
        }
    }

    /// Builds a fatal failure from any displayable error.
    pub fn fatal(error: impl std::fmt::Display) -> Self {
        LogicError::Fatal {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs and
    /// data attributes.
    ///
    /// # Example
    /// ```
    /// use rulevisor::LogicError;
    ///
    /// let err = LogicError::fail("boom");
    /// assert_eq!(err.as_label(), "logic_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LogicError::Fail { .. } => "logic_failed",
            LogicError::Fatal { .. } => "logic_fatal",
            LogicError::Canceled => "logic_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LogicError::Fail { error } => format!("error: {error}"),
            LogicError::Fatal { error } => format!("fatal: {error}"),
            LogicError::Canceled => "node stopped".to_string(),
        }
    }

    /// Indicates whether the error is terminal for the logic unit.
    ///
    /// # Example
    /// ```
    /// use rulevisor::LogicError;
    ///
    /// assert!(LogicError::fatal("nope").is_fatal());
    /// assert!(!LogicError::fail("boom").is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(self, LogicError::Fatal { .. })
    }
}
