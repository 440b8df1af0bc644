//! Error taxonomy and transition outcomes
//!
//! Configuration bugs (unknown route names, param arity mismatches, missing
//! params, unmatched URLs) surface loudly as [`RouterError`]. A rejected
//! context resolution is the one expected runtime failure; it flows through
//! the injected failure notification and is reported as
//! [`TransitionOutcome::Failed`] with the previous chain left current.

use std::fmt;

// ============================================================================
// Transition Outcomes
// ============================================================================

/// Result of a transition attempt that got past configuration checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The new handler chain is active
    Completed {
        /// The recognized or generated URL
        url: String,
    },
    /// A `setup` hook returned the abort sentinel; remaining enters were
    /// skipped and already-run hooks were not rolled back
    Aborted {
        /// Handler whose setup aborted
        at: String,
    },
    /// A context resolution rejected; the previously active chain is intact
    Failed {
        /// Rejection reason, as passed to the failure notification
        reason: String,
    },
}

impl TransitionOutcome {
    /// Check if the transition completed
    pub fn is_completed(&self) -> bool {
        matches!(self, TransitionOutcome::Completed { .. })
    }

    /// Check if a setup hook aborted the transition
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransitionOutcome::Aborted { .. })
    }

    /// Check if a context resolution rejected
    pub fn is_failed(&self) -> bool {
        matches!(self, TransitionOutcome::Failed { .. })
    }

    /// The final URL if the transition completed
    pub fn url(&self) -> Option<&str> {
        match self {
            TransitionOutcome::Completed { url } => Some(url),
            _ => None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by recognition, generation, and transition entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// No registered route accepts the path
    NoRouteMatched { path: String },

    /// A name absent from the named-route map was referenced
    UnknownRouteName { name: String },

    /// More contexts supplied to a named transition than there are dynamic
    /// segments to bind them to
    ParamArityMismatch { supplied: usize, expected: usize },

    /// URL generation was missing a required parameter
    MissingParam { name: String, route: String },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::NoRouteMatched { path } => {
                write!(f, "No route matched the path: {}", path)
            }
            RouterError::UnknownRouteName { name } => {
                write!(f, "There is no route named '{}'", name)
            }
            RouterError::ParamArityMismatch { supplied, expected } => {
                write!(
                    f,
                    "{} contexts supplied but the route has only {} dynamic segments",
                    supplied, expected
                )
            }
            RouterError::MissingParam { name, route } => {
                write!(
                    f,
                    "Missing parameter '{}' when generating a URL for '{}'",
                    name, route
                )
            }
        }
    }
}

impl std::error::Error for RouterError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_completed() {
        let outcome = TransitionOutcome::Completed {
            url: "/posts/42".to_string(),
        };
        assert!(outcome.is_completed());
        assert!(!outcome.is_aborted());
        assert!(!outcome.is_failed());
        assert_eq!(outcome.url(), Some("/posts/42"));
    }

    #[test]
    fn test_outcome_aborted() {
        let outcome = TransitionOutcome::Aborted {
            at: "post".to_string(),
        };
        assert!(outcome.is_aborted());
        assert_eq!(outcome.url(), None);
    }

    #[test]
    fn test_outcome_failed() {
        let outcome = TransitionOutcome::Failed {
            reason: "fetch failed".to_string(),
        };
        assert!(outcome.is_failed());
        assert!(!outcome.is_completed());
    }

    #[test]
    fn test_error_display() {
        let error = RouterError::NoRouteMatched {
            path: "/nope".to_string(),
        };
        assert_eq!(error.to_string(), "No route matched the path: /nope");

        let error = RouterError::UnknownRouteName {
            name: "ghost".to_string(),
        };
        assert_eq!(error.to_string(), "There is no route named 'ghost'");

        let error = RouterError::ParamArityMismatch {
            supplied: 3,
            expected: 1,
        };
        assert!(error.to_string().contains("3 contexts"));

        let error = RouterError::MissingParam {
            name: "post_id".to_string(),
            route: "post".to_string(),
        };
        assert!(error.to_string().contains("post_id"));
    }
}
