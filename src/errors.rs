//! Typed errors for the interview session machine.
//!
//! A single enum covers everything an operation can surface:
//! - `Service` — the remote collaborator returned a non-success status or
//!   did not respond; carries the human-readable message to show the user
//! - `InvalidTransition` — an operation was invoked from a state that does
//!   not admit it
//!
//! Operations never panic past the session boundary; every failure comes
//! back as one of these.

use thiserror::Error;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The generation or persistence service failed. The message is either
    /// extracted from the service's error payload or a per-operation
    /// default ("Failed to generate question", "Failed to save progress", ...).
    #[error("{message}")]
    Service { message: String },

    #[error("Cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SessionError {
    /// Wrap a client-layer failure, keeping its human-readable message.
    pub fn service(err: anyhow::Error) -> Self {
        SessionError::Service {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_displays_message_verbatim() {
        let err = SessionError::Service {
            message: "Failed to generate question".into(),
        };
        assert_eq!(err.to_string(), "Failed to generate question");
    }

    #[test]
    fn invalid_transition_names_operation_and_state() {
        let err = SessionError::InvalidTransition {
            operation: "answer",
            state: "idle",
        };
        assert_eq!(err.to_string(), "Cannot answer while idle");
    }

    #[test]
    fn service_constructor_flattens_anyhow_chain() {
        let inner = anyhow::anyhow!("Failed to save progress");
        let err = SessionError::service(inner);
        match &err {
            SessionError::Service { message } => {
                assert_eq!(message, "Failed to save progress");
            }
            _ => panic!("Expected Service variant"),
        }
    }

    #[test]
    fn converts_from_anyhow() {
        let err: SessionError = anyhow::anyhow!("plumbing failure").into();
        assert!(matches!(err, SessionError::Other(_)));
        assert!(err.to_string().contains("plumbing failure"));
    }

    #[test]
    fn implements_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let err = SessionError::InvalidTransition {
            operation: "start",
            state: "interviewing",
        };
        assert_std_error(&err);
    }
}
