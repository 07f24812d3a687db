use std::fmt;

/// Classified result of delivering one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Status 200 and a body without an `error` field
    Success,
    /// Status 200 but the store rejected the statement
    ApplicationError(String),
    /// Any non-200 status
    TransportError { status: u16, body: String },
    /// The endpoint could not be reached at the socket level
    ConnectionFailure(String),
    /// Anything else: undecodable body, timeout, request build failure
    UnknownError(String),
}

impl SendOutcome {
    /// Machine-readable kind, used as a log field and metric label
    pub fn kind(&self) -> &'static str {
        match self {
            SendOutcome::Success => "success",
            SendOutcome::ApplicationError(_) => "application_error",
            SendOutcome::TransportError { .. } => "transport_error",
            SendOutcome::ConnectionFailure(_) => "connection_failure",
            SendOutcome::UnknownError(_) => "unknown_error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Success)
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, SendOutcome::ConnectionFailure(_))
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOutcome::Success => write!(f, "success"),
            SendOutcome::ApplicationError(msg) => write!(f, "application error: {}", msg),
            SendOutcome::TransportError { status, body } => {
                write!(f, "transport error: status={}, {}", status, body)
            }
            SendOutcome::ConnectionFailure(err) => write!(f, "connection failure: {}", err),
            SendOutcome::UnknownError(err) => write!(f, "unknown error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let outcomes = [
            SendOutcome::Success,
            SendOutcome::ApplicationError("bad".into()),
            SendOutcome::TransportError {
                status: 500,
                body: String::new(),
            },
            SendOutcome::ConnectionFailure("refused".into()),
            SendOutcome::UnknownError("?".into()),
        ];
        let kinds: std::collections::HashSet<_> = outcomes.iter().map(|o| o.kind()).collect();
        assert_eq!(kinds.len(), outcomes.len());
        assert!(outcomes[0].is_success());
        assert!(outcomes[3].is_connection_failure());
    }

    #[test]
    fn test_display() {
        let outcome = SendOutcome::TransportError {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(outcome.to_string(), "transport error: status=404, not found");
    }
}
