//! The closed fault taxonomy and its classification for callers.
//!
//! Every failure that can reach the boundary is a [`ScanError`]. Classifying
//! it yields the HTTP status and the message a caller is allowed to see; the
//! full detail only goes to the operator log.
use log::{error, warn};
use serde_derive::Serialize;
use thiserror::Error;

/// Caller input that cannot be compiled. Raised before the engine is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Target IP or Host is required.")]
    MissingTarget,
    #[error("Target {0:?} is not a host name or address.")]
    InvalidTarget(String),
}

/// Engine-level failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineFault {
    #[error("scan did not finish within {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("scan engine invocation failed: {0}")]
    InvocationError(String),
    #[error("scan engine rejected its arguments: {0}")]
    MalformedArguments(String),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Host {target} unreachable: {reason}")]
    HostUnreachable { target: String, reason: String },
    #[error(transparent)]
    Engine(#[from] EngineFault),
    #[error("unexpected fault: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

/// Coarse fault category exposed to callers.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    HostUnreachable,
    EngineTimeout,
    EngineInvocation,
    EngineArguments,
    Unexpected,
}

/// What the boundary needs to answer a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
}

const GENERIC_MESSAGE: &str = "An unexpected server error occurred.";

impl ScanError {
    /// Maps the fault onto the taxonomy and logs it on the operator channel.
    pub fn classify(&self) -> Classification {
        match self {
            Self::Validation(e) => {
                warn!("Rejected scan request: {e}");
                Classification {
                    kind: ErrorKind::Validation,
                    status: 400,
                    message: e.to_string(),
                }
            }
            Self::HostUnreachable { target, reason } => {
                warn!("Host {target} unreachable: {reason}");
                Classification {
                    kind: ErrorKind::HostUnreachable,
                    status: 400,
                    message: self.to_string(),
                }
            }
            Self::Engine(fault) => {
                error!("[ENGINE FAULT] {fault}");
                classify_engine(fault)
            }
            Self::Unexpected(e) => {
                error!("*** UNEXPECTED SERVER ERROR *** {e:?}");
                Classification {
                    kind: ErrorKind::Unexpected,
                    status: 500,
                    message: GENERIC_MESSAGE.to_owned(),
                }
            }
        }
    }
}

// Engine detail (stderr, OS errors) stays in the log.
fn classify_engine(fault: &EngineFault) -> Classification {
    let (kind, message) = match fault {
        EngineFault::Timeout { seconds } => (
            ErrorKind::EngineTimeout,
            format!("Scan timed out after {seconds} seconds."),
        ),
        EngineFault::InvocationError(_) => (
            ErrorKind::EngineInvocation,
            "Scan engine execution failed. Check the server logs for details.".to_owned(),
        ),
        EngineFault::MalformedArguments(_) => (
            ErrorKind::EngineArguments,
            "Scan engine rejected the scan arguments. Check the port list.".to_owned(),
        ),
    };

    Classification {
        kind,
        status: 500,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineFault, ErrorKind, ScanError, ValidationError};
    use anyhow::anyhow;
    use parameterized::parameterized;

    #[test]
    fn missing_target_is_a_bad_request() {
        let class = ScanError::from(ValidationError::MissingTarget).classify();
        assert_eq!(class.status, 400);
        assert_eq!(class.kind, ErrorKind::Validation);
        assert_eq!(class.message, "Target IP or Host is required.");
    }

    #[test]
    fn unreachable_host_is_a_bad_request_naming_the_target() {
        let class = ScanError::HostUnreachable {
            target: "203.0.113.5".to_owned(),
            reason: "no data returned; host may be down or filtered".to_owned(),
        }
        .classify();

        assert_eq!(class.status, 400);
        assert_eq!(class.kind, ErrorKind::HostUnreachable);
        assert_eq!(
            class.message,
            "Host 203.0.113.5 unreachable: no data returned; host may be down or filtered"
        );
    }

    #[parameterized(fault = {
        EngineFault::Timeout { seconds: 120 },
        EngineFault::InvocationError("No such file or directory (os error 2)".to_owned()),
        EngineFault::MalformedArguments("Error #487: Your port specifications are illegal.".to_owned()),
    }, kind = {
        ErrorKind::EngineTimeout, ErrorKind::EngineInvocation, ErrorKind::EngineArguments
    })]
    fn engine_faults_are_server_errors(fault: EngineFault, kind: ErrorKind) {
        let class = ScanError::from(fault).classify();
        assert_eq!(class.status, 500);
        assert_eq!(class.kind, kind);
        assert!(!class.message.contains("os error"));
        assert!(!class.message.contains("Error #487"));
    }

    #[test]
    fn timeout_message_names_the_limit() {
        let class = ScanError::from(EngineFault::Timeout { seconds: 30 }).classify();
        assert_eq!(class.message, "Scan timed out after 30 seconds.");
    }

    #[test]
    fn unexpected_faults_do_not_leak_detail() {
        let fault = anyhow!("stack: frame 0x7ffd").context("while decoding engine report");
        let class = ScanError::from(fault).classify();

        assert_eq!(class.status, 500);
        assert_eq!(class.kind, ErrorKind::Unexpected);
        assert_eq!(class.message, "An unexpected server error occurred.");
    }
}
