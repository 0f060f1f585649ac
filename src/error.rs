//! Structured error types for the simulation kernel.
//!
//! The kernel never raises out-of-band failures from the main loop:
//! recoverable anomalies (busy / terminated processes) are routed to
//! the installed [`ErrorHandler`](crate::ErrorHandler), and the few
//! fallible API calls report through `Result` instead of sentinels or
//! panics.

use crate::process::ProcessId;

/// The top-level error type for the simulation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SimError {
    /// `stop_process` targeted a process that has already completed its
    /// stop.
    AlreadyTerminated(ProcessId),

    /// A `ProcessHandle` was activated a second time.
    AlreadyActivated(ProcessId),

    /// A process ID that was never returned by `create_process` in this
    /// run (or was invalidated by `clear`).
    UnknownProcess(ProcessId),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::AlreadyTerminated(pid) => {
                write!(f, "process {} is already terminated", pid)
            }
            SimError::AlreadyActivated(pid) => {
                write!(f, "process handle is already activated as {}", pid)
            }
            SimError::UnknownProcess(pid) => {
                write!(f, "process {} is not registered", pid)
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_already_terminated() {
        let e = SimError::AlreadyTerminated(ProcessId::new(4));
        assert_eq!(e.to_string(), "process P4 is already terminated");
    }

    #[test]
    fn test_display_unknown_process() {
        let e = SimError::UnknownProcess(ProcessId::new(9));
        assert!(e.to_string().contains("P9"));
    }

    #[test]
    fn test_is_std_error() {
        let e: Box<dyn std::error::Error> =
            Box::new(SimError::AlreadyActivated(ProcessId::new(0)));
        assert!(!e.to_string().is_empty());
    }
}
