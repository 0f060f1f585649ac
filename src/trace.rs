//! Dispatch trace — an opt-in record of every main-loop iteration.
//!
//! Off by default: the kernel sits on the hot path of every simulated
//! individual, so tracing must cost nothing unless asked for. Enable it
//! with [`Simulation::enable_trace`](crate::Simulation::enable_trace);
//! the entries are the observation mechanism for sequence assertions in
//! tests and for post-mortem debugging.

use crate::process::ProcessId;
use crate::time::Time;

/// Outcome of one main-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum TraceKind {
    /// `init` dispatched.
    Init,
    /// An event was delivered via `process_event`.
    Event,
    /// `stop` dispatched; the process is now terminated.
    Stop,
    /// The action arrived inside the target's busy window and was
    /// diverted to the error handler.
    Busy,
    /// The action targeted a terminated process and was diverted to the
    /// error handler.
    Terminated,
    /// The popped action lay beyond the configured stop time; the run
    /// ended without dispatching it.
    StopTime,
}

/// One dispatch-trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceEntry {
    /// Virtual time of the iteration.
    pub time: Time,
    /// The addressed process.
    pub pid: ProcessId,
    /// What happened.
    pub kind: TraceKind,
}

impl TraceEntry {
    /// Convenience constructor, mostly for test expectations.
    pub fn new(time: Time, pid: ProcessId, kind: TraceKind) -> Self {
        TraceEntry { time, pid, kind }
    }
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}] {:?}", self.time, self.pid, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let entry = TraceEntry::new(Time::new(2.5), ProcessId::new(1), TraceKind::Event);
        assert_eq!(format!("{}", entry), "[T=2.5 P1] Event");
    }

    #[test]
    fn test_equality_for_assertions() {
        let a = TraceEntry::new(Time::new(0.0), ProcessId::new(0), TraceKind::Init);
        let b = TraceEntry::new(Time::new(0.0), ProcessId::new(0), TraceKind::Init);
        assert_eq!(a, b);
    }
}
