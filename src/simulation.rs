/// The simulator: virtual clock, process registry, and main loop.
///
/// A [`Simulation`] is an owned context value holding every piece of
/// kernel state — schedule, registry, clock, current process, run
/// flags, stop time, error handler. Drivers thread it through the API
/// explicitly; tests run in isolated contexts with no global reset. The
/// loop is purely synchronous and single-threaded: every `init` /
/// `process_event` / `stop` invocation runs to completion before the
/// next action is dispatched, so determinism is trivial.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{SimError, SimResult};
use crate::event::Event;
use crate::process::{Process, ProcessId};
use crate::schedule::{ActionKind, Schedule};
use crate::time::{Time, INIT_TIME};
use crate::trace::{TraceEntry, TraceKind};

// ── ErrorHandler ──────────────────────────────────────────────────────

/// Receiver for busy-process and terminated-process conditions.
///
/// These conditions occur when an action arrives for a process that is
/// still inside its busy window, or that has already completed its
/// stop. They may or may not be application errors, so the kernel
/// delegates them: with a handler installed, the offending action is
/// reported here; without one, it is silently dropped. Either way the
/// action is not dispatched.
///
/// Hooks run inside the main loop in the context of the offending
/// process: they may observe [`Simulation::clock`] and call the full
/// signalling API, including signalling events back to that process.
/// They must not call [`Simulation::run_simulation`] (the re-entrancy
/// guard turns it into a no-op).
pub trait ErrorHandler {
    /// Called by [`Simulation::clear`] so counters or other handler
    /// state can be reset alongside the kernel.
    fn clear(&mut self) {}

    /// An action arrived for `pid` while it was still busy.
    /// `event` is the carried event, absent for init/stop actions.
    fn handle_busy(&mut self, _sim: &mut Simulation, _pid: ProcessId, _event: Option<&Event>) {}

    /// An action arrived for `pid` after it terminated.
    /// `event` is the carried event, absent for init/stop actions.
    fn handle_terminated(
        &mut self,
        _sim: &mut Simulation,
        _pid: ProcessId,
        _event: Option<&Event>,
    ) {
    }
}

// ── Process registry ──────────────────────────────────────────────────

/// Registry entry for one process.
struct ProcessEntry {
    /// Shared handle; the caller may retain a clone and inspect the
    /// process after the run.
    process: Rc<RefCell<dyn Process>>,
    /// Set once the process's `stop` has run; nothing is dispatched to
    /// it afterwards.
    terminated: bool,
    /// Virtual time before which the process is considered busy.
    available_at: Time,
}

impl ProcessEntry {
    fn new(process: Rc<RefCell<dyn Process>>) -> Self {
        ProcessEntry {
            process,
            terminated: false,
            available_at: INIT_TIME,
        }
    }
}

// ── Simulation ────────────────────────────────────────────────────────

/// A sequential discrete-event simulator.
///
/// Maintains and executes a time-ordered schedule of actions. The
/// expected per-individual cycle in a microsimulation driver is:
///
/// ```rust
/// use eventide::{Process, Simulation};
///
/// struct Person { alive: bool }
/// impl Process for Person {}
///
/// let mut sim = Simulation::new();
/// let (_pid, person) = sim.spawn(Person { alive: true });
/// sim.run_simulation();
/// assert!(person.borrow().alive);
/// sim.clear(); // mandatory between runs
/// ```
pub struct Simulation {
    schedule: Schedule,
    processes: Vec<ProcessEntry>,
    current_time: Time,
    current_process: ProcessId,
    /// True while the loop should keep going; reset by
    /// `stop_simulation` and at loop exit.
    running: bool,
    /// Re-entrancy guard: a nested `run_simulation` is a no-op.
    in_loop: bool,
    /// Absolute virtual-time limit for the run; `None` means run until
    /// the schedule drains.
    stop_time: Option<Time>,
    dispatched: u64,
    error_handler: Option<Rc<RefCell<dyn ErrorHandler>>>,
    trace: Option<Vec<TraceEntry>>,
}

impl Simulation {
    /// Create an empty simulator at `INIT_TIME`.
    pub fn new() -> Self {
        Simulation {
            schedule: Schedule::new(),
            processes: Vec::new(),
            current_time: INIT_TIME,
            current_process: ProcessId::NULL,
            running: false,
            in_loop: false,
            stop_time: None,
            dispatched: 0,
            error_handler: None,
            trace: None,
        }
    }

    // ── Observation ───────────────────────────────────────────

    /// Current virtual time.
    #[inline]
    pub fn clock(&self) -> Time {
        self.current_time
    }

    /// The process currently being dispatched, or [`ProcessId::NULL`]
    /// outside the main loop.
    #[inline]
    pub fn this_process(&self) -> ProcessId {
        self.current_process
    }

    /// Returns `true` while the main loop is executing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of pending actions in the schedule.
    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    /// Total actions dispatched since the last `clear`.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Number of registered processes.
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    // ── Process management ────────────────────────────────────

    /// Create a new process from a shared handle.
    ///
    /// Appends the process to the registry and schedules its `init` at
    /// the current virtual time; `init` is guaranteed to run before any
    /// event is delivered to the process. Safe both within the
    /// simulation and outside it.
    pub fn create_process(&mut self, process: Rc<RefCell<dyn Process>>) -> ProcessId {
        let pid = ProcessId::new(self.processes.len());
        self.processes.push(ProcessEntry::new(process));
        self.schedule.insert(self.current_time, pid, ActionKind::Init);
        pid
    }

    /// Convenience wrapper around [`create_process`]: wraps a process
    /// value and returns the assigned ID together with a handle for
    /// post-run inspection.
    ///
    /// [`create_process`]: Simulation::create_process
    pub fn spawn<P: Process + 'static>(&mut self, process: P) -> (ProcessId, Rc<RefCell<P>>) {
        let handle = Rc::new(RefCell::new(process));
        let pid = self.create_process(handle.clone());
        (pid, handle)
    }

    /// Schedule a stop for `pid` at the current virtual time.
    ///
    /// The stop runs after every action already scheduled before this
    /// call. Fails if `pid` is unknown or already terminated; no action
    /// is scheduled in that case.
    pub fn stop_process(&mut self, pid: ProcessId) -> SimResult<()> {
        let entry = self
            .processes
            .get(pid.index())
            .ok_or(SimError::UnknownProcess(pid))?;
        if entry.terminated {
            return Err(SimError::AlreadyTerminated(pid));
        }
        self.schedule.insert(self.current_time, pid, ActionKind::Stop);
        Ok(())
    }

    /// Schedule a stop for the current process at the current virtual
    /// time. Meaningless outside the main loop.
    pub fn stop_self(&mut self) {
        debug_assert!(
            !self.current_process.is_null(),
            "stop_self called outside the main loop"
        );
        self.schedule
            .insert(self.current_time, self.current_process, ActionKind::Stop);
    }

    // ── Signalling ────────────────────────────────────────────

    /// Signal `event` to `pid` at the current virtual time.
    pub fn signal_event(&mut self, pid: ProcessId, event: Event) {
        debug_assert!(
            pid.index() < self.processes.len(),
            "signal_event to unknown process {}",
            pid
        );
        self.schedule
            .insert(self.current_time, pid, ActionKind::Event(event));
    }

    /// Signal `event` to `pid` after `delay`.
    ///
    /// # Panics
    /// Panics if `delay` is negative (a programming error).
    pub fn signal_event_in(&mut self, pid: ProcessId, event: Event, delay: Time) {
        assert!(
            delay.is_valid_delay(),
            "negative signal delay: {}",
            delay
        );
        debug_assert!(
            pid.index() < self.processes.len(),
            "signal_event_in to unknown process {}",
            pid
        );
        self.schedule
            .insert(self.current_time + delay, pid, ActionKind::Event(event));
    }

    /// Signal `event` to the current process at the current virtual
    /// time. Meaningless outside the main loop.
    pub fn self_signal_event(&mut self, event: Event) {
        self.signal_event(self.current_process, event);
    }

    /// Signal `event` to the current process after `delay`.
    /// Meaningless outside the main loop.
    ///
    /// # Panics
    /// Panics if `delay` is negative (a programming error).
    pub fn self_signal_event_in(&mut self, event: Event, delay: Time) {
        self.signal_event_in(self.current_process, event, delay);
    }

    /// Advance the execution time of the current process by `delay`
    /// without emitting any action.
    ///
    /// This specifies the duration of the response being executed: the
    /// current process's busy window is widened, so any action
    /// addressed to it with a time inside the window is diverted to the
    /// error handler instead of being dispatched. Not a suspension —
    /// the handler keeps running. No-op outside the main loop.
    ///
    /// # Panics
    /// Panics if `delay` is negative (a programming error).
    pub fn advance_delay(&mut self, delay: Time) {
        assert!(
            delay.is_valid_delay(),
            "negative advance_delay: {}",
            delay
        );
        if !self.running {
            return;
        }
        self.current_time = self.current_time + delay;
    }

    // ── Run control ───────────────────────────────────────────

    /// Set the absolute virtual time at which the run terminates.
    ///
    /// Actions due exactly at the stop time are still dispatched;
    /// anything later ends the run undelivered. Passing `INIT_TIME`
    /// disables the limit, so the run ends when the schedule drains.
    pub fn set_stop_time(&mut self, t: Time) {
        self.stop_time = if t == INIT_TIME { None } else { Some(t) };
    }

    /// Install the receiver for busy/terminated conditions.
    ///
    /// The kernel stores the handle, so the caller keeps shared access
    /// to the handler's state (e.g. to read counters after a run).
    pub fn set_error_handler(&mut self, handler: Rc<RefCell<dyn ErrorHandler>>) {
        self.error_handler = Some(handler);
    }

    /// Request termination of the loop at the end of the current
    /// dispatch.
    pub fn stop_simulation(&mut self) {
        self.running = false;
    }

    /// Delete all pending event-delivery actions whose event satisfies
    /// `pred`, releasing their event references.
    ///
    /// Init and stop actions are always preserved: cancellation of a
    /// pending stop is not supported. O(N) in the schedule size;
    /// intended for relatively rare "withdraw the scheduled Y if X
    /// happened first" logic.
    pub fn remove_event<F>(&mut self, mut pred: F)
    where
        F: FnMut(&Event) -> bool,
    {
        self.schedule.retain(|action| match action.event() {
            Some(e) => !pred(e),
            None => true,
        });
    }

    /// Reset the kernel to an empty state, making it available for a
    /// completely new run.
    ///
    /// Pending actions are dropped with their event references
    /// released; the registry is emptied (only the kernel's handles are
    /// dropped — the caller's clones stay alive); clock, current
    /// process, stop time, and the dispatch counter return to their
    /// initial values; the installed error handler stays installed but
    /// is notified through its own `clear` hook. Every `ProcessId` from
    /// before the call is invalidated.
    pub fn clear(&mut self) {
        self.running = false;
        self.current_time = INIT_TIME;
        self.current_process = ProcessId::NULL;
        self.stop_time = None;
        self.dispatched = 0;
        self.processes.clear();
        self.schedule.clear();
        if let Some(handler) = self.error_handler.clone() {
            handler.borrow_mut().clear();
        }
        if let Some(trace) = &mut self.trace {
            trace.clear();
        }
    }

    // ── Main loop ─────────────────────────────────────────────

    /// Execute the simulation until the schedule drains, the stop time
    /// passes, or `stop_simulation` is called.
    ///
    /// Re-entrant calls (from inside a process callback or an error
    /// handler) are silently ignored.
    pub fn run_simulation(&mut self) {
        if self.in_loop {
            return;
        }
        self.in_loop = true;
        self.running = true;

        while self.running {
            let Some(action) = self.schedule.pop_first() else {
                break;
            };
            // No monotonicity check here: after an advance_delay the
            // clock can sit past the next action's time, in which case
            // that action lands in the busy window below.
            self.current_time = action.time;

            if let Some(limit) = self.stop_time {
                if self.current_time > limit {
                    self.trace_push(action.pid, TraceKind::StopTime);
                    break;
                }
            }

            self.current_process = action.pid;
            let (terminated, available_at, process) =
                match self.processes.get(action.pid.index()) {
                    Some(entry) => {
                        (entry.terminated, entry.available_at, entry.process.clone())
                    }
                    None => {
                        // Unknown pid: a caller contract violation. Skip
                        // the action; its event reference is released at
                        // the end of the iteration.
                        debug_assert!(
                            false,
                            "action addressed to unknown process {}",
                            action.pid
                        );
                        continue;
                    }
                };

            if terminated {
                self.trace_push(action.pid, TraceKind::Terminated);
                if let Some(handler) = self.error_handler.clone() {
                    handler
                        .borrow_mut()
                        .handle_terminated(self, action.pid, action.event());
                }
            } else if self.current_time < available_at {
                self.trace_push(action.pid, TraceKind::Busy);
                if let Some(handler) = self.error_handler.clone() {
                    handler
                        .borrow_mut()
                        .handle_busy(self, action.pid, action.event());
                }
            } else {
                match &action.kind {
                    ActionKind::Event(event) => {
                        self.trace_push(action.pid, TraceKind::Event);
                        process.borrow_mut().process_event(self, event);
                    }
                    ActionKind::Init => {
                        self.trace_push(action.pid, TraceKind::Init);
                        process.borrow_mut().init(self);
                    }
                    ActionKind::Stop => {
                        self.trace_push(action.pid, TraceKind::Stop);
                        process.borrow_mut().stop(self);
                        // The callback may have grown the registry; the
                        // entry borrow from before it is gone, so look
                        // the descriptor up again by index.
                        if let Some(entry) = self.processes.get_mut(action.pid.index()) {
                            entry.terminated = true;
                        }
                    }
                }
                // Same re-lookup discipline. current_time includes any
                // advance_delay made during the callback, so this
                // widens the busy window accordingly.
                if let Some(entry) = self.processes.get_mut(action.pid.index()) {
                    entry.available_at = self.current_time;
                }
                self.dispatched += 1;
            }
            // `action` is dropped here, releasing its event reference.
        }

        self.in_loop = false;
        self.running = false;
        self.current_process = ProcessId::NULL;
    }

    // ── Trace ─────────────────────────────────────────────────

    /// Start recording one [`TraceEntry`] per main-loop iteration.
    pub fn enable_trace(&mut self) {
        if self.trace.is_none() {
            self.trace = Some(Vec::new());
        }
    }

    /// The recorded dispatch trace, if tracing is enabled.
    pub fn trace(&self) -> Option<&[TraceEntry]> {
        self.trace.as_deref()
    }

    /// Take the recorded trace, leaving tracing enabled with an empty
    /// buffer.
    pub fn take_trace(&mut self) -> Vec<TraceEntry> {
        match &mut self.trace {
            Some(trace) => std::mem::take(trace),
            None => Vec::new(),
        }
    }

    /// Export the dispatch trace as pretty-printed JSON.
    #[cfg(feature = "serialize")]
    pub fn trace_json(&self) -> String {
        match &self.trace {
            Some(trace) => {
                serde_json::to_string_pretty(trace).unwrap_or_else(|_| "[]".into())
            }
            None => "[]".into(),
        }
    }

    fn trace_push(&mut self, pid: ProcessId, kind: TraceKind) {
        if let Some(trace) = &mut self.trace {
            trace.push(TraceEntry::new(self.current_time, pid, kind));
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
