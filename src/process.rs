//! Process identifiers and the process abstraction.
//!
//! A process is a user-defined state machine driven by the kernel: it is
//! initialised once, receives events, and may be stopped. Processes
//! never share memory with each other — all interaction goes through
//! the time-ordered schedule.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::error::{SimError, SimResult};
use crate::event::Event;
use crate::simulation::Simulation;

// ── ProcessId ─────────────────────────────────────────────────────────

/// Dense integer handle for a simulated process.
///
/// Assigned sequentially by
/// [`Simulation::create_process`](crate::Simulation::create_process),
/// never reused within a run, and invalidated by
/// [`Simulation::clear`](crate::Simulation::clear). The newtype keeps
/// process handles from being confused with other integers at compile
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessId(usize);

impl ProcessId {
    /// The absent-process sentinel: what
    /// [`Simulation::this_process`](crate::Simulation::this_process)
    /// reports outside the main loop, and the initial state of a
    /// [`ProcessHandle`].
    pub const NULL: ProcessId = ProcessId(usize::MAX);

    /// Create a process ID from a raw registry index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        ProcessId(index)
    }

    /// Return the registry index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns `true` for the [`ProcessId::NULL`] sentinel.
    #[inline]
    pub fn is_null(self) -> bool {
        self == ProcessId::NULL
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "P-")
        } else {
            write!(f, "P{}", self.0)
        }
    }
}

// ── Process ───────────────────────────────────────────────────────────

/// Trait implemented by every simulated process.
///
/// All three capabilities default to doing nothing, so a process only
/// spells out the reactions it cares about. Each callback receives the
/// owning [`Simulation`] and may call the full signalling API on it.
///
/// # Contract
///
/// - `init` runs exactly once, at the virtual time of the
///   `create_process` call, before any event is delivered to this
///   process.
/// - `process_event` runs once per delivered event. The `&Event` borrow
///   is valid only within the call; clone it to re-signal
///   (a reference-count bump, not a payload copy).
/// - `stop` runs when a scheduled stop is dispatched, after every event
///   that was scheduled before the stop call. A stopped process never
///   executes again.
pub trait Process {
    /// Initialisation step, executed when the process enters the
    /// simulation. Not a constructor: it runs at simulated time, so it
    /// may signal events.
    fn init(&mut self, _sim: &mut Simulation) {}

    /// React to an event signalled to this process.
    fn process_event(&mut self, _sim: &mut Simulation, _event: &Event) {}

    /// Executed when the process is explicitly stopped.
    fn stop(&mut self, _sim: &mut Simulation) {}
}

// ── ProcessHandle ─────────────────────────────────────────────────────

/// Shared handle to a process that memoises its own [`ProcessId`].
///
/// The kernel registry holds `Rc<RefCell<dyn Process>>` handles, so the
/// caller keeps co-ownership of every process it creates and can
/// inspect its state after the run — the kernel never frees the
/// caller's handle. `ProcessHandle` packages that pattern: construct
/// one around a process value, [`activate`](ProcessHandle::activate) it
/// exactly once, and read the state back through
/// [`borrow`](ProcessHandle::borrow) when the run is over.
///
/// ```rust
/// use eventide::{Process, ProcessHandle, Simulation};
///
/// struct Counter { seen: u32 }
/// impl Process for Counter {}
///
/// let mut sim = Simulation::new();
/// let counter = ProcessHandle::new(Counter { seen: 0 });
/// let pid = counter.activate(&mut sim).unwrap();
/// assert_eq!(counter.pid(), pid);
/// assert!(counter.activate(&mut sim).is_err());
///
/// sim.run_simulation();
/// assert_eq!(counter.borrow().seen, 0);
/// ```
pub struct ProcessHandle<P> {
    process: Rc<RefCell<P>>,
    pid: Cell<ProcessId>,
}

impl<P: Process + 'static> ProcessHandle<P> {
    /// Wrap a process value. The handle starts unactivated
    /// (`pid() == ProcessId::NULL`).
    pub fn new(process: P) -> Self {
        ProcessHandle {
            process: Rc::new(RefCell::new(process)),
            pid: Cell::new(ProcessId::NULL),
        }
    }

    /// Register the process with `sim` and memoise the assigned ID.
    ///
    /// A handle can be activated only once; later calls return
    /// [`SimError::AlreadyActivated`]. Note that `clear` invalidates
    /// all process IDs, so a fresh handle is needed for each run.
    pub fn activate(&self, sim: &mut Simulation) -> SimResult<ProcessId> {
        if !self.pid.get().is_null() {
            return Err(SimError::AlreadyActivated(self.pid.get()));
        }
        let pid = sim.create_process(self.process.clone());
        self.pid.set(pid);
        Ok(pid)
    }

    /// The memoised process ID, or [`ProcessId::NULL`] before
    /// activation.
    pub fn pid(&self) -> ProcessId {
        self.pid.get()
    }

    /// Borrow the process state (e.g. after a run).
    pub fn borrow(&self) -> Ref<'_, P> {
        self.process.borrow()
    }

    /// Mutably borrow the process state (e.g. to reset between runs).
    pub fn borrow_mut(&self) -> RefMut<'_, P> {
        self.process.borrow_mut()
    }
}
