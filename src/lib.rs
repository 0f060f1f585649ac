//! # Eventide — Sequential Discrete-Event Simulation Kernel
//!
//! A generic, single-threaded, deterministic DES kernel built as the
//! substrate for continuous-time microsimulation: large populations
//! advanced from birth to death by event-driven state machines. The
//! kernel maintains a virtual clock, a time-ordered schedule of
//! actions, and a registry of logical processes that emit and consume
//! events. No async, no threads, no wall-clock time.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │       Simulation          │ ← main loop + signalling API
//! │  ┌────────────────────┐  │
//! │  │  Process registry  │  │ ← dense table: handle, terminated,
//! │  │                    │  │   available_at busy watermark
//! │  ├────────────────────┤  │
//! │  │     Schedule       │  │ ← min-heap of actions, FIFO on ties
//! │  ├────────────────────┤  │
//! │  │      Events        │  │ ← refcounted opaque payloads
//! │  ├────────────────────┤  │
//! │  │       Time         │  │ ← real-valued virtual clock
//! │  └────────────────────┘  │
//! └──────────────────────────┘
//! ```
//!
//! ## A minimal process
//!
//! ```rust
//! use eventide::{Event, Process, Simulation, Time};
//!
//! struct Heartbeat { beats: u32 }
//!
//! impl Process for Heartbeat {
//!     fn init(&mut self, sim: &mut Simulation) {
//!         sim.self_signal_event_in(Event::none(), Time::new(1.0));
//!     }
//!     fn process_event(&mut self, sim: &mut Simulation, _event: &Event) {
//!         self.beats += 1;
//!         if self.beats < 5 {
//!             sim.self_signal_event_in(Event::none(), Time::new(1.0));
//!         }
//!     }
//! }
//!
//! let mut sim = Simulation::new();
//! let (_pid, heart) = sim.spawn(Heartbeat { beats: 0 });
//! sim.run_simulation();
//! assert_eq!(heart.borrow().beats, 5);
//! assert_eq!(sim.clock(), Time::new(5.0));
//! ```

pub mod error;
pub mod event;
pub mod global;
pub mod process;
pub mod rng;
pub mod schedule;
pub mod simulation;
pub mod time;
pub mod trace;


// Re-exports for convenience.
pub use error::{SimError, SimResult};
pub use event::Event;
pub use process::{Process, ProcessHandle, ProcessId};
pub use rng::SplitMix64;
pub use schedule::{Action, ActionKind, Schedule};
pub use simulation::{ErrorHandler, Simulation};
pub use time::{Time, INIT_TIME};
pub use trace::{TraceEntry, TraceKind};
