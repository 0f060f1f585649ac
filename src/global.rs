//! Driver-side facade over a thread-local default [`Simulation`].
//!
//! The kernel proper is a context value threaded through the API, which
//! keeps tests isolated and state explicit. For the common case of a
//! program driving exactly one simulation, this module recovers the
//! classic "static simulator" flavour: free functions that all operate
//! on one default context per thread.
//!
//! Every call checks the context out of the thread-local slot, applies
//! the operation, and puts it back. Consequently the facade is strictly
//! for the *driver* side: while [`run_simulation`] holds the context,
//! process callbacks must use the `&mut Simulation` they are given —
//! a facade call made from inside a callback would see a fresh,
//! unrelated context.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::SimResult;
use crate::event::Event;
use crate::process::{Process, ProcessId};
use crate::simulation::{ErrorHandler, Simulation};
use crate::time::Time;

thread_local! {
    static DEFAULT: RefCell<Option<Simulation>> = RefCell::new(Some(Simulation::new()));
}

/// Run `f` against the thread's default simulation context.
///
/// This is the primitive the named facade functions are built on; use
/// it directly for operations they do not cover (e.g. `enable_trace`).
pub fn with<R>(f: impl FnOnce(&mut Simulation) -> R) -> R {
    let mut sim = DEFAULT.with(|slot| slot.borrow_mut().take()).unwrap_or_default();
    let result = f(&mut sim);
    DEFAULT.with(|slot| *slot.borrow_mut() = Some(sim));
    result
}

/// [`Simulation::create_process`] on the default context.
pub fn create_process(process: Rc<RefCell<dyn Process>>) -> ProcessId {
    with(|sim| sim.create_process(process))
}

/// [`Simulation::signal_event`] on the default context.
pub fn signal_event(pid: ProcessId, event: Event) {
    with(|sim| sim.signal_event(pid, event))
}

/// [`Simulation::signal_event_in`] on the default context.
pub fn signal_event_in(pid: ProcessId, event: Event, delay: Time) {
    with(|sim| sim.signal_event_in(pid, event, delay))
}

/// [`Simulation::stop_process`] on the default context.
pub fn stop_process(pid: ProcessId) -> SimResult<()> {
    with(|sim| sim.stop_process(pid))
}

/// [`Simulation::set_stop_time`] on the default context.
pub fn set_stop_time(t: Time) {
    with(|sim| sim.set_stop_time(t))
}

/// [`Simulation::set_error_handler`] on the default context.
pub fn set_error_handler(handler: Rc<RefCell<dyn ErrorHandler>>) {
    with(|sim| sim.set_error_handler(handler))
}

/// [`Simulation::remove_event`] on the default context.
pub fn remove_event<F>(pred: F)
where
    F: FnMut(&Event) -> bool,
{
    with(|sim| sim.remove_event(pred))
}

/// [`Simulation::run_simulation`] on the default context.
pub fn run_simulation() {
    with(|sim| sim.run_simulation())
}

/// [`Simulation::clear`] on the default context.
pub fn clear() {
    with(|sim| sim.clear())
}

/// [`Simulation::clock`] on the default context.
pub fn clock() -> Time {
    with(|sim| sim.clock())
}

/// [`Simulation::this_process`] on the default context.
pub fn this_process() -> ProcessId {
    with(|sim| sim.this_process())
}

/// [`Simulation::pending`] on the default context.
pub fn pending() -> usize {
    with(|sim| sim.pending())
}

/// [`Simulation::dispatched`] on the default context.
pub fn dispatched() -> u64 {
    with(|sim| sim.dispatched())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::INIT_TIME;

    struct Pinger {
        pings: u32,
    }

    impl Process for Pinger {
        fn init(&mut self, sim: &mut Simulation) {
            sim.self_signal_event_in(Event::none(), Time::new(1.0));
        }
        fn process_event(&mut self, sim: &mut Simulation, _event: &Event) {
            self.pings += 1;
            if self.pings < 3 {
                sim.self_signal_event_in(Event::none(), Time::new(1.0));
            }
        }
    }

    #[test]
    fn test_facade_drives_default_context() {
        clear();

        let pinger = Rc::new(RefCell::new(Pinger { pings: 0 }));
        let pid = create_process(pinger.clone());
        assert_eq!(pid, ProcessId::new(0));

        run_simulation();
        assert_eq!(pinger.borrow().pings, 3);
        assert_eq!(clock(), Time::new(3.0));
        assert_eq!(dispatched(), 4);

        clear();
        assert_eq!(clock(), INIT_TIME);
        assert_eq!(pending(), 0);
    }

    #[test]
    fn test_with_gives_full_api_access() {
        clear();
        with(|sim| {
            sim.enable_trace();
            assert_eq!(sim.trace(), Some(&[][..]));
        });
        clear();
    }
}
