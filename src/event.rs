/// Events signalled between processes.
///
/// An [`Event`] is an immutable, type-erased payload handed to the
/// kernel by `signal_event` and delivered by reference to one or more
/// recipients. The kernel reference-counts events: every pending action
/// that carries an event owns one reference, and the payload is
/// destroyed when the last reference is dropped — whether by dispatch,
/// by predicate removal, or by `clear`.

use std::any::Any;
use std::rc::Rc;

/// An opaque, immutable value exchanged between processes.
///
/// Ownership model: *owning on signal, borrowing on dispatch*. User
/// code constructs an event and hands it to the signalling API, which
/// moves it into the schedule. Inside
/// [`Process::process_event`](crate::Process::process_event) the event
/// is borrowed and valid only for the duration of the call; to
/// re-signal it to another process, clone it (a reference-count bump,
/// not a payload copy) and signal the clone.
///
/// The payload is recovered by downcast, since the kernel places no
/// bound on the application's event vocabulary:
///
/// ```rust
/// use eventide::Event;
///
/// struct Payment { amount: u32 }
/// struct Shipment { crates: u32 }
///
/// let e = Event::new(Payment { amount: 120 });
/// if let Some(p) = e.downcast_ref::<Payment>() {
///     assert_eq!(p.amount, 120);
/// }
/// assert!(!e.is::<Shipment>());
/// ```
#[derive(Clone)]
pub struct Event {
    payload: Rc<dyn Any>,
}

impl Event {
    /// Wrap a payload into an event.
    pub fn new<T: Any>(payload: T) -> Self {
        Event {
            payload: Rc::new(payload),
        }
    }

    /// A payload-free event, useful as a pure timer signal.
    pub fn none() -> Self {
        Event::new(())
    }

    /// Returns `true` for events created with [`Event::none`].
    pub fn is_none(&self) -> bool {
        self.is::<()>()
    }

    /// Returns `true` if the payload is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// Borrow the payload as a `T`, or `None` on type mismatch.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Number of live references to this event's payload.
    ///
    /// Counts the caller's handles plus one per pending action carrying
    /// the event. Intended for tests asserting that runs do not leak.
    pub fn refcount(this: &Event) -> usize {
        Rc::strong_count(&this.payload)
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event(refs={})", Rc::strong_count(&self.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Label(&'static str);

    #[test]
    fn test_downcast_roundtrip() {
        let e = Event::new(Label("diagnosis"));
        assert!(e.is::<Label>());
        assert_eq!(e.downcast_ref::<Label>().unwrap().0, "diagnosis");
        assert!(e.downcast_ref::<u64>().is_none());
    }

    #[test]
    fn test_clone_bumps_refcount() {
        let e = Event::new(Label("a"));
        assert_eq!(Event::refcount(&e), 1);
        let e2 = e.clone();
        assert_eq!(Event::refcount(&e), 2);
        drop(e2);
        assert_eq!(Event::refcount(&e), 1);
    }

    #[test]
    fn test_payload_dropped_at_zero() {
        use std::cell::Cell;

        struct Canary(Rc<Cell<bool>>);
        impl Drop for Canary {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let e = Event::new(Canary(dropped.clone()));
        let e2 = e.clone();
        drop(e);
        assert!(!dropped.get());
        drop(e2);
        assert!(dropped.get());
    }

    #[test]
    fn test_none_event() {
        let e = Event::none();
        assert!(e.is_none());
        assert!(!Event::new(Label("x")).is_none());
    }

    #[test]
    fn test_debug_shows_refs() {
        let e = Event::none();
        let _e2 = e.clone();
        assert_eq!(format!("{:?}", e), "Event(refs=2)");
    }
}
