/// The action schedule: a deterministic time-ordered queue.
///
/// Uses a `BinaryHeap` with reversed `Ord` on `Action` to act as a
/// min-heap keyed by `(time, seq)`. Because sequence numbers are
/// assigned at insertion and strictly increase, actions scheduled for
/// the same virtual time are popped in insertion order (FIFO), and two
/// runs with the same inputs always produce the same dispatch order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::event::Event;
use crate::process::ProcessId;
use crate::time::Time;

// ── ActionKind ────────────────────────────────────────────────────────

/// What a scheduled action does when dispatched.
#[derive(Debug, Clone)]
pub enum ActionKind {
    /// Deliver an event to the target process.
    Event(Event),
    /// Run the target process's `init`.
    Init,
    /// Run the target process's `stop` and mark it terminated.
    Stop,
}

impl ActionKind {
    /// Short tag used by `Display`.
    pub fn tag(&self) -> &'static str {
        match self {
            ActionKind::Event(_) => "Event",
            ActionKind::Init => "Init",
            ActionKind::Stop => "Stop",
        }
    }
}

// ── Action ────────────────────────────────────────────────────────────

/// A scheduled unit of work: event delivery, process init, or process
/// stop, addressed to one process at one virtual time.
#[derive(Debug, Clone)]
pub struct Action {
    /// When the action is due.
    pub time: Time,
    /// The addressed process.
    pub pid: ProcessId,
    /// What to do on dispatch.
    pub kind: ActionKind,
    /// Insertion sequence number; breaks ties among equal times.
    seq: u64,
}

impl Action {
    /// The carried event, if this is an event-delivery action.
    pub fn event(&self) -> Option<&Event> {
        match &self.kind {
            ActionKind::Event(e) => Some(e),
            _ => None,
        }
    }
}

/// Ordering: smallest `(time, seq)` first.
///
/// Rust's `BinaryHeap` is a *max*-heap, so the natural ordering is
/// reversed here to turn it into a min-heap.
impl Ord for Action {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Action {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Equality on the heap key only; `seq` is unique per schedule, so two
/// distinct actions never compare equal.
impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for Action {}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}] {}", self.time, self.pid, self.kind.tag())
    }
}

// ── Schedule ──────────────────────────────────────────────────────────

/// The kernel's pending-action queue.
///
/// All scheduling goes through this struct to keep sequence numbers
/// monotonic and the dispatch order deterministic.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    /// Min-heap (via reversed Ord on Action).
    queue: BinaryHeap<Action>,

    /// Next insertion sequence number.
    next_seq: u64,
}

impl Schedule {
    /// Create a new, empty schedule.
    pub fn new() -> Self {
        Schedule {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Insert an action due at `time`, addressed to `pid`.
    pub fn insert(&mut self, time: Time, pid: ProcessId, kind: ActionKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Action {
            time,
            pid,
            kind,
            seq,
        });
    }

    /// Pop the next action (earliest time, lowest sequence number).
    ///
    /// Returns `None` when the schedule is empty.
    pub fn pop_first(&mut self) -> Option<Action> {
        self.queue.pop()
    }

    /// Keep only the actions for which `keep` returns `true`.
    ///
    /// Dropped actions release their event references. O(N); intended
    /// for the relatively rare predicate-based cancellation path.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Action) -> bool,
    {
        self.queue.retain(keep);
    }

    /// Drop every pending action and reset the sequence counter, so the
    /// next run starts from a pristine, deterministic state.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.next_seq = 0;
    }

    /// Returns `true` if no actions are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Drain all actions in dispatch order into a `Vec`.
    /// Useful for testing and debugging.
    pub fn drain_ordered(&mut self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(self.queue.len());
        while let Some(a) = self.queue.pop() {
            actions.push(a);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &'static str) -> ActionKind {
        ActionKind::Event(Event::new(s))
    }

    fn label_of(a: &Action) -> &'static str {
        a.event()
            .and_then(|e| e.downcast_ref::<&'static str>())
            .copied()
            .unwrap_or("-")
    }

    #[test]
    fn test_fifo_at_same_time() {
        let mut sched = Schedule::new();
        let p = ProcessId::new(0);

        sched.insert(Time::new(10.0), p, label("first"));
        sched.insert(Time::new(10.0), p, label("second"));
        sched.insert(Time::new(10.0), p, label("third"));

        let a1 = sched.pop_first().unwrap();
        let a2 = sched.pop_first().unwrap();
        let a3 = sched.pop_first().unwrap();

        // Same time → ordered by ascending sequence (insertion order).
        assert!(a1.seq < a2.seq);
        assert!(a2.seq < a3.seq);
        assert_eq!(label_of(&a1), "first");
        assert_eq!(label_of(&a2), "second");
        assert_eq!(label_of(&a3), "third");
    }

    #[test]
    fn test_time_ordering() {
        let mut sched = Schedule::new();
        let p = ProcessId::new(0);

        sched.insert(Time::new(30.0), p, ActionKind::Init);
        sched.insert(Time::new(10.0), p, ActionKind::Init);
        sched.insert(Time::new(20.0), p, ActionKind::Init);

        assert_eq!(sched.pop_first().unwrap().time, Time::new(10.0));
        assert_eq!(sched.pop_first().unwrap().time, Time::new(20.0));
        assert_eq!(sched.pop_first().unwrap().time, Time::new(30.0));
    }

    #[test]
    fn test_mixed_ordering() {
        let mut sched = Schedule::new();
        let p = ProcessId::new(0);

        // Interleave times to stress the heap.
        sched.insert(Time::new(5.0), p, ActionKind::Init);
        sched.insert(Time::new(1.0), p, ActionKind::Init);
        sched.insert(Time::new(1.0), p, ActionKind::Init);
        sched.insert(Time::new(3.0), p, ActionKind::Init);
        sched.insert(Time::new(1.0), p, ActionKind::Init);

        let actions = sched.drain_ordered();
        for window in actions.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            assert!(
                (a.time, a.seq) <= (b.time, b.seq),
                "Actions out of order: {} vs {}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_retain_preserves_order() {
        let mut sched = Schedule::new();
        let p = ProcessId::new(0);

        sched.insert(Time::new(2.0), p, label("a"));
        sched.insert(Time::new(3.0), p, label("b"));
        sched.insert(Time::new(4.0), p, label("c"));

        sched.retain(|a| label_of(a) != "b");

        let kept = sched.drain_ordered();
        assert_eq!(kept.len(), 2);
        assert_eq!(label_of(&kept[0]), "a");
        assert_eq!(label_of(&kept[1]), "c");
    }

    #[test]
    fn test_retain_releases_events() {
        let mut sched = Schedule::new();
        let p = ProcessId::new(0);
        let e = Event::new(42u32);

        sched.insert(Time::new(1.0), p, ActionKind::Event(e.clone()));
        assert_eq!(Event::refcount(&e), 2);

        sched.retain(|_| false);
        assert_eq!(Event::refcount(&e), 1);
    }

    #[test]
    fn test_empty_schedule() {
        let mut sched = Schedule::new();
        assert!(sched.is_empty());
        assert_eq!(sched.len(), 0);
        assert!(sched.pop_first().is_none());
    }

    #[test]
    fn test_clear_resets_sequence() {
        let mut sched = Schedule::new();
        let p = ProcessId::new(0);

        sched.insert(Time::new(1.0), p, ActionKind::Init);
        sched.clear();
        assert!(sched.is_empty());

        sched.insert(Time::new(1.0), p, ActionKind::Init);
        assert_eq!(sched.pop_first().unwrap().seq, 0);
    }

    #[test]
    fn test_determinism_across_runs() {
        // Two schedules with the same insertion order must drain in the
        // same order.
        fn build() -> Vec<(Time, u64)> {
            let mut sched = Schedule::new();
            let p = ProcessId::new(0);
            sched.insert(Time::new(5.0), p, ActionKind::Init);
            sched.insert(Time::new(3.0), p, ActionKind::Init);
            sched.insert(Time::new(5.0), p, ActionKind::Init);
            sched.insert(Time::new(1.0), p, ActionKind::Init);
            sched
                .drain_ordered()
                .into_iter()
                .map(|a| (a.time, a.seq))
                .collect()
        }

        assert_eq!(build(), build());
    }
}
