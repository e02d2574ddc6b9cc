use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scheduled event, ordered by `(time, insertion index)`. The insertion
/// index breaks ties so that same-time events fire in the order they were
/// enqueued, giving a total order even over a partially-ordered time type.
struct Scheduled<T> {
    time: f64,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest (time, seq) pops first.
        other
            .time
            .partial_cmp(&self.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A time-ordered priority queue of events. Oblivious to what `T` means: it
/// only orders and hands events back out in `(time, insertion_index)` order.
/// Semantic dispatch belongs to whoever pops events back off (see
/// `Scenario::run`), keeping this type reusable and free of any coupling to
/// the network model it happens to be driving here.
pub struct Simulator<T> {
    now: f64,
    queue: BinaryHeap<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Simulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Simulator<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `payload` to fire `dt` seconds from now. `dt` must be
    /// non-negative; this is a programming-error assertion, not a recoverable
    /// condition (spec.md §7: configuration errors abort the simulation).
    pub fn add_event(&mut self, payload: T, dt: f64) {
        assert!(dt >= 0.0, "event dt must be non-negative, got {dt}");
        let time = self.now + dt;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { time, seq, payload });
    }

    /// Pop the earliest-scheduled event, advancing `now` to its deadline.
    pub fn pop(&mut self) -> Option<T> {
        let scheduled = self.queue.pop()?;
        self.now = scheduled.time;
        Some(scheduled.payload)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Simulator;

    #[test]
    fn pops_in_time_order() {
        let mut sim = Simulator::new();
        sim.add_event("third", 3.0);
        sim.add_event("first", 1.0);
        sim.add_event("second", 2.0);

        assert_eq!(sim.pop(), Some("first"));
        assert_eq!(sim.now(), 1.0);
        assert_eq!(sim.pop(), Some("second"));
        assert_eq!(sim.pop(), Some("third"));
        assert_eq!(sim.pop(), None);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut sim = Simulator::new();
        sim.add_event("a", 5.0);
        sim.add_event("b", 5.0);
        sim.add_event("c", 5.0);

        assert_eq!(sim.pop(), Some("a"));
        assert_eq!(sim.pop(), Some("b"));
        assert_eq!(sim.pop(), Some("c"));
    }

    #[test]
    #[should_panic]
    fn negative_dt_panics() {
        let mut sim: Simulator<()> = Simulator::new();
        sim.add_event((), -1.0);
    }
}
