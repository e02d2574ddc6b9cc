use std::collections::VecDeque;

use netsim_types::Packet;

use crate::ids::{LinkId, Owner};

/// What `Nic::offer` decided to do with a freshly-submitted packet.
pub enum Admission {
    /// NIC was idle; begin transmitting this packet immediately.
    BeginTransmit(Packet),
    /// NIC was busy; packet queued behind the one in flight.
    Queued,
    /// Queue was full; packet is dropped (spec.md §4.3, logged but unreported).
    Dropped,
}

/// A half-duplex serializer attached to one link and one owner (spec.md
/// §4.3). Holds its own FIFO queue and transmission state; has no idea what
/// a `Link` or `Host` is beyond the opaque handles it stores for `Scenario`
/// to resolve.
pub struct Nic {
    pub name: String,
    rate_bps: f64,
    queue: VecDeque<Packet>,
    /// 0 = unbounded.
    queue_cap: u32,
    transmitting: bool,
    pub link: Option<LinkId>,
    pub owner: Option<Owner>,
}

impl Nic {
    pub fn new(name: impl Into<String>, rate_bps: f64, queue_cap: u32) -> Self {
        Self {
            name: name.into(),
            rate_bps,
            queue: VecDeque::new(),
            queue_cap,
            transmitting: false,
            link: None,
            owner: None,
        }
    }

    pub fn rate_bps(&self) -> f64 {
        self.rate_bps
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn is_transmitting(&self) -> bool {
        self.transmitting
    }

    pub fn delay_tr(&self, size_bytes: u32) -> f64 {
        size_bytes as f64 * 8.0 / self.rate_bps
    }

    /// Admission rule: if idle, transmit now; else enqueue unless the queue is
    /// full. A queue of capacity N admits at most N-1 queued packets while one
    /// is in transmission (the "< queue_cap" strict comparison from spec.md
    /// §4.3), so `queue_cap` counts the packet-in-flight too.
    pub fn offer(&mut self, pkt: Packet) -> Admission {
        if self.transmitting {
            let depth = self.queue.len() as u32;
            if self.queue_cap == 0 || depth + 1 < self.queue_cap {
                self.queue.push_back(pkt);
                Admission::Queued
            } else {
                Admission::Dropped
            }
        } else {
            self.transmitting = true;
            Admission::BeginTransmit(pkt)
        }
    }

    /// End-of-transmission: advance the queue. Returns the next packet to
    /// transmit, if any; otherwise the NIC goes idle.
    pub fn end_of_tx(&mut self) -> Option<Packet> {
        match self.queue.pop_front() {
            Some(pkt) => Some(pkt),
            None => {
                self.transmitting = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsim_types::Packet;

    fn pkt(sn: u64) -> Packet {
        Packet::data(sn, 10)
    }

    #[test]
    fn idle_nic_transmits_immediately() {
        let mut nic = Nic::new("eth0", 1_000_000.0, 0);
        match nic.offer(pkt(1)) {
            Admission::BeginTransmit(p) => assert_eq!(p.sn, 1),
            _ => panic!("expected BeginTransmit"),
        }
        assert!(nic.is_transmitting());
        assert_eq!(nic.queue_depth(), 0);
    }

    #[test]
    fn busy_nic_queues_under_capacity() {
        let mut nic = Nic::new("eth0", 1_000_000.0, 0);
        let _ = nic.offer(pkt(1));
        match nic.offer(pkt(2)) {
            Admission::Queued => {}
            _ => panic!("expected Queued"),
        }
        assert_eq!(nic.queue_depth(), 1);
    }

    #[test]
    fn unbounded_queue_never_drops() {
        let mut nic = Nic::new("eth0", 1_000_000.0, 0);
        let _ = nic.offer(pkt(1));
        for sn in 2..200 {
            assert!(matches!(nic.offer(pkt(sn)), Admission::Queued));
        }
        assert_eq!(nic.queue_depth(), 198);
    }

    #[test]
    fn queue_cap_one_drops_second_packet_during_transmission() {
        let mut nic = Nic::new("eth0", 1_000_000.0, 1);
        let _ = nic.offer(pkt(1)); // begins transmitting
        match nic.offer(pkt(2)) {
            Admission::Dropped => {}
            _ => panic!("expected Dropped"),
        }
        assert_eq!(nic.queue_depth(), 0);
    }

    #[test]
    fn queue_cap_admits_n_minus_one_queued() {
        let mut nic = Nic::new("eth0", 1_000_000.0, 3);
        let _ = nic.offer(pkt(1)); // transmitting
        assert!(matches!(nic.offer(pkt(2)), Admission::Queued));
        match nic.offer(pkt(3)) {
            Admission::Dropped => {}
            _ => panic!("expected Dropped at capacity"),
        }
        assert_eq!(nic.queue_depth(), 1);
    }

    #[test]
    fn end_of_tx_advances_queue_then_goes_idle() {
        let mut nic = Nic::new("eth0", 1_000_000.0, 0);
        let _ = nic.offer(pkt(1));
        let _ = nic.offer(pkt(2));
        let next = nic.end_of_tx();
        assert_eq!(next.map(|p| p.sn), Some(2));
        assert_eq!(nic.queue_depth(), 0);
        assert!(nic.end_of_tx().is_none());
        assert!(!nic.is_transmitting());
    }
}
