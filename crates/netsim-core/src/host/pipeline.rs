use std::collections::{BTreeMap, VecDeque};

use netsim_types::{Packet, PacketKind};
use tracing::{debug, info, warn};

use super::HostAction;

/// How the pipelined sender manages its window size. `Fixed` never changes
/// after construction (Go-Back-N with a constant window); `Dynamic` starts
/// at 1, grows by 1 per newly-acking ACK, and resets to 1 on timeout
/// (spec.md §4.9).
#[derive(Clone, Copy)]
pub enum WindowPolicy {
    Fixed(u32),
    Dynamic,
}

/// Shared sender+receiver state for the two Go-Back-N pipelined modes
/// (PFW, PDW — spec.md §4.8–4.9). The two modes differ only in
/// `WindowPolicy`; everything else — window sliding, the single
/// oldest-unacked retransmission timer, the cumulative-ACK receiver — is
/// identical, so one state machine serves both.
pub struct PipelineState {
    policy: WindowPolicy,
    window_size: u32,
    base: Option<u64>,
    next: Option<u64>,
    in_flight: BTreeMap<u64, Packet>,
    app_queue: VecDeque<Packet>,
    rto: f64,
    timer_token: u64,
    expected: u64,
    recv_cache: BTreeMap<u64, Packet>,
}

impl PipelineState {
    pub fn new(policy: WindowPolicy, rto: f64) -> Self {
        let window_size = match policy {
            WindowPolicy::Fixed(w) => w,
            WindowPolicy::Dynamic => 1,
        };
        Self {
            policy,
            window_size,
            base: None,
            next: None,
            in_flight: BTreeMap::new(),
            app_queue: VecDeque::new(),
            rto,
            timer_token: 0,
            expected: 1,
            recv_cache: BTreeMap::new(),
        }
    }

    pub fn on_packet(&mut self, pkt: Packet) -> Vec<HostAction> {
        match pkt.kind {
            PacketKind::Data => self.on_data(pkt),
            PacketKind::Ack => self.on_ack(pkt.sn),
        }
    }

    pub fn on_app_send(&mut self, pkts: Vec<Packet>) -> Vec<HostAction> {
        if matches!(self.policy, WindowPolicy::Dynamic) {
            self.window_size = 1;
        }
        self.app_queue.extend(pkts);
        self.fill_window()
    }

    /// Fill the send window while there is room and the next packet to send
    /// is the expected next sn. Starts the retransmission timer the moment
    /// the window goes from empty to non-empty; a deliberate simplification
    /// (spec.md §4.8, §9 open question) means timeout only ever retransmits
    /// the packet at `base`, never the whole window.
    fn fill_window(&mut self) -> Vec<HostAction> {
        let mut actions = Vec::new();
        if self.base.is_none() {
            let Some(head) = self.app_queue.front() else {
                return actions;
            };
            self.base = Some(head.sn);
            self.next = Some(head.sn);
        }

        loop {
            if self.in_flight.len() as u32 >= self.window_size {
                break;
            }
            let Some(head) = self.app_queue.front() else {
                break;
            };
            if Some(head.sn) != self.next {
                // Caller supplied an out-of-order sn; a programmer error in
                // practice (spec.md §4.8), so we stop rather than skip ahead.
                break;
            }
            let pkt = self.app_queue.pop_front().expect("just peeked");
            self.in_flight.insert(pkt.sn, pkt);
            debug!(
                sn = pkt.sn,
                base = self.base,
                next = self.next,
                window = self.window_size,
                "pipeline: sends"
            );
            actions.push(HostAction::Send(pkt));

            if self.in_flight.len() == 1 {
                self.timer_token += 1;
                actions.push(HostAction::StartTimer {
                    delay: self.rto,
                    token: self.timer_token,
                    sn: self.base.expect("base set above"),
                });
            }

            self.next = Some(self.next.expect("set above") + 1);
        }
        actions
    }

    fn on_ack(&mut self, ack_sn: u64) -> Vec<HostAction> {
        let mut actions = Vec::new();
        let Some(base) = self.base else {
            return actions;
        };

        // ack_sn < base - 1, written to avoid underflow on unsigned sns.
        if ack_sn + 1 < base {
            warn!(ack_sn, base, "pipeline: stale ACK ignored");
            return actions;
        }

        let newly: Vec<u64> = self
            .in_flight
            .keys()
            .copied()
            .filter(|sn| *sn <= ack_sn)
            .collect();
        if newly.is_empty() {
            debug!(ack_sn, base, "pipeline: ACK retires nothing, ignored");
            return actions;
        }
        for sn in newly {
            self.in_flight.remove(&sn);
        }

        let old_base = base;
        self.base = Some(ack_sn + 1);
        info!(
            ack_sn,
            old_base,
            new_base = ack_sn + 1,
            "pipeline: cumulative ACK slides window"
        );

        if matches!(self.policy, WindowPolicy::Dynamic) {
            let old = self.window_size;
            self.window_size += 1;
            debug!(old, new = self.window_size, "pipeline: window grows (additive increase)");
        }

        if self.in_flight.is_empty() {
            self.timer_token += 1; // stop timer
            self.base = None;
            self.next = None;
        } else {
            self.timer_token += 1;
            actions.push(HostAction::StartTimer {
                delay: self.rto,
                token: self.timer_token,
                sn: self.base.expect("non-empty in_flight implies a base"),
            });
        }

        actions.extend(self.fill_window());
        actions
    }

    pub fn on_timeout(&mut self, token: u64, sn: u64) -> Vec<HostAction> {
        let mut actions = Vec::new();
        if token != self.timer_token {
            return actions;
        }
        let Some(base) = self.base else {
            return actions;
        };
        if sn != base {
            return actions;
        }

        if matches!(self.policy, WindowPolicy::Dynamic) {
            let old = self.window_size;
            self.window_size = 1;
            info!(old, "pipeline: timeout resets window to 1");
        }

        let Some(&pkt) = self.in_flight.get(&base) else {
            return actions;
        };
        info!(sn = base, "pipeline: timeout, retransmitting oldest unacked only");
        actions.push(HostAction::Send(pkt));
        self.timer_token += 1;
        actions.push(HostAction::StartTimer {
            delay: self.rto,
            token: self.timer_token,
            sn: base,
        });
        actions
    }

    fn on_data(&mut self, pkt: Packet) -> Vec<HostAction> {
        let sn = pkt.sn;
        if sn == self.expected {
            info!(sn, "pipeline receiver: in-order DATA");
            self.expected += 1;
            while let Some(cached) = self.recv_cache.remove(&self.expected) {
                info!(sn = cached.sn, "pipeline receiver: delivering cached DATA");
                self.expected += 1;
            }
        } else if sn > self.expected {
            if let std::collections::btree_map::Entry::Vacant(e) = self.recv_cache.entry(sn) {
                debug!(sn, expected = self.expected, "pipeline receiver: out-of-order DATA cached");
                e.insert(pkt);
            }
        } else {
            debug!(sn, expected = self.expected, "pipeline receiver: duplicate DATA ignored");
        }
        vec![HostAction::Send(Packet::cumulative_ack(self.expected - 1))]
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn base(&self) -> Option<u64> {
        self.base
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn expected(&self) -> u64 {
        self.expected
    }

    #[cfg(test)]
    pub fn timer_token(&self) -> u64 {
        self.timer_token
    }
}
