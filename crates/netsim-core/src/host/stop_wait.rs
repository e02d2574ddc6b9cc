use std::collections::VecDeque;

use netsim_types::{Packet, PacketKind};
use tracing::{debug, info, warn};

use super::HostAction;

/// Shared sender/receiver state for the two stop-and-wait modes
/// (ACKNOWLEDGES and ACKNOWLEDGES_WITH_RETRANSMISSION, spec.md §4.6–4.7).
/// `retransmit` selects whether a loss is ever recovered from or the sender
/// stalls forever by design.
pub struct StopWaitState {
    retransmit: bool,
    rto: f64,
    send_queue: VecDeque<Packet>,
    waiting_ack: bool,
    current: Option<Packet>,
    timer_token: u64,
}

impl StopWaitState {
    pub fn new(retransmit: bool, rto: f64) -> Self {
        Self {
            retransmit,
            rto,
            send_queue: VecDeque::new(),
            waiting_ack: false,
            current: None,
            timer_token: 0,
        }
    }

    pub fn on_app_send(&mut self, pkts: Vec<Packet>) -> Vec<HostAction> {
        self.send_queue.extend(pkts);
        self.try_send_next()
    }

    fn try_send_next(&mut self) -> Vec<HostAction> {
        let mut actions = Vec::new();
        if self.waiting_ack {
            return actions;
        }
        let Some(pkt) = self.send_queue.pop_front() else {
            return actions;
        };
        self.current = Some(pkt);
        self.waiting_ack = true;
        debug!(sn = pkt.sn, "stop-and-wait: sending, now waiting for ACK");
        actions.push(HostAction::Send(pkt));
        if self.retransmit {
            self.timer_token += 1;
            actions.push(HostAction::StartTimer {
                delay: self.rto,
                token: self.timer_token,
                sn: pkt.sn,
            });
        }
        actions
    }

    pub fn on_packet(&mut self, pkt: Packet) -> Vec<HostAction> {
        match pkt.kind {
            PacketKind::Data => {
                info!(sn = pkt.sn, "stop-and-wait receiver: ACKing DATA");
                vec![HostAction::Send(Packet::ack_for(&pkt))]
            }
            PacketKind::Ack => match self.current {
                Some(cur) if self.waiting_ack && cur.sn == pkt.sn => {
                    info!(sn = pkt.sn, "stop-and-wait: matching ACK, sending next");
                    // Bumping the token here invalidates any in-flight retransmission
                    // timer for this packet; a stale `Timer` event will no-op.
                    if self.retransmit {
                        self.timer_token += 1;
                    }
                    self.waiting_ack = false;
                    self.current = None;
                    self.try_send_next()
                }
                _ => {
                    warn!(sn = pkt.sn, "stop-and-wait: unexpected ACK ignored");
                    Vec::new()
                }
            },
        }
    }

    pub fn on_timer(&mut self, token: u64, sn: u64) -> Vec<HostAction> {
        if !self.retransmit || token != self.timer_token || !self.waiting_ack {
            return Vec::new();
        }
        match self.current {
            Some(cur) if cur.sn == sn => {
                info!(sn, "stop-and-wait: RTO fired, retransmitting");
                self.timer_token += 1;
                vec![
                    HostAction::Send(cur),
                    HostAction::StartTimer {
                        delay: self.rto,
                        token: self.timer_token,
                        sn,
                    },
                ]
            }
            _ => Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn is_waiting_ack(&self) -> bool {
        self.waiting_ack
    }
}
