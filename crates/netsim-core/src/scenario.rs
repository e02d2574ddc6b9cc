use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use netsim_types::{HostConfig, LinkConfig, NicConfig, Packet, PacketKind};

use crate::event::EventKind;
use crate::host::{HostAction, HostNode};
use crate::ids::{HostId, LinkId, NicId, Owner, RouterId};
use crate::link::Link;
use crate::nic::{Admission, Nic};
use crate::router::Router;
use crate::sim::Simulator;

/// Owns every component table and the event queue; the single place that
/// resolves the `NicId`/`LinkId`/`HostId`/`RouterId` handles components use
/// to refer to each other (spec.md §9, "Back-references without cycles").
/// Nothing here owns anything else here — ownership flows `Scenario` →
/// (links, nics, hosts, routers, sim), never sideways.
pub struct Scenario {
    sim: Simulator<EventKind>,
    links: Vec<Link>,
    nics: Vec<Nic>,
    hosts: Vec<HostNode>,
    routers: Vec<Router>,
    rng: StdRng,
    /// One-shot deterministic fault injection for tests: force the next
    /// transmission of `(nic, sn, kind)` to be lost regardless of `rng`.
    force_drop_once: Vec<(NicId, u64, PacketKind)>,
    /// Instrumentation for tests/observability: every packet a host's NIC
    /// hands up to it, and how many times each NIC has begun transmitting.
    received_log: Vec<(f64, HostId, Packet)>,
    transmit_counts: HashMap<NicId, u32>,
}

impl Scenario {
    pub fn new(seed: u64) -> Self {
        Self {
            sim: Simulator::new(),
            links: Vec::new(),
            nics: Vec::new(),
            hosts: Vec::new(),
            routers: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            force_drop_once: Vec::new(),
            received_log: Vec::new(),
            transmit_counts: HashMap::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.sim.now()
    }

    pub fn add_link(&mut self, name: impl Into<String>, config: LinkConfig) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link::new(name, config));
        id
    }

    pub fn add_nic(&mut self, name: impl Into<String>, config: NicConfig) -> NicId {
        let id = NicId(self.nics.len());
        self.nics.push(Nic::new(name, config.rate_bps, config.queue_cap_pkts));
        id
    }

    /// Attach a NIC to a link, enforcing the at-most-two and rate-match
    /// invariants from spec.md §3 (a configuration error; aborts on
    /// violation rather than returning a `Result`, per spec.md §7).
    pub fn attach_nic_to_link(&mut self, nic: NicId, link: LinkId) {
        if let Some(&other) = self.links[link.0].attached_nics().first() {
            let this_rate = self.nics[nic.0].rate_bps();
            let other_rate = self.nics[other.0].rate_bps();
            assert_eq!(
                this_rate, other_rate,
                "NIC rate mismatch attaching to link {}",
                self.links[link.0].name
            );
        }
        self.links[link.0].attach(nic);
        self.nics[nic.0].link = Some(link);
    }

    pub fn add_host(&mut self, name: impl Into<String>, nic: NicId, config: HostConfig) -> HostId {
        config.validate().expect("invalid host config");
        assert!(self.nics[nic.0].owner.is_none(), "NIC already has an owner");
        let id = HostId(self.hosts.len());
        self.nics[nic.0].owner = Some(Owner::Host(id));
        self.hosts.push(HostNode::new(name, nic, config));
        id
    }

    pub fn add_router(&mut self, name: impl Into<String>, nics: [NicId; 2]) -> RouterId {
        for nic in nics {
            assert!(self.nics[nic.0].owner.is_none(), "NIC already has an owner");
        }
        let id = RouterId(self.routers.len());
        for nic in nics {
            self.nics[nic.0].owner = Some(Owner::Router(id));
        }
        self.routers.push(Router::new(name, nics));
        id
    }

    /// Register a one-shot deterministic loss: the next time `(nic, sn,
    /// kind)` is transmitted, it is dropped regardless of `rng`. Intended for
    /// tests that need a specific loss (spec.md §8 scenarios S2/S3/S6)
    /// rather than a probabilistic one.
    pub fn force_drop_once(&mut self, nic: NicId, sn: u64, kind: PacketKind) {
        self.force_drop_once.push((nic, sn, kind));
    }

    fn take_forced_drop(&mut self, nic: NicId, sn: u64, kind: PacketKind) -> bool {
        if let Some(pos) = self
            .force_drop_once
            .iter()
            .position(|(n, s, k)| *n == nic && *s == sn && *k == kind)
        {
            self.force_drop_once.remove(pos);
            true
        } else {
            false
        }
    }

    /// The upper layer submits an ordered batch of DATA packets to a host.
    pub fn send(&mut self, host: HostId, pkts: Vec<Packet>) {
        let actions = self.hosts[host.0].on_app_send(pkts);
        self.apply_host_actions(host, actions);
    }

    /// Drain the event queue to completion, advancing virtual time to each
    /// popped event's timestamp before invoking it (spec.md §4.1).
    pub fn run(&mut self) {
        while let Some(event) = self.sim.pop() {
            match event {
                EventKind::EndOfTx { nic } => self.on_end_of_tx(nic),
                EventKind::Reception { nic, packet } => self.on_reception(nic, packet),
                EventKind::Timer { host, token, sn } => self.on_timer(host, token, sn),
            }
        }
    }

    fn on_end_of_tx(&mut self, nic_id: NicId) {
        debug!(nic = %self.nics[nic_id.0].name, "end of transmission");
        if let Some(next_pkt) = self.nics[nic_id.0].end_of_tx() {
            self.begin_transmission(nic_id, next_pkt);
        }
    }

    fn on_reception(&mut self, nic_id: NicId, pkt: Packet) {
        let owner = self.nics[nic_id.0].owner.expect("nic has no owner");
        match owner {
            Owner::Host(host) => {
                self.received_log.push((self.sim.now(), host, pkt));
                let actions = self.hosts[host.0].on_packet(pkt);
                self.apply_host_actions(host, actions);
            }
            Owner::Router(router) => {
                let other = self.routers[router.0].other(nic_id);
                info!(router = %self.routers[router.0].name, sn = pkt.sn, "router forwards");
                self.nic_send(other, pkt);
            }
        }
    }

    fn on_timer(&mut self, host: HostId, token: u64, sn: u64) {
        let actions = self.hosts[host.0].on_timer(token, sn);
        self.apply_host_actions(host, actions);
    }

    fn apply_host_actions(&mut self, host: HostId, actions: Vec<HostAction>) {
        let nic_id = self.hosts[host.0].nic;
        for action in actions {
            match action {
                HostAction::Send(pkt) => self.nic_send(nic_id, pkt),
                HostAction::StartTimer { delay, token, sn } => {
                    self.sim.add_event(EventKind::Timer { host, token, sn }, delay);
                }
            }
        }
    }

    fn nic_send(&mut self, nic_id: NicId, pkt: Packet) {
        match self.nics[nic_id.0].offer(pkt) {
            Admission::BeginTransmit(pkt) => self.begin_transmission(nic_id, pkt),
            Admission::Queued => {
                debug!(nic = %self.nics[nic_id.0].name, sn = pkt.sn, "nic: enqueued behind transmission");
            }
            Admission::Dropped => {
                warn!(nic = %self.nics[nic_id.0].name, sn = pkt.sn, "nic: queue full, packet dropped");
            }
        }
    }

    fn begin_transmission(&mut self, nic_id: NicId, pkt: Packet) {
        *self.transmit_counts.entry(nic_id).or_insert(0) += 1;
        let delay_tr = self.nics[nic_id.0].delay_tr(pkt.size_bytes);
        debug!(nic = %self.nics[nic_id.0].name, sn = pkt.sn, delay_tr, "nic: begin transmission");
        self.sim.add_event(EventKind::EndOfTx { nic: nic_id }, delay_tr);

        let link_id = self.nics[nic_id.0]
            .link
            .expect("nic must be attached to a link before sending");

        let forced = self.take_forced_drop(nic_id, pkt.sn, pkt.kind);
        let lost = forced || self.rng.random::<f64>() < self.links[link_id.0].lost_prob();
        if lost {
            warn!(nic = %self.nics[nic_id.0].name, sn = pkt.sn, forced, "packet lost on link");
            return;
        }

        let peer = self.links[link_id.0].other(nic_id);
        let delay_pr = self.links[link_id.0].delay_pr();
        self.sim
            .add_event(EventKind::Reception { nic: peer, packet: pkt }, delay_tr + delay_pr);
    }

    // --- accessors used by tests and the driver ---

    pub fn nic(&self, id: NicId) -> &Nic {
        &self.nics[id.0]
    }

    pub fn host(&self, id: HostId) -> &HostNode {
        &self.hosts[id.0]
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn received_log(&self) -> &[(f64, HostId, Packet)] {
        &self.received_log
    }

    pub fn transmit_count(&self, nic: NicId) -> u32 {
        self.transmit_counts.get(&nic).copied().unwrap_or(0)
    }
}
