//! Integration tests for the concrete end-to-end scenarios from spec.md §8
//! (S1–S3, S6), built by wiring real `Scenario` topologies rather than
//! exercising a single component in isolation.

use netsim_core::{HostId, NicId, Scenario};
use netsim_types::{HostConfig, LinkConfig, NicConfig, Packet, PacketKind, ReliabilityMode};

fn two_host_link(
    scenario: &mut Scenario,
    link_cfg: LinkConfig,
    nic_cfg: NicConfig,
    host_a_cfg: HostConfig,
    host_b_cfg: HostConfig,
) -> (HostId, HostId, NicId, NicId) {
    let link = scenario.add_link("L1", link_cfg);
    let nic_a = scenario.add_nic("eth0", nic_cfg);
    let nic_b = scenario.add_nic("eth0", nic_cfg);
    scenario.attach_nic_to_link(nic_a, link);
    scenario.attach_nic_to_link(nic_b, link);
    let host_a = scenario.add_host("A", nic_a, host_a_cfg);
    let host_b = scenario.add_host("B", nic_b, host_b_cfg);
    (host_a, host_b, nic_a, nic_b)
}

fn no_reliability() -> HostConfig {
    HostConfig {
        mode: ReliabilityMode::NoReliability,
        rto_seconds: 0.0,
        window_size: 0,
    }
}

/// S1 — best-effort, lossless: 3 packets arrive in order at
/// `k*80us + 5us` (80us transmission, 5us propagation), no ACKs.
#[test]
fn s1_best_effort_lossless_timing_and_order() {
    let mut sc = Scenario::new(1);
    let link_cfg = LinkConfig {
        distance_m: 1000.0,
        speed_m_per_s: 2e8,
        lost_prob: 0.0,
    };
    let nic_cfg = NicConfig {
        rate_bps: 1e6,
        queue_cap_pkts: 0,
    };
    let (host_a, host_b, nic_a, _nic_b) =
        two_host_link(&mut sc, link_cfg, nic_cfg, no_reliability(), no_reliability());

    let pkts = vec![Packet::data(1, 10), Packet::data(2, 10), Packet::data(3, 10)];
    sc.send(host_a, pkts);
    sc.run();

    let delivered: Vec<_> = sc
        .received_log()
        .iter()
        .filter(|(_, h, _)| *h == host_b)
        .collect();
    assert_eq!(delivered.len(), 3);

    for (k, (time, _, pkt)) in delivered.iter().enumerate() {
        let expected_time = (k as f64 + 1.0) * 80e-6 + 5e-6;
        assert!(
            (*time - expected_time).abs() < 1e-9,
            "packet {} arrived at {time}, expected {expected_time}",
            k + 1
        );
        assert_eq!(pkt.sn, (k + 1) as u64);
    }
    assert!(delivered.iter().all(|(_, _, p)| p.is_data()), "no ACKs in this mode");
    assert_eq!(sc.transmit_count(nic_a), 3);
}

/// S2 — stop-and-wait with retransmission: force the loss of sn=1's first
/// transmission only. Sender retransmits at t ~= rto and all packets are
/// eventually delivered in order, with exactly one extra DATA on the wire.
#[test]
fn s2_stop_and_wait_retransmission_recovers_single_loss() {
    let mut sc = Scenario::new(2);
    let link_cfg = LinkConfig {
        distance_m: 1000.0,
        speed_m_per_s: 2e8,
        lost_prob: 0.0,
    };
    let nic_cfg = NicConfig {
        rate_bps: 1e6,
        queue_cap_pkts: 0,
    };
    let host_cfg = HostConfig {
        mode: ReliabilityMode::AcknowledgesWithRetransmission,
        rto_seconds: 0.01,
        window_size: 0,
    };
    let (host_a, host_b, nic_a, nic_b) =
        two_host_link(&mut sc, link_cfg, nic_cfg, host_cfg, host_cfg);

    sc.force_drop_once(nic_a, 1, PacketKind::Data);

    let n = 3u64;
    let pkts: Vec<_> = (1..=n).map(|sn| Packet::data(sn, 10)).collect();
    sc.send(host_a, pkts);
    sc.run();

    let delivered_data: Vec<u64> = sc
        .received_log()
        .iter()
        .filter(|(_, h, p)| *h == host_b && p.is_data())
        .map(|(_, _, p)| p.sn)
        .collect();
    assert_eq!(delivered_data, vec![1, 2, 3], "in-order delivery despite the loss");

    // n DATA sends plus exactly one retransmission of sn=1.
    assert_eq!(sc.transmit_count(nic_a), n as u32 + 1);
    // one ACK per delivered DATA.
    assert_eq!(sc.transmit_count(nic_b), n as u32);

    let first_sn1_time = sc
        .received_log()
        .iter()
        .find(|(_, h, p)| *h == host_b && p.sn == 1 && p.is_data())
        .map(|(t, _, _)| *t)
        .unwrap();
    let expected = 0.01 + 80e-6 + 5e-6; // rto + transmission + propagation
    assert!(
        (first_sn1_time - expected).abs() < 1e-9,
        "sn=1 should only arrive after the retransmission at ~rto, got {first_sn1_time}"
    );
}

/// S3 — PFW, window 5, 10 packets, the cumulative ACK covering sn=10 (the
/// last packet) is force-dropped. Because it's the last DATA there is no
/// later ACK to cover it; the retransmission timer eventually fires and the
/// sender retransmits the packet at `base`, after which the transfer
/// completes with every sn delivered exactly once, in order.
#[test]
fn s3_pfw_cumulative_ack_loss_recovers_via_timeout() {
    let mut sc = Scenario::new(3);
    let link_cfg = LinkConfig {
        distance_m: 1000.0,
        speed_m_per_s: 2e8,
        lost_prob: 0.0,
    };
    let nic_cfg = NicConfig {
        rate_bps: 1e6,
        queue_cap_pkts: 0,
    };
    let host_cfg = HostConfig {
        mode: ReliabilityMode::PipeliningFixedWindow,
        rto_seconds: 0.01,
        window_size: 5,
    };
    let (host_a, host_b, _nic_a, nic_b) =
        two_host_link(&mut sc, link_cfg, nic_cfg, host_cfg, host_cfg);

    sc.force_drop_once(nic_b, 10, PacketKind::Ack);

    let pkts: Vec<_> = (1..=10u64).map(|sn| Packet::data(sn, 10)).collect();
    sc.send(host_a, pkts);
    sc.run();

    // received_log is raw NIC-reception order and includes the duplicate
    // arrival of sn=10 (once original, once after the timeout-driven
    // retransmission that recovers from the dropped ACK). The delivery
    // invariant (spec.md §8 #5) is about the distinct, in-order set the
    // receiver's `expected` cursor has advanced past, not raw arrivals.
    let delivered: std::collections::BTreeSet<u64> = sc
        .received_log()
        .iter()
        .filter(|(_, h, p)| *h == host_b && p.is_data())
        .map(|(_, _, p)| p.sn)
        .collect();
    assert_eq!(delivered.into_iter().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());

    let sender = sc.host(host_a).as_pipeline().unwrap();
    assert!(sender.base().is_none(), "window should have fully drained");
    assert_eq!(sender.in_flight_len(), 0);

    // The receiver's logical cursor is the actual in-order delivery
    // invariant; confirm it advanced past every sn with no gap.
    let receiver = sc.host(host_b).as_pipeline().unwrap();
    assert_eq!(receiver.expected(), 11);
}

/// S6 — PDW, 20 packets, force the loss of DATA sn=5 exactly once. Window
/// resets to 1 when the retransmission timer for sn=5 fires, then grows
/// again as subsequent cumulative ACKs retire packets.
#[test]
fn s6_pdw_timeout_resets_window_then_regrows() {
    let mut sc = Scenario::new(6);
    let link_cfg = LinkConfig {
        distance_m: 1000.0,
        speed_m_per_s: 2e8,
        lost_prob: 0.0,
    };
    let nic_cfg = NicConfig {
        rate_bps: 1e6,
        queue_cap_pkts: 0,
    };
    let host_cfg = HostConfig {
        mode: ReliabilityMode::PipeliningDynamicWindow,
        rto_seconds: 0.01,
        window_size: 0,
    };
    let (host_a, nic_a, host_b) = {
        let (a, b, nic_a, _nic_b) = two_host_link(&mut sc, link_cfg, nic_cfg, host_cfg, host_cfg);
        (a, nic_a, b)
    };

    sc.force_drop_once(nic_a, 5, PacketKind::Data);

    let pkts: Vec<_> = (1..=20u64).map(|sn| Packet::data(sn, 10)).collect();
    sc.send(host_a, pkts);
    sc.run();

    // Dropping sn=5 once means 6..9 reach B's NIC and are logged before the
    // timeout-driven retransmission of sn=5 arrives, so received_log order
    // is not ascending. As in S3, check the distinct set the receiver has
    // accepted rather than raw reception order (spec.md §8 #5 concerns the
    // order `expected` advances through, which `PipelineState` enforces
    // internally regardless of wire arrival order).
    let delivered: std::collections::BTreeSet<u64> = sc
        .received_log()
        .iter()
        .filter(|(_, h, p)| *h == host_b && p.is_data())
        .map(|(_, _, p)| p.sn)
        .collect();
    assert_eq!(delivered.into_iter().collect::<Vec<_>>(), (1..=20).collect::<Vec<_>>());

    let sender = sc.host(host_a).as_pipeline().unwrap();
    assert!(sender.base().is_none(), "full transfer should fully drain the window");
    // the retransmit of sn=5 plus the original 20 sends.
    assert_eq!(sc.transmit_count(nic_a), 21);

    // The receiver's logical cursor is the actual in-order delivery
    // invariant; confirm it advanced past every sn with no gap despite the
    // out-of-order wire arrival of the sn=5 retransmission.
    let receiver = sc.host(host_b).as_pipeline().unwrap();
    assert_eq!(receiver.expected(), 21);
}
