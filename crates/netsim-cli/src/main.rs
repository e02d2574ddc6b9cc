use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use netsim_core::Scenario;
use netsim_types::{HostConfig, LinkConfig, NicConfig, Packet, ReliabilityMode};

#[derive(Parser, Debug)]
#[command(author, version, about = "Packet-network reliability simulator")]
struct Args {
    /// Reliability mode used by both endpoints.
    #[arg(long, value_enum, default_value_t = CliMode::PipeliningFixedWindow)]
    mode: CliMode,

    /// Number of DATA packets host A sends to host B.
    #[arg(long, default_value_t = 50)]
    packets: u64,

    /// Size in bytes of each DATA packet.
    #[arg(long, default_value_t = 10)]
    packet_size: u32,

    /// Fixed window size (PipeliningFixedWindow only).
    #[arg(long, default_value_t = 5)]
    window_size: u32,

    /// Retransmission timeout in seconds.
    #[arg(long, default_value_t = 0.01)]
    rto: f64,

    /// RNG seed driving link-loss decisions.
    #[arg(long, default_value_t = 2_147_483_611)]
    seed: u64,

    /// Write a JSON summary of the run to this path.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    NoReliability,
    Acknowledges,
    AcknowledgesWithRetransmission,
    PipeliningFixedWindow,
    PipeliningDynamicWindow,
}

impl From<CliMode> for ReliabilityMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::NoReliability => ReliabilityMode::NoReliability,
            CliMode::Acknowledges => ReliabilityMode::Acknowledges,
            CliMode::AcknowledgesWithRetransmission => {
                ReliabilityMode::AcknowledgesWithRetransmission
            }
            CliMode::PipeliningFixedWindow => ReliabilityMode::PipeliningFixedWindow,
            CliMode::PipeliningDynamicWindow => ReliabilityMode::PipeliningDynamicWindow,
        }
    }
}

#[derive(Serialize)]
struct Delivery {
    time: f64,
    host: String,
    packet: Packet,
}

#[derive(Serialize)]
struct SimulationSummary {
    mode: String,
    seed: u64,
    packets_sent: u64,
    deliveries: Vec<Delivery>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();
    info!(mode = ?args.mode, packets = args.packets, seed = args.seed, "starting simulation");

    let (mut scenario, host_a, host_b) = build_topology(&args);

    let pkts: Vec<Packet> = (1..=args.packets)
        .map(|sn| Packet::data(sn, args.packet_size))
        .collect();
    scenario.send(host_a, pkts);
    scenario.run();

    info!(
        delivered = scenario.received_log().len(),
        "simulation complete"
    );

    if let Some(path) = &args.trace_out {
        write_summary(path, &args, &scenario, host_b)?;
    }

    Ok(())
}

/// Builds the literal two-link, one-router topology used as this
/// simulator's canonical worked example: A --L1-- R --L2-- B, with R2's
/// link the slower, lossier, queue-bounded leg.
fn build_topology(args: &Args) -> (Scenario, netsim_core::HostId, netsim_core::HostId) {
    let mut scenario = Scenario::new(args.seed);

    let link_cfg = LinkConfig {
        distance_m: 1000.0,
        speed_m_per_s: 2.0 / 3.0 * 3e8,
        lost_prob: 0.02,
    };

    let link1 = scenario.add_link("L1", link_cfg);
    let link2 = scenario.add_link("L2", link_cfg);

    let nic_a = scenario.add_nic(
        "A.eth0",
        NicConfig {
            rate_bps: 1e6,
            queue_cap_pkts: 0,
        },
    );
    let nic_r1 = scenario.add_nic(
        "R.eth0",
        NicConfig {
            rate_bps: 1e6,
            queue_cap_pkts: 20,
        },
    );
    scenario.attach_nic_to_link(nic_a, link1);
    scenario.attach_nic_to_link(nic_r1, link1);

    let nic_r2 = scenario.add_nic(
        "R.eth1",
        NicConfig {
            rate_bps: 5e5,
            queue_cap_pkts: 0,
        },
    );
    let nic_b = scenario.add_nic(
        "B.eth0",
        NicConfig {
            rate_bps: 5e5,
            queue_cap_pkts: 0,
        },
    );
    scenario.attach_nic_to_link(nic_r2, link2);
    scenario.attach_nic_to_link(nic_b, link2);

    scenario.add_router("R", [nic_r1, nic_r2]);

    let host_cfg = HostConfig {
        mode: args.mode.into(),
        rto_seconds: args.rto,
        window_size: args.window_size,
    };
    let host_a = scenario.add_host("A", nic_a, host_cfg);
    let host_b = scenario.add_host("B", nic_b, host_cfg);

    (scenario, host_a, host_b)
}

fn write_summary(
    path: &std::path::Path,
    args: &Args,
    scenario: &Scenario,
    host_b: netsim_core::HostId,
) -> Result<()> {
    let deliveries = scenario
        .received_log()
        .iter()
        .filter(|(_, host, _)| *host == host_b)
        .map(|(time, _, packet)| Delivery {
            time: *time,
            host: "B".to_string(),
            packet: *packet,
        })
        .collect();

    let summary = SimulationSummary {
        mode: format!("{:?}", args.mode),
        seed: args.seed,
        packets_sent: args.packets,
        deliveries,
    };

    let data = serde_json::to_vec_pretty(&summary).context("failed to serialize summary")?;
    std::fs::write(path, data)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    Ok(())
}
