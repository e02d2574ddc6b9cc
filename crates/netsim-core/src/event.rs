use netsim_types::Packet;

use crate::ids::{HostId, NicId};

/// Tagged event payloads dispatched by `Scenario::run`. Using a closed enum
/// instead of boxed callbacks keeps the simulator free of per-event heap
/// allocation (spec.md §9, "Event payloads").
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A NIC finishes serializing the packet currently in transmission.
    EndOfTx { nic: NicId },
    /// A packet arrives at a NIC's receiver (scheduled by the far-side NIC).
    Reception { nic: NicId, packet: Packet },
    /// A host's retransmission timer fires. `token` must match the host's
    /// current timer generation or the event is a stale no-op (spec.md §4.7,
    /// §9 "Timer cancellation without queue mutation").
    Timer { host: HostId, token: u64, sn: u64 },
}
