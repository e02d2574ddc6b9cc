use serde::{Deserialize, Serialize};

/// Fixed payload size (bytes) used for ACKs in the pipelined modes (PFW, PDW).
///
/// Stop-and-wait ACKs reuse the acknowledged DATA packet's size instead; see
/// `Packet::ack_for`. This distinction only affects wire-time accounting.
pub const PIPELINED_ACK_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketKind {
    Data,
    Ack,
}

/// An immutable packet record: a serial number, a size in bytes, and a kind tag.
///
/// Packets are never mutated after construction; two packets are distinct
/// values even if their fields happen to coincide (retransmission of `sn=3`
/// produces a fresh `Packet`, not a re-send of the same value).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Packet {
    pub sn: u64,
    pub size_bytes: u32,
    pub kind: PacketKind,
}

impl Packet {
    pub fn data(sn: u64, size_bytes: u32) -> Self {
        Self {
            sn,
            size_bytes,
            kind: PacketKind::Data,
        }
    }

    /// ACK for a stop-and-wait DATA packet: same sn, same size.
    pub fn ack_for(data: &Packet) -> Self {
        Self {
            sn: data.sn,
            size_bytes: data.size_bytes,
            kind: PacketKind::Ack,
        }
    }

    /// Cumulative ACK used by the pipelined modes: fixed small size regardless
    /// of the data it acknowledges.
    pub fn cumulative_ack(sn: u64) -> Self {
        Self {
            sn,
            size_bytes: PIPELINED_ACK_SIZE,
            kind: PacketKind::Ack,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, PacketKind::Data)
    }

    pub fn is_ack(&self) -> bool {
        matches!(self.kind, PacketKind::Ack)
    }
}
