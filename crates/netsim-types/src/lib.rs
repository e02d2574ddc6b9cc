pub mod config;
pub mod error;
pub mod packet;

pub use config::{HostConfig, LinkConfig, NicConfig, ReliabilityMode};
pub use error::ScenarioError;
pub use packet::{Packet, PacketKind};
