//! The endpoint reliability engine and the minimal event-driven substrate it
//! runs on: a time-ordered event queue, a NIC transmission/queueing model, a
//! lossy link, and a forwarding router.

pub mod event;
pub mod host;
pub mod ids;
pub mod link;
pub mod nic;
pub mod router;
pub mod scenario;
pub mod sim;

pub use event::EventKind;
pub use host::{HostAction, HostNode, PipelineState, StopWaitState, WindowPolicy};
pub use ids::{HostId, LinkId, NicId, Owner, RouterId};
pub use link::Link;
pub use nic::{Admission, Nic};
pub use router::Router;
pub use scenario::Scenario;
pub use sim::Simulator;
