pub mod pipeline;
pub mod stop_wait;

use netsim_types::{HostConfig, Packet, ReliabilityMode};
use tracing::debug;

use crate::ids::NicId;
pub use pipeline::{PipelineState, WindowPolicy};
pub use stop_wait::StopWaitState;

/// Deferred side effects produced by a host callback, applied by `Scenario`
/// once the callback returns. A `HostNode` never reaches into its NIC or the
/// Simulator directly — it only describes what should happen, mirroring the
/// teacher harness's action-buffer idiom and sidestepping the NIC<->Host
/// back-reference cycle noted in spec.md §9.
pub enum HostAction {
    Send(Packet),
    StartTimer { delay: f64, token: u64, sn: u64 },
}

enum Mode {
    NoReliability,
    StopWait(StopWaitState),
    Pipeline(PipelineState),
}

/// The reliability-engine endpoint (spec.md §4.5–4.9). Exactly one mode's
/// state is live at a time, selected at construction from `HostConfig`.
pub struct HostNode {
    pub name: String,
    pub nic: NicId,
    mode: Mode,
}

impl HostNode {
    pub fn new(name: impl Into<String>, nic: NicId, config: HostConfig) -> Self {
        let mode = match config.mode {
            ReliabilityMode::NoReliability => Mode::NoReliability,
            ReliabilityMode::Acknowledges => {
                Mode::StopWait(StopWaitState::new(false, config.rto_seconds))
            }
            ReliabilityMode::AcknowledgesWithRetransmission => {
                Mode::StopWait(StopWaitState::new(true, config.rto_seconds))
            }
            ReliabilityMode::PipeliningFixedWindow => Mode::Pipeline(PipelineState::new(
                WindowPolicy::Fixed(config.window_size),
                config.rto_seconds,
            )),
            ReliabilityMode::PipeliningDynamicWindow => {
                Mode::Pipeline(PipelineState::new(WindowPolicy::Dynamic, config.rto_seconds))
            }
        };
        Self {
            name: name.into(),
            nic,
            mode,
        }
    }

    /// The upper layer submits an ordered batch of DATA packets.
    pub fn on_app_send(&mut self, pkts: Vec<Packet>) -> Vec<HostAction> {
        match &mut self.mode {
            Mode::NoReliability => {
                debug!(host = %self.name, count = pkts.len(), "no-reliability: submitting directly");
                pkts.into_iter().map(HostAction::Send).collect()
            }
            Mode::StopWait(s) => s.on_app_send(pkts),
            Mode::Pipeline(p) => p.on_app_send(pkts),
        }
    }

    /// A packet arrived from this host's NIC.
    pub fn on_packet(&mut self, pkt: Packet) -> Vec<HostAction> {
        match &mut self.mode {
            Mode::NoReliability => {
                debug!(host = %self.name, sn = pkt.sn, "no-reliability: received, discarded");
                Vec::new()
            }
            Mode::StopWait(s) => s.on_packet(pkt),
            Mode::Pipeline(p) => p.on_packet(pkt),
        }
    }

    /// This host's retransmission timer fired with the given (token, sn).
    pub fn on_timer(&mut self, token: u64, sn: u64) -> Vec<HostAction> {
        match &mut self.mode {
            Mode::NoReliability => Vec::new(),
            Mode::StopWait(s) => s.on_timer(token, sn),
            Mode::Pipeline(p) => p.on_timeout(token, sn),
        }
    }

    /// Inspection accessor for tests (unit and integration): expose the
    /// active mode's state when it's the pipelined kind.
    pub fn as_pipeline(&self) -> Option<&PipelineState> {
        match &self.mode {
            Mode::Pipeline(p) => Some(p),
            _ => None,
        }
    }

    /// Inspection accessor for tests (unit and integration): expose the
    /// active mode's state when it's the stop-and-wait kind.
    pub fn as_stop_wait(&self) -> Option<&StopWaitState> {
        match &self.mode {
            Mode::StopWait(s) => Some(s),
            _ => None,
        }
    }
}
