use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// One of the five selectable endpoint delivery modes (spec.md §4.5–4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityMode {
    NoReliability,
    Acknowledges,
    AcknowledgesWithRetransmission,
    PipeliningFixedWindow,
    PipeliningDynamicWindow,
}

impl ReliabilityMode {
    pub fn uses_retransmission_timer(self) -> bool {
        !matches!(self, Self::NoReliability | Self::Acknowledges)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkConfig {
    pub distance_m: f64,
    pub speed_m_per_s: f64,
    pub lost_prob: f64,
}

impl LinkConfig {
    pub fn delay_pr(&self) -> f64 {
        self.distance_m / self.speed_m_per_s
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NicConfig {
    pub rate_bps: f64,
    /// 0 means unbounded.
    pub queue_cap_pkts: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HostConfig {
    pub mode: ReliabilityMode,
    /// Required for `AcknowledgesWithRetransmission`, `PipeliningFixedWindow`,
    /// `PipeliningDynamicWindow`; ignored otherwise.
    pub rto_seconds: f64,
    /// Fixed window size for `PipeliningFixedWindow`; ignored otherwise (PDW
    /// always starts at 1 regardless of this field).
    pub window_size: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            mode: ReliabilityMode::NoReliability,
            rto_seconds: 0.01,
            window_size: 5,
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.mode.uses_retransmission_timer() && self.rto_seconds <= 0.0 {
            return Err(ScenarioError::InvalidHostConfig {
                reason: format!(
                    "mode {:?} requires rto_seconds > 0, got {}",
                    self.mode, self.rto_seconds
                ),
            });
        }
        if self.mode == ReliabilityMode::PipeliningFixedWindow && self.window_size == 0 {
            return Err(ScenarioError::InvalidHostConfig {
                reason: "PipeliningFixedWindow requires window_size >= 1".to_string(),
            });
        }
        Ok(())
    }
}
