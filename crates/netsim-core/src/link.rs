use netsim_types::LinkConfig;

use crate::ids::NicId;

/// A bidirectional channel between at most two NICs. Carries no per-packet
/// state; it only exposes propagation delay and loss probability for the NIC
/// model to consume (spec.md §4.2).
pub struct Link {
    pub name: String,
    config: LinkConfig,
    nics: Vec<NicId>,
}

impl Link {
    pub fn new(name: impl Into<String>, config: LinkConfig) -> Self {
        Self {
            name: name.into(),
            config,
            nics: Vec::new(),
        }
    }

    pub fn delay_pr(&self) -> f64 {
        self.config.delay_pr()
    }

    pub fn lost_prob(&self) -> f64 {
        self.config.lost_prob
    }

    /// Attach a NIC. Rate-matching against an already-attached NIC is the
    /// caller's (`Scenario`) responsibility, since `Link` does not hold NIC
    /// state directly.
    pub fn attach(&mut self, nic: NicId) {
        assert!(!self.nics.contains(&nic), "NIC already attached to link {}", self.name);
        assert!(self.nics.len() < 2, "link {} already attached to 2 NICs", self.name);
        self.nics.push(nic);
    }

    pub fn attached_nics(&self) -> &[NicId] {
        &self.nics
    }

    pub fn other(&self, nic: NicId) -> NicId {
        assert_eq!(self.nics.len(), 2, "link {} has no other NIC attached", self.name);
        if self.nics[0] == nic {
            self.nics[1]
        } else if self.nics[1] == nic {
            self.nics[0]
        } else {
            panic!("NIC not attached to link {}", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LinkConfig {
        LinkConfig {
            distance_m: 1000.0,
            speed_m_per_s: 2e8,
            lost_prob: 0.0,
        }
    }

    #[test]
    fn delay_pr_is_distance_over_speed() {
        let link = Link::new("L1", cfg());
        assert_eq!(link.delay_pr(), 1000.0 / 2e8);
    }

    #[test]
    fn other_returns_opposite_endpoint() {
        let mut link = Link::new("L1", cfg());
        link.attach(NicId(0));
        link.attach(NicId(1));
        assert_eq!(link.other(NicId(0)), NicId(1));
        assert_eq!(link.other(NicId(1)), NicId(0));
    }

    #[test]
    #[should_panic]
    fn attaching_a_third_nic_panics() {
        let mut link = Link::new("L1", cfg());
        link.attach(NicId(0));
        link.attach(NicId(1));
        link.attach(NicId(2));
    }

    #[test]
    #[should_panic]
    fn attaching_the_same_nic_twice_panics() {
        let mut link = Link::new("L1", cfg());
        link.attach(NicId(0));
        link.attach(NicId(0));
    }
}
