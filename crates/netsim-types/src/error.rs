use thiserror::Error;

/// Errors raised while building a scenario from caller-supplied configuration.
///
/// This is the one boundary where configuration mistakes surface as a
/// `Result` rather than a panic: unlike the in-simulation assertions (NIC
/// double-attach, rate mismatch — see `netsim-core`), these are checked
/// before the simulation starts, on values that may have come from outside
/// the program.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid host config: {reason}")]
    InvalidHostConfig { reason: String },
}
