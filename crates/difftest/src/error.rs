//! Error type of the difftest Rust API.

use rvdiff_core::common::{ConfigError, SimError, Trap};

/// Failures of [`RefModel`](crate::RefModel) operations.
#[derive(Debug, thiserror::Error)]
pub enum DifftestError {
    /// The caller broke the difftest contract (unsupported direction, missing
    /// initialisation, null buffer). Fatal at the C ABI.
    #[error("difftest contract violation: {0}")]
    ContractViolation(&'static str),

    /// The reference configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The simulator could not be built.
    #[error("reference simulator: {0}")]
    Sim(SimError),

    /// A memory access through the reference MMU trapped.
    #[error("reference access trapped: {0}")]
    Trap(#[from] Trap),

    /// The attached hart does not exist.
    #[error("no hart with index {0}")]
    NoSuchHart(usize),
}

impl From<SimError> for DifftestError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::Config(e) => Self::Config(e),
            SimError::NoSuchHart(idx) => Self::NoSuchHart(idx),
            other @ SimError::Allocation { .. } => Self::Sim(other),
        }
    }
}

/// Result alias for the difftest API.
pub type Result<T, E = DifftestError> = std::result::Result<T, E>;
