//! Delegation chain recording for audit output

mod chain;

pub use chain::{DelegationChainRecorder, DelegationHop};
