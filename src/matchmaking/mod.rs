//! Pairing policies, match creation and wait estimation

pub mod matcher;
pub mod policy;
pub mod wait_estimate;

pub use matcher::{MatchMaker, PairingOutcome};
pub use policy::{
    first_pair_within_window, policy_for, CasualPolicy, PairingPolicy, QuickPlayPolicy,
    RankedPolicy,
};
pub use wait_estimate::{
    estimator_for, PoolSizeEstimator, SkillAwareEstimator, WaitEstimator,
};
