//! Coarse wait estimates for a mode's pool
//!
//! The baseline is driven by pool size alone. The skill-aware flavour also
//! asks the mode's policy whether the current pool would pair anybody.

use crate::config::WaitEstimatorKind;
use crate::matchmaking::policy::PairingPolicy;
use crate::queue::QueueEntry;
use crate::types::WaitEstimate;
use std::sync::Arc;
use tracing::debug;

/// Trait for wait estimation strategies
pub trait WaitEstimator: Send + Sync {
    fn estimate(&self, policy: &dyn PairingPolicy, pool: &[QueueEntry]) -> WaitEstimate;
}

fn by_pool_size(size: usize) -> WaitEstimate {
    match size {
        0 => WaitEstimate::LongWait,
        1 => WaitEstimate::ShortWait,
        _ => WaitEstimate::NoWait,
    }
}

/// Three-level estimate: 2+ players no wait, 1 short wait, 0 long wait
#[derive(Debug, Clone, Default)]
pub struct PoolSizeEstimator;

impl WaitEstimator for PoolSizeEstimator {
    fn estimate(&self, _policy: &dyn PairingPolicy, pool: &[QueueEntry]) -> WaitEstimate {
        by_pool_size(pool.len())
    }
}

/// Pool-size estimate, downgraded to a short wait when the policy would not
/// pair anybody in the current pool
#[derive(Debug, Clone, Default)]
pub struct SkillAwareEstimator;

impl WaitEstimator for SkillAwareEstimator {
    fn estimate(&self, policy: &dyn PairingPolicy, pool: &[QueueEntry]) -> WaitEstimate {
        let baseline = by_pool_size(pool.len());
        if baseline != WaitEstimate::NoWait {
            return baseline;
        }

        if policy.select_pair(pool).is_some() {
            WaitEstimate::NoWait
        } else {
            debug!(
                "No compatible pair among {} players in {} pool",
                pool.len(),
                policy.mode()
            );
            WaitEstimate::ShortWait
        }
    }
}

pub fn estimator_for(kind: WaitEstimatorKind) -> Arc<dyn WaitEstimator> {
    match kind {
        WaitEstimatorKind::PoolSize => Arc::new(PoolSizeEstimator),
        WaitEstimatorKind::SkillAware => Arc::new(SkillAwareEstimator),
    }
}
