//! Result-queue driven pool sizing
//!
//! A deep result queue means persistence is the bottleneck, so fetching
//! slows down; a shallow one means there is room to fetch faster. The pool
//! changes by at most one worker per tick.

use crate::config::{AutoscaleConfig, PoolConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    Grow,
    Shrink,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autoscaler {
    high_watermark: usize,
    low_watermark: usize,
    min_size: usize,
    max_size: usize,
}

impl Autoscaler {
    pub fn new(autoscale: &AutoscaleConfig, pool: &PoolConfig) -> Self {
        Self {
            high_watermark: autoscale.high_watermark,
            low_watermark: autoscale.low_watermark,
            min_size: pool.min_size,
            max_size: pool.max_size,
        }
    }

    /// Decides the change for one tick
    ///
    /// # Arguments
    ///
    /// * `depth` - Current result queue depth
    /// * `pool_size` - Current number of live workers
    pub fn decide(&self, depth: usize, pool_size: usize) -> ScaleDecision {
        if depth > self.high_watermark && pool_size > self.min_size {
            ScaleDecision::Shrink
        } else if depth < self.low_watermark && pool_size < self.max_size {
            ScaleDecision::Grow
        } else {
            ScaleDecision::Hold
        }
    }

    /// Pool size after applying one decision
    pub fn apply(decision: ScaleDecision, pool_size: usize) -> usize {
        match decision {
            ScaleDecision::Grow => pool_size + 1,
            ScaleDecision::Shrink => pool_size.saturating_sub(1),
            ScaleDecision::Hold => pool_size,
        }
    }
}
