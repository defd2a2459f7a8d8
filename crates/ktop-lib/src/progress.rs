//! Progress notifications emitted while sampling
//!
//! Implementations must return quickly: the sampler calls them inline and
//! never waits on the indicator.

/// Receives sampling progress for one node at a time
pub trait Progress: Send + Sync {
    /// Sampling of a node with `total` pods begins
    fn start(&self, total: u64);

    /// One more pod has been sampled
    fn advance(&self);

    /// Sampling of the current node is done
    fn finish(&self);
}

/// Progress sink that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Progress for Silent {
    fn start(&self, _total: u64) {}

    fn advance(&self) {}

    fn finish(&self) {}
}
