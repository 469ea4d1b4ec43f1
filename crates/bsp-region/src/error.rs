//! Error types for region construction and region algebra.

use thiserror::Error;

/// Errors raised by the region engine.
///
/// Geometric degeneracy during a split is not an error: an empty side is
/// reported as `None` by the split operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// The lower bound of an interval-like input lies above its upper bound.
    #[error("endpoints do not form an interval: [{lower}, {upper}]")]
    EndpointsNotAnInterval {
        /// Requested lower bound.
        lower: f64,
        /// Requested upper bound.
        upper: f64,
    },

    /// The tree of a periodic space does not agree with itself across the
    /// 2π seam.
    #[error("inconsistent inside/outside state at 2\u{03c0} wrapping")]
    InconsistentStateAt2PiWrapping,

    /// A tree is deeper than the configured recursion limit.
    #[error("tree depth {depth} exceeds the configured limit of {limit}")]
    DepthLimitExceeded {
        /// Depth of the offending tree.
        depth: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A builder cursor does not address a leaf.
    #[error("no leaf at cursor depth {depth}")]
    NotALeaf {
        /// Number of branches followed before the cursor went wrong.
        depth: usize,
    },
}

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;
