//! Tolerances and recursion limits for region construction.
//!
//! # Presets
//!
//! - [`RegionConfig::default()`] - balanced settings for analytic inputs
//! - [`RegionConfig::for_meshes()`] - looser tolerance for triangulated or scanned data
//! - [`RegionConfig::strict()`] - tight tolerance and a shallow depth limit
//!
//! ```
//! use bsp_region::RegionConfig;
//!
//! let config = RegionConfig::for_meshes().with_max_depth(512);
//! assert_eq!(config.max_depth, 512);
//! ```

use crate::error::{RegionError, RegionResult};

/// Default distance below which two points or hyperplanes are considered identical.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-10;

/// Default bound on tree depth accepted by the recursive algorithms.
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Settings shared by region construction and region algebra.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionConfig {
    /// Tolerance handed to the regions built with this configuration.
    pub tolerance: f64,

    /// Deepest tree the recursive algorithms (merge, split, classification,
    /// boundary characterization) are allowed to descend.
    /// Stack usage grows linearly with depth.
    pub max_depth: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RegionConfig {
    /// Configuration for triangulated meshes, whose vertices rarely sit
    /// exactly on shared planes.
    #[must_use]
    pub fn for_meshes() -> Self {
        Self {
            tolerance: 1.0e-8,
            ..Self::default()
        }
    }

    /// Tight tolerance and a shallow depth limit.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            tolerance: 1.0e-12,
            max_depth: 256,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fails when `depth` is beyond the configured limit.
    pub fn check_depth(&self, depth: usize) -> RegionResult<()> {
        if depth > self.max_depth {
            return Err(RegionError::DepthLimitExceeded {
                depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_in_tolerance() {
        assert!(RegionConfig::for_meshes().tolerance > RegionConfig::default().tolerance);
        assert!(RegionConfig::strict().tolerance < RegionConfig::default().tolerance);
    }

    #[test]
    fn depth_check() {
        let config = RegionConfig::default().with_max_depth(3);
        assert!(config.check_depth(3).is_ok());
        assert_eq!(
            config.check_depth(4),
            Err(RegionError::DepthLimitExceeded { depth: 4, limit: 3 })
        );
    }
}
