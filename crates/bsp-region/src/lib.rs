//! Space-agnostic regions backed by Binary Space Partitioning trees.
//!
//! A region is a BSP tree whose leaves flag their cell as inside or
//! outside. The same tree code serves every space that implements the
//! [`Space`] contract: arcs of a circle, intervals of a line, polygons,
//! polyhedra.
//!
//! - [`bsp`]: the tree, its builder, visitors and cut selectors
//! - [`Region`]: an immutable tree with a tolerance, cached measure and boundary
//! - [`factory`]: union, intersection, difference, x-or and complement
//! - [`embedded`]: sub-hyperplanes described by a region one dimension down

pub mod boundary;
pub mod bsp;
pub mod config;
pub mod embedded;
pub mod error;
pub mod factory;
mod region;
pub mod space;

#[cfg(test)]
mod testing;

pub use boundary::{BoundaryAttribute, BoundaryTree};
pub use bsp::{BspBuilder, BspNode, BspTree, Branch};
pub use config::{RegionConfig, DEFAULT_MAX_DEPTH, DEFAULT_TOLERANCE};
pub use embedded::{EmbeddedSub, Embedding, Trace};
pub use error::{RegionError, RegionResult};
pub use factory::{DifferenceMerger, Operator};
pub use region::{Region, SplitRegion};
pub use space::{Hyperplane, Location, Measure, Side, Space, Split, SubHyperplane, Transform};
