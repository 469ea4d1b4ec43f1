//! Binary Space Partitioning trees over any [`Space`](crate::Space).
//!
//! This module provides the space-agnostic tree that every region is built
//! on. The tree enables:
//!
//! - Point classification (inside, outside, boundary)
//! - Splitting by a sub-hyperplane and merging two trees with a leaf strategy
//! - Ordered traversal with visitors
//! - Incremental construction by cut insertion
//!
//! # Example
//!
//! ```ignore
//! use bsp_region::bsp::{BspBuilder, Branch, CollectingVisitor};
//!
//! let mut builder = BspBuilder::new(true);
//! builder.insert_cut(&[], &hyperplane)?;
//! builder.set_leaf(&[Branch::Plus], false)?;
//! let tree = builder.build();
//!
//! let mut visitor = CollectingVisitor::new();
//! tree.visit(&mut visitor);
//! let cuts = visitor.into_cuts();
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: a leaf or a boxed [`BspNode`]
//! - [`BspNode`]: a cut sub-hyperplane, two subtrees and an attribute slot
//! - [`Ancestor`]: one step of the explicit path used instead of parent links
//! - [`LeafMerger`]: strategy trait for merges
//! - [`CutSelector`]: strategy trait for choosing cuts when building from a boundary
//! - [`BspVisitor`]: visitor trait for custom traversal behavior

mod builder;
mod node;
mod selector;
mod tree;
mod visitor;

// Re-export main types
pub use builder::BspBuilder;
pub use node::{fit_to_cell, Ancestor, BspNode, Branch};
pub use selector::{CutSelector, FirstInList, LargestFirst};
pub use tree::{BspTree, LeafMerger};
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor, Order};
