//! Incremental tree construction by cut insertion.

use crate::error::{RegionError, RegionResult};
use crate::space::{Hyperplane, Space, SubHyperplane};

use super::node::{fit_to_cell, Ancestor, Branch};
use super::tree::BspTree;

/// Builds a tree by splitting leaves one at a time.
///
/// Leaves are addressed by a cursor: the branches to follow from the root.
/// The finished tree is handed out by [`build`](BspBuilder::build) and is
/// immutable from then on.
#[derive(Debug, Clone)]
pub struct BspBuilder<S: Space> {
    tree: BspTree<S>,
}

impl<S: Space> BspBuilder<S> {
    /// Starts from a single leaf.
    pub fn new(inside: bool) -> Self {
        Self {
            tree: BspTree::Leaf(inside),
        }
    }

    /// Returns the tree built so far.
    #[inline]
    pub fn tree(&self) -> &BspTree<S> {
        &self.tree
    }

    /// Splits the leaf at `cursor` with `hyperplane`, fitted to the leaf's
    /// cell. Both new leaves inherit the leaf's flag.
    ///
    /// Returns `Ok(false)` and leaves the tree unchanged when the hyperplane
    /// does not cross the cell.
    pub fn insert_cut(&mut self, cursor: &[Branch], hyperplane: &S::Hyperplane) -> RegionResult<bool> {
        let (leaf, path) = self.leaf_at(cursor)?;
        let BspTree::Leaf(inside) = *leaf else {
            return Err(RegionError::NotALeaf { depth: cursor.len() });
        };
        let Some(cut) = fit_to_cell(hyperplane.whole_hyperplane(), &path).filter(|cut| !cut.is_empty()) else {
            return Ok(false);
        };
        *leaf = BspTree::node(cut, BspTree::Leaf(inside), BspTree::Leaf(inside));
        Ok(true)
    }

    /// Sets the flag of the leaf at `cursor`.
    pub fn set_leaf(&mut self, cursor: &[Branch], inside: bool) -> RegionResult<()> {
        let (leaf, _) = self.leaf_at(cursor)?;
        if !leaf.is_leaf() {
            return Err(RegionError::NotALeaf { depth: cursor.len() });
        }
        *leaf = BspTree::Leaf(inside);
        Ok(())
    }

    /// Finishes construction.
    pub fn build(self) -> BspTree<S> {
        self.tree
    }

    fn leaf_at(&mut self, cursor: &[Branch]) -> RegionResult<(&mut BspTree<S>, Vec<Ancestor<S>>)> {
        let mut path = Vec::with_capacity(cursor.len());
        let mut current = &mut self.tree;
        for (depth, branch) in cursor.iter().enumerate() {
            current = match current {
                BspTree::Node(node) => {
                    path.push(Ancestor::new(node.hyperplane().clone(), *branch));
                    node.child_mut(*branch)
                }
                BspTree::Leaf(_) => return Err(RegionError::NotALeaf { depth }),
            };
        }
        Ok((current, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Location;
    use crate::testing::{cut, Line1};

    #[test]
    fn insert_cut_splits_leaf() {
        let mut builder = BspBuilder::<Line1>::new(true);

        assert!(builder.insert_cut(&[], &cut(1.0, true)).unwrap());
        builder.set_leaf(&[Branch::Plus], false).unwrap();
        let tree = builder.build();

        assert_eq!(tree.classify(&0.0, 1.0e-10), Location::Inside);
        assert_eq!(tree.classify(&2.0, 1.0e-10), Location::Outside);
    }

    #[test]
    fn new_leaves_inherit_flag() {
        let mut builder = BspBuilder::<Line1>::new(false);
        builder.insert_cut(&[], &cut(1.0, true)).unwrap();

        assert_eq!(builder.tree().root().unwrap().plus().leaf_value(), Some(false));
        assert_eq!(builder.tree().root().unwrap().minus().leaf_value(), Some(false));
    }

    #[test]
    fn insert_cut_outside_cell_is_refused() {
        let mut builder = BspBuilder::<Line1>::new(true);
        builder.insert_cut(&[], &cut(1.0, true)).unwrap();

        // the minus cell is x < 1
        assert!(!builder.insert_cut(&[Branch::Minus], &cut(2.0, true)).unwrap());
        assert!(builder.insert_cut(&[Branch::Minus], &cut(0.0, true)).unwrap());
        assert_eq!(builder.tree().depth(), 2);
    }

    #[test]
    fn cursor_must_address_a_leaf() {
        let mut builder = BspBuilder::<Line1>::new(true);
        builder.insert_cut(&[], &cut(1.0, true)).unwrap();

        assert_eq!(
            builder.insert_cut(&[], &cut(0.0, true)),
            Err(RegionError::NotALeaf { depth: 0 })
        );
        assert_eq!(
            builder.set_leaf(&[Branch::Plus, Branch::Plus], true),
            Err(RegionError::NotALeaf { depth: 1 })
        );
    }
}
