//! BSP tree node implementation.

use crate::space::{Space, SubHyperplane};

use super::tree::BspTree;

/// An internal node of a BSP tree.
///
/// Each node partitions its cell using a cut sub-hyperplane. The part of the
/// cell on the plus side of the cut hyperplane lives in the `plus` subtree,
/// the part on the minus side in the `minus` subtree.
///
/// The cut is always restricted to the node's own cell: it never extends
/// beyond the hyperplanes of the ancestors.
///
/// # Attribute
///
/// Plain partition trees carry `()`. Boundary trees carry a
/// [`BoundaryAttribute`](crate::BoundaryAttribute) describing which parts
/// of the cut separate inside from outside.
#[derive(Debug, Clone)]
pub struct BspNode<S: Space, A = ()> {
    /// The cut sub-hyperplane, fitted to the node's cell.
    pub(crate) cut: S::Sub,

    /// Subtree on the plus side of the cut hyperplane.
    pub(crate) plus: BspTree<S, A>,

    /// Subtree on the minus side of the cut hyperplane.
    pub(crate) minus: BspTree<S, A>,

    /// Per-node payload.
    pub(crate) attribute: A,
}

impl<S: Space> BspNode<S> {
    /// Creates a partition node.
    pub fn new(cut: S::Sub, plus: BspTree<S>, minus: BspTree<S>) -> Self {
        Self::with_attribute(cut, plus, minus, ())
    }
}

impl<S: Space, A> BspNode<S, A> {
    /// Creates a node carrying an attribute.
    pub fn with_attribute(cut: S::Sub, plus: BspTree<S, A>, minus: BspTree<S, A>, attribute: A) -> Self {
        Self {
            cut,
            plus,
            minus,
            attribute,
        }
    }

    /// Returns the cut sub-hyperplane.
    #[inline]
    pub fn cut(&self) -> &S::Sub {
        &self.cut
    }

    /// Returns the hyperplane carrying the cut.
    #[inline]
    pub fn hyperplane(&self) -> &S::Hyperplane {
        self.cut.hyperplane()
    }

    /// Returns the plus subtree.
    #[inline]
    pub fn plus(&self) -> &BspTree<S, A> {
        &self.plus
    }

    /// Returns the minus subtree.
    #[inline]
    pub fn minus(&self) -> &BspTree<S, A> {
        &self.minus
    }

    /// Returns the subtree on the given branch.
    #[inline]
    pub fn child(&self, branch: Branch) -> &BspTree<S, A> {
        match branch {
            Branch::Plus => &self.plus,
            Branch::Minus => &self.minus,
        }
    }

    /// Returns a mutable reference to the subtree on the given branch.
    #[inline]
    pub(crate) fn child_mut(&mut self, branch: Branch) -> &mut BspTree<S, A> {
        match branch {
            Branch::Plus => &mut self.plus,
            Branch::Minus => &mut self.minus,
        }
    }

    /// Returns the node attribute.
    #[inline]
    pub fn attribute(&self) -> &A {
        &self.attribute
    }

    /// Splits the node into its cut and its two subtrees.
    pub fn into_parts(self) -> (S::Sub, BspTree<S, A>, BspTree<S, A>) {
        (self.cut, self.plus, self.minus)
    }
}

/// One of the two children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// The subtree on the plus side of the cut.
    Plus,
    /// The subtree on the minus side of the cut.
    Minus,
}

impl Branch {
    /// The other branch.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Branch::Plus => Branch::Minus,
            Branch::Minus => Branch::Plus,
        }
    }
}

/// A step on the way from the root down to a subtree: the hyperplane of
/// the ancestor node and the branch taken below it.
///
/// Trees do not link children back to their parents. Algorithms that need
/// the cell of a subtree carry the list of ancestors instead, ordered from
/// the root down.
#[derive(Debug, Clone)]
pub struct Ancestor<S: Space> {
    /// Hyperplane of the ancestor's cut.
    pub hyperplane: S::Hyperplane,
    /// Branch followed below the ancestor.
    pub branch: Branch,
}

impl<S: Space> Ancestor<S> {
    /// Creates an ancestor step.
    pub fn new(hyperplane: S::Hyperplane, branch: Branch) -> Self {
        Self { hyperplane, branch }
    }

    /// Keeps the part of `sub` lying on this step's side of the hyperplane.
    pub fn chop(&self, sub: &S::Sub) -> Option<S::Sub> {
        let split = sub.split(&self.hyperplane);
        match self.branch {
            Branch::Plus => split.plus,
            Branch::Minus => split.minus,
        }
    }
}

/// Restricts a sub-hyperplane to the cell described by an ancestor path.
///
/// Returns `None` when nothing of `sub` lies inside the cell.
pub fn fit_to_cell<S: Space>(sub: S::Sub, path: &[Ancestor<S>]) -> Option<S::Sub> {
    path.iter()
        .rev()
        .try_fold(sub, |fitted, ancestor| ancestor.chop(&fitted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Hyperplane;
    use crate::testing::{cut, Line1};

    #[test]
    fn opposite_branch() {
        assert_eq!(Branch::Plus.opposite(), Branch::Minus);
        assert_eq!(Branch::Minus.opposite(), Branch::Plus);
    }

    #[test]
    fn child_follows_branch() {
        let node: BspNode<Line1> =
            BspNode::new(cut(0.0, true).whole_hyperplane(), BspTree::Leaf(false), BspTree::Leaf(true));

        assert_eq!(node.child(Branch::Plus).leaf_value(), Some(false));
        assert_eq!(node.child(Branch::Minus).leaf_value(), Some(true));
        assert_eq!(node.hyperplane().location, 0.0);
    }

    #[test]
    fn fit_to_cell_keeps_points_inside_the_cell() {
        // cell: x > 1 (minus side of an indirect cut at 1) and x < 3
        let path = vec![
            Ancestor::<Line1>::new(cut(1.0, false), Branch::Minus),
            Ancestor::new(cut(3.0, true), Branch::Minus),
        ];

        assert!(fit_to_cell(cut(2.0, true).whole_hyperplane(), &path).is_some());
        assert!(fit_to_cell(cut(0.0, true).whole_hyperplane(), &path).is_none());
        assert!(fit_to_cell(cut(4.0, false).whole_hyperplane(), &path).is_none());
    }

    #[test]
    fn fit_to_empty_path_is_identity() {
        let fitted = fit_to_cell::<Line1>(cut(5.0, true).whole_hyperplane(), &[]);
        assert_eq!(fitted.map(|p| p.0.location), Some(5.0));
    }
}
