//! Boundary attributes: which parts of each cut separate inside from outside.
//!
//! A cut only belongs to the boundary where it has an inside cell on one
//! side and an outside cell on the other. Each part is found by pushing the
//! cut down the plus subtree, keeping the pieces that reach outside (resp.
//! inside) leaves, then pushing those pieces down the minus subtree.

use tracing::warn;

use crate::bsp::{BspNode, BspTree, Branch};
use crate::space::{Hyperplane, Space, SubHyperplane};

/// Boundary parts of a node's cut.
#[derive(Debug, Clone)]
pub struct BoundaryAttribute<S: Space> {
    plus_outside: Option<S::Sub>,
    plus_inside: Option<S::Sub>,
}

impl<S: Space> BoundaryAttribute<S> {
    /// Part of the cut with outside cells on its plus side and inside cells
    /// on its minus side.
    #[inline]
    pub fn plus_outside(&self) -> Option<&S::Sub> {
        self.plus_outside.as_ref()
    }

    /// Part of the cut with inside cells on its plus side and outside cells
    /// on its minus side.
    #[inline]
    pub fn plus_inside(&self) -> Option<&S::Sub> {
        self.plus_inside.as_ref()
    }

    /// Total size of both boundary parts.
    pub fn size(&self) -> f64 {
        self.plus_outside.as_ref().map_or(0.0, SubHyperplane::size)
            + self.plus_inside.as_ref().map_or(0.0, SubHyperplane::size)
    }
}

/// Tree whose nodes carry their boundary parts.
pub type BoundaryTree<S> = BspTree<S, BoundaryAttribute<S>>;

/// Builds the boundary tree of a partition tree.
pub fn boundary_tree<S: Space>(tree: &BspTree<S>) -> BoundaryTree<S> {
    match tree {
        BspTree::Leaf(inside) => BspTree::Leaf(*inside),
        BspTree::Node(node) => {
            let attribute = characterize_node(node);
            BspTree::node_with(
                node.cut().clone(),
                boundary_tree(node.plus()),
                boundary_tree(node.minus()),
                attribute,
            )
        }
    }
}

fn characterize_node<S: Space>(node: &BspNode<S>) -> BoundaryAttribute<S> {
    let plus_side = Characterization::new(node.plus(), node.cut().clone(), Branch::Plus);

    let plus_outside = plus_side.outside.and_then(|outside| {
        Characterization::new(node.minus(), outside, Branch::Minus).inside
    });
    let plus_inside = plus_side.inside.and_then(|inside| {
        Characterization::new(node.minus(), inside, Branch::Minus).outside
    });

    BoundaryAttribute {
        plus_outside,
        plus_inside,
    }
}

/// Parts of a sub-hyperplane touching inside and outside leaves of a subtree.
struct Characterization<S: Space> {
    outside: Option<S::Sub>,
    inside: Option<S::Sub>,
}

impl<S: Space> Characterization<S> {
    /// Characterizes `sub` against `tree`, approaching it from the `facing`
    /// side of `sub`.
    fn new(tree: &BspTree<S>, sub: S::Sub, facing: Branch) -> Self {
        let mut characterization = Self {
            outside: None,
            inside: None,
        };
        characterization.characterize(tree, sub, facing);
        characterization
    }

    fn characterize(&mut self, tree: &BspTree<S>, sub: S::Sub, facing: Branch) {
        let node = match tree {
            BspTree::Leaf(true) => return Self::add(&mut self.inside, sub),
            BspTree::Leaf(false) => return Self::add(&mut self.outside, sub),
            BspTree::Node(node) => node,
        };

        let split = sub.split(node.hyperplane());
        match (split.plus, split.minus) {
            (Some(plus), Some(minus)) => {
                self.characterize(node.plus(), plus, facing);
                self.characterize(node.minus(), minus, facing);
            }
            (Some(_), None) => self.characterize(node.plus(), sub, facing),
            (None, Some(_)) => self.characterize(node.minus(), sub, facing),
            (None, None) => {
                let same = node.hyperplane().same_orientation_as(sub.hyperplane());
                let branch = if same { facing } else { facing.opposite() };
                warn!(?branch, "sub-hyperplane lies on a descendant cut during boundary characterization");
                self.characterize(node.child(branch), sub, facing);
            }
        }
    }

    fn add(part: &mut Option<S::Sub>, sub: S::Sub) {
        *part = Some(match part.take() {
            Some(existing) => existing.reunite(&sub),
            None => sub,
        });
    }
}
