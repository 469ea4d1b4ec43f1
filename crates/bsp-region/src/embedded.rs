//! Sub-hyperplanes described by a region of the hyperplane's own sub-space.
//!
//! A line of the plane is a copy of the real line, a plane of 3-space a
//! copy of the plane. The part of such a hyperplane that remains after
//! chopping is a region of that lower-dimensional space, so splitting and
//! reuniting sub-hyperplanes reduces to the same tree algorithms one
//! dimension down.

use crate::bsp::BspTree;
use crate::factory::Operator;
use crate::region::Region;
use crate::space::{Hyperplane, Space, Split, SubHyperplane};

/// A hyperplane carrying a lower-dimensional space of its own.
pub trait Embedding: Hyperplane {
    /// The space the hyperplane is a copy of.
    type SubSpace: Space;

    /// Coordinates of a point (projected onto the hyperplane) in the sub-space.
    fn to_sub_space(&self, point: &<Self::Space as Space>::Point) -> <Self::SubSpace as Space>::Point;

    /// The point of the hyperplane with the given sub-space coordinates.
    fn to_space(&self, point: &<Self::SubSpace as Space>::Point) -> <Self::Space as Space>::Point;

    /// How `other` crosses this hyperplane, seen from inside the sub-space.
    fn trace(&self, other: &Self) -> Trace<Self::SubSpace>;

    /// Re-expresses a region of this hyperplane's sub-space in the sub-space
    /// of `target`, after mapping every point with `map`.
    fn transfer<F>(&self, target: &Self, region: &Region<Self::SubSpace>, map: F) -> Region<Self::SubSpace>
    where
        F: Fn(&<Self::Space as Space>::Point) -> <Self::Space as Space>::Point;
}

/// Intersection of a hyperplane with another one, in sub-space coordinates.
#[derive(Debug, Clone)]
pub enum Trace<T: Space> {
    /// The hyperplanes do not cross; the offset of this hyperplane relative
    /// to the other one.
    Parallel(f64),
    /// The hyperplanes cross along this sub-space hyperplane, whose plus
    /// side lies on the plus side of the other hyperplane.
    Crossing(T::Hyperplane),
    /// The part of this hyperplane on the minus side of the other one.
    ///
    /// Used where a single sub-space hyperplane cannot separate the two
    /// parts, as for great circles, which cross twice.
    Within(Region<T>),
}

/// A hyperplane restricted to a region of its sub-space.
#[derive(Debug, Clone)]
pub struct EmbeddedSub<H: Embedding> {
    hyperplane: H,
    remaining: Region<H::SubSpace>,
}

impl<H: Embedding> EmbeddedSub<H> {
    /// Restricts `hyperplane` to `remaining`.
    pub fn new(hyperplane: H, remaining: Region<H::SubSpace>) -> Self {
        Self { hyperplane, remaining }
    }

    /// The whole hyperplane.
    pub fn whole(hyperplane: H) -> Self {
        let remaining = Region::full(hyperplane.tolerance());
        Self::new(hyperplane, remaining)
    }

    /// The part of the hyperplane that remains, in sub-space coordinates.
    #[inline]
    pub fn remaining(&self) -> &Region<H::SubSpace> {
        &self.remaining
    }

    /// Maps the sub-hyperplane point by point onto `target`.
    pub fn mapped<F>(&self, target: H, map: F) -> Self
    where
        F: Fn(&<H::Space as Space>::Point) -> <H::Space as Space>::Point,
    {
        let remaining = self.hyperplane.transfer(&target, &self.remaining, map);
        Self::new(target, remaining)
    }

    fn restricted(&self, tree: BspTree<H::SubSpace>) -> Self {
        Self::new(
            self.hyperplane.clone(),
            Region::from_tree_unchecked(tree, self.remaining.tolerance()),
        )
    }
}

impl<H> SubHyperplane for EmbeddedSub<H>
where
    H: Embedding,
    H::Space: Space<Sub = EmbeddedSub<H>>,
{
    type Space = H::Space;

    fn hyperplane(&self) -> &H {
        &self.hyperplane
    }

    fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    fn size(&self) -> f64 {
        self.remaining.size()
    }

    fn split(&self, hyperplane: &H) -> Split<Self> {
        if self.is_empty() {
            return Split::hyper();
        }
        match self.hyperplane.trace(hyperplane) {
            Trace::Parallel(offset) => {
                let tolerance = self.hyperplane.tolerance();
                if offset < -tolerance {
                    Split::minus(self.clone())
                } else if offset > tolerance {
                    Split::plus(self.clone())
                } else {
                    Split::hyper()
                }
            }
            Trace::Crossing(trace) => {
                let whole = trace.whole_hyperplane();
                let (_, plus, minus) = self.remaining.tree().split(&whole).into_parts();
                let plus = if plus.is_empty() {
                    None
                } else {
                    Some(self.restricted(BspTree::node(whole.clone(), plus, BspTree::Leaf(false))))
                };
                let minus = if minus.is_empty() {
                    None
                } else {
                    Some(self.restricted(BspTree::node(whole, BspTree::Leaf(false), minus)))
                };
                Split::new(plus, minus)
            }
            Trace::Within(inside) => {
                let part = |operator: Operator| {
                    let tree = self.remaining.tree().clone().merge(inside.tree().clone(), &operator);
                    (!tree.is_empty()).then(|| self.restricted(tree))
                };
                Split::new(part(Operator::AndNot), part(Operator::And))
            }
        }
    }

    fn reunite(&self, other: &Self) -> Self {
        let tree = self
            .remaining
            .tree()
            .clone()
            .merge(other.remaining.tree().clone(), &Operator::Or);
        self.restricted(tree)
    }

    fn reversed(&self) -> Self {
        self.mapped(self.hyperplane.reversed(), |point| point.clone())
    }
}
