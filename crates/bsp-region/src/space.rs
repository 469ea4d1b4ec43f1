//! The geometric primitive contract the engine is generic over.
//!
//! A space is a marker type tying together a point type, a hyperplane type
//! and a sub-hyperplane type. The engine only ever talks to these traits, so
//! circles, lines, planes and 3-space all run through the same tree code.

use std::fmt::Debug;

use crate::bsp::BspTree;
use crate::error::RegionResult;
use crate::region::Region;

/// A topological space that regions can be built in.
pub trait Space: Debug + Clone + Copy + Default + 'static {
    /// Points of the space.
    type Point: Clone + Debug;

    /// Codimension-1 objects used to cut the space.
    type Hyperplane: Hyperplane<Space = Self>;

    /// Hyperplanes restricted to a part of themselves.
    type Sub: SubHyperplane<Space = Self>;

    /// Short name used in log output.
    const NAME: &'static str;

    /// The "not a number" point, returned as the barycenter of regions
    /// that have none (empty, unbounded or the whole periodic space).
    fn nan_point() -> Self::Point;

    /// The representative of `point` used for classification.
    ///
    /// Periodic spaces fold points lying within `tolerance` of the end of
    /// the period onto its start; the default keeps the point.
    fn canonical_point(point: &Self::Point, _tolerance: f64) -> Self::Point {
        point.clone()
    }

    /// Computes size and barycenter of a region.
    fn measure(region: &Region<Self>) -> Measure<Self>;

    /// Validates a tree that is about to be published as a region.
    ///
    /// Only periodic spaces have something to check; the default accepts
    /// every tree.
    fn check_consistency(_tree: &BspTree<Self>) -> RegionResult<()> {
        Ok(())
    }
}

/// A hyperplane: a point on a line or circle, a line in the plane, a plane
/// in 3-space.
///
/// The positive side of the hyperplane is the side its normal points to;
/// [`offset`](Hyperplane::offset) is positive there.
pub trait Hyperplane: Clone + Debug {
    /// The space this hyperplane cuts.
    type Space: Space<Hyperplane = Self>;

    /// Signed distance from the hyperplane to a point.
    fn offset(&self, point: &<Self::Space as Space>::Point) -> f64;

    /// Orthogonal projection of a point onto the hyperplane.
    fn project(&self, point: &<Self::Space as Space>::Point) -> <Self::Space as Space>::Point;

    /// Whether both hyperplanes have their plus side in the same direction.
    ///
    /// Only meaningful for hyperplanes that are parallel or identical.
    fn same_orientation_as(&self, other: &Self) -> bool;

    /// The same hyperplane with plus and minus sides exchanged.
    fn reversed(&self) -> Self;

    /// The hyperplane as a sub-hyperplane covering all of it.
    fn whole_hyperplane(&self) -> <Self::Space as Space>::Sub;

    /// The region covering the whole space.
    fn whole_space(&self) -> Region<Self::Space> {
        Region::full(self.tolerance())
    }

    /// Distance below which points are considered to lie on the hyperplane.
    fn tolerance(&self) -> f64;
}

/// A hyperplane restricted to the part of itself that matters.
pub trait SubHyperplane: Clone + Debug {
    /// The space the underlying hyperplane cuts.
    type Space: Space<Sub = Self>;

    /// The underlying hyperplane.
    fn hyperplane(&self) -> &<Self::Space as Space>::Hyperplane;

    /// Whether nothing of the hyperplane remains.
    fn is_empty(&self) -> bool;

    /// Measure of the remaining part (length, area; zero for points).
    fn size(&self) -> f64;

    /// Splits this sub-hyperplane by a hyperplane.
    ///
    /// Parts lying within tolerance of the splitter belong to neither side.
    fn split(&self, hyperplane: &<Self::Space as Space>::Hyperplane) -> Split<Self>;

    /// Position of this sub-hyperplane relative to a hyperplane.
    fn side(&self, hyperplane: &<Self::Space as Space>::Hyperplane) -> Side {
        self.split(hyperplane).side()
    }

    /// Union with another part of the same hyperplane.
    fn reunite(&self, other: &Self) -> Self;

    /// The same part, carried by the reversed hyperplane.
    fn reversed(&self) -> Self;
}

/// Result of splitting a sub-hyperplane.
#[derive(Debug, Clone)]
pub struct Split<T> {
    /// Part on the plus side, if any.
    pub plus: Option<T>,
    /// Part on the minus side, if any.
    pub minus: Option<T>,
}

impl<T> Split<T> {
    /// Builds a split from its two parts.
    pub fn new(plus: Option<T>, minus: Option<T>) -> Self {
        Self { plus, minus }
    }

    /// Everything lies on the plus side.
    pub fn plus(part: T) -> Self {
        Self::new(Some(part), None)
    }

    /// Everything lies on the minus side.
    pub fn minus(part: T) -> Self {
        Self::new(None, Some(part))
    }

    /// Everything lies on the splitter itself.
    pub fn hyper() -> Self {
        Self::new(None, None)
    }

    /// Classification of the split.
    pub fn side(&self) -> Side {
        match (&self.plus, &self.minus) {
            (Some(_), Some(_)) => Side::Both,
            (Some(_), None) => Side::Plus,
            (None, Some(_)) => Side::Minus,
            (None, None) => Side::Hyper,
        }
    }
}

/// Position of a sub-hyperplane or region relative to a hyperplane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Entirely on the plus side.
    Plus,
    /// Entirely on the minus side.
    Minus,
    /// Crosses the hyperplane.
    Both,
    /// Lies on the hyperplane (within tolerance).
    Hyper,
}

/// Position of a point relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Strictly inside.
    Inside,
    /// Strictly outside.
    Outside,
    /// On the boundary, within tolerance.
    Boundary,
}

/// Size and barycenter of a region.
#[derive(Debug, Clone)]
pub struct Measure<S: Space> {
    /// Length, area or volume; `+inf` for unbounded regions.
    pub size: f64,
    /// Center of mass; the space's NaN point when undefined.
    pub barycenter: S::Point,
}

impl<S: Space> Measure<S> {
    /// Measure of a region without a barycenter.
    pub fn without_barycenter(size: f64) -> Self {
        Self {
            size,
            barycenter: S::nan_point(),
        }
    }
}

/// A rigid map applied to every cut of a tree.
pub trait Transform<S: Space> {
    /// Image of a point.
    fn apply_point(&self, point: &S::Point) -> S::Point;

    /// Image of a hyperplane.
    fn apply_hyperplane(&self, hyperplane: &S::Hyperplane) -> S::Hyperplane;

    /// Image of a sub-hyperplane, remaining part included.
    fn apply_sub(&self, sub: &S::Sub) -> S::Sub;
}
