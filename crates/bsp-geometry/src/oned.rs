//! The real line: oriented points, intervals and sets of intervals.

use bsp_region::bsp::CollectingVisitor;
use bsp_region::{
    BspTree, Hyperplane, Measure, Region, RegionError, Space, Split, SubHyperplane, Transform,
};

use crate::error::{GeometryError, GeometryResult};

/// The one-dimensional Euclidean space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean1D;

/// A point of the line splitting it in two half-lines.
///
/// A direct point has its plus side towards increasing abscissas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedPoint {
    location: f64,
    direct: bool,
    tolerance: f64,
}

impl OrientedPoint {
    /// Creates an oriented point.
    pub fn new(location: f64, direct: bool, tolerance: f64) -> Self {
        Self {
            location,
            direct,
            tolerance,
        }
    }

    /// Returns the abscissa of the point.
    #[inline]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// Returns `true` if the plus side is towards increasing abscissas.
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.direct
    }
}

impl Hyperplane for OrientedPoint {
    type Space = Euclidean1D;

    fn offset(&self, point: &f64) -> f64 {
        let delta = point - self.location;
        if self.direct { delta } else { -delta }
    }

    fn project(&self, _point: &f64) -> f64 {
        self.location
    }

    fn same_orientation_as(&self, other: &Self) -> bool {
        self.direct == other.direct
    }

    fn reversed(&self) -> Self {
        Self::new(self.location, !self.direct, self.tolerance)
    }

    fn whole_hyperplane(&self) -> SubOrientedPoint {
        SubOrientedPoint { hyperplane: *self }
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// The sub-hyperplane of an oriented point: the point itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SubOrientedPoint {
    hyperplane: OrientedPoint,
}

impl SubHyperplane for SubOrientedPoint {
    type Space = Euclidean1D;

    fn hyperplane(&self) -> &OrientedPoint {
        &self.hyperplane
    }

    fn is_empty(&self) -> bool {
        false
    }

    fn size(&self) -> f64 {
        0.0
    }

    fn split(&self, hyperplane: &OrientedPoint) -> Split<Self> {
        let global = hyperplane.offset(&self.hyperplane.location);
        if global < -hyperplane.tolerance {
            Split::minus(self.clone())
        } else if global > hyperplane.tolerance {
            Split::plus(self.clone())
        } else {
            Split::hyper()
        }
    }

    fn reunite(&self, _other: &Self) -> Self {
        self.clone()
    }

    fn reversed(&self) -> Self {
        self.hyperplane.reversed().whole_hyperplane()
    }
}

/// A closed interval of the line; bounds may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    lower: f64,
    upper: f64,
}

impl Interval {
    /// Creates an interval, rejecting `lower > upper`.
    pub fn new(lower: f64, upper: f64) -> GeometryResult<Self> {
        if !(lower <= upper) {
            return Err(RegionError::EndpointsNotAnInterval { lower, upper }.into());
        }
        Ok(Self { lower, upper })
    }

    /// Interval between two abscissas given in any order.
    pub fn between(a: f64, b: f64) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    /// The region covering this interval.
    pub fn to_set(&self, tolerance: f64) -> IntervalsSet {
        Region::from_tree_unchecked(interval_tree(self, tolerance), tolerance)
    }

    /// Returns the lower bound.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Returns the upper bound.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns the length of the interval.
    #[inline]
    pub fn size(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns the middle of the interval.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }
}

/// A region of the line.
pub type IntervalsSet = Region<Euclidean1D>;

/// Constructors and queries specific to regions of the line.
pub trait Intervals: Sized {
    /// The interval `[lower, upper]`. Infinite bounds give half-lines or the
    /// whole line.
    fn interval(lower: f64, upper: f64, tolerance: f64) -> GeometryResult<Self>;

    /// Decomposition into disjoint intervals, sorted by increasing bounds.
    fn intervals(&self) -> Vec<Interval>;

    /// Lowest point of the region, `+inf` when empty.
    fn inf(&self) -> f64;

    /// Highest point of the region, `-inf` when empty.
    fn sup(&self) -> f64;
}

impl Intervals for IntervalsSet {
    fn interval(lower: f64, upper: f64, tolerance: f64) -> GeometryResult<Self> {
        Ok(Interval::new(lower, upper)?.to_set(tolerance))
    }

    fn intervals(&self) -> Vec<Interval> {
        let tolerance = self.tolerance();
        let mut intervals = Vec::new();
        let mut open = inside_above(self.tree(), f64::NEG_INFINITY, tolerance).then_some(f64::NEG_INFINITY);
        for limit in sorted_limits(self.tree(), tolerance) {
            match (open, inside_above(self.tree(), limit, tolerance)) {
                (Some(start), false) => {
                    intervals.push(Interval { lower: start, upper: limit });
                    open = None;
                }
                (None, true) => open = Some(limit),
                _ => {}
            }
        }
        if let Some(start) = open {
            intervals.push(Interval {
                lower: start,
                upper: f64::INFINITY,
            });
        }
        intervals
    }

    fn inf(&self) -> f64 {
        self.intervals().first().map_or(f64::INFINITY, Interval::lower)
    }

    fn sup(&self) -> f64 {
        self.intervals().last().map_or(f64::NEG_INFINITY, Interval::upper)
    }
}

/// Tree of a single interval.
fn interval_tree(bounds: &Interval, tolerance: f64) -> BspTree<Euclidean1D> {
    let lower_cut = || OrientedPoint::new(bounds.lower, false, tolerance).whole_hyperplane();
    let upper_cut = || OrientedPoint::new(bounds.upper, true, tolerance).whole_hyperplane();
    match (bounds.lower == f64::NEG_INFINITY, bounds.upper == f64::INFINITY) {
        (true, true) => BspTree::Leaf(true),
        (true, false) => BspTree::node(upper_cut(), BspTree::Leaf(false), BspTree::Leaf(true)),
        (false, true) => BspTree::node(lower_cut(), BspTree::Leaf(false), BspTree::Leaf(true)),
        (false, false) => BspTree::node(
            lower_cut(),
            BspTree::Leaf(false),
            BspTree::node(upper_cut(), BspTree::Leaf(false), BspTree::Leaf(true)),
        ),
    }
}

/// Locations of all cuts, sorted, with values closer than `tolerance`
/// collapsed.
pub(crate) fn sorted_limits<S>(tree: &BspTree<S>, tolerance: f64) -> Vec<f64>
where
    S: Space,
    S::Hyperplane: Limit,
{
    let mut visitor = CollectingVisitor::new();
    tree.visit(&mut visitor);
    let mut limits: Vec<f64> = visitor
        .into_cuts()
        .iter()
        .map(|cut| cut.hyperplane().limit())
        .collect();
    limits.sort_by(f64::total_cmp);
    limits.dedup_by(|next, kept| (*next - *kept).abs() <= tolerance);
    limits
}

/// Inside flag of the cell lying just above `limit`.
///
/// The flag is read from the leaves by comparing cut locations, never by
/// classifying a sample point, so it holds for any magnitude and any
/// tolerance. Cuts within `tolerance` of `limit` count as lying below the
/// cell; `-inf` gives the cell below every cut, `+inf` the one above.
pub(crate) fn inside_above<S>(tree: &BspTree<S>, limit: f64, tolerance: f64) -> bool
where
    S: Space,
    S::Hyperplane: Limit,
{
    let mut current = tree;
    loop {
        match current {
            BspTree::Leaf(inside) => return *inside,
            BspTree::Node(node) => {
                let cut = node.hyperplane();
                let above_cut = cut.limit() <= limit + tolerance;
                current = if above_cut == cut.increasing() { node.plus() } else { node.minus() };
            }
        }
    }
}

/// Hyperplanes of one-dimensional spaces, located by a single coordinate.
pub(crate) trait Limit {
    fn limit(&self) -> f64;

    /// Whether the plus side lies towards increasing coordinates.
    fn increasing(&self) -> bool;
}

impl Limit for OrientedPoint {
    fn limit(&self) -> f64 {
        self.location
    }

    fn increasing(&self) -> bool {
        self.direct
    }
}

impl Space for Euclidean1D {
    type Point = f64;
    type Hyperplane = OrientedPoint;
    type Sub = SubOrientedPoint;

    const NAME: &'static str = "euclidean-1d";

    fn nan_point() -> f64 {
        f64::NAN
    }

    fn measure(region: &Region<Self>) -> Measure<Self> {
        let intervals = region.intervals();
        if intervals.is_empty() {
            return Measure::without_barycenter(0.0);
        }
        let mut size = 0.0;
        let mut moment = 0.0;
        for interval in &intervals {
            if interval.lower.is_infinite() || interval.upper.is_infinite() {
                return Measure::without_barycenter(f64::INFINITY);
            }
            size += interval.size();
            moment += interval.size() * interval.midpoint();
        }
        if size > 0.0 {
            Measure {
                size,
                barycenter: moment / size,
            }
        } else {
            Measure::without_barycenter(size)
        }
    }
}

/// The affine map `x -> scale * x + shift`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMap1D {
    pub(crate) scale: f64,
    pub(crate) shift: f64,
}

impl LinearMap1D {
    /// Creates the map, rejecting a zero scale.
    pub fn new(scale: f64, shift: f64) -> GeometryResult<Self> {
        if scale == 0.0 || !scale.is_finite() {
            return Err(GeometryError::SingularTransform);
        }
        Ok(Self { scale, shift })
    }
}

impl Transform<Euclidean1D> for LinearMap1D {
    fn apply_point(&self, point: &f64) -> f64 {
        self.scale * point + self.shift
    }

    fn apply_hyperplane(&self, hyperplane: &OrientedPoint) -> OrientedPoint {
        OrientedPoint::new(
            self.apply_point(&hyperplane.location),
            hyperplane.direct == (self.scale > 0.0),
            hyperplane.tolerance,
        )
    }

    fn apply_sub(&self, sub: &SubOrientedPoint) -> SubOrientedPoint {
        self.apply_hyperplane(&sub.hyperplane).whole_hyperplane()
    }
}
