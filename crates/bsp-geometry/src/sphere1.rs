//! The unit circle: angles, limit angles, arcs and sets of arcs.
//!
//! Angles are normalized to `[0, 2π)`. A tree over the circle is laid out
//! as a tree over `[0, 2π)`; its first and last leaves are the two sides of
//! the `0 ≡ 2π` seam and must agree, which [`Sphere1D`] checks whenever a
//! region is built from a tree.

use std::f64::consts::TAU;

use bsp_region::factory;
use bsp_region::{
    BspTree, Hyperplane, Location, Measure, Region, RegionError, RegionResult, Space, Split, SubHyperplane,
};
use tracing::debug;

use crate::error::GeometryResult;
use crate::oned::{inside_above, sorted_limits, Limit};

/// The one-dimensional unit sphere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sphere1D;

/// A point of the circle, stored as a normalized angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct S1Point {
    alpha: f64,
}

impl S1Point {
    /// Creates a point, normalizing `alpha` to `[0, 2π)`.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: normalize(alpha),
        }
    }

    /// The undefined point.
    pub fn nan() -> Self {
        Self { alpha: f64::NAN }
    }

    /// Returns the angle in `[0, 2π)`.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns `true` if the angle is undefined.
    #[inline]
    pub fn is_nan(&self) -> bool {
        self.alpha.is_nan()
    }

    /// Angular distance along the shorter way round.
    pub fn distance(&self, other: &Self) -> f64 {
        let delta = (self.alpha - other.alpha).abs();
        delta.min(TAU - delta)
    }
}

fn normalize(alpha: f64) -> f64 {
    let normalized = alpha.rem_euclid(TAU);
    // rem_euclid rounds tiny negative angles up to 2π
    if normalized >= TAU { 0.0 } else { normalized }
}

/// An angle splitting the circle, seen as the line `[0, 2π)`.
///
/// A direct limit has its plus side towards increasing angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitAngle {
    location: S1Point,
    direct: bool,
    tolerance: f64,
}

impl LimitAngle {
    /// Creates a limit angle.
    pub fn new(location: S1Point, direct: bool, tolerance: f64) -> Self {
        Self {
            location,
            direct,
            tolerance,
        }
    }

    /// Returns the location of the limit.
    #[inline]
    pub fn location(&self) -> S1Point {
        self.location
    }

    /// Returns `true` if the plus side is towards increasing angles.
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.direct
    }
}

impl Hyperplane for LimitAngle {
    type Space = Sphere1D;

    fn offset(&self, point: &S1Point) -> f64 {
        let mut delta = point.alpha - self.location.alpha;
        // 0 and 2π are the same angle: a point across the seam from the
        // limit but within tolerance of it lies on the limit
        if (delta.abs() - TAU).abs() <= self.tolerance {
            delta -= TAU.copysign(delta);
        }
        if self.direct { delta } else { -delta }
    }

    fn project(&self, _point: &S1Point) -> S1Point {
        self.location
    }

    fn same_orientation_as(&self, other: &Self) -> bool {
        self.direct == other.direct
    }

    fn reversed(&self) -> Self {
        Self::new(self.location, !self.direct, self.tolerance)
    }

    fn whole_hyperplane(&self) -> SubLimitAngle {
        SubLimitAngle { hyperplane: *self }
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Limit for LimitAngle {
    fn limit(&self) -> f64 {
        self.location.alpha
    }

    fn increasing(&self) -> bool {
        self.direct
    }
}

/// The sub-hyperplane of a limit angle: the point itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SubLimitAngle {
    hyperplane: LimitAngle,
}

impl SubHyperplane for SubLimitAngle {
    type Space = Sphere1D;

    fn hyperplane(&self) -> &LimitAngle {
        &self.hyperplane
    }

    fn is_empty(&self) -> bool {
        false
    }

    fn size(&self) -> f64 {
        0.0
    }

    fn split(&self, hyperplane: &LimitAngle) -> Split<Self> {
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

/// A counter-clockwise arc from `lower` to `upper`.
///
/// `lower` lies in `[0, 2π)` and `upper` in `[lower, lower + 2π]`, so an arc
/// crossing the seam has `upper > 2π`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    lower: f64,
    upper: f64,
}

impl Arc {
    /// Creates an arc. Equal bounds or a span of at least `2π` give the full
    /// circle; `lower > upper` is rejected.
    pub fn new(lower: f64, upper: f64) -> GeometryResult<Self> {
        if lower == upper || upper - lower >= TAU {
            return Ok(Self { lower: 0.0, upper: TAU });
        }
        if !(lower < upper) {
            return Err(RegionError::EndpointsNotAnInterval { lower, upper }.into());
        }
        let normalized = normalize(lower);
        Ok(Self {
            lower: normalized,
            upper: normalized + (upper - lower),
        })
    }

    /// Returns the lower bound, in `[0, 2π)`.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Returns the upper bound, in `[lower, lower + 2π]`.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns the angular length of the arc.
    #[inline]
    pub fn size(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns `true` if the arc covers the whole circle.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() >= TAU
    }

    /// Returns the middle of the arc.
    pub fn barycenter(&self) -> S1Point {
        S1Point::new(0.5 * (self.lower + self.upper))
    }

    /// Position of a point relative to the arc.
    pub fn check_point(&self, point: &S1Point, tolerance: f64) -> Location {
        if self.is_full() {
            return Location::Inside;
        }
        // unwrap the angle into [lower - tolerance, lower - tolerance + 2π)
        let start = self.lower - tolerance;
        let alpha = start + (point.alpha - start).rem_euclid(TAU);
        if alpha < self.lower - tolerance || alpha > self.upper + tolerance {
            Location::Outside
        } else if alpha > self.lower + tolerance && alpha < self.upper - tolerance {
            Location::Inside
        } else if self.size() >= TAU - tolerance {
            // both bounds meet on the seam
            Location::Inside
        } else {
            Location::Boundary
        }
    }
}

/// A region of the circle.
pub type ArcsSet = Region<Sphere1D>;

/// The two parts of an arcs set split by an arc.
#[derive(Debug, Clone)]
pub struct ArcSplit {
    /// Part inside the splitting arc, `None` when empty.
    pub inside: Option<ArcsSet>,
    /// Part outside the splitting arc, `None` when empty.
    pub outside: Option<ArcsSet>,
}

/// Constructors and queries specific to regions of the circle.
pub trait Arcs: Sized {
    /// The arc from `lower` to `upper`.
    fn arc(lower: f64, upper: f64, tolerance: f64) -> GeometryResult<Self>;

    /// Union of several arcs.
    fn from_arcs(arcs: &[Arc], tolerance: f64) -> GeometryResult<Self>;

    /// Decomposition into disjoint arcs, sorted by lower bound. An arc
    /// crossing the seam comes last, with an upper bound above `2π`.
    fn arcs(&self) -> Vec<Arc>;

    /// Splits the set by an arc.
    fn split_by_arc(&self, arc: &Arc) -> GeometryResult<ArcSplit>;

    /// The set rotated counter-clockwise by `angle`.
    fn rotated(&self, angle: f64) -> GeometryResult<Self>;
}

impl Arcs for ArcsSet {
    fn arc(lower: f64, upper: f64, tolerance: f64) -> GeometryResult<Self> {
        let arc = Arc::new(lower, upper)?;
        Ok(Region::from_tree(arc_tree(&arc, tolerance), tolerance)?)
    }

    fn from_arcs(arcs: &[Arc], tolerance: f64) -> GeometryResult<Self> {
        let regions = arcs
            .iter()
            .map(|arc| Region::from_tree(arc_tree(arc, tolerance), tolerance))
            .collect::<RegionResult<Vec<_>>>()?;
        if regions.is_empty() {
            return Ok(Region::empty(tolerance));
        }
        Ok(factory::union_all(&regions)?)
    }

    fn arcs(&self) -> Vec<Arc> {
        let tolerance = self.tolerance();
        let mut limits = sorted_limits(self.tree(), tolerance);
        // a limit just below 2π is the same angle as one at 0
        if let (Some(&first), Some(&last)) = (limits.first(), limits.last()) {
            if limits.len() > 1 && last >= first + TAU - tolerance {
                limits.pop();
            }
        }
        let count = limits.len();
        if count == 0 {
            return if self.is_full() {
                vec![Arc { lower: 0.0, upper: TAU }]
            } else {
                Vec::new()
            };
        }

        // gap i runs from limit i to limit i + 1, the last one across the seam
        let gaps: Vec<(f64, f64, bool)> = (0..count)
            .map(|i| {
                let lower = limits[i];
                let upper = if i + 1 < count { limits[i + 1] } else { limits[0] + TAU };
                (lower, upper, inside_above(self.tree(), lower, tolerance))
            })
            .collect();

        let Some(start) = (0..count).find(|&i| !gaps[(i + count - 1) % count].2 && gaps[i].2) else {
            return if gaps.iter().all(|gap| gap.2) {
                vec![Arc { lower: 0.0, upper: TAU }]
            } else {
                Vec::new()
            };
        };

        let mut arcs = Vec::new();
        let mut open: Option<(f64, f64)> = None;
        for step in 0..count {
            let i = (start + step) % count;
            let (lower, upper, inside) = gaps[i];
            let shift = if i < start { TAU } else { 0.0 };
            let (lower, upper) = (lower + shift, upper + shift);
            match (inside, open) {
                (true, Some((first, _))) => open = Some((first, upper)),
                (true, None) => open = Some((lower, upper)),
                (false, Some((first, last))) => {
                    arcs.push(Arc::span(first, last));
                    open = None;
                }
                (false, None) => {}
            }
        }
        if let Some((first, last)) = open {
            arcs.push(Arc::span(first, last));
        }
        arcs.sort_by(|a, b| a.lower.total_cmp(&b.lower));
        arcs
    }

    fn split_by_arc(&self, arc: &Arc) -> GeometryResult<ArcSplit> {
        let tolerance = self.tolerance();
        let splitter = Region::from_tree(arc_tree(arc, tolerance), tolerance)?;
        let keep = |part: ArcsSet| (part.size() > tolerance).then_some(part);
        let inside = keep(factory::intersection(self, &splitter)?);
        let outside = keep(factory::difference(self, &splitter)?);
        debug!(
            inside = inside.is_some(),
            outside = outside.is_some(),
            "split arcs set by arc"
        );
        Ok(ArcSplit { inside, outside })
    }

    fn rotated(&self, angle: f64) -> GeometryResult<Self> {
        let arcs = self
            .arcs()
            .into_iter()
            .map(|arc| Arc::new(arc.lower + angle, arc.upper + angle))
            .collect::<GeometryResult<Vec<_>>>()?;
        if arcs.is_empty() {
            return Ok(Region::empty(self.tolerance()));
        }
        Self::from_arcs(&arcs, self.tolerance())
    }
}

impl Arc {
    /// Arc between two unwrapped angles, `first` normalized.
    pub(crate) fn span(first: f64, last: f64) -> Self {
        let lower = normalize(first);
        Self {
            lower,
            upper: lower + (last - first),
        }
    }
}

/// Tree of a single arc.
pub(crate) fn arc_tree(arc: &Arc, tolerance: f64) -> BspTree<Sphere1D> {
    if arc.is_full() {
        return BspTree::Leaf(true);
    }
    let lower_cut = LimitAngle::new(S1Point::new(arc.lower), false, tolerance).whole_hyperplane();
    if arc.upper < TAU {
        let upper_cut = LimitAngle::new(S1Point::new(arc.upper), true, tolerance).whole_hyperplane();
        BspTree::node(
            lower_cut,
            BspTree::Leaf(false),
            BspTree::node(upper_cut, BspTree::Leaf(false), BspTree::Leaf(true)),
        )
    } else {
        let upper_cut = LimitAngle::new(S1Point::new(arc.upper - TAU), true, tolerance).whole_hyperplane();
        BspTree::node(
            lower_cut,
            BspTree::node(upper_cut, BspTree::Leaf(false), BspTree::Leaf(true)),
            BspTree::Leaf(true),
        )
    }
}

impl Space for Sphere1D {
    type Point = S1Point;
    type Hyperplane = LimitAngle;
    type Sub = SubLimitAngle;

    const NAME: &'static str = "sphere-1d";

    fn nan_point() -> S1Point {
        S1Point::nan()
    }

    fn canonical_point(point: &S1Point, tolerance: f64) -> S1Point {
        if point.alpha > TAU - tolerance {
            S1Point { alpha: 0.0 }
        } else {
            *point
        }
    }

    fn measure(region: &Region<Self>) -> Measure<Self> {
        if let Some(inside) = region.tree().leaf_value() {
            return Measure::without_barycenter(if inside { TAU } else { 0.0 });
        }
        let arcs = region.arcs();
        let mut size = 0.0;
        let mut sum = 0.0;
        for arc in &arcs {
            size += arc.size();
            sum += arc.size() * (arc.lower + arc.upper);
        }
        let barycenter = if size >= TAU {
            S1Point::nan()
        } else if size >= f64::MIN_POSITIVE {
            S1Point::new(sum / (2.0 * size))
        } else {
            region
                .tree()
                .cut()
                .map_or_else(S1Point::nan, |cut| cut.hyperplane().location)
        };
        Measure { size, barycenter }
    }

    fn check_consistency(tree: &BspTree<Self>) -> RegionResult<()> {
        if inside_above(tree, f64::NEG_INFINITY, 0.0) != inside_above(tree, f64::INFINITY, 0.0) {
            return Err(RegionError::InconsistentStateAt2PiWrapping);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const TOL: f64 = 1.0e-10;

    #[test]
    fn points_are_normalized() {
        assert_relative_eq!(S1Point::new(-PI / 2.0).alpha(), 1.5 * PI);
        assert_relative_eq!(S1Point::new(5.0 * PI).alpha(), PI, epsilon = 1e-12);
        assert_eq!(S1Point::new(-1.0e-17).alpha(), 0.0);
        assert!(S1Point::nan().is_nan());
        assert_relative_eq!(S1Point::new(0.1).distance(&S1Point::new(TAU - 0.1)), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn arc_construction() {
        let wrapping = Arc::new(-1.0, 1.0).unwrap();
        assert_relative_eq!(wrapping.lower(), TAU - 1.0);
        assert_relative_eq!(wrapping.upper(), TAU + 1.0);

        assert!(Arc::new(1.0, 1.0).unwrap().is_full());
        assert!(Arc::new(0.0, 7.0).unwrap().is_full());
        assert_eq!(
            Arc::new(2.0, 1.0).err(),
            Some(RegionError::EndpointsNotAnInterval { lower: 2.0, upper: 1.0 }.into())
        );
    }

    #[test]
    fn points_within_tolerance_of_the_seam() {
        let first = ArcsSet::arc(0.0, 1.0, TOL).unwrap();
        let last = ArcsSet::arc(1.0, TAU, TOL).unwrap();
        for alpha in [-1.0e-12, 0.0, 1.0e-12] {
            let point = S1Point::new(alpha);
            assert_eq!(first.check_point(&point), Location::Boundary, "at {alpha}");
            assert_eq!(last.check_point(&point), Location::Boundary, "at {alpha}");
            assert_eq!(Arc::new(0.0, 1.0).unwrap().check_point(&point, TOL), Location::Boundary);
        }

        let across = ArcsSet::arc(-1.0, 1.0, TOL).unwrap();
        assert_eq!(across.check_point(&S1Point::new(-1.0e-12)), Location::Inside);

        // limits on both sides of the seam are the same angle
        let limit = LimitAngle::new(S1Point::new(-1.0e-12), true, TOL);
        assert!(limit.offset(&S1Point::new(1.0e-12)).abs() <= TOL);
        assert_eq!(
            limit.whole_hyperplane().side(&LimitAngle::new(S1Point::new(0.0), false, TOL)),
            bsp_region::Side::Hyper
        );
    }

    #[test]
    fn gap_just_wider_than_tolerance() {
        let tolerance = 0.1;
        let pieces = factory::union(
            &ArcsSet::arc(1.0, 2.0, tolerance).unwrap(),
            &ArcsSet::arc(2.15, 3.0, tolerance).unwrap(),
        )
        .unwrap();

        let arcs = pieces.arcs();
        assert_eq!(arcs.len(), 2);
        assert_relative_eq!(arcs[0].upper(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(arcs[1].lower(), 2.15, epsilon = 1e-12);
        assert_relative_eq!(pieces.size(), 1.85, epsilon = 1e-12);
    }

    #[test]
    fn arc_check_point() {
        let arc = Arc::new(TAU - 1.0, TAU + 1.0).unwrap();
        assert_eq!(arc.check_point(&S1Point::new(0.0), TOL), Location::Inside);
        assert_eq!(arc.check_point(&S1Point::new(1.0), TOL), Location::Boundary);
        assert_eq!(arc.check_point(&S1Point::new(3.0), TOL), Location::Outside);
    }

    #[test]
    fn simple_arc() {
        let set = ArcsSet::arc(2.3, 5.7, TOL).unwrap();

        assert_relative_eq!(set.size(), 3.4, epsilon = 1e-10);
        assert_relative_eq!(set.barycenter().alpha(), 4.0, epsilon = 1e-10);
        assert_eq!(set.check_point(&S1Point::new(2.3)), Location::Boundary);
        assert_eq!(set.check_point(&S1Point::new(5.7)), Location::Boundary);
        assert_eq!(set.check_point(&S1Point::new(1.2)), Location::Outside);
        assert_eq!(set.check_point(&S1Point::new(8.5)), Location::Outside);
        assert_eq!(set.check_point(&S1Point::new(8.7)), Location::Inside);
        assert_eq!(set.check_point(&S1Point::new(3.0)), Location::Inside);

        let arcs = set.arcs();
        assert_eq!(arcs.len(), 1);
        assert_relative_eq!(arcs[0].lower(), 2.3, epsilon = 1e-10);
        assert_relative_eq!(arcs[0].upper(), 5.7, epsilon = 1e-10);
    }

    #[test]
    fn arc_crossing_the_seam() {
        let set = ArcsSet::arc(5.7 - TAU, 2.3, TOL).unwrap();

        assert_relative_eq!(set.size(), TAU - 3.4, epsilon = 1e-10);
        assert_relative_eq!(set.barycenter().alpha(), 4.0 + PI - TAU, epsilon = 1e-10);
        assert_eq!(set.check_point(&S1Point::new(0.0)), Location::Inside);
        assert_eq!(set.check_point(&S1Point::new(4.0)), Location::Outside);

        let arcs = set.arcs();
        assert_eq!(arcs.len(), 1);
        assert_relative_eq!(arcs[0].lower(), 5.7, epsilon = 1e-10);
        assert_relative_eq!(arcs[0].upper(), 2.3 + TAU, epsilon = 1e-10);
    }

    #[test]
    fn arc_ending_on_the_seam() {
        let set = ArcsSet::arc(1.0, TAU, TOL).unwrap();

        assert_relative_eq!(set.size(), TAU - 1.0, epsilon = 1e-10);
        assert_eq!(set.check_point(&S1Point::new(3.0)), Location::Inside);
        assert_eq!(set.check_point(&S1Point::new(0.5)), Location::Outside);
    }

    #[test]
    fn full_and_empty_circle() {
        let full = ArcsSet::arc(1.0, 1.0, TOL).unwrap();
        assert_relative_eq!(full.size(), TAU);
        assert!(full.barycenter().is_nan());
        assert_eq!(full.arcs().len(), 1);

        let empty = ArcsSet::empty(TOL);
        assert_eq!(empty.size(), 0.0);
        assert!(empty.arcs().is_empty());
    }

    #[test]
    fn inconsistent_seam_is_rejected() {
        // inside below the cut, outside above it: the two sides of 0 disagree
        let cut = LimitAngle::new(S1Point::new(1.0), true, TOL).whole_hyperplane();
        let tree = BspTree::node(cut, BspTree::Leaf(false), BspTree::Leaf(true));

        assert_eq!(
            ArcsSet::from_tree(tree, TOL).err(),
            Some(RegionError::InconsistentStateAt2PiWrapping)
        );
    }

    #[test]
    fn difference_leaves_two_arcs() {
        let outer = ArcsSet::arc(1.0, 6.0, TOL).unwrap();
        let inner = ArcsSet::arc(3.0, 5.0, TOL).unwrap();
        let set = factory::difference(&outer, &inner).unwrap();

        let arcs = set.arcs();
        assert_eq!(arcs.len(), 2);
        assert_relative_eq!(arcs[0].lower(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(arcs[0].upper(), 3.0, epsilon = 1e-10);
        assert_relative_eq!(arcs[1].lower(), 5.0, epsilon = 1e-10);
        assert_relative_eq!(arcs[1].upper(), 6.0, epsilon = 1e-10);
        assert_relative_eq!(set.size(), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn union_across_the_seam_merges_arcs() {
        let a = ArcsSet::arc(5.0, TAU, TOL).unwrap();
        let b = ArcsSet::arc(0.0, 1.0, TOL).unwrap();
        let set = factory::union(&a, &b).unwrap();

        let arcs = set.arcs();
        assert_eq!(arcs.len(), 1);
        assert_relative_eq!(arcs[0].lower(), 5.0, epsilon = 1e-10);
        assert_relative_eq!(arcs[0].upper(), TAU + 1.0, epsilon = 1e-10);
    }

    #[test]
    fn split_by_arc() {
        let set = ArcsSet::arc(1.0, 4.0, TOL).unwrap();
        let split = set.split_by_arc(&Arc::new(3.0, 5.0).unwrap()).unwrap();

        let inside = split.inside.unwrap();
        let outside = split.outside.unwrap();
        assert_relative_eq!(inside.size(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(outside.size(), 2.0, epsilon = 1e-10);

        let disjoint = set.split_by_arc(&Arc::new(5.0, 6.0).unwrap()).unwrap();
        assert!(disjoint.inside.is_none());
        assert!(disjoint.outside.is_some());
    }

    #[test]
    fn rotation_across_the_seam() {
        let set = ArcsSet::arc(5.0, 6.0, TOL).unwrap();
        let rotated = set.rotated(1.0).unwrap();

        assert_relative_eq!(rotated.size(), 1.0, epsilon = 1e-10);
        assert_eq!(rotated.check_point(&S1Point::new(0.5)), Location::Inside);
        assert_eq!(rotated.check_point(&S1Point::new(5.5)), Location::Outside);
    }
}
