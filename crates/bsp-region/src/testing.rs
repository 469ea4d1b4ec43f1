//! A minimal one-dimensional space for exercising the engine in unit tests.

use crate::bsp::{BspTree, CollectingVisitor};
use crate::region::Region;
use crate::space::{Hyperplane, Location, Measure, Space, Split, SubHyperplane};

/// The real line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Line1;

/// A point of the line with an orientation: `direct` cuts have their plus
/// side towards increasing abscissas.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    pub location: f64,
    pub direct: bool,
    pub tolerance: f64,
}

/// The whole of a cut, with a weight used as its size.
#[derive(Debug, Clone, PartialEq)]
pub struct CutPoint(pub Cut, pub f64);

pub fn cut(location: f64, direct: bool) -> Cut {
    Cut {
        location,
        direct,
        tolerance: 1.0e-10,
    }
}

pub fn weighted(weight: f64) -> CutPoint {
    CutPoint(cut(0.0, true), weight)
}

/// Tree of the closed interval `[lower, upper]`.
pub fn interval_tree(lower: f64, upper: f64) -> BspTree<Line1> {
    BspTree::node(
        cut(lower, false).whole_hyperplane(),
        BspTree::Leaf(false),
        BspTree::node(cut(upper, true).whole_hyperplane(), BspTree::Leaf(false), BspTree::Leaf(true)),
    )
}

pub fn interval(lower: f64, upper: f64) -> Region<Line1> {
    Region::from_tree_unchecked(interval_tree(lower, upper), 1.0e-10)
}

impl Hyperplane for Cut {
    type Space = Line1;

    fn offset(&self, point: &f64) -> f64 {
        if self.direct { point - self.location } else { self.location - point }
    }

    fn project(&self, _point: &f64) -> f64 {
        self.location
    }

    fn same_orientation_as(&self, other: &Self) -> bool {
        self.direct == other.direct
    }

    fn reversed(&self) -> Self {
        Cut {
            direct: !self.direct,
            ..self.clone()
        }
    }

    fn whole_hyperplane(&self) -> CutPoint {
        CutPoint(self.clone(), 0.0)
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl SubHyperplane for CutPoint {
    type Space = Line1;

    fn hyperplane(&self) -> &Cut {
        &self.0
    }

    fn is_empty(&self) -> bool {
        false
    }

    fn size(&self) -> f64 {
        self.1
    }

    fn split(&self, hyperplane: &Cut) -> Split<Self> {
        let offset = hyperplane.offset(&self.0.location);
        if offset < -hyperplane.tolerance {
            Split::minus(self.clone())
        } else if offset > hyperplane.tolerance {
            Split::plus(self.clone())
        } else {
            Split::hyper()
        }
    }

    fn reunite(&self, _other: &Self) -> Self {
        self.clone()
    }

    fn reversed(&self) -> Self {
        CutPoint(self.0.reversed(), self.1)
    }
}

impl Space for Line1 {
    type Point = f64;
    type Hyperplane = Cut;
    type Sub = CutPoint;

    const NAME: &'static str = "test line";

    fn nan_point() -> f64 {
        f64::NAN
    }

    fn measure(region: &Region<Self>) -> Measure<Self> {
        let mut visitor = CollectingVisitor::new();
        region.tree().visit(&mut visitor);
        let mut limits: Vec<f64> = visitor.into_cuts().iter().map(|c| c.0.location).collect();
        limits.sort_by(f64::total_cmp);
        limits.dedup();

        let inside = |x: f64| region.tree().classify(&x, region.tolerance()) == Location::Inside;
        let (Some(first), Some(last)) = (limits.first(), limits.last()) else {
            let size = if region.tree().is_full() { f64::INFINITY } else { 0.0 };
            return Measure::without_barycenter(size);
        };
        if inside(first - 1.0) || inside(last + 1.0) {
            return Measure::without_barycenter(f64::INFINITY);
        }

        let mut size = 0.0;
        let mut moment = 0.0;
        for pair in limits.windows(2) {
            let middle = 0.5 * (pair[0] + pair[1]);
            if inside(middle) {
                size += pair[1] - pair[0];
                moment += (pair[1] - pair[0]) * middle;
            }
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
