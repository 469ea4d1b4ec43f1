//! The plane seen as a space of lines: oriented lines, sub-lines and
//! segments.

use std::f64::consts::TAU;

use bsp_region::{EmbeddedSub, Embedding, Hyperplane, Measure, Region, Space, SubHyperplane, Trace};
use nalgebra::{Point2, Vector2};
use tracing::warn;

use crate::error::{GeometryError, GeometryResult};
use crate::facets::FacetAccumulator;
use crate::oned::{Euclidean1D, Interval, Intervals, LinearMap1D, OrientedPoint};

/// Below this, two hyperplanes are treated as parallel.
pub(crate) const PARALLEL_EPSILON: f64 = 1.0e-10;

/// The two-dimensional Euclidean space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean2D;

/// An oriented line of the plane.
///
/// The line runs along `(cos, sin)`; its plus side is on the right of that
/// direction, so a counter-clockwise boundary has the inside on its minus
/// side. The offset of a point is `sin * x - cos * y + origin_offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    cos: f64,
    sin: f64,
    origin_offset: f64,
    tolerance: f64,
}

impl Line {
    /// The line through two points, oriented from `p1` to `p2`.
    pub fn through(p1: &Point2<f64>, p2: &Point2<f64>, tolerance: f64) -> GeometryResult<Self> {
        let delta = p2 - p1;
        let distance = delta.norm();
        if distance <= tolerance {
            return Err(GeometryError::CoincidentPoints { distance });
        }
        Ok(Self {
            cos: delta.x / distance,
            sin: delta.y / distance,
            origin_offset: (p2.x * p1.y - p1.x * p2.y) / distance,
            tolerance,
        })
    }

    /// The line through `point` with direction angle `angle`.
    pub fn from_point_and_angle(point: &Point2<f64>, angle: f64, tolerance: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            cos,
            sin,
            origin_offset: cos * point.y - sin * point.x,
            tolerance,
        }
    }

    /// The line `a x + b y + c = 0`, with its plus side where the left-hand
    /// side is positive.
    pub fn from_coefficients(a: f64, b: f64, c: f64, tolerance: f64) -> GeometryResult<Self> {
        if a.hypot(b) <= f64::MIN_POSITIVE {
            return Err(GeometryError::ZeroNormal);
        }
        Ok(Self::with_coefficients(a, b, c, tolerance))
    }

    pub(crate) fn with_coefficients(a: f64, b: f64, c: f64, tolerance: f64) -> Self {
        let norm = a.hypot(b);
        Self {
            cos: -b / norm,
            sin: a / norm,
            origin_offset: c / norm,
            tolerance,
        }
    }

    /// Returns the direction angle, in `[0, 2π)`.
    pub fn angle(&self) -> f64 {
        self.sin.atan2(self.cos).rem_euclid(TAU)
    }

    /// Returns the unit direction vector.
    #[inline]
    pub fn direction(&self) -> Vector2<f64> {
        Vector2::new(self.cos, self.sin)
    }

    /// Returns the unit normal, pointing to the plus side.
    #[inline]
    pub fn normal(&self) -> Vector2<f64> {
        Vector2::new(self.sin, -self.cos)
    }

    /// Returns the offset of the origin.
    #[inline]
    pub fn origin_offset(&self) -> f64 {
        self.origin_offset
    }

    /// Distance from a point to the line.
    pub fn distance(&self, point: &Point2<f64>) -> f64 {
        self.offset(point).abs()
    }

    /// Returns `true` if the point lies on the line within tolerance.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        self.distance(point) <= self.tolerance
    }

    /// Intersection point with another line, `None` when parallel.
    pub fn intersection(&self, other: &Line) -> Option<Point2<f64>> {
        let d = self.sin * other.cos - other.sin * self.cos;
        if d.abs() < PARALLEL_EPSILON {
            return None;
        }
        Some(Point2::new(
            (self.cos * other.origin_offset - other.cos * self.origin_offset) / d,
            (self.sin * other.origin_offset - other.sin * self.origin_offset) / d,
        ))
    }
}

impl Hyperplane for Line {
    type Space = Euclidean2D;

    fn offset(&self, point: &Point2<f64>) -> f64 {
        self.sin * point.x - self.cos * point.y + self.origin_offset
    }

    fn project(&self, point: &Point2<f64>) -> Point2<f64> {
        self.to_space(&self.to_sub_space(point))
    }

    fn same_orientation_as(&self, other: &Self) -> bool {
        self.sin * other.sin + self.cos * other.cos >= 0.0
    }

    fn reversed(&self) -> Self {
        Self {
            cos: -self.cos,
            sin: -self.sin,
            origin_offset: -self.origin_offset,
            tolerance: self.tolerance,
        }
    }

    fn whole_hyperplane(&self) -> SubLine {
        EmbeddedSub::whole(*self)
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Embedding for Line {
    type SubSpace = Euclidean1D;

    fn to_sub_space(&self, point: &Point2<f64>) -> f64 {
        self.cos * point.x + self.sin * point.y
    }

    fn to_space(&self, abscissa: &f64) -> Point2<f64> {
        Point2::new(
            abscissa * self.cos - self.origin_offset * self.sin,
            abscissa * self.sin + self.origin_offset * self.cos,
        )
    }

    fn trace(&self, other: &Self) -> Trace<Euclidean1D> {
        // offset of the point at abscissa t relative to other: k * t + rest
        let k = other.sin * self.cos - other.cos * self.sin;
        let rest = other.origin_offset - self.origin_offset * (other.sin * self.sin + other.cos * self.cos);
        if k.abs() < PARALLEL_EPSILON {
            Trace::Parallel(rest)
        } else {
            Trace::Crossing(OrientedPoint::new(-rest / k, k > 0.0, self.tolerance))
        }
    }

    fn transfer<F>(&self, target: &Self, region: &Region<Euclidean1D>, map: F) -> Region<Euclidean1D>
    where
        F: Fn(&Point2<f64>) -> Point2<f64>,
    {
        let shift = target.to_sub_space(&map(&self.to_space(&0.0)));
        let scale = target.to_sub_space(&map(&self.to_space(&1.0))) - shift;
        match LinearMap1D::new(scale, shift) {
            Ok(linear) => region.transform(&linear),
            Err(error) => {
                warn!(%error, scale, "degenerate map between lines, keeping sub-line coordinates");
                region.clone()
            }
        }
    }
}

/// A part of a line, described by a set of intervals of its abscissas.
pub type SubLine = EmbeddedSub<Line>;

/// The bounded pieces of a sub-line, in increasing abscissa order.
pub fn segments(sub: &SubLine) -> Vec<Segment> {
    let line = *sub.hyperplane();
    sub.remaining()
        .intervals()
        .iter()
        .filter(|interval| interval.size().is_finite())
        .map(|interval| Segment {
            start: line.to_space(&interval.lower()),
            end: line.to_space(&interval.upper()),
            line,
        })
        .collect()
}

/// A segment between two points, carried by the line joining them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point2<f64>,
    end: Point2<f64>,
    line: Line,
}

impl Segment {
    /// Creates a segment, rejecting endpoints closer than `tolerance`.
    pub fn new(start: Point2<f64>, end: Point2<f64>, tolerance: f64) -> GeometryResult<Self> {
        let line = Line::through(&start, &end, tolerance)?;
        Ok(Self { start, end, line })
    }

    /// Returns the start point.
    #[inline]
    pub fn start(&self) -> Point2<f64> {
        self.start
    }

    /// Returns the end point.
    #[inline]
    pub fn end(&self) -> Point2<f64> {
        self.end
    }

    /// Returns the supporting line, oriented from start to end.
    #[inline]
    pub fn line(&self) -> &Line {
        &self.line
    }

    /// Returns the length of the segment.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// The segment as a sub-hyperplane of the plane.
    pub fn to_sub_line(&self) -> SubLine {
        let interval = Interval::between(self.line.to_sub_space(&self.start), self.line.to_sub_space(&self.end));
        EmbeddedSub::new(self.line, interval.to_set(self.line.tolerance))
    }
}

impl Space for Euclidean2D {
    type Point = Point2<f64>;
    type Hyperplane = Line;
    type Sub = SubLine;

    const NAME: &'static str = "euclidean-2d";

    fn nan_point() -> Point2<f64> {
        Point2::new(f64::NAN, f64::NAN)
    }

    fn measure(region: &Region<Self>) -> Measure<Self> {
        let boundary = region.boundary();
        if boundary.is_empty() {
            let size = if region.is_empty() { 0.0 } else { f64::INFINITY };
            return Measure::without_barycenter(size);
        }
        let mut accumulator = FacetAccumulator::<2>::new();
        for facet in &boundary {
            let line = facet.hyperplane();
            for interval in facet.remaining().intervals() {
                let centroid = if interval.size().is_finite() {
                    line.to_space(&interval.midpoint())
                } else {
                    Point2::origin()
                };
                accumulator.add(interval.size(), &centroid, &line.normal());
            }
        }
        match accumulator.finish() {
            Some((size, barycenter)) => Measure { size, barycenter },
            None => Measure::without_barycenter(f64::INFINITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bsp_region::{Location, Side};
    use std::f64::consts::PI;

    const TOL: f64 = 1.0e-10;

    #[test]
    fn line_through_points() {
        let line = Line::through(&Point2::new(0.0, 1.0), &Point2::new(1.0, 2.0), TOL).unwrap();

        assert_relative_eq!(line.offset(&Point2::new(0.0, 1.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(line.offset(&Point2::new(1.0, 2.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(line.angle(), PI / 4.0, epsilon = 1e-12);
        // the plus side is on the right of the direction
        assert!(line.offset(&Point2::new(1.0, 0.0)) > 0.0);
        assert!(line.offset(&Point2::new(0.0, 3.0)) < 0.0);
    }

    #[test]
    fn coincident_points_are_rejected() {
        let result = Line::through(&Point2::new(1.0, 1.0), &Point2::new(1.0, 1.0), TOL);
        assert_eq!(result, Err(GeometryError::CoincidentPoints { distance: 0.0 }));
    }

    #[test]
    fn constructors_agree() {
        let through = Line::through(&Point2::new(1.0, 0.0), &Point2::new(1.0, 5.0), TOL).unwrap();
        let angled = Line::from_point_and_angle(&Point2::new(1.0, 3.0), PI / 2.0, TOL);
        // x - 1 > 0 on the plus side
        let coefficients = Line::from_coefficients(1.0, 0.0, -1.0, TOL).unwrap();

        for point in [Point2::new(3.0, 2.0), Point2::new(-1.0, 7.0)] {
            assert_relative_eq!(through.offset(&point), angled.offset(&point), epsilon = 1e-12);
            assert_relative_eq!(through.offset(&point), coefficients.offset(&point), epsilon = 1e-12);
        }
        assert_eq!(Line::from_coefficients(0.0, 0.0, 1.0, TOL), Err(GeometryError::ZeroNormal));
    }

    #[test]
    fn sub_space_round_trip() {
        let line = Line::from_point_and_angle(&Point2::new(2.0, -1.0), 0.3, TOL);
        let point = line.to_space(&4.5);

        assert!(line.contains(&point));
        assert_relative_eq!(line.to_sub_space(&point), 4.5, epsilon = 1e-12);
        let projected = line.project(&Point2::new(7.0, 7.0));
        assert!(line.contains(&projected));
        assert_relative_eq!((Point2::new(7.0, 7.0) - projected).dot(&line.direction()), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn reversed_line() {
        let line = Line::from_point_and_angle(&Point2::new(0.0, 0.0), 0.0, TOL);
        let reversed = line.reversed();

        assert_relative_eq!(reversed.angle(), PI, epsilon = 1e-12);
        assert!(!line.same_orientation_as(&reversed));
        let point = Point2::new(3.0, -2.0);
        assert_relative_eq!(line.offset(&point), -reversed.offset(&point));
    }

    #[test]
    fn intersection_of_lines() {
        let horizontal = Line::from_point_and_angle(&Point2::new(0.0, 2.0), 0.0, TOL);
        let vertical = Line::from_point_and_angle(&Point2::new(3.0, 0.0), PI / 2.0, TOL);

        let crossing = horizontal.intersection(&vertical).unwrap();
        assert_relative_eq!(crossing, Point2::new(3.0, 2.0), epsilon = 1e-12);
        assert!(horizontal.intersection(&horizontal.reversed()).is_none());
    }

    #[test]
    fn trace_orientation() {
        let horizontal = Line::from_point_and_angle(&Point2::new(0.0, 0.0), 0.0, TOL);
        let vertical = Line::from_point_and_angle(&Point2::new(2.0, 0.0), PI / 2.0, TOL);

        match horizontal.trace(&vertical) {
            Trace::Crossing(point) => {
                assert_relative_eq!(point.location(), 2.0, epsilon = 1e-12);
                // the plus side of the vertical line is x > 2
                assert!(point.is_direct());
            }
            _ => panic!("lines cross"),
        }
        match horizontal.trace(&Line::from_point_and_angle(&Point2::new(0.0, 1.0), 0.0, TOL)) {
            Trace::Parallel(offset) => assert_relative_eq!(offset, 1.0, epsilon = 1e-12),
            _ => panic!("lines are parallel"),
        }
    }

    #[test]
    fn segment_split_by_line() {
        let segment = Segment::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0), TOL).unwrap();
        let sub = segment.to_sub_line();
        assert_relative_eq!(sub.size(), 4.0, epsilon = 1e-12);

        let vertical = Line::from_point_and_angle(&Point2::new(1.0, 0.0), PI / 2.0, TOL);
        let split = sub.split(&vertical);
        assert_eq!(split.side(), Side::Both);
        assert_relative_eq!(split.plus.as_ref().map_or(0.0, |part| part.size()), 3.0, epsilon = 1e-12);
        assert_relative_eq!(split.minus.as_ref().map_or(0.0, |part| part.size()), 1.0, epsilon = 1e-12);

        let away = Line::from_point_and_angle(&Point2::new(9.0, 0.0), PI / 2.0, TOL);
        assert_eq!(sub.side(&away), Side::Minus);
    }

    #[test]
    fn reversed_sub_line_keeps_its_points() {
        let segment = Segment::new(Point2::new(1.0, 1.0), Point2::new(3.0, 1.0), TOL).unwrap();
        let reversed = segment.to_sub_line().reversed();

        let pieces = segments(&reversed);
        assert_eq!(pieces.len(), 1);
        assert_relative_eq!(pieces[0].start(), Point2::new(3.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(pieces[0].end(), Point2::new(1.0, 1.0), epsilon = 1e-12);
        let middle = reversed.hyperplane().to_sub_space(&Point2::new(2.0, 1.0));
        assert_eq!(reversed.remaining().check_point(&middle), Location::Inside);
    }
}
