//! Oriented planes of 3D space, sub-planes and the 3D space itself.

use bsp_region::{EmbeddedSub, Embedding, Hyperplane, Measure, Region, Space, SubHyperplane, Trace};
use nalgebra::{Matrix2, Point2, Point3, Vector3};
use tracing::warn;

use crate::error::{GeometryError, GeometryResult};
use crate::facets::FacetAccumulator;
use crate::line::{Euclidean2D, Line, PARALLEL_EPSILON};
use crate::transform::AffineMap2;

/// The three-dimensional Euclidean space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean3D;

/// An oriented plane, represented as `normal · point = offset`.
///
/// The plus side is the side the normal points to. Each plane carries an
/// orthonormal frame `(u, v)` with `u × v = normal`, giving coordinates to
/// its points in the plane's own 2D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f64>,
    offset: f64,
    origin: Point3<f64>,
    u: Vector3<f64>,
    v: Vector3<f64>,
    tolerance: f64,
}

impl Plane {
    /// Creates a plane from a normal vector and offset.
    /// The normal is normalized automatically.
    pub fn new(normal: Vector3<f64>, offset: f64, tolerance: f64) -> GeometryResult<Self> {
        let norm = normal.norm();
        if norm <= f64::MIN_POSITIVE {
            return Err(GeometryError::ZeroNormal);
        }
        Ok(Self::with_unit_normal(normal / norm, offset / norm, tolerance))
    }

    /// Creates a plane from a point on the plane and a normal vector.
    pub fn from_point_and_normal(point: &Point3<f64>, normal: Vector3<f64>, tolerance: f64) -> GeometryResult<Self> {
        let norm = normal.norm();
        if norm <= f64::MIN_POSITIVE {
            return Err(GeometryError::ZeroNormal);
        }
        let unit_normal = normal / norm;
        Ok(Self::with_unit_normal(unit_normal, unit_normal.dot(&point.coords), tolerance))
    }

    /// Creates a plane from three non-collinear points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    pub fn from_three_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, tolerance: f64) -> GeometryResult<Self> {
        let ab = b - a;
        let ac = c - a;
        let length = ab.norm();
        if length <= tolerance {
            return Err(GeometryError::CoincidentPoints { distance: length });
        }
        let normal = ab.cross(&ac);
        // distance from c to the line through a and b
        if normal.norm() / length <= tolerance {
            return Err(GeometryError::CollinearPoints);
        }
        Self::from_point_and_normal(a, normal, tolerance)
    }

    /// The plane through `origin` spanned by the orthonormal pair `(u, v)`.
    pub(crate) fn from_frame(origin: Point3<f64>, u: Vector3<f64>, v: Vector3<f64>, tolerance: f64) -> Self {
        let normal = u.cross(&v);
        Self {
            normal,
            offset: normal.dot(&origin.coords),
            origin,
            u,
            v,
            tolerance,
        }
    }

    fn with_unit_normal(normal: Vector3<f64>, offset: f64, tolerance: f64) -> Self {
        let u = orthogonal(&normal);
        let v = normal.cross(&u);
        Self {
            normal,
            offset,
            origin: Point3::from(normal * offset),
            u,
            v,
            tolerance,
        }
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn origin_offset(&self) -> f64 {
        self.offset
    }

    /// Returns the point of the plane closest to the origin.
    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Returns the first frame vector.
    #[inline]
    pub fn u(&self) -> Vector3<f64> {
        self.u
    }

    /// Returns the second frame vector.
    #[inline]
    pub fn v(&self) -> Vector3<f64> {
        self.v
    }

    /// Returns `true` if the point lies on the plane within tolerance.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.offset(point).abs() <= self.tolerance
    }

    /// Computes the intersection of the line `start + t * direction` with the plane.
    ///
    /// Returns `Some((t, point))`, or `None` if the line is parallel to the plane.
    pub fn intersect_line(&self, start: &Point3<f64>, direction: &Vector3<f64>) -> Option<(f64, Point3<f64>)> {
        let denom = self.normal.dot(direction);

        // Line is parallel to plane
        if denom.abs() < PARALLEL_EPSILON * direction.norm() {
            return None;
        }

        let t = (self.offset - self.normal.dot(&start.coords)) / denom;
        Some((t, start + direction * t))
    }
}

/// A unit vector orthogonal to `w`.
fn orthogonal(w: &Vector3<f64>) -> Vector3<f64> {
    let threshold = 0.6 * w.norm();
    if w.x.abs() <= threshold {
        let inverse = 1.0 / w.y.hypot(w.z);
        Vector3::new(0.0, inverse * w.z, -inverse * w.y)
    } else if w.y.abs() <= threshold {
        let inverse = 1.0 / w.x.hypot(w.z);
        Vector3::new(-inverse * w.z, 0.0, inverse * w.x)
    } else {
        let inverse = 1.0 / w.x.hypot(w.y);
        Vector3::new(inverse * w.y, -inverse * w.x, 0.0)
    }
}

impl Hyperplane for Plane {
    type Space = Euclidean3D;

    fn offset(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.offset(point)
    }

    fn same_orientation_as(&self, other: &Self) -> bool {
        self.normal.dot(&other.normal) > 0.0
    }

    fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
            origin: self.origin,
            u: self.v,
            v: self.u,
            tolerance: self.tolerance,
        }
    }

    fn whole_hyperplane(&self) -> SubPlane {
        EmbeddedSub::whole(*self)
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Embedding for Plane {
    type SubSpace = Euclidean2D;

    fn to_sub_space(&self, point: &Point3<f64>) -> Point2<f64> {
        let relative = point - self.origin;
        Point2::new(relative.dot(&self.u), relative.dot(&self.v))
    }

    fn to_space(&self, point: &Point2<f64>) -> Point3<f64> {
        self.origin + self.u * point.x + self.v * point.y
    }

    fn trace(&self, other: &Self) -> Trace<Euclidean2D> {
        // offset relative to other of the point (a, b) is A a + B b + C
        let a = other.normal.dot(&self.u);
        let b = other.normal.dot(&self.v);
        let c = other.offset(&self.origin);
        if a.hypot(b) < PARALLEL_EPSILON {
            Trace::Parallel(c)
        } else {
            Trace::Crossing(Line::with_coefficients(a, b, c, self.tolerance))
        }
    }

    fn transfer<F>(&self, target: &Self, region: &Region<Euclidean2D>, map: F) -> Region<Euclidean2D>
    where
        F: Fn(&Point3<f64>) -> Point3<f64>,
    {
        let image = |x: f64, y: f64| target.to_sub_space(&map(&self.to_space(&Point2::new(x, y))));
        let origin = image(0.0, 0.0);
        let linear = Matrix2::from_columns(&[image(1.0, 0.0) - origin, image(0.0, 1.0) - origin]);
        match AffineMap2::new(linear, origin.coords) {
            Ok(affine) => region.transform(&affine),
            Err(error) => {
                warn!(%error, "degenerate map between planes, keeping sub-plane coordinates");
                region.clone()
            }
        }
    }
}

/// A part of a plane, described by a polygon of its 2D coordinates.
pub type SubPlane = EmbeddedSub<Plane>;

impl Space for Euclidean3D {
    type Point = Point3<f64>;
    type Hyperplane = Plane;
    type Sub = SubPlane;

    const NAME: &'static str = "euclidean-3d";

    fn nan_point() -> Point3<f64> {
        Point3::new(f64::NAN, f64::NAN, f64::NAN)
    }

    fn measure(region: &Region<Self>) -> Measure<Self> {
        let boundary = region.boundary();
        if boundary.is_empty() {
            let size = if region.is_empty() { 0.0 } else { f64::INFINITY };
            return Measure::without_barycenter(size);
        }
        let mut accumulator = FacetAccumulator::<3>::new();
        for facet in &boundary {
            let plane = facet.hyperplane();
            let polygon = facet.remaining();
            let area = polygon.size();
            let centroid = if area.is_finite() && area > 0.0 {
                plane.to_space(&polygon.barycenter())
            } else {
                Point3::origin()
            };
            accumulator.add(area, &centroid, &plane.normal());
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

    const TOL: f64 = 1.0e-10;

    fn check_frame(plane: &Plane) {
        assert_relative_eq!(plane.u().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.v().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.u().dot(&plane.v()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(plane.u().cross(&plane.v()), plane.normal(), epsilon = 1e-12);
        assert!(plane.contains(&plane.origin()));
    }

    #[test]
    fn plane_from_point_and_normal() {
        let plane = Plane::from_point_and_normal(&Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 2.0), TOL).unwrap();

        assert_relative_eq!(plane.normal(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(plane.origin_offset(), 5.0);
        assert_relative_eq!(plane.offset(&Point3::new(3.0, -1.0, 7.0)), 2.0);
        check_frame(&plane);
    }

    #[test]
    fn plane_from_three_points() {
        let plane = Plane::from_three_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            TOL,
        )
        .unwrap();

        assert_relative_eq!(plane.normal(), Vector3::z(), epsilon = 1e-12);
        check_frame(&plane);
    }

    #[test]
    fn degenerate_planes_are_rejected() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 1.0, 1.0);
        let c = Point3::new(2.0, 2.0, 2.0);

        assert_eq!(Plane::from_three_points(&a, &b, &c, TOL), Err(GeometryError::CollinearPoints));
        assert_eq!(
            Plane::from_three_points(&a, &a, &c, TOL),
            Err(GeometryError::CoincidentPoints { distance: 0.0 })
        );
        assert_eq!(Plane::new(Vector3::zeros(), 1.0, TOL), Err(GeometryError::ZeroNormal));
    }

    #[test]
    fn frames_for_every_axis() {
        for normal in [Vector3::x(), Vector3::y(), Vector3::z(), Vector3::new(1.0, 1.0, 1.0), -Vector3::x()] {
            check_frame(&Plane::new(normal, 1.5, TOL).unwrap());
        }
    }

    #[test]
    fn sub_space_round_trip() {
        let plane = Plane::new(Vector3::new(1.0, 2.0, -0.5), 3.0, TOL).unwrap();
        let point = plane.to_space(&Point2::new(-1.5, 4.0));

        assert!(plane.contains(&point));
        assert_relative_eq!(plane.to_sub_space(&point), Point2::new(-1.5, 4.0), epsilon = 1e-12);

        let outside = Point3::new(7.0, -2.0, 1.0);
        let projected = plane.project(&outside);
        assert!(plane.contains(&projected));
        assert_relative_eq!((outside - projected).cross(&plane.normal()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn reversed_plane_keeps_its_points() {
        let plane = Plane::new(Vector3::new(0.0, 1.0, 1.0), 2.0, TOL).unwrap();
        let reversed = plane.reversed();
        let point = Point3::new(1.0, 4.0, -3.0);

        assert_relative_eq!(plane.offset(&point), -reversed.offset(&point));
        assert!(!plane.same_orientation_as(&reversed));
        check_frame(&reversed);
        let on_plane = plane.to_space(&Point2::new(0.5, 0.25));
        assert_relative_eq!(reversed.to_space(&reversed.to_sub_space(&on_plane)), on_plane, epsilon = 1e-12);
    }

    #[test]
    fn line_intersection() {
        let plane = Plane::new(Vector3::z(), 2.0, TOL).unwrap();

        let (t, hit) = plane
            .intersect_line(&Point3::new(1.0, 1.0, 0.0), &Vector3::new(0.0, 0.0, 4.0))
            .unwrap();
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(hit, Point3::new(1.0, 1.0, 2.0));
        assert!(plane.intersect_line(&Point3::origin(), &Vector3::x()).is_none());
    }

    #[test]
    fn trace_of_crossing_planes() {
        let floor = Plane::new(Vector3::z(), 0.0, TOL).unwrap();
        let wall = Plane::new(Vector3::x(), 1.0, TOL).unwrap();

        let Trace::Crossing(line) = floor.trace(&wall) else {
            panic!("planes cross");
        };
        // the trace separates the floor like the wall separates space
        for point in [Point3::new(3.0, 2.0, 0.0), Point3::new(-2.0, 5.0, 0.0)] {
            let in_plane = floor.to_sub_space(&point);
            assert_relative_eq!(line.offset(&in_plane), wall.offset(&point), epsilon = 1e-12);
        }

        let ceiling = Plane::new(Vector3::z(), 3.0, TOL).unwrap();
        let Trace::Parallel(offset) = floor.trace(&ceiling) else {
            panic!("planes are parallel");
        };
        assert_relative_eq!(offset, -3.0);
    }

    #[test]
    fn sub_plane_split() {
        let floor = Plane::new(Vector3::z(), 0.0, TOL).unwrap();
        let wall = Plane::new(Vector3::x(), 1.0, TOL).unwrap();
        let whole = floor.whole_hyperplane();

        let split = whole.split(&wall);
        assert_eq!(split.side(), Side::Both);
        let plus = split.plus.unwrap();
        let on_plus = floor.to_sub_space(&Point3::new(2.0, 0.0, 0.0));
        let on_minus = floor.to_sub_space(&Point3::new(0.0, 0.0, 0.0));
        assert_eq!(plus.remaining().check_point(&on_plus), Location::Inside);
        assert_eq!(plus.remaining().check_point(&on_minus), Location::Outside);

        let above = Plane::new(-Vector3::z(), -1.0, TOL).unwrap();
        assert_eq!(whole.side(&above), Side::Plus);
    }
}
