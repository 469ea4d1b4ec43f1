//! The unit sphere: points, great circles and spherical polygons.
//!
//! A great circle cuts the sphere into two hemispheres. Its minus side is
//! the hemisphere around its pole, so a polygon whose edges run
//! counter-clockwise around it (seen from outside the sphere) has its
//! inside on the minus side of every edge. Each circle carries a copy of
//! [`Sphere1D`], which makes a sub-circle a set of arcs.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::iter::successors;

use bsp_region::{BspTree, EmbeddedSub, Embedding, Hyperplane, Location, Measure, Region, Space, SubHyperplane, Trace};
use nalgebra::{Unit, UnitQuaternion, Vector3};
use tracing::{debug, warn};

use crate::error::{GeometryError, GeometryResult};
use crate::sphere1::{arc_tree, Arc, Arcs, ArcsSet, S1Point, Sphere1D};

/// The two-dimensional unit sphere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sphere2D;

/// A point of the sphere, stored as a unit vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct S2Point {
    vector: Vector3<f64>,
}

impl S2Point {
    /// The point in the direction of `vector`.
    pub fn new(vector: Vector3<f64>) -> GeometryResult<Self> {
        vector
            .try_normalize(f64::MIN_POSITIVE)
            .map(|vector| Self { vector })
            .ok_or(GeometryError::ZeroNormal)
    }

    /// The point with azimuth `theta` (from `+x` towards `+y`) and polar
    /// angle `phi` (from `+z`).
    pub fn from_spherical(theta: f64, phi: f64) -> Self {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        Self {
            vector: Vector3::new(cos_theta * sin_phi, sin_theta * sin_phi, cos_phi),
        }
    }

    /// The undefined point.
    pub fn nan() -> Self {
        Self {
            vector: Vector3::repeat(f64::NAN),
        }
    }

    /// Returns the unit vector.
    #[inline]
    pub fn vector(&self) -> Vector3<f64> {
        self.vector
    }

    /// Returns `true` if the point is undefined.
    pub fn is_nan(&self) -> bool {
        self.vector.iter().any(|c| c.is_nan())
    }

    /// Azimuth, in `[0, 2π)`.
    pub fn theta(&self) -> f64 {
        self.vector.y.atan2(self.vector.x).rem_euclid(TAU)
    }

    /// Polar angle, in `[0, π]`.
    pub fn phi(&self) -> f64 {
        angle(&Vector3::z(), &self.vector)
    }

    /// The antipodal point.
    pub fn negate(&self) -> Self {
        Self { vector: -self.vector }
    }

    /// Great-circle distance.
    pub fn distance(&self, other: &Self) -> f64 {
        angle(&self.vector, &other.vector)
    }

    pub(crate) fn rotated(&self, rotation: &UnitQuaternion<f64>) -> Self {
        Self {
            vector: rotation * self.vector,
        }
    }
}

/// Angle between two vectors, accurate near 0 and π.
fn angle(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    u.cross(v).norm().atan2(u.dot(v))
}

/// A unit vector orthogonal to the unit vector `v`.
fn orthogonal(v: &Vector3<f64>) -> Vector3<f64> {
    let threshold = 0.6;
    if v.x.abs() <= threshold {
        let inverse = 1.0 / v.y.hypot(v.z);
        Vector3::new(0.0, inverse * v.z, -inverse * v.y)
    } else if v.y.abs() <= threshold {
        let inverse = 1.0 / v.x.hypot(v.z);
        Vector3::new(-inverse * v.z, 0.0, inverse * v.x)
    } else {
        let inverse = 1.0 / v.x.hypot(v.y);
        Vector3::new(inverse * v.y, -inverse * v.x, 0.0)
    }
}

/// An oriented great circle.
///
/// Points of the circle are `cos α · x + sin α · y`, with `y = pole × x`,
/// so phases grow counter-clockwise seen from the pole. The offset of a
/// point is its angular distance to the circle, negative on the pole side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pole: Vector3<f64>,
    x: Vector3<f64>,
    y: Vector3<f64>,
    tolerance: f64,
}

impl Circle {
    /// The great circle with the given pole.
    pub fn new(pole: &Vector3<f64>, tolerance: f64) -> GeometryResult<Self> {
        let pole = pole.try_normalize(f64::MIN_POSITIVE).ok_or(GeometryError::ZeroNormal)?;
        Ok(Self::from_frame(pole, orthogonal(&pole), tolerance))
    }

    /// The great circle through two points, oriented from `first` to
    /// `second` along the shorter way; `first` has phase 0.
    pub fn through(first: &S2Point, second: &S2Point, tolerance: f64) -> GeometryResult<Self> {
        let distance = first.distance(second);
        if distance <= tolerance {
            return Err(GeometryError::CoincidentPoints { distance });
        }
        if distance >= PI - tolerance {
            return Err(GeometryError::CollinearPoints);
        }
        let pole = first.vector.cross(&second.vector).normalize();
        Ok(Self::from_frame(pole, first.vector, tolerance))
    }

    fn from_frame(pole: Vector3<f64>, x: Vector3<f64>, tolerance: f64) -> Self {
        Self {
            pole,
            x,
            y: pole.cross(&x),
            tolerance,
        }
    }

    /// Returns the pole, on the minus side.
    #[inline]
    pub fn pole(&self) -> Vector3<f64> {
        self.pole
    }

    /// Returns the direction of phase 0.
    #[inline]
    pub fn x_axis(&self) -> Vector3<f64> {
        self.x
    }

    /// Returns the direction of phase π/2.
    #[inline]
    pub fn y_axis(&self) -> Vector3<f64> {
        self.y
    }

    /// Phase of the projection of `direction` on the circle, in `[0, 2π]`.
    pub fn phase(&self, direction: &Vector3<f64>) -> f64 {
        PI + (-direction.dot(&self.y)).atan2(-direction.dot(&self.x))
    }

    /// The point of the circle at phase `alpha`.
    pub fn point_at(&self, alpha: f64) -> Vector3<f64> {
        let (sin, cos) = alpha.sin_cos();
        cos * self.x + sin * self.y
    }

    /// Arc of this circle lying on the minus side of `other`.
    pub fn inside_arc(&self, other: &Circle) -> Arc {
        let alpha = self.phase(&other.pole);
        Arc::span(alpha - FRAC_PI_2, alpha + FRAC_PI_2)
    }

    pub(crate) fn rotated(&self, rotation: &UnitQuaternion<f64>) -> Self {
        Self {
            pole: rotation * self.pole,
            x: rotation * self.x,
            y: rotation * self.y,
            tolerance: self.tolerance,
        }
    }
}

impl Hyperplane for Circle {
    type Space = Sphere2D;

    fn offset(&self, point: &S2Point) -> f64 {
        angle(&self.pole, &point.vector) - FRAC_PI_2
    }

    fn project(&self, point: &S2Point) -> S2Point {
        self.to_space(&self.to_sub_space(point))
    }

    fn same_orientation_as(&self, other: &Self) -> bool {
        self.pole.dot(&other.pole) >= 0.0
    }

    fn reversed(&self) -> Self {
        Self {
            pole: -self.pole,
            x: self.x,
            y: -self.y,
            tolerance: self.tolerance,
        }
    }

    fn whole_hyperplane(&self) -> SubCircle {
        EmbeddedSub::whole(*self)
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Embedding for Circle {
    type SubSpace = Sphere1D;

    fn to_sub_space(&self, point: &S2Point) -> S1Point {
        S1Point::new(self.phase(&point.vector))
    }

    fn to_space(&self, point: &S1Point) -> S2Point {
        S2Point {
            vector: self.point_at(point.alpha()),
        }
    }

    fn trace(&self, other: &Self) -> Trace<Sphere1D> {
        let between = angle(&self.pole, &other.pole);
        if between < self.tolerance || between > PI - self.tolerance {
            // same great circle, either orientation
            return Trace::Parallel(0.0);
        }
        let inside = arc_tree(&self.inside_arc(other), self.tolerance);
        Trace::Within(Region::from_tree_unchecked(inside, self.tolerance))
    }

    fn transfer<F>(&self, target: &Self, region: &ArcsSet, map: F) -> ArcsSet
    where
        F: Fn(&S2Point) -> S2Point,
    {
        let image = |alpha: f64| target.phase(&map(&self.to_space(&S1Point::new(alpha))).vector);
        // a map reversing the circle's orientation swaps the arc ends
        let direct = (image(FRAC_PI_2) - image(0.0)).rem_euclid(TAU) < PI;
        let arcs: Vec<Arc> = region
            .arcs()
            .iter()
            .map(|arc| {
                let lower = if direct { image(arc.lower()) } else { image(arc.upper()) };
                Arc::span(lower, lower + arc.size())
            })
            .collect();
        match ArcsSet::from_arcs(&arcs, region.tolerance()) {
            Ok(transferred) => transferred,
            Err(error) => {
                warn!(%error, "could not rebuild arcs on the target circle, keeping them unchanged");
                region.clone()
            }
        }
    }
}

/// A part of a great circle, described by a set of arcs of its phases.
pub type SubCircle = EmbeddedSub<Circle>;

/// A region of the sphere.
pub type SphericalPolygonsSet = Region<Sphere2D>;

/// Constructors specific to regions of the sphere.
pub trait SphericalPolygons: Sized {
    /// The hemisphere centered on `pole`.
    fn hemisphere(pole: &Vector3<f64>, tolerance: f64) -> GeometryResult<Self>;

    /// The polygon bounded by a closed vertex loop.
    ///
    /// Consecutive vertices are joined along the shorter great-circle arc.
    /// Seen from outside the sphere, the vertices run counter-clockwise
    /// around the inside.
    fn from_vertices(vertices: &[S2Point], tolerance: f64) -> GeometryResult<Self>;

    /// Regular polygon with `n` vertices at angular distance
    /// `outside_radius` from `center`, the first one towards `meridian`.
    fn regular_polygon(
        center: &Vector3<f64>,
        meridian: &Vector3<f64>,
        outside_radius: f64,
        n: usize,
        tolerance: f64,
    ) -> GeometryResult<Self>;
}

impl SphericalPolygons for SphericalPolygonsSet {
    fn hemisphere(pole: &Vector3<f64>, tolerance: f64) -> GeometryResult<Self> {
        let circle = Circle::new(pole, tolerance)?;
        let tree = BspTree::node(circle.whole_hyperplane(), BspTree::Leaf(false), BspTree::Leaf(true));
        Ok(Region::from_tree(tree, tolerance)?)
    }

    fn from_vertices(vertices: &[S2Point], tolerance: f64) -> GeometryResult<Self> {
        let count = vertices.len();
        if count < 3 {
            return Err(GeometryError::TooFewVertices { count });
        }
        let mut boundary = Vec::with_capacity(count);
        for (i, start) in vertices.iter().enumerate() {
            let j = (i + 1) % count;
            let end = &vertices[j];
            let length = start.distance(end);
            if length <= tolerance {
                return Err(GeometryError::CloseVertices { first: i, second: j });
            }
            let circle = Circle::through(start, end, tolerance)?;
            let lower = circle.phase(&start.vector);
            let edge = arc_tree(&Arc::span(lower, lower + length), tolerance);
            boundary.push(EmbeddedSub::new(circle, Region::from_tree_unchecked(edge, tolerance)));
        }
        debug!(vertices = count, "building spherical polygon from vertex loop");
        Ok(Region::from_boundary(boundary, tolerance)?)
    }

    fn regular_polygon(
        center: &Vector3<f64>,
        meridian: &Vector3<f64>,
        outside_radius: f64,
        n: usize,
        tolerance: f64,
    ) -> GeometryResult<Self> {
        if n < 3 {
            return Err(GeometryError::TooFewVertices { count: n });
        }
        let axis = Unit::try_new(*center, f64::MIN_POSITIVE).ok_or(GeometryError::ZeroNormal)?;
        let tilt = Unit::try_new(center.cross(meridian), f64::MIN_POSITIVE).ok_or(GeometryError::ZeroNormal)?;
        let first = UnitQuaternion::from_axis_angle(&tilt, outside_radius) * axis.into_inner();
        let step = UnitQuaternion::from_axis_angle(&axis, TAU / n as f64);
        let vertices = successors(Some(first), |vertex| Some(step * vertex))
            .take(n)
            .map(S2Point::new)
            .collect::<GeometryResult<Vec<_>>>()?;
        Self::from_vertices(&vertices, tolerance)
    }
}

/// Signed area of the spherical triangle `apex`, `a`, `b`; positive when
/// the vertices run counter-clockwise seen from outside.
fn triangle_area(apex: &Vector3<f64>, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    2.0 * apex.dot(&a.cross(b)).atan2(1.0 + apex.dot(a) + a.dot(b) + b.dot(apex))
}

/// Angular distance from `direction` to an arc of a circle.
fn distance_to_arc(circle: &Circle, arc: &Arc, direction: &Vector3<f64>) -> f64 {
    let alpha = arc.lower() + (circle.phase(direction) - arc.lower()).rem_euclid(TAU);
    if alpha <= arc.upper() {
        (angle(&circle.pole, direction) - FRAC_PI_2).abs()
    } else {
        angle(direction, &circle.point_at(arc.lower())).min(angle(direction, &circle.point_at(arc.upper())))
    }
}

/// The axis or diagonal direction farthest from every boundary arc.
fn far_direction(edges: &[(Circle, Arc)]) -> Vector3<f64> {
    let diagonal = 1.0 / 3.0_f64.sqrt();
    let mut candidates = vec![Vector3::x(), Vector3::y(), Vector3::z()];
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                candidates.push(Vector3::new(sx, sy, sz) * diagonal);
            }
        }
    }
    candidates.extend([-Vector3::x(), -Vector3::y(), -Vector3::z()]);

    candidates
        .into_iter()
        .map(|candidate| {
            let clearance = edges
                .iter()
                .map(|(circle, arc)| distance_to_arc(circle, arc, &candidate))
                .fold(f64::INFINITY, f64::min);
            (clearance, candidate)
        })
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map_or_else(Vector3::z, |(_, candidate)| candidate)
}

impl Space for Sphere2D {
    type Point = S2Point;
    type Hyperplane = Circle;
    type Sub = SubCircle;

    const NAME: &'static str = "sphere-2d";

    fn nan_point() -> S2Point {
        S2Point::nan()
    }

    /// Area from a fan of triangles over the boundary arcs, apex opposite
    /// the direction farthest from the boundary. The moment of the region
    /// is half the sum of the boundary arc lengths times their poles.
    fn measure(region: &Region<Self>) -> Measure<Self> {
        let boundary = region.boundary();
        if boundary.is_empty() {
            let size = if region.is_empty() { 0.0 } else { 2.0 * TAU };
            return Measure::without_barycenter(size);
        }
        let edges: Vec<(Circle, Arc)> = boundary
            .iter()
            .flat_map(|facet| {
                let circle = *facet.hyperplane();
                facet.remaining().arcs().into_iter().map(move |arc| (circle, arc))
            })
            .collect();

        let far = far_direction(&edges);
        let apex = -far;
        let mut fan = 0.0;
        let mut moment = Vector3::zeros();
        for (circle, arc) in &edges {
            moment += 0.5 * arc.size() * circle.pole;
            // pieces shorter than a half turn keep each triangle well defined
            let pieces = (arc.size() / FRAC_PI_2).ceil().max(1.0);
            let step = arc.size() / pieces;
            let mut start = circle.point_at(arc.lower());
            for k in 1..=(pieces as u32) {
                let end = circle.point_at(arc.lower() + f64::from(k) * step);
                fan += triangle_area(&apex, &start, &end);
                start = end;
            }
        }
        let size = match region.check_point(&S2Point { vector: far }) {
            Location::Inside => fan + 2.0 * TAU,
            _ => fan,
        };
        let barycenter = moment
            .try_normalize(region.tolerance())
            .map_or_else(S2Point::nan, |vector| S2Point { vector });
        Measure { size, barycenter }
    }
}
