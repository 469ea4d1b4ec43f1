//! Triangles as boundary facets of polyhedra.

use bsp_region::{Hyperplane, Side};
use nalgebra::{Point3, Vector3};

use crate::error::GeometryResult;
use crate::plane::{Plane, SubPlane};
use crate::polyhedron::facet;

/// A triangle, the usual facet of a triangulated mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    vertices: [Point3<f64>; 3],
}

impl Triangle {
    /// The triangle `a`, `b`, `c`. Seen from the side its normal points to,
    /// the vertices run counter-clockwise: normal = (b - a) × (c - a).
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// Returns the vertices in winding order.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>; 3] {
        &self.vertices
    }

    /// Normal whose length is twice the area.
    pub fn normal(&self) -> Vector3<f64> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Unit normal, `None` for a degenerate triangle.
    pub fn unit_normal(&self) -> Option<Vector3<f64>> {
        self.normal().try_normalize(f64::EPSILON)
    }

    /// Returns the area of the triangle.
    pub fn area(&self) -> f64 {
        0.5 * self.normal().norm()
    }

    /// Returns the centroid.
    pub fn centroid(&self) -> Point3<f64> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Supporting plane, with the same normal direction.
    pub fn plane(&self, tolerance: f64) -> GeometryResult<Plane> {
        let [a, b, c] = &self.vertices;
        Plane::from_three_points(a, b, c, tolerance)
    }

    /// Position of this triangle relative to a plane.
    pub fn side(&self, plane: &Plane) -> Side {
        let tolerance = plane.tolerance();
        let mut front = 0;
        let mut back = 0;

        for vertex in &self.vertices {
            let distance = plane.offset(vertex);
            if distance > tolerance {
                front += 1;
            } else if distance < -tolerance {
                back += 1;
            }
        }

        match (front, back) {
            (0, 0) => Side::Hyper,
            (_, 0) => Side::Plus,
            (0, _) => Side::Minus,
            _ => Side::Both,
        }
    }

    /// The triangle as a boundary facet, outside on the normal side.
    pub fn to_facet(&self, tolerance: f64) -> GeometryResult<SubPlane> {
        facet(&self.vertices, tolerance)
    }
}
