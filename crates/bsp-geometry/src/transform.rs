//! Rigid and affine maps of the plane, of 3D space and of the sphere.

use bsp_region::{Hyperplane, SubHyperplane, Transform};
use nalgebra::{Isometry2, Isometry3, Matrix2, Point2, Point3, UnitQuaternion, Vector2};

use crate::error::{GeometryError, GeometryResult};
use crate::line::{Euclidean2D, Line, SubLine};
use crate::plane::{Euclidean3D, Plane, SubPlane};
use crate::sphere2::{Circle, S2Point, Sphere2D, SubCircle};

/// The map `p -> linear * p + translation` of the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMap2 {
    linear: Matrix2<f64>,
    inverse_transpose: Matrix2<f64>,
    translation: Vector2<f64>,
}

impl AffineMap2 {
    /// Creates the map, rejecting a singular linear part.
    pub fn new(linear: Matrix2<f64>, translation: Vector2<f64>) -> GeometryResult<Self> {
        let inverse = linear.try_inverse().ok_or(GeometryError::SingularTransform)?;
        if !inverse.iter().all(|entry| entry.is_finite()) {
            return Err(GeometryError::SingularTransform);
        }
        Ok(Self {
            linear,
            inverse_transpose: inverse.transpose(),
            translation,
        })
    }

    /// Returns the linear part.
    #[inline]
    pub fn linear(&self) -> &Matrix2<f64> {
        &self.linear
    }

    /// Returns the translation part.
    #[inline]
    pub fn translation(&self) -> &Vector2<f64> {
        &self.translation
    }
}

impl Transform<Euclidean2D> for AffineMap2 {
    fn apply_point(&self, point: &Point2<f64>) -> Point2<f64> {
        Point2::from(self.linear * point.coords + self.translation)
    }

    fn apply_hyperplane(&self, line: &Line) -> Line {
        // normals map through the inverse transpose
        let normal = self.inverse_transpose * line.normal();
        let constant = line.origin_offset() - normal.dot(&self.translation);
        Line::with_coefficients(normal.x, normal.y, constant, line.tolerance())
    }

    fn apply_sub(&self, sub: &SubLine) -> SubLine {
        sub.mapped(self.apply_hyperplane(sub.hyperplane()), |point| self.apply_point(point))
    }
}

impl Transform<Euclidean2D> for Isometry2<f64> {
    fn apply_point(&self, point: &Point2<f64>) -> Point2<f64> {
        self.transform_point(point)
    }

    fn apply_hyperplane(&self, line: &Line) -> Line {
        let anchor = self.transform_point(&line.project(&Point2::origin()));
        Line::from_point_and_angle(&anchor, line.angle() + self.rotation.angle(), line.tolerance())
    }

    fn apply_sub(&self, sub: &SubLine) -> SubLine {
        sub.mapped(self.apply_hyperplane(sub.hyperplane()), |point| self.transform_point(point))
    }
}

impl Transform<Euclidean3D> for Isometry3<f64> {
    fn apply_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.transform_point(point)
    }

    fn apply_hyperplane(&self, plane: &Plane) -> Plane {
        Plane::from_frame(
            self.transform_point(&plane.origin()),
            self.transform_vector(&plane.u()),
            self.transform_vector(&plane.v()),
            plane.tolerance(),
        )
    }

    fn apply_sub(&self, sub: &SubPlane) -> SubPlane {
        sub.mapped(self.apply_hyperplane(sub.hyperplane()), |point| self.transform_point(point))
    }
}

impl Transform<Sphere2D> for UnitQuaternion<f64> {
    fn apply_point(&self, point: &S2Point) -> S2Point {
        point.rotated(self)
    }

    fn apply_hyperplane(&self, circle: &Circle) -> Circle {
        circle.rotated(self)
    }

    fn apply_sub(&self, sub: &SubCircle) -> SubCircle {
        sub.mapped(self.apply_hyperplane(sub.hyperplane()), |point| point.rotated(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bsp_region::{Embedding, Location};
    use nalgebra::{Translation3, UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    const TOL: f64 = 1.0e-10;

    #[test]
    fn singular_map_is_rejected() {
        let flat = Matrix2::new(1.0, 2.0, 2.0, 4.0);
        assert_eq!(AffineMap2::new(flat, Vector2::zeros()), Err(GeometryError::SingularTransform));
    }

    #[test]
    fn affine_map_keeps_sides() {
        let map = AffineMap2::new(Matrix2::new(2.0, 1.0, 0.0, 3.0), Vector2::new(1.0, -1.0)).unwrap();
        let line = Line::through(&Point2::new(0.0, 0.0), &Point2::new(1.0, 1.0), TOL).unwrap();
        let image = map.apply_hyperplane(&line);

        for point in [Point2::new(2.0, 0.5), Point2::new(-1.0, 3.0), Point2::new(0.5, 0.5)] {
            let before = line.offset(&point);
            let after = image.offset(&map.apply_point(&point));
            assert!(before.abs() < TOL && after.abs() < 1e-9 || before.signum() == after.signum());
        }
    }

    #[test]
    fn isometry_moves_lines() {
        let isometry = Isometry2::new(Vector2::new(1.0, 2.0), FRAC_PI_2);
        let line = Line::from_point_and_angle(&Point2::new(0.0, 1.0), 0.0, TOL);
        let image = isometry.apply_hyperplane(&line);

        // (0, 1) rotates to (-1, 0) then shifts to (0, 2)
        assert!(image.contains(&Point2::new(0.0, 2.0)));
        assert_relative_eq!(image.angle(), FRAC_PI_2, epsilon = 1e-12);
        let plus_point = Point2::new(0.0, 0.0);
        assert!(image.offset(&isometry.apply_point(&plus_point)) > 0.0);
    }

    #[test]
    fn isometry_moves_sub_lines() {
        let isometry = Isometry2::new(Vector2::new(5.0, 0.0), 0.0);
        let line = Line::from_point_and_angle(&Point2::new(0.0, 0.0), 0.0, TOL);
        let sub = crate::line::Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), TOL)
            .unwrap()
            .to_sub_line();
        let moved = isometry.apply_sub(&sub);

        let inside = moved.hyperplane().to_sub_space(&Point2::new(5.5, 0.0));
        let outside = moved.hyperplane().to_sub_space(&Point2::new(0.5, 0.0));
        assert_eq!(moved.remaining().check_point(&inside), Location::Inside);
        assert_eq!(moved.remaining().check_point(&outside), Location::Outside);
        assert!(moved.hyperplane().same_orientation_as(&line));
    }

    #[test]
    fn isometry_moves_planes() {
        let isometry = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, 1.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
        );
        let plane = Plane::new(Vector3::z(), 0.0, TOL).unwrap();
        let image = isometry.apply_hyperplane(&plane);

        // z = 0 rotates about x onto y = 0, then shifts along z
        assert_relative_eq!(image.normal(), -Vector3::y(), epsilon = 1e-12);
        assert!(image.contains(&Point3::new(4.0, 0.0, -3.0)));
    }

    #[test]
    fn rotation_moves_circles() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2);
        let equator = Circle::new(&Vector3::z(), TOL).unwrap();
        let image = rotation.apply_hyperplane(&equator);

        assert_relative_eq!(image.pole(), -Vector3::y(), epsilon = 1e-12);
        let on_equator = S2Point::new(Vector3::new(0.6, 0.8, 0.0)).unwrap();
        assert_relative_eq!(image.offset(&rotation.apply_point(&on_equator)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            image.to_sub_space(&rotation.apply_point(&on_equator)).alpha(),
            equator.to_sub_space(&on_equator).alpha(),
            epsilon = 1e-12
        );
    }
}
