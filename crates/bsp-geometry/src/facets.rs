//! Size and barycenter of a region from its boundary facets.
//!
//! By the divergence theorem, the size of a bounded region of dimension
//! `d` is `1/d` of the flux of the position vector through its boundary,
//! and its first moment `1/(d+1)` of the flux weighted by position. Each
//! flat facet contributes `area * (centroid · outward normal)` to both.

use nalgebra::{Point, SVector};

/// Running sums over the facets of a boundary.
#[derive(Debug, Clone)]
pub(crate) struct FacetAccumulator<const D: usize> {
    sum: f64,
    moment: SVector<f64, D>,
    unbounded: bool,
}

impl<const D: usize> FacetAccumulator<D> {
    pub(crate) fn new() -> Self {
        Self {
            sum: 0.0,
            moment: SVector::zeros(),
            unbounded: false,
        }
    }

    /// Adds a facet whose unit normal points out of the region.
    pub(crate) fn add(&mut self, area: f64, centroid: &Point<f64, D>, outward: &SVector<f64, D>) {
        if area.is_infinite() {
            self.unbounded = true;
            return;
        }
        if area == 0.0 {
            return;
        }
        let scaled = area * centroid.coords.dot(outward);
        self.sum += scaled;
        self.moment += centroid.coords * scaled;
    }

    /// Size and barycenter, or `None` when the region is unbounded.
    ///
    /// A negative flux means a finite outside surrounded by an infinite
    /// inside.
    pub(crate) fn finish(self) -> Option<(f64, Point<f64, D>)> {
        if self.unbounded || self.sum < 0.0 {
            return None;
        }
        let dimension = D as f64;
        let size = self.sum / dimension;
        let barycenter = Point::from(self.moment / ((dimension + 1.0) * size));
        Some((size, barycenter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Vector2};

    #[test]
    fn unit_square() {
        let mut accumulator = FacetAccumulator::<2>::new();
        accumulator.add(1.0, &Point2::new(0.5, 0.0), &Vector2::new(0.0, -1.0));
        accumulator.add(1.0, &Point2::new(1.0, 0.5), &Vector2::new(1.0, 0.0));
        accumulator.add(1.0, &Point2::new(0.5, 1.0), &Vector2::new(0.0, 1.0));
        accumulator.add(1.0, &Point2::new(0.0, 0.5), &Vector2::new(-1.0, 0.0));

        let (size, barycenter) = accumulator.finish().unwrap();
        assert_relative_eq!(size, 1.0);
        assert_relative_eq!(barycenter, Point2::new(0.5, 0.5));
    }

    #[test]
    fn inverted_square_is_unbounded() {
        let mut accumulator = FacetAccumulator::<2>::new();
        accumulator.add(1.0, &Point2::new(1.0, 0.5), &Vector2::new(-1.0, 0.0));
        accumulator.add(1.0, &Point2::new(0.5, 1.0), &Vector2::new(0.0, -1.0));

        assert!(accumulator.finish().is_none());
    }

    #[test]
    fn infinite_facet_is_unbounded() {
        let mut accumulator = FacetAccumulator::<2>::new();
        accumulator.add(f64::INFINITY, &Point2::origin(), &Vector2::new(1.0, 0.0));

        assert!(accumulator.finish().is_none());
    }
}
