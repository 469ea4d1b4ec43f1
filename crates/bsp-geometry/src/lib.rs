//! Concrete spaces for the BSP region engine.
//!
//! Each space supplies its hyperplanes, their sub-hyperplanes and a measure;
//! everything else (set operations, containment, boundaries) comes from
//! [`bsp_region`].
//!
//! | space | hyperplane | region |
//! |---|---|---|
//! | [`Euclidean1D`] | [`OrientedPoint`] | [`IntervalsSet`] |
//! | [`Sphere1D`] | [`LimitAngle`] | [`ArcsSet`] |
//! | [`Euclidean2D`] | [`Line`] | [`PolygonsSet`] |
//! | [`Euclidean3D`] | [`Plane`] | [`PolyhedronsSet`] |
//! | [`Sphere2D`] | [`Circle`] | [`SphericalPolygonsSet`] |
//!
//! ```
//! use bsp_geometry::{Polygons, PolygonsSet};
//! use bsp_region::factory;
//!
//! let a = PolygonsSet::rectangle(0.0, 2.0, 0.0, 2.0, 1e-10).unwrap();
//! let b = PolygonsSet::rectangle(1.0, 3.0, 1.0, 3.0, 1e-10).unwrap();
//! let union = factory::union(&a, &b).unwrap();
//! assert!((union.size() - 7.0).abs() < 1e-9);
//! ```

pub mod error;
mod facets;
pub mod line;
pub mod oned;
pub mod plane;
pub mod polygon;
pub mod polyhedron;
pub mod sphere1;
pub mod sphere2;
pub mod transform;
pub mod triangle;

pub use error::{GeometryError, GeometryResult};
pub use line::{Euclidean2D, Line, Segment, SubLine};
pub use oned::{Euclidean1D, Interval, Intervals, IntervalsSet, LinearMap1D, OrientedPoint, SubOrientedPoint};
pub use plane::{Euclidean3D, Plane, SubPlane};
pub use polygon::{Polygons, PolygonsSet, VertexLoop};
pub use polyhedron::{Polyhedra, PolyhedronsSet};
pub use sphere1::{Arc, ArcSplit, Arcs, ArcsSet, LimitAngle, S1Point, Sphere1D, SubLimitAngle};
pub use sphere2::{Circle, S2Point, Sphere2D, SphericalPolygons, SphericalPolygonsSet, SubCircle};
pub use transform::AffineMap2;
pub use triangle::Triangle;
