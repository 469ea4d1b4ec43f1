//! Error types for the concrete spaces.

use bsp_region::RegionError;
use thiserror::Error;

/// Errors raised while building primitives or regions of a concrete space.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Two points meant to define a hyperplane are too close together.
    #[error("points are too close to define a hyperplane (distance {distance})")]
    CoincidentPoints {
        /// Distance between the points.
        distance: f64,
    },

    /// Three points meant to define a plane are aligned.
    #[error("points are collinear")]
    CollinearPoints,

    /// A normal vector or coefficient pair has zero length.
    #[error("normal vector has zero length")]
    ZeroNormal,

    /// A polygon or facet has fewer than three vertices.
    #[error("at least 3 vertices are required, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },

    /// A facet references a vertex that does not exist.
    #[error("vertex index {index} is out of range for {count} vertices")]
    VertexIndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of vertices available.
        count: usize,
    },

    /// Two distinct vertices are closer than the tolerance.
    #[error("vertices {first} and {second} are closer than the tolerance")]
    CloseVertices {
        /// Index of the first vertex.
        first: usize,
        /// Index of the second vertex.
        second: usize,
    },

    /// A facet vertex lies off the plane of the facet's first three vertices.
    #[error("vertex {vertex} of facet {facet} lies {distance} away from the facet plane")]
    NonPlanarFacet {
        /// Index of the facet.
        facet: usize,
        /// Index of the vertex.
        vertex: usize,
        /// Distance to the plane.
        distance: f64,
    },

    /// An edge appears in a single facet, so the boundary is not closed.
    #[error("edge from vertex {start} to vertex {end} belongs to a single facet")]
    EdgeConnectedToOneFacet {
        /// Start vertex of the edge.
        start: usize,
        /// End vertex of the edge.
        end: usize,
    },

    /// Two facets run along a shared edge in the same direction.
    #[error("facets sharing the edge from vertex {start} to vertex {end} have mismatched orientations")]
    FacetOrientationMismatch {
        /// Start vertex of the edge.
        start: usize,
        /// End vertex of the edge.
        end: usize,
    },

    /// A map cannot be inverted.
    #[error("transform is not invertible")]
    SingularTransform,

    /// Error raised by the region engine.
    #[error(transparent)]
    Region(#[from] RegionError),
}

/// Result type for the concrete spaces.
pub type GeometryResult<T> = Result<T, GeometryError>;
