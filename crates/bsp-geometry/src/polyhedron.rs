//! Regions of 3D space.

use std::collections::BTreeSet;

use bsp_region::{
    factory, BoundaryAttribute, BoundaryTree, BspNode, BspTree, Embedding, Hyperplane, Location, Region, RegionError,
};
use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{GeometryError, GeometryResult};
use crate::plane::{Euclidean3D, Plane, SubPlane};
use crate::polygon::{Polygons, PolygonsSet};

/// A region of 3D space.
pub type PolyhedronsSet = Region<Euclidean3D>;

/// A planar facet bounded by a vertex loop.
///
/// The plane goes through the first three vertices, with its normal given
/// by the right-hand rule; seen from that side the loop runs
/// counter-clockwise. Every other vertex must lie on the plane.
pub fn facet(vertices: &[Point3<f64>], tolerance: f64) -> GeometryResult<SubPlane> {
    planar_facet(0, vertices, tolerance)
}

fn planar_facet(index: usize, vertices: &[Point3<f64>], tolerance: f64) -> GeometryResult<SubPlane> {
    let [a, b, c, ..] = vertices else {
        return Err(GeometryError::TooFewVertices { count: vertices.len() });
    };
    let plane = Plane::from_three_points(a, b, c, tolerance)?;
    let mut projected = Vec::with_capacity(vertices.len());
    for (vertex, point) in vertices.iter().enumerate() {
        let distance = plane.offset(point).abs();
        if distance >= tolerance {
            return Err(GeometryError::NonPlanarFacet {
                facet: index,
                vertex,
                distance,
            });
        }
        projected.push(plane.to_sub_space(point));
    }
    let polygon = PolygonsSet::from_vertices(&projected, tolerance)?;
    Ok(SubPlane::new(plane, polygon))
}

/// Constructors and queries specific to regions of 3D space.
pub trait Polyhedra: Sized {
    /// The axis-aligned box with opposite corners `min` and `max`.
    fn cuboid(min: &Point3<f64>, max: &Point3<f64>, tolerance: f64) -> GeometryResult<Self>;

    /// The polyhedron described by a boundary representation.
    ///
    /// Each facet lists vertex indices counter-clockwise as seen from
    /// outside. The representation is checked before building: indices in
    /// range, no two vertices closer than `tolerance`, planar facets, and
    /// every edge shared by exactly two facets running along it in opposite
    /// directions.
    fn from_facets(vertices: &[Point3<f64>], facets: &[Vec<usize>], tolerance: f64) -> GeometryResult<Self>;

    /// First boundary facet hit by the ray from `point` along `direction`.
    ///
    /// A facet containing `point` itself counts as hit.
    fn first_intersection(&self, point: &Point3<f64>, direction: &Vector3<f64>) -> Option<SubPlane>;
}

impl Polyhedra for PolyhedronsSet {
    fn cuboid(min: &Point3<f64>, max: &Point3<f64>, tolerance: f64) -> GeometryResult<Self> {
        for (&lower, &upper) in min.iter().zip(max.iter()) {
            if !(lower <= upper) {
                return Err(RegionError::EndpointsNotAnInterval { lower, upper }.into());
            }
        }
        // plus sides face away from the box
        let planes = [
            Plane::new(-Vector3::x(), -min.x, tolerance)?,
            Plane::new(Vector3::x(), max.x, tolerance)?,
            Plane::new(-Vector3::y(), -min.y, tolerance)?,
            Plane::new(Vector3::y(), max.y, tolerance)?,
            Plane::new(-Vector3::z(), -min.z, tolerance)?,
            Plane::new(Vector3::z(), max.z, tolerance)?,
        ];
        Ok(factory::build_convex(&planes)?)
    }

    fn from_facets(vertices: &[Point3<f64>], facets: &[Vec<usize>], tolerance: f64) -> GeometryResult<Self> {
        for (first, a) in vertices.iter().enumerate() {
            for (step, b) in vertices[first + 1..].iter().enumerate() {
                if (a - b).norm() <= tolerance {
                    return Err(GeometryError::CloseVertices {
                        first,
                        second: first + 1 + step,
                    });
                }
            }
        }

        let mut edges = BTreeSet::new();
        for indices in facets {
            if indices.len() < 3 {
                return Err(GeometryError::TooFewVertices { count: indices.len() });
            }
            if let Some(&index) = indices.iter().find(|&&index| index >= vertices.len()) {
                return Err(GeometryError::VertexIndexOutOfRange {
                    index,
                    count: vertices.len(),
                });
            }
            for (&start, &end) in indices.iter().zip(indices.iter().cycle().skip(1)) {
                // a second facet running the same way along an edge
                if !edges.insert((start, end)) {
                    return Err(GeometryError::FacetOrientationMismatch { start, end });
                }
            }
        }
        if let Some(&(start, end)) = edges.iter().find(|&&(start, end)| !edges.contains(&(end, start))) {
            return Err(GeometryError::EdgeConnectedToOneFacet { start, end });
        }

        let boundary = facets
            .iter()
            .enumerate()
            .map(|(index, indices)| {
                let points: Vec<Point3<f64>> = indices.iter().map(|&vertex| vertices[vertex]).collect();
                planar_facet(index, &points, tolerance).map_err(|error| match error {
                    GeometryError::NonPlanarFacet { facet, vertex, distance } => GeometryError::NonPlanarFacet {
                        facet,
                        vertex: indices[vertex],
                        distance,
                    },
                    other => other,
                })
            })
            .collect::<GeometryResult<Vec<_>>>()?;
        debug!(
            vertices = vertices.len(),
            facets = facets.len(),
            "validated boundary representation"
        );
        Ok(Region::from_boundary(boundary, tolerance)?)
    }

    fn first_intersection(&self, point: &Point3<f64>, direction: &Vector3<f64>) -> Option<SubPlane> {
        first_crossing(self.boundary_tree(), point, direction, self.tolerance())
    }
}

fn first_crossing(
    tree: &BoundaryTree<Euclidean3D>,
    point: &Point3<f64>,
    direction: &Vector3<f64>,
    tolerance: f64,
) -> Option<SubPlane> {
    let BspTree::Node(node) = tree else {
        return None;
    };
    let plane = node.hyperplane();
    let offset = plane.offset(point);
    let on_cut = offset.abs() <= tolerance;
    let (near, far) = if offset < 0.0 {
        (node.minus(), node.plus())
    } else {
        (node.plus(), node.minus())
    };

    if on_cut {
        if let Some(facet) = boundary_facet(point, node) {
            return Some(facet);
        }
    }

    if let Some(facet) = first_crossing(near, point, direction, tolerance) {
        return Some(facet);
    }

    if !on_cut {
        // only hits ahead of the starting point count
        let hit = plane.intersect_line(point, direction).filter(|(t, _)| *t > 0.0);
        if let Some(facet) = hit.and_then(|(_, hit)| boundary_facet(&hit, node)) {
            return Some(facet);
        }
    }

    first_crossing(far, point, direction, tolerance)
}

fn boundary_facet(point: &Point3<f64>, node: &BspNode<Euclidean3D, BoundaryAttribute<Euclidean3D>>) -> Option<SubPlane> {
    let in_plane = node.hyperplane().to_sub_space(point);
    let attribute = node.attribute();
    [attribute.plus_outside(), attribute.plus_inside()]
        .into_iter()
        .flatten()
        .find(|facet| facet.remaining().check_point(&in_plane) == Location::Inside)
        .cloned()
}
