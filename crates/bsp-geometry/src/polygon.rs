//! Regions of the plane.

use bsp_region::{factory, Embedding, Hyperplane, Region, RegionError, SubHyperplane};
use nalgebra::Point2;
use tracing::{debug, warn};

use crate::error::{GeometryError, GeometryResult};
use crate::line::{segments, Euclidean2D, Line, Segment};
use crate::oned::Intervals;

/// A region of the plane.
pub type PolygonsSet = Region<Euclidean2D>;

/// A connected chain of boundary vertices, with the inside on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLoop {
    /// Vertices in boundary order. Collinear middle vertices are dropped.
    pub vertices: Vec<Point2<f64>>,
    /// For a chain that comes from and returns to infinity, the lines
    /// carrying its first and last edges; `None` for a closed loop.
    pub ends: Option<(Line, Line)>,
}

impl VertexLoop {
    /// Returns `true` if the last vertex connects back to the first.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.ends.is_none()
    }
}

/// A maximal boundary piece along one line, in increasing abscissa order.
/// Infinite ends are `None`.
#[derive(Debug, Clone, Copy)]
struct Piece {
    line: Line,
    start: Option<Point2<f64>>,
    end: Option<Point2<f64>>,
}

fn boundary_pieces(region: &PolygonsSet) -> Vec<Piece> {
    let finite = |line: &Line, abscissa: f64| abscissa.is_finite().then(|| line.to_space(&abscissa));
    region
        .boundary()
        .iter()
        .flat_map(|facet| {
            let line = *facet.hyperplane();
            facet
                .remaining()
                .intervals()
                .into_iter()
                .map(move |interval| Piece {
                    line,
                    start: finite(&line, interval.lower()),
                    end: finite(&line, interval.upper()),
                })
        })
        .collect()
}

fn same_line(a: &Line, b: &Line) -> bool {
    a.same_orientation_as(b) && a.contains(&b.to_space(&0.0)) && a.contains(&b.to_space(&1.0))
}

/// Chains boundary pieces end to start. Chains starting at infinity are
/// followed first, so every open chain is complete before closed loops are
/// looked for among the remaining pieces.
fn chain_pieces(pieces: &[Piece], tolerance: f64) -> Vec<VertexLoop> {
    let close = |a: &Option<Point2<f64>>, b: &Point2<f64>| a.is_some_and(|a| (a - b).norm() <= tolerance);
    let mut used = vec![false; pieces.len()];
    let order = (0..pieces.len())
        .filter(|&i| pieces[i].start.is_none())
        .chain((0..pieces.len()).filter(|&i| pieces[i].start.is_some()));

    let mut loops = Vec::new();
    for first in order.collect::<Vec<_>>() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let mut chain = vec![first];
        let mut closed = false;
        while let Some(end) = pieces[chain[chain.len() - 1]].end {
            if chain.len() > 1 && close(&pieces[first].start, &end) {
                closed = true;
                break;
            }
            let next = (0..pieces.len())
                .filter(|&j| !used[j] && close(&pieces[j].start, &end))
                .min_by(|&a, &b| {
                    let gap = |j: usize| pieces[j].start.map_or(f64::INFINITY, |start| (start - end).norm());
                    gap(a).total_cmp(&gap(b))
                });
            let Some(next) = next else {
                warn!(pieces = chain.len(), "boundary chain stops at a finite vertex");
                break;
            };
            used[next] = true;
            chain.push(next);
        }
        loops.push(to_vertex_loop(pieces, &chain, closed));
    }
    loops
}

fn to_vertex_loop(pieces: &[Piece], chain: &[usize], closed: bool) -> VertexLoop {
    let count = chain.len();
    let mut vertices = Vec::with_capacity(count);
    if closed {
        // vertex k joins piece k - 1 to piece k
        for k in 0..count {
            let (previous, current) = (&pieces[chain[(k + count - 1) % count]], &pieces[chain[k]]);
            if let Some(start) = current.start.filter(|_| !same_line(&previous.line, &current.line)) {
                vertices.push(start);
            }
        }
        return VertexLoop { vertices, ends: None };
    }
    for pair in chain.windows(2) {
        let (current, next) = (&pieces[pair[0]], &pieces[pair[1]]);
        if let Some(end) = current.end.filter(|_| !same_line(&current.line, &next.line)) {
            vertices.push(end);
        }
    }
    let first = pieces[chain[0]];
    let last = pieces[chain[count - 1]];
    // a chain stopping at a finite vertex keeps its last point
    if let Some(end) = last.end {
        vertices.push(end);
    }
    VertexLoop {
        vertices,
        ends: Some((first.line, last.line)),
    }
}

/// Constructors and queries specific to regions of the plane.
pub trait Polygons: Sized {
    /// The polygon bounded by a closed vertex loop.
    ///
    /// Vertices run counter-clockwise around the inside; a clockwise loop
    /// describes the infinite region outside it.
    fn from_vertices(vertices: &[Point2<f64>], tolerance: f64) -> GeometryResult<Self>;

    /// The axis-aligned rectangle `[x_min, x_max] × [y_min, y_max]`.
    fn rectangle(x_min: f64, x_max: f64, y_min: f64, y_max: f64, tolerance: f64) -> GeometryResult<Self>;

    /// The bounded boundary segments, each with the inside on its left.
    fn segments(&self) -> Vec<Segment>;

    /// The boundary as vertex loops: closed loops around bounded parts and
    /// holes, open chains along the boundary of unbounded parts. Outer
    /// loops run counter-clockwise, holes clockwise.
    fn vertex_loops(&self) -> Vec<VertexLoop>;
}

impl Polygons for PolygonsSet {
    fn from_vertices(vertices: &[Point2<f64>], tolerance: f64) -> GeometryResult<Self> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices { count: vertices.len() });
        }
        let boundary = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(start, end)| Segment::new(*start, *end, tolerance).map(|segment| segment.to_sub_line()))
            .collect::<GeometryResult<Vec<_>>>()?;
        debug!(vertices = vertices.len(), "building polygon from vertex loop");
        Ok(Region::from_boundary(boundary, tolerance)?)
    }

    fn rectangle(x_min: f64, x_max: f64, y_min: f64, y_max: f64, tolerance: f64) -> GeometryResult<Self> {
        for (lower, upper) in [(x_min, x_max), (y_min, y_max)] {
            if !(lower <= upper) {
                return Err(RegionError::EndpointsNotAnInterval { lower, upper }.into());
            }
        }
        // plus sides face away from the rectangle
        let sides = [
            Line::from_coefficients(-1.0, 0.0, x_min, tolerance)?,
            Line::from_coefficients(1.0, 0.0, -x_max, tolerance)?,
            Line::from_coefficients(0.0, -1.0, y_min, tolerance)?,
            Line::from_coefficients(0.0, 1.0, -y_max, tolerance)?,
        ];
        Ok(factory::build_convex(&sides)?)
    }

    fn segments(&self) -> Vec<Segment> {
        self.boundary().iter().flat_map(segments).collect()
    }

    fn vertex_loops(&self) -> Vec<VertexLoop> {
        let loops = chain_pieces(&boundary_pieces(self), self.tolerance());
        debug!(loops = loops.len(), "extracted vertex loops");
        loops
    }
}
