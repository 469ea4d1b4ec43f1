//! Regions: immutable BSP trees with a tolerance and lazily computed
//! geometric properties.

use std::sync::OnceLock;

use tracing::debug;

use crate::boundary::{boundary_tree, BoundaryAttribute, BoundaryTree};
use crate::bsp::{fit_to_cell, Ancestor, BspNode, BspTree, Branch, CutSelector, FnVisitor, LargestFirst};
use crate::config::RegionConfig;
use crate::error::{RegionError, RegionResult};
use crate::factory;
use crate::space::{Hyperplane, Location, Measure, Side, Space, SubHyperplane, Transform};

/// A region of a space, represented by a BSP tree.
///
/// Regions never change once built. Size, barycenter and boundary are
/// computed on first use and cached.
#[derive(Debug, Clone)]
pub struct Region<S: Space> {
    tree: BspTree<S>,
    config: RegionConfig,
    measure: OnceLock<Measure<S>>,
    boundary: OnceLock<BoundaryTree<S>>,
    boundary_size: OnceLock<f64>,
}

/// The two parts of a region on either side of a sub-hyperplane.
#[derive(Debug, Clone)]
pub struct SplitRegion<S: Space> {
    /// Part on the plus side, `None` when empty.
    pub plus: Option<Region<S>>,
    /// Part on the minus side, `None` when empty.
    pub minus: Option<Region<S>>,
}

impl<S: Space> Region<S> {
    /// The whole space.
    pub fn full(tolerance: f64) -> Self {
        Self::from_tree_unchecked(BspTree::Leaf(true), tolerance)
    }

    /// The empty region.
    pub fn empty(tolerance: f64) -> Self {
        Self::from_tree_unchecked(BspTree::Leaf(false), tolerance)
    }

    /// Wraps a tree, checking its depth and the space's consistency rules.
    pub fn from_tree(tree: BspTree<S>, tolerance: f64) -> RegionResult<Self> {
        Self::from_tree_with(tree, &RegionConfig::default().with_tolerance(tolerance))
    }

    /// [`from_tree`](Region::from_tree) with explicit settings.
    pub fn from_tree_with(tree: BspTree<S>, config: &RegionConfig) -> RegionResult<Self> {
        config.check_depth(tree.depth())?;
        S::check_consistency(&tree)?;
        Ok(Self::with_config(tree, *config))
    }

    /// Wraps a tree without any check.
    ///
    /// Only periodic spaces have consistency rules; for other spaces, and for
    /// shallow trees derived from regions that were already checked, this
    /// is equivalent to [`from_tree`](Region::from_tree).
    pub fn from_tree_unchecked(tree: BspTree<S>, tolerance: f64) -> Self {
        Self::with_config(tree, RegionConfig::default().with_tolerance(tolerance))
    }

    fn with_config(tree: BspTree<S>, config: RegionConfig) -> Self {
        Self {
            tree,
            config,
            measure: OnceLock::new(),
            boundary: OnceLock::new(),
            boundary_size: OnceLock::new(),
        }
    }

    /// Builds a region from the sub-hyperplanes bounding it.
    ///
    /// Every element must have the inside of the region on its minus side.
    /// An empty boundary yields the whole space.
    pub fn from_boundary(boundary: Vec<S::Sub>, tolerance: f64) -> RegionResult<Self> {
        Self::from_boundary_with(boundary, &RegionConfig::default().with_tolerance(tolerance), &LargestFirst)
    }

    /// Builds a region from its boundary, with explicit settings and cut
    /// selection strategy.
    ///
    /// Construction stops with [`RegionError::DepthLimitExceeded`] as soon
    /// as the tree would grow deeper than `config.max_depth`.
    pub fn from_boundary_with<C: CutSelector<S>>(
        boundary: Vec<S::Sub>,
        config: &RegionConfig,
        selector: &C,
    ) -> RegionResult<Self> {
        let count = boundary.len();
        let tree = insert_cuts(boundary, selector, config.max_depth)?;
        debug!(space = S::NAME, elements = count, depth = tree.depth(), "built tree from boundary");
        Self::from_tree_with(tree, config)
    }

    /// Returns the underlying tree.
    #[inline]
    pub fn tree(&self) -> &BspTree<S> {
        &self.tree
    }

    /// Returns the tolerance.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    /// Returns the settings the region was built with.
    #[inline]
    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Classifies a point.
    pub fn check_point(&self, point: &S::Point) -> Location {
        let tolerance = self.tolerance();
        self.tree.classify(&S::canonical_point(point, tolerance), tolerance)
    }

    /// Returns `true` if the region contains nothing.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns `true` if the region covers the whole space.
    pub fn is_full(&self) -> bool {
        self.tree.is_full()
    }

    /// Returns `true` if `other` lies entirely inside this region.
    pub fn contains(&self, other: &Region<S>) -> RegionResult<bool> {
        Ok(factory::difference(other, self)?.is_empty())
    }

    /// Size and barycenter of the region.
    pub fn measure(&self) -> &Measure<S> {
        self.measure.get_or_init(|| S::measure(self))
    }

    /// Length, area or volume; `+inf` for unbounded regions.
    pub fn size(&self) -> f64 {
        self.measure().size
    }

    /// Center of mass; the space's NaN point when undefined.
    pub fn barycenter(&self) -> S::Point {
        self.measure().barycenter.clone()
    }

    /// Tree whose nodes carry the boundary parts of their cuts.
    pub fn boundary_tree(&self) -> &BoundaryTree<S> {
        self.boundary.get_or_init(|| boundary_tree(&self.tree))
    }

    /// Total size of the boundary.
    pub fn boundary_size(&self) -> f64 {
        *self.boundary_size.get_or_init(|| {
            let mut size = 0.0;
            self.boundary_tree()
                .visit(&mut FnVisitor::new(|node: &BspNode<S, BoundaryAttribute<S>>| {
                    size += node.attribute().size();
                }));
            size
        })
    }

    /// The boundary as a list of facets, each with the inside of the region
    /// on its minus side.
    pub fn boundary(&self) -> Vec<S::Sub> {
        let mut facets = Vec::new();
        self.boundary_tree()
            .visit(&mut FnVisitor::new(|node: &BspNode<S, BoundaryAttribute<S>>| {
                let attribute = node.attribute();
                if let Some(outside) = attribute.plus_outside() {
                    facets.push(outside.clone());
                }
                if let Some(inside) = attribute.plus_inside() {
                    facets.push(inside.reversed());
                }
            }));
        facets
    }

    /// Position of the region relative to a hyperplane.
    pub fn side(&self, hyperplane: &S::Hyperplane) -> Side {
        self.tree.side_of(hyperplane)
    }

    /// Part of a sub-hyperplane lying inside the region.
    pub fn intersection(&self, sub: &S::Sub) -> Option<S::Sub> {
        self.tree.intersection(sub.clone())
    }

    /// Splits the region by the hyperplane carrying `sub`.
    ///
    /// Each part is the intersection of the region with one open half-space;
    /// an empty part is reported as `None`. Trees deeper than the region's
    /// depth limit are rejected before the recursive split runs.
    pub fn split(&self, sub: &S::Sub) -> RegionResult<SplitRegion<S>> {
        self.config.check_depth(self.tree.depth())?;
        let whole = sub.hyperplane().whole_hyperplane();
        let (_, plus, minus) = self.tree.split(&whole).into_parts();
        let wrap = |tree: BspTree<S>, branch: Branch| {
            if tree.is_empty() {
                return None;
            }
            let tree = match branch {
                Branch::Plus => BspTree::node(whole.clone(), tree, BspTree::Leaf(false)),
                Branch::Minus => BspTree::node(whole.clone(), BspTree::Leaf(false), tree),
            };
            Some(self.derived(tree))
        };
        Ok(SplitRegion {
            plus: wrap(plus, Branch::Plus),
            minus: wrap(minus, Branch::Minus),
        })
    }

    /// Applies a transform to every cut. The tree keeps its shape.
    pub fn transform<T: Transform<S>>(&self, transform: &T) -> Region<S> {
        self.derived(self.tree.map_cuts(&|cut: &S::Sub| transform.apply_sub(cut)))
    }

    fn derived(&self, tree: BspTree<S>) -> Self {
        Self::with_config(tree, self.config)
    }
}

/// Work items of the boundary insertion.
enum Task<S: Space> {
    /// Builds the subtree of a cell from the elements lying in it; `step`
    /// leads from the parent cell into this one.
    Cell {
        elements: Vec<S::Sub>,
        depth: usize,
        step: Option<Ancestor<S>>,
    },
    /// Joins the two most recently built subtrees under a cut.
    Join(S::Sub),
}

/// Builds the tree of a boundary, depth first on an explicit stack.
///
/// Leaves reached on a plus side are outside, leaves reached on a minus side
/// inside; an empty boundary gives the inside root leaf.
fn insert_cuts<S: Space, C: CutSelector<S>>(
    boundary: Vec<S::Sub>,
    selector: &C,
    max_depth: usize,
) -> RegionResult<BspTree<S>> {
    let mut path: Vec<Ancestor<S>> = Vec::new();
    let mut built: Vec<BspTree<S>> = Vec::new();
    let mut tasks = vec![Task::Cell {
        elements: boundary,
        depth: 0,
        step: None,
    }];

    while let Some(task) = tasks.pop() {
        let (mut elements, depth, step) = match task {
            Task::Join(cut) => {
                let minus = built.pop().unwrap_or_default();
                let plus = built.pop().unwrap_or_default();
                built.push(BspTree::node(cut, plus, minus));
                continue;
            }
            Task::Cell { elements, depth, step } => (elements, depth, step),
        };

        // siblings share the path above them
        path.truncate(depth.saturating_sub(1));
        let inside = step.as_ref().is_none_or(|step| step.branch == Branch::Minus);
        path.extend(step);

        let chosen = loop {
            let Some(index) = selector.select(&elements) else {
                break None;
            };
            let candidate = elements.remove(index).hyperplane().clone();
            let fitted = fit_to_cell(candidate.whole_hyperplane(), &path).filter(|sub| !sub.is_empty());
            if let Some(cut) = fitted {
                break Some((candidate, cut));
            }
        };
        let Some((hyperplane, cut)) = chosen else {
            built.push(BspTree::Leaf(inside));
            continue;
        };
        if depth + 1 > max_depth {
            return Err(RegionError::DepthLimitExceeded {
                depth: depth + 1,
                limit: max_depth,
            });
        }

        let mut plus_elements = Vec::new();
        let mut minus_elements = Vec::new();
        for element in elements {
            let split = element.split(&hyperplane);
            match (split.plus, split.minus) {
                (Some(plus), Some(minus)) => {
                    plus_elements.push(plus);
                    minus_elements.push(minus);
                }
                (Some(_), None) => plus_elements.push(element),
                (None, Some(_)) => minus_elements.push(element),
                (None, None) => {}
            }
        }

        tasks.push(Task::Join(cut));
        tasks.push(Task::Cell {
            elements: minus_elements,
            depth: depth + 1,
            step: Some(Ancestor::new(hyperplane.clone(), Branch::Minus)),
        });
        tasks.push(Task::Cell {
            elements: plus_elements,
            depth: depth + 1,
            step: Some(Ancestor::new(hyperplane, Branch::Plus)),
        });
    }
    Ok(built.pop().unwrap_or_default())
}
