//! Boolean algebra on regions.
//!
//! Every operation builds a new tree; the operands are never modified, so
//! results can be chained freely and earlier regions stay valid. Results
//! carry the tolerance of the first operand and are checked against the
//! space's consistency rules before being returned.

use tracing::debug;

use crate::bsp::{Ancestor, BspBuilder, BspTree, Branch, LeafMerger};
use crate::config::{RegionConfig, DEFAULT_TOLERANCE};
use crate::error::RegionResult;
use crate::region::Region;
use crate::space::{Hyperplane, Location, Side, Space};

/// Boolean operator applied by [`merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Intersection.
    And,
    /// Union.
    Or,
    /// Difference: inside the first operand and outside the second.
    AndNot,
    /// Symmetric difference.
    Xor,
}

impl<S: Space> LeafMerger<S> for Operator {
    fn merge(&self, leaf: bool, tree: BspTree<S>, path: &[Ancestor<S>], leaf_from_first: bool) -> BspTree<S> {
        let (merged, fallback) = match self {
            Operator::Or if leaf => (BspTree::Leaf(true), true),
            Operator::Or => (tree, false),
            Operator::And if leaf => (tree, true),
            Operator::And => (BspTree::Leaf(false), false),
            Operator::Xor if leaf => (tree.complement(), true),
            Operator::Xor => (tree, true),
            Operator::AndNot => and_not(leaf, tree, leaf_from_first),
        };
        merged.insert_in_tree(path, fallback)
    }
}

/// Difference leaf rule: the subtree to keep and the flag for cuts that
/// vanish while it is inserted.
fn and_not<S: Space>(leaf: bool, tree: BspTree<S>, leaf_from_first: bool) -> (BspTree<S>, bool) {
    match (leaf, leaf_from_first) {
        (true, true) => (tree.complement(), true),
        (true, false) => (BspTree::Leaf(false), true),
        (false, true) => (BspTree::Leaf(false), false),
        (false, false) => (tree, false),
    }
}

/// Difference of two regions that settles vanished cuts geometrically.
///
/// When a cut of the inserted subtree falls outside its cell, the cell is
/// classified by a representative point: inside the result only if that
/// point is inside `first` and outside `second`.
#[derive(Debug)]
pub struct DifferenceMerger<'a, S: Space> {
    first: &'a Region<S>,
    second: &'a Region<S>,
}

impl<'a, S: Space> DifferenceMerger<'a, S> {
    /// Merger computing `first` minus `second`.
    pub fn new(first: &'a Region<S>, second: &'a Region<S>) -> Self {
        Self { first, second }
    }

    fn inside_cell(&self, cell: &[Ancestor<S>]) -> bool {
        let hyperplanes: Vec<S::Hyperplane> = cell
            .iter()
            .map(|step| match step.branch {
                Branch::Minus => step.hyperplane.clone(),
                Branch::Plus => step.hyperplane.reversed(),
            })
            .collect();
        let Ok(region) = build_convex::<S>(&hyperplanes) else {
            return false;
        };
        let point = region.barycenter();
        self.first.check_point(&point) == Location::Inside && self.second.check_point(&point) == Location::Outside
    }
}

impl<S: Space> LeafMerger<S> for DifferenceMerger<'_, S> {
    fn merge(&self, leaf: bool, tree: BspTree<S>, path: &[Ancestor<S>], leaf_from_first: bool) -> BspTree<S> {
        let (merged, _) = and_not(leaf, tree, leaf_from_first);
        merged.insert_in_tree_with(path, &|cell: &[Ancestor<S>]| self.inside_cell(cell))
    }
}

/// Merges two regions with a boolean operator.
pub fn merge<S: Space>(a: &Region<S>, b: &Region<S>, operator: Operator) -> RegionResult<Region<S>> {
    merge_with_config(a, b, operator, &RegionConfig::default())
}

/// Merges two regions, rejecting operands deeper than the configured limit.
pub fn merge_with_config<S: Space>(
    a: &Region<S>,
    b: &Region<S>,
    operator: Operator,
    config: &RegionConfig,
) -> RegionResult<Region<S>> {
    config.check_depth(a.tree().depth())?;
    config.check_depth(b.tree().depth())?;
    debug!(
        space = S::NAME,
        ?operator,
        left_nodes = a.tree().node_count(),
        right_nodes = b.tree().node_count(),
        "merging regions"
    );
    let tree = match operator {
        Operator::AndNot => a.tree().clone().merge(b.tree().clone(), &DifferenceMerger::new(a, b)),
        _ => a.tree().clone().merge(b.tree().clone(), &operator),
    };
    Region::from_tree_with(tree, &config.with_tolerance(a.tolerance()))
}

/// Points inside either region.
pub fn union<S: Space>(a: &Region<S>, b: &Region<S>) -> RegionResult<Region<S>> {
    merge(a, b, Operator::Or)
}

/// Points inside both regions.
pub fn intersection<S: Space>(a: &Region<S>, b: &Region<S>) -> RegionResult<Region<S>> {
    merge(a, b, Operator::And)
}

/// Points inside `a` but not inside `b`.
pub fn difference<S: Space>(a: &Region<S>, b: &Region<S>) -> RegionResult<Region<S>> {
    merge(a, b, Operator::AndNot)
}

/// Points inside exactly one of the regions.
pub fn xor<S: Space>(a: &Region<S>, b: &Region<S>) -> RegionResult<Region<S>> {
    merge(a, b, Operator::Xor)
}

/// [`union`] with an explicit configuration.
pub fn union_with_config<S: Space>(a: &Region<S>, b: &Region<S>, config: &RegionConfig) -> RegionResult<Region<S>> {
    merge_with_config(a, b, Operator::Or, config)
}

/// [`intersection`] with an explicit configuration.
pub fn intersection_with_config<S: Space>(
    a: &Region<S>,
    b: &Region<S>,
    config: &RegionConfig,
) -> RegionResult<Region<S>> {
    merge_with_config(a, b, Operator::And, config)
}

/// [`difference`] with an explicit configuration.
pub fn difference_with_config<S: Space>(
    a: &Region<S>,
    b: &Region<S>,
    config: &RegionConfig,
) -> RegionResult<Region<S>> {
    merge_with_config(a, b, Operator::AndNot, config)
}

/// [`xor`] with an explicit configuration.
pub fn xor_with_config<S: Space>(a: &Region<S>, b: &Region<S>, config: &RegionConfig) -> RegionResult<Region<S>> {
    merge_with_config(a, b, Operator::Xor, config)
}

/// Points outside the region.
pub fn complement<S: Space>(region: &Region<S>) -> RegionResult<Region<S>> {
    debug!(space = S::NAME, nodes = region.tree().node_count(), "complementing region");
    Region::from_tree_with(region.tree().clone().complement(), region.config())
}

/// Union of any number of regions, reduced pairwise.
///
/// An empty list gives the empty region with the default tolerance.
pub fn union_all<S: Space>(regions: &[Region<S>]) -> RegionResult<Region<S>> {
    union_all_with_config(regions, &RegionConfig::default())
}

/// [`union_all`] with an explicit configuration.
pub fn union_all_with_config<S: Space>(regions: &[Region<S>], config: &RegionConfig) -> RegionResult<Region<S>> {
    debug!(space = S::NAME, count = regions.len(), "uniting regions");
    let mut level: Vec<Region<S>> = regions.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            match pair {
                [a, b] => next.push(union_with_config(a, b, config)?),
                [single] => next.push(single.clone()),
                _ => {}
            }
        }
        level = next;
    }
    Ok(level
        .pop()
        .unwrap_or_else(|| Region::empty(DEFAULT_TOLERANCE)))
}

/// Intersection of the minus half-spaces of the given hyperplanes.
///
/// Hyperplanes that do not cut the region built so far are skipped when
/// the region lies on their minus side; when it lies entirely on the plus
/// side of one of them the result is empty. An empty list gives the whole
/// space.
pub fn build_convex<S: Space>(hyperplanes: &[S::Hyperplane]) -> RegionResult<Region<S>> {
    let Some(first) = hyperplanes.first() else {
        return Ok(Region::full(DEFAULT_TOLERANCE));
    };
    let tolerance = first.tolerance();

    let mut builder = BspBuilder::<S>::new(true);
    let mut cursor: Vec<Branch> = Vec::new();
    for hyperplane in hyperplanes {
        if builder.insert_cut(&cursor, hyperplane)? {
            cursor.push(Branch::Plus);
            builder.set_leaf(&cursor, false)?;
            cursor.pop();
            cursor.push(Branch::Minus);
        } else if builder.tree().side_of(hyperplane) == Side::Plus {
            debug!(space = S::NAME, "convex region vanished");
            return Ok(Region::empty(tolerance));
        }
    }
    debug!(space = S::NAME, depth = cursor.len(), "built convex region");
    Region::from_tree(builder.build(), tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegionError;
    use crate::space::Location;
    use crate::testing::{cut, interval, Line1};
    use approx::assert_relative_eq;

    fn sample(region: &Region<Line1>) -> Vec<Location> {
        (-10..=50).map(|i| region.check_point(&(f64::from(i) * 0.1 + 0.05))).collect()
    }

    #[test]
    fn union_of_overlapping_intervals() {
        let u = union(&interval(0.0, 2.0), &interval(1.0, 3.0)).unwrap();

        assert_relative_eq!(u.size(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(u.barycenter(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn union_of_disjoint_intervals() {
        let u = union(&interval(0.0, 1.0), &interval(2.0, 3.0)).unwrap();

        assert_relative_eq!(u.size(), 2.0, epsilon = 1e-12);
        assert_eq!(u.check_point(&1.5), Location::Outside);
        assert_eq!(u.boundary().len(), 4);
    }

    #[test]
    fn intersection_of_overlapping_intervals() {
        let i = intersection(&interval(0.0, 2.0), &interval(1.0, 3.0)).unwrap();

        assert_relative_eq!(i.size(), 1.0, epsilon = 1e-12);
        assert_eq!(i.check_point(&1.5), Location::Inside);
        assert_eq!(i.check_point(&0.5), Location::Outside);
    }

    #[test]
    fn difference_of_intervals() {
        let d = difference(&interval(0.0, 4.0), &interval(1.0, 3.0)).unwrap();

        assert_relative_eq!(d.size(), 2.0, epsilon = 1e-12);
        assert_eq!(d.check_point(&2.0), Location::Outside);
        assert_eq!(d.check_point(&0.5), Location::Inside);
        assert_eq!(d.check_point(&3.5), Location::Inside);
    }

    #[test]
    fn difference_classifies_vanished_cells() {
        let first = interval(0.0, 10.0);
        let second = interval(5.0, 9.0);
        // cell (6, 8): below 8, above 6
        let path = vec![
            Ancestor::<Line1>::new(cut(8.0, true), Branch::Minus),
            Ancestor::<Line1>::new(cut(6.0, false), Branch::Minus),
        ];
        let crossing = || BspTree::node(cut(2.0, true).whole_hyperplane(), BspTree::Leaf(true), BspTree::Leaf(false));

        let constant = Operator::AndNot.merge(true, crossing(), &path, true);
        let fixed = DifferenceMerger::new(&first, &second).merge(true, crossing(), &path, true);

        assert_eq!(constant.leaf_value(), Some(true));
        // 7 lies inside both operands
        assert_eq!(fixed.leaf_value(), Some(false));
    }

    #[test]
    fn xor_of_intervals() {
        let x = xor(&interval(0.0, 2.0), &interval(1.0, 3.0)).unwrap();

        assert_relative_eq!(x.size(), 2.0, epsilon = 1e-12);
        assert_eq!(x.check_point(&1.5), Location::Outside);
        assert_eq!(x.check_point(&0.5), Location::Inside);
        assert_eq!(x.check_point(&2.5), Location::Inside);
    }

    #[test]
    fn algebraic_laws_on_samples() {
        let a = interval(0.0, 2.5);
        let b = interval(1.5, 4.0);

        assert_eq!(sample(&union(&a, &b).unwrap()), sample(&union(&b, &a).unwrap()));
        assert_eq!(
            sample(&intersection(&a, &b).unwrap()),
            sample(&intersection(&b, &a).unwrap())
        );
        assert_eq!(sample(&complement(&complement(&a).unwrap()).unwrap()), sample(&a));
        assert_eq!(
            sample(&difference(&a, &b).unwrap()),
            sample(&intersection(&a, &complement(&b).unwrap()).unwrap())
        );

        let not_a = complement(&a).unwrap();
        assert!(sample(&union(&a, &not_a).unwrap()).iter().all(|l| *l != Location::Outside));
        assert!(sample(&intersection(&a, &not_a).unwrap()).iter().all(|l| *l != Location::Inside));
    }

    #[test]
    fn complement_of_interval() {
        let c = complement(&interval(1.0, 3.0)).unwrap();

        assert_eq!(c.size(), f64::INFINITY);
        assert_eq!(c.check_point(&2.0), Location::Outside);
        assert_eq!(c.check_point(&1.0), Location::Boundary);
    }

    #[test]
    fn union_all_reduces_pairwise() {
        let regions: Vec<_> = (0..5).map(|i| interval(f64::from(2 * i), f64::from(2 * i + 1))).collect();
        let u = union_all(&regions).unwrap();

        assert_relative_eq!(u.size(), 5.0, epsilon = 1e-12);
        assert!(union_all::<Line1>(&[]).unwrap().is_empty());
    }

    #[test]
    fn depth_limit_is_enforced() {
        let config = RegionConfig::default().with_max_depth(1);
        let result = union_with_config(&interval(0.0, 1.0), &interval(2.0, 3.0), &config);

        assert_eq!(result.err(), Some(RegionError::DepthLimitExceeded { depth: 2, limit: 1 }));
    }

    #[test]
    fn convex_from_two_half_lines() {
        let region = build_convex::<Line1>(&[cut(3.0, true), cut(1.0, false)]).unwrap();

        assert_relative_eq!(region.size(), 2.0, epsilon = 1e-12);
        assert_eq!(region.check_point(&2.0), Location::Inside);
    }

    #[test]
    fn convex_skips_redundant_hyperplanes() {
        let region = build_convex::<Line1>(&[cut(3.0, true), cut(5.0, true), cut(1.0, false)]).unwrap();

        assert_relative_eq!(region.size(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn convex_with_disjoint_half_lines_is_empty() {
        let region = build_convex::<Line1>(&[cut(1.0, true), cut(3.0, false)]).unwrap();
        assert!(region.is_empty());
    }

    #[test]
    fn convex_with_opposite_hyperplanes_is_empty() {
        let region = build_convex::<Line1>(&[cut(1.0, true), cut(1.0, false)]).unwrap();
        assert!(region.is_empty());
    }

    #[test]
    fn convex_of_nothing_is_full() {
        assert!(build_convex::<Line1>(&[]).unwrap().is_full());
    }
}
