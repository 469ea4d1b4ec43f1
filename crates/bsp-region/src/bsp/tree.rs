//! BSP tree container and the structural algorithms working on it.

use tracing::{trace, warn};

use crate::space::{Hyperplane, Location, Side, Space, SubHyperplane};

use super::node::{fit_to_cell, Ancestor, BspNode, Branch};
use super::visitor::{BspVisitor, Order};

/// A Binary Space Partitioning tree.
///
/// Every point of the space reaches exactly one leaf by following the
/// offset signs of the cut hyperplanes from the root. Leaves flag their
/// cell as inside (`true`) or outside (`false`); a tree reduced to a single
/// leaf is the whole space or the empty set.
///
/// # Merging
///
/// Set operations are expressed as [`merge`](BspTree::merge): one tree is
/// split by the cuts of the other and a [`LeafMerger`] decides what happens
/// whenever either side reaches a leaf.
///
/// ```ignore
/// let union = a.merge(b, &Operator::Or);
/// ```
#[derive(Debug, Clone)]
pub enum BspTree<S: Space, A = ()> {
    /// A cell with its inside flag.
    Leaf(bool),
    /// An internal node.
    Node(Box<BspNode<S, A>>),
}

impl<S: Space, A> Default for BspTree<S, A> {
    fn default() -> Self {
        BspTree::Leaf(true)
    }
}

/// Strategy deciding the subtree that replaces a leaf during a merge.
pub trait LeafMerger<S: Space> {
    /// Merges a leaf of one operand with the matching subtree of the other.
    ///
    /// `path` lists the ancestors of the position where the result will be
    /// attached. `leaf_from_first` tells which operand the leaf comes from.
    fn merge(&self, leaf: bool, tree: BspTree<S>, path: &[Ancestor<S>], leaf_from_first: bool) -> BspTree<S>;
}

impl<S: Space, A> BspTree<S, A> {
    /// Creates a node from its parts.
    pub fn node_with(cut: S::Sub, plus: Self, minus: Self, attribute: A) -> Self {
        BspTree::Node(Box::new(BspNode::with_attribute(cut, plus, minus, attribute)))
    }

    /// Returns `true` for a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BspTree::Leaf(_))
    }

    /// Returns the inside flag of a leaf, `None` for an internal node.
    #[inline]
    pub fn leaf_value(&self) -> Option<bool> {
        match self {
            BspTree::Leaf(inside) => Some(*inside),
            BspTree::Node(_) => None,
        }
    }

    /// Returns the root node, if the tree is not a single leaf.
    #[inline]
    pub fn root(&self) -> Option<&BspNode<S, A>> {
        match self {
            BspTree::Leaf(_) => None,
            BspTree::Node(node) => Some(node),
        }
    }

    /// Returns the cut of the root node, if any.
    #[inline]
    pub fn cut(&self) -> Option<&S::Sub> {
        self.root().map(BspNode::cut)
    }

    /// Returns `true` if no leaf is inside.
    pub fn is_empty(&self) -> bool {
        !self.any_leaf(true)
    }

    /// Returns `true` if no leaf is outside.
    pub fn is_full(&self) -> bool {
        !self.any_leaf(false)
    }

    fn any_leaf(&self, value: bool) -> bool {
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree {
                BspTree::Leaf(inside) if *inside == value => return true,
                BspTree::Leaf(_) => {}
                BspTree::Node(node) => {
                    stack.push(&node.plus);
                    stack.push(&node.minus);
                }
            }
        }
        false
    }

    /// Returns the maximum depth of the tree (0 for a single leaf).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0)];
        while let Some((tree, depth)) = stack.pop() {
            match tree {
                BspTree::Leaf(_) => deepest = deepest.max(depth),
                BspTree::Node(node) => {
                    stack.push((&node.plus, depth + 1));
                    stack.push((&node.minus, depth + 1));
                }
            }
        }
        deepest
    }

    /// Returns the number of internal nodes.
    pub fn node_count(&self) -> usize {
        self.leaf_count() - 1
    }

    /// Returns the number of leaves.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree {
                BspTree::Leaf(_) => count += 1,
                BspTree::Node(node) => {
                    stack.push(&node.plus);
                    stack.push(&node.minus);
                }
            }
        }
        count
    }

    /// Finds the cell containing a point.
    ///
    /// Descent stops at the first node whose cut hyperplane lies within
    /// `tolerance` of the point, so the result is either a leaf or a node
    /// the point sits on.
    pub fn cell(&self, point: &S::Point, tolerance: f64) -> &Self {
        let mut current = self;
        while let BspTree::Node(node) = current {
            let offset = node.hyperplane().offset(point);
            if offset.abs() <= tolerance {
                break;
            }
            current = if offset <= 0.0 { &node.minus } else { &node.plus };
        }
        current
    }

    /// Classifies a point against the inside leaves.
    ///
    /// A point lying on a cut is classified in both subtrees; it is on the
    /// boundary only when they disagree.
    pub fn classify(&self, point: &S::Point, tolerance: f64) -> Location {
        match self.cell(point, tolerance) {
            BspTree::Leaf(true) => Location::Inside,
            BspTree::Leaf(false) => Location::Outside,
            BspTree::Node(node) => {
                let minus = node.minus.classify(point, tolerance);
                let plus = node.plus.classify(point, tolerance);
                if minus == plus { minus } else { Location::Boundary }
            }
        }
    }

    /// Visits the tree, letting the visitor choose the order at every node.
    pub fn visit<V: BspVisitor<S, A>>(&self, visitor: &mut V) {
        enum Step<'a, S: Space, A> {
            Tree(&'a BspTree<S, A>),
            Cut(&'a BspNode<S, A>),
        }

        let mut stack = vec![Step::Tree(self)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Tree(BspTree::Leaf(inside)) => visitor.visit_leaf(*inside),
                Step::Tree(BspTree::Node(node)) => {
                    let node: &BspNode<S, A> = node;
                    let [first, second, third] = match visitor.visit_order(node) {
                        Order::PlusMinusSub => [Step::Tree(&node.plus), Step::Tree(&node.minus), Step::Cut(node)],
                        Order::PlusSubMinus => [Step::Tree(&node.plus), Step::Cut(node), Step::Tree(&node.minus)],
                        Order::MinusPlusSub => [Step::Tree(&node.minus), Step::Tree(&node.plus), Step::Cut(node)],
                        Order::MinusSubPlus => [Step::Tree(&node.minus), Step::Cut(node), Step::Tree(&node.plus)],
                        Order::SubPlusMinus => [Step::Cut(node), Step::Tree(&node.plus), Step::Tree(&node.minus)],
                        Order::SubMinusPlus => [Step::Cut(node), Step::Tree(&node.minus), Step::Tree(&node.plus)],
                    };
                    stack.push(third);
                    stack.push(second);
                    stack.push(first);
                }
                Step::Cut(node) => visitor.visit_internal_node(node),
            }
        }
    }

    /// Exchanges inside and outside leaves.
    pub fn complement(self) -> Self {
        match self {
            BspTree::Leaf(inside) => BspTree::Leaf(!inside),
            BspTree::Node(node) => {
                let BspNode {
                    cut,
                    plus,
                    minus,
                    attribute,
                } = *node;
                Self::node_with(cut, plus.complement(), minus.complement(), attribute)
            }
        }
    }

    /// Replaces a node whose children are leaves with the same flag by that
    /// leaf.
    pub fn condense(self) -> Self {
        match self {
            BspTree::Node(node) => match (&node.plus, &node.minus) {
                (BspTree::Leaf(p), BspTree::Leaf(m)) if p == m => BspTree::Leaf(*p),
                _ => BspTree::Node(node),
            },
            leaf => leaf,
        }
    }
}

impl<S: Space> BspTree<S> {
    /// Creates a partition node from its parts.
    pub fn node(cut: S::Sub, plus: Self, minus: Self) -> Self {
        Self::node_with(cut, plus, minus, ())
    }

    /// Splits the tree by a sub-hyperplane.
    ///
    /// The result is rooted at `sub`: its plus subtree describes the part of
    /// this tree on the plus side of `sub`, its minus subtree the part on
    /// the minus side. Nodes that no longer separate anything are condensed.
    pub fn split(&self, sub: &S::Sub) -> BspNode<S> {
        let node = match self {
            BspTree::Leaf(inside) => {
                return BspNode::new(sub.clone(), BspTree::Leaf(*inside), BspTree::Leaf(*inside));
            }
            BspTree::Node(node) => node,
        };

        let cut_hyperplane = node.hyperplane();
        let sub_hyperplane = sub.hyperplane();
        let sub_parts = sub.split(cut_hyperplane);

        match (sub_parts.plus, sub_parts.minus) {
            (Some(_), None) => {
                let mut split = node.plus.split(sub);
                if node.cut.side(sub_hyperplane) == Side::Plus {
                    let plus = std::mem::take(&mut split.plus);
                    split.plus = Self::node(node.cut.clone(), plus, node.minus.clone()).condense();
                } else {
                    let minus = std::mem::take(&mut split.minus);
                    split.minus = Self::node(node.cut.clone(), minus, node.minus.clone()).condense();
                }
                split
            }
            (None, Some(_)) => {
                let mut split = node.minus.split(sub);
                if node.cut.side(sub_hyperplane) == Side::Plus {
                    let plus = std::mem::take(&mut split.plus);
                    split.plus = Self::node(node.cut.clone(), node.plus.clone(), plus).condense();
                } else {
                    let minus = std::mem::take(&mut split.minus);
                    split.minus = Self::node(node.cut.clone(), node.plus.clone(), minus).condense();
                }
                split
            }
            (Some(sub_plus), Some(sub_minus)) => {
                let cut_parts = node.cut.split(sub_hyperplane);
                let on_plus = node.plus.split(&sub_plus);
                let on_minus = node.minus.split(&sub_minus);
                let (_, plus_plus, plus_minus) = on_plus.into_parts();
                let (_, minus_plus, minus_minus) = on_minus.into_parts();

                let plus_cut = cut_parts.plus.unwrap_or_else(|| {
                    trace!("cut vanished on the plus side of a crossing split");
                    node.cut.clone()
                });
                let minus_cut = cut_parts.minus.unwrap_or_else(|| {
                    trace!("cut vanished on the minus side of a crossing split");
                    node.cut.clone()
                });

                BspNode::new(
                    sub.clone(),
                    Self::node(plus_cut, plus_plus, minus_plus).condense(),
                    Self::node(minus_cut, plus_minus, minus_minus).condense(),
                )
            }
            (None, None) => {
                if cut_hyperplane.same_orientation_as(sub_hyperplane) {
                    BspNode::new(sub.clone(), node.plus.clone(), node.minus.clone())
                } else {
                    BspNode::new(sub.clone(), node.minus.clone(), node.plus.clone())
                }
            }
        }
    }

    /// Merges this tree with another one.
    ///
    /// The other tree is split by every cut of this tree; whenever either
    /// side reaches a leaf the `merger` decides the resulting subtree. Cuts
    /// of the result are refitted to their final cells.
    pub fn merge<M: LeafMerger<S>>(self, other: Self, merger: &M) -> Self {
        self.merge_at(other, merger, &mut Vec::new())
    }

    fn merge_at<M: LeafMerger<S>>(self, other: Self, merger: &M, path: &mut Vec<Ancestor<S>>) -> Self {
        let (node, other) = match (self, other) {
            (BspTree::Leaf(inside), other) => return merger.merge(inside, other, path, true),
            (this, BspTree::Leaf(inside)) => return merger.merge(inside, this, path, false),
            (BspTree::Node(node), other) => (node, other),
        };
        let (cut, plus, minus) = node.into_parts();
        let (_, other_plus, other_minus) = other.split(&cut).into_parts();
        let hyperplane = cut.hyperplane().clone();

        path.push(Ancestor::new(hyperplane.clone(), Branch::Plus));
        let merged_plus = plus.merge_at(other_plus, merger, path);
        if let Some(last) = path.last_mut() {
            last.branch = Branch::Minus;
        }
        let merged_minus = minus.merge_at(other_minus, merger, path);
        path.pop();

        match Self::node(cut, merged_plus, merged_minus).condense() {
            BspTree::Node(mut merged) => {
                match fit_to_cell(hyperplane.whole_hyperplane(), path) {
                    Some(fitted) => merged.cut = fitted,
                    None => trace!("refitted cut vanished, keeping the previous one"),
                }
                BspTree::Node(merged)
            }
            leaf => leaf,
        }
    }

    /// Restricts this tree to the cell described by `path`.
    ///
    /// Every cut is chopped to the cell. A cut that vanishes entirely is
    /// replaced by its children's common leaf when they agree, or by a
    /// `fallback` leaf otherwise.
    pub fn insert_in_tree(self, path: &[Ancestor<S>], fallback: bool) -> Self {
        self.insert_in_tree_with(path, &|_: &[Ancestor<S>]| fallback)
    }

    /// [`insert_in_tree`](BspTree::insert_in_tree) deciding each vanished
    /// cut separately: `fix` receives the cell of the dropped node, from the
    /// root of the enclosing tree down, and returns its inside flag.
    pub fn insert_in_tree_with<F>(self, path: &[Ancestor<S>], fix: &F) -> Self
    where
        F: Fn(&[Ancestor<S>]) -> bool,
    {
        if self.is_leaf() {
            return self;
        }
        let mut tree = self;
        for ancestor in path.iter().rev() {
            tree = tree.chop(ancestor, path, &mut Vec::new(), fix);
            if tree.is_leaf() {
                break;
            }
        }
        tree.condense()
    }

    fn chop<F>(self, ancestor: &Ancestor<S>, path: &[Ancestor<S>], inner: &mut Vec<Ancestor<S>>, fix: &F) -> Self
    where
        F: Fn(&[Ancestor<S>]) -> bool,
    {
        let node = match self {
            BspTree::Node(node) => node,
            leaf => return leaf,
        };
        let (cut, plus, minus) = node.into_parts();
        inner.push(Ancestor::new(cut.hyperplane().clone(), Branch::Plus));
        let plus = plus.chop(ancestor, path, inner, fix);
        if let Some(last) = inner.last_mut() {
            last.branch = Branch::Minus;
        }
        let minus = minus.chop(ancestor, path, inner, fix);
        inner.pop();

        match ancestor.chop(&cut) {
            Some(chopped) => Self::node(chopped, plus, minus),
            None => match (plus, minus) {
                (BspTree::Leaf(p), BspTree::Leaf(m)) if p == m => BspTree::Leaf(p),
                _ => {
                    let cell: Vec<Ancestor<S>> = path.iter().chain(inner.iter()).cloned().collect();
                    let inside = fix(&cell);
                    warn!(inside, "cut vanished while inserting a subtree, replacing it by a leaf");
                    BspTree::Leaf(inside)
                }
            },
        }
    }

    /// Position of the inside of this tree relative to a hyperplane.
    ///
    /// Returns `Hyper` when no inside cell reaches either side.
    pub fn side_of(&self, hyperplane: &S::Hyperplane) -> Side {
        let mut sides = Sides::default();
        self.recurse_sides(hyperplane.whole_hyperplane(), &mut sides);
        match (sides.plus, sides.minus) {
            (true, true) => Side::Both,
            (true, false) => Side::Plus,
            (false, true) => Side::Minus,
            (false, false) => Side::Hyper,
        }
    }

    fn recurse_sides(&self, sub: S::Sub, sides: &mut Sides) {
        let node = match self {
            BspTree::Leaf(true) => {
                sides.plus = true;
                sides.minus = true;
                return;
            }
            BspTree::Leaf(false) => return,
            BspTree::Node(node) => node,
        };

        let split = sub.split(node.hyperplane());
        let sub_hyperplane = sub.hyperplane();
        match (split.plus, split.minus) {
            (Some(_), None) => {
                if !node.minus.is_empty() {
                    sides.mark(node.cut.side(sub_hyperplane) == Side::Plus);
                }
                if !sides.both() {
                    node.plus.recurse_sides(sub, sides);
                }
            }
            (None, Some(_)) => {
                if !node.plus.is_empty() {
                    sides.mark(node.cut.side(sub_hyperplane) == Side::Plus);
                }
                if !sides.both() {
                    node.minus.recurse_sides(sub, sides);
                }
            }
            (Some(plus), Some(minus)) => {
                node.plus.recurse_sides(plus, sides);
                if !sides.both() {
                    node.minus.recurse_sides(minus, sides);
                }
            }
            (None, None) => {
                let same = node.hyperplane().same_orientation_as(sub_hyperplane);
                if !node.plus.is_empty() {
                    sides.mark(same);
                }
                if !node.minus.is_empty() {
                    sides.mark(!same);
                }
            }
        }
    }

    /// Part of a sub-hyperplane lying in inside cells.
    pub fn intersection(&self, sub: S::Sub) -> Option<S::Sub> {
        let node = match self {
            BspTree::Leaf(true) => return Some(sub),
            BspTree::Leaf(false) => return None,
            BspTree::Node(node) => node,
        };
        let split = sub.split(node.hyperplane());
        match (split.plus, split.minus) {
            (Some(plus), Some(minus)) => {
                match (node.plus.intersection(plus), node.minus.intersection(minus)) {
                    (Some(p), Some(m)) => Some(p.reunite(&m)),
                    (p, m) => p.or(m),
                }
            }
            (Some(_), None) => node.plus.intersection(sub),
            (None, Some(_)) => node.minus.intersection(sub),
            (None, None) => node
                .minus
                .intersection(sub)
                .and_then(|part| node.plus.intersection(part)),
        }
    }

    /// Maps every cut of the tree.
    ///
    /// Runs on an explicit stack, so any depth is accepted.
    pub fn map_cuts<F: Fn(&S::Sub) -> S::Sub>(&self, map: &F) -> Self {
        enum Step<'a, S: Space> {
            Tree(&'a BspTree<S>),
            Assemble(S::Sub),
        }

        let mut pending = vec![Step::Tree(self)];
        let mut built: Vec<Self> = Vec::new();
        while let Some(step) = pending.pop() {
            match step {
                Step::Tree(BspTree::Leaf(inside)) => built.push(BspTree::Leaf(*inside)),
                Step::Tree(BspTree::Node(node)) => {
                    pending.push(Step::Assemble(map(&node.cut)));
                    pending.push(Step::Tree(&node.minus));
                    pending.push(Step::Tree(&node.plus));
                }
                Step::Assemble(cut) => {
                    let minus = built.pop().unwrap_or_default();
                    let plus = built.pop().unwrap_or_default();
                    built.push(Self::node(cut, plus, minus));
                }
            }
        }
        built.pop().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct Sides {
    plus: bool,
    minus: bool,
}

impl Sides {
    fn mark(&mut self, plus: bool) {
        if plus {
            self.plus = true;
        } else {
            self.minus = true;
        }
    }

    fn both(&self) -> bool {
        self.plus && self.minus
    }
}
