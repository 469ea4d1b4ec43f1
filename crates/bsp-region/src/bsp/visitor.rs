//! Visitor pattern for BSP tree traversal.
//!
//! Visitors allow custom processing of nodes during tree traversal
//! without coupling traversal logic to specific use cases.

use crate::space::Space;

use super::node::BspNode;

/// Order in which a node's cut and its two subtrees are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Plus subtree, minus subtree, then the cut.
    PlusMinusSub,
    /// Plus subtree, the cut, then the minus subtree.
    PlusSubMinus,
    /// Minus subtree, plus subtree, then the cut.
    MinusPlusSub,
    /// Minus subtree, the cut, then the plus subtree.
    MinusSubPlus,
    /// The cut, plus subtree, then the minus subtree.
    SubPlusMinus,
    /// The cut, minus subtree, then the plus subtree.
    SubMinusPlus,
}

/// Visitor for processing nodes during BSP tree traversal.
///
/// Implement this trait to define custom behavior when traversing the tree.
/// Common uses include:
/// - Collecting cuts or boundary facets
/// - Summing boundary sizes
/// - Painter's-algorithm ordering relative to a viewpoint
pub trait BspVisitor<S: Space, A = ()> {
    /// Chooses the order for the children of `node`.
    fn visit_order(&mut self, node: &BspNode<S, A>) -> Order;

    /// Called for every internal node.
    fn visit_internal_node(&mut self, node: &BspNode<S, A>);

    /// Called for every leaf.
    fn visit_leaf(&mut self, _inside: bool) {}
}

/// A simple visitor that collects the cuts of all internal nodes.
#[derive(Debug)]
pub struct CollectingVisitor<S: Space> {
    order: Order,
    collected: Vec<S::Sub>,
}

impl<S: Space> Default for CollectingVisitor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Space> CollectingVisitor<S> {
    /// Creates a new empty collecting visitor visiting plus, cut, minus.
    pub fn new() -> Self {
        Self::with_order(Order::PlusSubMinus)
    }

    /// Creates a new empty collecting visitor with a fixed order.
    pub fn with_order(order: Order) -> Self {
        Self {
            order,
            collected: Vec::new(),
        }
    }

    /// Returns the collected cuts.
    pub fn into_cuts(self) -> Vec<S::Sub> {
        self.collected
    }

    /// Returns a reference to the collected cuts.
    pub fn cuts(&self) -> &[S::Sub] {
        &self.collected
    }
}

impl<S: Space, A> BspVisitor<S, A> for CollectingVisitor<S> {
    fn visit_order(&mut self, _node: &BspNode<S, A>) -> Order {
        self.order
    }

    fn visit_internal_node(&mut self, node: &BspNode<S, A>) {
        self.collected.push(node.cut().clone());
    }
}

/// A visitor that calls a closure for each internal node.
pub struct FnVisitor<F> {
    order: Order,
    func: F,
}

impl<F> FnVisitor<F> {
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self::with_order(Order::PlusSubMinus, func)
    }

    /// Creates a new visitor from a closure, with a fixed order.
    pub fn with_order(order: Order, func: F) -> Self {
        Self { order, func }
    }
}

impl<S, A, F> BspVisitor<S, A> for FnVisitor<F>
where
    S: Space,
    F: FnMut(&BspNode<S, A>),
{
    fn visit_order(&mut self, _node: &BspNode<S, A>) -> Order {
        self.order
    }

    fn visit_internal_node(&mut self, node: &BspNode<S, A>) {
        (self.func)(node);
    }
}
