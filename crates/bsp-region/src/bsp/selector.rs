//! Cut selection strategies for building trees from a boundary.
//!
//! The choice of the next cut affects tree balance and the number of
//! boundary elements split during construction. Large elements first keep
//! the tree shallow for typical polygon and polyhedron boundaries.

use crate::space::{Space, SubHyperplane};

/// Strategy for selecting which boundary element's hyperplane to use as the
/// next cut.
pub trait CutSelector<S: Space> {
    /// Select an element from the slice to use as the next cut.
    ///
    /// Returns `None` if the slice is empty.
    /// The returned index must address an element of the provided slice.
    fn select(&self, elements: &[S::Sub]) -> Option<usize>;
}

/// Selects the largest remaining element.
///
/// Ties keep input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFirst;

impl<S: Space> CutSelector<S> for LargestFirst {
    fn select(&self, elements: &[S::Sub]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, element) in elements.iter().enumerate() {
            let size = element.size();
            match best {
                Some((_, largest)) if size <= largest => {}
                _ => best = Some((index, size)),
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Selects the first element in the list.
///
/// This is the simplest and fastest selector, but may produce unbalanced
/// trees depending on input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstInList;

impl<S: Space> CutSelector<S> for FirstInList {
    fn select(&self, elements: &[S::Sub]) -> Option<usize> {
        if elements.is_empty() { None } else { Some(0) }
    }
}
