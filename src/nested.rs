//! L3: the nested diff driver. Recurses into container-shaped elements,
//! building per-position nested diffs, and detects cycles along the way.

use std::cell::RefCell;
use std::collections::HashSet;

use ahash::RandomState;

use crate::budget::NestedBudgets;
use crate::chunk::{Chunk, Diff, NestedItem};
use crate::error::DiffError;
use crate::myers::Similarity;

/// A value that may itself be a sequence of further [`Nestable`] values.
///
/// Implement this on the element type of the outer sequence passed to
/// [`diff_nested`]. Returning `None` marks a leaf, compared with
/// [`PartialEq`]; returning `Some(children)` tells the driver to recurse
/// into `children` exactly as it recursed into the outer sequence.
pub trait Nestable: Clone + PartialEq {
    /// This value's children, if it is itself a nested sequence.
    fn children(&self) -> Option<&[Self]>;
}

#[derive(Clone, Default)]
struct Visited {
    a: HashSet<usize, RandomState>,
    b: HashSet<usize, RandomState>,
}

fn identity_key<T>(slice: &[T]) -> usize {
    slice.as_ptr() as usize
}

/// Diffs two sequences of [`Nestable`] elements, recursing into elements
/// that are themselves sequences and building [`crate::chunk::ChunkEq::Nested`]
/// chunks for the ones that differ.
///
/// `max_depth` bounds how many levels deep the driver recurses before it
/// falls back to a flat, non-recursive diff of whatever it finds at that
/// depth. Every level's budgets come from popping one level off `budgets`
/// (see [`NestedBudgets::pop`]); the tail is carried one level deeper.
///
/// # Errors
/// Returns [`DiffError::RecursiveInput`] if the very same underlying slice
/// (by pointer identity) is reached twice along one recursion path — this
/// guards against caller-defined [`Nestable`] implementations that expose
/// genuinely cyclic structures (e.g. backed by `Rc<RefCell<_>>`); it can
/// never trigger for ordinary owned-`Vec` trees, which are acyclic by
/// construction.
pub fn diff_nested<T: Nestable>(
    a: &[T],
    b: &[T],
    budgets: NestedBudgets,
    eq_only: bool,
    max_depth: usize,
) -> Result<Diff<T>, DiffError> {
    diff_nested_level(a, b, budgets, eq_only, max_depth.max(1), &Visited::default())
}

fn diff_nested_level<T: Nestable>(
    a: &[T],
    b: &[T],
    budgets: NestedBudgets,
    eq_only: bool,
    max_depth: usize,
    visited: &Visited,
) -> Result<Diff<T>, DiffError> {
    let (here, tail, accept) = budgets.pop();

    if max_depth <= 1 {
        let mut oracle = Similarity::Pair(a, b);
        return Ok(crate::sequence::diff(
            a, b, &mut oracle, accept, here, eq_only, None, true,
        ));
    }

    let key_a = identity_key(a);
    let key_b = identity_key(b);
    if (!a.is_empty() && visited.a.contains(&key_a)) || (!b.is_empty() && visited.b.contains(&key_b)) {
        return Err(DiffError::RecursiveInput);
    }
    let mut child_visited = visited.clone();
    child_visited.a.insert(key_a);
    child_visited.b.insert(key_b);

    let eq_error: RefCell<Option<DiffError>> = RefCell::new(None);
    let mut eq_cb = |i: usize, j: usize| -> f64 {
        match element_ratio(&a[i], &b[j], &tail, max_depth - 1, &child_visited) {
            Ok(r) => r,
            Err(e) => {
                *eq_error.borrow_mut() = Some(e);
                0.0
            }
        }
    };
    let mut oracle = Similarity::Callback(&mut eq_cb);

    let dig_error: RefCell<Option<DiffError>> = RefCell::new(None);
    let mut dig_cb = |i: usize, j: usize| -> NestedItem<T> {
        match diff_pair(&a[i], &b[j], &tail, max_depth - 1, &child_visited) {
            Ok(None) => NestedItem::Exact,
            Ok(Some(d)) => NestedItem::Differs(Box::new(d)),
            Err(e) => {
                *dig_error.borrow_mut() = Some(e);
                NestedItem::Exact
            }
        }
    };

    let result = if eq_only {
        crate::sequence::diff(a, b, &mut oracle, accept, here, true, None, true)
    } else {
        crate::sequence::diff(a, b, &mut oracle, accept, here, false, Some(&mut dig_cb), true)
    };

    if let Some(e) = eq_error.into_inner() {
        return Err(e);
    }
    if let Some(e) = dig_error.into_inner() {
        return Err(e);
    }

    Ok(result)
}

fn element_ratio<T: Nestable>(
    va: &T,
    vb: &T,
    budgets: &NestedBudgets,
    max_depth: usize,
    visited: &Visited,
) -> Result<f64, DiffError> {
    match (va.children(), vb.children()) {
        (Some(ca), Some(cb)) => {
            let d = diff_nested_level(ca, cb, budgets.clone(), true, max_depth, visited)?;
            Ok(d.ratio)
        }
        _ => Ok(if va == vb { 1.0 } else { 0.0 }),
    }
}

fn diff_pair<T: Nestable>(
    va: &T,
    vb: &T,
    budgets: &NestedBudgets,
    max_depth: usize,
    visited: &Visited,
) -> Result<Option<Diff<T>>, DiffError> {
    match (va.children(), vb.children()) {
        (Some(ca), Some(cb)) => {
            let d = diff_nested_level(ca, cb, budgets.clone(), false, max_depth, visited)?;
            if d.ratio >= 1.0 {
                Ok(None)
            } else {
                Ok(Some(d))
            }
        }
        _ => {
            if va == vb {
                Ok(None)
            } else {
                Ok(Some(Diff {
                    ratio: 0.0,
                    diffs: Some(vec![Chunk::disaligned(vec![va.clone()], vec![vb.clone()])]),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::NestedBudgets;

    #[derive(Clone, PartialEq, Debug)]
    enum Json {
        Leaf(i64),
        List(Vec<Json>),
    }

    impl Nestable for Json {
        fn children(&self) -> Option<&[Json]> {
            match self {
                Json::List(v) => Some(v),
                Json::Leaf(_) => None,
            }
        }
    }

    #[test]
    fn identical_nested_sequences_are_fully_equal() {
        let a = vec![
            Json::List(vec![Json::Leaf(1), Json::Leaf(2)]),
            Json::Leaf(3),
        ];
        let b = a.clone();
        let d = diff_nested(&a, &b, NestedBudgets::default(), false, 8).unwrap();
        assert_eq!(d.ratio, 1.0);
    }

    #[test]
    fn a_differing_nested_element_produces_a_nested_chunk() {
        // the inner lists differ in only one of five leaves, so their
        // similarity ratio (0.8) stays above the default min_ratio (0.75)
        // and the driver keeps them aligned rather than disaligning them.
        let leaves = |v: [i64; 5]| Json::List(v.into_iter().map(Json::Leaf).collect());
        let a = vec![leaves([1, 2, 3, 4, 5])];
        let b = vec![leaves([1, 2, 3, 4, 99])];
        let d = diff_nested(&a, &b, NestedBudgets::default(), false, 8).unwrap();
        let diffs = d.diffs.unwrap();
        assert_eq!(diffs.len(), 1);
        match &diffs[0].eq {
            crate::chunk::ChunkEq::Nested(items) => {
                assert_eq!(items.len(), 1);
                assert!(matches!(items[0], NestedItem::Differs(_)));
            }
            other => panic!("expected a nested chunk, got {other:?}"),
        }
    }

    #[test]
    fn max_depth_one_stops_recursion_and_compares_flatly() {
        let a = vec![Json::List(vec![Json::Leaf(1)])];
        let b = vec![Json::List(vec![Json::Leaf(2)])];
        // at max_depth=1 elements are compared with plain equality, so the
        // two distinct Json::List values (unequal by value) are disaligned.
        let d = diff_nested(&a, &b, NestedBudgets::default(), false, 1).unwrap();
        let diffs = d.diffs.unwrap();
        assert!(diffs[0].eq.is_disaligned());
    }
}
