//! The core diff data model shared by every layer: [`Chunk`], [`Diff`] and
//! [`Item`] (§3 of the specification).

use crate::signature::{ChunkSignature, Signature};

/// How the two sides of a [`Chunk`] relate to each other.
#[derive(Debug, Clone)]
pub enum ChunkEq<T> {
    /// Aligned and equal: `data_a.len() == data_b.len()` and every paired
    /// element compared equal (or similar enough) under the oracle.
    Equal,
    /// Unaligned: an independent deletion of `data_a` and insertion of
    /// `data_b`. Any lengths (including zero on one side) are permitted.
    Disaligned,
    /// Aligned but structurally different: one [`NestedItem`] per paired
    /// element.
    Nested(Vec<NestedItem<T>>),
}

impl<T> ChunkEq<T> {
    /// `true`/`false` for the boolean variants, `None` for [`ChunkEq::Nested`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ChunkEq::Equal => Some(true),
            ChunkEq::Disaligned => Some(false),
            ChunkEq::Nested(_) => None,
        }
    }

    /// Whether this chunk is the plain-equal variant.
    pub fn is_equal(&self) -> bool {
        matches!(self, ChunkEq::Equal)
    }

    /// Whether this chunk is the plain-disaligned variant.
    pub fn is_disaligned(&self) -> bool {
        matches!(self, ChunkEq::Disaligned)
    }
}

/// One element of a [`ChunkEq::Nested`] list: either the pair compared
/// exactly equal (cheaper than storing a trivial [`Diff`]), or it differs
/// and carries the nested diff describing how.
#[derive(Debug, Clone)]
pub enum NestedItem<T> {
    /// The pair was exactly equal (the `dig` oracle returned the trivial
    /// equal diff).
    Exact,
    /// The pair differs; this is the nested diff explaining how.
    Differs(Box<Diff<T>>),
}

impl<T> NestedItem<T> {
    /// Whether this pair was exactly equal.
    pub fn is_exact(&self) -> bool {
        matches!(self, NestedItem::Exact)
    }
}

/// One run of two sequences being compared: either equal, unequal, or
/// aligned-but-structurally-different.
#[derive(Debug, Clone)]
pub struct Chunk<T> {
    /// The sub-range of the first sequence.
    pub data_a: Vec<T>,
    /// The sub-range of the second sequence.
    pub data_b: Vec<T>,
    /// How the two relate.
    pub eq: ChunkEq<T>,
}

impl<T: Clone> Chunk<T> {
    /// An aligned, equal chunk. `data_a` and `data_b` must have the same
    /// length.
    pub fn equal(data_a: Vec<T>, data_b: Vec<T>) -> Self {
        debug_assert_eq!(data_a.len(), data_b.len());
        Self {
            data_a,
            data_b,
            eq: ChunkEq::Equal,
        }
    }

    /// A disaligned chunk (independent deletion + insertion).
    pub fn disaligned(data_a: Vec<T>, data_b: Vec<T>) -> Self {
        debug_assert!(!data_a.is_empty() || !data_b.is_empty());
        Self {
            data_a,
            data_b,
            eq: ChunkEq::Disaligned,
        }
    }

    /// An aligned chunk with a per-element nested status. If every item is
    /// [`NestedItem::Exact`] this collapses to [`ChunkEq::Equal`], matching
    /// the codec's collapsing rule.
    pub fn nested(data_a: Vec<T>, data_b: Vec<T>, items: Vec<NestedItem<T>>) -> Self {
        debug_assert_eq!(data_a.len(), items.len());
        debug_assert_eq!(data_b.len(), items.len());
        let eq = if items.iter().all(NestedItem::is_exact) {
            ChunkEq::Equal
        } else {
            ChunkEq::Nested(items)
        };
        Self { data_a, data_b, eq }
    }

    /// This chunk's shape-only [`ChunkSignature`].
    pub fn signature(&self) -> ChunkSignature {
        ChunkSignature {
            size_a: self.data_a.len(),
            size_b: self.data_b.len(),
            eq: !matches!(self.eq, ChunkEq::Disaligned),
        }
    }

    /// Concatenates two boolean-`eq` chunks (`Equal`/`Disaligned`), as used
    /// by coarsening. The result is equal only if both inputs were equal.
    ///
    /// # Panics
    /// Panics if either chunk carries a [`ChunkEq::Nested`] list; nested
    /// chunks are a sealed boundary and must never reach this function (see
    /// `crate::algebra`).
    pub(crate) fn concat_bool(mut self, other: Chunk<T>) -> Chunk<T> {
        let eq = match (&self.eq, &other.eq) {
            (ChunkEq::Nested(_), _) | (_, ChunkEq::Nested(_)) => {
                panic!("cannot concatenate a nested chunk")
            }
            (ChunkEq::Equal, ChunkEq::Equal) => ChunkEq::Equal,
            _ => ChunkEq::Disaligned,
        };
        self.data_a.extend(other.data_a);
        self.data_b.extend(other.data_b);
        self.eq = eq;
        self
    }
}

/// A compact, aligned representation of the difference between two
/// sequences.
#[derive(Debug, Clone)]
pub struct Diff<T> {
    /// Similarity ratio in `[0, 1]`; `1` means identical.
    pub ratio: f64,
    /// The chunks making up this diff, or `None` if only the ratio was
    /// computed (script reconstruction skipped).
    pub diffs: Option<Vec<Chunk<T>>>,
}

impl<T: Clone> Diff<T> {
    /// The trivial diff for two empty sequences.
    pub fn empty() -> Self {
        Self {
            ratio: 1.0,
            diffs: Some(Vec::new()),
        }
    }

    /// The trivial diff for two equal, non-empty sequences.
    pub fn trivial_equal(data_a: Vec<T>, data_b: Vec<T>) -> Self {
        if data_a.is_empty() && data_b.is_empty() {
            return Self::empty();
        }
        Self {
            ratio: 1.0,
            diffs: Some(vec![Chunk::equal(data_a, data_b)]),
        }
    }

    /// Reconstructs the first sequence by concatenating every chunk's
    /// `data_a`.
    ///
    /// # Panics
    /// Panics if `diffs` is `None`.
    pub fn get_a(&self) -> Vec<T> {
        let diffs = self.diffs.as_ref().expect("no diff data");
        diffs.iter().flat_map(|c| c.data_a.iter().cloned()).collect()
    }

    /// Reconstructs the second sequence by concatenating every chunk's
    /// `data_b`.
    ///
    /// # Panics
    /// Panics if `diffs` is `None`.
    pub fn get_b(&self) -> Vec<T> {
        let diffs = self.diffs.as_ref().expect("no diff data");
        diffs.iter().flat_map(|c| c.data_b.iter().cloned()).collect()
    }

    /// This diff's shape-only [`Signature`].
    ///
    /// # Panics
    /// Panics if `diffs` is `None`.
    pub fn signature(&self) -> Signature {
        let diffs = self.diffs.as_ref().expect("no diff data");
        Signature {
            parts: diffs.iter().map(Chunk::signature).collect(),
        }
    }
}

/// One "important" (disaligned or nested-different) position, surfaced by
/// [`crate::algebra::iter_important`].
#[derive(Debug, Clone)]
pub struct Item<T> {
    /// The element from the first sequence, if present.
    pub a: Option<T>,
    /// The element from the second sequence, if present.
    pub b: Option<T>,
    /// Index into the first sequence, if `a` is present.
    pub ix_a: Option<usize>,
    /// Index into the second sequence, if `b` is present.
    pub ix_b: Option<usize>,
    /// The nested diff, if this item came from an aligned-but-different
    /// pair.
    pub diff: Option<Box<Diff<T>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_all_exact_collapses_to_equal() {
        let chunk = Chunk::nested(vec![1, 2], vec![1, 2], vec![NestedItem::Exact, NestedItem::Exact]);
        assert!(chunk.eq.is_equal());
    }

    #[test]
    fn get_a_get_b_roundtrip() {
        let diff = Diff {
            ratio: 0.5,
            diffs: Some(vec![
                Chunk::disaligned(vec![1], vec![2, 3]),
                Chunk::equal(vec![4], vec![4]),
            ]),
        };
        assert_eq!(diff.get_a(), vec![1, 4]);
        assert_eq!(diff.get_b(), vec![2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn concat_bool_panics_on_nested() {
        let a = Chunk::nested(vec![1], vec![1], vec![NestedItem::Differs(Box::new(Diff::trivial_equal(vec![1], vec![1])))]);
        let b = Chunk::equal(vec![2], vec![2]);
        let _ = a.concat_bool(b);
    }
}
