//! Shape-only descriptions of diffs (L6): run-length alignment information
//! without any payload data, used by the 2D alignment algorithm to reuse a
//! column alignment across every row.

/// Describes the shape of one chunk without referring to its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSignature {
    /// Length of the corresponding sub-sequence in `a`.
    pub size_a: usize,
    /// Length of the corresponding sub-sequence in `b`.
    pub size_b: usize,
    /// Whether the two sub-sequences are aligned (equal length, paired
    /// position by position) as opposed to disaligned (independent
    /// deletion + insertion).
    pub eq: bool,
}

impl ChunkSignature {
    /// An aligned part of length `n` on both sides.
    pub fn aligned(n: usize) -> Self {
        Self {
            size_a: n,
            size_b: n,
            eq: true,
        }
    }

    /// A disaligned part: `size_a` elements deleted, `size_b` inserted.
    pub fn delta(size_a: usize, size_b: usize) -> Self {
        Self {
            size_a,
            size_b,
            eq: false,
        }
    }

    /// The length of this part in the inflated/common representation:
    /// `size_a` when aligned, `size_a + size_b` when disaligned.
    pub fn len(&self) -> usize {
        if self.eq {
            self.size_a
        } else {
            self.size_a + self.size_b
        }
    }

    /// Whether this part is empty in the inflated representation.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A run-length description of how two sequences/axes align.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// The constituent parts, in order.
    pub parts: Vec<ChunkSignature>,
}

impl Signature {
    /// A signature describing `n` fully aligned, equal elements.
    pub fn aligned(n: usize) -> Self {
        if n == 0 {
            Self::default()
        } else {
            Self {
                parts: vec![ChunkSignature::aligned(n)],
            }
        }
    }

    /// Total length in the inflated/common representation.
    pub fn len(&self) -> usize {
        self.parts.iter().map(ChunkSignature::len).sum()
    }

    /// Whether the signature describes zero elements.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total length on the `a` side.
    pub fn len_a(&self) -> usize {
        self.parts.iter().map(|p| p.size_a).sum()
    }

    /// Total length on the `b` side.
    pub fn len_b(&self) -> usize {
        self.parts.iter().map(|p| p.size_b).sum()
    }
}
