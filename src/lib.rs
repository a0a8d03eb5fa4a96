//! Structural diffing: a Myers shortest-edit-script engine plus the layers
//! built on top of it — an edit-code codec, a budget-bounded sequence diff,
//! a nested-container diff driver, 2D table alignment, and chunk algebra
//! for compressing/coarsening a diff and walking only its interesting
//! positions.
//!
//! The layers, bottom to top:
//!
//! - [`myers`] (L0): the linear-space bidirectional search itself.
//! - [`codec`] (L1): canonicalizing and chunking a raw edit-code stream.
//! - [`sequence`] (L2): the budget-aware entry point tying L0/L1 together.
//! - [`nested`] (L3): recursing into container-shaped elements.
//! - [`array2d`] (L4): row/column alignment for 2D tables.
//! - [`algebra`] (L5): compressing, coarsening, and walking a [`chunk::Diff`].
//!
//! [`budget`] and [`signature`] are shared support types; [`chunk`] is the
//! core data model (`Chunk`, `Diff`, `Item`); [`error`] holds the crate's
//! single error type.

#![deny(missing_docs)]

pub mod algebra;
pub mod array2d;
pub mod budget;
pub mod chunk;
pub mod codec;
pub mod error;
pub mod myers;
pub mod nested;
pub mod sequence;
pub mod signature;

pub use array2d::{NumpyDiff, PlainRow};
pub use chunk::{Chunk, ChunkEq, Diff, Item, NestedItem};
pub use error::DiffError;
pub use myers::Similarity;
pub use nested::Nestable;
pub use signature::{ChunkSignature, Signature};
