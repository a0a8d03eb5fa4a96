//! L1: turning a raw edit-code stream into [`Chunk`]s, and canonicalizing
//! the stream first so runs of insertions/deletions have a stable order.

use crate::chunk::{Chunk, NestedItem};

/// Rewrites `codes` in place so that, within every maximal run of
/// horizontal (`1`) and vertical (`2`) moves bounded by diagonal moves or
/// the ends of the buffer, all horizontal moves come before all vertical
/// ones.
///
/// The Myers engine may interleave 1s and 2s arbitrarily within such a run
/// (both orders have the same cost); canonicalizing makes the chunking
/// step below deterministic.
pub fn canonize(codes: &mut [u8]) {
    let n = codes.len();
    let mut n_horizontal = 0usize;
    let mut n_vertical = 0usize;
    for code_i in 0..=n {
        let code = if code_i != n { codes[code_i] } else { 0 };
        if code == 1 {
            n_horizontal += 1;
        } else if code == 2 {
            n_vertical += 1;
        } else if n_horizontal + n_vertical > 0 {
            let start = code_i - n_horizontal - n_vertical;
            for idx in start..(code_i - n_vertical) {
                codes[idx] = 1;
            }
            for idx in (code_i - n_vertical)..code_i {
                codes[idx] = 2;
            }
            n_horizontal = 0;
            n_vertical = 0;
        }
    }
}

/// Turns a canonicalized edit-code stream into a list of [`Chunk`]s.
///
/// `dig`, if given, is called once per paired position inside every
/// otherwise-equal chunk to determine whether that specific pair should be
/// treated as nested-different rather than exactly equal; a chunk whose
/// every position comes back [`NestedItem::Exact`] collapses to
/// [`crate::chunk::ChunkEq::Equal`] (see [`Chunk::nested`]).
pub fn codes_to_chunks<T: Clone>(
    a: &[T],
    b: &[T],
    codes: &[u8],
    mut dig: Option<&mut dyn FnMut(usize, usize) -> NestedItem<T>>,
) -> Vec<Chunk<T>> {
    let filtered: Vec<u8> = codes.iter().copied().filter(|&c| c != 0).collect();

    let mut chunks = Vec::new();
    let mut i = 0usize;
    let mut j = 0usize;
    let mut idx = 0usize;

    while idx < filtered.len() {
        let neq = filtered[idx] % 3 != 0;
        let start = idx;
        while idx < filtered.len() && (filtered[idx] % 3 != 0) == neq {
            idx += 1;
        }
        let group = &filtered[start..idx];

        let n = i + group.iter().filter(|&&c| c != 2).count();
        let m = j + group.iter().filter(|&&c| c != 1).count();

        let data_a = a[i..n].to_vec();
        let data_b = b[j..m].to_vec();

        let chunk = if neq {
            Chunk::disaligned(data_a, data_b)
        } else {
            match dig.as_mut() {
                Some(dig_fn) => {
                    let items: Vec<NestedItem<T>> =
                        (i..n).zip(j..m).map(|(ii, jj)| (*dig_fn)(ii, jj)).collect();
                    Chunk::nested(data_a, data_b, items)
                }
                None => Chunk::equal(data_a, data_b),
            }
        };
        chunks.push(chunk);
        i = n;
        j = m;
    }

    chunks
}
