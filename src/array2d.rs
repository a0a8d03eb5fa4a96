//! L4: 2D table alignment. Diffs a matrix row-by-row, then uses the
//! per-row diffs to find a single "common" column alignment shared by
//! every aligned row pair, and can inflate both matrices to a shared
//! shape with gaps filled in.

use crate::budget::Budgets;
use crate::error::DiffError;
use crate::myers::Similarity;
use crate::sequence;
use crate::signature::{ChunkSignature, Signature};

fn check_rectangular<T>(rows: &[Vec<T>], which: &str) -> Result<usize, DiffError> {
    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != width) {
        return Err(DiffError::ShapeMismatch(format!(
            "matrix {which} is not rectangular"
        )));
    }
    Ok(width)
}

/// Diffs `a` against `b` row by row (using a per-row similarity oracle,
/// itself a cell-level diff) and returns the signatures describing how
/// rows and columns align.
pub fn get_row_col_diff<T: Clone + PartialEq>(
    a: &[Vec<T>],
    b: &[Vec<T>],
    budgets: Budgets,
) -> Result<(Signature, Signature), DiffError> {
    let n_cols_a = check_rectangular(a, "a")?;
    let n_cols_b = check_rectangular(b, "b")?;

    let mut row_ratio = |i: usize, j: usize| -> f64 {
        let mut oracle = Similarity::Pair(&a[i], &b[j]);
        sequence::diff(&a[i], &b[j], &mut oracle, budgets.min_ratio, budgets, true, None, true).ratio
    };
    let mut oracle = Similarity::Callback(&mut row_ratio);
    let base_diff = sequence::diff(a, b, &mut oracle, budgets.min_ratio, budgets, false, None, true);
    let row_sig = base_diff.signature();

    let mut in_row_diffs: Vec<Signature> = Vec::new();
    let (mut ia, mut ib) = (0usize, 0usize);
    for chunk in base_diff.diffs.as_ref().expect("rtn_diff requested") {
        if chunk.eq.is_equal() {
            for k in 0..chunk.data_a.len() {
                let row_a = &a[ia + k];
                let row_b = &b[ib + k];
                let mut oracle = Similarity::Pair(row_a, row_b);
                let d = sequence::diff(row_a, row_b, &mut oracle, budgets.min_ratio, budgets, false, None, true);
                in_row_diffs.push(d.signature());
            }
        }
        ia += chunk.data_a.len();
        ib += chunk.data_b.len();
    }

    let col_sig = common_diff_sig(n_cols_a, n_cols_b, &in_row_diffs);
    Ok((row_sig, col_sig))
}

/// Computes a single column alignment shared by a whole collection of row
/// diffs: the longest common run of positions considered equal across all
/// of `diffs`, via a breadth-depth-first search over the `n x m` grid of
/// candidate alignments.
pub fn common_diff_sig(n: usize, m: usize, diffs: &[Signature]) -> Signature {
    if n == 0 || m == 0 {
        return Signature {
            parts: vec![ChunkSignature::delta(n, m)],
        };
    }

    let mut space = vec![vec![0i64; m]; n];
    for sig in diffs {
        let (mut x, mut y) = (0usize, 0usize);
        for part in &sig.parts {
            if part.eq {
                for k in 0..part.size_a {
                    space[x + k][y + k] += 1;
                }
            }
            x += part.size_a;
            y += part.size_b;
        }
    }

    for y in 0..m {
        if y == 0 {
            for x in 1..n {
                space[x][0] = space[x][0].max(space[x - 1][0]);
            }
        } else {
            space[0][y] = space[0][y].max(space[0][y - 1]);
            for x in 1..n {
                space[x][y] = space[x - 1][y]
                    .max(space[x][y - 1])
                    .max(space[x - 1][y - 1] + space[x][y]);
            }
        }
    }

    let mut x = n as i64 - 1;
    let mut y = m as i64 - 1;
    let mut is_b = vec![false; n + m];
    let mut is_eq = vec![false; n + m + 2];
    let mut pos = (n + m) as i64;

    while x >= 0 && y >= 0 {
        let (ux, uy) = (x as usize, y as usize);
        if x > 0 && space[ux][uy] == space[ux - 1][uy] {
            x -= 1;
            pos -= 1;
        } else if y > 0 && space[ux][uy] == space[ux][uy - 1] {
            y -= 1;
            pos -= 1;
            is_b[pos as usize] = true;
        } else {
            is_eq[pos as usize] = true;
            is_eq[(pos - 1) as usize] = true;
            x -= 1;
            y -= 1;
            pos -= 2;
            is_b[(pos + 1) as usize] = true;
        }
    }
    x += 1;
    y += 1;
    for k in (x as usize)..(x + y) as usize {
        is_b[k] = true;
    }
    let last = is_eq.len() - 1;
    is_eq[0] = !is_eq[1];
    is_eq[last] = !is_eq[last - 1];

    let mut boundaries = Vec::new();
    for k in 0..last {
        if is_eq[k + 1] != is_eq[k] {
            boundaries.push(k);
        }
    }

    let parts = boundaries
        .windows(2)
        .map(|w| {
            let (fr, to) = (w[0], w[1]);
            let size_b = is_b[fr..to].iter().filter(|&&v| v).count();
            ChunkSignature {
                size_a: (to - fr) - size_b,
                size_b,
                eq: is_eq[fr + 1],
            }
        })
        .collect();

    Signature { parts }
}

fn inflate_side<T: Clone>(values: &[T], fill: &T, sig: &Signature, is_a: bool) -> Vec<T> {
    let total: usize = sig.parts.iter().map(ChunkSignature::len).sum();
    let mut out = vec![fill.clone(); total];
    let (mut src, mut offset) = (0usize, 0usize);
    for part in &sig.parts {
        if is_a {
            out[offset..offset + part.size_a].clone_from_slice(&values[src..src + part.size_a]);
            src += part.size_a;
            if !part.eq {
                offset += part.size_a;
            }
            offset += part.size_b;
        } else {
            if !part.eq {
                offset += part.size_a;
            }
            out[offset..offset + part.size_b].clone_from_slice(&values[src..src + part.size_b]);
            src += part.size_b;
            offset += part.size_b;
        }
    }
    out
}

/// Inflates `a` and `b` along `dim` (`0` = rows, `1` = columns) to match
/// `sig`, filling gaps with `fill`.
pub fn align_inflate<T: Clone>(
    a: &[Vec<T>],
    b: &[Vec<T>],
    fill: &T,
    sig: &Signature,
    dim: usize,
) -> (Vec<Vec<T>>, Vec<Vec<T>>) {
    match dim {
        0 => {
            let cols_a = a.first().map_or(0, Vec::len);
            let cols_b = b.first().map_or(0, Vec::len);
            let fill_row_a = vec![fill.clone(); cols_a];
            let fill_row_b = vec![fill.clone(); cols_b];
            (
                inflate_side(a, &fill_row_a, sig, true),
                inflate_side(b, &fill_row_b, sig, false),
            )
        }
        1 => (
            a.iter().map(|row| inflate_side(row, fill, sig, true)).collect(),
            b.iter().map(|row| inflate_side(row, fill, sig, false)).collect(),
        ),
        _ => panic!("dim must be 0 or 1 for a 2D table"),
    }
}

/// A 2D aligned diff: `a` and `b` share shape `(R, C)`, inflated with a fill
/// value in disaligned cells, alongside an `R x C` equality mask that is
/// `false` everywhere a row or column lies in a disaligned signature part,
/// regardless of the actual values there.
#[derive(Debug, Clone)]
pub struct NumpyDiff<T> {
    /// The first matrix, inflated to the common `(R, C)` shape.
    pub a: Vec<Vec<T>>,
    /// The second matrix, inflated to the common `(R, C)` shape.
    pub b: Vec<Vec<T>>,
    /// `eq[i][j]` — whether cell `(i, j)` is considered equal.
    pub eq: Vec<Vec<bool>>,
    /// The row alignment signature (length `R` in the inflated representation).
    pub row_diff_sig: Signature,
    /// The column alignment signature (length `C` in the inflated representation).
    pub col_diff_sig: Signature,
}

/// One row-level classification produced by [`NumpyDiff::to_plain`].
#[derive(Debug, Clone)]
pub enum PlainRow<T> {
    /// A run of rows that are fully aligned and cell-for-cell equal.
    Equal(Vec<Vec<T>>, Vec<Vec<T>>),
    /// A run of rows with no row-level alignment (deleted from `a`,
    /// inserted into `b`).
    Disaligned(Vec<Vec<T>>, Vec<Vec<T>>),
    /// A single aligned row that is not fully equal, carrying its per-cell
    /// equality vector.
    ///
    /// `sequence::diff`'s `Chunk<T>` cannot express this directly: a
    /// per-cell vector needs element type `T`, but a chunk over rows needs
    /// element type `Vec<T>`, and [`crate::chunk::NestedItem`] requires the
    /// same element type as its enclosing chunk (see `DESIGN.md`, Open
    /// Question 4, which this mirrors).
    PartialRow {
        /// The row from `a`.
        a: Vec<T>,
        /// The row from `b`.
        b: Vec<T>,
        /// Per-cell equality, one entry per column.
        cell_eq: Vec<bool>,
    },
}

fn flush_equal_run<T: Clone>(out: &mut Vec<PlainRow<T>>, run: &mut Vec<usize>, a: &[Vec<T>], b: &[Vec<T>]) {
    if run.is_empty() {
        return;
    }
    let data_a = run.iter().map(|&i| a[i].clone()).collect();
    let data_b = run.iter().map(|&i| b[i].clone()).collect();
    out.push(PlainRow::Equal(data_a, data_b));
    run.clear();
}

impl<T: Clone> NumpyDiff<T> {
    /// Reduces this 2D diff back to a flat, row-by-row classification.
    /// Fully aligned-and-equal rows collapse into runs; disaligned rows
    /// form their own run per disaligned signature part; an aligned row
    /// that isn't fully equal is reported on its own, carrying its
    /// per-cell equality vector.
    pub fn to_plain(&self) -> Vec<PlainRow<T>> {
        let mut out = Vec::new();
        let mut equal_run: Vec<usize> = Vec::new();
        let mut row_idx = 0usize;

        for part in &self.row_diff_sig.parts {
            if !part.eq {
                flush_equal_run(&mut out, &mut equal_run, &self.a, &self.b);
                let data_a = self.a[row_idx..row_idx + part.size_a].to_vec();
                let data_b = self.b[row_idx + part.size_a..row_idx + part.len()].to_vec();
                out.push(PlainRow::Disaligned(data_a, data_b));
            } else {
                for k in 0..part.size_a {
                    let i = row_idx + k;
                    if self.eq[i].iter().all(|&v| v) {
                        equal_run.push(i);
                    } else {
                        flush_equal_run(&mut out, &mut equal_run, &self.a, &self.b);
                        out.push(PlainRow::PartialRow {
                            a: self.a[i].clone(),
                            b: self.b[i].clone(),
                            cell_eq: self.eq[i].clone(),
                        });
                    }
                }
            }
            row_idx += part.len();
        }
        flush_equal_run(&mut out, &mut equal_run, &self.a, &self.b);
        out
    }
}

/// Builds the `R x C` equality mask for an already-inflated pair of
/// matrices: plain element-wise equality, then forced to `false` across
/// every disaligned row or column span regardless of what the values there
/// happen to be (disaligned cells are never "equal" by construction, even
/// when a fill value coincidentally matches real data on the other side).
fn build_eq_mask<T: PartialEq>(a: &[Vec<T>], b: &[Vec<T>], row_sig: &Signature, col_sig: &Signature) -> Vec<Vec<bool>> {
    let mut eq_matrix: Vec<Vec<bool>> = a
        .iter()
        .zip(b)
        .map(|(ra, rb)| ra.iter().zip(rb).map(|(x, y)| x == y).collect())
        .collect();

    let mut row_offset = 0usize;
    for part in &row_sig.parts {
        let n = part.len();
        if !part.eq {
            for row in &mut eq_matrix[row_offset..row_offset + n] {
                row.iter_mut().for_each(|c| *c = false);
            }
        }
        row_offset += n;
    }
    let mut col_offset = 0usize;
    for part in &col_sig.parts {
        let n = part.len();
        if !part.eq {
            for row in eq_matrix.iter_mut() {
                for c in &mut row[col_offset..col_offset + n] {
                    *c = false;
                }
            }
        }
        col_offset += n;
    }
    eq_matrix
}

/// Computes an aligned diff between two matrices: both are inflated to a
/// shared shape (gaps filled with `fill`), alongside a same-shaped
/// equality mask that is additionally forced to `false` across every
/// disaligned row or column span.
///
/// This is path (ii) of §4.5: no column alignment is supplied, so one is
/// derived from the row diffs via [`get_row_col_diff`]/[`common_diff_sig`].
/// When the caller already knows how the columns line up (e.g. matching
/// column names), use [`diff_aligned_2d_with_col_sig`] instead — it skips
/// this derivation and is both cheaper and exact.
pub fn diff_aligned_2d<T: Clone + PartialEq>(
    a: &[Vec<T>],
    b: &[Vec<T>],
    fill: &T,
    budgets: Budgets,
) -> Result<NumpyDiff<T>, DiffError> {
    let (row_sig, col_sig) = get_row_col_diff(a, b, budgets)?;
    let (a, b) = align_inflate(a, b, fill, &row_sig, 0);
    let (a, b) = align_inflate(&a, &b, fill, &col_sig, 1);
    let eq_matrix = build_eq_mask(&a, &b, &row_sig, &col_sig);

    Ok(NumpyDiff {
        a,
        b,
        eq: eq_matrix,
        row_diff_sig: row_sig,
        col_diff_sig: col_sig,
    })
}

/// Per-column weight for the [`Similarity::Weighted2D`] oracle used by
/// [`diff_aligned_2d_with_col_sig`]: `1.0` for a column lying in an aligned
/// part of `col_sig`, `0.0` for one lying in a disaligned part (such a
/// column has no counterpart on the other side and must not influence row
/// similarity).
fn column_weights(col_sig: &Signature) -> Vec<f64> {
    let mut weights = Vec::with_capacity(col_sig.len());
    for part in &col_sig.parts {
        let w = if part.eq { 1.0 } else { 0.0 };
        weights.extend(std::iter::repeat(w).take(part.len()));
    }
    weights
}

/// Computes an aligned diff between two matrices given an externally
/// supplied column alignment — path (i) of §4.5.
///
/// Columns are inflated to `col_sig`'s shape first. A per-column weight
/// mask (1.0 for aligned columns, 0.0 for disaligned ones) drives a
/// [`Similarity::Weighted2D`] oracle, so row similarity is judged only on
/// the columns that actually line up; this yields the row signature
/// directly from a single [`sequence::diff`] call, skipping
/// [`get_row_col_diff`]'s row-by-row cell diffing and `common_diff_sig`
/// derivation entirely.
///
/// # Errors
/// Returns [`DiffError::ShapeMismatch`] if `col_sig`'s side lengths don't
/// match `a`/`b`'s column counts, or either matrix is ragged.
/// Returns [`DiffError::UnsupportedOracle`] if `col_sig` has no aligned
/// columns at all — the weighted oracle would then have nothing to compare
/// rows on and every row pair would vacuously score as identical, which is
/// not a usable fast path.
pub fn diff_aligned_2d_with_col_sig<T: Clone + PartialEq>(
    a: &[Vec<T>],
    b: &[Vec<T>],
    fill: &T,
    col_sig: &Signature,
    budgets: Budgets,
) -> Result<NumpyDiff<T>, DiffError> {
    let n_cols_a = check_rectangular(a, "a")?;
    let n_cols_b = check_rectangular(b, "b")?;
    if col_sig.len_a() != n_cols_a || col_sig.len_b() != n_cols_b {
        return Err(DiffError::ShapeMismatch(format!(
            "supplied column signature spans {}x{} columns, matrices have {n_cols_a}x{n_cols_b}",
            col_sig.len_a(),
            col_sig.len_b()
        )));
    }

    let (a_cols, b_cols) = align_inflate(a, b, fill, col_sig, 1);

    let weights = column_weights(col_sig);
    if weights.iter().sum::<f64>() == 0.0 {
        return Err(DiffError::UnsupportedOracle);
    }

    let mut row_ratio = |i: usize, j: usize| -> f64 {
        let mut weighted = Similarity::Weighted2D {
            a: &a_cols,
            b: &b_cols,
            weights: &weights,
        };
        weighted.ratio(i, j)
    };
    let mut oracle = Similarity::Callback(&mut row_ratio);
    let base_diff = sequence::diff(&a_cols, &b_cols, &mut oracle, budgets.min_ratio, budgets, false, None, true);
    let row_sig = base_diff.signature();

    let (a, b) = align_inflate(&a_cols, &b_cols, fill, &row_sig, 0);
    let eq_matrix = build_eq_mask(&a, &b, &row_sig, col_sig);

    Ok(NumpyDiff {
        a,
        b,
        eq: eq_matrix,
        row_diff_sig: row_sig,
        col_diff_sig: col_sig.clone(),
    })
}
