//! The Myers shortest-edit-script engine (L0).
//!
//! [`search_graph_recursive`] is a close, line-by-line port of the
//! linear-space bidirectional Myers search used by the sequence-diff layer
//! above it: two "fronts" are advanced from opposite ends of the edit graph
//! until they meet, at which point the meeting point splits the problem in
//! two and is searched recursively (only when an output buffer is
//! requested — when the caller only wants the cost, a single bidirectional
//! pass already gives the exact answer with no recursion at all).
//!
//! The edit script is written as raw codes: `1` for a horizontal move
//! (deletion), `2` for a vertical move (insertion), and `3` followed by `0`
//! for a diagonal move (match). [`crate::codec`] turns this into chunks.

mod oracle;

pub use oracle::Similarity;

use crate::budget::Budgets;
use crate::error::DiffError;

fn clamp_i64(x: usize) -> i64 {
    x.min(i64::MAX as usize) as i64
}

/// Runs the Myers search, writing the edit script to `out`.
///
/// `out` must have length exactly `n + m`.
pub fn search<T: PartialEq>(
    n: usize,
    m: usize,
    oracle: &mut Similarity<'_, T>,
    out: &mut [u8],
    accept: f64,
    budgets: Budgets,
) -> Result<u64, DiffError> {
    let expected = n + m;
    if out.len() != expected {
        return Err(DiffError::BufferLength {
            expected,
            actual: out.len(),
        });
    }
    let mut call = |x: i64, y: i64| oracle.ratio(x as usize, y as usize);
    let cost = search_graph_recursive(
        n as i64,
        m as i64,
        &mut call,
        Some(out),
        accept,
        clamp_i64(budgets.max_cost),
        clamp_i64(budgets.max_calls),
        clamp_i64(budgets.max_delta),
        0,
        0,
    );
    Ok(cost as u64)
}

/// Runs the Myers search without reconstructing the edit script, returning
/// only its cost. This is the cheaper of the two entry points: no
/// recursive splitting is required, a single bidirectional pass suffices.
pub fn search_cost_only<T: PartialEq>(
    n: usize,
    m: usize,
    oracle: &mut Similarity<'_, T>,
    accept: f64,
    budgets: Budgets,
) -> u64 {
    let mut call = |x: i64, y: i64| oracle.ratio(x as usize, y as usize);
    search_graph_recursive(
        n as i64,
        m as i64,
        &mut call,
        None,
        accept,
        clamp_i64(budgets.max_cost),
        clamp_i64(budgets.max_calls),
        clamp_i64(budgets.max_delta),
        0,
        0,
    ) as u64
}

/// The recursive bidirectional search itself.
///
/// `max_delta` bands the diagonals searched to approximately
/// `[m - max_delta, m + max_delta]`; this bounds the work done on very
/// dissimilar sequences at the cost of being unable to find alignments
/// whose index offset exceeds the band. The band is re-applied unchanged
/// at every recursion depth using that call's local `m`, an approximation
/// of the original `min_diag`/`max_diag` parameters (see `DESIGN.md`).
#[allow(clippy::too_many_arguments)]
fn search_graph_recursive(
    mut n: i64,
    mut m: i64,
    oracle: &mut dyn FnMut(i64, i64) -> f64,
    mut out: Option<&mut [u8]>,
    accept: f64,
    max_cost: i64,
    max_calls: i64,
    max_delta: i64,
    mut i: i64,
    mut j: i64,
) -> i64 {
    let mut n_calls: i64 = 2;
    let max_cost = max_cost.min(n + m);

    // strip matching ends; this exits the recursion for cost 0 and 1,
    // guaranteeing recursive calls always see a non-zero cost.
    while n * m > 0 && oracle(i, j) >= accept {
        n_calls += 1;
        let ix = (i + j) as usize;
        if let Some(out) = out.as_deref_mut() {
            out[ix] = 3;
            out[ix + 1] = 0;
        }
        i += 1;
        j += 1;
        n -= 1;
        m -= 1;
    }
    while n * m > 0 && oracle(i + n - 1, j + m - 1) >= accept {
        n_calls += 1;
        let ix = (i + j + n + m - 2) as usize;
        if let Some(out) = out.as_deref_mut() {
            out[ix] = 3;
            out[ix + 1] = 0;
        }
        n -= 1;
        m -= 1;
    }

    if n * m == 0 {
        if let Some(out) = out.as_deref_mut() {
            for ix in (i + j)..(i + j + n) {
                out[ix as usize] = 1;
            }
            for ix in (i + j + n)..(i + j + n + m) {
                out[ix as usize] = 2;
            }
        }
        return n + m;
    }

    let nm = n.min(m) + 1;
    let n_m = n + m;
    let mut front_forward: Vec<i64> = vec![0; nm as usize];
    let mut front_reverse: Vec<i64> = vec![n_m; nm as usize];

    let diag_lo = m.saturating_sub(max_delta).max(0);
    let diag_hi = m.saturating_add(max_delta).min(n_m);

    let mut cost = 0;
    while cost <= max_cost {
        let is_reverse_front = cost % 2 != 0;
        let reverse_as_sign: i64 = if is_reverse_front { -1 } else { 1 };

        let (diag_src, diag_dst) = if is_reverse_front { (m, n) } else { (n, m) };

        let p = cost.div_euclid(2);
        let mut diag_updated_from = (diag_src - p).abs();
        let mut diag_updated_to = n_m - (diag_dst - p).abs();
        diag_updated_from = diag_updated_from.max(diag_lo);
        diag_updated_to = diag_updated_to.min(diag_hi);

        let p2 = (cost - 1).div_euclid(2) + 1;
        let mut diag_facing_from = (diag_dst - p2).abs();
        let mut diag_facing_to = n_m - (diag_src - p2).abs();
        diag_facing_from = diag_facing_from.max(diag_lo);
        diag_facing_to = diag_facing_to.min(diag_hi);

        // phase 1: propagate diagonals
        let mut diag = diag_updated_from;
        while diag < diag_updated_to + 2 {
            let ix = ((diag / 2) % nm) as usize;

            let progress_start = if is_reverse_front {
                front_reverse[ix]
            } else {
                front_forward[ix]
            };
            let mut progress = progress_start;

            let shift = if is_reverse_front { 1 } else { 0 };
            let mut x = (progress + diag - m).div_euclid(2) - shift;
            let mut y = (progress - diag + m).div_euclid(2) - shift;

            while x >= 0 && x < n && y >= 0 && y < m {
                n_calls += 1;
                if oracle(x + i, y + j) < accept {
                    break;
                }
                progress += 2 * reverse_as_sign;
                x += reverse_as_sign;
                y += reverse_as_sign;
            }
            if is_reverse_front {
                front_reverse[ix] = progress;
            } else {
                front_forward[ix] = progress;
            }

            if diag_facing_from <= diag
                && diag <= diag_facing_to
                && (diag - diag_facing_from).rem_euclid(2) == 0
                && front_forward[ix] >= front_reverse[ix]
            {
                if let Some(out) = out.as_deref_mut() {
                    let wshift = if is_reverse_front { 2 } else { 0 };
                    let step = 2 * reverse_as_sign;
                    let start = progress_start - wshift;
                    let stop = progress - wshift;
                    let mut cur = start;
                    while (step > 0 && cur < stop) || (step < 0 && cur > stop) {
                        out[(i + j + cur) as usize] = 3;
                        out[(i + j + cur + 1) as usize] = 0;
                        cur += step;
                    }

                    let mut x1 = (progress_start + diag - m).div_euclid(2);
                    let mut y1 = (progress_start - diag + m).div_euclid(2);
                    let mut x2 = (progress + diag - m).div_euclid(2);
                    let mut y2 = (progress - diag + m).div_euclid(2);
                    if is_reverse_front {
                        std::mem::swap(&mut x1, &mut x2);
                        std::mem::swap(&mut y1, &mut y2);
                    }

                    let cost_head = cost.div_euclid(2) + cost.rem_euclid(2);
                    let cost_tail = cost.div_euclid(2);

                    search_graph_recursive(
                        x1,
                        y1,
                        oracle,
                        Some(&mut *out),
                        accept,
                        cost_head,
                        i64::MAX,
                        max_delta,
                        i,
                        j,
                    );
                    search_graph_recursive(
                        n - x2,
                        m - y2,
                        oracle,
                        Some(out),
                        accept,
                        cost_tail,
                        i64::MAX,
                        max_delta,
                        i + x2,
                        j + y2,
                    );
                }
                return cost;
            }

            diag += 2;
        }

        if n_calls > max_calls {
            break;
        }

        // phase 2: step into adjacent diagonals
        let cost_2 = cost.div_euclid(2) + 1;
        let mut diag_updated_from_2 = (diag_src - cost_2).abs();
        let mut diag_updated_to_2 = n_m - (diag_dst - cost_2).abs();
        diag_updated_from_2 = diag_updated_from_2.max(diag_lo);
        diag_updated_to_2 = diag_updated_to_2.min(diag_hi);

        let mut ix: i64 = -1;
        let mut previous: i64 = -1;

        let mut diag2 = diag_updated_from_2;
        while diag2 < diag_updated_to_2 + 2 {
            let left_ix = ((diag2 - 1).div_euclid(2)).rem_euclid(nm) as usize;
            let right_ix = ((diag2 + 1).div_euclid(2)).rem_euclid(nm) as usize;
            let (progress_left, progress_right) = if is_reverse_front {
                (front_reverse[left_ix], front_reverse[right_ix])
            } else {
                (front_forward[left_ix], front_forward[right_ix])
            };

            let progress = if diag2 == diag_updated_from - 1 {
                progress_right
            } else if diag2 == diag_updated_to + 1 {
                progress_left
            } else if is_reverse_front {
                progress_left.min(progress_right)
            } else {
                progress_left.max(progress_right)
            };

            if ix != -1 {
                let prev_ix = ix as usize;
                if is_reverse_front {
                    front_reverse[prev_ix] = previous + reverse_as_sign;
                } else {
                    front_forward[prev_ix] = previous + reverse_as_sign;
                }
            }

            previous = progress;
            ix = (diag2.div_euclid(2)).rem_euclid(nm);

            diag2 += 2;
        }
        if ix != -1 {
            let final_ix = ix as usize;
            if is_reverse_front {
                front_reverse[final_ix] = previous + reverse_as_sign;
            } else {
                front_forward[final_ix] = previous + reverse_as_sign;
            }
        }

        cost += 1;
    }

    if let Some(out) = out.as_deref_mut() {
        for ix in (i + j)..(i + j + n) {
            out[ix as usize] = 1;
        }
        for ix in (i + j + n)..(i + j + n + m) {
            out[ix as usize] = 2;
        }
    }
    n + m
}
