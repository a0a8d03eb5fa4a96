//! L2: the flat sequence-diff entry point, tying the Myers engine and the
//! codec together and applying the similarity/cost budgets.

use crate::budget::Budgets;
use crate::chunk::{Chunk, Diff, NestedItem};
use crate::codec::{canonize, codes_to_chunks};
use crate::myers::{search, search_cost_only, Similarity};

/// Computes a [`Diff`] between `a` and `b`.
///
/// * `accept` is the minimal per-element similarity ratio treated as
///   "equal" by the engine.
/// * `eq_only` skips script reconstruction entirely (no codec pass, no
///   chunk list) and only computes `ratio`; this is cheaper since the
///   underlying search does not need to recurse.
/// * `dig`, when given, is consulted for every position inside an
///   otherwise-equal run to build nested sub-diffs (see
///   [`crate::codec::codes_to_chunks`]).
/// * `strict`, when `true`, collapses the whole result to a zero-ratio
///   diff (a single disaligned chunk, if script reconstruction is on) the
///   moment the edit cost exceeds `budgets.max_cost`, rather than
///   returning the partial ratio that was actually reached.
#[allow(clippy::too_many_arguments)]
pub fn diff<T: Clone + PartialEq>(
    a: &[T],
    b: &[T],
    oracle: &mut Similarity<'_, T>,
    accept: f64,
    budgets: Budgets,
    eq_only: bool,
    dig: Option<&mut dyn FnMut(usize, usize) -> NestedItem<T>>,
    strict: bool,
) -> Diff<T> {
    let n = a.len();
    let m = b.len();
    let total_len = n + m;
    if total_len == 0 {
        return Diff::empty();
    }

    let max_cost = budgets.max_cost.min(
        (total_len as f64 - total_len as f64 * budgets.min_ratio).floor() as usize,
    );
    let budgets = Budgets { max_cost, ..budgets };

    if eq_only {
        let cost = search_cost_only(n, m, oracle, accept, budgets);
        if strict && cost as usize > max_cost {
            return Diff { ratio: 0.0, diffs: None };
        }
        let ratio = (total_len as f64 - cost as f64) / total_len as f64;
        return Diff { ratio, diffs: None };
    }

    let mut codes = vec![0xFFu8; total_len];
    let cost = search(n, m, oracle, &mut codes, accept, budgets)
        .expect("buffer length matches n + m by construction");

    if strict && cost as usize > max_cost {
        return Diff {
            ratio: 0.0,
            diffs: Some(vec![Chunk::disaligned(a.to_vec(), b.to_vec())]),
        };
    }

    let ratio = (total_len as f64 - cost as f64) / total_len as f64;
    canonize(&mut codes);
    let diffs = codes_to_chunks(a, b, &codes, dig);
    Diff { ratio, diffs: Some(diffs) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn render(d: &Diff<char>) -> String {
        let mut out = String::new();
        for chunk in d.diffs.as_ref().unwrap() {
            let a: String = chunk.data_a.iter().collect();
            let b: String = chunk.data_b.iter().collect();
            match &chunk.eq {
                crate::chunk::ChunkEq::Equal => out.push_str(&format!(" {a}\n")),
                crate::chunk::ChunkEq::Disaligned => {
                    if !a.is_empty() {
                        out.push_str(&format!("-{a}\n"));
                    }
                    if !b.is_empty() {
                        out.push_str(&format!("+{b}\n"));
                    }
                }
                crate::chunk::ChunkEq::Nested(_) => out.push_str(&format!("~{a}/{b}\n")),
            }
        }
        out
    }

    #[test]
    fn empty_inputs_give_trivial_diff() {
        let a: Vec<char> = vec![];
        let b: Vec<char> = vec![];
        let mut oracle = Similarity::Pair(&a, &b);
        let d = diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        assert_eq!(d.ratio, 1.0);
        assert_eq!(d.diffs.unwrap().len(), 0);
    }

    #[test]
    fn fully_equal_inputs_give_ratio_one() {
        let a: Vec<char> = "hello".chars().collect();
        let b = a.clone();
        let mut oracle = Similarity::Pair(&a, &b);
        let d = diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        assert_eq!(d.ratio, 1.0);
        assert_eq!(d.get_a(), a);
        assert_eq!(d.get_b(), b);
    }

    #[test]
    fn partial_diff_with_min_ratio_zero_always_completes() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        let mut oracle = Similarity::Pair(&a, &b);
        let d = diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        assert!(d.ratio > 0.0 && d.ratio < 1.0);
        assert_eq!(d.get_a(), a);
        assert_eq!(d.get_b(), b);
    }

    #[test]
    fn strict_mode_collapses_on_budget_exhaustion() {
        let a: Vec<char> = "abcdefgh".chars().collect();
        let b: Vec<char> = "12345678".chars().collect();
        let mut oracle = Similarity::Pair(&a, &b);
        let budgets = Budgets {
            min_ratio: 0.99,
            ..Budgets::exhaustive()
        };
        let d = diff(&a, &b, &mut oracle, 1.0, budgets, false, None, true);
        assert_eq!(d.ratio, 0.0);
        let diffs = d.diffs.unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].eq.is_disaligned());
    }

    #[test]
    fn ice_into_alice_bob_matches_seed_scenario() {
        let a: Vec<char> = "ice".chars().collect();
        let b: Vec<char> = "alice bob".chars().collect();
        let mut oracle = Similarity::Pair(&a, &b);
        let budgets = Budgets {
            min_ratio: 0.0,
            ..Budgets::exhaustive()
        };
        let d = diff(&a, &b, &mut oracle, 1.0, budgets, false, None, false);
        assert_eq!(d.ratio, 0.5);
        let diffs = d.diffs.unwrap();
        let as_strings: Vec<(String, String, bool)> = diffs
            .iter()
            .map(|c| {
                (
                    c.data_a.iter().collect(),
                    c.data_b.iter().collect(),
                    c.eq.is_equal(),
                )
            })
            .collect();
        assert_eq!(
            as_strings,
            vec![
                ("".to_string(), "al".to_string(), false),
                ("ice".to_string(), "ice".to_string(), true),
                ("".to_string(), " bob".to_string(), false),
            ]
        );
    }

    #[test]
    fn budget_exhaustion_in_strict_mode_matches_seed_scenario() {
        let a: Vec<char> = "xxx".chars().collect();
        let b: Vec<char> = "a xxx xx".chars().collect();
        let mut oracle = Similarity::Pair(&a, &b);
        let budgets = Budgets {
            max_cost: 2,
            ..Budgets::exhaustive()
        };
        let d = diff(&a, &b, &mut oracle, 1.0, budgets, false, None, true);
        assert_eq!(d.ratio, 0.0);
        let diffs = d.diffs.unwrap();
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].eq.is_disaligned());
        assert_eq!(diffs[0].data_a, a);
        assert_eq!(diffs[0].data_b, b);
    }

    #[test]
    fn kitten_to_sitting_renders_as_expected() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        let mut oracle = Similarity::Pair(&a, &b);
        let d = diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        expect![[r#"
            -k
            +s
             itt
            -e
            +i
             n
            +g
        "#]]
        .assert_eq(&render(&d));
    }

    #[test]
    fn eq_only_skips_script_reconstruction() {
        let a: Vec<char> = "abcdef".chars().collect();
        let b: Vec<char> = "abcxef".chars().collect();
        let mut oracle = Similarity::Pair(&a, &b);
        let d = diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), true, None, false);
        assert!(d.diffs.is_none());
        assert!(d.ratio > 0.0);
    }
}
