//! Property-based checks for the quantified invariants of `sequence::diff`,
//! `Signature`, and chunk coarsening, over small random sequences — the
//! concrete scenarios in the unit tests exercise fixed cases, these exercise
//! the general claim.

use proptest::prelude::*;
use rdiff_core::budget::Budgets;
use rdiff_core::{algebra, sequence, Similarity};

fn arb_symbol() -> impl Strategy<Value = char> {
    prop_oneof![Just('a'), Just('b'), Just('c'), Just('d')]
}

fn arb_sequence() -> impl Strategy<Value = Vec<char>> {
    proptest::collection::vec(arb_symbol(), 0..=12)
}

proptest! {
    #[test]
    fn get_a_get_b_reconstruct_the_inputs(a in arb_sequence(), b in arb_sequence()) {
        let mut oracle = Similarity::Pair(&a, &b);
        let diff = sequence::diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        let diffs = diff.diffs.as_ref();
        prop_assume!(diffs.is_some());
        prop_assert_eq!(diff.get_a(), a);
        prop_assert_eq!(diff.get_b(), b);
    }

    #[test]
    fn identical_sequences_have_ratio_one(a in arb_sequence()) {
        let b = a.clone();
        let mut oracle = Similarity::Pair(&a, &b);
        let diff = sequence::diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        prop_assert_eq!(diff.ratio, 1.0);
        let diffs = diff.diffs.unwrap();
        prop_assert!(diffs.len() <= 1);
        if let Some(chunk) = diffs.first() {
            prop_assert!(chunk.eq.is_equal());
        }
    }

    #[test]
    fn ratio_is_always_bounded(a in arb_sequence(), b in arb_sequence()) {
        let mut oracle = Similarity::Pair(&a, &b);
        let diff = sequence::diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), true, None, false);
        prop_assert!(diff.ratio >= 0.0 && diff.ratio <= 1.0);
    }

    #[test]
    fn signature_lengths_sum_over_parts(a in arb_sequence(), b in arb_sequence()) {
        let mut oracle = Similarity::Pair(&a, &b);
        let diff = sequence::diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        let sig = diff.signature();
        let len_a: usize = sig.parts.iter().map(|p| p.size_a).sum();
        let len_b: usize = sig.parts.iter().map(|p| p.size_b).sum();
        prop_assert_eq!(len_a, sig.len_a());
        prop_assert_eq!(len_b, sig.len_b());
        prop_assert_eq!(sig.len(), sig.parts.iter().map(|p| p.len()).sum::<usize>());
    }

    #[test]
    fn tighter_budget_never_beats_a_looser_one(a in arb_sequence(), b in arb_sequence(), cut in 0usize..20) {
        let loose = Budgets::exhaustive();
        let mut oracle = Similarity::Pair(&a, &b);
        let loose_ratio = sequence::diff(&a, &b, &mut oracle, 1.0, loose, true, None, false).ratio;

        let tight = Budgets { max_cost: cut, ..loose };
        let mut oracle = Similarity::Pair(&a, &b);
        let tight_ratio = sequence::diff(&a, &b, &mut oracle, 1.0, tight, true, None, false).ratio;

        prop_assert!(tight_ratio <= loose_ratio + 1e-9);
    }

    #[test]
    fn coarsening_is_idempotent(a in arb_sequence(), b in arb_sequence(), min_run in 0usize..5) {
        let mut oracle = Similarity::Pair(&a, &b);
        let diff = sequence::diff(&a, &b, &mut oracle, 1.0, Budgets::exhaustive(), false, None, false);
        let once = algebra::coarsen(diff, min_run);
        let twice = algebra::coarsen(once.clone(), min_run);
        let once_shapes: Vec<(usize, usize, Option<bool>)> = once
            .diffs
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| (c.data_a.len(), c.data_b.len(), c.eq.as_bool()))
            .collect();
        let twice_shapes: Vec<(usize, usize, Option<bool>)> = twice
            .diffs
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| (c.data_a.len(), c.data_b.len(), c.eq.as_bool()))
            .collect();
        prop_assert_eq!(once_shapes, twice_shapes);
    }
}
