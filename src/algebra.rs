//! L5: chunk algebra — compressing/coarsening a chunk list, and iterating
//! over just the "important" (non-equal, or nested-different) positions.

use crate::chunk::{Chunk, ChunkEq, Diff, Item, NestedItem};

/// Merges consecutive chunks that share the same boolean `eq` (`Equal`
/// folds into `Equal`, `Disaligned` into `Disaligned`). A [`ChunkEq::Nested`]
/// chunk is never merged with its neighbors — it always starts and ends its
/// own group.
pub fn iter_compressed<T: Clone>(diffs: Vec<Chunk<T>>) -> Vec<Chunk<T>> {
    let mut out = Vec::new();
    let mut current: Option<Chunk<T>> = None;

    for chunk in diffs {
        match (current.take(), chunk.eq.as_bool()) {
            (Some(cur), Some(next_b)) if cur.eq.as_bool() == Some(next_b) => {
                current = Some(cur.concat_bool(chunk));
            }
            (Some(cur), _) => {
                out.push(cur);
                current = Some(chunk);
            }
            (None, _) => current = Some(chunk),
        }
    }
    if let Some(cur) = current {
        out.push(cur);
    }
    out
}

/// Merges runs of equal chunks no longer than `min_run` into their
/// surrounding disaligned neighbors, after first compressing. A `Nested`
/// chunk is never folded into the buffer regardless of length — it is
/// always flushed standalone (matching the rule that nested chunks are a
/// sealed boundary for concatenation).
pub fn coarsen<T: Clone>(diff: Diff<T>, min_run: usize) -> Diff<T> {
    let diffs = diff.diffs.expect("no diff data");
    let compressed = iter_compressed(diffs);

    let mut out = Vec::new();
    let mut buffer: Option<Chunk<T>> = None;

    for chunk in compressed {
        let flush_standalone = match &chunk.eq {
            ChunkEq::Nested(_) => true,
            ChunkEq::Equal => chunk.data_a.len() > min_run,
            ChunkEq::Disaligned => false,
        };
        if flush_standalone {
            if let Some(b) = buffer.take() {
                out.push(b);
            }
            out.push(chunk);
        } else {
            buffer = Some(match buffer.take() {
                Some(b) => b.concat_bool(chunk),
                None => chunk,
            });
        }
    }
    if let Some(b) = buffer {
        out.push(b);
    }

    Diff {
        ratio: diff.ratio,
        diffs: Some(out),
    }
}

/// One event yielded by [`iter_important`]: either an interesting position,
/// or a count of skipped equal pairs lying between interesting regions.
#[derive(Debug, Clone)]
pub enum ImportantEvent<T> {
    /// A disaligned or nested-different position (or equal context around
    /// one, within `context_size`).
    Item(Item<T>),
    /// The number of equal pairs skipped at this point.
    Skip(usize),
}

fn flush_pending<T: Clone>(events: &mut Vec<ImportantEvent<T>>, pending: &mut Option<(usize, Vec<Item<T>>)>) {
    if let Some((gap, tail_items)) = pending.take() {
        if gap > 0 {
            events.push(ImportantEvent::Skip(gap));
        }
        events.extend(tail_items.into_iter().map(ImportantEvent::Item));
    }
}

/// Iterates over the non-equal (or nested-different) positions of `diff`,
/// surfacing up to `context_size` equal pairs immediately before and after
/// each interesting region and collapsing longer equal gaps to a single
/// [`ImportantEvent::Skip`] count. A skip marker never appears at the very
/// start; a final trailing equal region is emitted as a skip only (no head
/// context, since nothing interesting follows it).
pub fn iter_important<T: Clone>(diff: &Diff<T>, context_size: usize) -> Vec<ImportantEvent<T>> {
    let diffs = diff.diffs.as_ref().expect("no diff data");
    let mut events = Vec::new();
    let mut pending: Option<(usize, Vec<Item<T>>)> = None;
    let (mut counter_a, mut counter_b) = (0usize, 0usize);

    for (i_chunk, chunk) in diffs.iter().enumerate() {
        match &chunk.eq {
            ChunkEq::Equal => {
                let n = chunk.data_a.len();
                let head_size = if i_chunk != 0 { context_size } else { 0 };
                if head_size > 0 {
                    for k in 0..head_size.min(n) {
                        events.push(ImportantEvent::Item(Item {
                            a: Some(chunk.data_a[k].clone()),
                            b: Some(chunk.data_b[k].clone()),
                            ix_a: Some(counter_a + k),
                            ix_b: Some(counter_b + k),
                            diff: None,
                        }));
                    }
                }
                let gap_raw = n as i64 - context_size as i64 - head_size as i64;
                let gap = gap_raw.max(0) as usize;
                let tail_start = (gap + head_size).min(n);
                let tail_items: Vec<Item<T>> = (tail_start..n)
                    .map(|k| Item {
                        a: Some(chunk.data_a[k].clone()),
                        b: Some(chunk.data_b[k].clone()),
                        ix_a: Some(counter_a + k),
                        ix_b: Some(counter_b + k),
                        diff: None,
                    })
                    .collect();
                pending = Some((gap, tail_items));
            }
            ChunkEq::Disaligned => {
                flush_pending(&mut events, &mut pending);
                for (k, a) in chunk.data_a.iter().enumerate() {
                    events.push(ImportantEvent::Item(Item {
                        a: Some(a.clone()),
                        b: None,
                        ix_a: Some(counter_a + k),
                        ix_b: None,
                        diff: None,
                    }));
                }
                for (k, b) in chunk.data_b.iter().enumerate() {
                    events.push(ImportantEvent::Item(Item {
                        a: None,
                        b: Some(b.clone()),
                        ix_a: None,
                        ix_b: Some(counter_b + k),
                        diff: None,
                    }));
                }
            }
            ChunkEq::Nested(items) => {
                flush_pending(&mut events, &mut pending);
                for (k, item) in items.iter().enumerate() {
                    let diff = match item {
                        NestedItem::Exact => None,
                        NestedItem::Differs(d) => Some(d.clone()),
                    };
                    events.push(ImportantEvent::Item(Item {
                        a: Some(chunk.data_a[k].clone()),
                        b: Some(chunk.data_b[k].clone()),
                        ix_a: Some(counter_a + k),
                        ix_b: Some(counter_b + k),
                        diff,
                    }));
                }
            }
        }
        counter_a += chunk.data_a.len();
        counter_b += chunk.data_b.len();
    }

    if let Some((gap, tail_items)) = pending {
        let leftover = gap + tail_items.len();
        if leftover > 0 {
            events.push(ImportantEvent::Skip(leftover));
        }
    }

    events
}
