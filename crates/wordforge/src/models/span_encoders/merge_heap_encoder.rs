//! # Merge Heap [`SpanEncoder`]
//!
//! A d-ary min-heap of candidate merges over a doubly-linked list of symbols.
//! O(n log n) per span, against the O(n^2) rescans of
//! [`super::RankScanSpanEncoder`].

use core::cmp::{Ordering, Reverse};

use dary_heap::OctonaryHeap;

use crate::{
    models::span_encoders::{SpanEncoder, Symbol},
    types::TokenId,
    vocab::MergeTable,
};

const NONE: u32 = u32::MAX;

#[derive(Debug, Clone)]
struct Node {
    symbol: Symbol,
    prev: u32,
    next: u32,
}

/// A candidate merge.
///
/// Ordered by `(rank, left_idx)`; the ids are kept to detect stale entries.
#[derive(Debug, Clone, Copy, Eq)]
struct MergeEntry {
    rank: u32,
    left_idx: u32,
    left_id: TokenId,
    right_id: TokenId,
    token: TokenId,
}

impl PartialEq for MergeEntry {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.rank == other.rank && self.left_idx == other.left_idx
    }
}

impl Ord for MergeEntry {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then(self.left_idx.cmp(&other.left_idx))
    }
}

impl PartialOrd for MergeEntry {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A [`SpanEncoder`] driven by a rank-keyed worklist.
///
/// Working memory is kept between calls.
#[derive(Default, Debug, Clone)]
pub struct MergeHeapSpanEncoder {
    nodes: Vec<Node>,
    heap: OctonaryHeap<Reverse<MergeEntry>>,
}

impl MergeHeapSpanEncoder {
    fn push_candidate(
        &mut self,
        merges: &MergeTable,
        left_idx: u32,
    ) {
        let right_idx = self.nodes[left_idx as usize].next;
        if right_idx == NONE {
            return;
        }
        let (Some(left_id), Some(right_id)) = (
            self.nodes[left_idx as usize].symbol.id,
            self.nodes[right_idx as usize].symbol.id,
        ) else {
            return;
        };
        if let Some(target) = merges.lookup((left_id, right_id)) {
            self.heap.push(Reverse(MergeEntry {
                rank: target.rank,
                left_idx,
                left_id,
                right_id,
                token: target.token,
            }));
        }
    }
}

impl SpanEncoder for MergeHeapSpanEncoder {
    fn merge_symbols(
        &mut self,
        merges: &MergeTable,
        symbols: &mut Vec<Symbol>,
    ) {
        let n = symbols.len();
        if n < 2 || merges.is_empty() {
            return;
        }

        self.nodes.clear();
        self.nodes.reserve(n);
        for (i, symbol) in symbols.drain(..).enumerate() {
            self.nodes.push(Node {
                symbol,
                prev: if i == 0 { NONE } else { (i - 1) as u32 },
                next: if i + 1 < n { (i + 1) as u32 } else { NONE },
            });
        }

        self.heap.clear();
        for i in 0..(n - 1) {
            self.push_candidate(merges, i as u32);
        }

        while let Some(Reverse(entry)) = self.heap.pop() {
            let li = entry.left_idx as usize;
            let ri_u32 = self.nodes[li].next;
            if ri_u32 == NONE {
                continue;
            }
            let ri = ri_u32 as usize;

            // Stale: adjacency or either side changed since the push.
            if self.nodes[ri].prev != entry.left_idx
                || self.nodes[li].symbol.id != Some(entry.left_id)
                || self.nodes[ri].symbol.id != Some(entry.right_id)
            {
                continue;
            }

            // Left absorbs right.
            let right_end = self.nodes[ri].symbol.end;
            let right_next = self.nodes[ri].next;
            {
                let left = &mut self.nodes[li];
                left.symbol.id = Some(entry.token);
                left.symbol.end = right_end;
                left.next = right_next;
            }
            // Unlink the absorbed node.
            self.nodes[ri].prev = NONE;
            self.nodes[ri].next = NONE;
            if right_next != NONE {
                self.nodes[right_next as usize].prev = entry.left_idx;
            }

            let left_prev = self.nodes[li].prev;
            if left_prev != NONE {
                self.push_candidate(merges, left_prev);
            }
            self.push_candidate(merges, entry.left_idx);
        }

        let mut idx = 0u32;
        while idx != NONE {
            let node = &self.nodes[idx as usize];
            symbols.push(node.symbol.clone());
            idx = node.next;
        }
    }
}
