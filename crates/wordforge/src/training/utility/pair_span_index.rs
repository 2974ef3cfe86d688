//! # Pair Span Index

use crate::{
    training::{CountType, utility::SymbolSpanBuf},
    types::{Pair, TokenId, WFHashMap, WFHashSet},
};

/// A map from [`Pair`] to its weighted occurrence count.
pub type PairCountMap<C> = WFHashMap<Pair<TokenId>, C>;

/// A map from [`Pair`] to the indices of spans that may contain it.
pub type PairIndexMap = WFHashMap<Pair<TokenId>, WFHashSet<usize>>;

/// A map from [`Pair`] to its first-seen sequence number.
pub type PairStampMap = WFHashMap<Pair<TokenId>, u64>;

/// Spans per parallel indexing chunk.
#[cfg(feature = "rayon")]
const INDEX_CHUNK_SIZE: usize = 4096;

/// Pair statistics over a `&[SymbolSpanBuf]` table.
#[derive(Debug, Clone)]
pub struct PairSpanIndex<C: CountType> {
    /// ``sum(spans[i].pair_windows(pair) * counts[i]) for all i``
    pub pair_counts: PairCountMap<C>,

    /// Span indices per pair.
    pub pair_spans: PairIndexMap,

    /// First-seen sequence numbers, in `(span index, position)` order.
    pub first_seen: PairStampMap,

    /// The next unused sequence number.
    pub next_stamp: u64,
}

/// The index of one chunk, before stamps are assigned.
struct ChunkIndex<C> {
    pair_counts: PairCountMap<C>,
    pair_spans: PairIndexMap,
    first_pos: WFHashMap<Pair<TokenId>, (usize, usize)>,
}

impl<C: CountType> ChunkIndex<C> {
    fn build(
        offset: usize,
        spans: &[SymbolSpanBuf],
        counts: &[C],
    ) -> Self {
        let mut chunk = Self {
            pair_counts: WFHashMap::default(),
            pair_spans: WFHashMap::default(),
            first_pos: WFHashMap::default(),
        };
        for (local, (span, &count)) in spans.iter().zip(counts).enumerate() {
            if count == C::zero() || span.len() < 2 {
                continue;
            }
            let index = offset + local;
            for (pos, pair) in span.pairs().enumerate() {
                *chunk.pair_counts.entry(pair).or_default() += count;
                chunk.pair_spans.entry(pair).or_default().insert(index);
                chunk.first_pos.entry(pair).or_insert((index, pos));
            }
        }
        chunk
    }

    /// Fold a later chunk into this one.
    fn absorb(
        &mut self,
        later: Self,
    ) {
        for (pair, count) in later.pair_counts {
            *self.pair_counts.entry(pair).or_default() += count;
        }
        for (pair, indices) in later.pair_spans {
            self.pair_spans.entry(pair).or_default().extend(indices);
        }
        for (pair, pos) in later.first_pos {
            self.first_pos.entry(pair).or_insert(pos);
        }
    }
}

impl<C: CountType> PairSpanIndex<C> {
    /// Build a [`PairSpanIndex`] from a span table.
    ///
    /// The result does not depend on how the table is chunked: first-seen
    /// stamps follow `(span index, position)` order.
    ///
    /// ## Arguments
    /// * `spans` - distinct spans, in first-appearance order.
    /// * `counts` - `counts[i]` is the corpus count of `spans[i]`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(spans, counts)))]
    pub fn from_span_count_table(
        spans: &[SymbolSpanBuf],
        counts: &[C],
    ) -> Self {
        debug_assert_eq!(spans.len(), counts.len());

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                use rayon::prelude::*;

                let chunks: Vec<ChunkIndex<C>> = spans
                    .par_chunks(INDEX_CHUNK_SIZE)
                    .zip(counts.par_chunks(INDEX_CHUNK_SIZE))
                    .enumerate()
                    .map(|(i, (s, c))| ChunkIndex::build(i * INDEX_CHUNK_SIZE, s, c))
                    .collect();

                let mut chunks = chunks.into_iter();
                let mut index = match chunks.next() {
                    Some(first) => first,
                    None => ChunkIndex::build(0, &[], &[]),
                };
                for chunk in chunks {
                    index.absorb(chunk);
                }
            } else {
                let index = ChunkIndex::build(0, spans, counts);
            }
        }

        let ChunkIndex {
            pair_counts,
            pair_spans,
            first_pos,
        } = index;

        let mut ordered: Vec<(Pair<TokenId>, (usize, usize))> = first_pos.into_iter().collect();
        ordered.sort_unstable_by_key(|&(_, pos)| pos);

        let next_stamp = ordered.len() as u64;
        let first_seen: PairStampMap = ordered
            .into_iter()
            .enumerate()
            .map(|(stamp, (pair, _))| (pair, stamp as u64))
            .collect();

        Self {
            pair_counts,
            pair_spans,
            first_seen,
            next_stamp,
        }
    }

    /// Stamp `pair` if it has never been seen.
    pub fn observe(
        &mut self,
        pair: Pair<TokenId>,
    ) -> u64 {
        let next = &mut self.next_stamp;
        *self.first_seen.entry(pair).or_insert_with(|| {
            let stamp = *next;
            *next += 1;
            stamp
        })
    }
}
