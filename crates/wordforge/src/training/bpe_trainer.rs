//! # BPE Vocabulary Trainer

use core::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;

use compact_str::CompactString;
use dary_heap::OctonaryHeap;

use crate::{
    errors::{WFResult, WordforgeError},
    training::{
        CancelToken,
        CountType,
        StringChunkType,
        utility::{PairSpanIndex, SpanSource, SymbolSpanBuf, TextSpanCounter},
    },
    types::{Pair, TokenId, WFHashSet},
    vocab::{
        DEFAULT_END_OF_WORD_SUFFIX,
        MergeRule,
        MergeTable,
        Vocabulary,
        atomic_symbols,
        strip_end_of_word,
    },
};

/// Options for [`BpeTrainer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpeTrainerOptions {
    /// The target vocabulary size, reserved special tokens included.
    pub vocab_size: usize,

    /// Pairs seen fewer times than this are never merged.
    pub min_frequency: u64,

    /// The suffix carried by the last symbol of each span.
    pub end_of_word_suffix: Option<CompactString>,

    /// Merged symbols longer than this many characters
    /// (suffix excluded) are never created.
    pub max_token_length: Option<usize>,
}

impl BpeTrainerOptions {
    /// Create new options.
    ///
    /// ## Arguments
    /// * `vocab_size` - The target vocabulary size.
    ///
    /// ## Returns
    /// Options with `min_frequency = 1` and the default end-of-word suffix.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            min_frequency: 1,
            end_of_word_suffix: Some(DEFAULT_END_OF_WORD_SUFFIX.into()),
            max_token_length: None,
        }
    }

    /// Sets the vocab size.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets the minimum pair frequency.
    pub fn with_min_frequency(
        self,
        min_frequency: u64,
    ) -> Self {
        Self {
            min_frequency,
            ..self
        }
    }

    /// Sets the end-of-word suffix.
    pub fn with_end_of_word_suffix<S: Into<CompactString>>(
        self,
        suffix: Option<S>,
    ) -> Self {
        Self {
            end_of_word_suffix: suffix.map(Into::into),
            ..self
        }
    }

    /// Sets the maximum merged symbol length.
    pub fn with_max_token_length(
        self,
        max_token_length: Option<usize>,
    ) -> Self {
        Self {
            max_token_length,
            ..self
        }
    }

    /// Check the options.
    pub fn validate(&self) -> WFResult<()> {
        if self.vocab_size == 0 {
            return Err(WordforgeError::config("vocab_size must be > 0"));
        }
        if self.min_frequency == 0 {
            return Err(WordforgeError::config("min_frequency must be > 0"));
        }
        if self.max_token_length == Some(0) {
            return Err(WordforgeError::config("max_token_length must be > 0"));
        }
        if matches!(&self.end_of_word_suffix, Some(s) if s.is_empty()) {
            return Err(WordforgeError::config(
                "end_of_word_suffix must be non-empty",
            ));
        }
        Ok(())
    }
}

/// A candidate merge in the training heap.
///
/// The count may be stale; it is refreshed lazily when popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeJob<C: CountType> {
    /// The pair count when this job was pushed.
    pub count: C,

    /// The first-seen sequence number of the pair.
    pub stamp: u64,

    /// The pair to merge.
    pub pair: Pair<TokenId>,
}

impl<C: CountType> MergeJob<C> {
    /// The job key.
    ///
    /// Max-heap by count; ties go to the pair seen first.
    pub fn heap_key(&self) -> (C, Reverse<u64>) {
        (self.count, Reverse(self.stamp))
    }
}

impl<C: CountType> PartialOrd for MergeJob<C> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: CountType> Ord for MergeJob<C> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// The products of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainResults {
    /// The vocabulary: reserved entries, the alphabet, then merged symbols.
    pub vocab: Vocabulary,

    /// The learned merges, in rank order.
    pub merges: MergeTable,
}

/// Trainer for byte-pair-encoding style subword vocabularies.
///
/// # Parameters
/// * `K` - the type used to store span strings while counting.
/// * `C` - the type used to store counts.
#[derive(Debug, Clone)]
pub struct BpeTrainer<K = CompactString, C = u64>
where
    K: StringChunkType,
    C: CountType,
{
    /// Trainer options.
    pub options: BpeTrainerOptions,

    /// The corpus span counter.
    pub span_counter: TextSpanCounter<K, C>,

    cancel: Option<CancelToken>,
}

impl<K, C> BpeTrainer<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Create a trainer.
    ///
    /// ## Arguments
    /// * `options` - The trainer options; validated here.
    /// * `source` - How corpus text becomes spans.
    pub fn new(
        options: BpeTrainerOptions,
        source: SpanSource,
    ) -> WFResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            span_counter: TextSpanCounter::new(source),
            cancel: None,
        })
    }

    /// Attach a cancellation token, checked between merge rounds.
    pub fn with_cancel_token(
        self,
        cancel: CancelToken,
    ) -> Self {
        Self {
            cancel: Some(cancel),
            ..self
        }
    }

    /// Update span counts from a sample batch.
    ///
    /// Batches accumulate; call once per corpus source.
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str> + Send + Sync,
    {
        self.span_counter.update_from_samples(samples);
    }

    fn check_cancelled(&self) -> WFResult<()> {
        match &self.cancel {
            Some(cancel) if cancel.is_cancelled() => Err(WordforgeError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Run the merge loop.
    ///
    /// ## Arguments
    /// * `base_vocab` - the reserved entries (special tokens) at fixed ids.
    ///   Trained entries fill the lowest free ids around them.
    ///
    /// ## Returns
    /// The trained vocabulary and merges; [`WordforgeError::EmptyCorpus`] if no
    /// spans were counted; [`WordforgeError::Config`] if the reserved ids
    /// leave holes that training could not fill.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, base_vocab)))]
    pub fn train(
        self,
        base_vocab: Vocabulary,
    ) -> WFResult<TrainResults> {
        self.check_cancelled()?;

        let suffix = self.options.end_of_word_suffix.clone();
        let suffix = suffix.as_deref();
        let mut vocab = base_vocab;

        let entries = self.span_counter.tally.entries();
        if entries.is_empty() {
            return Err(WordforgeError::EmptyCorpus);
        }
        log::info!("Starting BPE training over {} distinct spans", entries.len());

        // Alphabet: every observed atomic symbol, sorted.
        let span_symbols: Vec<Vec<CompactString>> = entries
            .iter()
            .map(|(span, _)| {
                atomic_symbols(span.as_ref(), suffix)
                    .into_iter()
                    .map(|(_, symbol)| symbol)
                    .collect()
            })
            .collect();
        let alphabet: BTreeSet<&CompactString> = span_symbols.iter().flatten().collect();
        log::info!("Alphabet has {} symbols", alphabet.len());
        for symbol in alphabet {
            vocab.insert(symbol);
        }

        let mut spans: Vec<SymbolSpanBuf> = span_symbols
            .iter()
            .map(|symbols| {
                symbols
                    .iter()
                    .filter_map(|s| vocab.get_id(s))
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect();
        let counts: Vec<C> = entries.iter().map(|&(_, count)| count).collect();
        drop(span_symbols);

        log::info!("Building pair index...");
        let mut index = PairSpanIndex::from_span_count_table(&spans, &counts);

        let zero = C::zero();
        let min_frequency = C::from_u64(self.options.min_frequency).unwrap_or_else(C::max_value);

        log::info!("Building heap with {} unique pairs", index.pair_counts.len());
        let mut heap: OctonaryHeap<MergeJob<C>> = OctonaryHeap::with_capacity(index.pair_counts.len());
        for (&pair, &count) in index.pair_counts.iter() {
            if count > zero {
                heap.push(MergeJob {
                    count,
                    stamp: index.first_seen.get(&pair).copied().unwrap_or(u64::MAX),
                    pair,
                });
            }
        }

        let target = self.options.vocab_size;
        let planned = target.saturating_sub(vocab.len());
        let mut rules: Vec<MergeRule> = Vec::with_capacity(planned);
        let mut rejected: WFHashSet<Pair<TokenId>> = WFHashSet::default();
        let mut last_log_percent = 0;

        log::info!("Starting merge loop: up to {planned} new symbols");
        while vocab.len() < target {
            self.check_cancelled()?;

            let Some(mut job) = heap.pop() else {
                break;
            };

            {
                // Lazy refresh the job count.
                let current = index.pair_counts.get(&job.pair).copied().unwrap_or(zero);
                if job.count != current {
                    job.count = current;
                    if current > zero {
                        heap.push(job);
                    }
                    continue;
                }
            }

            if job.count < min_frequency || job.count == zero {
                break;
            }
            if rejected.contains(&job.pair) {
                continue;
            }

            let (left, right) = job.pair;
            let rule = match (vocab.get_token(left), vocab.get_token(right)) {
                (Some(l), Some(r)) => MergeRule::new(l, r),
                _ => {
                    return Err(WordforgeError::config(format!(
                        "pair {:?} references ids outside the vocabulary",
                        job.pair
                    )));
                }
            };
            let merged = rule.merged();

            if let Some(max) = self.options.max_token_length {
                let (stem, _) = strip_end_of_word(&merged, suffix);
                if stem.chars().count() > max {
                    rejected.insert(job.pair);
                    continue;
                }
            }

            let new_token = vocab.insert(&merged);
            rules.push(rule);

            let mut affected: Vec<usize> = index
                .pair_spans
                .get(&job.pair)
                .map(|indices| indices.iter().copied().collect())
                .unwrap_or_default();
            affected.sort_unstable();

            let mut touched: Vec<Pair<TokenId>> = Vec::new();
            let mut touched_set: WFHashSet<Pair<TokenId>> = WFHashSet::default();
            for span_idx in affected {
                let weight = counts[span_idx];
                spans[span_idx].merge_pair_cb(job.pair, new_token, &mut |pair, delta| {
                    if delta < 0 {
                        if let Some(count) = index.pair_counts.get_mut(&pair) {
                            *count = count.saturating_sub(weight);
                        }
                    } else {
                        *index.pair_counts.entry(pair).or_default() += weight;
                        index.pair_spans.entry(pair).or_default().insert(span_idx);
                        index.observe(pair);
                        if touched_set.insert(pair) {
                            touched.push(pair);
                        }
                    }
                });
            }

            for pair in touched {
                let count = index.pair_counts.get(&pair).copied().unwrap_or(zero);
                if count > zero {
                    heap.push(MergeJob {
                        count,
                        stamp: index.first_seen.get(&pair).copied().unwrap_or(u64::MAX),
                        pair,
                    });
                }
            }

            // Log progress every 1%
            if planned > 0 {
                let done = planned - target.saturating_sub(vocab.len());
                let current_percent = (done * 100) / planned;
                if current_percent > last_log_percent {
                    log::info!(
                        "Progress: {}% ({}/{} symbols) - Last merge: {:?} -> {} (frequency: {})",
                        current_percent,
                        done,
                        planned,
                        merged,
                        new_token,
                        job.count
                    );
                    last_log_percent = current_percent;
                }
            }
        }

        if !vocab.is_contiguous() {
            return Err(WordforgeError::config(format!(
                "training produced {} entries, too few to fill the ids below the reserved id {}",
                vocab.len(),
                vocab.id_bound() - 1
            )));
        }

        log::info!(
            "Finished training: {} merges, vocabulary size {}",
            rules.len(),
            vocab.len()
        );
        let merges = MergeTable::from_rules(rules, &vocab)?;
        Ok(TrainResults { vocab, merges })
    }
}
