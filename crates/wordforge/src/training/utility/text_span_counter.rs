//! # Text Span Counter

use crate::{
    normalizers::Normalizer,
    pretokenizers::PreTokenizer,
    training::{CountType, StringChunkType},
    types::WFHashMap,
    vocab::{InputSegment, SpecialMatcher, special_vocab::split_input},
};

/// Samples per parallel counting chunk.
#[cfg(feature = "rayon")]
const SAMPLE_CHUNK_SIZE: usize = 64;

/// The front half of the encoding pipeline, as seen by the trainer.
///
/// Special token surfaces are cut out of the corpus and never counted.
#[derive(Debug, Clone, Default)]
pub struct SpanSource {
    /// The normalizer.
    pub normalizer: Normalizer,

    /// The pre-tokenizer.
    pub pre_tokenizer: PreTokenizer,

    /// The special token matcher, if any specials are registered.
    pub specials: Option<SpecialMatcher>,
}

impl SpanSource {
    /// Call `f` on every normalized, pre-tokenized span of `text`.
    pub fn for_each_span<F>(
        &self,
        text: &str,
        mut f: F,
    ) where
        F: FnMut(&str),
    {
        for segment in split_input(self.specials.as_ref(), text) {
            if let InputSegment::Text(range) = segment {
                let normalized = self.normalizer.normalize_str(&text[range]);
                for span in self.pre_tokenizer.pre_tokenize(&normalized) {
                    f(span.text);
                }
            }
        }
    }
}

/// Span counts in first-appearance order.
#[derive(Debug, Clone)]
pub struct SpanTally<K, C> {
    index: WFHashMap<K, usize>,
    entries: Vec<(K, C)>,
}

impl<K, C> Default for SpanTally<K, C> {
    fn default() -> Self {
        Self {
            index: WFHashMap::default(),
            entries: Vec::new(),
        }
    }
}

impl<K, C> SpanTally<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Add `count` to `span`.
    pub fn add(
        &mut self,
        span: &str,
        count: C,
    ) {
        match self.index.get(span) {
            Some(&idx) => self.entries[idx].1 += count,
            None => {
                let key: K = span.into();
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
    }

    /// Fold in a tally of later text; order of first appearance is kept.
    pub fn absorb(
        &mut self,
        later: Self,
    ) {
        for (key, count) in later.entries {
            match self.index.get(key.as_ref()) {
                Some(&idx) => self.entries[idx].1 += count,
                None => {
                    self.index.insert(key.clone(), self.entries.len());
                    self.entries.push((key, count));
                }
            }
        }
    }

    /// The number of distinct spans.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the tally empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `(span, count)` entries in first-appearance order.
    pub fn entries(&self) -> &[(K, C)] {
        &self.entries
    }

    /// Release the entries.
    pub fn into_entries(self) -> Vec<(K, C)> {
        self.entries
    }
}

/// Counts distinct spans across a corpus.
#[derive(Debug, Clone)]
pub struct TextSpanCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// How text becomes spans.
    pub source: SpanSource,

    /// The counts so far.
    pub tally: SpanTally<K, C>,
}

impl<K, C> TextSpanCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Create a new counter.
    pub fn new(source: SpanSource) -> Self {
        Self {
            source,
            tally: SpanTally::default(),
        }
    }

    /// Update counts from one text.
    pub fn update_from_text<S: AsRef<str>>(
        &mut self,
        text: S,
    ) {
        let Self { source, tally } = self;
        source.for_each_span(text.as_ref(), |span| tally.add(span, C::one()));
    }

    /// Update counts from a sample batch.
    ///
    /// With the `rayon` feature, the batch is counted in parallel chunks that
    /// are reduced in order, so the result is identical to a serial pass.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, samples)))]
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str> + Send + Sync,
    {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                use rayon::prelude::*;

                let samples: Vec<I::Item> = samples.into_iter().collect();
                let source = &self.source;
                let partials: Vec<SpanTally<K, C>> = samples
                    .par_chunks(SAMPLE_CHUNK_SIZE)
                    .map(|chunk| {
                        let mut tally = SpanTally::default();
                        for sample in chunk {
                            source.for_each_span(sample.as_ref(), |span| tally.add(span, C::one()));
                        }
                        tally
                    })
                    .collect();

                for partial in partials {
                    self.tally.absorb(partial);
                }
            } else {
                for sample in samples {
                    self.update_from_text(sample);
                }
            }
        }
    }

    /// Release the tally.
    pub fn release(self) -> SpanTally<K, C> {
        self.tally
    }
}

#[cfg(test)]
mod tests {
    use compact_str::CompactString;

    use super::*;
    use crate::{
        normalizers::NormalizerConfig,
        vocab::{SpecialVocab, Vocabulary},
    };

    #[test]
    fn test_counts_in_first_appearance_order() {
        let mut counter: TextSpanCounter<CompactString, u64> =
            TextSpanCounter::new(SpanSource::default());

        counter.update_from_samples(["Hello world", "Foo world, bar world"]);

        let entries: Vec<(String, u64)> = counter
            .release()
            .into_entries()
            .into_iter()
            .map(|(k, c)| (k.to_string(), c))
            .collect();
        assert_eq!(entries, vec![
            ("Hello".to_string(), 1),
            ("world".to_string(), 3),
            ("Foo".to_string(), 1),
            (",".to_string(), 1),
            ("bar".to_string(), 1),
        ]);
    }

    #[test]
    fn test_normalizes_and_skips_specials() {
        let mut vocab = Vocabulary::new();
        let specials = SpecialVocab::with_defaults(&mut vocab).unwrap();
        let source = SpanSource {
            normalizer: NormalizerConfig::default().with_lowercase(true).into(),
            specials: SpecialMatcher::build(&specials).unwrap(),
            ..Default::default()
        };

        let mut counter: TextSpanCounter<String, u32> = TextSpanCounter::new(source);
        counter.update_from_text("[CLS]Hi HI[SEP]");

        assert_eq!(counter.tally.entries(), &[("hi".to_string(), 2)]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let samples: Vec<String> = (0..500).map(|i| format!("w{} w{} common", i % 37, i % 11)).collect();

        let mut batched: TextSpanCounter<String, u64> = TextSpanCounter::new(SpanSource::default());
        batched.update_from_samples(samples.iter());

        let mut serial: TextSpanCounter<String, u64> = TextSpanCounter::new(SpanSource::default());
        for sample in &samples {
            serial.update_from_text(sample);
        }

        assert_eq!(batched.tally.entries(), serial.tally.entries());
    }

    #[test]
    fn test_absorb() {
        let mut first: SpanTally<String, u32> = SpanTally::default();
        first.add("a", 1);
        first.add("b", 1);

        let mut later: SpanTally<String, u32> = SpanTally::default();
        later.add("c", 1);
        later.add("a", 2);

        first.absorb(later);
        assert_eq!(first.entries(), &[
            ("a".to_string(), 3),
            ("b".to_string(), 1),
            ("c".to_string(), 1)
        ]);
        assert_eq!(first.len(), 3);
    }
}
