//! # Template Post-processor

use serde::{Deserialize, Serialize};

use crate::{
    encoding::Encoding,
    errors::{WFResult, WordforgeError},
    processors::{Piece, SequenceId, Template},
    vocab::SpecialVocab,
};

/// Named template presets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TemplatePreset {
    /// `cls $A sep` / `cls $A sep $B:1 sep:1`.
    Bert,

    /// `bos $A eos` / `bos $A eos bos:1 $B:1 eos:1`.
    BosEos,
}

impl TemplatePreset {
    /// The template sources: `(single, pair)`.
    pub fn sources(&self) -> (&'static str, &'static str) {
        match self {
            TemplatePreset::Bert => ("cls $A sep", "cls $A sep $B:1 sep:1"),
            TemplatePreset::BosEos => ("bos $A eos", "bos $A eos bos:1 $B:1 eos:1"),
        }
    }
}

/// Post-processor configuration.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostProcessorConfig {
    /// Sequences pass through; a second sequence gets type id `1`.
    #[default]
    None,

    /// A named preset.
    Preset {
        /// The preset.
        preset: TemplatePreset,

        /// When `false`, the preset inserts no special tokens.
        add_special_tokens: bool,
    },

    /// Explicit templates.
    ///
    /// At least one of `single` and `pair` must be set.
    Custom {
        /// The template for one sequence; must place `$A` only.
        single: Option<Template>,

        /// The template for two sequences; must place `$A` and `$B`.
        pair: Option<Template>,
    },
}

impl PostProcessorConfig {
    /// The BERT preset.
    pub fn bert(add_special_tokens: bool) -> Self {
        Self::Preset {
            preset: TemplatePreset::Bert,
            add_special_tokens,
        }
    }
}

/// Interprets [`Template`]s over encoded sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateProcessor {
    single: Option<Template>,
    pair: Option<Template>,
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl TemplateProcessor {
    fn passthrough() -> Self {
        Self {
            single: Some(Template {
                pieces: vec![Piece::Sequence {
                    id: SequenceId::A,
                    type_id: 0,
                }],
            }),
            pair: Some(Template {
                pieces: vec![
                    Piece::Sequence {
                        id: SequenceId::A,
                        type_id: 0,
                    },
                    Piece::Sequence {
                        id: SequenceId::B,
                        type_id: 1,
                    },
                ],
            }),
        }
    }

    /// Build a processor from a config.
    ///
    /// Checks template shape; special token names are checked by
    /// [`TemplateProcessor::validate`].
    pub fn from_config(config: &PostProcessorConfig) -> WFResult<Self> {
        match config {
            PostProcessorConfig::None => Ok(Self::passthrough()),
            PostProcessorConfig::Preset {
                add_special_tokens: false,
                ..
            } => Ok(Self::passthrough()),
            PostProcessorConfig::Preset { preset, .. } => {
                let (single, pair) = preset.sources();
                Self::new(Some(single.parse()?), Some(pair.parse()?))
            }
            PostProcessorConfig::Custom { single, pair } => Self::new(single.clone(), pair.clone()),
        }
    }

    /// Build a processor from templates.
    pub fn new(
        single: Option<Template>,
        pair: Option<Template>,
    ) -> WFResult<Self> {
        if single.is_none() && pair.is_none() {
            return Err(WordforgeError::template(
                "at least one of the single and pair templates is required",
            ));
        }
        if let Some(single) = &single {
            if !single.contains(SequenceId::A) || single.contains(SequenceId::B) {
                return Err(WordforgeError::template(format!(
                    "single template {single:?} must place $A and not $B",
                    single = single.to_string()
                )));
            }
        }
        if let Some(pair) = &pair {
            if !pair.contains(SequenceId::A) || !pair.contains(SequenceId::B) {
                return Err(WordforgeError::template(format!(
                    "pair template {pair:?} must place both $A and $B",
                    pair = pair.to_string()
                )));
            }
        }
        Ok(Self { single, pair })
    }

    /// The single sequence template.
    pub fn single(&self) -> Option<&Template> {
        self.single.as_ref()
    }

    /// The pair template.
    pub fn pair(&self) -> Option<&Template> {
        self.pair.as_ref()
    }

    /// Check that every referenced special token is registered.
    pub fn validate(
        &self,
        specials: &SpecialVocab,
    ) -> WFResult<()> {
        for template in self.single.iter().chain(self.pair.iter()) {
            for name in template.special_names() {
                if specials.resolve(name).is_none() {
                    return Err(WordforgeError::template(format!(
                        "special token {name:?} is not registered"
                    )));
                }
            }
        }
        Ok(())
    }

    fn template_for(
        &self,
        is_pair: bool,
    ) -> WFResult<&Template> {
        match (is_pair, &self.single, &self.pair) {
            (false, Some(single), _) => Ok(single),
            (true, _, Some(pair)) => Ok(pair),
            (false, None, _) => Err(WordforgeError::template(
                "the template requires two sequences, but one was given",
            )),
            (true, _, None) => Err(WordforgeError::template(
                "the template accepts one sequence, but two were given",
            )),
        }
    }

    /// The number of tokens [`TemplateProcessor::apply`] adds.
    ///
    /// `0` if no template handles `is_pair`.
    pub fn added_tokens(
        &self,
        is_pair: bool,
    ) -> usize {
        self.template_for(is_pair)
            .map(Template::added_tokens)
            .unwrap_or(0)
    }

    /// Arrange one or two sequences per the template.
    ///
    /// ## Arguments
    /// * `a` - The first sequence.
    /// * `b` - The optional second sequence.
    /// * `specials` - The registry special names resolve against.
    pub fn apply(
        &self,
        a: Encoding,
        b: Option<Encoding>,
        specials: &SpecialVocab,
    ) -> WFResult<Encoding> {
        let template = self.template_for(b.is_some())?;

        let capacity = a.len() + b.as_ref().map_or(0, Encoding::len) + template.added_tokens();
        let mut result = Encoding::with_capacity(capacity);
        let (mut a, mut b) = (Some(a), b);

        for piece in template.pieces() {
            match piece {
                Piece::Special { name, type_id } => {
                    let token = specials.resolve(name).ok_or_else(|| {
                        WordforgeError::template(format!("special token {name:?} is not registered"))
                    })?;
                    result.push_template_token(token.id, token.content.clone(), *type_id);
                }
                Piece::Sequence { id, type_id } => {
                    let seq = match id {
                        SequenceId::A => a.take(),
                        SequenceId::B => b.take(),
                    };
                    if let Some(mut seq) = seq {
                        seq.set_type_id(*type_id);
                        result.extend(seq);
                    }
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Vocabulary;

    fn specials() -> SpecialVocab {
        let mut vocab = Vocabulary::new();
        SpecialVocab::with_defaults(&mut vocab).unwrap()
    }

    fn seq(ids: &[u32]) -> Encoding {
        let mut enc = Encoding::default();
        for (i, &id) in ids.iter().enumerate() {
            enc.push_token(id, "x".into(), (i, i + 1), Some(i as u32), false);
        }
        enc
    }

    #[test]
    fn test_bert() {
        let specials = specials();
        let processor = TemplateProcessor::from_config(&PostProcessorConfig::bert(true)).unwrap();
        processor.validate(&specials).unwrap();
        assert_eq!(processor.added_tokens(false), 2);
        assert_eq!(processor.added_tokens(true), 3);

        let single = processor.apply(seq(&[10, 11]), None, &specials).unwrap();
        assert_eq!(single.input_ids, vec![6, 10, 11, 5]);
        assert_eq!(single.tokens[0], "[CLS]");
        assert_eq!(single.special_tokens_mask, vec![1, 0, 0, 1]);

        let pair = processor
            .apply(seq(&[10]), Some(seq(&[20, 21])), &specials)
            .unwrap();
        assert_eq!(pair.input_ids, vec![6, 10, 5, 20, 21, 5]);
        assert_eq!(pair.type_ids, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_passthrough() {
        let specials = specials();
        for config in [PostProcessorConfig::None, PostProcessorConfig::bert(false)] {
            let processor = TemplateProcessor::from_config(&config).unwrap();
            let pair = processor
                .apply(seq(&[10]), Some(seq(&[20])), &specials)
                .unwrap();
            assert_eq!(pair.input_ids, vec![10, 20]);
            assert_eq!(pair.type_ids, vec![0, 1]);
            assert_eq!(processor.added_tokens(true), 0);

            let empty = processor.apply(Encoding::default(), None, &specials).unwrap();
            assert!(empty.is_empty());
        }
    }

    #[test]
    fn test_template_errors() {
        let specials = specials();

        let pair_only = TemplateProcessor::from_config(&PostProcessorConfig::Custom {
            single: None,
            pair: Some("$A sep $B:1".parse().unwrap()),
        })
        .unwrap();
        assert!(matches!(
            pair_only.apply(seq(&[1]), None, &specials),
            Err(WordforgeError::Template(_))
        ));
        assert_eq!(pair_only.added_tokens(false), 0);

        let single_only = TemplateProcessor::new(Some("bos $A".parse().unwrap()), None).unwrap();
        assert!(matches!(
            single_only.apply(seq(&[1]), Some(seq(&[2])), &specials),
            Err(WordforgeError::Template(_))
        ));

        let unknown = TemplateProcessor::new(Some("[NOPE] $A".parse().unwrap()), None).unwrap();
        assert!(matches!(
            unknown.validate(&specials),
            Err(WordforgeError::Template(_))
        ));
        assert!(unknown.apply(seq(&[1]), None, &specials).is_err());

        assert!(TemplateProcessor::new(None, None).is_err());
        assert!(TemplateProcessor::new(Some("$A $B".parse().unwrap()), None).is_err());
        assert!(TemplateProcessor::new(None, Some("$A".parse().unwrap())).is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = PostProcessorConfig::Custom {
            single: Some("[CLS] $A [SEP]".parse().unwrap()),
            pair: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"type":"custom","single":"[CLS] $A [SEP]","pair":null}"#
        );
        assert_eq!(serde_json::from_str::<PostProcessorConfig>(&json).unwrap(), config);

        let bert: PostProcessorConfig = serde_json::from_str(
            r#"{"type":"preset","preset":"bert","add_special_tokens":true}"#,
        )
        .unwrap();
        assert_eq!(bert, PostProcessorConfig::bert(true));
    }
}
