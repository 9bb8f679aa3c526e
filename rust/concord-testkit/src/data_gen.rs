//! Data generation utilities for testing.
//!
//! This module generates synthetic annotated corpora from a seed. A corpus has
//! a single field, [`FIELD`], whose tokens carry a word form and a
//! part-of-speech tag drawn from small vocabularies, so that random queries
//! match often. Tokens are grouped into `s` elements (sentences) holding `np`
//! elements (phrases):
//!
//! - elements of the same name never overlap, nest, or share a first or last
//!   token, so their markers pair unambiguously
//! - an `s` may span the same tokens as an `np` inside it
//! - `s` elements may carry a `lang` attribute, `np` elements a `type`
//!   attribute
//!
//! Some documents are empty, so zero-length documents are covered as well.

use concord_index_core::DocId;
use concord_memory_index::{AnnotatedField, Element, MemoryIndex, MemoryIndexBuilder};

/// The only field of a generated corpus.
pub const FIELD: &str = "contents";

/// Token properties of [`FIELD`], in declaration order.
pub const PROPERTIES: [&str; 2] = ["word", "pos"];

/// Word forms, in order of use: a smaller vocabulary takes a prefix.
pub const WORDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

pub const POS_TAGS: [&str; 2] = ["N", "V"];

/// Element names with the attribute key and values each may carry.
pub const ELEMENTS: [(&str, &str, [&str; 2]); 2] =
    [("s", "lang", ["en", "fr"]), ("np", "type", ["pron", "noun"])];

/// Shape of a generated corpus.
#[derive(Debug, Clone)]
pub struct CorpusSpec {
    pub doc_count: usize,
    /// Upper bound of the token count of a document; the lower bound is zero.
    pub max_tokens: u32,
    /// Number of distinct word forms used, at most `WORDS.len()`.
    pub vocabulary: usize,
    /// Probability that a run of tokens is wrapped in an element.
    pub markup_density: f32,
}

impl Default for CorpusSpec {
    fn default() -> CorpusSpec {
        CorpusSpec {
            doc_count: 40,
            max_tokens: 12,
            vocabulary: 4,
            markup_density: 0.6,
        }
    }
}

/// A generated corpus: document `i` is `docs[i]`.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub docs: Vec<AnnotatedField>,
}

impl Corpus {
    /// Generates a corpus. The same `spec` and `seed` always yield the same
    /// corpus.
    pub fn generate(spec: &CorpusSpec, seed: u64) -> Corpus {
        assert!(spec.vocabulary > 0 && spec.vocabulary <= WORDS.len());
        let mut rng = fastrand::Rng::with_seed(seed);
        let docs = (0..spec.doc_count)
            .map(|_| generate_document(&mut rng, spec))
            .collect();
        Corpus { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn doc(&self, doc: DocId) -> &AnnotatedField {
        &self.docs[doc as usize]
    }

    /// Index of the value of `property` within a token's values.
    pub fn property_index(property: &str) -> Option<usize> {
        PROPERTIES.iter().position(|&p| p == property)
    }

    /// Indexes the corpus; document ids follow corpus order.
    pub fn build_index(&self) -> anyhow::Result<MemoryIndex> {
        let mut builder = MemoryIndexBuilder::new();
        builder.add_field(FIELD, &PROPERTIES)?;
        for doc in &self.docs {
            // Empty documents alternate between an empty field and no field.
            let fields = if doc.tokens.is_empty() && builder.doc_count() % 2 == 0 {
                Vec::new()
            } else {
                vec![doc.clone()]
            };
            builder.add_document(fields)?;
        }
        Ok(builder.build())
    }
}

fn generate_document(rng: &mut fastrand::Rng, spec: &CorpusSpec) -> AnnotatedField {
    let token_count = rng.u32(0..=spec.max_tokens);
    let mut field = AnnotatedField::new(FIELD);
    for _ in 0..token_count {
        let word = WORDS[rng.usize(..spec.vocabulary)];
        let pos = POS_TAGS[rng.usize(..POS_TAGS.len())];
        field = field.with_token(&[word, pos]);
    }

    let [sentence, phrase] = ELEMENTS;
    for (start, end) in runs(rng, 0, token_count, 5) {
        if rng.f32() >= spec.markup_density {
            continue;
        }
        field = field.with_element(element(rng, sentence, start, end));
        for (start, end) in runs(rng, start, end, 2) {
            if rng.f32() < spec.markup_density {
                field = field.with_element(element(rng, phrase, start, end));
            }
        }
    }
    field
}

/// Splits `start..end` into consecutive runs of `1..=max_len` tokens.
fn runs(rng: &mut fastrand::Rng, start: u32, end: u32, max_len: u32) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    let mut at = start;
    while at < end {
        let next = (at + rng.u32(1..=max_len)).min(end);
        runs.push((at, next));
        at = next;
    }
    runs
}

fn element(
    rng: &mut fastrand::Rng,
    (name, key, values): (&str, &str, [&str; 2]),
    start: u32,
    end: u32,
) -> Element {
    let element = Element::new(name, start..end);
    match rng.usize(..3) {
        0 => element,
        i => element.with_attribute(key, values[i - 1]),
    }
}
