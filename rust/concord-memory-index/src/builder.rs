//! Write side of the in-memory index.
//!
//! Documents are added one at a time and receive ascending ids starting at
//! zero, so every posting list grows by appending and stays sorted without a
//! final merge. Markup is converted into marker postings on the way in:
//!
//! - an `OpenTag` posting on the first token of every element,
//! - a `CloseTag` posting on its last token,
//! - one `Attribute { element, key }` posting per attribute, on the first
//!   token.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use concord_common::{Result, error::Error, verify_arg};
use concord_index_core::{DocId, Position, Stream};

use crate::{
    document::{AnnotatedField, Element},
    index::{DocPostings, FieldData, MemoryIndex},
};

/// Accumulates annotated documents into a [`MemoryIndex`].
#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    fields: AHashMap<Arc<str>, FieldData>,
    doc_count: DocId,
}

impl MemoryIndexBuilder {
    pub fn new() -> MemoryIndexBuilder {
        MemoryIndexBuilder::default()
    }

    /// Declares a field and the ordered names of its token properties.
    ///
    /// Fields must be declared before the first document is added.
    pub fn add_field(&mut self, name: &str, properties: &[&str]) -> Result<()> {
        verify_arg!(properties, !properties.is_empty());
        verify_arg!(doc_count, self.doc_count == 0);
        if self.fields.contains_key(name) {
            return Err(Error::invalid_arg(
                "name",
                format!("field '{name}' is already declared"),
            ));
        }
        let field = FieldData {
            properties: properties.iter().map(|&p| Arc::from(p)).collect(),
            ..Default::default()
        };
        self.fields.insert(Arc::from(name), field);
        Ok(())
    }

    /// Adds a document and returns its id.
    ///
    /// Declared fields absent from `fields` get zero tokens in this document.
    ///
    /// # Errors
    ///
    /// Rejects the whole document, leaving the builder unchanged, when a field
    /// is undeclared or given twice, a token has the wrong number of property
    /// values, or an element is empty, exceeds the token range, or overlaps a
    /// same-named element without nesting in it.
    pub fn add_document(&mut self, fields: Vec<AnnotatedField>) -> Result<DocId> {
        let doc = self.doc_count;

        let mut prepared: Vec<(Arc<str>, FieldPostings)> = Vec::with_capacity(fields.len());
        for content in &fields {
            let Some((name, data)) = self.fields.get_key_value(content.name.as_str()) else {
                return Err(Error::unknown_field(&content.name, None));
            };
            if prepared.iter().any(|(n, _)| n == name) {
                return Err(Error::invalid_arg(
                    "fields",
                    format!("field '{}' given twice", content.name),
                ));
            }
            prepared.push((name.clone(), collect_postings(data, content)?));
        }

        for (name, postings) in prepared {
            let Some(data) = self.fields.get_mut(&name) else {
                continue;
            };
            data.token_counts.resize(doc as usize, 0);
            data.token_counts.push(postings.token_count);
            for ((stream, value), positions) in postings.terms {
                data.streams
                    .entry(stream)
                    .or_default()
                    .entry(value)
                    .or_default()
                    .push(DocPostings { doc, positions });
            }
        }

        self.doc_count += 1;
        Ok(doc)
    }

    pub fn doc_count(&self) -> DocId {
        self.doc_count
    }

    pub fn build(mut self) -> MemoryIndex {
        for data in self.fields.values_mut() {
            data.token_counts.resize(self.doc_count as usize, 0);
        }
        log::debug!(
            "built memory index: {} documents, {} fields",
            self.doc_count,
            self.fields.len()
        );
        MemoryIndex {
            fields: self.fields,
            doc_count: self.doc_count,
        }
    }
}

/// Postings of a single field of a single document, before insertion.
struct FieldPostings {
    token_count: u32,
    terms: BTreeMap<(Stream, Arc<str>), Vec<Position>>,
}

impl FieldPostings {
    fn add(&mut self, stream: Stream, value: &str, position: Position) {
        self.terms
            .entry((stream, Arc::from(value)))
            .or_default()
            .push(position);
    }
}

fn collect_postings(data: &FieldData, content: &AnnotatedField) -> Result<FieldPostings> {
    let mut postings = FieldPostings {
        token_count: content.token_count(),
        terms: BTreeMap::new(),
    };

    for (position, values) in content.tokens.iter().enumerate() {
        if values.len() != data.properties.len() {
            return Err(Error::invalid_arg(
                "tokens",
                format!(
                    "token {position} of field '{}' has {} values, expected {}",
                    content.name,
                    values.len(),
                    data.properties.len()
                ),
            ));
        }
        for (property, value) in data.properties.iter().zip(values) {
            postings.add(Stream::Property(property.clone()), value, position as Position);
        }
    }

    validate_elements(content)?;
    for element in &content.elements {
        postings.add(Stream::OpenTag, &element.name, element.start);
        postings.add(Stream::CloseTag, &element.name, element.last_token());
        for (key, value) in &element.attributes {
            postings.add(
                Stream::attribute(element.name.as_str(), key.as_str()),
                value,
                element.start,
            );
        }
    }

    // Marker and attribute postings were added element by element.
    for ((stream, value), positions) in postings.terms.iter_mut() {
        positions.sort_unstable();
        if positions.windows(2).any(|w| w[0] == w[1]) {
            let element = match stream {
                Stream::Attribute { element, .. } => element,
                _ => value,
            };
            return Err(Error::invalid_arg(
                "elements",
                format!(
                    "two '{element}' elements of field '{}' share a boundary token",
                    content.name
                ),
            ));
        }
    }
    Ok(postings)
}

fn validate_elements(content: &AnnotatedField) -> Result<()> {
    let count = content.token_count();
    for element in &content.elements {
        if element.start >= element.end || element.end > count {
            return Err(Error::invalid_arg(
                "elements",
                format!(
                    "element '{}' covers {}..{} in a field of {count} tokens",
                    element.name, element.start, element.end
                ),
            ));
        }
    }
    for (i, a) in content.elements.iter().enumerate() {
        for b in &content.elements[i + 1..] {
            if a.name == b.name && crosses(a, b) {
                return Err(Error::invalid_arg(
                    "elements",
                    format!(
                        "elements '{}' at {}..{} and {}..{} overlap without nesting",
                        a.name, a.start, a.end, b.start, b.end
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Two ranges that overlap while neither contains the other.
fn crosses(a: &Element, b: &Element) -> bool {
    let overlap = a.start < b.end && b.start < a.end;
    let nested = (a.start <= b.start && b.end <= a.end) || (b.start <= a.start && a.end <= b.end);
    overlap && !nested
}
