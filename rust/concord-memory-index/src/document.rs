//! Input model: annotated token streams with markup.

use std::ops::Range;

use concord_index_core::Position;

/// The content of one field of one document: a token stream in which every
/// token carries one value per declared property, plus markup elements laid
/// over token ranges.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedField {
    pub name: String,
    /// One entry per token; each entry holds the token's property values in
    /// the order the field declared its properties.
    pub tokens: Vec<Vec<String>>,
    pub elements: Vec<Element>,
}

impl AnnotatedField {
    pub fn new(name: impl Into<String>) -> AnnotatedField {
        AnnotatedField {
            name: name.into(),
            tokens: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Builds a single-property field from whitespace-separated words.
    pub fn from_words(name: impl Into<String>, text: &str) -> AnnotatedField {
        let mut field = AnnotatedField::new(name);
        field.tokens = text
            .split_whitespace()
            .map(|word| vec![word.to_string()])
            .collect();
        field
    }

    pub fn with_token(mut self, values: &[&str]) -> AnnotatedField {
        self.tokens
            .push(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_element(mut self, element: Element) -> AnnotatedField {
        self.elements.push(element);
        self
    }

    pub fn token_count(&self) -> u32 {
        self.tokens.len() as u32
    }
}

/// A markup element spanning the tokens `start..end` (end exclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub start: Position,
    pub end: Position,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>, tokens: Range<Position>) -> Element {
        Element {
            name: name.into(),
            start: tokens.start,
            end: tokens.end,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Element {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Position of the token carrying the end marker.
    pub fn last_token(&self) -> Position {
        self.end - 1
    }
}
