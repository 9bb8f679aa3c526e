//! Structured addressing of posting streams.

use std::fmt;
use std::sync::Arc;

/// One parallel layer of a field's token stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stream {
    /// A token annotation such as `word`, `lemma` or `pos`.
    Property(Arc<str>),
    /// Element start markers; the term is the element name and the posting
    /// sits on the element's first token.
    OpenTag,
    /// Element end markers; the term is the element name and the posting sits
    /// on the element's last token.
    CloseTag,
    /// Values of one attribute key of one element name; postings sit on the
    /// first token of the element carrying the attribute.
    Attribute { element: Arc<str>, key: Arc<str> },
}

impl Stream {
    pub fn property(name: impl Into<Arc<str>>) -> Stream {
        Stream::Property(name.into())
    }

    pub fn attribute(element: impl Into<Arc<str>>, key: impl Into<Arc<str>>) -> Stream {
        Stream::Attribute {
            element: element.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Property(name) => write!(f, "{name}"),
            Stream::OpenTag => write!(f, "<open>"),
            Stream::CloseTag => write!(f, "<close>"),
            Stream::Attribute { element, key } => write!(f, "{element}@{key}"),
        }
    }
}

/// Address of one posting stream: a value within one stream of one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermKey {
    pub field: Arc<str>,
    pub stream: Stream,
    pub value: Arc<str>,
}

impl TermKey {
    pub fn new(field: impl Into<Arc<str>>, stream: Stream, value: impl Into<Arc<str>>) -> TermKey {
        TermKey {
            field: field.into(),
            stream,
            value: value.into(),
        }
    }

    pub fn property(
        field: impl Into<Arc<str>>,
        property: impl Into<Arc<str>>,
        value: impl Into<Arc<str>>,
    ) -> TermKey {
        TermKey::new(field, Stream::property(property), value)
    }

    pub fn open_tag(field: impl Into<Arc<str>>, element: impl Into<Arc<str>>) -> TermKey {
        TermKey::new(field, Stream::OpenTag, element)
    }

    pub fn close_tag(field: impl Into<Arc<str>>, element: impl Into<Arc<str>>) -> TermKey {
        TermKey::new(field, Stream::CloseTag, element)
    }

    pub fn attribute(
        field: impl Into<Arc<str>>,
        element: impl Into<Arc<str>>,
        key: impl Into<Arc<str>>,
        value: impl Into<Arc<str>>,
    ) -> TermKey {
        TermKey::new(field, Stream::attribute(element, key), value)
    }
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{:?}", self.field, self.stream, self.value)
    }
}

/// A term specification that matches a set of concrete terms.
///
/// Patterns are resolved into concrete terms by a [`TermResolver`](crate::TermResolver)
/// before a leaf is built; the span algebra only ever sees the resolved set.
#[derive(Debug, Clone, PartialEq)]
pub enum TermPattern {
    /// Glob-style pattern: `*` matches any run of characters, `?` exactly one.
    Wildcard(String),
    /// All terms starting with the given prefix.
    Prefix(String),
    /// A regular expression that must match the whole term.
    Regex(String),
    /// Terms within an edit distance of `value`, sharing its first
    /// `prefix_length` characters.
    Fuzzy {
        value: String,
        max_edits: u8,
        prefix_length: usize,
    },
}
