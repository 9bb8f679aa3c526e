//! In-memory positional token index.
//!
//! This crate provides a small, fully in-memory implementation of the
//! [`PostingReader`](concord_index_core::PostingReader) and
//! [`TermResolver`](concord_index_core::TermResolver) capabilities. It is the
//! index used by the test suites and is suitable for embedding where a corpus
//! fits in memory.
//!
//! # Quick Start
//!
//! ```rust
//! use concord_index_core::{PostingReader, TermKey};
//! use concord_memory_index::{AnnotatedField, Element, MemoryIndexBuilder};
//!
//! let mut builder = MemoryIndexBuilder::new();
//! builder.add_field("contents", &["word", "pos"]).unwrap();
//!
//! let field = AnnotatedField::new("contents")
//!     .with_token(&["The", "DET"])
//!     .with_token(&["cat", "NOUN"])
//!     .with_token(&["sleeps", "VERB"])
//!     .with_element(Element::new("s", 0..3).with_attribute("lang", "en"));
//! builder.add_document(vec![field]).unwrap();
//!
//! let index = builder.build();
//! let mut cursor = index.postings(&TermKey::property("contents", "pos", "NOUN")).unwrap();
//! assert_eq!(cursor.seek(0).unwrap(), Some(0));
//! assert_eq!(cursor.positions(), &[1]);
//! assert_eq!(index.token_count("contents", 0).unwrap(), 3);
//! ```

mod builder;
mod document;
mod index;
mod resolve;

pub use builder::MemoryIndexBuilder;
pub use document::{AnnotatedField, Element};
pub use index::{MemoryIndex, MemoryPostings};
