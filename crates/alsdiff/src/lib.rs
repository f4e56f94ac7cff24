//! alsdiff - order-aware structural diff for Ableton Live sets
//!
//! Two snapshots of a tag-typed XML tree are compared child by child. Each
//! matched pair of nodes is descended into, and the result is a tree of
//! [`Change`] records: additions, removals, and changed nodes carrying the
//! changes of their own children.
//!
//! # Quick Start
//!
//! ```
//! use alsdiff::{diff_documents, parse_str, report, Change, Config};
//! # fn main() -> Result<(), alsdiff::Error> {
//! let old = parse_str(r#"<Tracks><MidiTrack Id="1"/></Tracks>"#)?;
//! let new = parse_str(r#"<Tracks><MidiTrack Id="1"/><MidiTrack Id="2"/></Tracks>"#)?;
//!
//! let config = Config::default();
//! let changes = diff_documents(&old, &new, &config)?;
//! assert!(matches!(changes.as_slice(), [Change::Added(_)]));
//! assert_eq!(report::render(&changes), "+ <MidiTrack Id=\"2\" />\n");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

use tracing::{info, instrument};

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod input;
pub use input::Input;

pub mod xml;
pub use xml::{Content, Document, Element};

pub mod config;
pub use config::{Config, DEFAULT_IGNORED_TAGS};

pub mod node;
pub use node::{Node, NodeKind};

pub mod diff;
pub use diff::{Change, Differ};

pub mod history;
pub mod report;

/// Parse a document from plain or gzip-compressed bytes
pub fn parse(bytes: &[u8]) -> Result<Document> {
    parse_input(&Input::from_bytes(bytes))
}

/// Parse a document from a string
pub fn parse_str(s: &str) -> Result<Document> {
    xml::Parser::new(s.as_bytes()).parse()
}

/// Parse a document from an [`Input`], decompressing it if needed
pub fn parse_input(input: &Input<'_>) -> Result<Document> {
    let bytes = input.decompressed()?;
    xml::Parser::new(&bytes).parse()
}

/// Read and parse a document file (`.als` sets are gzip-compressed)
#[instrument]
pub fn load(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::io(format!("failed to read {}", path.display()), &e))?;
    let name = path.to_string_lossy();
    let document = parse_input(&Input::from_bytes(&bytes).with_filename(&name))?;
    info!(root = %document.root.name, "loaded document");
    Ok(document)
}

/// Diff two elements as document roots
pub fn diff_elements<'a>(
    old: &'a Element,
    new: &'a Element,
    config: &'a Config,
) -> Result<Vec<Change<'a>>> {
    diff::diff(&Node::root(old, config), &Node::root(new, config))
}

/// Diff two parsed documents
pub fn diff_documents<'a>(
    old: &'a Document,
    new: &'a Document,
    config: &'a Config,
) -> Result<Vec<Change<'a>>> {
    diff_elements(&old.root, &new.root, config)
}
