//! Typed views over raw elements
//!
//! A [`Node`] borrows one [`Element`] and picks its comparison and
//! description rules from the element's tag. Unknown tags fall back to
//! [`NodeKind::Generic`].

use std::fmt;
use std::ptr;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::Element;

const VALUE: &str = "Value";
const CLIP_NAME: &str = "Name/@Value";
const TRACK_NAME: &str = "Name/EffectiveName/@Value";
const MIDI_KEY: &str = "MidiKey/@Value";

const TEXT_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r'];

/// Comparison and description behavior selected by tag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Generic,
    /// Loop/arrangement boundaries whose `Value` jitters on save
    TimeValue,
    Clip,
    Track,
    /// Drum-rack lane, identified by its MIDI key
    KeyTrack,
    Scene,
}

const REGISTRY: &[(&str, NodeKind)] = &[
    ("LeftTime", NodeKind::TimeValue),
    ("RightTime", NodeKind::TimeValue),
    ("MidiClip", NodeKind::Clip),
    ("AudioClip", NodeKind::Clip),
    ("MidiTrack", NodeKind::Track),
    ("GroupTrack", NodeKind::Track),
    ("KeyTrack", NodeKind::KeyTrack),
    ("Scene", NodeKind::Scene),
];

impl NodeKind {
    pub fn for_tag(tag: &str) -> Self {
        REGISTRY
            .iter()
            .find(|(name, _)| *name == tag)
            .map_or(Self::Generic, |(_, kind)| *kind)
    }
}

/// Read-only view of an element under a diff configuration
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    element: &'a Element,
    kind: NodeKind,
    config: &'a Config,
}

impl<'a> Node<'a> {
    /// Wrap a document root; the root is never filtered
    pub fn root(element: &'a Element, config: &'a Config) -> Self {
        Self {
            element,
            kind: NodeKind::for_tag(&element.name),
            config,
        }
    }

    /// Wrap an element, or `None` when its tag is ignored
    pub fn from_element(element: &'a Element, config: &'a Config) -> Option<Self> {
        if config.is_ignored(&element.name) {
            None
        } else {
            Some(Self::root(element, config))
        }
    }

    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    pub const fn element(&self) -> &'a Element {
        self.element
    }

    pub fn tag(&self) -> &'a str {
        &self.element.name
    }

    pub fn attributes(&self) -> &'a IndexMap<String, String> {
        &self.element.attributes
    }

    /// Leading text, trimmed; `None` when nothing is left
    pub fn text(&self) -> Option<&'a str> {
        self.element
            .text()
            .map(|text| text.trim_matches(TEXT_WHITESPACE))
            .filter(|text| !text.is_empty())
    }

    /// Child nodes in document order, ignored tags removed
    pub fn children(&self) -> Vec<Self> {
        self.element
            .child_elements()
            .filter_map(|child| Self::from_element(child, self.config))
            .collect()
    }

    /// Compare own tag, attributes and text, never children.
    ///
    /// # Errors
    ///
    /// Two `KeyTrack` nodes are compared by their `MidiKey/@Value`; if
    /// either lacks it the document is malformed and
    /// [`ErrorKind::MissingAttribute`] is returned.
    pub fn shallow_equal(&self, other: &Self) -> Result<bool> {
        match self.kind {
            NodeKind::TimeValue => Ok(self.tag() == other.tag()
                && self.text() == other.text()
                && self.time_attributes_equal(other)),
            NodeKind::KeyTrack if self.tag() == other.tag() => {
                let key = self.required(MIDI_KEY)?;
                let other_key = other.required(MIDI_KEY)?;
                Ok(self.generic_equal(other) && key == other_key)
            }
            _ => Ok(self.generic_equal(other)),
        }
    }

    /// Short opening-tag rendering used in reports
    pub fn describe(&self) -> String {
        self.to_string()
    }

    fn generic_equal(&self, other: &Self) -> bool {
        self.tag() == other.tag()
            && self.attributes() == other.attributes()
            && self.text() == other.text()
    }

    fn time_attributes_equal(&self, other: &Self) -> bool {
        let others = |attrs: &'a IndexMap<String, String>| {
            attrs.iter().filter(|(name, _)| name.as_str() != VALUE)
        };
        let theirs = other.attributes();
        let rest_equal = others(self.attributes()).count() == others(theirs).count()
            && others(self.attributes()).all(|(name, value)| theirs.get(name) == Some(value));

        rest_equal
            && rounded_equal(
                self.attributes().get(VALUE).map(String::as_str),
                theirs.get(VALUE).map(String::as_str),
                self.config.value_scale,
            )
    }

    fn required(&self, path: &str) -> Result<&'a str> {
        self.element.find_attribute(path).ok_or_else(|| {
            Error::with_message(
                ErrorKind::MissingAttribute {
                    tag: self.tag().to_string(),
                    path: path.to_string(),
                },
                Span::empty(),
                format!("{self} is missing required attribute {path}"),
            )
        })
    }

    fn decoration(&self) -> Option<String> {
        match self.kind {
            NodeKind::Clip => self.element.find_attribute(CLIP_NAME).map(|n| format!("[{n}]")),
            NodeKind::Track => self.element.find_attribute(TRACK_NAME).map(|n| format!("[{n}]")),
            NodeKind::KeyTrack => self
                .element
                .find_attribute(MIDI_KEY)
                .map(|key| format!("[MidiKey {key}]")),
            NodeKind::Scene => self
                .attributes()
                .get(VALUE)
                .map(|name| format!("[{}]", name.trim())),
            NodeKind::Generic | NodeKind::TimeValue => None,
        }
    }
}

/// Compare two decimal strings after rounding half-to-even to `scale`
/// digits; anything unparsable is compared verbatim.
fn rounded_equal(left: Option<&str>, right: Option<&str>, scale: u32) -> bool {
    match (left.and_then(parse_decimal), right.and_then(parse_decimal)) {
        (Some(l), Some(r)) => l.round_dp(scale) == r.round_dp(scale),
        _ => left == right,
    }
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag())?;
        if let Some(decoration) = self.decoration() {
            write!(f, " {decoration}")?;
        }

        // scenes show their Value as the decoration instead
        let hidden = (self.kind == NodeKind::Scene).then_some(VALUE);
        for (name, value) in self.attributes() {
            if Some(name.as_str()) != hidden {
                write!(f, " {name}=\"{value}\"")?;
            }
        }

        match self.text() {
            Some(text) => write!(f, ">{text}</{}>", self.tag()),
            None => f.write_str(" />"),
        }
    }
}

/// Identity of the underlying element, not value equality.
/// Alignment uses [`Node::shallow_equal`].
impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.element, other.element)
    }
}

impl Eq for Node<'_> {}
