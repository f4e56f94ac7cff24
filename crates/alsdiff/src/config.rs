//! Diff configuration

use std::collections::BTreeSet;

/// View-state elements Live rewrites on every save; they carry no musical
/// content and are dropped before comparison.
pub const DEFAULT_IGNORED_TAGS: &[&str] = &[
    "AnchorTime",
    "GroupedTracksRevealed",
    "IsContentSelected",
    "NoteEditorFoldInZoom",
    "NoteEditorFoldInScroll",
    "OtherTime",
    "SelectedDevice",
    "SelectedEnvelope",
    "TrackUnfolded",
    "ClientSize",
    "HighlightedTrackIndex",
    "ViewStateDetailIsSample",
    "CurrentTime",
    "LastSelectedTimeableIndex",
    "GridIntervalPixel",
    "CurrentZoom",
    "ViewStateSessionMixerHeight",
];

/// Configuration for a diff run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Tags removed from the tree before any comparison
    pub ignored_tags: BTreeSet<String>,
    /// Fractional digits kept when comparing time `Value` attributes
    pub value_scale: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignored_tags: DEFAULT_IGNORED_TAGS.iter().map(|t| (*t).to_string()).collect(),
            value_scale: 2,
        }
    }
}

impl Config {
    /// Config with an empty ignored-tag set
    pub fn strict() -> Self {
        Self {
            ignored_tags: BTreeSet::new(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ignore(mut self, tag: impl Into<String>) -> Self {
        self.ignored_tags.insert(tag.into());
        self
    }

    #[must_use]
    pub const fn with_value_scale(mut self, scale: u32) -> Self {
        self.value_scale = scale;
        self
    }

    pub fn is_ignored(&self, tag: &str) -> bool {
        self.ignored_tags.contains(tag)
    }
}
