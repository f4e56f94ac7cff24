//! Order-preserving recursive diff
//!
//! Children of two matched nodes are aligned greedily with two cursors. On
//! a mismatch the engine looks ahead in the new sequence for the current old
//! child; everything skipped on the way is an addition. If the old child
//! never reappears it is a removal and the new cursor stays put. Matched
//! pairs are diffed recursively once the level is resolved.
//!
//! The result is not a minimal edit script and moves are reported as a
//! removal plus an addition.

use tracing::debug;

use crate::error::Result;
use crate::node::Node;

/// One entry of a change tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change<'a> {
    /// Present only in the new tree
    Added(Node<'a>),
    /// Present only in the old tree
    Removed(Node<'a>),
    /// Present in both with differing descendants; holds the new node
    Changed(Node<'a>, Vec<Change<'a>>),
}

impl<'a> Change<'a> {
    pub const fn node(&self) -> &Node<'a> {
        match self {
            Self::Added(node) | Self::Removed(node) | Self::Changed(node, _) => node,
        }
    }

    /// Nested changes; empty for additions and removals
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Changed(_, nested) => nested,
            Self::Added(_) | Self::Removed(_) => &[],
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Removed(_) => "removed",
            Self::Changed(..) => "changed",
        }
    }
}

/// Position resolved during the walk of one level
enum Step<'a> {
    Resolved(Change<'a>),
    /// Shallow-equal pair whose children are diffed afterwards
    Matched { old: Node<'a>, new: Node<'a> },
}

/// Diff engine; counts shallow comparisons across a run
#[derive(Debug, Default)]
pub struct Differ {
    comparisons: usize,
}

impl Differ {
    pub const fn new() -> Self {
        Self { comparisons: 0 }
    }

    /// Shallow-equal evaluations performed so far
    pub const fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// Diff the children of `old` against the children of `new`.
    ///
    /// # Errors
    ///
    /// Propagates shallow-equal failures, i.e. a `KeyTrack` without its
    /// `MidiKey/@Value`.
    pub fn diff<'a>(&mut self, old: &Node<'a>, new: &Node<'a>) -> Result<Vec<Change<'a>>> {
        let steps = self.align(&old.children(), &new.children())?;

        let mut changes = Vec::with_capacity(steps.len());
        for step in steps {
            match step {
                Step::Resolved(change) => changes.push(change),
                Step::Matched { old, new } => {
                    let nested = self.diff(&old, &new)?;
                    if !nested.is_empty() {
                        changes.push(Change::Changed(new, nested));
                    }
                }
            }
        }
        Ok(changes)
    }

    fn align<'a>(&mut self, old: &[Node<'a>], new: &[Node<'a>]) -> Result<Vec<Step<'a>>> {
        let mut steps = Vec::new();
        let (mut i, mut j) = (0, 0);

        loop {
            match (old.get(i), new.get(j)) {
                (None, None) => break,
                (None, Some(added)) => {
                    steps.push(Step::Resolved(Change::Added(*added)));
                    j += 1;
                }
                (Some(removed), None) => {
                    steps.push(Step::Resolved(Change::Removed(*removed)));
                    i += 1;
                }
                (Some(old_child), Some(new_child)) => {
                    if self.equal(old_child, new_child)? {
                        steps.push(Step::Matched {
                            old: *old_child,
                            new: *new_child,
                        });
                        i += 1;
                        j += 1;
                        continue;
                    }

                    debug!(node = %old_child, "no match in new, looking forward");
                    let ahead = new.get(j + 1..).unwrap_or_default();
                    match self.find(old_child, ahead)? {
                        Some(offset) => {
                            let found = j + 1 + offset;
                            let skipped = new.get(j..found).unwrap_or_default();
                            steps.extend(skipped.iter().map(|n| Step::Resolved(Change::Added(*n))));
                            if let Some(matched) = new.get(found) {
                                steps.push(Step::Matched {
                                    old: *old_child,
                                    new: *matched,
                                });
                            }
                            i += 1;
                            j = found + 1;
                        }
                        None => {
                            debug!(node = %old_child, "not found in new, considered removed");
                            steps.push(Step::Resolved(Change::Removed(*old_child)));
                            i += 1;
                        }
                    }
                }
            }
        }

        Ok(steps)
    }

    /// Index of the first candidate shallow-equal to `target`
    fn find(&mut self, target: &Node<'_>, candidates: &[Node<'_>]) -> Result<Option<usize>> {
        for (index, candidate) in candidates.iter().enumerate() {
            if self.equal(target, candidate)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn equal(&mut self, left: &Node<'_>, right: &Node<'_>) -> Result<bool> {
        self.comparisons += 1;
        left.shallow_equal(right)
    }
}

/// Diff the children of two nodes.
///
/// # Errors
///
/// See [`Differ::diff`].
pub fn diff<'a>(old: &Node<'a>, new: &Node<'a>) -> Result<Vec<Change<'a>>> {
    Differ::new().diff(old, new)
}
