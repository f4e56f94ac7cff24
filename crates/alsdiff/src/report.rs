//! Rendering of change trees

use std::fmt::{self, Write};

use crate::diff::Change;

const INDENT: &str = "  ";

/// Render changes as an indented outline, one node per line
pub fn render(changes: &[Change<'_>]) -> String {
    let mut output = String::new();
    // writing into a String cannot fail
    let _ = write_outline(&mut output, changes, 0);
    output
}

/// Write the outline of `changes` at `depth` levels of indentation
pub fn write_outline<W: Write>(out: &mut W, changes: &[Change<'_>], depth: usize) -> fmt::Result {
    for change in changes {
        for _ in 0..depth {
            out.write_str(INDENT)?;
        }
        writeln!(out, "{} {}", marker(change), change.node())?;
        write_outline(out, change.children(), depth + 1)?;
    }
    Ok(())
}

const fn marker(change: &Change<'_>) -> char {
    match change {
        Change::Added(_) => '+',
        Change::Removed(_) => '-',
        Change::Changed(..) => '~',
    }
}

impl fmt::Display for Change<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_outline(f, std::slice::from_ref(self), 0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Change<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let len = if matches!(self, Self::Changed(..)) { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Change", len)?;
        state.serialize_field("change", self.label())?;
        state.serialize_field("node", &self.node().describe())?;
        if let Self::Changed(_, nested) = self {
            state.serialize_field("changes", nested)?;
        }
        state.end()
    }
}
