//! Git history of a single document
//!
//! Revisions are listed with `git log --follow`, so a set that was renamed
//! or moved keeps its history. Blobs are read with `git show`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use crate::error::{Error, ErrorKind, Result};

/// A commit together with the path the file had in it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revision {
    pub commit: String,
    pub path: String,
}

impl Revision {
    /// Abbreviated commit hash
    pub fn short(&self) -> &str {
        self.commit.get(..10).unwrap_or(&self.commit)
    }
}

/// Git repository accessed through the `git` executable
#[derive(Clone, Debug)]
pub struct Repository {
    root: PathBuf,
    /// Directory relative file paths are resolved against
    workdir: PathBuf,
}

impl Repository {
    /// Open the repository containing `dir`
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let output = run_git(dir.as_ref(), &["rev-parse", "--show-toplevel"])?;
        let root = PathBuf::from(String::from_utf8_lossy(&output).trim());
        debug!(root = %root.display(), "opened repository");
        Ok(Self {
            root,
            workdir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Revisions touching `file`, newest first, following renames.
    ///
    /// A relative `file` is taken relative to the directory the repository
    /// was opened from. Revision paths are relative to the toplevel.
    #[instrument(skip(self, file), fields(file = %file.as_ref().display()))]
    pub fn revisions(&self, file: impl AsRef<Path>) -> Result<Vec<Revision>> {
        let file = file.as_ref().to_string_lossy().into_owned();
        let output = run_git(
            &self.workdir,
            &["log", "--format=%H", "--name-only", "--follow", "--", file.as_str()],
        )?;
        let revisions = parse_follow_log(&String::from_utf8_lossy(&output));
        info!(count = revisions.len(), "collected revisions");
        Ok(revisions)
    }

    /// Raw blob of the file at a revision
    pub fn read(&self, revision: &Revision) -> Result<Vec<u8>> {
        let object = format!("{}:{}", revision.commit, revision.path);
        debug!(object = %object, "reading blob");
        run_git(&self.root, &["show", object.as_str()])
    }

    /// `git log` header of a single commit
    pub fn summary(&self, commit: &str) -> Result<String> {
        let output = run_git(&self.root, &["log", "--max-count=1", commit])?;
        Ok(String::from_utf8_lossy(&output).trim_end().to_string())
    }
}

/// Parse the output of `git log --format=%H --name-only`.
///
/// Each commit is printed as its hash line, a blank line and the path it
/// touched. A hash without a following path is dropped.
pub fn parse_follow_log(output: &str) -> Vec<Revision> {
    let mut revisions = Vec::new();
    let mut commit: Option<&str> = None;

    for line in output.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match commit.take() {
            Some(hash) if !is_commit_hash(line) => revisions.push(Revision {
                commit: hash.to_string(),
                path: line.to_string(),
            }),
            _ => commit = Some(line),
        }
    }

    revisions
}

fn is_commit_hash(line: &str) -> bool {
    matches!(line.len(), 40 | 64) && line.bytes().all(|b| b.is_ascii_hexdigit())
}

fn run_git(dir: &Path, args: &[&str]) -> Result<Vec<u8>> {
    let command = format!("git {}", args.join(" "));
    debug!(command = %command, "executing");

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::io(format!("failed to execute {command}"), &e))?;

    if !output.status.success() {
        return Err(Error::detached(ErrorKind::Git {
            command,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }));
    }

    Ok(output.stdout)
}
