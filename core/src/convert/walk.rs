use crate::error::{Result, ScansortError};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Flat snapshot of a directory tree
///
/// Captured by a fresh recursive walk. Snapshots are not kept consistent
/// across mutating passes; callers re-capture after structural changes
/// (moves, deletes, extractions).
#[derive(Debug)]
pub struct TreeSnapshot {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

impl TreeSnapshot {
    /// Walks `root` and records every file and directory below it
    pub fn capture(root: &Path) -> Result<Self> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            } else {
                files.push(entry.into_path());
            }
        }
        Ok(Self { files, dirs })
    }
}

/// The expected nesting of a freshly extracted scanner archive
///
/// `run_dir/<db root>/<group>/<project>/<session>`, with exactly one
/// directory at each level. Resolved by name with validation instead of
/// positional indexing into an unordered walk, so a malformed archive
/// fails with a message naming the level that is missing or ambiguous.
#[derive(Debug)]
pub struct SessionLayout {
    /// Top-level extraction artifact (e.g. `nims`), removed at the end
    pub db_root: PathBuf,
    pub group: PathBuf,
    pub project: PathBuf,
    pub session: PathBuf,
}

impl SessionLayout {
    /// Resolves the four levels below `run_dir`, validating each
    pub fn discover(run_dir: &Path) -> Result<Self> {
        let db_root = sole_subdir(run_dir, "database root")?;
        let group = sole_subdir(&db_root, "group")?;
        let project = sole_subdir(&group, "project")?;
        let session = sole_subdir(&project, "session")?;
        Ok(Self {
            db_root,
            group,
            project,
            session,
        })
    }
}

/// Returns the basename of a path as a `String`
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sole_subdir(parent: &Path, level: &str) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    match dirs.len() {
        1 => Ok(dirs.remove(0)),
        0 => Err(ScansortError::Layout(format!(
            "expected a {} directory under {}, found none",
            level,
            parent.display()
        ))),
        n => Err(ScansortError::Layout(format!(
            "expected exactly one {} directory under {}, found {}",
            level,
            parent.display(),
            n
        ))),
    }
}
