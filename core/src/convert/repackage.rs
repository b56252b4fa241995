use crate::convert::walk::basename;
use crate::error::Result;
use crate::types::ArchiveKind;
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

/// Deletes every `*qa.json` file (the downstream viewer cannot parse them)
pub fn remove_qa_json(files: &[PathBuf]) -> Result<()> {
    for f in files {
        if ArchiveKind::of(f) == ArchiveKind::QaJson {
            debug!("removing {}", f.display());
            fs::remove_file(f)?;
        }
    }
    Ok(())
}

/// Renames `*_qa.png` to `*.qa.png` and `*_montage.zip` to `*.montage.zip`
///
/// Idempotent: renamed files no longer match the classified suffixes, so a
/// second pass over the same tree is a no-op.
pub fn rename_qa_and_montage(files: &[PathBuf]) -> Result<()> {
    for f in files {
        let renamed = match ArchiveKind::of(f) {
            ArchiveKind::QaPng => replace_suffix(f, "_qa.png", ".qa.png"),
            ArchiveKind::MontageZip => replace_suffix(f, "_montage.zip", ".montage.zip"),
            _ => None,
        };
        if let Some(new_path) = renamed {
            debug!("renaming {} -> {}", f.display(), new_path.display());
            fs::rename(f, new_path)?;
        }
    }
    Ok(())
}

/// Removes files whose name ends with any of the given prune suffixes
pub fn prune_files(files: &[PathBuf], suffixes: &[String]) -> Result<()> {
    if suffixes.is_empty() {
        return Ok(());
    }
    for f in files {
        let name = basename(f);
        if suffixes.iter().any(|s| name.ends_with(s.as_str())) && f.is_file() {
            info!("pruning {}", f.display());
            fs::remove_file(f)?;
        }
    }
    Ok(())
}

fn replace_suffix(path: &PathBuf, from: &str, to: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(from)?;
    Some(path.with_file_name(format!("{}{}", stem, to)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::walk::TreeSnapshot;
    use tempfile::TempDir;

    #[test]
    fn test_qa_json_removal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("5_bold_qa.json"), b"{}").unwrap();
        fs::write(tmp.path().join("keep.json"), b"{}").unwrap();

        let snap = TreeSnapshot::capture(tmp.path()).unwrap();
        remove_qa_json(&snap.files).unwrap();

        assert!(!tmp.path().join("5_bold_qa.json").exists());
        assert!(tmp.path().join("keep.json").exists());
    }

    #[test]
    fn test_rename_pass_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("5_bold_qa.png"), b"png").unwrap();
        fs::write(tmp.path().join("5_bold_montage.zip"), b"zip").unwrap();

        let snap = TreeSnapshot::capture(tmp.path()).unwrap();
        rename_qa_and_montage(&snap.files).unwrap();

        assert!(tmp.path().join("5_bold.qa.png").is_file());
        assert!(tmp.path().join("5_bold.montage.zip").is_file());
        assert!(!tmp.path().join("5_bold_qa.png").exists());

        // Second pass over a fresh snapshot changes nothing
        let snap = TreeSnapshot::capture(tmp.path()).unwrap();
        rename_qa_and_montage(&snap.files).unwrap();
        assert!(tmp.path().join("5_bold.qa.png").is_file());
        assert!(tmp.path().join("5_bold.montage.zip").is_file());
    }

    #[test]
    fn test_prune_by_suffix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("scan.pyrdb"), b"x").unwrap();
        fs::write(tmp.path().join("scan.nii.gz"), b"x").unwrap();

        let snap = TreeSnapshot::capture(tmp.path()).unwrap();
        prune_files(&snap.files, &[".pyrdb".to_string()]).unwrap();

        assert!(!tmp.path().join("scan.pyrdb").exists());
        assert!(tmp.path().join("scan.nii.gz").exists());
    }
}
