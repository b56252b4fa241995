use crate::convert::walk::basename;
use crate::error::{Result, ScansortError};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Moves the processed session into `run_dir/group/project/subject` and
/// removes the emptied top-level extraction artifact.
///
/// Not transactional: if the move lands but the cleanup fails, both the new
/// location and the leftover db root coexist and the run is recoverable by
/// hand.
pub fn place_session(
    run_dir: &Path,
    session_dir: &Path,
    db_root: &Path,
    group: &str,
    project: &str,
    subject: &str,
) -> Result<PathBuf> {
    let mut target = run_dir.to_path_buf();
    for segment in [group, project, subject] {
        target = target.join(segment);
        if target.is_file() {
            return Err(ScansortError::Layout(format!(
                "cannot create {}: a file with that name already exists",
                target.display()
            )));
        }
    }
    fs::create_dir_all(&target)?;

    let dest = target.join(basename(session_dir));
    debug!("moving {} -> {}", session_dir.display(), dest.display());
    fs::rename(session_dir, &dest)?;

    info!("removing extraction artifact {}", db_root.display());
    fs::remove_dir_all(db_root)?;
    Ok(dest)
}
