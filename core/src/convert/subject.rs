use crate::convert::tags::{
    get_string_value, get_string_value_by_name, PATIENT_ID, PATIENT_NAME, STUDY_ID,
};
use crate::convert::walk::{basename, TreeSnapshot};
use crate::error::Result;
use dicom_object::InMemDicomObject;
use log::{info, warn};
use std::path::Path;

/// Infers a subject id for a session when none was supplied
///
/// Looks for a `dicom` directory under the session and reads its first
/// file (lexicographic). Resolution order: the configured id field, then
/// `PatientID`, `PatientName`, `"ex" + StudyID`, and finally a sanitized
/// form of the session directory name when the tree holds no readable
/// DICOM or every tag comes up empty.
pub fn infer_subject_id(
    session_dir: &Path,
    group: &str,
    configured_field: Option<&str>,
) -> Result<String> {
    info!("No subject id provided - attempting to extract one from DICOM...");

    let snap = TreeSnapshot::capture(session_dir)?;
    let dicom_dir = snap.dirs.iter().find(|d| basename(d).ends_with("dicom"));

    let mut subject = None;
    if let Some(dir) = dicom_dir {
        if let Some(file) = snap.files.iter().find(|f| f.starts_with(dir)) {
            match dicom_object::open_file(file) {
                Ok(dcm) => subject = resolve_from_tags(&dcm, group, configured_field),
                Err(e) => warn!("could not read {}: {}", file.display(), e),
            }
        }
    }

    let subject = match subject {
        Some(s) => s,
        None => {
            info!("... no usable DICOM id - deriving subject id from the session label");
            fallback_from_session_name(session_dir)
        }
    };
    // Path separators never survive into a path component
    let subject = subject.replace(['/', '\\'], "_");

    info!("... subject id set to {}", subject);
    Ok(subject)
}

/// Resolves a subject id from DICOM tags, first success wins
///
/// `PatientID` is distrusted in two known ways: some senders put the group
/// name in it (skipped), and ids sorted by an upstream reaper carry an
/// `@`-suffix (truncated). A truncated id that still contains `group/` was
/// entered empty upstream and is rejected.
pub fn resolve_from_tags(
    dcm: &InMemDicomObject,
    group: &str,
    configured_field: Option<&str>,
) -> Option<String> {
    if let Some(field) = configured_field {
        if let Some(value) = get_string_value_by_name(dcm, field) {
            return Some(value);
        }
    }

    if let Some(patient_id) = get_string_value(dcm, PATIENT_ID) {
        if patient_id != group {
            let id = patient_id.split('@').next().unwrap_or("").to_string();
            if !id.is_empty() && !id.contains(&format!("{}/", group)) {
                return Some(id);
            }
        }
    }

    if let Some(name) = get_string_value(dcm, PATIENT_NAME) {
        let name = name.replace('^', " ");
        let name = name.strip_prefix(' ').unwrap_or(name.as_str());
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    get_string_value(dcm, STUDY_ID).map(|study_id| format!("ex{}", study_id))
}

/// Builds the last-resort subject id from the session directory name
pub fn fallback_from_session_name(session_dir: &Path) -> String {
    let label = basename(session_dir).replace(' ', "_").replace(':', "");
    format!("sub_{}", label)
}
