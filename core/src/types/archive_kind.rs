use std::path::Path;

/// Classification of session-tree files by repackaging role
///
/// Determined once from the file name during a tree walk, then dispatched
/// with an exhaustive `match` instead of re-testing suffixes at every call
/// site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// `*_dicom.tgz` / `*_dicoms.tgz` bundle of DICOM instances
    DicomBundle,
    /// `*_pfile.tgz` bundle of raw scanner pfiles
    PfileBundle,
    /// `*_physio.tgz` bundle of physiological recordings
    PhysioBundle,
    /// `*.csv.gz` physio regressor file
    PhysioRegressor,
    /// `*qa.json` transient QA metadata
    QaJson,
    /// `*_qa.png` QA image awaiting rename
    QaPng,
    /// `*_montage.zip` montage awaiting rename
    MontageZip,
    /// Anything the pipeline leaves alone
    Other,
}

impl ArchiveKind {
    /// Classifies a file path by name
    pub fn of(path: &Path) -> Self {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return ArchiveKind::Other,
        };
        if name.ends_with("_dicom.tgz") || name.ends_with("_dicoms.tgz") {
            ArchiveKind::DicomBundle
        } else if name.ends_with("_pfile.tgz") {
            ArchiveKind::PfileBundle
        } else if name.ends_with("_physio.tgz") {
            ArchiveKind::PhysioBundle
        } else if name.ends_with(".csv.gz") {
            ArchiveKind::PhysioRegressor
        } else if name.ends_with("qa.json") {
            ArchiveKind::QaJson
        } else if name.ends_with("_qa.png") {
            ArchiveKind::QaPng
        } else if name.ends_with("_montage.zip") {
            ArchiveKind::MontageZip
        } else {
            ArchiveKind::Other
        }
    }
}
