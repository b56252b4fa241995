use crate::convert::archive;
use crate::convert::walk::{basename, TreeSnapshot};
use crate::error::{Result, ScansortError};
use crate::types::ArchiveKind;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Transient files the scanner archiver leaves inside DICOM bundles
const TRANSIENT_FILES: &[&str] = &["DIGEST.txt", "digest.txt", "METADATA.json", "metadata.json"];

fn of_kind<'a>(files: &'a [PathBuf], kind: ArchiveKind) -> Vec<&'a PathBuf> {
    files.iter().filter(|f| ArchiveKind::of(f) == kind).collect()
}

fn parent_of(path: &Path) -> Result<&Path> {
    path.parent().ok_or_else(|| {
        ScansortError::Archive(format!("{} has no parent directory", path.display()))
    })
}

/// Extracts every `*_dicom(s).tgz` bundle in place
///
/// The extracted directory is stripped of transient digest/metadata files
/// and macOS `._*` cruft, renamed to the literal `dicom` the downstream
/// ingester expects, and the source archive is removed.
pub fn extract_dicom_bundles(files: &[PathBuf]) -> Result<()> {
    let bundles = of_kind(files, ArchiveKind::DicomBundle);
    info!("... {} dicom archive(s) to extract", bundles.len());
    for f in bundles {
        let parent = parent_of(f)?;
        let extracted = archive::untar(f, parent)?;
        remove_transient_files(&extracted)?;
        let dicom_dir = parent.join("dicom");
        debug!("renaming {} -> {}", extracted.display(), dicom_dir.display());
        fs::rename(&extracted, &dicom_dir)?;
        fs::remove_file(f)?;
    }
    Ok(())
}

/// Extracts every `*_pfile.tgz` bundle, gzip-compressing each raw `*.7`
/// pfile up into the acquisition directory, then drops the extracted
/// directory and the source archive.
pub fn repackage_pfile_bundles(files: &[PathBuf]) -> Result<()> {
    let bundles = of_kind(files, ArchiveKind::PfileBundle);
    info!("... {} pfile archive(s) to extract", bundles.len());
    for f in bundles {
        let parent = parent_of(f)?;
        let extracted = archive::untar(f, parent)?;
        let snap = TreeSnapshot::capture(&extracted)?;
        for pfile in &snap.files {
            let name = basename(pfile);
            if name.ends_with(".7") {
                let gz = parent.join(format!("{}.gz", name));
                debug!("gzipping {} -> {}", pfile.display(), gz.display());
                archive::gzip_file(pfile, &gz)?;
            }
        }
        fs::remove_dir_all(&extracted)?;
        fs::remove_file(f)?;
    }
    Ok(())
}

/// Extracts every `*_physio.tgz` bundle and re-zips its contents as
/// `<name>.gephysio.zip` next to the source archive, which is removed
/// along with the extracted directory.
pub fn repackage_physio_bundles(files: &[PathBuf]) -> Result<()> {
    let bundles = of_kind(files, ArchiveKind::PhysioBundle);
    info!("... {} physio archive(s) to extract", bundles.len());
    for f in bundles {
        let parent = parent_of(f)?;
        let extracted = archive::untar(f, parent)?;
        let name = basename(&extracted);
        let zip_path = parent.join(format!("{}.gephysio.zip", name));
        archive::zip_dir(&extracted, &zip_path, &name)?;
        fs::remove_dir_all(&extracted)?;
        fs::remove_file(f)?;
    }
    Ok(())
}

/// Gunzips every `*.csv.gz` physio regressor in place, removing the source
pub fn extract_physio_regressors(files: &[PathBuf]) -> Result<()> {
    let regressors = of_kind(files, ArchiveKind::PhysioRegressor);
    info!("... {} physio regressor file(s) to extract", regressors.len());
    for f in regressors {
        let dst = f.with_extension("");
        archive::gunzip_file(f, &dst)?;
        fs::remove_file(f)?;
    }
    Ok(())
}

fn remove_transient_files(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if TRANSIENT_FILES.contains(&name.as_str()) || name.starts_with("._") {
            debug!("removing transient file {}", entry.path().display());
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
