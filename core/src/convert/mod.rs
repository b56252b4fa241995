//! Archive-to-folder conversion pipeline
//!
//! One [`Conversion`] run unpacks a scanner archive into a timestamped
//! working directory, repackages the nested DICOM/pfile/physio bundles,
//! montages screen saves, resolves the subject id, and rearranges the
//! session into the `group/project/subject` hierarchy the downstream
//! ingester expects.

pub mod archive;
pub mod hierarchy;
pub mod repackage;
pub mod screen_save;
pub mod subject;
pub mod tags;
pub mod unpack;
pub mod walk;

use crate::error::{Result, ScansortError};
use chrono::Local;
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walk::{basename, SessionLayout, TreeSnapshot};

/// One archive-reorganization run
///
/// Unset options are inferred from the extracted tree (`dbtype`, `group`,
/// `project`) or from DICOM headers (`subject`).
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub archive: PathBuf,
    pub output: PathBuf,
    pub dbtype: Option<String>,
    pub group: Option<String>,
    pub project: Option<String>,
    pub subject: Option<String>,
    pub subject_id_field: Option<String>,
    pub prune: Vec<String>,
}

impl Conversion {
    /// Runs the pipeline and returns the run directory on success
    pub fn run(&self) -> Result<PathBuf> {
        let run_dir = self.create_run_dir()?;

        info!(
            "Extracting {} to {}",
            self.archive.display(),
            run_dir.display()
        );
        archive::untar(&self.archive, &run_dir)?;

        info!("Reading path and file info in {}", run_dir.display());
        let layout = SessionLayout::discover(&run_dir)?;

        let dbtype = match &self.dbtype {
            Some(d) => d.clone(),
            None => {
                let detected = basename(&layout.db_root).to_lowercase();
                info!("No dbtype provided... {} detected", detected);
                detected
            }
        };
        debug!("database type: {}", dbtype);
        let group = self
            .group
            .clone()
            .unwrap_or_else(|| basename(&layout.group));
        let project = self
            .project
            .clone()
            .unwrap_or_else(|| basename(&layout.project));

        let snapshot = TreeSnapshot::capture(&run_dir)?;
        repackage::remove_qa_json(&snapshot.files)?;
        repackage::rename_qa_and_montage(&snapshot.files)?;
        repackage::prune_files(&snapshot.files, &self.prune)?;

        // The rename/prune passes mutated the tree; work from a fresh walk
        let snapshot = TreeSnapshot::capture(&run_dir)?;
        info!("Extracting physio regressors...");
        unpack::extract_physio_regressors(&snapshot.files)?;
        info!("Extracting and repackaging physio data...");
        unpack::repackage_physio_bundles(&snapshot.files)?;
        info!("Extracting and repackaging pfiles...");
        unpack::repackage_pfile_bundles(&snapshot.files)?;
        info!("Extracting dicom archives...");
        unpack::extract_dicom_bundles(&snapshot.files)?;

        info!("Processing screen saves...");
        let snapshot = TreeSnapshot::capture(&run_dir)?;
        screen_save::process(&snapshot.dirs)?;

        let subject = match &self.subject {
            Some(s) => s.clone(),
            None => subject::infer_subject_id(
                &layout.session,
                &group,
                self.subject_id_field.as_deref(),
            )?,
        };

        info!("Organizing final file structure...");
        hierarchy::place_session(
            &run_dir,
            &layout.session,
            &layout.db_root,
            &group,
            &project,
            &subject,
        )?;

        info!("Done.");
        Ok(run_dir)
    }

    /// Creates the timestamp-named working directory for this run
    ///
    /// Two runs starting within the same second would share a name; that
    /// collision is surfaced here instead of silently mixing trees.
    fn create_run_dir(&self) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y-%m-%d_%H_%M_%S").to_string();
        let run_dir = self.output.join(stamp);
        fs::create_dir(&run_dir).map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                ScansortError::Layout(format!(
                    "run directory {} already exists (another conversion started this second?)",
                    run_dir.display()
                ))
            } else {
                ScansortError::Io(e)
            }
        })?;
        Ok(run_dir)
    }
}

/// Convenience wrapper used by tests and embedders
pub fn convert(archive: &Path, output: &Path) -> Result<PathBuf> {
    Conversion {
        archive: archive.to_path_buf(),
        output: output.to_path_buf(),
        ..Default::default()
    }
    .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::archive::make_tgz;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::File;
    use tempfile::TempDir;

    /// Builds a full synthetic scanner archive:
    /// `nims/scitran/testproj/<session>/5_bold/` with one nested bundle of
    /// each kind plus the qa files the repackager rewrites.
    fn build_archive(dir: &Path, session: &str) -> PathBuf {
        let src = dir.join("src");
        let acq = src
            .join("nims/scitran/testproj")
            .join(session)
            .join("5_bold");
        fs::create_dir_all(&acq).unwrap();

        make_tgz(
            &acq.join("5_bold_dicoms.tgz"),
            &[
                ("5_bold_dicoms/001.dcm", b"not a real dicom" as &[u8]),
                ("5_bold_dicoms/DIGEST.txt", b"digest"),
            ],
        );
        make_tgz(
            &acq.join("5_bold_pfile.tgz"),
            &[("5_bold_pfile/P00.7", b"kspace" as &[u8])],
        );
        make_tgz(
            &acq.join("5_bold_physio.tgz"),
            &[("5_bold_physio/resp.dat", b"resp" as &[u8])],
        );
        fs::write(acq.join("5_bold_qa.png"), b"png").unwrap();
        fs::write(acq.join("5_bold_qa.json"), b"{}").unwrap();

        let mut enc = GzEncoder::new(
            File::create(acq.join("5_bold_physio_regressors.csv.gz")).unwrap(),
            Compression::default(),
        );
        std::io::Write::write_all(&mut enc, b"t,resp\n").unwrap();
        enc.finish().unwrap();

        let archive = dir.join("session.tar");
        let mut builder = tar::Builder::new(File::create(&archive).unwrap());
        builder.append_dir_all("nims", src.join("nims")).unwrap();
        builder.finish().unwrap();
        archive
    }

    #[test]
    fn test_end_to_end_conversion() {
        let tmp = TempDir::new().unwrap();
        let archive = build_archive(tmp.path(), "20200101_1200_sess");
        let output = tmp.path().join("out");
        fs::create_dir(&output).unwrap();

        let run_dir = Conversion {
            archive,
            output,
            subject: Some("subj01".to_string()),
            ..Default::default()
        }
        .run()
        .unwrap();

        let acq = run_dir.join("scitran/testproj/subj01/20200101_1200_sess/5_bold");
        assert!(acq.is_dir(), "acquisition missing under {}", run_dir.display());

        // Round-trip property: a literal `dicom` directory, no residual
        // bundles or digests
        assert!(acq.join("dicom/001.dcm").is_file());
        assert!(!acq.join("dicom/DIGEST.txt").exists());
        assert!(acq.join("P00.7.gz").is_file());
        assert!(acq.join("5_bold_physio.gephysio.zip").is_file());
        assert!(acq.join("5_bold_physio_regressors.csv").is_file());
        assert!(acq.join("5_bold.qa.png").is_file());
        assert!(!acq.join("5_bold_qa.json").exists());

        let leftovers = TreeSnapshot::capture(&run_dir).unwrap();
        assert!(leftovers
            .files
            .iter()
            .all(|f| !basename(f).ends_with(".tgz")));
        assert!(!run_dir.join("nims").exists());
    }

    #[test]
    fn test_subject_falls_back_to_session_label() {
        let tmp = TempDir::new().unwrap();
        // No dicom bundle in this tree: build a minimal session by hand
        let src = tmp.path().join("src");
        let session = src.join("nims/scitran/testproj/Test Session: 01");
        fs::create_dir_all(session.join("5_bold")).unwrap();
        fs::write(session.join("5_bold/scan.nii"), b"data").unwrap();

        let archive = tmp.path().join("session.tar");
        let mut builder = tar::Builder::new(File::create(&archive).unwrap());
        builder.append_dir_all("nims", src.join("nims")).unwrap();
        builder.finish().unwrap();

        let output = tmp.path().join("out");
        fs::create_dir(&output).unwrap();
        let run_dir = convert(&archive, &output).unwrap();

        assert!(run_dir
            .join("scitran/testproj/sub_Test_Session_01/Test Session: 01/5_bold/scan.nii")
            .is_file());
    }
}
