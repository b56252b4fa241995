use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for scansort
#[derive(Parser, Debug)]
#[command(name = "scansort")]
#[command(about = "Repackage a scanner session archive into a group/project/subject tree")]
#[command(version)]
pub struct Cli {
    /// Scanner archive (tar, optionally gzip-compressed)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Directory the timestamped run directory is created in
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Database type (nims, sdm); detected from the archive when omitted
    #[arg(short, long)]
    pub dbtype: Option<String>,

    /// Group; taken from the archive's folder structure when omitted
    #[arg(short, long)]
    pub group: Option<String>,

    /// Project; taken from the archive's folder structure when omitted
    #[arg(short, long)]
    pub project: Option<String>,

    /// Subject code; inferred from DICOM headers when omitted
    #[arg(short, long)]
    pub subject: Option<String>,

    /// DICOM tag name to read the subject id from (e.g. PatientComments)
    #[arg(short = 'i', long = "subject-id-field")]
    pub subject_id_field: Option<String>,

    /// Remove files with this suffix from the final tree (repeatable)
    #[arg(long)]
    pub prune: Vec<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    pub loglevel: String,
}
