use thiserror::Error;

/// Result type for scansort operations
pub type Result<T> = std::result::Result<T, ScansortError>;

/// Error types for scansort operations
#[derive(Error, Debug)]
pub enum ScansortError {
    /// Archive could not be decoded or repackaged
    #[error("archive error: {0}")]
    Archive(String),

    /// Extracted tree does not have the expected group/project/session nesting
    #[error("session layout error: {0}")]
    Layout(String),

    /// Screen-save montage could not be matched to an acquisition
    #[error("screen save error: {0}")]
    ScreenSave(String),

    /// External montage tool failed or is unavailable
    #[error("montage tool error: {0}")]
    Montage(String),

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    Dicom(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for ScansortError {
    fn from(s: String) -> Self {
        ScansortError::Archive(s)
    }
}

impl From<&str> for ScansortError {
    fn from(s: &str) -> Self {
        ScansortError::Archive(s.to_string())
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for ScansortError {
    fn from(e: dicom_object::ReadError) -> Self {
        ScansortError::Dicom(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for ScansortError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        ScansortError::Dicom(format!("{}", e))
    }
}

impl From<zip::result::ZipError> for ScansortError {
    fn from(e: zip::result::ZipError) -> Self {
        ScansortError::Archive(format!("{}", e))
    }
}
