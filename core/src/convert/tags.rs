use dicom_core::Tag;
use dicom_object::InMemDicomObject;

pub use dicom_dictionary_std::tags::{PATIENT_ID, PATIENT_NAME, STUDY_ID};

/// Helper to get a non-empty string value from a DICOM tag
///
/// Returns `None` when the tag is absent, unreadable, or blank.
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Same as [`get_string_value`] but resolves the tag by its dictionary
/// name (e.g. `"PatientBirthDate"`), for operator-configured fields.
pub fn get_string_value_by_name(dcm: &InMemDicomObject, name: &str) -> Option<String> {
    dcm.element_by_name(name)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
