use std::fmt;

/// Acquisition measurement categories inferred from description labels
///
/// The set is closed: every label maps to exactly one category, with
/// [`MeasurementType::Unknown`] as the catch-all. `Spectroscopy` exists in the
/// set but is never produced by classification (no patterns are defined for
/// it yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum MeasurementType {
    AnatomyT1w,
    AnatomyT2w,
    AnatomyInplane,
    AnatomyIr,
    AnatomyPd,
    Diffusion,
    DiffusionMap,
    Functional,
    FunctionalMap,
    Localizer,
    FieldMap,
    HighOrderShim,
    Calibration,
    CoilSurvey,
    Perfusion,
    PhaseMap,
    Spectroscopy,
    Unknown,
}

impl MeasurementType {
    /// Returns whether this category is the unknown sentinel
    pub fn is_unknown(&self) -> bool {
        matches!(self, MeasurementType::Unknown)
    }

    /// Returns the canonical string form used by the downstream store
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::AnatomyT1w => "anatomy_t1w",
            MeasurementType::AnatomyT2w => "anatomy_t2w",
            MeasurementType::AnatomyInplane => "anatomy_inplane",
            MeasurementType::AnatomyIr => "anatomy_ir",
            MeasurementType::AnatomyPd => "anatomy_pd",
            MeasurementType::Diffusion => "diffusion",
            MeasurementType::DiffusionMap => "diffusion_map",
            MeasurementType::Functional => "functional",
            MeasurementType::FunctionalMap => "functional_map",
            MeasurementType::Localizer => "localizer",
            MeasurementType::FieldMap => "field_map",
            MeasurementType::HighOrderShim => "high_order_shim",
            MeasurementType::Calibration => "calibration",
            MeasurementType::CoilSurvey => "coil_survey",
            MeasurementType::Perfusion => "perfusion",
            MeasurementType::PhaseMap => "phase_map",
            MeasurementType::Spectroscopy => "spectroscopy",
            MeasurementType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
