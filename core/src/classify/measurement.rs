use crate::types::MeasurementType;
use once_cell::sync::Lazy;
use regex::Regex;

/// A rule fires when every listed pattern finds a match in the label.
///
/// Multi-pattern rules stand in for the original cascade's conjunctive
/// patterns ("contains X and Y"); most rules are a single search.
type Rule = &'static [&'static str];

/// Ordered (category, rules) cascade evaluated by [`infer_measurement`].
///
/// The order is load-bearing: labels routinely satisfy several predicates
/// (a diffusion-derived map can carry "t2"-like substrings) and the listed
/// priority disambiguates them. A category matches when any one of its
/// rules fires. Patterns are case-insensitive except `^REST$` and `^PD$`,
/// which are deliberately exact.
///
/// `Spectroscopy` carries no rules yet and is therefore never produced.
static CASCADE_TABLE: &[(MeasurementType, &[Rule])] = &[
    (MeasurementType::AnatomyInplane, &[&["(?i)inplane"]]),
    (
        MeasurementType::Diffusion,
        &[
            &["(?i)dti"],
            &["(?i)dwi"],
            &["(?i)diff_"],
            &["(?i)diffusion"],
            &["(?i)diff", "(?i)dir"],
            &["(?i)hardi"],
        ],
    ),
    (
        MeasurementType::AnatomyT1w,
        &[
            &["(?i)t1"],
            &["(?i)spgr"],
            &["(?i)tfl"],
            &["(?i)mprage"],
            &["(?i)mm", "(?i)iso"],
            &["(?i)mp", "(?i)rage"],
        ],
    ),
    (MeasurementType::AnatomyT2w, &[&["(?i)t2"]]),
    (
        MeasurementType::AnatomyIr,
        &[&["(?i)ir", "(?i)epi"], &["(?i)flair"]],
    ),
    (
        MeasurementType::Functional,
        &[
            &["(?i)functional"],
            &["(?i)fmri"],
            &["(?i)bold"],
            &["(?i)resting"],
            &["(?i)rest", "(?i)state"],
            &["(?i)go-no-go"],
            &["(?i)emoreg"],
            &["(?i)conscious"],
            &["^REST$"],
        ],
    ),
    (
        MeasurementType::DiffusionMap,
        &[
            &["(?i)_adc$"],
            &["(?i)_tracew$"],
            &["(?i)_colfa$"],
            &["(?i)_fa$"],
            &["(?i)_exp$"],
        ],
    ),
    (
        MeasurementType::Localizer,
        &[
            &["(?i)localizer"],
            &["(?i)survey"],
            &[r"(?i)loc\."],
            &[r"(?i)\bscout\b"],
            &["(?i)plane", "(?i)loc"],
            &["(?i)plane", "(?i)survey"],
            &["(?i)3-plane"],
            &["(?i)^loc*"],
        ],
    ),
    (MeasurementType::FieldMap, &[&["(?i)field", "(?i)map"]]),
    (
        MeasurementType::HighOrderShim,
        &[
            &["(?i)ho", "(?i)shim"],
            &[r"(?i)\bhos\b"],
            &["(?i)_hos_"],
            &["(?i)shim"],
        ],
    ),
    (
        MeasurementType::Calibration,
        &[
            &["(?i)asset", "(?i)cal"],
            &["(?i)^asset$"],
            &["(?i)calibration"],
        ],
    ),
    (
        MeasurementType::FunctionalMap,
        &[&["(?i)mocoseries"], &["(?i)glm$"], &["(?i)t-map"]],
    ),
    (MeasurementType::CoilSurvey, &[&["(?i)coil", "(?i)survey"]]),
    (
        MeasurementType::AnatomyPd,
        &[&["^PD$"], &["(?i)proton", "(?i)density"]],
    ),
    (
        MeasurementType::Perfusion,
        &[
            &["(?i)asl"],
            &["(?i)blood", "(?i)flow"],
            &["(?i)art", "(?i)spin"],
        ],
    ),
    (MeasurementType::Spectroscopy, &[]),
    (
        MeasurementType::PhaseMap,
        &[&["(?i)phase", "(?i)map"], &["(?i)^phase$"]],
    ),
];

static CASCADE: Lazy<Vec<(MeasurementType, Vec<Vec<Regex>>)>> = Lazy::new(|| {
    CASCADE_TABLE
        .iter()
        .map(|(measurement, rules)| {
            let compiled = rules
                .iter()
                .map(|rule| {
                    rule.iter()
                        .map(|p| Regex::new(p).expect("Failed to compile label pattern"))
                        .collect()
                })
                .collect();
            (*measurement, compiled)
        })
        .collect()
});

/// Infers the measurement category from an acquisition description label
///
/// Evaluates the cascade in declaration order and returns the first
/// matching category, or [`MeasurementType::Unknown`] when nothing fires.
/// Pure and stateless; safe to call from parallel batch updates.
pub fn infer_measurement(label: &str) -> MeasurementType {
    for (measurement, rules) in CASCADE.iter() {
        if rules
            .iter()
            .any(|rule| rule.iter().all(|re| re.is_match(label)))
        {
            return *measurement;
        }
    }
    MeasurementType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("T1_MPRAGE_mm_iso", MeasurementType::AnatomyT1w)]
    #[case("3D SPGR", MeasurementType::AnatomyT1w)]
    #[case("inplane_T1", MeasurementType::AnatomyInplane)]
    #[case("T2w CUBE", MeasurementType::AnatomyT2w)]
    #[case("T2_FLAIR", MeasurementType::AnatomyT2w)]
    #[case("IR-EPI", MeasurementType::AnatomyIr)]
    #[case("DTI_64dir", MeasurementType::Diffusion)]
    #[case("DWI b=1000", MeasurementType::Diffusion)]
    #[case("someScan_FA", MeasurementType::DiffusionMap)]
    #[case("someScan_ADC", MeasurementType::DiffusionMap)]
    #[case("BOLD_run1", MeasurementType::Functional)]
    #[case("resting state", MeasurementType::Functional)]
    #[case("MOCOSERIES", MeasurementType::FunctionalMap)]
    #[case("3-plane localizer", MeasurementType::Localizer)]
    #[case("B0 field map", MeasurementType::FieldMap)]
    #[case("HO Shimming", MeasurementType::HighOrderShim)]
    #[case("ASSET cal", MeasurementType::Calibration)]
    #[case("pASL perfusion", MeasurementType::Perfusion)]
    #[case("phase map", MeasurementType::PhaseMap)]
    #[case("", MeasurementType::Unknown)]
    #[case("xyz123", MeasurementType::Unknown)]
    fn test_classification(#[case] label: &str, #[case] expected: MeasurementType) {
        assert_eq!(infer_measurement(label), expected);
    }

    #[test]
    fn test_mprage_defaults_to_t1w() {
        // mprage labels land in t1w unless an earlier-priority predicate
        // (inplane, diffusion) also matches.
        assert_eq!(infer_measurement("MPRAGE"), MeasurementType::AnatomyT1w);
        assert_eq!(
            infer_measurement("mprage inplane"),
            MeasurementType::AnatomyInplane
        );
    }

    #[test]
    fn test_priority_ordering() {
        // "DTI_T2_map" satisfies diffusion, t2 and (field|phase)-style
        // predicates; diffusion is declared earlier and wins.
        assert_eq!(infer_measurement("DTI_T2_map"), MeasurementType::Diffusion);
        // diffusion beats the derived-map suffixes as well.
        assert_eq!(infer_measurement("DTI_FA"), MeasurementType::Diffusion);
    }

    #[test]
    fn test_exact_case_patterns() {
        assert_eq!(infer_measurement("REST"), MeasurementType::Functional);
        assert_eq!(infer_measurement("rest"), MeasurementType::Unknown);
        assert_eq!(infer_measurement("PD"), MeasurementType::AnatomyPd);
        assert_eq!(infer_measurement("pd"), MeasurementType::Unknown);
    }

    #[test]
    fn test_spectroscopy_is_unreachable() {
        assert_eq!(
            infer_measurement("spectroscopy"),
            MeasurementType::Unknown
        );
    }

    #[test]
    fn test_pure_and_deterministic() {
        let labels = ["BOLD_run1", "DTI_64dir", "MPRAGE", "", "survey"];
        let first: Vec<_> = labels.iter().map(|l| infer_measurement(l)).collect();
        // Repeat in reverse order; individual results must not change.
        let second: Vec<_> = labels
            .iter()
            .rev()
            .map(|l| infer_measurement(l))
            .collect();
        for (i, label) in labels.iter().enumerate() {
            assert_eq!(first[i], second[labels.len() - 1 - i], "label {label:?}");
            assert_eq!(first[i], infer_measurement(label));
        }
    }
}
