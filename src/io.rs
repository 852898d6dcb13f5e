use serde_json::Value;

use crate::error::CalibrationError;
use crate::optimization::{MIN_CORRESPONDENCES, estimate_projection_matrix};
use crate::types::{Correspondence, ProjectionMatrix};

/// Converts loosely typed records `[[u, v, x, y, z], ...]` into correspondences.
///
/// Entries are checked in order. For each entry the shape is checked before
/// its components; an entry that is not a sequence reports zero components.
/// Integer and floating-point numbers are both accepted.
pub fn correspondences_from_records(
    records: &Value,
) -> Result<Vec<Correspondence>, CalibrationError> {
    let entries = records.as_array().ok_or(CalibrationError::NotASequence)?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let components = entry
                .as_array()
                .ok_or(CalibrationError::MalformedCorrespondence {
                    index,
                    components: 0,
                })?;
            if components.len() != 5 {
                return Err(CalibrationError::MalformedCorrespondence {
                    index,
                    components: components.len(),
                });
            }
            let values = components
                .iter()
                .enumerate()
                .map(|(component, value)| {
                    value
                        .as_f64()
                        .filter(|v| v.is_finite())
                        .ok_or(CalibrationError::NonNumericElement { index, component })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Correspondence::from_components(index, &values)
        })
        .collect()
}

/// Parses a JSON string of records, see [`correspondences_from_records`].
pub fn correspondences_from_json_str(s: &str) -> Result<Vec<Correspondence>, CalibrationError> {
    let records: Value = serde_json::from_str(s)?;
    correspondences_from_records(&records)
}

/// Checks the record count, then converts the entries.
///
/// Fewer than six records is reported before any entry is inspected.
pub fn validated_correspondences(records: &Value) -> Result<Vec<Correspondence>, CalibrationError> {
    let entries = records.as_array().ok_or(CalibrationError::NotASequence)?;
    if entries.len() < MIN_CORRESPONDENCES {
        return Err(CalibrationError::InsufficientData {
            required: MIN_CORRESPONDENCES,
            found: entries.len(),
        });
    }
    correspondences_from_records(records)
}

/// Least-squares estimate from loosely typed records.
///
/// The record count is checked first, then each entry's shape and content.
pub fn estimate_projection_matrix_from_records(
    records: &Value,
) -> Result<ProjectionMatrix, CalibrationError> {
    let correspondences = validated_correspondences(records)?;
    estimate_projection_matrix(&correspondences)
}
