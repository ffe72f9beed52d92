//! Catalog line classification and field extraction.
//!
//! Each raw catalog line is classified once into a [`LineKind`]; the parser dispatches on
//! the variant. Marker precedence is fixed: `ID`, `ACTIVE PHASE`, `ICD10 MULTICLASS`,
//! `ICD10 BINARY`, `Codes`, then blank lines. Within a task, the `Ground truth` marker
//! selects the ground-truth side.

use crate::constants::{
    MARKER_ACTIVE_PHASE, MARKER_BINARY, MARKER_CODES, MARKER_GROUND_TRUTH, MARKER_ID,
    MARKER_MULTICLASS,
};
use crate::error::ParseFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Id,
    ActivePhaseGroundTruth,
    ActivePhasePrediction,
    MulticlassGroundTruth,
    MulticlassPrediction,
    BinaryGroundTruth,
    BinaryPrediction,
    Codes,
    Blank,
    Other,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        let ground_truth = line.contains(MARKER_GROUND_TRUTH);

        if line.contains(MARKER_ID) {
            LineKind::Id
        } else if line.contains(MARKER_ACTIVE_PHASE) {
            if ground_truth {
                LineKind::ActivePhaseGroundTruth
            } else {
                LineKind::ActivePhasePrediction
            }
        } else if line.contains(MARKER_MULTICLASS) {
            if ground_truth {
                LineKind::MulticlassGroundTruth
            } else {
                LineKind::MulticlassPrediction
            }
        } else if line.contains(MARKER_BINARY) {
            if ground_truth {
                LineKind::BinaryGroundTruth
            } else {
                LineKind::BinaryPrediction
            }
        } else if line.contains(MARKER_CODES) {
            LineKind::Codes
        } else if line.trim().is_empty() {
            LineKind::Blank
        } else {
            LineKind::Other
        }
    }

    /// Store column filled by this kind of line, if any.
    pub fn field(self) -> Option<&'static str> {
        match self {
            LineKind::Id => Some("id"),
            LineKind::ActivePhaseGroundTruth => Some("active_phase_ground_truth"),
            LineKind::ActivePhasePrediction => Some("active_phase_prediction"),
            LineKind::MulticlassGroundTruth => Some("icd10_multiclass_ground_truth"),
            LineKind::MulticlassPrediction => Some("icd10_multiclass_prediction"),
            LineKind::BinaryGroundTruth => Some("icd10_binary_ground_truth"),
            LineKind::BinaryPrediction => Some("icd10_binary_prediction"),
            LineKind::Codes => Some("codes"),
            LineKind::Blank | LineKind::Other => None,
        }
    }
}

/// Concatenate every digit on the line into an id.
pub(crate) fn extract_id(line: &str) -> Result<u64, ParseFailure> {
    let digits: String = line.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ParseFailure::MissingDigits);
    }
    digits.parse().map_err(|_| ParseFailure::IdOverflow)
}

/// Every digit character of `text`, one value per digit.
pub(crate) fn extract_digits(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as u8)
        .collect()
}

/// The text between the first `[` and the next `[` (or the end of the line).
pub(crate) fn bracket_segment(line: &str) -> Result<&str, ParseFailure> {
    line.split('[').nth(1).ok_or(ParseFailure::MissingBracket)
}

/// Space-separated tokens of the bracket segment with quotes, `]` and line breaks removed.
///
/// Separators other than single spaces are kept inside tokens, so `['C340', 'C341']`
/// yields `C340,` and `C341`.
pub(crate) fn extract_tokens(line: &str) -> Result<Vec<String>, ParseFailure> {
    let segment = bracket_segment(line)?;
    Ok(segment
        .split(' ')
        .map(|token| strip_chars(token, &['\'', ']', '\n']))
        .collect())
}

/// Digits of the bracket segment.
pub(crate) fn extract_bracket_digits(line: &str) -> Result<Vec<u8>, ParseFailure> {
    bracket_segment(line).map(extract_digits)
}

/// The bracket segment with `]` and `'` removed and line breaks stripped.
pub(crate) fn extract_codes(line: &str) -> Result<String, ParseFailure> {
    bracket_segment(line).map(|segment| strip_chars(segment, &[']', '\'', '\n']))
}

fn strip_chars(text: &str, chars: &[char]) -> String {
    text.chars().filter(|c| !chars.contains(c)).collect()
}
