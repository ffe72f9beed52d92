//! Catalog parser.
//!
//! The catalog is a sequence of blocks, one per patient, separated by blank lines:
//!
//! ```text
//! ID: 42
//! ACTIVE PHASE Ground truth: 1
//! ACTIVE PHASE: 0
//! ICD10 MULTICLASS Ground truth: ['C340']
//! ICD10 MULTICLASS: [2]
//! ICD10 BINARY Ground truth: ['C34']
//! ICD10 BINARY: [1]
//! Codes: ['C340']
//!
//! ```
//!
//! [`CatalogParser`] reads the stream once, line by line, and yields a [`Record`] at every
//! blank line that closes a non-empty block. It stops reading as soon as `max_records`
//! records have been produced. A final block without a closing blank line is dropped.

use crate::config::MissingFieldPolicy;
use crate::error::{CatalogError, CatalogResult, ParseError, ParseFailure};
use crate::line::{
    extract_bracket_digits, extract_codes, extract_digits, extract_id, extract_tokens, LineKind,
};
use crate::record::{Record, RecordBuilder};
use std::io::BufRead;

/// Streaming parser over a catalog reader.
///
/// Yields `Ok(Record)` in catalog order. The first error ends the iteration.
pub struct CatalogParser<R> {
    lines: std::io::Lines<R>,
    builder: RecordBuilder,
    line_no: usize,
    produced: usize,
    skipped: usize,
    max_records: usize,
    policy: MissingFieldPolicy,
    done: bool,
}

impl<R: BufRead> CatalogParser<R> {
    pub fn new(reader: R, max_records: usize, policy: MissingFieldPolicy) -> Self {
        Self {
            lines: reader.lines(),
            builder: RecordBuilder::new(),
            line_no: 0,
            produced: 0,
            skipped: 0,
            max_records,
            policy,
            done: max_records == 0,
        }
    }

    /// Records produced so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Incomplete blocks discarded under [`MissingFieldPolicy::SkipAndWarn`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// True once `max_records` records have been produced.
    ///
    /// Reading stops at that point, so this does not tell whether the catalog held more
    /// blocks.
    pub fn capped(&self) -> bool {
        self.produced >= self.max_records
    }

    fn apply(&mut self, kind: LineKind, line: &str) -> Result<(), ParseFailure> {
        match kind {
            LineKind::Id => {
                self.builder.id(extract_id(line)?);
            }
            LineKind::ActivePhaseGroundTruth => {
                self.builder.active_phase_ground_truth(extract_digits(line));
            }
            LineKind::ActivePhasePrediction => {
                self.builder.active_phase_prediction(extract_digits(line));
            }
            LineKind::MulticlassGroundTruth => {
                self.builder.icd10_multiclass_ground_truth(extract_tokens(line)?);
            }
            LineKind::MulticlassPrediction => {
                self.builder
                    .icd10_multiclass_prediction(extract_bracket_digits(line)?);
            }
            LineKind::BinaryGroundTruth => {
                self.builder.icd10_binary_ground_truth(extract_tokens(line)?);
            }
            LineKind::BinaryPrediction => {
                self.builder
                    .icd10_binary_prediction(extract_bracket_digits(line)?);
            }
            LineKind::Codes => {
                self.builder.codes(extract_codes(line)?);
            }
            LineKind::Blank | LineKind::Other => {}
        }
        Ok(())
    }

    fn fail(&mut self, err: CatalogError) -> Option<CatalogResult<Record>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<R: BufRead> Iterator for CatalogParser<R> {
    type Item = CatalogResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return self.fail(CatalogError::CatalogRead(e)),
                None => {
                    self.done = true;
                    if !self.builder.is_empty() {
                        tracing::debug!(
                            line = self.line_no,
                            "dropping unterminated block at end of catalog"
                        );
                    }
                    return None;
                }
            };
            self.line_no += 1;

            let kind = LineKind::classify(&line);
            if kind != LineKind::Blank {
                if let Err(reason) = self.apply(kind, &line) {
                    let err = ParseError {
                        line: self.line_no,
                        field: kind.field().unwrap_or("line"),
                        reason,
                    };
                    return self.fail(err.into());
                }
                continue;
            }

            if self.builder.is_empty() {
                continue;
            }

            match self.builder.build() {
                Ok(record) => {
                    self.produced += 1;
                    if self.produced >= self.max_records {
                        tracing::debug!(max_records = self.max_records, "record cap reached");
                        self.done = true;
                    }
                    return Some(Ok(record));
                }
                Err(missing) => match self.policy {
                    MissingFieldPolicy::FailFast => {
                        return self.fail(CatalogError::IncompleteRecord {
                            line: self.line_no,
                            missing,
                        });
                    }
                    MissingFieldPolicy::SkipAndWarn => {
                        tracing::warn!(
                            line = self.line_no,
                            missing = %missing.join(", "),
                            "skipping incomplete block"
                        );
                        self.skipped += 1;
                    }
                },
            }
        }
    }
}

/// Parse a whole catalog into memory.
///
/// # Errors
///
/// Returns the first parse, read or incomplete-record error.
pub fn parse_catalog<R: BufRead>(
    reader: R,
    max_records: usize,
    policy: MissingFieldPolicy,
) -> CatalogResult<Vec<Record>> {
    CatalogParser::new(reader, max_records, policy).collect()
}
