//! Patient record model.
//!
//! A [`Record`] holds one patient's ground truth and model prediction for the three
//! classification tasks. Records are assembled field by field with a [`RecordBuilder`]
//! while the parser walks one catalog block, and are immutable once built.

use crate::constants::STORE_HEADER;
use std::collections::BTreeMap;

/// One row for the tabular sink, keyed by column name.
pub type Row = BTreeMap<String, String>;

/// Ground truth and prediction for one task.
///
/// The two sides may use different element types: for the ICD-10 tasks the ground truth
/// holds code strings such as `"C340"` while the prediction holds categorical indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction<G, P = G> {
    pub ground_truth: Vec<G>,
    pub prediction: Vec<P>,
}

/// One parsed patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub active_phase: Prediction<u8>,
    pub icd10_multiclass: Prediction<String, u8>,
    pub icd10_binary: Prediction<String, u8>,
    pub codes: String,
}

impl Record {
    /// Render the record as a sink row, one entry per [`STORE_HEADER`] column.
    ///
    /// Sequences are written in their bracketed form: `[1, 0]` for digits and
    /// `['C340', 'C341']` for code tokens.
    pub fn to_row(&self) -> Row {
        let values = [
            self.id.to_string(),
            render_digits(&self.active_phase.ground_truth),
            render_digits(&self.active_phase.prediction),
            render_tokens(&self.icd10_multiclass.ground_truth),
            render_digits(&self.icd10_multiclass.prediction),
            render_tokens(&self.icd10_binary.ground_truth),
            render_digits(&self.icd10_binary.prediction),
            self.codes.clone(),
        ];

        STORE_HEADER
            .iter()
            .map(|name| name.to_string())
            .zip(values)
            .collect()
    }
}

/// Render a digit sequence as `[1, 0, 1]`.
pub fn render_digits(values: &[u8]) -> String {
    let inner = values
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}

/// Render a token sequence as `['C340', 'C341']`.
pub fn render_tokens(values: &[String]) -> String {
    let inner = values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}

/// Accumulates the fields of one catalog block.
///
/// Setting a field twice keeps the last value.
#[derive(Debug, Default, Clone)]
pub struct RecordBuilder {
    id: Option<u64>,
    active_phase_ground_truth: Option<Vec<u8>>,
    active_phase_prediction: Option<Vec<u8>>,
    icd10_multiclass_ground_truth: Option<Vec<String>>,
    icd10_multiclass_prediction: Option<Vec<u8>>,
    icd10_binary_ground_truth: Option<Vec<String>>,
    icd10_binary_prediction: Option<Vec<u8>>,
    codes: Option<String>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first field is set.
    pub fn is_empty(&self) -> bool {
        self.missing().len() == STORE_HEADER.len()
    }

    pub fn id(&mut self, id: u64) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn active_phase_ground_truth(&mut self, values: Vec<u8>) -> &mut Self {
        self.active_phase_ground_truth = Some(values);
        self
    }

    pub fn active_phase_prediction(&mut self, values: Vec<u8>) -> &mut Self {
        self.active_phase_prediction = Some(values);
        self
    }

    pub fn icd10_multiclass_ground_truth(&mut self, values: Vec<String>) -> &mut Self {
        self.icd10_multiclass_ground_truth = Some(values);
        self
    }

    pub fn icd10_multiclass_prediction(&mut self, values: Vec<u8>) -> &mut Self {
        self.icd10_multiclass_prediction = Some(values);
        self
    }

    pub fn icd10_binary_ground_truth(&mut self, values: Vec<String>) -> &mut Self {
        self.icd10_binary_ground_truth = Some(values);
        self
    }

    pub fn icd10_binary_prediction(&mut self, values: Vec<u8>) -> &mut Self {
        self.icd10_binary_prediction = Some(values);
        self
    }

    pub fn codes(&mut self, codes: String) -> &mut Self {
        self.codes = Some(codes);
        self
    }

    /// Column names of the fields not yet set, in header order.
    pub fn missing(&self) -> Vec<&'static str> {
        let present = [
            self.id.is_some(),
            self.active_phase_ground_truth.is_some(),
            self.active_phase_prediction.is_some(),
            self.icd10_multiclass_ground_truth.is_some(),
            self.icd10_multiclass_prediction.is_some(),
            self.icd10_binary_ground_truth.is_some(),
            self.icd10_binary_prediction.is_some(),
            self.codes.is_some(),
        ];

        STORE_HEADER
            .iter()
            .zip(present)
            .filter(|(_, set)| !set)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Build the record, leaving the builder empty.
    ///
    /// # Errors
    ///
    /// Returns the names of the missing fields if any field was never set. The builder is
    /// reset either way.
    pub fn build(&mut self) -> Result<Record, Vec<&'static str>> {
        let missing = self.missing();
        let taken = std::mem::take(self);
        if !missing.is_empty() {
            return Err(missing);
        }

        match taken {
            RecordBuilder {
                id: Some(id),
                active_phase_ground_truth: Some(ap_gt),
                active_phase_prediction: Some(ap_pred),
                icd10_multiclass_ground_truth: Some(mc_gt),
                icd10_multiclass_prediction: Some(mc_pred),
                icd10_binary_ground_truth: Some(bin_gt),
                icd10_binary_prediction: Some(bin_pred),
                codes: Some(codes),
            } => Ok(Record {
                id,
                active_phase: Prediction {
                    ground_truth: ap_gt,
                    prediction: ap_pred,
                },
                icd10_multiclass: Prediction {
                    ground_truth: mc_gt,
                    prediction: mc_pred,
                },
                icd10_binary: Prediction {
                    ground_truth: bin_gt,
                    prediction: bin_pred,
                },
                codes,
            }),
            _ => Err(missing),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_record(id: u64) -> Record {
        Record {
            id,
            active_phase: Prediction {
                ground_truth: vec![1],
                prediction: vec![0],
            },
            icd10_multiclass: Prediction {
                ground_truth: vec!["C340".into(), "C341".into()],
                prediction: vec![2, 6],
            },
            icd10_binary: Prediction {
                ground_truth: vec!["C34".into()],
                prediction: vec![1],
            },
            codes: "C340, C341".into(),
        }
    }

    #[test]
    fn test_render_sequences() {
        assert_eq!(render_digits(&[1, 0, 1]), "[1, 0, 1]");
        assert_eq!(render_digits(&[]), "[]");
        assert_eq!(render_tokens(&["C340".to_string(), "other".to_string()]), "['C340', 'other']");
        assert_eq!(render_tokens(&[]), "[]");
    }

    #[test]
    fn test_to_row_covers_every_header_column() {
        let row = sample_record(7).to_row();

        let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
        let mut header = STORE_HEADER.to_vec();
        keys.sort_unstable();
        header.sort_unstable();
        assert_eq!(keys, header);

        assert_eq!(row["id"], "7");
        assert_eq!(row["active_phase_ground_truth"], "[1]");
        assert_eq!(row["icd10_multiclass_ground_truth"], "['C340', 'C341']");
        assert_eq!(row["icd10_multiclass_prediction"], "[2, 6]");
        assert_eq!(row["codes"], "C340, C341");
    }

    #[test]
    fn test_builder_reports_missing_fields_in_header_order() {
        let mut builder = RecordBuilder::new();
        assert!(builder.is_empty());

        builder.id(3).codes("C34".into());
        assert!(!builder.is_empty());
        assert_eq!(
            builder.missing(),
            vec![
                "active_phase_ground_truth",
                "active_phase_prediction",
                "icd10_multiclass_ground_truth",
                "icd10_multiclass_prediction",
                "icd10_binary_ground_truth",
                "icd10_binary_prediction",
            ]
        );

        let missing = builder.build().expect_err("incomplete builder must not build");
        assert_eq!(missing.len(), 6);
        assert!(builder.is_empty(), "build resets the builder");
    }

    #[test]
    fn test_builder_last_write_wins() {
        let mut builder = RecordBuilder::new();
        builder
            .id(1)
            .id(2)
            .active_phase_ground_truth(vec![1])
            .active_phase_prediction(vec![1])
            .icd10_multiclass_ground_truth(vec!["C340".into()])
            .icd10_multiclass_prediction(vec![0])
            .icd10_binary_ground_truth(vec!["C34".into()])
            .icd10_binary_prediction(vec![1])
            .codes("C340".into());

        let record = builder.build().expect("complete builder");
        assert_eq!(record.id, 2);
        assert!(builder.is_empty());
    }
}
