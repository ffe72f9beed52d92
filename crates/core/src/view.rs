//! Dashboard view model.
//!
//! Plain data for the prediction map: which patient a query refers to, how patients are
//! grouped into ranges of ten for the overview, and how each task's ground truth lines up
//! with the model prediction.
//!
//! Only predictions of the two ICD-10 tasks go through the [`Vocabulary`]; ground truth is
//! shown as stored. The two sides can therefore use different spellings for the same
//! diagnosis (for example a stored `C340,` token against a normalized `C340`).

use crate::constants::MAX_DETAIL_COLUMNS;
use crate::store::{StoreTable, StoredField, StoredRecord};
use icd10_vocab::{LookupError, Task, Vocabulary};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("the store has no patients")]
    EmptyStore,
    #[error("no patient with id {0}")]
    UnknownPatient(String),
    #[error("no patient range starts at {0:?}")]
    UnknownRange(String),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub type ViewResult<T> = Result<T, ViewError>;

/// Resolve a patient query.
///
/// A query that is not a plain number selects the first patient, so an unset or garbled
/// selection still shows something. A numeric query must match a stored id.
pub fn resolve_patient<'a>(table: &'a StoreTable, query: &str) -> ViewResult<&'a StoredRecord> {
    let first = table.get(0).ok_or(ViewError::EmptyStore)?;

    let query = query.trim();
    if query.is_empty() || !query.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(first);
    }

    table
        .position(query)
        .and_then(|index| table.get(index))
        .ok_or_else(|| ViewError::UnknownPatient(query.to_string()))
}

/// Range labels (`"<first id>-<last id>"`) covering the store in pages of `page` patients.
pub fn id_ranges(table: &StoreTable, page: usize) -> Vec<String> {
    let ids = table.ids();
    let page = page.max(1);

    (0..ids.len())
        .step_by(page)
        .map(|start| {
            let end = (start + page - 1).min(ids.len() - 1);
            format!("{}-{}", ids[start], ids[end])
        })
        .collect()
}

/// The patients of one range label, starting at its first id.
pub fn page_for_range<'a>(
    table: &'a StoreTable,
    label: &str,
    page: usize,
) -> ViewResult<&'a [StoredRecord]> {
    let start_id = label.split('-').next().unwrap_or_default().trim();
    let start = table
        .position(start_id)
        .ok_or_else(|| ViewError::UnknownRange(label.to_string()))?;
    let end = (start + page.max(1)).min(table.len());

    Ok(&table.rows()[start..end])
}

/// The three tasks shown per patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    ActivePhase,
    Icd10Binary,
    Icd10Multiclass,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [
        TaskKind::ActivePhase,
        TaskKind::Icd10Binary,
        TaskKind::Icd10Multiclass,
    ];

    pub fn title(self) -> &'static str {
        match self {
            TaskKind::ActivePhase => "Active Phase",
            TaskKind::Icd10Binary => "ICD10 Binary",
            TaskKind::Icd10Multiclass => "ICD10 Multiclass",
        }
    }

    fn columns(self) -> (StoredField, StoredField) {
        match self {
            TaskKind::ActivePhase => (
                StoredField::ActivePhaseGroundTruth,
                StoredField::ActivePhasePrediction,
            ),
            TaskKind::Icd10Binary => (
                StoredField::BinaryGroundTruth,
                StoredField::BinaryPrediction,
            ),
            TaskKind::Icd10Multiclass => (
                StoredField::MulticlassGroundTruth,
                StoredField::MulticlassPrediction,
            ),
        }
    }

    fn vocabulary_task(self) -> Option<Task> {
        match self {
            TaskKind::ActivePhase => None,
            TaskKind::Icd10Binary => Some(Task::Binary),
            TaskKind::Icd10Multiclass => Some(Task::Multiclass),
        }
    }
}

/// One position of a task's ground truth / prediction pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agreement {
    pub index: usize,
    pub ground_truth: Option<String>,
    pub prediction: Option<String>,
    pub matches: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskComparison {
    pub task: TaskKind,
    pub ground_truth: Vec<String>,
    pub prediction: Vec<String>,
    pub agreement: Vec<Agreement>,
}

impl TaskComparison {
    pub fn ground_truth_text(&self) -> String {
        self.ground_truth.join(", ")
    }

    pub fn prediction_text(&self) -> String {
        self.prediction.join(", ")
    }

    pub fn all_match(&self) -> bool {
        self.agreement.iter().all(|a| a.matches)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientComparison {
    pub id: String,
    pub tasks: Vec<TaskComparison>,
    pub codes: String,
}

impl PatientComparison {
    /// Number of code columns in the single-patient map.
    pub fn detail_columns(&self) -> usize {
        self.tasks
            .iter()
            .map(|t| t.agreement.len())
            .max()
            .unwrap_or(0)
            .min(MAX_DETAIL_COLUMNS)
    }
}

/// Line up ground truth and (normalized) prediction for every task of one patient.
///
/// # Errors
///
/// Returns [`ViewError::Lookup`] if a stored ICD-10 prediction label is outside the
/// vocabulary.
pub fn compare_patient(record: &StoredRecord, vocab: &Vocabulary) -> ViewResult<PatientComparison> {
    let tasks = TaskKind::ALL
        .into_iter()
        .map(|task| compare_task(record, task, vocab))
        .collect::<ViewResult<Vec<_>>>()?;

    Ok(PatientComparison {
        id: record.id.clone(),
        tasks,
        codes: record.codes.clone(),
    })
}

fn compare_task(
    record: &StoredRecord,
    task: TaskKind,
    vocab: &Vocabulary,
) -> ViewResult<TaskComparison> {
    let (truth_field, prediction_field) = task.columns();
    let ground_truth = record.values(truth_field);
    let raw_prediction = record.values(prediction_field);

    let prediction = match task.vocabulary_task() {
        Some(vocab_task) => vocab
            .normalize_all(vocab_task, &raw_prediction)?
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => raw_prediction,
    };

    let width = ground_truth.len().max(prediction.len());
    let agreement = (0..width)
        .map(|index| {
            let truth = ground_truth.get(index).cloned();
            let predicted = prediction.get(index).cloned();
            Agreement {
                index,
                matches: truth.is_some() && truth == predicted,
                ground_truth: truth,
                prediction: predicted,
            }
        })
        .collect();

    Ok(TaskComparison {
        task,
        ground_truth,
        prediction,
        agreement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PAGE_SIZE, STORE_HEADER};
    use crate::record::tests::sample_record;
    use crate::record::Record;
    use crate::sink::TabularSink;
    use std::io::Cursor;

    fn table_of(records: &[Record]) -> StoreTable {
        let mut sink = TabularSink::from_writer(Vec::new(), &STORE_HEADER).unwrap();
        for record in records {
            sink.append_record(record).unwrap();
        }
        StoreTable::from_reader(Cursor::new(sink.into_inner().unwrap())).unwrap()
    }

    fn table_with_ids(ids: impl IntoIterator<Item = u64>) -> StoreTable {
        let records: Vec<Record> = ids.into_iter().map(sample_record).collect();
        table_of(&records)
    }

    fn single_code_record(id: u64) -> Record {
        let mut record = sample_record(id);
        record.icd10_multiclass.ground_truth = vec!["C342".into()];
        record.icd10_multiclass.prediction = vec![2];
        record
    }

    #[test]
    fn test_resolve_patient() {
        let table = table_with_ids([10, 20, 30]);

        assert_eq!(resolve_patient(&table, "20").unwrap().id, "20");
        assert_eq!(resolve_patient(&table, " 30 ").unwrap().id, "30");
        assert_eq!(resolve_patient(&table, "abc").unwrap().id, "10");
        assert_eq!(resolve_patient(&table, "").unwrap().id, "10");
        assert!(matches!(
            resolve_patient(&table, "25"),
            Err(ViewError::UnknownPatient(id)) if id == "25"
        ));
    }

    #[test]
    fn test_resolve_patient_on_empty_store() {
        let table = StoreTable::default();
        assert!(matches!(
            resolve_patient(&table, "1"),
            Err(ViewError::EmptyStore)
        ));
    }

    #[test]
    fn test_id_ranges_pages_of_ten() {
        let table = table_with_ids(100..123);
        assert_eq!(
            id_ranges(&table, PAGE_SIZE),
            vec!["100-109", "110-119", "120-122"]
        );

        let exact = table_with_ids(0..10);
        assert_eq!(id_ranges(&exact, PAGE_SIZE), vec!["0-9"]);

        assert!(id_ranges(&StoreTable::default(), PAGE_SIZE).is_empty());
    }

    #[test]
    fn test_page_for_range() {
        let table = table_with_ids(100..123);

        let page = page_for_range(&table, "110-119", PAGE_SIZE).unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].id, "110");

        let tail = page_for_range(&table, "120-122", PAGE_SIZE).unwrap();
        let ids: Vec<&str> = tail.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["120", "121", "122"]);

        assert!(matches!(
            page_for_range(&table, "7-8", PAGE_SIZE),
            Err(ViewError::UnknownRange(_))
        ));
    }

    #[test]
    fn test_compare_patient_normalizes_icd10_predictions_only() {
        let table = table_of(&[single_code_record(5)]);
        let vocab = Vocabulary::load();
        let comparison = compare_patient(table.get(0).unwrap(), &vocab).unwrap();

        assert_eq!(comparison.id, "5");
        assert_eq!(comparison.tasks.len(), 3);

        let active = &comparison.tasks[0];
        assert_eq!(active.task, TaskKind::ActivePhase);
        assert_eq!(active.ground_truth, vec!["1"]);
        assert_eq!(active.prediction, vec!["0"]);
        assert!(!active.all_match());

        let binary = &comparison.tasks[1];
        assert_eq!(binary.prediction, vec!["C34"]);
        assert!(binary.all_match());

        let multiclass = &comparison.tasks[2];
        assert_eq!(multiclass.ground_truth, vec!["C342"]);
        assert_eq!(multiclass.prediction, vec!["C342"]);
        assert!(multiclass.all_match());
    }

    #[test]
    fn test_known_vocabulary_asymmetry_is_preserved() {
        // Stored ground truth holds code strings while stored predictions hold labels.
        let table = table_of(&[sample_record(6)]);
        let stored = table.get(0).unwrap();
        assert_eq!(stored.icd10_multiclass_ground_truth, "['C340', 'C341']");
        assert_eq!(stored.icd10_multiclass_prediction, "[2, 6]");

        // Ground truth is never normalized, so matching spellings are needed for agreement.
        let comparison = compare_patient(stored, &Vocabulary::load()).unwrap();
        let multiclass = &comparison.tasks[2];
        assert_eq!(multiclass.ground_truth, vec!["C340", "C341"]);
        assert_eq!(multiclass.prediction, vec!["C342", "other"]);
        assert!(multiclass.agreement.iter().all(|a| !a.matches));
    }

    #[test]
    fn test_catalog_separators_break_agreement() {
        let mut record = sample_record(7);
        record.icd10_multiclass.ground_truth = vec!["C340,".into(), "C341".into()];
        record.icd10_multiclass.prediction = vec![0, 1];
        let table = table_of(&[record]);

        let comparison = compare_patient(table.get(0).unwrap(), &Vocabulary::load()).unwrap();
        let flags: Vec<bool> = comparison.tasks[2]
            .agreement
            .iter()
            .map(|a| a.matches)
            .collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn test_uneven_lengths_pad_with_none() {
        let mut record = sample_record(8);
        record.active_phase.ground_truth = vec![1, 0, 1];
        record.active_phase.prediction = vec![1];
        let table = table_of(&[record]);

        let comparison = compare_patient(table.get(0).unwrap(), &Vocabulary::load()).unwrap();
        let active = &comparison.tasks[0];
        assert_eq!(active.agreement.len(), 3);
        assert!(active.agreement[0].matches);
        assert_eq!(active.agreement[2].prediction, None);
        assert!(!active.agreement[2].matches);
        assert_eq!(comparison.detail_columns(), 3);
    }

    #[test]
    fn test_detail_columns_are_capped() {
        let mut record = sample_record(9);
        record.active_phase.ground_truth = vec![1; 8];
        record.active_phase.prediction = vec![1; 8];
        let table = table_of(&[record]);

        let comparison = compare_patient(table.get(0).unwrap(), &Vocabulary::load()).unwrap();
        assert_eq!(comparison.detail_columns(), MAX_DETAIL_COLUMNS);
    }

    #[test]
    fn test_unknown_prediction_label_is_a_lookup_error() {
        let mut record = sample_record(10);
        record.icd10_binary.prediction = vec![3];
        let table = table_of(&[record]);

        let err = compare_patient(table.get(0).unwrap(), &Vocabulary::load())
            .expect_err("3 is not a binary label");
        assert!(matches!(err, ViewError::Lookup(LookupError::UnknownLabel { .. })));
    }

    #[test]
    fn test_comparison_serializes_to_json() {
        let table = table_of(&[single_code_record(11)]);
        let comparison = compare_patient(table.get(0).unwrap(), &Vocabulary::load()).unwrap();

        let json = serde_json::to_value(&comparison).expect("serialize");
        assert_eq!(json["id"], "11");
        assert_eq!(json["tasks"][2]["task"], "icd10_multiclass");
        assert_eq!(json["tasks"][2]["agreement"][0]["matches"], true);
    }
}
