//! Store reader.
//!
//! Reads the tabular store written by [`crate::sink::TabularSink`] back into an immutable,
//! ordered table. Cells stay strings; sequence columns are split on demand with
//! [`split_list_cell`], the inverse of the sink's bracketed rendering.

use crate::error::{CatalogError, CatalogResult};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub active_phase_ground_truth: String,
    pub active_phase_prediction: String,
    pub icd10_multiclass_ground_truth: String,
    pub icd10_multiclass_prediction: String,
    pub icd10_binary_ground_truth: String,
    pub icd10_binary_prediction: String,
    pub codes: String,
}

/// The six sequence columns of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredField {
    ActivePhaseGroundTruth,
    ActivePhasePrediction,
    MulticlassGroundTruth,
    MulticlassPrediction,
    BinaryGroundTruth,
    BinaryPrediction,
}

impl StoredRecord {
    /// Raw cell of a sequence column.
    pub fn cell(&self, field: StoredField) -> &str {
        match field {
            StoredField::ActivePhaseGroundTruth => &self.active_phase_ground_truth,
            StoredField::ActivePhasePrediction => &self.active_phase_prediction,
            StoredField::MulticlassGroundTruth => &self.icd10_multiclass_ground_truth,
            StoredField::MulticlassPrediction => &self.icd10_multiclass_prediction,
            StoredField::BinaryGroundTruth => &self.icd10_binary_ground_truth,
            StoredField::BinaryPrediction => &self.icd10_binary_prediction,
        }
    }

    /// A sequence column split into its values.
    pub fn values(&self, field: StoredField) -> Vec<String> {
        split_list_cell(self.cell(field))
    }
}

/// Split a bracketed list cell such as `['C340', 'C341']` or `[1, 0]` into its values.
///
/// `[`, `]` and `'` are removed and the remainder is split on `", "`. Only the empty list
/// `[]` yields no values; `['']` holds one empty token.
pub fn split_list_cell(cell: &str) -> Vec<String> {
    if cell.trim() == "[]" {
        return Vec::new();
    }

    let stripped: String = cell
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\''))
        .collect();

    stripped.split(", ").map(str::to_string).collect()
}

/// Every row of the store, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreTable {
    rows: Vec<StoredRecord>,
}

impl StoreTable {
    /// Load the store at `path`.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let file = std::fs::File::open(path).map_err(CatalogError::StoreOpen)?;
        let table = Self::from_reader(file)?;
        tracing::debug!(path = %path.display(), rows = table.len(), "loaded store");
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> CatalogResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let rows = csv_reader
            .deserialize::<StoredRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StoredRecord> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[StoredRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredRecord> {
        self.rows.iter()
    }

    /// Patient ids in store order.
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.id.as_str()).collect()
    }

    /// Position of the row with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }
}
