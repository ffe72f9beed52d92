//! Constants used throughout the predmap core crate.
//!
//! File names, header columns and limits live here so the parser, the sink and the
//! store reader agree on them.

/// Default catalog file read by an ingestion run.
pub const DEFAULT_CATALOG_PATH: &str = "catalog.txt";

/// Default tabular store written by an ingestion run.
pub const DEFAULT_STORE_PATH: &str = "patients.csv";

/// Maximum number of records produced by one ingestion run.
pub const DEFAULT_MAX_RECORDS: usize = 200;

/// Number of patients per range in the overview.
pub const PAGE_SIZE: usize = 10;

/// Maximum number of code columns in the single-patient map.
pub const MAX_DETAIL_COLUMNS: usize = 5;

/// Store header, in column order.
pub const STORE_HEADER: [&str; 8] = [
    "id",
    "active_phase_ground_truth",
    "active_phase_prediction",
    "icd10_multiclass_ground_truth",
    "icd10_multiclass_prediction",
    "icd10_binary_ground_truth",
    "icd10_binary_prediction",
    "codes",
];

pub(crate) const MARKER_ID: &str = "ID";
pub(crate) const MARKER_ACTIVE_PHASE: &str = "ACTIVE PHASE";
pub(crate) const MARKER_MULTICLASS: &str = "ICD10 MULTICLASS";
pub(crate) const MARKER_BINARY: &str = "ICD10 BINARY";
pub(crate) const MARKER_CODES: &str = "Codes";
pub(crate) const MARKER_GROUND_TRUTH: &str = "Ground truth";
