//! # predmap core
//!
//! Core logic for the prediction map: turning a free-text patient catalog into a flat
//! tabular store, and reading that store back for display.
//!
//! - [`parser`] classifies catalog lines and assembles one [`Record`] per block
//! - [`sink`] writes records to the CSV store under a fixed header
//! - [`store`] and [`view`] read the store back and line ground truth up against prediction
//! - [`ingest`] wires the configured catalog, parser and store together for one run
//!
//! **No presentation concerns**: charts and terminal output belong in the binaries.

pub mod config;
pub mod constants;
pub mod error;
pub mod ingest;
pub mod line;
pub mod parser;
pub mod record;
pub mod sink;
pub mod store;
pub mod view;

pub use config::{CoreConfig, MissingFieldPolicy};
pub use error::{CatalogError, CatalogResult, ParseError, ParseFailure, WriteError};
pub use ingest::{IngestService, IngestSummary};
pub use line::LineKind;
pub use parser::{parse_catalog, CatalogParser};
pub use record::{Prediction, Record, RecordBuilder, Row};
pub use sink::TabularSink;
pub use store::{split_list_cell, StoreTable, StoredField, StoredRecord};
pub use view::{PatientComparison, TaskComparison, TaskKind, ViewError};

pub use icd10_vocab::{LookupError, Task, Vocabulary};
