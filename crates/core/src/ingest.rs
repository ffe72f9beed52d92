//! Catalog ingestion service.
//!
//! One run reads the configured catalog, truncates the store, writes the header and appends
//! every record the parser produces. Rows are written as soon as each record is complete,
//! so a failing run leaves the rows written before the failure in place.

use crate::config::CoreConfig;
use crate::constants::STORE_HEADER;
use crate::error::{CatalogError, CatalogResult};
use crate::parser::CatalogParser;
use crate::sink::TabularSink;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub records_written: usize,
    /// Incomplete blocks discarded by the skip policy.
    pub skipped: usize,
    /// True if the run reached the record cap. Nothing after the last capped record is read,
    /// so this is also true for a catalog holding exactly the cap.
    pub capped: bool,
}

#[derive(Clone)]
pub struct IngestService {
    cfg: Arc<CoreConfig>,
}

impl IngestService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Ingest the configured catalog into the configured store.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the catalog cannot be opened or read, a block fails to
    /// parse, a block is incomplete under the fail-fast policy, or the store cannot be written.
    pub fn run(&self) -> CatalogResult<IngestSummary> {
        let catalog_path = self.cfg.catalog_path();
        let store_path = self.cfg.store_path();
        tracing::info!(
            catalog = %catalog_path.display(),
            store = %store_path.display(),
            max_records = self.cfg.max_records(),
            "starting ingestion"
        );

        let catalog = File::open(catalog_path).map_err(CatalogError::CatalogRead)?;
        let mut sink = TabularSink::create(store_path, &STORE_HEADER)?;
        let summary = self.ingest(BufReader::new(catalog), &mut sink)?;

        tracing::info!(
            records = summary.records_written,
            skipped = summary.skipped,
            capped = summary.capped,
            "ingestion finished"
        );
        Ok(summary)
    }

    /// Stream records from `reader` into `sink` using the configured cap and policy.
    pub fn ingest<R: BufRead, W: Write>(
        &self,
        reader: R,
        sink: &mut TabularSink<W>,
    ) -> CatalogResult<IngestSummary> {
        let mut parser =
            CatalogParser::new(reader, self.cfg.max_records(), self.cfg.missing_fields());

        let mut written = 0;
        for record in parser.by_ref() {
            let record = record?;
            sink.append_record(&record)?;
            written += 1;
            tracing::debug!(id = record.id, "record written");
        }
        sink.flush()?;

        Ok(IngestSummary {
            records_written: written,
            skipped: parser.skipped(),
            capped: parser.capped(),
        })
    }
}
