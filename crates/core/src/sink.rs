//! Tabular sink writer.
//!
//! Writes a header row once, then one CSV row per record, mapping values to columns by
//! name. Rows whose field names differ from the header are rejected before anything is
//! written for them.

use crate::error::{CatalogError, CatalogResult, WriteError};
use crate::record::{Record, Row};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct TabularSink<W: Write> {
    writer: csv::Writer<W>,
    header: Vec<String>,
    rows_written: usize,
}

impl TabularSink<File> {
    /// Create (or truncate) the store file at `path` and write the header.
    pub fn create(path: &Path, header: &[&str]) -> CatalogResult<Self> {
        let file = File::create(path).map_err(CatalogError::StoreOpen)?;
        Self::from_writer(file, header)
    }
}

impl<W: Write> TabularSink<W> {
    /// Wrap `inner` and write the header row.
    pub fn from_writer(inner: W, header: &[&str]) -> CatalogResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(header)?;

        Ok(Self {
            writer,
            header: header.iter().map(|h| h.to_string()).collect(),
            rows_written: 0,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append one row, ordering its values by the header.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::FieldMismatch`] if the row has extra or missing keys.
    pub fn append(&mut self, row: &Row) -> CatalogResult<()> {
        let missing: Vec<String> = self
            .header
            .iter()
            .filter(|name| !row.contains_key(name.as_str()))
            .cloned()
            .collect();
        let unexpected: Vec<String> = row
            .keys()
            .filter(|key| !self.header.contains(key))
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(WriteError::FieldMismatch {
                missing,
                unexpected,
            }
            .into());
        }

        self.writer
            .write_record(self.header.iter().map(|name| row[name.as_str()].as_str()))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn append_record(&mut self, record: &Record) -> CatalogResult<()> {
        self.append(&record.to_row())
    }

    pub fn flush(&mut self) -> CatalogResult<()> {
        self.writer.flush().map_err(CatalogError::StoreWrite)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> CatalogResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| CatalogError::StoreWrite(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STORE_HEADER;
    use crate::record::tests::sample_record;

    fn written(sink: TabularSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner().expect("flush")).expect("utf8")
    }

    #[test]
    fn test_header_is_written_once() {
        let mut sink = TabularSink::from_writer(Vec::new(), &STORE_HEADER).unwrap();
        sink.append_record(&sample_record(1)).unwrap();
        sink.append_record(&sample_record(2)).unwrap();
        assert_eq!(sink.rows_written(), 2);

        let text = written(sink);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], STORE_HEADER.join(","));
        assert!(lines[1].starts_with("1,[1],[0],"));
        assert!(lines[2].starts_with("2,"));
    }

    #[test]
    fn test_values_with_commas_are_quoted() {
        let mut sink = TabularSink::from_writer(Vec::new(), &STORE_HEADER).unwrap();
        sink.append_record(&sample_record(9)).unwrap();

        let text = written(sink);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "9,[1],[0],\"['C340', 'C341']\",\"[2, 6]\",['C34'],[1],\"C340, C341\""
        );
    }

    #[test]
    fn test_row_with_missing_key_is_rejected() {
        let mut sink = TabularSink::from_writer(Vec::new(), &STORE_HEADER).unwrap();
        let mut row = sample_record(1).to_row();
        row.remove("codes");

        let err = sink.append(&row).expect_err("missing key should fail");
        assert!(matches!(
            err,
            CatalogError::Write(WriteError::FieldMismatch { ref missing, ref unexpected })
                if missing == &vec!["codes".to_string()] && unexpected.is_empty()
        ));
        assert_eq!(sink.rows_written(), 0);
        assert_eq!(written(sink).lines().count(), 1, "only the header is written");
    }

    #[test]
    fn test_row_with_extra_key_is_rejected() {
        let mut sink = TabularSink::from_writer(Vec::new(), &["id", "codes"]).unwrap();
        let mut row = Row::new();
        row.insert("id".into(), "1".into());
        row.insert("codes".into(), "C34".into());
        row.insert("notes".into(), "x".into());

        let err = sink.append(&row).expect_err("extra key should fail");
        assert!(matches!(
            err,
            CatalogError::Write(WriteError::FieldMismatch { ref unexpected, .. })
                if unexpected == &vec!["notes".to_string()]
        ));
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.csv");
        std::fs::write(&path, "stale contents\nmore\n").unwrap();

        let mut sink = TabularSink::create(&path, &STORE_HEADER).unwrap();
        sink.append_record(&sample_record(4)).unwrap();
        sink.flush().unwrap();
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 2);
    }
}
