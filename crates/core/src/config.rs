//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Library code never reads environment variables; the binaries read them and hand the
//! raw values to the helpers below.

use crate::constants::{DEFAULT_CATALOG_PATH, DEFAULT_MAX_RECORDS, DEFAULT_STORE_PATH};
use crate::{CatalogError, CatalogResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What the parser does with a block that reaches its blank line without every field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Abort the run with [`CatalogError::IncompleteRecord`].
    #[default]
    FailFast,
    /// Log a warning and discard the block.
    SkipAndWarn,
}

impl FromStr for MissingFieldPolicy {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" | "fail-fast" => Ok(MissingFieldPolicy::FailFast),
            "skip" | "skip-and-warn" => Ok(MissingFieldPolicy::SkipAndWarn),
            other => Err(CatalogError::InvalidInput(format!(
                "unknown missing field policy {other:?} (expected \"fail\" or \"skip\")"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    catalog_path: PathBuf,
    store_path: PathBuf,
    max_records: usize,
    missing_fields: MissingFieldPolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidInput` if either path is empty or `max_records` is zero.
    pub fn new(
        catalog_path: PathBuf,
        store_path: PathBuf,
        max_records: usize,
        missing_fields: MissingFieldPolicy,
    ) -> CatalogResult<Self> {
        if catalog_path.as_os_str().is_empty() {
            return Err(CatalogError::InvalidInput(
                "catalog path cannot be empty".into(),
            ));
        }
        if store_path.as_os_str().is_empty() {
            return Err(CatalogError::InvalidInput(
                "store path cannot be empty".into(),
            ));
        }
        if max_records == 0 {
            return Err(CatalogError::InvalidInput(
                "max_records must be at least 1".into(),
            ));
        }

        Ok(Self {
            catalog_path,
            store_path,
            max_records,
            missing_fields,
        })
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn missing_fields(&self) -> MissingFieldPolicy {
        self.missing_fields
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            max_records: DEFAULT_MAX_RECORDS,
            missing_fields: MissingFieldPolicy::default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve a path from an optional string value, falling back to `default`.
pub fn path_from_env_value(value: Option<String>, default: &str) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| default.to_string()))
}

/// Parse the record cap from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_RECORDS`].
pub fn max_records_from_env_value(value: Option<String>) -> CatalogResult<usize> {
    let parsed = non_blank(value)
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                CatalogError::InvalidInput(format!("max_records must be a positive integer: {v:?}"))
            })
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_MAX_RECORDS))
}

/// Parse the missing field policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`MissingFieldPolicy::FailFast`].
pub fn missing_field_policy_from_env_value(
    value: Option<String>,
) -> CatalogResult<MissingFieldPolicy> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<MissingFieldPolicy>())
        .transpose()?;

    Ok(parsed.unwrap_or_default())
}
