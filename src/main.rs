use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use predmap_core::config::{
    max_records_from_env_value, missing_field_policy_from_env_value, path_from_env_value,
};
use predmap_core::constants::{DEFAULT_CATALOG_PATH, DEFAULT_STORE_PATH};
use predmap_core::{CoreConfig, IngestService};

/// Main entry point for a one-shot catalog ingestion
///
/// Reads the patient catalog, parses up to the configured number of records and writes
/// them to the tabular store, replacing any previous store.
///
/// # Environment Variables
/// - `PREDMAP_CATALOG`: catalog text file (default: "catalog.txt")
/// - `PREDMAP_STORE`: tabular store to write (default: "patients.csv")
/// - `PREDMAP_MAX_RECORDS`: record cap (default: 200)
/// - `PREDMAP_MISSING_FIELDS`: "fail" or "skip" for incomplete blocks (default: "fail")
///
/// # Returns
/// * `Ok(())` - If the store was written
/// * `Err(anyhow::Error)` - If configuration, parsing or writing fails
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("predmap=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(CoreConfig::new(
        path_from_env_value(std::env::var("PREDMAP_CATALOG").ok(), DEFAULT_CATALOG_PATH),
        path_from_env_value(std::env::var("PREDMAP_STORE").ok(), DEFAULT_STORE_PATH),
        max_records_from_env_value(std::env::var("PREDMAP_MAX_RECORDS").ok())?,
        missing_field_policy_from_env_value(std::env::var("PREDMAP_MISSING_FIELDS").ok())?,
    )?);

    let summary = IngestService::new(cfg).run()?;
    tracing::info!("++ Wrote {} patient records", summary.records_written);

    Ok(())
}
