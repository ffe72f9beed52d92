use clap::{Parser, Subcommand};
use icd10_vocab::{Task, Vocabulary};
use predmap_core::{
    config::{max_records_from_env_value, missing_field_policy_from_env_value, path_from_env_value},
    constants::{DEFAULT_CATALOG_PATH, DEFAULT_STORE_PATH, PAGE_SIZE},
    view::{compare_patient, id_ranges, page_for_range, resolve_patient},
    CoreConfig, IngestService, MissingFieldPolicy, StoreTable, StoredField,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "predmap")]
#[command(about = "AI prediction map for the lung cancer patient catalog")]
struct Cli {
    /// Tabular store to read or write (defaults to PREDMAP_STORE or patients.csv)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the catalog into the tabular store
    Ingest {
        /// Catalog text file (defaults to PREDMAP_CATALOG or catalog.txt)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Maximum number of records to write
        #[arg(long)]
        max_records: Option<usize>,
        /// Skip incomplete blocks instead of aborting
        #[arg(long)]
        skip_incomplete: bool,
    },
    /// List all patient ids
    List,
    /// List patient ranges for the overview
    Ranges,
    /// Show ground truth against prediction for one patient
    Show {
        /// Patient id
        id: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one range of patients, e.g. "100-109"
    Overview {
        /// Range label as printed by `ranges`
        range: String,
    },
    /// Map a prediction label to its ICD-10 code
    Normalize {
        /// binary or multiclass
        task: String,
        /// Categorical label, e.g. "3"
        label: String,
    },
}

fn store_path(cli_store: Option<PathBuf>) -> PathBuf {
    cli_store.unwrap_or_else(|| {
        path_from_env_value(std::env::var("PREDMAP_STORE").ok(), DEFAULT_STORE_PATH)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("predmap=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = store_path(cli.store);

    match cli.command {
        Some(Commands::Ingest {
            catalog,
            max_records,
            skip_incomplete,
        }) => {
            let catalog = catalog.unwrap_or_else(|| {
                path_from_env_value(std::env::var("PREDMAP_CATALOG").ok(), DEFAULT_CATALOG_PATH)
            });
            let max_records = match max_records {
                Some(n) => n,
                None => max_records_from_env_value(std::env::var("PREDMAP_MAX_RECORDS").ok())?,
            };
            let policy = if skip_incomplete {
                MissingFieldPolicy::SkipAndWarn
            } else {
                missing_field_policy_from_env_value(std::env::var("PREDMAP_MISSING_FIELDS").ok())?
            };

            let cfg = Arc::new(CoreConfig::new(catalog, store, max_records, policy)?);
            let summary = IngestService::new(cfg.clone())
                .run()
                .map_err(|e| format!("Error ingesting catalog: {}", e))?;
            println!(
                "Wrote {} records to {}",
                summary.records_written,
                cfg.store_path().display()
            );
            if summary.skipped > 0 {
                println!("Skipped {} incomplete blocks", summary.skipped);
            }
            if summary.capped {
                println!(
                    "Reached the {} record limit; the catalog was not read further",
                    cfg.max_records()
                );
            }
        }
        Some(Commands::List) => {
            let table = StoreTable::load(&store)?;
            if table.is_empty() {
                println!("No patients found.");
            } else {
                for row in table.iter() {
                    println!("ID: {}, Codes: {}", row.id, row.codes);
                }
            }
        }
        Some(Commands::Ranges) => {
            let table = StoreTable::load(&store)?;
            for range in id_ranges(&table, PAGE_SIZE) {
                println!("{}", range);
            }
        }
        Some(Commands::Show { id, json }) => {
            let table = StoreTable::load(&store)?;
            let vocab = Vocabulary::load();
            let record = match resolve_patient(&table, &id) {
                Ok(record) => record,
                Err(e) => {
                    eprintln!("Error selecting patient: {}", e);
                    return Ok(());
                }
            };
            let comparison = compare_patient(record, &vocab)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!("Patient's ID: {}", comparison.id);
                println!("{:<18}{:<28}{}", "", "Ground Truth", "Prediction");
                for task in &comparison.tasks {
                    println!(
                        "{:<18}{:<28}{}",
                        task.task.title(),
                        task.ground_truth_text(),
                        task.prediction_text()
                    );
                }
                println!();
                println!("Map of codes (first {} positions):", comparison.detail_columns());
                for task in &comparison.tasks {
                    let cells: Vec<String> = task
                        .agreement
                        .iter()
                        .take(comparison.detail_columns())
                        .map(|a| {
                            format!(
                                "{}{}/{}",
                                if a.matches { "+" } else { "-" },
                                a.prediction.as_deref().unwrap_or("·"),
                                a.ground_truth.as_deref().unwrap_or("·")
                            )
                        })
                        .collect();
                    println!("{:<18}{}", task.task.title(), cells.join("  "));
                }
                println!();
                println!("Codes: {}", comparison.codes);
            }
        }
        Some(Commands::Overview { range }) => {
            let table = StoreTable::load(&store)?;
            let page = match page_for_range(&table, &range, PAGE_SIZE) {
                Ok(page) => page,
                Err(e) => {
                    eprintln!("Error selecting range: {}", e);
                    return Ok(());
                }
            };

            let fields = [
                ("ACTIVE PHASE GROUND TRUTH", StoredField::ActivePhaseGroundTruth),
                ("ACTIVE PHASE PREDICTION", StoredField::ActivePhasePrediction),
                ("ICD10 MULTICLASS GROUND TRUTH", StoredField::MulticlassGroundTruth),
                ("ICD10 MULTICLASS PREDICTION", StoredField::MulticlassPrediction),
                ("ICD10 BINARY GROUND TRUTH", StoredField::BinaryGroundTruth),
                ("ICD10 BINARY PREDICTION", StoredField::BinaryPrediction),
            ];

            if let (Some(first), Some(last)) = (page.first(), page.last()) {
                println!("Patients IDs: {}-{}  - Map of Codes", first.id, last.id);
            }
            for row in page {
                println!("Patient {}", row.id);
                for (title, field) in fields {
                    println!("  {:<31}{}", title, row.cell(field));
                }
            }
        }
        Some(Commands::Normalize { task, label }) => {
            let task: Task = task.parse()?;
            let vocab = Vocabulary::load();
            match vocab.normalize(task, &label) {
                Ok(code) => println!("{}", code),
                Err(e) => eprintln!("Error normalizing label: {}", e),
            }
        }
        None => {
            println!("Use 'predmap --help' for commands");
        }
    }

    Ok(())
}
