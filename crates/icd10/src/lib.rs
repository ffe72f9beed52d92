//! ICD-10 label vocabularies.
//!
//! Model predictions for the two ICD-10 tasks are stored as compact categorical labels
//! (`"0"`, `"1"`, ...). This crate owns the fixed tables that turn those labels into
//! diagnostic code strings for display.
//!
//! The tables are held by a [`Vocabulary`] value created once with [`Vocabulary::load`] and
//! passed to whoever needs it. Nothing here reads process-wide state.

use std::fmt;
use std::str::FromStr;

/// Binary task: lung cancer (`C34`) or anything else.
const BINARY_TABLE: &[(&str, &str)] = &[("0", "other"), ("1", "C34")];

/// Multiclass task: C34 sub-sites plus a catch-all.
const MULTICLASS_TABLE: &[(&str, &str)] = &[
    ("0", "C340"),
    ("1", "C341"),
    ("2", "C342"),
    ("3", "C343"),
    ("4", "C348"),
    ("5", "C349"),
    ("6", "other"),
];

/// Errors returned by the vocabulary crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("label {label:?} is not part of the {task} vocabulary")]
    UnknownLabel { task: Task, label: String },

    #[error("unknown task {0:?} (expected \"binary\" or \"multiclass\")")]
    UnknownTask(String),
}

/// Type alias for Results that can fail with a [`LookupError`].
pub type LookupResult<T> = Result<T, LookupError>;

/// The ICD-10 classification tasks that carry categorical labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Binary,
    Multiclass,
}

impl Task {
    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Task::Binary => BINARY_TABLE,
            Task::Multiclass => MULTICLASS_TABLE,
        }
    }

    /// All labels accepted for this task, in table order.
    pub fn labels(self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(label, _)| *label)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Binary => write!(f, "binary"),
            Task::Multiclass => write!(f, "multiclass"),
        }
    }
}

impl FromStr for Task {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(Task::Binary),
            "multiclass" => Ok(Task::Multiclass),
            _ => Err(LookupError::UnknownTask(s.to_string())),
        }
    }
}

/// Immutable lookup tables for both ICD-10 tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    binary: &'static [(&'static str, &'static str)],
    multiclass: &'static [(&'static str, &'static str)],
}

impl Vocabulary {
    /// Load the fixed vocabulary.
    ///
    /// Call this once at startup and hand the value (or a reference to it) to the
    /// components that display predictions.
    pub fn load() -> Self {
        Self {
            binary: Task::Binary.table(),
            multiclass: Task::Multiclass.table(),
        }
    }

    /// Map a categorical label to its diagnostic code string.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownLabel`] if `label` is not a key of the task's table.
    pub fn normalize(&self, task: Task, label: &str) -> LookupResult<&'static str> {
        let table = match task {
            Task::Binary => self.binary,
            Task::Multiclass => self.multiclass,
        };

        table
            .iter()
            .find(|(key, _)| *key == label)
            .map(|(_, code)| *code)
            .ok_or_else(|| LookupError::UnknownLabel {
                task,
                label: label.to_string(),
            })
    }

    /// Map every label of a sequence, failing on the first unknown one.
    pub fn normalize_all<S: AsRef<str>>(
        &self,
        task: Task,
        labels: &[S],
    ) -> LookupResult<Vec<&'static str>> {
        labels
            .iter()
            .map(|label| self.normalize(task, label.as_ref()))
            .collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::load()
    }
}
