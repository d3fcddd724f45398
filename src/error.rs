//! Error taxonomy of the engine.
//!
//! Only [`ConfigError`] is fatal. Malformed records, degenerate windows and
//! failed branches are carried inside the run report so the caller can see
//! them next to whatever did succeed.

use serde::Serialize;
use thiserror::Error;

/// Invalid engine configuration. Raised by `EngineConfig::validate`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("weights must sum to 1.0 (got {sum:.6})")]
    WeightsSum { sum: f64 },
    #[error("weight `{name}` must be a finite, non-negative number (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("window_days must be positive")]
    NonPositiveWindow,
    #[error("analytics_window_days must be positive when set")]
    NonPositiveAnalyticsWindow,
    #[error("spike_sigma_multiplier must be finite and >= 0 (got {0})")]
    InvalidSigmaMultiplier(f64),
    #[error("theme_catalog_size must be positive")]
    EmptyThemeCatalog,
    #[error("theme_taxonomy lists {listed} themes but theme_catalog_size is {size}")]
    TaxonomyExceedsCatalog { listed: usize, size: usize },
}

/// Why a raw record was rejected at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    #[error("record is not an object of the expected shape: {0}")]
    Shape(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unparseable published_at `{0}`")]
    BadTimestamp(String),
    #[error("field `{field}` must be a non-negative integer (got {value})")]
    NegativeCounter { field: &'static str, value: i64 },
    #[error("field `{field}` must be an integer (got {value})")]
    NonIntegerCounter { field: &'static str, value: String },
    #[error("field `{0}` appears under several column names with different values")]
    ConflictingField(&'static str),
    #[error("theme `{0}` is not part of the configured taxonomy")]
    UnknownTheme(String),
}

impl MalformedRecord {
    /// Stable, low-cardinality key used for drop counters.
    pub fn reason_key(&self) -> &'static str {
        match self {
            MalformedRecord::Shape(_) => "shape",
            MalformedRecord::MissingField(_) => "missing_field",
            MalformedRecord::BadTimestamp(_) => "bad_timestamp",
            MalformedRecord::NegativeCounter { .. } => "negative_counter",
            MalformedRecord::NonIntegerCounter { .. } => "non_integer_counter",
            MalformedRecord::ConflictingField(_) => "conflicting_field",
            MalformedRecord::UnknownTheme(_) => "unknown_theme",
        }
    }
}

/// Nothing to rank. Not an error for the caller, just a note in the diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateInput {
    #[error("snapshot contains no valid records")]
    NoRecords,
    #[error("ranking window contains no records")]
    EmptyWindow,
}

/// The four independent computations fanned out over one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Ranking,
    Alerts,
    Trends,
    Themes,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Ranking => "ranking",
            Branch::Alerts => "alerts",
            Branch::Trends => "trends",
            Branch::Themes => "themes",
        }
    }
}

/// Failure confined to one branch of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{} branch failed: {message}", branch.as_str())]
pub struct BranchError {
    pub branch: Branch,
    pub message: String,
}

impl BranchError {
    pub fn new(branch: Branch, message: impl Into<String>) -> Self {
        Self {
            branch,
            message: message.into(),
        }
    }
}
