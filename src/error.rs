use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::Column;

/// Errors surfaced to the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The dataset could not be read or parsed. Fatal: there is no recovery path.
    #[error("dataset unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// An upstream narrowing left no rows, so this selector has nothing to offer.
    #[error("No data available for {}", column.label())]
    EmptyDomain { column: Column },

    /// A mean or mode was requested over an empty selection.
    #[error("{aggregate} is not available for an empty selection")]
    UndefinedAggregate { aggregate: &'static str },
}
