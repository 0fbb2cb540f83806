//! Error types for the query layer and the widget pipeline.

use thiserror::Error;

use crate::store::{Field, Table};

/// Failures raised by an [`AccidentStore`](crate::store::AccidentStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query referenced a column the table does not have. This is a bug in
    /// the calling code, never a user input problem.
    #[error("schema mismatch: column `{}` does not exist on `{}`", field.column(), table.name())]
    UnknownColumn { table: Table, field: Field },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures raised while building an infographics response.
#[derive(Debug, Error)]
pub enum InfographicsError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("widget `{name}` failed: {source}")]
    Widget {
        name: &'static str,
        #[source]
        source: Box<InfographicsError>,
    },

    #[error("widget `{name}` was aborted before producing a result")]
    WidgetAborted { name: &'static str },

    #[error("request deadline exceeded: {} widget(s) pending ({})", pending.len(), pending.join(", "))]
    DeadlineExceeded {
        completed: Vec<&'static str>,
        pending: Vec<&'static str>,
    },
}
