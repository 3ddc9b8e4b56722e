use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("failed reading body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed reading html from {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid table selector for id {table_id:?}: {reason}")]
    Selector { table_id: String, reason: String },
    #[error("no table with id {table_id:?} on page")]
    TableNotFound { table_id: String },
    #[error("{count} tables with id {table_id:?} on page, expected exactly one")]
    AmbiguousTable { table_id: String, count: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("column {column:?} not found (have: {available})")]
    MissingColumn { column: String, available: String },
    #[error("row {row}: column {column:?} is empty")]
    MissingValue { row: usize, column: String },
    #[error("row {row}: column {column:?} is not numeric: {value:?}")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to plot: table has no rows")]
    EmptyTable,
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error("failed writing {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Stage-tagged failure of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),
    #[error("derive: {0}")]
    Schema(#[from] SchemaError),
    #[error("render: {0}")]
    Render(#[from] RenderError),
    #[error("report: {0:#}")]
    Report(anyhow::Error),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Schema(_) => "derive",
            PipelineError::Render(_) => "render",
            PipelineError::Report(_) => "report",
        }
    }
}
