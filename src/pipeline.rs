use std::path::PathBuf;

use tracing::info;

use crate::chart::{ChartStyle, render_chart};
use crate::config::ScatterConfig;
use crate::error::{PipelineError, SchemaError};
use crate::metrics::{DerivedTable, derive_difference};
use crate::report::{Summary, write_summary};
use crate::selection::{Performers, select_performers};
use crate::table::Table;
use crate::table_fetch::fetch_stats_table;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub rows: usize,
    pub performers: Performers,
}

/// Derive and select, no I/O.
pub fn analyze(table: &Table, cfg: &ScatterConfig) -> Result<(DerivedTable, Performers), SchemaError> {
    let derived = derive_difference(table, &cfg.columns)?;
    let performers = select_performers(&derived, cfg.top_k);
    Ok((derived, performers))
}

/// fetch -> derive -> select -> render
pub fn run(cfg: &ScatterConfig) -> Result<RunSummary, PipelineError> {
    let table = fetch_stats_table(cfg)?;
    info!(rows = table.len(), columns = table.headers.len(), "table parsed");
    run_on_table(&table, cfg)
}

pub fn run_on_table(table: &Table, cfg: &ScatterConfig) -> Result<RunSummary, PipelineError> {
    let (derived, performers) = analyze(table, cfg)?;
    info!(
        rows = derived.len(),
        over = performers.over.len(),
        under = performers.under.len(),
        "performers selected"
    );

    render_chart(&derived, &performers, &ChartStyle::default(), &cfg.output_path)?;

    if let Some(path) = cfg.summary_path.as_deref() {
        let source = cfg
            .html_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| cfg.url.clone());
        let summary = Summary::new(&source, derived.len(), cfg.top_k, &performers);
        write_summary(path, &summary).map_err(PipelineError::Report)?;
        info!(path = %path.display(), "summary written");
    }

    Ok(RunSummary {
        output_path: cfg.output_path.clone(),
        summary_path: cfg.summary_path.clone(),
        rows: derived.len(),
        performers,
    })
}
