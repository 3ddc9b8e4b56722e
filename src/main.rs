use std::error::Error as _;
use std::process::ExitCode;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use xg_scatter::config::{Invocation, ScatterConfig, USAGE};
use xg_scatter::{pipeline, report, viewer};

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = match ScatterConfig::load(&args)? {
        Invocation::Run(cfg) => cfg,
        Invocation::Help => {
            println!("{USAGE}");
            return Ok(());
        }
    };
    info!(url = %cfg.url, table_id = %cfg.table_id, top_k = cfg.top_k, "starting");

    let summary = match pipeline::run(&cfg) {
        Ok(summary) => summary,
        Err(err) => {
            let mut msg = err.to_string();
            // the top-level message already embeds the direct cause
            let mut cause = err.source().and_then(|s| s.source());
            while let Some(c) = cause {
                msg.push_str(&format!(": {c}"));
                cause = c.source();
            }
            return Err(anyhow::anyhow!(msg));
        }
    };

    println!("Plot saved as '{}'", summary.output_path.display());
    println!("Teams plotted: {}", summary.rows);
    print!("{}", report::format_performers(&summary.performers));
    if let Some(path) = &summary.summary_path {
        println!("Summary saved as '{}'", path.display());
    }

    if cfg.show {
        viewer::show_image(&summary.output_path);
    }
    Ok(())
}
