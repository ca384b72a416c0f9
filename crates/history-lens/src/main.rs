mod bootstrap;
mod report;

use anyhow::{anyhow, Context, Result};
use lens_core::settings::Settings;
use lens_core::time_utils::LocalClock;
use lens_data::analysis::{analyze_history, AnalysisOptions};
use lens_runtime::orchestrator::AnalysisOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("history-lens v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Timezone: {}, Time format: {}",
        settings.view,
        settings.timezone,
        settings.time_format
    );

    let input = settings
        .input
        .clone()
        .or_else(bootstrap::discover_input_path)
        .ok_or_else(|| {
            anyhow!(
                "no input given and no history found in ~/{}; pass a .json/.jsonl file or a directory",
                bootstrap::APP_DIR
            )
        })?;

    let options = AnalysisOptions::from_settings(&settings).context("invalid graph options")?;
    let clock = LocalClock::new(&settings.timezone);
    let orchestrator = AnalysisOrchestrator::new(options.clone());

    let records = orchestrator
        .load(input.clone())
        .await
        .with_context(|| format!("failed to load history from {}", input.display()))?;
    tracing::info!("Loaded {} records from {}", records.len(), input.display());

    if settings.view == "history" {
        println!(
            "{}",
            report::render_history(&records, settings.filter.as_deref(), settings.limit, &clock)
        );
        return Ok(());
    }

    let result = if settings.sequential {
        analyze_history(&records, &options)
    } else {
        orchestrator.run(records).await?
    };
    tracing::debug!(metadata = ?result.metadata, "analysis finished");

    match settings.view.as_str() {
        "summary" => println!(
            "{}",
            report::render_summary(&result.summary, &clock, settings.twelve_hour())
        ),
        "graph" => println!(
            "{}",
            report::render_graph(&result.graph, settings.node.as_deref(), settings.limit)
        ),
        "json" => println!("{}", report::render_json(&result)?),
        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
