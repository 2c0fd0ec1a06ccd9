use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use eicu_ingest::write_csv_table;
use eicu_mcp::{EicuDataServer, Transport};
use eicu_query::render::rows_to_json;
use eicu_query::{QueryTable, TableSchema};
use eicu_transform::{BuiltTable, build_patient_table};
use serde_json::Value;
use tracing::{info, info_span};

use crate::config::AppConfig;

/// Builds the merged table and writes it to `config.output`.
pub fn run_build(config: &AppConfig) -> Result<BuiltTable> {
    let started = Instant::now();
    let mut built = build_patient_table(&config.data_dir, &config.build).with_context(|| {
        format!(
            "failed to build patient table from {}",
            config.data_dir.display()
        )
    })?;
    write_csv_table(&mut built.data, &config.output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    info!(
        output = %config.output.display(),
        rows = built.report.rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "merged table written"
    );
    Ok(built)
}

/// Loads the table to serve: `table` if given, otherwise a fresh build.
///
/// The build result is passed to `on_built` before the written file is
/// re-read, so the caller can print a summary.
pub fn prepare_served_table(
    config: &AppConfig,
    table: Option<&Path>,
    on_built: impl FnOnce(&BuiltTable),
) -> Result<QueryTable> {
    let path = match table {
        Some(path) => path,
        None => {
            let built = run_build(config)?;
            on_built(&built);
            config.output.as_path()
        }
    };
    QueryTable::from_csv(path).with_context(|| format!("failed to load table {}", path.display()))
}

/// Serves `table` until shutdown on a dedicated tokio runtime.
pub fn run_serve(config: &AppConfig, table: QueryTable) -> Result<()> {
    let span = info_span!("serve", transport = ?config.server.transport);
    let _guard = span.enter();

    let server = EicuDataServer::new(table, config.server.name.clone());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime
        .block_on(eicu_mcp::serve(server, &config.server))
        .context("MCP server failed")?;
    Ok(())
}

/// True when stdout is free for human-readable output.
pub fn stdout_is_free(config: &AppConfig) -> bool {
    config.server.transport != Transport::Stdio
}

pub fn run_schema(table: &Path) -> Result<TableSchema> {
    let table =
        QueryTable::from_csv(table).with_context(|| format!("failed to load table {}", table.display()))?;
    Ok(table.schema())
}

/// Runs one filter and returns the matching rows as pretty-printed JSON.
pub fn run_query(table: &Path, column: &str, operator: &str, raw_value: &str) -> Result<String> {
    let table =
        QueryTable::from_csv(table).with_context(|| format!("failed to load table {}", table.display()))?;
    let value = parse_cli_value(raw_value);
    let matched = table.filter(column, operator, &value)?;
    let rows = rows_to_json(&matched).context("failed to render rows")?;
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Parses a command-line filter value as JSON, falling back to a plain string.
///
/// `141296` becomes a number, `[1,2]` a list, `true` a boolean, and
/// `Expired` (not valid JSON) the string `"Expired"`.
pub fn parse_cli_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
