//! eICU patient table CLI.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use eicu_cli::commands::{
    prepare_served_table, run_build, run_query, run_schema, run_serve, stdout_is_free,
};
use eicu_cli::config::{AppConfig, BuildOverrides};
use eicu_cli::logging::{LogConfig, LogFormat, init_logging};
use eicu_transform::BuildError;
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{print_build_summary, print_schema};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            report_error(&error);
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Build(args) => {
            config.apply_build_overrides(args.overrides());
            let built = run_build(&config)?;
            print_build_summary(&config.output, &built.report);
        }
        Command::Serve(args) => {
            config.apply_build_overrides(args.build.overrides());
            config.apply_server_overrides(args.overrides());
            let print_summary = stdout_is_free(&config);
            let output = config.output.clone();
            let table = prepare_served_table(&config, args.table.as_deref(), |built| {
                if print_summary {
                    print_build_summary(&output, &built.report);
                }
            })?;
            run_serve(&config, table)?;
        }
        Command::Schema(args) => {
            let table = table_path(&mut config, args.table);
            print_schema(&run_schema(&table)?);
        }
        Command::Query(args) => {
            let table = table_path(&mut config, args.table.table);
            println!(
                "{}",
                run_query(&table, &args.column, &args.operator, &args.value)?
            );
        }
    }
    Ok(())
}

/// An explicit `--table`, else the configured merged output.
fn table_path(config: &mut AppConfig, table: Option<PathBuf>) -> PathBuf {
    config.apply_build_overrides(BuildOverrides {
        output: table,
        ..BuildOverrides::default()
    });
    config.output.clone()
}

fn report_error(error: &anyhow::Error) {
    eprintln!("error: {error:#}");
    let missing = error
        .downcast_ref::<BuildError>()
        .and_then(BuildError::missing_files);
    if let Some(missing) = missing {
        eprintln!("missing source files:");
        for name in missing {
            eprintln!("  - {name}");
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
