//! Affiliation reconciliation CLI.

use std::io::{self, IsTerminal};

use affil_cli::config::{AppConfig, load_config};
use affil_cli::logging::{LogConfig, LogFormat, init_logging};
use affil_cli::menu::{Menu, MenuAction};
use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_extract, run_harvest, run_match};
use crate::summary::{print_extraction_summary, print_harvest_summary, print_match_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let exit_code = match run(&cli.command, &config) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: &Command, config: &AppConfig) -> Result<i32> {
    match command {
        Command::Harvest(args) => {
            let report = run_harvest(config, &args.overrides(), &args.out_dir)?;
            print_harvest_summary(&report);
            Ok(if report.outcome.stop_reason.is_clean() { 0 } else { 1 })
        }
        Command::ExtractLabels(args) => {
            let summary = run_extract(&args.ids, &args.dump, &args.output)?;
            print_extraction_summary(&summary, &args.output);
            Ok(0)
        }
        Command::Match(args) => {
            let summary = run_match(
                config,
                &args.records,
                &args.labels,
                &args.output,
                args.cutoff,
                args.output_format(),
            )?;
            print_match_summary(&summary, &args.output);
            Ok(0)
        }
        Command::Menu => {
            let stdin = io::stdin();
            Menu::new(stdin.lock(), io::stdout()).run(|action| dispatch(action, config))?;
            Ok(0)
        }
    }
}

fn dispatch(action: MenuAction, config: &AppConfig) -> Result<()> {
    match action {
        MenuAction::Harvest { overrides, out_dir } => {
            let report = run_harvest(config, &overrides, &out_dir)?;
            print_harvest_summary(&report);
        }
        MenuAction::ExtractLabels { ids, dump, output } => {
            let summary = run_extract(&ids, &dump, &output)?;
            print_extraction_summary(&summary, &output);
        }
        MenuAction::Match {
            records,
            labels,
            output,
        } => {
            let format = affil_match::OutputFormat::from_path(&output).unwrap_or_default();
            let summary = run_match(config, &records, &labels, &output, None, format)?;
            print_match_summary(&summary, &output);
        }
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
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
