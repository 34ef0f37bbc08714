#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `sorter` binary: sorting, calibration and tuning tools for the peak sorter.

mod cli;
mod error_fmt;
mod logging;
mod rt;
mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use crate::cli::{Cli, Commands, JSON_MODE, json_mode};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(cli) {
        tracing::error!(error = %e, "command failed");
        if json_mode() {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = match run::load_config(&cli.config) {
        Ok(cfg) => {
            logging::init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);
            cfg
        }
        Err(e) => {
            logging::init_tracing(
                cli.json,
                cli.log_level.as_deref(),
                &sorter_config::Logging::default(),
            );
            return Err(e);
        }
    };
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    match cli.cmd {
        Commands::Sort {
            trace,
            max_events,
            rt,
            rt_prio,
        } => run::run_sort(&cfg, trace.as_deref(), max_events, rt, rt_prio, shutdown),
        Commands::Calibrate {
            trace,
            capacity,
            output,
        } => run::run_calibrate(
            &cfg,
            trace.as_deref(),
            capacity,
            output.as_deref(),
            shutdown,
        ),
        Commands::Monitor { count, interval_ms } => {
            run::run_monitor(&cfg, count, interval_ms, shutdown)
        }
        Commands::Analyze { dump } => run::run_analyze(&cfg, &dump),
        Commands::SelfCheck => run::self_check(&cfg),
    }
}
