#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Host tool for the sampling instrument.
//!
//! Each invocation opens a fresh simulated device (bus reset and oscillator
//! calibration included) and issues the requested control transfers.

mod channel;
mod cli;
mod error_fmt;
mod host;
mod logging;

use std::time::Duration;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

use crate::channel::SimChannel;
use crate::cli::{Cli, Commands, JSON_MODE};

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hooks: {e}");
    }
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let result = run(cli);
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    logging::shutdown();
    if let Err(e) = result {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        if json {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn load_config(cli: &Cli) -> eyre::Result<sct_config::Config> {
    match cli.config.as_deref() {
        Some(path) if path.exists() => sct_config::load_file(path),
        Some(path) => {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(sct_config::Config::default())
        }
        None => Ok(sct_config::Config::default()),
    }
}

fn emit(json: bool, command: &str, value: serde_json::Value, text: impl FnOnce() -> String) {
    if json {
        println!("{}", json!({ "command": command, "result": value }));
    } else {
        let s = text();
        if !s.is_empty() {
            println!("{s}");
        }
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli)?;
    logging::init(&cli.log_level, cli.json, &cfg.logging)?;
    cfg.validate()?;

    let mut ch = SimChannel::from_config(&cfg)?;
    let json = cli.json;

    match cli.cmd {
        Commands::Testcomm { iterations, seed } => {
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let n = host::testcomm(&mut ch, iterations, &mut rng)?;
            emit(json, "testcomm", json!({ "iterations": n }), || {
                "communication test succeeded".to_string()
            });
        }
        Commands::Getosccal => {
            let (factory, active) = host::get_osccal(&mut ch)?;
            emit(
                json,
                "getosccal",
                json!({ "factory": factory, "active": active }),
                || format!("pre-programmed OSCCAL: {factory}   current OSCCAL: {active}"),
            );
        }
        Commands::Runadc => {
            host::run_adc(&mut ch)?;
            emit(json, "runadc", json!({ "started": true }), String::new);
        }
        Commands::Getadc => {
            let v = host::get_adc(&mut ch)?;
            emit(json, "getadc", json!(v), || v.to_string());
        }
        Commands::Getacc => {
            let v = host::get_acc(&mut ch)?;
            emit(json, "getacc", json!(v), || v.to_string());
        }
        Commands::Getcnt => {
            let v = host::get_cnt(&mut ch)?;
            emit(json, "getcnt", json!(v), || v.to_string());
        }
        Commands::Measure { settle_ms } => {
            let m = host::measure(&mut ch, Duration::from_millis(settle_ms))?;
            tracing::info!(
                average = m.average,
                accumulated = m.accumulated,
                count = m.count,
                "measurement"
            );
            emit(
                json,
                "measure",
                json!({ "average": m.average, "accumulated": m.accumulated, "count": m.count }),
                || {
                    format!(
                        "average: {}\naccumulated: {}\ncount: {}",
                        m.average, m.accumulated, m.count
                    )
                },
            );
        }
        Commands::SelfCheck => {
            let mut rng = StdRng::seed_from_u64(0);
            host::testcomm(&mut ch, 16, &mut rng)?;
            let dev = ch.device();
            let cal = dev.last_calibration();
            emit(
                json,
                "self-check",
                json!({
                    "ok": true,
                    "factory": dev.factory_calibration(),
                    "active": dev.active_calibration(),
                    "target_reference": dev.target_reference(),
                    "deviation": cal.map(|c| c.deviation),
                }),
                || "OK".to_string(),
            );
        }
    }
    Ok(())
}
