//! `motion` command-line front end: plan profiles, export them as CSV, and
//! track moves against the simulated axis.

mod cli;
mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use motion_config::{Config, Logging};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = load_config(&cli.config)?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid config {}", cli.config.display()))?;
    init_logging(&cli, &cfg.logging);

    match cli.cmd {
        Commands::Generate {
            target,
            cruise_velocity,
            acceleration,
            sample_interval,
            ref csv,
        } => cmd_generate(
            &cfg,
            target,
            cruise_velocity,
            acceleration,
            sample_interval,
            csv.as_deref(),
            cli.json,
        ),
        Commands::Run {
            target,
            tolerance,
            timeout_s,
        } => cmd_run(&cfg, target, tolerance, timeout_s, cli.json),
    }
}

/// A missing config file is not an error: defaults describe a usable
/// simulation setup.
fn load_config(path: &Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read config {}", path.display()))?;
    motion_config::load_toml(&text)
        .wrap_err_with(|| format!("cannot parse config {}", path.display()))
}

fn init_logging(cli: &Cli, logging: &Logging) {
    use tracing_subscriber::EnvFilter;

    let level = cli
        .log_level
        .clone()
        .or_else(|| logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = &logging.file {
        let path = PathBuf::from(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let name = path
            .file_name()
            .map_or_else(|| "motion.log".into(), |n| n.to_string_lossy().into_owned());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(&dir, &name),
            Some("hourly") => tracing_appender::rolling::hourly(&dir, &name),
            _ => tracing_appender::rolling::never(&dir, &name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        // File logs are always JSON lines; they exist to be parsed.
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
    } else if cli.json {
        // Keep stdout clean for the JSON result payload.
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    cfg: &Config,
    target: f64,
    cruise_velocity: Option<f64>,
    acceleration: Option<f64>,
    sample_interval: Option<f64>,
    csv: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    let profile = run::plan_profile(cfg, target, cruise_velocity, acceleration, sample_interval)?;

    if let Some(path) = csv {
        profile.write_csv(path);
        if !path.exists() {
            eyre::bail!("CSV export to {} failed; see log for details", path.display());
        }
    }

    if json {
        let payload = serde_json::json!({
            "target": profile.target_position(),
            "total_time_s": profile.total_time(),
            "sample_interval_s": profile.sample_interval(),
            "samples": profile.samples().len(),
            "csv": csv.map(|p| p.display().to_string()),
        });
        println!("{payload}");
    } else {
        println!(
            "Planned move of {} units: {} samples at {} s, {:.3} s total.",
            profile.target_position(),
            profile.samples().len(),
            profile.sample_interval(),
            profile.total_time()
        );
        if let Some(path) = csv {
            println!("Profile written to {}.", path.display());
        }
    }
    Ok(())
}

fn cmd_run(
    cfg: &Config,
    target: f64,
    tolerance: Option<f64>,
    timeout_s: f64,
    json: bool,
) -> eyre::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .wrap_err("cannot install Ctrl-C handler")?;

    let outcome = run::run_move(cfg, target, tolerance, timeout_s, &shutdown)?;

    if json {
        let payload = serde_json::json!({
            "settled": outcome.settled,
            "timed_out": outcome.timed_out,
            "interrupted": outcome.interrupted,
            "final_position": outcome.final_position,
            "distance_from_target": outcome.distance_from_target,
            "elapsed_s": outcome.elapsed_s,
        });
        println!("{payload}");
    } else if outcome.settled {
        println!(
            "Settled at {:.4} ({:+.4} from target) in {:.2} s.",
            outcome.final_position, outcome.distance_from_target, outcome.elapsed_s
        );
    } else if outcome.interrupted {
        println!("Interrupted at {:.4}.", outcome.final_position);
    } else {
        println!(
            "Gave up at {:.4} ({:+.4} from target) after {:.2} s.",
            outcome.final_position, outcome.distance_from_target, outcome.elapsed_s
        );
    }

    if !outcome.settled {
        std::process::exit(1);
    }
    Ok(())
}
