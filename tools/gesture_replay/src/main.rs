use std::{path::PathBuf, process};

use anyhow::{Context, Result};
use clap::Parser;
use gesture_replay::{check_expected, logging::Logger, parse_expected_states, parse_trace, replay};
use log::LevelFilter;
use mouse_gesture::{load_resolved, GestureConfig, ResolvedConfig, SessionLimits};

#[derive(Debug, Parser)]
#[command(name = "gesture_replay")]
#[command(about = "Replay a recorded mouse packet trace through the inverted-V recognizer")]
struct Cli {
    /// CSV trace with `packet`, `tick` and `abort` records.
    trace: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long = "min-x", conflicts_with = "config")]
    min_x: Option<i32>,
    #[arg(long, conflicts_with = "config")]
    tolerance: Option<u32>,
    #[arg(long = "idle-timeout-s")]
    idle_timeout_s: Option<u32>,
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Logger::from_env(level)?.install()?;

    let mut resolved = match &cli.config {
        Some(path) => load_resolved(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ResolvedConfig {
            gesture: GestureConfig::new(cli.min_x.unwrap_or(50), cli.tolerance.unwrap_or(5))?,
            session: SessionLimits::default(),
        },
    };
    if cli.idle_timeout_s.is_some() {
        resolved.session.idle_timeout_s = cli.idle_timeout_s;
    }

    let notifications = parse_trace(&cli.trace)?;
    let report = replay(notifications, resolved.gesture, resolved.session)?;

    println!("transition,packet,from,to,reason");
    for row in &report.rows {
        println!(
            "transition,{},{},{},{:?}",
            row.packet,
            row.from.label(),
            row.to.label(),
            row.reject_reason
        );
    }
    println!(
        "summary,outcome={:?},packets={},ticks={},rejections={},final={}",
        report.session.outcome,
        report.session.packets,
        report.session.ticks,
        report.session.rejections,
        report.final_state.label()
    );

    if let Some(expect_path) = &cli.expect {
        let expected = parse_expected_states(expect_path)?;
        check_expected(&report, &expected)?;
    }

    Ok(())
}
