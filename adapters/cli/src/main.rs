#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Developer command-line interface that drives the catalog builder, the
//! daily generator, the validator and the session state machine.

mod config;
mod engine;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use gridlock_core::{Level, PackId, PlacementCommit, ProgressBook};
use gridlock_system_catalog::{Catalog, LevelCatalogBuilder};
use gridlock_system_daily::DailyPuzzleGenerator;
use gridlock_system_session::{Session, SessionSpec, SessionState};
use gridlock_system_validator::{screen_catalog, validate_level};
use log::info;
use serde_json::json;

use crate::{config::AppConfig, engine::ScriptedEngine};

#[derive(Parser)]
#[command(name = "gridlock", version, about = "Level generation and session tools")]
struct Cli {
    /// TOML file with `[catalog]` and `[daily]` tuning tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Builds and screens the campaign, then prints a per-world summary.
    Catalog {
        /// Prints every pack as JSON instead of the summary.
        #[arg(long)]
        json: bool,
    },
    /// Prints the daily puzzle as JSON.
    Daily {
        /// Calendar day, defaults to today in UTC.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Also prints the puzzles of the trailing days.
        #[arg(long)]
        archive: bool,
    },
    /// Prints the validation report of one level.
    Validate {
        /// World number, starting from one.
        #[arg(long)]
        world: u32,
        /// Level index within the world, 1 to 15.
        #[arg(long)]
        level: u8,
    },
    /// Plays a scripted session and prints the outcome.
    Simulate {
        /// World number, starting from one.
        #[arg(long)]
        world: u32,
        /// Level index within the world, 1 to 15.
        #[arg(long)]
        level: u8,
        /// Lines cleared by each placement, in order.
        #[arg(long, value_delimiter = ',')]
        lines: Vec<u32>,
        /// Countdown seconds that elapse after the placements.
        #[arg(long, default_value_t = 0)]
        ticks: u32,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Catalog { json } => catalog(&config, json),
        Command::Daily { date, archive } => daily(&config, date, archive),
        Command::Validate { world, level } => validate(&config, world, level),
        Command::Simulate {
            world,
            level,
            lines,
            ticks,
        } => simulate(&config, world, level, &lines, ticks),
    }
}

fn build_catalog(config: &AppConfig) -> Result<Catalog> {
    LevelCatalogBuilder::new(config.catalog.clone())?
        .build()
        .context("failed to build the level catalog")
}

fn find_level(catalog: &Catalog, world: u32, index: u8) -> Result<&Level> {
    let pack = catalog
        .pack(PackId::new(world))
        .with_context(|| format!("no world {world} in the catalog"))?;
    pack.level(index)
        .with_context(|| format!("no level {world}-{index} in the catalog"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render json")?;
    println!("{rendered}");
    Ok(())
}

fn catalog(config: &AppConfig, as_json: bool) -> Result<()> {
    let catalog = build_catalog(config)?;
    let screening = screen_catalog(&catalog);

    if as_json {
        print_json(&catalog.packs())?;
    } else {
        for pack in catalog.packs() {
            let hardest = pack
                .levels
                .iter()
                .map(|level| level.difficulty.get())
                .max()
                .unwrap_or_default();
            let flagged = pack
                .levels
                .iter()
                .filter(|level| screening.flagged.contains(&level.id))
                .count();
            println!(
                "World {:>2} {:<18} {} levels, difficulty up to {:>2}, {} stars, {} flagged",
                pack.id.get(),
                pack.title,
                pack.levels.len(),
                hardest,
                pack.max_stars(),
                flagged
            );
        }
    }

    if !screening.is_shippable() {
        bail!(
            "{} levels failed validation: {:?}",
            screening.rejected.len(),
            screening
                .rejected
                .iter()
                .map(|id| id.get())
                .collect::<Vec<_>>()
        );
    }
    info!(
        "catalog ready: {} levels, {} stars",
        catalog.total_levels(),
        catalog.max_stars()
    );
    Ok(())
}

fn daily(config: &AppConfig, date: Option<NaiveDate>, with_archive: bool) -> Result<()> {
    let generator = DailyPuzzleGenerator::new(config.daily.clone());
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let puzzle = generator.puzzle_for(date);

    let output = if with_archive {
        json!({ "puzzle": puzzle, "archive": generator.archive(date) })
    } else {
        json!({ "puzzle": puzzle })
    };
    print_json(&output)
}

fn validate(config: &AppConfig, world: u32, index: u8) -> Result<()> {
    let catalog = build_catalog(config)?;
    let level = find_level(&catalog, world, index)?;
    let report = validate_level(level);
    print_json(&report)?;
    if !report.solvable {
        bail!("level {world}-{index} must not ship");
    }
    Ok(())
}

fn simulate(config: &AppConfig, world: u32, index: u8, lines: &[u32], ticks: u32) -> Result<()> {
    let catalog = build_catalog(config)?;
    let level = find_level(&catalog, world, index)?;
    let mut session = Session::new(
        SessionSpec::from_level(level),
        ScriptedEngine::new(level.grid_size),
    );
    let _ = session.begin()?;

    for &cleared in lines {
        if !session.state().is_running() {
            break;
        }
        session.engine_mut().commit(cleared);
        let _ = session.on_placement(PlacementCommit::new(cleared));
    }
    let attempt = session.attempt();
    for _ in 0..ticks {
        if !session.state().is_running() {
            break;
        }
        let _ = session.on_tick(attempt);
    }

    let mut progress = ProgressBook::new();
    let result = match session.state() {
        SessionState::Succeeded(result) => Some(result),
        _ => None,
    };
    progress.record(level.id, result);

    print_json(&json!({
        "level": level.id,
        "state": session.state(),
        "summary": session.summary(),
        "progress": progress.level(level.id),
    }))
}
