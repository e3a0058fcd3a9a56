//! Guild Delve - Headless Expedition Runner
//!
//! Loads a TOML roster, sends every guild on one scheduled expedition and
//! prints the summaries as JSON or text. Also rolls dice notation and
//! previews floor layouts for a seed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use guild_delve::core::error::Result;
use guild_delve::core::types::{CharacterId, GuildId};
use guild_delve::dice::{DiceExpr, SeededDice};
use guild_delve::dungeon::preview;
use guild_delve::events::Event;
use guild_delve::expedition::ExpeditionSummary;
use guild_delve::party::RosterFile;
use guild_delve::recovery::RecoveryReport;
use guild_delve::runner::{ExpeditionRunner, GuildOutcome};

/// Guild Delve - deterministic dungeon expeditions for adventurer guilds
#[derive(Parser, Debug)]
#[command(name = "guild-delve")]
#[command(about = "Run guild dungeon expeditions headlessly")]
struct Cli {
    /// Log filter, e.g. "guild_delve=debug"
    #[arg(long, default_value = "guild_delve=info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scheduled expedition for every guild in a roster
    Run {
        /// Roster TOML file
        #[arg(long, default_value = "data/guilds.toml")]
        roster: PathBuf,

        /// Random seed for deterministic runs
        #[arg(long)]
        seed: Option<u64>,

        /// Override the number of floors per expedition
        #[arg(long)]
        floors: Option<u32>,

        /// Override the worker thread count (0 = one per core)
        #[arg(long)]
        workers: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Include every guild's full event log
        #[arg(long)]
        events: bool,
    },

    /// Roll dice notation such as 3d6+2
    Roll {
        expr: String,

        #[arg(long)]
        seed: Option<u64>,

        /// Number of times to roll
        #[arg(long, default_value_t = 1)]
        times: u32,
    },

    /// Show the floors an expedition would see for a seed
    Preview {
        #[arg(long, default_value_t = 1)]
        start_floor: u32,

        #[arg(long, default_value_t = 3)]
        floors: u32,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

/// JSON output structure
#[derive(Serialize)]
struct RunOutput<'a> {
    seed: u64,
    guilds: Vec<GuildResult<'a>>,
}

#[derive(Serialize)]
struct GuildResult<'a> {
    guild_id: GuildId,
    name: &'a str,
    treasury: u64,
    floors_completed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a ExpeditionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recovery: Option<&'a RecoveryReport>,
    /// Resting members who kept the guild home
    #[serde(skip_serializing_if = "Option::is_none")]
    sat_out: Option<&'a [CharacterId]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a [Event]>,
}

impl<'a> GuildResult<'a> {
    fn from_outcome(outcome: &'a GuildOutcome, with_events: bool) -> Self {
        let guild = outcome.guild();
        let mut result = Self {
            guild_id: guild.id,
            name: &guild.name,
            treasury: guild.treasury,
            floors_completed: guild.floors_completed,
            summary: None,
            recovery: None,
            sat_out: None,
            error: None,
            events: None,
        };
        match outcome {
            GuildOutcome::Finished { report, recovery, .. } => {
                result.summary = Some(&report.summary);
                result.recovery = Some(recovery);
                if with_events {
                    result.events = Some(report.events.as_slice());
                }
            }
            GuildOutcome::SatOut { rested, .. } => result.sat_out = Some(rested.as_slice()),
            GuildOutcome::Failed { error, .. } => result.error = Some(error.to_string()),
        }
        result
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::Run { roster, seed, floors, workers, format, events } => {
            let seed = seed.unwrap_or_else(rand::random);
            let roster = RosterFile::load(&roster)?;
            let mut recruit_dice = SeededDice::new(seed);
            let (mut config, guilds) = roster.into_guilds(&mut recruit_dice);
            if let Some(floors) = floors {
                config.max_floors = floors;
            }
            if let Some(workers) = workers {
                config.worker_threads = workers;
            }

            let runner = ExpeditionRunner::new(config)?;
            let outcomes = runner.run(guilds, seed)?;
            match format {
                OutputFormat::Json => {
                    let output = RunOutput {
                        seed,
                        guilds: outcomes.iter().map(|o| GuildResult::from_outcome(o, events)).collect(),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => print_text(&outcomes, seed, events),
            }
        }
        Command::Roll { expr, seed, times } => {
            let expr: DiceExpr = expr.parse()?;
            let mut dice = SeededDice::new(seed.unwrap_or_else(rand::random));
            for _ in 0..times {
                let (faces, total) = expr.roll_detailed(&mut dice);
                println!("{} -> {:?} = {}", expr, faces, total);
            }
        }
        Command::Preview { start_floor, floors, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            println!("Seed: {}", seed);
            for floor in preview(start_floor, floors, seed) {
                println!(
                    "Floor {}: {} rooms ({} combat, {} trap, {} boss, {} fountain), {} enemies",
                    floor.level,
                    floor.rooms,
                    floor.combat_rooms,
                    floor.trap_rooms,
                    floor.boss_rooms,
                    floor.fountains,
                    floor.enemies
                );
            }
        }
    }
    Ok(())
}

fn print_text(outcomes: &[GuildOutcome], seed: u64, events: bool) {
    println!("Seed: {}", seed);
    for outcome in outcomes {
        let guild = outcome.guild();
        println!();
        println!("=== {} (guild {}) ===", guild.name, guild.id);
        match outcome {
            GuildOutcome::Finished { report, recovery, .. } => {
                let summary = &report.summary;
                println!(
                    "Status: {} on floor {} room {}",
                    summary.status.label(),
                    summary.final_floor,
                    summary.final_room
                );
                println!(
                    "Floors cleared: {}  Rooms cleared: {}  Enemies defeated: {} ({} bosses)",
                    summary.floors_cleared,
                    summary.rooms_cleared,
                    summary.enemies_defeated,
                    summary.bosses_defeated
                );
                println!(
                    "Gold: {}  Items: {}  Final morale: {}",
                    summary.gold,
                    summary.items.len(),
                    summary.final_morale
                );
                for delta in &summary.characters {
                    println!(
                        "  {:<12} {:<10} HP {:>3} -> {:>3}  downed {}  spells lost {}",
                        delta.name,
                        delta.role.name(),
                        delta.hp_start,
                        delta.hp_end,
                        delta.times_downed,
                        delta.spells_disabled.len()
                    );
                }
                println!(
                    "Treasury: {} (+{})  Floors completed: {}",
                    guild.treasury, recovery.treasury_deposit, recovery.floors_completed
                );
                if events {
                    for event in &report.events {
                        println!("  [{:>4}] {}: {}", event.tick_number, event.event_type.as_str(), event.description);
                    }
                }
            }
            GuildOutcome::SatOut { rested, .. } => {
                println!("Sat out: {} member(s) resting with no reserve", rested.len())
            }
            GuildOutcome::Failed { error, .. } => println!("Failed: {}", error),
        }
    }
}
