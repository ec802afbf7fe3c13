mod commands;
mod logic;
mod store;
mod util;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use pitchrank_core::{FacetFilter, LeaderboardFilters, NewPlayer};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use commands::{ListOptions, Workspace};
use logic::{LogicTester, all_scenario_names, get_scenario, list_scenarios, reports};
use util::{parse_seeds, split_csv};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "pitchrank-tester", version)]
#[command(about = "Administration and property checks for PitchRank ranking data")]
struct Args {
    /// Data directory holding players.json, badges.json and feed.json
    #[arg(long, global = true, default_value = "pitchrank-data")]
    data: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage local players
    Players {
        #[command(subcommand)]
        action: PlayersCommand,
    },
    /// Award a badge, or revoke it if the player already holds it
    Award {
        /// Local player id or ledger key (e.g. db_42)
        player: String,
        badge: String,
    },
    /// Show the top players for a badge
    Leaderboard {
        badge: String,
        #[arg(long, default_value = "ALL")]
        age_group: String,
        #[arg(long, default_value = "ALL")]
        league: String,
        #[arg(long, default_value = "ALL")]
        state: String,
    },
    /// Show badge totals for every awarded player
    Summary,
    /// Store recoverable player snapshots in the ledger
    Backfill,
    /// Attach or remove a local player's photo
    Photo {
        player_id: u64,
        /// Image file to attach
        #[arg(required_unless_present = "remove")]
        file: Option<PathBuf>,
        /// Remove the current photo instead
        #[arg(long, conflicts_with = "file")]
        remove: bool,
        /// Directory acting as the image host; photos are stored inline without it
        #[arg(long)]
        photo_dir: Option<PathBuf>,
        #[arg(long, default_value = "admin")]
        owner: String,
    },
    /// List leagues, states and age groups present in the feed
    Facets,
    /// Run ranking property checks over seeded synthetic rosters
    Check {
        /// Scenarios to run (comma-separated, or `all`)
        #[arg(long, default_value = "all")]
        scenarios: String,

        /// List all available scenarios and exit
        #[arg(long)]
        list_scenarios: bool,

        /// Seeds to run (comma-separated, `now` for the clock)
        #[arg(long, default_value = "1337")]
        seeds: String,

        /// Number of iterations per scenario and seed
        #[arg(long, default_value_t = 10)]
        iterations: usize,

        /// Output report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        report: ReportFormat,

        /// Optional path to write the report output instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum PlayersCommand {
    /// List the merged roster
    List {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        team: String,
        #[arg(long, default_value = "ALL")]
        age_group: String,
        #[arg(long, default_value = "ALL")]
        league: String,
        #[arg(long, default_value = "ALL")]
        state: String,
        #[arg(long)]
        gender: Option<String>,
    },
    /// Add a local player
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        team: String,
        #[arg(long, default_value = "")]
        position: String,
        #[arg(long, default_value = "")]
        age_group: String,
        #[arg(long, default_value = "")]
        league: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        club: String,
        #[arg(long)]
        jersey: Option<String>,
        #[arg(long)]
        grad_year: Option<u16>,
        #[arg(long)]
        gender: Option<String>,
    },
    /// Delete a local player (their awards stay in the ledger)
    Delete { id: u64 },
    /// Claim a local player's profile for an account
    Claim { id: u64, owner: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Check {
            scenarios,
            list_scenarios: list,
            seeds,
            iterations,
            report,
            output,
        } => run_checks(
            &scenarios,
            list,
            &seeds,
            iterations,
            report,
            output,
            args.verbose,
        ),
        command => run_admin(&args.data, command).await,
    }
}

async fn run_admin(data: &std::path::Path, command: Command) -> Result<()> {
    let ws = Workspace::open(data)?;
    match command {
        Command::Players { action } => match action {
            PlayersCommand::List {
                name,
                team,
                age_group,
                league,
                state,
                gender,
            } => commands::list_players(
                &ws,
                ListOptions {
                    name,
                    team,
                    age_group,
                    league,
                    state,
                    gender,
                },
            ),
            PlayersCommand::Add {
                name,
                team,
                position,
                age_group,
                league,
                state,
                club,
                jersey,
                grad_year,
                gender,
            } => commands::add_player(
                &ws,
                NewPlayer {
                    name,
                    position,
                    age_group,
                    league,
                    state,
                    team_name: team,
                    club,
                    jersey_number: jersey,
                    grad_year,
                    gender: gender.as_deref().and_then(pitchrank_core::Gender::parse),
                },
            ),
            PlayersCommand::Delete { id } => commands::delete_player(&ws, id),
            PlayersCommand::Claim { id, owner } => commands::claim_profile(&ws, id, &owner),
        },
        Command::Award { player, badge } => commands::award(&ws, &player, &badge),
        Command::Leaderboard {
            badge,
            age_group,
            league,
            state,
        } => {
            let filters = LeaderboardFilters {
                age_group: FacetFilter::parse(&age_group),
                league: FacetFilter::parse(&league),
                state: FacetFilter::parse(&state),
            };
            commands::leaderboard(&ws, &badge, &filters)
        }
        Command::Summary => commands::summary(&ws),
        Command::Backfill => commands::backfill(&ws),
        Command::Photo {
            player_id,
            file,
            remove,
            photo_dir,
            owner,
        } => match file {
            Some(file) if !remove => {
                commands::attach_photo(&ws, player_id, &file, photo_dir, &owner).await
            }
            _ => commands::detach_photo(&ws, player_id, photo_dir, &owner).await,
        },
        Command::Facets => commands::facets(&ws),
        Command::Check { .. } => bail!("check does not use a data directory"),
    }
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios = all_scenario_names();
    }
    scenarios
}

fn open_output(output: Option<PathBuf>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            colored::control::set_override(false);
            Ok(Box::new(BufWriter::new(File::create(path)?)))
        }
        None => Ok(Box::new(stdout().lock())),
    }
}

fn run_checks(
    scenarios_arg: &str,
    list: bool,
    seeds: &str,
    iterations: usize,
    report: ReportFormat,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    if list {
        let mut out = open_output(output)?;
        writeln!(out, "Available scenarios:")?;
        for (key, description) in list_scenarios() {
            writeln!(out, "  {key:20} - {description}")?;
        }
        out.flush()?;
        return Ok(());
    }

    let scenarios = expand_scenarios(scenarios_arg);
    let seeds = parse_seeds(seeds)?;
    if let Some(unknown) = scenarios.iter().find(|name| get_scenario(name).is_none()) {
        bail!("unknown scenario `{unknown}` (see --list-scenarios)");
    }

    if matches!(report, ReportFormat::Console) {
        println!("{}", "⚽ PitchRank Property Checks".bright_cyan().bold());
        println!("{}", "============================".cyan());
    }

    let start_time = Instant::now();
    let tester = LogicTester::new(verbose);
    let results: Vec<_> = scenarios
        .iter()
        .filter_map(|name| get_scenario(name))
        .flat_map(|scenario| tester.run_scenario(scenario, &seeds, iterations))
        .collect();

    let mut out = open_output(output)?;
    match report {
        ReportFormat::Console => {
            reports::generate_console_report(&mut out, &results, start_time.elapsed())?;
        }
        ReportFormat::Json => reports::generate_json_report(&mut out, &results)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut out, &results)?,
    }
    out.flush()?;
    drop(out);

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_to_every_scenario() {
        assert_eq!(expand_scenarios("smoke, all"), all_scenario_names());
        assert_eq!(expand_scenarios("smoke,merge-uniqueness").len(), 2);
    }

    #[test]
    fn command_line_parses() {
        let args = Args::try_parse_from([
            "pitchrank-tester",
            "--data",
            "/tmp/x",
            "leaderboard",
            "mvp",
            "--league",
            "NPL",
        ])
        .unwrap();
        assert_eq!(args.data, PathBuf::from("/tmp/x"));
        assert!(matches!(args.command, Command::Leaderboard { ref league, .. } if league == "NPL"));

        assert!(Args::try_parse_from(["pitchrank-tester", "photo", "3"]).is_err());
        assert!(Args::try_parse_from(["pitchrank-tester", "photo", "3", "--remove"]).is_ok());
    }
}
