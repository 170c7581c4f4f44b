// Bench coach entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to stderr; stdout is reserved for JSON output)
// 2. Load config
// 3. Open the projection store
// 4. Dispatch the subcommand

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tracing::{info, warn};

use bench_coach::config;
use bench_coach::lineup::{derive_weights, CategoryWeights, SlotCapacities};
use bench_coach::roster::Player;
use bench_coach::sim::{
    rank_pickups, simulate_week, utilization_report, DateRange, Transaction,
};
use bench_coach::store::{ProjectionStore, ScheduleCache};

const USAGE: &str = "\
usage: benchcoach <command> [args]

commands:
  import                              import the projections CSV from config
  import-schedule <schedules.json>    load team game dates ({\"BOS\": [\"2026-01-05\", ...]})
  set-week <week> <start> <end>       record a fantasy week's date range
  simulate <week> <roster.json> [transactions.json]
                                      simulate a week; prints totals and utilization
  weights <my_totals.json> <opponent_totals.json>
                                      derive category weights from two totals maps
  pickups <week> <roster.json> [weights.json]
                                      rank free agents by projected lineup impact";

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} categories",
        config.league.name,
        config.league.categories.len()
    );

    let store = ProjectionStore::open(&config.db_path).context("failed to open database")?;

    match (command.as_str(), &args[1..]) {
        ("import", []) => {
            let count = store
                .import_projections_csv(&config.data_paths.projections)
                .context("failed to import projections")?;
            info!("Imported {} player projections", count);
        }
        ("import-schedule", [path]) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {path}"))?;
            let raw: HashMap<String, Vec<NaiveDate>> =
                serde_json::from_str(&text).context("failed to parse schedules JSON")?;
            for (team, dates) in &raw {
                let dates: HashSet<NaiveDate> = dates.iter().copied().collect();
                store.upsert_schedule(team, &dates)?;
            }
            info!("Loaded schedules for {} teams", raw.len());
        }
        ("set-week", [week, start, end]) => {
            let week: u32 = week.parse().context("week must be a number")?;
            let start = parse_date(start)?;
            let end = parse_date(end)?;
            if end < start {
                bail!("week end date precedes start date");
            }
            store.upsert_week(week, DateRange::new(start, end))?;
            info!("Recorded week {} as {} through {}", week, start, end);
        }
        ("simulate", [week, roster_path, rest @ ..]) => {
            let range = resolve_week(&store, week)?;
            let roster = load_roster(&store, roster_path)?;
            let transactions = match rest {
                [] => Vec::new(),
                [path] => load_transactions(path)?,
                _ => bail!("too many arguments for simulate"),
            };
            let schedules = ScheduleCache::load(&store)?;
            if schedules.is_empty() {
                warn!("no team schedules loaded; every day will be empty");
            }
            let capacities = SlotCapacities::from_config(&config.league.slots);

            let result = simulate_week(
                &roster,
                range,
                &schedules,
                &store,
                &transactions,
                capacities,
            );
            let utilization =
                utilization_report(&result.final_roster, range, &result.daily_lineups, capacities);

            let output = serde_json::json!({
                "totals": result.totals,
                "utilization": utilization,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        ("weights", [my_path, opp_path]) => {
            let my_totals = load_totals(my_path)?;
            let opp_totals = load_totals(opp_path)?;
            let weights = derive_weights(&my_totals, &opp_totals, &config.league.categories);
            println!("{}", serde_json::to_string_pretty(&weights)?);
        }
        ("pickups", [week, roster_path, rest @ ..]) => {
            let range = resolve_week(&store, week)?;
            let roster = load_roster(&store, roster_path)?;
            let weights = match rest {
                [] => CategoryWeights::empty(),
                [path] => {
                    let text = std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read {path}"))?;
                    serde_json::from_str(&text).context("failed to parse weights JSON")?
                }
                _ => bail!("too many arguments for pickups"),
            };
            let schedules = ScheduleCache::load(&store)?;
            let capacities = SlotCapacities::from_config(&config.league.slots);

            let baseline = simulate_week(&roster, range, &schedules, &store, &[], capacities);

            let rostered: HashSet<&str> = roster.iter().map(|p| p.name.as_str()).collect();
            let free_agents: Vec<Player> = store
                .all_players()?
                .into_iter()
                .filter(|p| !rostered.contains(p.name.as_str()))
                .collect();
            info!("Ranking {} free agents", free_agents.len());

            let ranked = rank_pickups(
                &free_agents,
                &baseline.daily_lineups,
                range,
                &schedules,
                &weights,
                capacities,
            );
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

/// Roster file shape: a JSON array of player names, resolved against the
/// projection store. Unresolvable names abort with an error since simulating
/// a partial roster silently would be misleading.
fn load_roster(store: &ProjectionStore, path: &str) -> anyhow::Result<Vec<Player>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let names: Vec<String> =
        serde_json::from_str(&text).context("failed to parse roster JSON")?;

    let mut roster = Vec::with_capacity(names.len());
    for name in &names {
        let player = store
            .player(name)?
            .with_context(|| format!("no projection found for roster player '{name}'"))?;
        roster.push(player);
    }
    info!("Loaded roster of {} players", roster.len());
    Ok(roster)
}

fn load_transactions(path: &str) -> anyhow::Result<Vec<Transaction>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&text).context("failed to parse transactions JSON")
}

fn load_totals(path: &str) -> anyhow::Result<BTreeMap<String, f64>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse totals JSON in {path}"))
}

fn resolve_week(store: &ProjectionStore, week: &str) -> anyhow::Result<DateRange> {
    let week: u32 = week.parse().context("week must be a number")?;
    store
        .week_dates(week)?
        .with_context(|| format!("no date range recorded for week {week}; run set-week first"))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bench_coach=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
