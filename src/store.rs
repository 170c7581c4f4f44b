// SQLite persistence for projections, team schedules, and fantasy weeks,
// plus the CSV projection importer.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use tracing::warn;

use crate::roster::position::parse_eligibility;
use crate::roster::Player;
use crate::sim::{DateRange, ProjectionSource, ScheduleSource};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed store for player projections, NHL team schedules, and the
/// fantasy week calendar.
pub struct ProjectionStore {
    conn: Mutex<Connection>,
}

impl ProjectionStore {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS projections (
                player_name TEXT PRIMARY KEY,
                team        TEXT NOT NULL,
                positions   TEXT NOT NULL,
                stats_json  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS team_schedules (
                team_tricode  TEXT PRIMARY KEY,
                schedule_json TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS fantasy_weeks (
                week_number INTEGER PRIMARY KEY,
                start_date  TEXT NOT NULL,
                end_date    TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    /// Insert a player's projections, replacing any existing row for the
    /// same name. Positions are stored as a comma-joined code string
    /// (e.g. `"C,LW"`), stats as a JSON object.
    pub fn upsert_player(&self, player: &Player) -> Result<()> {
        let conn = self.conn();
        let positions: Vec<&str> = player.positions.iter().map(|p| p.display_str()).collect();
        let stats_json = serde_json::to_string(&player.projections)
            .context("failed to serialize projections")?;
        conn.execute(
            "INSERT OR REPLACE INTO projections (player_name, team, positions, stats_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![player.name, player.team, positions.join(","), stats_json],
        )
        .context("failed to upsert player projection")?;
        Ok(())
    }

    /// Load a single player's projection row by exact name.
    pub fn player(&self, name: &str) -> Result<Option<Player>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT player_name, team, positions, stats_json
             FROM projections WHERE player_name = ?1",
            params![name],
            row_to_player,
        )
        .optional()
        .context("failed to query player projection")
    }

    /// Load every projection row, ordered by player name.
    pub fn all_players(&self) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player_name, team, positions, stats_json
                 FROM projections ORDER BY player_name",
            )
            .context("failed to prepare all_players query")?;

        let players = stmt
            .query_map([], row_to_player)
            .context("failed to query projections")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map projection rows")?;

        Ok(players)
    }

    /// Import a projections CSV in a single transaction, replacing prior
    /// rows for the same names. Returns the number of players imported.
    /// Malformed rows are skipped with a warning rather than aborting the
    /// whole import.
    pub fn import_projections_csv(&self, path: &str) -> Result<usize> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open projections CSV at {path}"))?;
        let players = load_players_from_reader(file)
            .with_context(|| format!("CSV error in {path}"))?;

        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin import transaction")?;

        for player in &players {
            let positions: Vec<&str> =
                player.positions.iter().map(|p| p.display_str()).collect();
            let stats_json = serde_json::to_string(&player.projections)
                .context("failed to serialize projections")?;
            tx.execute(
                "INSERT OR REPLACE INTO projections (player_name, team, positions, stats_json)
                 VALUES (?1, ?2, ?3, ?4)",
                params![player.name, player.team, positions.join(","), stats_json],
            )
            .context("failed to insert projection row in batch")?;
        }

        tx.commit().context("failed to commit import")?;
        Ok(players.len())
    }

    // ------------------------------------------------------------------
    // Team schedules
    // ------------------------------------------------------------------

    /// Store a team's game dates, replacing any existing schedule.
    pub fn upsert_schedule(&self, team: &str, dates: &HashSet<NaiveDate>) -> Result<()> {
        let conn = self.conn();
        let mut sorted: Vec<String> = dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();
        sorted.sort();
        let schedule_json =
            serde_json::to_string(&sorted).context("failed to serialize schedule")?;
        conn.execute(
            "INSERT OR REPLACE INTO team_schedules (team_tricode, schedule_json)
             VALUES (?1, ?2)",
            params![team, schedule_json],
        )
        .context("failed to upsert team schedule")?;
        Ok(())
    }

    /// Load every team's game dates. Unparseable dates are skipped with a
    /// warning.
    pub fn team_schedules(&self) -> Result<HashMap<String, HashSet<NaiveDate>>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT team_tricode, schedule_json FROM team_schedules")
            .context("failed to prepare team_schedules query")?;

        let rows = stmt
            .query_map([], |row| {
                let team: String = row.get(0)?;
                let json: String = row.get(1)?;
                Ok((team, json))
            })
            .context("failed to query team schedules")?;

        let mut schedules = HashMap::new();
        for row in rows {
            let (team, json) = row.context("failed to read schedule row")?;
            let raw: Vec<String> = serde_json::from_str(&json)
                .with_context(|| format!("failed to deserialize schedule for {team}"))?;
            let mut dates = HashSet::new();
            for text in raw {
                match NaiveDate::parse_from_str(&text, DATE_FORMAT) {
                    Ok(date) => {
                        dates.insert(date);
                    }
                    Err(_) => {
                        warn!("skipping unparseable game date '{}' for {}", text, team);
                    }
                }
            }
            schedules.insert(team, dates);
        }

        Ok(schedules)
    }

    // ------------------------------------------------------------------
    // Fantasy weeks
    // ------------------------------------------------------------------

    /// Store a fantasy week's date range, replacing any existing row.
    pub fn upsert_week(&self, week: u32, range: DateRange) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO fantasy_weeks (week_number, start_date, end_date)
             VALUES (?1, ?2, ?3)",
            params![
                week,
                range.start.format(DATE_FORMAT).to_string(),
                range.end.format(DATE_FORMAT).to_string(),
            ],
        )
        .context("failed to upsert fantasy week")?;
        Ok(())
    }

    /// Look up the date range for a fantasy week number.
    pub fn week_dates(&self, week: u32) -> Result<Option<DateRange>> {
        let conn = self.conn();
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT start_date, end_date FROM fantasy_weeks WHERE week_number = ?1",
                params![week],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("failed to query fantasy week")?;

        match row {
            Some((start, end)) => {
                let start = NaiveDate::parse_from_str(&start, DATE_FORMAT)
                    .with_context(|| format!("invalid start_date for week {week}"))?;
                let end = NaiveDate::parse_from_str(&end, DATE_FORMAT)
                    .with_context(|| format!("invalid end_date for week {week}"))?;
                Ok(Some(DateRange::new(start, end)))
            }
            None => Ok(None),
        }
    }
}

impl ProjectionSource for ProjectionStore {
    fn lookup_player(&self, name: &str) -> Option<Player> {
        match self.player(name) {
            Ok(found) => found,
            Err(e) => {
                warn!("projection lookup for '{}' failed: {:#}", name, e);
                None
            }
        }
    }
}

/// In-memory schedule view loaded once from the store. The store itself
/// cannot hand out borrowed sets from behind its mutex, so callers load the
/// full map up front and pass it where a `ScheduleSource` is needed.
pub struct ScheduleCache {
    schedules: HashMap<String, HashSet<NaiveDate>>,
}

impl ScheduleCache {
    pub fn load(store: &ProjectionStore) -> Result<Self> {
        Ok(Self {
            schedules: store.team_schedules()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

impl ScheduleSource for ScheduleCache {
    fn play_dates(&self, team: &str) -> Option<&HashSet<NaiveDate>> {
        self.schedules.get(team)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_player(row: &rusqlite::Row<'_>) -> rusqlite::Result<Player> {
    let name: String = row.get(0)?;
    let team: String = row.get(1)?;
    let positions: String = row.get(2)?;
    let stats_json: String = row.get(3)?;

    let projections: BTreeMap<String, f64> =
        serde_json::from_str(&stats_json).unwrap_or_else(|e| {
            warn!("invalid stats_json for '{}': {}", name, e);
            BTreeMap::new()
        });

    Ok(Player::new(name, team, parse_eligibility(&positions), projections))
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

/// Projection CSV row. Stat columns are absorbed by `#[serde(flatten)]` so
/// the importer works with any category set; column headers are lowercased
/// to match config category codes.
#[derive(Debug, Deserialize)]
struct RawProjectionRow {
    #[serde(alias = "Name", alias = "name")]
    player_name: String,
    #[serde(default, alias = "Team", alias = "team")]
    team: String,
    #[serde(alias = "Pos", alias = "POS", alias = "pos")]
    positions: String,
    #[serde(flatten)]
    stats: HashMap<String, f64>,
}

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawProjectionRow>() {
        match result {
            Ok(raw) => {
                let name = raw.player_name.trim().to_string();
                let positions = parse_eligibility(&raw.positions);
                if positions.is_empty() {
                    warn!("skipping '{}': no recognized positions in '{}'", name, raw.positions);
                    continue;
                }
                let projections: BTreeMap<String, f64> = raw
                    .stats
                    .into_iter()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(k, v)| (k.trim().to_lowercase(), v))
                    .collect();
                players.push(Player::new(
                    name,
                    raw.team.trim().to_string(),
                    positions,
                    projections,
                ));
            }
            Err(e) => {
                warn!("skipping malformed projection row: {}", e);
            }
        }
    }
    Ok(players)
}
