// Integration tests for the bench coach.
//
// These tests exercise the full system end-to-end using the library crate's
// public API. They verify that the major subsystems (projection store,
// schedule loading, weekly simulation, weight derivation, utilization
// reporting, and pickup ranking) work together correctly.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use bench_coach::lineup::{derive_weights, CategoryWeights, SlotCapacities};
use bench_coach::roster::{Player, Position};
use bench_coach::sim::{
    rank_pickups, simulate_week, suggest_drop, utilization_report, DateRange, Transaction,
};
use bench_coach::store::{ProjectionStore, ScheduleCache};

// ===========================================================================
// Test helpers
// ===========================================================================

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn week_range() -> DateRange {
    DateRange::new(date("2026-01-05"), date("2026-01-11"))
}

fn skater(name: &str, team: &str, positions: Vec<Position>, pts: f64) -> Player {
    let mut projections = BTreeMap::new();
    projections.insert("g".to_string(), pts * 0.4);
    projections.insert("a".to_string(), pts * 0.6);
    projections.insert("pts".to_string(), pts);
    Player::new(name, team, positions, projections)
}

fn goalie(name: &str, team: &str, wins: f64, sv: f64, sa: f64, ga: f64) -> Player {
    let mut projections = BTreeMap::new();
    projections.insert("w".to_string(), wins);
    projections.insert("sv".to_string(), sv);
    projections.insert("sa".to_string(), sa);
    projections.insert("ga".to_string(), ga);
    projections.insert("svpct".to_string(), sv / sa);
    Player::new(name, team, vec![Position::Goalie], projections)
}

/// A twelve-player roster spanning every slot type, split across two teams.
fn full_roster() -> Vec<Player> {
    vec![
        skater("Center One", "BOS", vec![Position::Center], 1.2),
        skater("Center Two", "BOS", vec![Position::Center], 1.0),
        skater("Wing One", "BOS", vec![Position::LeftWing], 0.9),
        skater("Wing Two", "EDM", vec![Position::LeftWing, Position::RightWing], 0.8),
        skater("Wing Three", "EDM", vec![Position::RightWing], 0.7),
        skater("Dman One", "BOS", vec![Position::Defense], 0.6),
        skater("Dman Two", "BOS", vec![Position::Defense], 0.5),
        skater("Dman Three", "EDM", vec![Position::Defense], 0.5),
        skater("Dman Four", "EDM", vec![Position::Defense], 0.4),
        goalie("Goalie One", "BOS", 0.6, 28.0, 30.0, 2.0),
        goalie("Goalie Two", "EDM", 0.5, 25.0, 28.0, 3.0),
        skater("Spare Part", "BOS", vec![Position::Center, Position::RightWing], 0.3),
    ]
}

/// Seed an in-memory store with the full roster, a free agent, schedules
/// for BOS/EDM/NYR, and week 14.
fn seeded_store() -> ProjectionStore {
    let store = ProjectionStore::open(":memory:").unwrap();

    for player in full_roster() {
        store.upsert_player(&player).unwrap();
    }
    store
        .upsert_player(&skater("Hot Pickup", "NYR", vec![Position::Center], 1.5))
        .unwrap();

    let bos: HashSet<NaiveDate> = [date("2026-01-05"), date("2026-01-07"), date("2026-01-10")]
        .into_iter()
        .collect();
    let edm: HashSet<NaiveDate> = [date("2026-01-06"), date("2026-01-08"), date("2026-01-10")]
        .into_iter()
        .collect();
    let nyr: HashSet<NaiveDate> = [date("2026-01-05"), date("2026-01-08")].into_iter().collect();
    store.upsert_schedule("BOS", &bos).unwrap();
    store.upsert_schedule("EDM", &edm).unwrap();
    store.upsert_schedule("NYR", &nyr).unwrap();

    store.upsert_week(14, week_range()).unwrap();

    store
}

// ===========================================================================
// End-to-end simulation through the store
// ===========================================================================

#[test]
fn simulate_week_from_store_produces_totals_and_trace() {
    let store = seeded_store();
    let schedules = ScheduleCache::load(&store).unwrap();
    let range = store.week_dates(14).unwrap().unwrap();

    let roster = full_roster();
    let result = simulate_week(
        &roster,
        range,
        &schedules,
        &store,
        &[],
        SlotCapacities::default(),
    );

    // BOS plays Mon/Wed/Sat, EDM plays Tue/Thu/Sat: five distinct game days.
    assert_eq!(result.daily_lineups.len(), 5);
    assert!(result.totals["pts"] > 0.0);
    assert!(result.totals.contains_key("svpct"));
    assert_eq!(result.final_roster.len(), roster.len());

    // Goalie One starts every BOS game day.
    let goalie_starts = result
        .daily_lineups
        .values()
        .filter(|l| l.contains_starter("Goalie One"))
        .count();
    assert_eq!(goalie_starts, 3);
}

#[test]
fn save_percentage_is_aggregated_from_components() {
    let store = seeded_store();
    let schedules = ScheduleCache::load(&store).unwrap();

    // One day where both goalies' teams play.
    let range = DateRange::new(date("2026-01-10"), date("2026-01-10"));
    let result = simulate_week(
        &full_roster(),
        range,
        &schedules,
        &store,
        &[],
        SlotCapacities::default(),
    );

    // (28 + 25) saves over (30 + 28) shots, not the average of the two
    // individual percentages.
    assert!((result.totals["svpct"] - 0.914).abs() < 1e-9);
    // (2 + 3) goals against over 2 starts.
    assert!((result.totals["ga"] - 2.5).abs() < 1e-9);
}

#[test]
fn transaction_replay_swaps_roster_mid_week() {
    let store = seeded_store();
    let schedules = ScheduleCache::load(&store).unwrap();
    let range = store.week_dates(14).unwrap().unwrap();

    let transactions = vec![Transaction {
        date: date("2026-01-08"),
        drop: "Spare Part".to_string(),
        add: "Hot Pickup".to_string(),
    }];

    let result = simulate_week(
        &full_roster(),
        range,
        &schedules,
        &store,
        &transactions,
        SlotCapacities::default(),
    );

    let names: Vec<&str> = result.final_roster.iter().map(|p| p.name.as_str()).collect();
    assert!(!names.contains(&"Spare Part"));
    assert!(names.contains(&"Hot Pickup"));

    // NYR plays Jan 8, after the add takes effect, so the pickup starts.
    assert!(result.daily_lineups[&date("2026-01-08")].contains_starter("Hot Pickup"));
    // Before the transaction date the pickup is not on the roster.
    assert!(!result.daily_lineups[&date("2026-01-05")].contains_starter("Hot Pickup"));
}

#[test]
fn simulation_is_deterministic_across_runs() {
    let store = seeded_store();
    let schedules = ScheduleCache::load(&store).unwrap();
    let range = store.week_dates(14).unwrap().unwrap();

    let run = || {
        let result = simulate_week(
            &full_roster(),
            range,
            &schedules,
            &store,
            &[],
            SlotCapacities::default(),
        );
        serde_json::to_string(&result).unwrap()
    };

    assert_eq!(run(), run());
}

// ===========================================================================
// Weights feed back into the optimizer
// ===========================================================================

#[test]
fn derived_weights_emphasize_trailing_categories() {
    let categories: Vec<String> = vec!["g".into(), "a".into(), "ga".into()];

    let mut mine = BTreeMap::new();
    mine.insert("g".to_string(), 10.0);
    mine.insert("a".to_string(), 20.0);
    mine.insert("ga".to_string(), 14.0);
    let mut theirs = BTreeMap::new();
    theirs.insert("g".to_string(), 15.0);
    theirs.insert("a".to_string(), 18.0);
    theirs.insert("ga".to_string(), 12.0);

    let weights = derive_weights(&mine, &theirs, &categories);

    // Trailing goals by 5 -> maximum urgency.
    assert_eq!(weights.get("g"), Some(3.0));
    // Leading assists comfortably -> minimum urgency.
    assert_eq!(weights.get("a"), Some(0.5));
    // Allowing 2 more goals than the opponent: inverse category, so the
    // gap counts against us.
    assert_eq!(weights.get("ga"), Some(2.0));
}

#[test]
fn weights_change_who_cracks_the_lineup() {
    let caps = SlotCapacities::new(1, 0, 0, 0, 0);
    let scorer = skater("Scorer", "BOS", vec![Position::Center], 1.0);
    let mut grinder = skater("Grinder", "BOS", vec![Position::Center], 0.4);
    grinder.projections.insert("hit".to_string(), 3.0);

    let pool = vec![scorer, grinder];

    let pts_weights: CategoryWeights = [("pts".to_string(), 1.0)].into_iter().collect();
    let hit_weights: CategoryWeights = [("hit".to_string(), 3.0)].into_iter().collect();

    let by_pts = bench_coach::lineup::optimize_day(&pool, &pts_weights, caps);
    let by_hits = bench_coach::lineup::optimize_day(&pool, &hit_weights, caps);

    assert!(by_pts.contains_starter("Scorer"));
    assert!(by_hits.contains_starter("Grinder"));
}

// ===========================================================================
// Utilization and pickups on a real trace
// ===========================================================================

#[test]
fn utilization_report_tracks_starts_and_open_slots() {
    let store = seeded_store();
    let schedules = ScheduleCache::load(&store).unwrap();
    let range = store.week_dates(14).unwrap().unwrap();
    let caps = SlotCapacities::default();

    let roster = full_roster();
    let result = simulate_week(&roster, range, &schedules, &store, &[], caps);
    let report = utilization_report(&roster, range, &result.daily_lineups, caps);

    assert_eq!(report.players.len(), roster.len());
    // Every date in the week appears, including the two idle days.
    assert_eq!(report.open_slots.len(), 7);

    // Center One plays every BOS game day.
    let top_center = report
        .players
        .iter()
        .find(|p| p.name == "Center One")
        .unwrap();
    assert_eq!(top_center.starts, 3);

    // On an idle day the full slot structure is open.
    let idle = &report.open_slots[&date("2026-01-09")];
    assert_eq!(idle.get("C"), Some(&2));
    assert_eq!(idle.get("G"), Some(&2));

    // On a BOS-only day the EDM defensemen are absent, leaving D slots open.
    let bos_day = &report.open_slots[&date("2026-01-05")];
    assert_eq!(bos_day.get("D"), Some(&2));
}

#[test]
fn pickup_ranking_finds_the_free_agent_upgrade() {
    let store = seeded_store();
    let schedules = ScheduleCache::load(&store).unwrap();
    let range = store.week_dates(14).unwrap().unwrap();
    let caps = SlotCapacities::default();
    let weights: CategoryWeights = [("pts".to_string(), 1.0)].into_iter().collect();

    let roster = full_roster();
    let baseline = simulate_week(&roster, range, &schedules, &store, &[], caps);

    let pickup = store.player("Hot Pickup").unwrap().unwrap();
    let ranked = rank_pickups(
        &[pickup],
        &baseline.daily_lineups,
        range,
        &schedules,
        &weights,
        caps,
    );

    // NYR plays twice during the week and the pickup out-scores both
    // incumbent centers.
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].player.name, "Hot Pickup");
    assert_eq!(ranked[0].start_dates, vec![date("2026-01-05"), date("2026-01-08")]);
    assert!((ranked[0].impact - 3.0).abs() < 1e-9);
}

#[test]
fn drop_suggestion_targets_the_unused_skater() {
    let store = seeded_store();
    let schedules = ScheduleCache::load(&store).unwrap();
    let range = store.week_dates(14).unwrap().unwrap();
    let caps = SlotCapacities::default();
    let weights: CategoryWeights = [("pts".to_string(), 1.0)].into_iter().collect();

    let roster = full_roster();
    let result = simulate_week(&roster, range, &schedules, &store, &[], caps);

    let drop = suggest_drop(&roster, &weights, &result.daily_lineups).unwrap();
    assert_eq!(drop.name, "Spare Part");
}
