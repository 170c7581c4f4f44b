// Waiver-wire helpers: which roster player to cut, and which free agents
// would actually crack the lineup if added.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lineup::weights::weighted_value;
use crate::lineup::{optimize_day, CategoryWeights, DailyLineup, SlotCapacities};
use crate::roster::Player;
use crate::sim::engine::DateRange;
use crate::sim::ScheduleSource;

/// A free agent ranked by projected lineup impact over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupCandidate {
    pub player: Player,
    /// Summed weighted value over the days the candidate cracks the lineup.
    pub impact: f64,
    /// Days the candidate would displace an incumbent starter.
    pub start_dates: Vec<NaiveDate>,
}

/// Pick the weakest droppable roster player.
///
/// Goalies and injured-reserve players are never suggested. Weakness is
/// weighted per-game value scaled by how many starts the trace actually
/// gives the player, so a strong skater who never cracks the lineup still
/// rates as expendable. Ties keep the first player in roster order.
pub fn suggest_drop(
    roster: &[Player],
    weights: &CategoryWeights,
    trace: &BTreeMap<NaiveDate, DailyLineup>,
) -> Option<Player> {
    roster
        .iter()
        .filter(|p| !p.is_goalie() && !p.on_injured_reserve())
        .map(|p| {
            let starts = trace
                .values()
                .filter(|lineup| lineup.contains_starter(&p.name))
                .count();
            (p, weighted_value(p, weights) * starts as f64)
        })
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(p, _)| p.clone())
}

/// Rank free agents by how much weighted value each would add if picked up.
///
/// For every day in the range the candidate's team plays, the day's traced
/// starters plus the candidate are re-optimized; if the candidate earns a
/// slot, their weighted value counts toward the impact. Candidates that
/// never crack a lineup are omitted. The result is sorted by impact,
/// highest first, ties keeping input order.
pub fn rank_pickups<S>(
    free_agents: &[Player],
    trace: &BTreeMap<NaiveDate, DailyLineup>,
    range: DateRange,
    schedules: &S,
    weights: &CategoryWeights,
    capacities: SlotCapacities,
) -> Vec<PickupCandidate>
where
    S: ScheduleSource,
{
    let mut candidates = Vec::new();

    for agent in free_agents {
        let Some(play_dates) = schedules.play_dates(&agent.team) else {
            continue;
        };

        let mut impact = 0.0;
        let mut start_dates = Vec::new();

        for day in range.days() {
            if !play_dates.contains(&day) {
                continue;
            }
            let mut pool: Vec<Player> = trace
                .get(&day)
                .map(|lineup| lineup.starters.iter().map(|p| p.player.clone()).collect())
                .unwrap_or_default();
            pool.push(agent.clone());

            let lineup = optimize_day(&pool, weights, capacities);
            if lineup.contains_starter(&agent.name) {
                impact += weighted_value(agent, weights);
                start_dates.push(day);
            }
        }

        if impact > 0.0 {
            debug!(player = %agent.name, impact, "pickup candidate cracks lineup");
            candidates.push(PickupCandidate {
                player: agent.clone(),
                impact,
                start_dates,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.impact
            .partial_cmp(&a.impact)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Position;
    use std::collections::{HashMap, HashSet};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn skater(name: &str, team: &str, pts: f64) -> Player {
        let mut projections = BTreeMap::new();
        projections.insert("pts".to_string(), pts);
        Player::new(name, team, vec![Position::Center], projections)
    }

    fn goalie(name: &str, wins: f64) -> Player {
        let mut projections = BTreeMap::new();
        projections.insert("w".to_string(), wins);
        Player::new(name, "BOS", vec![Position::Goalie], projections)
    }

    fn pts_weights() -> CategoryWeights {
        [("pts".to_string(), 1.0)].into_iter().collect()
    }

    #[test]
    fn suggest_drop_picks_weakest_skater() {
        let roster = vec![
            skater("Star", "BOS", 3.0),
            skater("Plug", "BOS", 0.5),
            goalie("Tendy", 0.9),
        ];
        let caps = SlotCapacities::default();
        let mut trace = BTreeMap::new();
        trace.insert(
            date("2026-01-05"),
            optimize_day(&roster, &pts_weights(), caps),
        );

        let drop = suggest_drop(&roster, &pts_weights(), &trace).unwrap();
        assert_eq!(drop.name, "Plug");
    }

    #[test]
    fn suggest_drop_never_picks_goalie_or_injured() {
        let mut hurt = skater("Hurt", "BOS", 0.1);
        hurt.positions.push(Position::InjuredReserve);
        let roster = vec![skater("Only", "BOS", 2.0), goalie("Tendy", 0.9), hurt];

        let drop = suggest_drop(&roster, &pts_weights(), &BTreeMap::new()).unwrap();
        assert_eq!(drop.name, "Only");
    }

    #[test]
    fn suggest_drop_prefers_benched_over_weaker_starter() {
        // A big scorer who never starts is worth 0 to this roster.
        let roster = vec![skater("Starter", "BOS", 1.0), skater("Rider", "BOS", 4.0)];
        let caps = SlotCapacities::default();
        let mut trace = BTreeMap::new();
        // Fabricate a trace where only Starter made the lineup.
        trace.insert(
            date("2026-01-05"),
            optimize_day(&roster[..1], &pts_weights(), caps),
        );

        let drop = suggest_drop(&roster, &pts_weights(), &trace).unwrap();
        assert_eq!(drop.name, "Rider");
    }

    #[test]
    fn rank_pickups_scores_only_lineup_cracking_days() {
        let roster = vec![skater("Incumbent A", "BOS", 2.0), skater("Incumbent B", "BOS", 1.5)];
        let caps = SlotCapacities::new(1, 0, 0, 0, 0);
        let range = DateRange::new(date("2026-01-05"), date("2026-01-06"));

        let mut schedules: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
        schedules.insert(
            "NYR".to_string(),
            [date("2026-01-05"), date("2026-01-06")].into_iter().collect(),
        );

        let mut trace = BTreeMap::new();
        for day in range.days() {
            trace.insert(day, optimize_day(&roster, &pts_weights(), caps));
        }

        let agents = vec![skater("Upgrade", "NYR", 3.0), skater("Downgrade", "NYR", 1.0)];
        let ranked = rank_pickups(&agents, &trace, range, &schedules, &pts_weights(), caps);

        // Only the upgrade displaces the incumbent; it does so both days.
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].player.name, "Upgrade");
        assert_eq!(ranked[0].start_dates.len(), 2);
        assert!((ranked[0].impact - 6.0).abs() < 1e-9);
    }

    #[test]
    fn rank_pickups_skips_unscheduled_teams() {
        let range = DateRange::new(date("2026-01-05"), date("2026-01-05"));
        let schedules: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
        let agents = vec![skater("Nomad", "SEA", 9.0)];

        let ranked = rank_pickups(
            &agents,
            &BTreeMap::new(),
            range,
            &schedules,
            &pts_weights(),
            SlotCapacities::default(),
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn rank_pickups_sorts_by_impact_descending() {
        let range = DateRange::new(date("2026-01-05"), date("2026-01-05"));
        let mut schedules: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
        schedules.insert(
            "NYR".to_string(),
            [date("2026-01-05")].into_iter().collect(),
        );

        // Empty trace: every scheduled agent walks into an open lineup.
        let agents = vec![skater("Good", "NYR", 2.0), skater("Better", "NYR", 5.0)];
        let ranked = rank_pickups(
            &agents,
            &BTreeMap::new(),
            range,
            &schedules,
            &pts_weights(),
            SlotCapacities::default(),
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].player.name, "Better");
        assert_eq!(ranked[1].player.name, "Good");
    }
}
