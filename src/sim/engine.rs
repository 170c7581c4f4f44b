// Day-by-day weekly simulation with transaction replay.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::lineup::{optimize_day, CategoryWeights, DailyLineup, SlotCapacities};
use crate::roster::Player;
use crate::sim::totals::SeasonTotals;
use crate::sim::{ProjectionSource, ScheduleSource};

/// A scheduled roster change: drop one named player and add another,
/// effective on `date`. Transactions sharing a date apply in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub drop: String,
    pub add: String,
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Iterate every date from start to end inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Everything a simulation run produces: finalized totals, the per-day
/// lineup trace, and the roster as it stands after all transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub totals: BTreeMap<String, f64>,
    pub daily_lineups: BTreeMap<NaiveDate, DailyLineup>,
    pub final_roster: Vec<Player>,
}

/// Simulate a date range under optimal daily lineup choices.
///
/// Each day, in order: apply that day's transactions (a drop always
/// applies; an add that the projection source cannot resolve is skipped
/// with a warning), compute the active set from the schedule source, run
/// the daily optimizer with an empty weight vector, and accumulate every
/// placed player's projections into the season totals.
///
/// Days are solved independently; the only state carried across the loop
/// is the simulated roster and the accumulators. Given identical inputs
/// the result is bit-identical run to run.
pub fn simulate_week<S, P>(
    roster: &[Player],
    range: DateRange,
    schedules: &S,
    projections: &P,
    transactions: &[Transaction],
    capacities: SlotCapacities,
) -> SimulationResult
where
    S: ScheduleSource,
    P: ProjectionSource,
{
    let mut simulated_roster: Vec<Player> = roster.to_vec();

    // Stable sort: transactions on the same date keep their list order.
    let mut pending: Vec<Transaction> = transactions.to_vec();
    pending.sort_by_key(|t| t.date);
    let mut next_txn = 0;

    let mut totals = SeasonTotals::new();
    let mut daily_lineups: BTreeMap<NaiveDate, DailyLineup> = BTreeMap::new();
    let weights = CategoryWeights::empty();

    for current_date in range.days() {
        while next_txn < pending.len() && pending[next_txn].date == current_date {
            let txn = &pending[next_txn];
            simulated_roster.retain(|p| p.name != txn.drop);
            match projections.lookup_player(&txn.add) {
                Some(added) => {
                    debug!(date = %current_date, drop = %txn.drop, add = %txn.add, "applied transaction");
                    simulated_roster.push(added);
                }
                None => {
                    warn!(date = %current_date, add = %txn.add, "transaction add not found in projections, skipping add");
                }
            }
            next_txn += 1;
        }

        let active_today: Vec<Player> = simulated_roster
            .iter()
            .filter(|p| {
                schedules
                    .play_dates(&p.team)
                    .is_some_and(|dates| dates.contains(&current_date))
            })
            .cloned()
            .collect();

        if active_today.is_empty() {
            continue;
        }

        let lineup = optimize_day(&active_today, &weights, capacities);
        for placed in &lineup.starters {
            totals.record_start(&placed.player);
        }
        daily_lineups.insert(current_date, lineup);
    }

    SimulationResult {
        totals: totals.finalize(),
        daily_lineups,
        final_roster: simulated_roster,
    }
}
