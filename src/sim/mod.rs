// Weekly simulation: collaborator interfaces, the day-by-day engine,
// totals accumulation, and reporting built on the lineup trace.

pub mod engine;
pub mod pickups;
pub mod totals;
pub mod utilization;

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::roster::Player;

pub use engine::{simulate_week, DateRange, SimulationResult, Transaction};
pub use pickups::{rank_pickups, suggest_drop, PickupCandidate};
pub use totals::SeasonTotals;
pub use utilization::{utilization_report, PlayerUtilization, UtilizationReport};

/// Source of per-game projections, used to resolve the "add" half of a
/// roster transaction. A name that cannot be resolved makes the add a
/// no-op; the engine never treats it as an error.
pub trait ProjectionSource {
    fn lookup_player(&self, name: &str) -> Option<Player>;
}

/// Source of team schedules: the set of dates a team plays. A player whose
/// team has no game on a date is excluded from that day's optimization
/// entirely, not benched.
pub trait ScheduleSource {
    fn play_dates(&self, team: &str) -> Option<&HashSet<NaiveDate>>;
}

impl ProjectionSource for HashMap<String, Player> {
    fn lookup_player(&self, name: &str) -> Option<Player> {
        self.get(name).cloned()
    }
}

impl ScheduleSource for HashMap<String, HashSet<NaiveDate>> {
    fn play_dates(&self, team: &str) -> Option<&HashSet<NaiveDate>> {
        self.get(team)
    }
}
