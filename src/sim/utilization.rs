// Roster utilization: who actually starts across a simulated week, and
// which slots go unused each day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lineup::{DailyLineup, SlotCapacities};
use crate::roster::position::{Position, SKATER_SLOTS};
use crate::roster::Player;
use crate::sim::engine::DateRange;

/// One roster player's projected usage over the simulated range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerUtilization {
    pub name: String,
    pub starts: usize,
    pub start_dates: Vec<NaiveDate>,
}

/// Per-day open slot counts plus per-player start counts for one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationReport {
    /// One entry per roster player, in roster order.
    pub players: Vec<PlayerUtilization>,
    /// For each day, slot code -> slots left open by the optimal lineup.
    pub open_slots: BTreeMap<NaiveDate, BTreeMap<String, u8>>,
}

/// Summarize a lineup trace: how often each roster player cracks the
/// optimal lineup, and how many slots stay open day by day.
///
/// Days with no trace entry (no roster player had a game) report the full
/// slot structure as open.
pub fn utilization_report(
    roster: &[Player],
    range: DateRange,
    trace: &BTreeMap<NaiveDate, DailyLineup>,
    capacities: SlotCapacities,
) -> UtilizationReport {
    let mut players: Vec<PlayerUtilization> = roster
        .iter()
        .map(|p| PlayerUtilization {
            name: p.name.clone(),
            starts: 0,
            start_dates: Vec::new(),
        })
        .collect();

    let mut open_slots = BTreeMap::new();

    for day in range.days() {
        let mut open: BTreeMap<String, u8> = SKATER_SLOTS
            .iter()
            .chain(std::iter::once(&Position::Goalie))
            .map(|slot| (slot.display_str().to_string(), capacities.capacity(*slot)))
            .collect();

        if let Some(lineup) = trace.get(&day) {
            for placed in &lineup.starters {
                if let Some(entry) = players
                    .iter_mut()
                    .find(|u| u.name == placed.player.name)
                {
                    entry.starts += 1;
                    entry.start_dates.push(day);
                }
                if let Some(count) = open.get_mut(placed.slot.display_str()) {
                    *count = count.saturating_sub(1);
                }
            }
        }

        open_slots.insert(day, open);
    }

    UtilizationReport {
        players,
        open_slots,
    }
}
