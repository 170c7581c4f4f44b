// Season totals accumulation.
//
// Counting stats sum directly. Goalie rate stats must never be averaged
// per-game: save percentage is finalized from summed saves over summed
// shots against, and goals-against average from summed goals against over
// the number of starts.

use std::collections::{BTreeMap, HashMap};

use crate::roster::Player;

/// Derived rate stat: saves / shots against across all goalie starts.
pub const SAVE_PCT: &str = "svpct";
/// Derived rate stat: goals against per goalie start.
pub const GOALS_AGAINST_AVG: &str = "ga";

const SAVES: &str = "sv";
const SHOTS_AGAINST: &str = "sa";

/// Accumulator for one simulation run.
///
/// Created empty, fed one call per placed player per simulated day, then
/// consumed by `finalize()`. Nothing outside the simulation engine should
/// mutate it.
#[derive(Debug, Clone, Default)]
pub struct SeasonTotals {
    counting: HashMap<String, f64>,
    saves: f64,
    shots_against: f64,
    goals_against: f64,
    goalie_starts: u32,
}

impl SeasonTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goalie_starts(&self) -> u32 {
        self.goalie_starts
    }

    /// Accumulate one placed player's per-game projections.
    ///
    /// For goalies, the save-percentage and goals-against projections are
    /// withheld from plain summing; their raw components (saves, shots
    /// against, goals against) feed the numerator/denominator accumulators
    /// instead.
    pub fn record_start(&mut self, player: &Player) {
        let is_goalie = player.is_goalie();
        for (stat, value) in &player.projections {
            if !value.is_finite() {
                continue;
            }
            if is_goalie && (stat == SAVE_PCT || stat == GOALS_AGAINST_AVG) {
                continue;
            }
            *self.counting.entry(stat.clone()).or_insert(0.0) += value;
        }
        if is_goalie {
            self.saves += player.stat(SAVES);
            self.shots_against += player.stat(SHOTS_AGAINST);
            self.goals_against += player.stat(GOALS_AGAINST_AVG);
            self.goalie_starts += 1;
        }
    }

    /// Derive rate stats and round everything to display precision:
    /// three decimals for save percentage, two for everything else.
    /// Rate stats are zero when no goalie starts occurred.
    pub fn finalize(self) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = self
            .counting
            .into_iter()
            .map(|(stat, value)| (stat.clone(), round_to(value, 2)))
            .collect();

        let svpct = if self.shots_against > 0.0 {
            self.saves / self.shots_against
        } else {
            0.0
        };
        let gaa = if self.goalie_starts > 0 {
            self.goals_against / self.goalie_starts as f64
        } else {
            0.0
        };
        totals.insert(SAVE_PCT.to_string(), round_to(svpct, 3));
        totals.insert(GOALS_AGAINST_AVG.to_string(), round_to(gaa, 2));

        totals
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
