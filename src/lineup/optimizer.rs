// Daily lineup optimization.
//
// Skater assignment is an exact memoized search over (player index,
// remaining-capacity vector) states — a multi-category bounded knapsack.
// Goalie selection is deliberately simpler: the two goalies with the best
// projected wins start, regardless of the weight vector. The two halves are
// not jointly optimized; existing callers rely on that exact behavior.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::lineup::weights::{marginal_value, CategoryWeights};
use crate::roster::position::{Position, SKATER_SLOTS};
use crate::roster::Player;

// ---------------------------------------------------------------------------
// Slot capacities
// ---------------------------------------------------------------------------

/// Fixed slot capacities for one deployment: one count per skater slot
/// category (in `SKATER_SLOTS` order) plus the goalie count.
///
/// `Copy` by design: each branch of the search gets its own capacity value,
/// so no branch can alias another's remaining counts. The skater portion
/// keys the search memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotCapacities {
    skaters: [u8; 4],
    goalies: u8,
}

impl SlotCapacities {
    pub fn new(centers: u8, left_wings: u8, right_wings: u8, defense: u8, goalies: u8) -> Self {
        SlotCapacities {
            skaters: [centers, left_wings, right_wings, defense],
            goalies,
        }
    }

    /// Build capacities from a config map of position code to slot count
    /// (e.g. `{"C": 2, "LW": 2, "RW": 2, "D": 4, "G": 2}`). Missing codes
    /// fall back to the standard Yahoo head-to-head structure.
    pub fn from_config(slots: &HashMap<String, usize>) -> Self {
        let count = |code: &str, default: u8| -> u8 {
            slots.get(code).map(|&n| n as u8).unwrap_or(default)
        };
        SlotCapacities::new(
            count("C", 2),
            count("LW", 2),
            count("RW", 2),
            count("D", 4),
            count("G", 2),
        )
    }

    /// Capacity of a single slot category. Zero for bench/IR markers.
    pub fn capacity(&self, slot: Position) -> u8 {
        match slot.skater_slot_index() {
            Some(i) => self.skaters[i],
            None if slot == Position::Goalie => self.goalies,
            None => 0,
        }
    }

    pub fn goalie_slots(&self) -> u8 {
        self.goalies
    }

    fn skater_caps(&self) -> [u8; 4] {
        self.skaters
    }
}

impl Default for SlotCapacities {
    fn default() -> Self {
        SlotCapacities::new(2, 2, 2, 4, 2)
    }
}

// ---------------------------------------------------------------------------
// Lineup output
// ---------------------------------------------------------------------------

/// A player assigned to a lineup slot for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedPlayer {
    pub player: Player,
    pub slot: Position,
}

/// The optimizer's output for one day: placed players plus the bench
/// (skipped skaters, excess goalies, IR players).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyLineup {
    pub starters: Vec<PlacedPlayer>,
    pub bench: Vec<Player>,
}

impl DailyLineup {
    pub fn contains_starter(&self, name: &str) -> bool {
        self.starters.iter().any(|p| p.player.name == name)
    }

    pub fn starter_names(&self) -> HashSet<&str> {
        self.starters.iter().map(|p| p.player.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Skater solver
// ---------------------------------------------------------------------------

/// A skater prepared for the search: precomputed marginal value and the
/// indices of the slot categories they can occupy.
struct ScoredSkater<'a> {
    player: &'a Player,
    value: f64,
    eligible: Vec<usize>,
}

/// Memoized exact search over skater placements.
///
/// The memo lives inside one solver, which lives inside one `optimize_day`
/// call: marginal values depend on the weight vector, so cached results are
/// never valid across invocations.
struct SkaterSolver<'a> {
    skaters: &'a [ScoredSkater<'a>],
    memo: HashMap<(usize, [u8; 4]), (f64, Vec<(usize, usize)>)>,
}

impl<'a> SkaterSolver<'a> {
    fn new(skaters: &'a [ScoredSkater<'a>]) -> Self {
        SkaterSolver {
            skaters,
            memo: HashMap::new(),
        }
    }

    /// Best achievable (score, placements) from `index` onward with the
    /// given remaining capacities. Placements are (skater index, slot index)
    /// pairs.
    fn solve(&mut self, index: usize, caps: [u8; 4]) -> (f64, Vec<(usize, usize)>) {
        if index == self.skaters.len() {
            return (0.0, Vec::new());
        }
        if let Some(hit) = self.memo.get(&(index, caps)) {
            return hit.clone();
        }

        // Path 1: skip this skater.
        let (mut best_score, mut best_path) = self.solve(index + 1, caps);

        // Path 2: place them in each eligible slot with remaining capacity.
        // Strictly-greater comparison: on a tie the first examined placement
        // (fixed C, LW, RW, D order) wins, keeping output deterministic.
        let eligible = self.skaters[index].eligible.clone();
        let value = self.skaters[index].value;
        for slot_idx in eligible {
            if caps[slot_idx] == 0 {
                continue;
            }
            let mut next = caps;
            next[slot_idx] -= 1;
            let (path_score, path) = self.solve(index + 1, next);
            let score = value + path_score;
            if score > best_score {
                best_score = score;
                best_path = Vec::with_capacity(path.len() + 1);
                best_path.push((index, slot_idx));
                best_path.extend(path);
            }
        }

        self.memo.insert((index, caps), (best_score, best_path.clone()));
        (best_score, best_path)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Compute the value-maximizing legal lineup for one day.
///
/// Partitions `active_players` into IR (always benched, never scored),
/// goalies, and skaters; places the top two goalies by projected wins; and
/// solves skater slot assignment exactly under `capacities`. An empty
/// weight vector falls back to raw projected points as the value function.
///
/// Never fails: any input, including an empty slice or an all-IR roster,
/// produces a valid (possibly empty) lineup.
pub fn optimize_day(
    active_players: &[Player],
    weights: &CategoryWeights,
    capacities: SlotCapacities,
) -> DailyLineup {
    let (ir_players, eligible): (Vec<&Player>, Vec<&Player>) = active_players
        .iter()
        .partition(|p| p.on_injured_reserve());

    let (goalies, skaters): (Vec<&Player>, Vec<&Player>) =
        eligible.into_iter().partition(|p| p.is_goalie());

    // Goalies: top N by projected wins. Stable sort keeps input order on ties.
    let mut goalies = goalies;
    goalies.sort_by(|a, b| {
        b.stat("w")
            .partial_cmp(&a.stat("w"))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let goalie_cap = capacities.goalie_slots() as usize;
    let (starting_goalies, benched_goalies) =
        goalies.split_at(goalie_cap.min(goalies.len()));

    // Skaters: score, sort descending by marginal value, then search.
    let mut scored: Vec<ScoredSkater> = skaters
        .iter()
        .map(|p| ScoredSkater {
            player: p,
            value: marginal_value(p, weights),
            eligible: p
                .skater_slots()
                .iter()
                .filter_map(|s| s.skater_slot_index())
                .collect(),
        })
        .collect();
    scored.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut solver = SkaterSolver::new(&scored);
    let (_, placements) = solver.solve(0, capacities.skater_caps());

    let placed_indices: HashSet<usize> = placements.iter().map(|&(i, _)| i).collect();

    let mut starters: Vec<PlacedPlayer> = placements
        .into_iter()
        .map(|(i, slot_idx)| PlacedPlayer {
            player: scored[i].player.clone(),
            slot: SKATER_SLOTS[slot_idx],
        })
        .collect();
    starters.extend(starting_goalies.iter().map(|g| PlacedPlayer {
        player: (*g).clone(),
        slot: Position::Goalie,
    }));

    let mut bench: Vec<Player> = scored
        .iter()
        .enumerate()
        .filter(|(i, _)| !placed_indices.contains(i))
        .map(|(_, s)| s.player.clone())
        .collect();
    bench.extend(benched_goalies.iter().map(|g| (*g).clone()));
    bench.extend(ir_players.iter().map(|p| (*p).clone()));

    debug_assert!(
        {
            let placed: HashSet<&str> = starters.iter().map(|p| p.player.name.as_str()).collect();
            bench.iter().all(|p| !placed.contains(p.name.as_str()))
        },
        "player placed and benched simultaneously"
    );

    DailyLineup { starters, bench }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
