// Player records: eligibility plus per-game stat projections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::position::Position;

/// A roster player: identity, NHL team, position eligibility, and per-game
/// projected stats keyed by stat code (e.g. "g", "a", "pts", "sog", "w",
/// "sv", "sa", "ga").
///
/// Rosters are supplied wholesale by the caller (typically deserialized from
/// JSON), so the whole struct is serde-visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// NHL team tricode, used for schedule lookups.
    pub team: String,
    /// Eligible positions. A skater may carry several (e.g. C and LW).
    pub positions: Vec<Position>,
    /// Per-game projections. Stats absent from the map read as 0.0.
    #[serde(default)]
    pub projections: BTreeMap<String, f64>,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        team: impl Into<String>,
        positions: Vec<Position>,
        projections: BTreeMap<String, f64>,
    ) -> Self {
        Player {
            name: name.into(),
            team: team.into(),
            positions,
            projections,
        }
    }

    /// Projected per-game value for a stat, 0.0 if absent or non-finite.
    pub fn stat(&self, code: &str) -> f64 {
        match self.projections.get(code) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    /// Whether the player carries an injured-reserve marker. IR players are
    /// always benched and never scored.
    pub fn on_injured_reserve(&self) -> bool {
        self.positions.iter().any(|p| p.is_injured_reserve())
    }

    /// Whether the player is goalie-eligible.
    pub fn is_goalie(&self) -> bool {
        self.positions.contains(&Position::Goalie)
    }

    /// The skater slot categories this player can occupy, in the fixed
    /// slot order.
    pub fn skater_slots(&self) -> Vec<Position> {
        super::position::SKATER_SLOTS
            .iter()
            .copied()
            .filter(|slot| self.positions.contains(slot))
            .collect()
    }
}
