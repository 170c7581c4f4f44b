// Hockey position codes and slot ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hockey positions used for lineup slot assignment.
///
/// `InjuredReserve` and `InjuredReserveLong` are roster markers, not playing
/// slots: a player carrying either is never eligible for lineup placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Center,
    LeftWing,
    RightWing,
    Defense,
    Goalie,
    Bench,
    InjuredReserve,
    InjuredReserveLong,
}

/// Skater slot categories in the fixed iteration order used by the
/// optimizer. The order is load-bearing for tie-breaking: when two
/// placements score equally, the slot examined first wins.
pub const SKATER_SLOTS: [Position; 4] = [
    Position::Center,
    Position::LeftWing,
    Position::RightWing,
    Position::Defense,
];

impl Position {
    /// Parse a Yahoo-style position string into a Position enum.
    ///
    /// - "C" -> Center, "LW" -> LeftWing, "RW" -> RightWing, "D" -> Defense
    /// - "G" -> Goalie, "BN" -> Bench
    /// - "IR" -> InjuredReserve, "IR+" -> InjuredReserveLong
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(Position::Center),
            "LW" => Some(Position::LeftWing),
            "RW" => Some(Position::RightWing),
            "D" => Some(Position::Defense),
            "G" => Some(Position::Goalie),
            "BN" | "BE" => Some(Position::Bench),
            "IR" => Some(Position::InjuredReserve),
            "IR+" => Some(Position::InjuredReserveLong),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::LeftWing => "LW",
            Position::RightWing => "RW",
            Position::Defense => "D",
            Position::Goalie => "G",
            Position::Bench => "BN",
            Position::InjuredReserve => "IR",
            Position::InjuredReserveLong => "IR+",
        }
    }

    /// Whether this is one of the four skater slot categories.
    pub fn is_skater_slot(&self) -> bool {
        SKATER_SLOTS.contains(self)
    }

    /// Whether this is an injured-reserve marker.
    pub fn is_injured_reserve(&self) -> bool {
        matches!(
            self,
            Position::InjuredReserve | Position::InjuredReserveLong
        )
    }

    /// Index of this position within `SKATER_SLOTS`, or None for G/BN/IR.
    pub fn skater_slot_index(&self) -> Option<usize> {
        SKATER_SLOTS.iter().position(|s| s == self)
    }

    /// Deterministic ordering index for lineup display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Center => 0,
            Position::LeftWing => 1,
            Position::RightWing => 2,
            Position::Defense => 3,
            Position::Goalie => 4,
            Position::Bench => 5,
            Position::InjuredReserve => 6,
            Position::InjuredReserveLong => 7,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Parse a comma-separated eligibility string (e.g. "C, LW" or "G, IR")
/// into positions, skipping unrecognized codes.
pub fn parse_eligibility(s: &str) -> Vec<Position> {
    s.split(',').filter_map(Position::from_str_pos).collect()
}
