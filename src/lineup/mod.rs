// Lineup engine: category weights and the daily slot-assignment optimizer.

pub mod optimizer;
pub mod weights;

pub use optimizer::{optimize_day, DailyLineup, PlacedPlayer, SlotCapacities};
pub use weights::{derive_weights, CategoryWeights};
