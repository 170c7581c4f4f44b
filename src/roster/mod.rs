// Roster data model: positions and players.

pub mod player;
pub mod position;

pub use player::Player;
pub use position::Position;
