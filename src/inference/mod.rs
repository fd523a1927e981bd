//! Inference: local search for good models and sampling of models.

mod maxwalksat;
mod mcsat;
mod moves;

pub use maxwalksat::{MaxWalkSat, MaxWalkSatConfig, SearchOutcome};
pub use mcsat::{McSat, McSatConfig, DEFAULT_NUM_SAMPLES};
pub use moves::{can_find_moves_for, execute_move, find_moves_for, Move};
