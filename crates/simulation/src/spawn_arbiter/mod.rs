//! Spawn admission control.
//!
//! Decides per tick whether a new train may enter a track, using
//! time-to-collision against the preceding train and the reachability of the
//! track's switches. Stateless: every call reads the [`crate::layout::Layout`]
//! and a snapshot of the live trains.

mod decision;
mod tests;
mod types;

pub use decision::{
    choose_spawn, decide_spawn, global_admission_gate, passes_timing_check, preceding_train,
    required_gap,
};
pub use types::{DenyReason, SpawnDecision, TrainSnapshot};
