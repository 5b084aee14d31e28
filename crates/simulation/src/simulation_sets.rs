//! Deterministic tick ordering via `SystemSet` phases.
//!
//! Every system in `FixedUpdate` belongs to one of these sets, so ordering
//! between plugins is explicit rather than left to the scheduler.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – Tick counters, pending level reloads, switch toggles. Sets
//!   up the layout and switch state the rest of the tick reads.
//! * **Simulation** – Train movement, stops, switching, collision detection
//!   and spawning.
//! * **PostSim** – Scoring, progression, departures and the layout audit.
//!   Progression may request a reload, which the next tick's PreSim applies.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Configured as a chain: `PreSim` → `Simulation` → `PostSim`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Tick counters, level reloads, switch toggles.
    PreSim,
    /// Movement, stops, switching, collisions, spawning.
    Simulation,
    /// Scoring, progression, departures, audits.
    PostSim,
}
