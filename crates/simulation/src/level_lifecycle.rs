//! Level (re)loading.
//!
//! A level is loaded at startup, whenever the score crosses a tier threshold,
//! and on restart. Loading discards every train, regenerates the [`Layout`]
//! for the current score and resets the switch board and spawn clock.

use bevy::prelude::*;

use crate::config_error::ConfigurationError;
use crate::layout::{generate_layout, Layout};
use crate::level_policy::{level_spec, Tier};
use crate::rail_params::RailParams;
use crate::sim_rng::SimRng;
use crate::trains::{RailSession, SpawnClock, SwitchBoard, Train};
use crate::SimulationSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    Startup,
    /// The score crossed a tier threshold.
    TierUp,
    /// Start over from zero points.
    Restart,
}

/// Request a new layout. Handled at the start of the next tick.
#[derive(Event, Debug, Clone)]
pub struct LevelReload {
    pub reason: ReloadReason,
}

#[derive(Event, Debug, Clone)]
pub struct LevelLoaded {
    pub reason: ReloadReason,
    pub tier: Tier,
    pub tracks: usize,
    pub connections: usize,
    pub stops: usize,
}

/// Generate the layout for `score`. Rejected parameters abort before any
/// randomness is drawn.
pub fn build_level(
    score: u32,
    params: &RailParams,
    rng: &mut SimRng,
) -> Result<(Tier, Layout), ConfigurationError> {
    params.validate()?;
    let spec = level_spec(score, &params.progression);
    let layout = generate_layout(&spec, &params.layout, &mut rng.level_stream())?;
    Ok((spec.tier, layout))
}

fn install_level(
    reason: ReloadReason,
    params: &RailParams,
    rng: &mut SimRng,
    session: &mut RailSession,
    layout: &mut Layout,
    board: &mut SwitchBoard,
    clock: &mut SpawnClock,
) -> Option<LevelLoaded> {
    let (tier, generated) = match build_level(session.score, params, rng) {
        Ok(level) => level,
        Err(e) => {
            error!("Level load ({:?}) failed: {e}", reason);
            return None;
        }
    };
    *layout = generated;
    session.tier = tier;
    session.requested_tier = tier;
    session.apply_score(&params.progression);
    board.clear();
    clock.reset();

    info!(
        "Loaded {} level: {} tracks, {} switches, {} stops",
        tier.label(),
        layout.tracks().len(),
        layout.connections().len(),
        layout.stops().len()
    );
    Some(LevelLoaded {
        reason,
        tier,
        tracks: layout.tracks().len(),
        connections: layout.connections().len(),
        stops: layout.stops().len(),
    })
}

pub fn init_level(
    params: Res<RailParams>,
    mut rng: ResMut<SimRng>,
    mut session: ResMut<RailSession>,
    mut layout: ResMut<Layout>,
    mut board: ResMut<SwitchBoard>,
    mut clock: ResMut<SpawnClock>,
    mut loaded: EventWriter<LevelLoaded>,
) {
    if let Some(event) = install_level(
        ReloadReason::Startup,
        &params,
        &mut rng,
        &mut session,
        &mut layout,
        &mut board,
        &mut clock,
    ) {
        loaded.send(event);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn reload_level(
    mut commands: Commands,
    mut requests: EventReader<LevelReload>,
    trains: Query<Entity, With<Train>>,
    params: Res<RailParams>,
    mut rng: ResMut<SimRng>,
    mut session: ResMut<RailSession>,
    mut layout: ResMut<Layout>,
    mut board: ResMut<SwitchBoard>,
    mut clock: ResMut<SpawnClock>,
    mut loaded: EventWriter<LevelLoaded>,
) {
    let Some(reason) = requests.read().last().map(|r| r.reason) else {
        return;
    };
    if reason == ReloadReason::Restart {
        session.reset(&params.progression);
    }
    for entity in &trains {
        commands.entity(entity).despawn();
    }
    if let Some(event) = install_level(
        reason,
        &params,
        &mut rng,
        &mut session,
        &mut layout,
        &mut board,
        &mut clock,
    ) {
        loaded.send(event);
    }
}

pub struct LevelLifecyclePlugin;

impl Plugin for LevelLifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LevelReload>()
            .add_event::<LevelLoaded>()
            .add_systems(Startup, init_level)
            .add_systems(FixedUpdate, reload_level.in_set(SimulationSet::PreSim));
    }
}
