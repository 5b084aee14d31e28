//! Query and simulation-tick methods for `TestLine`.

use bevy::ecs::event::Events;
use bevy::prelude::*;

use crate::layout::{ConnectionId, Layout, LayoutViolations};
use crate::level_lifecycle::{LevelLoaded, LevelReload, ReloadReason};
use crate::trains::{
    RailSession, SwitchBoard, ToggleSwitch, Train, TrainCollision, TrainScored,
};
use crate::SlowTickTimer;

use super::TestLine;

impl TestLine {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by directly executing the `FixedUpdate`
    /// schedule. This bypasses Bevy's time system entirely, so each tick is
    /// exactly one `SIM_TICK_MS` step.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
            std::thread::yield_now();
        }
    }

    /// Run until the SlowTickTimer fires at least once (~100 ticks).
    pub fn tick_slow_cycle(&mut self) {
        self.tick(SlowTickTimer::INTERVAL);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Queue a switch toggle; it applies at the start of the next tick.
    pub fn toggle_switch(&mut self, id: ConnectionId) {
        self.app.world_mut().send_event(ToggleSwitch { id });
    }

    pub fn request_reload(&mut self, reason: ReloadReason) {
        self.app.world_mut().send_event(LevelReload { reason });
    }

    // -----------------------------------------------------------------------
    // Queries (note: Bevy's World::query() requires &mut World)
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// All trains, sorted by track then position.
    pub fn trains(&mut self) -> Vec<Train> {
        let world = self.app.world_mut();
        let mut trains: Vec<Train> = world.query::<&Train>().iter(world).cloned().collect();
        trains.sort_by(|a, b| a.track.cmp(&b.track).then(a.x.total_cmp(&b.x)));
        trains
    }

    pub fn train_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world.query::<&Train>().iter(world).count()
    }

    pub fn session(&self) -> &RailSession {
        self.app.world().resource::<RailSession>()
    }

    pub fn layout(&self) -> &Layout {
        self.app.world().resource::<Layout>()
    }

    pub fn switch_board(&self) -> &SwitchBoard {
        self.app.world().resource::<SwitchBoard>()
    }

    pub fn violations(&self) -> &LayoutViolations {
        self.app.world().resource::<LayoutViolations>()
    }

    // -----------------------------------------------------------------------
    // Events (FixedUpdate is run by hand, so nothing clears them)
    // -----------------------------------------------------------------------

    fn events<E: Event + Clone>(&self) -> Vec<E> {
        let events = self.app.world().resource::<Events<E>>();
        events.get_cursor().read(events).cloned().collect()
    }

    pub fn collisions(&self) -> Vec<TrainCollision> {
        self.events()
    }

    pub fn scored_events(&self) -> Vec<TrainScored> {
        self.events()
    }

    pub fn loaded_events(&self) -> Vec<LevelLoaded> {
        self.events()
    }

    pub fn reload_requests(&self) -> Vec<LevelReload> {
        self.events()
    }
}
