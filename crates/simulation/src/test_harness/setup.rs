//! Builder methods for layouts, trains and session state.

use crate::layout::{ConnectionId, Layout};
use crate::rail_params::RailParams;
use crate::trains::{RailSession, SpawnClock, SwitchBoard, Train};
use crate::tracks::Track;

use super::TestLine;

impl TestLine {
    /// Replace the generated layout. Switches go back to straight.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        let world = self.app.world_mut();
        world.insert_resource(layout);
        world.resource_mut::<SwitchBoard>().clear();
        self
    }

    /// Put a train on the line. `base_speed` is scaled by the session's
    /// current multiplier, so call `with_score` first when it matters.
    pub fn with_train(mut self, track: Track, x: f32, base_speed: f32) -> Self {
        let multiplier = self.app.world().resource::<RailSession>().speed_multiplier;
        self.app
            .world_mut()
            .spawn(Train::new(track, x, base_speed, multiplier));
        self
    }

    /// Set the score and the pacing that goes with it. The loaded tier is
    /// left as is.
    pub fn with_score(mut self, score: u32) -> Self {
        let params = self
            .app
            .world()
            .resource::<RailParams>()
            .progression
            .clone();
        let mut session = self.app.world_mut().resource_mut::<RailSession>();
        session.score = score;
        session.apply_score(&params);
        self
    }

    /// Stop the spawner so only hand-placed trains run.
    pub fn without_spawning(mut self) -> Self {
        self.app.world_mut().resource_mut::<SpawnClock>().paused = true;
        self
    }

    /// Connect a switch before the first tick.
    pub fn with_switch_connected(mut self, id: ConnectionId) -> Self {
        let mut board = self.app.world_mut().resource_mut::<SwitchBoard>();
        if !board.is_connected(id) {
            board.toggle(id);
        }
        self
    }

    /// Swap the parameters after startup. The loaded level is kept; the next
    /// reload uses `params`.
    pub fn with_replaced_params(mut self, params: RailParams) -> Self {
        self.app.world_mut().insert_resource(params);
        self
    }
}
