//! Headless `--agent` mode: a blocking synchronous loop that reads JSON
//! commands from stdin and writes JSON responses to stdout.
//!
//! Ticks are driven by running `FixedUpdate` directly, so a session replays
//! identically for the same seed and command stream.
//!
//! ## Protocol
//!
//! Each line of stdin is a JSON object with a `"cmd"` discriminator:
//! `observe`, `toggle` (`{"cmd":"toggle","id":3}`), `step`
//! (`{"cmd":"step","ticks":60}`), `restart`, `quit`.
//! Each line of stdout is a JSON response with a `"type"` field.

use std::io::{BufRead, Write};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use simulation::layout::{ConnectionId, Layout};
use simulation::level_lifecycle::{LevelReload, ReloadReason};
use simulation::tracks::Track;
use simulation::trains::{RailSession, SwitchBoard, ToggleSwitch, Train};
use simulation::TickCounter;

pub const PROTOCOL_VERSION: u32 = 1;

/// Upper bound for a single `step` command.
const MAX_STEP_TICKS: u32 = 10_000;

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AgentCommand {
    Observe,
    Toggle { id: u32 },
    Step { ticks: u32 },
    Restart,
    Quit,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentResponse {
    Ready { protocol_version: u32 },
    Observation { observation: Observation },
    Error { message: String },
    Goodbye,
}

#[derive(Debug, Serialize)]
pub struct Observation {
    pub tick: u64,
    pub score: u32,
    pub tier: &'static str,
    pub crashed: bool,
    pub trains: Vec<TrainView>,
    pub switches: Vec<SwitchView>,
    pub stops: Vec<StopView>,
}

#[derive(Debug, Serialize)]
pub struct TrainView {
    pub track: Track,
    pub x: f32,
    pub speed: f32,
    pub halted: bool,
}

#[derive(Debug, Serialize)]
pub struct SwitchView {
    pub id: u32,
    pub source: Track,
    pub target: Track,
    pub x: f32,
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct StopView {
    pub id: u32,
    pub track: Track,
    pub x: f32,
    pub duration_ms: f32,
}

pub fn run_agent_mode() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(simulation::SimulationPlugin);
    crate::apply_env_overrides(&mut app);

    // Initial update so Startup systems execute and the first level loads.
    app.update();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    respond(
        &mut stdout,
        &AgentResponse::Ready {
            protocol_version: PROTOCOL_VERSION,
        },
    );
    eprintln!("railyard agent mode v{PROTOCOL_VERSION} ready, waiting for commands on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("stdin read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<AgentCommand>(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(e) => AgentResponse::Error {
                message: format!("Parse error: {e}"),
            },
        };
        let is_goodbye = matches!(response, AgentResponse::Goodbye);
        respond(&mut stdout, &response);
        if is_goodbye {
            break;
        }
    }

    eprintln!("railyard agent mode shutting down");
}

fn respond(out: &mut impl Write, response: &AgentResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = writeln!(out, "{json}");
            let _ = out.flush();
        }
        Err(e) => eprintln!("failed to encode response: {e}"),
    }
}

fn tick(app: &mut App, n: u32) {
    for _ in 0..n {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn process_command(cmd: AgentCommand, app: &mut App) -> AgentResponse {
    match cmd {
        AgentCommand::Observe => {}
        AgentCommand::Toggle { id } => {
            let id = ConnectionId(id);
            if app.world().resource::<Layout>().connection(id).is_none() {
                return AgentResponse::Error {
                    message: format!("no such switch: {id}"),
                };
            }
            app.world_mut().send_event(ToggleSwitch { id });
            // One tick so the toggle is applied before the next observation.
            tick(app, 1);
        }
        AgentCommand::Step { ticks } => tick(app, ticks.min(MAX_STEP_TICKS)),
        AgentCommand::Restart => {
            app.world_mut().send_event(LevelReload {
                reason: ReloadReason::Restart,
            });
            tick(app, 1);
        }
        AgentCommand::Quit => return AgentResponse::Goodbye,
    }
    AgentResponse::Observation {
        observation: observe(app.world_mut()),
    }
}

fn observe(world: &mut World) -> Observation {
    let mut trains: Vec<TrainView> = world
        .query::<&Train>()
        .iter(world)
        .map(|t| TrainView {
            track: t.track,
            x: t.x,
            speed: t.speed,
            halted: t.is_halted(),
        })
        .collect();
    trains.sort_by(|a, b| a.track.cmp(&b.track).then(a.x.total_cmp(&b.x)));

    let layout = world.resource::<Layout>();
    let board = world.resource::<SwitchBoard>();
    let switches = layout
        .connections()
        .iter()
        .map(|c| SwitchView {
            id: c.id.0,
            source: c.source,
            target: c.target,
            x: c.x,
            connected: board.is_connected(c.id),
        })
        .collect();
    let stops = layout
        .stops()
        .iter()
        .map(|s| StopView {
            id: s.id.0,
            track: s.track,
            x: s.x,
            duration_ms: s.duration_ms,
        })
        .collect();

    let session = world.resource::<RailSession>();
    Observation {
        tick: world.resource::<TickCounter>().0,
        score: session.score,
        tier: session.tier.label(),
        crashed: session.crashed,
        trains,
        switches,
        stops,
    }
}
