//! Scripted player for `--demo`: issues the orders a player would give in
//! the opening minutes, keyed by tick and driven off the latest snapshot.

use empire_core::commands::PlayerCommand;
use empire_core::enums::{AgentState, DragonState, FormationType};
use empire_core::ids::AgentId;
use empire_core::state::{AgentView, WorldSnapshot};
use empire_core::types::Position;
use empire_sim::selection::PointerEvent;

use crate::state::GameLoopCommand;

/// Agents sent to each quest structure at the start.
const WORKERS_PER_QUEST: usize = 15;
/// Agents sent against each dragon.
const HUNTERS_PER_DRAGON: usize = 8;
const ASSIGN_TICK: u64 = 1;
const PARTY_TICK: u64 = 90;
const CAMERA_TICK: u64 = 150;
const HUNT_START_TICK: u64 = 300;
const HUNT_INTERVAL_TICKS: u64 = 60;

fn idle_agents(snapshot: &WorldSnapshot) -> impl Iterator<Item = &AgentView> {
    snapshot
        .agents
        .iter()
        .filter(|a| a.state == AgentState::Idle)
}

fn order(cmd: PlayerCommand) -> GameLoopCommand {
    GameLoopCommand::Player(cmd)
}

/// Commands to send before running `tick`.
pub fn script(tick: u64, snapshot: &WorldSnapshot) -> Vec<GameLoopCommand> {
    let mut commands = Vec::new();

    if tick == ASSIGN_TICK {
        let mut idle = idle_agents(snapshot).map(|a| a.id);
        for structure in snapshot.structures.iter().filter(|s| s.quest.is_some()) {
            let ids: Vec<AgentId> = idle.by_ref().take(WORKERS_PER_QUEST).collect();
            if ids.is_empty() {
                break;
            }
            commands.push(order(PlayerCommand::SelectAgents { ids }));
            commands.push(order(PlayerCommand::AssignSelectedToStructure {
                structure: structure.id,
            }));
        }
        commands.push(order(PlayerCommand::ClearSelection));
    }

    if tick == PARTY_TICK {
        // Box-select whoever is standing around the camera target.
        commands.extend(
            [
                PointerEvent::Down {
                    x: 560.0,
                    y: 280.0,
                    additive: false,
                },
                PointerEvent::Move { x: 720.0, y: 440.0 },
                PointerEvent::Up { x: 720.0, y: 440.0 },
            ]
            .map(GameLoopCommand::Pointer),
        );
        commands.push(order(PlayerCommand::CreatePartyFromSelection {
            name: "Vanguard".into(),
            formation: FormationType::Wedge,
        }));
        commands.push(order(PlayerCommand::MoveSelected {
            target: Position::new(0.0, 0.0, 6.0),
        }));
    }

    if tick == CAMERA_TICK {
        commands.push(order(PlayerCommand::OrbitCamera {
            rotation: 0.6,
            elevation: -0.2,
        }));
        commands.push(order(PlayerCommand::ZoomCamera { factor: 1.25 }));
    }

    if tick >= HUNT_START_TICK && tick % HUNT_INTERVAL_TICKS == 0 {
        let mut taken: Vec<AgentId> = Vec::new();
        for dragon in snapshot
            .dragons
            .iter()
            .filter(|d| d.state != DragonState::Dead)
        {
            let mut candidates: Vec<&AgentView> = idle_agents(snapshot)
                .filter(|a| !taken.contains(&a.id))
                .collect();
            candidates.sort_by(|a, b| {
                let da = a.position.horizontal_distance_to(&dragon.position);
                let db = b.position.horizontal_distance_to(&dragon.position);
                da.total_cmp(&db)
            });
            let ids: Vec<AgentId> = candidates
                .iter()
                .take(HUNTERS_PER_DRAGON)
                .map(|a| a.id)
                .collect();
            if ids.is_empty() {
                break;
            }
            taken.extend(&ids);
            commands.push(order(PlayerCommand::SelectAgents { ids }));
            commands.push(order(PlayerCommand::AttackWithSelected { dragon: dragon.id }));
        }
    }

    commands
}
