//! Tests for the entity store, selection, game loop systems and engine.

use glam::Vec2;

use empire_core::commands::PlayerCommand;
use empire_core::components::{Quest, Questline, Tool};
use empire_core::config::{DragonWave, GameConfig};
use empire_core::enums::*;
use empire_core::error::StoreError;
use empire_core::events::GameEvent;
use empire_core::ids::AgentId;
use empire_core::types::Position;
use empire_world::TerrainGrid;

use crate::camera;
use crate::engine::SimulationEngine;
use crate::selection::{HitTarget, PointerEvent, SelectionOutcome};
use crate::store::{AgentPatch, EntityStore};
use crate::world_setup;

const EPS: f32 = 1e-3;

/// Config with an empty opening world and no dragon waves.
fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.spawn.initial_agents = 0;
    config.spawn.initial_structures = false;
    config.spawn.dragon_waves.clear();
    config
}

fn grass(width: u32, height: u32) -> TerrainGrid {
    TerrainGrid::from_fn(width, height, 1.0, |_, _| Biome::Grass)
}

fn grass_engine(config: GameConfig) -> SimulationEngine {
    SimulationEngine::with_terrain(config, grass(32, 32)).unwrap()
}

fn spawn_at(engine: &mut SimulationEngine, x: f32, z: f32) -> AgentId {
    world_setup::spawn_agent(engine.store_mut(), "Test", Position::new(x, 0.0, z))
}

fn center() -> Vec2 {
    Vec2::new(640.0, 360.0)
}

fn approx(a: &Position, b: &Position) -> bool {
    a.distance_to(b) < EPS
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let config = GameConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut engine_a = SimulationEngine::new(config.clone()).unwrap();
    let mut engine_b = SimulationEngine::new(config).unwrap();

    for engine in [&mut engine_a, &mut engine_b] {
        let ids: Vec<AgentId> = engine.store().agent_ids()[..10].to_vec();
        engine.apply_command(PlayerCommand::SelectAgents { ids });
        engine.apply_command(PlayerCommand::MoveSelected {
            target: Position::new(3.0, 0.0, -2.0),
        });
    }

    for _ in 0..300 {
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SimulationEngine::new(GameConfig {
        seed: 111,
        ..Default::default()
    })
    .unwrap();
    let mut engine_b = SimulationEngine::new(GameConfig {
        seed: 222,
        ..Default::default()
    })
    .unwrap();

    let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
    let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should scatter agents differently");
}

#[test]
fn test_new_populates_opening_world() {
    let engine = SimulationEngine::new(GameConfig::default()).unwrap();
    let stats = engine.store().stats();
    assert_eq!(stats.agent_count, 100);
    assert_eq!(stats.structure_count, 5);
    assert_eq!(stats.quest_count, 4);
    assert_eq!(engine.store().questlines().count(), 1);
    for &id in engine.store().agent_ids() {
        let pos = engine.store().agent_position(id).unwrap();
        assert!(engine.terrain().is_walkable_at(&pos), "agent spawned on {pos:?}");
    }
}

#[test]
fn test_invalid_config_rejected() {
    let config = GameConfig {
        tick_rate: 0,
        ..Default::default()
    };
    assert!(SimulationEngine::new(config).is_err());
}

// ---- Entity store ----

#[test]
fn test_store_update_missing_agent_is_a_miss() {
    let mut store = EntityStore::new();
    let id = world_setup::spawn_agent(&mut store, "Gone", Position::ORIGIN);
    store.remove_agent(id).unwrap();

    let result = store.update_agent(
        id,
        AgentPatch {
            health: Some(1.0),
            ..Default::default()
        },
    );
    assert_eq!(result, Err(StoreError::AgentNotFound(id)));
    assert_eq!(store.remove_agent(id), Err(StoreError::AgentNotFound(id)));
    assert_eq!(store.agent_count(), 0);
}

#[test]
fn test_store_moving_without_target_normalises_to_idle() {
    let mut store = EntityStore::new();
    let id = world_setup::spawn_agent(&mut store, "Lost", Position::ORIGIN);
    store
        .update_agent(
            id,
            AgentPatch {
                state: Some(AgentState::Moving),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(store.get_agent(id).unwrap().state, AgentState::Idle);
}

#[test]
fn test_store_insertion_order_survives_removal() {
    let mut store = EntityStore::new();
    let a = world_setup::spawn_agent(&mut store, "A", Position::ORIGIN);
    let b = world_setup::spawn_agent(&mut store, "B", Position::ORIGIN);
    let c = world_setup::spawn_agent(&mut store, "C", Position::ORIGIN);
    store.remove_agent(b).unwrap();
    let d = world_setup::spawn_agent(&mut store, "D", Position::ORIGIN);
    assert_eq!(store.agent_ids(), &[a, c, d]);
}

#[test]
fn test_store_selection_slots_are_independent() {
    let mut store = EntityStore::new();
    let a = world_setup::spawn_agent(&mut store, "A", Position::ORIGIN);
    let b = world_setup::spawn_agent(&mut store, "B", Position::ORIGIN);
    let s = world_setup::spawn_structure(
        &mut store,
        "Keep",
        StructureType::Castle,
        Position::ORIGIN,
        None,
    );

    assert_eq!(store.select([a]), 1);
    store.set_selected_structure(Some(s)).unwrap();
    assert_eq!(store.add_to_selection([b]), 2);
    assert_eq!(store.selected_structure(), Some(s));

    store.clear_selection();
    assert_eq!(store.selection_count(), 0);
    assert_eq!(store.selected_structure(), Some(s));

    store.remove_structure(s).unwrap();
    assert_eq!(store.selected_structure(), None);
    assert_eq!(
        store.set_selected_structure(Some(s)),
        Err(StoreError::StructureNotFound(s))
    );
}

#[test]
fn test_store_selection_ignores_dead_agents() {
    let mut store = EntityStore::new();
    let a = world_setup::spawn_agent(&mut store, "A", Position::ORIGIN);
    let b = world_setup::spawn_agent(&mut store, "B", Position::ORIGIN);
    store.select([a, b]);
    assert!(store.kill_agent(a, 0.0));
    assert!(!store.is_selected(a));
    assert_eq!(store.select([a, b]), 1);
    assert_eq!(store.selected_agents(), vec![b]);
}

#[test]
fn test_store_zero_health_patch_kills_agent() {
    let mut store = EntityStore::new();
    let a = world_setup::spawn_agent(&mut store, "A", Position::ORIGIN);
    let party = store.create_party("Red", FormationType::Line, &[a]);
    store.select([a]);

    store
        .update_agent(
            a,
            AgentPatch {
                health: Some(0.0),
                ..Default::default()
            },
        )
        .unwrap();

    let agent = store.get_agent(a).unwrap();
    assert_eq!(agent.state, AgentState::Dead);
    assert!(agent.party.is_none());
    drop(agent);
    assert!(!store.is_agent_alive(a));
    assert!(!store.is_selected(a));
    assert_eq!(store.select([a]), 0);
    assert!(store.party_members(party).is_empty());
}

#[test]
fn test_store_new_target_drops_stale_path() {
    let mut store = EntityStore::new();
    let a = world_setup::spawn_agent(&mut store, "A", Position::ORIGIN);
    store
        .update_agent(
            a,
            AgentPatch {
                state: Some(AgentState::Moving),
                target_position: Some(Some(Position::new(5.0, 0.0, 0.0))),
                path: Some([Position::new(1.0, 0.0, 0.0), Position::new(5.0, 0.0, 0.0)].into()),
                ..Default::default()
            },
        )
        .unwrap();

    store
        .update_agent(
            a,
            AgentPatch {
                target_position: Some(Some(Position::new(0.0, 0.0, 4.0))),
                ..Default::default()
            },
        )
        .unwrap();

    let agent = store.get_agent(a).unwrap();
    assert!(agent.path.is_empty());
    assert_eq!(agent.target_position, Some(Position::new(0.0, 0.0, 4.0)));
}

#[test]
fn test_agent_patched_dead_is_cleaned_up() {
    let mut config = quiet_config();
    config.combat.corpse_linger_secs = 1.0;
    let mut engine = grass_engine(config);
    let id = spawn_at(&mut engine, 0.0, 0.0);
    engine.apply_command(PlayerCommand::SelectAgents { ids: vec![id] });
    engine.move_selected_to(Position::new(6.0, 0.0, 0.0));

    engine
        .store_mut()
        .update_agent(
            id,
            AgentPatch {
                state: Some(AgentState::Dead),
                ..Default::default()
            },
        )
        .unwrap();
    {
        let agent = engine.store().get_agent(id).unwrap();
        assert!(agent.target_position.is_none());
        assert!(agent.path.is_empty());
        assert!(agent.current_task.is_none());
    }

    engine.tick();
    let died = engine.store().get_agent(id).unwrap().died_at_secs;
    assert!(died.is_some());
    assert_eq!(engine.store().agent_position(id), Some(Position::ORIGIN));

    for _ in 0..60 {
        engine.tick();
    }
    assert!(!engine.store().contains_agent(id));
    assert_eq!(engine.store().agent_count(), 0);
}

#[test]
fn test_store_party_membership_moves_between_parties() {
    let mut store = EntityStore::new();
    let a = world_setup::spawn_agent(&mut store, "A", Position::ORIGIN);
    let b = world_setup::spawn_agent(&mut store, "B", Position::ORIGIN);
    let red = store.create_party("Red", FormationType::Line, &[a, b]);
    let blue = store.create_party("Blue", FormationType::Wedge, &[b]);

    assert_eq!(store.party_members(red), &[a]);
    assert_eq!(store.party_members(blue), &[b]);
    assert_eq!(store.get_agent(b).unwrap().party, Some(blue));

    store.disband_party(blue).unwrap();
    assert_eq!(store.get_agent(b).unwrap().party, None);
    assert!(store.party_members(blue).is_empty());
}

#[test]
fn test_add_quest_links_structure() {
    let mut store = EntityStore::new();
    let s = world_setup::spawn_structure(
        &mut store,
        "Tower",
        StructureType::Tower,
        Position::ORIGIN,
        None,
    );
    let mut quest = Quest::new("Watch", 5.0);
    quest.structure = Some(s);
    let q = store.add_quest(quest);
    assert_eq!(store.get_structure(s).unwrap().quest, Some(q));
    assert_eq!(store.get_quest(q).unwrap().id, q);
}

// ---- Formation movement ----

#[test]
fn test_formation_four_agents_to_origin() {
    let mut engine = grass_engine(quiet_config());
    let ids: Vec<AgentId> = [(5.0, 5.0), (-5.0, 5.0), (5.0, -5.0), (-5.0, -5.0)]
        .iter()
        .map(|&(x, z)| spawn_at(&mut engine, x, z))
        .collect();
    engine.store_mut().select(ids.clone());

    assert_eq!(engine.move_selected_to(Position::ORIGIN), 4);

    for (i, id) in ids.iter().enumerate() {
        let angle = (i as f32 / 4.0) * std::f32::consts::TAU;
        let expected = Position::new(angle.cos(), 0.0, angle.sin());
        let agent = engine.store().get_agent(*id).unwrap();
        assert_eq!(agent.state, AgentState::Moving);
        let target = agent.target_position.unwrap();
        assert!(approx(&target, &expected), "slot {i}: {target:?} vs {expected:?}");
    }
}

#[test]
fn test_party_selection_uses_party_formation() {
    let mut engine = grass_engine(quiet_config());
    let ids: Vec<AgentId> = (0..3).map(|i| spawn_at(&mut engine, i as f32, 6.0)).collect();
    engine.store_mut().select(ids.clone());
    engine.apply_command(PlayerCommand::CreatePartyFromSelection {
        name: "Vanguard".into(),
        formation: FormationType::Line,
    });

    engine.move_selected_to(Position::new(0.0, 0.0, -4.0));

    let xs: Vec<f32> = ids
        .iter()
        .map(|&id| engine.store().get_agent(id).unwrap().target_position.unwrap().x)
        .collect();
    assert_eq!(xs, vec![-1.0, 0.0, 1.0]);
}

#[test]
fn test_agent_arrives_and_goes_idle() {
    let mut config = quiet_config();
    config.movement.agent_speed = 5.0;
    let mut engine = grass_engine(config);
    let id = spawn_at(&mut engine, 0.0, 0.0);
    engine
        .store_mut()
        .update_agent(
            id,
            AgentPatch {
                state: Some(AgentState::Moving),
                target_position: Some(Some(Position::new(2.0, 0.0, 0.0))),
                current_task: Some(Some("Walking".into())),
                ..Default::default()
            },
        )
        .unwrap();

    let snapshot = engine.advance(1.0);

    let agent = engine.store().get_agent(id).unwrap();
    assert_eq!(agent.state, AgentState::Idle);
    assert!(agent.target_position.is_none());
    assert!(agent.current_task.is_none());
    let pos = engine.store().agent_position(id).unwrap();
    assert!(approx(&pos, &Position::new(2.0, 0.0, 0.0)));
    assert!(snapshot
        .events
        .contains(&GameEvent::AgentArrived { agent: id }));
}

#[test]
fn test_agent_follows_path_around_wall() {
    // Column i = 10 is water except the bottom row.
    let terrain = TerrainGrid::from_fn(16, 16, 1.0, |i, j| {
        if i == 10 && j != 15 {
            Biome::Water
        } else {
            Biome::Grass
        }
    });
    let mut engine = SimulationEngine::with_terrain(quiet_config(), terrain).unwrap();
    let id = spawn_at(&mut engine, -3.5, 0.5);
    engine.store_mut().select([id]);
    assert_eq!(engine.move_selected_to(Position::new(4.5, 0.0, 0.5)), 1);

    for _ in 0..600 {
        engine.tick();
        let pos = engine.store().agent_position(id).unwrap();
        assert!(engine.terrain().is_walkable_at(&pos), "agent walked onto {pos:?}");
    }
    let agent = engine.store().get_agent(id).unwrap();
    assert_eq!(agent.state, AgentState::Idle);
}

#[test]
fn test_unreachable_move_leaves_agent_idle() {
    // A full-height wall splits the map.
    let terrain = TerrainGrid::from_fn(16, 16, 1.0, |i, _| {
        if i == 10 {
            Biome::Water
        } else {
            Biome::Grass
        }
    });
    let mut engine = SimulationEngine::with_terrain(quiet_config(), terrain).unwrap();
    let id = spawn_at(&mut engine, -4.0, 0.0);
    engine.store_mut().select([id]);

    assert_eq!(engine.move_selected_to(Position::new(5.0, 0.0, 0.0)), 0);

    let agent = engine.store().get_agent(id).unwrap();
    assert_eq!(agent.state, AgentState::Idle);
    assert!(agent.target_position.is_none());
    assert!(engine
        .pending_events()
        .iter()
        .any(|e| matches!(e, GameEvent::PathUnreachable { agent, .. } if *agent == id)));
}

// ---- Selection ----

#[test]
fn test_box_select_exactly_enclosed_agents() {
    let mut engine = grass_engine(quiet_config());
    let inner: Vec<AgentId> = [(0.0, 0.0), (1.0, -1.0), (-1.0, 2.0)]
        .iter()
        .map(|&(x, z)| spawn_at(&mut engine, x, z))
        .collect();
    let outer: Vec<AgentId> = [(12.0, 0.0), (-12.0, -8.0)]
        .iter()
        .map(|&(x, z)| spawn_at(&mut engine, x, z))
        .collect();

    let (min, max) = (Vec2::new(540.0, 260.0), Vec2::new(740.0, 460.0));
    let inside = |id: AgentId, engine: &SimulationEngine| {
        let pos = engine.store().agent_position(id).unwrap();
        camera::world_to_screen(engine.store().camera(), &pos)
            .is_some_and(|p| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y)
    };
    assert!(inner.iter().all(|&id| inside(id, &engine)));
    assert!(outer.iter().all(|&id| !inside(id, &engine)));

    engine.handle_pointer(PointerEvent::Down {
        x: max.x,
        y: max.y,
        additive: false,
    });
    engine.handle_pointer(PointerEvent::Move { x: min.x, y: min.y });
    assert!(engine.store().selection_box().active);
    let outcome = engine.handle_pointer(PointerEvent::Up { x: min.x, y: min.y });

    assert_eq!(outcome, Some(SelectionOutcome::AgentsSelected { count: 3 }));
    assert_eq!(engine.store().selected_agents(), inner);
    assert!(!engine.store().selection_box().active);
}

#[test]
fn test_additive_box_select_keeps_previous() {
    let mut engine = grass_engine(quiet_config());
    let near = spawn_at(&mut engine, 0.0, 0.0);
    let far = spawn_at(&mut engine, 12.0, 0.0);
    engine.store_mut().select([far]);

    engine.handle_pointer(PointerEvent::Down {
        x: 600.0,
        y: 320.0,
        additive: true,
    });
    engine.handle_pointer(PointerEvent::Up { x: 680.0, y: 400.0 });

    assert_eq!(engine.store().selected_agents(), vec![near, far]);
}

#[test]
fn test_small_drag_is_a_click() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 0.0, 0.0);

    engine.handle_pointer(PointerEvent::Down {
        x: 640.0,
        y: 360.0,
        additive: false,
    });
    engine.handle_pointer(PointerEvent::Move { x: 643.0, y: 362.0 });
    assert!(!engine.store().selection_box().active);

    let outcome = engine.handle_pointer(PointerEvent::Up { x: 643.0, y: 362.0 });
    assert_eq!(outcome, Some(SelectionOutcome::AgentClicked(id)));
    assert_eq!(engine.store().selected_agents(), vec![id]);
}

#[test]
fn test_drag_on_one_axis_activates_box() {
    let mut engine = grass_engine(quiet_config());
    engine.handle_pointer(PointerEvent::Down {
        x: 100.0,
        y: 100.0,
        additive: false,
    });
    engine.handle_pointer(PointerEvent::Move { x: 106.0, y: 100.0 });
    assert!(engine.store().selection_box().active);
    engine.handle_pointer(PointerEvent::Cancel);
    assert!(!engine.store().selection_box().active);
    assert_eq!(engine.handle_pointer(PointerEvent::Up { x: 106.0, y: 100.0 }), None);
}

#[test]
fn test_ground_click_moves_selection() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 5.0, 5.0);
    engine.store_mut().select([id]);

    engine.handle_pointer(PointerEvent::Down {
        x: 640.0,
        y: 360.0,
        additive: false,
    });
    let outcome = engine.handle_pointer(PointerEvent::Up { x: 640.0, y: 360.0 });

    match outcome {
        Some(SelectionOutcome::GroundClicked(point)) => {
            assert!(point.horizontal_distance_to(&Position::ORIGIN) < 0.05);
        }
        other => panic!("expected ground click, got {other:?}"),
    }
    assert_eq!(engine.store().get_agent(id).unwrap().state, AgentState::Moving);
    assert_eq!(engine.store().selected_agents(), vec![id]);
}

#[test]
fn test_right_click_structure_assigns_selection() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 6.0, 0.0);
    let keep = engine.spawn_structure("Keep", StructureType::Castle, Position::ORIGIN, None);
    let mut quest = Quest::new("Hold the Keep", 10.0);
    quest.structure = Some(keep);
    let q = engine.store_mut().add_quest(quest);
    engine.store_mut().select([id]);

    let outcome = engine.handle_pointer(PointerEvent::RightClick { x: 640.0, y: 360.0 });

    assert_eq!(outcome, Some(SelectionOutcome::AssignToStructure(keep)));
    let agent = engine.store().get_agent(id).unwrap();
    assert_eq!(agent.current_task.as_deref(), Some("Assigned to Keep"));
    assert_eq!(agent.assigned_structure, Some(keep));
    let quest = engine.store().get_quest(q).unwrap();
    assert_eq!(quest.status, QuestStatus::Active);
    assert_eq!(quest.assigned_agents, vec![id]);
}

#[test]
fn test_nearest_hit_wins() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 0.0, 0.0);
    // A dragon hovering on the centre ray, between the camera and the agent.
    let toward_eye = engine.store().camera().position.to_vec3().normalize();
    let above = Position::from_vec3(toward_eye * (3.0 / toward_eye.y));
    let dragon = engine.spawn_dragon(DragonType::Ancient, above);

    let hit = crate::selection::hit_test(engine.store(), engine.store().camera(), center()).unwrap();
    assert_eq!(hit.target, HitTarget::Dragon(dragon));

    engine.store_mut().remove_dragon(dragon).unwrap();
    let hit = crate::selection::hit_test(engine.store(), engine.store().camera(), center()).unwrap();
    assert_eq!(hit.target, HitTarget::Agent(id));
}

#[test]
fn test_hover_does_not_touch_selection() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 6.0, 0.0);
    let keep = engine.spawn_structure("Keep", StructureType::Castle, Position::ORIGIN, None);
    engine.store_mut().select([id]);

    let hover = PointerEvent::Hover { x: 640.0, y: 360.0 };
    assert_eq!(
        engine.handle_pointer(hover),
        Some(SelectionOutcome::HoverChanged(Some(HitTarget::Structure(keep))))
    );
    assert_eq!(engine.handle_pointer(hover), None);
    assert_eq!(engine.store().selected_agents(), vec![id]);
    assert_eq!(engine.store().selected_structure(), None);

    // Open ground clears the hover.
    assert_eq!(
        engine.handle_pointer(PointerEvent::Hover { x: 10.0, y: 700.0 }),
        Some(SelectionOutcome::HoverChanged(None))
    );
}

// ---- Camera ----

#[test]
fn test_camera_target_projects_to_screen_center() {
    let cam = empire_core::camera::CameraState::default();
    let screen = camera::world_to_screen(&cam, &Position::ORIGIN).unwrap();
    assert!((screen - center()).length() < 0.01);

    let ground = camera::screen_to_world(&cam, center(), 0.0).unwrap();
    assert!(ground.distance_to(&Position::ORIGIN) < 0.01);
}

#[test]
fn test_camera_behind_is_none() {
    let cam = empire_core::camera::CameraState::default();
    let eye = cam.position.to_vec3();
    let behind = Position::from_vec3(eye + (eye - cam.target.to_vec3()));
    assert!(camera::world_to_screen(&cam, &behind).is_none());
}

#[test]
fn test_camera_screen_world_agree() {
    let cam = empire_core::camera::CameraState::default();
    let point = Position::new(3.0, 0.0, -2.0);
    let screen = camera::world_to_screen(&cam, &point).unwrap();
    let back = camera::screen_to_world(&cam, screen, 0.0).unwrap();
    assert!(back.distance_to(&point) < 0.01, "{back:?}");
}

#[test]
fn test_camera_zoom_clamped_and_orbit_eases() {
    let mut engine = grass_engine(quiet_config());
    engine.apply_command(PlayerCommand::ZoomCamera { factor: 100.0 });
    assert!((engine.store().camera().zoom - 4.0).abs() < EPS);

    engine.apply_command(PlayerCommand::OrbitCamera {
        rotation: 1.0,
        elevation: 10.0,
    });
    let cam = *engine.store().camera();
    assert!((cam.elevation_target - 1.45).abs() < EPS);
    assert!(cam.rotation.abs() < EPS, "orbit only moves the target");

    for _ in 0..120 {
        engine.tick();
    }
    let cam = engine.store().camera();
    assert!((cam.rotation - 1.0).abs() < 0.01);
    assert!((cam.elevation - 1.45).abs() < 0.01);
}

// ---- Combat ----

#[test]
fn test_dragon_kills_agent() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 0.0, 0.0);
    engine
        .store_mut()
        .update_agent(
            id,
            AgentPatch {
                health: Some(10.0),
                ..Default::default()
            },
        )
        .unwrap();
    engine.store_mut().select([id]);
    let dragon = engine.spawn_dragon(DragonType::Fire, Position::new(1.0, 3.0, 0.0));

    let snapshot = engine.tick();

    assert!(snapshot
        .events
        .contains(&GameEvent::DragonAggro { dragon, agent: id }));
    assert!(snapshot.events.contains(&GameEvent::AgentDied { agent: id }));
    assert_eq!(engine.store().get_agent(id).unwrap().state, AgentState::Dead);
    assert!(snapshot.selected_agents.is_empty());

    for _ in 0..100 {
        engine.tick();
    }
    assert_eq!(engine.store().agent_count(), 0, "corpse should be cleaned up");
    assert!(engine.store().get_dragon(dragon).unwrap().target.is_none());
}

#[test]
fn test_agents_slay_dragon() {
    let mut config = quiet_config();
    config.combat.agent_attack_damage = 1000.0;
    let mut engine = grass_engine(config);
    let id = spawn_at(&mut engine, 0.0, 0.0);
    let dragon = engine.spawn_dragon(DragonType::Ice, Position::new(0.5, 3.0, 0.0));
    engine.store_mut().select([id]);

    assert_eq!(engine.attack_with_selected(dragon), 1);
    let snapshot = engine.tick();

    assert!(snapshot.events.contains(&GameEvent::DragonSlain { dragon }));
    assert_eq!(engine.store().dragon_count(), 0);
    let agent = engine.store().get_agent(id).unwrap();
    assert_eq!(agent.state, AgentState::Idle);
    assert!(agent.attack_target.is_none());
}

#[test]
fn test_equipped_tool_scales_damage() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 0.0, 0.0);
    let dragon = engine.spawn_dragon(DragonType::Ancient, Position::new(0.5, 3.0, 0.0));
    engine.store_mut().agent_mut(id).unwrap().inventory.push(Tool {
        name: "Greatsword".into(),
        kind: ToolType::Build,
        rarity: Rarity::Legendary,
    });
    assert!(engine.equip_tool(id, Some(0)));
    assert!(!engine.equip_tool(id, Some(3)));

    engine.store_mut().select([id]);
    engine.attack_with_selected(dragon);
    engine.tick();

    let dragon = engine.store().get_dragon(dragon).unwrap();
    let expected = dragon.max_health - 2.0 * empire_core::constants::AGENT_ATTACK_DAMAGE;
    assert!((dragon.health - expected).abs() < EPS);
}

#[test]
fn test_wave_spawns_on_schedule() {
    let mut config = quiet_config();
    config.spawn.dragon_waves = vec![DragonWave {
        spawn_at_secs: 0.5,
        dragons: vec![(DragonType::Fire, 2)],
    }];
    let mut engine = grass_engine(config);

    let mut waves = 0;
    for tick in 0..30 {
        let snapshot = engine.tick();
        if tick < 10 {
            assert_eq!(engine.store().dragon_count(), 0);
        }
        waves += snapshot
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::WaveSpawned { count: 2, .. }))
            .count();
    }
    assert_eq!(waves, 1);
    assert_eq!(engine.store().dragon_count(), 2);
    assert_eq!(engine.wave_schedule().pending(), 0);
}

// ---- Quests ----

fn quest_setup(work_secs: f32, deadline: Option<f64>) -> (SimulationEngine, AgentId, empire_core::ids::QuestId) {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 3.0, 0.0);
    let forge = engine.spawn_structure("Forge", StructureType::Workshop, Position::ORIGIN, None);
    let mut quest = Quest::new("Forge Blades", work_secs);
    quest.structure = Some(forge);
    quest.deadline_secs = deadline;
    quest.reward = Some(Tool {
        name: "Tongs".into(),
        kind: ToolType::Build,
        rarity: Rarity::Uncommon,
    });
    let q = engine.store_mut().add_quest(quest);
    engine
        .store_mut()
        .add_questline(Questline::new("Smithing", vec![q]));
    engine.store_mut().select([id]);
    assert_eq!(engine.assign_selected_to_structure(forge), 1);
    (engine, id, q)
}

#[test]
fn test_quest_completes_after_work() {
    let (mut engine, id, q) = quest_setup(1.0, None);

    let mut events = Vec::new();
    for _ in 0..120 {
        events.extend(engine.tick().events);
    }

    assert!(events.contains(&GameEvent::QuestCompleted { quest: q }));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::QuestlineCompleted { .. })));
    assert_eq!(engine.store().get_quest(q).unwrap().status, QuestStatus::Complete);
    assert_eq!(engine.store().completed_quest_count(), 1);

    let agent = engine.store().get_agent(id).unwrap();
    assert_eq!(agent.state, AgentState::Idle);
    assert_eq!(agent.current_task.as_deref(), Some("Completed: Forge Blades"));
    assert_eq!(agent.inventory.len(), 1);
    assert_eq!(agent.equipped_tool, Some(0));
}

#[test]
fn test_quest_fails_at_deadline() {
    let (mut engine, id, q) = quest_setup(100.0, Some(0.5));

    let mut events = Vec::new();
    for _ in 0..30 {
        events.extend(engine.tick().events);
    }

    assert!(events.contains(&GameEvent::QuestFailed { quest: q }));
    let line = engine.store().questlines().next().unwrap();
    assert_eq!(line.status, QuestlineStatus::Failed);
    let agent = engine.store().get_agent(id).unwrap();
    assert_eq!(agent.state, AgentState::Idle);
    assert!(agent.assigned_structure.is_none());
}

// ---- Stale references ----

#[test]
fn test_removed_entities_are_swept_from_party_and_quest() {
    let mut engine = grass_engine(quiet_config());
    let a = spawn_at(&mut engine, 1.0, 0.0);
    let b = spawn_at(&mut engine, 2.0, 0.0);
    let c = spawn_at(&mut engine, 3.0, 0.0);
    let hall = engine.spawn_structure("Hall", StructureType::Base, Position::new(-6.0, 0.0, 0.0), None);
    let mut quest = Quest::new("Guard", 50.0);
    quest.structure = Some(hall);
    quest.assigned_agents = vec![a, b];
    let q = engine.store_mut().add_quest(quest);
    let party = engine.store_mut().create_party("Trio", FormationType::Circle, &[a, b, c]);
    let dragon = engine.spawn_dragon(DragonType::Ancient, Position::new(14.0, 3.0, 14.0));
    engine.store_mut().dragon_mut(dragon).unwrap().target = Some(c);

    engine.apply_command(PlayerCommand::DespawnAgent { agent: a });
    engine.store_mut().remove_agent(c).unwrap();
    assert_eq!(engine.store().party_members(party), &[a, b, c]);

    engine.tick();

    assert_eq!(engine.store().party_members(party), &[b]);
    assert_eq!(engine.store().get_quest(q).unwrap().assigned_agents, vec![b]);
    assert!(engine.store().get_dragon(dragon).unwrap().target.is_none());

    engine.store_mut().remove_structure(hall).unwrap();
    engine.tick();
    assert!(engine.store().get_quest(q).unwrap().structure.is_none());
}

#[test]
fn test_commands_on_missing_ids_are_ignored() {
    let mut engine = grass_engine(quiet_config());
    let id = spawn_at(&mut engine, 0.0, 0.0);
    let s = engine.spawn_structure("Hut", StructureType::Campfire, Position::ORIGIN, None);
    let d = engine.spawn_dragon(DragonType::Fire, Position::new(10.0, 3.0, 10.0));
    engine.store_mut().remove_structure(s).unwrap();
    engine.store_mut().remove_dragon(d).unwrap();
    engine.store_mut().select([id]);

    assert_eq!(engine.assign_selected_to_structure(s), 0);
    assert_eq!(engine.attack_with_selected(d), 0);
    engine.apply_command(PlayerCommand::SelectStructure { structure: Some(s) });
    engine.apply_command(PlayerCommand::DespawnAgent { agent: id });
    engine.apply_command(PlayerCommand::DespawnAgent { agent: id });
    engine.tick();
    assert_eq!(engine.store().agent_count(), 0);
}

// ---- Engine control ----

#[test]
fn test_pause_freezes_time() {
    let mut engine = grass_engine(quiet_config());
    engine.apply_command(PlayerCommand::Pause);
    engine.tick();
    assert_eq!(engine.time().tick, 0);
    assert_eq!(engine.phase(), GamePhase::Paused);

    engine.apply_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.time().tick, 1);
}

#[test]
fn test_time_scale_scales_step() {
    let mut engine = grass_engine(quiet_config());
    engine.apply_command(PlayerCommand::SetTimeScale { scale: 2.0 });
    for _ in 0..30 {
        engine.tick();
    }
    assert!((engine.time().elapsed_secs - 2.0).abs() < 1e-9);

    engine.apply_command(PlayerCommand::SetTimeScale { scale: 99.0 });
    assert!((engine.time_scale() - 16.0).abs() < 1e-9);
}

#[test]
fn test_snapshot_lists_entities_in_spawn_order() {
    let mut engine = grass_engine(quiet_config());
    let ids = engine.spawn_agents(5, Position::ORIGIN);
    assert_eq!(ids.len(), 5);
    let a = ids[1];
    engine.store_mut().select([a]);
    let s = engine.spawn_structure("Camp", StructureType::Base, Position::ORIGIN, Some(Faction::Player));
    engine.store_mut().update_agent(
        a,
        AgentPatch {
            assigned_structure: Some(Some(s)),
            ..Default::default()
        },
    )
    .unwrap();

    let snapshot = engine.tick();
    let listed: Vec<AgentId> = snapshot.agents.iter().map(|v| v.id).collect();
    assert_eq!(listed, ids);
    assert!(snapshot.agents[1].selected);
    assert_eq!(snapshot.agents[1].name, "Agent 2");
    assert_eq!(snapshot.stats.agent_count, 5);
    assert_eq!(snapshot.structures.len(), 1);
    assert_eq!(snapshot.connections.len(), 1);
}
