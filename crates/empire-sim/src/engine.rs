//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the entity store, the terrain and the selection
//! state machine. It applies player commands and pointer events
//! synchronously, runs all systems once per step and produces
//! `WorldSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use empire_core::commands::PlayerCommand;
use empire_core::config::GameConfig;
use empire_core::constants::MAX_FRAME_DT;
use empire_core::enums::*;
use empire_core::error::ConfigError;
use empire_core::events::GameEvent;
use empire_core::ids::{AgentId, DragonId, StructureId};
use empire_core::state::WorldSnapshot;
use empire_core::types::{Position, SimTime};
use empire_world::TerrainGrid;

use crate::camera;
use crate::formation::formation_targets;
use crate::selection::{HitTarget, PointerEvent, SelectionOutcome, SelectionSystem};
use crate::store::{AgentPatch, EntityStore};
use crate::systems;
use crate::systems::spawner::WaveSchedule;
use crate::world_setup;

/// The simulation engine. Owns the store and all sim state.
pub struct SimulationEngine {
    config: GameConfig,
    store: EntityStore,
    terrain: TerrainGrid,
    selection: SelectionSystem,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    wave_schedule: WaveSchedule,
    events: Vec<GameEvent>,
    next_agent_number: u32,
    dead_agents: Vec<AgentId>,
    dead_dragons: Vec<DragonId>,
}

impl SimulationEngine {
    /// Generate terrain from the config and populate the opening world.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let terrain = TerrainGrid::generate(&config.terrain);
        let mut engine = Self::with_terrain(config, terrain)?;

        world_setup::setup_world(
            &mut engine.store,
            &engine.terrain,
            &mut engine.rng,
            &engine.config.spawn,
        );
        engine.next_agent_number = engine.config.spawn.initial_agents;

        info!(
            seed = engine.config.seed,
            width = engine.terrain.width(),
            height = engine.terrain.height(),
            waves = engine.wave_schedule.waves.len(),
            "simulation started"
        );
        Ok(engine)
    }

    /// An empty world on the given terrain. Dragon waves from the config
    /// are still scheduled.
    pub fn with_terrain(config: GameConfig, terrain: TerrainGrid) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: EntityStore::new(),
            terrain,
            selection: SelectionSystem::new(),
            time: SimTime::default(),
            phase: GamePhase::Active,
            time_scale: config.time_scale,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            wave_schedule: WaveSchedule::from_config(&config.spawn.dragon_waves),
            events: Vec::new(),
            next_agent_number: 0,
            dead_agents: Vec::new(),
            dead_dragons: Vec::new(),
            config,
        })
    }

    /// Advance one fixed step of `1 / tick_rate` seconds (scaled) and
    /// return the resulting snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        let dt = self.config.dt();
        self.step(dt);
        self.take_snapshot()
    }

    /// Advance by a variable frame delta (clamped to `MAX_FRAME_DT`, then
    /// scaled) and return the resulting snapshot.
    pub fn advance(&mut self, frame_dt: f64) -> WorldSnapshot {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.step(dt);
        self.take_snapshot()
    }

    /// Current state without consuming pending events.
    pub fn snapshot(&self) -> WorldSnapshot {
        systems::snapshot::build_snapshot(
            &self.store,
            &self.time,
            self.phase,
            self.time_scale,
            self.events.clone(),
        )
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn selection(&self) -> &SelectionSystem {
        &self.selection
    }

    pub fn wave_schedule(&self) -> &WaveSchedule {
        &self.wave_schedule
    }

    /// Events raised since the last tick.
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    // ---- Commands ----

    /// Apply a player command immediately.
    pub fn apply_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::SelectAgents { ids } => {
                let count = self.store.select(ids);
                self.events.push(GameEvent::AgentsSelected { count });
            }
            PlayerCommand::AddToSelection { ids } => {
                let count = self.store.add_to_selection(ids);
                self.events.push(GameEvent::AgentsSelected { count });
            }
            PlayerCommand::ClearSelection => {
                self.store.clear_selection();
                self.events.push(GameEvent::AgentsSelected { count: 0 });
            }
            PlayerCommand::SelectStructure { structure } => {
                if let Err(err) = self.store.set_selected_structure(structure) {
                    debug!(%err, "select structure ignored");
                }
            }
            PlayerCommand::MoveSelected { target } => {
                self.move_selected_to(target);
            }
            PlayerCommand::AssignSelectedToStructure { structure } => {
                self.assign_selected_to_structure(structure);
            }
            PlayerCommand::AttackWithSelected { dragon } => {
                self.attack_with_selected(dragon);
            }
            PlayerCommand::EquipTool { agent, slot } => {
                self.equip_tool(agent, slot);
            }
            PlayerCommand::SpawnAgents { count, near } => {
                self.spawn_agents(count, near);
            }
            PlayerCommand::SpawnDragon { kind, position } => {
                self.spawn_dragon(kind, position);
            }
            PlayerCommand::SpawnStructure {
                name,
                kind,
                position,
                owner,
            } => {
                self.spawn_structure(name, kind, position, owner);
            }
            PlayerCommand::DespawnAgent { agent } => {
                if let Err(err) = self.store.remove_agent(agent) {
                    debug!(%err, "despawn ignored");
                }
            }
            PlayerCommand::CreatePartyFromSelection { name, formation } => {
                let members = self.store.selected_agents();
                if members.is_empty() {
                    debug!("party from empty selection ignored");
                    return;
                }
                let party = self.store.create_party(name, formation, &members);
                debug!(party = %party, members = members.len(), "party formed");
            }
            PlayerCommand::SetPartyFormation { party, formation } => {
                if let Err(err) = self.store.set_party_formation(party, formation) {
                    debug!(%err, "formation change ignored");
                }
            }
            PlayerCommand::DisbandParty { party } => {
                if let Err(err) = self.store.disband_party(party) {
                    debug!(%err, "disband ignored");
                }
            }
            PlayerCommand::PanCamera { dx, dz } => {
                camera::pan(self.store.camera_mut(), dx, dz);
            }
            PlayerCommand::ZoomCamera { factor } => {
                camera::zoom_by(self.store.camera_mut(), factor);
            }
            PlayerCommand::OrbitCamera {
                rotation,
                elevation,
            } => {
                camera::orbit(self.store.camera_mut(), rotation, elevation);
            }
            PlayerCommand::ResizeViewport { width, height } => {
                camera::resize(self.store.camera_mut(), width, height);
            }
            PlayerCommand::SetTimeScale { scale } => {
                if scale.is_finite() {
                    self.time_scale = scale.clamp(0.0, 16.0);
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
        }
    }

    /// Feed a pointer event through the selection state machine and carry
    /// out whatever order it produces.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<SelectionOutcome> {
        let outcome = self.selection.handle(event, &mut self.store)?;
        match outcome {
            SelectionOutcome::AgentsSelected { count } => {
                self.events.push(GameEvent::AgentsSelected { count });
            }
            SelectionOutcome::AgentClicked(agent) => {
                self.events.push(GameEvent::AgentClicked { agent });
            }
            SelectionOutcome::StructureClicked(structure) => {
                self.events.push(GameEvent::StructureClicked { structure });
            }
            SelectionOutcome::DragonClicked(dragon) => {
                self.events.push(GameEvent::DragonClicked { dragon });
            }
            SelectionOutcome::GroundClicked(point) | SelectionOutcome::MoveTo(point) => {
                self.move_selected_to(point);
            }
            SelectionOutcome::AssignToStructure(structure) => {
                self.assign_selected_to_structure(structure);
            }
            SelectionOutcome::AttackDragon(dragon) => {
                self.attack_with_selected(dragon);
            }
            SelectionOutcome::HoverChanged(target) => {
                let (mut agent, mut structure, mut dragon) = (None, None, None);
                match target {
                    Some(HitTarget::Agent(id)) => agent = Some(id),
                    Some(HitTarget::Structure(id)) => structure = Some(id),
                    Some(HitTarget::Dragon(id)) => dragon = Some(id),
                    Some(HitTarget::Ground(_)) | None => {}
                }
                self.events.push(GameEvent::HoverChanged {
                    agent,
                    structure,
                    dragon,
                });
            }
        }
        Some(outcome)
    }

    /// Send the selected agents to `target` in formation. Returns how many
    /// agents found a route.
    pub fn move_selected_to(&mut self, target: Position) -> usize {
        let (formation, agents) = self.selection_formation();
        if agents.is_empty() {
            return 0;
        }
        let task = format!("Moving to {:.1}, {:.1}...", target.x, target.z);
        let slots = formation_targets(formation, target, agents.len());
        let moved = agents
            .into_iter()
            .zip(slots)
            .filter(|&(id, slot)| self.order_move(id, slot, task.clone(), None))
            .count();
        self.events.push(GameEvent::MoveOrdered {
            target,
            count: moved,
        });
        moved
    }

    /// Send the selected agents to work at a structure and activate its
    /// quest. Returns how many agents found a route.
    pub fn assign_selected_to_structure(&mut self, structure: StructureId) -> usize {
        let Some(position) = self.store.structure_position(structure) else {
            debug!(structure = %structure, "assign to missing structure ignored");
            return 0;
        };
        let Some((name, quest)) = self
            .store
            .get_structure(structure)
            .map(|s| (s.name.clone(), s.quest))
        else {
            return 0;
        };
        let (formation, agents) = self.selection_formation();
        if agents.is_empty() {
            return 0;
        }

        let task = format!("Assigned to {name}");
        let slots = formation_targets(formation, position, agents.len());
        let assigned: Vec<AgentId> = agents
            .into_iter()
            .zip(slots)
            .filter(|&(id, slot)| self.order_move(id, slot, task.clone(), Some(structure)))
            .map(|(id, _)| id)
            .collect();

        if let Some(quest_id) = quest {
            let now = self.time.elapsed_secs;
            if let Some(quest) = self.store.quest_mut(quest_id) {
                if quest.status == QuestStatus::NotStarted && !assigned.is_empty() {
                    quest.status = QuestStatus::Active;
                    quest.started_at_secs = Some(now);
                    info!(quest = %quest_id, title = %quest.title, "quest activated");
                    self.events.push(GameEvent::QuestActivated { quest: quest_id });
                }
                for &agent in &assigned {
                    if !quest.assigned_agents.contains(&agent) {
                        quest.assigned_agents.push(agent);
                    }
                }
            }
        }

        info!(structure = %name, count = assigned.len(), "agents assigned");
        self.events.push(GameEvent::AgentsAssigned {
            structure,
            count: assigned.len(),
        });
        assigned.len()
    }

    /// Order the selected agents to attack a dragon.
    pub fn attack_with_selected(&mut self, dragon: DragonId) -> usize {
        if !self.store.is_dragon_alive(dragon) {
            debug!(dragon = %dragon, "attack on missing dragon ignored");
            return 0;
        }
        let task = self
            .store
            .get_dragon(dragon)
            .map(|d| format!("Attacking {:?} dragon", d.kind));
        let agents: Vec<AgentId> = self.store.selected_agents();
        for &id in &agents {
            let patch = AgentPatch {
                state: Some(AgentState::Attacking),
                target_position: Some(None),
                path: Some(VecDeque::new()),
                current_task: Some(task.clone()),
                assigned_structure: Some(None),
                attack_target: Some(Some(dragon)),
                ..Default::default()
            };
            // Selected ids were live a moment ago.
            let _ = self.store.update_agent(id, patch);
        }
        agents.len()
    }

    /// Equip an inventory slot, or unequip with `None`.
    pub fn equip_tool(&mut self, agent: AgentId, slot: Option<usize>) -> bool {
        let Some(a) = self.store.agent_mut(agent) else {
            debug!(agent = %agent, "equip on missing agent ignored");
            return false;
        };
        match slot {
            Some(idx) if idx >= a.inventory.len() => false,
            _ => {
                a.equipped_tool = slot;
                true
            }
        }
    }

    pub fn spawn_agents(&mut self, count: u32, near: Position) -> Vec<AgentId> {
        let ids = world_setup::spawn_agents_near(
            &mut self.store,
            &self.terrain,
            &mut self.rng,
            count,
            near,
            self.next_agent_number,
        );
        self.next_agent_number += count;
        ids
    }

    pub fn spawn_dragon(&mut self, kind: DragonType, position: Position) -> DragonId {
        let dragon = world_setup::spawn_dragon(&mut self.store, kind, position);
        self.events.push(GameEvent::DragonSpawned { dragon, kind });
        dragon
    }

    pub fn spawn_structure(
        &mut self,
        name: impl Into<String>,
        kind: StructureType,
        position: Position,
        owner: Option<Faction>,
    ) -> StructureId {
        world_setup::spawn_structure(&mut self.store, name, kind, position, owner)
    }

    // ---- Internals ----

    /// Formation and slot order for the current selection. A selection that
    /// is exactly one party's members (or a subset) uses the party's
    /// formation in member order; anything else forms a circle.
    fn selection_formation(&self) -> (FormationType, Vec<AgentId>) {
        let selected: Vec<AgentId> = self
            .store
            .selected_agents()
            .into_iter()
            .filter(|&id| self.store.is_agent_alive(id))
            .collect();

        let parties: Vec<_> = selected
            .iter()
            .map(|&id| self.store.get_agent(id).and_then(|a| a.party))
            .collect();
        if let Some(Some(party_id)) = parties.first().copied() {
            if parties.iter().all(|&p| p == Some(party_id)) {
                if let Some(party) = self.store.get_party(party_id) {
                    let ordered: Vec<AgentId> = party
                        .members
                        .iter()
                        .copied()
                        .filter(|m| selected.contains(m))
                        .collect();
                    return (party.formation, ordered);
                }
            }
        }
        (FormationType::Circle, selected)
    }

    /// Path one agent to `slot`. On failure the agent is left idle and a
    /// `PathUnreachable` event is raised.
    fn order_move(
        &mut self,
        id: AgentId,
        slot: Position,
        task: String,
        assignment: Option<StructureId>,
    ) -> bool {
        let Some(start) = self.store.agent_position(id) else {
            return false;
        };
        match self.terrain.find_path(&start, &slot) {
            Ok(path) => {
                let mut waypoints: VecDeque<Position> = path.waypoints.into();
                waypoints.pop_front();
                let patch = AgentPatch {
                    state: Some(AgentState::Moving),
                    target_position: Some(Some(slot)),
                    path: Some(waypoints),
                    current_task: Some(Some(task)),
                    assigned_structure: Some(assignment),
                    attack_target: Some(None),
                    ..Default::default()
                };
                self.store.update_agent(id, patch).is_ok()
            }
            Err(err) => {
                debug!(agent = %id, %err, "no route to formation slot");
                let patch = AgentPatch {
                    state: Some(AgentState::Idle),
                    target_position: Some(None),
                    path: Some(VecDeque::new()),
                    current_task: Some(None),
                    ..Default::default()
                };
                let _ = self.store.update_agent(id, patch);
                self.events.push(GameEvent::PathUnreachable {
                    agent: id,
                    target: slot,
                });
                false
            }
        }
    }

    fn step(&mut self, dt: f64) {
        camera::update(self.store.camera_mut(), dt as f32);
        if self.phase == GamePhase::Active {
            let scaled = dt * self.time_scale;
            self.run_systems(scaled);
            self.time.advance(scaled);
        }
    }

    fn take_snapshot(&mut self) -> WorldSnapshot {
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.store,
            &self.time,
            self.phase,
            self.time_scale,
            events,
        )
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let now = self.time.elapsed_secs + dt;
        let dt = dt as f32;
        // 1. Dragon waves
        systems::spawner::run(
            &mut self.store,
            &mut self.rng,
            &mut self.wave_schedule,
            self.config.spawn.dragon_spawn_distance,
            now,
            &mut self.events,
        );
        // 2. Dragon AI and strikes
        systems::dragons::run(&mut self.store, &self.config.combat, dt, now, &mut self.events);
        // 3. Agent attacks
        systems::agent_combat::run(
            &mut self.store,
            &self.terrain,
            &self.config.combat,
            &self.config.movement,
            dt,
            &mut self.events,
        );
        // 4. Movement and arrival
        systems::movement::run(&mut self.store, &self.config.movement, dt, &mut self.events);
        // 5. Quest progress
        systems::quests::run(&mut self.store, dt, now, &mut self.events);
        // 6. Remove the dead
        systems::cleanup::run(
            &mut self.store,
            now,
            self.config.combat.corpse_linger_secs,
            &mut self.dead_agents,
            &mut self.dead_dragons,
        );
        // 7. Clear stale references
        systems::references::run(&mut self.store);
    }
}
