//! Entity store: the single source of truth for the simulation.
//!
//! Agents, dragons and structures are hecs entities with a `Position` plus
//! their kind component. Quests, questlines and parties are bookkeeping
//! records kept in ordered maps beside the world, the same way engagements
//! live beside the ECS. Selection, the drag box and the camera pose are
//! store-owned state slots.
//!
//! All mutations are synchronous. Nothing in here triggers movement or
//! combat; that is the job of the systems.

use std::collections::{BTreeMap, HashSet, VecDeque};

use hecs::{Ref, World};
use tracing::warn;

use empire_core::camera::CameraState;
use empire_core::components::{Agent, Dragon, Party, Quest, Questline, Structure};
use empire_core::enums::*;
use empire_core::error::StoreError;
use empire_core::ids::{AgentId, DragonId, PartyId, QuestId, QuestlineId, StructureId};
use empire_core::state::{SelectionBox, WorldStats};
use empire_core::types::Position;

/// Partial update for an agent. `None` fields are left unchanged; nested
/// options set (`Some(Some(_))`) or clear (`Some(None)`) the field.
#[derive(Debug, Clone, Default)]
pub struct AgentPatch {
    pub position: Option<Position>,
    pub state: Option<AgentState>,
    pub target_position: Option<Option<Position>>,
    pub path: Option<VecDeque<Position>>,
    pub current_task: Option<Option<String>>,
    pub health: Option<f32>,
    pub assigned_structure: Option<Option<StructureId>>,
    pub attack_target: Option<Option<DragonId>>,
}

#[derive(Debug, Clone, Default)]
pub struct DragonPatch {
    pub position: Option<Position>,
    pub state: Option<DragonState>,
    pub health: Option<f32>,
    pub target: Option<Option<AgentId>>,
    pub home: Option<Position>,
}

#[derive(Debug, Clone, Default)]
pub struct StructurePatch {
    pub name: Option<String>,
    pub position: Option<Position>,
    pub owner: Option<Option<Faction>>,
    pub quest: Option<Option<QuestId>>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestPatch {
    pub status: Option<QuestStatus>,
    pub structure: Option<Option<StructureId>>,
    pub work_done_secs: Option<f32>,
    pub deadline_secs: Option<Option<f64>>,
}

/// Authoritative world state.
pub struct EntityStore {
    world: World,
    // Spawn order per kind, for stable iteration.
    agent_order: Vec<AgentId>,
    dragon_order: Vec<DragonId>,
    structure_order: Vec<StructureId>,

    quests: BTreeMap<QuestId, Quest>,
    questlines: BTreeMap<QuestlineId, Questline>,
    parties: BTreeMap<PartyId, Party>,
    next_quest_id: u32,
    next_questline_id: u32,
    next_party_id: u32,

    selected_agents: HashSet<AgentId>,
    selected_structure: Option<StructureId>,
    selection_box: SelectionBox,
    camera: CameraState,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            agent_order: Vec::new(),
            dragon_order: Vec::new(),
            structure_order: Vec::new(),
            quests: BTreeMap::new(),
            questlines: BTreeMap::new(),
            parties: BTreeMap::new(),
            next_quest_id: 0,
            next_questline_id: 0,
            next_party_id: 0,
            selected_agents: HashSet::new(),
            selected_structure: None,
            selection_box: SelectionBox::default(),
            camera: CameraState::default(),
        }
    }

    /// Read-only access to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    // ---- Agents ----

    pub fn add_agent(&mut self, agent: Agent, position: Position) -> AgentId {
        let id = AgentId(self.world.spawn((position, agent)));
        self.agent_order.push(id);
        id
    }

    /// Despawn an agent. Party, quest and dragon references to it are left
    /// for the reference sweep; the selection is updated immediately.
    pub fn remove_agent(&mut self, id: AgentId) -> Result<(), StoreError> {
        if !self.contains_agent(id) {
            return Err(StoreError::AgentNotFound(id));
        }
        let _ = self.world.despawn(id.0);
        self.agent_order.retain(|&a| a != id);
        self.selected_agents.remove(&id);
        Ok(())
    }

    pub fn get_agent(&self, id: AgentId) -> Option<Ref<'_, Agent>> {
        self.world.get::<&Agent>(id.0).ok()
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.world.query_one_mut::<&mut Agent>(id.0).ok()
    }

    pub(crate) fn agent_entry_mut(&mut self, id: AgentId) -> Option<(&mut Position, &mut Agent)> {
        self.world
            .query_one_mut::<(&mut Position, &mut Agent)>(id.0)
            .ok()
    }

    pub fn agent_position(&self, id: AgentId) -> Option<Position> {
        self.get_agent(id)?;
        self.world.get::<&Position>(id.0).ok().map(|p| *p)
    }

    pub fn contains_agent(&self, id: AgentId) -> bool {
        self.world.get::<&Agent>(id.0).is_ok()
    }

    pub fn is_agent_alive(&self, id: AgentId) -> bool {
        self.get_agent(id).is_some_and(|a| a.is_alive())
    }

    /// Apply a partial update. A missing id is reported as a miss and
    /// changes nothing. A patch that drops a living agent to zero health or
    /// sets it Dead kills it; cleanup stamps the time of death.
    pub fn update_agent(&mut self, id: AgentId, patch: AgentPatch) -> Result<(), StoreError> {
        let (pos, agent) = self
            .agent_entry_mut(id)
            .ok_or(StoreError::AgentNotFound(id))?;
        let was_alive = agent.is_alive();

        if let Some(position) = patch.position {
            *pos = position;
        }
        if let Some(state) = patch.state {
            agent.state = state;
        }
        if let Some(target) = patch.target_position {
            if patch.path.is_none() && agent.target_position != target {
                agent.path.clear();
            }
            agent.target_position = target;
        }
        if let Some(path) = patch.path {
            agent.path = path;
        }
        if let Some(task) = patch.current_task {
            agent.current_task = task;
        }
        if let Some(health) = patch.health {
            agent.health = health.clamp(0.0, agent.max_health);
        }
        if let Some(structure) = patch.assigned_structure {
            agent.assigned_structure = structure;
        }
        if let Some(dragon) = patch.attack_target {
            agent.attack_target = dragon;
        }

        if agent.state == AgentState::Moving && agent.target_position.is_none() {
            warn!(agent = %id, "moving agent has no target; setting idle");
            agent.state = AgentState::Idle;
            agent.path.clear();
        }

        if was_alive && (agent.health <= 0.0 || agent.state == AgentState::Dead) {
            self.mark_dead(id, None);
        }
        Ok(())
    }

    /// Agent ids in spawn order, dead agents included.
    pub fn agent_ids(&self) -> &[AgentId] {
        &self.agent_order
    }

    pub fn living_agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agent_order
            .iter()
            .copied()
            .filter(|&id| self.is_agent_alive(id))
    }

    /// Mark an agent dead: stop it, drop it from the selection and its
    /// party. Returns false if it was missing or already dead.
    pub fn kill_agent(&mut self, id: AgentId, now_secs: f64) -> bool {
        let Some(agent) = self.agent_mut(id) else {
            return false;
        };
        if !agent.is_alive() {
            return false;
        }
        self.mark_dead(id, Some(now_secs));
        true
    }

    fn mark_dead(&mut self, id: AgentId, died_at_secs: Option<f64>) {
        let Some(agent) = self.agent_mut(id) else {
            return;
        };
        agent.state = AgentState::Dead;
        agent.health = 0.0;
        agent.target_position = None;
        agent.path.clear();
        agent.current_task = None;
        agent.attack_target = None;
        agent.assigned_structure = None;
        agent.died_at_secs = died_at_secs;
        let party = agent.party.take();

        self.selected_agents.remove(&id);
        if let Some(party) = party.and_then(|p| self.parties.get_mut(&p)) {
            party.members.retain(|&m| m != id);
        }
    }

    // ---- Dragons ----

    pub fn add_dragon(&mut self, dragon: Dragon, position: Position) -> DragonId {
        let id = DragonId(self.world.spawn((position, dragon)));
        self.dragon_order.push(id);
        id
    }

    pub fn remove_dragon(&mut self, id: DragonId) -> Result<(), StoreError> {
        if !self.contains_dragon(id) {
            return Err(StoreError::DragonNotFound(id));
        }
        let _ = self.world.despawn(id.0);
        self.dragon_order.retain(|&d| d != id);
        Ok(())
    }

    pub fn get_dragon(&self, id: DragonId) -> Option<Ref<'_, Dragon>> {
        self.world.get::<&Dragon>(id.0).ok()
    }

    pub fn dragon_mut(&mut self, id: DragonId) -> Option<&mut Dragon> {
        self.world.query_one_mut::<&mut Dragon>(id.0).ok()
    }

    pub(crate) fn dragon_entry_mut(
        &mut self,
        id: DragonId,
    ) -> Option<(&mut Position, &mut Dragon)> {
        self.world
            .query_one_mut::<(&mut Position, &mut Dragon)>(id.0)
            .ok()
    }

    pub fn dragon_position(&self, id: DragonId) -> Option<Position> {
        self.get_dragon(id)?;
        self.world.get::<&Position>(id.0).ok().map(|p| *p)
    }

    pub fn contains_dragon(&self, id: DragonId) -> bool {
        self.world.get::<&Dragon>(id.0).is_ok()
    }

    pub fn is_dragon_alive(&self, id: DragonId) -> bool {
        self.get_dragon(id)
            .is_some_and(|d| d.state != DragonState::Dead && d.health > 0.0)
    }

    pub fn update_dragon(&mut self, id: DragonId, patch: DragonPatch) -> Result<(), StoreError> {
        let (pos, dragon) = self
            .dragon_entry_mut(id)
            .ok_or(StoreError::DragonNotFound(id))?;
        if let Some(position) = patch.position {
            *pos = position;
        }
        if let Some(state) = patch.state {
            dragon.state = state;
        }
        if let Some(health) = patch.health {
            dragon.health = health.clamp(0.0, dragon.max_health);
        }
        if let Some(target) = patch.target {
            dragon.target = target;
        }
        if let Some(home) = patch.home {
            dragon.home = home;
        }
        Ok(())
    }

    pub fn dragon_ids(&self) -> &[DragonId] {
        &self.dragon_order
    }

    // ---- Structures ----

    pub fn add_structure(&mut self, structure: Structure, position: Position) -> StructureId {
        let id = StructureId(self.world.spawn((position, structure)));
        self.structure_order.push(id);
        id
    }

    pub fn remove_structure(&mut self, id: StructureId) -> Result<(), StoreError> {
        if !self.contains_structure(id) {
            return Err(StoreError::StructureNotFound(id));
        }
        let _ = self.world.despawn(id.0);
        self.structure_order.retain(|&s| s != id);
        if self.selected_structure == Some(id) {
            self.selected_structure = None;
        }
        Ok(())
    }

    pub fn get_structure(&self, id: StructureId) -> Option<Ref<'_, Structure>> {
        self.world.get::<&Structure>(id.0).ok()
    }

    pub fn structure_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        self.world.query_one_mut::<&mut Structure>(id.0).ok()
    }

    pub fn structure_position(&self, id: StructureId) -> Option<Position> {
        self.get_structure(id)?;
        self.world.get::<&Position>(id.0).ok().map(|p| *p)
    }

    pub fn contains_structure(&self, id: StructureId) -> bool {
        self.world.get::<&Structure>(id.0).is_ok()
    }

    pub fn update_structure(
        &mut self,
        id: StructureId,
        patch: StructurePatch,
    ) -> Result<(), StoreError> {
        let (pos, structure) = self
            .world
            .query_one_mut::<(&mut Position, &mut Structure)>(id.0)
            .map_err(|_| StoreError::StructureNotFound(id))?;
        if let Some(name) = patch.name {
            structure.name = name;
        }
        if let Some(position) = patch.position {
            *pos = position;
        }
        if let Some(owner) = patch.owner {
            structure.owner = owner;
        }
        if let Some(quest) = patch.quest {
            structure.quest = quest;
        }
        Ok(())
    }

    pub fn structure_ids(&self) -> &[StructureId] {
        &self.structure_order
    }

    // ---- Quests ----

    /// Insert a quest, assigning its id. If the quest names a live
    /// structure, the structure's quest slot points back at it.
    pub fn add_quest(&mut self, mut quest: Quest) -> QuestId {
        let id = QuestId(self.next_quest_id);
        self.next_quest_id += 1;
        quest.id = id;
        if let Some(structure) = quest.structure.and_then(|s| self.structure_mut(s)) {
            structure.quest = Some(id);
        }
        self.quests.insert(id, quest);
        id
    }

    pub fn remove_quest(&mut self, id: QuestId) -> Result<Quest, StoreError> {
        self.quests.remove(&id).ok_or(StoreError::QuestNotFound(id))
    }

    pub fn get_quest(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(&id)
    }

    pub fn quest_mut(&mut self, id: QuestId) -> Option<&mut Quest> {
        self.quests.get_mut(&id)
    }

    pub fn update_quest(&mut self, id: QuestId, patch: QuestPatch) -> Result<(), StoreError> {
        let quest = self
            .quests
            .get_mut(&id)
            .ok_or(StoreError::QuestNotFound(id))?;
        if let Some(status) = patch.status {
            quest.status = status;
        }
        if let Some(structure) = patch.structure {
            quest.structure = structure;
        }
        if let Some(work) = patch.work_done_secs {
            quest.work_done_secs = work.max(0.0);
        }
        if let Some(deadline) = patch.deadline_secs {
            quest.deadline_secs = deadline;
        }
        Ok(())
    }

    /// Quests in creation order.
    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub(crate) fn quests_mut(&mut self) -> impl Iterator<Item = &mut Quest> {
        self.quests.values_mut()
    }

    pub fn quest_ids(&self) -> Vec<QuestId> {
        self.quests.keys().copied().collect()
    }

    // ---- Questlines ----

    pub fn add_questline(&mut self, mut questline: Questline) -> QuestlineId {
        let id = QuestlineId(self.next_questline_id);
        self.next_questline_id += 1;
        questline.id = id;
        self.questlines.insert(id, questline);
        id
    }

    pub fn remove_questline(&mut self, id: QuestlineId) -> Result<Questline, StoreError> {
        self.questlines
            .remove(&id)
            .ok_or(StoreError::QuestlineNotFound(id))
    }

    pub fn get_questline(&self, id: QuestlineId) -> Option<&Questline> {
        self.questlines.get(&id)
    }

    pub fn questlines(&self) -> impl Iterator<Item = &Questline> {
        self.questlines.values()
    }

    pub(crate) fn questlines_mut(&mut self) -> impl Iterator<Item = &mut Questline> {
        self.questlines.values_mut()
    }

    // ---- Parties ----

    /// Form a party from the living agents in `members`. Agents already in
    /// another party leave it first.
    pub fn create_party(
        &mut self,
        name: impl Into<String>,
        formation: FormationType,
        members: &[AgentId],
    ) -> PartyId {
        let id = PartyId(self.next_party_id);
        self.next_party_id += 1;
        self.parties.insert(
            id,
            Party {
                id,
                name: name.into(),
                formation,
                members: Vec::new(),
            },
        );
        for &agent in members {
            // Only fails for dead or missing agents, which are skipped.
            let _ = self.add_party_member(id, agent);
        }
        id
    }

    pub fn add_party_member(&mut self, party: PartyId, agent: AgentId) -> Result<(), StoreError> {
        if !self.parties.contains_key(&party) {
            return Err(StoreError::PartyNotFound(party));
        }
        if !self.is_agent_alive(agent) {
            return Err(StoreError::AgentNotFound(agent));
        }
        let previous = self.agent_mut(agent).and_then(|a| a.party.replace(party));
        if let Some(old) = previous.filter(|&p| p != party) {
            if let Some(old) = self.parties.get_mut(&old) {
                old.members.retain(|&m| m != agent);
            }
        }
        if let Some(p) = self.parties.get_mut(&party) {
            if !p.members.contains(&agent) {
                p.members.push(agent);
            }
        }
        Ok(())
    }

    pub fn remove_party_member(
        &mut self,
        party: PartyId,
        agent: AgentId,
    ) -> Result<(), StoreError> {
        let p = self
            .parties
            .get_mut(&party)
            .ok_or(StoreError::PartyNotFound(party))?;
        p.members.retain(|&m| m != agent);
        if let Some(a) = self.agent_mut(agent) {
            if a.party == Some(party) {
                a.party = None;
            }
        }
        Ok(())
    }

    pub fn set_party_formation(
        &mut self,
        party: PartyId,
        formation: FormationType,
    ) -> Result<(), StoreError> {
        let p = self
            .parties
            .get_mut(&party)
            .ok_or(StoreError::PartyNotFound(party))?;
        p.formation = formation;
        Ok(())
    }

    pub fn disband_party(&mut self, party: PartyId) -> Result<Party, StoreError> {
        let removed = self
            .parties
            .remove(&party)
            .ok_or(StoreError::PartyNotFound(party))?;
        for &member in &removed.members {
            if let Some(a) = self.agent_mut(member) {
                if a.party == Some(party) {
                    a.party = None;
                }
            }
        }
        Ok(removed)
    }

    pub fn get_party(&self, id: PartyId) -> Option<&Party> {
        self.parties.get(&id)
    }

    pub fn parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }

    pub(crate) fn parties_mut(&mut self) -> impl Iterator<Item = &mut Party> {
        self.parties.values_mut()
    }

    /// Members of a party in formation slot order. Empty for unknown parties.
    pub fn party_members(&self, party: PartyId) -> &[AgentId] {
        self.parties
            .get(&party)
            .map(|p| p.members.as_slice())
            .unwrap_or_default()
    }

    // ---- Selection ----

    /// Replace the agent selection. Dead and missing ids are ignored.
    /// Returns the new selection size.
    pub fn select(&mut self, ids: impl IntoIterator<Item = AgentId>) -> usize {
        self.selected_agents.clear();
        self.add_to_selection(ids)
    }

    pub fn add_to_selection(&mut self, ids: impl IntoIterator<Item = AgentId>) -> usize {
        for id in ids {
            if self.is_agent_alive(id) {
                self.selected_agents.insert(id);
            }
        }
        self.selected_agents.len()
    }

    pub fn deselect(&mut self, id: AgentId) -> bool {
        self.selected_agents.remove(&id)
    }

    pub fn clear_selection(&mut self) {
        self.selected_agents.clear();
    }

    pub fn is_selected(&self, id: AgentId) -> bool {
        self.selected_agents.contains(&id)
    }

    /// Selected agents in spawn order.
    pub fn selected_agents(&self) -> Vec<AgentId> {
        self.agent_order
            .iter()
            .copied()
            .filter(|id| self.selected_agents.contains(id))
            .collect()
    }

    pub fn selection_count(&self) -> usize {
        self.selected_agents.len()
    }

    pub(crate) fn retain_selection(&mut self, mut keep: impl FnMut(AgentId) -> bool) {
        self.selected_agents.retain(|&id| keep(id));
    }

    /// Set or clear the selected structure. Independent of agent selection.
    pub fn set_selected_structure(&mut self, id: Option<StructureId>) -> Result<(), StoreError> {
        if let Some(structure) = id {
            if !self.contains_structure(structure) {
                return Err(StoreError::StructureNotFound(structure));
            }
        }
        self.selected_structure = id;
        Ok(())
    }

    pub fn selected_structure(&self) -> Option<StructureId> {
        self.selected_structure
    }

    pub fn selection_box(&self) -> SelectionBox {
        self.selection_box
    }

    pub fn set_selection_box(&mut self, selection_box: SelectionBox) {
        self.selection_box = selection_box;
    }

    // ---- Camera ----

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    // ---- Counts ----

    pub fn agent_count(&self) -> usize {
        self.agent_order.len()
    }

    pub fn dragon_count(&self) -> usize {
        self.dragon_order.len()
    }

    pub fn structure_count(&self) -> usize {
        self.structure_order.len()
    }

    pub fn quest_count(&self) -> usize {
        self.quests.len()
    }

    pub fn completed_quest_count(&self) -> usize {
        self.quests
            .values()
            .filter(|q| q.status == QuestStatus::Complete)
            .count()
    }

    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            agent_count: self.agent_count(),
            living_agents: self.living_agents().count(),
            dragon_count: self.dragon_count(),
            structure_count: self.structure_count(),
            quest_count: self.quest_count(),
            completed_quest_count: self.completed_quest_count(),
            party_count: self.party_count(),
        }
    }
}
