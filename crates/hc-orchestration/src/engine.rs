// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Orchestration Engine: owns Tasks, Agents, Edits, Votes, Memory
//! and Workflows, leaning on the Lock Manager for the atomic
//! lock-then-claim step of task assignment.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{info, warn};

use hc_core::{
    compatible_modes, AgentId, Clock, Edit, EditConflictReport, Event, IdGen, ProposalId, SessionId,
    Task, TaskConfig, TaskId, TaskStatus, Vote, WorkflowId,
};
use hc_locks::LockManager;
use hc_storage::{Config, SwarmMode, Workspace};

use crate::agent::{capabilities_for_mode, Agent, AgentStatus};
use crate::error::EngineError;
use crate::scheduler::Scheduler;
use crate::workflow::{WorkflowState, WorkflowStatus};

struct EngineState {
    tasks: HashMap<TaskId, Task>,
    agents: HashMap<AgentId, Agent>,
    edits_by_file: HashMap<String, Vec<Edit>>,
    votes: HashMap<(ProposalId, SessionId), Vote>,
    workflows: HashMap<WorkflowId, WorkflowState>,
    scheduler: Scheduler,
}

pub struct Engine<C: Clock, G: IdGen> {
    clock: C,
    id_gen: G,
    swarm_mode: SwarmMode,
    task_timeout: Duration,
    edit_conflict_window: Duration,
    lock_ttl: Duration,
    locks: Arc<LockManager<C, G>>,
    workspace: Option<Workspace>,
    state: Mutex<EngineState>,
}

impl<C: Clock, G: IdGen> Engine<C, G> {
    pub fn new(clock: C, id_gen: G, config: &Config) -> Self {
        let lock_ttl = Duration::from_secs(config.lock_ttl_secs);
        let locks = Arc::new(LockManager::new(clock.clone(), id_gen.clone(), lock_ttl));
        Self {
            clock,
            id_gen,
            swarm_mode: config.swarm_mode,
            task_timeout: Duration::from_secs(config.task_timeout_secs),
            edit_conflict_window: Duration::from_secs(config.edit_conflict_window_secs),
            lock_ttl,
            locks,
            workspace: None,
            state: Mutex::new(EngineState {
                tasks: HashMap::new(),
                agents: HashMap::new(),
                edits_by_file: HashMap::new(),
                votes: HashMap::new(),
                workflows: HashMap::new(),
                scheduler: Scheduler::new(),
            }),
        }
    }

    /// Attach a workspace, loading locks/claims and the orchestration
    /// state snapshot (tasks, agents, workflows) if present.
    pub fn with_persistence(mut self, workspace: Workspace) -> Self {
        let locks = Arc::new(
            LockManager::new(self.clock.clone(), self.id_gen.clone(), self.lock_ttl)
                .with_persistence(workspace.task_locks_path(), workspace.task_claims_path()),
        );
        self.locks = locks;

        if let Ok(Some(snapshot)) = hc_storage::load_if_present::<OrchestrationSnapshot>(&workspace.orchestration_state_path()) {
            let mut state = self.state.lock();
            state.tasks = snapshot.tasks.into_iter().map(|t| (t.task_id.clone(), t)).collect();
            state.agents = snapshot.agents.into_iter().map(|a| (a.agent_id.clone(), a)).collect();
            state.workflows = snapshot.workflows.into_iter().map(|w| (w.workflow_id.clone(), w)).collect();
        }
        self.workspace = Some(workspace);
        self
    }

    pub fn locks(&self) -> &Arc<LockManager<C, G>> {
        &self.locks
    }

    fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Persist the tasks/agents/workflows snapshot. Memory entries are
    /// persisted individually as they're written; this only covers the
    /// in-memory maps the hub would otherwise lose on restart.
    pub fn save_snapshot(&self) {
        let Some(workspace) = &self.workspace else { return };
        let state = self.state.lock();
        let snapshot = OrchestrationSnapshot {
            tasks: state.tasks.values().cloned().collect(),
            agents: state.agents.values().cloned().collect(),
            workflows: state.workflows.values().cloned().collect(),
        };
        drop(state);
        if let Err(e) = hc_storage::write_atomic(&workspace.orchestration_state_path(), &snapshot) {
            warn!(error = %e, "failed to persist orchestration state");
        }
    }

    // ---- Agents ----------------------------------------------------

    pub fn register_agent(&self, agent_id: AgentId, mode: impl Into<String>) -> Agent {
        let agent = Agent::new(agent_id.clone(), mode, self.now_ms());
        self.state.lock().agents.insert(agent_id, agent.clone());
        agent
    }

    pub fn get_agent(&self, agent_id: &AgentId) -> Option<Agent> {
        self.state.lock().agents.get(agent_id).cloned()
    }

    pub fn list_agents(&self) -> Vec<Agent> {
        self.state.lock().agents.values().cloned().collect()
    }

    pub fn mark_agent_offline(&self, agent_id: &AgentId) {
        if let Some(agent) = self.state.lock().agents.get_mut(agent_id) {
            agent.status = AgentStatus::Offline;
        }
    }

    /// Create `count` synthetic agents for `mode`, optionally with an
    /// initial task assigned to each.
    pub fn spawn_agents(&self, mode: &str, task: Option<TaskConfig>, count: usize) -> (Vec<Agent>, Vec<Event>) {
        let _ = capabilities_for_mode(mode); // validates the mode is known; unknown modes just get no compatibility
        let mut spawned = Vec::with_capacity(count);
        let mut events = Vec::new();

        for _ in 0..count {
            let agent_id = AgentId::new(format!("agent-{}", hc_core::short_random()));
            let agent = self.register_agent(agent_id.clone(), mode);
            spawned.push(agent);

            if let Some(cfg) = task.clone() {
                let (created, mut created_events) = self.create_task(cfg);
                events.push(Event::TaskCreated { task: created.clone() });
                events.append(&mut created_events);
                if let Ok(assigned) = self.assign_task(&created.task_id, &agent_id) {
                    events.push(assigned);
                }
            }
        }
        (spawned, events)
    }

    // ---- Tasks -------------------------------------------------------

    pub fn create_task(&self, config: TaskConfig) -> (Task, Vec<Event>) {
        let task_id = TaskId::new(format!("task-{}", self.id_gen.next()));
        let task = Task::new(task_id.clone(), config, self.now_ms());
        self.state.lock().tasks.insert(task_id.clone(), task.clone());

        let mut events = Vec::new();
        if self.swarm_mode != SwarmMode::Centralized {
            if let Some(event) = self.auto_assign(&task_id) {
                events.push(event);
            }
        }
        // auto_assign may have mutated the stored task; hand back the
        // current state rather than the pre-assignment snapshot.
        let task = self.state.lock().tasks.get(&task_id).cloned().unwrap_or(task);
        (task, events)
    }

    pub fn get_task(&self, task_id: &TaskId) -> Option<Task> {
        self.state.lock().tasks.get(task_id).cloned()
    }

    pub fn list_tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.values().cloned().collect()
    }

    /// Filter idle agents by the task's compatibility map and assign to
    /// the first match. Returns `None` if the task is not pending or no
    /// compatible idle agent exists.
    pub fn auto_assign(&self, task_id: &TaskId) -> Option<Event> {
        let kind = {
            let state = self.state.lock();
            let task = state.tasks.get(task_id)?;
            if task.status != TaskStatus::Pending {
                return None;
            }
            task.kind.clone()
        };

        let modes = compatible_modes(&kind);
        let candidate = {
            let state = self.state.lock();
            state
                .agents
                .values()
                .find(|a| a.is_idle() && modes.contains(&a.mode.as_str()))
                .map(|a| a.agent_id.clone())
        }?;

        self.assign_task(task_id, &candidate).ok()
    }

    pub fn assign_task(&self, task_id: &TaskId, agent_id: &AgentId) -> Result<Event, EngineError> {
        {
            let state = self.state.lock();
            let task = state.tasks.get(task_id).ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
            if task.status != TaskStatus::Pending {
                return Err(EngineError::Locked);
            }
            let agent = state.agents.get(agent_id).ok_or_else(|| EngineError::AgentNotFound(agent_id.to_string()))?;
            if agent.status == AgentStatus::Busy {
                return Err(EngineError::AgentBusy);
            }
        }

        if !self.locks.is_available(task_id) {
            return Err(EngineError::Locked);
        }
        let token = self.locks.acquire(task_id, agent_id).ok_or(EngineError::Locked)?;
        if let Err(e) = self.locks.claim(task_id, agent_id, &token) {
            self.locks.release(task_id, &token);
            return Err(e.into());
        }

        {
            let mut state = self.state.lock();
            if let Some(task) = state.tasks.get_mut(task_id) {
                task.status = TaskStatus::InProgress;
                task.assigned_to = Some(agent_id.clone());
            }
            if let Some(agent) = state.agents.get_mut(agent_id) {
                agent.status = AgentStatus::Busy;
            }
            state.scheduler.set_timeout(&self.clock, task_id.clone(), self.task_timeout);
        }

        info!(task_id = %task_id, agent_id = %agent_id, "task assigned");
        Ok(Event::TaskAssigned { task_id: task_id.clone(), agent_id: agent_id.clone() })
    }

    pub fn complete_task(&self, task_id: &TaskId, agent_id: &AgentId, result: Option<Value>) -> Result<Event, EngineError> {
        let mut state = self.state.lock();
        let task = state.tasks.get_mut(task_id).ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
        if task.assigned_to.as_ref() != Some(agent_id) {
            return Err(EngineError::Forbidden);
        }
        task.status = TaskStatus::Completed;
        task.result = result.clone();
        state.scheduler.cancel(task_id);
        if let Some(agent) = state.agents.get_mut(agent_id) {
            agent.status = AgentStatus::Idle;
        }
        drop(state);

        self.locks.update_status(task_id, agent_id, hc_core::ClaimStatus::Completed);
        Ok(Event::TaskCompleted { task_id: task_id.clone(), result })
    }

    /// Check every pending task deadline; for each fired timeout still
    /// in progress, fail the task, free its agent, emit `task-timeout`,
    /// and attempt to re-assign any other pending task to the freed
    /// agent.
    pub fn handle_task_timeouts(&self) -> Vec<Event> {
        let fired = self.state.lock().scheduler.fired(&self.clock);
        if fired.is_empty() {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut freed_agents = Vec::new();
        let mut closed_claims = Vec::new();

        {
            let mut state = self.state.lock();
            for task_id in &fired {
                let Some(task) = state.tasks.get_mut(task_id) else { continue };
                if task.status != TaskStatus::InProgress {
                    continue;
                }
                let agent_id = task.assigned_to.clone();
                task.status = TaskStatus::Failed;
                if let Some(agent_id) = &agent_id {
                    if let Some(agent) = state.agents.get_mut(agent_id) {
                        agent.status = AgentStatus::Idle;
                        freed_agents.push(agent_id.clone());
                    }
                    closed_claims.push((task_id.clone(), agent_id.clone()));
                    events.push(Event::TaskTimeout { task_id: task_id.clone(), agent_id: agent_id.clone() });
                    warn!(task_id = %task_id, agent_id = %agent_id, "task timed out");
                }
            }
        }

        // Close out the abandoned claim so the lock manager considers
        // the task id available again if it's ever reassigned.
        for (task_id, agent_id) in &closed_claims {
            self.locks.update_status(task_id, agent_id, hc_core::ClaimStatus::Completed);
        }

        if !freed_agents.is_empty() {
            let pending: Vec<TaskId> = {
                let state = self.state.lock();
                state
                    .tasks
                    .values()
                    .filter(|t| t.status == TaskStatus::Pending)
                    .map(|t| t.task_id.clone())
                    .collect()
            };
            for task_id in pending {
                if let Some(event) = self.auto_assign(&task_id) {
                    events.push(event);
                }
            }
        }

        events
    }

    /// Revert any in-progress task owned by a disconnecting agent back
    /// to pending and free the agent for re-assignment elsewhere.
    pub fn handle_agent_disconnect(&self, agent_id: &AgentId) -> Vec<Event> {
        let reverted: Vec<TaskId> = {
            let mut state = self.state.lock();
            if let Some(agent) = state.agents.get_mut(agent_id) {
                agent.status = AgentStatus::Offline;
            }
            let reverted: Vec<TaskId> = state
                .tasks
                .values()
                .filter(|t| t.status == TaskStatus::InProgress && t.assigned_to.as_ref() == Some(agent_id))
                .map(|t| t.task_id.clone())
                .collect();
            for task_id in &reverted {
                if let Some(task) = state.tasks.get_mut(task_id) {
                    task.status = TaskStatus::Pending;
                    task.assigned_to = None;
                }
                state.scheduler.cancel(task_id);
            }
            reverted
        };

        // Close out the abandoned claims so the lock manager considers
        // these task ids available again once reassigned.
        for task_id in &reverted {
            self.locks.update_status(task_id, agent_id, hc_core::ClaimStatus::Completed);
        }

        let mut events = vec![Event::AgentDisconnected { agent_id: agent_id.clone() }];
        for task_id in reverted {
            if let Some(event) = self.auto_assign(&task_id) {
                events.push(event);
            }
        }
        events
    }

    // ---- Edits ---------------------------------------------------------

    /// Record `edit` and report whether it conflicts with a recent edit
    /// to the same file by a different session. `edit.op` is opaque to
    /// the engine: applying it to the actual file contents is the
    /// submitting agent's responsibility, not the hub's.
    pub fn apply_edit(&self, edit: Edit) -> (EditConflictReport, Event) {
        let mut state = self.state.lock();
        let history = state.edits_by_file.entry(edit.file.clone()).or_default();

        let window_ms = self.edit_conflict_window.as_millis() as u64;
        let conflicts: Vec<Edit> = history
            .iter()
            .filter(|prior| prior.session_ref != edit.session_ref)
            .filter(|prior| prior.version_clock.abs_diff(edit.version_clock) < window_ms)
            .cloned()
            .collect();

        history.push(edit.clone());

        let report = EditConflictReport { conflict: !conflicts.is_empty(), conflicts: conflicts.clone() };
        let event = if conflicts.is_empty() {
            Event::EditApplied { edit }
        } else {
            Event::EditConflict { edit, conflicts }
        };
        (report, event)
    }

    // ---- Voting ----------------------------------------------------------

    pub fn record_vote(&self, vote: Vote) -> Event {
        let key = (vote.proposal_id.clone(), vote.session_ref.clone());
        let proposal_id = vote.proposal_id.clone();
        self.state.lock().votes.insert(key, vote);
        Event::VoteRecorded { proposal_id }
    }

    pub fn votes_for(&self, proposal_id: &ProposalId) -> Vec<Vote> {
        self.state.lock().votes.values().filter(|v| v.proposal_id == *proposal_id).cloned().collect()
    }

    /// Complete iff recorded votes on `proposal_id` reach `connected_non_offline`.
    pub fn check_voting_complete(&self, proposal_id: &ProposalId, connected_non_offline: usize) -> bool {
        self.votes_for(proposal_id).len() >= connected_non_offline
    }

    // ---- Workflows -------------------------------------------------------

    pub fn start_workflow(&self, workflow_id: WorkflowId, data: Value) -> Event {
        let now = self.now_ms();
        let state = WorkflowState {
            workflow_id: workflow_id.clone(),
            status: WorkflowStatus::InProgress,
            data,
            started_at_ms: now,
            updated_at_ms: now,
        };
        self.state.lock().workflows.insert(workflow_id.clone(), state);
        Event::WorkflowStarted { workflow_id }
    }

    pub fn update_workflow(&self, workflow_id: &WorkflowId, data: Value) -> Result<Event, EngineError> {
        let mut state = self.state.lock();
        let workflow = state
            .workflows
            .get_mut(workflow_id)
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;
        workflow.data = data;
        workflow.updated_at_ms = self.now_ms();
        Ok(Event::WorkflowUpdated { workflow_id: workflow_id.clone() })
    }

    pub fn complete_workflow(&self, workflow_id: &WorkflowId, data: Value) -> Result<Event, EngineError> {
        let mut state = self.state.lock();
        let workflow = state
            .workflows
            .get_mut(workflow_id)
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;
        workflow.data = data;
        workflow.status = WorkflowStatus::Completed;
        workflow.updated_at_ms = self.now_ms();
        Ok(Event::WorkflowCompleted { workflow_id: workflow_id.clone() })
    }

    pub fn get_workflow(&self, workflow_id: &WorkflowId) -> Option<WorkflowState> {
        self.state.lock().workflows.get(workflow_id).cloned()
    }

    // ---- Memory ------------------------------------------------------------

    pub fn store_memory(&self, key: &str, value: Value) {
        if let Some(workspace) = &self.workspace {
            let entry = crate::workflow::MemoryEntry { key: key.to_string(), value, stored_at_ms: self.now_ms() };
            if let Err(e) = hc_storage::write_atomic(&workspace.memory_entry_path(key), &entry) {
                warn!(error = %e, key, "failed to persist memory entry");
            }
        }
    }

    pub fn retrieve_memory(&self, key: &str) -> Option<Value> {
        let workspace = self.workspace.as_ref()?;
        let entry: crate::workflow::MemoryEntry =
            hc_storage::load_if_present(&workspace.memory_entry_path(key)).ok()??;
        Some(entry.value)
    }

    pub fn list_memory(&self) -> Vec<String> {
        let Some(workspace) = &self.workspace else { return Vec::new() };
        let Ok(entries) = std::fs::read_dir(workspace.memory_dir()) else { return Vec::new() };
        entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.path().file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct OrchestrationSnapshot {
    tasks: Vec<Task>,
    agents: Vec<Agent>,
    workflows: Vec<WorkflowState>,
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
