// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed operation surface for the engine command vocabulary.
//!
//! One method per engine command, grouped the way the engine groups them:
//! RAG maintenance, process and resource management, edges, deadlock
//! detection, recovery, simulation, and system commands. Every method is a
//! thin wrapper over [`EngineClient::send`]; an error-family status in the
//! reply is business data for the caller, not a channel fault.

use crate::client::EngineClient;
use crate::error::EngineResult;
use crate::protocol::{Command, Response};

/// Recovery strategy codes accepted by the `recover` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    TerminateAll = 1,
    TerminateLowestPriority = 2,
    TerminateOne = 3,
    IterativeTermination = 4,
    PreemptResources = 5,
    Rollback = 6,
}

impl RecoveryStrategy {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Victim selection criteria for recovery strategies that pick one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCriteria {
    LowestPriority = 1,
    FewestResources = 2,
    YoungestProcess = 3,
}

impl SelectionCriteria {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Built-in simulation scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    SimpleDeadlock = 0,
    CircularWait = 1,
    DiningPhilosophers = 2,
    Random = 3,
}

impl Scenario {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl EngineClient {
    // === RAG operations ===

    /// Initialize the Resource Allocation Graph.
    pub async fn rag_init(&self) -> EngineResult<Response> {
        self.send(Command::new("rag_init")).await
    }

    /// Reset the RAG to an empty state.
    pub async fn rag_reset(&self) -> EngineResult<Response> {
        self.send(Command::new("rag_reset")).await
    }

    /// Get the full RAG state (processes, resources, edges).
    pub async fn rag_get_state(&self) -> EngineResult<Response> {
        self.send(Command::new("rag_get_state")).await
    }

    // === Process operations ===

    /// Add a process node. The reply's data carries the assigned id.
    pub async fn add_process(&self, name: &str, priority: u32) -> EngineResult<Response> {
        self.send(
            Command::new("add_process")
                .arg("name", name)
                .arg("priority", priority),
        )
        .await
    }

    /// Remove a process node.
    pub async fn remove_process(&self, process_id: u32) -> EngineResult<Response> {
        self.send(Command::new("remove_process").arg("process_id", process_id))
            .await
    }

    /// List all process nodes.
    pub async fn list_processes(&self) -> EngineResult<Response> {
        self.send(Command::new("list_processes")).await
    }

    /// Get one process node.
    pub async fn get_process(&self, process_id: u32) -> EngineResult<Response> {
        self.send(Command::new("get_process").arg("process_id", process_id))
            .await
    }

    // === Resource operations ===

    /// Add a resource node with the given instance count.
    pub async fn add_resource(&self, name: &str, instances: u32) -> EngineResult<Response> {
        self.send(
            Command::new("add_resource")
                .arg("name", name)
                .arg("instances", instances),
        )
        .await
    }

    /// Remove a resource node.
    pub async fn remove_resource(&self, resource_id: u32) -> EngineResult<Response> {
        self.send(Command::new("remove_resource").arg("resource_id", resource_id))
            .await
    }

    /// List all resource nodes.
    pub async fn list_resources(&self) -> EngineResult<Response> {
        self.send(Command::new("list_resources")).await
    }

    /// Get one resource node.
    pub async fn get_resource(&self, resource_id: u32) -> EngineResult<Response> {
        self.send(Command::new("get_resource").arg("resource_id", resource_id))
            .await
    }

    // === Edge operations ===

    /// Create a request edge from process to resource.
    pub async fn request_resource(
        &self,
        process_id: u32,
        resource_id: u32,
    ) -> EngineResult<Response> {
        self.send(
            Command::new("request_resource")
                .arg("process_id", process_id)
                .arg("resource_id", resource_id),
        )
        .await
    }

    /// Allocate a resource to a process (assignment edge).
    pub async fn allocate_resource(
        &self,
        process_id: u32,
        resource_id: u32,
    ) -> EngineResult<Response> {
        self.send(
            Command::new("allocate_resource")
                .arg("process_id", process_id)
                .arg("resource_id", resource_id),
        )
        .await
    }

    /// Release one resource held by a process.
    pub async fn release_resource(
        &self,
        process_id: u32,
        resource_id: u32,
    ) -> EngineResult<Response> {
        self.send(
            Command::new("release_resource")
                .arg("process_id", process_id)
                .arg("resource_id", resource_id),
        )
        .await
    }

    /// Release everything a process holds.
    pub async fn release_all(&self, process_id: u32) -> EngineResult<Response> {
        self.send(Command::new("release_all").arg("process_id", process_id))
            .await
    }

    // === Detection operations ===

    /// Run deadlock detection over the current RAG.
    pub async fn detect_deadlock(&self) -> EngineResult<Response> {
        self.send(Command::new("detect_deadlock")).await
    }

    /// Enumerate all cycles in the RAG.
    pub async fn detect_all_cycles(&self) -> EngineResult<Response> {
        self.send(Command::new("detect_all_cycles")).await
    }

    /// Check whether one process participates in a deadlock.
    pub async fn is_process_deadlocked(&self, process_id: u32) -> EngineResult<Response> {
        self.send(Command::new("is_process_deadlocked").arg("process_id", process_id))
            .await
    }

    /// Get the wait-for graph derived from the RAG.
    pub async fn get_wait_for_graph(&self) -> EngineResult<Response> {
        self.send(Command::new("get_wait_for_graph")).await
    }

    // === Recovery operations ===

    /// Recover from deadlock with the given strategy and victim criteria.
    pub async fn recover(
        &self,
        strategy: RecoveryStrategy,
        criteria: SelectionCriteria,
    ) -> EngineResult<Response> {
        self.send(
            Command::new("recover")
                .arg("strategy", strategy.code())
                .arg("criteria", criteria.code()),
        )
        .await
    }

    /// Ask the engine which recovery strategy it recommends.
    pub async fn recommend_strategy(&self) -> EngineResult<Response> {
        self.send(Command::new("recommend_strategy")).await
    }

    /// Get a cost analysis of the available recovery options.
    pub async fn analyze_options(&self) -> EngineResult<Response> {
        self.send(Command::new("analyze_options")).await
    }

    // === Simulation operations ===

    /// Initialize the simulation subsystem.
    pub async fn sim_init(&self) -> EngineResult<Response> {
        self.send(Command::new("sim_init")).await
    }

    /// Load one of the built-in scenarios.
    pub async fn sim_load_scenario(&self, scenario: Scenario) -> EngineResult<Response> {
        self.send(Command::new("sim_load_scenario").arg("scenario", scenario.code()))
            .await
    }

    /// Start the loaded simulation.
    pub async fn sim_start(&self) -> EngineResult<Response> {
        self.send(Command::new("sim_start")).await
    }

    /// Pause the running simulation.
    pub async fn sim_pause(&self) -> EngineResult<Response> {
        self.send(Command::new("sim_pause")).await
    }

    /// Resume a paused simulation.
    pub async fn sim_resume(&self) -> EngineResult<Response> {
        self.send(Command::new("sim_resume")).await
    }

    /// Stop the simulation.
    pub async fn sim_stop(&self) -> EngineResult<Response> {
        self.send(Command::new("sim_stop")).await
    }

    /// Execute one simulation tick.
    pub async fn sim_tick(&self, auto_detect: bool, auto_recover: bool) -> EngineResult<Response> {
        self.send(
            Command::new("sim_tick")
                .arg("auto_detect", auto_detect)
                .arg("auto_recover", auto_recover),
        )
        .await
    }

    /// Run the simulation for up to `max_ticks` ticks.
    pub async fn sim_run(&self, max_ticks: u32) -> EngineResult<Response> {
        self.send(Command::new("sim_run").arg("max_ticks", max_ticks))
            .await
    }

    /// Get the current simulation state.
    pub async fn sim_get_state(&self) -> EngineResult<Response> {
        self.send(Command::new("sim_get_state")).await
    }

    /// Get the simulation event log.
    pub async fn sim_get_events(&self) -> EngineResult<Response> {
        self.send(Command::new("sim_get_events")).await
    }

    // === System operations ===

    /// Health check; the engine answers "pong".
    pub async fn ping(&self) -> EngineResult<Response> {
        self.send(Command::new("ping")).await
    }

    /// Get the engine name and API version.
    pub async fn get_version(&self) -> EngineResult<Response> {
        self.send(Command::new("get_version")).await
    }

    /// Get the engine's self-describing command documentation.
    pub async fn get_help(&self) -> EngineResult<Response> {
        self.send(Command::new("get_help")).await
    }

    /// Ask the engine to exit, without waiting for a reply.
    ///
    /// Best-effort: the engine may already be gone. Prefer
    /// [`EngineClient::stop`], which wraps this in the full termination
    /// sequence.
    pub async fn shutdown(&self) -> EngineResult<()> {
        self.notify(Command::new("shutdown")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_codes() {
        assert_eq!(RecoveryStrategy::TerminateAll.code(), 1);
        assert_eq!(RecoveryStrategy::TerminateLowestPriority.code(), 2);
        assert_eq!(RecoveryStrategy::TerminateOne.code(), 3);
        assert_eq!(RecoveryStrategy::IterativeTermination.code(), 4);
        assert_eq!(RecoveryStrategy::PreemptResources.code(), 5);
        assert_eq!(RecoveryStrategy::Rollback.code(), 6);
    }

    #[test]
    fn test_criteria_codes() {
        assert_eq!(SelectionCriteria::LowestPriority.code(), 1);
        assert_eq!(SelectionCriteria::FewestResources.code(), 2);
        assert_eq!(SelectionCriteria::YoungestProcess.code(), 3);
    }

    #[test]
    fn test_scenario_codes() {
        assert_eq!(Scenario::SimpleDeadlock.code(), 0);
        assert_eq!(Scenario::CircularWait.code(), 1);
        assert_eq!(Scenario::DiningPhilosophers.code(), 2);
        assert_eq!(Scenario::Random.code(), 3);
    }
}
