// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - State Machine
//
// `reduce` is the only writer of `SimulatorState`. It is total: an action that
// is not legal in the current phase returns the state untouched. Deciding
// whether user input is legal belongs to the command parser.
//
//   idle --START--> await_confirm --CONFIRM_YES--> await_choice
//   await_choice --CHOOSE_SCENARIO--> running --COMPLETE--> done
//   any non-idle --EXIT--> idle
//   any non-idle --RESET--> await_choice

use crate::types::*;

/// Apply one action to the state and return the successor state.
pub fn reduce(state: SimulatorState, action: &SimulatorAction) -> SimulatorState {
    match (state.phase, action) {
        (_, SimulatorAction::Exit) => exit(state),
        (_, SimulatorAction::Reset) => reset(state),

        (Phase::Idle, SimulatorAction::Start) => {
            let mut next = SimulatorState::new();
            next.phase = Phase::AwaitConfirm;
            next.logs.push("Impact simulator started".to_string());
            next
        }

        (Phase::AwaitConfirm, SimulatorAction::ConfirmYes) => {
            let mut next = state;
            next.phase = Phase::AwaitChoice;
            next.logs.push("Confirmed, awaiting scenario choice".to_string());
            next
        }

        (Phase::AwaitChoice, SimulatorAction::ChooseScenario { scenario_id }) => {
            let mut next = state;
            next.phase = Phase::Running;
            next.selected_scenario_id = Some(scenario_id.clone());
            next.timeline_steps = initial_steps();
            next.revealed_systems.clear();
            next.revealed_business_scenarios.clear();
            next.impact_stats = None;
            next.logs.push(format!("Scenario {} selected", scenario_id));
            next
        }

        (Phase::Running, SimulatorAction::TickTimelineStep { step_id, status }) => {
            let mut next = state;
            if let Some(step) = next.timeline_steps.iter_mut().find(|s| s.id == *step_id) {
                if step.status != *status {
                    step.status = *status;
                    next.logs.push(format!("Step '{}' -> {:?}", step.label, status));
                }
            }
            next
        }

        (Phase::Running, SimulatorAction::TickRevealSystem { system_id }) => {
            let mut next = state;
            if push_unique(&mut next.revealed_systems, system_id) {
                next.logs.push(format!("Dependent system revealed: {}", system_id));
            }
            next
        }

        (Phase::Running, SimulatorAction::TickRevealBusinessScenario { scenario_id }) => {
            let mut next = state;
            if push_unique(&mut next.revealed_business_scenarios, scenario_id) {
                next.logs.push(format!("Business scenario revealed: {}", scenario_id));
            }
            next
        }

        (Phase::Running, SimulatorAction::SetImpactStats { stats }) => {
            let mut next = state;
            next.logs.push(format!(
                "Impact computed: {} messages/month across {} counterparties",
                stats.total_volume, stats.affected_entities
            ));
            next.impact_stats = Some(stats.clone());
            next
        }

        (Phase::Running, SimulatorAction::Complete) => {
            let mut next = state;
            next.phase = Phase::Done;
            next.logs.push("Simulation complete".to_string());
            next
        }

        // Stale ticks after EXIT, double confirmations, ticks in done, etc.
        _ => state,
    }
}

fn exit(state: SimulatorState) -> SimulatorState {
    if state.phase == Phase::Idle {
        return state;
    }
    SimulatorState::new()
}

fn reset(state: SimulatorState) -> SimulatorState {
    if state.phase == Phase::Idle {
        return state;
    }
    let mut next = SimulatorState::new();
    next.phase = Phase::AwaitChoice;
    next.logs.push("Simulation reset, awaiting scenario choice".to_string());
    next
}

fn push_unique(track: &mut Vec<String>, id: &str) -> bool {
    if track.iter().any(|existing| existing == id) {
        return false;
    }
    track.push(id.to_string());
    true
}

// ---------------------------------------------------------------------------
// SimulatorStore - reducer host
// ---------------------------------------------------------------------------

/// Owns one `SimulatorState` and funnels every mutation through `reduce`.
#[derive(Debug, Clone, Default)]
pub struct SimulatorStore {
    state: SimulatorState,
    dispatched: u64,
}

impl SimulatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: SimulatorAction) {
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, &action);
        self.dispatched += 1;
    }

    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Number of actions handed to the reducer, legal or not.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::stats::compute_impact_stats;

    fn stats() -> ImpactStats {
        compute_impact_stats(&Catalog::builtin(), &"s1".into()).unwrap()
    }

    fn state_in(phase: Phase) -> SimulatorState {
        let mut state = SimulatorState::new();
        let path = [
            SimulatorAction::Start,
            SimulatorAction::ConfirmYes,
            SimulatorAction::ChooseScenario { scenario_id: "s1".into() },
            SimulatorAction::Complete,
        ];
        let steps = match phase {
            Phase::Idle => 0,
            Phase::AwaitConfirm => 1,
            Phase::AwaitChoice => 2,
            Phase::Running => 3,
            Phase::Done => 4,
        };
        for action in path.iter().take(steps) {
            state = reduce(state, action);
        }
        assert_eq!(state.phase, phase);
        state
    }

    fn every_action() -> Vec<SimulatorAction> {
        vec![
            SimulatorAction::Start,
            SimulatorAction::ConfirmYes,
            SimulatorAction::ChooseScenario { scenario_id: "s2".into() },
            SimulatorAction::TickTimelineStep {
                step_id: StepId::Compute,
                status: StepStatus::Running,
            },
            SimulatorAction::TickRevealSystem { system_id: "crm-intake".to_string() },
            SimulatorAction::TickRevealBusinessScenario { scenario_id: "periodic-review".to_string() },
            SimulatorAction::SetImpactStats { stats: stats() },
            SimulatorAction::Complete,
            SimulatorAction::Reset,
            SimulatorAction::Exit,
        ]
    }

    fn is_legal(phase: Phase, action: &SimulatorAction) -> bool {
        match action {
            SimulatorAction::Exit | SimulatorAction::Reset => phase != Phase::Idle,
            SimulatorAction::Start => phase == Phase::Idle,
            SimulatorAction::ConfirmYes => phase == Phase::AwaitConfirm,
            SimulatorAction::ChooseScenario { .. } => phase == Phase::AwaitChoice,
            _ => phase == Phase::Running,
        }
    }

    #[test]
    fn happy_path_transitions() {
        let mut state = SimulatorState::new();
        assert_eq!(state.phase, Phase::Idle);
        state = reduce(state, &SimulatorAction::Start);
        assert_eq!(state.phase, Phase::AwaitConfirm);
        state = reduce(state, &SimulatorAction::ConfirmYes);
        assert_eq!(state.phase, Phase::AwaitChoice);
        state = reduce(state, &SimulatorAction::ChooseScenario { scenario_id: "s3".into() });
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.selected_scenario_id, Some("s3".into()));
        state = reduce(state, &SimulatorAction::Complete);
        assert_eq!(state.phase, Phase::Done);
    }

    #[test]
    fn illegal_actions_are_no_ops() {
        let phases = [
            Phase::Idle,
            Phase::AwaitConfirm,
            Phase::AwaitChoice,
            Phase::Running,
            Phase::Done,
        ];
        for phase in phases {
            for action in every_action() {
                let before = state_in(phase);
                let after = reduce(before.clone(), &action);
                if !is_legal(phase, &action) {
                    assert_eq!(after, before, "{} in {:?} must be ignored", action.name(), phase);
                }
            }
        }
    }

    #[test]
    fn reveal_is_idempotent() {
        let reveal = SimulatorAction::TickRevealSystem { system_id: "doc-archive".to_string() };
        let mut state = state_in(Phase::Running);
        state = reduce(state, &reveal);
        state = reduce(state, &reveal);
        assert_eq!(state.revealed_systems, vec!["doc-archive".to_string()]);

        let business = SimulatorAction::TickRevealBusinessScenario {
            scenario_id: "alert-escalation".to_string(),
        };
        state = reduce(state, &business);
        state = reduce(state, &business);
        assert_eq!(state.revealed_business_scenarios.len(), 1);
    }

    #[test]
    fn reveal_preserves_order() {
        let mut state = state_in(Phase::Running);
        for id in ["b", "a", "c"] {
            state = reduce(state, &SimulatorAction::TickRevealSystem { system_id: id.to_string() });
        }
        assert_eq!(state.revealed_systems, vec!["b", "a", "c"]);
    }

    #[test]
    fn exit_clears_everything() {
        let mut state = state_in(Phase::Running);
        state = reduce(state, &SimulatorAction::TickRevealSystem { system_id: "x".to_string() });
        state = reduce(state, &SimulatorAction::SetImpactStats { stats: stats() });
        state = reduce(state, &SimulatorAction::Exit);
        assert_eq!(state, SimulatorState::new());
    }

    #[test]
    fn reset_returns_to_choice() {
        let mut state = state_in(Phase::Running);
        state = reduce(state, &SimulatorAction::TickRevealSystem { system_id: "x".to_string() });
        state = reduce(state, &SimulatorAction::SetImpactStats { stats: stats() });
        state = reduce(state, &SimulatorAction::Complete);
        state = reduce(state, &SimulatorAction::Reset);

        assert_eq!(state.phase, Phase::AwaitChoice);
        assert!(state.selected_scenario_id.is_none());
        assert!(state.revealed_systems.is_empty());
        assert!(state.impact_stats.is_none());
        assert!(state.timeline_steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn choosing_clears_reveal_tracks() {
        let mut state = state_in(Phase::AwaitChoice);
        state.revealed_systems.push("leftover".to_string());
        state = reduce(state, &SimulatorAction::ChooseScenario { scenario_id: "s2".into() });
        assert!(state.revealed_systems.is_empty());
    }

    #[test]
    fn step_status_updates_one_entry() {
        let mut state = state_in(Phase::Running);
        state = reduce(
            state,
            &SimulatorAction::TickTimelineStep {
                step_id: StepId::BusinessScenarios,
                status: StepStatus::Running,
            },
        );
        assert_eq!(state.step(StepId::BusinessScenarios).unwrap().status, StepStatus::Running);
        assert_eq!(state.step(StepId::Dependencies).unwrap().status, StepStatus::Pending);
    }

    #[test]
    fn store_counts_dispatches() {
        let mut store = SimulatorStore::new();
        store.dispatch(SimulatorAction::Start);
        store.dispatch(SimulatorAction::Start);
        assert_eq!(store.phase(), Phase::AwaitConfirm);
        assert_eq!(store.dispatched(), 2);
    }
}
