// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Type Definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Identifier of a decommissioning scenario in the catalog ("s1", "s2", ...).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub String);

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScenarioId {
    fn from(s: &str) -> Self { ScenarioId(s.to_string()) }
}

impl From<String> for ScenarioId {
    fn from(s: String) -> Self { ScenarioId(s) }
}

// ─── Phase ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    AwaitConfirm,
    AwaitChoice,
    Running,
    Done,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitConfirm => "await_confirm",
            Self::AwaitChoice => "await_choice",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

// ─── Timeline Steps ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Dependencies,
    BusinessScenarios,
    Compute,
    Recommendations,
}

impl StepId {
    pub const ALL: [StepId; 4] = [
        StepId::Dependencies,
        StepId::BusinessScenarios,
        StepId::Compute,
        StepId::Recommendations,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dependencies => "Map dependent systems",
            Self::BusinessScenarios => "Trace business scenarios",
            Self::Compute => "Compute impact",
            Self::Recommendations => "Draft recommendations",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineStep {
    pub id: StepId,
    pub label: String,
    pub status: StepStatus,
}

impl TimelineStep {
    pub fn pending(id: StepId) -> Self {
        Self { id, label: id.label().to_string(), status: StepStatus::Pending }
    }
}

/// Fresh progress board: every stage pending, in display order.
pub fn initial_steps() -> Vec<TimelineStep> {
    StepId::ALL.iter().copied().map(TimelineStep::pending).collect()
}

// ─── Impact Stats ────────────────────────────────────────────────────────────

/// Volume attributed to one segment or region, with its share of the total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breakdown {
    pub key: String,
    pub volume: u64,
    /// Percent of total volume, one decimal place.
    pub share_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: u32,
    pub name: String,
    pub segment: String,
    pub region: String,
    pub volume: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpactStats {
    pub scenario_id: ScenarioId,
    /// Monthly message volume routed through the decommissioned mailbox.
    pub total_volume: u64,
    pub affected_entities: u32,
    pub by_segment: Vec<Breakdown>,
    pub by_region: Vec<Breakdown>,
    pub top_impacted: Vec<RankedEntry>,
}

// ─── Actions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulatorAction {
    Start,
    ConfirmYes,
    ChooseScenario { scenario_id: ScenarioId },
    TickTimelineStep { step_id: StepId, status: StepStatus },
    TickRevealSystem { system_id: String },
    TickRevealBusinessScenario { scenario_id: String },
    SetImpactStats { stats: ImpactStats },
    Complete,
    Reset,
    Exit,
}

impl SimulatorAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::ConfirmYes => "CONFIRM_YES",
            Self::ChooseScenario { .. } => "CHOOSE_SCENARIO",
            Self::TickTimelineStep { .. } => "TICK_TIMELINE_STEP",
            Self::TickRevealSystem { .. } => "TICK_REVEAL_SYSTEM",
            Self::TickRevealBusinessScenario { .. } => "TICK_REVEAL_BUSINESS_SCENARIO",
            Self::SetImpactStats { .. } => "SET_IMPACT_STATS",
            Self::Complete => "COMPLETE",
            Self::Reset => "RESET",
            Self::Exit => "EXIT",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// One scheduled entry of a run's timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineAction {
    pub at_tick: u32,
    pub action: SimulatorAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ─── SimulatorState ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulatorState {
    pub phase: Phase,
    pub selected_scenario_id: Option<ScenarioId>,
    pub timeline_steps: Vec<TimelineStep>,
    pub revealed_systems: Vec<String>,
    pub revealed_business_scenarios: Vec<String>,
    pub impact_stats: Option<ImpactStats>,
    pub logs: Vec<String>,
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            selected_scenario_id: None,
            timeline_steps: initial_steps(),
            revealed_systems: Vec::new(),
            revealed_business_scenarios: Vec::new(),
            impact_stats: None,
            logs: Vec::new(),
        }
    }
}

impl SimulatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self, id: StepId) -> Option<&TimelineStep> {
        self.timeline_steps.iter().find(|s| s.id == id)
    }
}

// ─── Parser Outcome ──────────────────────────────────────────────────────────

/// Result of classifying one line of user input. Exactly one field is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseOutcome {
    pub action: Option<SimulatorAction>,
    pub message: Option<String>,
}

impl ParseOutcome {
    pub fn action(action: SimulatorAction) -> Self {
        Self { action: Some(action), message: None }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self { action: None, message: Some(message.into()) }
    }
}
