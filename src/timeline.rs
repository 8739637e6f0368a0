// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Timeline Builder
//
// Turns a chosen scenario into the declarative schedule the engine replays.
// Ticks are ordinals only; wall-clock pacing belongs to the scheduler.

use crate::catalog::{Catalog, CatalogError};
use crate::stats::compute_impact_stats;
use crate::types::{ScenarioId, SimulatorAction, StepId, StepStatus, TimelineAction};

/// Build the full action schedule for one run of `scenario_id`.
///
/// With N dependent systems and M business scenarios the schedule spans
/// N + M + 6 ticks. Actions sharing a tick are returned in dispatch order.
///
/// # Errors
/// - `UnknownScenario` if `scenario_id` is not in the catalog.
pub fn build_timeline_actions(
    catalog: &Catalog,
    scenario_id: &ScenarioId,
) -> Result<Vec<TimelineAction>, CatalogError> {
    let stats = compute_impact_stats(catalog, scenario_id)?;
    let mut timeline = TimelineWriter::default();

    timeline.advance();
    timeline.step(StepId::Dependencies, StepStatus::Running);

    for system in &catalog.systems {
        timeline.advance();
        timeline.push(
            SimulatorAction::TickRevealSystem { system_id: system.id.clone() },
            format!("Reveal dependent system {}", system.name),
        );
    }

    timeline.advance();
    timeline.step(StepId::Dependencies, StepStatus::Done);
    timeline.step(StepId::BusinessScenarios, StepStatus::Running);

    for business in &catalog.business_scenarios {
        timeline.advance();
        timeline.push(
            SimulatorAction::TickRevealBusinessScenario { scenario_id: business.id.clone() },
            format!("Reveal business scenario {}", business.name),
        );
    }

    timeline.advance();
    timeline.step(StepId::BusinessScenarios, StepStatus::Done);
    timeline.step(StepId::Compute, StepStatus::Running);

    timeline.advance();
    timeline.push(
        SimulatorAction::SetImpactStats { stats },
        format!("Publish impact stats for {}", scenario_id),
    );
    timeline.step(StepId::Compute, StepStatus::Done);
    timeline.step(StepId::Recommendations, StepStatus::Running);

    timeline.advance();
    timeline.step(StepId::Recommendations, StepStatus::Done);

    timeline.advance();
    timeline.push(SimulatorAction::Complete, "Complete run".to_string());

    Ok(timeline.actions)
}

/// Highest tick in the schedule, 0 for an empty schedule.
pub fn max_tick(actions: &[TimelineAction]) -> u32 {
    actions.iter().map(|a| a.at_tick).max().unwrap_or(0)
}

/// Iterator over the actions due at exactly `tick`, in declaration order.
pub fn actions_at(actions: &[TimelineAction], tick: u32) -> impl Iterator<Item = &TimelineAction> {
    actions.iter().filter(move |a| a.at_tick == tick)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TimelineWriter {
    tick: u32,
    actions: Vec<TimelineAction>,
}

impl TimelineWriter {
    fn advance(&mut self) {
        self.tick += 1;
    }

    fn push(&mut self, action: SimulatorAction, description: String) {
        self.actions.push(TimelineAction {
            at_tick: self.tick,
            action,
            description: Some(description),
        });
    }

    fn step(&mut self, step_id: StepId, status: StepStatus) {
        let verb = match status {
            StepStatus::Pending => "Reset",
            StepStatus::Running => "Start",
            StepStatus::Done => "Finish",
        };
        self.push(
            SimulatorAction::TickTimelineStep { step_id, status },
            format!("{} step '{}'", verb, step_id.label()),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
