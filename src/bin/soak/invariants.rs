// Invariant Checks: evaluated after every soak step
// Each check returns a human-readable violation, never panics

use impact_sim_engine::{ManualTimer, Phase, SimulatorSession, SimulatorState};

use crate::profiles::Step;

/// What the runner remembers from just before a step.
pub struct Before {
    pub state: SimulatorState,
    pub dispatched: u64,
    pub loop_running: bool,
}

impl Before {
    pub fn capture(session: &SimulatorSession<ManualTimer>) -> Self {
        Self {
            state: session.state().clone(),
            dispatched: session.store().dispatched(),
            loop_running: session.engine().is_running(),
        }
    }
}

pub fn check(
    before: &Before,
    step: &Step,
    session: &SimulatorSession<ManualTimer>,
    notices: usize,
) -> Vec<String> {
    let mut violations = Vec::new();
    let state = session.state();
    let engine = session.engine();
    let live = engine.timer().live_timers();

    if live > 1 {
        violations.push(format!("{} live timers", live));
    }
    if (live == 1) != engine.is_running() {
        violations.push(format!(
            "timer/loop mismatch: {} live timers, loop running = {}",
            live,
            engine.is_running()
        ));
    }
    if engine.is_running() && (state.phase != Phase::Running || !session.is_active()) {
        violations.push(format!("loop running in phase {}", state.phase.label()));
    }

    if has_duplicates(&state.revealed_systems) {
        violations.push("duplicate system reveal".to_string());
    }
    if has_duplicates(&state.revealed_business_scenarios) {
        violations.push("duplicate business scenario reveal".to_string());
    }

    match state.phase {
        Phase::Done if state.impact_stats.is_none() => {
            violations.push("done without impact stats".to_string());
        }
        Phase::Idle | Phase::AwaitConfirm | Phase::AwaitChoice if state.impact_stats.is_some() => {
            violations.push(format!("impact stats present in {}", state.phase.label()));
        }
        _ => {}
    }

    if before.state.phase == Phase::Done && state.phase == Phase::Done {
        if before.state.revealed_systems != state.revealed_systems
            || before.state.revealed_business_scenarios != state.revealed_business_scenarios
        {
            violations.push("reveal track mutated in done".to_string());
        }
    }

    if before.state.phase == Phase::Running && state.phase == Phase::Running {
        if !state.revealed_systems.starts_with(&before.state.revealed_systems) {
            violations.push("system reveal track shrank while running".to_string());
        }
    }

    if let Step::Fire = step {
        if !before.loop_running && session.store().dispatched() != before.dispatched {
            violations.push("timer fire dispatched without an armed loop".to_string());
        }
        let finished = before.state.phase == Phase::Running && state.phase == Phase::Done;
        if finished && notices != 1 {
            violations.push(format!("run finished with {} completion notices", notices));
        }
        if !finished && notices != 0 {
            violations.push(format!("{} completion notices without finishing", notices));
        }
    } else if notices != 0 {
        violations.push(format!("{} completion notices outside a timer fire", notices));
    }

    violations
}

fn has_duplicates(track: &[String]) -> bool {
    track.iter().enumerate().any(|(i, id)| track[..i].contains(id))
}
