// Soak Run Infrastructure: one seeded command stream per run
// Drives a headless session with a manual timer and checks invariants per step

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use impact_sim_engine::*;

use crate::invariants::{check, Before};
use crate::profiles::{CommandStream, Profile, Step};
use crate::report::RunResult;
use crate::trace::{StepSnapshot, TraceRecorder};

use std::time::Instant;

/// Run a single profile iteration with a specific seed.
pub fn run_single(
    profile: &Profile,
    seed: u64,
    steps: usize,
    config: EngineConfig,
    trace_dir: Option<&std::path::Path>,
) -> RunResult {
    let start = Instant::now();
    let catalog = Catalog::builtin();
    let scenario_count = catalog.scenarios.len();
    let mut session = SimulatorSession::new(catalog, ManualTimer::new(), config);
    let mut stream = CommandStream::new(profile, ChaCha8Rng::seed_from_u64(seed), scenario_count);
    let mut trace = trace_dir.map(|_| TraceRecorder::new());

    let mut result = RunResult {
        profile: profile.name.to_string(),
        seed,
        pass: true,
        steps,
        runs_started: 0,
        runs_completed: 0,
        exits: 0,
        resets: 0,
        timer_fires: 0,
        rejected_inputs: 0,
        timers_armed: 0,
        violations: Vec::new(),
        elapsed_us: 0,
    };

    for i in 0..steps {
        let step = stream.next_step(session.state().phase, session.is_active());
        let before = Before::capture(&session);

        let applied = apply(&mut session, &step, &mut result);
        let notices = session.take_notifications().len();

        let mut violations = match applied {
            Ok(()) => check(&before, &step, &session, notices),
            Err(e) => vec![format!("engine error: {}", e)],
        };
        tally_transition(&before.state, session.state(), &mut result);

        if let Some(ref mut t) = trace {
            t.record(StepSnapshot::from_session(i, step.describe(), &session, &violations));
        }
        for v in violations.drain(..) {
            result.violations.push(format!("step {} ({}): {}", i, step.describe(), v));
        }
    }

    if let (Some(t), Some(dir)) = (&trace, trace_dir) {
        let path = dir.join(format!("{}-seed-{}.jsonl", profile.name.to_lowercase(), seed));
        if let Err(e) = t.write_jsonl(&path) {
            eprintln!("  Warning: failed to write trace: {}", e);
        }
    }

    result.timers_armed = session.engine().timer().started();
    result.pass = result.violations.is_empty();
    result.elapsed_us = start.elapsed().as_micros();
    result
}

fn apply(
    session: &mut SimulatorSession<ManualTimer>,
    step: &Step,
    result: &mut RunResult,
) -> Result<(), CatalogError> {
    match step {
        Step::Submit(text) => {
            let outcome = session.submit(text)?;
            if outcome.message.is_some() {
                result.rejected_inputs += 1;
            }
        }
        Step::Fire => {
            session.fire()?;
            result.timer_fires += 1;
        }
        Step::Activate => {
            session.activate()?;
        }
        Step::Deactivate => {
            session.deactivate()?;
        }
        Step::HostAction(action) => {
            session.dispatch(action.clone())?;
        }
    }
    Ok(())
}

fn tally_transition(before: &SimulatorState, after: &SimulatorState, result: &mut RunResult) {
    match (before.phase, after.phase) {
        (Phase::AwaitChoice, Phase::Running) => result.runs_started += 1,
        (Phase::Running, Phase::Done) => result.runs_completed += 1,
        (from, Phase::Idle) if from != Phase::Idle => result.exits += 1,
        (from, Phase::AwaitChoice) if from != Phase::AwaitChoice && from != Phase::AwaitConfirm => {
            result.resets += 1
        }
        _ => {}
    }
}
