// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Timeline Engine
//
// Replays a run's timeline against the reducer, one virtual tick per timer
// period. The engine owns at most one timer at a time: every change of the
// activation inputs tears the previous loop down before anything else runs.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogError};
use crate::console_log;
use crate::timeline::{actions_at, build_timeline_actions, max_tick};
use crate::timer::TimerDriver;
use crate::types::{Phase, ScenarioId, SimulatorAction, SimulatorState, TimelineAction};

// ─── Constants ──────────────────────────────────────────────────────────────

pub const DEFAULT_TICK_PERIOD_MS: u32 = 250;
pub const DEFAULT_SAFETY_MARGIN_TICKS: u32 = 1;

// ─── Config ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock period between virtual ticks.
    pub tick_period_ms: u32,
    /// Extra ticks the loop may run past the last scheduled tick.
    pub safety_margin_ticks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            safety_margin_ticks: DEFAULT_SAFETY_MARGIN_TICKS,
        }
    }
}

// ─── Inputs / Outcomes ──────────────────────────────────────────────────────

/// The only values whose change starts or stops the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInputs {
    pub active: bool,
    pub phase: Phase,
    pub selected_scenario_id: Option<ScenarioId>,
}

impl EngineInputs {
    pub fn from_state(active: bool, state: &SimulatorState) -> Self {
        Self {
            active,
            phase: state.phase,
            selected_scenario_id: state.selected_scenario_id.clone(),
        }
    }

    fn should_run(&self) -> bool {
        self.active && self.phase == Phase::Running && self.selected_scenario_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Inputs identical to the previous sync; the current loop (if any) keeps going.
    Unchanged,
    /// A new loop was armed.
    Started,
    /// No loop is running after this sync.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickOutcome {
    /// No loop armed; a stale timer fire.
    Inactive,
    /// The phase left `running` before this fire; the loop was torn down.
    Halted,
    Fired {
        tick: u32,
        dispatched: usize,
        completed: bool,
        /// The loop passed its safety bound and released its timer.
        stopped: bool,
    },
}

// ─── Engine ─────────────────────────────────────────────────────────────────

struct ActiveLoop<H> {
    handle: H,
    scenario_id: ScenarioId,
    actions: Vec<TimelineAction>,
    max_tick: u32,
    next_tick: u32,
    completed: bool,
    completion_message: String,
}

pub struct TimelineEngine<T: TimerDriver> {
    config: EngineConfig,
    timer: T,
    last_inputs: Option<EngineInputs>,
    run: Option<ActiveLoop<T::Handle>>,
}

impl<T: TimerDriver> TimelineEngine<T> {
    pub fn new(timer: T, config: EngineConfig) -> Self {
        Self { config, timer, last_inputs: None, run: None }
    }

    /// Reconcile the loop with the host's current inputs.
    ///
    /// Identical inputs are a no-op, so a host may call this after every
    /// render or dispatch. Any change stops the running loop first; a new loop
    /// is armed only while active, running and a scenario is selected.
    ///
    /// # Errors
    /// - `UnknownScenario` if the selected scenario is not in `catalog`. No
    ///   loop is left running in that case.
    pub fn sync(
        &mut self,
        catalog: &Catalog,
        inputs: EngineInputs,
    ) -> Result<SyncOutcome, CatalogError> {
        if self.last_inputs.as_ref() == Some(&inputs) {
            return Ok(SyncOutcome::Unchanged);
        }
        self.teardown();

        let scenario_id = match inputs.selected_scenario_id.clone() {
            Some(id) if inputs.should_run() => id,
            _ => {
                self.last_inputs = Some(inputs);
                return Ok(SyncOutcome::Stopped);
            }
        };
        // Remembered only once armed: a failed build errors again on resync.
        self.last_inputs = None;
        let actions = build_timeline_actions(catalog, &scenario_id)?;
        let title = catalog.scenario(&scenario_id)?.title.clone();
        self.last_inputs = Some(inputs);
        let max_tick = max_tick(&actions);
        let handle = self.timer.start(self.config.tick_period_ms);
        console_log(&format!(
            "impact-sim: loop armed for {} ({} actions over {} ticks)",
            scenario_id,
            actions.len(),
            max_tick
        ));

        self.run = Some(ActiveLoop {
            handle,
            scenario_id,
            actions,
            max_tick,
            next_tick: 1,
            completed: false,
            completion_message: format!(
                "Impact simulation for \"{}\" is complete. Type RESET to try another scenario or EXIT to leave.",
                title
            ),
        });
        Ok(SyncOutcome::Started)
    }

    /// Timer callback: dispatch every action due at the current virtual tick.
    ///
    /// `phase` must be read from the live state at fire time. A fire that
    /// arrives after the phase left `running` dispatches nothing and releases
    /// the timer. `on_complete` runs once per loop, after the batch holding
    /// COMPLETE has been dispatched.
    pub fn on_timer<D, C>(&mut self, phase: Phase, mut dispatch: D, mut on_complete: C) -> TickOutcome
    where
        D: FnMut(SimulatorAction),
        C: FnMut(String),
    {
        if self.run.is_none() {
            return TickOutcome::Inactive;
        }
        if phase != Phase::Running {
            self.teardown();
            return TickOutcome::Halted;
        }

        let margin = self.config.safety_margin_ticks;
        let (tick, dispatched, completed, stopped) = {
            let run = match self.run.as_mut() {
                Some(run) => run,
                None => return TickOutcome::Inactive,
            };
            let tick = run.next_tick;
            let mut dispatched = 0;
            let mut saw_complete = false;
            for due in actions_at(&run.actions, tick) {
                saw_complete |= due.action.is_complete();
                dispatch(due.action.clone());
                dispatched += 1;
            }

            let completed = saw_complete && !run.completed;
            if completed {
                run.completed = true;
                on_complete(run.completion_message.clone());
            }

            run.next_tick += 1;
            let stopped = run.next_tick > run.max_tick.saturating_add(margin);
            (tick, dispatched, completed, stopped)
        };

        if stopped {
            self.teardown();
        }
        TickOutcome::Fired { tick, dispatched, completed, stopped }
    }

    /// Release the loop unconditionally (host teardown).
    pub fn shutdown(&mut self) {
        self.teardown();
        self.last_inputs = None;
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Virtual tick the next timer fire will dispatch.
    pub fn next_tick(&self) -> Option<u32> {
        self.run.as_ref().map(|r| r.next_tick)
    }

    pub fn max_tick(&self) -> Option<u32> {
        self.run.as_ref().map(|r| r.max_tick)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    fn teardown(&mut self) {
        if let Some(run) = self.run.take() {
            console_log(&format!(
                "impact-sim: loop for {} released at tick {}",
                run.scenario_id, run.next_tick
            ));
            self.timer.stop(run.handle);
        }
    }
}

impl<T: TimerDriver> Drop for TimelineEngine<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::SimulatorStore;
    use crate::timer::ManualTimer;

    fn running_store(scenario: &str) -> SimulatorStore {
        let mut store = SimulatorStore::new();
        store.dispatch(SimulatorAction::Start);
        store.dispatch(SimulatorAction::ConfirmYes);
        store.dispatch(SimulatorAction::ChooseScenario { scenario_id: scenario.into() });
        store
    }

    fn engine() -> TimelineEngine<ManualTimer> {
        TimelineEngine::new(ManualTimer::new(), EngineConfig::default())
    }

    fn fire(
        engine: &mut TimelineEngine<ManualTimer>,
        store: &mut SimulatorStore,
        notices: &mut Vec<String>,
    ) -> TickOutcome {
        let phase = store.phase();
        engine.on_timer(phase, |a| store.dispatch(a), |m| notices.push(m))
    }

    #[test]
    fn inactive_inputs_do_not_arm() {
        let catalog = Catalog::builtin();
        let mut engine = engine();
        let store = running_store("s1");

        let outcome = engine.sync(&catalog, EngineInputs::from_state(false, store.state()));
        assert_eq!(outcome, Ok(SyncOutcome::Stopped));
        assert!(!engine.is_running());
        assert_eq!(engine.timer().live_timers(), 0);
    }

    #[test]
    fn resync_with_same_inputs_is_single_flight() {
        let catalog = Catalog::builtin();
        let mut engine = engine();
        let mut store = running_store("s1");
        let mut notices = Vec::new();

        let inputs = EngineInputs::from_state(true, store.state());
        assert_eq!(engine.sync(&catalog, inputs.clone()), Ok(SyncOutcome::Started));
        assert_eq!(engine.sync(&catalog, inputs), Ok(SyncOutcome::Unchanged));
        assert_eq!(engine.timer().live_timers(), 1);
        assert_eq!(engine.timer().started(), 1);

        let first = fire(&mut engine, &mut store, &mut notices);
        assert_eq!(
            first,
            TickOutcome::Fired { tick: 1, dispatched: 1, completed: false, stopped: false }
        );
        assert_eq!(store.dispatched(), 4);
    }

    #[test]
    fn full_run_completes_once_and_stops() {
        let catalog = Catalog::builtin();
        let mut engine = engine();
        let mut store = running_store("s2");
        let mut notices = Vec::new();

        engine.sync(&catalog, EngineInputs::from_state(true, store.state())).unwrap();
        let max = engine.max_tick().unwrap();

        for _ in 0..max {
            fire(&mut engine, &mut store, &mut notices);
        }
        assert_eq!(store.phase(), Phase::Done);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("sanctions alerts"));

        // Phase is done: the next fire halts the loop instead of ticking.
        assert_eq!(fire(&mut engine, &mut store, &mut notices), TickOutcome::Halted);
        assert_eq!(engine.timer().live_timers(), 0);
        assert_eq!(fire(&mut engine, &mut store, &mut notices), TickOutcome::Inactive);
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn safety_margin_stops_loop_without_complete() {
        // Phase is forced to stay `running` by never applying dispatched actions.
        let catalog = Catalog::builtin();
        let mut engine = engine();
        let store = running_store("s1");
        engine.sync(&catalog, EngineInputs::from_state(true, store.state())).unwrap();
        let max = engine.max_tick().unwrap();

        let mut last = TickOutcome::Inactive;
        let mut fires = 0;
        while engine.is_running() {
            last = engine.on_timer(Phase::Running, |_| {}, |_| {});
            fires += 1;
        }
        assert_eq!(fires, max + DEFAULT_SAFETY_MARGIN_TICKS);
        assert_eq!(
            last,
            TickOutcome::Fired { tick: max + 1, dispatched: 0, completed: false, stopped: true }
        );
        assert_eq!(engine.timer().live_timers(), 0);
    }

    #[test]
    fn input_change_rearms_exactly_one_timer() {
        let catalog = Catalog::builtin();
        let mut engine = engine();
        let mut store = running_store("s1");

        engine.sync(&catalog, EngineInputs::from_state(true, store.state())).unwrap();
        store.dispatch(SimulatorAction::Reset);
        store.dispatch(SimulatorAction::ChooseScenario { scenario_id: "s3".into() });
        // Host skipped the intermediate render; only the new scenario id is seen.
        assert_eq!(
            engine.sync(&catalog, EngineInputs::from_state(true, store.state())),
            Ok(SyncOutcome::Started)
        );
        assert_eq!(engine.timer().live_timers(), 1);
        assert_eq!(engine.timer().started(), 2);
        assert_eq!(engine.next_tick(), Some(1));
    }

    #[test]
    fn unknown_scenario_leaves_no_loop() {
        let catalog = Catalog::builtin();
        let mut engine = engine();
        let inputs = EngineInputs {
            active: true,
            phase: Phase::Running,
            selected_scenario_id: Some("ghost".into()),
        };
        let result = engine.sync(&catalog, inputs.clone());
        assert_eq!(result, Err(CatalogError::UnknownScenario("ghost".to_string())));
        assert!(!engine.is_running());
        assert_eq!(engine.timer().live_timers(), 0);

        // Same inputs again: still an error, never Unchanged.
        assert_eq!(
            engine.sync(&catalog, inputs),
            Err(CatalogError::UnknownScenario("ghost".to_string()))
        );
        assert_eq!(engine.timer().started(), 0);
    }

    #[test]
    fn config_period_reaches_timer() {
        let catalog = Catalog::builtin();
        let config = EngineConfig { tick_period_ms: 40, ..EngineConfig::default() };
        let mut engine = TimelineEngine::new(ManualTimer::new(), config);
        let store = running_store("s1");
        engine.sync(&catalog, EngineInputs::from_state(true, store.state())).unwrap();
        assert_eq!(engine.timer().last_period_ms(), Some(40));
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: EngineConfig = serde_json::from_str(r#"{"tick_period_ms": 100}"#).unwrap();
        assert_eq!(config.tick_period_ms, 100);
        assert_eq!(config.safety_margin_ticks, DEFAULT_SAFETY_MARGIN_TICKS);
    }
}
