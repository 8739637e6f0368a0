// Per-Step JSONL Trace Recorder
// Outputs one JSON line per soak step for offline inspection

use impact_sim_engine::{ManualTimer, SimulatorSession};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct StepSnapshot {
    pub step: usize,
    pub command: String,
    pub phase: &'static str,
    pub scenario: Option<String>,
    pub loop_running: bool,
    pub next_tick: Option<u32>,
    pub live_timers: usize,
    pub revealed_systems: usize,
    pub revealed_business_scenarios: usize,
    pub has_stats: bool,
    pub violations: Vec<String>,
}

impl StepSnapshot {
    pub fn from_session(
        step: usize,
        command: String,
        session: &SimulatorSession<ManualTimer>,
        violations: &[String],
    ) -> Self {
        let state = session.state();
        Self {
            step,
            command,
            phase: state.phase.label(),
            scenario: state.selected_scenario_id.as_ref().map(|id| id.to_string()),
            loop_running: session.engine().is_running(),
            next_tick: session.engine().next_tick(),
            live_timers: session.engine().timer().live_timers(),
            revealed_systems: state.revealed_systems.len(),
            revealed_business_scenarios: state.revealed_business_scenarios.len(),
            has_stats: state.impact_stats.is_some(),
            violations: violations.to_vec(),
        }
    }
}

pub struct TraceRecorder {
    snapshots: Vec<StepSnapshot>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, snapshot: StepSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
