// Soak Report Types
// Structured output of a soak session, one entry per profile

use serde::Serialize;

// ─── Statistics (per-metric aggregation over seeds) ─────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        Self {
            mean: samples.iter().sum::<f64>() / n as f64,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub profile: String,
    pub seed: u64,
    pub pass: bool,
    pub steps: usize,
    pub runs_started: u32,
    pub runs_completed: u32,
    pub exits: u32,
    pub resets: u32,
    pub timer_fires: u32,
    pub rejected_inputs: u32,
    pub timers_armed: u64,
    pub violations: Vec<String>,
    pub elapsed_us: u128,
}

// ─── Per-Profile Aggregation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub profile_name: String,
    pub label: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub runs_completed: Stats,
    pub timer_fires: Stats,
    pub rejected_inputs: Stats,
    pub elapsed_us: Stats,
    pub individual_runs: Vec<RunResult>,
}

impl ProfileReport {
    pub fn from_runs(name: &str, label: &str, runs: Vec<RunResult>) -> Self {
        let collect = |f: fn(&RunResult) -> f64| runs.iter().map(f).collect::<Vec<f64>>();
        let passed = runs.iter().filter(|r| r.pass).count();
        Self {
            profile_name: name.to_string(),
            label: label.to_string(),
            n_runs: runs.len(),
            pass_rate: if runs.is_empty() { 0.0 } else { passed as f64 / runs.len() as f64 },
            runs_completed: Stats::from_samples(&collect(|r| r.runs_completed as f64)),
            timer_fires: Stats::from_samples(&collect(|r| r.timer_fires as f64)),
            rejected_inputs: Stats::from_samples(&collect(|r| r.rejected_inputs as f64)),
            elapsed_us: Stats::from_samples(&collect(|r| r.elapsed_us as f64)),
            individual_runs: runs,
        }
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SoakReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub runs_per_profile: usize,
    pub steps_per_run: usize,
    pub tick_period_ms: u32,
    pub summary: Summary,
    pub profiles: Vec<ProfileReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_runs: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_violations: usize,
}
