// Impact Simulator Soak Runner: seeded command streams against the engine
// Every step is checked against the engine's invariants; any violation fails the run
//
// Usage:
//   cargo run --release --bin soak                      # All profiles (200 runs each)
//   cargo run --release --bin soak -- --runs 20         # Quick mode
//   cargo run --release --bin soak -- CHAOTIC           # Filter by profile name
//   cargo run --release --bin soak -- --steps 1000      # Longer command streams
//   cargo run --release --bin soak -- --trace           # Enable JSONL traces
//   cargo run --release --bin soak -- --seed 42         # Custom base seed

mod invariants;
mod profiles;
mod report;
mod runner;
mod trace;

use impact_sim_engine::EngineConfig;
use profiles::*;
use report::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    steps: usize,
    tick_ms: u32,
    trace: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 200,
        seed: 0,
        steps: 400,
        tick_ms: EngineConfig::default().tick_period_ms,
        trace: false,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(200);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--steps" => {
                i += 1;
                if i < args.len() {
                    cli.steps = args[i].parse().unwrap_or(400);
                }
            }
            "--tick-ms" => {
                i += 1;
                if i < args.len() {
                    cli.tick_ms = args[i].parse().unwrap_or(cli.tick_ms);
                }
            }
            "--trace" => {
                cli.trace = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all_profiles = profiles();

    let to_run: Vec<&Profile> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_profiles.iter()
                .filter(|p| p.name.to_lowercase().contains(&f_lower)
                          || p.label.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_profiles.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No profiles match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let config = EngineConfig { tick_period_ms: cli.tick_ms, ..EngineConfig::default() };
    let trace_dir = if cli.trace {
        Some(std::path::Path::new("soak-results/traces").to_path_buf())
    } else {
        None
    };

    println!("\n  Impact Simulator Soak Runner");
    println!("  PRNG: ChaCha8Rng | Runs/profile: {} | Steps/run: {} | Base seed: {}",
        cli.runs, cli.steps, cli.seed);
    println!("  {:<36} {:>6} {:>10} {:>8} {:>9} {:>8}",
        "Profile", "Pass%", "Completed", "Fires", "Rejected", "Time");
    println!("  {}", "-".repeat(82));

    let suite_start = Instant::now();
    let mut reports = Vec::new();

    for profile in &to_run {
        let runs: Vec<RunResult> = (0..cli.runs as u64)
            .map(|i| runner::run_single(
                profile,
                cli.seed.wrapping_add(i),
                cli.steps,
                config,
                trace_dir.as_deref(),
            ))
            .collect();
        let report = ProfileReport::from_runs(profile.name, profile.label, runs);

        let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };
        println!("  {:<36} {:>5.1}% {:>10.1} {:>8.1} {:>9.1} {:>6.0}us  {}",
            report.label,
            report.pass_rate * 100.0,
            report.runs_completed.mean,
            report.timer_fires.mean,
            report.rejected_inputs.mean,
            report.elapsed_us.mean,
            status,
        );

        for run in report.individual_runs.iter().filter(|r| !r.pass).take(3) {
            if let Some(first) = run.violations.first() {
                println!("      seed {}: {}", run.seed, first);
            }
        }

        reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total_runs: usize = reports.iter().map(|r| r.n_runs).sum();
    let passed: usize = reports.iter()
        .map(|r| r.individual_runs.iter().filter(|run| run.pass).count())
        .sum();
    let failed = total_runs - passed;
    let total_violations: usize = reports.iter()
        .flat_map(|r| r.individual_runs.iter())
        .map(|run| run.violations.len())
        .sum();

    println!("  {}", "-".repeat(82));
    println!("  Runs: {}  Passed: {}  Failed: {}  Violations: {}  Suite time: {:.1}s\n",
        total_runs, passed, failed, total_violations, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = SoakReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        runs_per_profile: cli.runs,
        steps_per_run: cli.steps,
        tick_period_ms: cli.tick_ms,
        summary: Summary { total_runs, passed, failed, total_violations },
        profiles: reports,
    };

    let dir = std::path::Path::new("soak-results");
    if !dir.exists() {
        std::fs::create_dir_all(dir).expect("Failed to create soak-results/");
    }
    let path = dir.join(format!("soak-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize");
    std::fs::write(&path, &json).expect("Failed to write soak report");
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
}
