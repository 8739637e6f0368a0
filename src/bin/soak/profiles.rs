// User Behaviour Profiles: seeded command streams for the soak runner
// Each profile is a weighting over what a chat user or host does next

use impact_sim_engine::{Phase, SimulatorAction, StepId, StepStatus};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

// ─── Profile Configuration ──────────────────────────────────────────────────

pub struct Profile {
    pub name: &'static str,
    pub label: &'static str,
    /// Chance per step of typing something unrelated to the phase.
    pub noise: f64,
    /// Chance per running step of typing EXIT instead of waiting.
    pub exit_mid_run: f64,
    /// Chance per running step of typing RESET instead of waiting.
    pub reset_mid_run: f64,
    /// Chance per step of the host closing the simulator panel.
    pub host_close: f64,
    /// Chance per step of a stale tick action posted by the host.
    pub stale_action: f64,
}

pub fn profiles() -> Vec<Profile> {
    vec![
        Profile {
            name: "PATIENT",
            label: "Patient user, happy path",
            noise: 0.0,
            exit_mid_run: 0.0,
            reset_mid_run: 0.0,
            host_close: 0.0,
            stale_action: 0.0,
        },
        Profile {
            name: "IMPATIENT",
            label: "Exits and resets mid-run",
            noise: 0.05,
            exit_mid_run: 0.08,
            reset_mid_run: 0.08,
            host_close: 0.0,
            stale_action: 0.0,
        },
        Profile {
            name: "CHAOTIC",
            label: "Garbage input and stale host actions",
            noise: 0.35,
            exit_mid_run: 0.03,
            reset_mid_run: 0.03,
            host_close: 0.0,
            stale_action: 0.15,
        },
        Profile {
            name: "HOST_CHURN",
            label: "Panel closed and reopened at random",
            noise: 0.05,
            exit_mid_run: 0.02,
            reset_mid_run: 0.02,
            host_close: 0.06,
            stale_action: 0.05,
        },
    ]
}

// ─── Steps ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Step {
    Submit(String),
    Fire,
    Activate,
    Deactivate,
    HostAction(SimulatorAction),
}

impl Step {
    pub fn describe(&self) -> String {
        match self {
            Self::Submit(text) => format!("submit {:?}", text),
            Self::Fire => "fire".to_string(),
            Self::Activate => "activate".to_string(),
            Self::Deactivate => "deactivate".to_string(),
            Self::HostAction(action) => format!("host {}", action.name()),
        }
    }
}

const NOISE_INPUTS: [&str; 12] = [
    "yes", "y", "1", "2", "3", "4", "0", "hello", "", "continue", "reset", "quit",
];

pub struct CommandStream<'a> {
    profile: &'a Profile,
    rng: ChaCha8Rng,
    scenario_count: usize,
}

impl<'a> CommandStream<'a> {
    pub fn new(profile: &'a Profile, rng: ChaCha8Rng, scenario_count: usize) -> Self {
        Self { profile, rng, scenario_count }
    }

    /// Pick the next step given the phase the user currently sees.
    pub fn next_step(&mut self, phase: Phase, active: bool) -> Step {
        if !active {
            return Step::Activate;
        }
        if self.rng.gen_bool(self.profile.host_close) {
            return Step::Deactivate;
        }
        // Stale ticks only arrive after a run was cut short.
        if phase != Phase::Running && self.rng.gen_bool(self.profile.stale_action) {
            return Step::HostAction(self.stale_action());
        }
        if self.rng.gen_bool(self.profile.noise) {
            let i = self.rng.gen_range(0..NOISE_INPUTS.len());
            return Step::Submit(NOISE_INPUTS[i].to_string());
        }

        match phase {
            Phase::Idle => Step::Activate,
            Phase::AwaitConfirm => Step::Submit("yes".to_string()),
            Phase::AwaitChoice => {
                let n = self.rng.gen_range(1..=self.scenario_count);
                Step::Submit(n.to_string())
            }
            Phase::Running => {
                if self.rng.gen_bool(self.profile.exit_mid_run) {
                    Step::Submit("exit".to_string())
                } else if self.rng.gen_bool(self.profile.reset_mid_run) {
                    Step::Submit("reset".to_string())
                } else {
                    Step::Fire
                }
            }
            Phase::Done => {
                if self.rng.gen_bool(0.5) {
                    Step::Submit("reset".to_string())
                } else {
                    Step::Submit("exit".to_string())
                }
            }
        }
    }

    fn stale_action(&mut self) -> SimulatorAction {
        match self.rng.gen_range(0..4) {
            0 => SimulatorAction::TickRevealSystem { system_id: "crm-intake".to_string() },
            1 => SimulatorAction::TickRevealBusinessScenario {
                scenario_id: "periodic-review".to_string(),
            },
            2 => SimulatorAction::TickTimelineStep {
                step_id: StepId::Compute,
                status: StepStatus::Done,
            },
            _ => SimulatorAction::Complete,
        }
    }
}
