// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Command Parser
//
// Classifies one line of chat input against the current phase. The parser
// decides what is legal; it never touches the state it is given.

use crate::catalog::Catalog;
use crate::types::{ParseOutcome, Phase, SimulatorAction, SimulatorState};

const EXIT_WORDS: [&str; 3] = ["EXIT", "QUIT", "STOP"];
const RESET_WORDS: [&str; 2] = ["RESET", "RESTART"];
const CONFIRM_WORDS: [&str; 5] = ["YES", "Y", "NEXT", "CONTINUE", "START"];

pub struct CommandParser<'a> {
    catalog: &'a Catalog,
}

impl<'a> CommandParser<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn parse(&self, input: &str, state: &SimulatorState) -> ParseOutcome {
        let token = input.trim().to_ascii_uppercase();

        if EXIT_WORDS.contains(&token.as_str()) {
            return ParseOutcome::action(SimulatorAction::Exit);
        }
        if RESET_WORDS.contains(&token.as_str()) {
            return ParseOutcome::action(SimulatorAction::Reset);
        }

        match state.phase {
            Phase::AwaitConfirm => {
                if CONFIRM_WORDS.contains(&token.as_str()) {
                    ParseOutcome::action(SimulatorAction::ConfirmYes)
                } else {
                    ParseOutcome::message("Type YES to continue, or EXIT to leave the simulator.")
                }
            }
            Phase::AwaitChoice => self.parse_choice(&token),
            Phase::Running => ParseOutcome::message(
                "The simulation is running. Please wait for it to finish, or type EXIT to stop it.",
            ),
            Phase::Done => ParseOutcome::message(
                "The simulation has finished. Type RESET to try another scenario or EXIT to leave.",
            ),
            Phase::Idle => ParseOutcome::message(
                "The impact simulator is not active. Open it before sending commands.",
            ),
        }
    }

    fn parse_choice(&self, token: &str) -> ParseOutcome {
        let chosen = if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            token.parse::<usize>().ok().and_then(|n| self.catalog.scenario_by_index(n))
        } else {
            None
        };

        match chosen {
            Some(scenario) => ParseOutcome::action(SimulatorAction::ChooseScenario {
                scenario_id: scenario.id.clone(),
            }),
            None => ParseOutcome::message(format!(
                "Please choose a scenario by number ({}):\n{}",
                self.valid_numbers(),
                self.catalog.menu()
            )),
        }
    }

    fn valid_numbers(&self) -> String {
        (1..=self.catalog.scenarios.len())
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Convenience wrapper over [`CommandParser::parse`].
pub fn parse_command(catalog: &Catalog, input: &str, state: &SimulatorState) -> ParseOutcome {
    CommandParser::new(catalog).parse(input, state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
