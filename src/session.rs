// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Session
//
// Host-side wiring of catalog, reducer store and timeline engine. Every path
// that can change the phase (user input, host buttons, timer fires) ends with
// a resync so the engine sees the new activation inputs immediately.

use serde::Serialize;

use crate::catalog::{Catalog, CatalogError};
use crate::parser::CommandParser;
use crate::reducer::SimulatorStore;
use crate::scheduler::{EngineConfig, EngineInputs, SyncOutcome, TickOutcome, TimelineEngine};
use crate::timer::TimerDriver;
use crate::types::{ParseOutcome, Phase, SimulatorAction, SimulatorState};

/// Serializable view handed to the UI after every interaction.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub active: bool,
    pub state: SimulatorState,
    pub loop_running: bool,
    pub next_tick: Option<u32>,
    pub max_tick: Option<u32>,
}

pub struct SimulatorSession<T: TimerDriver> {
    catalog: Catalog,
    store: SimulatorStore,
    engine: TimelineEngine<T>,
    active: bool,
    notifications: Vec<String>,
}

impl<T: TimerDriver> SimulatorSession<T> {
    pub fn new(catalog: Catalog, timer: T, config: EngineConfig) -> Self {
        Self {
            catalog,
            store: SimulatorStore::new(),
            engine: TimelineEngine::new(timer, config),
            active: false,
            notifications: Vec::new(),
        }
    }

    /// Open the simulator. A fresh session is moved out of `idle` with START.
    pub fn activate(&mut self) -> Result<SyncOutcome, CatalogError> {
        self.active = true;
        if self.store.phase() == Phase::Idle {
            self.store.dispatch(SimulatorAction::Start);
        }
        self.resync()
    }

    /// Close the simulator: stop any loop and discard the run.
    pub fn deactivate(&mut self) -> Result<SyncOutcome, CatalogError> {
        self.active = false;
        self.store.dispatch(SimulatorAction::Exit);
        self.resync()
    }

    /// Parse one line of chat input and apply it when legal.
    pub fn submit(&mut self, input: &str) -> Result<ParseOutcome, CatalogError> {
        let outcome = CommandParser::new(&self.catalog).parse(input, self.store.state());
        if let Some(action) = &outcome.action {
            self.store.dispatch(action.clone());
            self.resync()?;
        }
        Ok(outcome)
    }

    /// Apply an action coming from a host button, bypassing the parser.
    pub fn dispatch(&mut self, action: SimulatorAction) -> Result<SyncOutcome, CatalogError> {
        self.store.dispatch(action);
        self.resync()
    }

    /// Timer callback.
    pub fn fire(&mut self) -> Result<TickOutcome, CatalogError> {
        let phase = self.store.phase();
        let store = &mut self.store;
        let notifications = &mut self.notifications;
        let outcome = self.engine.on_timer(
            phase,
            |action| store.dispatch(action),
            |message| notifications.push(message),
        );
        self.resync()?;
        Ok(outcome)
    }

    pub fn state(&self) -> &SimulatorState {
        self.store.state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active: self.active,
            state: self.store.state().clone(),
            loop_running: self.engine.is_running(),
            next_tick: self.engine.next_tick(),
            max_tick: self.engine.max_tick(),
        }
    }

    /// Drain completion notices produced since the last call.
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine(&self) -> &TimelineEngine<T> {
        &self.engine
    }

    pub fn store(&self) -> &SimulatorStore {
        &self.store
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn resync(&mut self) -> Result<SyncOutcome, CatalogError> {
        let inputs = EngineInputs::from_state(self.active, self.store.state());
        self.engine.sync(&self.catalog, inputs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
