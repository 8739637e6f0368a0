// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - mailbox-decommissioning what-if engine

pub mod types;
pub mod catalog;
pub mod stats;
pub mod reducer;
pub mod timeline;
pub mod timer;
pub mod scheduler;
pub mod parser;
pub mod session;

pub use types::*;
pub use catalog::{BusinessScenario, Catalog, CatalogError, DependentSystem, ScenarioDef, TrafficRecord};
pub use stats::compute_impact_stats;
pub use reducer::{reduce, SimulatorStore};
pub use timeline::{build_timeline_actions, max_tick};
pub use timer::{IntervalTimer, ManualTimer, TimerDriver};
pub use scheduler::{EngineConfig, EngineInputs, SyncOutcome, TickOutcome, TimelineEngine};
pub use parser::{parse_command, CommandParser};
pub use session::{SessionSnapshot, SimulatorSession};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Host diagnostics: `console.log` in the browser, silent elsewhere.
pub(crate) fn console_log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    log(message);
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

type BrowserSession = SimulatorSession<IntervalTimer>;

/// Browser handle. The interval callback holds only a weak reference, so
/// freeing the handle from JS drops the session and clears its interval.
#[wasm_bindgen]
pub struct Simulator {
    session: Rc<RefCell<BrowserSession>>,
}

impl Simulator {
    fn build(config: EngineConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let session = Rc::new_cyclic(|weak: &Weak<RefCell<BrowserSession>>| {
            let weak = weak.clone();
            let on_fire: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(session) = weak.upgrade() {
                    if let Err(err) = session.borrow_mut().fire() {
                        console_log(&format!("impact-sim: tick failed: {}", err));
                    }
                }
            });
            RefCell::new(SimulatorSession::new(
                Catalog::builtin(),
                IntervalTimer::new(on_fire),
                config,
            ))
        });
        Self { session }
    }
}

#[wasm_bindgen]
impl Simulator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Simulator {
        Self::build(EngineConfig::default())
    }

    /// Construct with a partial `EngineConfig` object; missing fields default.
    pub fn with_config(config: JsValue) -> Result<Simulator, JsValue> {
        let config: EngineConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        Ok(Self::build(config))
    }

    pub fn activate(&self) -> Result<JsValue, JsValue> {
        self.session.borrow_mut().activate().map_err(to_js_error)?;
        Ok(self.state())
    }

    pub fn deactivate(&self) -> Result<JsValue, JsValue> {
        self.session.borrow_mut().deactivate().map_err(to_js_error)?;
        Ok(self.state())
    }

    /// Feed one line of chat input. Returns `{ action, message }`.
    pub fn submit(&self, input: &str) -> Result<JsValue, JsValue> {
        let outcome = self.session.borrow_mut().submit(input).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&outcome).map_err(to_js_error)
    }

    /// Apply an action object posted by a UI button, e.g. `{ type: "EXIT" }`.
    pub fn dispatch(&self, action: JsValue) -> Result<JsValue, JsValue> {
        let action: SimulatorAction = serde_wasm_bindgen::from_value(action).map_err(|e| {
            console_log(&format!("impact-sim: rejected host action: {}", e));
            to_js_error(e)
        })?;
        self.session.borrow_mut().dispatch(action).map_err(to_js_error)?;
        Ok(self.state())
    }

    /// Advance one tick by hand, outside the interval (UI debug controls).
    pub fn step(&self) -> Result<JsValue, JsValue> {
        let outcome = self.session.borrow_mut().fire().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&outcome).map_err(to_js_error)
    }

    pub fn state(&self) -> JsValue {
        let snapshot = self.session.borrow().snapshot();
        serde_wasm_bindgen::to_value(&snapshot).unwrap_or(JsValue::NULL)
    }

    pub fn scenarios(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.session.borrow().catalog()).unwrap_or(JsValue::NULL)
    }

    /// Completion notices for the host's chat log, drained on read.
    pub fn take_notifications(&self) -> JsValue {
        let notices = self.session.borrow_mut().take_notifications();
        serde_wasm_bindgen::to_value(&notices).unwrap_or(JsValue::NULL)
    }

    pub fn tick_period_ms(&self) -> u32 {
        self.session.borrow().engine().config().tick_period_ms
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
