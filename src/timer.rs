// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Impact Simulator Engine - Timer Drivers
//
// The scheduler never touches a clock directly. It asks a driver for a
// periodic timer, holds the returned handle for the lifetime of one loop and
// hands it back on teardown. `stop` consumes the handle, so a loop cannot be
// stopped twice or outlive its handle.

use std::collections::BTreeSet;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

pub trait TimerDriver {
    type Handle;

    /// Arm a periodic timer firing every `period_ms` milliseconds.
    fn start(&mut self, period_ms: u32) -> Self::Handle;

    /// Disarm the timer and release everything it holds.
    fn stop(&mut self, handle: Self::Handle);
}

// ---------------------------------------------------------------------------
// ManualTimer - deterministic driver for tests and headless runs
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub struct ManualHandle(u64);

/// Records armed timers without scheduling anything; the caller fires ticks.
#[derive(Debug, Default)]
pub struct ManualTimer {
    next_id: u64,
    live: BTreeSet<u64>,
    started: u64,
    last_period_ms: Option<u32>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers armed and not yet stopped.
    pub fn live_timers(&self) -> usize {
        self.live.len()
    }

    /// Timers armed over the driver's lifetime.
    pub fn started(&self) -> u64 {
        self.started
    }

    pub fn last_period_ms(&self) -> Option<u32> {
        self.last_period_ms
    }
}

impl TimerDriver for ManualTimer {
    type Handle = ManualHandle;

    fn start(&mut self, period_ms: u32) -> ManualHandle {
        self.next_id += 1;
        self.started += 1;
        self.live.insert(self.next_id);
        self.last_period_ms = Some(period_ms);
        ManualHandle(self.next_id)
    }

    fn stop(&mut self, handle: ManualHandle) {
        self.live.remove(&handle.0);
    }
}

// ---------------------------------------------------------------------------
// IntervalTimer - browser setInterval
// ---------------------------------------------------------------------------

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = setInterval)]
    fn set_interval(handler: &Closure<dyn FnMut()>, timeout: u32) -> i32;

    #[wasm_bindgen(js_name = clearInterval)]
    fn clear_interval(id: i32);
}

pub struct IntervalHandle {
    id: i32,
    closure: Closure<dyn FnMut()>,
}

/// Arms `setInterval` timers that call `on_fire` each period.
///
/// A stopped handle may belong to the closure currently executing (the loop
/// stops itself from inside its own tick), so its closure is parked in
/// `retired` and freed on the next `start` or when the driver is dropped.
pub struct IntervalTimer {
    on_fire: Rc<dyn Fn()>,
    retired: Vec<Closure<dyn FnMut()>>,
}

impl IntervalTimer {
    pub fn new(on_fire: Rc<dyn Fn()>) -> Self {
        Self { on_fire, retired: Vec::new() }
    }
}

impl TimerDriver for IntervalTimer {
    type Handle = IntervalHandle;

    fn start(&mut self, period_ms: u32) -> IntervalHandle {
        self.retired.clear();
        let on_fire = Rc::clone(&self.on_fire);
        let closure = Closure::wrap(Box::new(move || on_fire()) as Box<dyn FnMut()>);
        let id = set_interval(&closure, period_ms);
        IntervalHandle { id, closure }
    }

    fn stop(&mut self, handle: IntervalHandle) {
        clear_interval(handle.id);
        self.retired.push(handle.closure);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_timer_tracks_live_handles() {
        let mut timer = ManualTimer::new();
        let a = timer.start(250);
        let b = timer.start(100);
        assert_eq!(timer.live_timers(), 2);
        assert_eq!(timer.last_period_ms(), Some(100));

        timer.stop(a);
        assert_eq!(timer.live_timers(), 1);
        timer.stop(b);
        assert_eq!(timer.live_timers(), 0);
        assert_eq!(timer.started(), 2);
    }

    #[test]
    fn handles_are_distinct() {
        let mut timer = ManualTimer::new();
        let a = timer.start(250);
        let b = timer.start(250);
        assert_ne!(a, b);
    }
}
