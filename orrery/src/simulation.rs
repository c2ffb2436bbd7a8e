//! Simulation state shared by the animation loop and the speed control

use std::cell::Cell;
use std::time::Instant;

/// Source of elapsed time in seconds. Must never run backwards.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall-clock seconds since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and headless stepping
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { now: Cell::new(start) }
    }

    /// # Panics
    ///
    /// Panics if `t` is earlier than the current time.
    pub fn set(&self, t: f64) {
        assert!(t >= self.now.get(), "clock must not run backwards");
        self.now.set(t);
    }

    pub fn advance(&self, dt: f64) {
        self.set(self.now.get() + dt.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Speed multiplier plus the clock that drives orbital phase
#[derive(Debug)]
pub struct SimulationState<C = MonotonicClock> {
    speed_multiplier: f32,
    clock: C,
}

impl SimulationState<MonotonicClock> {
    pub fn new(initial_speed: f32) -> Self {
        Self::with_clock(initial_speed, MonotonicClock::new())
    }
}

impl<C: Clock> SimulationState<C> {
    /// Negative speeds start at 0
    pub fn with_clock(initial_speed: f32, clock: C) -> Self {
        let speed_multiplier = if initial_speed.is_finite() { initial_speed.max(0.0) } else { 1.0 };
        Self { speed_multiplier, clock }
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Current phase time in seconds
    pub fn time(&self) -> f64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn set_speed_multiplier(&mut self, speed: f32) {
        debug_assert!(speed >= 0.0 && speed.is_finite());
        self.speed_multiplier = speed;
    }
}

impl Default for SimulationState<MonotonicClock> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_forward() {
        let clock = ManualClock::new(0.0);
        clock.advance(1.5);
        clock.advance(-3.0);
        assert_eq!(clock.now(), 1.5);
        clock.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    #[should_panic(expected = "must not run backwards")]
    fn manual_clock_rejects_rewind() {
        let clock = ManualClock::new(5.0);
        clock.set(4.0);
    }

    #[test]
    fn monotonic_clock_is_non_decreasing() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(first >= 0.0);
        assert!(second >= first);
    }

    #[test]
    fn state_defaults_to_unit_speed_and_reads_the_clock() {
        let state = SimulationState::with_clock(1.0, ManualClock::new(3.0));
        assert_eq!(state.speed_multiplier(), 1.0);
        assert_eq!(state.time(), 3.0);
        state.clock().advance(2.0);
        assert_eq!(state.time(), 5.0);
        assert_eq!(SimulationState::<MonotonicClock>::default().speed_multiplier(), 1.0);
    }

    #[test]
    fn negative_initial_speed_starts_frozen() {
        let state = SimulationState::with_clock(-2.0, ManualClock::default());
        assert_eq!(state.speed_multiplier(), 0.0);
    }
}
