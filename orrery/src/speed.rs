//! Speed control binding: UI input to the global speed multiplier

use crate::config::AnimationConfig;
use crate::simulation::{Clock, SimulationState};

#[derive(Debug, Clone, Copy)]
pub struct SpeedControl {
    step: f32,
}

impl SpeedControl {
    pub fn new(step: f32) -> Self {
        Self { step: step.abs() }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(config.speed_step)
    }

    /// Apply a raw input value. Negative values clamp to 0, anything above is
    /// accepted. Non-finite input is dropped. Returns the resulting speed.
    pub fn on_input<C: Clock>(&self, value: f32, state: &mut SimulationState<C>) -> f32 {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite speed input {}", value);
            return state.speed_multiplier();
        }

        let speed = value.max(0.0);
        if speed != state.speed_multiplier() {
            log::debug!("Speed multiplier {} -> {}", state.speed_multiplier(), speed);
            state.set_speed_multiplier(speed);
        }
        speed
    }

    pub fn step_up<C: Clock>(&self, state: &mut SimulationState<C>) -> f32 {
        self.on_input(state.speed_multiplier() + self.step, state)
    }

    pub fn step_down<C: Clock>(&self, state: &mut SimulationState<C>) -> f32 {
        self.on_input(state.speed_multiplier() - self.step, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ManualClock;

    fn state() -> SimulationState<ManualClock> {
        SimulationState::with_clock(1.0, ManualClock::default())
    }

    #[test]
    fn input_is_written_through() {
        let mut state = state();
        let control = SpeedControl::new(0.5);
        assert_eq!(control.on_input(3.5, &mut state), 3.5);
        assert_eq!(state.speed_multiplier(), 3.5);
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        let mut state = state();
        SpeedControl::new(0.5).on_input(-4.0, &mut state);
        assert_eq!(state.speed_multiplier(), 0.0);
    }

    #[test]
    fn large_values_are_not_capped() {
        let mut state = state();
        SpeedControl::new(0.5).on_input(1.0e6, &mut state);
        assert_eq!(state.speed_multiplier(), 1.0e6);
    }

    #[test]
    fn non_finite_input_leaves_state_alone() {
        let mut state = state();
        let control = SpeedControl::new(0.5);
        control.on_input(f32::NAN, &mut state);
        control.on_input(f32::INFINITY, &mut state);
        assert_eq!(state.speed_multiplier(), 1.0);
    }

    #[test]
    fn steps_move_by_the_configured_amount_and_stop_at_zero() {
        let mut state = state();
        let control = SpeedControl::from_config(&AnimationConfig { speed_step: 0.75, ..Default::default() });
        assert_eq!(control.step_up(&mut state), 1.75);
        control.step_down(&mut state);
        control.step_down(&mut state);
        control.step_down(&mut state);
        assert_eq!(state.speed_multiplier(), 0.0);
    }
}
