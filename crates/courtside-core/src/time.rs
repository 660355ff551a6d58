use serde::{Deserialize, Serialize};

/// Fixed-timestep accumulator.
///
/// Frame deltas are clamped to `max_step` before being banked, then drained in
/// whole `step` increments. Leftover time carries into the next frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FixedTimestep {
    step: f32,
    max_step: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(step: f32, max_step: f32) -> Self {
        Self {
            step,
            max_step: max_step.max(step),
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulator
    }

    /// Bank a frame delta and return how many fixed steps are due.
    /// Negative or non-finite deltas bank nothing.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(self.max_step);
        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_frame_is_clamped() {
        let mut ts = FixedTimestep::new(0.25, 0.5);
        // A three-second hitch only banks half a second, i.e. two steps.
        assert_eq!(ts.advance(3.0), 2);
        assert_eq!(ts.accumulated(), 0.0);
    }

    #[test]
    fn remainder_carries_over() {
        let mut ts = FixedTimestep::new(0.01, 0.1);
        assert_eq!(ts.advance(0.015), 1);
        assert!((ts.accumulated() - 0.005).abs() < 1e-6);
        assert_eq!(ts.advance(0.006), 1);
    }

    #[test]
    fn non_finite_frame_is_ignored() {
        let mut ts = FixedTimestep::new(1.0 / 60.0, 1.0 / 30.0);
        assert_eq!(ts.advance(f32::NAN), 0);
        assert_eq!(ts.advance(-1.0), 0);
        assert_eq!(ts.accumulated(), 0.0);
    }
}
