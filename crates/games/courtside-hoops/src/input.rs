use serde::{Deserialize, Serialize};

use crate::ball::MoveDirection;
use crate::config::ShotConfig;

/// Player commands for one fixed tick.
///
/// Movement and power flags are held states; `shoot` and `reset` are
/// presses and act once per tick they are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoopsInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_forward: bool,
    pub move_backward: bool,
    pub power_up: bool,
    pub power_down: bool,
    pub shoot: bool,
    pub reset: bool,
}

impl HoopsInput {
    /// Held movement directions, in a fixed order.
    pub fn directions(&self) -> impl Iterator<Item = MoveDirection> {
        [
            (self.move_left, MoveDirection::Left),
            (self.move_right, MoveDirection::Right),
            (self.move_forward, MoveDirection::Forward),
            (self.move_backward, MoveDirection::Backward),
        ]
        .into_iter()
        .filter_map(|(held, dir)| held.then_some(dir))
    }
}

/// Shot power in percent, adjusted while a power key is held.
///
/// Each held direction steps at most once per repeat delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerMeter {
    power: f32,
    default: f32,
    min: f32,
    max: f32,
    step: f32,
    repeat_delay: f32,
    last_up: Option<f32>,
    last_down: Option<f32>,
}

impl PowerMeter {
    pub fn new(shot: &ShotConfig) -> Self {
        Self {
            power: shot.power_default,
            default: shot.power_default,
            min: shot.power_min,
            max: shot.power_max,
            step: shot.power_increment,
            repeat_delay: shot.power_repeat_delay_secs,
            last_up: None,
            last_down: None,
        }
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    /// Set the power directly. Non-finite values are ignored.
    pub fn set(&mut self, power: f32) {
        if power.is_finite() {
            self.power = power.clamp(self.min, self.max);
        }
    }

    pub fn adjust(&mut self, delta: f32) {
        self.set(self.power + delta);
    }

    /// Apply held power keys at simulation time `now`.
    pub fn update(&mut self, input: &HoopsInput, now: f32) {
        if input.power_up && Self::ready(self.last_up, now, self.repeat_delay) {
            self.adjust(self.step);
            self.last_up = Some(now);
        }
        if input.power_down && Self::ready(self.last_down, now, self.repeat_delay) {
            self.adjust(-self.step);
            self.last_down = Some(now);
        }
    }

    fn ready(last: Option<f32>, now: f32, delay: f32) -> bool {
        last.is_none_or(|t| now - t > delay)
    }

    /// Back to the default power.
    pub fn reset(&mut self) {
        self.power = self.default;
        self.last_up = None;
        self.last_down = None;
    }
}
