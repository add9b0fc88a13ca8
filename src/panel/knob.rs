//! Knob gesture math

use crate::codec::round_half_up;
use crate::state::Control;

/// Wheel step per notch
pub const WHEEL_STEP: i32 = 2;
/// Wheel step per notch with shift held
pub const WHEEL_STEP_COARSE: i32 = 10;

/// Value after dragging from `start_y` to `current_y`. Moving up increases
/// the value, two pixels per step.
pub fn drag_value(start_value: u8, start_y: f64, current_y: f64, max: u8) -> u8 {
    let delta = round_half_up((start_y - current_y) / 2.0);
    i64::from(start_value)
        .saturating_add(delta)
        .clamp(0, i64::from(max)) as u8
}

/// Value after one wheel notch
pub fn wheel_value(value: u8, up: bool, coarse: bool, max: u8) -> u8 {
    let step = if coarse { WHEEL_STEP_COARSE } else { WHEEL_STEP };
    let delta = if up { step } else { -step };
    (i32::from(value) + delta).clamp(0, i32::from(max)) as u8
}

/// A knob drag in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub control: Control,
    pub start_y: f64,
    pub start_value: u8,
}

impl Drag {
    pub fn value_at(&self, current_y: f64) -> u8 {
        drag_value(self.start_value, self.start_y, current_y, self.control.max())
    }
}
