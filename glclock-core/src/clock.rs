//! Clock hand arithmetic.
//!
//! Angles are in degrees, measured clockwise from twelve o'clock. Each hand is rotated about
//! the negative Z axis so a positive angle turns it clockwise on screen.

use chrono::Timelike;
use glam::{Mat4, Vec3};

/// How far (in degrees) the minute hand creeps over one full minute.
pub const MINUTE_SWEEP_DEG: f32 = 5.0;
/// How far (in degrees) the hour hand creeps over one full hour.
pub const HOUR_SWEEP_DEG: f32 = 29.0;

/// Which hand of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Second,
    Minute,
    Hour,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Second, Hand::Minute, Hand::Hour];

    /// Position of the hand in per-hand arrays (geometry, colors).
    pub fn index(self) -> usize {
        match self {
            Hand::Second => 0,
            Hand::Minute => 1,
            Hand::Hour => 2,
        }
    }
}

/// Rotation of all three hands at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub second: f32,
    pub minute: f32,
    pub hour: f32,
}

impl HandAngles {
    /// Computes the angles for a wall-clock time. `hour` may be in 0..24.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Self {
        let second_deg = second as f32 / 60.0 * 360.0;
        let minute_deg = minute as f32 / 60.0 * 360.0 + second_deg / 360.0 * MINUTE_SWEEP_DEG;
        let hour_deg = hour as f32 / 12.0 * 360.0 + minute_deg / 360.0 * HOUR_SWEEP_DEG;

        Self {
            second: second_deg,
            minute: minute_deg,
            hour: hour_deg,
        }
    }

    /// Computes the angles for the given time of day.
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self::from_hms(time.hour(), time.minute(), time.second())
    }

    /// Computes the angles for the current local time.
    pub fn now() -> Self {
        Self::from_time(&chrono::Local::now())
    }

    pub fn get(&self, hand: Hand) -> f32 {
        match hand {
            Hand::Second => self.second,
            Hand::Minute => self.minute,
            Hand::Hour => self.hour,
        }
    }
}

/// Builds the model transform for a hand rotated by `degrees`.
pub fn hand_transform(degrees: f32) -> Mat4 {
    Mat4::from_axis_angle(Vec3::NEG_Z, degrees.to_radians())
}
