// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Temporal smoothing of the eye position.

use crate::{
    error::ConfigError,
    math::{vec_is_finite, Vec3},
};
use serde::{Deserialize, Serialize};

/// Move `current` toward `target` at `rate` per second over `dt` seconds.
///
/// The step fraction saturates at 1, so a long frame lands on the target
/// rather than overshooting. Non-positive `dt` leaves `current` unchanged.
pub fn advance(current: Vec3, target: Vec3, dt: f64, rate: f64) -> Vec3 {
    if !(dt > 0.0) {
        return current;
    }
    let t = (rate * dt).min(1.0).max(0.0);
    current + (target - current) * t
}

/// Move `current` toward `target` by a fixed fraction of the remaining
/// distance. Non-positive `dt` leaves `current` unchanged.
pub fn lerp_fraction(current: Vec3, target: Vec3, dt: f64, fraction: f64) -> Vec3 {
    if !(dt > 0.0) {
        return current;
    }
    current + (target - current) * fraction.min(1.0).max(0.0)
}

/// Smoothing policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Smoothing {
    /// Jump straight to the target every tick.
    Off,
    /// Exponential approach, `rate` per second.
    Rate(f64),
    /// Fixed fraction of the remaining distance per tick.
    Fraction(f64),
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Fraction(0.25)
    }
}

impl Smoothing {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Smoothing::Off => Ok(()),
            Smoothing::Rate(r) if r.is_finite() && r > 0.0 => Ok(()),
            Smoothing::Rate(_) => Err(ConfigError::invalid("smoothing.rate", "must be positive")),
            Smoothing::Fraction(f) if f > 0.0 && f <= 1.0 => Ok(()),
            Smoothing::Fraction(_) => Err(ConfigError::invalid(
                "smoothing.fraction",
                "must be in (0, 1]",
            )),
        }
    }

    /// One smoothing step under this policy.
    pub fn step(&self, current: Vec3, target: Vec3, dt: f64) -> Vec3 {
        match *self {
            Smoothing::Off if dt > 0.0 => target,
            Smoothing::Off => current,
            Smoothing::Rate(rate) => advance(current, target, dt, rate),
            Smoothing::Fraction(fraction) => lerp_fraction(current, target, dt, fraction),
        }
    }
}

/// The eye position actually used for rendering; persists across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedEye {
    world_position: Option<Vec3>,
    smoothing: Smoothing,
}

impl SmoothedEye {
    pub fn new(smoothing: Smoothing) -> SmoothedEye {
        SmoothedEye {
            world_position: None,
            smoothing,
        }
    }

    /// Start from a known position instead of snapping to the first target.
    pub fn starting_at(smoothing: Smoothing, position: Vec3) -> SmoothedEye {
        SmoothedEye {
            world_position: Some(position),
            smoothing,
        }
    }

    /// Current position, if any target has been seen yet.
    pub fn world_position(&self) -> Option<Vec3> {
        self.world_position
    }

    /// Advance toward `target` and return the new position.
    ///
    /// The very first target is taken as-is. A non-finite target is ignored
    /// and the position stays where it was, which is `None` before any valid
    /// target has been seen.
    pub fn update(&mut self, target: Vec3, dt: f64) -> Option<Vec3> {
        if !vec_is_finite(&target) {
            return self.world_position;
        }
        let next = match self.world_position {
            None => target,
            Some(current) => self.smoothing.step(current, target, dt),
        };
        self.world_position = Some(next);
        self.world_position
    }

    pub fn reset(&mut self) {
        self.world_position = None;
    }
}
