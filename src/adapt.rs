// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Conversion from the sensor's frame to world space.
//!
//! Depth sensors report x right, y down and z forward. The render side wants
//! y up, so the vertical axis is negated; depth is then replaced according to
//! the configured [`DepthMode`], the result is scaled from meters to engine
//! units, and finally mapped through the sensor's placement in the scene.

use crate::{
    decode::RawSample,
    error::ConfigError,
    math::{Isometry, Placement, Vec3},
};
use cgmath::{EuclideanSpace, Point3, Transform};
use serde::{Deserialize, Serialize};

/// How the sensor's depth reading feeds into the eye position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DepthMode {
    /// Ignore measured depth; the eye stays at the fixed distance.
    Fixed,
    /// Fixed distance plus the change from the first measured depth, scaled
    /// by `gain` and optionally clamped to `±max_excursion` meters.
    Relative {
        gain: f64,
        #[serde(default)]
        max_excursion: Option<f64>,
    },
}

impl Default for DepthMode {
    fn default() -> Self {
        DepthMode::Fixed
    }
}

/// Tunables for [`FrameAdapter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Engine units per meter.
    pub world_scale: f64,
    /// Distance from the sensor to the viewer, in meters.
    pub fixed_distance: f64,
    pub depth: DepthMode,
    /// Where the sensor sits in the scene. Must be set explicitly.
    pub sensor_placement: Option<Placement>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        AdapterConfig {
            world_scale: 1000.0,
            fixed_distance: 1.0,
            depth: DepthMode::Fixed,
            sensor_placement: None,
        }
    }
}

impl AdapterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_scale.is_finite() && self.world_scale > 0.0) {
            return Err(ConfigError::invalid("world_scale", "must be positive"));
        }
        if !self.fixed_distance.is_finite() {
            return Err(ConfigError::invalid("fixed_distance", "must be finite"));
        }
        if let DepthMode::Relative {
            gain,
            max_excursion,
        } = self.depth
        {
            if !(gain.is_finite() && gain >= 0.0) {
                return Err(ConfigError::invalid("depth.gain", "must be non-negative"));
            }
            if let Some(limit) = max_excursion {
                if !(limit.is_finite() && limit > 0.0) {
                    return Err(ConfigError::invalid(
                        "depth.max_excursion",
                        "must be positive",
                    ));
                }
            }
        }
        match &self.sensor_placement {
            None => Err(ConfigError::MissingSensorPlacement),
            Some(p) if !p.is_valid() => Err(ConfigError::invalid(
                "sensor_placement",
                "needs finite components, a non-zero rotation and a positive scale",
            )),
            Some(_) => Ok(()),
        }
    }
}

/// Validated, ready-to-use coordinate adapter.
#[derive(Debug, Clone)]
pub struct FrameAdapter {
    world_scale: f64,
    fixed_distance: f64,
    depth: DepthMode,
    sensor: Isometry,
}

impl FrameAdapter {
    /// Build an adapter, refusing to run without a sensor placement.
    pub fn new(config: &AdapterConfig) -> Result<FrameAdapter, ConfigError> {
        config.validate()?;
        let sensor = config
            .sensor_placement
            .ok_or(ConfigError::MissingSensorPlacement)?
            .to_decomposed();
        Ok(FrameAdapter {
            world_scale: config.world_scale,
            fixed_distance: config.fixed_distance,
            depth: config.depth,
            sensor,
        })
    }

    /// Whether this adapter needs a baseline depth captured from the first sample.
    pub fn uses_baseline(&self) -> bool {
        matches!(self.depth, DepthMode::Relative { .. })
    }

    /// Render-axis position relative to the sensor, in meters.
    ///
    /// Without a baseline, relative mode treats the sample as its own baseline.
    pub fn sensor_local(&self, raw: &RawSample, baseline_depth: Option<f64>) -> Vec3 {
        let depth = match self.depth {
            DepthMode::Fixed => self.fixed_distance,
            DepthMode::Relative {
                gain,
                max_excursion,
            } => {
                let baseline = baseline_depth.unwrap_or_else(|| raw.depth());
                let mut excursion = (raw.depth() - baseline) * gain;
                if let Some(limit) = max_excursion {
                    excursion = excursion.max(-limit).min(limit);
                }
                self.fixed_distance + excursion
            }
        };
        Vec3::new(raw.position.x, -raw.position.y, depth)
    }

    /// World-space eye target for a sample.
    pub fn adapt(&self, raw: &RawSample, baseline_depth: Option<f64>) -> Vec3 {
        let local = self.sensor_local(raw, baseline_depth) * self.world_scale;
        self.sensor.transform_point(Point3::from_vec(local)).to_vec()
    }
}

/// One-shot form of [`FrameAdapter::adapt`].
pub fn adapt(
    raw: &RawSample,
    config: &AdapterConfig,
    baseline_depth: Option<f64>,
) -> Result<Vec3, ConfigError> {
    Ok(FrameAdapter::new(config)?.adapt(raw, baseline_depth))
}
