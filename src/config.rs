// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Aggregated configuration for a complete tracker: network, adapter,
//! smoothing, frustum and screen.
//!
//! Every section has serde defaults, so a configuration file only has to
//! mention what differs from the deployed rig.

use crate::{
    adapt::AdapterConfig,
    error::{ConfigError, Result},
    frustum::{FrustumConfig, ScreenQuad},
    math::{Placement, Vec3},
    session::ListenConfig,
    smooth::Smoothing,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Where the physical screen is, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenConfig {
    /// Explicit corners.
    Corners {
        bottom_left: [f64; 3],
        bottom_right: [f64; 3],
        top_left: [f64; 3],
        top_right: [f64; 3],
    },
    /// A unit quad moved by a transform; its scale is the side length.
    Placement(Placement),
    /// An axis-aligned rectangle facing +z.
    Extent {
        center: [f64; 3],
        width: f64,
        height: f64,
    },
}

impl Default for ScreenConfig {
    /// A 27" 16:9 panel in millimetres, centred on the origin.
    fn default() -> Self {
        ScreenConfig::Extent {
            center: [0.0, 0.0, 0.0],
            width: 600.0,
            height: 337.5,
        }
    }
}

impl ScreenConfig {
    pub fn to_quad(&self) -> ScreenQuad {
        match *self {
            ScreenConfig::Corners {
                bottom_left,
                bottom_right,
                top_left,
                top_right,
            } => ScreenQuad::new(
                bottom_left.into(),
                bottom_right.into(),
                top_left.into(),
                top_right.into(),
            ),
            ScreenConfig::Placement(ref placement) => ScreenQuad::from_placement(placement),
            ScreenConfig::Extent {
                center,
                width,
                height,
            } => ScreenQuad::axis_aligned(Vec3::from(center), width, height),
        }
    }
}

/// Everything a tracker host needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub listen: ListenConfig,
    pub adapter: AdapterConfig,
    pub smoothing: Smoothing,
    pub frustum: FrustumConfig,
    pub screen: ScreenConfig,
}

impl TrackerConfig {
    pub fn from_json_str(text: &str) -> std::result::Result<TrackerConfig, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::invalid("config", e.to_string()))
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<TrackerConfig> {
        let text = fs::read_to_string(path)?;
        Ok(TrackerConfig::from_json_str(&text)?)
    }

    /// Check every section, including the screen shape.
    pub fn validate(&self) -> Result<()> {
        self.listen.validate()?;
        self.adapter.validate()?;
        self.smoothing.validate()?;
        self.frustum.validate()?;
        self.screen.to_quad().validate()?;
        Ok(())
    }
}
