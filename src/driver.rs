// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! The per-frame driver: read the eye, smooth it, build the frustum, hand the
//! matrices to the camera.
//!
//! The driver never blocks on the network. It sees the world through two
//! seams: a [`PositionProvider`] for where the eye is, and a [`Camera`] that
//! receives the result.

use crate::{
    cell::SharedPoseCell,
    error::{ConfigError, GeometryError},
    frustum::{BuiltFrustum, FrustumBuilder, FrustumConfig, FrustumParams, ScreenQuad},
    math::{Mat4, Quat, Vec3},
    session::TrackingSession,
    smooth::{SmoothedEye, Smoothing},
};
use cgmath::SquareMatrix;
use std::sync::Arc;

/// A source of world-space eye positions.
pub trait PositionProvider {
    /// Latest world-space eye position. Meaningful only if `has_data()`.
    fn current_position(&self) -> Vec3;

    fn has_data(&self) -> bool;
}

impl PositionProvider for SharedPoseCell {
    fn current_position(&self) -> Vec3 {
        self.latest()
            .map(|slot| slot.target)
            .unwrap_or_else(|| Vec3::new(0.0, 0.0, 0.0))
    }

    fn has_data(&self) -> bool {
        SharedPoseCell::has_data(self)
    }
}

impl PositionProvider for TrackingSession {
    fn current_position(&self) -> Vec3 {
        self.cell().current_position()
    }

    fn has_data(&self) -> bool {
        self.cell().has_data()
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for Arc<P> {
    fn current_position(&self) -> Vec3 {
        (**self).current_position()
    }

    fn has_data(&self) -> bool {
        (**self).has_data()
    }
}

impl<P: PositionProvider + ?Sized> PositionProvider for &P {
    fn current_position(&self) -> Vec3 {
        (**self).current_position()
    }

    fn has_data(&self) -> bool {
        (**self).has_data()
    }
}

/// A provider that always reports the same position, for running without a
/// sensor or as a manual fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition(pub Vec3);

impl PositionProvider for FixedPosition {
    fn current_position(&self) -> Vec3 {
        self.0
    }

    fn has_data(&self) -> bool {
        true
    }
}

/// Receiver of the per-frame camera state.
pub trait Camera {
    fn apply(&mut self, eye: Vec3, frustum: &FrustumParams);
}

/// Plain camera state, for hosts that copy matrices out themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub orientation: Option<Quat>,
    pub view: Mat4,
    pub projection: Mat4,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState {
            position: Vec3::new(0.0, 0.0, 0.0),
            orientation: None,
            view: Mat4::identity(),
            projection: Mat4::identity(),
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl Camera for CameraState {
    fn apply(&mut self, eye: Vec3, frustum: &FrustumParams) {
        self.position = eye;
        self.view = frustum.view;
        self.projection = frustum.projection;
        self.near = frustum.near;
        self.far = frustum.far;
        if frustum.orientation.is_some() {
            self.orientation = frustum.orientation;
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No usable position has ever been available; the camera was left alone.
    NoData,
    /// The geometry was degenerate and there was no earlier frustum to reuse.
    Degenerate(GeometryError),
    /// The camera was updated.
    Applied { eye: Vec3, frustum: BuiltFrustum },
}

/// Drives one camera from one position provider.
#[derive(Debug)]
pub struct FrameDriver<P> {
    provider: P,
    eye: SmoothedEye,
    builder: FrustumBuilder,
}

impl<P: PositionProvider> FrameDriver<P> {
    pub fn new(
        provider: P,
        smoothing: Smoothing,
        frustum: FrustumConfig,
    ) -> Result<FrameDriver<P>, ConfigError> {
        smoothing.validate()?;
        Ok(FrameDriver {
            provider,
            eye: SmoothedEye::new(smoothing),
            builder: FrustumBuilder::new(frustum)?,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current smoothed eye, if any.
    pub fn eye(&self) -> Option<Vec3> {
        self.eye.world_position()
    }

    pub fn builder(&self) -> &FrustumBuilder {
        &self.builder
    }

    /// Run one frame. `dt` is the time since the previous tick, in seconds.
    pub fn tick(&mut self, dt: f64, screen: &ScreenQuad, camera: &mut dyn Camera) -> TickOutcome {
        let eye = if self.provider.has_data() {
            self.eye.update(self.provider.current_position(), dt)
        } else {
            self.eye.world_position()
        };
        let eye = match eye {
            Some(eye) => eye,
            None => return TickOutcome::NoData,
        };
        match self.builder.update(screen, eye) {
            Ok(frustum) => {
                camera.apply(eye, &frustum.params);
                TickOutcome::Applied { eye, frustum }
            }
            Err(e) => TickOutcome::Degenerate(e),
        }
    }
}
