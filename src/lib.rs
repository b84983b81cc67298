// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Head-tracked off-axis projection for a single physical screen.
//!
//! A sensor process sends the viewer's head position over UDP. A
//! [`TrackingSession`] receives it on a background thread, maps it into world
//! space and publishes it into a [`SharedPoseCell`]. Once per frame a
//! [`FrameDriver`] smooths the eye position and builds an asymmetric frustum
//! whose near-plane window exactly covers the screen.

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

pub mod adapt;
#[cfg(feature = "async-tokio")]
pub mod async_tokio;
pub mod cell;
pub mod config;
pub mod decode;
pub mod driver;
pub mod error;
pub mod frustum;
pub mod ingest;
pub mod math;
pub mod session;
pub mod smooth;

pub use crate::{
    adapt::{adapt, AdapterConfig, DepthMode, FrameAdapter},
    cell::{PoseSlot, SharedPoseCell},
    config::{ScreenConfig, TrackerConfig},
    decode::{decode, encode_binary, encode_json, Orientation, RawSample, WireFormat},
    driver::{Camera, CameraState, FixedPosition, FrameDriver, PositionProvider, TickOutcome},
    error::*,
    frustum::{
        compute_frustum, BuiltFrustum, FrustumBuilder, FrustumConfig, FrustumParams, Handedness,
        NearPlane, ScreenQuad,
    },
    ingest::{IngestCounts, Ingestor},
    math::{Mat4, Placement, Vec3},
    session::{ListenConfig, TrackingSession, DEFAULT_PORT},
    smooth::{advance, SmoothedEye, Smoothing},
};

#[cfg(feature = "async-tokio")]
pub use crate::async_tokio::AsyncTrackingSession;
