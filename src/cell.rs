// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! The single-slot cell through which the ingestion side hands the latest
//! pose to the render side.
//!
//! Only the newest sample matters, so publishing simply overwrites. The slot
//! is guarded by a mutex held only for a copy, so a reader never sees half of
//! a sample.

use crate::{
    decode::{Orientation, RawSample},
    math::Vec3,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

/// What the ingestion side publishes for each accepted datagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSlot {
    /// The decoded sample, still in the sensor frame.
    pub sample: RawSample,
    /// World-space eye target derived from it.
    pub target: Vec3,
    /// Increments with every publish, starting at 1.
    pub sequence: u64,
}

impl PoseSlot {
    /// Head orientation from rotation-capable trackers, in the sensor frame.
    pub fn orientation(&self) -> Option<Orientation> {
        self.sample.orientation
    }
}

#[derive(Debug, Default)]
struct Inner {
    latest: Option<PoseSlot>,
    baseline_depth: Option<f64>,
    sequence: u64,
}

/// Latest-value cell shared between one writer and one reader.
#[derive(Debug, Default)]
pub struct SharedPoseCell {
    inner: Mutex<Inner>,
    has_data: AtomicBool,
}

impl SharedPoseCell {
    pub fn new() -> SharedPoseCell {
        SharedPoseCell::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The slot holds plain values, so a panic elsewhere cannot leave it
        // half-written.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether anything has been published yet.
    pub fn has_data(&self) -> bool {
        self.has_data.load(Ordering::Acquire)
    }

    /// The depth captured from the first sample, if any.
    pub fn baseline_depth(&self) -> Option<f64> {
        self.lock().baseline_depth
    }

    /// Return the baseline depth, capturing `depth` as the baseline if none
    /// has been set. Once set it never changes for the life of the cell.
    pub fn baseline_or_capture(&self, depth: f64) -> f64 {
        *self.lock().baseline_depth.get_or_insert(depth)
    }

    /// Overwrite the slot with a new sample. Returns its sequence number.
    pub fn publish(&self, sample: RawSample, target: Vec3) -> u64 {
        let sequence = {
            let mut inner = self.lock();
            inner.sequence += 1;
            let sequence = inner.sequence;
            inner.latest = Some(PoseSlot {
                sample,
                target,
                sequence,
            });
            sequence
        };
        self.has_data.store(true, Ordering::Release);
        sequence
    }

    /// Copy of the most recent slot.
    pub fn latest(&self) -> Option<PoseSlot> {
        self.lock().latest
    }

    /// The most recent slot, only if it is newer than `last_seen`.
    pub fn newer_than(&self, last_seen: u64) -> Option<PoseSlot> {
        self.lock().latest.filter(|slot| slot.sequence > last_seen)
    }
}
