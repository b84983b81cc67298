// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! The per-datagram ingest step: decode, adapt, publish.
//!
//! Shared by the blocking receive thread and the optional tokio task so both
//! drivers treat datagrams identically.

use crate::{
    adapt::FrameAdapter,
    cell::{PoseSlot, SharedPoseCell},
    decode::{decode, RawSample, WireFormat},
    error::DecodeError,
    math::{vec_is_finite, Vec3},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::{debug, trace};

/// Running counters for one ingestion driver.
#[derive(Debug, Default)]
pub struct IngestStats {
    received: AtomicU64,
    published: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestCounts {
    pub received: u64,
    pub published: u64,
    pub dropped: u64,
}

impl IngestStats {
    pub fn snapshot(&self) -> IngestCounts {
        IngestCounts {
            received: self.received.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Everything needed to turn a datagram into a published pose.
#[derive(Debug, Clone)]
pub struct Ingestor {
    format: WireFormat,
    adapter: FrameAdapter,
    cell: Arc<SharedPoseCell>,
    stats: Arc<IngestStats>,
}

impl Ingestor {
    pub fn new(format: WireFormat, adapter: FrameAdapter, cell: Arc<SharedPoseCell>) -> Ingestor {
        Ingestor {
            format,
            adapter,
            cell,
            stats: Arc::new(IngestStats::default()),
        }
    }

    pub fn cell(&self) -> &Arc<SharedPoseCell> {
        &self.cell
    }

    pub fn stats(&self) -> &Arc<IngestStats> {
        &self.stats
    }

    /// Process one datagram.
    ///
    /// On error nothing is published and the cell keeps its previous value;
    /// callers drop the datagram and carry on.
    pub fn handle_datagram(&self, datagram: &[u8]) -> Result<PoseSlot, DecodeError> {
        self.stats.received.fetch_add(1, Ordering::Relaxed);
        let (sample, target, baseline) = match self.sample_and_target(datagram) {
            Ok(parts) => parts,
            Err(e) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(len = datagram.len(), error = %e, "dropping datagram");
                return Err(e);
            }
        };
        if let Some(depth) = baseline {
            self.cell.baseline_or_capture(depth);
        }
        let sequence = self.cell.publish(sample, target);
        self.stats.published.fetch_add(1, Ordering::Relaxed);
        if let Some(age) = sample.age(chrono::Utc::now()) {
            trace!(sequence, age_ms = age.as_secs_f64() * 1e3, "published sample");
        }
        Ok(PoseSlot {
            sample,
            target,
            sequence,
        })
    }

    /// Decode and adapt without touching the cell. The first accepted sample
    /// becomes the baseline, so it is only proposed here.
    fn sample_and_target(
        &self,
        datagram: &[u8],
    ) -> Result<(RawSample, Vec3, Option<f64>), DecodeError> {
        let sample = decode(datagram, self.format)?;
        let baseline = if self.adapter.uses_baseline() {
            Some(self.cell.baseline_depth().unwrap_or_else(|| sample.depth()))
        } else {
            None
        };
        let target = self.adapter.adapt(&sample, baseline);
        if !vec_is_finite(&target) {
            return Err(DecodeError::NonFinite("world target"));
        }
        Ok((sample, target, baseline))
    }
}
