// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Error types for every stage of the tracking pipeline.
//!
//! Each stage has its own error enum so that callers can decide how far an
//! error may travel: decode errors drop a datagram, geometry errors reuse the
//! previous frustum, and only configuration errors stop a component from
//! starting.

use std::io;
use thiserror::Error;

/// Failure to turn one received datagram into a sample.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("binary record too short: need at least {needed} bytes, got {actual}")]
    NeedMoreData { needed: usize, actual: usize },
    #[error("malformed datagram: {0}")]
    Malformed(String),
    #[error("non-finite value in field '{0}'")]
    NonFinite(&'static str),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Malformed(e.to_string())
    }
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(e: std::str::Utf8Error) -> Self {
        DecodeError::Malformed(e.to_string())
    }
}

/// Missing or invalid configuration, fatal to the component being set up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sensor placement transform is not set")]
    MissingSensorPlacement,
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// A screen/eye configuration from which no usable frustum can be derived.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("eye is not in front of the screen plane (distance {distance})")]
    EyeBehindScreen { distance: f64 },
    #[error("screen edge '{0}' has zero length")]
    ZeroLengthEdge(&'static str),
    #[error("screen edges are not perpendicular (cosine {cosine})")]
    NonOrthogonalEdges { cosine: f64 },
    #[error("screen corners do not form a planar rectangle (top-right off by {offset})")]
    NotRectangular { offset: f64 },
    #[error("near plane must be positive and closer than the far plane (near {near}, far {far})")]
    InvalidClipPlanes { near: f64, far: f64 },
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Socket-level failures of the ingestion driver.
#[derive(Error, Debug)]
pub enum SocketError {
    #[error("could not bind UDP socket to {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),
    #[error("could not spawn ingestion thread: {0}")]
    Spawn(#[source] io::Error),
}

impl SocketError {
    /// Whether the error is just the receive timeout expiring.
    pub fn is_timeout(&self) -> bool {
        match self {
            SocketError::Receive(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Socket(#[from] SocketError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
