// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! A tracking session: a UDP socket, the thread that blocks on it, and the
//! cell it publishes into.
//!
//! The session owns all three. Dropping it (or calling
//! [`TrackingSession::stop`]) raises the stop flag, shuts the socket down to
//! unblock the receive, and waits a bounded time for the thread.

use crate::{
    adapt::{AdapterConfig, FrameAdapter},
    cell::SharedPoseCell,
    decode::WireFormat,
    error::{Result, SocketError},
    ingest::{IngestCounts, IngestStats, Ingestor},
};
use serde::{Deserialize, Serialize};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::{
    net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, UdpSocket},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Default UDP port the sensor side sends to.
pub const DEFAULT_PORT: u16 = 5005;

/// Maximum UDP datagram size we'll receive.
const MAX_DATAGRAM_SIZE: usize = 65535;

/// Pause after an unexpected receive error, so a dead socket cannot spin.
const ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Network side of the session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub bind_addr: IpAddr,
    /// Port to listen on; 0 picks an ephemeral port.
    pub port: u16,
    pub wire_format: WireFormat,
    /// Upper bound on how long one blocking receive may take, in milliseconds.
    pub recv_timeout_ms: u64,
    /// How long shutdown waits for the receive thread, in milliseconds.
    pub join_timeout_ms: u64,
}

impl Default for ListenConfig {
    fn default() -> Self {
        ListenConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            wire_format: WireFormat::Auto,
            recv_timeout_ms: 50,
            join_timeout_ms: 100,
        }
    }
}

impl ListenConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn validate(&self) -> std::result::Result<(), crate::ConfigError> {
        if self.recv_timeout_ms == 0 {
            return Err(crate::ConfigError::invalid(
                "recv_timeout_ms",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Create and bind the receive socket.
pub fn make_udp_socket(addr: SocketAddr, recv_timeout: Duration) -> Result<Socket> {
    let bind_err = |source| SocketError::Bind { addr, source };
    let sock = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(bind_err)?;
    sock.set_reuse_address(true).map_err(bind_err)?;
    sock.bind(&SockAddr::from(addr)).map_err(bind_err)?;
    sock.set_read_timeout(Some(recv_timeout))
        .map_err(bind_err)?;
    Ok(sock)
}

fn receive_loop(socket: UdpSocket, ingest: Ingestor, stop: Arc<AtomicBool>) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    debug!("receive loop started");
    while !stop.load(Ordering::Acquire) {
        match socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                if stop.load(Ordering::Acquire) {
                    break;
                }
                if let Err(e) = ingest.handle_datagram(&buf[..len]) {
                    debug!(%from, error = %e, "ignored datagram");
                }
            }
            Err(e) => {
                let e = SocketError::Receive(e);
                if stop.load(Ordering::Acquire) {
                    break;
                }
                if !e.is_timeout() {
                    warn!(error = %e, "receive error, continuing");
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
    }
    debug!("receive loop exiting");
}

/// Owner of the socket, the receive thread and the shared pose cell.
#[derive(Debug)]
pub struct TrackingSession {
    cell: Arc<SharedPoseCell>,
    stats: Arc<IngestStats>,
    stop: Arc<AtomicBool>,
    socket: Socket,
    local_addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
    join_timeout: Duration,
}

impl TrackingSession {
    /// Validate configuration, bind the socket and start the receive thread.
    ///
    /// Configuration errors are reported before anything is bound.
    pub fn start(listen: &ListenConfig, adapter: &AdapterConfig) -> Result<TrackingSession> {
        listen.validate()?;
        let adapter = FrameAdapter::new(adapter)?;
        let addr = listen.socket_addr();
        let socket = make_udp_socket(addr, Duration::from_millis(listen.recv_timeout_ms))?;
        let local_addr = socket
            .local_addr()?
            .as_socket()
            .unwrap_or(addr);
        let recv_socket: UdpSocket = socket.try_clone()?.into();

        let cell = Arc::new(SharedPoseCell::new());
        let ingest = Ingestor::new(listen.wire_format, adapter, Arc::clone(&cell));
        let stats = Arc::clone(ingest.stats());
        let stop = Arc::new(AtomicBool::new(false));

        let thread = {
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("offaxis-ingest".to_string())
                .spawn(move || receive_loop(recv_socket, ingest, stop))
                .map_err(SocketError::Spawn)?
        };
        info!(%local_addr, format = ?listen.wire_format, "tracking session started");

        Ok(TrackingSession {
            cell,
            stats,
            stop,
            socket,
            local_addr,
            thread: Some(thread),
            join_timeout: Duration::from_millis(listen.join_timeout_ms),
        })
    }

    /// Start from an aggregated configuration.
    pub fn from_config(config: &crate::config::TrackerConfig) -> Result<TrackingSession> {
        TrackingSession::start(&config.listen, &config.adapter)
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The cell the receive thread publishes into.
    pub fn cell(&self) -> &Arc<SharedPoseCell> {
        &self.cell
    }

    pub fn stats(&self) -> IngestCounts {
        self.stats.snapshot()
    }

    /// Whether the receive thread is still alive.
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop the session. Returns `true` if the thread joined in time.
    pub fn stop(mut self) -> bool {
        self.shutdown()
    }

    fn shutdown(&mut self) -> bool {
        let handle = match self.thread.take() {
            Some(handle) => handle,
            None => return true,
        };
        self.stop.store(true, Ordering::Release);
        if let Err(e) = self.socket.shutdown(Shutdown::Both) {
            // Unconnected UDP sockets may refuse; the receive timeout still bounds the wait.
            debug!(error = %e, "socket shutdown");
        }

        let deadline = Instant::now() + self.join_timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    timeout_ms = self.join_timeout.as_millis() as u64,
                    "receive thread did not stop in time, abandoning it"
                );
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        if handle.join().is_err() {
            warn!("receive thread panicked");
            return false;
        }
        info!(local_addr = %self.local_addr, "tracking session stopped");
        true
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
