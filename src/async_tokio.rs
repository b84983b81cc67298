// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

//! Tokio receive driver, for hosts that already run an async runtime.
//!
//! It feeds the same [`SharedPoseCell`] through the same [`Ingestor`] as the
//! blocking [`TrackingSession`](crate::session::TrackingSession); only the
//! socket handling differs.

use crate::{
    adapt::{AdapterConfig, FrameAdapter},
    cell::SharedPoseCell,
    error::{Result, SocketError},
    ingest::{IngestCounts, IngestStats, Ingestor},
    session::ListenConfig,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::UdpSocket, sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

const MAX_DATAGRAM_SIZE: usize = 65535;

async fn receive_task(socket: UdpSocket, ingest: Ingestor, mut stop: watch::Receiver<bool>) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    debug!("async receive task started");
    loop {
        tokio::select! {
            changed = stop.changed() => {
                // A dropped sender also means stop.
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, from)) => {
                    if let Err(e) = ingest.handle_datagram(&buf[..len]) {
                        debug!(%from, error = %e, "ignored datagram");
                    }
                }
                Err(e) => {
                    warn!(error = %SocketError::Receive(e), "receive error, continuing");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            },
        }
    }
    debug!("async receive task exiting");
}

/// A running tokio receive task and the cell it publishes into.
#[derive(Debug)]
pub struct AsyncTrackingSession {
    cell: Arc<SharedPoseCell>,
    stats: Arc<IngestStats>,
    local_addr: SocketAddr,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
    join_timeout: Duration,
}

impl AsyncTrackingSession {
    /// Bind and spawn the receive task on the current runtime.
    pub async fn start(
        listen: &ListenConfig,
        adapter: &AdapterConfig,
    ) -> Result<AsyncTrackingSession> {
        listen.validate()?;
        let adapter = FrameAdapter::new(adapter)?;
        let addr = listen.socket_addr();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| SocketError::Bind { addr, source })?;
        let local_addr = socket.local_addr()?;

        let cell = Arc::new(SharedPoseCell::new());
        let ingest = Ingestor::new(listen.wire_format, adapter, Arc::clone(&cell));
        let stats = Arc::clone(ingest.stats());
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(receive_task(socket, ingest, stop_rx));
        info!(%local_addr, format = ?listen.wire_format, "async tracking session started");

        Ok(AsyncTrackingSession {
            cell,
            stats,
            local_addr,
            stop,
            task,
            join_timeout: Duration::from_millis(listen.join_timeout_ms),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn cell(&self) -> &Arc<SharedPoseCell> {
        &self.cell
    }

    pub fn stats(&self) -> IngestCounts {
        self.stats.snapshot()
    }

    /// Signal the task and wait for it. Returns `true` if it finished in time.
    pub async fn stop(self) -> bool {
        // Only fails if the task already exited and dropped its receiver.
        let _ = self.stop.send(true);
        match tokio::time::timeout(self.join_timeout, self.task).await {
            Ok(Ok(())) => {
                info!(local_addr = %self.local_addr, "async tracking session stopped");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "receive task failed");
                false
            }
            Err(_) => {
                warn!("receive task did not stop in time");
                false
            }
        }
    }
}
