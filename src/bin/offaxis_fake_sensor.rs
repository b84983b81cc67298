// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

// Synthetic sensor: sends a viewer sweeping side to side (and bobbing in
// depth) to a listener, in either wire format.

use clap::{Parser, ValueEnum};
use offaxis::{encode_binary, encode_json, RawSample, Vec3, DEFAULT_PORT};
use std::{
    f64::consts::PI,
    net::{SocketAddr, UdpSocket},
    thread,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Format {
    Binary,
    Json,
}

#[derive(Parser)]
#[command(name = "offaxis_fake_sensor")]
#[command(about = "Send a synthetic head-tracking sweep over UDP")]
#[command(version)]
struct Cli {
    /// Destination address
    #[arg(short, long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
    target: SocketAddr,

    /// Wire format to send
    #[arg(short, long, value_enum, default_value = "binary")]
    format: Format,

    /// Datagrams per second
    #[arg(long, default_value = "30")]
    rate: f64,

    /// Sideways amplitude, in meters
    #[arg(long, default_value = "0.3")]
    amplitude: f64,

    /// Seconds per full sweep
    #[arg(long, default_value = "4")]
    period: f64,

    /// Depth at the centre of the sweep, in meters
    #[arg(long, default_value = "1.0")]
    depth: f64,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if !(cli.rate > 0.0 && cli.period > 0.0) {
        return Err("rate and period must be positive".into());
    }

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    let interval = Duration::from_secs_f64(1.0 / cli.rate);
    let started = Instant::now();
    info!(dest = %cli.target, format = ?cli.format, "sending");

    let mut sent = 0u64;
    loop {
        let t = started.elapsed().as_secs_f64();
        if cli.duration.map_or(false, |limit| t >= limit) {
            break;
        }
        let phase = 2.0 * PI * t / cli.period;
        let position = Vec3::new(
            cli.amplitude * phase.sin(),
            0.05 * (2.0 * phase).sin(),
            cli.depth + 0.1 * phase.cos(),
        );
        let sample = RawSample::new(position).with_timestamp(unix_now());
        let datagram = match cli.format {
            Format::Binary => encode_binary(&sample),
            Format::Json => encode_json(&sample)?,
        };
        socket.send_to(&datagram, cli.target)?;
        sent += 1;
        debug!(sent, x = position.x, y = position.y, z = position.z, "sent");
        thread::sleep(interval);
    }
    info!(sent, "finished");
    Ok(())
}
