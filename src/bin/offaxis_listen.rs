// Copyright 2026, The offaxis Authors
// SPDX-License-Identifier: BSL-1.0

// Listens for head-position datagrams and drives a frustum at a fixed frame
// rate, printing the eye and the frustum extents.

use clap::{Parser, ValueEnum};
use offaxis::{
    CameraState, FixedPosition, FrameDriver, Placement, PositionProvider, TickOutcome,
    TrackerConfig, TrackingSession, Vec3, WireFormat,
};
use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Binary,
    Json,
    Auto,
}

impl From<Format> for WireFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Binary => WireFormat::Binary,
            Format::Json => WireFormat::Json,
            Format::Auto => WireFormat::Auto,
        }
    }
}

#[derive(Parser)]
#[command(name = "offaxis_listen")]
#[command(about = "Receive head tracking over UDP and print the resulting off-axis frustum")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// UDP port, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Wire format, overriding the configuration
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Sensor position in world units, if the configuration has no placement
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    sensor_at: Option<Vec<f64>>,

    /// Ignore the network and hold the eye at this world position
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    fixed_eye: Option<Vec<f64>>,

    /// Frames per second
    #[arg(long, default_value = "60")]
    rate: f64,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Print every Nth frame
    #[arg(long, default_value = "30")]
    print_every: u64,
}

fn vec3(values: &[f64]) -> Vec3 {
    Vec3::new(values[0], values[1], values[2])
}

fn run<P: PositionProvider>(
    provider: P,
    config: &TrackerConfig,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let screen = config.screen.to_quad();
    let mut driver = FrameDriver::new(provider, config.smoothing, config.frustum)?;
    let mut camera = CameraState::default();
    let period = Duration::from_secs_f64(1.0 / cli.rate);
    let mut last = Instant::now();
    let mut frame = 0u64;

    while cli.frames.map_or(true, |limit| frame < limit) {
        thread::sleep(period);
        let now = Instant::now();
        let dt = (now - last).as_secs_f64();
        last = now;

        let outcome = driver.tick(dt, &screen, &mut camera);
        if frame % cli.print_every.max(1) == 0 {
            match outcome {
                TickOutcome::NoData => println!("frame {}: waiting for data", frame),
                TickOutcome::Degenerate(e) => println!("frame {}: no frustum: {}", frame, e),
                TickOutcome::Applied { eye, frustum } => {
                    let p = &frustum.params;
                    println!(
                        "frame {}: eye ({:.3}, {:.3}, {:.3}) l {:.4} r {:.4} b {:.4} t {:.4} n {:.4}{}",
                        frame,
                        eye.x,
                        eye.y,
                        eye.z,
                        p.left,
                        p.right,
                        p.bottom,
                        p.top,
                        p.near,
                        if frustum.reused.is_some() { " (reused)" } else { "" }
                    );
                }
            }
        }
        frame += 1;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    if !(cli.rate > 0.0) {
        return Err("rate must be positive".into());
    }

    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_path(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listen.port = port;
    }
    if let Some(format) = cli.format {
        config.listen.wire_format = format.into();
    }
    if let Some(at) = &cli.sensor_at {
        config.adapter.sensor_placement = Some(Placement::from_translation(vec3(at)));
    }

    if let Some(eye) = &cli.fixed_eye {
        info!("using a fixed eye position");
        return run(FixedPosition(vec3(eye)), &config, &cli);
    }

    config.validate()?;
    let session = TrackingSession::from_config(&config)?;
    info!(local_addr = %session.local_addr(), "listening");
    run(&session, &config, &cli)?;
    let counts = session.stats();
    info!(
        received = counts.received,
        published = counts.published,
        dropped = counts.dropped,
        "done"
    );
    if !session.stop() {
        warn!("receive thread was abandoned");
    }
    Ok(())
}
