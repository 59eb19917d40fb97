//! Bokeh CLI
//!
//! Drive a bokeh particle field and watch it in the terminal.

use anyhow::{Context, Result};
use bokeh::{BokehPool, SchedulerStats};
use bokeh_animation::{AnimationClock, Easing};
use bokeh_core::{Insets, Size};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod terminal;

use config::DemoConfig;
use terminal::AsciiSurface;

#[derive(Parser)]
#[command(name = "bokeh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bokeh particle field demo", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate the field and render frames as ASCII art
    Run(RunArgs),

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of particles
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Duration of one leg in milliseconds
    #[arg(short, long)]
    duration_ms: Option<u64>,

    /// Easing curve (linear, accelerate, decelerate, accelerate_decelerate)
    #[arg(short, long)]
    easing: Option<String>,

    /// Frames to simulate
    #[arg(short, long, default_value = "600")]
    frames: u64,

    /// Frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Render every Nth frame (0 renders only the last)
    #[arg(long, default_value = "60")]
    every: u64,

    /// Drive frames from the background clock in real time
    #[arg(long)]
    realtime: bool,

    /// Real-time run length in seconds
    #[arg(long, default_value = "5", value_parser = parse_seconds)]
    seconds: Duration,

    /// Halve the host bounds at this frame
    #[arg(long)]
    resize_at: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Config { config } => cmd_config(config),
    }
}

/// Parse a non-negative, finite number of seconds
fn parse_seconds(value: &str) -> std::result::Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("`{value}`: {e}"))
}

fn load_config(args: &RunArgs) -> Result<DemoConfig> {
    let mut config = DemoConfig::load(args.config.as_deref())?;

    if let Some(count) = args.count {
        config.bokeh.count = count;
    }
    if let Some(duration_ms) = args.duration_ms {
        config.bokeh.leg_duration_ms = duration_ms;
    }
    if let Some(ref name) = args.easing {
        config.bokeh.easing = Easing::from_name(name);
    }
    if let Some(fps) = args.fps {
        config.surface.fps = fps.max(1);
    }

    Ok(config)
}

fn cmd_config(path: Option<PathBuf>) -> Result<()> {
    let config = DemoConfig::load(path.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    let surface = config.surface.clone();

    let mut pool = BokehPool::new(config.bokeh.clone())?;
    pool.on_layout(surface.size(), surface.insets());

    let mut canvas = AsciiSurface::new(
        surface.columns,
        surface.rows,
        surface.cell_width,
        surface.cell_height,
    );

    info!(
        "Running {} particles ({}ms legs, {}) on {}x{} at {}fps",
        config.bokeh.count,
        config.bokeh.leg_duration_ms,
        config.bokeh.easing,
        surface.columns,
        surface.rows,
        surface.fps
    );

    let mut clock = AnimationClock::new();
    clock.set_target_fps(surface.fps);
    if !pool.attach_clock(&clock.handle()) {
        anyhow::bail!("Animation clock unavailable");
    }

    let mut host = Host {
        pool: &pool,
        canvas: &mut canvas,
        size: surface.size(),
        padding: surface.insets(),
        every: args.every,
        resize_at: args.resize_at,
        frame: 0,
    };

    // Host became visible
    pool.start();

    if args.realtime {
        host.run_realtime(&mut clock, args.seconds)?;
    } else {
        host.run_simulated(&clock, args.frames, surface.fps);
    }
    let frames = host.frame;
    host.render();

    // Host hidden
    pool.stop();
    clock.stop_background();
    pool.detach_clock();

    report(frames, &pool.scheduler().stats());
    Ok(())
}

/// Per-frame host duties: layout changes and rendering
struct Host<'a> {
    pool: &'a BokehPool,
    canvas: &'a mut AsciiSurface,
    size: Size,
    padding: Insets,
    every: u64,
    resize_at: Option<u64>,
    frame: u64,
}

impl Host<'_> {
    fn run_simulated(&mut self, clock: &AnimationClock, frames: u64, fps: u32) {
        let dt_ms = 1000.0 / fps.max(1) as f64;
        for _ in 0..frames {
            clock.advance(dt_ms);
            self.on_frame();
        }
    }

    fn run_realtime(&mut self, clock: &mut AnimationClock, length: Duration) -> Result<()> {
        let deadline = Instant::now()
            .checked_add(length)
            .with_context(|| format!("Run length {length:?} is out of range"))?;

        let (tx, rx) = mpsc::sync_channel::<()>(1);
        clock.set_wake_callback(move || {
            // A pending wake already covers this frame
            let _ = tx.try_send(());
        });
        clock.start_background();

        let poll = Duration::from_millis(100);
        while Instant::now() < deadline {
            match rx.recv_timeout(poll) {
                Ok(()) => {
                    if clock.take_needs_redraw() {
                        self.on_frame();
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    debug!("No redraw requested within {:?}", poll);
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    anyhow::bail!("Animation clock stopped unexpectedly");
                }
            }
        }
        Ok(())
    }

    fn on_frame(&mut self) {
        self.frame += 1;

        if self.resize_at == Some(self.frame) {
            self.size = Size::new(self.size.width / 2.0, self.size.height / 2.0);
            info!(
                "Frame {}: resizing host to {}x{}",
                self.frame, self.size.width, self.size.height
            );
            self.pool.on_layout(self.size, self.padding);
            self.pool.rebuild();
        }

        if self.every > 0 && self.frame % self.every == 0 {
            self.render();
        }
    }

    fn render(&mut self) {
        self.canvas.clear();
        let drawn = self.pool.draw(&mut *self.canvas);
        println!("--- frame {} ({} visible) ---", self.frame, drawn);
        print!("{}", self.canvas);
    }
}

fn report(frames: u64, stats: &SchedulerStats) {
    if frames == 0 {
        warn!("No frames were rendered");
    }
    info!(
        "Done after {} frames: {} legs issued, {} recycled, {} suppressed, {} builds",
        frames, stats.legs_issued, stats.recycled, stats.suppressed, stats.builds
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Run(args) => args,
            Commands::Config { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&[
            "bokeh", "run", "-n", "7", "--duration-ms", "1500", "--easing", "decelerate",
            "--fps", "30",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.bokeh.count, 7);
        assert_eq!(config.bokeh.leg_duration_ms, 1500);
        assert_eq!(config.bokeh.easing, Easing::Decelerate);
        assert_eq!(config.surface.fps, 30);
    }

    #[test]
    fn test_seconds_must_be_finite() {
        let args = parse(&["bokeh", "run", "--realtime", "--seconds", "2.5"]);
        assert_eq!(args.seconds, Duration::from_millis(2500));

        for bad in ["inf", "NaN", "-1", "soon"] {
            assert!(
                Cli::try_parse_from(["bokeh", "run", "--seconds", bad]).is_err(),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_realtime_rejects_unreachable_deadline() {
        let args = parse(&["bokeh", "run", "-n", "2"]);
        let config = load_config(&args).unwrap();
        let pool = BokehPool::new(config.bokeh).unwrap();
        let mut canvas = AsciiSurface::new(4, 4, 8.0, 16.0);
        let mut host = Host {
            pool: &pool,
            canvas: &mut canvas,
            size: Size::new(32.0, 64.0),
            padding: Insets::ZERO,
            every: 0,
            resize_at: None,
            frame: 0,
        };

        let mut clock = AnimationClock::new();
        let err = host.run_realtime(&mut clock, Duration::MAX).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(!clock.is_background_running());
    }

    #[test]
    fn test_unknown_easing_falls_back() {
        let args = parse(&["bokeh", "run", "--easing", "bouncy"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.bokeh.easing, Easing::Linear);
    }

    #[test]
    fn test_simulated_run_with_resize() {
        let args = parse(&["bokeh", "run", "-n", "4", "--duration-ms", "100"]);
        let config = load_config(&args).unwrap();
        let surface = config.surface.clone();

        let mut pool = BokehPool::new(config.bokeh).unwrap();
        pool.on_layout(surface.size(), surface.insets());
        let clock = AnimationClock::new();
        assert!(pool.attach_clock(&clock.handle()));

        let mut canvas = AsciiSurface::new(surface.columns, surface.rows, 8.0, 16.0);
        let mut host = Host {
            pool: &pool,
            canvas: &mut canvas,
            size: surface.size(),
            padding: surface.insets(),
            every: 0,
            resize_at: Some(10),
            frame: 0,
        };

        pool.start();
        host.run_simulated(&clock, 30, 60);
        assert_eq!(host.frame, 30);
        pool.stop();

        let stats = pool.scheduler().stats();
        assert_eq!(stats.builds, 2);
        assert!(stats.recycled > 0);
        assert_eq!(
            pool.scheduler().viewport().radius,
            surface.size().width.min(surface.size().height) / 4.0
        );
    }
}
