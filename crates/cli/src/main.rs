#![deny(unsafe_code)]
//! CLI binary for noise-walk.
//!
//! Subcommands:
//! - `noise`: generate a Perlin noise field and write it as a grayscale PNG
//! - `walk`: run one noise-guided traversal from A to B, optionally writing
//!   the path over the field and replaying it as pointer moves
//! - `defaults`: print the default configuration and its parameter schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use noise_walk_core::{NoiseField, Point2D, Scenario, SessionStatus, WalkConfig};
use noise_walk_replay::snapshot::write_png;
use noise_walk_replay::{JsonLinesSink, OffsetInjector, PathRecorder};
use noise_walk_stepper::{spawn, PathEvent, PointSender, SessionHandle, Simulator};
use std::path::PathBuf;
use std::process;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "noise-walk", about = "Noise-guided pointer paths between two points")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a noise field and write it as a grayscale PNG.
    Noise {
        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: u32,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: u32,

        /// Noise scale; larger is smoother.
        #[arg(long, default_value_t = 100.0)]
        scale: f64,

        /// Noise grid size as a fraction of the canvas size.
        #[arg(long, default_value_t = 1.0)]
        resolution: f64,

        /// PRNG seed for the permutation table.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output file path.
        #[arg(short, long, default_value = "noise.png")]
        output: PathBuf,
    },
    /// Walk from A to B across a noise field.
    Walk {
        /// Canvas width in pixels (overrides the config).
        #[arg(short = 'W', long)]
        width: Option<u32>,

        /// Canvas height in pixels (overrides the config).
        #[arg(short = 'H', long)]
        height: Option<u32>,

        /// PRNG seed, used unless the config JSON has a "seed".
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Walk configuration as a JSON object (see `defaults`).
        #[arg(long, default_value = "{}")]
        config: String,

        /// Start point "x,y"; random when omitted.
        #[arg(long, requires = "to", allow_hyphen_values = true)]
        from: Option<Point2D>,

        /// Target point "x,y"; random when omitted.
        #[arg(long, requires = "from", allow_hyphen_values = true)]
        to: Option<Point2D>,

        /// Write the field with the path overlay to this PNG.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stream screen coordinates as JSON lines on stdout while walking.
        #[arg(long)]
        replay: bool,

        /// Screen position of the canvas origin, "x,y".
        #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
        offset: Point2D,

        /// Seconds between steps (overrides the config).
        #[arg(long)]
        sleep: Option<f64>,
    },
    /// Print the default configuration and its parameter schema.
    Defaults,
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Defaults => {
            let schema = WalkConfig::param_schema();
            if cli.json {
                let info = serde_json::json!({
                    "config": WalkConfig::default(),
                    "schema": schema,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if let Some(entries) = schema.as_object() {
                println!("Parameters:");
                for (name, entry) in entries {
                    println!(
                        "  {name:<24} {:<8} {}",
                        entry["default"].to_string(),
                        entry["description"].as_str().unwrap_or_default()
                    );
                }
            }
        }
        Command::Noise {
            width,
            height,
            scale,
            resolution,
            seed,
            output,
        } => {
            let scenario = Scenario {
                config: WalkConfig {
                    window_width: width,
                    window_height: height,
                    noise_scale: scale,
                    resolution_scale: resolution,
                    ..WalkConfig::default()
                },
                ..Scenario::new(seed)
            };
            scenario.validate()?;

            let (w, h) = scenario.canvas_size();
            let (gw, gh) = scenario.config.noise_grid_size(w, h);
            let field = NoiseField::generate(&scenario.permutation(), gw, gh, scale)?;
            write_png(&field, w, h, None, &output)?;

            let (min, max, mean) = field_stats(&field);
            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "grid_width": gw,
                    "grid_height": gh,
                    "scale": field.scale(),
                    "seed": seed,
                    "min": min,
                    "max": max,
                    "mean": mean,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "noise {width}x{height} (grid {gw}x{gh}, scale {scale}, seed {seed}, range {min:.3}..{max:.3}) -> {}",
                    output.display()
                );
            }
        }
        Command::Walk {
            width,
            height,
            seed,
            config,
            from,
            to,
            output,
            replay,
            offset,
            sleep,
        } => {
            let params: serde_json::Value = serde_json::from_str(&config)
                .map_err(|e| CliError::Input(format!("invalid --config JSON: {e}")))?;
            if !params.is_object() {
                return Err(CliError::Input("--config must be a JSON object".into()));
            }

            let mut scenario = Scenario::from_json(&params, seed);
            if let Some(w) = width {
                scenario.config.window_width = w;
            }
            if let Some(h) = height {
                scenario.config.window_height = h;
            }
            if let Some(s) = sleep {
                scenario.config.motion.step_sleep = s;
            }
            if let (Some(a), Some(b)) = (from, to) {
                scenario = scenario.with_endpoints(a, b);
            }

            let mut sim = Simulator::from_scenario(&scenario)?;
            let session = sim.start_session()?;
            info!(seed = scenario.seed, start = %session.start(), target = %session.target(), "walk starting");

            let cancel = session.cancel_token();
            ctrlc::set_handler(move || {
                warn!("interrupt received, stopping walk");
                cancel.cancel();
            })
            .map_err(|e| CliError::Io(format!("failed to install Ctrl+C handler: {e}")))?;

            let injector =
                replay.then(|| OffsetInjector::new(JsonLinesSink::new(std::io::stdout()), offset));
            let (progress, events) = PointSender::channel();
            let handle = spawn(session, ((PathRecorder::new(), injector), progress))?;
            follow_progress(&handle, &events);
            let finished = handle.join()?;
            let report = finished.outcome?;
            let ((recorder, _), _) = finished.observer;

            if let Some(path) = &output {
                let field = sim
                    .field()
                    .ok_or_else(|| CliError::Io("noise field missing after walk".into()))?;
                let (w, h) = scenario.canvas_size();
                write_png(field, w, h, Some(recorder.overlay()), path)?;
            }

            if cli.json {
                let info = serde_json::json!({
                    "seed": scenario.seed,
                    "status": report.status,
                    "points": report.points_emitted,
                    "start": report.start,
                    "target": report.target,
                    "last_point": report.last_point,
                    "output": output.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", summary_text(&info, replay)?);
            } else {
                eprintln!(
                    "walked {} -> {}: {} after {} points (seed {})",
                    report.start, report.target, report.status, report.points_emitted, scenario.seed
                );
            }

            if report.status == SessionStatus::Cancelled {
                return Err(CliError::Cancelled);
            }
        }
    }

    Ok(())
}

/// Points between progress log lines.
const PROGRESS_EVERY: usize = 100;

/// Logs the walk's progress from its event stream until the session ends.
/// Returns the number of points seen.
///
/// A session aborted by an observer sends no `Finished` event, so the loop
/// also stops once the session thread has exited and the stream is drained.
fn follow_progress<O>(handle: &SessionHandle<O>, events: &Receiver<PathEvent>) -> usize {
    let mut points = 0;
    loop {
        match events.recv_timeout(Duration::from_millis(50)) {
            Ok(PathEvent::Started { start, target }) => debug!(%start, %target, "walk started"),
            Ok(PathEvent::Point(point)) => {
                points += 1;
                if points % PROGRESS_EVERY == 0 {
                    debug!(points, %point, "walk progress");
                }
            }
            Ok(PathEvent::Finished(status)) => {
                debug!(points, %status, "walk finished");
                return points;
            }
            Err(RecvTimeoutError::Timeout) if !handle.is_finished() => {}
            Err(_) => return points,
        }
    }
}

/// JSON summary for `--json`. With `--replay` stdout already carries one
/// move per line, so the summary is kept to a single line as well.
fn summary_text(info: &serde_json::Value, replay: bool) -> Result<String, serde_json::Error> {
    if replay {
        serde_json::to_string(info)
    } else {
        serde_json::to_string_pretty(info)
    }
}

/// Minimum, maximum and mean of a field's values.
fn field_stats(field: &NoiseField) -> (f64, f64, f64) {
    let data = field.data();
    let (min, max, sum) = data.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(lo, hi, sum), &v| (lo.min(v), hi.max(v), sum + v),
    );
    (min, max, sum / data.len() as f64)
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
