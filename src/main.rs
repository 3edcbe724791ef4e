use clap::{Parser, Subcommand};
use knotmeter::api::{
    FormattedReading, OutputFormat, ReadingFormatter, SpeedReading, SpeedSource, TrackerUpdate,
};
use knotmeter::core::{AccelerationSample, GeoPosition, OrientationSample, SensorEvent};
use knotmeter::sensors::{ExternalFeed, MockMotionSource, MockOrientationSource, MockPositionSource};
use knotmeter::utils::{LogLevel, TrackerConfig};
use knotmeter::{SpeedTracker, TrackingSession, METERS_PER_SECOND_PER_KNOT};
use log::{info, warn};
use nalgebra::{Unit, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Meters per degree of latitude on the mean-radius sphere
const METERS_PER_DEGREE: f64 = 111_194.926_644_558_73;

/// Acceleration samples delivered per simulated fix
const SAMPLES_PER_FIX: u64 = 10;

#[derive(Parser)]
#[command(name = "knotmeter")]
#[command(about = "Speed over ground in knots from position fixes and acceleration")]
struct Cli {
    /// JSON tracker configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON array of recorded sensor events
    Replay {
        /// Event file
        events: PathBuf,
    },
    /// Drive mock sensors along a straight line
    Simulate {
        /// True speed over ground
        #[arg(long, default_value = "6.0")]
        speed_knots: f64,

        /// Course over ground (degrees)
        #[arg(long, default_value = "45.0")]
        course_deg: f64,

        /// Track length (seconds, one fix per second)
        #[arg(long, default_value = "30")]
        duration_s: u64,

        /// Seed for the sensor noise
        #[arg(long, default_value = "7")]
        seed: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::default(),
    };
    init_logging(config.log_level);

    let formatter = cli.format.formatter();
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    match &cli.command {
        Command::Replay { events } => replay(config, events, formatter.as_ref()),
        Command::Simulate {
            speed_knots,
            course_deg,
            duration_s,
            seed,
        } => simulate(
            config,
            *speed_knots,
            *course_deg,
            *duration_s,
            *seed,
            formatter.as_ref(),
        ),
    }
}

/// `RUST_LOG` overrides the configured level
fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .init();
}

fn replay(
    config: TrackerConfig,
    path: &Path,
    formatter: &dyn ReadingFormatter,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_data = std::fs::read_to_string(path)?;
    let events: Vec<SensorEvent> = serde_json::from_str(&json_data)?;
    info!("replaying {} events from {}", events.len(), path.display());

    let mut tracker = SpeedTracker::new(config)?;
    tracker.start(
        TrackingSession::new(Box::new(ExternalFeed::new()))
            .with_motion(Box::new(ExternalFeed::new()))
            .with_orientation(Box::new(ExternalFeed::new())),
    )?;

    for event in events {
        if let Some(TrackerUpdate::Speed(reading)) = tracker.dispatch(event) {
            print_reading(formatter, &reading, tracker.current_heading_degrees())?;
        }
    }

    tracker.stop();
    let stats = tracker.stats();
    info!(
        "{} fixes, {} acceleration samples, {} orientation samples, {} degenerate",
        stats.fixes_received,
        stats.acceleration_samples,
        stats.orientation_samples,
        stats.degenerate_samples
    );
    Ok(())
}

fn simulate(
    config: TrackerConfig,
    speed_knots: f64,
    course_deg: f64,
    duration_s: u64,
    seed: u64,
    formatter: &dyn ReadingFormatter,
) -> Result<(), Box<dyn std::error::Error>> {
    let position = MockPositionSource::new();
    let motion = MockMotionSource::new();
    let orientation = MockOrientationSource::new();

    let mut tracker = SpeedTracker::new(config)?;
    let readings = Arc::new(Mutex::new(Vec::<SpeedReading>::new()));
    let sink = Arc::clone(&readings);
    tracker.register_speed_callback(Box::new(move |reading: SpeedReading| {
        if let Ok(mut buffer) = sink.lock() {
            buffer.push(reading);
        }
    }));
    tracker.start(
        TrackingSession::new(Box::new(position.clone()))
            .with_motion(Box::new(motion.clone()))
            .with_orientation(Box::new(orientation.clone())),
    )?;

    let mut rng = StdRng::seed_from_u64(seed);
    let speed_mps = speed_knots * METERS_PER_SECOND_PER_KNOT;
    let course_rad = course_deg.to_radians();
    let up = Unit::new_normalize(Vector3::new(0.0, 0.0, 1.0));
    let interval_ms = 1_000 / SAMPLES_PER_FIX;
    info!(
        "simulating {:.2} kn on course {:.1}° for {}s (seed {})",
        speed_knots, course_deg, duration_s, seed
    );

    let (mut lat, mut lon) = (45.0_f64, 9.0_f64);
    for second in 0..=duration_s {
        let t_ms = second * 1_000;
        position.push(GeoPosition::new(
            lat + rng.gen_range(-2e-6..2e-6),
            lon + rng.gen_range(-2e-6..2e-6),
            t_ms,
        ));

        for step in 1..=SAMPLES_PER_FIX {
            let raw = Vector3::new(
                rng.gen_range(-0.3..0.3),
                rng.gen_range(-0.3..0.3),
                rng.gen_range(-0.05..0.05),
            );
            motion.push(AccelerationSample::from_axes(raw, &up, Some(t_ms + step * interval_ms)));
        }
        orientation.push(OrientationSample::new(course_deg + rng.gen_range(-3.0..3.0)));

        if let Err(e) = tracker.process() {
            warn!("tracking ended early: {}", e);
            break;
        }
        let pending: Vec<SpeedReading> = match readings.lock() {
            Ok(mut buffer) => buffer.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        // one line per fix; inertial updates in between are folded in
        for reading in pending {
            if reading.source == SpeedSource::PositionFix {
                print_reading(formatter, &reading, tracker.current_heading_degrees())?;
            }
        }

        lat += speed_mps * course_rad.cos() / METERS_PER_DEGREE;
        lon += speed_mps * course_rad.sin() / (METERS_PER_DEGREE * lat.to_radians().cos());
    }

    tracker.stop();
    Ok(())
}

fn print_reading(
    formatter: &dyn ReadingFormatter,
    reading: &SpeedReading,
    heading_deg: f64,
) -> Result<(), serde_json::Error> {
    let line = formatter.format(&FormattedReading::new(reading, heading_deg))?;
    println!("{}", line);
    Ok(())
}
