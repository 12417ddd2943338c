use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::os::unix::net::UnixStream;
use umbra::engine::{Engine, Trigger, ViewportSizeProvider};
use umbra::sample::{GeoFix, OrientationEvent};
use umbra::solar::Spa;

const SOCKET_PATH: &str = "/tmp/gnomon.sock";
const PREVIEW_SIZE: f64 = 1000.0;

#[derive(Parser, Debug)]
#[command(name = "umbra", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Send an orientation sample to the gnomon daemon.
    Orientation {
        /// Compass heading in degrees, clockwise from north
        heading: f64,
        #[arg(long)]
        pitch: Option<f64>,
        #[arg(long)]
        roll: Option<f64>,
        /// Deliver the bearing via the platform compass fallback field
        /// instead of the primary one
        #[arg(long)]
        fallback: bool,
    },
    /// Send a geoposition fix to the gnomon daemon.
    Geo { latitude: f64, longitude: f64 },
    /// Signal a geolocation failure to the gnomon daemon.
    GeoError,
    /// Grant or revoke geolocation consent.
    Consent { action: ConsentAction },
    /// Change the simulated hour span.
    Duration { hours: u32 },
    /// Compute a shadow table offline and print it.
    Preview {
        #[arg(long)]
        latitude: f64,
        #[arg(long)]
        longitude: f64,
        /// Compass heading in degrees (default: facing north)
        #[arg(long, default_value_t = 0.0)]
        heading: f64,
        #[arg(long, default_value_t = 3)]
        duration: u32,
        /// RFC 3339 reference time (default: now)
        #[arg(long)]
        time: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ConsentAction {
    Allow,
    Revoke,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Orientation {
            heading,
            pitch,
            roll,
            fallback,
        } => {
            let (alpha, compass) = if fallback {
                ("-".to_string(), format!(" compass {}", heading))
            } else {
                (heading.to_string(), String::new())
            };
            send_command(&format!(
                "orientation {} {} {}{}",
                alpha,
                field(pitch),
                field(roll),
                compass
            ))
        }
        Commands::Geo {
            latitude,
            longitude,
        } => send_command(&format!("geo {} {}", latitude, longitude)),
        Commands::GeoError => send_command("geo-error"),
        Commands::Consent { action } => send_command(&format!(
            "consent {}",
            match action {
                ConsentAction::Allow => "allow",
                ConsentAction::Revoke => "revoke",
            }
        )),
        Commands::Duration { hours } => send_command(&format!("duration {}", hours)),
        Commands::Preview {
            latitude,
            longitude,
            heading,
            duration,
            time,
        } => preview(latitude, longitude, heading, duration, time),
    }
}

fn field(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn send_command(line: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to gnomon daemon at {}: {}. Is gnomon running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", line)?;
    Ok(())
}

struct FixedSurface;

impl ViewportSizeProvider for FixedSurface {
    fn surface_size(&self) -> (f64, f64) {
        (PREVIEW_SIZE, PREVIEW_SIZE)
    }
}

fn preview(
    latitude: f64,
    longitude: f64,
    heading: f64,
    duration: u32,
    time: Option<String>,
) -> anyhow::Result<()> {
    let timestamp = match time {
        Some(s) => DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc),
        None => Utc::now(),
    };

    let mut engine = Engine::new(Spa, FixedSurface, duration);
    engine.apply(Trigger::Orientation(OrientationEvent {
        heading: Some(heading),
        ..Default::default()
    }));
    engine.apply(Trigger::GeoFix(GeoFix {
        timestamp,
        latitude,
        longitude,
    }));

    let snapshot = engine.snapshot();
    if let Some(north) = snapshot.north_indicator {
        println!("north indicator  ({:7.1}, {:7.1})", north.x, north.y);
    }
    if let Some(sun) = snapshot.sun_indicator {
        println!("sun indicator    ({:7.1}, {:7.1})", sun.x, sun.y);
    }
    if snapshot.shadows.is_empty() {
        println!("no visible shadows (sun below the horizon)");
        return Ok(());
    }
    for shadow in &snapshot.shadows {
        println!(
            "+{}h  center ({:7.1}, {:7.1})  radii ({:6.1}, {:6.1})  rotation {:7.1}°",
            shadow.hour_offset,
            shadow.center.x,
            shadow.center.y,
            shadow.radius_x,
            shadow.radius_y,
            shadow.rotation_degrees
        );
    }
    Ok(())
}
