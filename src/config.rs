use clap::Parser;
use std::path::PathBuf;

/// Earth radius in scene units.
pub const EARTH_RADIUS: f64 = 2.5;
/// Outlines float this much above the surface so they never sink into it.
pub const OUTLINE_LIFT: f64 = 1.002;

/// Moon radius, ~0.273 of Earth's.
pub const MOON_RADIUS: f64 = 0.68;
/// Orbit radius. The real ratio is ~60 Earth radii; 6 keeps it on screen.
pub const MOON_ORBIT_RADIUS: f64 = 15.0;
/// Orbital inclination, ~5.14°.
pub const MOON_ORBIT_TILT: f64 = 0.09;
/// Orbital advance per frame in radians.
pub const MOON_ORBIT_STEP: f64 = 0.002;

/// Camera starts on +Z looking at the origin.
pub const CAMERA_DISTANCE: f64 = 8.0;
pub const CAMERA_FOV_DEG: f64 = 45.0;
pub const CAMERA_MIN_DISTANCE: f64 = 3.5;
pub const CAMERA_MAX_DISTANCE: f64 = 40.0;
pub const ROTATE_SPEED: f64 = 0.4;
pub const ZOOM_SPEED: f64 = 0.6;
/// One revolution every 200 s at 60 fps (2.0 would be every 30 s).
pub const AUTO_ROTATE_SPEED: f64 = 0.3;

/// Directional light position; the light shines from here towards the origin.
pub const SUN_POSITION: [f64; 3] = [2.0, 0.0, 5.0];
/// Lambert term below which the surface counts as night.
pub const TERMINATOR: f64 = 0.05;

pub const STAR_SHELL_RADIUS: f64 = 300.0;
pub const STAR_SHELL_DEPTH: f64 = 60.0;
pub const STAR_SEED: u64 = 0x5eed_57a2;

/// Command line options.
#[derive(Parser, Debug, Clone)]
#[command(name = "tui-globe", version, about = "Interactive terminal globe")]
pub struct Args {
    /// GeoJSON feature collection of country boundaries
    #[arg(long, default_value = "data/countries.geojson")]
    pub data: PathBuf,

    /// Number of background stars
    #[arg(long, default_value_t = 5000)]
    pub stars: usize,

    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Write logs to this file (the terminal is busy drawing the globe)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Poll timeout for one frame.
    pub fn frame_time(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / self.fps.max(1) as u64)
    }
}
