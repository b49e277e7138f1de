use crate::config::{Args, CAMERA_DISTANCE, EARTH_RADIUS, STAR_SEED};
use crate::data::AtlasLoader;
use crate::geo::{format_lonlat, surface_lonlat};
use crate::interaction::{Interaction, Sample, Transition};
use crate::map::{Atlas, GlobeLayers, GlobeRenderer, Moon, OrbitCamera, SceneView, StarField};
use std::time::{Duration, Instant};

/// Drag distance (in pixels) below which a press-release counts as a click.
const CLICK_SLOP: i32 = 2;

/// Map terminal cell (col, row) to braille pixel coordinates at the cell
/// centre, accounting for the 1-cell panel border.
#[inline(always)]
pub fn cell_to_pixel(col: u16, row: u16) -> (f64, f64) {
    let px = col.saturating_sub(1) as f64 * 2.0 + 1.0;
    let py = row.saturating_sub(1) as f64 * 4.0 + 2.0;
    (px, py)
}

/// Paces per-frame updates. Input wakes the event loop as often as it
/// likes; animation still advances at most once per interval.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    interval: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last: now }
    }

    /// How long the loop may wait for input before the next frame is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last))
    }

    /// True when a frame is due; starts the next interval.
    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) < self.interval {
            return false;
        }
        self.last = now;
        true
    }
}

/// Whether the scene data is ready.
pub enum Phase {
    /// Waiting for the atlas.
    Loading(AtlasLoader),
    /// No data and none coming; the loading screen stays up.
    Unavailable,
    Ready,
}

/// Application state
pub struct App {
    pub camera: OrbitCamera,
    pub moon: Moon,
    pub stars: StarField,
    pub renderer: GlobeRenderer,
    pub atlas: Option<Atlas>,
    pub interaction: Interaction,
    pub phase: Phase,
    pub should_quit: bool,
    /// Pointer ray currently hits the globe
    pub hovered: bool,
    /// Orbit drag in progress
    pub dragging: bool,
    /// Cell where the left button went down, and the last drag position
    press: Option<((u16, u16), (u16, u16))>,
    /// Current mouse position for cursor marker and status readout
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(width: usize, height: usize, star_count: usize) -> Self {
        let (pw, ph) = Self::canvas_size(width, height);
        Self {
            camera: OrbitCamera::new(pw, ph),
            moon: Moon::default(),
            stars: StarField::generate(star_count, STAR_SEED),
            renderer: GlobeRenderer::new(EARTH_RADIUS),
            atlas: None,
            interaction: Interaction::new(),
            phase: Phase::Unavailable,
            should_quit: false,
            hovered: false,
            dragging: false,
            press: None,
            mouse_pos: None,
        }
    }

    /// Build the view and start loading the country data in the background.
    pub fn start(width: usize, height: usize, args: &Args) -> Self {
        let mut app = Self::new(width, height, args.stars);
        app.phase = Phase::Loading(AtlasLoader::spawn(args.data.clone()));
        app
    }

    /// Braille pixel size of the globe panel for a terminal size.
    /// Border takes 2 cells each way, status bar one more row.
    fn canvas_size(width: usize, height: usize) -> (usize, usize) {
        let inner_width = width.saturating_sub(2);
        let inner_height = height.saturating_sub(3);
        (inner_width * 2, inner_height * 4)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let (pw, ph) = Self::canvas_size(width, height);
        self.camera.set_size(pw, ph);
    }

    /// Install a loaded atlas. Used by the background loader and by tests.
    pub fn set_atlas(&mut self, atlas: Atlas) {
        self.renderer.set_atlas(&atlas);
        self.atlas = Some(atlas);
        self.interaction = Interaction::new();
        self.phase = Phase::Ready;
    }

    /// Check on the background load.
    pub fn poll_loader(&mut self) {
        let Phase::Loading(loader) = &mut self.phase else {
            return;
        };
        match loader.poll() {
            None => {}
            Some(Ok(atlas)) => self.set_atlas(atlas),
            Some(Err(e)) => {
                log::error!("country data unavailable: {e}");
                self.phase = Phase::Unavailable;
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready)
    }

    /// Per-frame update: orbit the moon and idle-spin the camera unless the
    /// user is looking at or dragging the globe.
    pub fn tick(&mut self) {
        self.poll_loader();
        if !self.hovered && !self.dragging {
            self.moon.advance();
            self.camera.auto_rotate();
        }
    }

    /// Pointer moved without a button held.
    pub fn pointer_move(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        let hit = self.pick(col, row);
        self.update_hover(hit.is_some());
        if self.dragging {
            return;
        }
        if let (Some(point), Some(atlas)) = (hit, self.atlas.as_ref()) {
            let sample = Sample::resolve(atlas, point);
            let t = self.interaction.pointer_move(sample);
            self.log_transition(t);
        }
    }

    pub fn press(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.press = Some(((col, row), (col, row)));
    }

    /// Left-button drag: orbit the camera once past the click slop.
    pub fn drag(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        let Some((origin, last)) = self.press else {
            return;
        };
        let moved = (col as i32 - origin.0 as i32).abs() + (row as i32 - origin.1 as i32).abs();
        if !self.dragging && moved < CLICK_SLOP {
            return;
        }
        if !self.dragging {
            log::trace!("orbit drag started");
        }
        self.dragging = true;
        // One cell is 2 pixels wide and 4 tall
        let dx = (col as i32 - last.0 as i32) * 2;
        let dy = (row as i32 - last.1 as i32) * 4;
        self.camera.rotate_drag(dx, dy);
        self.press = Some((origin, (col, row)));
    }

    /// Button released: ends a drag, or clicks if the pointer barely moved.
    pub fn release(&mut self, col: u16, row: u16) {
        let was_dragging = std::mem::take(&mut self.dragging);
        self.press = None;
        if !was_dragging {
            self.click(col, row);
        }
    }

    /// Click (or tap) on a cell.
    pub fn click(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        let hit = self.pick(col, row);
        self.update_hover(hit.is_some());
        if let (Some(point), Some(atlas)) = (hit, self.atlas.as_ref()) {
            let sample = Sample::resolve(atlas, point);
            let t = self.interaction.click(sample);
            self.log_transition(t);
        }
    }

    fn pick(&self, col: u16, row: u16) -> Option<glam::DVec3> {
        let (px, py) = cell_to_pixel(col, row);
        self.camera.pick_sphere(px, py, EARTH_RADIUS)
    }

    /// Track hover and emit pointer-leave when the ray slides off the globe.
    fn update_hover(&mut self, over_globe: bool) {
        if self.hovered && !over_globe {
            let t = self.interaction.pointer_leave();
            self.log_transition(t);
        }
        self.hovered = over_globe;
    }

    fn log_transition(&self, t: Transition) {
        if let (Transition::Entered(id), Some(atlas)) = (t, self.atlas.as_ref()) {
            log::debug!("highlight {}", atlas.get(id).name);
        } else if t == Transition::Cleared {
            log::debug!("highlight cleared");
        }
    }

    pub fn orbit(&mut self, dx: i32, dy: i32) {
        self.camera.rotate_drag(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out();
    }

    /// Swing the camera over the highlighted country.
    pub fn focus_highlight(&mut self) {
        if let Some(anchor) = self.interaction.anchor() {
            self.camera.look_from(anchor);
        }
    }

    /// Put the camera back where it started.
    pub fn reset_view(&mut self) {
        self.camera = OrbitCamera::new(self.camera.width, self.camera.height);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Rasterise the scene for a panel of `cols` x `rows` cells.
    pub fn layers(&self, cols: usize, rows: usize) -> GlobeLayers {
        let highlight = self
            .interaction
            .highlighted()
            .zip(self.interaction.anchor());
        self.renderer.render(
            cols,
            rows,
            &SceneView {
                camera: &self.camera,
                moon: &self.moon,
                stars: &self.stars,
                atlas: self.atlas.as_ref(),
                highlight,
            },
        )
    }

    /// Name of the highlighted country.
    pub fn highlighted_name(&self) -> Option<&str> {
        let id = self.interaction.highlighted()?;
        Some(self.atlas.as_ref()?.get(id).name.as_str())
    }

    /// Lon/lat under the mouse cursor, formatted.
    pub fn cursor_coords(&self) -> Option<String> {
        let (col, row) = self.mouse_pos?;
        let point = self.pick(col, row)?;
        let (lon, lat) = surface_lonlat(point);
        Some(format_lonlat(lon, lat))
    }

    /// Lon/lat at the middle of the view, when the globe covers it.
    pub fn center_coords(&self) -> Option<String> {
        let point = self.camera.center_target(EARTH_RADIUS)?;
        let (lon, lat) = surface_lonlat(point);
        Some(format_lonlat(lon, lat))
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", CAMERA_DISTANCE / self.camera.distance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Highlight;
    use crate::map::atlas::fixtures;
    use std::path::PathBuf;

    /// Terminal of 102x53 gives a 200x200 pixel panel; the globe sits at its
    /// centre with the camera on +Z, so the cell under the centre looks at
    /// lon -90, lat 0.
    fn app() -> App {
        let mut app = App::new(102, 53, 0);
        app.set_atlas(fixtures::world());
        app
    }

    /// Cell whose centre ray hits closest to a geographic point.
    fn cell_over(app: &App, lon: f64, lat: f64) -> (u16, u16) {
        let p = crate::geo::lonlat_to_vec3(lon, lat, EARTH_RADIUS);
        let s = app.camera.project(p).expect("in front of camera");
        let col = (s.x / 2.0).floor() as u16 + 1;
        let row = (s.y / 4.0).floor() as u16 + 1;
        (col, row)
    }

    fn face(app: &mut App, lon: f64, lat: f64) {
        app.camera.look_from(crate::geo::lonlat_to_vec3(lon, lat, EARTH_RADIUS));
    }

    #[test]
    fn test_event_burst_ticks_once_per_frame() {
        let mut app = app();
        let t0 = Instant::now();
        let frame = Duration::from_millis(16);
        let mut clock = FrameClock::new(frame, t0);

        // A flood of mouse events inside one frame interval
        let angle = app.moon.angle;
        for i in 0..50 {
            app.pointer_move(1, 1);
            if clock.due(t0 + Duration::from_micros(i * 100)) {
                app.tick();
            }
        }
        assert_eq!(app.moon.angle, angle);

        assert!(clock.due(t0 + frame));
        app.tick();
        assert!(!clock.due(t0 + frame + Duration::from_millis(1)));
        assert!(app.moon.angle > angle);
    }

    #[test]
    fn test_frame_clock_remaining() {
        let t0 = Instant::now();
        let clock = FrameClock::new(Duration::from_millis(16), t0);
        assert_eq!(clock.remaining(t0), Duration::from_millis(16));
        assert_eq!(clock.remaining(t0 + Duration::from_millis(10)), Duration::from_millis(6));
        assert_eq!(clock.remaining(t0 + Duration::from_millis(40)), Duration::ZERO);
    }

    #[test]
    fn test_cell_to_pixel_accounts_for_border() {
        assert_eq!(cell_to_pixel(1, 1), (1.0, 2.0));
        assert_eq!(cell_to_pixel(0, 0), (1.0, 2.0));
        assert_eq!(cell_to_pixel(11, 6), (21.0, 22.0));
    }

    #[test]
    fn test_hover_country_then_ocean_then_off_globe() {
        let mut app = app();
        face(&mut app, 2.35, 46.5);
        let france = app.atlas.as_ref().unwrap().find("France").unwrap();

        let (c, r) = cell_over(&app, 2.35, 46.5);
        app.pointer_move(c, r);
        assert!(app.hovered);
        assert_eq!(app.interaction.highlighted(), Some(france));
        assert_eq!(app.highlighted_name(), Some("France"));

        let (c, r) = cell_over(&app, -20.0, 40.0);
        app.pointer_move(c, r);
        assert_eq!(app.interaction.state(), Highlight::Idle);

        let (c, r) = cell_over(&app, 2.35, 46.5);
        app.pointer_move(c, r);
        assert!(app.interaction.highlighted().is_some());
        app.pointer_move(1, 1);
        assert!(!app.hovered);
        assert_eq!(app.interaction.state(), Highlight::Idle);
    }

    #[test]
    fn test_moves_ignored_while_dragging_but_clicks_are_not() {
        let mut app = app();
        face(&mut app, 2.35, 46.5);
        let (c, r) = cell_over(&app, 2.35, 46.5);
        app.dragging = true;
        app.pointer_move(c, r);
        assert_eq!(app.interaction.state(), Highlight::Idle);
        app.dragging = false;
        app.click(c, r);
        assert_eq!(app.highlighted_name(), Some("France"));
    }

    #[test]
    fn test_drag_orbits_and_release_does_not_click() {
        let mut app = app();
        let before = app.camera.position();
        app.press(50, 25);
        app.drag(60, 25);
        assert!(app.dragging);
        assert!(app.camera.position() != before);
        app.release(60, 25);
        assert!(!app.dragging);
        assert_eq!(app.interaction.state(), Highlight::Idle);
    }

    #[test]
    fn test_focus_highlight_centres_country() {
        let mut app = app();
        face(&mut app, 2.35, 46.5);
        let (c, r) = cell_over(&app, 2.35, 46.5);
        app.click(c, r);
        app.reset_view();
        app.focus_highlight();
        let anchor = app.interaction.anchor().unwrap();
        assert!(app.camera.position().normalize().dot(anchor.normalize()) > 0.999);
    }

    #[test]
    fn test_center_coords_follow_camera() {
        let mut app = app();
        assert_eq!(app.center_coords().as_deref(), Some("0.0°N, 90.0°W"));
        face(&mut app, 30.0, 45.0);
        assert_eq!(app.center_coords().as_deref(), Some("45.0°N, 30.0°E"));
    }

    #[test]
    fn test_tick_pauses_while_hovered() {
        let mut app = app();
        let angle = app.moon.angle;
        app.hovered = true;
        app.tick();
        assert_eq!(app.moon.angle, angle);
        app.hovered = false;
        app.tick();
        assert!(app.moon.angle > angle);
    }

    #[test]
    fn test_loading_stays_until_data_arrives() {
        let args = Args {
            data: PathBuf::from("/no/such/countries.geojson"),
            stars: 0,
            fps: 60,
            log_file: None,
        };
        let mut app = App::start(102, 53, &args);
        assert!(!app.is_ready());
        for _ in 0..500 {
            app.poll_loader();
            if matches!(app.phase, Phase::Unavailable) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(matches!(app.phase, Phase::Unavailable));
        assert!(!app.is_ready());
        assert!(app.atlas.is_none());
    }
}
