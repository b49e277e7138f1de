use glam::DVec3;

use crate::braille::BrailleCanvas;
use crate::map::atlas::{Atlas, CountryId};
use crate::map::camera::OrbitCamera;
use crate::map::geometry::{draw_circle, draw_line, for_each_in_disc};
use crate::map::outline::{outline_rings, Ring3};
use crate::map::scene::{Light, Moon, StarField};

/// 4x4 ordered dither thresholds, scaled to [0, 1).
const BAYER: [[f64; 4]; 4] = [
    [0.0 / 16.0, 8.0 / 16.0, 2.0 / 16.0, 10.0 / 16.0],
    [12.0 / 16.0, 4.0 / 16.0, 14.0 / 16.0, 6.0 / 16.0],
    [3.0 / 16.0, 11.0 / 16.0, 1.0 / 16.0, 9.0 / 16.0],
    [15.0 / 16.0, 7.0 / 16.0, 13.0 / 16.0, 5.0 / 16.0],
];

#[inline(always)]
fn dither(x: i32, y: i32) -> f64 {
    BAYER[y.rem_euclid(4) as usize][x.rem_euclid(4) as usize]
}

/// Surface dot density on the day side stays low so borders read on top.
const DAY_DENSITY: f64 = 0.3;
const NIGHT_DENSITY: f64 = 0.04;
const MOON_DENSITY: f64 = 0.75;

/// Text anchored to a cell of the globe panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub col: u16,
    pub row: u16,
    pub text: String,
}

/// Rasterised scene, one canvas per color layer.
pub struct GlobeLayers {
    pub stars: BrailleCanvas,
    pub night: BrailleCanvas,
    pub day: BrailleCanvas,
    pub borders_night: BrailleCanvas,
    pub borders_day: BrailleCanvas,
    pub limb: BrailleCanvas,
    pub moon: BrailleCanvas,
    pub highlight: BrailleCanvas,
    pub tooltip: Option<Tooltip>,
}

impl GlobeLayers {
    fn new(cols: usize, rows: usize) -> Self {
        let blank = BrailleCanvas::new(cols, rows);
        Self {
            stars: blank.clone(),
            night: blank.clone(),
            day: blank.clone(),
            borders_night: blank.clone(),
            borders_day: blank.clone(),
            limb: blank.clone(),
            moon: blank.clone(),
            highlight: blank,
            tooltip: None,
        }
    }

    /// Layers behind the moon, in draw order.
    fn behind_moon(&mut self) -> [&mut BrailleCanvas; 6] {
        [
            &mut self.stars,
            &mut self.night,
            &mut self.day,
            &mut self.borders_night,
            &mut self.borders_day,
            &mut self.limb,
        ]
    }
}

/// Everything one frame needs to know about the scene.
pub struct SceneView<'a> {
    pub camera: &'a OrbitCamera,
    pub moon: &'a Moon,
    pub stars: &'a StarField,
    pub atlas: Option<&'a Atlas>,
    pub highlight: Option<(CountryId, DVec3)>,
}

/// Draws the globe. Country borders are projected once when the atlas
/// arrives and reused every frame.
pub struct GlobeRenderer {
    earth_radius: f64,
    light: Light,
    borders: Vec<Ring3>,
}

impl GlobeRenderer {
    pub fn new(earth_radius: f64) -> Self {
        Self {
            earth_radius,
            light: Light::default(),
            borders: Vec::new(),
        }
    }

    /// Project every country's rings for the base map layer.
    pub fn set_atlas(&mut self, atlas: &Atlas) {
        self.borders = atlas
            .iter()
            .flat_map(|(_, country)| outline_rings(&country.boundary, self.earth_radius))
            .collect();
        log::debug!("projected {} border rings", self.borders.len());
    }

    pub fn border_ring_count(&self) -> usize {
        self.borders.len()
    }

    pub fn render(&self, cols: usize, rows: usize, view: &SceneView) -> GlobeLayers {
        let mut layers = GlobeLayers::new(cols, rows);
        let cam = view.camera;

        let Some(center) = cam.project(DVec3::ZERO) else {
            return layers;
        };
        let (cx, cy) = center.pixel();
        let disc_radius = cam.sphere_screen_radius(self.earth_radius);
        let disc_px = disc_radius.ceil().min((cols * 2 + rows * 4) as f64) as i32;

        self.draw_stars(&mut layers, view, (cx, cy), disc_radius);
        self.shade_surface(&mut layers, cam, (cx, cy), disc_px);
        for ring in &self.borders {
            self.draw_ring(cam, ring, &mut layers.borders_day, Some(&mut layers.borders_night));
        }
        draw_circle(&mut layers.limb, cx, cy, disc_radius.round() as i32);
        self.draw_moon(&mut layers, cam, view.moon);

        if let (Some(atlas), Some((id, anchor))) = (view.atlas, view.highlight) {
            let country = atlas.get(id);
            for ring in outline_rings(&country.boundary, self.earth_radius) {
                self.draw_ring(cam, &ring, &mut layers.highlight, None);
            }
            layers.tooltip = tooltip_at(cam, anchor, &country.name, cols, rows);
        }

        layers
    }

    fn draw_stars(&self, layers: &mut GlobeLayers, view: &SceneView, (cx, cy): (i32, i32), disc: f64) {
        let disc2 = disc * disc;
        for &star in &view.stars.stars {
            let Some(p) = view.camera.project(star) else {
                continue;
            };
            let (dx, dy) = (p.x - cx as f64, p.y - cy as f64);
            if dx * dx + dy * dy <= disc2 {
                continue;
            }
            let (x, y) = p.pixel();
            layers.stars.set(x, y);
        }
    }

    /// Dither the visible hemisphere by the Lambert term.
    fn shade_surface(&self, layers: &mut GlobeLayers, cam: &OrbitCamera, (cx, cy): (i32, i32), r: i32) {
        for_each_in_disc(cx, cy, r, |x, y, _, _| {
            let Some(hit) = cam.pick_sphere(x as f64, y as f64, self.earth_radius) else {
                return;
            };
            let lambert = self.light.lambert(hit);
            let threshold = dither(x, y);
            if self.light.is_lit(hit) {
                if threshold < lambert * DAY_DENSITY {
                    layers.day.set(x, y);
                }
            } else if threshold < NIGHT_DENSITY {
                layers.night.set(x, y);
            }
        });
    }

    /// Draw the camera-facing segments of a ring. With a `night` canvas,
    /// segments on the dark side go there instead.
    fn draw_ring(
        &self,
        cam: &OrbitCamera,
        ring: &[DVec3],
        day: &mut BrailleCanvas,
        mut night: Option<&mut BrailleCanvas>,
    ) {
        let max_jump = (cam.width + cam.height) as i32;
        for seg in ring.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            if !cam.faces_camera(a) || !cam.faces_camera(b) {
                continue;
            }
            let (Some(pa), Some(pb)) = (cam.project(a), cam.project(b)) else {
                continue;
            };
            let (pa, pb) = (pa.pixel(), pb.pixel());
            if (pa.0 - pb.0).abs() + (pa.1 - pb.1).abs() > max_jump {
                continue;
            }
            let target = match night.as_deref_mut() {
                Some(dark) if !self.light.is_lit(a) => dark,
                _ => &mut *day,
            };
            draw_line(target, pa, pb);
        }
    }

    /// Lit part of the moon. Whichever of Earth and moon is nearer at a
    /// pixel wins; when the moon is in front it punches out the layers
    /// behind it.
    fn draw_moon(&self, layers: &mut GlobeLayers, cam: &OrbitCamera, moon: &Moon) {
        let center = moon.position();
        let Some(p) = cam.project(center) else {
            return;
        };
        let r = (moon.radius * cam.pixels_per_unit(p.depth)).ceil() as i32;
        let (mx, my) = p.pixel();
        let span = (cam.width + cam.height) as i32;
        if mx + r < 0 || my + r < 0 || mx - r > span || my - r > span {
            return;
        }

        for_each_in_disc(mx, my, r.max(1), |x, y, _, _| {
            let Some(hit) = cam.pick_sphere_at(x as f64, y as f64, center, moon.radius) else {
                return;
            };
            let moon_depth = cam.depth_of(hit);
            if let Some(earth) = cam.pick_sphere(x as f64, y as f64, self.earth_radius) {
                if cam.depth_of(earth) < moon_depth {
                    return;
                }
            }
            for layer in layers.behind_moon() {
                layer.unset(x, y);
            }
            if self.light.is_lit(hit - center) && dither(x, y) < MOON_DENSITY {
                layers.moon.set(x, y);
            }
        });
    }
}

/// Place the label centred just above the anchor, kept inside the panel.
fn tooltip_at(cam: &OrbitCamera, anchor: DVec3, text: &str, cols: usize, rows: usize) -> Option<Tooltip> {
    let p = cam.project(anchor)?;
    if cols == 0 || rows == 0 {
        return None;
    }
    let (px, py) = p.pixel();
    let col = (px / 2).clamp(0, cols as i32 - 1);
    let row = (py / 4).clamp(0, rows as i32 - 1);

    let width = text.chars().count().min(cols) as i32;
    let left = (col - width / 2).clamp(0, cols as i32 - width);
    let top = if row > 0 { row - 1 } else { (row + 1).min(rows as i32 - 1) };
    Some(Tooltip {
        col: left as u16,
        row: top as u16,
        text: text.chars().take(width as usize).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EARTH_RADIUS;
    use crate::geo::lonlat_to_vec3;
    use crate::map::atlas::fixtures;

    fn scene<'a>(
        cam: &'a OrbitCamera,
        moon: &'a Moon,
        stars: &'a StarField,
        atlas: Option<&'a Atlas>,
        highlight: Option<(CountryId, DVec3)>,
    ) -> SceneView<'a> {
        SceneView { camera: cam, moon, stars, atlas, highlight }
    }

    #[test]
    fn test_renders_surface_and_limb() {
        let cam = OrbitCamera::new(160, 80);
        let moon = Moon::default();
        let stars = StarField::generate(500, 3);
        let renderer = GlobeRenderer::new(EARTH_RADIUS);
        let layers = renderer.render(80, 20, &scene(&cam, &moon, &stars, None, None));
        assert!(layers.limb.dot_count() > 0);
        assert!(layers.day.dot_count() > 0);
        assert!(layers.tooltip.is_none());
        assert_eq!(layers.highlight.dot_count(), 0);
    }

    #[test]
    fn test_stars_never_inside_globe() {
        let cam = OrbitCamera::new(160, 80);
        let moon = Moon::default();
        let stars = StarField::generate(5000, 9);
        let renderer = GlobeRenderer::new(EARTH_RADIUS);
        let layers = renderer.render(80, 20, &scene(&cam, &moon, &stars, None, None));
        let c = cam.project(DVec3::ZERO).unwrap();
        let r = cam.sphere_screen_radius(EARTH_RADIUS) - 1.0;
        for (col, row, _) in layers.stars.glyphs() {
            let (x, y) = (col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0);
            let d = ((x - c.x).powi(2) + (y - c.y).powi(2)).sqrt();
            assert!(d > r - 4.0, "star glyph at ({col},{row}) inside disc");
        }
    }

    #[test]
    fn test_highlight_draws_outline_and_tooltip() {
        let atlas = fixtures::world();
        let mut cam = OrbitCamera::new(160, 80);
        // Swing round until Japan faces the camera
        let tokyo = lonlat_to_vec3(139.7, 35.7, EARTH_RADIUS);
        for _ in 0..400 {
            if cam.faces_camera(tokyo) && cam.position().normalize().dot(tokyo.normalize()) > 0.7 {
                break;
            }
            cam.rotate_drag(1, 0);
        }
        assert!(cam.faces_camera(tokyo));

        let moon = Moon::default();
        let stars = StarField::default();
        let mut renderer = GlobeRenderer::new(EARTH_RADIUS);
        renderer.set_atlas(&atlas);
        assert_eq!(renderer.border_ring_count(), 1 + 2 + 2 + 1);

        let japan = atlas.find("Japan").unwrap();
        let layers = renderer.render(80, 20, &scene(&cam, &moon, &stars, Some(&atlas), Some((japan, tokyo))));
        assert!(layers.highlight.dot_count() > 0);
        let tip = layers.tooltip.expect("tooltip");
        assert_eq!(tip.text, "Japan");
        assert!((tip.col as usize) + tip.text.len() <= 80);
    }

    #[test]
    fn test_tooltip_clamped_to_panel() {
        let cam = OrbitCamera::new(20, 8);
        let tip = tooltip_at(&cam, DVec3::new(0.0, 0.0, 2.5), "A very long country name", 10, 2).unwrap();
        assert_eq!(tip.text.chars().count(), 10);
        assert_eq!(tip.col, 0);
        assert!(tip.row < 2);
    }
}
