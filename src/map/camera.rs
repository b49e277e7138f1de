use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::config::{
    AUTO_ROTATE_SPEED, CAMERA_DISTANCE, CAMERA_FOV_DEG, CAMERA_MAX_DISTANCE, CAMERA_MIN_DISTANCE,
    ROTATE_SPEED, ZOOM_SPEED,
};

/// Keeps the camera from flipping over the poles.
const POLAR_LIMIT: f64 = FRAC_PI_2 - 0.01;
const NEAR: f64 = 0.1;

/// Projected point in canvas pixels, plus distance along the view axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl ScreenPoint {
    #[inline(always)]
    pub fn pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: DVec3,
    pub dir: DVec3,
}

/// Perspective camera orbiting the origin with Y up.
///
/// Position is kept in spherical form (distance, azimuth around Y, elevation
/// above the equator); the orthonormal basis is rebuilt on every change.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    distance: f64,
    azimuth: f64,
    elevation: f64,
    fov: f64,
    position: DVec3,
    /// Direction the camera looks (towards the origin)
    forward: DVec3,
    right: DVec3,
    up: DVec3,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl OrbitCamera {
    pub fn new(width: usize, height: usize) -> Self {
        let mut cam = Self {
            distance: CAMERA_DISTANCE,
            azimuth: 0.0,
            elevation: 0.0,
            fov: CAMERA_FOV_DEG.to_radians(),
            position: DVec3::ZERO,
            forward: DVec3::NEG_Z,
            right: DVec3::X,
            up: DVec3::Y,
            width,
            height,
        };
        cam.rebuild();
        cam
    }

    fn rebuild(&mut self) {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.position = DVec3::new(cos_el * sin_az, sin_el, cos_el * cos_az) * self.distance;
        self.forward = (-self.position).normalize();
        self.right = self.forward.cross(DVec3::Y).normalize();
        self.up = self.right.cross(self.forward).normalize();
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Focal length in pixels for the vertical field of view.
    #[inline(always)]
    fn focal(&self) -> f64 {
        (self.height.max(1) as f64 / 2.0) / (self.fov / 2.0).tan()
    }

    /// Project a scene point to canvas pixels. `None` behind the camera.
    pub fn project(&self, p: DVec3) -> Option<ScreenPoint> {
        let rel = p - self.position;
        let depth = rel.dot(self.forward);
        if depth < NEAR {
            return None;
        }
        let f = self.focal();
        Some(ScreenPoint {
            x: self.width as f64 / 2.0 + f * rel.dot(self.right) / depth,
            y: self.height as f64 / 2.0 - f * rel.dot(self.up) / depth,
            depth,
        })
    }

    /// Ray from the eye through a canvas pixel.
    pub fn ray(&self, px: f64, py: f64) -> Ray {
        let dx = px - self.width as f64 / 2.0;
        let dy = py - self.height as f64 / 2.0;
        let dir = self.forward * self.focal() + self.right * dx - self.up * dy;
        Ray {
            origin: self.position,
            dir: dir.normalize(),
        }
    }

    /// Nearest intersection of the pixel's ray with a sphere at the origin.
    pub fn pick_sphere(&self, px: f64, py: f64, radius: f64) -> Option<DVec3> {
        self.pick_sphere_at(px, py, DVec3::ZERO, radius)
    }

    /// Nearest intersection of the pixel's ray with a sphere at `center`.
    pub fn pick_sphere_at(&self, px: f64, py: f64, center: DVec3, radius: f64) -> Option<DVec3> {
        let ray = self.ray(px, py);
        let oc = ray.origin - center;
        // |oc + t d|^2 = r^2 with |d| = 1
        let b = oc.dot(ray.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t = if -b - sq > 0.0 { -b - sq } else { -b + sq };
        (t > 0.0).then(|| ray.origin + ray.dir * t)
    }

    /// Distance along the view axis, for depth comparisons.
    #[inline(always)]
    pub fn depth_of(&self, p: DVec3) -> f64 {
        (p - self.position).dot(self.forward)
    }

    /// True if a point on a sphere centred at the origin is on the
    /// camera-facing side of its horizon.
    #[inline(always)]
    pub fn faces_camera(&self, p: DVec3) -> bool {
        p.dot(self.position - p) > 0.0
    }

    /// Screen pixels per scene unit at a given view depth.
    #[inline(always)]
    pub fn pixels_per_unit(&self, depth: f64) -> f64 {
        self.focal() / depth.max(NEAR)
    }

    /// Apparent radius in pixels of a sphere at the origin.
    pub fn sphere_screen_radius(&self, radius: f64) -> f64 {
        let d2 = self.distance * self.distance - radius * radius;
        if d2 <= 0.0 {
            return f64::INFINITY;
        }
        self.focal() * radius / d2.sqrt()
    }

    /// Orbit by a pixel drag delta. Dragging right swings the camera left so
    /// the surface follows the cursor.
    pub fn rotate_drag(&mut self, dx: i32, dy: i32) {
        let per_pixel = TAU / self.height.max(1) as f64 * ROTATE_SPEED;
        self.azimuth = (self.azimuth - dx as f64 * per_pixel).rem_euclid(TAU);
        self.elevation = (self.elevation + dy as f64 * per_pixel).clamp(-POLAR_LIMIT, POLAR_LIMIT);
        self.rebuild();
    }

    /// Place the camera on the ray from the origin through `dir`, keeping
    /// the current distance.
    pub fn look_from(&mut self, dir: DVec3) {
        let Some(d) = dir.try_normalize() else {
            return;
        };
        self.azimuth = d.x.atan2(d.z).rem_euclid(TAU);
        self.elevation = d.y.clamp(-1.0, 1.0).asin().clamp(-POLAR_LIMIT, POLAR_LIMIT);
        self.rebuild();
    }

    /// One frame of auto-rotation (assumes ~60 fps like the speed constant).
    /// The camera swings so the longitude under it drifts west, the way
    /// Earth turns when seen from above the north pole.
    pub fn auto_rotate(&mut self) {
        self.azimuth = (self.azimuth - TAU / 3600.0 * AUTO_ROTATE_SPEED).rem_euclid(TAU);
        self.rebuild();
    }

    pub fn zoom_in(&mut self) {
        self.zoom(1.0 / 0.95_f64.powf(ZOOM_SPEED));
    }

    pub fn zoom_out(&mut self) {
        self.zoom(0.95_f64.powf(ZOOM_SPEED));
    }

    /// Scale distance to the target: factor > 1 moves closer.
    fn zoom(&mut self, factor: f64) {
        self.distance = (self.distance / factor).clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
        self.rebuild();
    }

    /// Scene point under the screen centre, if the globe is there.
    pub fn center_target(&self, radius: f64) -> Option<DVec3> {
        self.pick_sphere(self.width as f64 / 2.0, self.height as f64 / 2.0, radius)
    }
}
