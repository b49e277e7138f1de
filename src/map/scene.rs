use glam::{DMat3, DVec3};
use std::f64::consts::TAU;

use crate::config::{
    MOON_ORBIT_RADIUS, MOON_ORBIT_STEP, MOON_ORBIT_TILT, MOON_RADIUS, STAR_SHELL_DEPTH,
    STAR_SHELL_RADIUS, SUN_POSITION, TERMINATOR,
};
use crate::hash::SplitMix;

/// Directional light plus an ambient floor.
#[derive(Clone, Copy, Debug)]
pub struct Light {
    /// Unit vector pointing from the scene towards the light.
    pub direction: DVec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: DVec3::from_array(SUN_POSITION).normalize(),
        }
    }
}

impl Light {
    /// Lambert term for a surface normal, in [-1, 1].
    #[inline(always)]
    pub fn lambert(&self, normal: DVec3) -> f64 {
        normal.normalize_or_zero().dot(self.direction)
    }

    #[inline(always)]
    pub fn is_lit(&self, normal: DVec3) -> bool {
        self.lambert(normal) > TERMINATOR
    }
}

/// The moon on a tilted circular orbit around the origin.
///
/// Tidal locking: the moon never spins on its own axis. Its body frame is
/// the orbit rotation itself, so the same side stays pointed at Earth for
/// every orbital angle.
#[derive(Clone, Debug)]
pub struct Moon {
    /// Orbital angle around the tilted orbit's Y axis
    pub angle: f64,
    pub radius: f64,
    pub orbit_radius: f64,
    tilt: f64,
}

impl Default for Moon {
    fn default() -> Self {
        Self {
            angle: 0.0,
            radius: MOON_RADIUS,
            orbit_radius: MOON_ORBIT_RADIUS,
            tilt: MOON_ORBIT_TILT,
        }
    }
}

impl Moon {
    /// Orbit frame: tilt about X, then the orbital angle about Y.
    fn frame(&self) -> DMat3 {
        DMat3::from_rotation_x(self.tilt) * DMat3::from_rotation_y(self.angle)
    }

    pub fn position(&self) -> DVec3 {
        self.frame() * DVec3::new(self.orbit_radius, 0.0, 0.0)
    }

    /// Unit vector of the face that is always turned to Earth.
    pub fn near_side(&self) -> DVec3 {
        // In the orbit frame the moon sits on +X facing back along -X
        self.frame() * DVec3::NEG_X
    }

    /// One frame of orbital motion.
    pub fn advance(&mut self) {
        self.angle = (self.angle + MOON_ORBIT_STEP).rem_euclid(TAU);
    }
}

/// Fixed background stars on a thick shell far outside the orbit.
#[derive(Clone, Debug, Default)]
pub struct StarField {
    pub stars: Vec<DVec3>,
}

impl StarField {
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = SplitMix::new(seed);
        let stars = (0..count)
            .map(|_| {
                // Uniform direction: z uniform in [-1, 1], azimuth uniform
                let z = rng.range(-1.0, 1.0);
                let az = rng.range(0.0, TAU);
                let s = (1.0 - z * z).sqrt();
                let r = STAR_SHELL_RADIUS + rng.range(0.0, STAR_SHELL_DEPTH);
                DVec3::new(s * az.cos(), z, s * az.sin()) * r
            })
            .collect();
        Self { stars }
    }
}
