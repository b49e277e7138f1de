use glam::DVec3;
use std::f64::consts::{PI, TAU};

/// Convert lon/lat (degrees) to a point on a sphere of radius `r`.
///
/// Polar angle is measured from +Y (north pole), azimuth from the -X axis
/// starting at the antimeridian. This matches an equirectangular texture
/// wrapped around a Y-up sphere mesh; flipping any sign mirrors the globe.
#[inline(always)]
pub fn lonlat_to_vec3(lon: f64, lat: f64, r: f64) -> DVec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    DVec3::new(
        -r * sin_phi * cos_theta,
        r * cos_phi,
        r * sin_phi * sin_theta,
    )
}

/// Equirectangular UV (0..1 on both axes) to lon/lat in degrees.
/// (0, 0) is the south-west corner of the texture, (1, 1) the north-east.
#[inline(always)]
pub fn uv_to_lonlat(u: f64, v: f64) -> (f64, f64) {
    ((u - 0.5) * 360.0, (v - 0.5) * 180.0)
}

/// Lon/lat in degrees to equirectangular UV.
#[inline(always)]
pub fn lonlat_to_uv(lon: f64, lat: f64) -> (f64, f64) {
    ((lon + 180.0) / 360.0, (lat + 90.0) / 180.0)
}

/// Texture coordinate of a point on the sphere surface, as the sphere mesh
/// would report it at a ray hit. The point need not be exactly on the
/// sphere; only its direction matters.
pub fn surface_uv(point: DVec3) -> (f64, f64) {
    let len = point.length();
    if len == 0.0 {
        return (0.5, 0.5);
    }
    let azimuth = point.z.atan2(-point.x).rem_euclid(TAU);
    let polar = (point.y / len).clamp(-1.0, 1.0).acos();
    (azimuth / TAU, 1.0 - polar / PI)
}

/// Lon/lat under a point on (or near) the sphere surface.
#[inline]
pub fn surface_lonlat(point: DVec3) -> (f64, f64) {
    let (u, v) = surface_uv(point);
    uv_to_lonlat(u, v)
}

/// Wrap a longitude into [-180, 180).
#[inline(always)]
pub fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Human readable "12.3°N, 45.6°W".
pub fn format_lonlat(lon: f64, lat: f64) -> String {
    format!(
        "{:.1}°{}, {:.1}°{}",
        lat.abs(),
        if lat >= 0.0 { "N" } else { "S" },
        lon.abs(),
        if lon >= 0.0 { "E" } else { "W" }
    )
}
