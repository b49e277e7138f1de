//! Point-in-polygon on the sphere.
//!
//! Polygon edges are great-circle arcs, not straight lines in lon/lat. A
//! point is inside when the meridian arc from it down to the south pole
//! crosses the rings an odd number of times, flipped if the south pole
//! itself lies inside. Ring orientation is not trusted: a polygon is always
//! taken to be the smaller region its rings bound, so a ring only puts a
//! pole inside when it winds around that pole.
//!
//! Coordinates here are radians in a Z-up frame, unrelated to the render
//! frame in [`crate::geo`].

use geo::{LineString, Polygon};
use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

const EPSILON: f64 = 1e-6;
/// Slack on the bounds so points on an edge are never rejected early.
const BOUNDS_SLACK: f64 = 1e-9;

/// (longitude, latitude) in radians.
type Vertex = (f64, f64);

#[inline(always)]
fn cartesian((lambda, phi): Vertex) -> DVec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    DVec3::new(cos_phi * lambda.cos(), cos_phi * lambda.sin(), sin_phi)
}

/// Longitude wrapped into [-π, π].
#[inline(always)]
fn longitude(lambda: f64) -> f64 {
    if lambda.abs() <= PI {
        lambda
    } else {
        lambda.signum() * ((lambda.abs() + PI) % TAU - PI)
    }
}

/// Longitude step between consecutive vertices, the short way round.
#[inline(always)]
fn lon_step(from: f64, to: f64) -> f64 {
    let delta = longitude(to) - longitude(from);
    if delta > PI {
        delta - TAU
    } else if delta < -PI {
        delta + TAU
    } else {
        delta
    }
}

/// Ring vertices in radians, without the closing duplicate.
fn open_ring(ring: &LineString<f64>) -> Vec<Vertex> {
    let mut vertices: Vec<Vertex> = ring
        .coords()
        .map(|c| (c.x.to_radians(), c.y.to_radians()))
        .collect();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}

/// Latitude/longitude box that fully covers a polygon, great-circle
/// bulges included.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bounds {
    lat_min: f64,
    lat_max: f64,
    /// `None` when the polygon spans the antimeridian or a pole.
    lon: Option<(f64, f64)>,
}

impl Bounds {
    fn admits(&self, lambda: f64, phi: f64) -> bool {
        if phi < self.lat_min - BOUNDS_SLACK || phi > self.lat_max + BOUNDS_SLACK {
            return false;
        }
        match self.lon {
            Some((lo, hi)) => lambda >= lo - BOUNDS_SLACK && lambda <= hi + BOUNDS_SLACK,
            None => true,
        }
    }
}

/// Highest and lowest latitude reached along the arc from `a` to `b`.
fn arc_lat_range(a: Vertex, b: Vertex) -> (f64, f64) {
    let (mut lo, mut hi) = (a.1.min(b.1), a.1.max(b.1));
    let (pa, pb) = (cartesian(a), cartesian(b));
    let Some(n) = pa.cross(pb).try_normalize() else {
        return (lo, hi);
    };
    // Northernmost point of the great circle; None when it is the equator
    let Some(top) = (DVec3::Z - n * n.z).try_normalize() else {
        return (lo, hi);
    };
    let on_arc = |e: DVec3| n.dot(pa.cross(e)) >= 0.0 && n.dot(e.cross(pb)) >= 0.0;
    if on_arc(top) {
        hi = hi.max(top.z.clamp(-1.0, 1.0).asin());
    }
    if on_arc(-top) {
        lo = lo.min((-top.z).clamp(-1.0, 1.0).asin());
    }
    (lo, hi)
}

/// A polygon (exterior plus holes) prepared for containment tests.
#[derive(Clone, Debug)]
pub struct SphericalPolygon {
    rings: Vec<Vec<Vertex>>,
    south_pole_inside: bool,
    bounds: Bounds,
}

impl SphericalPolygon {
    pub fn new(polygon: &Polygon<f64>) -> Self {
        let rings: Vec<Vec<Vertex>> = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(open_ring)
            .filter(|ring| !ring.is_empty())
            .collect();

        let mut south_pole_inside = false;
        for ring in &rings {
            if let Some(pole) = encircled_pole(ring) {
                // Each ring around the south pole toggles it, like a hole would
                south_pole_inside ^= pole < 0.0;
            }
        }

        let bounds = rings
            .first()
            .map(|exterior| ring_bounds(exterior))
            .unwrap_or(Bounds {
                lat_min: 0.0,
                lat_max: -1.0,
                lon: None,
            });

        Self {
            rings,
            south_pole_inside,
            bounds,
        }
    }

    /// Does the polygon contain the point at `lon`/`lat` degrees? Holes are
    /// honoured.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let lambda = longitude(lon.to_radians());
        let phi = lat.to_radians();
        if !self.bounds.admits(lambda, phi) {
            return false;
        }
        self.south_pole_inside ^ (crossings_below(&self.rings, lambda, phi) % 2 != 0)
    }
}

/// If the ring winds once around a pole, which one: the sign of the pole's
/// latitude. A ring around the pole splits the sphere into two caps; the
/// smaller cap is the one on the ring's side of the equator.
fn encircled_pole(ring: &[Vertex]) -> Option<f64> {
    let mut prev = *ring.last()?;
    let mut winding = 0.0;
    let mut lat_sum = 0.0;
    for &v in ring {
        winding += lon_step(prev.0, v.0);
        lat_sum += v.1;
        prev = v;
    }
    (winding.abs() > PI).then(|| {
        if lat_sum < 0.0 {
            -FRAC_PI_2
        } else {
            FRAC_PI_2
        }
    })
}

fn ring_bounds(ring: &[Vertex]) -> Bounds {
    let mut lat_min = f64::INFINITY;
    let mut lat_max = f64::NEG_INFINITY;
    let (mut lon_min, mut lon_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut crosses_antimeridian = false;

    let mut prev = ring[ring.len() - 1];
    for &v in ring {
        let (lo, hi) = arc_lat_range(prev, v);
        lat_min = lat_min.min(lo);
        lat_max = lat_max.max(hi);
        let lambda = longitude(v.0);
        lon_min = lon_min.min(lambda);
        lon_max = lon_max.max(lambda);
        crosses_antimeridian |= (longitude(v.0) - longitude(prev.0)).abs() > PI;
        prev = v;
    }

    let pole = encircled_pole(ring);
    match pole {
        Some(p) if p < 0.0 => lat_min = -FRAC_PI_2,
        Some(_) => lat_max = FRAC_PI_2,
        None => {}
    }

    Bounds {
        lat_min,
        lat_max,
        lon: (!crosses_antimeridian && pole.is_none()).then_some((lon_min, lon_max)),
    }
}

/// Signed count of ring edges crossing the meridian arc from the point down
/// to the south pole.
fn crossings_below(rings: &[Vec<Vertex>], lambda: f64, phi: f64) -> i32 {
    let phi = match phi.sin() {
        s if s == 1.0 => FRAC_PI_2 + EPSILON,
        s if s == -1.0 => -FRAC_PI_2 - EPSILON,
        _ => phi,
    };
    // Normal of the point's meridian plane
    let normal = DVec3::new(lambda.sin(), -lambda.cos(), 0.0);
    let mut winding = 0;

    for ring in rings {
        let Some(&last) = ring.last() else {
            continue;
        };
        let mut p0 = last;
        for &p1 in ring {
            let (l0, l1) = (longitude(p0.0), longitude(p1.0));
            let delta = l1 - l0;
            let antimeridian = delta.abs() > PI;
            if antimeridian ^ (l0 >= lambda) ^ (l1 >= lambda) {
                let arc = cartesian(p0).cross(cartesian(p1)).normalize_or_zero();
                let meeting = normal.cross(arc).normalize_or_zero();
                let flip = antimeridian ^ (delta >= 0.0);
                let phi_arc = meeting.z.clamp(-1.0, 1.0).asin() * if flip { -1.0 } else { 1.0 };
                if phi > phi_arc || (phi == phi_arc && (arc.x != 0.0 || arc.y != 0.0)) {
                    winding += if flip { 1 } else { -1 };
                }
            }
            p0 = p1;
        }
    }
    winding
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(ring: &[(f64, f64)], holes: &[&[(f64, f64)]]) -> Polygon<f64> {
        Polygon::new(
            LineString::from(ring.to_vec()),
            holes.iter().map(|h| LineString::from(h.to_vec())).collect(),
        )
    }

    fn reversed(ring: &[(f64, f64)]) -> Vec<(f64, f64)> {
        ring.iter().rev().copied().collect()
    }

    const BOX: [(f64, f64); 5] = [(-120.0, 0.0), (-90.0, 0.0), (-90.0, 49.0), (-120.0, 49.0), (-120.0, 0.0)];

    #[test]
    fn test_point_under_great_circle_edge() {
        // The northern edge follows a great circle peaking near 49.98°N
        let shape = SphericalPolygon::new(&polygon(&BOX, &[]));
        assert!(shape.contains(-105.0, 49.8));
        assert!(shape.contains(-105.0, 25.0));
        assert!(!shape.contains(-105.0, 50.1));
        // Near the corners the arc and the parallel meet again
        assert!(!shape.contains(-119.9, 49.2));
    }

    #[test]
    fn test_orientation_does_not_matter() {
        let cw = SphericalPolygon::new(&polygon(&BOX, &[]));
        let ccw = SphericalPolygon::new(&polygon(&reversed(&BOX), &[]));
        for (lon, lat) in [(-105.0, 49.8), (-100.0, 10.0), (-80.0, 10.0), (60.0, -30.0), (-105.0, -1.0)] {
            assert_eq!(cw.contains(lon, lat), ccw.contains(lon, lat), "({lon}, {lat})");
        }
        assert!(!ccw.contains(60.0, -30.0));
    }

    #[test]
    fn test_hole() {
        let hole = [(-110.0, 10.0), (-100.0, 10.0), (-100.0, 20.0), (-110.0, 20.0), (-110.0, 10.0)];
        let shape = SphericalPolygon::new(&polygon(&BOX, &[&hole[..]]));
        assert!(!shape.contains(-105.0, 15.0));
        assert!(shape.contains(-95.0, 15.0));
    }

    #[test]
    fn test_ring_across_antimeridian() {
        let fiji = [(177.0, -19.0), (-179.0, -19.0), (-179.0, -16.0), (177.0, -16.0), (177.0, -19.0)];
        let shape = SphericalPolygon::new(&polygon(&fiji, &[]));
        assert!(shape.contains(179.5, -17.5));
        assert!(shape.contains(-179.5, -17.5));
        assert!(!shape.contains(0.0, -17.5));
        assert!(!shape.contains(170.0, -17.5));
    }

    #[test]
    fn test_ring_around_south_pole() {
        let cap = [
            (-180.0, -70.0),
            (-90.0, -70.0),
            (0.0, -70.0),
            (90.0, -70.0),
            (180.0, -70.0),
            (180.0, -90.0),
            (-180.0, -90.0),
            (-180.0, -70.0),
        ];
        let shape = SphericalPolygon::new(&polygon(&cap, &[]));
        assert!(shape.contains(45.0, -85.0));
        assert!(shape.contains(-120.0, -89.9));
        assert!(shape.contains(0.0, -90.0));
        // Between 0° and 90° the edge sags to about 75.6°S
        assert!(!shape.contains(45.0, -72.0));
        assert!(!shape.contains(45.0, -60.0));
        assert!(!shape.contains(45.0, 80.0));
    }

    #[test]
    fn test_bounds_include_arc_bulge() {
        let (lo, hi) = arc_lat_range((-90f64.to_radians(), 49f64.to_radians()), (-120f64.to_radians(), 49f64.to_radians()));
        assert!((hi.to_degrees() - 49.98).abs() < 0.01, "{}", hi.to_degrees());
        assert!((lo.to_degrees() - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_polygon_contains_nothing() {
        let shape = SphericalPolygon::new(&Polygon::new(LineString::new(vec![]), vec![]));
        assert!(!shape.contains(0.0, 0.0));
    }
}
