use glam::DVec3;

use crate::config::OUTLINE_LIFT;
use crate::geo::lonlat_to_vec3;
use crate::map::atlas::{Boundary, Ring};
use geo::Polygon;

/// A closed ring of points in scene space.
pub type Ring3 = Vec<DVec3>;

/// Project a country boundary onto a sphere of `radius`, lifted slightly off
/// the surface. Polygons yield exterior then holes; multipolygons yield the
/// rings of each part in order. Anything else yields nothing.
pub fn outline_rings(boundary: &Boundary, radius: f64) -> Vec<Ring3> {
    let r = radius * OUTLINE_LIFT;
    let mut rings = Vec::new();
    for polygon in boundary.polygons() {
        push_polygon(&mut rings, polygon, r);
    }
    rings
}

fn push_polygon(out: &mut Vec<Ring3>, polygon: &Polygon<f64>, r: f64) {
    if polygon.exterior().0.is_empty() {
        return;
    }
    out.push(project_ring(polygon.exterior(), r));
    out.extend(polygon.interiors().iter().map(|ring| project_ring(ring, r)));
}

fn project_ring(ring: &Ring, r: f64) -> Ring3 {
    ring.coords().map(|c| lonlat_to_vec3(c.x, c.y, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::atlas::fixtures;
    use geo::{LineString, MultiPolygon};

    fn tri(lon: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(lon, 0.0), (lon + 1.0, 0.0), (lon, 1.0), (lon, 0.0)]),
            vec![],
        )
    }

    #[test]
    fn test_multipolygon_ring_count_is_sum_of_parts() {
        let atlas = fixtures::world();
        let japan = atlas.get(atlas.find("Japan").unwrap());
        assert_eq!(outline_rings(&japan.boundary, 2.5).len(), 2);

        let mut with_hole = tri(10.0);
        with_hole.interiors_push(vec![(10.1, 0.1), (10.2, 0.1), (10.1, 0.2), (10.1, 0.1)]);
        let parts = MultiPolygon::new(vec![tri(0.0), with_hole, tri(20.0)]);
        assert_eq!(outline_rings(&Boundary::MultiPolygon(parts), 1.0).len(), 1 + 2 + 1);
    }

    #[test]
    fn test_polygon_with_hole() {
        let atlas = fixtures::world();
        let sa = atlas.get(atlas.find("South Africa").unwrap());
        let rings = outline_rings(&sa.boundary, 2.5);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 8);
        assert_eq!(rings[1].len(), 6);
    }

    #[test]
    fn test_empty_geometry_yields_nothing() {
        let empty = Boundary::MultiPolygon(MultiPolygon::new(vec![]));
        assert!(outline_rings(&empty, 1.0).is_empty());
        assert!(outline_rings(&Boundary::Other, 1.0).is_empty());
    }

    #[test]
    fn test_rings_float_above_surface() {
        let rings = outline_rings(&Boundary::Polygon(tri(30.0)), 2.5);
        for p in rings.iter().flatten() {
            assert!((p.length() - 2.5 * OUTLINE_LIFT).abs() < 1e-9);
            assert!(p.length() > 2.5);
        }
    }
}
