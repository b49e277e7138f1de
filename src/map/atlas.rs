use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, Value};

use crate::geo::wrap_lon;
use crate::map::spherical::SphericalPolygon;

/// A ring of (lon, lat) positions.
pub type Ring = LineString<f64>;

/// Boundary of a country as read from the feature collection.
#[derive(Clone, Debug)]
pub enum Boundary {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// Any other geometry: kept so collection order is preserved, but it
    /// never renders and never contains a point.
    Other,
}

impl Boundary {
    /// Build from a GeoJSON geometry value. Positions with fewer than two
    /// ordinates are dropped.
    pub fn from_geojson(value: &Value) -> Self {
        match value {
            Value::Polygon(rings) => Boundary::Polygon(polygon_from_rings(rings)),
            Value::MultiPolygon(polygons) => Boundary::MultiPolygon(MultiPolygon::new(
                polygons.iter().map(|rings| polygon_from_rings(rings)).collect(),
            )),
            _ => Boundary::Other,
        }
    }

    /// Constituent polygons, in order.
    pub(crate) fn polygons(&self) -> std::slice::Iter<'_, Polygon<f64>> {
        match self {
            Boundary::Polygon(p) => std::slice::from_ref(p).iter(),
            Boundary::MultiPolygon(mp) => mp.0.iter(),
            Boundary::Other => [].iter(),
        }
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Polygon<f64> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .filter(|pos| pos.len() >= 2)
            .map(|pos| Coord { x: pos[0], y: pos[1] })
            .collect::<Vec<_>>()
    });
    let exterior = LineString::new(rings.next().unwrap_or_default());
    let interiors = rings.map(LineString::new).collect();
    Polygon::new(exterior, interiors)
}

/// A named region with a polygonal boundary.
#[derive(Clone, Debug)]
pub struct Country {
    pub name: String,
    pub boundary: Boundary,
    /// Boundary prepared for lookups on the sphere.
    shape: Vec<SphericalPolygon>,
}

impl Country {
    pub fn new(name: impl Into<String>, boundary: Boundary) -> Self {
        let shape = boundary.polygons().map(SphericalPolygon::new).collect();
        Self {
            name: name.into(),
            boundary,
            shape,
        }
    }

    /// Convert a GeoJSON feature. Features without geometry become
    /// [`Boundary::Other`].
    pub fn from_feature(feature: &Feature) -> Self {
        let props = feature.properties.as_ref();
        let name = props
            .and_then(|p| p.get("NAME").or_else(|| p.get("name")).or_else(|| p.get("ADMIN")))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown");

        let boundary = feature
            .geometry
            .as_ref()
            .map(|g| Boundary::from_geojson(&g.value))
            .unwrap_or(Boundary::Other);

        Self::new(name, boundary)
    }

    /// Point-in-polygon test on the sphere: edges are great-circle arcs.
    /// Holes are honoured.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.shape.iter().any(|polygon| polygon.contains(lon, lat))
    }
}

/// Index of a country inside the [`Atlas`] that produced it.
///
/// Only the atlas hands these out, so a held id always refers to a loaded
/// country.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CountryId(usize);

/// The loaded feature collection. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct Atlas {
    countries: Vec<Country>,
}

impl Atlas {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }

    /// First country, in collection order, whose boundary contains the point.
    ///
    /// Linear scan with a bounding box reject per polygon. Overlapping
    /// boundaries are not disambiguated further. Longitude is wrapped into
    /// [-180, 180) first.
    pub fn lookup(&self, lat: f64, lon: f64) -> Option<CountryId> {
        let lon = wrap_lon(lon);
        self.countries
            .iter()
            .position(|c| c.contains(lon, lat))
            .map(CountryId)
    }

    pub fn get(&self, id: CountryId) -> &Country {
        &self.countries[id.0]
    }

    pub fn find(&self, name: &str) -> Option<CountryId> {
        self.countries.iter().position(|c| c.name == name).map(CountryId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CountryId, &Country)> {
        self.countries.iter().enumerate().map(|(i, c)| (CountryId(i), c))
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
