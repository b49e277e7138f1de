use crate::map::{Atlas, Country};
use geojson::{Feature, GeoJson};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse GeoJSON: {0}")]
    Parse(String),
    #[error("loader stopped before delivering the atlas")]
    Interrupted,
}

/// Read and parse a country feature collection from disk.
pub fn load_atlas(path: &Path) -> Result<Atlas, AtlasError> {
    let started = Instant::now();
    let mut bytes = fs::read(path).map_err(|source| AtlasError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let atlas = parse_atlas(&mut bytes)?;
    log::info!(
        "loaded {} countries from {} in {:?}",
        atlas.len(),
        path.display(),
        started.elapsed()
    );
    Ok(atlas)
}

/// Parse GeoJSON bytes in place. Accepts a FeatureCollection, a single
/// Feature, or a bare Geometry (which becomes an unnamed country).
pub fn parse_atlas(bytes: &mut [u8]) -> Result<Atlas, AtlasError> {
    let geojson: GeoJson =
        simd_json::serde::from_slice(bytes).map_err(|e| AtlasError::Parse(e.to_string()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    // Indexed parallel collect keeps collection order, which lookup relies on
    let countries: Vec<Country> = features.par_iter().map(Country::from_feature).collect();
    Ok(Atlas::new(countries))
}

/// One-shot background load on the rayon pool.
pub struct AtlasLoader {
    rx: Option<Receiver<Result<Atlas, AtlasError>>>,
}

impl AtlasLoader {
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        rayon::spawn(move || {
            // Receiver gone means the view already shut down
            let _ = tx.send(load_atlas(&path));
        });
        Self { rx: Some(rx) }
    }

    /// Non-blocking check, called once per frame. Yields the result exactly
    /// once; afterwards always `None`.
    pub fn poll(&mut self) -> Option<Result<Atlas, AtlasError>> {
        let rx = self.rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AtlasError::Interrupted),
        };
        self.rx = None;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::atlas::fixtures::WORLD;
    use std::time::Duration;

    #[test]
    fn test_parse_keeps_order() {
        let mut bytes = WORLD.as_bytes().to_vec();
        let atlas = parse_atlas(&mut bytes).unwrap();
        let names: Vec<_> = atlas.iter().map(|(_, c)| c.name.as_str()).collect();
        assert_eq!(names, ["Null Island", "France", "Japan", "South Africa", "Lesotho"]);
    }

    #[test]
    fn test_parse_single_feature_and_geometry() {
        let mut feature = br#"{"type":"Feature","properties":{"NAME":"Box"},
            "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}"#
            .to_vec();
        let atlas = parse_atlas(&mut feature).unwrap();
        assert_eq!(atlas.len(), 1);
        assert!(atlas.lookup(0.5, 0.5).is_some());

        let mut geometry =
            br#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#.to_vec();
        let atlas = parse_atlas(&mut geometry).unwrap();
        let id = atlas.lookup(0.5, 0.5).unwrap();
        assert_eq!(atlas.get(id).name, "Unknown");
    }

    #[test]
    fn test_parse_error() {
        let mut bytes = b"{ not json".to_vec();
        assert!(matches!(parse_atlas(&mut bytes), Err(AtlasError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_atlas(Path::new("/definitely/not/here.geojson")).unwrap_err();
        assert!(matches!(err, AtlasError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.geojson"));
    }

    #[test]
    fn test_loader_delivers_once() {
        let path = std::env::temp_dir().join(format!("tui-globe-test-{}.geojson", std::process::id()));
        fs::write(&path, WORLD).unwrap();

        let mut loader = AtlasLoader::spawn(path.clone());
        let mut result = None;
        for _ in 0..500 {
            if let Some(r) = loader.poll() {
                result = Some(r);
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let atlas = result.expect("loader finished").unwrap();
        assert_eq!(atlas.len(), 5);
        assert!(loader.poll().is_none());
        let _ = fs::remove_file(path);
    }
}
