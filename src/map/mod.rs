pub mod atlas;
pub mod camera;
mod geometry;
pub mod outline;
mod renderer;
pub mod scene;
mod spherical;

pub use atlas::{Atlas, Boundary, Country, CountryId};
pub use camera::OrbitCamera;
pub use outline::outline_rings;
pub use renderer::{GlobeLayers, GlobeRenderer, SceneView, Tooltip};
pub use scene::{Light, Moon, StarField};
