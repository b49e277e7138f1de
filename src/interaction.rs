//! Highlight state driven by pointer samples on the globe.
//!
//! ```text
//!   Idle ──sample hits country──▶ Highlighted { country, anchor }
//!    ▲                                   │  same country: anchor moves
//!    └──── sample misses / pointer leaves ┘
//! ```

use glam::DVec3;

use crate::geo::{surface_uv, uv_to_lonlat};
use crate::map::{Atlas, CountryId};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Highlight {
    #[default]
    Idle,
    Highlighted {
        country: CountryId,
        /// Scene-space hit point the tooltip hangs from.
        anchor: DVec3,
    },
}

/// What a pointer event did to the highlight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// A (different) country is now highlighted.
    Entered(CountryId),
    /// Same country, tooltip anchor moved.
    Moved,
    /// Highlight dropped.
    Cleared,
    /// Nothing changed.
    Unchanged,
}

/// Pointer sample: where the ray hit the sphere and which country is there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub point: DVec3,
    pub country: Option<CountryId>,
}

impl Sample {
    /// Resolve the country under a hit point through its texture coordinate.
    pub fn resolve(atlas: &Atlas, point: DVec3) -> Self {
        let (u, v) = surface_uv(point);
        let (lon, lat) = uv_to_lonlat(u, v);
        Self {
            point,
            country: atlas.lookup(lat, lon),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
    state: Highlight,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Highlight {
        self.state
    }

    pub fn highlighted(&self) -> Option<CountryId> {
        match self.state {
            Highlight::Highlighted { country, .. } => Some(country),
            Highlight::Idle => None,
        }
    }

    pub fn anchor(&self) -> Option<DVec3> {
        match self.state {
            Highlight::Highlighted { anchor, .. } => Some(anchor),
            Highlight::Idle => None,
        }
    }

    /// Pointer moved over the sphere.
    pub fn pointer_move(&mut self, sample: Sample) -> Transition {
        self.apply(sample)
    }

    /// Pointer clicked (or tapped) the sphere.
    pub fn click(&mut self, sample: Sample) -> Transition {
        self.apply(sample)
    }

    /// Pointer left the sphere surface.
    pub fn pointer_leave(&mut self) -> Transition {
        self.clear()
    }

    fn apply(&mut self, sample: Sample) -> Transition {
        let Some(country) = sample.country else {
            return self.clear();
        };
        let same = self.highlighted() == Some(country);
        self.state = Highlight::Highlighted {
            country,
            anchor: sample.point,
        };
        if same {
            Transition::Moved
        } else {
            Transition::Entered(country)
        }
    }

    fn clear(&mut self) -> Transition {
        match std::mem::take(&mut self.state) {
            Highlight::Idle => Transition::Unchanged,
            Highlight::Highlighted { .. } => Transition::Cleared,
        }
    }
}
