//! Integer locations on the simulation plane.

use serde::{Deserialize, Serialize};

/// A point on the simulation plane, in whole units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }
}

/// Euclidean distance between two locations.
///
/// Differences are taken in `f64`, so this is defined for every pair of `i32` coordinates.
#[must_use]
pub fn distance(a: Location, b: Location) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx.hypot(dy)
}

/// The closed rectangle `[0, width] × [0, height]` agents live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Bounds { width, height }
    }

    /// Clamps each coordinate independently into the rectangle.
    #[must_use]
    pub fn clamp(&self, location: Location) -> Location {
        Location {
            x: location.x.clamp(0, self.width),
            y: location.y.clamp(0, self.height),
        }
    }

    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        (0..=self.width).contains(&location.x) && (0..=self.height).contains(&location.y)
    }
}
