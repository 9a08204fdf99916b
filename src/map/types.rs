use std::fmt;

use serde::{Deserialize, Serialize};

/// A position on the map grid, in grid units.
///
/// Deserializes from a two-element array, the way line data lists stations:
/// `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GridPos {
    pub x: f64,
    pub y: f64,
}

impl GridPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Hashable identity of the position. `-0.0` and `0.0` share a key.
    pub(crate) fn key(&self) -> (u64, u64) {
        fn bits(v: f64) -> u64 {
            if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
        }
        (bits(self.x), bits(self.y))
    }
}

impl From<[f64; 2]> for GridPos {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<GridPos> for [f64; 2] {
    fn from(pos: GridPos) -> Self {
        [pos.x, pos.y]
    }
}

/// A position in display (SVG user) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Identity of a deduplicated station.
///
/// Ids are issued in first-encounter order and are only meaningful within
/// the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line ("subway") as described by the map JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct SubwayRecord {
    pub label: String,
    pub stations: Vec<GridPos>,
    pub color: String,
    /// Grid position of the train's car group.
    pub cars: GridPos,
    /// Number of cars in the train.
    pub size: u32,
}
