use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// Signed grid index along one axis.
pub type Coord = i32;

/// A position on the map, in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }

    /// Finite, with latitude in `[-90, 90]` and longitude in `[-180, 180]`.
    pub fn is_on_map(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.
            && self.lng.abs() <= 180.
    }
}

/// Grid tile identified by row `i` (latitude axis) and column `j` (longitude axis).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub i: Coord,
    pub j: Coord,
}

impl Cell {
    pub const fn new(i: Coord, j: Coord) -> Self {
        Self { i, j }
    }

    /// Text key used for luck derivation and persistence, e.g. `"3,-2"`.
    pub fn key(self) -> String {
        self.to_string()
    }

    /// Saturates at the edges of the index range.
    pub const fn offset(self, di: Coord, dj: Coord) -> Self {
        Self::new(self.i.saturating_add(di), self.j.saturating_add(dj))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

impl FromStr for Cell {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || GameError::InvalidCellKey(s.to_string());
        let (i, j) = s.split_once(',').ok_or_else(invalid)?;
        let i = i.trim().parse().map_err(|_| invalid())?;
        let j = j.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(i, j))
    }
}

/// A collectible, tagged with the cell it was minted in and its serial there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub i: Coord,
    pub j: Coord,
    pub serial: u32,
}

impl Coin {
    pub const fn new(cell: Cell, serial: u32) -> Self {
        Self {
            i: cell.i,
            j: cell.j,
            serial,
        }
    }

    pub const fn home(self) -> Cell {
        Cell::new(self.i, self.j)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.i, self.j, self.serial)
    }
}

/// Axis-aligned rectangle covered by a cell. South-west is inclusive, north-east exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl CellBounds {
    pub fn contains(&self, pos: LatLng) -> bool {
        (self.south_west.lat..self.north_east.lat).contains(&pos.lat)
            && (self.south_west.lng..self.north_east.lng).contains(&pos.lng)
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.,
            (self.south_west.lng + self.north_east.lng) / 2.,
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Unit step as `(d_lat, d_lng)`.
    pub const fn delta(self) -> (f64, f64) {
        use Direction::*;
        match self {
            North => (1., 0.),
            South => (-1., 0.),
            East => (0., 1.),
            West => (0., -1.),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_key_parses_back() {
        let cell = Cell::new(3, -2);
        assert_eq!(cell.key(), "3,-2");
        assert_eq!("3,-2".parse::<Cell>().unwrap(), cell);
        assert_eq!(" -7 , 12".parse::<Cell>().unwrap(), Cell::new(-7, 12));
    }

    #[test]
    fn bad_cell_keys_are_rejected() {
        for key in ["", "3", "3;4", "a,b", "1,2,3"] {
            assert_eq!(
                key.parse::<Cell>(),
                Err(GameError::InvalidCellKey(key.to_string()))
            );
        }
    }

    #[test]
    fn coin_display_and_home() {
        let coin = Coin::new(Cell::new(369894, -1220628), 4);
        assert_eq!(coin.to_string(), "369894:-1220628#4");
        assert_eq!(coin.home(), Cell::new(369894, -1220628));
    }

    #[test]
    fn offset_saturates_at_index_limits() {
        let edge = Cell::new(Coord::MAX, Coord::MIN);

        assert_eq!(edge.offset(1, -1), edge);
        assert_eq!(edge.offset(-1, 1), Cell::new(Coord::MAX - 1, Coord::MIN + 1));
    }

    #[test]
    fn on_map_rejects_non_finite_and_out_of_range() {
        assert!(LatLng::new(90., -180.).is_on_map());
        assert!(LatLng::new(36.98949379578401, -122.06277128548504).is_on_map());
        assert!(!LatLng::new(f64::INFINITY, 0.).is_on_map());
        assert!(!LatLng::new(0., f64::NAN).is_on_map());
        assert!(!LatLng::new(90.5, 0.).is_on_map());
        assert!(!LatLng::new(0., -180.5).is_on_map());
    }

    #[test]
    fn latlng_serializes_with_long_names() {
        let json = serde_json::to_string(&LatLng::new(1.5, -2.25)).unwrap();
        assert_eq!(json, r#"{"latitude":1.5,"longitude":-2.25}"#);
    }
}
