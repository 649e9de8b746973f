//! Deterministic grid, cache and persistence model for a location-based coin collecting game.
//!
//! The map is cut into square cells. Whether a cell holds a cache, and how many coins it starts
//! with, is derived from [`luck`] on the cell's key, so every player sees the same world. The
//! mutable part (who holds which coin) lives in a [`World`] and is snapshotted into a flat
//! [`KeyValueStore`] by a [`Session`].

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cache::*;
pub use error::*;
pub use luck::*;
pub use session::*;
pub use storage::*;
pub use types::*;
pub use world::*;

mod board;
mod cache;
mod error;
mod luck;
mod session;
mod storage;
mod types;
mod world;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Where a fresh player starts.
    pub start: LatLng,
    /// Cell edge length, in degrees.
    pub tile_width: f64,
    /// Half-width of the neighbourhood around the player, in cells.
    pub visibility_radius: Coord,
    pub spawn_probability: f64,
    pub max_coins_per_cache: u32,
}

impl GameConfig {
    pub const DEFAULT_START: LatLng = LatLng::new(36.98949379578401, -122.06277128548504);
    pub const DEFAULT_TILE_WIDTH: f64 = 1e-4;
    pub const DEFAULT_VISIBILITY_RADIUS: Coord = 8;
    pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.09;
    pub const DEFAULT_MAX_COINS_PER_CACHE: u32 = 30;

    pub const fn new_unchecked(
        start: LatLng,
        tile_width: f64,
        visibility_radius: Coord,
        spawn_probability: f64,
        max_coins_per_cache: u32,
    ) -> Self {
        Self {
            start,
            tile_width,
            visibility_radius,
            spawn_probability,
            max_coins_per_cache,
        }
    }

    pub fn new(
        start: LatLng,
        tile_width: f64,
        visibility_radius: Coord,
        spawn_probability: f64,
        max_coins_per_cache: u32,
    ) -> Self {
        let start = Self::checked_start(start);
        let tile_width = if tile_width.is_finite() && tile_width > 0. {
            tile_width
        } else {
            log::warn!("Invalid tile width {}, using default", tile_width);
            Self::DEFAULT_TILE_WIDTH
        };
        let spawn_probability = if spawn_probability.is_nan() {
            Self::DEFAULT_SPAWN_PROBABILITY
        } else {
            spawn_probability.clamp(0., 1.)
        };
        Self::new_unchecked(
            start,
            tile_width,
            visibility_radius.clamp(1, 1 << 10),
            spawn_probability,
            max_coins_per_cache.max(1),
        )
    }

    pub fn with_start(self, start: LatLng) -> Self {
        Self {
            start: Self::checked_start(start),
            ..self
        }
    }

    fn checked_start(start: LatLng) -> LatLng {
        if start.is_on_map() {
            start
        } else {
            log::warn!("Invalid start {:?}, using default", start);
            Self::DEFAULT_START
        }
    }

    pub fn with_visibility_radius(self, visibility_radius: Coord) -> Self {
        Self::new(
            self.start,
            self.tile_width,
            visibility_radius,
            self.spawn_probability,
            self.max_coins_per_cache,
        )
    }

    /// The deterministic spawn test for `cell`.
    pub fn spawns_cache(&self, cell: Cell) -> bool {
        luck(&cell.key()) < self.spawn_probability
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(
            Self::DEFAULT_START,
            Self::DEFAULT_TILE_WIDTH,
            Self::DEFAULT_VISIBILITY_RADIUS,
            Self::DEFAULT_SPAWN_PROBABILITY,
            Self::DEFAULT_MAX_COINS_PER_CACHE,
        )
    }
}
