use std::rc::Rc;

use hashbrown::HashMap;

use crate::*;

/// Shared handle to the single stored instance of a cell.
pub type CanonicalCell = Rc<Cell>;

/// Uniform grid laid over the map, and the single source of truth for cell identity.
#[derive(Clone, Debug)]
pub struct Board {
    tile_width: f64,
    visibility_radius: Coord,
    known_cells: HashMap<Cell, CanonicalCell>,
}

impl Board {
    pub fn new(tile_width: f64, visibility_radius: Coord) -> Self {
        Self {
            tile_width,
            visibility_radius,
            known_cells: HashMap::new(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.tile_width, config.visibility_radius)
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn visibility_radius(&self) -> Coord {
        self.visibility_radius
    }

    pub fn known_cell_count(&self) -> usize {
        self.known_cells.len()
    }

    /// Returns the memoized instance for `cell`, storing it on first use.
    pub fn canonical_cell(&mut self, cell: Cell) -> CanonicalCell {
        self.known_cells
            .entry(cell)
            .or_insert_with(|| Rc::new(cell))
            .clone()
    }

    pub fn cell_for_position(&mut self, pos: LatLng) -> CanonicalCell {
        let cell = self.locate(pos);
        self.canonical_cell(cell)
    }

    /// Cell containing `pos`, without memoizing it.
    pub fn locate(&self, pos: LatLng) -> Cell {
        Cell::new(self.axis_index(pos.lat), self.axis_index(pos.lng))
    }

    pub fn cell_bounds(&self, cell: Cell) -> CellBounds {
        let w = self.tile_width;
        CellBounds {
            south_west: LatLng::new(f64::from(cell.i) * w, f64::from(cell.j) * w),
            north_east: LatLng::new(
                (f64::from(cell.i) + 1.) * w,
                (f64::from(cell.j) + 1.) * w,
            ),
        }
    }

    /// Whether the south-west corner of `cell` lies on the map.
    pub fn is_on_map(&self, cell: Cell) -> bool {
        self.cell_bounds(cell).south_west.is_on_map()
    }

    /// Cells of the `2R x 2R` square around the cell containing `pos`, offsets `-R..R` on
    /// both axes, in row-major order.
    pub fn cells_near_position(&mut self, pos: LatLng) -> Vec<CanonicalCell> {
        let origin = *self.cell_for_position(pos);
        let radius = self.visibility_radius;
        let side = 2 * radius.max(0) as usize;
        let mut cells = Vec::with_capacity(side * side);
        for di in -radius..radius {
            for dj in -radius..radius {
                cells.push(self.canonical_cell(origin.offset(di, dj)));
            }
        }
        log::trace!("{} cells near {}", cells.len(), origin);
        cells
    }

    fn axis_index(&self, coord: f64) -> Coord {
        let w = self.tile_width;
        // saturates for coordinates beyond the index range
        let index = (coord / w).floor() as Coord;
        // rounding in the division can land one tile off near an edge
        if coord < f64::from(index) * w {
            index.saturating_sub(1)
        } else if coord >= (f64::from(index) + 1.) * w {
            index.saturating_add(1)
        } else {
            index
        }
    }
}
