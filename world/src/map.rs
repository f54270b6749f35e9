//! Grid map and the precomputed critter route.

use std::collections::HashSet;

use critter_defence_core::{
    CellCoord, Endpoint, LoadError, MapSpec, OutOfBounds, Terrain, Vector2D,
};

use crate::navigation::FlowField;

/// Largest number of cells a map may hold.
pub const MAX_MAP_CELLS: u64 = 1 << 20;

/// Single square of the map grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    coord: CellCoord,
    terrain: Terrain,
    path_index: Option<usize>,
}

impl Cell {
    /// Grid coordinate of the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Surface type of the cell.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Position of the cell along the route, or `None` when off the route.
    #[must_use]
    pub const fn path_index(&self) -> Option<usize> {
        self.path_index
    }
}

/// Immutable grid of cells with the ordered waypoint route critters follow.
///
/// A map is built once when a part starts and only read afterwards. The route
/// always holds at least two waypoints, entry first and exit last.
#[derive(Clone, Debug)]
pub struct Map {
    name: String,
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<Cell>,
    path: Vec<CellCoord>,
    waypoints: Vec<Vector2D>,
    segment_lengths: Vec<f32>,
}

impl Map {
    /// Builds a map from level content.
    ///
    /// An explicit route is validated cell by cell. Without one the route is
    /// derived from a flow field seeded at the exit.
    pub fn load(spec: &MapSpec) -> Result<Self, LoadError> {
        if spec.width == 0 || spec.height == 0 {
            return Err(LoadError::EmptyGrid {
                columns: spec.width,
                rows: spec.height,
            });
        }
        if u64::from(spec.width) * u64::from(spec.height) > MAX_MAP_CELLS {
            return Err(LoadError::TooManyCells {
                columns: spec.width,
                rows: spec.height,
                limit: MAX_MAP_CELLS,
            });
        }
        if !spec.cell_size.is_finite() || spec.cell_size <= 0.0 {
            return Err(LoadError::InvalidCellSize {
                cell_size: spec.cell_size,
            });
        }

        let mut map = Self {
            name: spec.name.clone(),
            columns: spec.width,
            rows: spec.height,
            cell_size: spec.cell_size,
            cells: Vec::new(),
            path: Vec::new(),
            waypoints: Vec::new(),
            segment_lengths: Vec::new(),
        };
        map.cells = (0..spec.height)
            .flat_map(|row| (0..spec.width).map(move |column| CellCoord::new(column, row)))
            .map(|coord| Cell {
                coord,
                terrain: Terrain::Open,
                path_index: None,
            })
            .collect();

        for wall in &spec.walls {
            let index = map.index(*wall)?;
            map.cells[index].terrain = Terrain::Blocked;
        }

        let entry = map.endpoint(spec.start, Endpoint::Entry)?;
        let exit = map.endpoint(spec.end, Endpoint::Exit)?;
        if entry == exit {
            return Err(LoadError::EntryIsExit { cell: entry });
        }

        let path = match spec.path.as_deref() {
            Some(path) if !path.is_empty() => {
                map.validate_path(path, entry, exit)?;
                path.to_vec()
            }
            _ => FlowField::build(map.columns, map.rows, exit, |cell| map.is_blocked(cell))
                .walk(entry)
                .ok_or(LoadError::Unreachable { entry, exit })?,
        };

        for (order, coord) in path.iter().enumerate() {
            let index = map.index(*coord)?;
            map.cells[index].terrain = Terrain::Path;
            map.cells[index].path_index = Some(order);
        }

        map.waypoints = path.iter().map(|coord| map.center_of(*coord)).collect();
        map.segment_lengths = map
            .waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect();
        map.path = path;

        Ok(map)
    }

    fn endpoint(&self, cell: Option<CellCoord>, endpoint: Endpoint) -> Result<CellCoord, LoadError> {
        let cell = cell.ok_or(LoadError::MissingEndpoint(endpoint))?;
        let index = self.index(cell)?;
        if self.cells[index].terrain == Terrain::Blocked {
            return Err(LoadError::EndpointBlocked { endpoint, cell });
        }
        Ok(cell)
    }

    fn validate_path(
        &self,
        path: &[CellCoord],
        entry: CellCoord,
        exit: CellCoord,
    ) -> Result<(), LoadError> {
        let (Some(first), Some(last)) = (path.first(), path.last()) else {
            return Err(LoadError::Unreachable { entry, exit });
        };
        if *first != entry {
            return Err(LoadError::PathDetached {
                endpoint: Endpoint::Entry,
                expected: entry,
                found: *first,
            });
        }
        if *last != exit {
            return Err(LoadError::PathDetached {
                endpoint: Endpoint::Exit,
                expected: exit,
                found: *last,
            });
        }

        let mut visited = HashSet::with_capacity(path.len());
        for (index, cell) in path.iter().enumerate() {
            let _ = self.index(*cell)?;
            if self.is_blocked(*cell) {
                return Err(LoadError::PathBlocked { cell: *cell });
            }
            if !visited.insert(*cell) {
                return Err(LoadError::PathRevisits { cell: *cell });
            }
            if let Some(previous) = index.checked_sub(1).and_then(|prior| path.get(prior)) {
                if !previous.is_adjacent(*cell) {
                    return Err(LoadError::Discontiguous {
                        index,
                        from: *previous,
                        to: *cell,
                    });
                }
            }
        }

        Ok(())
    }

    /// Human readable map name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge length of a cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Cell containing the provided pixel-space point.
    pub fn cell_at(&self, point: Vector2D) -> Result<&Cell, OutOfBounds> {
        let out_of_bounds = OutOfBounds::Point {
            point,
            columns: self.columns,
            rows: self.rows,
        };
        if !point.x.is_finite() || !point.y.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return Err(out_of_bounds);
        }

        let column = (point.x / self.cell_size).floor();
        let row = (point.y / self.cell_size).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return Err(out_of_bounds);
        }

        self.cell(CellCoord::new(column as u32, row as u32))
            .map_err(|_| out_of_bounds)
    }

    /// Cell at the provided grid coordinate.
    pub fn cell(&self, coord: CellCoord) -> Result<&Cell, OutOfBounds> {
        let index = self.index(coord)?;
        Ok(&self.cells[index])
    }

    /// Pixel-space centre of the provided cell.
    pub fn cell_center(&self, coord: CellCoord) -> Result<Vector2D, OutOfBounds> {
        let _ = self.index(coord)?;
        Ok(self.center_of(coord))
    }

    /// Reports whether critters and towers are barred from the cell.
    ///
    /// Cells outside the grid count as blocked.
    #[must_use]
    pub fn is_blocked(&self, coord: CellCoord) -> bool {
        self.cell(coord)
            .map_or(true, |cell| cell.terrain == Terrain::Blocked)
    }

    /// Reports whether a tower may stand on the cell.
    #[must_use]
    pub fn is_buildable(&self, coord: CellCoord) -> bool {
        self.cell(coord)
            .map_or(false, |cell| cell.terrain == Terrain::Open)
    }

    /// Ordered route cells from entry to exit.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Pixel-space centres of the route cells in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vector2D] {
        &self.waypoints
    }

    /// Index of the final waypoint.
    #[must_use]
    pub fn last_waypoint_index(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Length of the segment leaving waypoint `index`, or zero past the exit.
    #[must_use]
    pub fn segment_length(&self, index: usize) -> f32 {
        self.segment_lengths.get(index).copied().unwrap_or(0.0)
    }

    /// Point `progress` of the way along the segment leaving waypoint `index`.
    #[must_use]
    pub fn interpolate(&self, index: usize, progress: f32) -> Vector2D {
        match (self.waypoints.get(index), self.waypoints.get(index + 1)) {
            (Some(from), Some(to)) => from.lerp(*to, progress),
            (Some(from), None) => *from,
            _ => self.waypoints.last().copied().unwrap_or(Vector2D::ZERO),
        }
    }

    fn center_of(&self, coord: CellCoord) -> Vector2D {
        let half = self.cell_size * 0.5;
        Vector2D::new(
            coord.column() as f32 * self.cell_size + half,
            coord.row() as f32 * self.cell_size + half,
        )
    }

    fn index(&self, coord: CellCoord) -> Result<usize, OutOfBounds> {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return Err(OutOfBounds::Cell {
                cell: coord,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(coord.row() as usize * self.columns as usize + coord.column() as usize)
    }
}
