//! Flow field used to derive the critter route when a level omits it.

use std::collections::VecDeque;

use critter_defence_core::CellCoord;

/// Breadth-first expansion order from the exit: left, right, up, down.
const EXPANSION_ORDER: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Neighbour preference while walking the field: left, down, right, up.
const DESCENT_ORDER: [(i64, i64); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Dense step-distance grid seeded from the map exit.
///
/// Distances default to `u32::MAX` for walls and for cells the exit cannot
/// reach.
#[derive(Clone, Debug, Default)]
pub(crate) struct FlowField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
}

impl FlowField {
    /// Builds the field using a reverse breadth-first search from `exit`.
    pub(crate) fn build<F>(width: u32, height: u32, exit: CellCoord, is_blocked: F) -> Self
    where
        F: Fn(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        let mut field = Self {
            width,
            height,
            distances: vec![u32::MAX; cell_count],
        };

        let Some(exit_index) = field.index(exit) else {
            return field;
        };
        if is_blocked(exit) {
            return field;
        }

        field.distances[exit_index] = 0;
        let mut queue = VecDeque::from([exit]);

        while let Some(cell) = queue.pop_front() {
            let Some(current) = field.distance(cell) else {
                continue;
            };

            for offset in EXPANSION_ORDER {
                let Some(neighbor) = field.offset(cell, offset) else {
                    continue;
                };
                if is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = field.index(neighbor) else {
                    continue;
                };
                if field.distances[neighbor_index] != u32::MAX {
                    continue;
                }

                field.distances[neighbor_index] = current + 1;
                queue.push_back(neighbor);
            }
        }

        field
    }

    /// Step distance from `cell` to the exit, if the exit is reachable.
    #[must_use]
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u32> {
        self.index(cell)
            .and_then(|index| self.distances.get(index).copied())
            .filter(|distance| *distance != u32::MAX)
    }

    /// Follows strictly decreasing distances from `entry` down to the exit.
    ///
    /// Returns `None` when `entry` cannot reach the exit.
    #[must_use]
    pub(crate) fn walk(&self, entry: CellCoord) -> Option<Vec<CellCoord>> {
        let mut current = entry;
        let mut distance = self.distance(current)?;
        let mut route = Vec::with_capacity(distance as usize + 1);
        route.push(current);

        while distance > 0 {
            let (next, next_distance) = DESCENT_ORDER
                .iter()
                .filter_map(|offset| self.offset(current, *offset))
                .filter_map(|cell| self.distance(cell).map(|value| (cell, value)))
                .find(|(_, value)| *value < distance)?;
            route.push(next);
            current = next;
            distance = next_distance;
        }

        Some(route)
    }

    fn offset(&self, cell: CellCoord, (dx, dy): (i64, i64)) -> Option<CellCoord> {
        let column = i64::from(cell.column()) + dx;
        let row = i64::from(cell.row()) + dy;
        if column < 0 || row < 0 || column >= i64::from(self.width) || row >= i64::from(self.height)
        {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sets_exit_cell_to_zero() {
        let exit = CellCoord::new(1, 2);
        let field = FlowField::build(3, 4, exit, |_| false);

        assert_eq!(field.distance(exit), Some(0));
        assert_eq!(field.distance(CellCoord::new(1, 1)), Some(1));
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(2));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(3));
    }

    #[test]
    fn build_respects_walls() {
        let exit = CellCoord::new(1, 2);
        let wall = CellCoord::new(1, 1);
        let field = FlowField::build(3, 4, exit, |cell| cell == wall);

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(4));
        assert_eq!(field.distance(CellCoord::new(0, 1)), Some(2));
    }

    #[test]
    fn walk_prefers_left_then_down() {
        let field = FlowField::build(3, 3, CellCoord::new(0, 2), |_| false);
        let route = field.walk(CellCoord::new(2, 0)).expect("reachable");

        assert_eq!(
            route,
            vec![
                CellCoord::new(2, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(0, 2),
            ]
        );
    }

    #[test]
    fn walk_fails_when_enclosed() {
        let entry = CellCoord::new(0, 0);
        let field = FlowField::build(3, 1, CellCoord::new(2, 0), |cell| {
            cell == CellCoord::new(1, 0)
        });
        assert!(field.walk(entry).is_none());
    }
}
