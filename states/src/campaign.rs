//! Campaign shipped with the game when no content file is supplied.

use critter_defence_core::{Campaign, CellCoord, CritterKind, LevelSpec, MapSpec, WaveSpec};

const COLUMNS: u32 = 20;
const ROWS: u32 = 15;
const CELL_SIZE: f32 = 32.0;

/// Builds the three-part campaign played on a 640x480 board.
#[must_use]
pub fn builtin_campaign() -> Campaign {
    Campaign::new(vec![meadow(), switchbacks(), serpent()])
}

fn meadow() -> LevelSpec {
    let mut map = MapSpec::open(
        COLUMNS,
        ROWS,
        CELL_SIZE,
        CellCoord::new(0, 7),
        CellCoord::new(COLUMNS - 1, 7),
    );
    map.name = String::from("Meadow");

    LevelSpec::new(
        map,
        vec![WaveSpec::new(CritterKind::Normal, 1, 10, 1.0)],
        150,
    )
}

fn switchbacks() -> LevelSpec {
    let mut map = MapSpec::open(
        COLUMNS,
        ROWS,
        CELL_SIZE,
        CellCoord::new(0, 0),
        CellCoord::new(COLUMNS - 1, ROWS - 1),
    );
    map.name = String::from("Switchbacks");
    map.walls = (0..12)
        .map(|row| CellCoord::new(6, row))
        .chain((3..ROWS).map(|row| CellCoord::new(13, row)))
        .collect();

    LevelSpec::new(
        map,
        vec![
            WaveSpec::new(CritterKind::Normal, 2, 10, 1.0),
            WaveSpec {
                delay: 5.0,
                ..WaveSpec::new(CritterKind::Fast, 1, 8, 0.75)
            },
        ],
        200,
    )
}

fn serpent() -> LevelSpec {
    let mut map = MapSpec::open(
        COLUMNS,
        ROWS,
        CELL_SIZE,
        CellCoord::new(0, 2),
        CellCoord::new(COLUMNS - 1, 12),
    );
    map.name = String::from("Serpent");
    map.path = Some(trace(&[
        CellCoord::new(0, 2),
        CellCoord::new(17, 2),
        CellCoord::new(17, 7),
        CellCoord::new(2, 7),
        CellCoord::new(2, 12),
        CellCoord::new(COLUMNS - 1, 12),
    ]));

    LevelSpec::new(
        map,
        vec![
            WaveSpec::new(CritterKind::Fast, 2, 12, 0.75),
            WaveSpec {
                delay: 4.0,
                ..WaveSpec::new(CritterKind::Tank, 1, 6, 2.0)
            },
        ],
        250,
    )
}

/// Expands axis-aligned corner cells into a contiguous route.
fn trace(corners: &[CellCoord]) -> Vec<CellCoord> {
    let mut route: Vec<CellCoord> = corners.first().copied().into_iter().collect();

    for pair in corners.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let mut column = from.column();
        let mut row = from.row();
        while (column, row) != (to.column(), to.row()) {
            column = step_toward(column, to.column());
            row = step_toward(row, to.row());
            route.push(CellCoord::new(column, row));
        }
    }

    route
}

fn step_toward(value: u32, target: u32) -> u32 {
    match value.cmp(&target) {
        std::cmp::Ordering::Less => value + 1,
        std::cmp::Ordering::Greater => value - 1,
        std::cmp::Ordering::Equal => value,
    }
}
