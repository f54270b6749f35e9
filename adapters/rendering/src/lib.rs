#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rendering collaborators for Critter Defence adapters.
//!
//! The simulation hands every visible entity to a [`RenderSink`] once per
//! frame. [`SceneRecorder`] collects those submissions into a [`Scene`] in
//! pixel space, and a [`RenderingBackend`] such as [`AsciiBackend`] presents
//! the recorded scene.

use std::{error::Error, fmt, io::Write};

use anyhow::{Context as _, Result as AnyResult};
use critter_defence_core::{
    CritterKind, PowerupKind, RenderItem, RenderSink, SpriteKey, StateKind, Terrain, TowerKind,
};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Layer a sprite is drawn on. Later layers cover earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Full screen backdrops and map tiles.
    Ground,
    /// Placed towers.
    Towers,
    /// Walking critters.
    Critters,
    /// Projectiles in flight.
    Projectiles,
    /// Dropped powerups, drawn above everything else.
    Pickups,
}

impl Layer {
    /// Layer used for the provided sprite.
    #[must_use]
    pub const fn of(sprite: SpriteKey) -> Self {
        match sprite {
            SpriteKey::Tile(_) | SpriteKey::Screen(_) => Self::Ground,
            SpriteKey::Tower(_) => Self::Towers,
            SpriteKey::Critter(_) => Self::Critters,
            SpriteKey::Projectile(_) => Self::Projectiles,
            SpriteKey::Powerup(_) => Self::Pickups,
        }
    }
}

/// Palette entry and glyph used to draw a sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteStyle {
    /// Fill color for graphical backends.
    pub color: Color,
    /// Character for text backends.
    pub glyph: char,
}

/// Looks up how a sprite should be drawn.
#[must_use]
pub fn sprite_style(sprite: SpriteKey) -> SpriteStyle {
    let (color, glyph) = match sprite {
        SpriteKey::Tile(Terrain::Open) => (Color::from_rgb_u8(46, 94, 52), '.'),
        SpriteKey::Tile(Terrain::Blocked) => (Color::from_rgb_u8(90, 90, 90), '#'),
        SpriteKey::Tile(Terrain::Path) => (Color::from_rgb_u8(150, 120, 80), ':'),
        SpriteKey::Tower(TowerKind::Standard) => (Color::from_rgb_u8(40, 90, 200), 'T'),
        SpriteKey::Tower(TowerKind::RapidFire) => (Color::from_rgb_u8(40, 180, 200), 'R'),
        SpriteKey::Tower(TowerKind::Cannon) => (Color::from_rgb_u8(120, 60, 160), 'C'),
        SpriteKey::Critter(CritterKind::Normal) => (Color::from_rgb_u8(200, 50, 50), 'n'),
        SpriteKey::Critter(CritterKind::Fast) => (Color::from_rgb_u8(230, 140, 30), 'f'),
        SpriteKey::Critter(CritterKind::Tank) => (Color::from_rgb_u8(120, 20, 20), 'K'),
        SpriteKey::Projectile(kind) => {
            let base = sprite_style(SpriteKey::Tower(kind)).color;
            (base.lighten(0.5), '*')
        }
        SpriteKey::Powerup(PowerupKind::Fire) => (Color::from_rgb_u8(250, 90, 20), 'F'),
        SpriteKey::Powerup(PowerupKind::Ice) => (Color::from_rgb_u8(150, 220, 250), 'I'),
        SpriteKey::Screen(_) => (Color::from_rgb_u8(0, 0, 0), ' '),
    };

    SpriteStyle { color, glyph }
}

/// One recorded sprite expressed in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSprite {
    /// Sprite submitted by the simulation.
    pub sprite: SpriteKey,
    /// Pixel-space centre of the sprite.
    pub position: Vec2,
}

impl From<RenderItem> for SceneSprite {
    fn from(item: RenderItem) -> Self {
        Self {
            sprite: item.sprite,
            position: Vec2::new(item.position.x, item.position.y),
        }
    }
}

/// Everything submitted during one frame, in submission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Recorded sprites.
    pub sprites: Vec<SceneSprite>,
}

impl Scene {
    /// Full screen backdrop shown instead of the map, if any.
    #[must_use]
    pub fn screen(&self) -> Option<StateKind> {
        self.sprites.iter().find_map(|sprite| match sprite.sprite {
            SpriteKey::Screen(kind) => Some(kind),
            _ => None,
        })
    }

    /// Sprites of the provided layer in submission order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &SceneSprite> {
        self.sprites
            .iter()
            .filter(move |sprite| Layer::of(sprite.sprite) == layer)
    }

    /// Smallest rectangle covering every recorded sprite centre.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = self.sprites.first()?.position;
        Some(
            self.sprites
                .iter()
                .fold((first, first), |(min, max), sprite| {
                    (min.min(sprite.position), max.max(sprite.position))
                }),
        )
    }
}

/// Render sink collecting one [`Scene`] per frame.
#[derive(Clone, Debug, Default)]
pub struct SceneRecorder {
    scene: Scene,
}

impl SceneRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene recorded since the last call to [`SceneRecorder::finish`].
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Hands out the recorded scene and starts a fresh one.
    pub fn finish(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }
}

impl RenderSink for SceneRecorder {
    fn render(&mut self, item: RenderItem) {
        self.scene.sprites.push(SceneSprite::from(item));
    }
}

/// Backend capable of presenting recorded scenes.
pub trait RenderingBackend {
    /// Presents one frame.
    fn present(&mut self, frame: u64, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The character grid needs at least one column and one row.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cells must have a positive pixel size.
    InvalidCellSize {
        /// Provided cell size that failed validation.
        cell_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must not be empty (received {columns}x{rows})")
            }
            Self::InvalidCellSize { cell_size } => {
                write!(f, "cell_size must be positive (received {cell_size})")
            }
        }
    }
}

impl Error for RenderingError {}

/// Character grid mapping pixel positions onto map cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AsciiGrid {
    /// Number of character columns.
    pub columns: u32,
    /// Number of character rows.
    pub rows: u32,
    /// Pixel edge length of one cell.
    pub cell_size: f32,
}

impl AsciiGrid {
    /// Creates a grid, rejecting empty dimensions and non-positive cell sizes.
    pub fn new(columns: u32, rows: u32, cell_size: f32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if cell_size.is_nan() || cell_size <= 0.0 {
            return Err(RenderingError::InvalidCellSize { cell_size });
        }

        Ok(Self {
            columns,
            rows,
            cell_size,
        })
    }

    /// Cell containing the provided pixel position, if inside the grid.
    #[must_use]
    pub fn cell_of(&self, position: Vec2) -> Option<(usize, usize)> {
        let scaled = (position / self.cell_size).floor();
        if scaled.x < 0.0 || scaled.y < 0.0 {
            return None;
        }
        let (column, row) = (scaled.x as usize, scaled.y as usize);
        (column < self.columns as usize && row < self.rows as usize).then_some((column, row))
    }

    /// Draws the scene as text, one line per row.
    ///
    /// Sprites are drawn layer by layer so critters and projectiles stay
    /// visible on top of towers and tiles. Screens draw as a caption.
    #[must_use]
    pub fn draw(&self, scene: &Scene) -> String {
        if let Some(screen) = scene.screen() {
            return format!("[{screen:?}]\n");
        }

        let mut canvas = vec![vec![' '; self.columns as usize]; self.rows as usize];
        for layer in [
            Layer::Ground,
            Layer::Towers,
            Layer::Critters,
            Layer::Projectiles,
            Layer::Pickups,
        ] {
            for sprite in scene.layer(layer) {
                if let Some((column, row)) = self.cell_of(sprite.position) {
                    canvas[row][column] = sprite_style(sprite.sprite).glyph;
                }
            }
        }

        let mut text = String::with_capacity(canvas.len() * (self.columns as usize + 1));
        for line in canvas {
            text.extend(line);
            text.push('\n');
        }
        text
    }
}

/// Backend writing ASCII frames to any writer.
#[derive(Debug)]
pub struct AsciiBackend<W> {
    grid: AsciiGrid,
    writer: W,
}

impl<W: Write> AsciiBackend<W> {
    /// Creates a backend drawing onto `grid` and writing to `writer`.
    pub fn new(grid: AsciiGrid, writer: W) -> Self {
        Self { grid, writer }
    }

    /// Replaces the grid, e.g. when a part with another map starts.
    pub fn set_grid(&mut self, grid: AsciiGrid) {
        self.grid = grid;
    }

    /// Consumes the backend, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for AsciiBackend<W> {
    fn present(&mut self, frame: u64, scene: &Scene) -> AnyResult<()> {
        let text = self.grid.draw(scene);
        writeln!(self.writer, "frame {frame}")
            .and_then(|()| self.writer.write_all(text.as_bytes()))
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("failed to write frame {frame}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_defence_core::Vector2D;

    fn item(sprite: SpriteKey, x: f32, y: f32) -> RenderItem {
        RenderItem::new(sprite, Vector2D::new(x, y))
    }

    #[test]
    fn grid_rejects_zero_dimensions_without_panicking() {
        let error = AsciiGrid::new(0, 4, 32.0).expect_err("empty grid must be rejected");

        assert_eq!(error, RenderingError::EmptyGrid { columns: 0, rows: 4 });
    }

    #[test]
    fn grid_rejects_non_positive_cell_size() {
        assert!(matches!(
            AsciiGrid::new(3, 3, 0.0),
            Err(RenderingError::InvalidCellSize { .. })
        ));
        assert!(AsciiGrid::new(3, 3, f32::NAN).is_err());
    }

    #[test]
    fn recorder_hands_out_one_scene_per_frame() {
        let mut recorder = SceneRecorder::new();
        recorder.render(item(SpriteKey::Tile(Terrain::Open), 16.0, 16.0));
        recorder.render(item(SpriteKey::Critter(CritterKind::Fast), 20.0, 18.0));

        let scene = recorder.finish();

        assert_eq!(scene.sprites.len(), 2);
        assert_eq!(scene.sprites[1].position, Vec2::new(20.0, 18.0));
        assert!(recorder.scene().sprites.is_empty());
    }

    #[test]
    fn critters_are_drawn_over_towers_and_tiles() {
        let grid = AsciiGrid::new(3, 1, 10.0).expect("valid grid");
        let mut recorder = SceneRecorder::new();
        recorder.render(item(SpriteKey::Tile(Terrain::Path), 5.0, 5.0));
        recorder.render(item(SpriteKey::Tile(Terrain::Open), 15.0, 5.0));
        recorder.render(item(SpriteKey::Tile(Terrain::Blocked), 25.0, 5.0));
        recorder.render(item(SpriteKey::Critter(CritterKind::Tank), 4.0, 4.0));
        recorder.render(item(SpriteKey::Tower(TowerKind::Cannon), 15.0, 5.0));
        recorder.render(item(SpriteKey::Projectile(TowerKind::Cannon), 99.0, 5.0));

        assert_eq!(grid.draw(&recorder.finish()), "KC#\n");
    }

    #[test]
    fn screens_draw_as_a_caption() {
        let grid = AsciiGrid::new(3, 1, 10.0).expect("valid grid");
        let mut recorder = SceneRecorder::new();
        recorder.render(item(SpriteKey::Screen(StateKind::Title), 320.0, 240.0));

        assert_eq!(grid.draw(recorder.scene()), "[Title]\n");
    }

    #[test]
    fn bounds_cover_every_sprite() {
        let mut recorder = SceneRecorder::new();
        recorder.render(item(SpriteKey::Tile(Terrain::Open), 16.0, 48.0));
        recorder.render(item(SpriteKey::Tile(Terrain::Open), 80.0, 16.0));

        assert_eq!(
            recorder.scene().bounds(),
            Some((Vec2::new(16.0, 16.0), Vec2::new(80.0, 48.0)))
        );
        assert_eq!(Scene::default().bounds(), None);
    }

    #[test]
    fn projectiles_use_a_lighter_tower_color() {
        let tower = sprite_style(SpriteKey::Tower(TowerKind::Standard));
        let projectile = sprite_style(SpriteKey::Projectile(TowerKind::Standard));

        assert!(projectile.color.blue > tower.color.blue);
        assert_eq!(projectile.glyph, '*');
    }

    #[test]
    fn powerups_sit_on_top_with_their_own_glyphs() {
        assert_eq!(Layer::of(SpriteKey::Powerup(PowerupKind::Ice)), Layer::Pickups);
        assert!(Layer::Pickups > Layer::Projectiles);
        assert_eq!(sprite_style(SpriteKey::Powerup(PowerupKind::Fire)).glyph, 'F');
        assert_eq!(sprite_style(SpriteKey::Powerup(PowerupKind::Ice)).glyph, 'I');
    }

    #[test]
    fn ascii_backend_writes_a_frame_header() {
        let grid = AsciiGrid::new(1, 1, 10.0).expect("valid grid");
        let mut backend = AsciiBackend::new(grid, Vec::new());
        let mut recorder = SceneRecorder::new();
        recorder.render(item(SpriteKey::Tile(Terrain::Open), 5.0, 5.0));

        backend
            .present(7, recorder.scene())
            .expect("writing to memory succeeds");

        let written = String::from_utf8(backend.into_inner()).expect("utf-8 output");
        assert_eq!(written, "frame 7\n.\n");
    }
}
