//! Immutable level content consumed when a gameplay part is entered.
//!
//! Levels describe a grid map, the waves of critters that walk it, the tower
//! catalog available to the player and the gold the player starts with. A
//! [`Campaign`] bundles the three levels played in sequence.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, CritterKind, LoadError, PartId, TowerKind};

/// Fraction of the purchase price returned when a tower is sold.
pub const REFUND_RATIO: f32 = 0.5;
/// Extra gold returned on sale for every upgrade level above the first.
pub const REFUND_PER_UPGRADE: u32 = 50;
/// Base price of upgrading a tower.
pub const UPGRADE_BASE_COST: u32 = 100;
/// Additional upgrade price for every level the tower already has.
pub const UPGRADE_COST_PER_LEVEL: u32 = 50;
/// Chance that a killed critter leaves a powerup behind.
pub const POWERUP_DROP_CHANCE: f64 = 0.02;

const DEFAULT_CELL_SIZE: f32 = 32.0;
const DEFAULT_SPAWN_INTERVAL: f32 = 1.0;
const DEFAULT_STARTING_GOLD: u32 = 150;
const DEFAULT_PROJECTILE_LIFETIME: f32 = 2.0;
const DEFAULT_HIT_RADIUS: f32 = 8.0;

fn default_cell_size() -> f32 {
    DEFAULT_CELL_SIZE
}

fn default_spawn_interval() -> f32 {
    DEFAULT_SPAWN_INTERVAL
}

fn default_level() -> u32 {
    1
}

fn default_starting_gold() -> u32 {
    DEFAULT_STARTING_GOLD
}

fn default_powerup_drop_chance() -> f64 {
    POWERUP_DROP_CHANCE
}

/// Grid layout of a level.
///
/// The field names also accept the JSON written by the map editor
/// (`x`/`y` cell coordinates and no cell size).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    /// Human readable map name.
    #[serde(default)]
    pub name: String,
    /// Number of columns in the grid.
    #[serde(alias = "columns")]
    pub width: u32,
    /// Number of rows in the grid.
    #[serde(alias = "rows")]
    pub height: u32,
    /// Edge length of one square cell in pixels.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Cell where critters enter the map.
    #[serde(default, alias = "entry")]
    pub start: Option<CellCoord>,
    /// Cell where critters leave the map.
    #[serde(default, alias = "exit")]
    pub end: Option<CellCoord>,
    /// Cells that can neither be walked nor built on.
    #[serde(default)]
    pub walls: Vec<CellCoord>,
    /// Explicit route from entry to exit. Derived from the grid when absent.
    #[serde(default)]
    pub path: Option<Vec<CellCoord>>,
}

impl MapSpec {
    /// Creates an open map without walls whose route is derived at load.
    #[must_use]
    pub fn open(width: u32, height: u32, cell_size: f32, start: CellCoord, end: CellCoord) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            cell_size,
            start: Some(start),
            end: Some(end),
            walls: Vec::new(),
            path: None,
        }
    }

    /// Parses a map stored in the JSON map format.
    pub fn from_json_str(source: &str) -> Result<Self, LoadError> {
        serde_json::from_str(source).map_err(|error| LoadError::Parse(error.to_string()))
    }
}

/// Combat statistics of a single critter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CritterStats {
    /// Health a freshly spawned critter starts with.
    pub max_health: f32,
    /// Travel speed in pixels per second.
    pub speed: f32,
    /// Gold awarded when the critter is killed.
    pub reward: u32,
    /// Gold stolen when the critter leaks through the exit.
    pub strength: u32,
}

/// One scheduled batch of identical critters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Kind of critter spawned by the wave.
    pub kind: CritterKind,
    /// Difficulty level used to scale the critter statistics.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Number of critters the wave spawns.
    pub count: u32,
    /// Seconds between two consecutive spawns.
    #[serde(default = "default_spawn_interval")]
    pub interval: f32,
    /// Seconds before the first spawn.
    #[serde(default)]
    pub delay: f32,
    /// Explicit statistics replacing the level-scaled defaults.
    #[serde(default)]
    pub stats: Option<CritterStats>,
}

impl WaveSpec {
    /// Creates a wave spawning `count` critters of `kind` at `level`.
    #[must_use]
    pub fn new(kind: CritterKind, level: u32, count: u32, interval: f32) -> Self {
        Self {
            kind,
            level,
            count,
            interval,
            delay: 0.0,
            stats: None,
        }
    }

    /// Statistics applied to every critter of the wave.
    #[must_use]
    pub fn critter_stats(&self) -> CritterStats {
        self.stats.unwrap_or_else(|| self.kind.stats(self.level))
    }
}

/// Per-level increments applied when a tower is upgraded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TowerUpgrade {
    /// Range gained per upgrade, in pixels.
    #[serde(default)]
    pub range: f32,
    /// Damage gained per upgrade.
    #[serde(default)]
    pub damage: f32,
    /// Shots per second gained per upgrade.
    #[serde(default)]
    pub fire_rate: f32,
}

/// Combat and economy statistics of one tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Targeting radius in pixels.
    pub range: f32,
    /// Damage delivered by each projectile.
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Projectile travel speed in pixels per second.
    pub projectile_speed: f32,
    /// Seconds a projectile may fly before it expires.
    #[serde(default = "TowerStats::default_projectile_lifetime")]
    pub projectile_lifetime: f32,
    /// Distance from the target at which a projectile connects.
    #[serde(default = "TowerStats::default_hit_radius")]
    pub hit_radius: f32,
    /// Purchase price in gold.
    pub cost: u32,
    /// Highest level reachable through upgrades.
    pub max_level: u32,
    /// Increments applied by each upgrade.
    #[serde(default)]
    pub upgrade: TowerUpgrade,
}

impl TowerStats {
    fn default_projectile_lifetime() -> f32 {
        DEFAULT_PROJECTILE_LIFETIME
    }

    fn default_hit_radius() -> f32 {
        DEFAULT_HIT_RADIUS
    }

    /// Balanced tower with moderate range and damage.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            range: 100.0,
            damage: 3.0,
            fire_rate: 4.0,
            projectile_speed: 600.0,
            projectile_lifetime: DEFAULT_PROJECTILE_LIFETIME,
            hit_radius: DEFAULT_HIT_RADIUS,
            cost: 25,
            max_level: 5,
            upgrade: TowerUpgrade {
                range: 20.0,
                damage: 1.0,
                fire_rate: 1.0,
            },
        }
    }

    /// Short ranged tower firing many weak shots.
    #[must_use]
    pub const fn rapid_fire() -> Self {
        Self {
            range: 75.0,
            damage: 1.0,
            fire_rate: 10.0,
            projectile_speed: 300.0,
            projectile_lifetime: DEFAULT_PROJECTILE_LIFETIME,
            hit_radius: DEFAULT_HIT_RADIUS,
            cost: 50,
            max_level: 3,
            upgrade: TowerUpgrade {
                range: 10.0,
                damage: 0.0,
                fire_rate: 3.0,
            },
        }
    }

    /// Long ranged tower firing slow heavy shells.
    #[must_use]
    pub const fn cannon() -> Self {
        Self {
            range: 125.0,
            damage: 10.0,
            fire_rate: 1.0,
            projectile_speed: 180.0,
            projectile_lifetime: DEFAULT_PROJECTILE_LIFETIME,
            hit_radius: DEFAULT_HIT_RADIUS,
            cost: 100,
            max_level: 3,
            upgrade: TowerUpgrade {
                range: 50.0,
                damage: 5.0,
                fire_rate: 1.0,
            },
        }
    }

    /// Statistics after `level - 1` upgrades have been applied.
    #[must_use]
    pub fn at_level(&self, level: u32) -> Self {
        let steps = level.saturating_sub(1) as f32;
        Self {
            range: self.range + self.upgrade.range * steps,
            damage: self.damage + self.upgrade.damage * steps,
            fire_rate: self.fire_rate + self.upgrade.fire_rate * steps,
            ..*self
        }
    }

    /// Price of upgrading a tower currently at `level`.
    #[must_use]
    pub const fn upgrade_cost(level: u32) -> u32 {
        UPGRADE_BASE_COST + level * UPGRADE_COST_PER_LEVEL
    }

    /// Gold returned when selling a tower of this kind at `level`.
    #[must_use]
    pub fn refund(&self, level: u32) -> u32 {
        let base = (self.cost as f32 * REFUND_RATIO) as u32;
        base + level.saturating_sub(1) * REFUND_PER_UPGRADE
    }
}

/// Statistics for every tower kind available in a level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerCatalog {
    /// Statistics of [`TowerKind::Standard`].
    #[serde(default = "TowerStats::standard")]
    pub standard: TowerStats,
    /// Statistics of [`TowerKind::RapidFire`].
    #[serde(default = "TowerStats::rapid_fire")]
    pub rapid_fire: TowerStats,
    /// Statistics of [`TowerKind::Cannon`].
    #[serde(default = "TowerStats::cannon")]
    pub cannon: TowerStats,
}

impl TowerCatalog {
    /// Looks up the statistics of the provided tower kind.
    #[must_use]
    pub const fn stats(&self, kind: TowerKind) -> &TowerStats {
        match kind {
            TowerKind::Standard => &self.standard,
            TowerKind::RapidFire => &self.rapid_fire,
            TowerKind::Cannon => &self.cannon,
        }
    }
}

impl Default for TowerCatalog {
    fn default() -> Self {
        Self {
            standard: TowerStats::standard(),
            rapid_fire: TowerStats::rapid_fire(),
            cannon: TowerStats::cannon(),
        }
    }
}

/// Everything required to play one gameplay part.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Grid layout walked by the critters.
    pub map: MapSpec,
    /// Waves spawned concurrently during the part.
    #[serde(default)]
    pub waves: Vec<WaveSpec>,
    /// Tower statistics available for purchase.
    #[serde(default)]
    pub towers: TowerCatalog,
    /// Gold available when the part begins.
    #[serde(default = "default_starting_gold")]
    pub starting_gold: u32,
    /// Chance in `[0, 1]` that a kill drops a powerup.
    #[serde(default = "default_powerup_drop_chance")]
    pub powerup_drop_chance: f64,
}

impl LevelSpec {
    /// Creates a level with the default tower catalog.
    #[must_use]
    pub fn new(map: MapSpec, waves: Vec<WaveSpec>, starting_gold: u32) -> Self {
        Self {
            map,
            waves,
            towers: TowerCatalog::default(),
            starting_gold,
            powerup_drop_chance: POWERUP_DROP_CHANCE,
        }
    }
}

/// The three levels played in sequence during a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Levels ordered from the first part to the last.
    pub parts: Vec<LevelSpec>,
}

impl Campaign {
    /// Creates a campaign from levels ordered by part.
    #[must_use]
    pub fn new(parts: Vec<LevelSpec>) -> Self {
        Self { parts }
    }

    /// Parses a campaign stored as TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, LoadError> {
        toml::from_str(source).map_err(|error| LoadError::Parse(error.to_string()))
    }

    /// Level played during the provided part.
    pub fn level(&self, part: PartId) -> Result<&LevelSpec, LoadError> {
        self.parts
            .get(part.index())
            .ok_or(LoadError::MissingPart(part))
    }
}
