#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Critter Defence engine.
//!
//! This crate defines the vocabulary that connects adapters, the per-part
//! simulation world, the pure systems and the session state machine. Input
//! collaborators submit [`Command`] values, the active state executes them and
//! reports what happened through [`Event`] values. Systems read immutable
//! snapshots such as [`CritterView`] and never hold references into the
//! simulation. Rendering collaborators receive [`RenderItem`] values through
//! the [`RenderSink`] trait.

mod content;
mod errors;
mod vector;

use serde::{Deserialize, Serialize};

pub use content::{
    Campaign, CritterStats, LevelSpec, MapSpec, TowerCatalog, TowerStats, TowerUpgrade, WaveSpec,
    POWERUP_DROP_CHANCE, REFUND_PER_UPGRADE, REFUND_RATIO, UPGRADE_BASE_COST,
    UPGRADE_COST_PER_LEVEL,
};
pub use errors::{Endpoint, LoadError, OutOfBounds};
pub use vector::Vector2D;

/// Canonical banner shown on the title screen.
pub const WELCOME_BANNER: &str = "Welcome to Critter Defence.";

/// Commands delivered by the input collaborator to the active game state.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Confirms the current screen and moves the session forward.
    Advance,
    /// Abandons the current screen and returns to the title.
    Back,
    /// Requests that the session end.
    Quit,
    /// Requests placement of a tower centred on the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// Requests that a tower be sold for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests that a tower be upgraded to its next level.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Changes how a tower chooses between critters in range.
    SetTargeting {
        /// Identifier of the tower to reconfigure.
        tower: TowerId,
        /// Policy the tower should apply from now on.
        policy: TargetingPolicy,
    },
    /// Installs a dropped powerup on a tower, replacing any earlier one.
    ApplyPowerup {
        /// Identifier of the dropped powerup.
        powerup: PowerupId,
        /// Identifier of the tower receiving it.
        tower: TowerId,
    },
    /// Freezes or resumes the simulation of the current part.
    Pause,
}

/// Events reported by the simulation after processing a frame or a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A critter entered the map at the first waypoint.
    CritterSpawned {
        /// Identifier assigned to the critter.
        critter: CritterId,
        /// Kind of the spawned critter.
        kind: CritterKind,
    },
    /// A critter ran out of health.
    CritterKilled {
        /// Identifier of the killed critter.
        critter: CritterId,
        /// Gold awarded for the kill.
        reward: u32,
        /// Where the critter died.
        position: Vector2D,
    },
    /// A critter reached the final waypoint alive.
    CritterLeaked {
        /// Identifier of the leaked critter.
        critter: CritterId,
        /// Gold stolen by the critter.
        strength: u32,
    },
    /// A tower launched a projectile.
    ProjectileFired {
        /// Tower that fired.
        tower: TowerId,
        /// Identifier of the new projectile.
        projectile: ProjectileId,
        /// Critter the projectile was aimed at.
        target: CritterId,
    },
    /// A projectile connected with its target.
    ProjectileHit {
        /// Projectile that connected.
        projectile: ProjectileId,
        /// Critter that received the damage.
        critter: CritterId,
        /// Damage applied.
        damage: f32,
    },
    /// A projectile vanished without dealing damage.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: ProjectileId,
    },
    /// A tower was constructed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of tower constructed.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// A placement request was refused without mutating the world.
    TowerPlacementRejected {
        /// Type of tower requested.
        kind: TowerKind,
        /// Cell provided in the request.
        cell: CellCoord,
        /// Reason the request failed.
        reason: PlacementError,
    },
    /// A tower was sold and removed.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Gold returned to the player.
        refund: u32,
    },
    /// A tower reached a new level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level the tower now has.
        level: u32,
    },
    /// A tower changed its targeting policy.
    TargetingChanged {
        /// Identifier of the reconfigured tower.
        tower: TowerId,
        /// Policy now in effect.
        policy: TargetingPolicy,
    },
    /// A sell, upgrade or targeting request was refused.
    TowerCommandRejected {
        /// Identifier provided in the request.
        tower: TowerId,
        /// Reason the request failed.
        reason: TowerCommandError,
    },
    /// A killed critter left a powerup behind.
    PowerupDropped {
        /// Identifier assigned to the powerup.
        powerup: PowerupId,
        /// Kind of the powerup.
        kind: PowerupKind,
        /// Where the powerup lies.
        position: Vector2D,
    },
    /// A powerup was installed on a tower.
    PowerupApplied {
        /// Powerup that was consumed.
        powerup: PowerupId,
        /// Tower that received it.
        tower: TowerId,
        /// Modifier now carried by the tower.
        modifier: TowerModifier,
    },
    /// The simulation of the current part was frozen or resumed.
    PauseToggled {
        /// Whether the part is now paused.
        paused: bool,
    },
    /// Every wave of the part was spawned and resolved.
    PartCompleted {
        /// Part that finished.
        part: PartId,
    },
    /// The session moved to another game state.
    StateChanged {
        /// State that was left.
        from: StateKind,
        /// State that became active.
        to: StateKind,
    },
}

/// Unique identifier assigned to a critter when it spawns.
///
/// Identifiers grow monotonically within a part, so a lower identifier always
/// belongs to a critter that spawned earlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CritterId(u32);

impl CritterId {
    /// Creates a new critter identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a dropped powerup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PowerupId(u32);

impl PowerupId {
    /// Creates a new powerup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the powerup identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(alias = "x")]
    column: u32,
    #[serde(alias = "y")]
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Surface type of a map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Buildable ground that critters never cross.
    Open,
    /// Wall that can neither be walked nor built on.
    Blocked,
    /// Cell belonging to the critter route.
    Path,
}

/// Types of critters that can walk the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CritterKind {
    /// Slime with average speed and health.
    Normal,
    /// Bee that trades health for speed.
    Fast,
    /// Ogre that is slow and very durable.
    Tank,
}

impl CritterKind {
    /// Returns the statistics of a critter of this kind at the provided level.
    #[must_use]
    pub fn stats(self, level: u32) -> CritterStats {
        let level_f = level as f32;
        match self {
            Self::Normal => CritterStats {
                max_health: 20.0 + level_f * 2.0,
                speed: 50.0,
                reward: level * 10,
                strength: level * 2,
            },
            Self::Fast => CritterStats {
                max_health: 10.0 + level_f,
                speed: 75.0 + level_f * 5.0,
                reward: level * 10,
                strength: level * 2,
            },
            Self::Tank => CritterStats {
                max_health: 60.0 + level_f * 15.0,
                speed: 35.0 + level_f * 2.0,
                reward: 15 + level * 5,
                strength: level * 3,
            },
        }
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Balanced tower.
    Standard,
    /// Fast firing, short ranged tower.
    RapidFire,
    /// Slow firing, long ranged tower with heavy shells.
    Cannon,
}

impl TowerKind {
    /// Every tower kind in catalog order.
    pub const ALL: [TowerKind; 3] = [Self::Standard, Self::RapidFire, Self::Cannon];
}

/// Powerups dropped by killed critters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    /// Sets struck critters on fire.
    Fire,
    /// Slows struck critters down.
    Ice,
}

impl PowerupKind {
    /// Modifier a tower gains from this powerup.
    #[must_use]
    pub const fn modifier(self) -> TowerModifier {
        match self {
            Self::Fire => TowerModifier::Burning,
            Self::Ice => TowerModifier::Slowing,
        }
    }
}

/// Extra effect a tower's projectiles leave on the critters they wound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerModifier {
    /// Struck critters burn for a short while.
    Burning,
    /// Struck critters walk at reduced speed for a while.
    Slowing,
}

/// Rule a tower applies when choosing between critters in range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingPolicy {
    /// Closest critter to the tower.
    #[default]
    Nearest,
    /// Critter with the most remaining health.
    Strongest,
    /// Critter with the least remaining health.
    Weakest,
    /// Critter that travelled furthest along the path.
    NearExit,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is a wall or part of the critter route.
    NotBuildable,
    /// Another tower already stands on the cell.
    Occupied,
    /// The player cannot afford the tower.
    InsufficientGold {
        /// Price of the tower.
        cost: u32,
        /// Gold the player holds.
        available: u32,
    },
}

/// Reasons a sell, upgrade or targeting request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerCommandError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// No dropped powerup with the provided identifier exists.
    MissingPowerup,
    /// The tower already reached its highest level.
    MaxLevel,
    /// The player cannot afford the upgrade.
    InsufficientGold {
        /// Price of the upgrade.
        cost: u32,
        /// Gold the player holds.
        available: u32,
    },
}

/// Gameplay sub-phase hosted by the main game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartId {
    /// First gameplay part.
    Part1,
    /// Second gameplay part.
    Part2,
    /// Third and final gameplay part.
    Part3,
}

impl PartId {
    /// Zero-based position of the part within the campaign.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Part1 => 0,
            Self::Part2 => 1,
            Self::Part3 => 2,
        }
    }

    /// Part that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Part1 => Some(Self::Part2),
            Self::Part2 => Some(Self::Part3),
            Self::Part3 => None,
        }
    }
}

/// Lightweight tag naming a game state without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    /// Title screen.
    Title,
    /// Introductory screen.
    Intro,
    /// Gameplay in one of the parts.
    MainGame(PartId),
    /// Terminal exit screen.
    Exit,
}

/// Immutable representation of a single critter used for targeting and queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CritterSnapshot {
    /// Identifier assigned to the critter.
    pub id: CritterId,
    /// Kind of the critter.
    pub kind: CritterKind,
    /// Pixel-space position.
    pub position: Vector2D,
    /// Remaining health.
    pub health: f32,
    /// Health the critter spawned with.
    pub max_health: f32,
    /// Index of the waypoint the critter last passed.
    pub path_index: usize,
    /// Fraction of the current segment already walked.
    pub progress: f32,
    /// Total distance walked since spawning.
    pub distance_travelled: f32,
}

/// Read-only snapshot describing every live critter of a part.
#[derive(Clone, Debug, Default)]
pub struct CritterView {
    snapshots: Vec<CritterSnapshot>,
}

impl CritterView {
    /// Creates a new critter view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CritterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured critter snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CritterSnapshot> {
        self.snapshots.iter()
    }

    /// Resolves a critter by identifier, returning `None` once it is gone.
    #[must_use]
    pub fn get(&self, id: CritterId) -> Option<&CritterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of critters captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no critters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CritterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower.
    pub id: TowerId,
    /// Kind of tower constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Pixel-space centre of the tower.
    pub position: Vector2D,
    /// Current upgrade level, starting at one.
    pub level: u32,
    /// Targeting radius in pixels.
    pub range: f32,
    /// Policy used to choose targets.
    pub policy: TargetingPolicy,
    /// Critter the tower is currently tracking.
    pub target: Option<CritterId>,
    /// Powerup effect installed on the tower.
    pub modifier: Option<TowerModifier>,
}

/// Read-only snapshot describing every tower of a part.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Logical sprite identifier handed to the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Map tile of the given terrain.
    Tile(Terrain),
    /// Walking critter.
    Critter(CritterKind),
    /// Placed tower.
    Tower(TowerKind),
    /// Projectile fired by the given tower kind.
    Projectile(TowerKind),
    /// Dropped powerup waiting to be installed.
    Powerup(PowerupKind),
    /// Full screen backdrop of a non-gameplay state.
    Screen(StateKind),
}

/// One visible entity submitted to the renderer for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItem {
    /// Sprite to draw.
    pub sprite: SpriteKey,
    /// Pixel-space centre of the entity.
    pub position: Vector2D,
}

impl RenderItem {
    /// Creates a new render item.
    #[must_use]
    pub const fn new(sprite: SpriteKey, position: Vector2D) -> Self {
        Self { sprite, position }
    }
}

/// Rendering collaborator receiving every visible entity once per frame.
pub trait RenderSink {
    /// Draws the provided entity.
    fn render(&mut self, item: RenderItem);
}

impl RenderSink for Vec<RenderItem> {
    fn render(&mut self, item: RenderItem) {
        self.push(item);
    }
}
