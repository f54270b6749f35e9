#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation state for a single gameplay part of Critter Defence.
//!
//! A [`World`] owns the map, the critter groups and the placed towers of one
//! part. [`World::update`] advances everything by one frame in a fixed order:
//! spawning and movement first, then tower targeting and firing against the
//! post-move critter set, then projectile travel and damage, and finally a
//! sweep of dead critters. Kills roll for a powerup drop at the end of the
//! frame. Player input arrives through [`apply`].

mod critters;
mod effects;
mod map;
mod navigation;
mod powerups;
mod projectiles;
mod towers;

use critter_defence_core::{
    CellCoord, Command, CritterView, Event, LevelSpec, LoadError, PlacementError, PowerupId,
    RenderItem, RenderSink, SpriteKey, TowerCatalog, TowerCommandError, TowerId, TowerKind,
    TowerModifier, Vector2D,
};
use log::{debug, warn};

pub use critters::{Critter, CritterGroup, CritterIds, CritterStatus, DamageOutcome};
pub use effects::{
    StatusEffects, BURN_DAMAGE_PER_SECOND, BURN_DURATION, SLOW_DURATION, SLOW_FACTOR,
};
pub use map::{Cell, Map, MAX_MAP_CELLS};
pub use powerups::Powerup;
pub use projectiles::{CritterProjectile, ProjectileIds, ProjectileState};
pub use towers::CritterTower;

use powerups::PowerupStash;
use towers::TowerRegistry;

/// Represents the simulation state of one gameplay part.
#[derive(Debug)]
pub struct World {
    map: Map,
    catalog: TowerCatalog,
    groups: Vec<CritterGroup>,
    towers: TowerRegistry,
    critter_ids: CritterIds,
    projectile_ids: ProjectileIds,
    powerups: PowerupStash,
    gold: u32,
    elapsed: f32,
}

impl World {
    /// Builds the world for a level, failing when its map is unusable.
    ///
    /// Powerup drops use a fixed seed. See [`World::with_seed`].
    pub fn new(level: &LevelSpec) -> Result<Self, LoadError> {
        Self::with_seed(level, 0)
    }

    /// Builds the world for a level with powerup drops seeded by `seed`.
    pub fn with_seed(level: &LevelSpec, seed: u64) -> Result<Self, LoadError> {
        let map = Map::load(&level.map)?;
        debug!(
            "loaded map '{}' with {} waypoints and {} waves",
            map.name(),
            map.waypoints().len(),
            level.waves.len()
        );

        Ok(Self {
            map,
            catalog: level.towers,
            groups: level.waves.iter().map(CritterGroup::new).collect(),
            towers: TowerRegistry::new(),
            critter_ids: CritterIds::new(),
            projectile_ids: ProjectileIds::new(),
            powerups: PowerupStash::new(seed, level.powerup_drop_chance),
            gold: level.starting_gold,
            elapsed: 0.0,
        })
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Non-positive `dt` leaves every position, health and timer unchanged.
    pub fn update(&mut self, dt: f32, out: &mut Vec<Event>) {
        if dt <= 0.0 {
            return;
        }

        let first_event = out.len();
        self.elapsed += dt;

        for group in &mut self.groups {
            group.tick(dt, &self.map, &mut self.critter_ids, out);
            group.update(dt, &self.map, out);
        }

        let critters = self.critter_view();
        for tower in self.towers.iter_mut() {
            tower.update(dt, &critters, &mut self.projectile_ids, out);
        }

        for tower in self.towers.iter_mut() {
            tower.update_projectiles(dt, &mut self.groups, out);
        }

        for group in &mut self.groups {
            group.sweep();
        }

        self.settle_gold(&out[first_event..]);
        self.drop_powerups(first_event, out);
    }

    /// Reports whether every group spawned all critters and none is alive.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.groups.iter().all(CritterGroup::is_exhausted)
    }

    /// Submits every map tile, tower, critter, projectile and dropped powerup
    /// to `sink`.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        for cell in self.map.cells() {
            if let Ok(center) = self.map.cell_center(cell.coord()) {
                sink.render(RenderItem::new(SpriteKey::Tile(cell.terrain()), center));
            }
        }

        for tower in self.towers.iter() {
            sink.render(RenderItem::new(
                SpriteKey::Tower(tower.kind()),
                tower.position(),
            ));
        }

        for critter in self.groups.iter().flat_map(CritterGroup::live_critters) {
            sink.render(RenderItem::new(
                SpriteKey::Critter(critter.kind()),
                critter.position(),
            ));
        }

        for projectile in self.towers.iter().flat_map(|tower| tower.projectiles()) {
            sink.render(RenderItem::new(
                SpriteKey::Projectile(projectile.kind()),
                projectile.position(),
            ));
        }

        for powerup in self.powerups.iter() {
            sink.render(RenderItem::new(
                SpriteKey::Powerup(powerup.kind()),
                powerup.position(),
            ));
        }
    }

    fn critter_view(&self) -> CritterView {
        CritterView::from_snapshots(
            self.groups
                .iter()
                .flat_map(CritterGroup::live_critters)
                .map(Critter::snapshot)
                .collect(),
        )
    }

    fn settle_gold(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CritterKilled { reward, .. } => {
                    self.gold = self.gold.saturating_add(*reward);
                }
                Event::CritterLeaked { strength, .. } => {
                    self.gold = self.gold.saturating_sub(*strength);
                }
                _ => {}
            }
        }
    }

    fn drop_powerups(&mut self, first_event: usize, out: &mut Vec<Event>) {
        let kills: Vec<Vector2D> = out[first_event..]
            .iter()
            .filter_map(|event| match event {
                Event::CritterKilled { position, .. } => Some(*position),
                _ => None,
            })
            .collect();

        for position in kills {
            if let Some(powerup) = self.powerups.roll(position) {
                out.push(Event::PowerupDropped {
                    powerup: powerup.id(),
                    kind: powerup.kind(),
                    position,
                });
            }
        }
    }

    fn apply_powerup(
        &mut self,
        powerup: PowerupId,
        tower: TowerId,
    ) -> Result<TowerModifier, TowerCommandError> {
        let entry = self
            .towers
            .get_mut(tower)
            .ok_or(TowerCommandError::MissingTower)?;
        let kind = self
            .powerups
            .take(powerup)
            .map(|dropped| dropped.kind())
            .ok_or(TowerCommandError::MissingPowerup)?;

        let modifier = kind.modifier();
        if let Some(replaced) = entry.set_modifier(modifier) {
            debug!("tower {} swapped {replaced:?} for {modifier:?}", tower.get());
        }
        Ok(modifier)
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord) -> Result<TowerId, PlacementError> {
        let position = self
            .map
            .cell_center(cell)
            .map_err(|_| PlacementError::OutOfBounds)?;
        if !self.map.is_buildable(cell) {
            return Err(PlacementError::NotBuildable);
        }
        if self.towers.occupant(cell).is_some() {
            return Err(PlacementError::Occupied);
        }

        let stats = *self.catalog.stats(kind);
        if stats.cost > self.gold {
            return Err(PlacementError::InsufficientGold {
                cost: stats.cost,
                available: self.gold,
            });
        }

        self.gold -= stats.cost;
        Ok(self.towers.insert(kind, cell, position, stats))
    }

    fn sell_tower(&mut self, tower: TowerId) -> Result<u32, TowerCommandError> {
        let removed = self
            .towers
            .remove(tower)
            .ok_or(TowerCommandError::MissingTower)?;
        let refund = removed.refund();
        self.gold = self.gold.saturating_add(refund);
        Ok(refund)
    }

    fn upgrade_tower(&mut self, tower: TowerId) -> Result<u32, TowerCommandError> {
        let gold = self.gold;
        let entry = self
            .towers
            .get_mut(tower)
            .ok_or(TowerCommandError::MissingTower)?;
        let cost = entry.upgrade_cost().ok_or(TowerCommandError::MaxLevel)?;
        if cost > gold {
            return Err(TowerCommandError::InsufficientGold {
                cost,
                available: gold,
            });
        }

        let level = entry.upgrade()?;
        self.gold -= cost;
        Ok(level)
    }
}

/// Applies a player command to the world.
///
/// Invalid commands never mutate the world. They are reported through a
/// rejection event instead. Session commands such as [`Command::Advance`] are
/// ignored here because the state machine handles them.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTower { kind, cell } => match world.place_tower(kind, cell) {
            Ok(tower) => out_events.push(Event::TowerPlaced { tower, kind, cell }),
            Err(reason) => {
                warn!("rejected {kind:?} tower at {cell:?}: {reason:?}");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        },
        Command::SellTower { tower } => match world.sell_tower(tower) {
            Ok(refund) => out_events.push(Event::TowerSold { tower, refund }),
            Err(reason) => reject_tower_command(tower, reason, out_events),
        },
        Command::UpgradeTower { tower } => match world.upgrade_tower(tower) {
            Ok(level) => out_events.push(Event::TowerUpgraded { tower, level }),
            Err(reason) => reject_tower_command(tower, reason, out_events),
        },
        Command::SetTargeting { tower, policy } => match world.towers.get_mut(tower) {
            Some(entry) => {
                entry.set_policy(policy);
                out_events.push(Event::TargetingChanged { tower, policy });
            }
            None => reject_tower_command(tower, TowerCommandError::MissingTower, out_events),
        },
        Command::ApplyPowerup { powerup, tower } => match world.apply_powerup(powerup, tower) {
            Ok(modifier) => out_events.push(Event::PowerupApplied {
                powerup,
                tower,
                modifier,
            }),
            Err(reason) => reject_tower_command(tower, reason, out_events),
        },
        Command::Advance | Command::Back | Command::Quit | Command::Pause => {}
    }
}

fn reject_tower_command(tower: TowerId, reason: TowerCommandError, out_events: &mut Vec<Event>) {
    warn!("rejected command for tower {}: {reason:?}", tower.get());
    out_events.push(Event::TowerCommandRejected { tower, reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{CritterGroup, CritterTower, Map, Powerup, World};
    use critter_defence_core::{CritterView, PowerupId, TowerCatalog, TowerId, TowerView};

    /// Aggregate counters across every critter group of the part.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WaveTotals {
        /// Critters spawned so far.
        pub spawned: u32,
        /// Critters killed by towers.
        pub killed: u32,
        /// Critters that reached the exit.
        pub leaked: u32,
        /// Critters still waiting to spawn.
        pub remaining: u32,
        /// Critters currently walking the route.
        pub alive: usize,
    }

    /// Provides read-only access to the map.
    #[must_use]
    pub fn map(world: &World) -> &Map {
        &world.map
    }

    /// Gold currently held by the player.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Tower statistics available for purchase in this part.
    #[must_use]
    pub fn catalog(world: &World) -> &TowerCatalog {
        &world.catalog
    }

    /// Seconds of simulated time since the part began.
    #[must_use]
    pub fn elapsed(world: &World) -> f32 {
        world.elapsed
    }

    /// Critter groups in wave order.
    #[must_use]
    pub fn groups(world: &World) -> &[CritterGroup] {
        &world.groups
    }

    /// Captures a read-only view of the live critters.
    #[must_use]
    pub fn critter_view(world: &World) -> CritterView {
        world.critter_view()
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(CritterTower::snapshot).collect())
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<&CritterTower> {
        world.towers.get(id)
    }

    /// Dropped powerups waiting to be installed, in identifier order.
    pub fn powerups(world: &World) -> impl Iterator<Item = &Powerup> {
        world.powerups.iter()
    }

    /// Reports whether a dropped powerup is still waiting to be installed.
    #[must_use]
    pub fn has_powerup(world: &World, id: PowerupId) -> bool {
        world.powerups.contains(id)
    }

    /// Number of projectiles currently in flight.
    #[must_use]
    pub fn projectile_count(world: &World) -> usize {
        world
            .towers
            .iter()
            .map(|tower| tower.projectiles().len())
            .sum()
    }

    /// Sums the counters of every group.
    #[must_use]
    pub fn totals(world: &World) -> WaveTotals {
        world
            .groups
            .iter()
            .fold(WaveTotals::default(), |totals, group| WaveTotals {
                spawned: totals.spawned + group.spawned(),
                killed: totals.killed + group.killed(),
                leaked: totals.leaked + group.leaked(),
                remaining: totals.remaining + group.remaining(),
                alive: totals.alive + group.live_count(),
            })
    }
}
