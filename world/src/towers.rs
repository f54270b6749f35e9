//! Placed towers, their firing logic and the registry that stores them.

use std::collections::BTreeMap;

use critter_defence_core::{
    CellCoord, CritterId, CritterView, Event, TargetingPolicy, TowerCommandError, TowerId,
    TowerKind, TowerModifier, TowerSnapshot, TowerStats, Vector2D,
};
use critter_defence_system_tower_targeting::{in_range, select_target};
use log::debug;

use crate::{
    critters::{Critter, CritterGroup, DamageOutcome},
    projectiles::{CritterProjectile, ProjectileIds, ProjectileState},
};

/// Stationary defender that shoots at critters in range.
#[derive(Clone, Debug)]
pub struct CritterTower {
    id: TowerId,
    kind: TowerKind,
    cell: CellCoord,
    position: Vector2D,
    level: u32,
    base: TowerStats,
    stats: TowerStats,
    cooldown: f32,
    policy: TargetingPolicy,
    target: Option<CritterId>,
    modifier: Option<TowerModifier>,
    projectiles: Vec<CritterProjectile>,
}

impl CritterTower {
    /// Creates a level one tower centred on `position`, ready to fire.
    #[must_use]
    pub fn new(
        id: TowerId,
        kind: TowerKind,
        cell: CellCoord,
        position: Vector2D,
        base: TowerStats,
    ) -> Self {
        Self {
            id,
            kind,
            cell,
            position,
            level: 1,
            base,
            stats: base,
            cooldown: 0.0,
            policy: TargetingPolicy::default(),
            target: None,
            modifier: None,
            projectiles: Vec::new(),
        }
    }

    /// Identifier of the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Kind of the tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Cell the tower stands on.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Pixel-space centre of the tower.
    #[must_use]
    pub const fn position(&self) -> Vector2D {
        self.position
    }

    /// Current upgrade level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Statistics in effect at the current level.
    #[must_use]
    pub const fn stats(&self) -> &TowerStats {
        &self.stats
    }

    /// Seconds until the tower may fire again.
    #[must_use]
    pub const fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Policy used to pick targets.
    #[must_use]
    pub const fn policy(&self) -> TargetingPolicy {
        self.policy
    }

    /// Critter the tower is tracking. May refer to a critter that is gone.
    #[must_use]
    pub const fn target(&self) -> Option<CritterId> {
        self.target
    }

    /// Powerup effect installed on the tower.
    #[must_use]
    pub const fn modifier(&self) -> Option<TowerModifier> {
        self.modifier
    }

    /// Installs a powerup effect, returning the one it replaced.
    ///
    /// Projectiles already in flight keep the effect they were fired with.
    pub fn set_modifier(&mut self, modifier: TowerModifier) -> Option<TowerModifier> {
        self.modifier.replace(modifier)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[CritterProjectile] {
        &self.projectiles
    }

    /// Switches the targeting policy and drops the current target.
    pub fn set_policy(&mut self, policy: TargetingPolicy) {
        self.policy = policy;
        self.target = None;
    }

    /// Gold required to upgrade, or `None` at the maximum level.
    #[must_use]
    pub fn upgrade_cost(&self) -> Option<u32> {
        (self.level < self.base.max_level).then(|| TowerStats::upgrade_cost(self.level))
    }

    /// Raises the tower by one level.
    pub fn upgrade(&mut self) -> Result<u32, TowerCommandError> {
        if self.level >= self.base.max_level {
            return Err(TowerCommandError::MaxLevel);
        }
        self.level += 1;
        self.stats = self.base.at_level(self.level);
        Ok(self.level)
    }

    /// Gold returned when the tower is sold.
    #[must_use]
    pub fn refund(&self) -> u32 {
        self.base.refund(self.level)
    }

    /// Cools the weapon down, keeps or re-acquires a target and fires when
    /// ready.
    ///
    /// A target that vanished from `critters` or left the range is replaced by
    /// the best candidate under the tower's policy. Firing without a target
    /// does nothing. Non-positive `dt` does nothing.
    ///
    /// A shot resets the cooldown to `1 / fire_rate` and drops whatever part of
    /// the frame was left over. When `dt` does not divide the fire interval the
    /// tower fires less often than `fire_rate`, which is intended.
    pub fn update(
        &mut self,
        dt: f32,
        critters: &CritterView,
        projectile_ids: &mut ProjectileIds,
        out: &mut Vec<Event>,
    ) {
        if dt <= 0.0 {
            return;
        }

        self.cooldown = (self.cooldown - dt).max(0.0);

        let tracked = self
            .target
            .and_then(|id| critters.get(id))
            .filter(|snapshot| in_range(self.position, self.stats.range, snapshot.position));
        if tracked.is_none() {
            self.target = select_target(self.policy, self.position, self.stats.range, critters);
        }

        let Some(target) = self.target.and_then(|id| critters.get(id)) else {
            return;
        };
        if self.cooldown > 0.0 || self.stats.fire_rate <= 0.0 {
            return;
        }

        let projectile = CritterProjectile::launch(
            projectile_ids.allocate(),
            self.kind,
            self.position,
            target.position,
            &self.stats,
            target.id,
        )
        .with_modifier(self.modifier);
        out.push(Event::ProjectileFired {
            tower: self.id,
            projectile: projectile.id(),
            target: target.id,
        });
        self.projectiles.push(projectile);
        self.cooldown = 1.0 / self.stats.fire_rate;
    }

    /// Advances every owned projectile and applies damage on impact.
    ///
    /// Targets are looked up by identifier in `groups` each frame. Projectiles
    /// whose target is gone expire without damage. Non-positive `dt` does
    /// nothing.
    pub fn update_projectiles(
        &mut self,
        dt: f32,
        groups: &mut [CritterGroup],
        out: &mut Vec<Event>,
    ) {
        if dt <= 0.0 {
            return;
        }

        for projectile in &mut self.projectiles {
            let target = projectile.target();
            let target_position = groups
                .iter()
                .find_map(|group| group.get(target))
                .map(Critter::position);

            match projectile.advance(dt, target_position) {
                ProjectileState::Hit => {
                    let damage = projectile.damage();
                    let modifier = projectile.modifier();
                    let outcome = groups
                        .iter_mut()
                        .map(|group| group.apply_hit(target, damage, modifier))
                        .find(|outcome| *outcome != DamageOutcome::Missing)
                        .unwrap_or(DamageOutcome::Missing);

                    out.push(Event::ProjectileHit {
                        projectile: projectile.id(),
                        critter: target,
                        damage,
                    });
                    if let DamageOutcome::Killed { reward } = outcome {
                        out.push(Event::CritterKilled {
                            critter: target,
                            reward,
                            position: target_position.unwrap_or(projectile.position()),
                        });
                    }
                }
                ProjectileState::Expired => {
                    out.push(Event::ProjectileExpired {
                        projectile: projectile.id(),
                    });
                }
                ProjectileState::Loaded | ProjectileState::InFlight => {}
            }
        }

        self.projectiles.retain(|projectile| !projectile.is_finished());
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            level: self.level,
            range: self.stats.range,
            policy: self.policy,
            target: self.target,
            modifier: self.modifier,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Clone, Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, CritterTower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        position: Vector2D,
        stats: TowerStats,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, CritterTower::new(id, kind, cell, position, stats));
        debug!("placed {kind:?} tower {} at {cell:?}", id.get());
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<CritterTower> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&CritterTower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut CritterTower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.cell == cell)
            .map(CritterTower::id)
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &CritterTower> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut CritterTower> {
        self.entries.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_defence_core::{
        CritterKind, CritterSnapshot, CritterStats, MapSpec, WaveSpec,
    };

    use crate::{critters::CritterIds, map::Map};

    fn tower_stats(range: f32, fire_rate: f32, damage: f32, speed: f32) -> TowerStats {
        TowerStats {
            range,
            damage,
            fire_rate,
            projectile_speed: speed,
            projectile_lifetime: 2.0,
            hit_radius: 0.5,
            ..TowerStats::standard()
        }
    }

    fn tower_at(position: Vector2D, stats: TowerStats) -> CritterTower {
        CritterTower::new(
            TowerId::new(0),
            TowerKind::Standard,
            CellCoord::new(0, 0),
            position,
            stats,
        )
    }

    fn stationary_group(map: &Map, health: f32) -> CritterGroup {
        let mut wave = WaveSpec::new(CritterKind::Tank, 1, 1, 1.0);
        wave.stats = Some(CritterStats {
            max_health: health,
            speed: 0.0,
            reward: 7,
            strength: 1,
        });
        let mut group = CritterGroup::new(&wave);
        let mut ids = CritterIds::new();
        let mut events = Vec::new();
        group.tick(1.0, map, &mut ids, &mut events);
        group
    }

    fn view_of(groups: &[CritterGroup]) -> CritterView {
        CritterView::from_snapshots(
            groups
                .iter()
                .flat_map(CritterGroup::live_critters)
                .map(Critter::snapshot)
                .collect(),
        )
    }

    fn snapshot(id: u32, position: Vector2D) -> CritterSnapshot {
        CritterSnapshot {
            id: CritterId::new(id),
            kind: CritterKind::Normal,
            position,
            health: 10.0,
            max_health: 10.0,
            path_index: 0,
            progress: 0.0,
            distance_travelled: 0.0,
        }
    }

    #[test]
    fn three_fire_cycles_kill_a_stationary_critter() {
        let map = Map::load(&MapSpec::open(
            3,
            1,
            1.0,
            CellCoord::new(0, 0),
            CellCoord::new(2, 0),
        ))
        .expect("valid corridor");
        let mut groups = vec![stationary_group(&map, 25.0)];
        let critter_position = map.waypoints()[0];
        let mut tower = tower_at(
            critter_position + Vector2D::new(0.0, 3.0),
            tower_stats(5.0, 1.0, 10.0, 20.0),
        );
        let mut projectile_ids = ProjectileIds::new();
        let mut fired_frames = Vec::new();
        let mut hit_frames = Vec::new();

        for frame in 1..=12 {
            let mut events = Vec::new();
            let view = view_of(&groups);
            tower.update(0.25, &view, &mut projectile_ids, &mut events);
            tower.update_projectiles(0.25, &mut groups, &mut events);
            for group in &mut groups {
                group.sweep();
            }

            for event in &events {
                match event {
                    Event::ProjectileFired { .. } => fired_frames.push(frame),
                    Event::ProjectileHit { .. } => hit_frames.push(frame),
                    _ => {}
                }
            }
        }

        assert_eq!(fired_frames, vec![1, 5, 9]);
        assert_eq!(hit_frames, vec![2, 6, 10]);
        assert_eq!(groups[0].killed(), 1);
        assert_eq!(groups[0].live_count(), 0, "dead critter is removed");
        assert_eq!(tower.target().and_then(|id| groups[0].get(id)), None);
    }

    #[test]
    fn equidistant_critters_resolve_to_lowest_id() {
        let mut tower = tower_at(Vector2D::ZERO, tower_stats(10.0, 1.0, 1.0, 10.0));
        let view = CritterView::from_snapshots(vec![
            snapshot(5, Vector2D::new(4.0, 0.0)),
            snapshot(3, Vector2D::new(0.0, -4.0)),
        ]);
        let mut events = Vec::new();

        tower.update(0.1, &view, &mut ProjectileIds::new(), &mut events);

        assert_eq!(tower.target(), Some(CritterId::new(3)));
        assert!(matches!(
            events.as_slice(),
            [Event::ProjectileFired { target, .. }] if *target == CritterId::new(3)
        ));
    }

    #[test]
    fn vanished_target_is_replaced_or_cleared() {
        let mut tower = tower_at(Vector2D::ZERO, tower_stats(10.0, 1.0, 1.0, 10.0));
        let mut ids = ProjectileIds::new();
        let mut events = Vec::new();

        let both = CritterView::from_snapshots(vec![
            snapshot(1, Vector2D::new(1.0, 0.0)),
            snapshot(2, Vector2D::new(2.0, 0.0)),
        ]);
        tower.update(0.1, &both, &mut ids, &mut events);
        assert_eq!(tower.target(), Some(CritterId::new(1)));

        let survivor = CritterView::from_snapshots(vec![snapshot(2, Vector2D::new(2.0, 0.0))]);
        tower.update(0.1, &survivor, &mut ids, &mut events);
        assert_eq!(tower.target(), Some(CritterId::new(2)));

        tower.update(0.1, &CritterView::default(), &mut ids, &mut events);
        assert_eq!(tower.target(), None);
    }

    #[test]
    fn target_leaving_range_is_dropped() {
        let mut tower = tower_at(Vector2D::ZERO, tower_stats(5.0, 1.0, 1.0, 10.0));
        let mut ids = ProjectileIds::new();
        let mut events = Vec::new();

        let near = CritterView::from_snapshots(vec![snapshot(1, Vector2D::new(4.0, 0.0))]);
        tower.update(0.1, &near, &mut ids, &mut events);
        assert_eq!(tower.target(), Some(CritterId::new(1)));

        let far = CritterView::from_snapshots(vec![snapshot(1, Vector2D::new(6.0, 0.0))]);
        tower.update(0.1, &far, &mut ids, &mut events);
        assert_eq!(tower.target(), None);
    }

    #[test]
    fn projectile_expires_when_target_dies_mid_flight() {
        let map = Map::load(&MapSpec::open(
            3,
            1,
            1.0,
            CellCoord::new(0, 0),
            CellCoord::new(2, 0),
        ))
        .expect("valid corridor");
        let mut groups = vec![stationary_group(&map, 5.0)];
        let target = groups[0].live_critters().next().map(Critter::id).expect("spawned");
        let mut tower = tower_at(
            map.waypoints()[0] + Vector2D::new(0.0, 4.0),
            tower_stats(5.0, 1.0, 1.0, 0.5),
        );
        let mut ids = ProjectileIds::new();
        let mut events = Vec::new();

        tower.update(0.1, &view_of(&groups), &mut ids, &mut events);
        tower.update_projectiles(0.1, &mut groups, &mut events);
        assert_eq!(tower.projectiles().len(), 1);

        let _ = groups[0].apply_damage(target, 100.0);
        groups[0].sweep();
        events.clear();
        tower.update_projectiles(0.1, &mut groups, &mut events);

        assert!(tower.projectiles().is_empty());
        assert!(matches!(events.as_slice(), [Event::ProjectileExpired { .. }]));
    }

    #[test]
    fn leftover_frame_time_is_not_carried_between_shots() {
        let mut tower = tower_at(Vector2D::ZERO, tower_stats(10.0, 3.0, 0.0, 10.0));
        let view = CritterView::from_snapshots(vec![snapshot(1, Vector2D::new(1.0, 0.0))]);
        let mut ids = ProjectileIds::new();
        let mut events = Vec::new();

        for _ in 0..300 {
            tower.update(0.1, &view, &mut ids, &mut events);
        }

        let shots = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFired { .. }))
            .count();
        assert_eq!(shots, 75, "one shot every fourth frame of 0.1s");
    }

    #[test]
    fn modified_tower_slows_what_it_wounds() {
        let map = Map::load(&MapSpec::open(
            3,
            1,
            1.0,
            CellCoord::new(0, 0),
            CellCoord::new(2, 0),
        ))
        .expect("valid corridor");
        let mut groups = vec![stationary_group(&map, 100.0)];
        let target = groups[0].live_critters().next().map(Critter::id).expect("spawned");
        let mut tower = tower_at(
            map.waypoints()[0] + Vector2D::new(0.0, 1.0),
            tower_stats(5.0, 1.0, 10.0, 20.0),
        );
        assert_eq!(tower.set_modifier(TowerModifier::Burning), None);
        assert_eq!(
            tower.set_modifier(TowerModifier::Slowing),
            Some(TowerModifier::Burning)
        );
        let mut ids = ProjectileIds::new();
        let mut events = Vec::new();

        for _ in 0..2 {
            tower.update(0.25, &view_of(&groups), &mut ids, &mut events);
            tower.update_projectiles(0.25, &mut groups, &mut events);
        }

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileHit { .. })));
        let critter = groups[0].get(target).expect("wounded");
        assert!(critter.effects().is_slowed());
        assert!(!critter.effects().is_burning());
        assert_eq!(tower.snapshot().modifier, Some(TowerModifier::Slowing));
    }

    #[test]
    fn zero_dt_leaves_tower_untouched() {
        let mut tower = tower_at(Vector2D::ZERO, tower_stats(10.0, 1.0, 1.0, 10.0));
        let view = CritterView::from_snapshots(vec![snapshot(1, Vector2D::new(1.0, 0.0))]);
        let mut events = Vec::new();

        tower.update(0.0, &view, &mut ProjectileIds::new(), &mut events);

        assert!(events.is_empty());
        assert_eq!(tower.target(), None);
        assert_eq!(tower.cooldown(), 0.0);
    }

    #[test]
    fn upgrades_stop_at_max_level_and_raise_refund() {
        let mut tower = tower_at(Vector2D::ZERO, TowerStats::rapid_fire());
        assert_eq!(tower.upgrade_cost(), Some(150));
        assert_eq!(tower.upgrade(), Ok(2));
        assert_eq!(tower.upgrade(), Ok(3));
        assert_eq!(tower.upgrade(), Err(TowerCommandError::MaxLevel));
        assert_eq!(tower.upgrade_cost(), None);
        assert!((tower.stats().range - 95.0).abs() < f32::EPSILON);
        assert_eq!(tower.refund(), 25 + 2 * 50);
    }

    #[test]
    fn registry_allocates_sequential_ids_and_tracks_cells() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(
            TowerKind::Cannon,
            CellCoord::new(1, 1),
            Vector2D::ZERO,
            TowerStats::cannon(),
        );
        let second = registry.insert(
            TowerKind::Standard,
            CellCoord::new(2, 1),
            Vector2D::ZERO,
            TowerStats::standard(),
        );

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.occupant(CellCoord::new(2, 1)), Some(second));
        assert!(registry.remove(first).is_some());
        assert_eq!(registry.occupant(CellCoord::new(1, 1)), None);
        assert!(registry.get(first).is_none());
    }
}
