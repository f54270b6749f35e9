//! Critters walking the route and the groups that spawn and own them.

use critter_defence_core::{
    CritterId, CritterKind, CritterSnapshot, CritterStats, Event, TowerModifier, Vector2D,
    WaveSpec,
};
use critter_defence_system_spawning::{Config as SpawnConfig, Spawning};
use log::debug;

use crate::{effects::StatusEffects, map::Map};

/// Distance below which leftover movement is discarded.
///
/// Keeps float residue from pushing a critter a hair past a waypoint it
/// reached exactly.
const MOVE_EPSILON: f32 = 1e-5;

/// Lifecycle of a critter inside its group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CritterStatus {
    /// Walking the route.
    Alive,
    /// Killed by tower fire, awaiting removal.
    Dead,
    /// Reached the exit, awaiting removal.
    Leaked,
}

/// Outcome of applying damage to a critter by identifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// The identifier no longer resolves to a live critter.
    Missing,
    /// The critter survived with the provided health.
    Wounded {
        /// Health left after the hit.
        remaining: f32,
    },
    /// The critter died from the hit.
    Killed {
        /// Gold awarded for the kill.
        reward: u32,
    },
}

/// Allocator handing out monotonically increasing critter identifiers.
#[derive(Clone, Debug, Default)]
pub struct CritterIds {
    next: u32,
}

impl CritterIds {
    /// Creates an allocator whose first identifier is zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator whose first identifier is `first`.
    #[must_use]
    pub const fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Returns a fresh identifier.
    pub fn allocate(&mut self) -> CritterId {
        let id = CritterId::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Single creature walking the route by interpolating between waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Critter {
    id: CritterId,
    kind: CritterKind,
    position: Vector2D,
    path_index: usize,
    progress: f32,
    speed: f32,
    health: f32,
    max_health: f32,
    reward: u32,
    strength: u32,
    distance_travelled: f32,
    effects: StatusEffects,
    status: CritterStatus,
}

impl Critter {
    fn spawn(id: CritterId, kind: CritterKind, stats: CritterStats, map: &Map) -> Self {
        Self {
            id,
            kind,
            position: map.interpolate(0, 0.0),
            path_index: 0,
            progress: 0.0,
            speed: stats.speed.max(0.0),
            health: stats.max_health,
            max_health: stats.max_health,
            reward: stats.reward,
            strength: stats.strength,
            distance_travelled: 0.0,
            effects: StatusEffects::default(),
            status: CritterStatus::Alive,
        }
    }

    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> CritterId {
        self.id
    }

    /// Kind of the critter.
    #[must_use]
    pub const fn kind(&self) -> CritterKind {
        self.kind
    }

    /// Pixel-space position.
    #[must_use]
    pub const fn position(&self) -> Vector2D {
        self.position
    }

    /// Index of the waypoint the critter last passed.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Fraction of the current segment already walked.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Base travel speed in pixels per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Speed after status effects.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.effects.speed_factor()
    }

    /// Status effects currently running on the critter.
    #[must_use]
    pub const fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health the critter spawned with.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Gold stolen if the critter leaks.
    #[must_use]
    pub const fn strength(&self) -> u32 {
        self.strength
    }

    /// Total distance walked since spawning.
    #[must_use]
    pub const fn distance_travelled(&self) -> f32 {
        self.distance_travelled
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> CritterStatus {
        self.status
    }

    /// Reports whether the critter still walks the route.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == CritterStatus::Alive
    }

    /// Captures an immutable snapshot for targeting and queries.
    #[must_use]
    pub fn snapshot(&self) -> CritterSnapshot {
        CritterSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            path_index: self.path_index,
            progress: self.progress,
            distance_travelled: self.distance_travelled,
        }
    }

    /// Walks `effective_speed * dt` pixels along the route and reports whether
    /// the critter reached the final waypoint.
    ///
    /// A slow running at the start of the frame covers the whole frame.
    fn advance(&mut self, dt: f32, map: &Map) -> bool {
        let last = map.last_waypoint_index();
        let mut distance = self.effective_speed() * dt;
        self.effects.tick(dt);

        while distance > MOVE_EPSILON && self.path_index < last {
            let length = map.segment_length(self.path_index);
            let left = (1.0 - self.progress) * length;

            if distance + MOVE_EPSILON >= left {
                distance -= left;
                self.distance_travelled += left;
                self.path_index += 1;
                self.progress = 0.0;
            } else {
                self.progress += distance / length;
                self.distance_travelled += distance;
                distance = 0.0;
            }
        }

        self.position = map.interpolate(self.path_index, self.progress);
        self.path_index >= last
    }

    /// Deals `amount` damage. A critter that survives picks up `modifier`.
    fn take_damage(&mut self, amount: f32, modifier: Option<TowerModifier>) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Missing;
        }

        self.health -= amount.max(0.0);
        if self.health <= 0.0 {
            self.status = CritterStatus::Dead;
            return DamageOutcome::Killed {
                reward: self.reward,
            };
        }

        if let Some(modifier) = modifier {
            self.effects.apply(modifier);
        }
        DamageOutcome::Wounded {
            remaining: self.health,
        }
    }
}

/// Wave of critters sharing a spawn schedule.
///
/// The group exclusively owns its critters. Everything else refers to them by
/// [`CritterId`] and resolves the identifier through [`CritterGroup::get`],
/// which stops answering as soon as a critter dies or leaks.
#[derive(Clone, Debug)]
pub struct CritterGroup {
    kind: CritterKind,
    stats: CritterStats,
    spawning: Spawning,
    critters: Vec<Critter>,
    spawned: u32,
    killed: u32,
    leaked: u32,
}

impl CritterGroup {
    /// Creates a group that will spawn the provided wave.
    #[must_use]
    pub fn new(wave: &WaveSpec) -> Self {
        Self {
            kind: wave.kind,
            stats: wave.critter_stats(),
            spawning: Spawning::new(SpawnConfig::new(wave.count, wave.interval, wave.delay)),
            critters: Vec::new(),
            spawned: 0,
            killed: 0,
            leaked: 0,
        }
    }

    /// Advances the spawn timer and creates every critter that became due.
    ///
    /// New critters appear on the first waypoint. Non-positive `dt` does
    /// nothing.
    pub fn tick(&mut self, dt: f32, map: &Map, ids: &mut CritterIds, out: &mut Vec<Event>) {
        let due = self.spawning.handle(dt);
        for _ in 0..due {
            let id = ids.allocate();
            self.critters
                .push(Critter::spawn(id, self.kind, self.stats, map));
            self.spawned += 1;
            debug!("spawned {:?} critter {}", self.kind, id.get());
            out.push(Event::CritterSpawned {
                critter: id,
                kind: self.kind,
            });
        }
    }

    /// Burns and moves every live critter along the route, then sweeps out
    /// the dead and the leaked.
    ///
    /// Fire damage lands before movement, so a critter burnt to death does not
    /// walk this frame. Non-positive `dt` does nothing.
    pub fn update(&mut self, dt: f32, map: &Map, out: &mut Vec<Event>) {
        if dt <= 0.0 {
            return;
        }

        for critter in self.critters.iter_mut().filter(|critter| critter.is_alive()) {
            let burn = critter.effects.burn_damage(dt);
            if burn > 0.0 {
                if let DamageOutcome::Killed { reward } = critter.take_damage(burn, None) {
                    self.killed += 1;
                    debug!("critter {} burnt to death", critter.id.get());
                    out.push(Event::CritterKilled {
                        critter: critter.id,
                        reward,
                        position: critter.position,
                    });
                    continue;
                }
            }

            if critter.advance(dt, map) {
                critter.status = CritterStatus::Leaked;
                self.leaked += 1;
                debug!("critter {} leaked", critter.id.get());
                out.push(Event::CritterLeaked {
                    critter: critter.id,
                    strength: critter.strength,
                });
            }
        }

        self.sweep();
    }

    /// Applies `amount` damage to the critter with the provided identifier.
    ///
    /// Unknown, removed and already dead critters report
    /// [`DamageOutcome::Missing`].
    pub fn apply_damage(&mut self, id: CritterId, amount: f32) -> DamageOutcome {
        self.apply_hit(id, amount, None)
    }

    /// Applies a projectile hit, leaving `modifier` on a critter that survives.
    pub fn apply_hit(
        &mut self,
        id: CritterId,
        amount: f32,
        modifier: Option<TowerModifier>,
    ) -> DamageOutcome {
        let Some(critter) = self.critters.iter_mut().find(|critter| critter.id == id) else {
            return DamageOutcome::Missing;
        };

        let outcome = critter.take_damage(amount, modifier);
        if let DamageOutcome::Killed { .. } = outcome {
            self.killed += 1;
            debug!("critter {} killed", id.get());
        }
        outcome
    }

    /// Removes dead and leaked critters without reordering survivors.
    pub fn sweep(&mut self) {
        self.critters.retain(Critter::is_alive);
    }

    /// Live critters in spawn order.
    pub fn live_critters(&self) -> impl Iterator<Item = &Critter> {
        self.critters.iter().filter(|critter| critter.is_alive())
    }

    /// Resolves a live critter by identifier.
    #[must_use]
    pub fn get(&self, id: CritterId) -> Option<&Critter> {
        self.live_critters().find(|critter| critter.id == id)
    }

    /// Kind of critter spawned by the group.
    #[must_use]
    pub const fn kind(&self) -> CritterKind {
        self.kind
    }

    /// Number of critters spawned so far.
    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Number of critters killed by towers.
    #[must_use]
    pub const fn killed(&self) -> u32 {
        self.killed
    }

    /// Number of critters that reached the exit.
    #[must_use]
    pub const fn leaked(&self) -> u32 {
        self.leaked
    }

    /// Number of critters still waiting to spawn.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.spawning.remaining()
    }

    /// Number of live critters.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live_critters().count()
    }

    /// Reports whether nothing remains to spawn and nothing is alive.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.spawning.is_exhausted() && self.live_count() == 0
    }
}
