//! Projectiles fired by towers.

use critter_defence_core::{
    CritterId, ProjectileId, TowerKind, TowerModifier, TowerStats, Vector2D,
};

/// Allocator handing out monotonically increasing projectile identifiers.
#[derive(Clone, Debug, Default)]
pub struct ProjectileIds {
    next: u32,
}

impl ProjectileIds {
    /// Creates an allocator whose first identifier is zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh identifier.
    pub fn allocate(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Lifecycle of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileState {
    /// Fired this frame; starts moving on the next one.
    Loaded,
    /// Travelling toward the aim point.
    InFlight,
    /// Connected with its target.
    Hit,
    /// Vanished without dealing damage.
    Expired,
}

/// Straight-flying projectile aimed at a snapshot of its target's position.
///
/// The velocity is fixed at launch. The target is only referenced by
/// identifier and may disappear while the projectile is in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct CritterProjectile {
    id: ProjectileId,
    kind: TowerKind,
    position: Vector2D,
    velocity: Vector2D,
    damage: f32,
    target: CritterId,
    age: f32,
    lifetime: f32,
    hit_radius: f32,
    modifier: Option<TowerModifier>,
    state: ProjectileState,
}

impl CritterProjectile {
    /// Launches a projectile from `origin` toward `aim` using the firing
    /// tower's statistics.
    #[must_use]
    pub fn launch(
        id: ProjectileId,
        kind: TowerKind,
        origin: Vector2D,
        aim: Vector2D,
        stats: &TowerStats,
        target: CritterId,
    ) -> Self {
        Self {
            id,
            kind,
            position: origin,
            velocity: (aim - origin).normalize() * stats.projectile_speed,
            damage: stats.damage,
            target,
            age: 0.0,
            lifetime: stats.projectile_lifetime,
            hit_radius: stats.hit_radius,
            modifier: None,
            state: ProjectileState::Loaded,
        }
    }

    /// Attaches the effect the projectile leaves on a critter it wounds.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Option<TowerModifier>) -> Self {
        self.modifier = modifier;
        self
    }

    /// Identifier of the projectile.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Kind of tower that fired the projectile.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Pixel-space position.
    #[must_use]
    pub const fn position(&self) -> Vector2D {
        self.position
    }

    /// Velocity in pixels per second.
    #[must_use]
    pub const fn velocity(&self) -> Vector2D {
        self.velocity
    }

    /// Damage delivered on impact.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Effect left on a wounded target.
    #[must_use]
    pub const fn modifier(&self) -> Option<TowerModifier> {
        self.modifier
    }

    /// Critter the projectile was aimed at.
    #[must_use]
    pub const fn target(&self) -> CritterId {
        self.target
    }

    /// Seconds spent in flight.
    #[must_use]
    pub const fn age(&self) -> f32 {
        self.age
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ProjectileState {
        self.state
    }

    /// Reports whether the projectile hit or expired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, ProjectileState::Hit | ProjectileState::Expired)
    }

    /// Moves the projectile by `velocity * dt` and resolves impact.
    ///
    /// `target_position` is the target's current position, or `None` when the
    /// target is gone, in which case the projectile expires. A hit is scored
    /// when the travelled segment passes within the hit radius of the target.
    ///
    /// A `Loaded` projectile only switches to `InFlight`, even when its target
    /// is already gone. It expires on the following call. The extra frame
    /// deals no damage.
    pub(crate) fn advance(&mut self, dt: f32, target_position: Option<Vector2D>) -> ProjectileState {
        match self.state {
            ProjectileState::Loaded => {
                self.state = ProjectileState::InFlight;
                return self.state;
            }
            ProjectileState::Hit | ProjectileState::Expired => return self.state,
            ProjectileState::InFlight => {}
        }

        self.age += dt;
        let Some(target_position) = target_position else {
            self.state = ProjectileState::Expired;
            return self.state;
        };

        let start = self.position;
        self.position = start + self.velocity * dt;

        if target_position.distance_to_segment(start, self.position) <= self.hit_radius {
            self.state = ProjectileState::Hit;
        } else if self.age >= self.lifetime {
            self.state = ProjectileState::Expired;
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(speed: f32, lifetime: f32) -> TowerStats {
        TowerStats {
            projectile_speed: speed,
            projectile_lifetime: lifetime,
            hit_radius: 1.0,
            ..TowerStats::standard()
        }
    }

    fn launch(aim: Vector2D, speed: f32, lifetime: f32) -> CritterProjectile {
        CritterProjectile::launch(
            ProjectileId::new(0),
            TowerKind::Standard,
            Vector2D::ZERO,
            aim,
            &stats(speed, lifetime),
            CritterId::new(1),
        )
    }

    #[test]
    fn freshly_loaded_projectile_waits_one_frame() {
        let mut projectile = launch(Vector2D::new(1.0, 0.0), 100.0, 5.0);

        assert_eq!(
            projectile.advance(0.25, Some(Vector2D::new(1.0, 0.0))),
            ProjectileState::InFlight
        );
        assert_eq!(projectile.position(), Vector2D::ZERO);
        assert_eq!(projectile.age(), 0.0);
    }

    #[test]
    fn modifier_travels_with_the_projectile() {
        let plain = launch(Vector2D::new(1.0, 0.0), 10.0, 1.0);
        let frosty = plain.clone().with_modifier(Some(TowerModifier::Slowing));

        assert_eq!(plain.modifier(), None);
        assert_eq!(frosty.modifier(), Some(TowerModifier::Slowing));
    }

    #[test]
    fn velocity_is_fixed_toward_the_aim_snapshot() {
        let projectile = launch(Vector2D::new(0.0, 10.0), 20.0, 5.0);
        assert_eq!(projectile.velocity(), Vector2D::new(0.0, 20.0));
    }

    #[test]
    fn swept_segment_catches_fast_projectiles() {
        let mut projectile = launch(Vector2D::new(50.0, 0.0), 1000.0, 5.0);
        let target = Some(Vector2D::new(50.0, 0.5));

        let _ = projectile.advance(0.1, target);
        assert_eq!(projectile.advance(0.1, target), ProjectileState::Hit);
    }

    #[test]
    fn vanished_target_expires_without_moving() {
        let mut projectile = launch(Vector2D::new(10.0, 0.0), 10.0, 5.0);
        assert_eq!(
            projectile.advance(0.1, None),
            ProjectileState::InFlight,
            "a loaded projectile waits out its launch frame"
        );

        assert_eq!(projectile.advance(0.1, None), ProjectileState::Expired);
        assert_eq!(projectile.position(), Vector2D::ZERO);
        assert!(projectile.is_finished());
    }

    #[test]
    fn projectile_expires_after_lifetime() {
        let mut projectile = launch(Vector2D::new(1.0, 0.0), 10.0, 0.5);
        let far_away = Some(Vector2D::new(-500.0, 0.0));
        let _ = projectile.advance(0.25, far_away);

        assert_eq!(projectile.advance(0.25, far_away), ProjectileState::InFlight);
        assert_eq!(projectile.advance(0.25, far_away), ProjectileState::Expired);
    }
}
