//! Powerups dropped by killed critters and the seeded roll that drops them.

use std::collections::BTreeMap;

use critter_defence_core::{PowerupId, PowerupKind, Vector2D};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Powerup lying on the map until the player installs it on a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Powerup {
    id: PowerupId,
    kind: PowerupKind,
    position: Vector2D,
}

impl Powerup {
    /// Identifier of the powerup.
    #[must_use]
    pub const fn id(&self) -> PowerupId {
        self.id
    }

    /// Kind of the powerup.
    #[must_use]
    pub const fn kind(&self) -> PowerupKind {
        self.kind
    }

    /// Where the critter that dropped it died.
    #[must_use]
    pub const fn position(&self) -> Vector2D {
        self.position
    }
}

/// Dropped powerups of one part together with the generator deciding drops.
#[derive(Clone, Debug)]
pub(crate) struct PowerupStash {
    entries: BTreeMap<PowerupId, Powerup>,
    next_powerup_id: PowerupId,
    drop_chance: f64,
    rng: ChaCha8Rng,
}

impl PowerupStash {
    /// Creates an empty stash. Chances outside `[0, 1]` are clamped and a
    /// chance that is not a number never drops anything.
    pub(crate) fn new(seed: u64, drop_chance: f64) -> Self {
        let drop_chance = if drop_chance.is_nan() {
            0.0
        } else {
            drop_chance.clamp(0.0, 1.0)
        };
        Self {
            entries: BTreeMap::new(),
            next_powerup_id: PowerupId::new(0),
            drop_chance,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rolls for a drop where a critter died. Fire and ice are equally likely.
    pub(crate) fn roll(&mut self, position: Vector2D) -> Option<Powerup> {
        if !self.rng.gen_bool(self.drop_chance) {
            return None;
        }

        let kind = if self.rng.gen_bool(0.5) {
            PowerupKind::Fire
        } else {
            PowerupKind::Ice
        };
        let id = self.next_powerup_id;
        self.next_powerup_id = PowerupId::new(id.get().saturating_add(1));
        let powerup = Powerup { id, kind, position };
        let _ = self.entries.insert(id, powerup);
        debug!("dropped {kind:?} powerup {}", id.get());
        Some(powerup)
    }

    pub(crate) fn contains(&self, id: PowerupId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn take(&mut self, id: PowerupId) -> Option<Powerup> {
        self.entries.remove(&id)
    }

    /// Powerups in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Powerup> {
        self.entries.values()
    }
}
