//! Timed status effects that modified towers leave on the critters they wound.

use critter_defence_core::TowerModifier;

/// Multiplier applied to the speed of a slowed critter.
pub const SLOW_FACTOR: f32 = 0.5;
/// Seconds a slow lasts.
pub const SLOW_DURATION: f32 = 4.0;
/// Seconds a burn lasts.
pub const BURN_DURATION: f32 = 1.0;
/// Health a burning critter loses per second.
pub const BURN_DAMAGE_PER_SECOND: f32 = 60.0;

/// Remaining duration of every effect on one critter.
///
/// An effect that is already running is not refreshed by another hit. It
/// has to wear off before it can be applied again.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusEffects {
    slow: f32,
    burn: f32,
}

impl StatusEffects {
    /// Seconds of slow left.
    #[must_use]
    pub const fn slow_remaining(&self) -> f32 {
        self.slow
    }

    /// Seconds of burn left.
    #[must_use]
    pub const fn burn_remaining(&self) -> f32 {
        self.burn
    }

    /// Reports whether the critter walks at reduced speed.
    #[must_use]
    pub fn is_slowed(&self) -> bool {
        self.slow > 0.0
    }

    /// Reports whether the critter is losing health to fire.
    #[must_use]
    pub fn is_burning(&self) -> bool {
        self.burn > 0.0
    }

    /// Factor applied to the critter's base speed.
    #[must_use]
    pub fn speed_factor(&self) -> f32 {
        if self.is_slowed() {
            SLOW_FACTOR
        } else {
            1.0
        }
    }

    pub(crate) fn apply(&mut self, modifier: TowerModifier) {
        match modifier {
            TowerModifier::Slowing if !self.is_slowed() => self.slow = SLOW_DURATION,
            TowerModifier::Burning if !self.is_burning() => self.burn = BURN_DURATION,
            TowerModifier::Slowing | TowerModifier::Burning => {}
        }
    }

    /// Fire damage taken over the next `dt` seconds.
    pub(crate) fn burn_damage(&self, dt: f32) -> f32 {
        self.burn.min(dt.max(0.0)) * BURN_DAMAGE_PER_SECOND
    }

    /// Counts every running effect down by `dt`.
    pub(crate) fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.slow = (self.slow - dt).max(0.0);
        self.burn = (self.burn - dt).max(0.0);
    }
}
