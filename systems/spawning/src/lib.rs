#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn scheduling shared by every critter group.

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    count: u32,
    interval: f32,
    delay: f32,
}

impl Config {
    /// Creates a schedule that emits `count` spawns, one every `interval`
    /// seconds, the first after `delay` seconds.
    #[must_use]
    pub const fn new(count: u32, interval: f32, delay: f32) -> Self {
        Self {
            count,
            interval,
            delay,
        }
    }
}

/// Countdown timer deciding when the next critter of a wave appears.
#[derive(Clone, Debug, PartialEq)]
pub struct Spawning {
    interval: f32,
    timer: f32,
    remaining: u32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval.max(0.0),
            timer: config.delay.max(0.0),
            remaining: config.count,
        }
    }

    /// Advances the countdown by `dt` seconds and returns how many spawns are
    /// due.
    ///
    /// A frame long enough to cover several intervals yields several spawns.
    /// Non-positive `dt` leaves the schedule untouched.
    pub fn handle(&mut self, dt: f32) -> u32 {
        if dt <= 0.0 || self.remaining == 0 {
            return 0;
        }

        self.timer -= dt;
        self.resolve_spawn_attempts()
    }

    /// Number of spawns that have not happened yet.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds until the next spawn is due.
    #[must_use]
    pub const fn timer(&self) -> f32 {
        self.timer
    }

    /// Reports whether every scheduled spawn already happened.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    fn resolve_spawn_attempts(&mut self) -> u32 {
        let mut attempts = 0;
        while self.timer <= 0.0 && self.remaining > 0 {
            self.remaining -= 1;
            attempts += 1;
            self.timer += self.interval;
        }
        attempts
    }
}
