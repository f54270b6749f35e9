//! Session-wide context shared by every game state.

use critter_defence_core::{Campaign, Event, LoadError};

/// Tunables of a play session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Seconds the intro screen stays up before the first part starts.
    pub intro_duration: f32,
    /// Seconds the exit screen stays up before the session finishes.
    pub exit_duration: f32,
    /// Frame step in seconds used by fixed-rate drivers.
    pub frame_step: f32,
    /// Seed of the powerup drops. Each part offsets it by its index.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            intro_duration: 4.0,
            exit_duration: 0.5,
            frame_step: 1.0 / 60.0,
            seed: 0,
        }
    }
}

/// Running score of the session across parts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionTotals {
    /// Critters killed in every part played so far.
    pub killed: u32,
    /// Critters that leaked in every part played so far.
    pub leaked: u32,
    /// Parts whose waves were fully resolved.
    pub parts_completed: u32,
}

/// Explicitly owned session context handed to game states by reference.
///
/// Created when the [`Game`](crate::Game) starts and returned by
/// [`Game::shutdown`](crate::Game::shutdown).
#[derive(Debug)]
pub struct Context {
    config: SessionConfig,
    campaign: Campaign,
    frame: u64,
    elapsed: f64,
    events: Vec<Event>,
    last_error: Option<LoadError>,
    totals: SessionTotals,
}

impl Context {
    /// Creates a context for a fresh session.
    #[must_use]
    pub fn new(config: SessionConfig, campaign: Campaign) -> Self {
        Self {
            config,
            campaign,
            frame: 0,
            elapsed: 0.0,
            events: Vec::new(),
            last_error: None,
            totals: SessionTotals::default(),
        }
    }

    /// Session tunables.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Levels played by the gameplay parts.
    #[must_use]
    pub const fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Number of frames run so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds of session time accumulated from frame deltas.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Events reported during the most recent frame.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Most recent error that prevented a state from being entered.
    #[must_use]
    pub const fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Score accumulated over the session.
    #[must_use]
    pub const fn totals(&self) -> SessionTotals {
        self.totals
    }

    pub(crate) fn begin_frame(&mut self, dt: f32) {
        self.events.clear();
        self.frame += 1;
        if dt > 0.0 {
            self.elapsed += f64::from(dt);
        }
    }

    pub(crate) fn events_mut(&mut self) -> &mut Vec<Event> {
        &mut self.events
    }

    pub(crate) fn record_error(&mut self, error: LoadError) {
        self.last_error = Some(error);
    }

    pub(crate) fn record_part(&mut self, killed: u32, leaked: u32, completed: bool) {
        self.totals.killed += killed;
        self.totals.leaked += leaked;
        if completed {
            self.totals.parts_completed += 1;
        }
    }
}
