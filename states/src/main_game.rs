//! Gameplay state hosting one part of the campaign.

use critter_defence_core::{Command, Event, LoadError, PartId, RenderSink, StateKind};
use critter_defence_world::{self as world, query, World};
use log::info;

use crate::{Context, StateRequest};

/// Gameplay state that owns the [`World`] of the part being played.
///
/// The world is built on entry and released on exit, so nothing survives from
/// one part to the next. [`Command::Pause`] freezes the world until it is sent
/// again. Tower commands, Quit and Back still work while paused.
#[derive(Debug)]
pub struct MainGameState {
    part: PartId,
    world: Option<World>,
    paused: bool,
    completed: bool,
}

impl MainGameState {
    pub(crate) const fn new(part: PartId) -> Self {
        Self {
            part,
            world: None,
            paused: false,
            completed: false,
        }
    }

    /// Part hosted by the state.
    #[must_use]
    pub const fn part(&self) -> PartId {
        self.part
    }

    /// Reports whether the world is frozen.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Simulation of the part, available once the state was entered.
    #[must_use]
    pub const fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub(crate) fn on_enter(&mut self, ctx: &Context) -> Result<(), LoadError> {
        let level = ctx.campaign().level(self.part)?;
        let seed = ctx.config().seed.wrapping_add(self.part.index() as u64);
        let world = World::with_seed(level, seed)?;
        info!(
            "entering {:?} on map '{}' with {} gold",
            self.part,
            query::map(&world).name(),
            query::gold(&world)
        );
        self.world = Some(world);
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        dt: f32,
        ctx: &mut Context,
        commands: &[Command],
    ) -> Option<StateRequest> {
        let world = self.world.as_mut()?;

        for command in commands {
            match command {
                Command::Quit => return Some(StateRequest::new(StateKind::Exit)),
                Command::Back => return Some(StateRequest::new(StateKind::Title)),
                Command::Advance => {}
                Command::Pause => {
                    self.paused = !self.paused;
                    info!(
                        "{:?} {}",
                        self.part,
                        if self.paused { "paused" } else { "resumed" }
                    );
                    ctx.events_mut().push(Event::PauseToggled {
                        paused: self.paused,
                    });
                }
                _ => world::apply(world, command.clone(), ctx.events_mut()),
            }
        }

        if self.paused {
            return None;
        }
        world.update(dt, ctx.events_mut());
        if !world.is_complete() {
            return None;
        }

        self.completed = true;
        info!("{:?} complete", self.part);
        ctx.events_mut().push(Event::PartCompleted { part: self.part });
        let next = self
            .part
            .next()
            .map_or(StateKind::Exit, StateKind::MainGame);
        Some(StateRequest::new(next))
    }

    pub(crate) fn render(&self, sink: &mut dyn RenderSink) {
        if let Some(world) = &self.world {
            world.render(sink);
        }
    }

    pub(crate) fn on_exit(&mut self, ctx: &mut Context) {
        if let Some(world) = self.world.take() {
            let totals = query::totals(&world);
            ctx.record_part(totals.killed, totals.leaked, self.completed);
        }
    }
}
