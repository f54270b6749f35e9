//! Non-gameplay screens: title, intro and exit.

use critter_defence_core::{
    Command, PartId, RenderItem, RenderSink, SpriteKey, StateKind, Vector2D,
};

use crate::{Context, StateRequest};

/// Pixel centre of the 640x480 board where full screen backdrops are drawn.
pub const SCREEN_CENTER: Vector2D = Vector2D::new(320.0, 240.0);

const FIRST_PART: StateKind = StateKind::MainGame(PartId::Part1);

fn draw_screen(kind: StateKind, sink: &mut dyn RenderSink) {
    sink.render(RenderItem::new(SpriteKey::Screen(kind), SCREEN_CENTER));
}

/// Title screen waiting for the player to start or quit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TitleState;

impl TitleState {
    pub(crate) fn update(&mut self, commands: &[Command]) -> Option<StateRequest> {
        commands.iter().find_map(|command| match command {
            Command::Advance => Some(StateRequest::new(StateKind::Intro)),
            Command::Quit => Some(StateRequest::new(StateKind::Exit)),
            _ => None,
        })
    }

    pub(crate) fn render(&self, sink: &mut dyn RenderSink) {
        draw_screen(StateKind::Title, sink);
    }
}

/// Intro screen that moves on to the first part when dismissed or timed out.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntroState {
    remaining: f32,
}

impl IntroState {
    /// Seconds left before the intro dismisses itself.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    pub(crate) fn on_enter(&mut self, ctx: &Context) {
        self.remaining = ctx.config().intro_duration;
    }

    pub(crate) fn update(&mut self, dt: f32, commands: &[Command]) -> Option<StateRequest> {
        let requested = commands.iter().find_map(|command| match command {
            Command::Advance => Some(StateRequest::new(FIRST_PART)),
            Command::Quit => Some(StateRequest::new(StateKind::Exit)),
            _ => None,
        });
        if requested.is_some() {
            return requested;
        }

        if dt > 0.0 {
            self.remaining -= dt;
        }
        (self.remaining <= 0.0).then(|| StateRequest::new(FIRST_PART))
    }

    pub(crate) fn render(&self, sink: &mut dyn RenderSink) {
        draw_screen(StateKind::Intro, sink);
    }
}

/// Terminal screen shown while the session winds down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExitState {
    remaining: f32,
}

impl ExitState {
    /// Reports whether the exit timer ran out.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.remaining <= 0.0
    }

    pub(crate) fn on_enter(&mut self, ctx: &Context) {
        self.remaining = ctx.config().exit_duration;
    }

    pub(crate) fn update(&mut self, dt: f32) {
        if dt > 0.0 {
            self.remaining -= dt;
        }
    }

    pub(crate) fn render(&self, sink: &mut dyn RenderSink) {
        draw_screen(StateKind::Exit, sink);
    }
}
