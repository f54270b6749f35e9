#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session-level state machine for Critter Defence.
//!
//! A session walks `Title → Intro → MainGame(Part1 → Part2 → Part3) → Exit`.
//! Exactly one [`GameState`] is active at a time. States never switch
//! themselves: `update` returns an optional [`StateRequest`] that the [`Game`]
//! controller applies before the frame ends.

mod campaign;
mod context;
mod main_game;
mod screens;

use critter_defence_core::{Campaign, Command, Event, LoadError, RenderSink, StateKind};
use critter_defence_world::World;
use log::{debug, info, warn};

pub use campaign::builtin_campaign;
pub use context::{Context, SessionConfig, SessionTotals};
pub use main_game::MainGameState;
pub use screens::{ExitState, IntroState, TitleState, SCREEN_CENTER};

/// Transition requested by the active state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateRequest {
    target: StateKind,
}

impl StateRequest {
    /// Requests a switch to the provided state.
    #[must_use]
    pub const fn new(target: StateKind) -> Self {
        Self { target }
    }

    /// State that should become active.
    #[must_use]
    pub const fn target(self) -> StateKind {
        self.target
    }
}

/// Closed set of states a session can be in.
#[derive(Debug)]
pub enum GameState {
    /// Title screen.
    Title(TitleState),
    /// Intro screen.
    Intro(IntroState),
    /// Gameplay in one of the parts.
    MainGame(MainGameState),
    /// Terminal exit screen.
    Exit(ExitState),
}

impl GameState {
    /// Constructs the state named by `kind` without entering it.
    #[must_use]
    pub fn new(kind: StateKind) -> Self {
        match kind {
            StateKind::Title => Self::Title(TitleState),
            StateKind::Intro => Self::Intro(IntroState::default()),
            StateKind::MainGame(part) => Self::MainGame(MainGameState::new(part)),
            StateKind::Exit => Self::Exit(ExitState::default()),
        }
    }

    /// Tag naming the state.
    #[must_use]
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Title(_) => StateKind::Title,
            Self::Intro(_) => StateKind::Intro,
            Self::MainGame(state) => StateKind::MainGame(state.part()),
            Self::Exit(_) => StateKind::Exit,
        }
    }

    /// Allocates everything the state owns.
    ///
    /// Only gameplay states can fail, when their level cannot be loaded.
    pub fn on_enter(&mut self, ctx: &mut Context) -> Result<(), LoadError> {
        match self {
            Self::Title(_) => Ok(()),
            Self::Intro(state) => {
                state.on_enter(ctx);
                Ok(())
            }
            Self::MainGame(state) => state.on_enter(ctx),
            Self::Exit(state) => {
                state.on_enter(ctx);
                Ok(())
            }
        }
    }

    /// Advances the state by `dt` seconds after handing it this frame's
    /// commands.
    pub fn update(
        &mut self,
        dt: f32,
        ctx: &mut Context,
        commands: &[Command],
    ) -> Option<StateRequest> {
        match self {
            Self::Title(state) => state.update(commands),
            Self::Intro(state) => state.update(dt, commands),
            Self::MainGame(state) => state.update(dt, ctx, commands),
            Self::Exit(state) => {
                state.update(dt);
                None
            }
        }
    }

    /// Submits every visible entity of the state to `sink`.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        match self {
            Self::Title(state) => state.render(sink),
            Self::Intro(state) => state.render(sink),
            Self::MainGame(state) => state.render(sink),
            Self::Exit(state) => state.render(sink),
        }
    }

    /// Releases everything the state owns.
    pub fn on_exit(&mut self, ctx: &mut Context) {
        if let Self::MainGame(state) = self {
            state.on_exit(ctx);
        }
    }

    /// Simulation hosted by a gameplay state.
    #[must_use]
    pub fn world(&self) -> Option<&World> {
        match self {
            Self::MainGame(state) => state.world(),
            _ => None,
        }
    }
}

/// Controller owning the session context and the active state.
#[derive(Debug)]
pub struct Game {
    state: GameState,
    context: Context,
}

impl Game {
    /// Starts a session on the title screen.
    #[must_use]
    pub fn new(config: SessionConfig, campaign: Campaign) -> Self {
        let mut context = Context::new(config, campaign);
        let state = Self::enter(StateKind::Title, &mut context);
        info!("session started with {} parts", context.campaign().parts.len());
        Self { state, context }
    }

    /// Runs one frame: the active state consumes `commands`, advances by `dt`
    /// and any requested transition is applied before returning.
    pub fn frame(&mut self, dt: f32, commands: &[Command]) {
        self.context.begin_frame(dt);
        if let Some(request) = self.state.update(dt, &mut self.context, commands) {
            self.transition(request);
        }
    }

    /// Moves the session to the exit screen regardless of the active state.
    pub fn request_exit(&mut self) {
        self.transition(StateRequest::new(StateKind::Exit));
    }

    /// Submits the active state's visible entities to `sink`.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        self.state.render(sink);
    }

    /// Active state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Tag of the active state.
    #[must_use]
    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Simulation of the part being played, if any.
    #[must_use]
    pub fn world(&self) -> Option<&World> {
        self.state.world()
    }

    /// Shared session context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Events reported during the most recent frame.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.context.events()
    }

    /// Reports whether the exit screen finished and the process may end.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(&self.state, GameState::Exit(exit) if exit.is_done())
    }

    /// Tears the session down and hands back its context.
    #[must_use]
    pub fn shutdown(mut self) -> Context {
        self.state.on_exit(&mut self.context);
        let totals = self.context.totals();
        info!(
            "session ended after {} frames: {} killed, {} leaked, {} parts completed",
            self.context.frame(),
            totals.killed,
            totals.leaked,
            totals.parts_completed
        );
        self.context
    }

    fn transition(&mut self, request: StateRequest) {
        let from = self.state.kind();
        if from == StateKind::Exit {
            debug!("ignoring request for {:?} after exit", request.target());
            return;
        }

        self.state.on_exit(&mut self.context);
        self.state = Self::enter(request.target(), &mut self.context);

        let to = self.state.kind();
        info!("state changed from {from:?} to {to:?}");
        self.context
            .events_mut()
            .push(Event::StateChanged { from, to });
    }

    fn enter(kind: StateKind, context: &mut Context) -> GameState {
        let mut state = GameState::new(kind);
        match state.on_enter(context) {
            Ok(()) => state,
            Err(error) => {
                warn!("failed to enter {kind:?}, returning to title: {error}");
                context.record_error(error);
                Self::enter(StateKind::Title, context)
            }
        }
    }
}
