use critter_defence_core::{
    Campaign, CellCoord, Command, CritterKind, Event, LevelSpec, LoadError, MapSpec, PartId,
    RenderItem, SpriteKey, StateKind, TowerKind, WaveSpec,
};
use critter_defence_states::{builtin_campaign, Game, GameState, SessionConfig, SCREEN_CENTER};
use critter_defence_world::query;

const STEP: f32 = 1.0 / 60.0;

fn corridor_level(waves: Vec<WaveSpec>) -> LevelSpec {
    let map = MapSpec::open(10, 3, 32.0, CellCoord::new(0, 1), CellCoord::new(9, 1));
    LevelSpec::new(map, waves, 150)
}

fn empty_campaign() -> Campaign {
    Campaign::new(vec![
        corridor_level(Vec::new()),
        corridor_level(Vec::new()),
        corridor_level(Vec::new()),
    ])
}

fn config() -> SessionConfig {
    SessionConfig {
        intro_duration: 1.0,
        exit_duration: 0.5,
        frame_step: STEP,
        ..SessionConfig::default()
    }
}

fn enter_first_part(game: &mut Game) {
    game.frame(STEP, &[Command::Advance]);
    game.frame(STEP, &[Command::Advance]);
    assert_eq!(game.state_kind(), StateKind::MainGame(PartId::Part1));
}

#[test]
fn full_session_visits_every_state_in_order() {
    let mut game = Game::new(config(), empty_campaign());
    let mut visited = vec![game.state_kind()];

    game.frame(STEP, &[Command::Advance]);
    visited.push(game.state_kind());
    for _ in 0..200 {
        if game.is_finished() {
            break;
        }
        game.frame(STEP, &[]);
        visited.push(game.state_kind());
    }

    visited.dedup();
    assert_eq!(
        visited,
        vec![
            StateKind::Title,
            StateKind::Intro,
            StateKind::MainGame(PartId::Part1),
            StateKind::MainGame(PartId::Part2),
            StateKind::MainGame(PartId::Part3),
            StateKind::Exit,
        ]
    );
    assert!(game.is_finished());

    let context = game.shutdown();
    assert_eq!(context.totals().parts_completed, 3);
    assert!(context.last_error().is_none());
}

#[test]
fn intro_timer_starts_the_first_part() {
    let mut game = Game::new(config(), empty_campaign());
    game.frame(STEP, &[Command::Advance]);
    assert_eq!(game.state_kind(), StateKind::Intro);

    for _ in 0..59 {
        game.frame(STEP, &[]);
        assert_eq!(game.state_kind(), StateKind::Intro);
    }
    game.frame(STEP * 2.0, &[]);

    assert_eq!(game.state_kind(), StateKind::MainGame(PartId::Part1));
}

#[test]
fn one_live_critter_blocks_the_part_transition() {
    let wave = WaveSpec::new(CritterKind::Normal, 1, 1, 1.0);
    let campaign = Campaign::new(vec![
        corridor_level(vec![wave]),
        corridor_level(Vec::new()),
        corridor_level(Vec::new()),
    ]);
    let mut game = Game::new(config(), campaign);
    enter_first_part(&mut game);

    let mut frames = 0;
    let mut frames_with_live_critter = 0;
    while game.state_kind() == StateKind::MainGame(PartId::Part1) {
        let world = game.world().expect("gameplay state owns a world");
        if query::totals(world).alive == 1 {
            frames_with_live_critter += 1;
        }
        game.frame(STEP, &[]);
        frames += 1;
        assert!(frames < 1_000, "part never completed");
    }

    assert!(frames_with_live_critter > 300);
    assert_eq!(game.state_kind(), StateKind::MainGame(PartId::Part2));
    assert!(game
        .events()
        .contains(&Event::PartCompleted { part: PartId::Part1 }));
    assert!(game.events().contains(&Event::StateChanged {
        from: StateKind::MainGame(PartId::Part1),
        to: StateKind::MainGame(PartId::Part2),
    }));
}

#[test]
fn gameplay_commands_reach_the_world() {
    let wave = WaveSpec::new(CritterKind::Normal, 1, 5, 1.0);
    let campaign = Campaign::new(vec![
        corridor_level(vec![wave]),
        corridor_level(Vec::new()),
        corridor_level(Vec::new()),
    ]);
    let mut game = Game::new(config(), campaign);
    enter_first_part(&mut game);

    game.frame(
        STEP,
        &[Command::PlaceTower {
            kind: TowerKind::Standard,
            cell: CellCoord::new(2, 0),
        }],
    );

    assert!(game
        .events()
        .iter()
        .any(|event| matches!(event, Event::TowerPlaced { .. })));
    let world = game.world().expect("gameplay state owns a world");
    assert_eq!(query::gold(world), 125);
}

#[test]
fn pause_freezes_the_part_until_toggled_again() {
    let wave = WaveSpec::new(CritterKind::Normal, 1, 3, 0.5);
    let campaign = Campaign::new(vec![
        corridor_level(vec![wave]),
        corridor_level(Vec::new()),
        corridor_level(Vec::new()),
    ]);
    let mut game = Game::new(config(), campaign);
    enter_first_part(&mut game);
    for _ in 0..60 {
        game.frame(STEP, &[]);
    }

    game.frame(STEP, &[Command::Pause]);
    assert!(game.events().contains(&Event::PauseToggled { paused: true }));
    let world = game.world().expect("gameplay state owns a world");
    let frozen = query::critter_view(world).into_vec();
    let elapsed = query::elapsed(world);
    assert!(!frozen.is_empty());

    for _ in 0..120 {
        game.frame(STEP, &[]);
    }
    game.frame(
        STEP,
        &[Command::PlaceTower {
            kind: TowerKind::Standard,
            cell: CellCoord::new(2, 0),
        }],
    );

    let world = game.world().expect("gameplay state owns a world");
    assert_eq!(query::critter_view(world).into_vec(), frozen);
    assert_eq!(query::elapsed(world), elapsed);
    assert_eq!(query::gold(world), 125, "tower commands still apply");
    assert!(matches!(game.state(), GameState::MainGame(state) if state.is_paused()));

    game.frame(STEP, &[Command::Pause]);
    assert!(game.events().contains(&Event::PauseToggled { paused: false }));
    let world = game.world().expect("gameplay state owns a world");
    assert_ne!(query::critter_view(world).into_vec(), frozen);

    game.frame(STEP, &[Command::Pause]);
    game.frame(STEP, &[Command::Quit]);
    assert_eq!(game.state_kind(), StateKind::Exit);
}

#[test]
fn back_returns_to_title_and_discards_the_part() {
    let wave = WaveSpec::new(CritterKind::Normal, 1, 5, 1.0);
    let campaign = Campaign::new(vec![
        corridor_level(vec![wave]),
        corridor_level(Vec::new()),
        corridor_level(Vec::new()),
    ]);
    let mut game = Game::new(config(), campaign);
    enter_first_part(&mut game);
    game.frame(STEP, &[]);

    game.frame(STEP, &[Command::Back]);

    assert_eq!(game.state_kind(), StateKind::Title);
    assert!(game.world().is_none());
}

#[test]
fn quit_from_gameplay_ends_the_session() {
    let mut game = Game::new(config(), builtin_campaign());
    enter_first_part(&mut game);

    game.frame(STEP, &[Command::Quit]);
    assert_eq!(game.state_kind(), StateKind::Exit);

    game.frame(STEP, &[Command::Back]);
    assert_eq!(game.state_kind(), StateKind::Exit);
}

#[test]
fn broken_level_falls_back_to_title() {
    let mut broken = corridor_level(Vec::new());
    broken.map.start = None;
    let campaign = Campaign::new(vec![
        broken,
        corridor_level(Vec::new()),
        corridor_level(Vec::new()),
    ]);
    let mut game = Game::new(config(), campaign);

    game.frame(STEP, &[Command::Advance]);
    game.frame(STEP, &[Command::Advance]);

    assert_eq!(game.state_kind(), StateKind::Title);
    assert!(matches!(
        game.context().last_error(),
        Some(LoadError::MissingEndpoint(_))
    ));
}

#[test]
fn screens_render_a_backdrop() {
    let game = Game::new(config(), builtin_campaign());
    let mut items: Vec<RenderItem> = Vec::new();

    game.render(&mut items);

    assert_eq!(
        items,
        vec![RenderItem::new(
            SpriteKey::Screen(StateKind::Title),
            SCREEN_CENTER
        )]
    );
}
