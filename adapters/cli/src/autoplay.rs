//! Scripted player used by headless sessions.

use critter_defence_core::{CellCoord, Command, StateKind, TargetingPolicy, Terrain, TowerKind};
use critter_defence_states::Game;
use critter_defence_world::{query, World};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seconds between two build decisions.
const DECISION_INTERVAL: f32 = 1.0;

/// Dismisses the title and intro screens and does nothing else.
pub(crate) fn advance_screens(game: &Game) -> Vec<Command> {
    match game.state_kind() {
        StateKind::Title | StateKind::Intro => vec![Command::Advance],
        StateKind::MainGame(_) | StateKind::Exit => Vec::new(),
    }
}

/// Seeded player that builds and upgrades towers next to the critter route and
/// installs every powerup it finds.
#[derive(Debug)]
pub(crate) struct Autoplayer {
    rng: ChaCha8Rng,
    cooldown: f32,
}

impl Autoplayer {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            cooldown: 0.0,
        }
    }

    /// Commands to deliver to the game this frame.
    pub(crate) fn commands(&mut self, dt: f32, game: &Game) -> Vec<Command> {
        let Some(world) = game.world() else {
            self.cooldown = 0.0;
            return advance_screens(game);
        };

        self.cooldown -= dt.max(0.0);
        if self.cooldown > 0.0 {
            return Vec::new();
        }
        self.cooldown = DECISION_INTERVAL;

        self.install(world)
            .or_else(|| self.build(world))
            .or_else(|| self.upgrade(world))
            .into_iter()
            .collect()
    }

    fn install(&mut self, world: &World) -> Option<Command> {
        let powerup = query::powerups(world).next()?.id();
        let towers = query::tower_view(world).into_vec();
        let tower = towers.choose(&mut self.rng)?.id;
        Some(Command::ApplyPowerup { powerup, tower })
    }

    fn build(&mut self, world: &World) -> Option<Command> {
        let gold = query::gold(world);
        let catalog = query::catalog(world);
        let affordable: Vec<TowerKind> = TowerKind::ALL
            .into_iter()
            .filter(|kind| catalog.stats(*kind).cost <= gold)
            .collect();
        let kind = *affordable.choose(&mut self.rng)?;

        let cell = *build_sites(world).choose(&mut self.rng)?;
        let command = Command::PlaceTower { kind, cell };
        Some(command)
    }

    fn upgrade(&mut self, world: &World) -> Option<Command> {
        let gold = query::gold(world);
        let towers = query::tower_view(world).into_vec();
        let snapshot = towers.choose(&mut self.rng)?;
        let tower = query::tower(world, snapshot.id)?;

        if tower.upgrade_cost()? <= gold {
            return Some(Command::UpgradeTower { tower: snapshot.id });
        }

        // Spend the idle decision on retargeting instead.
        let policy = *[
            TargetingPolicy::Nearest,
            TargetingPolicy::Strongest,
            TargetingPolicy::Weakest,
            TargetingPolicy::NearExit,
        ]
        .choose(&mut self.rng)?;
        self.rng.gen_bool(0.25).then_some(Command::SetTargeting {
            tower: snapshot.id,
            policy,
        })
    }
}

/// Free open cells that touch the critter route.
fn build_sites(world: &World) -> Vec<CellCoord> {
    let map = query::map(world);
    let occupied: Vec<CellCoord> = query::tower_view(world)
        .iter()
        .map(|tower| tower.cell)
        .collect();

    map.cells()
        .filter(|cell| cell.terrain() == Terrain::Open)
        .map(|cell| cell.coord())
        .filter(|coord| !occupied.contains(coord))
        .filter(|coord| map.path().iter().any(|step| step.is_adjacent(*coord)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_defence_states::{builtin_campaign, SessionConfig};

    fn session() -> Game {
        Game::new(SessionConfig::default(), builtin_campaign())
    }

    #[test]
    fn screens_are_dismissed() {
        let game = session();

        assert_eq!(advance_screens(&game), vec![Command::Advance]);
    }

    #[test]
    fn same_seed_builds_the_same_towers() {
        let mut first = session();
        let mut second = session();
        let mut left = Autoplayer::new(7);
        let mut right = Autoplayer::new(7);
        let dt = 1.0 / 60.0;

        for _ in 0..600 {
            let commands = left.commands(dt, &first);
            assert_eq!(commands, right.commands(dt, &second));
            first.frame(dt, &commands);
            second.frame(dt, &commands);
        }

        let towers = first
            .world()
            .map(|world| query::tower_view(world).into_vec())
            .unwrap_or_default();
        assert!(!towers.is_empty());
    }

    #[test]
    fn build_sites_touch_the_route() {
        let mut game = session();
        game.frame(0.1, &[Command::Advance]);
        game.frame(0.1, &[Command::Advance]);
        let world = game.world().expect("first part entered");

        let sites = build_sites(world);
        let path = query::map(world).path();

        assert!(!sites.is_empty());
        assert!(sites
            .iter()
            .all(|site| !path.contains(site) && path.iter().any(|step| step.is_adjacent(*site))));
    }
}
