use critter_defence_system_spawning::{Config, Spawning};

#[test]
fn first_spawn_waits_for_delay() {
    let mut spawning = Spawning::new(Config::new(3, 1.0, 2.0));

    assert_eq!(spawning.handle(1.5), 0, "delay not yet elapsed");
    assert_eq!(spawning.handle(0.5), 1, "delay elapsed exactly");
    assert_eq!(spawning.remaining(), 2);
}

#[test]
fn emits_multiple_spawns_for_large_dt() {
    let mut spawning = Spawning::new(Config::new(10, 0.5, 0.5));

    assert_eq!(spawning.handle(2.0), 4, "expected one spawn per interval");
    assert_eq!(spawning.remaining(), 6);
}

#[test]
fn stops_once_count_is_reached() {
    let mut spawning = Spawning::new(Config::new(2, 1.0, 0.0));

    assert_eq!(spawning.handle(10.0), 2);
    assert!(spawning.is_exhausted());
    assert_eq!(spawning.handle(10.0), 0, "exhausted schedules never spawn again");
}

#[test]
fn zero_dt_leaves_timer_untouched() {
    let mut spawning = Spawning::new(Config::new(2, 1.0, 0.75));
    let before = spawning.clone();

    assert_eq!(spawning.handle(0.0), 0);
    assert_eq!(spawning.handle(-1.0), 0);
    assert_eq!(spawning, before);
}

#[test]
fn spawns_follow_configured_cadence() {
    let mut spawning = Spawning::new(Config::new(3, 1.0, 0.25));
    let mut frames_with_spawns = Vec::new();

    for frame in 0..12 {
        if spawning.handle(0.25) > 0 {
            frames_with_spawns.push(frame);
        }
    }

    assert_eq!(frames_with_spawns, vec![0, 4, 8]);
}
