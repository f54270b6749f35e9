use critter_defence_core::{
    CritterId, CritterKind, CritterSnapshot, CritterView, TargetingPolicy, Vector2D,
};
use critter_defence_system_tower_targeting::select_target;

fn snapshot(id: u32, x: f32, y: f32, health: f32) -> CritterSnapshot {
    CritterSnapshot {
        id: CritterId::new(id),
        kind: CritterKind::Fast,
        position: Vector2D::new(x, y),
        health,
        max_health: health,
        path_index: 0,
        progress: 0.0,
        distance_travelled: 0.0,
    }
}

const POLICIES: [TargetingPolicy; 4] = [
    TargetingPolicy::Nearest,
    TargetingPolicy::Strongest,
    TargetingPolicy::Weakest,
    TargetingPolicy::NearExit,
];

#[test]
fn selection_is_independent_of_snapshot_order() {
    let forward = vec![
        snapshot(7, 10.0, 0.0, 5.0),
        snapshot(3, 0.0, 10.0, 5.0),
        snapshot(5, -10.0, 0.0, 5.0),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let forward = CritterView::from_snapshots(forward);
    let reversed = CritterView::from_snapshots(reversed);

    for policy in POLICIES {
        let origin = Vector2D::ZERO;
        assert_eq!(
            select_target(policy, origin, 50.0, &forward),
            select_target(policy, origin, 50.0, &reversed),
            "{policy:?} depends on input order"
        );
        assert_eq!(
            select_target(policy, origin, 50.0, &forward),
            Some(CritterId::new(3)),
            "{policy:?} should fall back to the earliest spawn on ties"
        );
    }
}

#[test]
fn empty_view_produces_no_target_for_any_policy() {
    let critters = CritterView::default();
    for policy in POLICIES {
        assert_eq!(select_target(policy, Vector2D::ZERO, 100.0, &critters), None);
    }
}

#[test]
fn range_filter_applies_before_policy() {
    let critters = CritterView::from_snapshots(vec![
        snapshot(1, 2.0, 0.0, 1.0),
        snapshot(2, 200.0, 0.0, 999.0),
    ]);
    assert_eq!(
        select_target(TargetingPolicy::Strongest, Vector2D::ZERO, 5.0, &critters),
        Some(CritterId::new(1)),
        "strong critter out of range must be ignored"
    );
}
