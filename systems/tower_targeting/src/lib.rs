#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from critter snapshots.

use std::cmp::Ordering;

use critter_defence_core::{CritterId, CritterSnapshot, CritterView, TargetingPolicy, Vector2D};

/// Reports whether `position` lies inside the circle of `range` around `origin`.
///
/// The boundary counts as inside.
#[must_use]
pub fn in_range(origin: Vector2D, range: f32, position: Vector2D) -> bool {
    range >= 0.0 && origin.distance_squared(position) <= range * range
}

/// Selects the critter a tower at `origin` should engage.
///
/// Only critters within `range` are considered. Among those the `policy`
/// decides, and exact ties always resolve to the lowest critter identifier,
/// which is the critter that spawned first. Returns `None` when nothing is in
/// range.
#[must_use]
pub fn select_target(
    policy: TargetingPolicy,
    origin: Vector2D,
    range: f32,
    critters: &CritterView,
) -> Option<CritterId> {
    let mut best: Option<BestCandidate> = None;

    for snapshot in critters.iter() {
        if !in_range(origin, range, snapshot.position) {
            continue;
        }

        let current = BestCandidate {
            score: score(policy, origin, snapshot),
            critter: snapshot.id,
        };

        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|candidate| candidate.critter)
}

/// Lower scores are preferred.
fn score(policy: TargetingPolicy, origin: Vector2D, snapshot: &CritterSnapshot) -> f32 {
    match policy {
        TargetingPolicy::Nearest => origin.distance_squared(snapshot.position),
        TargetingPolicy::Strongest => -snapshot.health,
        TargetingPolicy::Weakest => snapshot.health,
        TargetingPolicy::NearExit => -snapshot.distance_travelled,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    score: f32,
    critter: CritterId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        match self.score.total_cmp(&other.score) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.critter < other.critter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_defence_core::CritterKind;

    fn critter(id: u32, position: (f32, f32), health: f32, travelled: f32) -> CritterSnapshot {
        CritterSnapshot {
            id: CritterId::new(id),
            kind: CritterKind::Normal,
            position: Vector2D::new(position.0, position.1),
            health,
            max_health: 100.0,
            path_index: 0,
            progress: 0.0,
            distance_travelled: travelled,
        }
    }

    fn view(snapshots: Vec<CritterSnapshot>) -> CritterView {
        CritterView::from_snapshots(snapshots)
    }

    #[test]
    fn targets_critter_within_range() {
        let critters = view(vec![critter(2, (3.0, 4.0), 10.0, 0.0)]);
        let target = select_target(TargetingPolicy::Nearest, Vector2D::ZERO, 5.0, &critters);
        assert_eq!(target, Some(CritterId::new(2)), "boundary distance is in range");
    }

    #[test]
    fn critter_outside_range_is_ignored() {
        let critters = view(vec![critter(2, (30.0, 40.0), 10.0, 0.0)]);
        let target = select_target(TargetingPolicy::Nearest, Vector2D::ZERO, 5.0, &critters);
        assert_eq!(target, None);
    }

    #[test]
    fn nearest_prefers_minimum_distance() {
        let critters = view(vec![
            critter(1, (4.0, 0.0), 10.0, 0.0),
            critter(2, (0.0, 2.0), 10.0, 0.0),
        ]);
        let target = select_target(TargetingPolicy::Nearest, Vector2D::ZERO, 5.0, &critters);
        assert_eq!(target, Some(CritterId::new(2)));
    }

    #[test]
    fn smaller_critter_id_is_preferred_when_distances_match() {
        let critters = view(vec![
            critter(5, (3.0, 0.0), 10.0, 0.0),
            critter(3, (-3.0, 0.0), 10.0, 0.0),
        ]);
        let target = select_target(TargetingPolicy::Nearest, Vector2D::ZERO, 5.0, &critters);
        assert_eq!(target, Some(CritterId::new(3)));
    }

    #[test]
    fn strongest_and_weakest_compare_health() {
        let critters = view(vec![
            critter(1, (1.0, 0.0), 4.0, 0.0),
            critter(2, (2.0, 0.0), 9.0, 0.0),
            critter(3, (3.0, 0.0), 6.0, 0.0),
        ]);
        let origin = Vector2D::ZERO;
        assert_eq!(
            select_target(TargetingPolicy::Strongest, origin, 5.0, &critters),
            Some(CritterId::new(2))
        );
        assert_eq!(
            select_target(TargetingPolicy::Weakest, origin, 5.0, &critters),
            Some(CritterId::new(1))
        );
    }

    #[test]
    fn near_exit_prefers_furthest_travelled() {
        let critters = view(vec![
            critter(1, (1.0, 0.0), 4.0, 10.0),
            critter(2, (2.0, 0.0), 4.0, 40.0),
        ]);
        assert_eq!(
            select_target(TargetingPolicy::NearExit, Vector2D::ZERO, 5.0, &critters),
            Some(CritterId::new(2))
        );
    }

    #[test]
    fn negative_range_never_matches() {
        assert!(!in_range(Vector2D::ZERO, -1.0, Vector2D::ZERO));
        assert!(in_range(Vector2D::ZERO, 0.0, Vector2D::ZERO));
    }
}
