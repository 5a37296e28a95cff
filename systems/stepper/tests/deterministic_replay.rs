use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use fieldsweep_core::{FrameSnapshot, SimConfig};
use fieldsweep_system_stepper::{Registry, Stepper, StrategySettings};
use glam::DVec2;

const TIME_STEP_S: f64 = 0.1;
const FRAMES: usize = 400;

#[test]
fn every_registered_strategy_replays_identically() {
    let registry = Registry::builtin();
    for key in registry.keys() {
        let first = replay(&registry, key);
        let second = replay(&registry, key);

        assert_eq!(first.len(), FRAMES);
        assert_eq!(first, second, "{key} replay diverged");
        assert_eq!(
            fingerprint(&first),
            fingerprint(&second),
            "{key} fingerprint diverged"
        );
    }
}

#[test]
fn strategies_trace_distinct_paths() {
    let registry = Registry::builtin();
    let fingerprints: Vec<u64> = registry
        .keys()
        .into_iter()
        .map(|key| fingerprint(&replay(&registry, key)))
        .collect();

    for (index, value) in fingerprints.iter().enumerate() {
        assert!(
            !fingerprints[index + 1..].contains(value),
            "two strategies produced the same trace"
        );
    }
}

#[test]
fn swapping_strategies_keeps_coverage_and_path() {
    let registry = Registry::builtin();
    let settings = StrategySettings::default();
    let mut stepper = Stepper::from_registry(&SimConfig::default(), &registry, "spiral", &settings)
        .expect("spiral is registered");

    for _ in 0..100 {
        let _ = stepper.step(TIME_STEP_S).expect("valid step");
    }
    let before = stepper.snapshot();

    let star = registry.create("star", &settings).expect("star is registered");
    stepper.swap_strategy(star);
    assert_eq!(stepper.strategy_name(), "Star Pattern");

    let after = stepper.step(TIME_STEP_S).expect("valid step");
    assert!(after.coverage_fraction >= before.coverage_fraction);
    assert_eq!(after.path_history[..before.path_history.len()], before.path_history[..]);
    assert_eq!(after.path_history.len(), before.path_history.len() + 1);
}

fn replay(registry: &Registry, key: &str) -> Vec<FrameSnapshot> {
    let mut stepper = Stepper::from_registry(
        &SimConfig::default(),
        registry,
        key,
        &StrategySettings::default(),
    )
    .expect("registered key");

    (0..FRAMES)
        .map(|_| stepper.step(TIME_STEP_S).expect("built-in strategies never fault"))
        .collect()
}

fn fingerprint(snapshots: &[FrameSnapshot]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for snapshot in snapshots {
        snapshot.frame.hash(&mut hasher);
        hash_point(snapshot.pose.position(), &mut hasher);
        snapshot.pose.heading().to_bits().hash(&mut hasher);
        snapshot.coverage_fraction.to_bits().hash(&mut hasher);
        snapshot.strategy_finished.hash(&mut hasher);
    }
    hasher.finish()
}

fn hash_point(point: DVec2, hasher: &mut DefaultHasher) {
    point.x.to_bits().hash(hasher);
    point.y.to_bits().hash(hasher);
}
