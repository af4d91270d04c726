//! End-to-end tests of the public simulation API.

use flowswarm::external::frame_file_name;
use flowswarm::prelude::*;
use flowswarm::FlowError;
use std::fs;

fn calm_pool(bounds: UVec3, fields: usize, switch_every: u32) -> FieldPool {
    let params = FieldParams::new().with_gain(0.0);
    let fields = (0..fields)
        .map(|_| {
            VelocityField::new(
                NoiseGrid::filled(bounds, 0.9),
                NoiseGrid::filled(bounds, -0.4),
                NoiseGrid::filled(bounds, 0.1),
                params,
            )
            .unwrap()
        })
        .collect();
    FieldPool::new(fields, switch_every).unwrap()
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_zero_gain_scenario() {
    let bounds = UVec3::splat(8);
    let config = SimConfig::new().with_frames(5).with_bounds(bounds);
    let mut sim = Simulation::new(config)
        .with_pool(calm_pool(bounds, 1, 10))
        .with_insects(vec![Insect::new("0", Vec3::ZERO, bounds)]);

    let mut count = 0;
    sim.run(|frame| -> Result<(), FlowError> {
        assert!(frame.occupancy.is_occupied(UVec3::ZERO));
        assert_eq!(frame.occupancy.count(), 1);
        count += 1;
        Ok(())
    })
    .unwrap();

    assert_eq!(count, 5);
    assert_eq!(sim.insects()[0].position(), Vec3::ZERO);
}

#[test]
fn test_rotation_over_35_frames() {
    let bounds = UVec3::splat(4);
    let config = SimConfig::new().with_frames(35).with_bounds(bounds);
    let mut sim = Simulation::new(config).with_pool(calm_pool(bounds, 3, 10));

    let mut indices = Vec::new();
    while let Some(frame) = sim.step() {
        indices.push(frame.field_index);
    }

    assert_eq!(indices.len(), 35);
    assert!(indices[..10].iter().all(|&i| i == 0));
    assert!(indices[10..20].iter().all(|&i| i == 1));
    assert!(indices[20..30].iter().all(|&i| i == 2));
    assert!(indices[30..].iter().all(|&i| i == 0));
}

// ============================================================================
// Full Runs
// ============================================================================

#[test]
fn test_perlin_run_keeps_invariants() {
    let config = SimConfig::new()
        .with_frames(60)
        .with_bounds(UVec3::new(24, 20, 16))
        .with_noise_resolution(UVec3::new(3, 2, 2))
        .with_field_pool(3, 8)
        .with_bugs(40)
        .with_seed(2024);
    let mut sim = Simulation::from_config(config).unwrap();
    assert_eq!(sim.insects().len(), 40);

    let mut last = None;
    while let Some(frame) = sim.step() {
        if let Some(prev) = last {
            assert_eq!(frame.index, prev + 1);
        }
        last = Some(frame.index);
        assert!(frame.occupancy.count() >= 1 && frame.occupancy.count() <= 40);
        assert!(sim.insects().iter().all(|b| b.in_bounds()));
    }
    assert_eq!(last, Some(59));
}

#[test]
fn test_uniform_noise_run() {
    let config = SimConfig::new()
        .with_frames(20)
        .with_bounds(UVec3::splat(10))
        .with_noise_resolution(UVec3::splat(2))
        .with_noise_kind(NoiseKind::Uniform)
        .with_bugs(15)
        .with_seed(8);
    let mut sim = Simulation::from_config(config).unwrap();
    let produced = sim.run(|_| -> Result<(), FlowError> { Ok(()) }).unwrap();
    assert_eq!(produced, 20);
    assert!(sim.insects().iter().all(|b| b.in_bounds()));
}

#[test]
fn test_frames_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimConfig::new()
        .with_frames(12)
        .with_bounds(UVec3::splat(8))
        .with_noise_resolution(UVec3::splat(2))
        .with_bugs(3)
        .with_seed(5);
    let total = config.effective_frames();
    let mut sim = Simulation::from_config(config).unwrap();

    sim.run(|frame| fs::write(dir.path().join(frame_file_name(frame.index, total)), frame.occupancy.to_text()))
        .unwrap();

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names.len(), 12);
    assert_eq!(names[0], "frame-00.txt");
    assert_eq!(names[11], "frame-11.txt");

    let first = fs::read_to_string(dir.path().join("frame-00.txt")).unwrap();
    let lines = first.lines().count();
    assert!((1..=3).contains(&lines));
    for line in first.lines() {
        let coords: Vec<u32> = line.split(' ').map(|v| v.parse().unwrap()).collect();
        assert_eq!(coords.len(), 3);
        assert!(coords.iter().all(|&c| c < 8));
    }
}

#[test]
fn test_config_file_round_trip_drives_same_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    let config = SimConfig::new()
        .with_frames(6)
        .with_bounds(UVec3::splat(12))
        .with_noise_resolution(UVec3::splat(3))
        .with_bugs(4)
        .with_seed(77);
    config.save(&path).unwrap();
    let loaded = SimConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let mut a = Simulation::from_config(config).unwrap();
    let mut b = Simulation::from_config(loaded).unwrap();
    while let (Some(fa), Some(fb)) = (a.step(), b.step()) {
        assert_eq!(fa.occupancy.occupied(), fb.occupancy.occupied());
    }
}
