//! End-to-end scene tests
//!
//! Drives a full scene through mode changes and hand tracking gaps the way
//! the render loop does.

use cybertree::layout::{self, ParticleKind};
use cybertree::{HandSignal, Mode, Scene, SceneConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

fn seeded_scene(seed: u64) -> Scene {
    Scene::new(&SceneConfig::default(), &mut StdRng::seed_from_u64(seed)).unwrap()
}

/// Default generation: 2500 particles spanning the full tree height
#[test]
fn test_default_tree_shape() {
    let mut rng = StdRng::seed_from_u64(2024);
    let tree = layout::generate(2500, &SceneConfig::default(), &mut rng).unwrap();
    assert_eq!(tree.len(), 2500);

    let heights: Vec<f32> = tree.iter().map(|p| p.assembled_position.y).collect();
    let top = heights.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let bottom = heights.iter().cloned().fold(f32::INFINITY, f32::min);
    assert_eq!(top, 9.0);
    assert!(bottom >= -9.0 && bottom < -8.9);
}

/// Same seed, same scene
#[test]
fn test_seeded_scenes_match() {
    let a = seeded_scene(5);
    let b = seeded_scene(5);
    for kind in ParticleKind::ALL {
        assert_eq!(a.group(kind).particles(), b.group(kind).particles());
        assert_eq!(a.group(kind).instances(), b.group(kind).instances());
    }
}

/// Exploding then reassembling returns every particle to the tree
#[test]
fn test_reassembles_after_explosion() {
    let mut scene = seeded_scene(11);

    scene.set_mode(Mode::Dispersed);
    for _ in 0..240 {
        scene.tick(DT, None).unwrap();
    }
    let group = scene.group(ParticleKind::Ornament);
    let moved = group
        .particles()
        .iter()
        .enumerate()
        .filter(|(i, p)| {
            group.current(*i).unwrap().position.distance(p.assembled_position) > 1.0
        })
        .count();
    assert!(moved > group.len() / 2);

    scene.set_mode(Mode::Assembled);
    for _ in 0..1000 {
        scene.tick(DT, None).unwrap();
    }
    for kind in ParticleKind::ALL {
        let group = scene.group(kind);
        for (i, particle) in group.particles().iter().enumerate() {
            let current = group.current(i).unwrap();
            assert!(
                current.position.distance(particle.assembled_position) < 1e-3,
                "{} particle {} did not settle",
                kind.name(),
                particle.id
            );
            assert!((current.scale - particle.base_scale).abs() < 1e-3);
        }
    }
}

/// Toggling mid-flight does not move anything on the toggle frame
#[test]
fn test_toggle_mid_flight_is_continuous() {
    let mut scene = seeded_scene(12);
    scene.toggle_mode();
    for _ in 0..15 {
        scene.tick(DT, None).unwrap();
    }
    let before: Vec<_> = scene
        .group(ParticleKind::Light)
        .instances()
        .iter()
        .map(|i| i.transform.w_axis)
        .collect();

    scene.toggle_mode();
    let after: Vec<_> = scene
        .group(ParticleKind::Light)
        .instances()
        .iter()
        .map(|i| i.transform.w_axis)
        .collect();
    assert_eq!(before, after);

    scene.tick(DT, None).unwrap();
    let group = scene.group(ParticleKind::Light);
    for (i, particle) in group.particles().iter().enumerate() {
        let previous = before[i].truncate();
        let now = group.current(i).unwrap().position;
        // One frame moves a thirtieth of the way back, never past the tree position
        assert!(now.distance(particle.assembled_position) < previous.distance(particle.assembled_position));
        assert!(now.distance(previous) <= previous.distance(particle.assembled_position) * 0.05);
    }
}

/// Losing the hand resumes idle spin from the hand-driven yaw
#[test]
fn test_hand_dropout_resumes_idle_spin() {
    let mut scene = seeded_scene(13);
    let hand = HandSignal {
        x: 0.8,
        y: -0.6,
        pinching: false,
    };
    for _ in 0..90 {
        scene.tick(DT, Some(hand)).unwrap();
    }
    assert!(!scene.orientation().orbit().enabled);
    let yaw = scene.orientation().yaw();
    assert!(yaw > 1.5);

    let mut last = yaw;
    for frame in 0..60 {
        scene.tick(DT, None).unwrap();
        let now = scene.orientation().yaw();
        assert!(
            (now - last - 0.1 * DT).abs() < 1e-5,
            "yaw jumped on idle frame {frame}"
        );
        last = now;
    }
    assert!(scene.orientation().orbit().enabled);
}

/// The topper follows the shared mode flag
#[test]
fn test_topper_tracks_mode() {
    let mut scene = seeded_scene(14);
    scene.set_mode(Mode::Dispersed);
    for _ in 0..600 {
        scene.tick(DT, None).unwrap();
    }
    assert!((scene.topper().position().y - 25.0).abs() < 0.05);

    scene.set_mode(Mode::Assembled);
    for _ in 0..600 {
        scene.tick(DT, None).unwrap();
    }
    assert!((scene.topper().position().y - 9.5).abs() < 0.05);
}
