use glam::Vec2;
use horde_core::{CameraView, OrthographicCamera};
use horde_system_wave_planner::{PlacementConfig, PlacementOutcome, PlacementRequest};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

struct EverythingVisible {
    eye: Vec2,
}

impl CameraView for EverythingVisible {
    fn position(&self) -> Vec2 {
        self.eye
    }

    fn view_radius(&self) -> f32 {
        10.0
    }

    fn is_visible(&self, _point: Vec2) -> bool {
        true
    }
}

#[test]
fn spawn_outside_default_viewport_needs_no_retries() {
    let config = PlacementConfig::default();
    let player = Vec2::new(-7.0, 3.0);
    let camera = OrthographicCamera::new(player, Vec2::new(10.0, 6.0));
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for _ in 0..100 {
        let result = config.resolve(&config.request(player), Some(&camera), &mut rng);
        assert_eq!(result.outcome, PlacementOutcome::Clear { retries: 0 });
        assert!(!camera.is_visible(result.point));
        assert!((result.point.distance(player) - 18.0).abs() < 1e-3);
    }
}

#[test]
fn radius_grows_to_clear_a_large_viewport() {
    let config = PlacementConfig::new(5.0, 2.0);
    let player = Vec2::ZERO;
    let camera = OrthographicCamera::new(player, Vec2::new(30.0, 40.0));
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let result = config.resolve(&config.request(player), Some(&camera), &mut rng);
    assert!(!camera.is_visible(result.point));
    assert!(result.point.length() >= camera.view_radius() + config.buffer() - 1e-3);
}

#[test]
fn exhausted_budget_snaps_along_camera_ray() {
    let config = PlacementConfig::new(18.0, 2.0).with_retry_budget(3);
    let camera = EverythingVisible {
        eye: Vec2::new(4.0, 4.0),
    };
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    let result = config.resolve(&config.request(Vec2::ZERO), Some(&camera), &mut rng);
    assert_eq!(result.outcome, PlacementOutcome::Snapped);
    assert!((result.point.distance(camera.eye) - 12.0).abs() < 1e-3);
}

#[test]
fn missing_camera_skips_avoidance() {
    let config = PlacementConfig::default();
    let request = PlacementRequest {
        origin: Vec2::new(1.0, 1.0),
        preferred_radius: 6.0,
        must_avoid_viewport: true,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let result = config.resolve(&request, None, &mut rng);
    assert_eq!(result.outcome, PlacementOutcome::Unconstrained);
    assert!((result.point.distance(request.origin) - 6.0).abs() < 1e-3);
}

#[test]
fn placements_never_land_inside_the_viewport() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for _ in 0..300 {
        let player = Vec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        let camera_offset = Vec2::new(rng.gen_range(-15.0..15.0), rng.gen_range(-15.0..15.0));
        let camera = OrthographicCamera::new(
            player + camera_offset,
            Vec2::new(rng.gen_range(1.0..25.0), rng.gen_range(1.0..25.0)),
        );
        let config = PlacementConfig::new(rng.gen_range(0.0..30.0), rng.gen_range(0.5..4.0))
            .with_retry_budget(rng.gen_range(0..10));

        let result = config.resolve(&config.request(player), Some(&camera), &mut rng);
        assert_ne!(result.outcome, PlacementOutcome::Unconstrained);
        assert!(
            !camera.is_visible(result.point),
            "{:?} visible for {:?}",
            result,
            camera
        );
        if result.outcome == PlacementOutcome::Snapped {
            let expected = camera.view_radius() + config.buffer();
            assert!((result.point.distance(camera.position()) - expected).abs() < 1e-3);
        }
    }
}
