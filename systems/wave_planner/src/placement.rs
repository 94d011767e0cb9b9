//! Spawn position search that keeps new entities out of the viewport.
//!
//! The search is best effort: it walks outward along one random ray for a
//! fixed number of retries and then snaps the candidate onto the ray from the
//! camera, `view_radius + buffer` away from it. Pathological cameras whose
//! visible area is not enclosed by their view radius can still see the
//! result; the bounded retries keep the per-spawn cost constant.

use std::f32::consts::TAU;

use glam::Vec2;
use horde_core::CameraView;
use rand::Rng;

/// Number of outward steps tried before snapping.
pub const DEFAULT_RETRY_BUDGET: u32 = 8;

/// Tuning knobs for spawn placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementConfig {
    spawn_radius: f32,
    buffer: f32,
    retry_budget: u32,
    avoid_viewport: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            spawn_radius: 18.0,
            buffer: 2.0,
            retry_budget: DEFAULT_RETRY_BUDGET,
            avoid_viewport: true,
        }
    }
}

impl PlacementConfig {
    /// Creates a configuration with the provided radius and buffer increment.
    ///
    /// Negative or non-finite values clamp to zero.
    #[must_use]
    pub fn new(spawn_radius: f32, buffer: f32) -> Self {
        Self {
            spawn_radius: clamp_distance(spawn_radius),
            buffer: clamp_distance(buffer),
            ..Self::default()
        }
    }

    /// Replaces the retry budget.
    #[must_use]
    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Enables or disables viewport avoidance.
    #[must_use]
    pub fn avoid_viewport(mut self, avoid_viewport: bool) -> Self {
        self.avoid_viewport = avoid_viewport;
        self
    }

    /// Preferred distance between the origin and a spawn.
    #[must_use]
    pub const fn spawn_radius(&self) -> f32 {
        self.spawn_radius
    }

    /// Distance added per retry and kept between the view radius and a snapped spawn.
    #[must_use]
    pub const fn buffer(&self) -> f32 {
        self.buffer
    }

    /// Number of outward steps tried before snapping.
    #[must_use]
    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Reports whether spawns must avoid the viewport.
    #[must_use]
    pub const fn avoids_viewport(&self) -> bool {
        self.avoid_viewport
    }

    /// Builds a request centred on `origin` using the configured radius.
    #[must_use]
    pub const fn request(&self, origin: Vec2) -> PlacementRequest {
        PlacementRequest {
            origin,
            preferred_radius: self.spawn_radius,
            must_avoid_viewport: self.avoid_viewport,
        }
    }

    /// Resolves a spawn position for `request`.
    ///
    /// Avoidance is skipped when no camera is available.
    pub fn resolve<R>(
        &self,
        request: &PlacementRequest,
        camera: Option<&dyn CameraView>,
        rng: &mut R,
    ) -> PlacementResult
    where
        R: Rng + ?Sized,
    {
        let direction = random_direction(rng);
        let preferred = clamp_distance(request.preferred_radius);

        let camera = match camera {
            Some(camera) if request.must_avoid_viewport => camera,
            _ => {
                return PlacementResult {
                    point: request.origin + direction * preferred,
                    outcome: PlacementOutcome::Unconstrained,
                };
            }
        };

        let clearance = camera.view_radius() + self.buffer;
        let mut radius = preferred.max(clearance);
        let mut candidate = request.origin + direction * radius;
        let mut retries = 0;
        while camera.is_visible(candidate) && retries < self.retry_budget {
            radius += self.buffer;
            candidate = request.origin + direction * radius;
            retries += 1;
        }

        if !camera.is_visible(candidate) {
            return PlacementResult {
                point: candidate,
                outcome: PlacementOutcome::Clear { retries },
            };
        }

        let eye = camera.position();
        let outward = (candidate - eye).try_normalize().unwrap_or(direction);
        let point = eye + outward * clearance;
        tracing::trace!(
            x = point.x,
            y = point.y,
            retries,
            "placement budget exhausted, snapped outside view radius"
        );
        PlacementResult {
            point,
            outcome: PlacementOutcome::Snapped,
        }
    }
}

/// Input to a single placement search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementRequest {
    /// Point the spawn is placed around, normally the player.
    pub origin: Vec2,
    /// Preferred distance from the origin.
    pub preferred_radius: f32,
    /// Whether the result must lie outside the viewport.
    pub must_avoid_viewport: bool,
}

/// How a placement search concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementOutcome {
    /// No avoidance was requested or no camera was available.
    Unconstrained,
    /// The radial search found an off-screen point.
    Clear {
        /// Outward steps taken before the point cleared the viewport.
        retries: u32,
    },
    /// The retry budget ran out and the point was snapped along the camera ray.
    Snapped,
}

/// Position chosen for a spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementResult {
    /// Chosen world position.
    pub point: Vec2,
    /// How the search concluded.
    pub outcome: PlacementOutcome,
}

/// Uniformly distributed point inside the disc of `radius` around `center`.
pub fn scatter_in_disc<R>(center: Vec2, radius: f32, rng: &mut R) -> Vec2
where
    R: Rng + ?Sized,
{
    if radius.is_nan() || radius <= 0.0 {
        return center;
    }

    let direction = random_direction(rng);
    let distance = radius * rng.gen::<f32>().sqrt();
    center + direction * distance
}

fn random_direction<R>(rng: &mut R) -> Vec2
where
    R: Rng + ?Sized,
{
    let angle = rng.gen_range(0.0..TAU);
    Vec2::new(angle.cos(), angle.sin())
}

fn clamp_distance(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
