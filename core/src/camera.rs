//! Visibility queries used to keep spawns off-screen.

use glam::Vec2;

/// Read-only view of the camera that frames the player.
pub trait CameraView {
    /// World position of the camera.
    fn position(&self) -> Vec2;

    /// Radius around [`CameraView::position`] that encloses the visible area.
    fn view_radius(&self) -> f32;

    /// Reports whether the world point currently lies inside the viewport.
    fn is_visible(&self, point: Vec2) -> bool;
}

/// Axis-aligned camera framing a rectangle around its centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthographicCamera {
    center: Vec2,
    half_extents: Vec2,
}

impl OrthographicCamera {
    /// Creates a camera centred on `center` showing `half_extents` in each direction.
    #[must_use]
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Moves the camera to a new centre.
    pub fn follow(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Half width and half height of the visible rectangle.
    #[must_use]
    pub const fn half_extents(&self) -> Vec2 {
        self.half_extents
    }
}

impl CameraView for OrthographicCamera {
    fn position(&self) -> Vec2 {
        self.center
    }

    fn view_radius(&self) -> f32 {
        self.half_extents.length()
    }

    fn is_visible(&self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extents.x && offset.y <= self.half_extents.y
    }
}
