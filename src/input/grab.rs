//! Pointer grabbers: frames that claim the cursor when hovered.
//!
//! A [`PointerGrabber`] is queried on every pointer move; when one
//! claims the position, frame-targeted gestures act on its frame
//! instead of the controller's interactive frame. The pool lives
//! inside the [`InteractionController`](super::InteractionController),
//! so dropping the controller drops its grabbers with it.

use crate::camera::Camera;
use crate::frame::{FrameArena, FrameId};

/// Something on screen that can claim the pointer.
pub trait PointerGrabber {
    /// Whether this grabber claims the pointer at pixel `(x, y)`.
    fn grabs_pointer(
        &self,
        x: f32,
        y: f32,
        camera: &Camera,
        arena: &FrameArena,
    ) -> bool;

    /// The frame manipulated while this grabber holds the pointer.
    fn frame(&self) -> FrameId;
}

/// Grabber claiming the pointer within a pixel radius of its frame's
/// projected origin. Covers the common handle/hotspot case.
#[derive(Debug, Clone, Copy)]
pub struct HotspotGrabber {
    frame: FrameId,
    radius_px: f32,
}

impl HotspotGrabber {
    /// Hotspot on `frame` with the given pick radius in pixels.
    #[must_use]
    pub fn new(frame: FrameId, radius_px: f32) -> Self {
        Self { frame, radius_px }
    }
}

impl PointerGrabber for HotspotGrabber {
    fn grabs_pointer(
        &self,
        x: f32,
        y: f32,
        camera: &Camera,
        arena: &FrameArena,
    ) -> bool {
        if !arena.contains(self.frame) {
            return false;
        }
        let projected =
            camera.projected_coordinates_of(arena, arena.position(self.frame));
        // Behind the camera never grabs.
        if projected.z > 1.0 || projected.z < 0.0 {
            return false;
        }
        let dx = projected.x - x;
        let dy = projected.y - y;
        (dx * dx + dy * dy).sqrt() <= self.radius_px
    }

    fn frame(&self) -> FrameId {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::frame::Frame;

    #[test]
    fn hotspot_grabs_near_its_projection() {
        let mut arena = FrameArena::new();
        let mut camera = Camera::new(&mut arena);
        camera.set_screen_width_height(400, 400);
        arena.set_position(camera.frame(), Vec3::new(0.0, 0.0, 10.0));

        let target = arena.insert(Frame::new());
        let grabber = HotspotGrabber::new(target, 15.0);

        // The origin projects to the viewport center.
        assert!(grabber.grabs_pointer(200.0, 200.0, &camera, &arena));
        assert!(grabber.grabs_pointer(210.0, 205.0, &camera, &arena));
        assert!(!grabber.grabs_pointer(300.0, 200.0, &camera, &arena));
    }

    #[test]
    fn removed_frame_never_grabs() {
        let mut arena = FrameArena::new();
        let mut camera = Camera::new(&mut arena);
        camera.set_screen_width_height(400, 400);
        arena.set_position(camera.frame(), Vec3::new(0.0, 0.0, 10.0));

        let target = arena.insert(Frame::new());
        let grabber = HotspotGrabber::new(target, 15.0);
        let _ = arena.remove(target);
        assert!(!grabber.grabs_pointer(200.0, 200.0, &camera, &arena));
    }
}
