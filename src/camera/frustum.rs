//! View frustum extraction and containment tests.
//!
//! Extracts the six frustum planes from a composed view-projection
//! matrix and provides intersection tests for points and spheres.

use glam::{Mat4, Vec3, Vec4};

/// A plane in 3D space, represented as (normal.x, normal.y, normal.z,
/// distance) where the plane equation is `ax + by + cz + d = 0`.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Unit normal pointing into the positive half-space.
    pub normal: Vec3,
    /// Signed distance from origin (`n · p + d = 0`).
    pub distance: f32,
}

impl Plane {
    /// Create a plane from coefficients and normalize it.
    #[must_use]
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Self {
        let len = (a * a + b * b + c * c).sqrt();
        if len > 0.0 {
            Self {
                normal: Vec3::new(a / len, b / len, c / len),
                distance: d / len,
            }
        } else {
            Self {
                normal: Vec3::ZERO,
                distance: 0.0,
            }
        }
    }

    /// Signed distance from point to plane (positive = in front,
    /// negative = behind).
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// The raw `(a, b, c, d)` coefficients.
    #[must_use]
    pub fn coefficients(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.distance]
    }
}

/// View frustum consisting of 6 planes: left, right, bottom, top,
/// near, far. Planes point inward (positive half-space is inside).
#[derive(Debug, Clone)]
pub struct Frustum {
    /// Six clipping planes: left, right, bottom, top, near, far.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    /// Uses the Gribb/Hartmann method for plane extraction, for a
    /// right-handed system with [0,1] depth range.
    #[must_use]
    pub fn from_view_projection(vp: Mat4) -> Self {
        // Get matrix rows (glam stores column-major, so we transpose
        // conceptually)
        let row0 =
            Vec4::new(vp.x_axis.x, vp.y_axis.x, vp.z_axis.x, vp.w_axis.x);
        let row1 =
            Vec4::new(vp.x_axis.y, vp.y_axis.y, vp.z_axis.y, vp.w_axis.y);
        let row2 =
            Vec4::new(vp.x_axis.z, vp.y_axis.z, vp.z_axis.z, vp.w_axis.z);
        let row3 =
            Vec4::new(vp.x_axis.w, vp.y_axis.w, vp.z_axis.w, vp.w_axis.w);

        let left = row3 + row0;
        let right = row3 - row0;
        let bottom = row3 + row1;
        let top = row3 - row1;
        let near = row2; // [0,1] depth: near plane is just row2
        let far = row3 - row2;

        Self {
            planes: [
                Plane::from_coefficients(left.x, left.y, left.z, left.w),
                Plane::from_coefficients(right.x, right.y, right.z, right.w),
                Plane::from_coefficients(
                    bottom.x, bottom.y, bottom.z, bottom.w,
                ),
                Plane::from_coefficients(top.x, top.y, top.z, top.w),
                Plane::from_coefficients(near.x, near.y, near.z, near.w),
                Plane::from_coefficients(far.x, far.y, far.z, far.w),
            ],
        }
    }

    /// The six plane equations as raw coefficient rows.
    #[must_use]
    pub fn coefficients(&self) -> [[f32; 4]; 6] {
        [
            self.planes[0].coefficients(),
            self.planes[1].coefficients(),
            self.planes[2].coefficients(),
            self.planes[3].coefficients(),
            self.planes[4].coefficients(),
            self.planes[5].coefficients(),
        ]
    }

    /// Test if a point is inside the frustum.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(point) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Test if a sphere intersects or is inside the frustum.
    #[inline]
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(center) < -radius {
                return false;
            }
        }
        true
    }

    /// Test if a sphere is completely inside the frustum (not just
    /// intersecting).
    #[inline]
    #[must_use]
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(center) < radius {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, ProjectionKind};
    use crate::frame::FrameArena;

    fn camera_at(z: f32, radius: f32) -> (FrameArena, Camera) {
        let mut arena = FrameArena::new();
        let mut camera = Camera::new(&mut arena);
        camera.set_screen_width_height(400, 400);
        camera.set_scene_bounds(Vec3::ZERO, radius).unwrap();
        arena.set_position(camera.frame(), Vec3::new(0.0, 0.0, z));
        (arena, camera)
    }

    #[test]
    fn camera_frustum_contains_the_scene_center() {
        let (arena, camera) = camera_at(10.0, 2.0);
        let frustum = camera.frustum(&arena);

        assert!(frustum.contains_point(Vec3::ZERO));
        // Behind the camera is outside.
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 20.0)));
        // Way off the view axis is outside.
        assert!(!frustum.contains_point(Vec3::new(50.0, 0.0, 0.0)));
    }

    #[test]
    fn camera_frustum_sphere_tests_track_the_scene_sphere() {
        let (arena, camera) = camera_at(10.0, 2.0);
        let frustum = camera.frustum(&arena);

        // The adaptive clipping planes are fit to the scene sphere, so
        // it sits fully inside.
        assert!(frustum.contains_sphere(Vec3::ZERO, 2.0));
        assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 50.0), 1.0));

        // A sphere straddling the near plane intersects without being
        // contained.
        let near_center = Vec3::new(0.0, 0.0, 10.0 - camera.z_near(&arena));
        assert!(frustum.intersects_sphere(near_center, 1.0));
        assert!(!frustum.contains_sphere(near_center, 1.0));
    }

    #[test]
    fn orthographic_frustum_is_a_box_around_the_view_axis() {
        let (arena, mut camera) = camera_at(10.0, 2.0);
        camera.set_projection_kind(ProjectionKind::Orthographic);
        let frustum = camera.frustum(&arena);
        let (half_w, half_h) = camera.ortho_width_height(&arena);

        assert!(frustum.contains_point(Vec3::ZERO));
        assert!(!frustum.contains_point(Vec3::new(half_w + 0.5, 0.0, 0.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, half_h + 0.5, 0.0)));
    }

    #[test]
    fn coefficient_export_matches_planes() {
        let proj = Mat4::perspective_rh(60.0_f32.to_radians(), 1.5, 0.1, 50.0);
        let frustum = Frustum::from_view_projection(proj);
        let coeffs = frustum.coefficients();
        for (plane, row) in frustum.planes.iter().zip(coeffs.iter()) {
            assert_eq!(plane.normal.x, row[0]);
            assert_eq!(plane.distance, row[3]);
        }
    }
}
