//! Core camera type.
//!
//! A [`Camera`] owns one frame in the [`FrameArena`] (the "camera
//! frame") and adds intrinsic optical parameters on top of it:
//! projection kind, field of view, scene bounds, adaptive clipping
//! coefficients. Matrices use the right-handed, [0,1]-depth
//! convention throughout.
//!
//! Cached matrices are valid only immediately after
//! [`Camera::compute_projection_matrix`] /
//! [`Camera::compute_view_matrix`]: recompute after all mutations for
//! the current tick, before anything reads them.

use glam::{Mat4, Vec3, Vec4};

use super::frustum::Frustum;
use crate::error::ViewError;
use crate::frame::{Frame, FrameArena, FrameId};
use crate::math::Quaternion;
use crate::options::CameraOptions;

/// Projection model. Gates every matrix/fitting formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionKind {
    /// Perspective projection from the vertical field of view.
    #[default]
    Perspective,
    /// Orthographic projection; "zoom" narrows the frustum with the
    /// camera's distance to the pivot point instead of translating.
    Orthographic,
}

/// An axis-aligned rectangle in screen pixels (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRegion {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl ScreenRegion {
    /// Rectangle spanning two corner points in any order.
    #[must_use]
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        let x = a.0.min(b.0);
        let y = a.1.min(b.1);
        Self {
            x,
            y,
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A camera: one frame in the arena plus optical parameters.
#[derive(Debug)]
pub struct Camera {
    frame: FrameId,
    projection: ProjectionKind,
    /// Vertical field of view in radians.
    field_of_view: f32,
    scene_center: Vec3,
    scene_radius: f32,
    pivot_point: Vec3,
    z_near_coefficient: f32,
    z_clipping_coefficient: f32,
    /// Orthographic frustum scale; re-derived from the field of view
    /// when switching projection kinds so framing is preserved.
    ortho_coef: f32,
    screen_width: u32,
    screen_height: u32,
    projection_matrix: Mat4,
    view_matrix: Mat4,
}

impl Camera {
    /// Create a camera whose frame is inserted into `arena`, placed on
    /// the +Z axis looking at the origin.
    pub fn new(arena: &mut FrameArena) -> Self {
        let field_of_view = std::f32::consts::FRAC_PI_4;
        let frame = arena.insert(Frame::from_translation_rotation(
            Vec3::new(0.0, 0.0, 1.0),
            Quaternion::IDENTITY,
        ));
        Self {
            frame,
            projection: ProjectionKind::Perspective,
            field_of_view,
            scene_center: Vec3::ZERO,
            scene_radius: 1.0,
            pivot_point: Vec3::ZERO,
            z_near_coefficient: 0.005,
            z_clipping_coefficient: 3.0_f32.sqrt(),
            ortho_coef: (field_of_view / 2.0).tan(),
            screen_width: 800,
            screen_height: 600,
            projection_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
        }
    }

    // ── Parameters ─────────────────────────────────────────────────

    /// The camera frame's id in the arena.
    #[must_use]
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Current projection kind.
    #[must_use]
    pub fn projection_kind(&self) -> ProjectionKind {
        self.projection
    }

    /// Switch projection kind. Moving from perspective to orthographic
    /// re-derives the orthographic scale from the field of view at the
    /// moment of the switch, so apparent framing near the pivot point
    /// is preserved.
    pub fn set_projection_kind(&mut self, kind: ProjectionKind) {
        if kind == ProjectionKind::Orthographic
            && self.projection == ProjectionKind::Perspective
        {
            self.ortho_coef = (self.field_of_view / 2.0).tan();
        }
        self.projection = kind;
    }

    /// Vertical field of view in radians.
    #[must_use]
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Set the vertical field of view in radians.
    pub fn set_field_of_view(&mut self, fov: f32) {
        self.field_of_view = fov;
    }

    /// Horizontal field of view in radians (from the vertical one and
    /// the aspect ratio).
    #[must_use]
    pub fn horizontal_field_of_view(&self) -> f32 {
        2.0 * ((self.field_of_view / 2.0).tan() * self.aspect_ratio()).atan()
    }

    /// Set the field of view so the whole scene sphere is visible from
    /// the current position.
    pub fn set_fov_to_fit_scene(&mut self, arena: &FrameArena) {
        let distance = self.distance_to_scene_center(arena);
        if distance > self.scene_radius {
            self.field_of_view =
                2.0 * (self.scene_radius / distance).asin();
        } else {
            self.field_of_view = std::f32::consts::FRAC_PI_2;
        }
    }

    /// Scene bounding-sphere center.
    #[must_use]
    pub fn scene_center(&self) -> Vec3 {
        self.scene_center
    }

    /// Set the scene center. The pivot point is re-derived to it.
    pub fn set_scene_center(&mut self, center: Vec3) {
        self.scene_center = center;
        self.pivot_point = center;
    }

    /// Scene bounding-sphere radius.
    #[must_use]
    pub fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    /// Set the scene radius. Non-positive values are rejected and
    /// state is unchanged.
    pub fn set_scene_radius(&mut self, radius: f32) -> Result<(), ViewError> {
        if radius <= 0.0 || !radius.is_finite() {
            log::warn!("rejected scene radius {radius}");
            return Err(ViewError::InvalidSceneRadius(radius));
        }
        self.scene_radius = radius;
        Ok(())
    }

    /// Set both scene bounds at once.
    pub fn set_scene_bounds(
        &mut self,
        center: Vec3,
        radius: f32,
    ) -> Result<(), ViewError> {
        self.set_scene_radius(radius)?;
        self.set_scene_center(center);
        Ok(())
    }

    /// The point orbited by rotate/arcball gestures.
    #[must_use]
    pub fn pivot_point(&self) -> Vec3 {
        self.pivot_point
    }

    /// Set the revolve-around point.
    pub fn set_pivot_point(&mut self, point: Vec3) {
        self.pivot_point = point;
    }

    /// Viewport size in pixels (from the host's viewport provider).
    pub fn set_screen_width_height(&mut self, width: u32, height: u32) {
        self.screen_width = width.max(1);
        self.screen_height = height.max(1);
    }

    /// Viewport width in pixels.
    #[must_use]
    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    /// Viewport height in pixels.
    #[must_use]
    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    /// Width / height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.screen_width as f32 / self.screen_height as f32
    }

    /// Apply serializable tuning options.
    pub fn apply_options(&mut self, options: &CameraOptions) {
        self.field_of_view = options.field_of_view.to_radians();
        self.z_near_coefficient = options.z_near_coefficient;
        self.z_clipping_coefficient = options.z_clipping_coefficient;
    }

    // ── Derived pose ───────────────────────────────────────────────

    /// World-space position of the camera.
    #[must_use]
    pub fn position(&self, arena: &FrameArena) -> Vec3 {
        arena.position(self.frame)
    }

    /// World-space orientation of the camera.
    #[must_use]
    pub fn orientation(&self, arena: &FrameArena) -> Quaternion {
        arena.orientation(self.frame)
    }

    /// Normalized world-space view direction (local −Z).
    #[must_use]
    pub fn view_direction(&self, arena: &FrameArena) -> Vec3 {
        arena.inverse_transform_of(self.frame, Vec3::NEG_Z)
    }

    /// World-space up vector (local +Y).
    #[must_use]
    pub fn up_vector(&self, arena: &FrameArena) -> Vec3 {
        arena.inverse_transform_of(self.frame, Vec3::Y)
    }

    /// World-space right vector (local +X).
    #[must_use]
    pub fn right_vector(&self, arena: &FrameArena) -> Vec3 {
        arena.inverse_transform_of(self.frame, Vec3::X)
    }

    /// Distance from the camera to the scene center, measured along
    /// the view axis.
    #[must_use]
    pub fn distance_to_scene_center(&self, arena: &FrameArena) -> f32 {
        arena.coordinates_of(self.frame, self.scene_center).z.abs()
    }

    /// Distance from the camera to the pivot point, measured along the
    /// view axis.
    #[must_use]
    pub fn distance_to_pivot(&self, arena: &FrameArena) -> f32 {
        arena.coordinates_of(self.frame, self.pivot_point).z.abs()
    }

    // ── Clipping planes ────────────────────────────────────────────

    /// Near clipping distance: the scene sphere's near extent, clamped
    /// so it never goes degenerate (perspective floor
    /// `z_near_coefficient · z_clipping_coefficient · scene_radius`,
    /// orthographic floor 0).
    #[must_use]
    pub fn z_near(&self, arena: &FrameArena) -> f32 {
        let z = self.distance_to_scene_center(arena)
            - self.z_clipping_coefficient * self.scene_radius;
        let floor = match self.projection {
            ProjectionKind::Perspective => {
                self.z_near_coefficient
                    * self.z_clipping_coefficient
                    * self.scene_radius
            }
            ProjectionKind::Orthographic => 0.0,
        };
        z.max(floor)
    }

    /// Far clipping distance: the scene sphere's far extent.
    #[must_use]
    pub fn z_far(&self, arena: &FrameArena) -> f32 {
        self.distance_to_scene_center(arena)
            + self.z_clipping_coefficient * self.scene_radius
    }

    /// Orthographic frustum half-extents `(half_width, half_height)`,
    /// scaled with the distance to the pivot point so that moving the
    /// camera zooms the orthographic view.
    #[must_use]
    pub fn ortho_width_height(&self, arena: &FrameArena) -> (f32, f32) {
        let mut dist = self.ortho_coef * self.distance_to_pivot(arena);
        if dist < f32::EPSILON {
            // Camera sitting on the pivot: avoid a zero-area frustum.
            dist = self.ortho_coef * self.scene_radius;
        }
        let aspect = self.aspect_ratio();
        if aspect < 1.0 {
            (dist, dist / aspect)
        } else {
            (dist * aspect, dist)
        }
    }

    // ── Matrices ───────────────────────────────────────────────────

    fn projection_for(&self, arena: &FrameArena) -> Mat4 {
        let z_near = self.z_near(arena);
        let z_far = self.z_far(arena);
        match self.projection {
            ProjectionKind::Perspective => Mat4::perspective_rh(
                self.field_of_view,
                self.aspect_ratio(),
                z_near,
                z_far,
            ),
            ProjectionKind::Orthographic => {
                let (w, h) = self.ortho_width_height(arena);
                Mat4::orthographic_rh(-w, w, -h, h, z_near, z_far)
            }
        }
    }

    fn view_for(&self, arena: &FrameArena) -> Mat4 {
        let q = self.orientation(arena);
        let position = self.position(arena);
        Mat4::from_quat(q.inverse().to_glam())
            * Mat4::from_translation(-position)
    }

    /// Recompute and cache the projection matrix.
    pub fn compute_projection_matrix(&mut self, arena: &FrameArena) -> Mat4 {
        self.projection_matrix = self.projection_for(arena);
        self.projection_matrix
    }

    /// Recompute and cache the view matrix.
    pub fn compute_view_matrix(&mut self, arena: &FrameArena) -> Mat4 {
        self.view_matrix = self.view_for(arena);
        self.view_matrix
    }

    /// Recompute both cached matrices (one derivation pass per tick).
    pub fn compute_matrices(&mut self, arena: &FrameArena) {
        let _ = self.compute_projection_matrix(arena);
        let _ = self.compute_view_matrix(arena);
    }

    /// Last computed projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Last computed view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    /// Last computed projection matrix, column-major, for the host
    /// renderer.
    #[must_use]
    pub fn projection_matrix_array(&self) -> [f32; 16] {
        self.projection_matrix.to_cols_array()
    }

    /// Last computed view matrix, column-major, for the host renderer.
    #[must_use]
    pub fn view_matrix_array(&self) -> [f32; 16] {
        self.view_matrix.to_cols_array()
    }

    /// The six frustum planes for the camera's current state
    /// (computed fresh, independent of the matrix cache).
    #[must_use]
    pub fn frustum(&self, arena: &FrameArena) -> Frustum {
        Frustum::from_view_projection(
            self.projection_for(arena) * self.view_for(arena),
        )
    }

    // ── Project / unproject ────────────────────────────────────────

    /// Project a world point to screen coordinates: `(x, y)` in pixels
    /// (y down) and `z` in [0,1] depth.
    #[must_use]
    pub fn projected_coordinates_of(
        &self,
        arena: &FrameArena,
        point: Vec3,
    ) -> Vec3 {
        let vp = self.projection_for(arena) * self.view_for(arena);
        let clip = vp * point.extend(1.0);
        let w = if clip.w.abs() < f32::EPSILON { 1.0 } else { clip.w };
        let ndc = clip.truncate() / w;
        Vec3::new(
            (ndc.x * 0.5 + 0.5) * self.screen_width as f32,
            (0.5 - ndc.y * 0.5) * self.screen_height as f32,
            ndc.z,
        )
    }

    /// Unproject screen coordinates (`x`, `y` pixels, `z` in [0,1])
    /// back to a world point. Returns `None` when the composed matrix
    /// is singular.
    #[must_use]
    pub fn unprojected_coordinates_of(
        &self,
        arena: &FrameArena,
        screen: Vec3,
    ) -> Option<Vec3> {
        let vp = self.projection_for(arena) * self.view_for(arena);
        let det = vp.determinant();
        if det.abs() < 1e-12 || !det.is_finite() {
            return None;
        }
        let inv = vp.inverse();
        let ndc = Vec4::new(
            2.0 * screen.x / self.screen_width as f32 - 1.0,
            1.0 - 2.0 * screen.y / self.screen_height as f32,
            screen.z,
            1.0,
        );
        let v = inv * ndc;
        if v.w.abs() < f32::EPSILON {
            return None;
        }
        Some(v.truncate() / v.w)
    }

    /// The world-space ray under a pixel: `(origin, unit direction)`.
    #[must_use]
    pub fn pixel_ray(
        &self,
        arena: &FrameArena,
        x: f32,
        y: f32,
    ) -> (Vec3, Vec3) {
        let w = self.screen_width as f32;
        let h = self.screen_height as f32;
        match self.projection {
            ProjectionKind::Perspective => {
                let half_tan = (self.field_of_view / 2.0).tan();
                let local = Vec3::new(
                    (2.0 * x / w - 1.0) * half_tan * self.aspect_ratio(),
                    (1.0 - 2.0 * y / h) * half_tan,
                    -1.0,
                );
                let origin = self.position(arena);
                let dir = arena
                    .inverse_transform_of(self.frame, local)
                    .normalize_or(Vec3::NEG_Z);
                (origin, dir)
            }
            ProjectionKind::Orthographic => {
                let (half_w, half_h) = self.ortho_width_height(arena);
                let local = Vec3::new(
                    (2.0 * x / w - 1.0) * half_w,
                    (1.0 - 2.0 * y / h) * half_h,
                    0.0,
                );
                let origin =
                    arena.inverse_coordinates_of(self.frame, local);
                (origin, self.view_direction(arena))
            }
        }
    }

    // ── Fitting ────────────────────────────────────────────────────

    /// Translate the camera along its (unchanged) view direction until
    /// the given sphere exactly fills the frustum.
    pub fn fit_sphere(
        &self,
        arena: &mut FrameArena,
        center: Vec3,
        radius: f32,
    ) {
        let view_dir = self.view_direction(arena);
        let distance = match self.projection {
            ProjectionKind::Perspective => {
                let y_view = radius / (self.field_of_view / 2.0).sin();
                let x_view =
                    radius / (self.horizontal_field_of_view() / 2.0).sin();
                x_view.max(y_view)
            }
            ProjectionKind::Orthographic => {
                (center - self.pivot_point).dot(view_dir)
                    + radius / self.ortho_coef.max(f32::EPSILON)
            }
        };
        arena.set_position_with_constraint(
            self.frame,
            center - distance * view_dir,
        );
    }

    /// Move the camera so the whole scene sphere is visible.
    pub fn show_entire_scene(&self, arena: &mut FrameArena) {
        self.fit_sphere(arena, self.scene_center, self.scene_radius);
    }

    /// Translate (orthogonally to the view axis) so the scene center
    /// lands on the view axis.
    pub fn center_scene(&self, arena: &mut FrameArena) {
        let position = self.position(arena);
        let view_dir = self.view_direction(arena);
        let along = (position - self.scene_center).dot(view_dir);
        arena.set_position_with_constraint(
            self.frame,
            self.scene_center + along * view_dir,
        );
    }

    /// Orient the camera (keeping its position) so it looks at
    /// `target`, staying as close as possible to the current up.
    pub fn look_at(&self, arena: &mut FrameArena, target: Vec3) {
        let direction = target - self.position(arena);
        if direction.length_squared() < 1e-10 {
            return;
        }
        let direction = direction.normalize();
        let mut x_axis = direction.cross(self.up_vector(arena));
        if x_axis.length_squared() < 1e-10 {
            // Looking along the up vector: keep the current right.
            x_axis = self.right_vector(arena);
        }
        let q = Quaternion::from_rotated_basis(
            x_axis,
            x_axis.cross(direction),
            -direction,
        );
        arena.set_orientation_with_constraint(self.frame, q);
    }

    /// Move the camera so the given screen rectangle fills the
    /// viewport: back-projects the rectangle's center and edge
    /// midpoints onto the plane through the scene center normal to the
    /// view direction, then reduces to a fitting distance.
    pub fn fit_screen_region(
        &self,
        arena: &mut FrameArena,
        region: ScreenRegion,
    ) {
        let view_dir = self.view_direction(arena);
        let position = self.position(arena);
        let dist_to_plane = (self.scene_center - position).dot(view_dir);

        let on_plane = |pixel: (f32, f32)| -> Option<Vec3> {
            let (origin, dir) = self.pixel_ray(arena, pixel.0, pixel.1);
            let denom = dir.dot(view_dir);
            if denom.abs() < 1e-8 {
                return None;
            }
            Some(origin + (dist_to_plane / denom) * dir)
        };

        let (cx, cy) = region.center();
        let Some(new_center) = on_plane((cx, cy)) else { return };
        let Some(point_x) = on_plane((region.x + region.width, cy)) else {
            return;
        };
        let Some(point_y) = on_plane((cx, region.y + region.height)) else {
            return;
        };

        let distance = match self.projection {
            ProjectionKind::Perspective => {
                let dist_x = (point_x - new_center).length()
                    / (self.horizontal_field_of_view() / 2.0).sin();
                let dist_y = (point_y - new_center).length()
                    / (self.field_of_view / 2.0).sin();
                dist_x.max(dist_y)
            }
            ProjectionKind::Orthographic => {
                let along = (new_center - self.pivot_point).dot(view_dir);
                let aspect = self.aspect_ratio();
                let coef = self.ortho_coef.max(f32::EPSILON);
                let dist_x = (point_x - new_center).length()
                    / coef
                    / if aspect < 1.0 { 1.0 } else { aspect };
                let dist_y = (point_y - new_center).length()
                    / coef
                    / if aspect < 1.0 { 1.0 / aspect } else { 1.0 };
                along + dist_x.max(dist_y)
            }
        };
        arena.set_position_with_constraint(
            self.frame,
            new_center - distance * view_dir,
        );
    }

    /// The world point under a pixel. Needs a depth read-back the core
    /// does not own; hosts that can read the depth buffer should
    /// provide this themselves via
    /// [`unprojected_coordinates_of`](Self::unprojected_coordinates_of).
    pub fn point_under_pixel(
        &self,
        _x: f32,
        _y: f32,
    ) -> Result<Vec3, ViewError> {
        Err(ViewError::Unsupported(
            "point_under_pixel requires host depth read-back",
        ))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn setup() -> (FrameArena, Camera) {
        let mut arena = FrameArena::new();
        let camera = Camera::new(&mut arena);
        (arena, camera)
    }

    #[test]
    fn z_near_never_exceeds_z_far() {
        let mut rng = rand::rng();
        let (mut arena, mut camera) = setup();
        camera.set_scene_bounds(Vec3::ZERO, 2.5).unwrap();

        for _ in 0..50 {
            let p = Vec3::new(
                rng.random_range(-20.0..20.0),
                rng.random_range(-20.0..20.0),
                rng.random_range(-20.0..20.0),
            );
            arena.set_position(camera.frame(), p);
            let q = Quaternion::from_axis_angle(
                Vec3::new(
                    rng.random_range(-1.0..1.0) + 0.01,
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                ),
                rng.random_range(0.0..std::f32::consts::PI),
            );
            arena.set_orientation(camera.frame(), q);

            assert!(camera.z_near(&arena) <= camera.z_far(&arena));
            assert!(camera.z_near(&arena) > 0.0);

            camera.set_projection_kind(ProjectionKind::Orthographic);
            assert!(camera.z_near(&arena) <= camera.z_far(&arena));
            camera.set_projection_kind(ProjectionKind::Perspective);
        }
    }

    #[test]
    fn invalid_scene_radius_is_rejected() {
        let (_, mut camera) = setup();
        assert!(matches!(
            camera.set_scene_radius(0.0),
            Err(ViewError::InvalidSceneRadius(_))
        ));
        assert!(matches!(
            camera.set_scene_radius(-3.0),
            Err(ViewError::InvalidSceneRadius(_))
        ));
        assert_eq!(camera.scene_radius(), 1.0);
    }

    #[test]
    fn scene_center_rederives_pivot() {
        let (_, mut camera) = setup();
        camera.set_pivot_point(Vec3::X);
        camera.set_scene_center(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(camera.pivot_point(), Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn show_entire_scene_centers_and_fits_the_sphere() {
        let (mut arena, mut camera) = setup();
        camera.set_screen_width_height(640, 480);
        camera.set_scene_bounds(Vec3::new(1.0, 2.0, -3.0), 2.0).unwrap();

        // Start from an arbitrary pose.
        arena.set_position(camera.frame(), Vec3::new(10.0, -5.0, 7.0));
        camera.look_at(&mut arena, camera.scene_center());
        camera.show_entire_scene(&mut arena);

        // Scene center projects within a few pixels of viewport center.
        let projected =
            camera.projected_coordinates_of(&arena, camera.scene_center());
        assert!((projected.x - 320.0).abs() < 3.0, "{projected:?}");
        assert!((projected.y - 240.0).abs() < 3.0, "{projected:?}");

        // The projected sphere is not clipped by the viewport: the
        // extremal points along up/right stay within bounds.
        let up = camera.up_vector(&arena);
        let right = camera.right_vector(&arena);
        for offset in [
            up * camera.scene_radius(),
            -up * camera.scene_radius(),
            right * camera.scene_radius(),
            -right * camera.scene_radius(),
        ] {
            let p = camera
                .projected_coordinates_of(&arena, camera.scene_center() + offset);
            assert!(p.x >= -1.0 && p.x <= 641.0, "{p:?}");
            assert!(p.y >= -1.0 && p.y <= 481.0, "{p:?}");
        }

        // End-to-end invariant: the frustum keeps the scene center in
        // every inside half-space.
        assert!(camera.distance_to_scene_center(&arena) > 0.0);
        let frustum = camera.frustum(&arena);
        for plane in &frustum.planes {
            assert!(plane.distance_to_point(camera.scene_center()) > 0.0);
        }
    }

    #[test]
    fn project_unproject_round_trip() {
        let (mut arena, mut camera) = setup();
        camera.set_screen_width_height(800, 600);
        camera.set_scene_bounds(Vec3::ZERO, 3.0).unwrap();
        arena.set_position(camera.frame(), Vec3::new(0.0, 1.0, 8.0));
        camera.look_at(&mut arena, Vec3::ZERO);

        let p = Vec3::new(0.4, -0.7, 0.3);
        let screen = camera.projected_coordinates_of(&arena, p);
        let back = camera.unprojected_coordinates_of(&arena, screen).unwrap();
        assert!((back - p).length() < 1e-2, "{back:?} != {p:?}");
    }

    #[test]
    fn projection_switch_preserves_framing_at_pivot() {
        let (mut arena, mut camera) = setup();
        camera.set_screen_width_height(500, 500);
        camera.set_scene_bounds(Vec3::ZERO, 1.0).unwrap();
        arena.set_position(camera.frame(), Vec3::new(0.0, 0.0, 5.0));
        camera.look_at(&mut arena, Vec3::ZERO);

        // Perspective visible half-height at the pivot distance.
        let dist = camera.distance_to_pivot(&arena);
        let perspective_half = (camera.field_of_view() / 2.0).tan() * dist;

        camera.set_projection_kind(ProjectionKind::Orthographic);
        let (_, ortho_half) = camera.ortho_width_height(&arena);
        assert!((ortho_half - perspective_half).abs() < 1e-4);
    }

    #[test]
    fn perspective_pixel_ray_passes_through_projected_point() {
        let (mut arena, mut camera) = setup();
        camera.set_screen_width_height(640, 480);
        arena.set_position(camera.frame(), Vec3::new(2.0, 1.0, 6.0));
        camera.look_at(&mut arena, Vec3::ZERO);

        let target = Vec3::new(0.3, 0.5, -0.2);
        let screen = camera.projected_coordinates_of(&arena, target);
        let (origin, dir) = camera.pixel_ray(&arena, screen.x, screen.y);

        // The ray should pass close to the target point.
        let to_target = target - origin;
        let closest = origin + dir * to_target.dot(dir);
        assert!((closest - target).length() < 1e-2);
    }

    #[test]
    fn fit_screen_region_moves_closer_than_full_view() {
        let (mut arena, mut camera) = setup();
        camera.set_screen_width_height(600, 600);
        camera.set_scene_bounds(Vec3::ZERO, 2.0).unwrap();
        arena.set_position(camera.frame(), Vec3::new(0.0, 0.0, 20.0));
        camera.look_at(&mut arena, Vec3::ZERO);
        camera.show_entire_scene(&mut arena);
        let full_dist = camera.distance_to_scene_center(&arena);

        camera.fit_screen_region(
            &mut arena,
            ScreenRegion {
                x: 250.0,
                y: 250.0,
                width: 100.0,
                height: 100.0,
            },
        );
        assert!(camera.distance_to_scene_center(&arena) < full_dist);
    }

    #[test]
    fn point_under_pixel_is_unsupported_here() {
        let (_, camera) = setup();
        assert!(matches!(
            camera.point_under_pixel(10.0, 10.0),
            Err(ViewError::Unsupported(_))
        ));
    }

    #[test]
    fn matrix_arrays_are_column_major() {
        let (mut arena, mut camera) = setup();
        arena.set_position(camera.frame(), Vec3::new(0.0, 0.0, 4.0));
        camera.compute_matrices(&arena);
        let arr = camera.view_matrix_array();
        assert_eq!(arr, camera.view_matrix().to_cols_array());
        let parr = camera.projection_matrix_array();
        assert_eq!(parr, camera.projection_matrix().to_cols_array());
    }
}
