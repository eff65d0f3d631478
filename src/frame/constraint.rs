//! Constraints filter translation/rotation deltas before they mutate
//! a frame.
//!
//! A [`Constraint`] is a strategy object attached to a
//! [`Frame`](super::Frame). The constrained mutators on
//! [`FrameArena`](super::FrameArena) pass every proposed delta through
//! it; the constraint may reduce or zero the delta. A frame with no
//! constraint behaves as if an identity constraint were attached.

use glam::Vec3;

use super::{FrameArena, FrameId};
use crate::math::Quaternion;

/// Filters proposed frame deltas.
///
/// `delta` translations are expressed in the frame's reference space
/// (the space its `translation` lives in); `delta` rotations are local.
pub trait Constraint {
    /// Filter a proposed translation delta. Default: pass through.
    fn constrain_translation(
        &self,
        delta: Vec3,
        frame: FrameId,
        arena: &FrameArena,
    ) -> Vec3 {
        let _ = (frame, arena);
        delta
    }

    /// Filter a proposed rotation delta. Default: pass through.
    fn constrain_rotation(
        &self,
        delta: Quaternion,
        frame: FrameId,
        arena: &FrameArena,
    ) -> Quaternion {
        let _ = (frame, arena);
        delta
    }
}

/// How a constraint restricts one degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintKind {
    /// No filtering.
    #[default]
    Free,
    /// Motion restricted to the plane normal to the direction
    /// (translations) — not meaningful for rotations, treated as Free.
    Plane,
    /// Motion restricted to the axis/direction.
    Axis,
    /// Motion entirely forbidden.
    Forbidden,
}

/// Axis/plane restrictions for translation and rotation.
///
/// The interpretation of the two direction vectors (local or world
/// basis) is chosen by wrapping this data in [`LocalConstraint`] or
/// [`WorldConstraint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPlaneConstraint {
    /// Translation restriction kind.
    pub translation_kind: ConstraintKind,
    /// Translation axis or plane normal.
    pub translation_dir: Vec3,
    /// Rotation restriction kind (`Plane` acts as `Free`).
    pub rotation_kind: ConstraintKind,
    /// Rotation axis.
    pub rotation_dir: Vec3,
}

impl Default for AxisPlaneConstraint {
    fn default() -> Self {
        Self {
            translation_kind: ConstraintKind::Free,
            translation_dir: Vec3::X,
            rotation_kind: ConstraintKind::Free,
            rotation_dir: Vec3::X,
        }
    }
}

impl AxisPlaneConstraint {
    fn filter_translation(&self, delta: Vec3, dir: Vec3) -> Vec3 {
        match self.translation_kind {
            ConstraintKind::Free => delta,
            ConstraintKind::Plane => project_on_plane(delta, dir),
            ConstraintKind::Axis => project_on_axis(delta, dir),
            ConstraintKind::Forbidden => Vec3::ZERO,
        }
    }

    fn filter_rotation(&self, delta: Quaternion, axis: Vec3) -> Quaternion {
        match self.rotation_kind {
            ConstraintKind::Free | ConstraintKind::Plane => delta,
            ConstraintKind::Axis => {
                let vector = Vec3::new(delta.x, delta.y, delta.z);
                let projected = project_on_axis(vector, axis);
                // Rebuild with the same scalar part: the rotation keeps
                // its angle but only the axis component along `axis`.
                Quaternion::from_axis_angle(
                    projected,
                    2.0 * delta.w.clamp(-1.0, 1.0).acos(),
                )
            }
            ConstraintKind::Forbidden => Quaternion::IDENTITY,
        }
    }
}

/// An [`AxisPlaneConstraint`] whose directions are expressed in the
/// constrained frame's local basis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalConstraint(pub AxisPlaneConstraint);

impl Constraint for LocalConstraint {
    fn constrain_translation(
        &self,
        delta: Vec3,
        frame: FrameId,
        arena: &FrameArena,
    ) -> Vec3 {
        // Local direction expressed in reference space, where the
        // translation delta lives.
        let dir = arena.get(frame).map_or(self.0.translation_dir, |f| {
            f.rotation().rotate(self.0.translation_dir)
        });
        self.0.filter_translation(delta, dir)
    }

    fn constrain_rotation(
        &self,
        delta: Quaternion,
        _frame: FrameId,
        _arena: &FrameArena,
    ) -> Quaternion {
        // Rotation deltas are already local.
        self.0.filter_rotation(delta, self.0.rotation_dir)
    }
}

/// An [`AxisPlaneConstraint`] whose directions are expressed in world
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldConstraint(pub AxisPlaneConstraint);

impl Constraint for WorldConstraint {
    fn constrain_translation(
        &self,
        delta: Vec3,
        frame: FrameId,
        arena: &FrameArena,
    ) -> Vec3 {
        // World direction expressed in the reference frame's space.
        let dir = match arena.get(frame).and_then(super::Frame::reference) {
            Some(reference) => {
                arena.transform_of(reference, self.0.translation_dir)
            }
            None => self.0.translation_dir,
        };
        self.0.filter_translation(delta, dir)
    }

    fn constrain_rotation(
        &self,
        delta: Quaternion,
        frame: FrameId,
        arena: &FrameArena,
    ) -> Quaternion {
        let axis = arena.transform_of(frame, self.0.rotation_dir);
        self.0.filter_rotation(delta, axis)
    }
}

/// Orthogonal projection of `v` onto the axis `dir`.
fn project_on_axis(v: Vec3, dir: Vec3) -> Vec3 {
    let dir = dir.normalize_or_zero();
    dir * v.dot(dir)
}

/// Orthogonal projection of `v` onto the plane with normal `normal`.
fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - project_on_axis(v, normal)
}
