//! Coordinate-frame hierarchy.
//!
//! A [`Frame`] is a local coordinate system: a translation and a
//! rotation, optionally expressed relative to a reference (parent)
//! frame. Frames live in a [`FrameArena`] and refer to each other by
//! stable [`FrameId`] handles, so destroying a parent can never leave
//! a dangling pointer in a surviving child — a stale id simply
//! resolves as world space.
//!
//! World-space `position`/`orientation` are *derived* by walking the
//! reference chain on demand; they are never cached, so they cannot
//! fall out of sync with local state.

use std::fmt;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::error::ViewError;
use crate::math::Quaternion;

/// Strategy objects filtering frame deltas.
pub mod constraint;

pub use constraint::{
    AxisPlaneConstraint, Constraint, ConstraintKind, LocalConstraint,
    WorldConstraint,
};

/// Stable handle to a frame in a [`FrameArena`].
///
/// Ids are assigned monotonically and never reused, so a handle to a
/// removed frame can never alias a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

/// A node in the coordinate-frame tree.
///
/// `translation` and `rotation` are expressed in the reference frame's
/// space (world space when there is no reference). The reference link
/// is non-owning: it is a [`FrameId`] resolved against the arena.
pub struct Frame {
    translation: Vec3,
    rotation: Quaternion,
    reference: Option<FrameId>,
    constraint: Option<Box<dyn Constraint>>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("translation", &self.translation)
            .field("rotation", &self.rotation)
            .field("reference", &self.reference)
            .field("constrained", &self.constraint.is_some())
            .finish()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// A world-space frame at the origin with identity orientation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quaternion::IDENTITY,
            reference: None,
            constraint: None,
        }
    }

    /// A world-space frame with the given local state.
    #[must_use]
    pub fn from_translation_rotation(
        translation: Vec3,
        rotation: Quaternion,
    ) -> Self {
        Self {
            translation,
            rotation,
            reference: None,
            constraint: None,
        }
    }

    /// Local translation, expressed in the reference frame's space.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Set the local translation directly (no constraint applied).
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    /// Local rotation, expressed in the reference frame's space.
    #[must_use]
    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    /// Set the local rotation directly (no constraint applied).
    pub fn set_rotation(&mut self, rotation: Quaternion) {
        self.rotation = rotation;
    }

    /// The reference (parent) frame id, if any.
    #[must_use]
    pub fn reference(&self) -> Option<FrameId> {
        self.reference
    }

    /// The constraint filtering this frame's deltas, if any.
    #[must_use]
    pub fn constraint(&self) -> Option<&dyn Constraint> {
        self.constraint.as_deref()
    }

    /// Attach (or clear) the constraint.
    pub fn set_constraint(&mut self, constraint: Option<Box<dyn Constraint>>) {
        self.constraint = constraint;
    }
}

/// Owns every [`Frame`] and resolves [`FrameId`] chains.
///
/// All world-space operations live here because they need to walk the
/// reference chain. Structural mutations (re-parenting) validate the
/// acyclicity invariant and reject violations without changing state.
#[derive(Debug, Default)]
pub struct FrameArena {
    slots: FxHashMap<FrameId, Frame>,
    next: u32,
}

impl FrameArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame, returning its stable id.
    pub fn insert(&mut self, frame: Frame) -> FrameId {
        let id = FrameId(self.next);
        self.next += 1;
        let _ = self.slots.insert(id, frame);
        id
    }

    /// Remove a frame. Surviving children are detached (their
    /// reference becomes world) so no chain ever dangles.
    pub fn remove(&mut self, id: FrameId) -> Option<Frame> {
        let removed = self.slots.remove(&id)?;
        for frame in self.slots.values_mut() {
            if frame.reference == Some(id) {
                frame.reference = None;
            }
        }
        log::debug!("removed frame {id:?}, children detached to world");
        Some(removed)
    }

    /// Borrow a frame.
    #[must_use]
    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.slots.get(&id)
    }

    /// Mutably borrow a frame.
    pub fn get_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.slots.get_mut(&id)
    }

    /// Whether the id resolves to a live frame.
    #[must_use]
    pub fn contains(&self, id: FrameId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of live frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // ── Reference chain ────────────────────────────────────────────

    /// Re-parent `id` under `reference` (or detach with `None`).
    ///
    /// Rejects the assignment if it would make `id` its own (possibly
    /// indirect) ancestor; the link is left unchanged.
    pub fn set_reference(
        &mut self,
        id: FrameId,
        reference: Option<FrameId>,
    ) -> Result<(), ViewError> {
        if !self.contains(id) {
            return Err(ViewError::UnknownFrame(id));
        }
        if let Some(r) = reference {
            if !self.contains(r) {
                return Err(ViewError::UnknownFrame(r));
            }
            // Walk the candidate chain; reject if `id` appears.
            let mut cursor = Some(r);
            while let Some(c) = cursor {
                if c == id {
                    log::warn!(
                        "rejected reference {r:?} for {id:?}: would create a cycle"
                    );
                    return Err(ViewError::CyclicReference(id));
                }
                cursor = self.slots.get(&c).and_then(Frame::reference);
            }
        }
        if let Some(frame) = self.slots.get_mut(&id) {
            frame.reference = reference;
        }
        Ok(())
    }

    /// The chain of frames from `id` up to the root, leaf first.
    /// Stale ids terminate the walk (the rest counts as world).
    fn chain(&self, id: FrameId) -> Vec<&Frame> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            let Some(frame) = self.slots.get(&c) else { break };
            out.push(frame);
            cursor = frame.reference;
        }
        out
    }

    // ── Derived world state ────────────────────────────────────────

    /// World-space position of the frame's origin.
    #[must_use]
    pub fn position(&self, id: FrameId) -> Vec3 {
        self.inverse_coordinates_of(id, Vec3::ZERO)
    }

    /// World-space orientation (composition of the whole chain).
    #[must_use]
    pub fn orientation(&self, id: FrameId) -> Quaternion {
        let mut q = Quaternion::IDENTITY;
        for frame in self.chain(id) {
            q = frame.rotation * q;
        }
        q
    }

    /// Set the world-space position (direct, no constraint): converts
    /// to the equivalent local translation and assigns it.
    pub fn set_position(&mut self, id: FrameId, position: Vec3) {
        let local = self.world_point_in_reference_space(id, position);
        if let Some(frame) = self.slots.get_mut(&id) {
            frame.translation = local;
        }
    }

    /// Set the world-space orientation (direct, no constraint).
    pub fn set_orientation(&mut self, id: FrameId, orientation: Quaternion) {
        let local = self.world_rotation_in_reference_space(id, orientation);
        if let Some(frame) = self.slots.get_mut(&id) {
            frame.rotation = local;
        }
    }

    /// Set the world-space position through the frame's constraint.
    pub fn set_position_with_constraint(&mut self, id: FrameId, position: Vec3) {
        let target = self.world_point_in_reference_space(id, position);
        let Some(current) = self.slots.get(&id).map(Frame::translation) else {
            return;
        };
        self.translate(id, target - current);
    }

    /// Set the world-space orientation through the frame's constraint.
    pub fn set_orientation_with_constraint(
        &mut self,
        id: FrameId,
        orientation: Quaternion,
    ) {
        let target = self.world_rotation_in_reference_space(id, orientation);
        let Some(current) = self.slots.get(&id).map(Frame::rotation) else {
            return;
        };
        self.rotate(id, current.inverse() * target);
    }

    fn world_point_in_reference_space(&self, id: FrameId, point: Vec3) -> Vec3 {
        match self.slots.get(&id).and_then(Frame::reference) {
            Some(r) => self.coordinates_of(r, point),
            None => point,
        }
    }

    fn world_rotation_in_reference_space(
        &self,
        id: FrameId,
        rotation: Quaternion,
    ) -> Quaternion {
        match self.slots.get(&id).and_then(Frame::reference) {
            Some(r) => self.orientation(r).inverse() * rotation,
            None => rotation,
        }
    }

    // ── Coordinate conversion ──────────────────────────────────────

    /// World point → this frame's local coordinates.
    #[must_use]
    pub fn coordinates_of(&self, id: FrameId, world: Vec3) -> Vec3 {
        let mut p = world;
        for frame in self.chain(id).into_iter().rev() {
            p = frame.rotation.inverse_rotate(p - frame.translation);
        }
        p
    }

    /// Local point in this frame → world coordinates.
    #[must_use]
    pub fn inverse_coordinates_of(&self, id: FrameId, local: Vec3) -> Vec3 {
        let mut p = local;
        for frame in self.chain(id) {
            p = frame.rotation.rotate(p) + frame.translation;
        }
        p
    }

    /// World free vector → this frame's local basis (rotation only).
    #[must_use]
    pub fn transform_of(&self, id: FrameId, world: Vec3) -> Vec3 {
        let mut v = world;
        for frame in self.chain(id).into_iter().rev() {
            v = frame.rotation.inverse_rotate(v);
        }
        v
    }

    /// Local free vector → world basis (rotation only).
    #[must_use]
    pub fn inverse_transform_of(&self, id: FrameId, local: Vec3) -> Vec3 {
        let mut v = local;
        for frame in self.chain(id) {
            v = frame.rotation.rotate(v);
        }
        v
    }

    // ── Constrained incremental mutation ───────────────────────────

    /// Translate by `delta` (reference space), filtered through the
    /// frame's constraint.
    pub fn translate(&mut self, id: FrameId, delta: Vec3) {
        let constrained = self.constrained_translation(id, delta);
        if let Some(frame) = self.slots.get_mut(&id) {
            frame.translation += constrained;
        }
    }

    /// Rotate by `delta` (local space), filtered through the frame's
    /// constraint.
    pub fn rotate(&mut self, id: FrameId, delta: Quaternion) {
        let constrained = self.constrained_rotation(id, delta);
        if let Some(frame) = self.slots.get_mut(&id) {
            frame.rotation = frame.rotation * constrained;
        }
    }

    /// Rotate by `delta` (local space) around the world-space `point`
    /// instead of the frame's own origin: the rotation is applied in
    /// place, then a compensating translation keeps `point` fixed in
    /// the frame's local coordinates. Both deltas pass through the
    /// constraint.
    pub fn rotate_around_point(
        &mut self,
        id: FrameId,
        delta: Quaternion,
        point: Vec3,
    ) {
        let constrained = self.constrained_rotation(id, delta);
        let Some(frame) = self.slots.get_mut(&id) else { return };
        frame.rotation = frame.rotation * constrained;

        let world_axis = self.inverse_transform_of(id, constrained.axis());
        let q_world =
            Quaternion::from_axis_angle(world_axis, constrained.angle());
        let old_position = self.position(id);
        let new_position = point + q_world.rotate(old_position - point);

        let delta_world = new_position - old_position;
        let delta_ref = match self.slots.get(&id).and_then(Frame::reference) {
            Some(r) => self.transform_of(r, delta_world),
            None => delta_world,
        };
        self.translate(id, delta_ref);
    }

    fn constrained_translation(&self, id: FrameId, delta: Vec3) -> Vec3 {
        match self.slots.get(&id).and_then(Frame::constraint) {
            Some(c) => c.constrain_translation(delta, id, self),
            None => delta,
        }
    }

    fn constrained_rotation(
        &self,
        id: FrameId,
        delta: Quaternion,
    ) -> Quaternion {
        match self.slots.get(&id).and_then(Frame::constraint) {
            Some(c) => c.constrain_rotation(delta, id, self),
            None => delta,
        }
    }

    // ── Alignment ──────────────────────────────────────────────────

    /// Align this frame's orientation with `other`'s (world axes when
    /// `other` is `None`), up to 90° increments.
    ///
    /// Finds the axis pair with maximal absolute dot product; if it
    /// exceeds `threshold`, rotates so the pair is parallel, then
    /// repeats once for a second axis pair. When `move_frame` is set,
    /// also translates so the world point at `other`'s position (or
    /// the origin) keeps its location in this frame.
    pub fn align_with(
        &mut self,
        id: FrameId,
        other: Option<FrameId>,
        move_frame: bool,
        threshold: f32,
    ) {
        if !self.contains(id) {
            return;
        }

        let axes = [Vec3::X, Vec3::Y, Vec3::Z];
        let other_dirs: [Vec3; 3] = match other {
            Some(o) => [
                self.inverse_transform_of(o, Vec3::X),
                self.inverse_transform_of(o, Vec3::Y),
                self.inverse_transform_of(o, Vec3::Z),
            ],
            None => axes,
        };
        let self_dirs: [Vec3; 3] = [
            self.inverse_transform_of(id, Vec3::X),
            self.inverse_transform_of(id, Vec3::Y),
            self.inverse_transform_of(id, Vec3::Z),
        ];

        let (old_translation, old_rotation) = {
            let Some(frame) = self.slots.get(&id) else { return };
            (frame.translation, frame.rotation)
        };

        // Best axis pairing.
        let mut index = (0usize, 0usize);
        let mut max_proj = 0.0f32;
        for (i, od) in other_dirs.iter().enumerate() {
            for (j, sd) in self_dirs.iter().enumerate() {
                let proj = od.dot(*sd).abs();
                if proj >= max_proj {
                    index = (i, j);
                    max_proj = proj;
                }
            }
        }

        let coef = other_dirs[index.0].dot(self_dirs[index.1]);
        if coef.abs() >= threshold {
            let axis = other_dirs[index.0].cross(self_dirs[index.1]);
            let mut angle = axis.length().clamp(-1.0, 1.0).asin();
            if coef >= 0.0 {
                angle = -angle;
            }
            let world_rot = Quaternion::from_axis_angle(axis, angle);
            let local_delta = {
                let Some(frame) = self.slots.get(&id) else { return };
                frame.rotation.inverse() * world_rot * self.orientation(id)
            };
            self.rotate(id, local_delta);

            // Second pass: align another axis pair, orthogonal to the
            // first, so the result is unique up to 90° increments.
            let d = (index.1 + 1) % 3;
            let dir = self.inverse_transform_of(id, axes[d]);
            let mut best = 0usize;
            let mut max = 0.0f32;
            for (i, od) in other_dirs.iter().enumerate() {
                let proj = od.dot(dir).abs();
                if proj > max {
                    best = i;
                    max = proj;
                }
            }
            if max >= threshold {
                let axis = other_dirs[best].cross(dir);
                let mut angle = axis.length().clamp(-1.0, 1.0).asin();
                if other_dirs[best].dot(dir) >= 0.0 {
                    angle = -angle;
                }
                let world_rot = Quaternion::from_axis_angle(axis, angle);
                let local_delta = {
                    let Some(frame) = self.slots.get(&id) else { return };
                    frame.rotation.inverse()
                        * world_rot
                        * self.orientation(id)
                };
                self.rotate(id, local_delta);
            }
        }

        if move_frame {
            let center = other.map_or(Vec3::ZERO, |o| self.position(o));
            // Where `center` sat in the old local basis.
            let parent_point =
                self.world_point_in_reference_space(id, center);
            let old_local =
                old_rotation.inverse_rotate(parent_point - old_translation);
            // Translate so that local point lands back on `center`.
            let now_world = self.inverse_coordinates_of(id, old_local);
            let delta_world = center - now_world;
            let delta_ref = match self.slots.get(&id).and_then(Frame::reference)
            {
                Some(r) => self.transform_of(r, delta_world),
                None => delta_world,
            };
            self.translate(id, delta_ref);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const EPS: f32 = 1e-3;

    fn random_frame(rng: &mut impl Rng) -> Frame {
        let t = Vec3::new(
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
        );
        let axis = Vec3::new(
            rng.random_range(-1.0..1.0) + 0.01,
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let q = Quaternion::from_axis_angle(
            axis,
            rng.random_range(0.0..std::f32::consts::PI),
        );
        Frame::from_translation_rotation(t, q)
    }

    #[test]
    fn chain_coordinates_round_trip() {
        let mut rng = rand::rng();
        let mut arena = FrameArena::new();

        // Depth-6 chain of random frames.
        let mut parent = None;
        let mut leaf = None;
        for _ in 0..6 {
            let id = arena.insert(random_frame(&mut rng));
            arena.set_reference(id, parent).unwrap();
            parent = Some(id);
            leaf = Some(id);
        }
        let leaf = leaf.unwrap();

        for _ in 0..20 {
            let p = Vec3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            );
            let back =
                arena.inverse_coordinates_of(leaf, arena.coordinates_of(leaf, p));
            assert!((back - p).length() < EPS, "{back:?} != {p:?}");

            let v_back =
                arena.inverse_transform_of(leaf, arena.transform_of(leaf, p));
            assert!((v_back - p).length() < EPS);
        }
    }

    #[test]
    fn cycles_are_rejected_and_link_unchanged() {
        let mut arena = FrameArena::new();
        let a = arena.insert(Frame::new());
        let b = arena.insert(Frame::new());
        let c = arena.insert(Frame::new());
        arena.set_reference(b, Some(a)).unwrap();
        arena.set_reference(c, Some(b)).unwrap();

        // Direct self-reference.
        assert!(matches!(
            arena.set_reference(a, Some(a)),
            Err(ViewError::CyclicReference(_))
        ));
        // Indirect cycle a -> c -> b -> a.
        assert!(matches!(
            arena.set_reference(a, Some(c)),
            Err(ViewError::CyclicReference(_))
        ));
        assert_eq!(arena.get(a).unwrap().reference(), None);
    }

    #[test]
    fn world_setters_round_trip_through_chain() {
        let mut rng = rand::rng();
        let mut arena = FrameArena::new();
        let parent = arena.insert(random_frame(&mut rng));
        let child = arena.insert(random_frame(&mut rng));
        arena.set_reference(child, Some(parent)).unwrap();

        let target = Vec3::new(1.0, -2.0, 3.0);
        arena.set_position(child, target);
        assert!((arena.position(child) - target).length() < EPS);

        let q = Quaternion::from_axis_angle(Vec3::new(0.2, 1.0, -0.4), 0.9);
        arena.set_orientation(child, q);
        assert!(arena.orientation(child).dot(&q).abs() > 1.0 - EPS);
    }

    #[test]
    fn removing_a_parent_detaches_children() {
        let mut arena = FrameArena::new();
        let parent = arena.insert(Frame::from_translation_rotation(
            Vec3::new(10.0, 0.0, 0.0),
            Quaternion::IDENTITY,
        ));
        let child = arena.insert(Frame::new());
        arena.set_reference(child, Some(parent)).unwrap();
        assert!((arena.position(child) - Vec3::new(10.0, 0.0, 0.0)).length() < EPS);

        let _ = arena.remove(parent);
        assert_eq!(arena.get(child).unwrap().reference(), None);
        assert!((arena.position(child)).length() < EPS);
    }

    #[test]
    fn rotate_around_point_keeps_pivot_fixed() {
        let mut arena = FrameArena::new();
        let id = arena.insert(Frame::from_translation_rotation(
            Vec3::new(5.0, 0.0, 0.0),
            Quaternion::IDENTITY,
        ));
        let pivot = Vec3::new(1.0, 2.0, 3.0);
        let local_before = arena.coordinates_of(id, pivot);

        arena.rotate_around_point(
            id,
            Quaternion::from_axis_angle(Vec3::Y, 0.7),
            pivot,
        );

        let local_after = arena.coordinates_of(id, pivot);
        assert!((local_after - local_before).length() < EPS);
        // The frame origin actually orbited the pivot.
        assert!(
            ((arena.position(id) - pivot).length()
                - (Vec3::new(5.0, 0.0, 0.0) - pivot).length())
            .abs()
                < EPS
        );
    }

    #[test]
    fn align_with_world_snaps_axes() {
        let mut arena = FrameArena::new();
        // Slightly off axis-aligned.
        let q = Quaternion::from_axis_angle(Vec3::new(0.1, 1.0, 0.05), 0.12);
        let id = arena
            .insert(Frame::from_translation_rotation(Vec3::ZERO, q));

        arena.align_with(id, None, false, 0.85);

        // Every local axis should now be (anti-)parallel to a world axis.
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            let world = arena.inverse_transform_of(id, axis);
            let best = [Vec3::X, Vec3::Y, Vec3::Z]
                .iter()
                .map(|a| world.dot(*a).abs())
                .fold(0.0f32, f32::max);
            assert!(best > 1.0 - 1e-3, "axis {axis:?} not aligned: {world:?}");
        }
    }

    #[test]
    fn translate_accumulates_and_respects_missing_constraint() {
        let mut arena = FrameArena::new();
        let id = arena.insert(Frame::new());
        arena.translate(id, Vec3::X);
        arena.translate(id, Vec3::Y);
        assert_eq!(
            arena.get(id).unwrap().translation(),
            Vec3::new(1.0, 1.0, 0.0)
        );
    }
}
