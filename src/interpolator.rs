//! Keyframe interpolation along a camera or object path.
//!
//! A [`KeyFrameInterpolator`] owns an ordered list of keyframes
//! (time, position, orientation) and drives one target frame through
//! them: Catmull-Rom cubic splines for position, squad for
//! orientation, so the path is C1-continuous at the keyframes.
//! Playback runs on a repeating [`TimerService`] timer; evaluation at
//! an arbitrary time is also available directly through
//! [`interpolate_at_time`](KeyFrameInterpolator::interpolate_at_time).

use glam::Vec3;

use crate::error::ViewError;
use crate::frame::{FrameArena, FrameId};
use crate::math::Quaternion;
use crate::timer::{TimerHandle, TimerService};

/// One sampled pose on the path.
#[derive(Debug, Clone, Copy)]
struct KeyFrame {
    time: f32,
    position: Vec3,
    orientation: Quaternion,
    /// Catmull-Rom position tangent, valid while `values_valid`.
    tg_p: Vec3,
    /// Squad orientation tangent, valid while `values_valid`.
    tg_q: Quaternion,
}

impl KeyFrame {
    fn new(time: f32, position: Vec3, orientation: Quaternion) -> Self {
        Self {
            time,
            position,
            orientation,
            tg_p: Vec3::ZERO,
            tg_q: orientation,
        }
    }
}

/// Interpolates a target frame along a keyframed path.
#[derive(Debug)]
pub struct KeyFrameInterpolator {
    frame: FrameId,
    keyframes: Vec<KeyFrame>,

    // Playback state.
    interpolation_time: f32,
    interpolation_speed: f32,
    period_ms: f32,
    loop_interpolation: bool,
    timer: Option<TimerHandle>,

    // Evaluation caches.
    /// Index of the keyframe at or before the last evaluated time.
    cursor: usize,
    values_valid: bool,
    splines_valid: bool,
    v1: Vec3,
    v2: Vec3,
}

impl KeyFrameInterpolator {
    /// Interpolator driving `frame`. Starts with no keyframes.
    #[must_use]
    pub fn new(frame: FrameId) -> Self {
        Self {
            frame,
            keyframes: Vec::new(),
            interpolation_time: 0.0,
            interpolation_speed: 1.0,
            period_ms: 40.0,
            loop_interpolation: false,
            timer: None,
            cursor: 0,
            values_valid: true,
            splines_valid: false,
            v1: Vec3::ZERO,
            v2: Vec3::ZERO,
        }
    }

    /// The driven frame.
    #[must_use]
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Retarget the interpolator to another frame.
    pub fn set_frame(&mut self, frame: FrameId) {
        self.frame = frame;
    }

    /// Number of keyframes on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Time of the first keyframe (0 when empty).
    #[must_use]
    pub fn first_time(&self) -> f32 {
        self.keyframes.first().map_or(0.0, |k| k.time)
    }

    /// Time of the last keyframe (0 when empty).
    #[must_use]
    pub fn last_time(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// `last_time() - first_time()`.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.last_time() - self.first_time()
    }

    /// Current playback time.
    #[must_use]
    pub fn interpolation_time(&self) -> f32 {
        self.interpolation_time
    }

    /// Set the playback time without evaluating the path.
    pub fn set_interpolation_time(&mut self, time: f32) {
        self.interpolation_time = time;
    }

    /// Playback speed multiplier (negative plays backwards).
    #[must_use]
    pub fn interpolation_speed(&self) -> f32 {
        self.interpolation_speed
    }

    /// Set the playback speed multiplier.
    pub fn set_interpolation_speed(&mut self, speed: f32) {
        self.interpolation_speed = speed;
    }

    /// Milliseconds between playback updates.
    #[must_use]
    pub fn interpolation_period(&self) -> f32 {
        self.period_ms
    }

    /// Set the playback update period in milliseconds.
    pub fn set_interpolation_period(&mut self, period_ms: f32) {
        self.period_ms = period_ms.max(1.0);
    }

    /// Whether playback wraps around at the path boundaries.
    #[must_use]
    pub fn loop_interpolation(&self) -> bool {
        self.loop_interpolation
    }

    /// Enable or disable wrap-around playback.
    pub fn set_loop_interpolation(&mut self, looped: bool) {
        self.loop_interpolation = looped;
    }

    /// Whether playback is running.
    #[must_use]
    pub fn is_interpolation_started(&self) -> bool {
        self.timer.is_some()
    }

    /// The live playback timer, when running. The host forwards its
    /// firings to [`update`](Self::update).
    #[must_use]
    pub fn timer_handle(&self) -> Option<TimerHandle> {
        self.timer
    }

    // ── Path edition ───────────────────────────────────────────────

    /// Append a keyframe. `time` must be at least the last keyframe's
    /// time (an equal time makes an instant jump); earlier times are
    /// rejected and the path is unchanged.
    pub fn add_key_frame(
        &mut self,
        time: f32,
        position: Vec3,
        orientation: Quaternion,
    ) -> Result<(), ViewError> {
        if let Some(last) = self.keyframes.last() {
            if time < last.time {
                log::warn!(
                    "keyframe at t={time} rejected: path already ends at t={}",
                    last.time
                );
                return Err(ViewError::NonMonotoneKeyFrame {
                    time,
                    last: last.time,
                });
            }
        }
        self.keyframes.push(KeyFrame::new(time, position, orientation));
        self.values_valid = false;
        self.splines_valid = false;
        Ok(())
    }

    /// Append a keyframe copying `source`'s current world pose.
    pub fn add_key_frame_for(
        &mut self,
        time: f32,
        source: FrameId,
        arena: &FrameArena,
    ) -> Result<(), ViewError> {
        self.add_key_frame(
            time,
            arena.position(source),
            arena.orientation(source),
        )
    }

    /// Remove the keyframe at `index` (no-op when out of range). The
    /// neighbors' tangents and the evaluation caches are invalidated.
    pub fn remove_key_frame(&mut self, index: usize) {
        if index >= self.keyframes.len() {
            return;
        }
        let _ = self.keyframes.remove(index);
        self.cursor = 0;
        self.values_valid = false;
        self.splines_valid = false;
    }

    /// Drop all keyframes and reset playback to the start.
    pub fn clear(&mut self) {
        self.keyframes.clear();
        self.cursor = 0;
        self.interpolation_time = 0.0;
        self.values_valid = true;
        self.splines_valid = false;
    }

    /// Rewind playback to the first keyframe.
    pub fn reset(&mut self) {
        self.interpolation_time = self.first_time();
        self.cursor = 0;
        self.splines_valid = false;
    }

    // ── Playback ───────────────────────────────────────────────────

    /// Start playback on a repeating timer. Restarting is a no-op.
    /// Playing forward from at-or-past the end rewinds first (and
    /// symmetrically for backward playback).
    pub fn start(&mut self, timers: &mut dyn TimerService) {
        if self.timer.is_some() || self.keyframes.is_empty() {
            return;
        }
        if self.interpolation_speed > 0.0
            && self.interpolation_time >= self.last_time()
        {
            self.interpolation_time = self.first_time();
        }
        if self.interpolation_speed < 0.0
            && self.interpolation_time <= self.first_time()
        {
            self.interpolation_time = self.last_time();
        }
        self.timer = Some(timers.schedule(self.period_ms, true));
        log::debug!("keyframe playback started at t={}", self.interpolation_time);
    }

    /// Stop playback, leaving the target frame where it is.
    pub fn stop(&mut self, timers: &mut dyn TimerService) {
        if let Some(handle) = self.timer.take() {
            timers.cancel(handle);
            log::debug!(
                "keyframe playback stopped at t={}",
                self.interpolation_time
            );
        }
    }

    /// One playback step: evaluate at the current time, then advance
    /// it by `speed · period`. At a boundary, either wraps (loop mode)
    /// or clamps and stops. Called by the host when the playback timer
    /// fires.
    pub fn update(
        &mut self,
        arena: &mut FrameArena,
        timers: &mut dyn TimerService,
    ) {
        if self.timer.is_none() {
            return;
        }
        self.interpolate_at_time(self.interpolation_time, arena);
        self.interpolation_time +=
            self.interpolation_speed * self.period_ms / 1000.0;

        if self.interpolation_speed > 0.0
            && self.interpolation_time > self.last_time()
        {
            if self.loop_interpolation && self.duration() > 0.0 {
                self.interpolation_time =
                    self.first_time() + self.interpolation_time
                        - self.last_time();
            } else {
                self.interpolation_time = self.last_time();
                self.interpolate_at_time(self.interpolation_time, arena);
                self.stop(timers);
            }
        } else if self.interpolation_speed < 0.0
            && self.interpolation_time < self.first_time()
        {
            if self.loop_interpolation && self.duration() > 0.0 {
                self.interpolation_time =
                    self.last_time() + self.interpolation_time
                        - self.first_time();
            } else {
                self.interpolation_time = self.first_time();
                self.interpolate_at_time(self.interpolation_time, arena);
                self.stop(timers);
            }
        }
    }

    // ── Evaluation ─────────────────────────────────────────────────

    /// Evaluate the path at `time` and write the pose to the target
    /// frame through its constrained setters. Times outside the path
    /// clamp to the end keyframes. No-op on an empty path.
    pub fn interpolate_at_time(&mut self, time: f32, arena: &mut FrameArena) {
        if self.keyframes.is_empty() {
            return;
        }
        self.interpolation_time = time;
        self.update_tangents();

        let (position, orientation) = if self.keyframes.len() == 1 {
            let k = &self.keyframes[0];
            (k.position, k.orientation)
        } else {
            self.update_cursor(time);
            let k1 = self.keyframes[self.cursor];
            let k2 = self.keyframes[(self.cursor + 1).min(self.keyframes.len() - 1)];
            let dt = k2.time - k1.time;
            let alpha = if dt > 0.0 {
                ((time - k1.time) / dt).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let position = k1.position
                + alpha * (k1.tg_p + alpha * (self.v1 + alpha * self.v2));
            let orientation = Quaternion::squad(
                &k1.orientation,
                &k1.tg_q,
                &k2.tg_q,
                &k2.orientation,
                alpha,
            );
            (position, orientation)
        };

        arena.set_position_with_constraint(self.frame, position);
        arena.set_orientation_with_constraint(self.frame, orientation);
    }

    /// Move the bracketing cursor to the interval containing `time`
    /// (amortized O(1) for monotone queries) and refresh the cubic
    /// coefficients when the interval changed.
    fn update_cursor(&mut self, time: f32) {
        let last = self.keyframes.len() - 2;
        let old = self.cursor;
        let mut cursor = self.cursor.min(last);
        while cursor > 0 && self.keyframes[cursor].time > time {
            cursor -= 1;
        }
        while cursor < last && self.keyframes[cursor + 1].time <= time {
            cursor += 1;
        }
        self.cursor = cursor;

        if !self.splines_valid || cursor != old {
            let k1 = &self.keyframes[cursor];
            let k2 = &self.keyframes[cursor + 1];
            let delta = k2.position - k1.position;
            self.v1 = 3.0 * delta - 2.0 * k1.tg_p - k2.tg_p;
            self.v2 = -2.0 * delta + k1.tg_p + k2.tg_p;
            self.splines_valid = true;
        }
    }

    /// Recompute all tangents when the path was edited. End keyframes
    /// use themselves as the missing neighbor.
    fn update_tangents(&mut self) {
        if self.values_valid {
            return;
        }
        let n = self.keyframes.len();
        for i in 0..n {
            let prev = self.keyframes[if i == 0 { 0 } else { i - 1 }];
            let next = self.keyframes[(i + 1).min(n - 1)];
            let k = &mut self.keyframes[i];
            k.tg_p = 0.5 * (next.position - prev.position);
            k.tg_q = Quaternion::squad_tangent(
                &prev.orientation,
                &k.orientation,
                &next.orientation,
            );
        }
        self.values_valid = true;
        self.splines_valid = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::timer::ManualTimers;

    const EPS: f32 = 1e-4;

    fn setup() -> (FrameArena, KeyFrameInterpolator) {
        let mut arena = FrameArena::new();
        let id = arena.insert(Frame::new());
        (arena, KeyFrameInterpolator::new(id))
    }

    fn straight_path(kfi: &mut KeyFrameInterpolator) {
        for (t, x) in [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)] {
            kfi.add_key_frame(
                t,
                Vec3::new(x, 0.0, 0.0),
                Quaternion::IDENTITY,
            )
            .unwrap();
        }
    }

    #[test]
    fn rejects_decreasing_times() {
        let (_, mut kfi) = setup();
        kfi.add_key_frame(1.0, Vec3::ZERO, Quaternion::IDENTITY).unwrap();
        let err = kfi
            .add_key_frame(0.5, Vec3::X, Quaternion::IDENTITY)
            .unwrap_err();
        assert!(matches!(
            err,
            ViewError::NonMonotoneKeyFrame { time, last }
                if time == 0.5 && last == 1.0
        ));
        assert_eq!(kfi.len(), 1);
    }

    #[test]
    fn equal_time_keyframe_makes_an_instant_jump() {
        let (mut arena, mut kfi) = setup();
        for (t, x) in [(0.0, 0.0), (1.0, 1.0), (1.0, 3.0), (2.0, 4.0)] {
            kfi.add_key_frame(
                t,
                Vec3::new(x, 0.0, 0.0),
                Quaternion::IDENTITY,
            )
            .unwrap();
        }
        assert_eq!(kfi.len(), 4);
        let id = kfi.frame();
        // At the shared time the path has already jumped to the later
        // keyframe.
        kfi.interpolate_at_time(1.0, &mut arena);
        assert!((arena.position(id).x - 3.0).abs() < EPS);
        kfi.interpolate_at_time(2.0, &mut arena);
        assert!((arena.position(id).x - 4.0).abs() < EPS);
    }

    #[test]
    fn passes_through_every_keyframe() {
        let (mut arena, mut kfi) = setup();
        let poses = [
            (0.0, Vec3::ZERO, Quaternion::IDENTITY),
            (1.0, Vec3::new(2.0, 1.0, 0.0), Quaternion::from_axis_angle(Vec3::Y, 0.8)),
            (2.5, Vec3::new(-1.0, 3.0, 2.0), Quaternion::from_axis_angle(Vec3::X, 1.4)),
            (4.0, Vec3::new(0.0, 0.0, 5.0), Quaternion::from_axis_angle(Vec3::Z, 2.0)),
        ];
        for (t, p, q) in poses {
            kfi.add_key_frame(t, p, q).unwrap();
        }
        let id = kfi.frame();
        for (t, p, q) in poses {
            kfi.interpolate_at_time(t, &mut arena);
            assert!((arena.position(id) - p).length() < EPS, "t={t}");
            assert!(arena.orientation(id).dot(&q).abs() > 1.0 - EPS, "t={t}");
        }
    }

    #[test]
    fn stays_strictly_between_bracketing_keyframes() {
        let (mut arena, mut kfi) = setup();
        straight_path(&mut kfi);
        let id = kfi.frame();
        for i in 1..40 {
            let t = 3.0 * i as f32 / 40.0;
            kfi.interpolate_at_time(t, &mut arena);
            let x = arena.position(id).x;
            let lo = t.floor();
            let hi = (t.floor() + 1.0).min(3.0);
            if (t - lo).abs() > EPS && (t - hi).abs() > EPS {
                assert!(x > lo - EPS && x < hi + EPS, "t={t} x={x}");
            }
        }
    }

    #[test]
    fn evaluation_is_continuous_across_brackets() {
        let (mut arena, mut kfi) = setup();
        let mut t = 0.0;
        for (p, q_angle) in [
            (Vec3::ZERO, 0.0),
            (Vec3::new(1.0, 2.0, 0.0), 0.5),
            (Vec3::new(3.0, 1.0, -1.0), 1.2),
            (Vec3::new(4.0, -2.0, 2.0), 0.3),
        ] {
            kfi.add_key_frame(
                t,
                p,
                Quaternion::from_axis_angle(Vec3::Y, q_angle),
            )
            .unwrap();
            t += 1.0;
        }
        let id = kfi.frame();
        // Sample around the interior keyframe at t=1 from both sides.
        kfi.interpolate_at_time(1.0 - 1e-3, &mut arena);
        let before = arena.position(id);
        kfi.interpolate_at_time(1.0 + 1e-3, &mut arena);
        let after = arena.position(id);
        assert!((before - after).length() < 0.05, "{before:?} {after:?}");
    }

    #[test]
    fn cursor_handles_backward_queries() {
        let (mut arena, mut kfi) = setup();
        straight_path(&mut kfi);
        let id = kfi.frame();
        kfi.interpolate_at_time(2.7, &mut arena);
        kfi.interpolate_at_time(0.3, &mut arena);
        assert!((arena.position(id).x - 0.3).abs() < 0.05);
    }

    #[test]
    fn out_of_range_times_clamp() {
        let (mut arena, mut kfi) = setup();
        straight_path(&mut kfi);
        let id = kfi.frame();
        kfi.interpolate_at_time(-5.0, &mut arena);
        assert!((arena.position(id).x - 0.0).abs() < EPS);
        kfi.interpolate_at_time(50.0, &mut arena);
        assert!((arena.position(id).x - 3.0).abs() < EPS);
    }

    #[test]
    fn playback_reaches_the_end_and_stops() {
        let (mut arena, mut kfi) = setup();
        let mut timers = ManualTimers::new();
        straight_path(&mut kfi);
        kfi.set_interpolation_period(100.0);
        kfi.set_interpolation_speed(2.0);
        kfi.start(&mut timers);
        assert!(kfi.is_interpolation_started());

        // 3s of path at 2x and 100ms per step: 15 steps plus the
        // clamping one.
        for _ in 0..20 {
            for handle in timers.advance(100.0) {
                if Some(handle) == kfi.timer_handle() {
                    kfi.update(&mut arena, &mut timers);
                }
            }
        }
        assert!(!kfi.is_interpolation_started());
        assert!((arena.position(kfi.frame()).x - 3.0).abs() < EPS);
        assert!(timers.is_empty());
    }

    #[test]
    fn looped_playback_wraps() {
        let (mut arena, mut kfi) = setup();
        let mut timers = ManualTimers::new();
        straight_path(&mut kfi);
        kfi.set_loop_interpolation(true);
        kfi.set_interpolation_period(500.0);
        kfi.start(&mut timers);

        for _ in 0..8 {
            for handle in timers.advance(500.0) {
                if Some(handle) == kfi.timer_handle() {
                    kfi.update(&mut arena, &mut timers);
                }
            }
        }
        assert!(kfi.is_interpolation_started());
        // 8 × 0.5s wrapped over a 3s path: t = 4.0 − 3.0 = 1.0.
        assert!((kfi.interpolation_time() - 1.0).abs() < EPS);
        kfi.stop(&mut timers);
        assert!(timers.is_empty());
    }

    #[test]
    fn remove_key_frame_shortens_the_path() {
        let (mut arena, mut kfi) = setup();
        straight_path(&mut kfi);
        kfi.remove_key_frame(3);
        assert_eq!(kfi.len(), 3);
        assert_eq!(kfi.last_time(), 2.0);
        kfi.interpolate_at_time(2.0, &mut arena);
        assert!((arena.position(kfi.frame()).x - 2.0).abs() < EPS);
        // Out of range is a no-op.
        kfi.remove_key_frame(10);
        assert_eq!(kfi.len(), 3);
    }

    #[test]
    fn restart_after_finish_rewinds() {
        let (_, mut kfi) = setup();
        let mut timers = ManualTimers::new();
        straight_path(&mut kfi);
        kfi.set_interpolation_time(3.0);
        kfi.start(&mut timers);
        assert_eq!(kfi.interpolation_time(), 0.0);
        kfi.stop(&mut timers);
    }
}
