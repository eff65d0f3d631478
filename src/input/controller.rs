//! The mouse-gesture state machine.
//!
//! [`InteractionController`] turns press/move/release/wheel events
//! into camera and frame transforms. One action is active at a time;
//! a new press implicitly ends the previous action. Gesture targets
//! resolve in order: the pointer-grabber under the cursor, then the
//! explicit interactive frame (when the frame binding table binds the
//! chord), then the camera.
//!
//! Release with enough cursor speed hands a rotation gesture over to
//! an inertial spin timer that replays the last per-move rotation at
//! the sampled move cadence until the next press cancels it. Fly
//! actions run their translation on a repeating timer while the
//! button is held.

use glam::Vec3;

use super::bindings::{BindingProfile, MouseAction};
use super::event::Chord;
use super::grab::PointerGrabber;
use crate::camera::{Camera, ScreenRegion};
use crate::frame::{Frame, FrameArena, FrameId};
use crate::math::Quaternion;
use crate::options::ControllerOptions;
use crate::timer::{TimerHandle, TimerService};

/// How long the post-wheel redraw pulse lasts.
const WHEEL_PULSE_MS: f32 = 70.0;

/// Cursor travel (pixels) before a screen-translate locks its axis.
const SCREEN_AXIS_LOCK_PX: f32 = 8.0;

/// What a gesture currently manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureTarget {
    /// The camera's frame.
    Camera,
    /// A scene frame (grabbed or interactive).
    Frame(FrameId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenAxis {
    Horizontal,
    Vertical,
}

/// Gesture state machine turning pointer events into transforms.
pub struct InteractionController {
    bindings: BindingProfile,

    rotation_sensitivity: f32,
    translation_sensitivity: f32,
    zoom_sensitivity: f32,
    wheel_sensitivity: f32,
    /// Cursor speed (px/ms) at release above which spinning starts.
    spinning_sensitivity: f32,
    /// World units per fly update; 0 means 1% of the scene radius.
    fly_speed: f32,
    fly_period_ms: f32,

    grabbers: Vec<Box<dyn PointerGrabber>>,
    interactive_frame: Option<FrameId>,
    hovered: Option<FrameId>,

    action: MouseAction,
    target: GestureTarget,

    prev_x: f32,
    prev_y: f32,
    press_x: f32,
    press_y: f32,
    last_move_ms: f32,
    /// Sampled cursor speed in px/ms.
    mouse_speed: f32,
    /// Last inter-move delay, reused as the spin period.
    delay_ms: f32,
    screen_axis: Option<ScreenAxis>,

    spinning_quaternion: Quaternion,
    spin_target: GestureTarget,
    spin_timer: Option<TimerHandle>,

    fly_action: MouseAction,
    fly_timer: Option<TimerHandle>,
    drive_speed: f32,
    fly_up_vector: Vec3,

    wheel_timer: Option<TimerHandle>,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("action", &self.action)
            .field("target", &self.target)
            .field("grabbers", &self.grabbers.len())
            .field("spinning", &self.spin_timer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(BindingProfile::default())
    }
}

impl InteractionController {
    /// Controller with the given binding tables and default tuning.
    #[must_use]
    pub fn new(bindings: BindingProfile) -> Self {
        Self {
            bindings,
            rotation_sensitivity: 1.0,
            translation_sensitivity: 1.0,
            zoom_sensitivity: 1.0,
            wheel_sensitivity: 1.0,
            spinning_sensitivity: 1.15,
            fly_speed: 0.0,
            fly_period_ms: 40.0,
            grabbers: Vec::new(),
            interactive_frame: None,
            hovered: None,
            action: MouseAction::Idle,
            target: GestureTarget::Camera,
            prev_x: 0.0,
            prev_y: 0.0,
            press_x: 0.0,
            press_y: 0.0,
            last_move_ms: 0.0,
            mouse_speed: 0.0,
            delay_ms: 0.0,
            screen_axis: None,
            spinning_quaternion: Quaternion::IDENTITY,
            spin_target: GestureTarget::Camera,
            spin_timer: None,
            fly_action: MouseAction::Idle,
            fly_timer: None,
            drive_speed: 0.0,
            fly_up_vector: Vec3::Y,
            wheel_timer: None,
        }
    }

    /// Replace the binding tables.
    pub fn set_bindings(&mut self, bindings: BindingProfile) {
        self.bindings = bindings;
    }

    /// The binding tables.
    #[must_use]
    pub fn bindings(&self) -> &BindingProfile {
        &self.bindings
    }

    /// Apply serializable tuning options.
    pub fn apply_options(&mut self, options: &ControllerOptions) {
        self.rotation_sensitivity = options.rotation_sensitivity;
        self.translation_sensitivity = options.translation_sensitivity;
        self.zoom_sensitivity = options.zoom_sensitivity;
        self.wheel_sensitivity = options.wheel_sensitivity;
        self.spinning_sensitivity = options.spinning_sensitivity;
        self.fly_speed = options.fly_speed;
        self.fly_period_ms = options.fly_update_period_ms.max(1.0);
    }

    /// Set (or clear) the frame manipulated by frame-table chords when
    /// no grabber claims the pointer.
    pub fn set_interactive_frame(&mut self, frame: Option<FrameId>) {
        self.interactive_frame = frame;
    }

    /// The explicit interactive frame.
    #[must_use]
    pub fn interactive_frame(&self) -> Option<FrameId> {
        self.interactive_frame
    }

    /// Add a pointer grabber to the pool.
    pub fn add_grabber(&mut self, grabber: Box<dyn PointerGrabber>) {
        self.grabbers.push(grabber);
    }

    /// Drop all pointer grabbers.
    pub fn clear_grabbers(&mut self) {
        self.grabbers.clear();
        self.hovered = None;
    }

    /// The grabber frame under the cursor after the last idle move.
    #[must_use]
    pub fn hovered_frame(&self) -> Option<FrameId> {
        self.hovered
    }

    /// The action currently being performed.
    #[must_use]
    pub fn current_action(&self) -> MouseAction {
        self.action
    }

    /// The target of the current (or last) gesture.
    #[must_use]
    pub fn current_target(&self) -> GestureTarget {
        self.target
    }

    /// Whether an inertial spin is running.
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        self.spin_timer.is_some()
    }

    fn grabber_at(
        &self,
        x: f32,
        y: f32,
        camera: &Camera,
        arena: &FrameArena,
    ) -> Option<FrameId> {
        self.grabbers
            .iter()
            .find(|g| g.grabs_pointer(x, y, camera, arena))
            .map(|g| g.frame())
    }

    // ── Event entry points ─────────────────────────────────────────

    /// Button press: ends any previous action, cancels spinning,
    /// resolves the target and starts the bound action.
    pub fn mouse_press(
        &mut self,
        pos: (f32, f32),
        chord: Chord,
        time_ms: f32,
        camera: &Camera,
        arena: &mut FrameArena,
        timers: &mut dyn TimerService,
    ) {
        let (x, y) = pos;
        self.stop_spinning(timers);
        self.end_action(timers);

        let (target, action) = self.resolve(x, y, chord, camera, arena);
        self.target = target;
        self.action = action;
        self.prev_x = x;
        self.prev_y = y;
        self.press_x = x;
        self.press_y = y;
        self.last_move_ms = time_ms;
        self.mouse_speed = 0.0;
        self.delay_ms = 0.0;
        self.screen_axis = None;
        log::debug!("press {chord:?} -> {action:?} on {target:?}");

        if matches!(
            action,
            MouseAction::MoveForward
                | MouseAction::MoveBackward
                | MouseAction::Drive
        ) {
            self.fly_action = action;
            self.drive_speed = 0.0;
            self.fly_timer = Some(timers.schedule(self.fly_period_ms, true));
        }
    }

    fn resolve(
        &self,
        x: f32,
        y: f32,
        chord: Chord,
        camera: &Camera,
        arena: &FrameArena,
    ) -> (GestureTarget, MouseAction) {
        if let Some(action) = self.bindings.frame_action(chord) {
            let frame = self
                .grabber_at(x, y, camera, arena)
                .or_else(|| {
                    self.interactive_frame.filter(|id| arena.contains(*id))
                });
            if let Some(frame) = frame {
                // Fly and region actions only make sense on the camera.
                if matches!(
                    action,
                    MouseAction::MoveForward
                        | MouseAction::MoveBackward
                        | MouseAction::Drive
                        | MouseAction::LookAround
                        | MouseAction::ZoomOnRegion
                ) {
                    log::debug!("{action:?} ignored on frame target");
                    return (GestureTarget::Frame(frame), MouseAction::Idle);
                }
                return (GestureTarget::Frame(frame), action);
            }
        }
        (
            GestureTarget::Camera,
            self.bindings.camera_action(chord).unwrap_or(MouseAction::Idle),
        )
    }

    /// Cursor move: advances the active gesture, or refreshes the
    /// hovered grabber while idle.
    pub fn mouse_move(
        &mut self,
        pos: (f32, f32),
        time_ms: f32,
        camera: &Camera,
        arena: &mut FrameArena,
    ) {
        let (x, y) = pos;
        if self.action == MouseAction::Idle {
            self.hovered = self.grabber_at(x, y, camera, arena);
            self.prev_x = x;
            self.prev_y = y;
            return;
        }

        self.sample_speed(x, y, time_ms);

        match self.target {
            GestureTarget::Camera => self.move_camera(x, y, camera, arena),
            GestureTarget::Frame(frame) => {
                self.move_frame(x, y, frame, camera, arena);
            }
        }

        self.prev_x = x;
        self.prev_y = y;
    }

    /// Button release: finishes the gesture. A rotate or screen-rotate
    /// released at speed starts the inertial spin; zoom-on-region fits
    /// the camera to the dragged rectangle.
    pub fn mouse_release(
        &mut self,
        pos: (f32, f32),
        camera: &Camera,
        arena: &mut FrameArena,
        timers: &mut dyn TimerService,
    ) {
        match self.action {
            MouseAction::Rotate | MouseAction::ScreenRotate => {
                if self.mouse_speed >= self.spinning_sensitivity {
                    self.spin_target = self.target;
                    self.spin_timer =
                        Some(timers.schedule(self.delay_ms.max(1.0), true));
                    log::debug!(
                        "spinning started on {:?} at {:.2} px/ms",
                        self.spin_target,
                        self.mouse_speed
                    );
                }
            }
            MouseAction::ZoomOnRegion => {
                if self.target == GestureTarget::Camera {
                    let region = ScreenRegion::from_corners(
                        (self.press_x, self.press_y),
                        pos,
                    );
                    if region.width > 1.0 && region.height > 1.0 {
                        camera.fit_screen_region(arena, region);
                    }
                }
            }
            _ => {}
        }
        self.end_action(timers);
    }

    /// Wheel step: immediate zoom impulse on the camera plus a brief
    /// one-shot timer the host can use as a redraw pulse. Positive
    /// `delta` zooms in.
    pub fn wheel(
        &mut self,
        delta: f32,
        camera: &Camera,
        arena: &mut FrameArena,
        timers: &mut dyn TimerService,
    ) {
        let coef = self.zoom_coefficient(camera, arena);
        let step = -coef * delta * self.wheel_sensitivity * 0.1;
        translate_in_local(arena, camera.frame(), Vec3::new(0.0, 0.0, step));

        if let Some(handle) = self.wheel_timer.take() {
            timers.cancel(handle);
        }
        self.wheel_timer = Some(timers.schedule(WHEEL_PULSE_MS, false));
    }

    /// Route a fired timer handle. Returns `true` when the handle
    /// belonged to this controller (spin step, fly step, wheel pulse).
    pub fn handle_timer(
        &mut self,
        handle: TimerHandle,
        camera: &Camera,
        arena: &mut FrameArena,
    ) -> bool {
        if self.spin_timer == Some(handle) {
            self.spin_step(camera, arena);
            return true;
        }
        if self.fly_timer == Some(handle) {
            self.fly_step(camera, arena);
            return true;
        }
        if self.wheel_timer == Some(handle) {
            self.wheel_timer = None;
            return true;
        }
        false
    }

    /// Cancel a running inertial spin.
    pub fn stop_spinning(&mut self, timers: &mut dyn TimerService) {
        if let Some(handle) = self.spin_timer.take() {
            timers.cancel(handle);
            log::debug!("spinning cancelled");
        }
    }

    fn end_action(&mut self, timers: &mut dyn TimerService) {
        if let Some(handle) = self.fly_timer.take() {
            timers.cancel(handle);
        }
        self.fly_action = MouseAction::Idle;
        self.action = MouseAction::Idle;
    }

    // ── Gesture math ───────────────────────────────────────────────

    fn sample_speed(&mut self, x: f32, y: f32, time_ms: f32) {
        let dist =
            ((x - self.prev_x).powi(2) + (y - self.prev_y).powi(2)).sqrt();
        let delay = time_ms - self.last_move_ms;
        self.last_move_ms = time_ms;
        if delay > 0.0 {
            self.mouse_speed = dist / delay;
            self.delay_ms = delay;
        } else {
            self.mouse_speed = dist;
        }
    }

    fn zoom_coefficient(&self, camera: &Camera, arena: &FrameArena) -> f32 {
        arena
            .coordinates_of(camera.frame(), camera.pivot_point())
            .z
            .abs()
            .max(0.2 * camera.scene_radius())
    }

    fn move_camera(
        &mut self,
        x: f32,
        y: f32,
        camera: &Camera,
        arena: &mut FrameArena,
    ) {
        let id = camera.frame();
        let w = camera.screen_width() as f32;
        let h = camera.screen_height() as f32;
        match self.action {
            MouseAction::Rotate => {
                let pivot =
                    camera.projected_coordinates_of(arena, camera.pivot_point());
                let rot = self.deformed_ball_quaternion(
                    x, y, pivot.x, pivot.y, w, h,
                );
                self.spinning_quaternion = rot;
                arena.rotate_around_point(id, rot, camera.pivot_point());
            }
            MouseAction::ScreenRotate => {
                let pivot =
                    camera.projected_coordinates_of(arena, camera.pivot_point());
                let angle = (y - pivot.y).atan2(x - pivot.x)
                    - (self.prev_y - pivot.y).atan2(self.prev_x - pivot.x);
                let rot = Quaternion::from_axis_angle(Vec3::Z, angle);
                self.spinning_quaternion = rot;
                arena.rotate_around_point(id, rot, camera.pivot_point());
            }
            MouseAction::Roll => {
                let angle =
                    std::f32::consts::PI * (x - self.prev_x) / w;
                arena.rotate(id, Quaternion::from_axis_angle(Vec3::Z, angle));
            }
            MouseAction::Translate | MouseAction::ScreenTranslate => {
                let mut dx = self.prev_x - x;
                let mut dy = y - self.prev_y;
                if self.action == MouseAction::ScreenTranslate {
                    self.lock_screen_axis(x, y);
                    match self.screen_axis {
                        Some(ScreenAxis::Horizontal) => dy = 0.0,
                        Some(ScreenAxis::Vertical) => dx = 0.0,
                        None => return,
                    }
                }
                let trans = self.screen_translation(
                    Vec3::new(dx, dy, 0.0),
                    camera.pivot_point(),
                    camera,
                    arena,
                );
                translate_in_local(
                    arena,
                    id,
                    self.translation_sensitivity * trans,
                );
            }
            MouseAction::Zoom => {
                let coef = self.zoom_coefficient(camera, arena);
                let step = -coef
                    * self.zoom_sensitivity
                    * (y - self.prev_y)
                    / h;
                translate_in_local(arena, id, Vec3::new(0.0, 0.0, step));
            }
            MouseAction::MoveForward
            | MouseAction::MoveBackward
            | MouseAction::LookAround => {
                let rot = self.pitch_yaw_quaternion(x, y, camera, arena);
                arena.rotate(id, rot);
            }
            MouseAction::Drive => {
                self.drive_speed = 0.01 * (y - self.press_y);
                let yaw = Quaternion::from_axis_angle(
                    arena.transform_of(id, self.fly_up_vector),
                    -self.rotation_sensitivity * (x - self.prev_x) / w,
                );
                arena.rotate(id, yaw);
            }
            MouseAction::ZoomOnRegion | MouseAction::Idle => {}
        }
    }

    fn move_frame(
        &mut self,
        x: f32,
        y: f32,
        frame: FrameId,
        camera: &Camera,
        arena: &mut FrameArena,
    ) {
        if !arena.contains(frame) {
            return;
        }
        let w = camera.screen_width() as f32;
        let origin = arena.position(frame);
        let camera_orientation = arena.orientation(camera.frame());
        match self.action {
            MouseAction::Rotate => {
                let center =
                    camera.projected_coordinates_of(arena, origin);
                let rot_cam = self.deformed_ball_quaternion(
                    x,
                    y,
                    center.x,
                    center.y,
                    w,
                    camera.screen_height() as f32,
                );
                // Camera-space rotation, inverted and re-expressed in
                // the frame's local basis.
                let axis_world = camera_orientation.rotate(Vec3::new(
                    -rot_cam.x, -rot_cam.y, -rot_cam.z,
                ));
                let axis_local = arena.transform_of(frame, axis_world);
                let rot = Quaternion::new(
                    axis_local.x,
                    axis_local.y,
                    axis_local.z,
                    rot_cam.w,
                );
                self.spinning_quaternion = rot;
                arena.rotate(frame, rot);
            }
            MouseAction::ScreenRotate => {
                let center =
                    camera.projected_coordinates_of(arena, origin);
                let angle = (y - center.y).atan2(x - center.x)
                    - (self.prev_y - center.y).atan2(self.prev_x - center.x);
                let axis_local = arena
                    .transform_of(frame, camera.view_direction(arena));
                let rot = Quaternion::from_axis_angle(axis_local, -angle);
                self.spinning_quaternion = rot;
                arena.rotate(frame, rot);
            }
            MouseAction::Roll => {
                let angle =
                    std::f32::consts::PI * (x - self.prev_x) / w;
                let axis_local = arena
                    .transform_of(frame, camera.view_direction(arena));
                let rot = Quaternion::from_axis_angle(axis_local, -angle);
                arena.rotate(frame, rot);
            }
            MouseAction::Translate | MouseAction::ScreenTranslate => {
                let mut dx = x - self.prev_x;
                let mut dy = self.prev_y - y;
                if self.action == MouseAction::ScreenTranslate {
                    self.lock_screen_axis(x, y);
                    match self.screen_axis {
                        Some(ScreenAxis::Horizontal) => dy = 0.0,
                        Some(ScreenAxis::Vertical) => dx = 0.0,
                        None => return,
                    }
                }
                let trans_cam = self.screen_translation(
                    Vec3::new(dx, dy, 0.0),
                    origin,
                    camera,
                    arena,
                );
                let delta_world = camera_orientation
                    .rotate(self.translation_sensitivity * trans_cam);
                translate_in_world(arena, frame, delta_world);
            }
            MouseAction::Zoom => {
                let coef = arena
                    .coordinates_of(camera.frame(), origin)
                    .z
                    .abs()
                    .max(0.2 * camera.scene_radius());
                let step = coef
                    * self.zoom_sensitivity
                    * (y - self.prev_y)
                    / camera.screen_height() as f32;
                let delta_world = camera.view_direction(arena) * step;
                translate_in_world(arena, frame, delta_world);
            }
            _ => {}
        }
    }

    /// Distance-dependent scale for a screen-plane translation in
    /// pixels: the dragged point stays under the cursor.
    fn screen_translation(
        &self,
        pixels: Vec3,
        depth_reference: Vec3,
        camera: &Camera,
        arena: &FrameArena,
    ) -> Vec3 {
        use crate::camera::ProjectionKind;
        let w = camera.screen_width() as f32;
        let h = camera.screen_height() as f32;
        match camera.projection_kind() {
            ProjectionKind::Perspective => {
                let z = arena
                    .coordinates_of(camera.frame(), depth_reference)
                    .z
                    .abs();
                pixels * (2.0 * (camera.field_of_view() / 2.0).tan() * z / h)
            }
            ProjectionKind::Orthographic => {
                let (half_w, half_h) = camera.ortho_width_height(arena);
                Vec3::new(
                    pixels.x * 2.0 * half_w / w,
                    pixels.y * 2.0 * half_h / h,
                    0.0,
                )
            }
        }
    }

    fn lock_screen_axis(&mut self, x: f32, y: f32) {
        if self.screen_axis.is_some() {
            return;
        }
        let dx = (x - self.press_x).abs();
        let dy = (y - self.press_y).abs();
        if dx.max(dy) >= SCREEN_AXIS_LOCK_PX {
            self.screen_axis = Some(if dx > dy {
                ScreenAxis::Horizontal
            } else {
                ScreenAxis::Vertical
            });
        }
    }

    /// Arcball rotation between the previous and current cursor
    /// positions, projected on a unit ball deformed into a hyperbolic
    /// sheet away from its center.
    fn deformed_ball_quaternion(
        &self,
        x: f32,
        y: f32,
        cx: f32,
        cy: f32,
        width: f32,
        height: f32,
    ) -> Quaternion {
        let px = self.rotation_sensitivity * (self.prev_x - cx) / width;
        let py = self.rotation_sensitivity * (cy - self.prev_y) / height;
        let dx = self.rotation_sensitivity * (x - cx) / width;
        let dy = self.rotation_sensitivity * (cy - y) / height;

        let p1 = Vec3::new(px, py, project_on_ball(px, py));
        let p2 = Vec3::new(dx, dy, project_on_ball(dx, dy));
        let axis = p2.cross(p1);
        let norm2 = axis.length_squared()
            / p1.length_squared()
            / p2.length_squared();
        let angle = 5.0 * norm2.sqrt().clamp(0.0, 1.0).asin();
        Quaternion::from_axis_angle(axis, angle)
    }

    /// Pitch from vertical motion, yaw around the fly-up vector from
    /// horizontal motion.
    fn pitch_yaw_quaternion(
        &self,
        x: f32,
        y: f32,
        camera: &Camera,
        arena: &FrameArena,
    ) -> Quaternion {
        let w = camera.screen_width() as f32;
        let h = camera.screen_height() as f32;
        let pitch = Quaternion::from_axis_angle(
            Vec3::X,
            self.rotation_sensitivity * (y - self.prev_y) / h,
        );
        let yaw = Quaternion::from_axis_angle(
            arena.transform_of(camera.frame(), self.fly_up_vector),
            -self.rotation_sensitivity * (x - self.prev_x) / w,
        );
        yaw * pitch
    }

    fn spin_step(&mut self, camera: &Camera, arena: &mut FrameArena) {
        match self.spin_target {
            GestureTarget::Camera => arena.rotate_around_point(
                camera.frame(),
                self.spinning_quaternion,
                camera.pivot_point(),
            ),
            GestureTarget::Frame(frame) => {
                arena.rotate(frame, self.spinning_quaternion);
            }
        }
    }

    fn fly_step(&mut self, camera: &Camera, arena: &mut FrameArena) {
        let base = if self.fly_speed > 0.0 {
            self.fly_speed
        } else {
            0.01 * camera.scene_radius()
        };
        let z = match self.fly_action {
            MouseAction::MoveForward => -base,
            MouseAction::MoveBackward => base,
            MouseAction::Drive => base * self.drive_speed,
            _ => return,
        };
        translate_in_local(arena, camera.frame(), Vec3::new(0.0, 0.0, z));
    }
}

/// Unit-ball projection deformed into `0.5/sqrt(d)` outside
/// `d = 0.5`, so far-from-center drags still rotate smoothly.
fn project_on_ball(x: f32, y: f32) -> f32 {
    let d = x * x + y * y;
    if d < 0.5 {
        (1.0 - d).sqrt()
    } else {
        0.5 / d.sqrt()
    }
}

/// Translate `id` by a delta expressed in its own local basis.
fn translate_in_local(arena: &mut FrameArena, id: FrameId, local: Vec3) {
    let world = arena.inverse_transform_of(id, local);
    translate_in_world(arena, id, world);
}

/// Translate `id` by a world-space delta through its constraint.
fn translate_in_world(arena: &mut FrameArena, id: FrameId, world: Vec3) {
    let delta_ref = match arena.get(id).and_then(Frame::reference) {
        Some(r) => arena.transform_of(r, world),
        None => world,
    };
    arena.translate(id, delta_ref);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::bindings::MouseAction;
    use crate::input::event::{Modifiers, MouseButton};
    use crate::input::grab::HotspotGrabber;
    use crate::timer::ManualTimers;

    const EPS: f32 = 1e-3;

    struct Rig {
        arena: FrameArena,
        camera: Camera,
        controller: InteractionController,
        timers: ManualTimers,
    }

    fn rig() -> Rig {
        let mut arena = FrameArena::new();
        let mut camera = Camera::new(&mut arena);
        camera.set_screen_width_height(400, 400);
        camera.set_scene_bounds(Vec3::ZERO, 1.0).unwrap();
        arena.set_position(camera.frame(), Vec3::new(0.0, 0.0, 5.0));
        Rig {
            arena,
            camera,
            controller: InteractionController::default(),
            timers: ManualTimers::new(),
        }
    }

    fn left() -> Chord {
        Chord::plain(MouseButton::Left)
    }

    #[test]
    fn rotate_gesture_orbits_the_pivot() {
        let mut r = rig();
        let id = r.camera.frame();
        let start = r.arena.position(id);
        let dist = (start - r.camera.pivot_point()).length();

        r.controller.mouse_press(
            (150.0, 200.0), left(), 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        assert_eq!(r.controller.current_action(), MouseAction::Rotate);
        r.controller
            .mouse_move((250.0, 200.0), 200.0, &r.camera, &mut r.arena);
        r.controller.mouse_release(
            (250.0, 200.0), &r.camera, &mut r.arena, &mut r.timers,
        );

        let end = r.arena.position(id);
        assert!((end - start).length() > 0.1, "camera did not move");
        assert!(
            ((end - r.camera.pivot_point()).length() - dist).abs() < EPS,
            "orbit radius changed"
        );
        assert_eq!(r.controller.current_action(), MouseAction::Idle);
        // 100 px over 200 ms is below the spin threshold.
        assert!(!r.controller.is_spinning());
    }

    #[test]
    fn fast_release_spins_until_next_press() {
        let mut r = rig();
        let id = r.camera.frame();

        r.controller.mouse_press(
            (150.0, 200.0), left(), 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        // 100 px in 16 ms: 6.25 px/ms, well above the threshold.
        r.controller
            .mouse_move((250.0, 200.0), 16.0, &r.camera, &mut r.arena);
        r.controller.mouse_release(
            (250.0, 200.0), &r.camera, &mut r.arena, &mut r.timers,
        );
        assert!(r.controller.is_spinning());

        let before = r.arena.position(id);
        for handle in r.timers.advance(64.0) {
            let _ = r.controller.handle_timer(handle, &r.camera, &mut r.arena);
        }
        let after = r.arena.position(id);
        assert!((after - before).length() > 0.01, "spin did not advance");

        // Non-decaying: another window of the same length moves the
        // camera by the same arc length.
        let again = {
            for handle in r.timers.advance(64.0) {
                let _ =
                    r.controller.handle_timer(handle, &r.camera, &mut r.arena);
            }
            r.arena.position(id)
        };
        assert!(
            (((again - after).length()) - ((after - before).length())).abs()
                < 0.05
        );

        // Next press cancels the spin.
        r.controller.mouse_press(
            (10.0, 10.0), left(), 500.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        assert!(!r.controller.is_spinning());
        assert!(r.timers.advance(1000.0).iter().all(|h| {
            !r.controller.handle_timer(*h, &r.camera, &mut r.arena)
        }));
    }

    #[test]
    fn zoom_drag_changes_distance_monotonically() {
        let mut r = rig();
        let id = r.camera.frame();
        let chord = Chord::plain(MouseButton::Middle);
        let before = r.arena.position(id).length();

        r.controller.mouse_press(
            (200.0, 200.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        // Drag down zooms toward the scene.
        r.controller
            .mouse_move((200.0, 300.0), 50.0, &r.camera, &mut r.arena);
        let closer = r.arena.position(id).length();
        assert!(closer < before);
        r.controller
            .mouse_move((200.0, 100.0), 100.0, &r.camera, &mut r.arena);
        let farther = r.arena.position(id).length();
        assert!(farther > closer);
        r.controller.mouse_release(
            (200.0, 100.0), &r.camera, &mut r.arena, &mut r.timers,
        );
    }

    #[test]
    fn translate_pans_in_the_screen_plane() {
        let mut r = rig();
        let id = r.camera.frame();
        let chord = Chord::plain(MouseButton::Right);

        r.controller.mouse_press(
            (200.0, 200.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        r.controller
            .mouse_move((240.0, 200.0), 50.0, &r.camera, &mut r.arena);
        let p = r.arena.position(id);
        // Dragging right pans the camera left along world X; depth is
        // untouched.
        assert!(p.x < 0.0);
        assert!((p.z - 5.0).abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    #[test]
    fn wheel_zooms_and_pulses_a_one_shot() {
        let mut r = rig();
        let id = r.camera.frame();
        let before = r.arena.position(id).z;

        r.controller
            .wheel(1.0, &r.camera, &mut r.arena, &mut r.timers);
        assert!(r.arena.position(id).z < before, "wheel-in did not advance");
        assert_eq!(r.timers.len(), 1);

        let fired = r.timers.advance(100.0);
        assert_eq!(fired.len(), 1);
        assert!(r.controller.handle_timer(fired[0], &r.camera, &mut r.arena));
        assert!(r.timers.is_empty());
    }

    #[test]
    fn ctrl_chord_manipulates_the_interactive_frame() {
        let mut r = rig();
        let object = r.arena.insert(Frame::new());
        r.controller.set_interactive_frame(Some(object));
        let chord = Chord::new(MouseButton::Left, Modifiers::CTRL);
        let camera_before = r.arena.position(r.camera.frame());

        r.controller.mouse_press(
            (180.0, 200.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        assert_eq!(
            r.controller.current_target(),
            GestureTarget::Frame(object)
        );
        r.controller
            .mouse_move((260.0, 240.0), 100.0, &r.camera, &mut r.arena);
        r.controller.mouse_release(
            (260.0, 240.0), &r.camera, &mut r.arena, &mut r.timers,
        );

        let q = r.arena.orientation(object);
        assert!(q.angle() > 0.05, "frame did not rotate");
        assert_eq!(r.arena.position(r.camera.frame()), camera_before);
    }

    #[test]
    fn grabber_takes_priority_over_interactive_frame() {
        let mut r = rig();
        let interactive = r.arena.insert(Frame::new());
        let grabbed = r.arena.insert(Frame::from_translation_rotation(
            Vec3::new(0.0, 0.0, 0.0),
            Quaternion::IDENTITY,
        ));
        r.controller.set_interactive_frame(Some(interactive));
        r.controller
            .add_grabber(Box::new(HotspotGrabber::new(grabbed, 50.0)));

        // The grabbed frame projects to the viewport center.
        let chord = Chord::new(MouseButton::Left, Modifiers::CTRL);
        r.controller.mouse_press(
            (200.0, 200.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        assert_eq!(
            r.controller.current_target(),
            GestureTarget::Frame(grabbed)
        );
        r.controller.mouse_release(
            (200.0, 200.0), &r.camera, &mut r.arena, &mut r.timers,
        );

        // Away from the hotspot, the interactive frame wins.
        r.controller.mouse_press(
            (390.0, 390.0), chord, 10.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        assert_eq!(
            r.controller.current_target(),
            GestureTarget::Frame(interactive)
        );
    }

    #[test]
    fn zoom_on_region_moves_in() {
        let mut r = rig();
        let chord = Chord::new(MouseButton::Middle, Modifiers::SHIFT);
        let before = r
            .arena
            .coordinates_of(r.camera.frame(), r.camera.scene_center())
            .z
            .abs();

        r.controller.mouse_press(
            (150.0, 150.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        assert_eq!(r.controller.current_action(), MouseAction::ZoomOnRegion);
        r.controller
            .mouse_move((250.0, 250.0), 50.0, &r.camera, &mut r.arena);
        r.controller.mouse_release(
            (250.0, 250.0), &r.camera, &mut r.arena, &mut r.timers,
        );

        let after = r
            .arena
            .coordinates_of(r.camera.frame(), r.camera.scene_center())
            .z
            .abs();
        assert!(after < before, "camera did not move in: {after} >= {before}");
    }

    #[test]
    fn fly_forward_advances_on_the_timer() {
        let mut r = rig();
        let mut profile = BindingProfile::default();
        profile.bind_camera(
            Chord::new(MouseButton::Left, Modifiers::ALT),
            MouseAction::MoveForward,
        );
        r.controller.set_bindings(profile);
        let id = r.camera.frame();
        let chord = Chord::new(MouseButton::Left, Modifiers::ALT);

        r.controller.mouse_press(
            (200.0, 200.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        let before = r.arena.position(id).z;
        for handle in r.timers.advance(200.0) {
            let _ = r.controller.handle_timer(handle, &r.camera, &mut r.arena);
        }
        // 5 ticks of 1% scene radius, straight toward the scene.
        assert!((r.arena.position(id).z - (before - 0.05)).abs() < EPS);

        r.controller.mouse_release(
            (200.0, 200.0), &r.camera, &mut r.arena, &mut r.timers,
        );
        assert!(r.timers.is_empty());
    }

    #[test]
    fn roll_release_never_spins() {
        let mut r = rig();
        let mut profile = BindingProfile::default();
        profile.bind_camera(
            Chord::new(MouseButton::Right, Modifiers::ALT),
            MouseAction::Roll,
        );
        r.controller.set_bindings(profile);
        let chord = Chord::new(MouseButton::Right, Modifiers::ALT);

        r.controller.mouse_press(
            (100.0, 200.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        // 150 px in 16 ms, far above the spin threshold.
        r.controller
            .mouse_move((250.0, 200.0), 16.0, &r.camera, &mut r.arena);
        r.controller.mouse_release(
            (250.0, 200.0), &r.camera, &mut r.arena, &mut r.timers,
        );

        assert!(r.arena.orientation(r.camera.frame()).angle() > 0.1);
        assert!(!r.controller.is_spinning());
        assert!(r.timers.is_empty());
    }

    #[test]
    fn unbound_chord_stays_idle() {
        let mut r = rig();
        let chord = Chord::new(MouseButton::Left, Modifiers::META);
        let before = r.arena.position(r.camera.frame());
        r.controller.mouse_press(
            (100.0, 100.0), chord, 0.0, &r.camera, &mut r.arena, &mut r.timers,
        );
        assert_eq!(r.controller.current_action(), MouseAction::Idle);
        r.controller
            .mouse_move((300.0, 300.0), 50.0, &r.camera, &mut r.arena);
        assert_eq!(r.arena.position(r.camera.frame()), before);
    }
}
