use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::core::Camera;
use crate::input::MouseButton;
use crate::options::{ControlOptions, InteractionPolicy};

/// Smallest polar angle / movement considered non-zero.
const EPS: f32 = 1e-6;

/// Zoom factor per wheel step at `zoom_speed = 1`.
const ZOOM_STEP: f32 = 0.95;

/// Wheel steps equivalent to a drag across the full viewport height.
const DRAG_DOLLY_STEPS: f32 = 10.0;

/// Effect a pointer drag has on the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Orbit around the target.
    Rotate,
    /// Move toward / away from the target.
    Dolly,
    /// Translate eye and target together.
    Pan,
    /// Ignore the gesture.
    None,
}

/// Button mapping and enable flags resolved from an [`InteractionPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBindings {
    /// Action bound to the left button.
    pub left: PointerAction,
    /// Action bound to the middle button.
    pub middle: PointerAction,
    /// Action bound to the right button.
    pub right: PointerAction,
    /// Whether orbiting is allowed at all.
    pub enable_rotate: bool,
    /// Whether dolly (wheel and drag) is allowed.
    pub enable_zoom: bool,
    /// Whether panning is allowed.
    pub enable_pan: bool,
}

impl ControlBindings {
    /// Resolve the bindings for a policy.
    #[must_use]
    pub fn for_policy(policy: InteractionPolicy) -> Self {
        match policy {
            InteractionPolicy::Free => Self {
                left: PointerAction::Rotate,
                middle: PointerAction::Dolly,
                right: PointerAction::Pan,
                enable_rotate: true,
                enable_zoom: true,
                enable_pan: true,
            },
            InteractionPolicy::PanLocked => Self {
                left: PointerAction::Pan,
                middle: PointerAction::Dolly,
                right: PointerAction::None,
                enable_rotate: false,
                enable_zoom: true,
                enable_pan: true,
            },
        }
    }

    /// Effective action for a button press, honoring the enable flags.
    #[must_use]
    pub fn action_for(&self, button: MouseButton) -> PointerAction {
        let action = match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
        };
        if self.allows(action) {
            action
        } else {
            PointerAction::None
        }
    }

    /// Whether `action` is permitted by the enable flags.
    #[must_use]
    pub fn allows(&self, action: PointerAction) -> bool {
        match action {
            PointerAction::Rotate => self.enable_rotate,
            PointerAction::Dolly => self.enable_zoom,
            PointerAction::Pan => self.enable_pan,
            PointerAction::None => false,
        }
    }
}

/// Orbit controls with damped inertia.
///
/// Gestures accumulate pending rotation, pan and zoom; [`update`](Self::update)
/// applies a `damping_factor` fraction of the pending motion to the camera
/// and decays the rest, so it must run exactly once per frame for the
/// motion to settle.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    bindings: ControlBindings,
    damping_factor: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    pan_speed: f32,
    min_distance: f32,
    max_distance: f32,
    /// Pending azimuth change (radians).
    theta_delta: f32,
    /// Pending polar change (radians).
    phi_delta: f32,
    pan_offset: Vec3,
    scale: f32,
    viewport_height: f32,
}

impl OrbitControls {
    /// Create controls for the given bindings.
    #[must_use]
    pub fn new(
        bindings: ControlBindings,
        options: &ControlOptions,
        viewport_height: u32,
    ) -> Self {
        Self {
            bindings,
            damping_factor: options.damping_factor.clamp(EPS, 1.0),
            rotate_speed: options.rotate_speed,
            zoom_speed: options.zoom_speed,
            pan_speed: options.pan_speed,
            min_distance: options.min_distance,
            max_distance: options.max_distance.max(options.min_distance),
            theta_delta: 0.0,
            phi_delta: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            viewport_height: viewport_height.max(1) as f32,
        }
    }

    /// Create controls for a policy using its default bindings.
    #[must_use]
    pub fn for_policy(options: &ControlOptions, viewport_height: u32) -> Self {
        Self::new(
            ControlBindings::for_policy(options.policy),
            options,
            viewport_height,
        )
    }

    /// The active button mapping.
    #[must_use]
    pub fn bindings(&self) -> &ControlBindings {
        &self.bindings
    }

    /// The inertia factor applied per update.
    #[must_use]
    pub fn damping_factor(&self) -> f32 {
        self.damping_factor
    }

    /// Track the surface height used to scale pointer deltas.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Queue an orbit by a pointer delta in pixels. No-op when rotation is
    /// disabled.
    pub fn rotate(&mut self, delta: Vec2) {
        if !self.bindings.enable_rotate {
            return;
        }
        let h = self.viewport_height;
        self.theta_delta -= TAU * delta.x / h * self.rotate_speed;
        self.phi_delta -= TAU * delta.y / h * self.rotate_speed;
    }

    /// Queue a screen-space pan by a pointer delta in pixels.
    pub fn pan(&mut self, delta: Vec2, camera: &Camera) {
        if !self.bindings.enable_pan {
            return;
        }
        // World units covered by one pixel at the target's depth.
        let half_fov = (camera.fovy.to_radians() / 2.0).tan();
        let target_distance = camera.distance() * half_fov;
        let world_per_pixel =
            2.0 * target_distance / self.viewport_height * self.pan_speed;

        let view_to_world = camera.view_matrix().inverse();
        let right = view_to_world.x_axis.truncate();
        let up = view_to_world.y_axis.truncate();
        self.pan_offset += right * (-delta.x * world_per_pixel)
            + up * (delta.y * world_per_pixel);
    }

    /// Queue a dolly by `steps` wheel notches (positive moves closer).
    pub fn dolly(&mut self, steps: f32) {
        if !self.bindings.enable_zoom {
            return;
        }
        self.scale *= ZOOM_STEP.powf(self.zoom_speed * steps);
    }

    /// Queue a dolly from a vertical drag of `delta_y` pixels. Dragging up
    /// moves closer; the amount depends only on the total distance dragged.
    pub fn dolly_drag(&mut self, delta_y: f32) {
        self.dolly(-delta_y / self.viewport_height * DRAG_DOLLY_STEPS);
    }

    /// Whether all pending motion has decayed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.theta_delta.abs() < EPS
            && self.phi_delta.abs() < EPS
            && self.pan_offset.length_squared() < EPS * EPS
            && (self.scale - 1.0).abs() < EPS
    }

    /// Apply one frame of damped motion to the camera. Returns `true` if
    /// the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.eye - camera.target;
        let radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, 0.0)
        };

        let d = self.damping_factor;
        theta += self.theta_delta * d;
        phi += self.phi_delta * d;
        phi = phi.clamp(EPS, PI - EPS);

        let radius = (radius * self.scale)
            .clamp(self.min_distance, self.max_distance)
            .max(EPS);

        let target = camera.target + self.pan_offset * d;
        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let eye = target + offset;

        self.theta_delta *= 1.0 - d;
        self.phi_delta *= 1.0 - d;
        self.pan_offset *= 1.0 - d;
        self.scale = 1.0;

        let moved = eye.distance_squared(camera.eye) > EPS * EPS
            || target.distance_squared(camera.target) > EPS * EPS;
        camera.eye = eye;
        camera.target = target;
        moved
    }
}
