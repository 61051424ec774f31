use glam::Vec2;

use crate::camera::controller::{OrbitControls, PointerAction};
use crate::camera::core::Camera;
use crate::input::{InputEvent, MouseButton};

/// Tracks the pointer between events and turns drags and wheel steps into
/// orbit-control gestures.
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    last_mouse_pos: Option<Vec2>,
    /// Button that started the drag and the gesture it drives.
    active: Option<(MouseButton, PointerAction)>,
    pan_modifier: bool,
}

impl InputHandler {
    /// Create a handler with no gesture in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The drag gesture currently in progress, if any.
    #[must_use]
    pub fn active(&self) -> Option<PointerAction> {
        self.active.map(|(_, action)| action)
    }

    /// Returns true if the event was consumed by the controls.
    pub fn handle_event(
        &mut self,
        controls: &mut OrbitControls,
        camera: &Camera,
        event: &InputEvent,
    ) -> bool {
        match *event {
            InputEvent::MouseButton { button, pressed: true } => {
                let mut action = controls.bindings().action_for(button);
                // A held modifier turns an orbit drag into a pan.
                if action == PointerAction::Rotate
                    && self.pan_modifier
                    && controls.bindings().enable_pan
                {
                    action = PointerAction::Pan;
                }
                if action == PointerAction::None {
                    return false;
                }
                if self.active.is_some() {
                    // One gesture at a time; the first button keeps it.
                    return false;
                }
                self.active = Some((button, action));
                true
            }
            InputEvent::MouseButton {
                button,
                pressed: false,
            } => match self.active {
                Some((held, _)) if held == button => {
                    self.active = None;
                    true
                }
                _ => false,
            },
            InputEvent::ModifiersChanged { shift } => {
                self.pan_modifier = shift;
                false
            }
            InputEvent::CursorMoved { x, y } => {
                let current = Vec2::new(x, y);
                let delta = self
                    .last_mouse_pos
                    .map_or(Vec2::ZERO, |last| current - last);
                self.last_mouse_pos = Some(current);

                match self.active() {
                    Some(PointerAction::Rotate) => controls.rotate(delta),
                    Some(PointerAction::Pan) => controls.pan(delta, camera),
                    Some(PointerAction::Dolly) if delta.y != 0.0 => {
                        controls.dolly_drag(delta.y);
                    }
                    _ => return false,
                }
                true
            }
            InputEvent::Scroll { delta } => {
                if !controls.bindings().enable_zoom {
                    return false;
                }
                controls.dolly(delta);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CameraOptions, ControlOptions, InteractionPolicy};

    fn setup(policy: InteractionPolicy) -> (InputHandler, OrbitControls, Camera) {
        let options = ControlOptions {
            policy,
            ..ControlOptions::default()
        };
        (
            InputHandler::new(),
            OrbitControls::for_policy(&options, 600),
            Camera::from_options(&CameraOptions::default(), 1.0),
        )
    }

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::MouseButton {
            button,
            pressed: true,
        }
    }

    #[test]
    fn left_drag_rotates_under_free_policy() {
        let (mut input, mut controls, camera) = setup(InteractionPolicy::Free);
        assert!(input.handle_event(&mut controls, &camera, &press(MouseButton::Left)));
        assert_eq!(input.active(), Some(PointerAction::Rotate));
    }

    #[test]
    fn left_drag_pans_under_pan_locked_policy() {
        let (mut input, mut controls, camera) =
            setup(InteractionPolicy::PanLocked);
        assert!(input.handle_event(&mut controls, &camera, &press(MouseButton::Left)));
        assert_eq!(input.active(), Some(PointerAction::Pan));
    }

    #[test]
    fn right_button_is_refused_under_pan_locked_policy() {
        let (mut input, mut controls, camera) =
            setup(InteractionPolicy::PanLocked);
        assert!(!input.handle_event(
            &mut controls,
            &camera,
            &press(MouseButton::Right)
        ));
        assert_eq!(input.active(), None);
    }

    #[test]
    fn shift_turns_rotate_into_pan() {
        let (mut input, mut controls, camera) = setup(InteractionPolicy::Free);
        let _ = input.handle_event(
            &mut controls,
            &camera,
            &InputEvent::ModifiersChanged { shift: true },
        );
        let _ = input.handle_event(&mut controls, &camera, &press(MouseButton::Left));
        assert_eq!(input.active(), Some(PointerAction::Pan));
    }

    #[test]
    fn moves_without_a_button_are_not_consumed() {
        let (mut input, mut controls, camera) = setup(InteractionPolicy::Free);
        let moved = input.handle_event(
            &mut controls,
            &camera,
            &InputEvent::CursorMoved { x: 10.0, y: 10.0 },
        );
        assert!(!moved);
        assert!(controls.is_settled());
    }

    fn release(button: MouseButton) -> InputEvent {
        InputEvent::MouseButton {
            button,
            pressed: false,
        }
    }

    fn move_to(
        input: &mut InputHandler,
        controls: &mut OrbitControls,
        camera: &Camera,
        y: f32,
    ) {
        let _ = input.handle_event(
            controls,
            camera,
            &InputEvent::CursorMoved { x: 0.0, y },
        );
    }

    #[test]
    fn releasing_an_unbound_button_keeps_the_drag() {
        let (mut input, mut controls, camera) =
            setup(InteractionPolicy::PanLocked);
        let _ = input.handle_event(&mut controls, &camera, &press(MouseButton::Left));
        let _ = input.handle_event(&mut controls, &camera, &press(MouseButton::Right));
        assert!(!input.handle_event(
            &mut controls,
            &camera,
            &release(MouseButton::Right)
        ));
        assert_eq!(input.active(), Some(PointerAction::Pan));

        assert!(input.handle_event(&mut controls, &camera, &release(MouseButton::Left)));
        assert_eq!(input.active(), None);
    }

    #[test]
    fn second_button_does_not_replace_the_gesture() {
        let (mut input, mut controls, camera) = setup(InteractionPolicy::Free);
        let _ = input.handle_event(&mut controls, &camera, &press(MouseButton::Left));
        assert!(!input.handle_event(
            &mut controls,
            &camera,
            &press(MouseButton::Right)
        ));
        let _ = input.handle_event(&mut controls, &camera, &release(MouseButton::Right));
        assert_eq!(input.active(), Some(PointerAction::Rotate));
    }

    #[test]
    fn middle_drag_dolly_depends_on_distance_not_event_count() {
        let mut cameras = Vec::new();
        for moves in [&[1.0, 2.0][..], &[2.0][..]] {
            let (mut input, mut controls, mut camera) =
                setup(InteractionPolicy::Free);
            move_to(&mut input, &mut controls, &camera, 0.0);
            let _ = input.handle_event(&mut controls, &camera, &press(MouseButton::Middle));
            for &y in moves {
                move_to(&mut input, &mut controls, &camera, -y);
            }
            let _ = controls.update(&mut camera);
            cameras.push(camera.distance());
        }
        let start = Camera::from_options(&CameraOptions::default(), 1.0).distance();
        assert!(cameras[0] < start);
        assert!((cameras[0] - cameras[1]).abs() < 1e-4);
    }

    #[test]
    fn release_ends_the_gesture() {
        let (mut input, mut controls, camera) = setup(InteractionPolicy::Free);
        let _ = input.handle_event(&mut controls, &camera, &press(MouseButton::Right));
        let released = InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: false,
        };
        assert!(input.handle_event(&mut controls, &camera, &released));
        assert_eq!(input.active(), None);
    }
}
