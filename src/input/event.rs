/// Platform-agnostic pointer events.
///
/// Hosts translate their native events (winit window events, DOM pointer
/// and wheel events) into these and forward them to
/// [`SceneController::on_pointer`](crate::lifecycle::SceneController::on_pointer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to absolute position on the surface.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel (positive = zoom in).
    Scroll {
        /// Scroll amount in wheel steps (positive = zoom in).
        delta: f32,
    },
    /// Modifier key state changed.
    ModifiersChanged {
        /// Whether a pan modifier (shift, ctrl or meta) is held.
        shift: bool,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` code to a button. Back/forward
    /// buttons have no binding and map to `None`.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

#[cfg(feature = "viewer")]
impl MouseButton {
    /// Map a winit button. Back, forward and extra buttons map to `None`.
    #[must_use]
    pub fn from_winit(button: winit::event::MouseButton) -> Option<Self> {
        match button {
            winit::event::MouseButton::Left => Some(Self::Left),
            winit::event::MouseButton::Right => Some(Self::Right),
            winit::event::MouseButton::Middle => Some(Self::Middle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_button_codes() {
        assert_eq!(MouseButton::from_dom(0), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_dom(1), Some(MouseButton::Middle));
        assert_eq!(MouseButton::from_dom(2), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_dom(3), None);
    }

    #[cfg(feature = "viewer")]
    #[test]
    fn winit_extra_buttons_are_unbound() {
        use winit::event::MouseButton as W;
        assert_eq!(MouseButton::from_winit(W::Left), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_winit(W::Middle), Some(MouseButton::Middle));
        assert_eq!(MouseButton::from_winit(W::Back), None);
        assert_eq!(MouseButton::from_winit(W::Forward), None);
        assert_eq!(MouseButton::from_winit(W::Other(7)), None);
    }
}
