//! Input handling (winit -> host actions).
//!
//! Keeps `Windowing` focused on window lifecycle while `UserInput` turns raw
//! window events into the handful of actions the AR view understands.

use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{Key, NamedKey};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostAction {
    /// The "Start AR" button.
    StartSession,
    /// Leave AR, or quit when no session is running.
    Back,
    /// Primary click at a cursor position (physical pixels).
    Select { x: f32, y: f32 },
}

#[derive(Default, Debug, Clone)]
pub struct UserInput {
    /// Cursor position in physical pixels (as reported by winit).
    cursor_pos: Option<(f32, f32)>,
}

impl UserInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit event. Returns an action when the event maps to one.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<HostAction> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = Some((position.x as f32, position.y as f32));
                None
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor_pos = None;
                None
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.cursor_pos.map(|(x, y)| HostAction::Select { x, y }),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Enter) => Some(HostAction::StartSession),
                Key::Named(NamedKey::Escape) => Some(HostAction::Back),
                Key::Character(c) if c.eq_ignore_ascii_case("s") => Some(HostAction::StartSession),
                _ => None,
            },

            _ => None,
        }
    }
}
