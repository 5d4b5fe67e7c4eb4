//! Input events and pointer/button state tracking.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Escape,
    Delete,
    Backspace,
    Enter,
    /// A plain character key, used for palette bindings.
    Char(char),
}

/// Mode and file requests, usually issued by a toolbar or a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Draw,
    Select,
    Type,
    Save,
    Load,
    QuickSave,
}

/// A single input event delivered to the canvas controller.
///
/// Positions are screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CanvasEvent {
    PointerDown { position: Point, button: MouseButton },
    PointerUp { position: Point, button: MouseButton },
    /// Pointer motion; `delta` is the screen-space motion since the last event.
    PointerMove { position: Point, delta: Vec2 },
    /// Scroll wheel; positive `delta` zooms in.
    Wheel { position: Point, delta: f64 },
    Key(Key),
    TextInput(char),
    Command(Command),
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks held buttons, pointer position and double-clicks across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Currently pressed mouse buttons.
    pressed_buttons: HashSet<MouseButton>,
    last_click: Option<(Instant, Point)>,
    double_click_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn observe(&mut self, event: &CanvasEvent) {
        match *event {
            CanvasEvent::PointerDown { position, button } => {
                self.pointer_down_at(position, button, Instant::now());
            }
            CanvasEvent::PointerUp { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.remove(&button);
            }
            CanvasEvent::PointerMove { position, .. } | CanvasEvent::Wheel { position, .. } => {
                self.pointer_position = position;
            }
            CanvasEvent::Key(_) | CanvasEvent::TextInput(_) | CanvasEvent::Command(_) => {}
        }
    }

    /// Record a button press at an explicit time.
    pub fn pointer_down_at(&mut self, position: Point, button: MouseButton, now: Instant) {
        self.pointer_position = position;
        self.pressed_buttons.insert(button);
        self.double_click_detected = false;

        if button != MouseButton::Left {
            return;
        }

        match self.last_click {
            Some((time, last_position))
                if now.duration_since(time) < DOUBLE_CLICK_TIME
                    && position.distance(last_position) < DOUBLE_CLICK_DISTANCE =>
            {
                self.double_click_detected = true;
                // A third click starts a new pair.
                self.last_click = None;
            }
            _ => self.last_click = Some((now, position)),
        }
    }

    /// Check if a button is currently pressed.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Check if the last left press completed a double-click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }

    /// Forget held buttons, e.g. after the document is replaced.
    pub fn release_all(&mut self) {
        self.pressed_buttons.clear();
    }
}
