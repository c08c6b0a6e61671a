use crate::canvas::CanvasEvent;

/// Turns raw cursor and left-button input into canvas mouse events.
///
/// A press followed by a release without movement in between is a click;
/// any movement while the button is held is a drag anchored at the press.
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    position: Option<(f32, f32)>,
    press: Option<(f32, f32)>,
    dragged: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<CanvasEvent> {
        self.position = Some((x, y));
        let (press_x, press_y) = self.press?;
        self.dragged = true;
        Some(CanvasEvent::MouseDrag {
            x,
            y,
            press_x,
            press_y,
        })
    }

    pub fn button_pressed(&mut self) -> Option<CanvasEvent> {
        self.press = self.position;
        self.dragged = false;
        None
    }

    pub fn button_released(&mut self) -> Option<CanvasEvent> {
        let press = self.press.take()?;
        if std::mem::take(&mut self.dragged) {
            return None;
        }
        Some(CanvasEvent::MouseClick {
            x: press.0,
            y: press.1,
        })
    }
}
