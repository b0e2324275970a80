//! Camera entity marker, pointer gesture tracking and the click message.
use bevy::prelude::*;

/// The single rendering camera driven by the rig.
#[derive(Component, Debug)]
pub struct MapCamera;

/// A left click that did not turn into a drag, in window coordinates.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct MapClicked {
    pub position: Vec2,
}

/// Tracks the current pointer press so drags and clicks can be told apart.
#[derive(Resource, Debug, Default)]
pub struct PointerGesture {
    pub pressed_at: Option<Vec2>,
    pub travelled: f32,
    /// Press started on a UI element; the map ignores it.
    pub over_ui: bool,
}

impl PointerGesture {
    pub fn press(&mut self, position: Option<Vec2>, over_ui: bool) {
        self.pressed_at = position;
        self.travelled = 0.0;
        self.over_ui = over_ui;
    }

    pub fn record_motion(&mut self, delta: Vec2) {
        if self.pressed_at.is_some() {
            self.travelled += delta.length();
        }
    }

    /// Finish the gesture; returns the click position when it stayed put.
    pub fn release(&mut self, threshold: f32) -> Option<Vec2> {
        let pressed_at = self.pressed_at.take()?;
        let over_ui = std::mem::take(&mut self.over_ui);
        if over_ui || self.travelled > threshold {
            return None;
        }
        Some(pressed_at)
    }

    pub fn is_map_drag(&self) -> bool {
        self.pressed_at.is_some() && !self.over_ui
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_press_is_a_click() {
        let mut gesture = PointerGesture::default();
        gesture.press(Some(Vec2::new(10.0, 10.0)), false);
        gesture.record_motion(Vec2::new(1.0, 1.0));
        assert_eq!(gesture.release(4.0), Some(Vec2::new(10.0, 10.0)));
        assert_eq!(gesture.release(4.0), None);
    }

    #[test]
    fn drags_and_ui_presses_are_not_clicks() {
        let mut gesture = PointerGesture::default();
        gesture.press(Some(Vec2::ZERO), false);
        gesture.record_motion(Vec2::new(30.0, 0.0));
        assert_eq!(gesture.release(4.0), None);

        gesture.press(Some(Vec2::ZERO), true);
        assert!(!gesture.is_map_drag());
        assert_eq!(gesture.release(4.0), None);
    }
}
