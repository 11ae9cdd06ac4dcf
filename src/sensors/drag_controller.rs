// Copyright @yucwang 2026

use crate::math::constants::{ Float, Matrix4f, Vector3f };

pub const MIN_DISTANCE: Float = -2.0;
pub const MAX_DISTANCE: Float = 10.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

/// Orbit controller driven by relative mouse motion. The primary button
/// rotates the model, the secondary button dollies it within
/// `[MIN_DISTANCE, MAX_DISTANCE]`.
#[derive(Debug, Clone)]
pub struct DragController {
    button: Option<MouseButton>,
    rot_x: Float,
    rot_y: Float,
    dist: Float,
    deg_per_px_x: Float,
    deg_per_px_y: Float,
    dist_per_px: Float,
}

impl DragController {
    pub fn new(width: u32, height: u32) -> Self {
        let mut controller = Self {
            button: None,
            rot_x: 0.0,
            rot_y: 0.0,
            dist: 0.0,
            deg_per_px_x: 0.0,
            deg_per_px_y: 0.0,
            dist_per_px: 0.0,
        };
        controller.resize(width, height);
        controller
    }

    /// Rescales the per-pixel rates; accumulated state is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1) as Float;
        let height = height.max(1) as Float;
        self.deg_per_px_x = 270.0 / height;
        self.deg_per_px_y = 270.0 / width;
        self.dist_per_px = 50.0 / height;
    }

    pub fn press(&mut self, button: MouseButton) {
        if self.button.is_some() {
            return;
        }
        self.button = Some(button);
    }

    pub fn motion(&mut self, dx: Float, dy: Float) {
        match self.button {
            Some(MouseButton::Primary) => {
                self.rot_x += self.deg_per_px_x * dy;
                self.rot_y += self.deg_per_px_y * dx;
            }
            Some(MouseButton::Secondary) => {
                self.dist = (self.dist + self.dist_per_px * dy).max(MIN_DISTANCE).min(MAX_DISTANCE);
            }
            _ => {}
        }
    }

    pub fn release(&mut self) {
        self.button = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.button.is_some()
    }

    pub fn button(&self) -> Option<MouseButton> {
        self.button
    }

    pub fn rot_x(&self) -> Float {
        self.rot_x
    }

    pub fn rot_y(&self) -> Float {
        self.rot_y
    }

    pub fn dist(&self) -> Float {
        self.dist
    }

    /// Model rotation, X applied after Y: `Rx * Ry`.
    pub fn rotation(&self) -> Matrix4f {
        let rx = Matrix4f::new_rotation(Vector3f::new(self.rot_x.to_radians(), 0.0, 0.0));
        let ry = Matrix4f::new_rotation(Vector3f::new(0.0, self.rot_y.to_radians(), 0.0));
        rx * ry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::Vector4f;

    #[test]
    fn test_primary_drag_rotates() {
        let mut controller = DragController::new(540, 270);
        controller.press(MouseButton::Primary);
        controller.motion(2.0, 1.0);
        assert!((controller.rot_x() - 1.0).abs() < 1e-5);
        assert!((controller.rot_y() - 1.0).abs() < 1e-5);
        assert_eq!(controller.dist(), 0.0);
    }

    #[test]
    fn test_second_press_is_ignored() {
        let mut controller = DragController::new(100, 100);
        controller.press(MouseButton::Secondary);
        controller.press(MouseButton::Primary);
        assert_eq!(controller.button(), Some(MouseButton::Secondary));
        controller.motion(10.0, 0.0);
        assert_eq!(controller.rot_y(), 0.0);

        controller.release();
        assert!(!controller.is_dragging());
        controller.motion(10.0, 10.0);
        assert_eq!(controller.rot_x(), 0.0);
    }

    #[test]
    fn test_dolly_is_clamped() {
        let mut controller = DragController::new(100, 50);
        controller.press(MouseButton::Secondary);
        controller.motion(0.0, 1000.0);
        assert_eq!(controller.dist(), MAX_DISTANCE);
        controller.motion(0.0, -1000.0);
        assert_eq!(controller.dist(), MIN_DISTANCE);
        controller.motion(0.0, 1.0);
        assert!((controller.dist() - (MIN_DISTANCE + 1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_middle_button_does_nothing() {
        let mut controller = DragController::new(100, 100);
        controller.press(MouseButton::Middle);
        controller.motion(5.0, 5.0);
        assert_eq!((controller.rot_x(), controller.rot_y(), controller.dist()), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_order() {
        let mut controller = DragController::new(270, 270);
        controller.press(MouseButton::Primary);
        controller.motion(90.0, 90.0);

        // Ry maps +X to -Z, then Rx maps -Z to +Y.
        let v = controller.rotation() * Vector4f::new(1.0, 0.0, 0.0, 0.0);
        assert!((v - Vector4f::new(0.0, 1.0, 0.0, 0.0)).norm() < 1e-5);
    }
}
