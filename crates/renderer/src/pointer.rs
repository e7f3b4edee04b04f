use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::ElementState;

use crate::driver::PointerFrame;

/// Radius of the orb disc in the shader's centred coordinate space; used
/// here to decide when the pointer counts as hovering. Must track the
/// radius baked into the orb fragment.
const ORB_RADIUS: f32 = 0.6;

/// Tracks cursor motion and press state and turns them into the
/// normalised, viewport-clamped sample the uniform drivers consume.
pub(crate) struct PointerState {
    position: Option<PhysicalPosition<f64>>,
    pressed: bool,
    size: PhysicalSize<u32>,
}

impl PointerState {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            position: None,
            pressed: false,
            size,
        }
    }

    /// Records the latest cursor position, clamped to the viewport bounds.
    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let clamped = PhysicalPosition::new(
            position.x.clamp(0.0, self.size.width.max(1) as f64),
            position.y.clamp(0.0, self.size.height.max(1) as f64),
        );
        self.position = Some(clamped);
    }

    pub fn handle_button(&mut self, state: ElementState) {
        self.pressed = state == ElementState::Pressed;
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        if let Some(position) = self.position {
            self.handle_cursor_moved(position);
        }
    }

    /// Produces this frame's raw sample. Before the first cursor event the
    /// pointer rests at the window centre so nothing jumps on entry.
    pub fn frame(&self) -> PointerFrame {
        let width = self.size.width.max(1) as f32;
        let height = self.size.height.max(1) as f32;

        let position = match self.position {
            Some(p) => [p.x as f32 / width, 1.0 - p.y as f32 / height],
            None => [0.5, 0.5],
        };

        PointerFrame {
            position,
            hover: hover_target(position, width / height),
            pressed: self.pressed,
        }
    }
}

/// 1.0 when the normalised position falls inside the orb disc.
fn hover_target(position: [f32; 2], aspect: f32) -> f32 {
    let centred = [(position[0] * 2.0 - 1.0) * aspect, position[1] * 2.0 - 1.0];
    let dist = (centred[0] * centred[0] + centred[1] * centred[1]).sqrt();
    if dist < ORB_RADIUS {
        1.0
    } else {
        0.0
    }
}
