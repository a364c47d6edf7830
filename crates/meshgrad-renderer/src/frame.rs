use meshgrad_core::{Canvas, CanvasUpdate, Point, UiState};
use serde::{Deserialize, Serialize};

/// Screen pixels kept free around the canvas when fitting.
pub const FRAME_MARGIN: f64 = 32.0;

/// Where the canvas sits inside the editor container. Purely an editing aid:
/// the SVG output never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Top-left corner in screen pixels.
    pub left: f64,
    pub top: f64,
    /// On-screen size in pixels.
    pub width: f64,
    pub height: f64,
    /// Screen pixels per canvas unit.
    pub scale: f64,
}

impl Frame {
    /// Fit a `canvas_w × canvas_h` canvas into the container, centered, with
    /// [`FRAME_MARGIN`] on every side.
    pub fn fit(canvas_w: f64, canvas_h: f64, container_w: f64, container_h: f64) -> Self {
        let avail_w = (container_w - FRAME_MARGIN * 2.0).max(1.0);
        let avail_h = (container_h - FRAME_MARGIN * 2.0).max(1.0);
        let scale = if canvas_w > 0.0 && canvas_h > 0.0 {
            (avail_w / canvas_w).min(avail_h / canvas_h)
        } else {
            1.0
        };

        let width = canvas_w * scale;
        let height = canvas_h * scale;
        Self {
            left: (container_w - width) / 2.0,
            top: (container_h - height) / 2.0,
            width,
            height,
            scale,
        }
    }

    pub fn from_state(canvas: &Canvas, ui: &UiState) -> Self {
        Self::fit(
            f64::from(canvas.width),
            f64::from(canvas.height),
            ui.container_width,
            ui.container_height,
        )
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.left) / self.scale,
            (screen.y - self.top) / self.scale,
        )
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.left, p.y * self.scale + self.top)
    }

    /// Screen-space delta → canvas-space delta.
    pub fn delta_to_canvas(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.scale, dy / self.scale)
    }

    pub fn contains(&self, screen: Point) -> bool {
        screen.x >= self.left
            && screen.x <= self.left + self.width
            && screen.y >= self.top
            && screen.y <= self.top + self.height
    }
}

/// Canvas resize requested by dragging the frame edge to a new on-screen size.
/// With the aspect lock on, the dominant axis wins and the other follows the
/// current ratio. The store clamps the result.
pub fn resize_canvas(canvas: &Canvas, frame: &Frame, screen_w: f64, screen_h: f64, aspect_locked: bool) -> CanvasUpdate {
    let (mut w, mut h) = frame.delta_to_canvas(screen_w, screen_h);
    if aspect_locked {
        let ratio = canvas.aspect_ratio();
        let dw = (w - f64::from(canvas.width)).abs() / f64::from(canvas.width);
        let dh = (h - f64::from(canvas.height)).abs() / f64::from(canvas.height);
        if dw >= dh {
            h = w / ratio;
        } else {
            w = h * ratio;
        }
    }
    CanvasUpdate {
        width: Some(to_side(w)),
        height: Some(to_side(h)),
    }
}

fn to_side(v: f64) -> u32 {
    if v.is_finite() {
        v.round().clamp(0.0, f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
