// The drawing primitives a particle field needs from its host.

use crate::sprite::Sprite;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Rgba { a, ..self }
    }
}

/// The accent red every particle kind is painted with.
pub const ACCENT: Rgba = Rgba::new(255, 89, 81, 1.0);

/// A 2-D raster context with known pixel dimensions.
///
/// Coordinates are in surface pixels with the origin at the top left. Angles
/// are radians.
pub trait Canvas {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn fill_arc(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

    fn stroke_arc(&mut self, x: f64, y: f64, radius: f64, color: Rgba);

    /// Blits `sprite` scaled to `width` x `height` at `(x, y)`, after rotating
    /// the whole coordinate system by `rotation` about the surface origin.
    fn draw_rotated_image(
        &mut self,
        sprite: &Sprite,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: f64,
        rotation: f64,
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    FillArc {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgba,
    },
    StrokeArc {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgba,
    },
    RotatedImage {
        sprite_size: (u32, u32),
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: f64,
        rotation: f64,
    },
}

// A canvas that only remembers what it was asked to draw.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        RecordingCanvas {
            width,
            height,
            commands: vec![],
        }
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_arc(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillArc {
            x,
            y,
            radius,
            color,
        });
    }

    fn stroke_arc(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::StrokeArc {
            x,
            y,
            radius,
            color,
        });
    }

    fn draw_rotated_image(
        &mut self,
        sprite: &Sprite,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: f64,
        rotation: f64,
    ) {
        self.commands.push(DrawCommand::RotatedImage {
            sprite_size: (sprite.width(), sprite.height()),
            x,
            y,
            width,
            height,
            alpha,
            rotation,
        });
    }
}
