// Software rasterization of the particle primitives onto a tiny-skia pixmap.

use crate::error::{Error, Result};
use crate::sprite::Sprite;
use crate::surface::{Canvas, Rgba};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect,
    Stroke, Transform,
};

pub struct RasterCanvas {
    pixmap: Pixmap,
}

fn unit_alpha(alpha: f64) -> f32 {
    // f64::max drops NaN, so a NaN alpha paints nothing.
    alpha.max(0.0).min(1.0) as f32
}

fn solid_paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(
        color.r,
        color.g,
        color.b,
        (unit_alpha(color.a) * 255.0).round() as u8,
    );
    paint.anti_alias = true;
    paint
}

fn circle(x: f64, y: f64, radius: f64) -> Option<Path> {
    if !(radius > 0.0) {
        return None;
    }
    PathBuilder::from_circle(x as f32, y as f32, radius as f32)
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(Error::EmptySurface { width, height })?;
        Ok(RasterCanvas { pixmap })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Converts the premultiplied surface into a straight-alpha image.
    pub fn to_image(&self) -> image::RgbaImage {
        let mut im = image::RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in im.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        im
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

impl Canvas for RasterCanvas {
    fn width(&self) -> f64 {
        self.pixmap.width() as f64
    }

    fn height(&self) -> f64 {
        self.pixmap.height() as f64
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) {
            let mut paint = Paint::default();
            paint.blend_mode = BlendMode::Clear;
            self.pixmap
                .fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    fn fill_arc(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        if let Some(path) = circle(x, y, radius) {
            self.pixmap.fill_path(
                &path,
                &solid_paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_arc(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        if let Some(path) = circle(x, y, radius) {
            self.pixmap.stroke_path(
                &path,
                &solid_paint(color),
                &Stroke::default(),
                Transform::identity(),
                None,
            );
        }
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
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        // rotate(rotation) then drawImage(x, y, w, h): the sprite is placed in
        // the rotated frame, so the rotation pivots on the surface origin.
        let transform = Transform::from_rotate(rotation.to_degrees() as f32)
            .pre_translate(x as f32, y as f32)
            .pre_scale(
                (width / sprite.width() as f64) as f32,
                (height / sprite.height() as f64) as f32,
            );
        let paint = PixmapPaint {
            opacity: unit_alpha(alpha),
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        self.pixmap
            .draw_pixmap(0, 0, sprite.pixmap().as_ref(), &paint, transform, None);
    }
}
