use crate::error::{Error, Result};
use log::info;
use tiny_skia::{ColorU8, Pixmap};

// A pre-loaded raster image, stored premultiplied and ready to blit.
#[derive(Clone)]
pub struct Sprite {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Sprite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sprite")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Sprite {
    // Rust image defaults to row major, and so does tiny-skia.
    pub fn from_image(image: &image::RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let mut pixmap = Pixmap::new(width, height).ok_or(Error::EmptyImage { width, height })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Sprite { pixmap })
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let image = image::open(path.as_ref())?.into_rgba8();
        info!(
            "Loading sprite {:?} with (width, height) = ({}, {})",
            path.as_ref(),
            image.width(),
            image.height()
        );
        Sprite::from_image(&image)
    }

    /// A white puff that fades out quadratically from the centre, used for
    /// smoke when no sprite file is configured.
    pub fn puff(size: u32) -> Result<Self> {
        let center = (size as f64 - 1.0) / 2.0;
        let extent = (size as f64 / 2.0).max(1.0);
        let im = image::ImageBuffer::<image::Rgba<u8>, Vec<u8>>::from_fn(size, size, |x, y| {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let falloff = (1.0 - (dx * dx + dy * dy).sqrt() / extent).max(0.0);
            let alpha = (falloff * falloff * 255.0).round() as u8;
            image::Rgba([255, 255, 255, alpha])
        });
        Sprite::from_image(&im)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}
