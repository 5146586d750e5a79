use thiserror::Error;

/// Errors raised at the edges of the crate: configuration, surfaces, sprites.
/// The simulation itself never fails.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown particle kind {0:?}")]
    UnknownKind(String),

    #[error("particle quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("surface must have non-zero size, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },

    #[error("sprite image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
