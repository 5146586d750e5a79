pub mod controller;
pub mod error;
pub mod field;
pub mod field_params;
pub mod fps_estimator;
pub mod particle;
pub mod raster;
pub mod sprite;
pub mod surface;
