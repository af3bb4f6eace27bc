//! ARGB bitmaps, swappable codec backends, affine transforms, dominant color
//! detection and a small sprite renderer.
//!
//! ```no_run
//! use pixmill::{analysis, loader::LoaderContext, transform};
//!
//! # fn main() -> pixmill::Result<()> {
//! let ctx = LoaderContext::default();
//! let image = ctx.decode_file("photo.png")?;
//! let thumb = transform::resize(&image, 64, 64, transform::ResizeMode::TouchFromInside)?;
//! let colors = analysis::detect_colors(&thumb, 5)?;
//! # let _ = colors;
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod bitmap;
pub mod color;
pub mod config;
pub mod demo;
pub mod error;
pub mod loader;
pub mod math3d;
pub mod render;
pub mod transform;
pub mod util;

pub use bitmap::{Canvas, PixelBuffer};
pub use color::Color;
pub use error::{Error, Result};
