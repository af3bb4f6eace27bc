mod canvas;
pub mod generate;
mod pixel_buffer;

pub use canvas::{blend_over, Canvas};
pub use pixel_buffer::{PixelBuffer, BYTES_PER_PIXEL};
