pub mod config;
pub mod cpu;
pub mod mask;

use image::RgbImage;
use ndarray::{Array, IxDyn};

pub use config::{ChannelOrder, DEFAULT_INPUT_SIZE};
pub use cpu::CpuPreProcessor;
pub use mask::resize_mask_nearest;

/// Trait for image preprocessing implementations
pub trait Preprocess {
    /// Convert a decoded image into a `[1, 3, H, W]` model input tensor.
    ///
    /// Implementations take `&self` so a single instance can serve
    /// concurrent requests.
    fn preprocess(&self, image: &RgbImage) -> anyhow::Result<Array<f32, IxDyn>>;

    /// Get the input size this preprocessor targets
    fn input_size(&self) -> (u32, u32);
}
