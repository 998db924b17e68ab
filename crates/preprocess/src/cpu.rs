use crate::config::{ChannelOrder, DEFAULT_INPUT_SIZE};
use crate::Preprocess;
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use image::RgbImage;
use ndarray::{Array, IxDyn};

/// Stretch-resize to the model input size, scale to `[0, 1]` and lay out as NCHW.
#[derive(Debug, Clone)]
pub struct CpuPreProcessor {
    pub input_size: (u32, u32),
    pub channel_order: ChannelOrder,
}

impl CpuPreProcessor {
    pub fn new(input_size: (u32, u32), channel_order: ChannelOrder) -> Self {
        Self {
            input_size,
            channel_order,
        }
    }

    fn resize(&self, image: &RgbImage) -> anyhow::Result<Image<'static>> {
        let _s = span!("resize");

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            anyhow::bail!("Cannot preprocess an empty image ({}x{})", width, height);
        }

        let src = ImageRef::new(width, height, image.as_raw(), PixelType::U8x3)?;
        let mut resized = Image::new(self.input_size.0, self.input_size.1, PixelType::U8x3);

        Resizer::new().resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        Ok(resized)
    }

    fn normalize(&self, image: &Image) -> anyhow::Result<Array<f32, IxDyn>> {
        let _s = span!("normalize");

        let width = image.width() as usize;
        let height = image.height() as usize;
        let spatial = width * height;

        // Plane index for each source channel (R, G, B).
        let planes = match self.channel_order {
            ChannelOrder::Rgb => [0, 1, 2],
            ChannelOrder::Bgr => [2, 1, 0],
        };

        let mut output = vec![0.0f32; 3 * spatial];
        for (i, px) in image.buffer().chunks_exact(3).enumerate() {
            for (channel, &plane) in planes.iter().enumerate() {
                output[i + plane * spatial] = px[channel] as f32 / 255.0;
            }
        }

        Ok(Array::from_shape_vec(IxDyn(&[1, 3, height, width]), output)?)
    }
}

impl Preprocess for CpuPreProcessor {
    fn preprocess(&self, image: &RgbImage) -> anyhow::Result<Array<f32, IxDyn>> {
        let _s = span!("preprocess_image");

        tracing::trace!(
            width = image.width(),
            height = image.height(),
            target_width = self.input_size.0,
            target_height = self.input_size.1,
            "Preprocessing image"
        );

        let resized = self.resize(image)?;
        self.normalize(&resized)
    }

    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}

impl Default for CpuPreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE, ChannelOrder::default())
    }
}
