use crate::backend::InferenceBackend;
use crate::errors::InferenceError;
use crate::handle::ModelHandle;
use crate::processing::SegmentationPostProcessor;
use image::RgbImage;
use preprocess::{CpuPreProcessor, Preprocess, resize_mask_nearest};
use schema::SegmentationMask;

pub struct RoadSegmenter<B: InferenceBackend> {
    handle: ModelHandle<B>,
    preprocessor: CpuPreProcessor,
    postprocessor: SegmentationPostProcessor,
}

impl<B: InferenceBackend> RoadSegmenter<B> {
    pub fn new(
        handle: ModelHandle<B>,
        preprocessor: CpuPreProcessor,
        postprocessor: SegmentationPostProcessor,
    ) -> Self {
        Self {
            handle,
            preprocessor,
            postprocessor,
        }
    }

    /// Binary road mask with the same dimensions as `image`.
    #[tracing::instrument(
        skip_all,
        fields(model = self.handle.name(), width = image.width(), height = image.height())
    )]
    pub fn segment(&self, image: &RgbImage) -> Result<SegmentationMask, InferenceError> {
        let input = self
            .preprocessor
            .preprocess(image)
            .map_err(|e| InferenceError::Preprocess(format!("{:#}", e)))?;

        let raw = self.handle.run(&input)?;

        let mask = self.postprocessor.parse_mask(&raw.output.view())?;

        let mask = resize_mask_nearest(&mask, image.width(), image.height())
            .map_err(|e| InferenceError::Postprocess(format!("{:#}", e)))?;

        tracing::debug!(road_fraction = mask.road_fraction(), "Road segmented");
        Ok(mask)
    }
}
