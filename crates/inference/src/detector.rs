use crate::backend::InferenceBackend;
use crate::errors::InferenceError;
use crate::handle::ModelHandle;
use crate::processing::DetectionPostProcessor;
use image::RgbImage;
use preprocess::{CpuPreProcessor, Preprocess};
use schema::Detection;

/// Object detector: preprocess, run, decode.
pub struct ObjectDetector<B: InferenceBackend> {
    handle: ModelHandle<B>,
    preprocessor: CpuPreProcessor,
    postprocessor: DetectionPostProcessor,
}

impl<B: InferenceBackend> ObjectDetector<B> {
    pub fn new(
        handle: ModelHandle<B>,
        preprocessor: CpuPreProcessor,
        postprocessor: DetectionPostProcessor,
    ) -> Self {
        Self {
            handle,
            preprocessor,
            postprocessor,
        }
    }

    /// Detections in the pixel space of `image`, in model output order.
    #[tracing::instrument(
        skip_all,
        fields(model = self.handle.name(), width = image.width(), height = image.height())
    )]
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, InferenceError> {
        let input = self
            .preprocessor
            .preprocess(image)
            .map_err(|e| InferenceError::Preprocess(format!("{:#}", e)))?;

        let raw = self.handle.run(&input)?;

        let detections =
            self.postprocessor
                .parse_detections(&raw.output.view(), image.width(), image.height())?;

        tracing::debug!(count = detections.len(), "Objects detected");
        Ok(detections)
    }
}
