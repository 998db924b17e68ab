pub mod backend;
pub mod config;
pub mod detector;
pub mod errors;
pub mod handle;
pub mod processing;
pub mod segmenter;

// Re-export commonly used types for convenience
pub use backend::{InferenceBackend, InferenceOutput, LoadOptions};
pub use config::InferenceConfig;
pub use detector::ObjectDetector;
pub use errors::{InferenceError, ModelLoadError};
pub use handle::ModelHandle;
pub use processing::{
    DetectionPostProcessor, OverlayStyle, SegmentationPostProcessor, annotate_detections,
    apply_mask_to_image,
};
pub use segmenter::RoadSegmenter;
