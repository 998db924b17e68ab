pub mod annotate;
pub mod detection;
pub mod overlay;
pub mod segmentation;

pub use annotate::annotate_detections;
pub use detection::{DEFAULT_CONFIDENCE_THRESHOLD, DetectionPostProcessor};
pub use overlay::{OverlayStyle, VIOLATION_OVERLAY_ALPHA, apply_mask_to_image};
pub use segmentation::{DEFAULT_MASK_THRESHOLD, SegmentationPostProcessor};
