use crate::backend::LoadOptions;
use crate::processing::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MASK_THRESHOLD, OverlayStyle,
    overlay::DEFAULT_OVERLAY_ALPHA,
};
use common::env_or;
use preprocess::{ChannelOrder, CpuPreProcessor, DEFAULT_INPUT_SIZE};

pub use common::Environment;

pub const DEFAULT_DETECTION_MODEL_PATH: &str = "models/v1/object-detection.onnx";
pub const DEFAULT_SEGMENTATION_MODEL_PATH: &str = "models/v1/road-segmentation.onnx";

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub detection_model_path: String,
    pub segmentation_model_path: String,
    pub load_options: LoadOptions,
    pub input_size: (u32, u32),
    pub channel_order: ChannelOrder,
    pub confidence_threshold: f32,
    pub mask_threshold: f32,
    pub overlay_alpha: f32,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let detection_model_path =
            env_or("DETECTION_MODEL_PATH", DEFAULT_DETECTION_MODEL_PATH.to_string());
        let segmentation_model_path = env_or(
            "SEGMENTATION_MODEL_PATH",
            DEFAULT_SEGMENTATION_MODEL_PATH.to_string(),
        );

        let defaults = LoadOptions::default();
        let load_options = LoadOptions {
            use_gpu: env_or("USE_GPU", defaults.use_gpu),
            intra_threads: env_or("INTRA_THREADS", defaults.intra_threads),
        };

        let input_width = env_or("INPUT_WIDTH", DEFAULT_INPUT_SIZE.0);
        let input_height = env_or("INPUT_HEIGHT", DEFAULT_INPUT_SIZE.1);
        if input_width == 0 || input_height == 0 {
            anyhow::bail!(
                "Model input size must be non-zero, got {}x{}",
                input_width,
                input_height
            );
        }

        let channel_order = env_or("CHANNEL_ORDER", ChannelOrder::default());
        let confidence_threshold = env_or("CONFIDENCE_THRESHOLD", DEFAULT_CONFIDENCE_THRESHOLD);
        let mask_threshold = env_or("MASK_THRESHOLD", DEFAULT_MASK_THRESHOLD);

        let overlay_alpha = env_or("OVERLAY_ALPHA", DEFAULT_OVERLAY_ALPHA);
        if !(0.0..=1.0).contains(&overlay_alpha) {
            anyhow::bail!("OVERLAY_ALPHA must be within [0, 1], got {}", overlay_alpha);
        }

        Ok(Self {
            environment,
            detection_model_path,
            segmentation_model_path,
            load_options,
            input_size: (input_width, input_height),
            channel_order,
            confidence_threshold,
            mask_threshold,
            overlay_alpha,
        })
    }

    pub fn preprocessor(&self) -> CpuPreProcessor {
        CpuPreProcessor::new(self.input_size, self.channel_order)
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            alpha: self.overlay_alpha,
            ..Default::default()
        }
    }

    /// Create default configuration for testing
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            detection_model_path: DEFAULT_DETECTION_MODEL_PATH.to_string(),
            segmentation_model_path: DEFAULT_SEGMENTATION_MODEL_PATH.to_string(),
            load_options: LoadOptions::default(),
            input_size: DEFAULT_INPUT_SIZE,
            channel_order: ChannelOrder::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
        }
    }
}
