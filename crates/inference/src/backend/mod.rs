use ndarray::{Array, ArrayD, IxDyn};

#[cfg(feature = "ort-backend")]
pub mod ort;

#[cfg(any(test, feature = "fixed-backend"))]
pub mod fixed;

/// Load-time preferences for a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Prefer an accelerated execution path; best effort, falls back to CPU.
    pub use_gpu: bool,
    pub intra_threads: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            use_gpu: false,
            intra_threads: 4,
        }
    }
}

pub trait InferenceBackend: Send + 'static {
    fn load_model(path: &str, options: &LoadOptions) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run the model on a single `[1, 3, H, W]` input and return its first output.
    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;
}

pub struct InferenceOutput {
    pub output: ArrayD<f32>,
}
