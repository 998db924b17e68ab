use super::{InferenceBackend, InferenceOutput, LoadOptions};
use ndarray::{Array, ArrayD, IxDyn};

/// Backend that answers every call with the same tensor, or the same error.
///
/// Stands in for a real model in tests of the post-processors and the HTTP layer.
#[derive(Debug, Clone)]
pub struct FixedBackend {
    result: Result<ArrayD<f32>, String>,
}

impl FixedBackend {
    pub fn returning(output: ArrayD<f32>) -> Self {
        Self { result: Ok(output) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

impl InferenceBackend for FixedBackend {
    fn load_model(path: &str, _options: &LoadOptions) -> anyhow::Result<Self> {
        anyhow::bail!("FixedBackend cannot parse model files ({})", path)
    }

    fn infer(&mut self, _input: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
        match &self.result {
            Ok(output) => Ok(InferenceOutput {
                output: output.clone(),
            }),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}
