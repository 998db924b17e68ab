use super::{InferenceBackend, InferenceOutput, LoadOptions};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{CUDAExecutionProvider, ExecutionProvider},
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};

/// Hardware path the session ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionPath {
    Cpu,
    Cuda,
}

pub struct OrtBackend {
    session: Session,
}

impl OrtBackend {
    /// Pick CUDA when requested and the runtime reports it usable, CPU otherwise.
    fn select_execution_path(options: &LoadOptions) -> ExecutionPath {
        if !options.use_gpu {
            return ExecutionPath::Cpu;
        }

        match CUDAExecutionProvider::default().is_available() {
            Ok(true) => ExecutionPath::Cuda,
            Ok(false) => {
                tracing::warn!("CUDA execution provider unavailable, falling back to CPU");
                ExecutionPath::Cpu
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to query CUDA execution provider, falling back to CPU");
                ExecutionPath::Cpu
            }
        }
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &str, options: &LoadOptions) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(options.intra_threads)?;

        let execution_path = Self::select_execution_path(options);

        match execution_path {
            ExecutionPath::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                // Registration failure still leaves the CPU provider in place.
                builder = builder.with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(0)
                    .build()])?;
            }
            ExecutionPath::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!(path, execution_path = ?execution_path, "Model loaded");
        Ok(Self { session })
    }

    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let output = outputs[0].try_extract_array::<f32>()?.into_owned();

        Ok(InferenceOutput { output })
    }
}
