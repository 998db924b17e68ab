use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Mask size mismatch: expected {expected} labels, got {actual}")]
    MaskSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid mask label {label} at index {index} (expected 0 or 1)")]
    InvalidMaskLabel { index: usize, label: u8 },
}
