pub mod analytics;
pub mod detection;
pub mod errors;
pub mod mask;

pub use analytics::{CongestionLevel, VehicleClass, VehicleCounts, Violation, ViolationKind};
pub use detection::{BoundingBox, Detection};
pub use errors::SchemaError;
pub use mask::SegmentationMask;
