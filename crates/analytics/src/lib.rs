pub mod congestion;
pub mod counting;
pub mod violations;

pub use congestion::{HIGH_THRESHOLD, MODERATE_THRESHOLD, congestion_from_total, congestion_level};
pub use counting::vehicle_count;
pub use violations::detect_violations;

use schema::{CongestionLevel, Detection, SegmentationMask, VehicleCounts, Violation};
use serde::Serialize;

/// Everything derived from one image's detections and road mask.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficReport {
    pub vehicle_count: VehicleCounts,
    pub detections: Vec<Detection>,
    pub violations: Vec<Violation>,
    pub congestion: CongestionLevel,
}

/// Combine both model outputs for one image into a single report.
///
/// Fails only if the mask cannot be brought to the image resolution; no
/// partial report is produced.
#[tracing::instrument(skip_all, fields(detections = detections.len()))]
pub fn analyze(
    detections: Vec<Detection>,
    mask: &SegmentationMask,
    image_size: (u32, u32),
) -> anyhow::Result<TrafficReport> {
    let vehicle_count = vehicle_count(&detections);
    let congestion = congestion_level(&vehicle_count);
    let violations = detect_violations(&detections, mask, image_size)?;

    tracing::debug!(
        total = vehicle_count.total(),
        congestion = congestion.as_str(),
        violations = violations.len(),
        "Traffic analysed"
    );

    Ok(TrafficReport {
        vehicle_count,
        detections,
        violations,
        congestion,
    })
}
