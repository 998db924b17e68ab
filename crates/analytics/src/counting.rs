use schema::{Detection, VehicleClass, VehicleCounts};

/// Tally detections per vehicle class. Unknown class ids land in `other`,
/// so the counts always sum to `detections.len()`.
pub fn vehicle_count(detections: &[Detection]) -> VehicleCounts {
    let mut counts = VehicleCounts::default();
    for detection in detections {
        counts.increment(VehicleClass::from_class_id(detection.class_id));
    }
    counts
}
