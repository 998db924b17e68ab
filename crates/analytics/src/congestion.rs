use schema::{CongestionLevel, VehicleCounts};

/// Totals at or above this are at least `Moderate`.
pub const MODERATE_THRESHOLD: usize = 10;
/// Totals at or above this are `High`.
pub const HIGH_THRESHOLD: usize = 30;

pub fn congestion_from_total(total: usize) -> CongestionLevel {
    if total < MODERATE_THRESHOLD {
        CongestionLevel::Low
    } else if total < HIGH_THRESHOLD {
        CongestionLevel::Moderate
    } else {
        CongestionLevel::High
    }
}

/// Per-image congestion tier; no smoothing across requests.
pub fn congestion_level(counts: &VehicleCounts) -> CongestionLevel {
    congestion_from_total(counts.total())
}
