use crate::detection::BoundingBox;
use serde::{Deserialize, Serialize};

/// Fixed vehicle vocabulary, keyed from COCO class ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Car,
    Bus,
    Truck,
    Motorcycle,
    Bicycle,
    Other,
}

impl VehicleClass {
    pub fn from_class_id(class_id: u32) -> Self {
        match class_id {
            1 => VehicleClass::Bicycle,
            2 => VehicleClass::Car,
            3 => VehicleClass::Motorcycle,
            5 => VehicleClass::Bus,
            7 => VehicleClass::Truck,
            _ => VehicleClass::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCounts {
    pub car: usize,
    pub bus: usize,
    pub truck: usize,
    pub motorcycle: usize,
    pub bicycle: usize,
    pub other: usize,
}

impl VehicleCounts {
    pub fn increment(&mut self, class: VehicleClass) {
        match class {
            VehicleClass::Car => self.car += 1,
            VehicleClass::Bus => self.bus += 1,
            VehicleClass::Truck => self.truck += 1,
            VehicleClass::Motorcycle => self.motorcycle += 1,
            VehicleClass::Bicycle => self.bicycle += 1,
            VehicleClass::Other => self.other += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.car + self.bus + self.truck + self.motorcycle + self.bicycle + self.other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CongestionLevel {
    Low,
    Moderate,
    High,
}

impl CongestionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low",
            CongestionLevel::Moderate => "Moderate",
            CongestionLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    #[serde(rename = "Off-road driving")]
    OffRoad,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub bbox: BoundingBox,
    pub class_id: u32,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mapping() {
        assert_eq!(VehicleClass::from_class_id(2), VehicleClass::Car);
        assert_eq!(VehicleClass::from_class_id(5), VehicleClass::Bus);
        assert_eq!(VehicleClass::from_class_id(7), VehicleClass::Truck);
        assert_eq!(VehicleClass::from_class_id(3), VehicleClass::Motorcycle);
        assert_eq!(VehicleClass::from_class_id(1), VehicleClass::Bicycle);
        assert_eq!(VehicleClass::from_class_id(0), VehicleClass::Other);
        assert_eq!(VehicleClass::from_class_id(999), VehicleClass::Other);
    }

    #[test]
    fn test_counts_json_keys() {
        let mut counts = VehicleCounts::default();
        counts.increment(VehicleClass::Car);
        counts.increment(VehicleClass::Other);

        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "car": 1, "bus": 0, "truck": 0,
                "motorcycle": 0, "bicycle": 0, "other": 1
            })
        );
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_congestion_serializes_as_tier_name() {
        for level in [
            CongestionLevel::Low,
            CongestionLevel::Moderate,
            CongestionLevel::High,
        ] {
            let json = serde_json::to_value(level).unwrap();
            assert_eq!(json, serde_json::json!(level.as_str()));
        }
    }

    #[test]
    fn test_violation_json_shape() {
        let violation = Violation {
            kind: ViolationKind::OffRoad,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            class_id: 2,
            confidence: 0.75,
        };
        let json = serde_json::to_value(violation).unwrap();
        assert_eq!(json["type"], "Off-road driving");
        assert_eq!(json["bbox"], serde_json::json!([0.0, 0.0, 10.0, 10.0]));
        assert_eq!(json["class_id"], 2);
        assert_eq!(json["confidence"], serde_json::json!(0.75));
    }
}
