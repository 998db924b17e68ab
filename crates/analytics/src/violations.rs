use preprocess::resize_mask_nearest;
use schema::{Detection, SegmentationMask, Violation, ViolationKind};

/// Flag every detection whose box covers at least one non-road pixel.
///
/// The mask is resized (nearest-neighbour) to `image_size` first. Boxes are
/// clipped to the image and truncated to whole pixels; a box that covers no
/// pixels is never flagged. Detections with non-finite values are skipped.
pub fn detect_violations(
    detections: &[Detection],
    mask: &SegmentationMask,
    image_size: (u32, u32),
) -> anyhow::Result<Vec<Violation>> {
    let (width, height) = image_size;
    let mask = resize_mask_nearest(mask, width, height)?;

    let mut violations = Vec::new();

    for (index, detection) in detections.iter().enumerate() {
        if !detection.is_well_formed() {
            tracing::debug!(index, ?detection, "Skipping malformed detection");
            continue;
        }

        let clipped = detection.bbox.clipped(width, height);
        let x1 = clipped.x1 as u32;
        let y1 = clipped.y1 as u32;
        let x2 = clipped.x2 as u32;
        let y2 = clipped.y2 as u32;

        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        let off_road = (y1..y2).any(|y| {
            mask.row_span(y, x1, x2)
                .iter()
                .any(|&label| label != SegmentationMask::ROAD)
        });

        if off_road {
            violations.push(Violation {
                kind: ViolationKind::OffRoad,
                bbox: detection.bbox,
                class_id: detection.class_id,
                confidence: detection.score,
            });
        }
    }

    tracing::debug!(
        detections = detections.len(),
        violations = violations.len(),
        "Violation check complete"
    );

    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::BoundingBox;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(BoundingBox::new(x1, y1, x2, y2), 0.8, 2)
    }

    fn all(label: u8) -> SegmentationMask {
        SegmentationMask::filled(100, 100, label).unwrap()
    }

    #[test]
    fn test_box_on_all_road_mask_is_clean() {
        let violations =
            detect_violations(&[det(10.0, 10.0, 50.0, 50.0)], &all(1), (100, 100)).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_box_on_all_off_road_mask_is_flagged_once() {
        let detection = det(10.0, 10.0, 50.0, 50.0);

        let violations = detect_violations(&[detection], &all(0), (100, 100)).unwrap();

        assert_eq!(violations.len(), 1);
        let v = violations[0];
        assert_eq!(v.kind, ViolationKind::OffRoad);
        assert_eq!(v.bbox, detection.bbox);
        assert_eq!(v.class_id, 2);
        assert!((v.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_area_box_never_flagged() {
        let detections = [det(20.0, 20.0, 20.0, 60.0), det(5.0, 5.0, 5.4, 5.9)];
        let violations = detect_violations(&detections, &all(0), (100, 100)).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_single_off_road_pixel_flags_box() {
        let mut data = vec![SegmentationMask::ROAD; 100 * 100];
        data[49 * 100 + 49] = SegmentationMask::NON_ROAD;
        let mask = SegmentationMask::new(100, 100, data).unwrap();

        let covering = det(40.0, 40.0, 60.0, 60.0);
        let beside = det(0.0, 0.0, 49.0, 49.0); // x/y range [0, 49) stops short of it

        let violations = detect_violations(&[covering, beside], &mask, (100, 100)).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].bbox, covering.bbox);
    }

    #[test]
    fn test_box_outside_image_is_clipped() {
        // Only the in-image part [90, 100) x [90, 100) is checked, and it is road.
        let mut data = vec![SegmentationMask::NON_ROAD; 100 * 100];
        for y in 90..100 {
            for x in 90..100 {
                data[y * 100 + x] = SegmentationMask::ROAD;
            }
        }
        let mask = SegmentationMask::new(100, 100, data).unwrap();

        let violations =
            detect_violations(&[det(90.0, 90.0, 400.0, 400.0)], &mask, (100, 100)).unwrap();
        assert!(violations.is_empty());

        // Entirely off-image: nothing left to check.
        let violations =
            detect_violations(&[det(150.0, 150.0, 200.0, 200.0)], &all(0), (100, 100)).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_mask_resized_to_image() {
        // 2x2 mask, top row road, scaled to a 100x100 image.
        let mask = SegmentationMask::new(2, 2, vec![1, 1, 0, 0]).unwrap();

        let top = det(10.0, 10.0, 90.0, 40.0);
        let bottom = det(10.0, 60.0, 90.0, 90.0);

        let violations = detect_violations(&[top, bottom], &mask, (100, 100)).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].bbox, bottom.bbox);
    }

    #[test]
    fn test_malformed_detection_skipped() {
        let detections = [
            det(f32::NAN, 10.0, 50.0, 50.0),
            Detection::new(BoundingBox::new(10.0, 10.0, 50.0, 50.0), f32::INFINITY, 2),
            det(10.0, 10.0, 50.0, 50.0),
        ];

        let violations = detect_violations(&detections, &all(0), (100, 100)).unwrap();

        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_violation_serialization() {
        let violations =
            detect_violations(&[det(10.0, 10.0, 50.0, 50.0)], &all(0), (100, 100)).unwrap();

        let json = serde_json::to_value(&violations[0]).unwrap();

        assert_eq!(json["type"], "Off-road driving");
        assert_eq!(json["bbox"], serde_json::json!([10.0, 10.0, 50.0, 50.0]));
        assert_eq!(json["class_id"], 2);
    }
}
