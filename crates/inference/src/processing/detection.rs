use crate::errors::InferenceError;
use schema::{BoundingBox, Detection};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Column layout of a detection row: `cx, cy, w, h, objectness, class scores...`
const OBJECTNESS_INDEX: usize = 4;
const FIRST_CLASS_INDEX: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct DetectionPostProcessor {
    pub confidence_threshold: f32,
}

impl DetectionPostProcessor {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Decode raw `[1, N, 5 + classes]` output into detections in the pixel space
    /// of the original image.
    ///
    /// Rows keep model order. No non-max suppression is applied, so overlapping
    /// boxes for one object all come through.
    #[tracing::instrument(skip(self, output))]
    pub fn parse_detections(
        &self,
        output: &ndarray::ArrayViewD<f32>,
        orig_width: u32,
        orig_height: u32,
    ) -> Result<Vec<Detection>, InferenceError> {
        let shape = output.shape();
        if shape.len() != 3 || shape[0] == 0 || shape[2] <= FIRST_CLASS_INDEX {
            return Err(InferenceError::UnexpectedShape {
                model: "detection",
                shape: shape.to_vec(),
                expected: "[1, N, 5 + classes]",
            });
        }

        let num_rows = shape[1];
        let num_columns = shape[2];
        let width = orig_width as f32;
        let height = orig_height as f32;

        let mut detections = Vec::new();

        for i in 0..num_rows {
            let confidence = output[[0, i, OBJECTNESS_INDEX]];

            // Written this way round so NaN objectness is dropped as well.
            if !(confidence >= self.confidence_threshold) {
                continue;
            }

            let class_id = argmax(
                (FIRST_CLASS_INDEX..num_columns).map(|c| output[[0, i, c]]),
            );

            let cx = output[[0, i, 0]];
            let cy = output[[0, i, 1]];
            let w = output[[0, i, 2]];
            let h = output[[0, i, 3]];

            let (x1, y1, x2, y2) = cxcywh_to_xyxy(cx, cy, w, h);

            let bbox = BoundingBox::new(x1 * width, y1 * height, x2 * width, y2 * height)
                .clipped(orig_width, orig_height);

            detections.push(Detection::new(bbox, confidence, class_id as u32));
        }

        tracing::debug!(
            rows = num_rows,
            kept = detections.len(),
            threshold = self.confidence_threshold,
            "Detections parsed"
        );

        Ok(detections)
    }
}

impl Default for DetectionPostProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

/// Index of the first maximum; NaN scores never win.
fn argmax(scores: impl Iterator<Item = f32>) -> usize {
    let mut best_idx = 0usize;
    let mut best = f32::NEG_INFINITY;
    for (idx, score) in scores.enumerate() {
        if score > best {
            best = score;
            best_idx = idx;
        }
    }
    best_idx
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let x1 = cx - w / 2.0;
    let y1 = cy - h / 2.0;
    let x2 = cx + w / 2.0;
    let y2 = cy + h / 2.0;
    (x1, y1, x2, y2)
}
