use crate::errors::InferenceError;
use ndarray::{ArrayViewD, Axis};
use schema::SegmentationMask;

pub const DEFAULT_MASK_THRESHOLD: f32 = 0.5;

const EXPECTED_SHAPE: &str = "[1, 1, H, W], [1, H, W] or [1, C, H, W]";

/// Turns raw segmentation output into a binary road mask at model resolution.
#[derive(Debug, Clone, Copy)]
pub struct SegmentationPostProcessor {
    pub mask_threshold: f32,
}

impl SegmentationPostProcessor {
    pub fn new(mask_threshold: f32) -> Self {
        Self { mask_threshold }
    }

    /// Single-channel outputs are thresholded (score at or above the
    /// threshold is road). Multi-channel outputs are per-class scores; any
    /// pixel whose best class is not background (channel 0) is road.
    pub fn parse_mask(&self, output: &ArrayViewD<f32>) -> Result<SegmentationMask, InferenceError> {
        let shape = output.shape().to_vec();
        let unexpected = || InferenceError::UnexpectedShape {
            model: "segmentation",
            shape: shape.clone(),
            expected: EXPECTED_SHAPE,
        };

        // Normalise to [C, H, W]
        let planes = match shape.as_slice() {
            [1, _, _] => output.index_axis(Axis(0), 0).insert_axis(Axis(0)),
            [1, c, _, _] if *c >= 1 => output.index_axis(Axis(0), 0),
            _ => return Err(unexpected()),
        };

        let (channels, height, width) = (planes.shape()[0], planes.shape()[1], planes.shape()[2]);
        if height == 0 || width == 0 {
            return Err(unexpected());
        }

        let mut labels = Vec::with_capacity(height * width);

        if channels == 1 {
            for y in 0..height {
                for x in 0..width {
                    labels.push(self.label(planes[[0, y, x]]));
                }
            }
        } else {
            for y in 0..height {
                for x in 0..width {
                    let mut best_class = 0usize;
                    let mut best = planes[[0, y, x]];
                    for c in 1..channels {
                        let score = planes[[c, y, x]];
                        if score > best {
                            best = score;
                            best_class = c;
                        }
                    }
                    labels.push(if best_class != 0 {
                        SegmentationMask::ROAD
                    } else {
                        SegmentationMask::NON_ROAD
                    });
                }
            }
        }

        SegmentationMask::new(width as u32, height as u32, labels)
            .map_err(|e| InferenceError::Postprocess(e.to_string()))
    }

    #[inline]
    fn label(&self, score: f32) -> u8 {
        if score >= self.mask_threshold {
            SegmentationMask::ROAD
        } else {
            SegmentationMask::NON_ROAD
        }
    }
}

impl Default for SegmentationPostProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MASK_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    #[test]
    fn test_single_channel_thresholded() {
        let output =
            Array::from_shape_vec(IxDyn(&[1, 1, 2, 2]), vec![0.9, 0.1, 0.5, 0.49]).unwrap();

        let mask = SegmentationPostProcessor::default()
            .parse_mask(&output.view())
            .unwrap();

        assert_eq!((mask.width(), mask.height()), (2, 2));
        assert_eq!(mask.as_raw(), &[1, 0, 1, 0]);
    }

    #[test]
    fn test_three_dimensional_output_accepted() {
        let output = Array::from_shape_vec(IxDyn(&[1, 2, 3]), vec![1.0; 6]).unwrap();

        let mask = SegmentationPostProcessor::default()
            .parse_mask(&output.view())
            .unwrap();

        assert_eq!((mask.width(), mask.height()), (3, 2));
        assert!(mask.as_raw().iter().all(|&l| l == SegmentationMask::ROAD));
    }

    #[test]
    fn test_multi_class_argmax() {
        // Two classes over a 1x3 image: background wins, road wins, tie goes to background.
        let output = Array::from_shape_vec(
            IxDyn(&[1, 2, 1, 3]),
            vec![
                0.8, 0.1, 0.5, // channel 0 (background)
                0.2, 0.9, 0.5, // channel 1 (road)
            ],
        )
        .unwrap();

        let mask = SegmentationPostProcessor::default()
            .parse_mask(&output.view())
            .unwrap();

        assert_eq!(mask.as_raw(), &[0, 1, 0]);
    }

    #[test]
    fn test_custom_threshold() {
        let output = Array::from_shape_vec(IxDyn(&[1, 1, 1, 2]), vec![0.3, 0.2]).unwrap();

        let mask = SegmentationPostProcessor::new(0.25)
            .parse_mask(&output.view())
            .unwrap();

        assert_eq!(mask.as_raw(), &[1, 0]);
    }

    #[test]
    fn test_unexpected_shapes_rejected() {
        for shape in [vec![4, 4], vec![2, 1, 4, 4], vec![1, 1, 1, 4, 4], vec![1, 0, 4]] {
            let output = Array::<f32, _>::zeros(IxDyn(&shape));
            let err = SegmentationPostProcessor::default()
                .parse_mask(&output.view())
                .unwrap_err();
            assert!(
                matches!(err, InferenceError::UnexpectedShape { .. }),
                "shape {:?}",
                shape
            );
        }
    }
}
