use analytics::TrafficReport;
use image::RgbImage;
use inference::{
    DetectionPostProcessor, InferenceBackend, InferenceConfig, InferenceError, ModelHandle,
    ObjectDetector, OverlayStyle, RoadSegmenter, SegmentationPostProcessor, apply_mask_to_image,
};
use schema::{Detection, SegmentationMask, Violation};
use thiserror::Error;

pub const DETECTION_MODEL: &str = "detection";
pub const SEGMENTATION_MODEL: &str = "segmentation";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("The {0} model is not loaded")]
    ModelUnavailable(&'static str),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Analysis failed: {0:#}")]
    Analysis(anyhow::Error),
}

/// Full analysis of one image: the traffic report plus the road overlay.
pub struct Analysis {
    pub report: TrafficReport,
    pub overlay: RgbImage,
}

/// Off-road check for one image with the overlay used to visualise it.
pub struct ViolationCheck {
    pub violations: Vec<Violation>,
    pub detections: Vec<Detection>,
    pub overlay: RgbImage,
}

/// Both models plus the combiner. A model that failed to load is `None`;
/// operations that need it answer [`PipelineError::ModelUnavailable`].
pub struct TrafficAnalyzer<B: InferenceBackend> {
    detector: Option<ObjectDetector<B>>,
    segmenter: Option<RoadSegmenter<B>>,
    overlay_style: OverlayStyle,
}

impl<B: InferenceBackend> TrafficAnalyzer<B> {
    pub fn new(
        detector: Option<ObjectDetector<B>>,
        segmenter: Option<RoadSegmenter<B>>,
        overlay_style: OverlayStyle,
    ) -> Self {
        Self {
            detector,
            segmenter,
            overlay_style,
        }
    }

    /// Load both models from `config`. A model that fails to load is logged
    /// and left out; the service still starts.
    pub fn load(config: &InferenceConfig) -> Self {
        let detector = match ModelHandle::<B>::load(
            DETECTION_MODEL,
            &config.detection_model_path,
            &config.load_options,
        ) {
            Ok(handle) => Some(ObjectDetector::new(
                handle,
                config.preprocessor(),
                DetectionPostProcessor::new(config.confidence_threshold),
            )),
            Err(e) => {
                tracing::error!(error = %e, "Detection model unavailable");
                None
            }
        };

        let segmenter = match ModelHandle::<B>::load(
            SEGMENTATION_MODEL,
            &config.segmentation_model_path,
            &config.load_options,
        ) {
            Ok(handle) => Some(RoadSegmenter::new(
                handle,
                config.preprocessor(),
                SegmentationPostProcessor::new(config.mask_threshold),
            )),
            Err(e) => {
                tracing::error!(error = %e, "Segmentation model unavailable");
                None
            }
        };

        Self::new(detector, segmenter, config.overlay_style())
    }

    pub fn detection_loaded(&self) -> bool {
        self.detector.is_some()
    }

    pub fn segmentation_loaded(&self) -> bool {
        self.segmenter.is_some()
    }

    pub fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, PipelineError> {
        let detector = self
            .detector
            .as_ref()
            .ok_or(PipelineError::ModelUnavailable(DETECTION_MODEL))?;
        Ok(detector.detect(image)?)
    }

    pub fn segment(&self, image: &RgbImage) -> Result<SegmentationMask, PipelineError> {
        let segmenter = self
            .segmenter
            .as_ref()
            .ok_or(PipelineError::ModelUnavailable(SEGMENTATION_MODEL))?;
        Ok(segmenter.segment(image)?)
    }

    /// Road overlay for `image`.
    pub fn segment_overlay(&self, image: &RgbImage) -> Result<RgbImage, PipelineError> {
        let mask = self.segment(image)?;
        self.overlay(image, &mask, &self.overlay_style)
    }

    #[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn analyze(&self, image: &RgbImage) -> Result<Analysis, PipelineError> {
        self.ensure_both_loaded()?;

        let detections = self.detect(image)?;
        let mask = self.segment(image)?;

        let report = analytics::analyze(detections, &mask, image.dimensions())
            .map_err(PipelineError::Analysis)?;
        let overlay = self.overlay(image, &mask, &self.overlay_style)?;

        tracing::info!(
            detections = report.detections.len(),
            violations = report.violations.len(),
            congestion = report.congestion.as_str(),
            "Image analysed"
        );

        Ok(Analysis { report, overlay })
    }

    #[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn violations(&self, image: &RgbImage) -> Result<ViolationCheck, PipelineError> {
        self.ensure_both_loaded()?;

        let detections = self.detect(image)?;
        let mask = self.segment(image)?;

        let violations = analytics::detect_violations(&detections, &mask, image.dimensions())
            .map_err(PipelineError::Analysis)?;
        let overlay = self.overlay(image, &mask, &self.overlay_style.for_violations())?;

        Ok(ViolationCheck {
            violations,
            detections,
            overlay,
        })
    }

    /// Fail before any inference runs when either model is missing.
    fn ensure_both_loaded(&self) -> Result<(), PipelineError> {
        if !self.detection_loaded() {
            return Err(PipelineError::ModelUnavailable(DETECTION_MODEL));
        }
        if !self.segmentation_loaded() {
            return Err(PipelineError::ModelUnavailable(SEGMENTATION_MODEL));
        }
        Ok(())
    }

    fn overlay(
        &self,
        image: &RgbImage,
        mask: &SegmentationMask,
        style: &OverlayStyle,
    ) -> Result<RgbImage, PipelineError> {
        apply_mask_to_image(image, mask, style).map_err(PipelineError::Analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference::backend::fixed::FixedBackend;
    use image::Rgb;
    use ndarray::{Array, IxDyn};
    use preprocess::CpuPreProcessor;
    use schema::CongestionLevel;

    fn detection_output(rows: &[([f32; 4], f32, usize)]) -> Array<f32, IxDyn> {
        let cols = 85;
        let mut data = vec![0.0f32; rows.len() * cols];
        for (i, (bbox, conf, class)) in rows.iter().enumerate() {
            let row = &mut data[i * cols..(i + 1) * cols];
            row[..4].copy_from_slice(bbox);
            row[4] = *conf;
            row[5 + class] = 1.0;
        }
        Array::from_shape_vec(IxDyn(&[1, rows.len(), cols]), data).unwrap()
    }

    fn analyzer(
        detections: Option<Array<f32, IxDyn>>,
        road: Option<f32>,
    ) -> TrafficAnalyzer<FixedBackend> {
        let detector = detections.map(|output| {
            ObjectDetector::new(
                ModelHandle::new(DETECTION_MODEL, FixedBackend::returning(output)),
                CpuPreProcessor::default(),
                DetectionPostProcessor::default(),
            )
        });
        let segmenter = road.map(|score| {
            RoadSegmenter::new(
                ModelHandle::new(
                    SEGMENTATION_MODEL,
                    FixedBackend::returning(Array::from_elem(IxDyn(&[1, 1, 320, 320]), score)),
                ),
                CpuPreProcessor::default(),
                SegmentationPostProcessor::default(),
            )
        });
        TrafficAnalyzer::new(detector, segmenter, OverlayStyle::default())
    }

    #[test]
    fn test_single_car_on_road() {
        let analyzer = analyzer(
            Some(detection_output(&[([0.5, 0.5, 0.2, 0.2], 0.9, 2)])),
            Some(1.0),
        );

        let analysis = analyzer.analyze(&RgbImage::new(640, 480)).unwrap();

        assert_eq!(analysis.report.vehicle_count.car, 1);
        assert!(analysis.report.violations.is_empty());
        assert_eq!(analysis.report.congestion, CongestionLevel::Low);
        assert_eq!(analysis.overlay.dimensions(), (640, 480));
    }

    #[test]
    fn test_off_road_vehicle_flagged() {
        let analyzer = analyzer(
            Some(detection_output(&[([0.5, 0.5, 0.2, 0.2], 0.9, 7)])),
            Some(0.0),
        );

        let check = analyzer.violations(&RgbImage::new(200, 100)).unwrap();

        assert_eq!(check.violations.len(), 1);
        assert_eq!(check.violations[0].class_id, 7);
        assert_eq!(check.detections.len(), 1);
    }

    #[test]
    fn test_violation_overlay_is_lighter() {
        let analyzer = analyzer(
            Some(detection_output(&[([0.5, 0.5, 0.2, 0.2], 0.9, 2)])),
            Some(1.0),
        );
        let image = RgbImage::from_pixel(40, 30, Rgb([100, 100, 100]));

        // All road: red and blue only carry the image term, 100 * (1 - alpha)
        let analysis = analyzer.analyze(&image).unwrap();
        assert_eq!(analysis.overlay.get_pixel(5, 5)[0], 50);

        let check = analyzer.violations(&image).unwrap();
        assert_eq!(check.overlay.get_pixel(5, 5)[0], 70);
        assert_eq!(check.overlay.get_pixel(5, 5)[2], 70);
    }

    #[test]
    fn test_missing_model_reported() {
        let analyzer = analyzer(None, Some(1.0));
        assert!(!analyzer.detection_loaded());
        assert!(analyzer.segmentation_loaded());

        let image = RgbImage::new(32, 32);
        assert!(matches!(
            analyzer.analyze(&image),
            Err(PipelineError::ModelUnavailable(DETECTION_MODEL))
        ));
        assert!(matches!(
            analyzer.detect(&image),
            Err(PipelineError::ModelUnavailable(DETECTION_MODEL))
        ));
        assert!(analyzer.segment_overlay(&image).is_ok());
    }

    #[test]
    fn test_missing_model_files_leave_analyzer_empty() {
        let mut config = InferenceConfig::test_default();
        config.detection_model_path = "/nope/detection.onnx".to_string();
        config.segmentation_model_path = "/nope/segmentation.onnx".to_string();

        let analyzer = TrafficAnalyzer::<FixedBackend>::load(&config);

        assert!(!analyzer.detection_loaded());
        assert!(!analyzer.segmentation_loaded());
    }
}
