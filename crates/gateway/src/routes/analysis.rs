use crate::encoding::encode_png_base64;
use crate::errors::AppError;
use crate::pipeline::PipelineError;
use crate::state::AppState;
use crate::upload::read_image;
use analytics::{TrafficReport, congestion_level, vehicle_count};
use axum::{
    Json,
    extract::{Multipart, State},
};
use inference::{InferenceBackend, annotate_detections};
use schema::{CongestionLevel, Detection, VehicleCounts, Violation};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: TrafficReport,
    /// Base64 PNG of the road overlay.
    pub lane_segmentation: String,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub detections: Vec<Detection>,
    /// Base64 PNG of the frame with detection boxes drawn.
    pub annotated_image: String,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub segmented_image: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub vehicle_count: VehicleCounts,
    pub total: usize,
    pub detections: Vec<Detection>,
}

#[derive(Debug, Serialize)]
pub struct CongestionResponse {
    pub vehicle_count: VehicleCounts,
    pub congestion: CongestionLevel,
    pub detections: Vec<Detection>,
}

#[derive(Debug, Serialize)]
pub struct ViolationsResponse {
    pub violations: Vec<Violation>,
    pub detections: Vec<Detection>,
    pub overlay_image: String,
}

fn encode(image: &image::RgbImage) -> Result<String, PipelineError> {
    encode_png_base64(image).map_err(PipelineError::Analysis)
}

/// POST /analyze - detection, segmentation and analytics in one pass
pub async fn analyze<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let upload = read_image(multipart, state.max_upload_bytes).await?;

    let response = state
        .run_blocking(move |analyzer| {
            let analysis = analyzer.analyze(&upload.image)?;
            Ok(AnalyzeResponse {
                lane_segmentation: encode(&analysis.overlay)?,
                report: analysis.report,
            })
        })
        .await?;

    Ok(Json(response))
}

/// POST /detect - detections plus the annotated frame
pub async fn detect<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
    multipart: Multipart,
) -> Result<Json<DetectResponse>, AppError> {
    let upload = read_image(multipart, state.max_upload_bytes).await?;
    let image = upload.image;

    let (detections, annotated_image) = state
        .run_blocking(move |analyzer| {
            let detections = analyzer.detect(&image)?;
            let annotated = encode(&annotate_detections(&image, &detections))?;
            Ok((detections, annotated))
        })
        .await?;

    Ok(Json(DetectResponse {
        filename: upload.filename,
        content_type: upload.content_type,
        detections,
        annotated_image,
    }))
}

/// POST /segment - road overlay only
pub async fn segment<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
    multipart: Multipart,
) -> Result<Json<SegmentResponse>, AppError> {
    let upload = read_image(multipart, state.max_upload_bytes).await?;
    let image = upload.image;

    let segmented_image = state
        .run_blocking(move |analyzer| encode(&analyzer.segment_overlay(&image)?))
        .await?;

    Ok(Json(SegmentResponse {
        filename: upload.filename,
        content_type: upload.content_type,
        segmented_image,
    }))
}

/// POST /count - per-class vehicle counts
pub async fn count<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
    multipart: Multipart,
) -> Result<Json<CountResponse>, AppError> {
    let upload = read_image(multipart, state.max_upload_bytes).await?;
    let image = upload.image;

    let detections = state
        .run_blocking(move |analyzer| analyzer.detect(&image))
        .await?;

    let counts = vehicle_count(&detections);

    Ok(Json(CountResponse {
        vehicle_count: counts,
        total: counts.total(),
        detections,
    }))
}

/// POST /congestion - counts plus congestion tier
pub async fn congestion<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
    multipart: Multipart,
) -> Result<Json<CongestionResponse>, AppError> {
    let upload = read_image(multipart, state.max_upload_bytes).await?;
    let image = upload.image;

    let detections = state
        .run_blocking(move |analyzer| analyzer.detect(&image))
        .await?;

    let counts = vehicle_count(&detections);

    Ok(Json(CongestionResponse {
        vehicle_count: counts,
        congestion: congestion_level(&counts),
        detections,
    }))
}

/// POST /violations - off-road check with overlay
pub async fn violations<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
    multipart: Multipart,
) -> Result<Json<ViolationsResponse>, AppError> {
    let upload = read_image(multipart, state.max_upload_bytes).await?;
    let image = upload.image;

    let response = state
        .run_blocking(move |analyzer| {
            let check = analyzer.violations(&image)?;
            Ok(ViolationsResponse {
                overlay_image: encode(&check.overlay)?,
                violations: check.violations,
                detections: check.detections,
            })
        })
        .await?;

    Ok(Json(response))
}
