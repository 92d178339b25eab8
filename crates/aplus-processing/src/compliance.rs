//! Compliance analyzer
//!
//! Runs the full pipeline for one upload: decode, technical rules, background
//! and coverage analysis, optional content rules, report assembly.

use aplus_core::{
    AnalysisError, AnalyzerConfig, ComplianceReport, ImageMetadata, ReportMeta, ReportMetrics,
    UploadedImage, VisionAnnotator,
};
use std::sync::Arc;

use crate::analysis::{background, content, technical, BackgroundStats, RuleFindings};
use crate::image::ImageProcessor;

/// Analyzer shared by all requests. Holds no per-request state.
#[derive(Clone, Debug)]
pub struct ComplianceAnalyzer {
    config: Arc<AnalyzerConfig>,
    annotator: Option<Arc<dyn VisionAnnotator>>,
    expose_error_details: bool,
}

impl ComplianceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config: Arc::new(config),
            annotator: None,
            expose_error_details: false,
        }
    }

    /// Enable the content rule engine
    pub fn with_annotator(mut self, annotator: Arc<dyn VisionAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Include the failure cause in `SERVER_ERROR` reports. Off in production.
    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    pub fn has_annotator(&self) -> bool {
        self.annotator.is_some()
    }

    /// Analyze one upload into a PASS or FAIL report.
    ///
    /// Decode and internal failures are returned as errors; render them with
    /// [`ComplianceAnalyzer::error_report`]. Annotation failures never fail the
    /// analysis.
    pub async fn analyze(&self, upload: &UploadedImage) -> Result<ComplianceReport, AnalysisError> {
        let (metadata, stats) = self.measure(upload).await?;
        let declared_format = upload.declared_format();

        let mut findings = technical::evaluate(&metadata, &declared_format, &self.config);
        findings.extend(background::evaluate(&stats, &self.config));
        findings.extend(self.content_findings(upload).await);

        let RuleFindings { issues, warnings } = findings;
        let report = ComplianceReport::assemble(
            issues,
            warnings,
            Self::metrics(upload, &metadata, &stats, declared_format),
            ReportMeta {
                filename: upload.filename.clone(),
                mimetype: upload.content_type.clone(),
                size: upload.size(),
            },
        );

        tracing::info!(
            filename = %upload.filename,
            compliance = ?report.compliance,
            issues = report.issues.len(),
            warnings = report.warnings.len(),
            "Compliance analysis complete"
        );

        Ok(report)
    }

    /// Analyze, rendering any failure as the `ERROR` report.
    pub async fn analyze_or_error_report(&self, upload: &UploadedImage) -> ComplianceReport {
        match self.analyze(upload).await {
            Ok(report) => report,
            Err(err) => self.error_report(&err),
        }
    }

    /// `compliance: "ERROR"` report for a failed analysis
    pub fn error_report(&self, error: &AnalysisError) -> ComplianceReport {
        if error.is_decode() {
            tracing::warn!(error = %error, "Image could not be decoded");
        } else {
            tracing::error!(error = %error, "Compliance analysis failed");
        }
        let details = self.expose_error_details.then(|| error.to_string());
        ComplianceReport::server_error(details)
    }

    /// Decode and sample on the blocking pool. Both steps run to completion
    /// before any rule is evaluated.
    async fn measure(
        &self,
        upload: &UploadedImage,
    ) -> Result<(ImageMetadata, BackgroundStats), AnalysisError> {
        let data = upload.data.clone();
        let config = Arc::clone(&self.config);

        tokio::task::spawn_blocking(move || {
            let decoded = ImageProcessor::decode(&data)?;
            let sample = ImageProcessor::sample(&decoded.image, config.sample_size);
            let stats = background::measure(&sample, &config);
            Ok::<_, AnalysisError>((decoded.metadata, stats))
        })
        .await
        .map_err(|e| AnalysisError::Internal(format!("Image analysis task failed: {}", e)))?
    }

    async fn content_findings(&self, upload: &UploadedImage) -> RuleFindings {
        let Some(annotator) = &self.annotator else {
            return RuleFindings::default();
        };

        match annotator.annotate(&upload.data).await {
            Ok(annotations) => {
                tracing::debug!(
                    provider = annotator.name(),
                    objects = annotations.localized_object_annotations.len(),
                    "Vision annotations received"
                );
                content::interpret(&annotations)
            }
            Err(err) => content::vision_error(&err),
        }
    }

    fn metrics(
        upload: &UploadedImage,
        metadata: &ImageMetadata,
        stats: &BackgroundStats,
        format: String,
    ) -> ReportMetrics {
        ReportMetrics {
            width: metadata.width,
            height: metadata.height,
            aspect_ratio: format!("{:.2}", metadata.aspect_ratio()),
            file_size: upload.size(),
            edge_white_ratio: format!("{:.4}", stats.edge_white_ratio),
            center_white_ratio: format!("{:.4}", stats.center_white_ratio),
            product_coverage: format!("{:.4}", stats.coverage()),
            format,
            sample_width: stats.sample_width,
            sample_height: stats.sample_height,
            color_space: metadata.color_space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aplus_core::models::LocalizedObject;
    use aplus_core::{Compliance, FindingCode, RemoteServiceError, Severity, VisionAnnotations};
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct StubAnnotator {
        result: Result<VisionAnnotations, RemoteServiceError>,
        calls: AtomicUsize,
    }

    impl StubAnnotator {
        fn ok(annotations: VisionAnnotations) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(annotations),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(error: RemoteServiceError) -> Arc<Self> {
            Arc::new(Self {
                result: Err(error),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VisionAnnotator for StubAnnotator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn annotate(&self, _image: &[u8]) -> Result<VisionAnnotations, RemoteServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    /// 1600x1600 white JPEG with a gray product block over 240..1376 on both
    /// axes, which lands on 15..86 in the 100x100 sample.
    fn product_jpeg() -> Vec<u8> {
        let img = RgbImage::from_fn(1600, 1600, |x, y| {
            if (240..1376).contains(&x) && (240..1376).contains(&y) {
                Rgb([120, 120, 120])
            } else {
                Rgb([255, 255, 255])
            }
        });
        encode(img, ImageFormat::Jpeg)
    }

    fn upload(data: Vec<u8>, content_type: &str, filename: &str) -> UploadedImage {
        UploadedImage::new(data, content_type, filename)
    }

    fn codes(findings: &[aplus_core::Finding]) -> Vec<FindingCode> {
        findings.iter().map(|f| f.code).collect()
    }

    #[tokio::test]
    async fn test_compliant_product_passes() {
        let analyzer = ComplianceAnalyzer::new(AnalyzerConfig::default());
        let report = analyzer
            .analyze(&upload(product_jpeg(), "image/jpeg", "product.jpg"))
            .await
            .unwrap();

        assert_eq!(report.compliance, Compliance::Pass, "{:?}", report);
        assert!(report.issues.is_empty());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);

        let metrics = report.metrics.as_ref().unwrap();
        assert_eq!(metrics.width, 1600);
        assert_eq!(metrics.height, 1600);
        assert_eq!(metrics.aspect_ratio, "1.00");
        assert_eq!(metrics.edge_white_ratio, "1.0000");
        assert_eq!(metrics.format, "jpg");
        assert_eq!((metrics.sample_width, metrics.sample_height), (100, 100));

        let meta = report.meta.as_ref().unwrap();
        assert_eq!(meta.filename, "product.jpg");
        assert_eq!(meta.mimetype, "image/jpeg");
    }

    #[tokio::test]
    async fn test_small_white_png_fails_on_every_axis() {
        let data = encode(
            RgbImage::from_pixel(200, 100, Rgb([255, 255, 255])),
            ImageFormat::Png,
        );
        let analyzer = ComplianceAnalyzer::new(AnalyzerConfig::default());
        let report = analyzer
            .analyze(&upload(data, "image/png", "white.png"))
            .await
            .unwrap();

        assert_eq!(report.compliance, Compliance::Fail);
        assert_eq!(
            codes(&report.issues),
            vec![
                FindingCode::InvalidFormat,
                FindingCode::InvalidSize,
                FindingCode::BackgroundColor,
                FindingCode::ProductCoverage,
            ]
        );
        assert_eq!(codes(&report.warnings), vec![FindingCode::AspectRatio]);

        let metrics = report.metrics.as_ref().unwrap();
        assert_eq!(metrics.aspect_ratio, "2.00");
        assert_eq!(metrics.center_white_ratio, "1.0000");
        assert_eq!(metrics.product_coverage, "0.0000");
        assert_eq!(metrics.format, "png");
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_a_decode_error() {
        let analyzer = ComplianceAnalyzer::new(AnalyzerConfig::default());
        let err = analyzer
            .analyze(&upload(b"definitely not a jpeg".to_vec(), "image/jpeg", "x.jpg"))
            .await
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_error_report_hides_details_by_default() {
        let bytes = b"garbage".to_vec();
        let hidden = ComplianceAnalyzer::new(AnalyzerConfig::default())
            .analyze_or_error_report(&upload(bytes.clone(), "image/jpeg", "x.jpg"))
            .await;
        assert_eq!(hidden.compliance, Compliance::Error);
        assert_eq!(codes(&hidden.issues), vec![FindingCode::ServerError]);
        assert!(hidden.issues[0].details.is_none());
        assert!(hidden.metrics.is_none());

        let exposed = ComplianceAnalyzer::new(AnalyzerConfig::default())
            .with_error_details(true)
            .analyze_or_error_report(&upload(bytes, "image/jpeg", "x.jpg"))
            .await;
        assert!(exposed.issues[0].details.is_some());
    }

    #[tokio::test]
    async fn test_analysis_is_idempotent() {
        let analyzer = ComplianceAnalyzer::new(AnalyzerConfig::default());
        let image = upload(product_jpeg(), "image/jpeg", "product.jpg");

        let first = analyzer.analyze(&image).await.unwrap();
        let second = analyzer.analyze(&image).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_annotator_failure_adds_exactly_one_warning() {
        let image = upload(product_jpeg(), "image/jpeg", "product.jpg");
        let baseline = ComplianceAnalyzer::new(AnalyzerConfig::default())
            .analyze(&image)
            .await
            .unwrap();

        let annotator = StubAnnotator::failing(RemoteServiceError::Timeout(
            std::time::Duration::from_secs(5),
        ));
        let report = ComplianceAnalyzer::new(AnalyzerConfig::default())
            .with_annotator(annotator.clone())
            .analyze(&image)
            .await
            .unwrap();

        assert_eq!(annotator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.issues, baseline.issues);
        assert_eq!(report.warnings.len(), baseline.warnings.len() + 1);
        assert_eq!(
            report.warnings.last().map(|f| f.code),
            Some(FindingCode::VisionApiError)
        );
        assert_eq!(report.compliance, baseline.compliance);
    }

    #[tokio::test]
    async fn test_content_findings_follow_technical_findings() {
        let annotator = StubAnnotator::ok(VisionAnnotations {
            localized_object_annotations: vec![
                LocalizedObject::named("Mannequin"),
                LocalizedObject::named("Clothing"),
                LocalizedObject::named("Shoe"),
            ],
            ..Default::default()
        });
        let data = encode(
            RgbImage::from_pixel(100, 100, Rgb([255, 255, 255])),
            ImageFormat::Png,
        );
        let report = ComplianceAnalyzer::new(AnalyzerConfig::default())
            .with_annotator(annotator)
            .analyze(&upload(data, "image/png", "look.png"))
            .await
            .unwrap();

        assert_eq!(
            codes(&report.issues),
            vec![
                FindingCode::InvalidFormat,
                FindingCode::InvalidSize,
                FindingCode::BackgroundColor,
                FindingCode::ProductCoverage,
                FindingCode::MannequinDetected,
            ]
        );
        let mannequin = report.issues.last().unwrap();
        assert_eq!(mannequin.severity, Severity::Warning);
        assert!(mannequin.message.starts_with("For adult clothing"));
        assert_eq!(codes(&report.warnings), vec![FindingCode::ShoeOrientation]);
        assert_eq!(report.compliance, Compliance::Fail);
    }

    #[tokio::test]
    async fn test_reclassified_mannequin_alone_still_fails() {
        let annotator = StubAnnotator::ok(VisionAnnotations {
            localized_object_annotations: vec![
                LocalizedObject::named("Person"),
                LocalizedObject::named("Apparel"),
            ],
            ..Default::default()
        });
        let report = ComplianceAnalyzer::new(AnalyzerConfig::default())
            .with_annotator(annotator)
            .analyze(&upload(product_jpeg(), "image/jpeg", "dress.jpg"))
            .await
            .unwrap();

        assert_eq!(codes(&report.issues), vec![FindingCode::MannequinDetected]);
        assert_eq!(report.issues[0].severity, Severity::Warning);
        assert_eq!(report.compliance, Compliance::Fail);
    }
}
