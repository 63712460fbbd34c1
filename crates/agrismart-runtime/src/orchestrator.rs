//! Advice orchestrator.
//!
//! Runs one farmer request through the advisors in a fixed order:
//! - Validate soil fields and the upload (reject before anything else runs)
//! - Recommend a crop
//! - Store and classify the image, when one was sent
//! - Fetch the forecast for the validated location
//! - Compose tips and assemble the report
//!
//! Only validation can fail a request. Storage, classification and forecast
//! problems degrade into the report instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use agrismart_core::{
    fallback_forecast, AdviceReport, ClassificationError, CropAdvisor, DimensionIndexClassifier,
    DiseaseClassifier, DiseaseFinding, Forecast, ForecastProvider, MockForecastProvider,
    RawSoilInput, RuleBasedCropAdvisor, SoilInputValidator, SoilSample, TipComposer,
    UploadedImage, ValidationError,
};

use crate::config::{RuntimeConfig, UploadConfig};
use crate::storage::{FsImageStore, ImageStore};

/// Errors that end a request.
#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Request rejected: {0}")]
    Rejected(#[from] ValidationError),
}

/// Steps a request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Received,
    Validated,
    Rejected,
    CropAdvised,
    ImageClassified,
    ImageNotStored,
    NoImage,
    ForecastFetched,
    TipsComposed,
    Completed,
}

/// The states one request went through, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTrace {
    pub request_id: u64,
    pub states: Vec<RequestState>,
}

impl RequestTrace {
    fn new(request_id: u64) -> Self {
        Self {
            request_id,
            states: Vec::new(),
        }
    }

    fn enter(&mut self, state: RequestState) {
        tracing::debug!(request_id = self.request_id, state = ?state, "Request state");
        self.states.push(state);
    }

    /// The last state reached.
    pub fn last(&self) -> Option<RequestState> {
        self.states.last().copied()
    }
}

/// One farmer request: raw form fields plus an optional upload.
#[derive(Debug, Clone, Default)]
pub struct AdviceRequest {
    pub input: RawSoilInput,
    pub image: Option<UploadedImage>,
}

impl AdviceRequest {
    pub fn new(input: RawSoilInput) -> Self {
        Self { input, image: None }
    }

    pub fn with_image(mut self, image: UploadedImage) -> Self {
        self.image = Some(image);
        self
    }

    /// The upload, unless its filename is blank (an empty form field).
    pub fn upload(&self) -> Option<&UploadedImage> {
        self.image
            .as_ref()
            .filter(|image| !image.filename.trim().is_empty())
    }
}

/// Runs requests through the injected advisors.
///
/// Holds no per-request state apart from the request counter, so one
/// orchestrator can serve concurrent callers.
pub struct AdviceOrchestrator {
    validator: SoilInputValidator,
    upload: UploadConfig,
    crop_advisor: Arc<dyn CropAdvisor>,
    classifier: Arc<dyn DiseaseClassifier>,
    forecast_provider: Arc<dyn ForecastProvider>,
    image_store: Arc<dyn ImageStore>,
    tips: TipComposer,
    next_request_id: AtomicU64,
}

impl AdviceOrchestrator {
    /// Builder with the default advisors for `config`.
    pub fn builder(config: RuntimeConfig) -> AdviceOrchestratorBuilder {
        AdviceOrchestratorBuilder::new().config(config)
    }

    /// Produce a report for `request`, or reject it.
    pub fn advise(&self, request: &AdviceRequest) -> Result<AdviceReport, AdviceError> {
        self.advise_traced(request).0
    }

    /// Like [`advise`](Self::advise), also returning the states visited.
    pub fn advise_traced(
        &self,
        request: &AdviceRequest,
    ) -> (Result<AdviceReport, AdviceError>, RequestTrace) {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut trace = RequestTrace::new(request_id);
        trace.enter(RequestState::Received);

        let sample = match self.validate(request) {
            Ok(sample) => sample,
            Err(errors) => {
                tracing::info!(
                    request_id,
                    fields = errors.errors().len(),
                    "Rejected request: {}",
                    errors
                );
                trace.enter(RequestState::Rejected);
                return (Err(AdviceError::Rejected(errors)), trace);
            }
        };
        trace.enter(RequestState::Validated);

        let crop = self.crop_advisor.recommend(&sample);
        tracing::debug!(
            request_id,
            advisor = self.crop_advisor.name(),
            crop = crop.name(),
            "Recommended crop"
        );
        trace.enter(RequestState::CropAdvised);

        let (disease_finding, stored_image) = match request.upload() {
            Some(image) => {
                let (finding, stored) = self.handle_image(request_id, image);
                trace.enter(match finding {
                    DiseaseFinding::StorageFailed { .. } => RequestState::ImageNotStored,
                    _ => RequestState::ImageClassified,
                });
                (Some(finding), stored)
            }
            None => {
                trace.enter(RequestState::NoImage);
                (None, None)
            }
        };

        let forecast = self.fetch_forecast(request_id, sample.location());
        trace.enter(RequestState::ForecastFetched);

        let tips = self.tips.compose(crop, &sample, &forecast);
        trace.enter(RequestState::TipsComposed);

        let report = AdviceReport {
            recommended_crop: crop,
            disease_finding,
            forecast,
            tips,
            soil_sample: sample,
            stored_image,
            generated_at: Utc::now(),
        };
        trace.enter(RequestState::Completed);

        tracing::info!(
            request_id,
            crop = report.recommended_crop.name(),
            location = report.soil_sample.location(),
            tips = report.tips.len(),
            "Completed advice request"
        );

        (Ok(report), trace)
    }

    /// Soil fields and upload limits, every violation collected.
    fn validate(&self, request: &AdviceRequest) -> Result<SoilSample, ValidationError> {
        let mut errors = ValidationError::default();

        let sample = match self.validator.validate(&request.input) {
            Ok(sample) => Some(sample),
            Err(e) => {
                errors.extend(e);
                None
            }
        };

        if let Some(image) = request.upload() {
            for error in self.upload.check(image) {
                errors.push(error);
            }
        }

        match sample {
            Some(sample) if errors.is_empty() => Ok(sample),
            _ => Err(errors),
        }
    }

    /// Forecast from the provider, replaced by the fallback week when it is
    /// not seven days starting Monday.
    fn fetch_forecast(&self, request_id: u64, location: &str) -> Forecast {
        let forecast = self.forecast_provider.forecast(location);
        match forecast.check_shape() {
            Ok(()) => forecast,
            Err(e) => {
                tracing::warn!(
                    request_id,
                    provider = self.forecast_provider.name(),
                    error = %e,
                    "Malformed forecast, using fallback table"
                );
                fallback_forecast(location)
            }
        }
    }

    /// Store, classify and (unless retained) discard the upload.
    fn handle_image(
        &self,
        request_id: u64,
        image: &UploadedImage,
    ) -> (DiseaseFinding, Option<std::path::PathBuf>) {
        let stored = match self.image_store.persist(image) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(request_id, error = %e, "Could not store upload, skipping classification");
                return (
                    DiseaseFinding::StorageFailed {
                        reason: e.to_string(),
                    },
                    None,
                );
            }
        };

        let finding = match self.classifier.classify(&image.bytes) {
            Ok(disease) => DiseaseFinding::Detected { disease },
            Err(ClassificationError::ImageUnreadable(reason)) => {
                tracing::warn!(request_id, classifier = self.classifier.name(), reason = %reason, "Unreadable image");
                DiseaseFinding::Unreadable { reason }
            }
            Err(ClassificationError::ModelUnavailable) => {
                tracing::warn!(request_id, classifier = self.classifier.name(), "No disease model available");
                DiseaseFinding::Unavailable
            }
        };

        if self.upload.retain {
            return (finding, Some(stored.path));
        }

        if let Err(e) = self.image_store.discard(&stored) {
            tracing::warn!(request_id, path = %stored.path.display(), error = %e, "Failed to discard upload");
        }
        (finding, None)
    }
}

/// Builder for AdviceOrchestrator.
pub struct AdviceOrchestratorBuilder {
    config: RuntimeConfig,
    crop_advisor: Option<Arc<dyn CropAdvisor>>,
    classifier: Option<Arc<dyn DiseaseClassifier>>,
    forecast_provider: Option<Arc<dyn ForecastProvider>>,
    image_store: Option<Arc<dyn ImageStore>>,
}

impl AdviceOrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            crop_advisor: None,
            classifier: None,
            forecast_provider: None,
            image_store: None,
        }
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn crop_advisor(mut self, advisor: Arc<dyn CropAdvisor>) -> Self {
        self.crop_advisor = Some(advisor);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn DiseaseClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn forecast_provider(mut self, provider: Arc<dyn ForecastProvider>) -> Self {
        self.forecast_provider = Some(provider);
        self
    }

    pub fn image_store(mut self, store: Arc<dyn ImageStore>) -> Self {
        self.image_store = Some(store);
        self
    }

    /// Build the orchestrator, filling unset advisors with the defaults.
    pub fn build(self) -> AdviceOrchestrator {
        let RuntimeConfig { upload, forecast } = self.config;

        let forecast_provider = self.forecast_provider.unwrap_or_else(|| {
            let provider = match forecast.seed {
                Some(seed) => MockForecastProvider::seeded(seed),
                None => MockForecastProvider::from_entropy(),
            };
            Arc::new(provider)
        });
        let image_store = self
            .image_store
            .unwrap_or_else(|| Arc::new(FsImageStore::new(upload.dir.clone())));

        AdviceOrchestrator {
            validator: SoilInputValidator::new(),
            crop_advisor: self
                .crop_advisor
                .unwrap_or_else(|| Arc::new(RuleBasedCropAdvisor::new())),
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(DimensionIndexClassifier::new())),
            forecast_provider,
            image_store,
            upload,
            tips: TipComposer::new(),
            next_request_id: AtomicU64::new(0),
        }
    }
}

impl Default for AdviceOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageError, StoredImage};
    use agrismart_core::{
        Crop, Disease, Forecast, ForecastDay, ForecastSource, SoilField, StaticForecastProvider,
        UnavailableClassifier,
    };
    use chrono::Weekday;
    use image::{ImageFormat, RgbImage};
    use parking_lot::Mutex;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;

    struct CountingAdvisor {
        calls: AtomicUsize,
        crop: Crop,
    }

    impl CountingAdvisor {
        fn new(crop: Crop) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                crop,
            }
        }
    }

    impl CropAdvisor for CountingAdvisor {
        fn name(&self) -> &str {
            "counting"
        }

        fn recommend(&self, _sample: &SoilSample) -> Crop {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.crop
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        stored: Mutex<Vec<StoredImage>>,
        discarded: Mutex<Vec<StoredImage>>,
    }

    impl ImageStore for MemoryStore {
        fn persist(&self, image: &UploadedImage) -> Result<StoredImage, StorageError> {
            let stored = StoredImage {
                path: PathBuf::from("/memory").join(&image.filename),
                filename: image.filename.clone(),
            };
            self.stored.lock().push(stored.clone());
            Ok(stored)
        }

        fn discard(&self, stored: &StoredImage) -> Result<(), StorageError> {
            self.discarded.lock().push(stored.clone());
            Ok(())
        }
    }

    struct FailingStore;

    impl ImageStore for FailingStore {
        fn persist(&self, _image: &UploadedImage) -> Result<StoredImage, StorageError> {
            Err(StorageError::DirectoryMissing(PathBuf::from("/nowhere")))
        }

        fn discard(&self, _stored: &StoredImage) -> Result<(), StorageError> {
            Ok(())
        }
    }

    struct RainyWeekProvider;

    impl ForecastProvider for RainyWeekProvider {
        fn name(&self) -> &str {
            "rainy-week"
        }

        fn forecast(&self, location: &str) -> Forecast {
            let days = std::iter::successors(Some(Weekday::Mon), |d| Some(d.succ()))
                .zip([80, 60, 80, 60, 10, 0, 20])
                .map(|(day, rain)| ForecastDay::new(day, 22, rain))
                .collect();
            Forecast {
                location: location.to_string(),
                days,
                source: ForecastSource::Generated,
            }
        }
    }

    fn input(soil_type: &str, ph: f64, n: f64, p: f64, k: f64) -> RawSoilInput {
        RawSoilInput {
            soil_type: Some(soil_type.into()),
            ph: Some(ph.into()),
            nitrogen: Some(n.into()),
            phosphorus: Some(p.into()),
            potassium: Some(k.into()),
            location: Some("Kitale".into()),
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn orchestrator(store: Arc<dyn ImageStore>) -> AdviceOrchestrator {
        AdviceOrchestratorBuilder::new()
            .forecast_provider(Arc::new(StaticForecastProvider::new()))
            .image_store(store)
            .build()
    }

    #[test]
    fn test_happy_path_without_image() {
        let orchestrator = orchestrator(Arc::new(MemoryStore::default()));
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0));

        let (result, trace) = orchestrator.advise_traced(&request);
        let report = result.unwrap();

        assert_eq!(report.recommended_crop, Crop::Rice);
        assert!(report.disease_finding.is_none());
        assert!(report.stored_image.is_none());
        assert_eq!(report.forecast.source, ForecastSource::Fallback);
        assert_eq!(report.forecast.location, "Kitale");
        assert_eq!(report.tips[0], "Maintain water level of 2-5cm in paddy fields");
        assert_eq!(
            trace.states,
            vec![
                RequestState::Received,
                RequestState::Validated,
                RequestState::CropAdvised,
                RequestState::NoImage,
                RequestState::ForecastFetched,
                RequestState::TipsComposed,
                RequestState::Completed,
            ]
        );
    }

    #[test]
    fn test_rejected_request_never_reaches_advisor() {
        let advisor = Arc::new(CountingAdvisor::new(Crop::Maize));
        let orchestrator = AdviceOrchestratorBuilder::new()
            .crop_advisor(advisor.clone())
            .forecast_provider(Arc::new(StaticForecastProvider::new()))
            .image_store(Arc::new(MemoryStore::default()))
            .build();

        let request = AdviceRequest::new(input("loamy", 15.0, 10.0, 10.0, 10.0));
        let (result, trace) = orchestrator.advise_traced(&request);

        let AdviceError::Rejected(errors) = result.unwrap_err();
        assert!(errors.has_field(SoilField::Ph));
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(advisor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(trace.states, vec![RequestState::Received, RequestState::Rejected]);
    }

    #[test]
    fn test_bad_upload_rejects_with_soil_errors() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone());

        let mut raw = input("clay", 6.5, 45.0, 20.0, 30.0);
        raw.location = None;
        let request = AdviceRequest::new(raw).with_image(UploadedImage::new("leaf.gif", vec![1, 2]));

        let AdviceError::Rejected(errors) = orchestrator.advise(&request).unwrap_err();
        assert!(errors.has_field(SoilField::Location));
        assert_eq!(errors.messages_for(SoilField::Image), vec!["Images only!"]);
        assert!(store.stored.lock().is_empty());
    }

    #[test]
    fn test_image_is_stored_and_classified() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone());
        let request = AdviceRequest::new(input("sandy", 7.0, 10.0, 10.0, 40.0))
            .with_image(UploadedImage::new("leaf.png", png(4, 3)));

        let (result, trace) = orchestrator.advise_traced(&request);
        let report = result.unwrap();

        assert_eq!(report.recommended_crop, Crop::Millet);
        assert_eq!(
            report.disease_finding,
            Some(DiseaseFinding::Detected {
                disease: Disease::EarlyBlight
            })
        );
        assert_eq!(report.stored_image, Some(PathBuf::from("/memory/leaf.png")));
        assert!(trace.states.contains(&RequestState::ImageClassified));
        assert_eq!(store.stored.lock().len(), 1);
        assert!(store.discarded.lock().is_empty());
    }

    #[test]
    fn test_unreadable_image_is_reported_not_healthy() {
        let orchestrator = orchestrator(Arc::new(MemoryStore::default()));
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0))
            .with_image(UploadedImage::new("leaf.png", b"not an image".to_vec()));

        let report = orchestrator.advise(&request).unwrap();
        let finding = report.disease_finding.unwrap();

        assert!(matches!(finding, DiseaseFinding::Unreadable { .. }));
        assert_eq!(finding.disease(), None);
        assert!(finding.to_string().starts_with("Error analyzing image: "));
    }

    #[test]
    fn test_missing_model_is_reported() {
        let orchestrator = AdviceOrchestratorBuilder::new()
            .classifier(Arc::new(UnavailableClassifier::new()))
            .forecast_provider(Arc::new(StaticForecastProvider::new()))
            .image_store(Arc::new(MemoryStore::default()))
            .build();
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0))
            .with_image(UploadedImage::new("leaf.jpg", png(2, 2)));

        let report = orchestrator.advise(&request).unwrap();
        assert_eq!(report.disease_finding, Some(DiseaseFinding::Unavailable));
    }

    #[test]
    fn test_storage_failure_skips_classification() {
        let orchestrator = orchestrator(Arc::new(FailingStore));
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0))
            .with_image(UploadedImage::new("leaf.png", png(4, 3)));

        let (result, trace) = orchestrator.advise_traced(&request);
        let report = result.unwrap();
        assert!(matches!(
            report.disease_finding,
            Some(DiseaseFinding::StorageFailed { .. })
        ));
        assert!(report.stored_image.is_none());
        assert_eq!(report.recommended_crop, Crop::Rice);
        assert!(trace.states.contains(&RequestState::ImageNotStored));
        assert!(!trace.states.contains(&RequestState::ImageClassified));
    }

    #[test]
    fn test_blank_filename_is_treated_as_no_image() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone());
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0))
            .with_image(UploadedImage::new("  ", Vec::new()));

        let (result, trace) = orchestrator.advise_traced(&request);
        let report = result.unwrap();
        assert!(report.disease_finding.is_none());
        assert!(report.stored_image.is_none());
        assert!(store.stored.lock().is_empty());
        assert!(trace.states.contains(&RequestState::NoImage));
    }

    #[test]
    fn test_malformed_forecast_replaced_by_fallback() {
        struct EmptyWeekProvider;

        impl ForecastProvider for EmptyWeekProvider {
            fn name(&self) -> &str {
                "empty-week"
            }

            fn forecast(&self, location: &str) -> Forecast {
                Forecast {
                    location: location.to_string(),
                    days: Vec::new(),
                    source: ForecastSource::Generated,
                }
            }
        }

        let orchestrator = AdviceOrchestratorBuilder::new()
            .forecast_provider(Arc::new(EmptyWeekProvider))
            .image_store(Arc::new(MemoryStore::default()))
            .build();

        let report = orchestrator
            .advise(&AdviceRequest::new(input("loamy", 6.5, 55.0, 30.0, 20.0)))
            .unwrap();
        assert_eq!(report.forecast, fallback_forecast("Kitale"));
        assert_eq!(report.forecast.days.len(), 7);
        assert_eq!(report.forecast.source, ForecastSource::Fallback);
    }

    #[test]
    fn test_upload_discarded_when_not_retained() {
        let store = Arc::new(MemoryStore::default());
        let mut config = RuntimeConfig::default();
        config.upload.retain = false;
        let orchestrator = AdviceOrchestrator::builder(config)
            .forecast_provider(Arc::new(StaticForecastProvider::new()))
            .image_store(store.clone())
            .build();

        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0))
            .with_image(UploadedImage::new("leaf.png", png(4, 3)));
        let report = orchestrator.advise(&request).unwrap();

        assert!(report.stored_image.is_none());
        assert!(report.disease_finding.is_some());
        assert_eq!(*store.stored.lock(), *store.discarded.lock());
    }

    #[test]
    fn test_tip_order_with_rainy_week() {
        let orchestrator = AdviceOrchestratorBuilder::new()
            .crop_advisor(Arc::new(CountingAdvisor::new(Crop::Maize)))
            .forecast_provider(Arc::new(RainyWeekProvider))
            .image_store(Arc::new(MemoryStore::default()))
            .build();

        let request = AdviceRequest::new(input("loamy", 5.5, 60.0, 30.0, 20.0));
        let report = orchestrator.advise(&request).unwrap();

        assert_eq!(
            report.tips,
            vec![
                "Plant during the rainy season for optimal growth",
                "Ensure proper spacing of 75cm between rows",
                "Apply nitrogen fertilizer at planting and during growth",
                "Consider adding lime to increase soil pH",
                "High rainfall expected - ensure proper drainage",
                "Consider fungicide application to prevent diseases",
            ]
        );
    }

    #[test]
    fn test_request_ids_increase() {
        let orchestrator = orchestrator(Arc::new(MemoryStore::default()));
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0));

        let (_, first) = orchestrator.advise_traced(&request);
        let (_, second) = orchestrator.advise_traced(&request);
        assert_eq!(first.request_id, 1);
        assert_eq!(second.request_id, 2);
        assert_eq!(second.last(), Some(RequestState::Completed));
    }

    #[test]
    fn test_seeded_config_is_reproducible() {
        let mut config = RuntimeConfig::default();
        config.forecast.seed = Some(11);
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0));

        let first = AdviceOrchestrator::builder(config.clone())
            .image_store(Arc::new(MemoryStore::default()))
            .build()
            .advise(&request)
            .unwrap();
        let second = AdviceOrchestrator::builder(config)
            .image_store(Arc::new(MemoryStore::default()))
            .build()
            .advise(&request)
            .unwrap();

        assert_eq!(first.forecast, second.forecast);
        assert_eq!(first.forecast.source, ForecastSource::Generated);
        assert_eq!(first.tips, second.tips);
    }

    #[test]
    fn test_end_to_end_with_filesystem_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = RuntimeConfig::default();
        config.upload.dir = dir.path().to_path_buf();
        let orchestrator = AdviceOrchestrator::builder(config)
            .forecast_provider(Arc::new(StaticForecastProvider::new()))
            .build();

        let bytes = png(4, 3);
        let request = AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0))
            .with_image(UploadedImage::new("../My Leaf.png", bytes.clone()));
        let report = orchestrator.advise(&request).unwrap();

        let stored = report.stored_image.unwrap();
        assert_eq!(stored.parent().unwrap(), dir.path());
        assert!(stored.to_string_lossy().ends_with("_My_Leaf.png"));
        assert_eq!(std::fs::read(&stored).unwrap(), bytes);

        let json = serde_json::to_value(&report_without_image(&orchestrator)).unwrap();
        assert_eq!(json["recommended_crop"], "Rice");
        assert!(json.get("disease_finding").is_none());
        assert!(json.get("stored_image").is_none());
        assert_eq!(json["forecast"]["days"].as_array().unwrap().len(), 7);
    }

    fn report_without_image(orchestrator: &AdviceOrchestrator) -> AdviceReport {
        orchestrator
            .advise(&AdviceRequest::new(input("clay", 6.5, 45.0, 20.0, 30.0)))
            .unwrap()
    }
}
