use super::*;
use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use shared::{
    error::ErrorCode,
    protocol::{DiagnosisRequest, DiagnosisResult},
};

use crate::{error::ServiceError, render::{result_view, ResultView}};

struct StubService {
    symptoms: Result<Vec<String>, String>,
    diagnoses: Mutex<VecDeque<Result<DiagnosisResult, String>>>,
    catalog_calls: Mutex<u32>,
    requests: Mutex<Vec<DiagnosisRequest>>,
}

impl StubService {
    fn new(symptoms: &[&str]) -> Self {
        Self {
            symptoms: Ok(symptoms.iter().map(|name| name.to_string()).collect()),
            diagnoses: Mutex::new(VecDeque::new()),
            catalog_calls: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing_catalog(reason: &str) -> Self {
        let mut service = Self::new(&[]);
        service.symptoms = Err(reason.to_string());
        service
    }

    fn respond_with(self, response: Result<DiagnosisResult, String>) -> Self {
        self.diagnoses.lock().expect("lock").push_back(response);
        self
    }

    fn catalog_calls(&self) -> u32 {
        *self.catalog_calls.lock().expect("lock")
    }

    fn requests(&self) -> Vec<DiagnosisRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DiagnosisService for StubService {
    async fn fetch_symptoms(&self) -> Result<Vec<String>, ServiceError> {
        *self.catalog_calls.lock().expect("lock") += 1;
        self.symptoms
            .clone()
            .map_err(|reason| ServiceError::Malformed {
                endpoint: "get_symptoms",
                reason,
            })
    }

    async fn start_conversation(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<DiagnosisResult, ServiceError> {
        self.requests.lock().expect("lock").push(request.clone());
        let next = self.diagnoses.lock().expect("lock").pop_front();
        match next {
            Some(Ok(result)) => Ok(result),
            Some(Err(reason)) => Err(ServiceError::Malformed {
                endpoint: "start_conversation",
                reason,
            }),
            None => Err(ServiceError::Malformed {
                endpoint: "start_conversation",
                reason: "no response queued".into(),
            }),
        }
    }
}

fn flu(precautions: &[&str]) -> DiagnosisResult {
    DiagnosisResult {
        disease: "Flu".into(),
        description: "Seasonal influenza.".into(),
        precautions: precautions.iter().map(|item| item.to_string()).collect(),
    }
}

async fn selecting(service: StubService) -> IntakeController<StubService> {
    let mut controller = IntakeController::new(Arc::new(service));
    controller.load_catalog().await;
    controller.set_identity("Alice").expect("identity");
    controller.advance().expect("advance");
    controller
}

#[tokio::test]
async fn catalog_is_fetched_once_per_session() {
    let mut controller = IntakeController::new(Arc::new(StubService::new(&["cough", "fever"])));

    let loaded = controller.load_catalog().await.catalog().cloned();
    assert_eq!(
        loaded.as_ref().map(|catalog| catalog.names().to_vec()),
        Some(vec!["cough".to_string(), "fever".to_string()])
    );
    controller.load_catalog().await;
    assert_eq!(controller.service().catalog_calls(), 1);
}

#[tokio::test]
async fn failed_catalog_is_distinguished_from_loading() {
    let mut controller = IntakeController::new(Arc::new(StubService::failing_catalog("bad body")));

    match controller.load_catalog().await {
        CatalogState::Failed(err) => {
            assert_eq!(err.code, ErrorCode::Malformed);
            assert!(err.message.contains("bad body"));
        }
        other => panic!("unexpected catalog state: {other:?}"),
    }
    controller.load_catalog().await;
    assert_eq!(controller.service().catalog_calls(), 1);
}

#[tokio::test]
async fn submit_sends_catalog_ordered_symptoms() {
    let service = StubService::new(&["cough", "fever", "headache"]).respond_with(Ok(flu(&[])));
    let mut controller = selecting(service).await;
    controller.toggle_symptom("fever").expect("toggle");
    controller.toggle_symptom("cough").expect("toggle");

    controller.submit().await.expect("submit");

    let requests = controller.service().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].symptoms, vec!["cough", "fever"]);
    assert_eq!(requests[0].days, 3);
    assert!(requests[0].additional_symptoms.is_empty());
}

#[tokio::test]
async fn failed_submit_is_recorded_and_recoverable() {
    let service = StubService::new(&["cough"])
        .respond_with(Err("service exploded".into()))
        .respond_with(Ok(flu(&["Rest", "Hydrate"])));
    let mut controller = selecting(service).await;
    controller.toggle_symptom("cough").expect("toggle");

    let first = controller.submit().await.expect("failure stays inside controller");
    assert!(matches!(
        result_view(controller.session()),
        Some(ResultView::Failure(message)) if message.contains("service exploded")
    ));
    assert_eq!(controller.session().stage(), Stage::SelectSymptoms);
    assert!(!controller.session().is_submitting());

    let second = controller.submit().await.expect("resubmit");
    assert!(second > first);
    assert_eq!(controller.session().outcome(), Some(&Ok(flu(&["Rest", "Hydrate"]))));
}

#[tokio::test]
async fn submit_before_identity_is_rejected_without_network() {
    let mut controller = IntakeController::new(Arc::new(StubService::new(&["cough"])));
    controller.load_catalog().await;

    let err = controller.submit().await.expect_err("must be rejected");
    assert!(matches!(err, IntakeError::WrongStage { .. }));
    assert!(controller.service().requests().is_empty());
}
