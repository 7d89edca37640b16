use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::protocol::{
    DiagnosisRequest, DiagnosisResult, SymptomCatalogResponse, START_CONVERSATION_PATH,
    SYMPTOMS_PATH,
};
use tracing::debug;
use url::Url;

use crate::error::ServiceError;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

#[async_trait]
pub trait DiagnosisService: Send + Sync {
    async fn fetch_symptoms(&self) -> Result<Vec<String>, ServiceError>;
    async fn start_conversation(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<DiagnosisResult, ServiceError>;
}

pub struct HttpDiagnosisClient {
    http: Client,
    base_url: Url,
}

impl HttpDiagnosisClient {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ServiceError::ClientBuild)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|err| ServiceError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                reason: err.to_string(),
            })
    }
}

/// Parses the configured address and makes sure endpoint paths are joined
/// below it rather than replacing its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, ServiceError> {
    let invalid = |reason: String| ServiceError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid(format!(
            "expected an http or https address, got scheme '{}'",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn read_body(endpoint: &'static str, response: Response) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ServiceError::Transport { endpoint, source })?;
    if !status.is_success() {
        return Err(ServiceError::Status {
            endpoint,
            status,
            body,
        });
    }
    Ok(body)
}

/// Decodes an object payload. Non-object bodies are reported with their raw
/// text so a plain error string from the service stays visible.
fn decode_object<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, ServiceError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| ServiceError::Malformed {
            endpoint,
            reason: format!("{err}: {}", truncate(body)),
        })?;
    if !value.is_object() {
        return Err(ServiceError::Malformed {
            endpoint,
            reason: format!("expected a JSON object, got {}", truncate(body)),
        });
    }
    serde_json::from_value(value).map_err(|err| ServiceError::Malformed {
        endpoint,
        reason: err.to_string(),
    })
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl DiagnosisService for HttpDiagnosisClient {
    async fn fetch_symptoms(&self) -> Result<Vec<String>, ServiceError> {
        let url = self.endpoint(SYMPTOMS_PATH)?;
        debug!(%url, "requesting symptom catalog");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: SYMPTOMS_PATH,
                source,
            })?;
        let body = read_body(SYMPTOMS_PATH, response).await?;
        let catalog: SymptomCatalogResponse = decode_object(SYMPTOMS_PATH, &body)?;
        Ok(catalog.symptoms)
    }

    async fn start_conversation(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<DiagnosisResult, ServiceError> {
        let url = self.endpoint(START_CONVERSATION_PATH)?;
        debug!(%url, symptoms = request.symptoms.len(), "submitting diagnosis request");
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                endpoint: START_CONVERSATION_PATH,
                source,
            })?;
        let body = read_body(START_CONVERSATION_PATH, response).await?;
        decode_object(START_CONVERSATION_PATH, &body)
    }
}
