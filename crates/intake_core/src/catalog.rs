use shared::error::ApiError;
use tracing::{info, warn};

use crate::service::DiagnosisService;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomCatalog {
    names: Vec<String>,
}

impl SymptomCatalog {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|candidate| candidate == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    #[default]
    Loading,
    Loaded(SymptomCatalog),
    Failed(ApiError),
}

impl CatalogState {
    pub fn catalog(&self) -> Option<&SymptomCatalog> {
        match self {
            CatalogState::Loaded(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CatalogState::Loading)
    }
}

/// Fetches the symptom vocabulary once. Failures are logged and folded into
/// [`CatalogState::Failed`]; nothing is retried.
pub async fn load_catalog<S>(service: &S) -> CatalogState
where
    S: DiagnosisService + ?Sized,
{
    match service.fetch_symptoms().await {
        Ok(names) => {
            info!(count = names.len(), "loaded symptom catalog");
            CatalogState::Loaded(SymptomCatalog::new(names))
        }
        Err(err) => {
            warn!(error = %err, "failed to load symptom catalog");
            CatalogState::Failed(ApiError::from(err))
        }
    }
}
