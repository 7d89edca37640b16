use std::sync::Arc;

use shared::{
    domain::{Stage, SubmissionId},
    error::ApiError,
};
use tracing::{info_span, Instrument};

use crate::{
    catalog::{load_catalog, CatalogState},
    error::IntakeError,
    service::DiagnosisService,
    session::IntakeSession,
};

/// Drives an [`IntakeSession`] against a diagnosis service. Network failures
/// are folded into session state; only stage-gating errors are returned.
pub struct IntakeController<S: ?Sized> {
    session: IntakeSession,
    service: Arc<S>,
}

impl<S> IntakeController<S>
where
    S: DiagnosisService + ?Sized,
{
    pub fn new(service: Arc<S>) -> Self {
        Self {
            session: IntakeSession::new(),
            service,
        }
    }

    pub fn session(&self) -> &IntakeSession {
        &self.session
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub async fn load_catalog(&mut self) -> &CatalogState {
        if self.session.catalog().is_loading() {
            let span = info_span!("load_catalog", session_id = %self.session.session_id());
            let state = load_catalog(self.service.as_ref()).instrument(span).await;
            self.session.apply_catalog(state);
        }
        self.session.catalog()
    }

    pub fn apply_catalog(&mut self, state: CatalogState) -> bool {
        self.session.apply_catalog(state)
    }

    pub fn set_identity(&mut self, name: impl Into<String>) -> Result<(), IntakeError> {
        self.session.set_identity(name)
    }

    pub fn advance(&mut self) -> Result<Stage, IntakeError> {
        self.session.advance()
    }

    pub fn toggle_symptom(&mut self, name: &str) -> Result<bool, IntakeError> {
        self.session.toggle_symptom(name)
    }

    pub async fn submit(&mut self) -> Result<SubmissionId, IntakeError> {
        let ticket = self.session.begin_submission()?;
        let span = info_span!(
            "submit",
            session_id = %self.session.session_id(),
            submission = %ticket.id
        );
        let outcome = self
            .service
            .start_conversation(&ticket.request)
            .instrument(span)
            .await
            .map_err(ApiError::from);
        self.session.complete_submission(ticket.id, outcome);
        Ok(ticket.id)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
