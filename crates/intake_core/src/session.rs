use std::collections::HashSet;

use chrono::{DateTime, Utc};
use shared::{
    domain::{Stage, SubmissionId},
    error::ApiError,
    protocol::{DiagnosisRequest, DiagnosisResult},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    catalog::{CatalogState, SymptomCatalog},
    error::IntakeError,
};

pub type DiagnosisOutcome = Result<DiagnosisResult, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub submission: SubmissionId,
    pub outcome: DiagnosisOutcome,
    pub resolved_at: DateTime<Utc>,
}

/// Issued by [`IntakeSession::begin_submission`]; the id must be handed back
/// with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub id: SubmissionId,
    pub request: DiagnosisRequest,
}

#[derive(Debug)]
pub struct IntakeSession {
    session_id: Uuid,
    identity: String,
    selection: HashSet<String>,
    stage: Stage,
    catalog: CatalogState,
    resolution: Option<Resolution>,
    pending: Option<SubmissionId>,
    last_submission: u64,
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            identity: String::new(),
            selection: HashSet::new(),
            stage: Stage::Identify,
            catalog: CatalogState::Loading,
            resolution: None,
            pending: None,
            last_submission: 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.contains(name)
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    pub fn selected_symptoms(&self) -> Vec<String> {
        self.catalog
            .catalog()
            .map(|catalog| {
                catalog
                    .iter()
                    .filter(|name| self.selection.contains(*name))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pending_submission(&self) -> Option<SubmissionId> {
        self.pending
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn outcome(&self) -> Option<&DiagnosisOutcome> {
        self.resolution.as_ref().map(|resolution| &resolution.outcome)
    }

    pub fn apply_catalog(&mut self, state: CatalogState) -> bool {
        if !self.catalog.is_loading() {
            warn!(session_id = %self.session_id, "ignoring repeated symptom catalog load");
            return false;
        }
        if state.is_loading() {
            return false;
        }
        self.catalog = state;
        true
    }

    pub fn set_identity(&mut self, name: impl Into<String>) -> Result<(), IntakeError> {
        self.require_stage(Stage::Identify, "set_identity")?;
        self.identity = name.into();
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Stage, IntakeError> {
        self.require_stage(Stage::Identify, "advance")?;
        if self.identity.trim().is_empty() {
            return Err(IntakeError::IdentityRequired);
        }
        self.stage = Stage::SelectSymptoms;
        info!(session_id = %self.session_id, "identity accepted; selecting symptoms");
        Ok(self.stage)
    }

    pub fn toggle_symptom(&mut self, name: &str) -> Result<bool, IntakeError> {
        self.require_stage(Stage::SelectSymptoms, "toggle_symptom")?;
        let catalog = self.loaded_catalog()?;
        if !catalog.contains(name) {
            return Err(IntakeError::UnknownSymptom(name.to_string()));
        }
        let selected = if self.selection.remove(name) {
            false
        } else {
            self.selection.insert(name.to_string());
            true
        };
        debug!(session_id = %self.session_id, symptom = name, selected, "toggled symptom");
        Ok(selected)
    }

    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, IntakeError> {
        self.require_stage(Stage::SelectSymptoms, "submit")?;
        if let Some(pending) = self.pending {
            return Err(IntakeError::SubmissionInFlight(pending));
        }
        self.last_submission += 1;
        let id = SubmissionId(self.last_submission);
        self.pending = Some(id);
        let request = DiagnosisRequest::for_symptoms(self.selected_symptoms());
        info!(
            session_id = %self.session_id,
            submission = %id,
            symptoms = request.symptoms.len(),
            "diagnosis submission started"
        );
        Ok(SubmissionTicket { id, request })
    }

    /// Stores `outcome` if `id` is the submission still awaited. Responses for
    /// superseded submissions are dropped.
    pub fn complete_submission(&mut self, id: SubmissionId, outcome: DiagnosisOutcome) -> bool {
        if self.pending != Some(id) {
            warn!(
                session_id = %self.session_id,
                submission = %id,
                pending = ?self.pending,
                "discarding stale diagnosis response"
            );
            return false;
        }
        self.pending = None;
        match &outcome {
            Ok(result) => info!(
                session_id = %self.session_id,
                submission = %id,
                disease = %result.disease,
                "diagnosis received"
            ),
            Err(err) => warn!(
                session_id = %self.session_id,
                submission = %id,
                error = %err,
                "diagnosis submission failed"
            ),
        }
        self.resolution = Some(Resolution {
            submission: id,
            outcome,
            resolved_at: Utc::now(),
        });
        true
    }

    fn require_stage(&self, expected: Stage, operation: &'static str) -> Result<(), IntakeError> {
        if self.stage != expected {
            return Err(IntakeError::WrongStage {
                operation,
                stage: self.stage,
            });
        }
        Ok(())
    }

    fn loaded_catalog(&self) -> Result<&SymptomCatalog, IntakeError> {
        self.catalog
            .catalog()
            .ok_or(IntakeError::CatalogUnavailable)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
