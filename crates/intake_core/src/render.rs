use crate::{catalog::CatalogState, session::IntakeSession};

pub const LOADING_SYMPTOMS: &str = "Loading symptoms...";
pub const NO_PRECAUTIONS: &str = "No precautions available";
pub const SUBMISSION_FAILED: &str = "Error processing your request.";
pub const NAME_REQUIRED: &str = "Please enter your name.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomEntry {
    pub name: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionView {
    Loading,
    Failed(String),
    Symptoms(Vec<SymptomEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Pending,
    Diagnosis {
        disease: String,
        description: String,
        /// Never empty; holds [`NO_PRECAUTIONS`] when the service sent none.
        precautions: Vec<String>,
    },
    Failure(String),
}

pub fn selection_view(session: &IntakeSession) -> SelectionView {
    match session.catalog() {
        CatalogState::Loading => SelectionView::Loading,
        CatalogState::Failed(err) => SelectionView::Failed(err.message.clone()),
        CatalogState::Loaded(catalog) => SelectionView::Symptoms(
            catalog
                .iter()
                .map(|name| SymptomEntry {
                    name: name.to_string(),
                    checked: session.is_selected(name),
                })
                .collect(),
        ),
    }
}

/// `None` until the first submission starts.
pub fn result_view(session: &IntakeSession) -> Option<ResultView> {
    if session.is_submitting() {
        return Some(ResultView::Pending);
    }
    let view = match session.outcome()? {
        Ok(result) => {
            let precautions = if result.precautions.is_empty() {
                vec![NO_PRECAUTIONS.to_string()]
            } else {
                result.precautions.clone()
            };
            ResultView::Diagnosis {
                disease: result.disease.clone(),
                description: result.description.clone(),
                precautions,
            }
        }
        Err(err) => ResultView::Failure(err.message.clone()),
    };
    Some(view)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
