pub mod catalog;
pub mod controller;
pub mod error;
pub mod render;
pub mod service;
pub mod session;

pub use catalog::{load_catalog, CatalogState, SymptomCatalog};
pub use controller::IntakeController;
pub use error::{IntakeError, ServiceError};
pub use service::{DiagnosisService, HttpDiagnosisClient, DEFAULT_SERVICE_URL};
pub use session::{DiagnosisOutcome, IntakeSession, Resolution, SubmissionTicket};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
