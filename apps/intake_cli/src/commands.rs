use std::{io::Write, sync::Arc};

use anyhow::{bail, Result};
use intake_core::{
    load_catalog, render::result_view, CatalogState, DiagnosisService, IntakeController,
};
use tracing::info;

use crate::terminal::format_result;

pub async fn print_catalog<S, W>(service: &S, out: &mut W) -> Result<()>
where
    S: DiagnosisService + ?Sized,
    W: Write,
{
    match load_catalog(service).await {
        CatalogState::Loaded(catalog) => {
            for (idx, name) in catalog.iter().enumerate() {
                writeln!(out, "{:>4}. {name}", idx + 1)?;
            }
            Ok(())
        }
        CatalogState::Failed(err) => bail!("could not load symptom catalog: {err}"),
        CatalogState::Loading => bail!("symptom catalog did not load"),
    }
}

pub async fn run_diagnose<S, W>(
    service: Arc<S>,
    name: &str,
    symptoms: &[String],
    json: bool,
    out: &mut W,
) -> Result<()>
where
    S: DiagnosisService + ?Sized,
    W: Write,
{
    let mut controller = IntakeController::new(service);
    if let CatalogState::Failed(err) = controller.load_catalog().await {
        bail!("could not load symptom catalog: {err}");
    }
    controller.set_identity(name)?;
    controller.advance()?;
    for symptom in symptoms {
        // repeated flags select once
        if !controller.session().is_selected(symptom) {
            controller.toggle_symptom(symptom)?;
        }
    }
    let submission = controller.submit().await?;
    info!(%submission, "diagnose request resolved");

    let session = controller.session();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&session.outcome())?)?;
    } else {
        writeln!(
            out,
            "{} reported: {}",
            session.identity().trim(),
            session.selected_symptoms().join(", ")
        )?;
        if let Some(view) = result_view(session) {
            writeln!(out, "{}", format_result(&view))?;
        }
    }
    if let Some(Err(err)) = session.outcome() {
        bail!("diagnosis request failed: {err}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
