//! Line-oriented terminal front end for the intake flow.

use std::{fmt::Write as _, io::Write};

use anyhow::{Context, Result};
use intake_core::{
    render::{
        result_view, selection_view, ResultView, SelectionView, LOADING_SYMPTOMS, NAME_REQUIRED,
        SUBMISSION_FAILED,
    },
    CatalogState, DiagnosisService, IntakeController, IntakeError,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, Lines},
    task::JoinHandle,
};

const SYMPTOM_QUESTION: &str = "Are you experiencing any of the following symptoms?";
const HELP: &str = "Enter symptom numbers or names to toggle them (e.g. `3 7` or `itching`).\n\
Commands: `list` show symptoms, `submit` request a diagnosis, `help`, `quit`.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Toggle(Vec<String>),
    List,
    Submit,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => ReplInput::Empty,
        "list" | "l" => ReplInput::List,
        "submit" | "s" => ReplInput::Submit,
        "help" | "h" | "?" => ReplInput::Help,
        "quit" | "q" | "exit" => ReplInput::Quit,
        _ => ReplInput::Toggle(
            trimmed
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}

/// Resolves a 1-based entry number or an exact symptom name.
pub fn resolve_symptom(token: &str, state: &CatalogState) -> Option<String> {
    let catalog = state.catalog()?;
    if let Ok(number) = token.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|idx| catalog.names().get(idx))
            .cloned();
    }
    catalog
        .iter()
        .find(|name| *name == token)
        .map(str::to_string)
}

pub fn format_selection(view: &SelectionView, columns: usize) -> String {
    let entries = match view {
        SelectionView::Loading => return LOADING_SYMPTOMS.to_string(),
        SelectionView::Failed(reason) => {
            return format!("Could not load symptoms: {reason}");
        }
        SelectionView::Symptoms(entries) => entries,
    };

    let cells: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mark = if entry.checked { 'x' } else { ' ' };
            format!("[{mark}] {:>3}. {}", idx + 1, entry.name)
        })
        .collect();
    let width = cells.iter().map(|cell| cell.chars().count()).max().unwrap_or(0);

    let mut out = String::from(SYMPTOM_QUESTION);
    for row in cells.chunks(columns.max(1)) {
        out.push('\n');
        let line = row
            .iter()
            .map(|cell| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
    }
    out
}

pub fn format_result(view: &ResultView) -> String {
    match view {
        ResultView::Pending => "Waiting for diagnosis...".to_string(),
        ResultView::Failure(reason) => format!("{SUBMISSION_FAILED}\n  ({reason})"),
        ResultView::Diagnosis {
            disease,
            description,
            precautions,
        } => {
            let mut out = format!("{disease}\n{description}\nPrecautions:");
            for precaution in precautions {
                let _ = write!(out, "\n  - {precaution}");
            }
            out
        }
    }
}

pub struct IntakeRepl<S: ?Sized, R, W> {
    controller: IntakeController<S>,
    input: Lines<R>,
    out: W,
    columns: usize,
}

impl<S, R, W> IntakeRepl<S, R, W>
where
    S: DiagnosisService + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(controller: IntakeController<S>, input: R, out: W, columns: usize) -> Self {
        Self {
            controller,
            input: input.lines(),
            out,
            columns,
        }
    }

    pub fn controller(&self) -> &IntakeController<S> {
        &self.controller
    }

    /// Runs until `quit` or end of input. `catalog` is the load started at
    /// launch; it is awaited once the user has identified themselves.
    pub async fn run(&mut self, catalog: JoinHandle<CatalogState>) -> Result<()> {
        writeln!(self.out, "Healthcare ChatBot")?;
        if !self.identify().await? {
            catalog.abort();
            return Ok(());
        }

        if !catalog.is_finished() {
            writeln!(self.out, "{LOADING_SYMPTOMS}")?;
        }
        let state = catalog.await.context("symptom catalog task failed")?;
        self.controller.apply_catalog(state);
        self.print_selection()?;
        writeln!(self.out, "{HELP}")?;

        loop {
            self.prompt("> ")?;
            let Some(line) = self.input.next_line().await? else {
                break;
            };
            match parse_input(&line) {
                ReplInput::Empty => {}
                ReplInput::Help => writeln!(self.out, "{HELP}")?,
                ReplInput::List => self.print_selection()?,
                ReplInput::Toggle(tokens) => self.toggle(&tokens)?,
                ReplInput::Submit => self.submit().await?,
                ReplInput::Quit => break,
            }
        }
        Ok(())
    }

    async fn identify(&mut self) -> Result<bool> {
        loop {
            self.prompt("What is your name? ")?;
            let Some(line) = self.input.next_line().await? else {
                return Ok(false);
            };
            self.controller.set_identity(line)?;
            match self.controller.advance() {
                Ok(_) => {
                    let name = self.controller.session().identity().trim().to_string();
                    writeln!(self.out, "Hello, {name}!")?;
                    return Ok(true);
                }
                Err(IntakeError::IdentityRequired) => writeln!(self.out, "{NAME_REQUIRED}")?,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn toggle(&mut self, tokens: &[String]) -> Result<()> {
        if self.controller.session().catalog().catalog().is_none() {
            writeln!(self.out, "{}", IntakeError::CatalogUnavailable)?;
            return Ok(());
        }
        for token in tokens {
            let Some(name) = resolve_symptom(token, self.controller.session().catalog()) else {
                writeln!(self.out, "Unknown symptom: {token}")?;
                continue;
            };
            match self.controller.toggle_symptom(&name) {
                Ok(true) => writeln!(self.out, "+ {name}")?,
                Ok(false) => writeln!(self.out, "- {name}")?,
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<()> {
        writeln!(self.out, "{}", format_result(&ResultView::Pending))?;
        self.out.flush()?;
        if let Err(err) = self.controller.submit().await {
            writeln!(self.out, "{err}")?;
            return Ok(());
        }
        if let Some(view) = result_view(self.controller.session()) {
            writeln!(self.out, "{}", format_result(&view))?;
        }
        Ok(())
    }

    fn print_selection(&mut self) -> Result<()> {
        let view = selection_view(self.controller.session());
        writeln!(self.out, "{}", format_selection(&view, self.columns))?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
