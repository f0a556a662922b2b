// src/report/pipeline.rs

use crate::config::ReportSettings;
use crate::domain::{assemble, compute, FaasInputs};
use crate::errors::ServerError;
use crate::report::export::{export_with, ExportArtifact};
use crate::report::layout::DrawingSurface;
use crate::report::model::{build_report, Overrides, ReportModel};
use crate::report::xlsx::XlsxSurface;
use crate::templates::pages::report_table;
use chrono::Utc;
use maud::Markup;
use tracing::{debug, error};

/// Lifecycle of one report run.
///
/// `Failed` is only reachable from `Rendering`: assembling and computing
/// cannot fail because every numeric field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPhase {
    Idle,
    Assembling,
    Computing,
    Rendering,
    Done,
    Failed,
}

pub struct ReportPipeline<'a> {
    settings: &'a ReportSettings,
    phase: ReportPhase,
}

impl<'a> ReportPipeline<'a> {
    pub fn new(settings: &'a ReportSettings) -> Self {
        Self {
            settings,
            phase: ReportPhase::Idle,
        }
    }

    pub fn phase(&self) -> ReportPhase {
        self.phase
    }

    fn enter(&mut self, next: ReportPhase) {
        debug!(from = ?self.phase, to = ?next, "report phase");
        self.phase = next;
    }

    /// Assembles and values the inputs, then builds the report model.
    pub fn prepare(&mut self, inputs: &FaasInputs, overrides: Overrides) -> ReportModel {
        self.enter(ReportPhase::Assembling);
        let assembled = assemble(inputs);

        self.enter(ReportPhase::Computing);
        let valuation = compute(&assembled, self.settings.base_value_policy);
        debug!(
            storeys = valuation.storeys.len(),
            items = valuation.adjustments.len(),
            market_value = valuation.combined.market_value,
            "valuation computed"
        );

        build_report(inputs, &valuation, self.settings, overrides)
    }

    /// On-screen table bound to the model's overrides.
    pub fn render_editable(&mut self, model: &ReportModel) -> Markup {
        self.enter(ReportPhase::Rendering);
        let table = report_table(model);
        self.enter(ReportPhase::Done);
        table
    }

    /// Spreadsheet document. A failed render leaves the model untouched, so
    /// it can be rendered again without recomputing.
    pub fn render_document(&mut self, model: &ReportModel) -> Result<ExportArtifact, ServerError> {
        match XlsxSurface::new("Building FAAS") {
            Ok(surface) => self.render_document_with(model, surface),
            Err(e) => {
                self.enter(ReportPhase::Rendering);
                Err(self.fail(e))
            }
        }
    }

    pub fn render_document_with<S: DrawingSurface>(
        &mut self,
        model: &ReportModel,
        surface: S,
    ) -> Result<ExportArtifact, ServerError> {
        self.enter(ReportPhase::Rendering);
        match export_with(model, surface, &self.settings.page, Utc::now()) {
            Ok(artifact) => {
                self.enter(ReportPhase::Done);
                Ok(artifact)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: ServerError) -> ServerError {
        error!(phase = ?self.phase, "report rendering failed: {e}");
        self.enter(ReportPhase::Failed);
        e
    }
}
