use std::fs::File;
use std::io::Write;
use std::path::Path;

use iec_core::serde::to_json_string;
use iec_core::{ErrorInfo, IecError, SupportType};
use serde::{Deserialize, Serialize};

use crate::state::EquilibriumState;
use crate::summary::{summarize, StateSummary};
use crate::validation::ValidationReport;

fn export_error(err: impl ToString) -> IecError {
    IecError::Serde(ErrorInfo::new("iec_solver.export", err.to_string()))
}

/// One CSV row of the tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub s: f64,
    pub theta: f64,
    pub kappa: f64,
    pub kappa_target: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub active_moment: f64,
    pub information: f64,
}

pub fn table_rows(state: &EquilibriumState) -> Vec<TableRow> {
    (0..state.len())
        .map(|i| TableRow {
            s: state.s()[i],
            theta: state.theta()[i],
            kappa: state.kappa()[i],
            kappa_target: state.kappa_target()[i],
            stiffness: state.stiffness()[i],
            damping: state.damping()[i],
            active_moment: state.active_moment()[i],
            information: state.information()[i],
        })
        .collect()
}

/// Writes the tabular export with a header row.
pub fn write_csv<W: Write>(state: &EquilibriumState, writer: W) -> Result<(), IecError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in table_rows(state) {
        wtr.serialize(row).map_err(export_error)?;
    }
    wtr.flush().map_err(export_error)
}

pub fn write_csv_path(state: &EquilibriumState, path: &Path) -> Result<(), IecError> {
    let file = File::create(path).map_err(|err| {
        IecError::Serde(
            ErrorInfo::new("iec_solver.export", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    write_csv(state, file)
}

/// Metadata record accompanying the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMetadata {
    pub solver: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub params_hash: String,
    pub support: SupportType,
    pub nodes: usize,
    pub summary: StateSummary,
    pub validation: ValidationReport,
}

pub fn metadata(state: &EquilibriumState) -> Result<StateMetadata, IecError> {
    let provenance = state.provenance();
    Ok(StateMetadata {
        solver: provenance.solver.clone(),
        created_at: provenance.created_at.clone(),
        revision: provenance.revision.clone(),
        params_hash: provenance.params_hash.clone(),
        support: state.support(),
        nodes: state.len(),
        summary: summarize(state)?,
        validation: state.validation().clone(),
    })
}

pub fn metadata_json(state: &EquilibriumState) -> Result<String, IecError> {
    to_json_string(&metadata(state)?)
}
