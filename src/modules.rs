//! Module/version reconciliation.
//!
//! Checks the component list recorded in the descriptor against an expected
//! list of `(display, version)` pairs, in both directions: components that
//! match no expected pair, and expected modules whose display name does not
//! appear at all.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::ServiceContext;
use crate::descriptor::ObservedModule;
use crate::tables::{self, TableError};

/// Exit code for a full match.
pub const EXIT_OK: i32 = 0;

/// Exit code when any mismatch was found.
pub const EXIT_MISMATCH: i32 = -1;

/// A module the project is expected to contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedModule {
    /// Component display name, e.g. `r_bsp`.
    pub display: String,
    /// Exact version string, e.g. `7.20`.
    pub version: String,
}

impl ExpectedModule {
    /// Creates an expected entry.
    #[must_use]
    pub fn new(display: impl Into<String>, version: impl Into<String>) -> Self {
        Self { display: display.into(), version: version.into() }
    }

    fn matches(&self, observed: &ObservedModule) -> bool {
        observed.display.as_deref() == Some(self.display.as_str())
            && observed.version.as_deref() == Some(self.version.as_str())
    }
}

/// Loads the expected module list from a YAML or JSON file.
///
/// # Errors
///
/// Returns [`TableError`] if the file cannot be read or parsed.
pub fn load_expected(ctx: &ServiceContext, path: &Path) -> Result<Vec<ExpectedModule>, TableError> {
    let expected: Vec<ExpectedModule> = tables::load(ctx, path)?;
    tracing::debug!(path = %path.display(), modules = expected.len(), "loaded expected modules");
    Ok(expected)
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Observed components that matched an expected pair, once per match.
    pub found: Vec<ObservedModule>,
    /// Observed components with no exact expected pair.
    pub unmatched: Vec<ObservedModule>,
    /// Expected display names absent from the descriptor.
    pub missing: Vec<String>,
    /// Number of mismatches (`unmatched` plus `missing`).
    pub tally: usize,
}

impl ReconcileReport {
    /// Returns `true` when everything matched.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.tally == 0
    }

    /// Process exit code: [`EXIT_OK`] or [`EXIT_MISMATCH`].
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            EXIT_OK
        } else {
            EXIT_MISMATCH
        }
    }
}

/// Reconciles observed components against the expected list.
///
/// A component whose display matches but whose version differs counts as
/// fully unmatched. Missing entries are judged by display name alone, so a
/// version drift on its own counts once.
#[must_use]
pub fn reconcile(observed: &[ObservedModule], expected: &[ExpectedModule]) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for module in observed {
        let hits = expected.iter().filter(|e| e.matches(module)).count();
        if hits == 0 {
            report.unmatched.push(module.clone());
            report.tally += 1;
        } else {
            report.found.extend(std::iter::repeat(module.clone()).take(hits));
        }
    }

    let displays: HashSet<&str> = observed.iter().filter_map(|m| m.display.as_deref()).collect();
    for entry in expected {
        if !displays.contains(entry.display.as_str()) {
            report.missing.push(entry.display.clone());
            report.tally += 1;
        }
    }

    report
}

/// Renders the console report for `descriptor`.
#[must_use]
pub fn format_report(descriptor: &Path, report: &ReconcileReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!(">>> Checking following project of FIT modules: {}", descriptor.display()));
    for module in &report.found {
        lines.push(format!(
            "Found FIT modules: display='{}', version='{}'",
            field(module.display.as_ref()),
            field(module.version.as_ref()),
        ));
    }
    if !report.unmatched.is_empty() {
        lines.push("Not Match FIT modules:".to_string());
        for module in &report.unmatched {
            lines.push(field(module.display.as_ref()).to_string());
            lines.push(field(module.version.as_ref()).to_string());
        }
        lines.push("Please check the module and the version are correct.".to_string());
    }
    for display in &report.missing {
        lines.push(format!("Not match {display} in XML of SmartConfigurator."));
    }
    lines.push(if report.passed() { "OK module version" } else { "NG module version" }.to_string());
    lines.join("\n")
}

/// Absent attributes print as `None`, matching the configurator scripts' logs.
fn field(value: Option<&String>) -> &str {
    value.map_or("None", String::as_str)
}
