//! Comparison of header declarations against descriptor grid items.
//!
//! Every declaration is joined to the grid items sharing its name (any
//! owner, zero or more matches). Both sides are normalized and compared;
//! differing values and values that cannot be converted are reported.
//! Names present on only one side are not reported.

use std::fmt;
use std::ops::AddAssign;

use crate::descriptor::{ConfigItem, ConfigItems};
use crate::header::MacroDefinition;
use crate::normalize::{clean_value, normalize_cleaned, NormalizeError, NormalizedValue};
use crate::substitution::{SubstitutionTable, SubstitutionValue};

/// Label printed at the start of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Printed as `Error:`.
    Error,
    /// Printed as `Warning:`.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        })
    }
}

/// Why a comparison failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    /// Both sides normalized, but to different values.
    Differs,
    /// One side looked numeric but could not be converted.
    Unconvertible(NormalizeError),
}

/// Which input a declaration came from. Controls the diagnostic wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPass {
    /// The generated configuration header tree. Every mismatch is printed
    /// with the `Error:` label and the source named `Header`.
    ConfigTree,
    /// A single named header; `label` names it in diagnostics. Differing
    /// values are printed as `Warning:`, conversion failures as `Error:`.
    SingleFile {
        /// Source name shown in diagnostics, usually the file name.
        label: String,
    },
}

impl ScanPass {
    /// Creates a single-file pass labelled `label`.
    #[must_use]
    pub fn single_file(label: impl Into<String>) -> Self {
        Self::SingleFile { label: label.into() }
    }

    fn source_label(&self) -> &str {
        match self {
            Self::ConfigTree => "Header",
            Self::SingleFile { label } => label,
        }
    }

    fn severity(&self, kind: &MismatchKind) -> Severity {
        match (self, kind) {
            (Self::SingleFile { .. }, MismatchKind::Differs) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One reported mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Printed label.
    pub severity: Severity,
    /// Failure cause.
    pub kind: MismatchKind,
    /// Macro / grid item name.
    pub name: String,
    /// Owner of the grid item.
    pub owner: String,
    /// Descriptor value after cleaning.
    pub descriptor_value: String,
    /// Header value after cleaning and substitution.
    pub header_value: String,
    /// Source name printed before the header value.
    pub source_label: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qualifier = match self.severity {
            Severity::Warning => " (numerical comparison)",
            Severity::Error => "",
        };
        write!(
            f,
            "{}: {} in {} does not match XML value{qualifier}. XML: {}, {}: {}",
            self.severity,
            self.name,
            self.owner,
            self.descriptor_value,
            self.source_label,
            self.header_value,
        )
    }
}

/// Run-scoped mismatch counters.
///
/// Conversion failures count as errors and differing values as warnings,
/// whatever label the diagnostic line carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Conversion failures.
    pub errors: usize,
    /// Normalized values that differ.
    pub warnings: usize,
}

impl Tally {
    /// Counts one mismatch.
    pub fn record(&mut self, mismatch: &Mismatch) {
        match mismatch.kind {
            MismatchKind::Differs => self.warnings += 1,
            MismatchKind::Unconvertible(_) => self.errors += 1,
        }
    }

    /// Returns `true` when nothing was counted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }

    /// Total number of mismatches.
    #[must_use]
    pub fn total(&self) -> usize {
        self.errors + self.warnings
    }

    /// Final status line for a run.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_clean() {
            "No errors or warnings found.".to_string()
        } else {
            format!("Total: {} error(s), {} warning(s).", self.errors, self.warnings)
        }
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// Mismatches from one pass plus their counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonReport {
    /// Mismatches in the order they were found.
    pub mismatches: Vec<Mismatch>,
    /// Counts over `mismatches`.
    pub tally: Tally,
}

impl ComparisonReport {
    /// Adds a mismatch and counts it.
    pub fn push(&mut self, mismatch: Mismatch) {
        self.tally.record(&mismatch);
        self.mismatches.push(mismatch);
    }
}

/// Compares declarations from one scan pass against descriptor grid items.
pub struct Comparator<'a> {
    substitutions: &'a SubstitutionTable,
    pass: ScanPass,
}

impl<'a> Comparator<'a> {
    /// Creates a comparator for `pass` using the given substitution table.
    #[must_use]
    pub fn new(substitutions: &'a SubstitutionTable, pass: ScanPass) -> Self {
        Self { substitutions, pass }
    }

    /// Lazily yields mismatches for each declaration in turn.
    pub fn mismatches<I>(
        &'a self,
        macros: I,
        items: &'a ConfigItems,
    ) -> impl Iterator<Item = Mismatch> + 'a
    where
        I: IntoIterator<Item = MacroDefinition>,
        I::IntoIter: 'a,
    {
        macros.into_iter().flat_map(move |def| self.check(&def, items))
    }

    /// Compares every declaration and collects the report.
    pub fn compare<I>(&self, macros: I, items: &ConfigItems) -> ComparisonReport
    where
        I: IntoIterator<Item = MacroDefinition>,
    {
        let mut report = ComparisonReport::default();
        for mismatch in self.mismatches(macros, items) {
            report.push(mismatch);
        }
        report
    }

    /// Compares one declaration against every grid item with the same name.
    #[must_use]
    pub fn check(&self, def: &MacroDefinition, items: &ConfigItems) -> Vec<Mismatch> {
        let cleaned = clean_value(&def.value);
        let substituted = self.substitutions.lookup(&cleaned);
        if let Some(value) = substituted {
            tracing::debug!(name = %def.name, from = %cleaned, to = %value, "substituted header value");
        }
        let header_value = substituted.map_or_else(|| cleaned.clone(), ToString::to_string);

        items
            .with_id(&def.name)
            .filter_map(|item| {
                let outcome = self.compare_values(item, substituted, &cleaned);
                let kind = outcome.err()?;
                Some(Mismatch {
                    severity: self.pass.severity(&kind),
                    kind,
                    name: def.name.clone(),
                    owner: item.owner_label().to_string(),
                    descriptor_value: clean_value(item.raw_value()),
                    header_value: header_value.clone(),
                    source_label: self.pass.source_label().to_string(),
                })
            })
            .collect()
    }

    fn compare_values(
        &self,
        item: &ConfigItem,
        substituted: Option<&SubstitutionValue>,
        cleaned: &str,
    ) -> Result<(), MismatchKind> {
        let descriptor = normalize_cleaned(&clean_value(item.raw_value()))
            .map_err(MismatchKind::Unconvertible)?;
        let header: NormalizedValue = match substituted {
            Some(value) => value.normalize(),
            None => normalize_cleaned(cleaned),
        }
        .map_err(MismatchKind::Unconvertible)?;

        if descriptor == header {
            Ok(())
        } else {
            Err(MismatchKind::Differs)
        }
    }
}
