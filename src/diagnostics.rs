//! Diagnostic reporting with source locations
//!
//! This module provides rich unit-error messages with source locations using
//! miette. Diagnostics never abort analysis: checkers report here and return a
//! recovery type, so one bad expression never halts the run.

use crate::common::Span;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Unit-checking diagnostic
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum UnitDiagnostic {
    #[error("Cannot add values with different units: `{left}` and `{right}`")]
    #[diagnostic(
        code(unit::incompatible_add),
        help("insert an explicit conversion factor, e.g. a value annotated `{right}/{left}`")
    )]
    IncompatibleAdd {
        left: String,
        right: String,
        #[label("incompatible units")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Cannot compare values with different units: `{left}` and `{right}`")]
    #[diagnostic(code(unit::incompatible_compare))]
    IncompatibleCompare {
        left: String,
        right: String,
        #[label("incompatible units")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Note,
}

/// Reporter that collects diagnostics for one analyzed file
pub struct Reporter {
    source: SourceFile,
    errors: Vec<UnitDiagnostic>,
    notes: Vec<UnitDiagnostic>,
}

impl Reporter {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            errors: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn report(&mut self, severity: Severity, diagnostic: UnitDiagnostic) {
        match severity {
            Severity::Error => self.error(diagnostic),
            Severity::Note => self.note(diagnostic),
        }
    }

    pub fn error(&mut self, diagnostic: UnitDiagnostic) {
        self.errors.push(diagnostic);
    }

    pub fn note(&mut self, diagnostic: UnitDiagnostic) {
        self.notes.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Create NamedSource for this file
    pub fn named_source(&self) -> NamedSource<String> {
        self.source.to_named_source()
    }

    /// Get the source file
    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// Print all diagnostics
    pub fn emit_all(&self) {
        for note in &self.notes {
            eprintln!("{:?}", miette::Report::new(note.clone()));
        }
        for error in &self.errors {
            eprintln!("{:?}", miette::Report::new(error.clone()));
        }
    }

    /// Consume and return errors
    pub fn into_errors(self) -> Vec<UnitDiagnostic> {
        self.errors
    }

    /// Get errors by reference
    pub fn errors(&self) -> &[UnitDiagnostic] {
        &self.errors
    }

    /// Get notes by reference
    pub fn notes(&self) -> &[UnitDiagnostic] {
        &self.notes
    }
}
