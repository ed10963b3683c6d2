//! JEXL Error Handling - Unified Encapsulated API
//!
//! Every failure mode of the engine, from grammar rejection through runtime
//! faults, is represented by the single [`JexlError`] type. Errors carry a
//! JSON-pointer into the program document where one applies, and implement
//! [`miette::Diagnostic`] for rich reporting.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// ERROR KINDS - The full failure taxonomy
// ============================================================================

/// All error types as a clean enum - no duplicate fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Grammar errors - the document is not a well-formed program
    #[error("document is not valid JSON: {message}")]
    MalformedDocument { message: String },
    #[error("expected {expected}, found {found}")]
    GrammarViolation { expected: String, found: String },
    #[error("unsupported version '{found}', this engine accepts '{supported}'")]
    UnsupportedVersion { found: String, supported: String },

    // Schema errors - declared type documents are not valid JSON Schema
    #[error("declared type '{type_name}' is not a well-formed JSON Schema document")]
    InvalidTypeSchema { type_name: String },

    // Expansion errors - macro rewriting failures
    #[error("macro '{name}' reached evaluation unexpanded")]
    MacroNotExpanded { name: String },
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimit { limit: usize },

    // Runtime errors - evaluation failures
    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },
    #[error("unbound function '{name}'")]
    UnboundFunction { name: String },
    #[error("unknown module '{module}'")]
    UnknownModule { module: String },
    #[error("module '{module}' does not export '{symbol}'")]
    UnknownExport { module: String, symbol: String },
    #[error("'{function}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported operation '{operation}'")]
    UnsupportedOperation { operation: String },
    #[error("'{operation}' expected {expected}, got {actual}")]
    TypeMismatch {
        operation: String,
        expected: String,
        actual: String,
    },
    #[error("division by zero")]
    DivisionByZero,
}

impl ErrorKind {
    /// Get the error category for test assertions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedDocument { .. }
            | Self::GrammarViolation { .. }
            | Self::UnsupportedVersion { .. } => ErrorCategory::Grammar,

            Self::InvalidTypeSchema { .. } => ErrorCategory::Schema,

            Self::MacroNotExpanded { .. } | Self::RecursionLimit { .. } => {
                ErrorCategory::Expansion
            }

            Self::UnboundVariable { .. }
            | Self::UnboundFunction { .. }
            | Self::UnknownModule { .. }
            | Self::UnknownExport { .. }
            | Self::ArityMismatch { .. }
            | Self::UnsupportedOperation { .. }
            | Self::TypeMismatch { .. }
            | Self::DivisionByZero => ErrorCategory::Eval,
        }
    }

    /// Get error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MalformedDocument { .. } => "malformed_document",
            Self::GrammarViolation { .. } => "grammar_violation",
            Self::UnsupportedVersion { .. } => "unsupported_version",
            Self::InvalidTypeSchema { .. } => "invalid_type_schema",
            Self::MacroNotExpanded { .. } => "macro_not_expanded",
            Self::RecursionLimit { .. } => "recursion_limit",
            Self::UnboundVariable { .. } => "unbound_variable",
            Self::UnboundFunction { .. } => "unbound_function",
            Self::UnknownModule { .. } => "unknown_module",
            Self::UnknownExport { .. } => "unknown_export",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::DivisionByZero => "division_by_zero",
        }
    }
}

/// Pipeline stage that raised the error, used for diagnostic codes and
/// category-level assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Grammar,
    Schema,
    Expansion,
    Eval,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::Schema => "schema",
            Self::Expansion => "expansion",
            Self::Eval => "eval",
        }
    }
}

// ============================================================================
// THE ERROR TYPE
// ============================================================================

/// The single error type - kind plus document location, no wrapper variants.
#[derive(Debug, Clone, PartialEq)]
pub struct JexlError {
    /// What went wrong (type-specific data).
    pub kind: ErrorKind,
    /// JSON-pointer into the program document, where one applies.
    pub pointer: Option<String>,
    /// How to help (optional, populated by constructors that know more).
    pub help: Option<String>,
}

impl JexlError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            pointer: None,
            help: None,
        }
    }

    /// Attach a JSON-pointer locating the error inside the program document.
    pub fn at(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    // Convenience constructors for the common runtime kinds.

    pub fn unbound_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundVariable { name: name.into() })
    }

    pub fn unbound_function(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundFunction { name: name.into() })
    }

    pub fn arity_mismatch(function: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            function: function.into(),
            expected,
            actual,
        })
    }

    pub fn type_mismatch(
        operation: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            operation: operation.into(),
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    pub fn unsupported_operation(operation: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedOperation {
            operation: operation.into(),
        })
    }
}

impl fmt::Display for JexlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " (at {})", pointer)?;
        }
        Ok(())
    }
}

impl std::error::Error for JexlError {}

impl Diagnostic for JexlError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!(
            "jexl::{}::{}",
            self.category().as_str(),
            self.kind.code_suffix()
        )))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a JexlError with full miette diagnostics.
///
/// Use this for user-facing error display in embedding hosts.
pub fn print_error(error: JexlError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
