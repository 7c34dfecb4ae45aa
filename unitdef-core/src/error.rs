//! Structured errors for definition loading and conversion
//!
//! Errors are values: a definition is either fully built or the caller
//! receives one of these, carrying enough context to point at the
//! offending line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for the arithmetic/unit expression language
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("Empty expression")]
    Empty,

    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("Expression longer than {0} tokens")]
    TooLong(usize),

    #[error("Invalid number format: {0}")]
    InvalidNumber(String),

    #[error("Unit reference not allowed in numeric expression: {0}")]
    UnitReference(String),

    #[error("Exponent must be dimensionless, got: {0}")]
    NonNumericExponent(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Overflow: result too large")]
    Overflow,
}

impl ExprError {
    /// True for failures in the shape of the expression, as opposed to
    /// failures while computing its value.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            ExprError::Empty
                | ExprError::UnexpectedChar(..)
                | ExprError::UnexpectedToken(_)
                | ExprError::UnexpectedEnd
                | ExprError::TooDeep(_)
                | ExprError::TooLong(_)
                | ExprError::NonNumericExponent(_)
                | ExprError::InvalidOperation(_)
        )
    }
}

/// Error taxonomy for definitions and conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The line does not match `name = value [= symbol [= alias]*]`,
    /// or a modifier clause is malformed
    Syntax,
    /// A numeric literal or modifier value failed to evaluate
    Value,
    /// A reference composition mixes dimensions and units
    Consistency,
    /// A conversion received a value outside its domain
    Domain,
}

impl ErrorKind {
    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SYNTAX_ERROR",
            ErrorKind::Value => "VALUE_ERROR",
            ErrorKind::Consistency => "CONSISTENCY_ERROR",
            ErrorKind::Domain => "DOMAIN_ERROR",
        }
    }
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Definition line being parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error raised while building definitions or converting values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitError {
    pub kind: ErrorKind,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

impl UnitError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            context: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: attach the definition line. An existing line is kept.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        if ctx.line.is_none() {
            ctx.line = Some(line.into());
        }
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn line(&self) -> Option<&str> {
        self.context.as_ref().and_then(|c| c.line.as_deref())
    }

    // ========== Common Error Constructors ==========

    pub fn syntax(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, format!("Syntax error: {}", details.into()))
            .with_suggestion("Use the form: name = value [= symbol [= alias]...]")
    }

    pub fn value(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, format!("Value error: {}", details.into()))
    }

    pub fn consistency(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Consistency, format!("Consistency error: {}", details.into()))
    }

    pub fn domain(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, format!("Domain error: {}", details.into()))
    }
}

impl std::fmt::Display for UnitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(line) = self.line() {
            write!(f, " in definition '{}'", line)?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for UnitError {}

impl From<ExprError> for UnitError {
    fn from(err: ExprError) -> Self {
        if err.is_syntax() {
            Self::new(ErrorKind::Syntax, format!("Syntax error: {}", err))
        } else {
            Self::value(err.to_string())
        }
    }
}
