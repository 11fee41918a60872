use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FieldSetError>;

/// Stable classification of every error this workspace reports.
///
/// `Display` renders the stable code, e.g. `ERR_SELECTOR_MISMATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    EmptySelector,
    SelectorMismatch,
    InvalidInput,
    Io,
    Serialization,
    Internal,
}

impl ExErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptySelector => "ERR_EMPTY_SELECTOR",
            Self::SelectorMismatch => "ERR_SELECTOR_MISMATCH",
            Self::InvalidInput => "ERR_INVALID_INPUT",
            Self::Io => "ERR_IO",
            Self::Serialization => "ERR_SERIALIZATION",
            Self::Internal => "ERR_INTERNAL",
        }
    }

    /// Raised before any comparison work starts.
    pub const fn is_configuration(self) -> bool {
        matches!(self, Self::EmptySelector | Self::SelectorMismatch)
    }
}

impl fmt::Display for ExErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified error with optional operation, message and field context.
///
/// Renders as `[CODE] in operation 'op': message (fields: a, b)`, omitting
/// the parts that are not set.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    message: String,
    fields: Vec<String>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            message: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_op(self, op: impl Into<String>) -> Self {
        Self {
            op: Some(op.into()),
            ..self
        }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self
        }
    }

    /// Field signature involved in the failure.
    pub fn with_fields(self, fields: Vec<String>) -> Self {
        Self { fields, ..self }
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&[String]> {
        (!self.fields.is_empty()).then_some(self.fields.as_slice())
    }

    pub fn is_configuration(&self) -> bool {
        self.kind.is_configuration()
    }
}

impl fmt::Display for ExError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        match (&self.op, self.message.is_empty()) {
            (Some(op), false) => write!(f, " in operation '{op}': {}", self.message)?,
            (Some(op), true) => write!(f, " in operation '{op}'")?,
            (None, false) => write!(f, ": {}", self.message)?,
            (None, true) => {}
        }
        if !self.fields.is_empty() {
            write!(f, " (fields: {})", self.fields.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

/// Errors raised by multiset construction and set-algebra operations.
///
/// Both variants are configuration errors: they are raised synchronously,
/// before any comparison work, and are never recovered internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldSetError {
    /// The field selector (or a nested sub-selector) names no fields
    #[error("At least one field must be specified: {context}")]
    EmptySelector { context: String },

    /// The operands of a binary operation compare different fields
    #[error("Can only {op} multisets with the same field comparisons: [{}] vs [{}]", left.join(", "), right.join(", "))]
    SelectorMismatch {
        op: String,
        left: Vec<String>,
        right: Vec<String>,
    },
}

impl FieldSetError {
    pub fn kind(&self) -> ExErrorKind {
        match self {
            FieldSetError::EmptySelector { .. } => ExErrorKind::EmptySelector,
            FieldSetError::SelectorMismatch { .. } => ExErrorKind::SelectorMismatch,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind().is_configuration()
    }
}

impl From<FieldSetError> for ExError {
    fn from(err: FieldSetError) -> Self {
        let message = err.to_string();
        match err {
            FieldSetError::EmptySelector { .. } => ExError::new(ExErrorKind::EmptySelector)
                .with_op("construct")
                .with_message(message),
            FieldSetError::SelectorMismatch { op, left, .. } => {
                ExError::new(ExErrorKind::SelectorMismatch)
                    .with_op(op)
                    .with_message(message)
                    .with_fields(left)
            }
        }
    }
}
