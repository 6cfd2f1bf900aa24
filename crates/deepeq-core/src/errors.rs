use deepeq_core_types::ComparisonId;
use thiserror::Error;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Content mismatches are never errors: they are reported as comparison
/// differences. These kinds classify the conditions that stop a comparison
/// from running at all (bad configuration, unreadable members, values that
/// cannot be lowered into a graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    InvalidRegex,
    InvalidSettings,
    ConflictingOverrides,
    UnknownComparedField,

    // Introspection
    UnreadableMember,

    // Serde bridge
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidRegex => "ERR_INVALID_REGEX",
            ExErrorKind::InvalidSettings => "ERR_INVALID_SETTINGS",
            ExErrorKind::ConflictingOverrides => "ERR_CONFLICTING_OVERRIDES",
            ExErrorKind::UnknownComparedField => "ERR_UNKNOWN_COMPARED_FIELD",
            ExErrorKind::UnreadableMember => "ERR_UNREADABLE_MEMBER",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context describing where in the compared graphs the failure happened.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    type_name: Option<String>,
    comparison_id: Option<ComparisonId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            type_name: None,
            comparison_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add field path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add the runtime type name of the value being inspected
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Add comparison correlation context
    pub fn with_comparison_id(mut self, comparison_id: ComparisonId) -> Self {
        self.comparison_id = Some(comparison_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the field path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the type name context, if any
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Get the comparison ID context, if any
    pub fn comparison_id(&self) -> Option<&ComparisonId> {
        self.comparison_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, " (type: {})", type_name)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl serde::ser::Error for ExError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ExError::from(DeepEqError::Serialization {
            message: msg.to_string(),
        })
        .with_op("to_value")
    }
}

// ========== End Error Facility ==========

/// Typed errors raised while configuring or running a comparison
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeepEqError {
    /// A field regex could not be compiled
    #[error("Invalid field regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// Serialized settings could not be parsed
    #[error("Invalid comparison settings: {reason}")]
    InvalidSettings { reason: String },

    /// The same field was given both an ignore rule and a compare-only rule
    #[error("Field '{field}' is both ignored and explicitly compared")]
    IgnoredAndCompared { field: String },

    /// A compare-only field does not exist in the root actual value
    #[error("Compared field '{field}' does not exist in actual value of type {type_name} (unknown member '{member}')")]
    UnknownComparedField {
        field: String,
        member: String,
        type_name: String,
    },

    /// The introspection strategy listed a member it cannot read
    #[error("Cannot read member '{member}' of {type_name} at '{path}'")]
    UnreadableMember {
        member: String,
        type_name: String,
        path: String,
    },

    /// Serialization error while lowering a value
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from DeepEqError to ExError
impl From<DeepEqError> for ExError {
    fn from(err: DeepEqError) -> Self {
        match err {
            DeepEqError::InvalidRegex { pattern, reason } => ExError::new(ExErrorKind::InvalidRegex)
                .with_path(pattern)
                .with_message(format!("invalid regex: {}", reason)),

            DeepEqError::InvalidSettings { reason } => {
                ExError::new(ExErrorKind::InvalidSettings).with_message(reason)
            }

            DeepEqError::IgnoredAndCompared { field } => {
                ExError::new(ExErrorKind::ConflictingOverrides)
                    .with_path(field)
                    .with_message("field is both ignored and explicitly compared")
            }

            DeepEqError::UnknownComparedField {
                field,
                member,
                type_name,
            } => ExError::new(ExErrorKind::UnknownComparedField)
                .with_path(field)
                .with_type_name(type_name)
                .with_message(format!("unknown member '{}'", member)),

            DeepEqError::UnreadableMember {
                member,
                type_name,
                path,
            } => ExError::new(ExErrorKind::UnreadableMember)
                .with_path(path)
                .with_type_name(type_name)
                .with_message(format!("cannot read member '{}'", member)),

            DeepEqError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for DeepEqError {
    fn from(err: serde_json::Error) -> Self {
        DeepEqError::InvalidSettings {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_stable() {
        assert_eq!(ExErrorKind::InvalidRegex.code(), "ERR_INVALID_REGEX");
        assert_eq!(ExErrorKind::UnreadableMember.code(), "ERR_UNREADABLE_MEMBER");
        assert_eq!(
            ExErrorKind::UnknownComparedField.code(),
            "ERR_UNKNOWN_COMPARED_FIELD"
        );
        assert_eq!(
            ExErrorKind::ConflictingOverrides.code(),
            "ERR_CONFLICTING_OVERRIDES"
        );
    }

    #[test]
    fn test_unreadable_member_conversion_keeps_context() {
        let err: ExError = DeepEqError::UnreadableMember {
            member: "secret".to_string(),
            type_name: "Vault".to_string(),
            path: "bank.vault".to_string(),
        }
        .into();

        assert_eq!(err.kind(), ExErrorKind::UnreadableMember);
        assert_eq!(err.path(), Some("bank.vault"));
        assert_eq!(err.type_name(), Some("Vault"));
        assert!(err.message().contains("secret"));
    }

    #[test]
    fn test_display_includes_code_op_and_path() {
        let err = ExError::new(ExErrorKind::InvalidRegex)
            .with_op("build_configuration")
            .with_path("name(")
            .with_message("unclosed group");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_INVALID_REGEX]"));
        assert!(rendered.contains("build_configuration"));
        assert!(rendered.contains("(path: name()"));
    }

    #[test]
    fn test_serde_custom_error_is_serialization_kind() {
        let err = <ExError as serde::ser::Error>::custom("boom");
        assert_eq!(err.kind(), ExErrorKind::Serialization);
        assert_eq!(err.message(), "boom");
    }
}
