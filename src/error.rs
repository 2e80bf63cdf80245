//! Error types raised while decoding, parsing, resolving, and compiling directives.
//!
//! Every error carries the literal input that caused it so an operator can fix the
//! directive without digging through a backtrace.

use core::time::Duration;
use thiserror::Error;

/// A flag list contained a field that does not name any value of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{field}' is not a valid {registry} in '{expression}'")]
pub struct DecodeError {
    registry: &'static str,
    field: String,
    expression: String,
}

impl DecodeError {
    #[must_use]
    pub fn new(registry: &'static str, field: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            registry,
            field: field.into(),
            expression: expression.into(),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &'static str {
        self.registry
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// A directive did not match the grammar or failed field validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} in directive '{directive}'")]
pub struct DirectiveParseError {
    message: String,
    directive: String,
}

impl DirectiveParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, directive: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            directive: directive.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The full directive text as submitted.
    #[must_use]
    pub fn directive(&self) -> &str {
        &self.directive
    }
}

/// A directive named a type, annotation, or loader that the universe cannot provide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} while resolving '{directive}'")]
pub struct TargetResolutionError {
    message: String,
    directive: String,
}

impl TargetResolutionError {
    #[must_use]
    pub fn new(message: impl Into<String>, directive: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            directive: directive.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn directive(&self) -> &str {
        &self.directive
    }
}

/// A metric-name template could not be compiled for a specific member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} in template '{template}' for {type_name}.{member}")]
pub struct TemplateCompileError {
    message: String,
    template: String,
    type_name: String,
    member: String,
}

impl TemplateCompileError {
    #[must_use]
    pub fn new(message: impl Into<String>, template: impl Into<String>, type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            template: template.into(),
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }
}

/// A dynamic name fragment could not be rendered from the live call context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not evaluate '{expression}': {message}")]
pub struct EvaluationError {
    expression: String,
    message: String,
}

impl EvaluationError {
    #[must_use]
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Union of every failure the directive pipeline can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Parse(#[from] DirectiveParseError),

    #[error(transparent)]
    Resolution(#[from] TargetResolutionError),

    #[error(transparent)]
    Compile(#[from] TemplateCompileError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// The operation did not finish within the caller's deadline and may be retried.
    #[error("{operation} did not complete within {limit:?}")]
    Timeout { operation: String, limit: Duration },
}

impl Error {
    /// Whether repeating the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_field_and_expression() {
        let err = DecodeError::new("method attribute", "bogus", "pub,bogus");
        assert_eq!(err.to_string(), "'bogus' is not a valid method attribute in 'pub,bogus'");
        assert_eq!(err.field(), "bogus");
        assert_eq!(err.expression(), "pub,bogus");
    }

    #[test]
    fn template_error_carries_identity() {
        let err = TemplateCompileError::new("unknown token kind 'foo'", "a/$foo{}", "com.acme.Service", "run()");
        assert_eq!(
            err.to_string(),
            "unknown token kind 'foo' in template 'a/$foo{}' for com.acme.Service.run()"
        );
    }

    #[test]
    fn only_timeouts_are_retryable() {
        let timeout = Error::Timeout {
            operation: "compile".to_string(),
            limit: Duration::from_millis(5),
        };
        assert!(timeout.is_retryable());

        let parse: Error = DirectiveParseError::new("bad", "x").into();
        assert!(!parse.is_retryable());
    }
}
