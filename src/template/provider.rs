use super::evaluator::{CallContext, ExpressionEvaluator};
use super::extractor::ExpressionDescriptor;
use crate::error::EvaluationError;
use core::fmt::Write;
use std::sync::Arc;

#[derive(Debug)]
enum Program {
    Constant(String),
    Dynamic {
        /// Static text around the placeholders; always one longer than `expressions`.
        parts: Vec<String>,
        expressions: Vec<ExpressionDescriptor>,
        evaluator: Arc<dyn ExpressionEvaluator>,
    },
}

/// A compiled metric-name template bound to one member.
///
/// Templates without dynamic fragments compile to a constant; the rest keep a skeleton
/// whose placeholders are filled left to right from the call context.
#[derive(Debug)]
pub struct CompiledNameProvider {
    template: String,
    program: Program,
}

impl CompiledNameProvider {
    pub(super) fn constant(template: impl Into<String>, name: String) -> Self {
        Self {
            template: template.into(),
            program: Program::Constant(name),
        }
    }

    pub(super) fn dynamic(
        template: impl Into<String>,
        parts: Vec<String>,
        expressions: Vec<ExpressionDescriptor>,
        evaluator: Arc<dyn ExpressionEvaluator>,
    ) -> Self {
        debug_assert_eq!(parts.len(), expressions.len() + 1);
        Self {
            template: template.into(),
            program: Program::Dynamic {
                parts,
                expressions,
                evaluator,
            },
        }
    }

    /// The source template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self.program, Program::Constant(_))
    }

    /// The name, if it does not depend on the call.
    #[must_use]
    pub fn constant_name(&self) -> Option<&str> {
        match &self.program {
            Program::Constant(name) => Some(name),
            Program::Dynamic { .. } => None,
        }
    }

    /// The name with dynamic fragments shown as `{0}`, `{1}`, ...
    #[must_use]
    pub fn skeleton(&self) -> String {
        match &self.program {
            Program::Constant(name) => name.clone(),
            Program::Dynamic { parts, .. } => {
                let mut out = String::new();
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        let _ = write!(out, "{{{}}}", i - 1);
                    }
                    out.push_str(part);
                }
                out
            }
        }
    }

    #[must_use]
    pub fn expressions(&self) -> &[ExpressionDescriptor] {
        match &self.program {
            Program::Constant(_) => &[],
            Program::Dynamic { expressions, .. } => expressions,
        }
    }

    /// Render the metric name for one call.
    ///
    /// # Errors
    ///
    /// Returns an error if a dynamic fragment cannot be evaluated.
    pub fn name(&self, context: &CallContext) -> Result<String, EvaluationError> {
        let (parts, expressions, evaluator) = match &self.program {
            Program::Constant(name) => return Ok(name.clone()),
            Program::Dynamic {
                parts,
                expressions,
                evaluator,
            } => (parts, expressions, evaluator),
        };

        let mut out = String::new();
        let mut parts = parts.iter();
        if let Some(first) = parts.next() {
            out.push_str(first);
        }

        for (expression, part) in expressions.iter().zip(parts) {
            let value = evaluator.evaluate(expression, context)?;
            out.extend(value.chars().map(sanitize));
            out.push_str(part);
        }

        Ok(out)
    }
}

fn sanitize(c: char) -> char {
    if c.is_whitespace() || c.is_control() { '_' } else { c }
}
