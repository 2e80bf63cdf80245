use super::extractor::ExpressionDescriptor;
use super::token::ExtractorKind;
use crate::error::EvaluationError;
use core::fmt::Debug;
use serde_json::Value;

/// Live values of one call, as seen by dynamic name fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallContext {
    pub receiver: Option<Value>,
    pub arguments: Vec<Value>,
    pub return_value: Option<Value>,
    pub thrown: bool,
}

impl CallContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: Value) -> Self {
        self.receiver = Some(receiver);
        self
    }

    #[must_use]
    pub fn with_argument(mut self, argument: Value) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn with_return_value(mut self, value: Value) -> Self {
        self.return_value = Some(value);
        self
    }

    #[must_use]
    pub const fn with_thrown(mut self, thrown: bool) -> Self {
        self.thrown = thrown;
        self
    }
}

/// Renders a dynamic name fragment from a call context.
pub trait ExpressionEvaluator: Send + Sync + Debug {
    /// # Errors
    ///
    /// Returns an error when the expression cannot be rendered from this call.
    fn evaluate(&self, descriptor: &ExpressionDescriptor, context: &CallContext) -> Result<String, EvaluationError>;
}

/// Walks `.`-separated paths over JSON values.
///
/// Paths are rooted at `this`, `args.<n>`, or `return`. Strings render without quotes,
/// everything else as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEvaluator;

impl ExpressionEvaluator for DefaultEvaluator {
    fn evaluate(&self, descriptor: &ExpressionDescriptor, context: &CallContext) -> Result<String, EvaluationError> {
        let fail = |message: String| EvaluationError::new(&descriptor.expression, message);

        let mut path = descriptor.expression.split('.').map(str::trim);
        let root = match (descriptor.kind, path.next()) {
            (ExtractorKind::This | ExtractorKind::Expr, Some("this")) => {
                context.receiver.as_ref().ok_or_else(|| fail("the call has no receiver".to_string()))?
            }
            (ExtractorKind::Return | ExtractorKind::Expr, Some("return")) => {
                if context.thrown {
                    return Err(fail("the call threw instead of returning".to_string()));
                }
                context.return_value.as_ref().ok_or_else(|| fail("the call returned no value".to_string()))?
            }
            (ExtractorKind::Arg | ExtractorKind::Expr, Some("args")) => {
                let index = path.next().unwrap_or_default();
                let position: usize = index.parse().map_err(|e| fail(format!("invalid argument index '{index}': {e}")))?;
                context
                    .arguments
                    .get(position)
                    .ok_or_else(|| fail(format!("the call has {} arguments, not {}", context.arguments.len(), position.saturating_add(1))))?
            }
            (_, root) => return Err(fail(format!("unknown root '{}'", root.unwrap_or_default()))),
        };

        let mut value = root;
        for field in path {
            value = step(value, field).ok_or_else(|| fail(format!("no field '{field}'")))?;
        }

        Ok(render(value))
    }
}

fn step<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(field),
        Value::Array(items) => field.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
