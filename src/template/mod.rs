//! Metric-name templates
//!
//! A template is literal text interleaved with `$kind{key(range)[qualifier]}` tokens, for
//! example `m/${class}/$arg{0[id]}`. Compiling it against one member binds every token:
//! `class`, `method`, `package`, and `annotation` become static text, while `this`, `arg`,
//! `return`, and `expr` become [`ExpressionDescriptor`]s evaluated on each call.
//!
//! Compiled providers are cached per `(type, member, template)` triple and hold their type
//! weakly, so unloading a type releases its providers.

mod cache;
mod compiler;
mod evaluator;
mod extractor;
mod provider;
mod token;

pub use cache::{EvictionListener, NameProviderCache};
pub use compiler::TemplateCompiler;
pub use evaluator::{CallContext, DefaultEvaluator, ExpressionEvaluator};
pub use extractor::{ExpressionDescriptor, Extracted, extract};
pub use provider::CompiledNameProvider;
pub use token::{ExtractorKind, Segment, SegmentRange, Token, tokenize};
