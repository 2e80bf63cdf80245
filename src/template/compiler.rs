use super::cache::{EvictionListener, NameProviderCache};
use super::evaluator::{DefaultEvaluator, ExpressionEvaluator};
use super::extractor::{Extracted, extract};
use super::provider::CompiledNameProvider;
use super::token::{Segment, tokenize};
use crate::error::{Error, TemplateCompileError};
use crate::resolve::ResolvedTarget;
use crate::universe::{MemberInfo, TypeInfo};
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::Arc;

const LOG_TARGET: &str = "  template";

/// Compiles metric-name templates into per-member [`CompiledNameProvider`]s.
#[derive(Debug)]
pub struct TemplateCompiler {
    cache: NameProviderCache,
    evaluator: Arc<dyn ExpressionEvaluator>,
    compilations: AtomicUsize,
}

impl Default for TemplateCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self::with_evaluator(Arc::new(DefaultEvaluator))
    }

    /// Use a different evaluator for the dynamic fragments of every provider compiled from now on.
    #[must_use]
    pub fn with_evaluator(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self {
            cache: NameProviderCache::new(),
            evaluator,
            compilations: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_eviction_listener(mut self, listener: Arc<dyn EvictionListener>) -> Self {
        self.cache = self.cache.with_eviction_listener(listener);
        self
    }

    /// Compile `template` for one member of `class`, reusing an earlier compilation of the same triple.
    pub fn compile(&self, class: &Arc<TypeInfo>, member: &MemberInfo, template: &str) -> Result<Arc<CompiledNameProvider>, TemplateCompileError> {
        self.cache
            .get_or_compile(class, &member.key(), template, || self.build(class, member, template))
    }

    /// Compile the template of the directive that selected this target.
    pub fn compile_target(&self, target: &ResolvedTarget) -> Result<Arc<CompiledNameProvider>, TemplateCompileError> {
        self.compile(target.class(), target.member(), target.directive().template())
    }

    /// Like [`compile_target`](Self::compile_target), on the blocking pool and bounded by `limit`.
    ///
    /// An elapsed limit yields a retryable [`Error::Timeout`]; the compilation itself keeps
    /// running and its result stays cached for the next caller.
    pub async fn compile_with_timeout(self: &Arc<Self>, target: ResolvedTarget, limit: Duration) -> Result<Arc<CompiledNameProvider>, Error> {
        let compiler = Arc::clone(self);
        let template = target.directive().template().to_string();
        let type_name = target.class().name.clone();
        let member = target.member().key();
        let identity = format!("{}.{member}", target.class().identity());
        let task = tokio::task::spawn_blocking(move || compiler.compile_target(&target));

        match tokio::time::timeout(limit, task).await {
            Ok(Ok(compiled)) => compiled.map_err(Error::from),
            Ok(Err(e)) => Err(TemplateCompileError::new(format!("compilation did not complete: {e}"), template, type_name, member).into()),
            Err(_elapsed) => {
                log::warn!(target: LOG_TARGET, "Compiling {identity} did not finish within {limit:?}");
                Err(Error::Timeout {
                    operation: format!("compiling {identity}"),
                    limit,
                })
            }
        }
    }

    /// Number of templates actually compiled, not counting cache hits.
    #[must_use]
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Evict providers of types that are no longer alive.
    pub fn purge(&self) -> usize {
        self.cache.purge()
    }

    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn build(&self, class: &TypeInfo, member: &MemberInfo, template: &str) -> Result<CompiledNameProvider, TemplateCompileError> {
        let _ = self.compilations.fetch_add(1, Ordering::Relaxed);
        let fail = |message: String| TemplateCompileError::new(message, template, &class.name, member.key());

        let mut parts = Vec::new();
        let mut expressions = Vec::new();
        let mut current = String::new();

        for segment in tokenize(template).map_err(fail)? {
            match segment {
                Segment::Literal(text) => current.push_str(&text),
                Segment::Token(token) => match extract(&token, class, member).map_err(fail)? {
                    Extracted::Static(text) => current.push_str(&text),
                    Extracted::Dynamic(descriptor) => {
                        parts.push(core::mem::take(&mut current));
                        expressions.push(descriptor);
                    }
                },
            }
        }

        log::debug!(
            target: LOG_TARGET,
            "Compiled '{template}' for {}.{} with {} dynamic fragments",
            class.name,
            member.key(),
            expressions.len()
        );

        if expressions.is_empty() {
            return Ok(CompiledNameProvider::constant(template, current));
        }

        parts.push(current);
        Ok(CompiledNameProvider::dynamic(template, parts, expressions, Arc::clone(&self.evaluator)))
    }
}
