use super::scan::resolve_targets;
use super::{ResolvedTargets, ScanPool};
use crate::directive::Directive;
use crate::error::TargetResolutionError;
use crate::universe::TypeUniverse;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

const LOG_TARGET: &str = "  resolver";

/// Default number of type-universe scans allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT_SCANS: usize = 4;

/// Resolves directives to concrete targets, caching one result per directive.
///
/// Scans run on a bounded [`ScanPool`] rather than the calling task. Two directives that
/// render to the same canonical text share a cache entry, and concurrent resolutions of
/// one directive wait for a single scan.
#[derive(Debug)]
pub struct Resolver {
    universe: Arc<dyn TypeUniverse>,
    context_loader: Option<String>,
    pool: Arc<ScanPool>,
    cache: DashMap<String, Arc<OnceCell<Arc<ResolvedTargets>>>>,
}

impl Resolver {
    #[must_use]
    pub fn new(universe: Arc<dyn TypeUniverse>) -> Self {
        Self {
            universe,
            context_loader: None,
            pool: ScanPool::new(DEFAULT_MAX_CONCURRENT_SCANS),
            cache: DashMap::new(),
        }
    }

    /// Include the chain of this loader in every scan, in addition to any directive hint.
    #[must_use]
    pub fn with_context_loader(mut self, loader: Option<String>) -> Self {
        self.context_loader = loader;
        self
    }

    #[must_use]
    pub fn with_max_concurrent_scans(mut self, max_concurrent: usize) -> Self {
        self.pool = ScanPool::new(max_concurrent);
        self
    }

    #[must_use]
    pub fn universe(&self) -> &Arc<dyn TypeUniverse> {
        &self.universe
    }

    /// Resolve a directive, reusing an earlier result for the same directive.
    ///
    /// # Errors
    ///
    /// Returns an error if the directive names a missing type, annotation, or loader, or if
    /// the scan does not complete.
    pub async fn resolve(&self, directive: &Arc<Directive>) -> Result<Arc<ResolvedTargets>, TargetResolutionError> {
        let key = directive.to_string();
        let cell = Arc::clone(self.cache.entry(key).or_insert_with(|| Arc::new(OnceCell::new())).value());

        if let Some(cached) = cell.get() {
            log::debug!(target: LOG_TARGET, "Cache hit for '{directive}'");
            return Ok(Arc::clone(cached));
        }

        // A failed scan leaves the cell empty, and the next waiter scans again
        let resolved = cell.get_or_try_init(|| self.scan(directive)).await?;
        Ok(Arc::clone(resolved))
    }

    async fn scan(&self, directive: &Arc<Directive>) -> Result<Arc<ResolvedTargets>, TargetResolutionError> {
        log::debug!(target: LOG_TARGET, "Cache miss for '{directive}'");

        let universe = Arc::clone(&self.universe);
        let context_loader = self.context_loader.clone();
        let scanned = Arc::clone(directive);
        let resolved = self
            .pool
            .run(move || resolve_targets(universe.as_ref(), context_loader.as_deref(), &scanned))
            .await
            .map_err(|e| TargetResolutionError::new(format!("type scan did not complete: {e}"), directive.source()))??;

        log::info!(
            target: LOG_TARGET,
            "Resolved '{}' to {} members across {} types",
            directive.source(),
            resolved.len(),
            resolved.classes().len()
        );

        Ok(Arc::new(resolved))
    }

    /// Drop every cached resolution, e.g. after the universe changed.
    pub fn invalidate(&self) {
        let dropped = self.cached();
        self.cache.clear();
        log::debug!(target: LOG_TARGET, "Invalidated {dropped} cached resolutions");
    }

    /// Number of directives with a completed resolution.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.iter().filter(|entry| entry.value().initialized()).count()
    }
}
