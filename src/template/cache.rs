use super::provider::CompiledNameProvider;
use crate::universe::TypeInfo;
use core::fmt::Debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

const LOG_TARGET: &str = "     cache";

/// One (type, member, template) triple.
///
/// `compiling` is held for the duration of a compilation so that concurrent callers wait
/// for it instead of compiling again. A failed compilation leaves `provider` empty and the
/// slot in place, so the next caller retries on the same slot.
#[derive(Debug, Default)]
struct Slot {
    compiling: Mutex<()>,
    provider: OnceLock<Arc<CompiledNameProvider>>,
}

impl Slot {
    fn is_filled(&self) -> bool {
        self.provider.get().is_some()
    }
}

/// Notified when the providers of a type are dropped because the type went away.
pub trait EvictionListener: Send + Sync + Debug {
    fn evicted(&self, class: &str, providers: usize);
}

#[derive(Debug)]
struct ClassEntry {
    class: Weak<TypeInfo>,

    /// member key -> template -> slot
    members: HashMap<String, HashMap<String, Arc<Slot>>>,
}

impl ClassEntry {
    fn new(class: &Arc<TypeInfo>) -> Self {
        Self {
            class: Arc::downgrade(class),
            members: HashMap::new(),
        }
    }

    fn is_alive(&self) -> bool {
        self.class.strong_count() > 0
    }

    fn holds(&self, class: &Arc<TypeInfo>) -> bool {
        core::ptr::eq(self.class.as_ptr(), Arc::as_ptr(class))
    }

    fn providers(&self) -> usize {
        self.members.values().flat_map(HashMap::values).filter(|slot| slot.is_filled()).count()
    }
}

/// Compiled providers keyed by type, member, and template.
///
/// Types are held weakly: once the last strong reference to a [`TypeInfo`] is gone, its
/// providers are evicted on the next [`purge`](Self::purge) or insertion. Each triple has
/// its own slot, so at most one compilation per triple runs at a time and every
/// concurrent caller gets the same provider.
#[derive(Debug, Default)]
pub struct NameProviderCache {
    classes: Mutex<HashMap<String, ClassEntry>>,
    listener: Option<Arc<dyn EvictionListener>>,
}

impl NameProviderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_eviction_listener(mut self, listener: Arc<dyn EvictionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Return the cached provider for the triple, compiling it with `compute` on a miss.
    ///
    /// A failed compilation caches nothing, so the next call tries again.
    pub fn get_or_compile<E>(
        &self,
        class: &Arc<TypeInfo>,
        member: &str,
        template: &str,
        compute: impl FnOnce() -> Result<CompiledNameProvider, E>,
    ) -> Result<Arc<CompiledNameProvider>, E> {
        let identity = class.identity();
        let slot = self.slot(class, &identity, member, template);

        if let Some(provider) = slot.provider.get() {
            log::debug!(target: LOG_TARGET, "Cache hit for {identity}.{member} '{template}'");
            return Ok(Arc::clone(provider));
        }

        let _compiling = slot.compiling.lock();

        // Filled by the caller we waited for
        if let Some(provider) = slot.provider.get() {
            log::debug!(target: LOG_TARGET, "Cache hit for {identity}.{member} '{template}' after waiting");
            return Ok(Arc::clone(provider));
        }

        log::debug!(target: LOG_TARGET, "Cache miss for {identity}.{member} '{template}'");
        let provider = Arc::new(compute()?);
        Ok(Arc::clone(slot.provider.get_or_init(|| provider)))
    }

    /// Evict the providers of every type that is no longer alive, returning how many types went.
    pub fn purge(&self) -> usize {
        let evicted = {
            let mut classes = self.classes.lock();
            drain_dead(&mut classes)
        };

        let count = evicted.len();
        self.notify(evicted);
        count
    }

    /// Number of compiled providers currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.lock().values().map(ClassEntry::providers).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, class: &Arc<TypeInfo>, identity: &str, member: &str, template: &str) -> Arc<Slot> {
        let mut evicted = Vec::new();

        let slot = {
            let mut classes = self.classes.lock();

            // Same name and loader, but a different definition
            if let Some(stale) = classes.get(identity).filter(|entry| !entry.holds(class)) {
                evicted.push((identity.to_string(), stale.providers()));
                let _ = classes.remove(identity);
            }

            if !classes.contains_key(identity) {
                evicted.extend(drain_dead(&mut classes));
            }

            let entry = classes.entry(identity.to_string()).or_insert_with(|| ClassEntry::new(class));
            Arc::clone(
                entry
                    .members
                    .entry(member.to_string())
                    .or_default()
                    .entry(template.to_string())
                    .or_default(),
            )
        };

        self.notify(evicted);
        slot
    }

    fn notify(&self, evicted: Vec<(String, usize)>) {
        for (class, providers) in evicted {
            log::debug!(target: LOG_TARGET, "Evicted {providers} providers of {class}");
            if let Some(listener) = &self.listener {
                listener.evicted(&class, providers);
            }
        }
    }
}

fn drain_dead(classes: &mut HashMap<String, ClassEntry>) -> Vec<(String, usize)> {
    let mut evicted = Vec::new();
    classes.retain(|identity, entry| {
        if entry.is_alive() {
            true
        } else {
            evicted.push((identity.clone(), entry.providers()));
            false
        }
    });
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::TypeKind;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use core::time::Duration;
    use std::thread;

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<(String, usize)>>);

    impl EvictionListener for Recorder {
        fn evicted(&self, class: &str, providers: usize) {
            self.0.lock().push((class.to_string(), providers));
        }
    }

    fn class(name: &str) -> Arc<TypeInfo> {
        TypeInfo::new(name, TypeKind::Class).into_arc()
    }

    fn provider(name: &str) -> Result<CompiledNameProvider, String> {
        Ok(CompiledNameProvider::constant(name, name.to_string()))
    }

    #[test]
    fn second_lookup_hits() {
        let cache = NameProviderCache::new();
        let class = class("com.acme.Service");

        let first = cache.get_or_compile(&class, "run()", "a", || provider("a")).unwrap();
        let second = cache
            .get_or_compile(&class, "run()", "a", || -> Result<_, String> { panic!("compiled twice") })
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_cache_nothing() {
        let cache = NameProviderCache::new();
        let class = class("com.acme.Service");

        let err = cache.get_or_compile(&class, "run()", "a", || Err("boom".to_string())).unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty());

        let _ = cache.get_or_compile(&class, "run()", "a", || provider("a")).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn retry_after_failure_compiles_once() {
        let cache = NameProviderCache::new();
        let class = class("com.acme.Service");

        let _ = cache.get_or_compile(&class, "run()", "a", || Err("boom".to_string())).unwrap_err();

        let compiled = AtomicUsize::new(0);
        let providers: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache
                            .get_or_compile(&class, "run()", "a", || {
                                let _ = compiled.fetch_add(1, Ordering::SeqCst);
                                thread::sleep(Duration::from_millis(20));
                                provider("a")
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert_eq!(compiled.load(Ordering::SeqCst), 1);
        assert!(providers.iter().all(|p| Arc::ptr_eq(p, &providers[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn waiter_retries_after_failed_compile() {
        let cache = NameProviderCache::new();
        let class = class("com.acme.Service");
        let attempts = AtomicUsize::new(0);

        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        cache.get_or_compile(&class, "run()", "a", || {
                            thread::sleep(Duration::from_millis(20));
                            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                                Err("boom".to_string())
                            } else {
                                provider("a")
                            }
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        // One failure, one successful compile, and every other caller shares its result
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        let providers: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
        assert_eq!(providers.len(), 3);
        assert!(providers.iter().all(|p| Arc::ptr_eq(p, &providers[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn dead_types_are_evicted() {
        let recorder = Arc::new(Recorder::default());
        let cache = NameProviderCache::new().with_eviction_listener(Arc::clone(&recorder) as Arc<dyn EvictionListener>);

        let kept = class("com.acme.Kept");
        let dropped = class("com.acme.Dropped");
        let _ = cache.get_or_compile(&kept, "run()", "a", || provider("a")).unwrap();
        let _ = cache.get_or_compile(&dropped, "run()", "a", || provider("a")).unwrap();
        let _ = cache.get_or_compile(&dropped, "stop()", "b", || provider("b")).unwrap();
        drop(dropped);

        assert_eq!(cache.purge(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(*recorder.0.lock(), vec![("com.acme.Dropped".to_string(), 2)]);
    }

    #[test]
    fn redefined_type_replaces_old_entry() {
        let recorder = Arc::new(Recorder::default());
        let cache = NameProviderCache::new().with_eviction_listener(Arc::clone(&recorder) as Arc<dyn EvictionListener>);

        let old = class("com.acme.Service");
        let first = cache.get_or_compile(&old, "run()", "a", || provider("old")).unwrap();

        let new = class("com.acme.Service");
        let second = cache.get_or_compile(&new, "run()", "a", || provider("new")).unwrap();

        assert_eq!(first.constant_name(), Some("old"));
        assert_eq!(second.constant_name(), Some("new"));
        assert_eq!(*recorder.0.lock(), vec![("com.acme.Service".to_string(), 1)]);
    }
}
