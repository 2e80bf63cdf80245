//! Target resolution
//!
//! Turns a parsed [`Directive`](crate::directive::Directive) into the concrete set of
//! `(type, member)` pairs it selects from a [`TypeUniverse`](crate::universe::TypeUniverse).
//!
//! A literal type without inheritance (or a final one) resolves to itself. Everything else
//! is a scan over the types visible from the directive's loader hint and the configured
//! context loader: annotation mode collects annotated types, inheritance adds transitive
//! subtypes and implementors, and a class regex collects every matching name. Members are
//! then filtered by name, modifier mask, and rendered signature.

mod matcher;
mod resolver;
mod scan;
mod scan_pool;
mod targets;

pub use matcher::member_matches;
pub use resolver::{DEFAULT_MAX_CONCURRENT_SCANS, Resolver};
pub use scan::resolve_targets;
pub use scan_pool::ScanPool;
pub use targets::{ResolvedClass, ResolvedTarget, ResolvedTargets};
