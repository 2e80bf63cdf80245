//! The universe of types a directive is resolved against
//!
//! The weaving subsystem owns the real view of loaded and loadable types. This module
//! defines the narrow query facility the resolver needs from it ([`TypeUniverse`]) and the
//! descriptors it hands back ([`TypeInfo`], [`MemberInfo`], [`AnnotationInfo`]).
//!
//! [`StaticUniverse`] is an in-memory implementation fed from a JSON or TOML description,
//! used by the command-line tool and by tests.

mod static_universe;
mod type_info;

pub use static_universe::StaticUniverse;
pub use type_info::{AnnotationInfo, CONSTRUCTOR_NAME, LoaderInfo, MemberInfo, MemberKind, TypeInfo, TypeKind, simple_name};

use core::fmt::Debug;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Query facility over every loaded or loadable type.
pub trait TypeUniverse: Send + Sync + Debug {
    /// Find a type by fully-qualified name.
    ///
    /// With a loader, only types visible from that loader's delegation chain qualify.
    /// Without one, any type of that name qualifies.
    fn find_type(&self, name: &str, loader: Option<&str>) -> Option<Arc<TypeInfo>>;

    /// Visit every type, in a stable order.
    fn for_each_type(&self, visit: &mut dyn FnMut(&Arc<TypeInfo>));

    /// Whether a loader of that name exists.
    fn has_loader(&self, loader: &str) -> bool;

    /// Parent of a loader in the delegation chain; `None` means the bootstrap loader.
    fn loader_parent(&self, loader: &str) -> Option<String>;
}

/// Names of `loader` and all of its ancestors, nearest first.
///
/// Cycles in a malformed loader graph are cut at the first repeated name.
pub fn loader_chain(universe: &dyn TypeUniverse, loader: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut seen = BTreeSet::new();
    let mut current = Some(loader.to_string());

    while let Some(name) = current {
        if !seen.insert(name.clone()) {
            break;
        }
        current = universe.loader_parent(&name);
        chain.push(name);
    }

    chain
}
