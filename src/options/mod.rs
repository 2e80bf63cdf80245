//! Bitmask option registries
//!
//! A directive carries four independent flag vocabularies: method attributes, invocation
//! options, measurement kinds, and sub-metric kinds. All of them share one decoder,
//! [`FlagSet`], parameterized over the concrete value enum. Each vocabulary is described
//! by a static table of [`FlagDef`] entries and turned into a registry the first time it
//! is used.
//!
//! A list such as `pub, STATIC, 0x10` decodes each comma-separated field independently:
//! first as a case-insensitive name or alias, then as an integer that must equal exactly
//! one value's mask. Option letters such as `-dr` decode one character at a time against
//! the single-letter aliases.

macro_rules! flag_def {
    ($value:expr, $mask:expr, $name:expr, [$($alias:expr),* $(,)?]) => {
        flag_def!($value, $mask, $name, [$($alias),*], true)
    };
    ($value:expr, $mask:expr, $name:expr, [$($alias:expr),* $(,)?], $methods:expr) => {
        FlagDef {
            value: $value,
            mask: $mask,
            name: $name,
            aliases: &[$($alias),*],
            applies_to_methods: $methods,
        }
    };
}

mod flag_set;
mod invocation_option;
mod measurement;
mod method_attribute;
mod sub_metric;

pub use flag_set::{FlagDef, FlagSet, FlagValue};
pub use invocation_option::InvocationOption;
pub use measurement::Measurement;
pub use method_attribute::{MethodAttribute, VISIBILITY_MASK, effective_modifiers, modifiers_match};
pub use sub_metric::SubMetric;
