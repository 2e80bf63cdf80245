use super::{FlagDef, FlagSet, FlagValue};
use std::sync::LazyLock;
use strum::EnumIter;

/// Member modifiers a directive can require.
///
/// Masks follow the JVM access-flag layout so they can be compared directly with the
/// modifier bits reported by a type universe. `Package` has no JVM bit: it stands for
/// "no visibility modifier" and is derived by [`effective_modifiers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum MethodAttribute {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Synchronized,
    Bridge,
    Varargs,
    Native,
    Abstract,
    Strict,
    Synthetic,
    Package,
    Volatile,
    Transient,
}

const PACKAGE_BIT: u32 = 0x0001_0000;

const DEFINITIONS: &[FlagDef<MethodAttribute>] = &[
    flag_def!(MethodAttribute::Public, 0x0001, "public", ["pub"]),
    flag_def!(MethodAttribute::Private, 0x0002, "private", ["pri"]),
    flag_def!(MethodAttribute::Protected, 0x0004, "protected", ["pro"]),
    flag_def!(MethodAttribute::Static, 0x0008, "static", ["sta"]),
    flag_def!(MethodAttribute::Final, 0x0010, "final", ["fin"]),
    flag_def!(MethodAttribute::Synchronized, 0x0020, "synchronized", ["syn"]),
    flag_def!(MethodAttribute::Bridge, 0x0040, "bridge", ["bri"]),
    flag_def!(MethodAttribute::Varargs, 0x0080, "varargs", ["var"]),
    flag_def!(MethodAttribute::Native, 0x0100, "native", ["nat"]),
    flag_def!(MethodAttribute::Abstract, 0x0400, "abstract", ["abs"]),
    flag_def!(MethodAttribute::Strict, 0x0800, "strict", ["str", "strictfp"]),
    flag_def!(MethodAttribute::Synthetic, 0x1000, "synthetic", ["syt"]),
    flag_def!(MethodAttribute::Package, PACKAGE_BIT, "package", ["pac", "default"]),
    flag_def!(MethodAttribute::Volatile, 0x0010_0000, "volatile", ["vol"], false),
    flag_def!(MethodAttribute::Transient, 0x0020_0000, "transient", ["tra"], false),
];

static REGISTRY: LazyLock<FlagSet<MethodAttribute>> = LazyLock::new(|| FlagSet::new(DEFINITIONS, 0x0001));

impl FlagValue for MethodAttribute {
    const REGISTRY: &'static str = "method attribute";

    fn registry() -> &'static FlagSet<Self> {
        &REGISTRY
    }
}

/// Bits that select a visibility level.
pub const VISIBILITY_MASK: u32 = 0x0001 | 0x0002 | 0x0004 | PACKAGE_BIT;

/// Adds the `package` bit to modifiers that carry no explicit visibility.
#[must_use]
pub const fn effective_modifiers(modifiers: u32) -> u32 {
    if modifiers & VISIBILITY_MASK == 0 {
        modifiers | PACKAGE_BIT
    } else {
        modifiers
    }
}

/// Tests a member's modifiers against a requested attribute mask.
///
/// Requested visibility bits are alternatives: the member needs at least one of them.
/// Every other requested bit must be present. Bits outside the request are ignored,
/// and an empty request matches everything.
#[must_use]
pub const fn modifiers_match(requested: u32, modifiers: u32) -> bool {
    let modifiers = effective_modifiers(modifiers);

    let visibility = requested & VISIBILITY_MASK;
    if visibility != 0 && modifiers & visibility == 0 {
        return false;
    }

    let required = requested & !VISIBILITY_MASK;
    modifiers & required == required
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC: u32 = 0x0001;
    const PRIVATE: u32 = 0x0002;
    const PROTECTED: u32 = 0x0004;
    const STATIC: u32 = 0x0008;
    const FINAL: u32 = 0x0010;
    const SYNCHRONIZED: u32 = 0x0020;

    #[test]
    fn default_is_public_only() {
        assert_eq!(MethodAttribute::registry().default_mask(), PUBLIC);
    }

    #[test]
    fn decode_names_and_aliases() {
        let mask = MethodAttribute::registry().decode_to_mask(false, "pub, STATIC,fin").unwrap();
        assert_eq!(mask, PUBLIC | STATIC | FINAL);
    }

    #[test]
    fn public_static_requires_both_bits() {
        let requested = PUBLIC | STATIC;
        assert!(modifiers_match(requested, PUBLIC | STATIC));
        assert!(modifiers_match(requested, PUBLIC | STATIC | FINAL | SYNCHRONIZED));
        assert!(!modifiers_match(requested, PUBLIC));
        assert!(!modifiers_match(requested, STATIC));
        assert!(!modifiers_match(requested, PRIVATE | STATIC));
    }

    #[test]
    fn visibility_bits_are_alternatives() {
        let requested = PUBLIC | PROTECTED;
        assert!(modifiers_match(requested, PUBLIC));
        assert!(modifiers_match(requested, PROTECTED | FINAL));
        assert!(!modifiers_match(requested, PRIVATE));
        assert!(!modifiers_match(requested, 0));
    }

    #[test]
    fn package_visibility_is_derived() {
        let package = MethodAttribute::Package.mask();
        assert!(modifiers_match(package, STATIC));
        assert!(!modifiers_match(package, PUBLIC | STATIC));
        assert_eq!(effective_modifiers(FINAL), FINAL | package);
        assert_eq!(effective_modifiers(PUBLIC | FINAL), PUBLIC | FINAL);
    }

    #[test]
    fn empty_request_matches_everything() {
        assert!(modifiers_match(0, PRIVATE | STATIC));
        assert!(modifiers_match(0, 0));
    }

    #[test]
    fn field_modifiers_do_not_apply_to_methods() {
        assert!(!MethodAttribute::Volatile.applies_to_methods());
        assert!(!MethodAttribute::Transient.applies_to_methods());
        assert!(MethodAttribute::Synchronized.applies_to_methods());
    }
}
