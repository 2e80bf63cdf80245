use crate::error::DecodeError;
use core::fmt::Debug;
use core::hash::Hash;
use std::collections::{BTreeSet, HashMap};
use strum::IntoEnumIterator;

const LOG_TARGET: &str = "   options";

/// Static description of one flag value.
#[derive(Debug)]
pub struct FlagDef<T: 'static> {
    pub value: T,
    pub mask: u32,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub applies_to_methods: bool,
}

/// A value belonging to a closed, bitmask-encoded option vocabulary.
pub trait FlagValue: Copy + Eq + Ord + Hash + Debug + IntoEnumIterator + Send + Sync + 'static {
    /// Human-readable registry name, used in error messages.
    const REGISTRY: &'static str;

    /// The registry holding the definition of every value.
    fn registry() -> &'static FlagSet<Self>;

    fn mask(self) -> u32 {
        Self::registry().def(self).mask
    }

    fn name(self) -> &'static str {
        Self::registry().def(self).name
    }

    fn aliases(self) -> &'static [&'static str] {
        Self::registry().def(self).aliases
    }

    fn applies_to_methods(self) -> bool {
        Self::registry().def(self).applies_to_methods
    }
}

/// Decoder and encoder for one flag vocabulary.
///
/// Built once from a fixed definition table; every lookup afterwards is read-only.
#[derive(Debug)]
pub struct FlagSet<T: 'static> {
    defs: &'static [FlagDef<T>],
    by_name: HashMap<String, T>,
    by_mask: HashMap<u32, T>,
    default_mask: u32,
}

impl<T: FlagValue> FlagSet<T> {
    /// Build a registry from its definition table.
    ///
    /// # Panics
    ///
    /// Panics if a mask is not a power of two, two values share a mask, a name or alias is
    /// registered twice, or an enum variant has no definition. These are programming errors
    /// in the static tables and surface on first use of the registry.
    #[must_use]
    #[expect(clippy::panic, reason = "Malformed static tables are unrecoverable")]
    pub fn new(defs: &'static [FlagDef<T>], default_mask: u32) -> Self {
        let mut by_name = HashMap::new();
        let mut by_mask = HashMap::new();

        for def in defs {
            if !def.mask.is_power_of_two() {
                panic!("{} '{}' has mask {:#x} which is not a single bit", T::REGISTRY, def.name, def.mask);
            }

            if by_mask.insert(def.mask, def.value).is_some() {
                panic!("{} mask {:#x} is registered twice", T::REGISTRY, def.mask);
            }

            for key in core::iter::once(&def.name).chain(def.aliases) {
                if by_name.insert(key.to_ascii_lowercase(), def.value).is_some() {
                    panic!("{} name '{key}' is registered twice", T::REGISTRY);
                }
            }
        }

        for value in T::iter() {
            if !defs.iter().any(|def| def.value == value) {
                panic!("{} value {value:?} has no definition", T::REGISTRY);
            }
        }

        Self {
            defs,
            by_name,
            by_mask,
            default_mask,
        }
    }

    /// Returns the definition of a value.
    #[must_use]
    #[expect(clippy::missing_panics_doc, reason = "Construction guarantees every value is defined")]
    pub fn def(&self, value: T) -> &'static FlagDef<T> {
        let defs = self.defs;
        defs.iter()
            .find(|def| def.value == value)
            .expect("every enum value is checked for a definition at construction")
    }

    /// All definitions, in table order.
    #[must_use]
    pub const fn defs(&self) -> &'static [FlagDef<T>] {
        self.defs
    }

    #[must_use]
    pub const fn default_mask(&self) -> u32 {
        self.default_mask
    }

    /// Look up a single field by canonical name, alias, or exact integer mask.
    #[must_use]
    pub fn lookup(&self, field: &str) -> Option<T> {
        let field = field.trim();
        if let Some(value) = self.by_name.get(&field.to_ascii_lowercase()) {
            return Some(*value);
        }

        parse_mask(field).and_then(|mask| self.by_mask.get(&mask).copied())
    }

    /// Decode a comma-separated list of names, aliases, and integer masks.
    ///
    /// Unknown fields fail the whole decode unless `tolerant` is set, in which case they are skipped.
    pub fn decode(&self, tolerant: bool, expression: &str) -> Result<BTreeSet<T>, DecodeError> {
        let mut values = BTreeSet::new();

        for field in expression.split(',').map(str::trim).filter(|field| !field.is_empty()) {
            match self.lookup(field) {
                Some(value) => {
                    let _ = values.insert(value);
                }
                None if tolerant => {
                    log::warn!(target: LOG_TARGET, "Ignoring unknown {} '{field}' in '{expression}'", T::REGISTRY);
                }
                None => return Err(DecodeError::new(T::REGISTRY, field, expression)),
            }
        }

        Ok(values)
    }

    /// Decode a list and fold it into a single mask, where `0` means "no flags".
    pub fn decode_to_mask(&self, tolerant: bool, expression: &str) -> Result<u32, DecodeError> {
        Ok(Self::mask_of(&self.decode(tolerant, expression)?))
    }

    /// Decode single-character option letters such as `dr` (from `-dr`).
    ///
    /// Each character is tested independently against the alias set of every value.
    pub fn decode_letters(&self, tolerant: bool, letters: &str) -> Result<BTreeSet<T>, DecodeError> {
        let mut values = BTreeSet::new();

        for letter in letters.chars() {
            let mut matched = false;
            for def in self.defs {
                if has_letter_alias(def, letter) {
                    let _ = values.insert(def.value);
                    matched = true;
                }
            }

            if !matched {
                if tolerant {
                    log::warn!(target: LOG_TARGET, "Ignoring unknown {} letter '{letter}' in '-{letters}'", T::REGISTRY);
                } else {
                    return Err(DecodeError::new(T::REGISTRY, letter.to_string(), format!("-{letters}")));
                }
            }
        }

        Ok(values)
    }

    /// Whether any character of `letters` is a single-letter alias of `value`.
    #[must_use]
    pub fn letter_enabled(&self, letters: &str, value: T) -> bool {
        let def = self.def(value);
        letters.chars().any(|letter| has_letter_alias(def, letter))
    }

    /// OR together the masks of a set of values.
    #[must_use]
    pub fn mask_of<'a>(values: impl IntoIterator<Item = &'a T>) -> u32 {
        values.into_iter().fold(0, |mask, value| mask | value.mask())
    }

    #[must_use]
    pub fn is_enabled(mask: u32, value: T) -> bool {
        mask & value.mask() != 0
    }

    /// The values whose bits are set in `mask`, in table order.
    #[must_use]
    pub fn enabled(&self, mask: u32) -> Vec<T> {
        self.defs.iter().filter(|def| mask & def.mask != 0).map(|def| def.value).collect()
    }

    /// Canonical names of the values set in `mask`.
    #[must_use]
    pub fn names(&self, mask: u32) -> Vec<&'static str> {
        self.defs.iter().filter(|def| mask & def.mask != 0).map(|def| def.name).collect()
    }

    /// Single-letter aliases of the values set in `mask`, e.g. `dr`.
    ///
    /// Values without a one-letter alias are left out.
    #[must_use]
    pub fn letters(&self, mask: u32) -> String {
        self.defs
            .iter()
            .filter(|def| mask & def.mask != 0)
            .filter_map(|def| def.aliases.iter().find(|alias| alias.chars().count() == 1))
            .copied()
            .collect()
    }

    /// `name=bool` pairs for every value, used by diagnostics.
    #[must_use]
    pub fn describe(&self, mask: u32) -> Vec<(&'static str, bool)> {
        self.defs.iter().map(|def| (def.name, mask & def.mask != 0)).collect()
    }
}

fn has_letter_alias<T>(def: &FlagDef<T>, letter: char) -> bool {
    def.aliases.iter().any(|alias| {
        let mut chars = alias.chars();
        chars.next().is_some_and(|c| c.eq_ignore_ascii_case(&letter)) && chars.next().is_none()
    })
}

fn parse_mask(field: &str) -> Option<u32> {
    if let Some(hex) = field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        field.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{InvocationOption, Measurement, MethodAttribute, SubMetric};

    /// Every name and alias, in any case and with any padding, decodes to exactly its own bit.
    fn assert_every_spelling_decodes<T: FlagValue>() {
        let registry = T::registry();

        for value in T::iter() {
            let def = registry.def(value);
            for spelling in core::iter::once(def.name).chain(def.aliases.iter().copied()) {
                for text in [spelling.to_string(), spelling.to_ascii_uppercase(), format!(" {spelling} ")] {
                    let mask = registry.decode_to_mask(false, &text).unwrap();
                    assert_eq!(mask, value.mask(), "{} '{text}'", T::REGISTRY);
                    assert!(FlagSet::<T>::is_enabled(mask, value), "{} '{text}'", T::REGISTRY);
                    assert_eq!(registry.enabled(mask), vec![value]);
                }
            }

            assert_eq!(registry.lookup(&value.mask().to_string()), Some(value));
            assert_eq!(registry.lookup(&format!("{:#x}", value.mask())), Some(value));
        }
    }

    /// A list decodes to the union of its fields, whatever mix of names and integers it uses.
    fn assert_lists_fold_to_the_union<T: FlagValue>() {
        let registry = T::registry();
        let values: Vec<T> = T::iter().collect();

        for (i, &first) in values.iter().enumerate() {
            for (j, &second) in values.iter().enumerate() {
                let first_text = if i % 2 == 0 { first.name().to_string() } else { format!("{:#x}", first.mask()) };
                let second_text = if j % 2 == 0 { second.mask().to_string() } else { second.name().to_string() };

                let mask = registry.decode_to_mask(false, &format!("{first_text},{second_text}")).unwrap();
                assert_eq!(mask, first.mask() | second.mask(), "{} '{first_text},{second_text}'", T::REGISTRY);

                for value in &values {
                    let expected = *value == first || *value == second;
                    assert_eq!(FlagSet::<T>::is_enabled(mask, *value), expected);
                }
            }
        }

        let everything: Vec<_> = values.iter().map(|value| value.name()).collect();
        let mask = registry.decode_to_mask(false, &everything.join(",")).unwrap();
        assert_eq!(registry.names(mask), registry.defs().iter().map(|def| def.name).collect::<Vec<_>>());
        assert_eq!(registry.decode_to_mask(false, "").unwrap(), 0);
    }

    /// Every single-letter alias decodes from option letters and is reported back.
    fn assert_letters_round_trip<T: FlagValue>() {
        let registry = T::registry();

        for value in T::iter() {
            for letter in value.aliases().iter().filter(|alias| alias.chars().count() == 1) {
                let decoded = registry.decode_letters(false, letter).unwrap();
                assert!(decoded.contains(&value), "{} -{letter}", T::REGISTRY);
                assert!(registry.letter_enabled(letter, value));
                assert!(registry.letters(value.mask()).contains(letter));
            }
        }
    }

    fn assert_registry_laws<T: FlagValue>() {
        assert_every_spelling_decodes::<T>();
        assert_lists_fold_to_the_union::<T>();
        assert_letters_round_trip::<T>();
    }

    #[test]
    fn method_attribute_registry_laws() {
        assert_registry_laws::<MethodAttribute>();
    }

    #[test]
    fn invocation_option_registry_laws() {
        assert_registry_laws::<InvocationOption>();
    }

    #[test]
    fn measurement_registry_laws() {
        assert_registry_laws::<Measurement>();
    }

    #[test]
    fn sub_metric_registry_laws() {
        assert_registry_laws::<SubMetric>();
    }

    #[test]
    fn parse_mask_accepts_decimal_and_hex() {
        assert_eq!(parse_mask("16"), Some(16));
        assert_eq!(parse_mask("0x10"), Some(16));
        assert_eq!(parse_mask("0X1f"), Some(31));
        assert_eq!(parse_mask("sixteen"), None);
        assert_eq!(parse_mask("-1"), None);
    }
}
