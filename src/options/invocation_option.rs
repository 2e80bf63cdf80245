use super::{FlagDef, FlagSet, FlagValue};
use std::sync::LazyLock;
use strum::EnumIter;

/// Controls how instrumentation behaves once installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum InvocationOption {
    /// Keep measuring when the instrumented method re-enters itself.
    AllowReentrant,

    /// Turn the instrumentation off after the first error.
    DisableOnTrigger,

    /// Apply the directive once, to the types present when it is submitted.
    BatchTransform,

    /// Keep the directive installed so types loaded later are also instrumented.
    ResidentTransformer,

    /// Install the instrumentation in a disabled state.
    StartDisabled,
}

const DEFINITIONS: &[FlagDef<InvocationOption>] = &[
    flag_def!(InvocationOption::AllowReentrant, 0x01, "allowreentrant", ["a", "reentrant"]),
    flag_def!(InvocationOption::DisableOnTrigger, 0x02, "disableontrigger", ["d"]),
    flag_def!(InvocationOption::BatchTransform, 0x04, "batchtransform", ["b", "batch"]),
    flag_def!(InvocationOption::ResidentTransformer, 0x08, "residenttransformer", ["r", "resident"]),
    flag_def!(InvocationOption::StartDisabled, 0x10, "startdisabled", ["s", "disabled"]),
];

static REGISTRY: LazyLock<FlagSet<InvocationOption>> = LazyLock::new(|| FlagSet::new(DEFINITIONS, 0x04));

impl FlagValue for InvocationOption {
    const REGISTRY: &'static str = "invocation option";

    fn registry() -> &'static FlagSet<Self> {
        &REGISTRY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_batch_transform() {
        let registry = InvocationOption::registry();
        assert_eq!(registry.enabled(registry.default_mask()), vec![InvocationOption::BatchTransform]);
    }

    #[test]
    fn letters_decode_independently() {
        let values = InvocationOption::registry().decode_letters(false, "dr").unwrap();
        assert_eq!(
            values.into_iter().collect::<Vec<_>>(),
            vec![InvocationOption::DisableOnTrigger, InvocationOption::ResidentTransformer]
        );
    }

    #[test]
    fn letters_are_case_insensitive() {
        let values = InvocationOption::registry().decode_letters(false, "A").unwrap();
        assert!(values.contains(&InvocationOption::AllowReentrant));
    }

    #[test]
    fn unknown_letter_fails_unless_tolerant() {
        let registry = InvocationOption::registry();
        let err = registry.decode_letters(false, "dz").unwrap_err();
        assert_eq!(err.field(), "z");
        assert_eq!(err.expression(), "-dz");

        let values = registry.decode_letters(true, "dz").unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn letter_predicate() {
        let registry = InvocationOption::registry();
        assert!(registry.letter_enabled("dr", InvocationOption::ResidentTransformer));
        assert!(registry.letter_enabled("dr", InvocationOption::DisableOnTrigger));
        assert!(!registry.letter_enabled("dr", InvocationOption::BatchTransform));
    }

    #[test]
    fn letters_render_in_table_order() {
        let registry = InvocationOption::registry();
        assert_eq!(registry.letters(0x08 | 0x02), "dr");
        assert_eq!(registry.letters(0), "");
    }

    #[test]
    fn multi_character_aliases_are_not_letters() {
        // "batch" must not make 'b', 'a', 't', 'c', or 'h' match anything extra
        let registry = InvocationOption::registry();
        assert!(!registry.letter_enabled("t", InvocationOption::BatchTransform));
    }
}
