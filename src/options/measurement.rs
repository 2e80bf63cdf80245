use super::{FlagDef, FlagSet, FlagValue};
use std::sync::LazyLock;
use strum::EnumIter;

/// What is measured around each invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Measurement {
    Elapsed,
    Cpu,
    UserCpu,
    WaitCount,
    WaitTime,
    BlockCount,
    BlockTime,
    Count,
    Concurrent,
    Errors,
    Returns,
}

const DEFINITIONS: &[FlagDef<Measurement>] = &[
    flag_def!(Measurement::Elapsed, 0x0001, "elapsed", ["e", "time"]),
    flag_def!(Measurement::Cpu, 0x0002, "cpu", ["c"]),
    flag_def!(Measurement::UserCpu, 0x0004, "usercpu", ["u"]),
    flag_def!(Measurement::WaitCount, 0x0008, "waitcount", ["wc"]),
    flag_def!(Measurement::WaitTime, 0x0010, "waittime", ["wt"]),
    flag_def!(Measurement::BlockCount, 0x0020, "blockcount", ["bc"]),
    flag_def!(Measurement::BlockTime, 0x0040, "blocktime", ["bt"]),
    flag_def!(Measurement::Count, 0x0080, "count", ["n", "invocations"]),
    flag_def!(Measurement::Concurrent, 0x0100, "concurrent", ["cc"]),
    flag_def!(Measurement::Errors, 0x0200, "errors", ["x", "exceptions"]),
    flag_def!(Measurement::Returns, 0x0400, "returns", ["ret"]),
];

static REGISTRY: LazyLock<FlagSet<Measurement>> = LazyLock::new(|| FlagSet::new(DEFINITIONS, 0x0001));

impl FlagValue for Measurement {
    const REGISTRY: &'static str = "measurement";

    fn registry() -> &'static FlagSet<Self> {
        &REGISTRY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_case_insensitive() {
        let registry = Measurement::registry();
        let mask = registry.decode_to_mask(false, "ELAPSED,Cpu,count").unwrap();
        assert_eq!(mask, 0x0001 | 0x0002 | 0x0080);
    }

    #[test]
    fn integer_field_must_be_an_exact_mask() {
        let registry = Measurement::registry();
        assert_eq!(registry.decode_to_mask(false, "128").unwrap(), 0x0080);

        // 3 is elapsed|cpu, which is not the mask of any single measurement
        let err = registry.decode(false, "3").unwrap_err();
        assert_eq!(err.field(), "3");
    }
}
