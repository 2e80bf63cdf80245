use super::{FlagDef, FlagSet, FlagValue};
use std::sync::LazyLock;
use strum::EnumIter;

/// Aggregates reported for each measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum SubMetric {
    Min,
    Max,
    Avg,
    Count,
    Total,
    Last,
}

const DEFINITIONS: &[FlagDef<SubMetric>] = &[
    flag_def!(SubMetric::Min, 0x01, "min", ["minimum"]),
    flag_def!(SubMetric::Max, 0x02, "max", ["maximum"]),
    flag_def!(SubMetric::Avg, 0x04, "avg", ["mean", "average"]),
    flag_def!(SubMetric::Count, 0x08, "count", ["cnt"]),
    flag_def!(SubMetric::Total, 0x10, "total", ["tot", "sum"]),
    flag_def!(SubMetric::Last, 0x20, "last", []),
];

static REGISTRY: LazyLock<FlagSet<SubMetric>> = LazyLock::new(|| FlagSet::new(DEFINITIONS, 0x01 | 0x02 | 0x04 | 0x08));

impl FlagValue for SubMetric {
    const REGISTRY: &'static str = "sub-metric";

    fn registry() -> &'static FlagSet<Self> {
        &REGISTRY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_min_max_avg_count() {
        let registry = SubMetric::registry();
        assert_eq!(
            registry.names(registry.default_mask()),
            vec!["min", "max", "avg", "count"]
        );
    }

    #[test]
    fn describe_lists_every_value() {
        let registry = SubMetric::registry();
        let described = registry.describe(0x10);
        assert_eq!(described.len(), 6);
        assert!(described.contains(&("total", true)));
        assert!(described.contains(&("min", false)));
    }
}
