use super::{Directive, NamePattern, SignaturePattern};
use crate::options::{FlagValue, InvocationOption, Measurement, MethodAttribute, SubMetric};
use core::fmt::{self, Display, Formatter};
use serde::Serialize;

/// One flag and whether the directive enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagState {
    pub name: &'static str,
    pub enabled: bool,
}

/// Read-only view of every decoded field of a directive, for administration surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveSnapshot {
    pub source: String,
    pub class: String,
    pub class_kind: &'static str,
    pub class_is_annotation: bool,
    pub inherit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
    pub method: String,
    pub method_kind: &'static str,
    pub method_is_annotation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub attributes: Vec<&'static str>,
    pub options: Vec<FlagState>,
    pub measurements: Vec<&'static str>,
    pub sub_metrics: Vec<&'static str>,
    pub template: String,
}

const fn pattern_kind(pattern: &NamePattern) -> &'static str {
    match pattern {
        NamePattern::Literal(_) => "literal",
        NamePattern::Any => "any",
        NamePattern::Regex { .. } => "regex",
    }
}

impl Directive {
    #[must_use]
    pub fn snapshot(&self) -> DirectiveSnapshot {
        let class = self.class();
        let method = self.method();

        let signature = match method.signature() {
            SignaturePattern::Any => None,
            SignaturePattern::Literal(literal) => Some(literal.clone()),
            SignaturePattern::Regex { source, .. } => Some(format!("({source})")),
        };

        DirectiveSnapshot {
            source: self.source().to_string(),
            class: class.pattern().to_string(),
            class_kind: pattern_kind(class.pattern()),
            class_is_annotation: class.is_annotation(),
            inherit: class.is_inherited(),
            loader: class.loader().map(ToString::to_string),
            method: method.pattern().to_string(),
            method_kind: pattern_kind(method.pattern()),
            method_is_annotation: method.is_annotation(),
            signature,
            attributes: MethodAttribute::registry().names(method.attributes()),
            options: InvocationOption::registry()
                .describe(self.invocation_options())
                .into_iter()
                .map(|(name, enabled)| FlagState { name, enabled })
                .collect(),
            measurements: Measurement::registry().names(self.measurements()),
            sub_metrics: SubMetric::registry().names(self.sub_metrics()),
            template: self.template().to_string(),
        }
    }
}

impl Display for DirectiveSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "directive: {}", self.source)?;

        write!(f, "class: {} ({}", self.class, self.class_kind)?;
        if self.class_is_annotation {
            f.write_str(", annotation")?;
        }
        if self.inherit {
            f.write_str(", inherited")?;
        }
        if let Some(loader) = &self.loader {
            write!(f, ", loader {loader}")?;
        }
        writeln!(f, ")")?;

        write!(f, "method: {}", self.method)?;
        if let Some(signature) = &self.signature {
            write!(f, "({signature})")?;
        }
        write!(f, " ({}", self.method_kind)?;
        if self.method_is_annotation {
            f.write_str(", annotation")?;
        }
        writeln!(f, ")")?;

        writeln!(f, "attributes: {}", self.attributes.join(","))?;

        let options: Vec<_> = self.options.iter().map(|o| format!("{}={}", o.name, o.enabled)).collect();
        writeln!(f, "effective options: {}", options.join(", "))?;

        writeln!(f, "measurements: {}", self.measurements.join(","))?;
        writeln!(f, "sub-metrics: {}", self.sub_metrics.join(","))?;
        write!(f, "template: '{}'", self.template)
    }
}

#[cfg(test)]
mod tests {
    use crate::directive::{ParseTolerance, parse_with};

    #[test]
    fn renders_effective_options() {
        let directive = parse_with(
            "[Foo.*] (pub,pro) [bar.*] -dr [ELAPSED][COUNT] 'm/${class}/${method}'",
            ParseTolerance::Strict,
        )
        .unwrap();

        insta::assert_snapshot!(directive.snapshot().to_string(), @"
        directive: [Foo.*] (pub,pro) [bar.*] -dr [ELAPSED][COUNT] 'm/${class}/${method}'
        class: [Foo.*] (regex)
        method: [bar.*] (regex)
        attributes: public,protected
        effective options: allowreentrant=false, disableontrigger=true, batchtransform=false, residenttransformer=true, startdisabled=false
        measurements: elapsed
        sub-metrics: count
        template: 'm/${class}/${method}'
        ");
    }

    #[test]
    fn renders_annotations_and_loader() {
        let directive = parse_with("@com.acme.Timed+<app> run(int) 'x'", ParseTolerance::Strict).unwrap();

        insta::assert_snapshot!(directive.snapshot().to_string(), @"
        directive: @com.acme.Timed+<app> run(int) 'x'
        class: com.acme.Timed (literal, annotation, inherited, loader app)
        method: run(int) (literal)
        attributes: public
        effective options: allowreentrant=false, disableontrigger=false, batchtransform=true, residenttransformer=false, startdisabled=false
        measurements: elapsed
        sub-metrics: min,max,avg,count
        template: 'x'
        ");
    }

    #[test]
    fn serializes_to_json() {
        let directive = parse_with("Foo * -s 'x'", ParseTolerance::Strict).unwrap();
        let json = serde_json::to_value(directive.snapshot()).unwrap();

        assert_eq!(json["class_kind"], "literal");
        assert_eq!(json["method_kind"], "any");
        assert!(json.get("loader").is_none());
        assert_eq!(json["options"][3]["name"], "residenttransformer");
        assert_eq!(json["options"][3]["enabled"], true);
    }
}
