use super::grammar::{Field, Fields, normalize};
use super::{ClassSpec, Directive, MethodSpec, NamePattern, SignaturePattern};
use crate::error::DirectiveParseError;
use crate::options::{FlagSet, FlagValue, InvocationOption, Measurement, MethodAttribute, SubMetric};
use core::str::FromStr;
use core::sync::atomic::{AtomicBool, Ordering};
use regex::Regex;
use std::collections::BTreeSet;

const LOG_TARGET: &str = " directive";

const SHAPE: &str = "expected `[@]class[+][<loader>] [(attributes)] [@]method[(signature)][[attributes]] [-options] [[measurements]] [[sub-metrics]] 'template'`";

static TOLERANT_BY_DEFAULT: AtomicBool = AtomicBool::new(false);

/// How unknown names in flag lists are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseTolerance {
    /// Unknown names fail the parse.
    #[default]
    Strict,

    /// Unknown names are logged and skipped.
    Tolerant,
}

impl ParseTolerance {
    #[must_use]
    pub const fn is_tolerant(self) -> bool {
        matches!(self, Self::Tolerant)
    }
}

/// Set the process-wide tolerance used by [`parse`].
pub fn set_default_tolerance(tolerance: ParseTolerance) {
    TOLERANT_BY_DEFAULT.store(tolerance.is_tolerant(), Ordering::Relaxed);
}

/// The process-wide tolerance used by [`parse`].
#[must_use]
pub fn default_tolerance() -> ParseTolerance {
    if TOLERANT_BY_DEFAULT.load(Ordering::Relaxed) {
        ParseTolerance::Tolerant
    } else {
        ParseTolerance::Strict
    }
}

/// Parse a directive using the process-wide tolerance.
///
/// # Errors
///
/// Returns an error if the text does not match the directive grammar or any field fails validation.
pub fn parse(source: &str) -> Result<Directive, DirectiveParseError> {
    parse_with(source, default_tolerance())
}

/// Parse a directive with an explicit tolerance for unknown flag names.
///
/// # Errors
///
/// Returns an error if the text does not match the directive grammar or any field fails validation.
pub fn parse_with(source: &str, tolerance: ParseTolerance) -> Result<Directive, DirectiveParseError> {
    let fail = |message: String| DirectiveParseError::new(message, source);
    let tolerant = tolerance.is_tolerant();

    let normalized = normalize(source);
    let fields = Fields::capture(&normalized).ok_or_else(|| fail(SHAPE.to_string()))?;

    let class_annotation = fields.flag(Field::ClassAnnotation);
    let class_pattern = name_pattern("class", fields.get(Field::Class), class_annotation).map_err(&fail)?;

    let loader = match fields.get(Field::Loader).map(str::trim) {
        None => None,
        Some("") => return Err(fail("classloader expression must not be blank".to_string())),
        Some(loader) if loader.strip_prefix("type:").is_some_and(|name| name.trim().is_empty()) => {
            return Err(fail(format!("classloader expression '<{loader}>' names no type")));
        }
        Some(loader) => Some(loader.to_string()),
    };

    let method_annotation = fields.flag(Field::MethodAnnotation);
    let method_pattern = name_pattern("method", fields.get(Field::Method), method_annotation).map_err(&fail)?;
    let signature = signature_pattern(fields.get(Field::Signature)).map_err(&fail)?;

    let attributes = decode_lists::<MethodAttribute>(&[fields.get(Field::Attributes), fields.get(Field::MethodAttributes)], tolerant)
        .map_err(&fail)?;
    let invocation_options = decode_options(fields.get(Field::Options), tolerant).map_err(&fail)?;
    let measurements = decode_lists::<Measurement>(&[fields.get(Field::Measurements)], tolerant).map_err(&fail)?;
    let sub_metrics = decode_lists::<SubMetric>(&[fields.get(Field::SubMetrics)], tolerant).map_err(&fail)?;

    let template = fields.get(Field::Template).unwrap_or_default();
    if template.trim().is_empty() {
        return Err(fail("metric name template must not be blank".to_string()));
    }

    let directive = Directive {
        source: source.to_string(),
        class: ClassSpec {
            pattern: class_pattern,
            annotation: class_annotation,
            inherit: fields.flag(Field::Inherit),
            loader,
        },
        method: MethodSpec {
            pattern: method_pattern,
            annotation: method_annotation,
            signature,
            attributes,
        },
        invocation_options,
        measurements,
        sub_metrics,
        template: template.to_string(),
    };

    log::debug!(target: LOG_TARGET, "Parsed directive '{directive}'");
    Ok(directive)
}

impl FromStr for Directive {
    type Err = DirectiveParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse(source)
    }
}

fn name_pattern(kind: &str, raw: Option<&str>, annotation: bool) -> Result<NamePattern, String> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(format!("{kind} name must not be blank"));
    }

    if let Some(inner) = raw.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        if annotation {
            return Err(format!("{kind} '{raw}' cannot be both an annotation and a regex"));
        }

        let source = inner.trim();
        if source.is_empty() {
            return Err(format!("{kind} regex must not be blank"));
        }

        let regex = anchored(source).map_err(|e| format!("invalid {kind} regex '{source}': {e}"))?;
        return Ok(NamePattern::Regex {
            source: source.to_string(),
            regex,
        });
    }

    if raw == "*" {
        if annotation {
            return Err(format!("{kind} annotation must name a single annotation type, not '*'"));
        }
        return Ok(NamePattern::Any);
    }

    Ok(NamePattern::Literal(raw.to_string()))
}

fn signature_pattern(raw: Option<&str>) -> Result<SignaturePattern, String> {
    let Some(raw) = raw else {
        return Ok(SignaturePattern::Any);
    };

    if let Some(source) = raw.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        let regex = anchored(source).map_err(|e| format!("invalid signature regex '{source}': {e}"))?;
        return Ok(SignaturePattern::Regex {
            source: source.to_string(),
            regex,
        });
    }

    if raw.starts_with('(') || raw.ends_with(')') {
        return Err(format!("signature '{raw}' has unbalanced regex parentheses"));
    }

    Ok(SignaturePattern::Literal(raw.to_string()))
}

fn anchored(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{source})$"))
}

fn decode_options(letters: Option<&str>, tolerant: bool) -> Result<u32, String> {
    let registry = InvocationOption::registry();
    let Some(letters) = letters else {
        return Ok(registry.default_mask());
    };

    let values = registry.decode_letters(tolerant, letters).map_err(|e| e.to_string())?;
    let mut mask = FlagSet::<InvocationOption>::mask_of(&values);

    if mask & (InvocationOption::BatchTransform.mask() | InvocationOption::ResidentTransformer.mask()) == 0 {
        mask |= InvocationOption::ResidentTransformer.mask();
    }

    Ok(mask)
}

/// Decode one or more lists of the same registry into a single mask.
///
/// Absent or blank lists leave the registry default in place.
fn decode_lists<T: FlagValue>(lists: &[Option<&str>], tolerant: bool) -> Result<u32, String> {
    let registry = T::registry();
    let lists: Vec<&str> = lists.iter().flatten().map(|list| list.trim()).filter(|list| !list.is_empty()).collect();
    if lists.is_empty() {
        return Ok(registry.default_mask());
    }

    let mut values = BTreeSet::new();
    for list in &lists {
        for value in registry.decode(tolerant, list).map_err(|e| e.to_string())? {
            if value.applies_to_methods() {
                let _ = values.insert(value);
            } else if tolerant {
                log::warn!(target: LOG_TARGET, "Ignoring {} '{}' which does not apply to methods", T::REGISTRY, value.name());
            } else {
                return Err(format!("{} '{}' does not apply to methods", T::REGISTRY, value.name()));
            }
        }
    }

    if values.is_empty() {
        let joined = lists.join(",");
        if !tolerant {
            return Err(format!("no valid {} in '{joined}'", T::REGISTRY));
        }

        log::warn!(target: LOG_TARGET, "No valid {} in '{joined}', using the default", T::REGISTRY);
        return Ok(registry.default_mask());
    }

    Ok(FlagSet::<T>::mask_of(&values))
}
