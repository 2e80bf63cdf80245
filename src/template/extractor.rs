use super::token::{ExtractorKind, SegmentRange, Token};
use crate::universe::{MemberInfo, TypeInfo, simple_name};
use serde::Serialize;

const DEFAULT_ANNOTATION_ATTRIBUTE: &str = "value";

/// A dynamic fragment of a metric name, evaluated on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionDescriptor {
    pub kind: ExtractorKind,

    /// Normalized path into the call context, e.g. `this.id` or `args.1`.
    pub expression: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_index: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl ExpressionDescriptor {
    fn new(kind: ExtractorKind, root: String, arg_index: Option<usize>, qualifier: Option<String>) -> Self {
        let expression = match &qualifier {
            Some(qualifier) => format!("{root}.{qualifier}"),
            None => root,
        };

        Self {
            kind,
            expression,
            arg_index,
            qualifier,
        }
    }
}

/// The result of binding a token to a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Known at compile time and folded into the name skeleton.
    Static(String),

    /// Known only per call.
    Dynamic(ExpressionDescriptor),
}

/// Bind a token to the member it will name.
pub fn extract(token: &Token, class: &TypeInfo, member: &MemberInfo) -> Result<Extracted, String> {
    match token.kind {
        ExtractorKind::Class => {
            plain(token)?;
            Ok(Extracted::Static(class.simple_name().to_string()))
        }

        ExtractorKind::Method => {
            plain(token)?;
            Ok(Extracted::Static(member.name.clone()))
        }

        ExtractorKind::Package => {
            no_key(token)?;
            no_qualifier(token)?;
            package(class.package_name(), token.range).map(Extracted::Static)
        }

        ExtractorKind::Annotation => {
            no_range(token)?;
            annotation(token, class, member).map(Extracted::Static)
        }

        ExtractorKind::This => {
            no_key(token)?;
            no_range(token)?;
            if member.is_static() {
                return Err(format!("'{}' is not available in static member {}", token.text, member.key()));
            }
            Ok(Extracted::Dynamic(ExpressionDescriptor::new(
                ExtractorKind::This,
                "this".to_string(),
                None,
                token.qualifier.clone(),
            )))
        }

        ExtractorKind::Arg => {
            no_range(token)?;
            let index = argument_index(token, member)?;
            Ok(Extracted::Dynamic(ExpressionDescriptor::new(
                ExtractorKind::Arg,
                format!("args.{index}"),
                Some(index),
                token.qualifier.clone(),
            )))
        }

        ExtractorKind::Return => {
            no_key(token)?;
            no_range(token)?;
            if !member.returns_value() {
                return Err(format!("'{}' is not available because {} returns no value", token.text, member.key()));
            }
            Ok(Extracted::Dynamic(ExpressionDescriptor::new(
                ExtractorKind::Return,
                "return".to_string(),
                None,
                token.qualifier.clone(),
            )))
        }

        ExtractorKind::Expr => {
            no_range(token)?;
            no_qualifier(token)?;
            if token.key.is_empty() {
                return Err(format!("'{}' needs an expression", token.text));
            }
            expression_root(token, member)?;
            Ok(Extracted::Dynamic(ExpressionDescriptor::new(
                ExtractorKind::Expr,
                token.key.clone(),
                None,
                None,
            )))
        }
    }
}

fn plain(token: &Token) -> Result<(), String> {
    no_key(token)?;
    no_range(token)?;
    no_qualifier(token)
}

fn no_key(token: &Token) -> Result<(), String> {
    if token.key.is_empty() {
        Ok(())
    } else {
        Err(format!("'{}' does not take a key", token.text))
    }
}

fn no_range(token: &Token) -> Result<(), String> {
    if token.range.is_none() {
        Ok(())
    } else {
        Err(format!("'{}' does not take a range", token.text))
    }
}

fn no_qualifier(token: &Token) -> Result<(), String> {
    if token.qualifier.is_none() {
        Ok(())
    } else {
        Err(format!("'{}' does not take a qualifier", token.text))
    }
}

fn package(package: &str, range: Option<SegmentRange>) -> Result<String, String> {
    let Some(range) = range else {
        return Ok(package.to_string());
    };

    let segments: Vec<&str> = if package.is_empty() { Vec::new() } else { package.split('.').collect() };
    segments
        .get(range.start..=range.end)
        .map(|selected| selected.join("."))
        .ok_or_else(|| format!("package range {range} is out of bounds for '{package}' ({} segments)", segments.len()))
}

fn annotation(token: &Token, class: &TypeInfo, member: &MemberInfo) -> Result<String, String> {
    if token.key.is_empty() {
        return Err(format!("'{}' needs an annotation type", token.text));
    }

    let attribute = token.qualifier.as_deref().unwrap_or(DEFAULT_ANNOTATION_ATTRIBUTE);
    let found = member
        .annotation(&token.key)
        .or_else(|| class.annotation(&token.key))
        .ok_or_else(|| format!("annotation '{}' not found on {} or {}", token.key, member.key(), class.name))?;

    found
        .attribute(attribute)
        .map(ToString::to_string)
        .ok_or_else(|| format!("annotation '{}' has no attribute '{attribute}'", found.type_name))
}

/// Check the root of a free-form expression against the member it will be evaluated on.
fn expression_root(token: &Token, member: &MemberInfo) -> Result<(), String> {
    let mut path = token.key.split('.').map(str::trim);
    match path.next().unwrap_or_default() {
        "this" if member.is_static() => Err(format!("'{}' is not available in static member {}", token.text, member.key())),
        "return" if !member.returns_value() => Err(format!("'{}' is not available because {} returns no value", token.text, member.key())),
        "this" | "return" => Ok(()),
        "args" => {
            let index = path.next().unwrap_or_default();
            let position: usize = index
                .parse()
                .map_err(|e| format!("'{}' needs an argument index after 'args', got '{index}': {e}", token.text))?;
            if position >= member.parameters.len() {
                return Err(format!(
                    "argument index {position} is out of range for {} ({} parameters)",
                    member.key(),
                    member.parameters.len()
                ));
            }
            Ok(())
        }
        root => Err(format!("'{}' has unknown root '{root}', expected this, args, or return", token.text)),
    }
}

fn argument_index(token: &Token, member: &MemberInfo) -> Result<usize, String> {
    let key = token.key.as_str();
    if key.is_empty() {
        return Err(format!("'{}' needs an argument index or parameter type", token.text));
    }

    if key.bytes().all(|b| b.is_ascii_digit()) {
        let index: usize = key.parse().map_err(|e| format!("invalid argument index '{key}': {e}"))?;
        if index >= member.parameters.len() {
            return Err(format!(
                "argument index {index} is out of range for {} ({} parameters)",
                member.key(),
                member.parameters.len()
            ));
        }
        return Ok(index);
    }

    member
        .parameters
        .iter()
        .position(|parameter| parameter == key || simple_name(parameter) == key)
        .ok_or_else(|| format!("{} has no parameter of type '{key}'", member.key()))
}
