//! The structural pattern every directive must match, and named access to its fields.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use strum::{EnumIter, IntoStaticStr};

/// The thirteen positional fields of a directive, in the order they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// `@` before the class: the class field names an annotation.
    ClassAnnotation,
    /// Literal type name, `*`, or `[regex]`.
    Class,
    /// `+` after the class: include subtypes and implementors.
    Inherit,
    /// `<loader>` after the class.
    Loader,
    /// `(pub,sta)` between the class and the method.
    Attributes,
    /// `@` before the method: the method field names an annotation.
    MethodAnnotation,
    /// Literal member name, `*`, or `[regex]`.
    Method,
    /// `(...)` attached to the method name.
    Signature,
    /// `[pub,sta]` attached to the method name or signature.
    MethodAttributes,
    /// `-dr` option letters.
    Options,
    /// First bracket list after the method: measurements.
    Measurements,
    /// Second bracket list: sub-metrics.
    SubMetrics,
    /// Single-quoted metric-name template.
    Template,
}

impl Field {
    /// Name of the capture group holding this field.
    #[must_use]
    pub fn group(self) -> &'static str {
        self.into()
    }
}

const BRACKETED: &str = r"\[(?:[^\[\]]|\[[^\]]*\])*\]";

pub(super) static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        concat!(
            r"^(?P<class_annotation>@)?",
            r"(?P<class>{bracketed}|[^\s+<(\[@']+)",
            r"(?P<inherit>\+)?",
            r"(?:<(?P<loader>[^>]*)>)?",
            r"(?:\s\((?P<attributes>[^)]*)\))?",
            r"\s(?P<method_annotation>@)?",
            r"(?P<method>{bracketed}|[^\s(\[@']+)",
            r"(?:\((?P<signature>\S*)\))?",
            r"(?:\[(?P<method_attributes>[^\]]*)\])?",
            r"(?:\s-(?P<options>[A-Za-z]+))?",
            r"(?:\s\[(?P<measurements>[^\]]*)\])?",
            r"(?:\s?\[(?P<sub_metrics>[^\]]*)\])?",
            r"\s'(?P<template>[^']*)'$",
        ),
        bracketed = BRACKETED
    );

    Regex::new(&pattern).expect("invalid directive pattern")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex"));

/// Trim and collapse every run of whitespace to a single space.
#[must_use]
pub fn normalize(source: &str) -> String {
    WHITESPACE.replace_all(source.trim(), " ").into_owned()
}

/// Named accessor over a successful match of [`DIRECTIVE_PATTERN`].
#[derive(Debug)]
pub struct Fields<'a> {
    captures: Captures<'a>,
}

impl<'a> Fields<'a> {
    /// Match normalized directive text against the grammar.
    #[must_use]
    pub fn capture(normalized: &'a str) -> Option<Self> {
        DIRECTIVE_PATTERN.captures(normalized).map(|captures| Self { captures })
    }

    /// The raw text of a field, if it was present.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'a str> {
        self.captures.name(field.group()).map(|m| m.as_str())
    }

    /// Whether a marker field (`@`, `+`) was present.
    #[must_use]
    pub fn flag(&self, field: Field) -> bool {
        self.get(field).is_some()
    }
}
