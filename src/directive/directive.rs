use crate::options::{FlagValue, InvocationOption, Measurement, MethodAttribute, SubMetric};
use core::fmt::{self, Display, Formatter};
use regex::Regex;

/// How a class or method field selects names.
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Exact name.
    Literal(String),

    /// `*`: every name.
    Any,

    /// `[regex]`, anchored to the whole name.
    Regex { source: String, regex: Regex },
}

impl NamePattern {
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == name,
            Self::Any => true,
            Self::Regex { regex, .. } => regex.is_match(name),
        }
    }

    /// Whether the pattern can select more than one name.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    #[must_use]
    pub const fn is_regex(&self) -> bool {
        matches!(self, Self::Regex { .. })
    }

    /// The literal name, if the pattern is one.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Literal(literal) => Some(literal),
            Self::Any | Self::Regex { .. } => None,
        }
    }
}

impl Display for NamePattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.write_str(literal),
            Self::Any => f.write_str("*"),
            Self::Regex { source, .. } => write!(f, "[{source}]"),
        }
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Any, Self::Any) => true,
            (Self::Regex { source: a, .. }, Self::Regex { source: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for NamePattern {}

/// How the rendered parameter list of a member is matched.
#[derive(Debug, Clone, Default)]
pub enum SignaturePattern {
    /// No signature given: every overload matches.
    #[default]
    Any,

    /// Exact rendered signature, e.g. `int,java.lang.String`.
    Literal(String),

    /// `(regex)`, anchored to the whole rendered signature.
    Regex { source: String, regex: Regex },
}

impl SignaturePattern {
    #[must_use]
    pub fn matches(&self, signature: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Literal(literal) => literal == signature,
            Self::Regex { regex, .. } => regex.is_match(signature),
        }
    }
}

impl Display for SignaturePattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => Ok(()),
            Self::Literal(literal) => write!(f, "({literal})"),
            Self::Regex { source, .. } => write!(f, "(({source}))"),
        }
    }
}

impl PartialEq for SignaturePattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) => true,
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Regex { source: a, .. }, Self::Regex { source: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for SignaturePattern {}

/// Which types a directive targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpec {
    pub(super) pattern: NamePattern,
    pub(super) annotation: bool,
    pub(super) inherit: bool,
    pub(super) loader: Option<String>,
}

impl ClassSpec {
    #[must_use]
    pub const fn pattern(&self) -> &NamePattern {
        &self.pattern
    }

    /// The class field names an annotation type rather than a type.
    #[must_use]
    pub const fn is_annotation(&self) -> bool {
        self.annotation
    }

    /// Subtypes and implementors are included.
    #[must_use]
    pub const fn is_inherited(&self) -> bool {
        self.inherit
    }

    /// Classloader hint: a loader name, or `type:<fqcn>`.
    #[must_use]
    pub fn loader(&self) -> Option<&str> {
        self.loader.as_deref()
    }
}

/// Which members of the targeted types are instrumented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub(super) pattern: NamePattern,
    pub(super) annotation: bool,
    pub(super) signature: SignaturePattern,
    pub(super) attributes: u32,
}

impl MethodSpec {
    #[must_use]
    pub const fn pattern(&self) -> &NamePattern {
        &self.pattern
    }

    /// The method field names an annotation type rather than a member.
    #[must_use]
    pub const fn is_annotation(&self) -> bool {
        self.annotation
    }

    #[must_use]
    pub const fn signature(&self) -> &SignaturePattern {
        &self.signature
    }

    /// Requested [`MethodAttribute`] bits.
    #[must_use]
    pub const fn attributes(&self) -> u32 {
        self.attributes
    }
}

/// A fully decoded instrumentation directive.
///
/// Directives are immutable once parsed. Share them behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub(super) source: String,
    pub(super) class: ClassSpec,
    pub(super) method: MethodSpec,
    pub(super) invocation_options: u32,
    pub(super) measurements: u32,
    pub(super) sub_metrics: u32,
    pub(super) template: String,
}

impl Directive {
    /// The text the directive was parsed from, exactly as submitted.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn class(&self) -> &ClassSpec {
        &self.class
    }

    #[must_use]
    pub const fn method(&self) -> &MethodSpec {
        &self.method
    }

    /// [`InvocationOption`] bits.
    #[must_use]
    pub const fn invocation_options(&self) -> u32 {
        self.invocation_options
    }

    /// [`Measurement`] bits.
    #[must_use]
    pub const fn measurements(&self) -> u32 {
        self.measurements
    }

    /// [`SubMetric`] bits.
    #[must_use]
    pub const fn sub_metrics(&self) -> u32 {
        self.sub_metrics
    }

    /// The metric-name template, without its quotes.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn has_option(&self, option: InvocationOption) -> bool {
        self.invocation_options & option.mask() != 0
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.class.annotation {
            f.write_str("@")?;
        }
        write!(f, "{}", self.class.pattern)?;
        if self.class.inherit {
            f.write_str("+")?;
        }
        if let Some(loader) = &self.class.loader {
            write!(f, "<{loader}>")?;
        }

        let attributes = MethodAttribute::registry().names(self.method.attributes);
        write!(f, " ({}) ", attributes.join(","))?;

        if self.method.annotation {
            f.write_str("@")?;
        }
        write!(f, "{}{}", self.method.pattern, self.method.signature)?;

        let letters = InvocationOption::registry().letters(self.invocation_options);
        if !letters.is_empty() {
            write!(f, " -{letters}")?;
        }

        write!(
            f,
            " [{}] [{}] '{}'",
            Measurement::registry().names(self.measurements).join(","),
            SubMetric::registry().names(self.sub_metrics).join(","),
            self.template
        )
    }
}
