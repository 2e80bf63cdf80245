use core::fmt::{self, Display, Formatter};
use core::str::FromStr;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(?P<kind>[A-Za-z]*)\{(?P<body>[^{}]*)\}").expect("invalid regex"));

static TOKEN_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$[A-Za-z]*\{").expect("invalid regex"));

static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[^()\[\]]*)(?:\((?P<range>[^()]*)\))?(?:\[(?P<qualifier>[^\[\]]*)\])?$").expect("invalid regex")
});

/// What a template token extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, StrumDisplay, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// The receiver of the call.
    This,

    /// One argument, by index or parameter type.
    Arg,

    /// The returned value.
    Return,

    /// A free-form path into the call context.
    Expr,

    /// An attribute of an annotation on the member or its type.
    Annotation,

    /// The declaring package, or a slice of its segments.
    Package,

    /// The simple name of the declaring type.
    Class,

    /// The member name.
    Method,
}

impl ExtractorKind {
    /// Whether the value is only known when the member is called.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        matches!(self, Self::This | Self::Arg | Self::Return | Self::Expr)
    }
}

/// Inclusive range of package segments, written `(n)` or `(n-m)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for SegmentRange {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid range '({text})'");
        let parse = |n: &str| n.trim().parse::<usize>().ok().ok_or_else(invalid);

        let (start, end) = match text.split_once('-') {
            Some((start, end)) => (parse(start)?, parse(end)?),
            None => {
                let index = parse(text)?;
                (index, index)
            }
        };

        if start > end {
            return Err(invalid());
        }

        Ok(Self { start, end })
    }
}

impl Display for SegmentRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "({})", self.start)
        } else {
            write!(f, "({}-{})", self.start, self.end)
        }
    }
}

/// One `$kind{key(range)[qualifier]}` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: ExtractorKind,
    pub key: String,
    pub range: Option<SegmentRange>,
    pub qualifier: Option<String>,
    pub text: String,
}

/// A piece of a template: literal text or a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Token(Token),
}

/// Split a template into literal and token segments, in order.
///
/// `${kind}` is shorthand for `$kind{}`, so `${class}` and `$class{}` are the same token.
pub fn tokenize(template: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut last = 0;

    for captures in TOKEN.captures_iter(template) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        push_literal(&mut segments, template.get(last..whole.start()).unwrap_or_default())?;
        last = whole.end();

        let kind = captures.name("kind").map_or("", |m| m.as_str());
        let body = captures.name("body").map_or("", |m| m.as_str());
        segments.push(Segment::Token(token(kind, body, whole.as_str())?));
    }

    push_literal(&mut segments, template.get(last..).unwrap_or_default())?;
    Ok(segments)
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) -> Result<(), String> {
    if let Some(start) = TOKEN_START.find(text) {
        return Err(format!("unterminated token starting at '{}'", start.as_str()));
    }

    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }

    Ok(())
}

fn token(kind: &str, body: &str, text: &str) -> Result<Token, String> {
    let Some(parts) = BODY.captures(body) else {
        return Err(format!("malformed token '{text}'"));
    };

    let mut key = parts.name("key").map_or("", |m| m.as_str()).trim();
    let range = parts.name("range").map(|m| m.as_str().parse::<SegmentRange>()).transpose()?;
    let qualifier = parts.name("qualifier").map(|m| m.as_str().trim().to_string());

    let kind = if kind.is_empty() {
        core::mem::take(&mut key)
    } else {
        kind
    };

    if kind.is_empty() {
        return Err(format!("token '{text}' names no kind"));
    }

    let kind = kind.parse::<ExtractorKind>().ok().ok_or_else(|| format!("unknown token kind '{kind}'"))?;

    Ok(Token {
        kind,
        key: key.to_string(),
        range,
        qualifier,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(template: &str) -> Vec<Token> {
        tokenize(template)
            .unwrap()
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Token(token) => Some(token),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn literals_and_tokens_alternate() {
        let segments = tokenize("m/${class}/$method{}").unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], Segment::Literal("m/".to_string()));
        assert!(matches!(&segments[1], Segment::Token(t) if t.kind == ExtractorKind::Class && t.key.is_empty()));
        assert_eq!(segments[2], Segment::Literal("/".to_string()));
        assert!(matches!(&segments[3], Segment::Token(t) if t.kind == ExtractorKind::Method));
    }

    #[test]
    fn plain_text_has_no_tokens() {
        assert_eq!(tokenize("a/b/c").unwrap(), vec![Segment::Literal("a/b/c".to_string())]);
        assert_eq!(tokenize("cost in $").unwrap(), vec![Segment::Literal("cost in $".to_string())]);
    }

    #[test]
    fn body_parts() {
        let token = &tokens("$annotation{com.acme.Timed[value]}")[0];
        assert_eq!(token.kind, ExtractorKind::Annotation);
        assert_eq!(token.key, "com.acme.Timed");
        assert_eq!(token.qualifier.as_deref(), Some("value"));

        let token = &tokens("$package{(1-2)}")[0];
        assert_eq!(token.range, Some(SegmentRange { start: 1, end: 2 }));

        let token = &tokens("${package(0)}")[0];
        assert_eq!(token.kind, ExtractorKind::Package);
        assert_eq!(token.range, Some(SegmentRange { start: 0, end: 0 }));

        let token = &tokens("$arg{0[name]}")[0];
        assert_eq!(token.key, "0");
        assert_eq!(token.qualifier.as_deref(), Some("name"));
    }

    #[test]
    fn kinds_are_case_insensitive() {
        assert_eq!(tokens("${CLASS}")[0].kind, ExtractorKind::Class);
    }

    #[test]
    fn malformed_tokens() {
        assert_eq!(tokenize("a/$foo{}").unwrap_err(), "unknown token kind 'foo'");
        assert_eq!(tokenize("a/${}").unwrap_err(), "token '${}' names no kind");
        assert_eq!(tokenize("a/$package{(1}").unwrap_err(), "malformed token '$package{(1}'");
        assert_eq!(tokenize("a/$package{(x)}").unwrap_err(), "invalid range '(x)'");
        assert_eq!(tokenize("a/$package{(3-1)}").unwrap_err(), "invalid range '(3-1)'");
        assert_eq!(tokenize("a/${class").unwrap_err(), "unterminated token starting at '${'");
    }

    #[test]
    fn range_display() {
        assert_eq!(SegmentRange { start: 2, end: 2 }.to_string(), "(2)");
        assert_eq!(SegmentRange { start: 0, end: 3 }.to_string(), "(0-3)");
    }
}
