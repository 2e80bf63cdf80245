//! The shorthand directive language
//!
//! A directive is one line of text naming which members of which types to instrument,
//! how, and under what metric name:
//!
//! ```text
//! [@]class[+][<loader>] [(attributes)] [@]method[(signature)][[attributes]] [-options] [[measurements]] [[sub-metrics]] 'template'
//! ```
//!
//! For example, `java.lang.Object+ equals 'x/y/z'` targets `equals` on every type, and
//! `[Foo.*] (pub,pro) [bar.*] -dr [ELAPSED][COUNT] 'm/${class}/${method}'` targets the
//! public and protected `bar*` members of every type whose name starts with `Foo`.
//!
//! Parsing runs once per directive and produces an immutable [`Directive`]. Text is
//! first normalized (whitespace runs collapse to one space), then matched against a
//! single structural pattern whose named fields are validated one by one. Any failure
//! yields a [`DirectiveParseError`](crate::error::DirectiveParseError) carrying the whole
//! submitted text; a partially valid directive is never returned.

#[expect(clippy::module_inception, reason = "The type and its module share a name")]
mod directive;
mod grammar;
mod parser;
mod snapshot;

pub use directive::{ClassSpec, Directive, MethodSpec, NamePattern, SignaturePattern};
pub use grammar::Field;
pub use parser::{ParseTolerance, default_tolerance, parse, parse_with, set_default_tolerance};
pub use snapshot::{DirectiveSnapshot, FlagState};
