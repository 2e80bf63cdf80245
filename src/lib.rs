//! Compiler for shorthand instrumentation directives
//!
//! A directive names a set of members to instrument, how to instrument them, and a template
//! for the metric names they report under. This crate turns the directive text into
//! something a weaving engine can act on, in three stages:
//!
//! 1. [`directive`]: parse and validate the text into an immutable [`Directive`](directive::Directive),
//!    decoding flag lists through the [`options`] registries.
//! 2. [`resolve`]: resolve the directive against a [`TypeUniverse`](universe::TypeUniverse) into
//!    concrete `(type, member)` targets.
//! 3. [`template`]: compile the metric-name template for each target into a cached
//!    [`CompiledNameProvider`](template::CompiledNameProvider).
//!
//! # Module Organization
//!
//! - [`options`]: Flag registries for method attributes, invocation options, measurements, and sub-metrics
//! - [`directive`]: Directive grammar, parser, and snapshots
//! - [`universe`]: The type universe the resolver queries
//! - [`resolve`]: Target resolution
//! - [`template`]: Metric-name template compilation
//! - [`error`]: Typed errors for each stage
//! - [`config`]: Tool configuration
//! - [`commands`]: Command-line interface

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod commands;
pub mod config;
pub mod directive;
pub mod error;
pub mod options;
pub mod resolve;
pub mod template;
pub mod universe;

pub use crate::commands::{Host, run};
