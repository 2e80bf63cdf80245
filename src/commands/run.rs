//! Command dispatch logic for shorthand

use super::common::init_logging;
use super::{GlobalArgs, InitArgs, ParseArgs, ResolveArgs, init_config, parse_directive, resolve_directive, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "shorthand", version, author, long_about = None)]
#[command(about = "Compile shorthand instrumentation directives")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a directive and show its decoded fields
    Parse(ParseArgs),
    /// Resolve a directive against a type universe and show the metric names it produces
    Resolve(ResolveArgs),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate,
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.global.log_level);

    match &cli.command {
        Command::Parse(parse_args) => parse_directive(host, &cli.global, parse_args),
        Command::Resolve(resolve_args) => resolve_directive(host, &cli.global, resolve_args).await,
        Command::Init(init_args) => init_config(host, init_args),
        Command::Validate => validate_config(host, &cli.global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
