use super::common::tolerance;
use super::{GlobalArgs, Host};
use crate::Result;
use crate::directive::parse_with;
use clap::Parser;
use ohno::{IntoAppError, app_err};
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// The directive to parse, quoted as one argument
    #[arg(value_name = "DIRECTIVE")]
    pub directive: String,

    /// Skip unknown flag-list entries instead of failing
    #[arg(long)]
    pub tolerant: bool,

    /// Print the decoded fields as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse one directive and print its decoded fields.
pub fn parse_directive<H: Host>(host: &mut H, global: &GlobalArgs, args: &ParseArgs) -> Result<()> {
    let config = global.load_config()?;

    let directive = match parse_with(&args.directive, tolerance(args.tolerant, &config)) {
        Ok(directive) => directive,
        Err(e) => {
            host.fail(&e);
            return Err(app_err!("{e}"));
        }
    };

    let snapshot = directive.snapshot();
    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).into_app_err("serializing directive snapshot")?;
        let _ = writeln!(host.output(), "{json}");
    } else {
        let _ = writeln!(host.output(), "{snapshot}");
    }

    Ok(())
}
