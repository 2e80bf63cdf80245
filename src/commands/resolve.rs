use super::common::tolerance;
use super::{GlobalArgs, Host};
use crate::Result;
use crate::directive::parse_with;
use crate::resolve::Resolver;
use crate::template::{CompiledNameProvider, TemplateCompiler};
use crate::universe::StaticUniverse;
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::{app_err, bail};
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "   resolve";

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// The directive to resolve, quoted as one argument
    #[arg(value_name = "DIRECTIVE")]
    pub directive: String,

    /// Type universe description (.json or .toml); defaults to `universe` from the configuration
    #[arg(long, short = 'u', value_name = "PATH")]
    pub universe: Option<Utf8PathBuf>,

    /// Skip unknown flag-list entries instead of failing
    #[arg(long)]
    pub tolerant: bool,
}

/// Resolve a directive against a type universe and print the metric name of every target.
pub async fn resolve_directive<H: Host>(host: &mut H, global: &GlobalArgs, args: &ResolveArgs) -> Result<()> {
    let config = global.load_config()?;

    let Some(universe_path) = args.universe.as_ref().or(config.universe.as_ref()) else {
        bail!("no type universe given, pass --universe or set 'universe' in the configuration");
    };

    let universe = StaticUniverse::load(universe_path)?;
    let directive = parse_with(&args.directive, tolerance(args.tolerant, &config)).map_err(|e| app_err!("{e}"))?;

    let resolver = Resolver::new(Arc::new(universe))
        .with_context_loader(config.context_loader.clone())
        .with_max_concurrent_scans(config.max_concurrent_scans);

    let targets = resolver.resolve(&Arc::new(directive)).await.map_err(|e| app_err!("{e}"))?;
    let _ = writeln!(
        host.output(),
        "{} members across {} types",
        targets.len(),
        targets.classes().len()
    );

    let compiler = Arc::new(TemplateCompiler::new());
    let mut failures = 0;
    let mut current_class = String::new();

    for target in targets.targets() {
        let identity = target.class().identity();
        if identity != current_class {
            let _ = writeln!(host.output(), "{identity}");
            current_class = identity;
        }

        let member = target.member().key();
        match compiler.compile_with_timeout(target, config.compile_timeout()).await {
            Ok(provider) => {
                let _ = writeln!(host.output(), "  {member} -> {}", describe(&provider));
            }
            Err(e) => {
                failures += 1;
                log::debug!(target: LOG_TARGET, "Naming {current_class}.{member} failed (retryable: {})", e.is_retryable());
                host.diagnose(format_args!("{current_class}.{member}: {e}"));
            }
        }
    }

    if failures > 0 {
        host.exit(1);
        bail!("{failures} of {} targets could not be named", targets.len());
    }

    Ok(())
}

fn describe(provider: &CompiledNameProvider) -> String {
    if provider.is_constant() {
        return provider.skeleton();
    }

    let expressions: Vec<_> = provider.expressions().iter().map(|e| e.expression.as_str()).collect();
    format!("{}  [{}]", provider.skeleton(), expressions.join(", "))
}
