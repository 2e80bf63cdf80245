//! A tool to parse and resolve shorthand instrumentation directives.
//!
//! # Overview
//!
//! A shorthand directive is a single line that says which members of which types to
//! instrument, how to instrument them, and what to call the resulting metrics:
//!
//! ```text
//! java.lang.Object+ equals 'x/y/z'
//! [Foo.*] (pub,pro) [bar.*] -dr [ELAPSED][COUNT] 'm/${class}/${method}'
//! @com.acme.Timed+<app> * -s [elapsed,cpu] 'timed/${package(1)}/${class}/$arg{0[id]}'
//! ```
//!
//! `shorthand` checks directives before they reach a running system, shows how every field
//! was decoded, and lists the members a directive selects from a type universe together with
//! the metric name each of them would report under.
//!
//! # Quick Start
//!
//! **Show the decoded fields of a directive:**
//! ```bash
//! shorthand parse "java.lang.Object+ equals 'x/y/z'"
//! shorthand parse --json "[Foo.*] (pub,pro) [bar.*] -dr 'm/${class}/${method}'"
//! ```
//!
//! **List the members a directive selects:**
//! ```bash
//! shorthand resolve --universe universe.json "com.acme.Service+ handle 'svc/${class}/$arg{0}'"
//! ```
//!
//! Each target is printed with its metric name. Names that depend on the call show
//! numbered placeholders followed by the expressions that fill them:
//!
//! ```text
//! 2 members across 2 types
//! com.acme.Service
//!   handle(java.lang.String) -> svc/Service/{0}  [args.0]
//! com.acme.orders.OrderService@app
//!   handle(java.lang.String) -> svc/OrderService/{0}  [args.0]
//! ```
//!
//! # Type Universes
//!
//! `resolve` works against a JSON or TOML description of loaders and types:
//!
//! ```json
//! {
//!   "loaders": [{ "name": "app", "parent": "system" }, { "name": "system" }],
//!   "types": [
//!     {
//!       "name": "com.acme.orders.OrderService",
//!       "loader": "app",
//!       "interfaces": ["com.acme.Service"],
//!       "members": [{ "name": "handle", "modifiers": 1, "parameters": ["java.lang.String"], "return_type": "java.lang.String" }]
//!     }
//!   ]
//! }
//! ```
//!
//! Types without a `loader` belong to the bootstrap loader. `modifiers` uses the JVM access
//! flag bits (`1` public, `2` private, `4` protected, `8` static, `16` final, ...).
//!
//! # Configuration
//!
//! **Generate the default configuration:**
//! ```bash
//! shorthand init
//! ```
//!
//! **Validate a configuration file:**
//! ```bash
//! shorthand validate --config custom.toml
//! ```
//!
//! Without `--config`, `shorthand.toml` in the current directory is used when present.
//!
//! ```toml
//! tolerant_parsing = false      # skip unknown flag-list entries instead of failing
//! max_concurrent_scans = 4      # type-universe scans running at once (1..=64)
//! context_loader = "app"        # loader chain visible in every scan
//! compile_timeout_ms = 1000     # bound on a single template compilation
//! universe = "universe.json"    # used when --universe is not given
//! ```
//!
//! # Diagnostics
//!
//! `--log-level` (`none`, `error`, `warn`, `info`, `debug`, `trace`) enables logging to
//! stderr; `RUST_LOG` takes precedence when set.

use shorthand::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that writes to the real standard streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
