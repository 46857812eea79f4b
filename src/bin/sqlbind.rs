//! sqlbind: inspect how a template is bound
//!
//! Rewrites a `:name` template for a backend and shows the encoded
//! parameter buffers, without talking to a database.
//!
//! # Usage
//!
//! ```bash
//! # Show the rewritten SQL and wire parameters
//! sqlbind render "UPDATE t SET x = :x WHERE id = :id" --bind x=i32:42 --bind id=null
//!
//! # SQLite markers, JSON output
//! sqlbind render "SELECT * FROM t WHERE a = :a" --bind a=str:hi --backend sqlite --format json
//!
//! # List the placeholders of a template
//! sqlbind explain "SELECT :a, :b, :a"
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::json;
use sqlbind::parser::{segments, Segment};
use sqlbind::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlbind")]
#[command(version)]
#[command(about = "Named SQL placeholders to positional wire parameters", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlbind render 'UPDATE t SET x = :x WHERE id = :id' --bind x=i32:42 --bind id=null
    sqlbind render 'SELECT * FROM t WHERE a = :a' --bind a=blob:deadbeef --backend sqlite
    sqlbind explain 'SELECT :a, :b, :a'")]
struct Cli {
    /// Config file (defaults to ./sqlbind.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a template and encode its bindings
    Render {
        /// Template with :name placeholders
        template: String,

        /// Binding as name=kind:value (kinds: null, bool, i32, i64, f64, str, blob)
        #[arg(short, long)]
        bind: Vec<String>,

        /// Target backend (overrides config)
        #[arg(long, env = "SQLBIND_BACKEND")]
        backend: Option<String>,

        /// Reject bindings that never occur in the template
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List the placeholders of a template
    Explain {
        /// Template with :name placeholders
        template: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| {
        init_tracing(&config, cli.verbose);
        match &cli.command {
            Commands::Render {
                template,
                bind,
                backend,
                strict,
                format,
            } => render(&config, template, bind, backend.as_deref(), *strict, *format),
            Commands::Explain { template } => {
                explain(template);
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::discover()?,
    };
    Ok(config)
}

fn init_tracing(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sqlbind={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn render(
    config: &Config,
    template: &str,
    bindings: &[String],
    backend: Option<&str>,
    strict: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = config.clone().with_backend_override(backend)?;
    let mut options = config.exec_options();
    options.strict_bindings |= strict;

    let entries = bindings
        .iter()
        .map(String::as_str)
        .map(parse_binding)
        .collect::<Result<Vec<_>>>()?;

    let transport = ScriptedTransport::new();
    let submission = Submission::build(template, &entries, options, &transport)?;

    match format {
        OutputFormat::Json => {
            let params: Vec<_> = submission
                .params
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    json!({
                        "index": i + 1,
                        "format": p.format().code(),
                        "length": p.len(),
                        "hex": hex::encode(p.payload()),
                    })
                })
                .collect();
            let out = json!({
                "backend": options.backend.name(),
                "sql": submission.sql,
                "params": params,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            println!("{} {}", "Backend:".dimmed(), options.backend.name().cyan());
            println!("{}", "SQL:".green().bold());
            println!("  {}", submission.sql.white());

            if submission.params.is_empty() {
                println!();
                println!("{}", "(no parameters)".dimmed());
                return Ok(());
            }

            println!();
            println!(
                "{:6} {:8} {:>6}  {}",
                "Param".white().bold(),
                "Format".white().bold(),
                "Length".white().bold(),
                "Bytes".white().bold()
            );
            println!("{}", "─".repeat(60).dimmed());
            for (i, param) in submission.params.iter().enumerate() {
                let marker = options.backend.marker(i + 1);
                let format = if param.is_binary() { "binary" } else { "text" };
                println!(
                    "{:6} {:8} {:>6}  {}",
                    marker.cyan(),
                    format,
                    param.len(),
                    hex::encode(param.payload()).yellow()
                );
            }
        }
    }

    Ok(())
}

fn explain(template: &str) {
    let template = QueryTemplate::new(template);
    println!("{} {}", "Template:".dimmed(), template.as_str().yellow());
    println!();

    println!("{}", "Segments:".green().bold());
    for segment in segments(template.as_str()) {
        match segment {
            Segment::Literal(text) => println!("  {} {:?}", "text".dimmed(), text),
            Segment::Placeholder(name) => println!("  {} :{}", "bind".cyan(), name.white()),
        }
    }
    println!();

    let names = template.placeholders();
    if names.is_empty() {
        println!("{}", "(no placeholders)".dimmed());
        return;
    }

    println!("{}", "Placeholders:".green().bold());
    for name in names {
        println!("  • :{}", name.white());
    }
}

/// Parse `name=kind:value`. `name=null` needs no value.
fn parse_binding(arg: &str) -> Result<BindEntry> {
    let Some((name, typed)) = arg.split_once('=') else {
        bail!("binding '{}' must look like name=kind:value", arg);
    };
    if name.trim_start_matches(':').is_empty() {
        bail!("binding '{}' has an empty name", arg);
    }

    let (kind, raw) = typed.split_once(':').unwrap_or((typed, ""));
    let value = match kind {
        "null" => BindValue::Null,
        "bool" => BindValue::Bool(raw.parse().with_context(|| format!("bad bool '{}'", raw))?),
        "i32" => BindValue::Int32(raw.parse().with_context(|| format!("bad i32 '{}'", raw))?),
        "i64" => BindValue::Int64(raw.parse().with_context(|| format!("bad i64 '{}'", raw))?),
        "f64" => BindValue::Double(raw.parse().with_context(|| format!("bad f64 '{}'", raw))?),
        "str" => BindValue::String(raw.to_string()),
        "blob" => BindValue::Blob(hex::decode(raw).with_context(|| format!("bad hex '{}'", raw))?),
        other => bail!("unknown kind '{}' in binding '{}'", other, arg),
    };

    Ok(BindEntry::new(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding_kinds() {
        let e = parse_binding("x=i32:42").unwrap();
        assert_eq!(e.name, "x");
        assert_eq!(e.value, BindValue::Int32(42));

        assert_eq!(parse_binding("id=null").unwrap().value, BindValue::Null);
        assert_eq!(parse_binding(":s=str:a:b").unwrap().value, BindValue::String("a:b".into()));
        assert_eq!(parse_binding("b=blob:00ff").unwrap().value, BindValue::Blob(vec![0, 255]));
        assert_eq!(parse_binding("f=bool:true").unwrap().value, BindValue::Bool(true));
    }

    #[test]
    fn test_parse_binding_errors() {
        assert!(parse_binding("novalue").is_err());
        assert!(parse_binding("=i32:1").is_err());
        assert!(parse_binding("x=i32:abc").is_err());
        assert!(parse_binding("x=date:2024").is_err());
        assert!(parse_binding("x=blob:zz").is_err());
    }
}
